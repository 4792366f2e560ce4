//! Glide Core
//!
//! Foundation types shared by hosts and the Glide animation engine:
//!
//! - **Tweenable values**: the `TweenValue` arithmetic contract (add, sub, scale,
//!   truncate, magnitude) for scalars, vectors and colors
//! - **Typed property access**: getter/setter pairs registered once per
//!   `(target type, property name)` and bound to a target at tween creation
//!
//! # Example
//!
//! ```rust
//! use glide_core::{PropertyRegistry, TargetId};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! struct Sprite {
//!     x: f32,
//! }
//!
//! let mut registry = PropertyRegistry::new();
//! registry.register::<Sprite, f32>("x", |s| s.x, |s, v| s.x = v);
//!
//! let sprite = Rc::new(RefCell::new(Sprite { x: 2.0 }));
//! let access = registry.bind::<Sprite, f32>(&sprite, "x").unwrap();
//! access.set(5.0).unwrap();
//!
//! assert_eq!(sprite.borrow().x, 5.0);
//! assert_eq!(access.target(), TargetId::of(&sprite));
//! ```

pub mod property;
pub mod value;

pub use property::{AccessError, BindError, PropertyAccess, PropertyRegistry, TargetId};
pub use value::TweenValue;
