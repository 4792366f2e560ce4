//! Glide Animation System
//!
//! Time-based tweening of arbitrary object properties.
//!
//! # Features
//!
//! - **Tweens**: animate typed properties to, from or by a value
//! - **Sequences**: lay tweens out on a shared timeline, nest sequences
//! - **Loops**: restart, yoyo and incremental looping, forwards and backwards
//! - **Easing**: the Penner set plus CSS cubic beziers and custom curves
//! - **Value plugins**: per-type interpolation selected once at creation
//! - **Overwrite management**: resolve tweens fighting over one property
//!
//! # Example
//!
//! ```rust
//! use glide_animation::{Ease, TweenEngine, TweenParams, UpdateChannel};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! struct Sprite {
//!     x: f32,
//! }
//!
//! let mut engine = TweenEngine::new();
//! engine.register_property::<Sprite, f32>("x", |s| s.x, |s, v| s.x = v);
//!
//! let sprite = Rc::new(RefCell::new(Sprite { x: 0.0 }));
//! let params = TweenParams::new().prop("x", 100.0f32).ease(Ease::Linear);
//! engine.to_with(&sprite, 2.0, params).unwrap();
//!
//! engine.tick(UpdateChannel::Update, 1.0);
//! assert_eq!(sprite.borrow().x, 50.0);
//! ```

pub mod component;
pub mod config;
pub mod easing;
pub mod engine;
pub mod error;
pub mod events;
pub mod overwrite;
pub mod params;
pub mod plugin;
pub mod scheduler;
pub mod sequence;
pub mod tween;
pub mod tweener;

pub use component::TweenComponent;
pub use config::{EngineConfig, WarningLevel};
pub use easing::{Ease, EaseFn};
pub use engine::TweenEngine;
pub use error::{Result, TweenError};
pub use events::{CompleteCallback, TweenCallback, TweenEvent};
pub use overwrite::{OverwriteConfig, OverwriteManager, OverwriteMode};
pub use params::TweenParams;
pub use plugin::{EaseConfig, LerpPlugin, PluginFactory, PluginRegistry, PluginSpec, ValuePlugin};
pub use scheduler::{Scheduler, TweenFilter, TweenId};
pub use sequence::{Sequence, SequenceItem};
pub use tween::{Direction, LoopType, Loops, TweenCore, TweenState, UpdateChannel};
pub use tweener::Tweener;

pub use glide_core::{AccessError, BindError, PropertyAccess, PropertyRegistry, TargetId, TweenValue};
