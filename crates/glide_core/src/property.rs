//! Typed property access
//!
//! Hosts register a getter/setter pair once per `(target type, property name)`.
//! Tween creation binds that pair to a concrete target and hands the engine a
//! `PropertyAccess<V>` capability, so nothing is looked up by name per frame.
//!
//! Targets are shared as `Rc<RefCell<T>>`. Bindings only keep a `Weak`
//! reference: the host owns its objects, the engine merely animates them.

use rustc_hash::FxHashMap;
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use thiserror::Error;

/// Reference identity of an animated target
///
/// Two handles compare equal exactly when they point at the same allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(usize);

impl TargetId {
    /// Identity of a shared target
    pub fn of<T: ?Sized>(target: &Rc<T>) -> Self {
        Self(Rc::as_ptr(target) as *const () as usize)
    }

    /// Raw address value (debugging only)
    pub fn value(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TargetId({:#x})", self.0)
    }
}

/// Failure to read or write a bound property
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    /// The host dropped the target
    #[error("target has been dropped")]
    TargetDropped,

    /// The host holds a conflicting `RefCell` borrow
    #[error("target is already borrowed")]
    TargetBorrowed,
}

/// Failure to bind a property name to a target
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// No accessor registered for this target type and name
    #[error("property '{property}' is not registered for {target_type}")]
    UnknownProperty {
        target_type: &'static str,
        property: String,
    },

    /// The accessor exists but animates a different value type
    #[error("property '{property}' holds {registered}, not {requested}")]
    ValueTypeMismatch {
        property: String,
        registered: &'static str,
        requested: &'static str,
    },

    /// The target handle is not the type the accessor was registered for
    #[error("target passed for '{property}' is not a {target_type}")]
    TargetTypeMismatch {
        target_type: &'static str,
        property: String,
    },
}

/// Get/set capability for one property of one target
pub trait PropertyAccess<V> {
    /// Read the live value
    fn get(&self) -> Result<V, AccessError>;

    /// Write a new value
    fn set(&self, value: V) -> Result<(), AccessError>;

    /// Identity of the bound target
    fn target(&self) -> TargetId;

    /// Name of the bound property
    fn property(&self) -> &str;
}

/// Accessor bound to a concrete `Rc<RefCell<T>>`
struct PropertyBinding<T, V> {
    target: Weak<RefCell<T>>,
    id: TargetId,
    property: String,
    get: fn(&T) -> V,
    set: fn(&mut T, V),
}

impl<T, V> PropertyAccess<V> for PropertyBinding<T, V> {
    fn get(&self) -> Result<V, AccessError> {
        let target = self.target.upgrade().ok_or(AccessError::TargetDropped)?;
        let data = target
            .try_borrow()
            .map_err(|_| AccessError::TargetBorrowed)?;
        Ok((self.get)(&data))
    }

    fn set(&self, value: V) -> Result<(), AccessError> {
        let target = self.target.upgrade().ok_or(AccessError::TargetDropped)?;
        let mut data = target
            .try_borrow_mut()
            .map_err(|_| AccessError::TargetBorrowed)?;
        (self.set)(&mut data, value);
        Ok(())
    }

    fn target(&self) -> TargetId {
        self.id
    }

    fn property(&self) -> &str {
        &self.property
    }
}

type Binder = Box<dyn Fn(Rc<dyn Any>) -> Option<Box<dyn Any>>>;

/// A registered accessor, erased over the target and value types
struct PropertyEntry {
    target_type: &'static str,
    value_type: TypeId,
    value_type_name: &'static str,
    binder: Binder,
}

/// Registration-time lookup table of animatable properties
#[derive(Default)]
pub struct PropertyRegistry {
    entries: FxHashMap<TypeId, FxHashMap<String, PropertyEntry>>,
}

impl std::fmt::Debug for PropertyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyRegistry")
            .field("target_types", &self.entries.len())
            .field("properties", &self.len())
            .finish()
    }
}

impl PropertyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a getter/setter pair for `name` on targets of type `T`
    ///
    /// Registering the same name twice replaces the earlier accessor.
    pub fn register<T: 'static, V: 'static>(
        &mut self,
        name: impl Into<String>,
        get: fn(&T) -> V,
        set: fn(&mut T, V),
    ) {
        let name = name.into();
        let property = name.clone();
        let binder: Binder = Box::new(move |target: Rc<dyn Any>| {
            let typed = target.downcast::<RefCell<T>>().ok()?;
            let access: Rc<dyn PropertyAccess<V>> = Rc::new(PropertyBinding {
                target: Rc::downgrade(&typed),
                id: TargetId::of(&typed),
                property: property.clone(),
                get,
                set,
            });
            Some(Box::new(access) as Box<dyn Any>)
        });

        tracing::trace!(
            "registered property {}::{} ({})",
            std::any::type_name::<T>(),
            name,
            std::any::type_name::<V>()
        );

        self.entries.entry(TypeId::of::<T>()).or_default().insert(
            name,
            PropertyEntry {
                target_type: std::any::type_name::<T>(),
                value_type: TypeId::of::<V>(),
                value_type_name: std::any::type_name::<V>(),
                binder,
            },
        );
    }

    /// Check whether `name` is registered for targets of type `T`
    pub fn contains<T: 'static>(&self, name: &str) -> bool {
        self.entries
            .get(&TypeId::of::<T>())
            .is_some_and(|props| props.contains_key(name))
    }

    /// Total number of registered properties
    pub fn len(&self) -> usize {
        self.entries.values().map(|props| props.len()).sum()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bind `name` on a typed target
    pub fn bind<T: 'static, V: 'static>(
        &self,
        target: &Rc<RefCell<T>>,
        name: &str,
    ) -> Result<Rc<dyn PropertyAccess<V>>, BindError> {
        let erased: Rc<dyn Any> = target.clone();
        self.bind_dyn::<V>(
            TypeId::of::<T>(),
            std::any::type_name::<T>(),
            erased,
            name,
        )
    }

    /// Bind `name` on a type-erased target
    ///
    /// `target` must be an `Rc<RefCell<T>>` whose `T` has id `target_type`.
    pub fn bind_dyn<V: 'static>(
        &self,
        target_type: TypeId,
        target_type_name: &'static str,
        target: Rc<dyn Any>,
        name: &str,
    ) -> Result<Rc<dyn PropertyAccess<V>>, BindError> {
        let entry = self
            .entries
            .get(&target_type)
            .and_then(|props| props.get(name))
            .ok_or_else(|| BindError::UnknownProperty {
                target_type: target_type_name,
                property: name.to_string(),
            })?;

        if entry.value_type != TypeId::of::<V>() {
            return Err(BindError::ValueTypeMismatch {
                property: name.to_string(),
                registered: entry.value_type_name,
                requested: std::any::type_name::<V>(),
            });
        }

        let mismatch = || BindError::TargetTypeMismatch {
            target_type: entry.target_type,
            property: name.to_string(),
        };

        let bound = (entry.binder)(target).ok_or_else(mismatch)?;
        bound
            .downcast::<Rc<dyn PropertyAccess<V>>>()
            .map(|access| *access)
            .map_err(|_| mismatch())
    }
}
