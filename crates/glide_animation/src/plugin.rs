//! Value plugins
//!
//! A plugin owns the typed start/end/change of one animated property and
//! knows how to write an eased value back through its `PropertyAccess`.
//! Plugins are picked once, at tween creation, from a `PluginRegistry`
//! keyed by the value type.

use crate::easing::{Ease, DEFAULT_OVERSHOOT_OR_AMPLITUDE, DEFAULT_PERIOD};
use glide_core::{AccessError, PropertyAccess, TargetId, TweenValue};
use rustc_hash::FxHashMap;
use std::any::{Any, TypeId};
use std::rc::Rc;

/// Interpolation strategy for one property of one target
pub trait ValuePlugin {
    /// Name of the animated property
    fn property(&self) -> &str;

    /// Target the property belongs to
    fn target(&self) -> TargetId;

    /// Capture start and end from the live value
    fn startup(&mut self) -> Result<(), AccessError>;

    /// Recompute the change (and end, for relative tweens)
    fn set_change_val(&mut self);

    /// Write the eased value for `elapsed` seconds into a `duration`
    fn do_update(&mut self, elapsed: f32, duration: f32) -> Result<(), AccessError>;

    /// Shift start and end by `change * loop_diff`
    fn set_incremental(&mut self, loop_diff: i64);

    /// Rebase on the live value, keeping the change
    fn set_incremental_restart(&mut self) -> Result<(), AccessError>;

    /// Seconds needed to cover the change at `speed` units per second
    fn speed_based_duration(&self, speed: f32) -> f32;
}

/// Ease curve together with its shape parameters
#[derive(Clone, Copy, Debug)]
pub struct EaseConfig {
    pub ease: Ease,
    pub overshoot_or_amplitude: f32,
    pub period: f32,
}

impl Default for EaseConfig {
    fn default() -> Self {
        Self {
            ease: Ease::default(),
            overshoot_or_amplitude: DEFAULT_OVERSHOOT_OR_AMPLITUDE,
            period: DEFAULT_PERIOD,
        }
    }
}

impl EaseConfig {
    pub fn new(ease: Ease) -> Self {
        Self {
            ease,
            ..Default::default()
        }
    }

    /// Normalized progress for `elapsed` seconds into `duration`
    ///
    /// A zero duration is always fully progressed.
    pub fn factor(&self, elapsed: f32, duration: f32) -> f32 {
        if duration <= 0.0 {
            return 1.0;
        }
        self.ease.evaluate(
            elapsed,
            0.0,
            1.0,
            duration,
            self.overshoot_or_amplitude,
            self.period,
        )
    }
}

/// Everything a factory needs to build a plugin
pub struct PluginSpec<V> {
    pub access: Rc<dyn PropertyAccess<V>>,
    /// Absolute end (or start, for from tweens), or an offset when relative
    pub value: V,
    pub relative: bool,
    pub from: bool,
    pub ease: EaseConfig,
    pub pixel_perfect: bool,
}

pub type PluginFactory<V> = fn(PluginSpec<V>) -> Box<dyn ValuePlugin>;

/// Default plugin: linear blend of start and change scaled by the ease
pub struct LerpPlugin<V: TweenValue> {
    access: Rc<dyn PropertyAccess<V>>,
    param: V,
    start: V,
    end: V,
    change: V,
    relative: bool,
    from: bool,
    ease: EaseConfig,
    pixel_perfect: bool,
}

impl<V: TweenValue> LerpPlugin<V> {
    pub fn new(spec: PluginSpec<V>) -> Self {
        Self {
            access: spec.access,
            param: spec.value,
            start: spec.value,
            end: spec.value,
            change: spec.value.sub(spec.value),
            relative: spec.relative,
            from: spec.from,
            ease: spec.ease,
            pixel_perfect: spec.pixel_perfect,
        }
    }

    /// Factory registered for every built-in value type
    pub fn boxed(spec: PluginSpec<V>) -> Box<dyn ValuePlugin> {
        Box::new(Self::new(spec))
    }

    pub fn start(&self) -> V {
        self.start
    }

    pub fn end(&self) -> V {
        self.end
    }

    pub fn change(&self) -> V {
        self.change
    }
}

impl<V: TweenValue> ValuePlugin for LerpPlugin<V> {
    fn property(&self) -> &str {
        self.access.property()
    }

    fn target(&self) -> TargetId {
        self.access.target()
    }

    fn startup(&mut self) -> Result<(), AccessError> {
        let current = self.access.get()?;
        if self.from {
            self.end = current;
            self.start = if self.relative {
                current.add(self.param)
            } else {
                self.param
            };
        } else {
            self.start = current;
            self.end = self.param;
        }
        self.set_change_val();
        Ok(())
    }

    fn set_change_val(&mut self) {
        if self.relative && !self.from {
            self.change = self.param;
            self.end = self.start.add(self.param);
        } else {
            self.change = self.end.sub(self.start);
        }
    }

    fn do_update(&mut self, elapsed: f32, duration: f32) -> Result<(), AccessError> {
        let t = self.ease.factor(elapsed, duration);
        let mut value = if t == 1.0 {
            self.end
        } else {
            self.start.add(self.change.scale(t))
        };
        if self.pixel_perfect {
            value = value.truncate();
        }
        self.access.set(value)
    }

    fn set_incremental(&mut self, loop_diff: i64) {
        let shift = self.change.scale(loop_diff as f32);
        self.start = self.start.add(shift);
        self.end = self.end.add(shift);
    }

    fn set_incremental_restart(&mut self) -> Result<(), AccessError> {
        let live = self.access.get()?;
        let delta = live.sub(self.start);
        self.start = live;
        self.end = self.end.add(delta);
        Ok(())
    }

    fn speed_based_duration(&self, speed: f32) -> f32 {
        self.change.magnitude().abs() / speed
    }
}

struct RegisteredFactory {
    value_type: &'static str,
    factory: Box<dyn Any>,
}

/// Value-type keyed plugin factories
pub struct PluginRegistry {
    factories: FxHashMap<TypeId, RegisteredFactory>,
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<_> = self.factories.values().map(|r| r.value_type).collect();
        types.sort_unstable();
        f.debug_struct("PluginRegistry")
            .field("value_types", &types)
            .finish()
    }
}

impl PluginRegistry {
    /// Registry with no factories at all
    pub fn empty() -> Self {
        Self {
            factories: FxHashMap::default(),
        }
    }

    /// Registry serving scalars, 2D/3D vectors and RGBA colors
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register::<f32>(LerpPlugin::<f32>::boxed);
        registry.register::<f64>(LerpPlugin::<f64>::boxed);
        registry.register::<[f32; 2]>(LerpPlugin::<[f32; 2]>::boxed);
        registry.register::<[f32; 3]>(LerpPlugin::<[f32; 3]>::boxed);
        registry.register::<[f32; 4]>(LerpPlugin::<[f32; 4]>::boxed);
        registry
    }

    /// Register (or replace) the factory for value type `V`
    pub fn register<V: 'static>(&mut self, factory: PluginFactory<V>) {
        tracing::trace!("registered plugin for {}", std::any::type_name::<V>());
        self.factories.insert(
            TypeId::of::<V>(),
            RegisteredFactory {
                value_type: std::any::type_name::<V>(),
                factory: Box::new(factory),
            },
        );
    }

    pub fn supports<V: 'static>(&self) -> bool {
        self.factories.contains_key(&TypeId::of::<V>())
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Build a plugin, or `None` when `V` has no factory
    pub fn create<V: 'static>(&self, spec: PluginSpec<V>) -> Option<Box<dyn ValuePlugin>> {
        let registered = self.factories.get(&TypeId::of::<V>())?;
        let factory = registered.factory.downcast_ref::<PluginFactory<V>>()?;
        Some(factory(spec))
    }
}
