//! Tween parameter bag
//!
//! Builder collecting everything a tween or sequence can be configured with.
//! Unset fields fall back to the engine's `EngineConfig` at creation time.

use crate::config::EngineConfig;
use crate::easing::Ease;
use crate::error::{Result, TweenError};
use crate::engine::TweenEngine;
use crate::events::{Callbacks, CompleteCallback, TweenCallback, TweenEvent};
use crate::plugin::{EaseConfig, PluginRegistry, PluginSpec, ValuePlugin};
use crate::tween::{LoopType, Loops, TweenCore, UpdateChannel};
use glide_core::PropertyRegistry;
use rustc_hash::FxHashSet;
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::rc::Rc;

/// Context for turning a property request into a plugin
pub(crate) struct ResolveCtx<'a> {
    pub(crate) properties: &'a PropertyRegistry,
    pub(crate) plugins: &'a PluginRegistry,
    pub(crate) target: Rc<dyn Any>,
    pub(crate) target_type: TypeId,
    pub(crate) target_type_name: &'static str,
    pub(crate) from: bool,
    pub(crate) relative: bool,
    pub(crate) ease: EaseConfig,
    pub(crate) pixel_perfect: bool,
}

/// A property to animate, erased over its value type
pub(crate) trait PropertyRequest {
    fn name(&self) -> &str;

    fn resolve(self: Box<Self>, ctx: &ResolveCtx<'_>) -> Result<Box<dyn ValuePlugin>>;
}

struct TypedRequest<V> {
    name: String,
    value: V,
    /// Per-property override of the bag's relative flag
    relative: Option<bool>,
}

impl<V: 'static> PropertyRequest for TypedRequest<V> {
    fn name(&self) -> &str {
        &self.name
    }

    fn resolve(self: Box<Self>, ctx: &ResolveCtx<'_>) -> Result<Box<dyn ValuePlugin>> {
        let access = ctx.properties.bind_dyn::<V>(
            ctx.target_type,
            ctx.target_type_name,
            ctx.target.clone(),
            &self.name,
        )?;
        let spec = PluginSpec {
            access,
            value: self.value,
            relative: self.relative.unwrap_or(ctx.relative),
            from: ctx.from,
            ease: ctx.ease,
            pixel_perfect: ctx.pixel_perfect,
        };
        let name = self.name;
        ctx.plugins
            .create(spec)
            .ok_or_else(|| TweenError::NoPlugin {
                property: name,
                value_type: std::any::type_name::<V>(),
            })
    }
}

/// Configuration for a tween or sequence
///
/// # Example
///
/// ```rust
/// use glide_animation::{Ease, LoopType, TweenParams};
///
/// let params = TweenParams::new()
///     .prop("x", 100.0f32)
///     .prop_by("rotation", 90.0f32)
///     .ease(Ease::OutBack)
///     .loops(2)
///     .loop_type(LoopType::Yoyo)
///     .id("intro");
/// assert_eq!(params.property_count(), 2);
/// ```
#[derive(Default)]
pub struct TweenParams {
    pub(crate) properties: Vec<Box<dyn PropertyRequest>>,
    pub(crate) duration: Option<f32>,
    pub(crate) ease: Option<Ease>,
    pub(crate) overshoot_or_amplitude: Option<f32>,
    pub(crate) period: Option<f32>,
    pub(crate) delay: f32,
    pub(crate) loops: Loops,
    pub(crate) loop_type: Option<LoopType>,
    pub(crate) auto_kill: Option<bool>,
    pub(crate) time_scale: f32,
    pub(crate) channel: Option<UpdateChannel>,
    pub(crate) string_id: Option<String>,
    pub(crate) int_id: Option<i32>,
    pub(crate) relative: bool,
    pub(crate) pixel_perfect: bool,
    pub(crate) speed_based: bool,
    pub(crate) callbacks: Callbacks,
}

impl TweenParams {
    pub fn new() -> Self {
        Self {
            time_scale: 1.0,
            ..Default::default()
        }
    }

    /// Animate `name` to `value` (or by `value` when the bag is relative)
    pub fn prop<V: 'static>(mut self, name: impl Into<String>, value: V) -> Self {
        self.properties.push(Box::new(TypedRequest {
            name: name.into(),
            value,
            relative: None,
        }));
        self
    }

    /// Animate `name` by `offset`, whatever the bag's relative flag says
    pub fn prop_by<V: 'static>(mut self, name: impl Into<String>, offset: V) -> Self {
        self.properties.push(Box::new(TypedRequest {
            name: name.into(),
            value: offset,
            relative: Some(true),
        }));
        self
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// Override the duration passed to the creation call
    ///
    /// For speed-based tweens this is a speed in units per second.
    pub fn duration(mut self, seconds: f32) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = Some(ease);
        self
    }

    /// Overshoot for Back eases, amplitude for Elastic eases
    pub fn overshoot_or_amplitude(mut self, value: f32) -> Self {
        self.overshoot_or_amplitude = Some(value);
        self
    }

    /// Elastic period
    pub fn period(mut self, period: f32) -> Self {
        self.period = Some(period);
        self
    }

    pub fn delay(mut self, seconds: f32) -> Self {
        self.delay = seconds;
        self
    }

    pub fn loops(mut self, loops: u32) -> Self {
        self.loops = Loops::Finite(loops);
        self
    }

    pub fn loops_infinite(mut self) -> Self {
        self.loops = Loops::Infinite;
        self
    }

    pub fn loop_type(mut self, loop_type: LoopType) -> Self {
        self.loop_type = Some(loop_type);
        self
    }

    pub fn auto_kill(mut self, auto_kill: bool) -> Self {
        self.auto_kill = Some(auto_kill);
        self
    }

    pub fn time_scale(mut self, scale: f32) -> Self {
        self.time_scale = scale;
        self
    }

    pub fn channel(mut self, channel: UpdateChannel) -> Self {
        self.channel = Some(channel);
        self
    }

    /// String id used by filtered control calls
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.string_id = Some(id.into());
        self
    }

    pub fn int_id(mut self, id: i32) -> Self {
        self.int_id = Some(id);
        self
    }

    /// Treat `prop` values as offsets from the current value
    pub fn relative(mut self, relative: bool) -> Self {
        self.relative = relative;
        self
    }

    /// Truncate written values toward zero
    pub fn pixel_perfect(mut self, pixel_perfect: bool) -> Self {
        self.pixel_perfect = pixel_perfect;
        self
    }

    /// Interpret the duration as a speed in units per second
    pub fn speed_based(mut self, speed_based: bool) -> Self {
        self.speed_based = speed_based;
        self
    }

    pub fn on_start(mut self, f: impl FnMut(&TweenEvent) + 'static) -> Self {
        let callback: TweenCallback = Box::new(f);
        self.callbacks.on_start = Some(callback);
        self
    }

    pub fn on_update(mut self, f: impl FnMut(&TweenEvent) + 'static) -> Self {
        let callback: TweenCallback = Box::new(f);
        self.callbacks.on_update = Some(callback);
        self
    }

    pub fn on_step_complete(mut self, f: impl FnMut(&TweenEvent) + 'static) -> Self {
        let callback: TweenCallback = Box::new(f);
        self.callbacks.on_step_complete = Some(callback);
        self
    }

    /// Called after the update pass in which the tween completed
    pub fn on_complete(mut self, f: impl FnMut(&mut TweenEngine, &TweenEvent) + 'static) -> Self {
        let callback: CompleteCallback = Rc::new(RefCell::new(f));
        self.callbacks.on_complete = Some(callback);
        self
    }

    /// User data handed to every callback through `TweenEvent::data`
    pub fn event_data<T: 'static>(mut self, data: T) -> Self {
        let data: Rc<dyn Any> = Rc::new(data);
        self.callbacks.data = Some(data);
        self
    }

    pub(crate) fn ease_config(&self, config: &EngineConfig) -> EaseConfig {
        EaseConfig {
            ease: self.ease.unwrap_or(config.ease),
            overshoot_or_amplitude: self
                .overshoot_or_amplitude
                .unwrap_or(config.overshoot_or_amplitude),
            period: self.period.unwrap_or(config.period),
        }
    }

    fn validate_timing(&self) -> Result<()> {
        if self.loops == Loops::Finite(0) {
            return Err(TweenError::InvalidParams("loops must be at least 1".into()));
        }
        if !non_negative(self.delay) {
            return Err(TweenError::InvalidParams(format!(
                "delay must be non-negative, got {}",
                self.delay
            )));
        }
        if !non_negative(self.time_scale) {
            return Err(TweenError::InvalidParams(format!(
                "time scale must be non-negative, got {}",
                self.time_scale
            )));
        }
        Ok(())
    }

    /// Reject bags that cannot describe a tweener
    pub(crate) fn validate_tween(&self, duration: f32) -> Result<()> {
        self.validate_timing()?;
        if self.properties.is_empty() {
            return Err(TweenError::InvalidParams("no properties to tween".into()));
        }
        let mut seen = FxHashSet::default();
        for request in &self.properties {
            if !seen.insert(request.name()) {
                return Err(TweenError::InvalidParams(format!(
                    "property '{}' given twice",
                    request.name()
                )));
            }
        }
        if self.speed_based {
            if !(non_negative(duration) && duration != 0.0) {
                return Err(TweenError::InvalidParams(format!(
                    "speed must be positive, got {}",
                    duration
                )));
            }
        } else {
            if !non_negative(duration) {
                return Err(TweenError::InvalidParams(format!(
                    "duration must be non-negative, got {}",
                    duration
                )));
            }
            if duration == 0.0 && self.loops.is_infinite() {
                return Err(TweenError::InvalidParams(
                    "infinite loops need a non-zero duration".into(),
                ));
            }
        }
        Ok(())
    }

    /// Reject bags that cannot describe a sequence
    pub(crate) fn validate_sequence(&self) -> Result<()> {
        self.validate_timing()?;
        if !self.properties.is_empty() {
            return Err(TweenError::InvalidParams(
                "sequences do not animate properties".into(),
            ));
        }
        if self.duration.is_some() || self.speed_based {
            return Err(TweenError::InvalidParams(
                "sequence duration comes from its children".into(),
            ));
        }
        Ok(())
    }

    /// Move the timing settings and callbacks into a fresh core
    pub(crate) fn take_core(&mut self, config: &EngineConfig, duration: f32) -> TweenCore {
        let mut core = TweenCore::new(duration).with_delay(self.delay);
        core.string_id = self.string_id.take();
        core.int_id = self.int_id;
        core.loops = self.loops;
        core.loop_type = self.loop_type.unwrap_or(config.loop_type);
        core.channel = self.channel.unwrap_or(config.channel);
        core.time_scale = self.time_scale;
        core.auto_kill = self.auto_kill.unwrap_or(config.auto_kill);
        core.callbacks = std::mem::take(&mut self.callbacks);
        core
    }

    pub(crate) fn take_properties(&mut self) -> Vec<Box<dyn PropertyRequest>> {
        std::mem::take(&mut self.properties)
    }
}

/// False for negative values and NaN
fn non_negative(value: f32) -> bool {
    value >= 0.0
}

impl std::fmt::Debug for TweenParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TweenParams")
            .field(
                "properties",
                &self.properties.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("duration", &self.duration)
            .field("ease", &self.ease)
            .field("delay", &self.delay)
            .field("loops", &self.loops)
            .field("loop_type", &self.loop_type)
            .field("string_id", &self.string_id)
            .field("int_id", &self.int_id)
            .field("relative", &self.relative)
            .finish()
    }
}
