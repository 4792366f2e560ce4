//! Tween engine
//!
//! The host-facing entry point. Owns the property and plugin registries, the
//! overwrite manager and the scheduler, and runs the two-phase tick: update
//! every component first, then dispatch the completions that pass raised.

use crate::component::TweenComponent;
use crate::config::{EngineConfig, WarningLevel};
use crate::error::{Result, TweenError};
use crate::events::{Completion, UpdateCtx};
use crate::overwrite::{OverwriteConfig, OverwriteManager};
use crate::params::{ResolveCtx, TweenParams};
use crate::plugin::{PluginFactory, PluginRegistry};
use crate::scheduler::{FilterOp, Scheduler, TweenFilter, TweenId};
use crate::sequence::Sequence;
use crate::tween::UpdateChannel;
use crate::tweener::Tweener;
use glide_core::{PropertyRegistry, TargetId};
use smallvec::SmallVec;
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Create the scheduler for a new pump generation if none is running
fn ensure_scheduler<'a>(slot: &'a mut Option<Scheduler>, generation: &mut u64) -> &'a mut Scheduler {
    slot.get_or_insert_with(|| {
        *generation += 1;
        tracing::debug!("tween pump generation {} started", generation);
        Scheduler::new(*generation)
    })
}

pub struct TweenEngine {
    config: EngineConfig,
    properties: PropertyRegistry,
    plugins: PluginRegistry,
    overwrite: OverwriteManager,
    scheduler: Option<Scheduler>,
    generation: u64,
    pending: VecDeque<Completion>,
    dispatching: bool,
}

impl Default for TweenEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TweenEngine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            overwrite: OverwriteManager::new(config.overwrite.clone()),
            config,
            properties: PropertyRegistry::new(),
            plugins: PluginRegistry::with_defaults(),
            scheduler: None,
            generation: 0,
            pending: VecDeque::new(),
            dispatching: false,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn properties(&self) -> &PropertyRegistry {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut PropertyRegistry {
        &mut self.properties
    }

    /// Make `name` animatable on targets of type `T`
    pub fn register_property<T: 'static, V: 'static>(
        &mut self,
        name: impl Into<String>,
        get: fn(&T) -> V,
        set: fn(&mut T, V),
    ) {
        self.properties.register(name, get, set);
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    /// Register (or replace) the plugin factory for value type `V`
    pub fn register_plugin<V: 'static>(&mut self, factory: PluginFactory<V>) {
        self.plugins.register(factory);
    }

    pub fn set_overwrite(&mut self, overwrite: OverwriteConfig) {
        self.overwrite = OverwriteManager::new(overwrite.clone());
        self.config.overwrite = overwrite;
    }

    // Creation

    /// Tween `property` of `target` to `end` over `duration` seconds
    pub fn to<T: 'static, V: 'static>(
        &mut self,
        target: &Rc<RefCell<T>>,
        duration: f32,
        property: &str,
        end: V,
    ) -> Option<TweenId> {
        self.create_simple(target, duration, TweenParams::new().prop(property, end), false)
    }

    /// Tween `property` of `target` by `offset` over `duration` seconds
    pub fn to_by<T: 'static, V: 'static>(
        &mut self,
        target: &Rc<RefCell<T>>,
        duration: f32,
        property: &str,
        offset: V,
    ) -> Option<TweenId> {
        self.create_simple(
            target,
            duration,
            TweenParams::new().prop_by(property, offset),
            false,
        )
    }

    /// Jump `property` to `start` and tween back to its current value
    pub fn from<T: 'static, V: 'static>(
        &mut self,
        target: &Rc<RefCell<T>>,
        duration: f32,
        property: &str,
        start: V,
    ) -> Option<TweenId> {
        self.create_simple(target, duration, TweenParams::new().prop(property, start), true)
    }

    /// Jump `property` to its current value plus `offset` and tween back
    pub fn from_by<T: 'static, V: 'static>(
        &mut self,
        target: &Rc<RefCell<T>>,
        duration: f32,
        property: &str,
        offset: V,
    ) -> Option<TweenId> {
        self.create_simple(
            target,
            duration,
            TweenParams::new().prop_by(property, offset),
            true,
        )
    }

    /// Create a tween from a parameter bag
    ///
    /// `Err` for a malformed bag, `Ok(None)` when no property resolved.
    pub fn to_with<T: 'static>(
        &mut self,
        target: &Rc<RefCell<T>>,
        duration: f32,
        params: TweenParams,
    ) -> Result<Option<TweenId>> {
        self.create(target, duration, params, false)
    }

    /// Create a from-tween from a parameter bag
    pub fn from_with<T: 'static>(
        &mut self,
        target: &Rc<RefCell<T>>,
        duration: f32,
        params: TweenParams,
    ) -> Result<Option<TweenId>> {
        self.create(target, duration, params, true)
    }

    /// Build an unregistered tweener for nesting in a sequence
    pub fn build_to<T: 'static>(
        &self,
        target: &Rc<RefCell<T>>,
        duration: f32,
        params: TweenParams,
    ) -> Result<Option<Tweener>> {
        self.build(target, duration, params, false)
    }

    /// Build an unregistered from-tweener for nesting in a sequence
    pub fn build_from<T: 'static>(
        &self,
        target: &Rc<RefCell<T>>,
        duration: f32,
        params: TweenParams,
    ) -> Result<Option<Tweener>> {
        self.build(target, duration, params, true)
    }

    /// Start an empty sequence configured by `params`
    pub fn sequence(&self, mut params: TweenParams) -> Result<Sequence> {
        params.validate_sequence()?;
        Ok(Sequence::new(params.take_core(&self.config, 0.0)))
    }

    /// Register a built sequence
    pub fn add_sequence(&mut self, sequence: Sequence) -> Result<TweenId> {
        let core = sequence.core();
        if core.loops().is_infinite() && core.duration() <= 0.0 {
            return Err(TweenError::InvalidParams(
                "infinite loops need a non-empty sequence".into(),
            ));
        }
        let scheduler = ensure_scheduler(&mut self.scheduler, &mut self.generation);
        Ok(scheduler.register(sequence.into()))
    }

    fn create_simple<T: 'static>(
        &mut self,
        target: &Rc<RefCell<T>>,
        duration: f32,
        params: TweenParams,
        from: bool,
    ) -> Option<TweenId> {
        match self.create(target, duration.max(0.0), params, from) {
            Ok(id) => id,
            Err(err) => {
                self.report(&err);
                None
            }
        }
    }

    fn create<T: 'static>(
        &mut self,
        target: &Rc<RefCell<T>>,
        duration: f32,
        params: TweenParams,
        from: bool,
    ) -> Result<Option<TweenId>> {
        let Some(tweener) = self.build(target, duration, params, from)? else {
            return Ok(None);
        };
        let id = self.register_tweener(tweener);

        if from {
            if let Some(component) = self.scheduler.as_mut().and_then(|s| s.get_mut(id)) {
                component.prime(&mut UpdateCtx::silent());
            }
        }
        Ok(Some(id))
    }

    fn build<T: 'static>(
        &self,
        target: &Rc<RefCell<T>>,
        duration: f32,
        mut params: TweenParams,
        from: bool,
    ) -> Result<Option<Tweener>> {
        let duration = params.duration.unwrap_or(duration);
        params.validate_tween(duration)?;

        let erased: Rc<dyn Any> = target.clone();
        let ctx = ResolveCtx {
            properties: &self.properties,
            plugins: &self.plugins,
            target: erased,
            target_type: TypeId::of::<T>(),
            target_type_name: std::any::type_name::<T>(),
            from,
            relative: params.relative,
            ease: params.ease_config(&self.config),
            pixel_perfect: params.pixel_perfect,
        };

        let mut plugins = SmallVec::new();
        for request in params.take_properties() {
            match request.resolve(&ctx) {
                Ok(plugin) => plugins.push(plugin),
                Err(err) => self.report(&err),
            }
        }
        if plugins.is_empty() {
            return Ok(None);
        }

        let speed_based = params.speed_based;
        let core = params.take_core(&self.config, duration);
        Ok(Some(Tweener::new(
            core,
            TargetId::of(target),
            plugins,
            speed_based,
            from,
        )))
    }

    fn register_tweener(&mut self, tweener: Tweener) -> TweenId {
        let scheduler = ensure_scheduler(&mut self.scheduler, &mut self.generation);
        if self.overwrite.resolve(&tweener, scheduler.components_mut()) > 0 {
            scheduler.purge_killed();
        }
        if self.config.warning_level >= WarningLevel::Verbose {
            tracing::debug!(
                "tween on {} ({} properties, {}s)",
                tweener.target(),
                tweener.plugin_count(),
                tweener.core().duration()
            );
        }
        scheduler.register(tweener.into())
    }

    fn report(&self, err: &TweenError) {
        if self.config.warning_level >= WarningLevel::Important {
            tracing::warn!("tween not created: {}", err);
        }
    }

    // Host integration

    /// Advance every component on `channel` by `elapsed` seconds
    pub fn tick(&mut self, channel: UpdateChannel, elapsed: f32) {
        let Some(scheduler) = self.scheduler.as_mut() else {
            return;
        };
        let mut ctx = UpdateCtx::new();
        scheduler.update(channel, elapsed.max(0.0), &mut ctx);
        self.finish_pass(ctx);
    }

    /// Advance the `TimeScaleIndependent` channel by wall-clock time
    ///
    /// The first call of each pump generation only starts the clock.
    pub fn tick_realtime(&mut self) {
        let Some(elapsed) = self.scheduler.as_mut().and_then(Scheduler::realtime_delta) else {
            return;
        };
        self.tick(UpdateChannel::TimeScaleIndependent, elapsed);
    }

    /// A registry exists and needs ticking
    pub fn is_pumping(&self) -> bool {
        self.scheduler.is_some()
    }

    /// Number of registries created so far
    pub fn pump_generation(&self) -> u64 {
        self.generation
    }

    /// Kill everything without callbacks and stop the pump
    pub fn shutdown(&mut self) {
        if let Some(mut scheduler) = self.scheduler.take() {
            scheduler.clear();
            tracing::debug!("tween pump generation {} shut down", scheduler.generation());
        }
        self.pending.clear();
    }

    fn finish_pass(&mut self, ctx: UpdateCtx) {
        self.pending.extend(ctx.completions);
        self.dispatch_completions();
        self.release_if_empty();
    }

    /// Run queued completion callbacks
    ///
    /// Nested calls only queue; the outermost call drains everything,
    /// including completions raised by the callbacks themselves.
    fn dispatch_completions(&mut self) {
        if self.dispatching {
            return;
        }
        self.dispatching = true;
        while let Some(Completion { callback, event }) = self.pending.pop_front() {
            match callback.try_borrow_mut() {
                Ok(mut on_complete) => (&mut *on_complete)(self, &event),
                Err(_) => tracing::warn!("completion callback re-entered, skipped"),
            }
        }
        self.dispatching = false;
    }

    fn release_if_empty(&mut self) {
        if self.config.persist_when_empty {
            return;
        }
        if self.scheduler.as_ref().is_some_and(Scheduler::is_empty) {
            self.scheduler = None;
            tracing::debug!("tween pump generation {} stopped", self.generation);
        }
    }

    // Control

    fn control(&mut self, filter: TweenFilter, op: FilterOp) -> usize {
        let Some(scheduler) = self.scheduler.as_mut() else {
            return 0;
        };
        let mut ctx = UpdateCtx::new();
        let matched = scheduler.filtered_iteration(&filter, op, &mut ctx);
        tracing::trace!("{:?} matched {} tweens for {:?}", op, matched, filter);
        self.finish_pass(ctx);
        matched
    }

    pub fn pause(&mut self, filter: impl Into<TweenFilter>) -> usize {
        self.control(filter.into(), FilterOp::Pause)
    }

    pub fn play(&mut self, filter: impl Into<TweenFilter>, skip_delay: bool) -> usize {
        self.control(filter.into(), FilterOp::Play { skip_delay })
    }

    pub fn play_forward(&mut self, filter: impl Into<TweenFilter>, skip_delay: bool) -> usize {
        self.control(filter.into(), FilterOp::PlayForward { skip_delay })
    }

    pub fn play_backwards(&mut self, filter: impl Into<TweenFilter>) -> usize {
        self.control(filter.into(), FilterOp::PlayBackwards)
    }

    /// Back to the start value; the paused flag is kept
    pub fn rewind(&mut self, filter: impl Into<TweenFilter>, skip_delay: bool) -> usize {
        self.control(filter.into(), FilterOp::Rewind { skip_delay })
    }

    pub fn restart(&mut self, filter: impl Into<TweenFilter>, skip_delay: bool) -> usize {
        self.control(filter.into(), FilterOp::Restart { skip_delay })
    }

    pub fn reverse(&mut self, filter: impl Into<TweenFilter>) -> usize {
        self.control(filter.into(), FilterOp::Reverse)
    }

    /// Jump to the end, dispatching completion callbacks
    pub fn complete(&mut self, filter: impl Into<TweenFilter>) -> usize {
        self.control(filter.into(), FilterOp::Complete { dispatch: true })
    }

    /// Jump to the end without any callbacks
    pub fn complete_silently(&mut self, filter: impl Into<TweenFilter>) -> usize {
        self.control(filter.into(), FilterOp::Complete { dispatch: false })
    }

    pub fn kill(&mut self, filter: impl Into<TweenFilter>) -> usize {
        self.control(filter.into(), FilterOp::Kill)
    }

    /// Change the time scale of a registered component
    pub fn set_time_scale(&mut self, id: TweenId, scale: f32) -> bool {
        match self.scheduler.as_mut().and_then(|s| s.get_mut(id)) {
            Some(component) if scale >= 0.0 => {
                component.core_mut().time_scale = scale;
                true
            }
            _ => false,
        }
    }

    // Queries

    /// Animating `target` right now (delayed or playing, not paused),
    /// directly or through a sequence
    pub fn is_tweening<T: ?Sized>(&self, target: &Rc<RefCell<T>>) -> bool {
        let target = TargetId::of(target);
        self.scheduler
            .as_ref()
            .is_some_and(|s| s.is_tweening(target))
    }

    /// Any live component references `target`, whatever its state
    pub fn is_linked_to<T: ?Sized>(&self, target: &Rc<RefCell<T>>) -> bool {
        let target = TargetId::of(target);
        self.scheduler
            .as_ref()
            .is_some_and(|s| s.is_linked_to(target))
    }

    /// Number of registered top-level components
    pub fn active_count(&self) -> usize {
        self.scheduler.as_ref().map_or(0, Scheduler::active_count)
    }

    pub fn get(&self, id: TweenId) -> Option<&TweenComponent> {
        self.scheduler.as_ref().and_then(|s| s.get(id))
    }

    /// Registered ids in registration order
    pub fn ids(&self) -> Vec<TweenId> {
        self.scheduler
            .as_ref()
            .map(|s| s.ids().collect())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for TweenEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TweenEngine")
            .field("scheduler", &self.scheduler)
            .field("generation", &self.generation)
            .field("pending", &self.pending.len())
            .field("properties", &self.properties)
            .field("plugins", &self.plugins)
            .finish()
    }
}
