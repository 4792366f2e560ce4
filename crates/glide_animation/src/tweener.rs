//! Leaf tween: one target, one plugin per animated property

use crate::events::UpdateCtx;
use crate::plugin::ValuePlugin;
use crate::tween::{LoopType, Phase, TweenCore};
use glide_core::{AccessError, TargetId};
use smallvec::SmallVec;

/// Outcome of capturing start values
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Startup {
    Ready,
    /// Target busy this frame, try again on the next update
    Retry,
    /// Target is gone and the component killed itself
    Dead,
}

/// Animates the properties of a single target
pub struct Tweener {
    pub(crate) core: TweenCore,
    target: TargetId,
    plugins: SmallVec<[Box<dyn ValuePlugin>; 2]>,
    /// Duration holds a speed until startup converts it
    speed_based: bool,
    is_from: bool,
}

impl Tweener {
    pub(crate) fn new(
        core: TweenCore,
        target: TargetId,
        plugins: SmallVec<[Box<dyn ValuePlugin>; 2]>,
        speed_based: bool,
        is_from: bool,
    ) -> Self {
        Self {
            core,
            target,
            plugins,
            speed_based,
            is_from,
        }
    }

    pub fn core(&self) -> &TweenCore {
        &self.core
    }

    pub fn target(&self) -> TargetId {
        self.target
    }

    /// Names of the properties still animated
    pub fn properties(&self) -> impl Iterator<Item = &str> {
        self.plugins.iter().map(|plugin| plugin.property())
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_from(&self) -> bool {
        self.is_from
    }

    /// Duration is still a speed waiting to be converted
    pub fn is_speed_based(&self) -> bool {
        self.speed_based
    }

    /// Check whether this tweener animates `property` on `target`
    pub(crate) fn animates(&self, target: TargetId, property: &str) -> bool {
        self.target == target && self.plugins.iter().any(|p| p.property() == property)
    }

    /// Drop the plugin for `property`, returning true if one was removed
    pub(crate) fn remove_property(&mut self, property: &str) -> bool {
        let before = self.plugins.len();
        self.plugins.retain(|p| p.property() != property);
        self.plugins.len() != before
    }

    pub(crate) fn startup(&mut self) -> Startup {
        let failure = self
            .plugins
            .iter_mut()
            .find_map(|plugin| plugin.startup().err());
        match failure {
            None => {}
            Some(AccessError::TargetBorrowed) => {
                tracing::warn!("{} is borrowed, postponing startup", self.target);
                return Startup::Retry;
            }
            Some(AccessError::TargetDropped) => {
                tracing::debug!("{} dropped before startup, killing tweener", self.target);
                self.kill();
                return Startup::Dead;
            }
        }

        if self.speed_based {
            let speed = self.core.duration;
            self.core.duration = self
                .plugins
                .iter()
                .map(|p| p.speed_based_duration(speed))
                .fold(0.0, f32::max);
            self.speed_based = false;
            tracing::trace!(
                "speed {} converted to duration {}",
                speed,
                self.core.duration
            );
        }

        self.core.started = true;
        Startup::Ready
    }

    /// Seek to `full_elapsed` and write every property
    ///
    /// Returns true when the tweener completed or died.
    pub(crate) fn apply(&mut self, full_elapsed: f32, ctx: &mut UpdateCtx) -> bool {
        let step = self.core.seek(full_elapsed);
        if step.loop_diff != 0 && self.core.loop_type == LoopType::Incremental {
            self.set_incremental(step.loop_diff);
        }

        let (elapsed, duration) = (self.core.elapsed(), self.core.duration);
        let mut dropped = false;
        for plugin in self.plugins.iter_mut() {
            match plugin.do_update(elapsed, duration) {
                Ok(()) => {}
                Err(AccessError::TargetBorrowed) => {
                    tracing::warn!(
                        "{} is borrowed, skipping write of '{}'",
                        self.target,
                        plugin.property()
                    );
                }
                Err(AccessError::TargetDropped) => {
                    dropped = true;
                    break;
                }
            }
        }
        if dropped {
            tracing::debug!("{} dropped, killing tweener", self.target);
            self.kill();
            return true;
        }

        self.core.after_step(step, ctx)
    }

    pub(crate) fn set_incremental(&mut self, loop_diff: i64) {
        for plugin in self.plugins.iter_mut() {
            plugin.set_incremental(loop_diff);
        }
    }

    pub(crate) fn set_incremental_restart(&mut self) {
        for plugin in self.plugins.iter_mut() {
            if let Err(err) = plugin.set_incremental_restart() {
                tracing::warn!(
                    "could not rebase '{}' on {}: {}",
                    plugin.property(),
                    self.target,
                    err
                );
            }
        }
    }

    /// Terminal; releases plugins and callbacks
    pub(crate) fn kill(&mut self) {
        self.core.phase = Phase::Killed;
        self.plugins.clear();
        self.core.callbacks.clear();
    }
}

impl std::fmt::Debug for Tweener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tweener")
            .field("core", &self.core)
            .field("target", &self.target)
            .field("properties", &self.properties().collect::<Vec<_>>())
            .field("is_from", &self.is_from)
            .finish()
    }
}
