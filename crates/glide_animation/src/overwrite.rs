//! Overwrite manager
//!
//! Resolves conflicts when a new tweener animates a property that a
//! registered one already drives.

use crate::component::TweenComponent;
use crate::tween::Phase;
use crate::tweener::Tweener;
use serde::{Deserialize, Serialize};

/// What to do with the older tween on a (target, property) conflict
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverwriteMode {
    /// Kill the whole older tween
    #[default]
    KillTween,
    /// Only drop the conflicting property; kill the tween if nothing is left
    KillProperty,
    /// Let both run
    AllowAll,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverwriteConfig {
    pub enabled: bool,
    pub mode: OverwriteMode,
    pub log_overwrites: bool,
}

impl OverwriteConfig {
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn mode(mut self, mode: OverwriteMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn log_overwrites(mut self, log: bool) -> Self {
        self.log_overwrites = log;
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct OverwriteManager {
    config: OverwriteConfig,
}

impl OverwriteManager {
    pub fn new(config: OverwriteConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OverwriteConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.config.enabled && self.config.mode != OverwriteMode::AllowAll
    }

    /// Resolve conflicts between `incoming` and the registered components
    ///
    /// Only live top-level tweeners are considered. Returns the number of
    /// conflicting properties found. Killed tweens are left in place for
    /// the caller to purge.
    pub(crate) fn resolve<'a>(
        &self,
        incoming: &Tweener,
        registered: impl Iterator<Item = &'a mut TweenComponent>,
    ) -> usize {
        if !self.is_active() {
            return 0;
        }

        let target = incoming.target();
        let mut conflicts = 0;
        for component in registered {
            let TweenComponent::Tweener(existing) = component else {
                continue;
            };
            if matches!(existing.core.phase, Phase::Complete | Phase::Killed)
                || existing.target() != target
            {
                continue;
            }

            for property in incoming.properties() {
                if !existing.animates(target, property) {
                    continue;
                }
                conflicts += 1;
                if self.config.log_overwrites {
                    tracing::debug!(
                        "overwrite on {} '{}' ({:?})",
                        target,
                        property,
                        self.config.mode
                    );
                }

                match self.config.mode {
                    OverwriteMode::KillTween => {
                        existing.kill();
                        break;
                    }
                    OverwriteMode::KillProperty => {
                        existing.remove_property(property);
                        if existing.plugin_count() == 0 {
                            existing.kill();
                            break;
                        }
                    }
                    OverwriteMode::AllowAll => {}
                }
            }
        }
        conflicts
    }
}
