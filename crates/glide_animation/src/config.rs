//! Engine configuration
//!
//! Defaults applied to tweens that do not set a value themselves, plus
//! engine-wide behavior. Serializable so hosts can keep it next to their own
//! settings files.

use crate::easing::{Ease, DEFAULT_OVERSHOOT_OR_AMPLITUDE, DEFAULT_PERIOD};
use crate::overwrite::OverwriteConfig;
use crate::tween::{LoopType, UpdateChannel};
use serde::{Deserialize, Serialize};

/// How much the engine reports about unresolvable requests
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WarningLevel {
    None,
    #[default]
    Important,
    Verbose,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub ease: Ease,
    pub overshoot_or_amplitude: f32,
    pub period: f32,
    pub loop_type: LoopType,
    pub channel: UpdateChannel,
    pub auto_kill: bool,
    /// Keep the registry (and its pump) alive when no tweens are left
    pub persist_when_empty: bool,
    pub warning_level: WarningLevel,
    pub overwrite: OverwriteConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ease: Ease::default(),
            overshoot_or_amplitude: DEFAULT_OVERSHOOT_OR_AMPLITUDE,
            period: DEFAULT_PERIOD,
            loop_type: LoopType::default(),
            channel: UpdateChannel::default(),
            auto_kill: true,
            persist_when_empty: false,
            warning_level: WarningLevel::default(),
            overwrite: OverwriteConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn overshoot_or_amplitude(mut self, value: f32) -> Self {
        self.overshoot_or_amplitude = value;
        self
    }

    pub fn period(mut self, period: f32) -> Self {
        self.period = period;
        self
    }

    pub fn loop_type(mut self, loop_type: LoopType) -> Self {
        self.loop_type = loop_type;
        self
    }

    pub fn channel(mut self, channel: UpdateChannel) -> Self {
        self.channel = channel;
        self
    }

    pub fn auto_kill(mut self, auto_kill: bool) -> Self {
        self.auto_kill = auto_kill;
        self
    }

    pub fn persist_when_empty(mut self, persist: bool) -> Self {
        self.persist_when_empty = persist;
        self
    }

    pub fn warning_level(mut self, level: WarningLevel) -> Self {
        self.warning_level = level;
        self
    }

    pub fn overwrite(mut self, overwrite: OverwriteConfig) -> Self {
        self.overwrite = overwrite;
        self
    }
}
