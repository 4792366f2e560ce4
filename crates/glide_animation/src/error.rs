//! Error types for tween creation and sequence building

use glide_core::BindError;
use thiserror::Error;

/// Errors reported when building tweens or sequences
///
/// Per-frame failures never surface here: once a tween is registered, access
/// problems are handled inside the update pass (see `Tweener`).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TweenError {
    /// A property name did not resolve on the target
    #[error(transparent)]
    Bind(#[from] BindError),

    /// No value plugin is registered for the property's value type
    #[error("no value plugin for property '{property}' ({value_type})")]
    NoPlugin {
        property: String,
        value_type: &'static str,
    },

    /// Contradictory or out-of-range parameters
    #[error("invalid tween parameters: {0}")]
    InvalidParams(String),

    /// Sequences need a finite span for every child
    #[error("infinitely looping components cannot be nested in a sequence")]
    InfiniteChild,

    /// Speed-based durations are only known at startup
    #[error("speed-based tweens cannot be nested in a sequence")]
    SpeedBasedChild,
}

pub type Result<T> = std::result::Result<T, TweenError>;
