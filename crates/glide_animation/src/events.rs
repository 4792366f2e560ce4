//! Tween events and callbacks
//!
//! `on_start`, `on_update` and `on_step_complete` fire synchronously while a
//! component updates, so they only see the event. `on_complete` is buffered
//! during the update pass and dispatched afterwards with the engine itself,
//! which is what lets a completion handler create, kill or restart tweens.

use crate::engine::TweenEngine;
use crate::scheduler::TweenId;
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

/// Synchronous callback (start, update, step complete)
pub type TweenCallback = Box<dyn FnMut(&TweenEvent)>;

/// Deferred completion callback, invoked with the engine after the update pass
pub type CompleteCallback = Rc<RefCell<dyn FnMut(&mut TweenEngine, &TweenEvent)>>;

/// Snapshot of a component passed to callbacks
#[derive(Clone, Debug)]
pub struct TweenEvent {
    /// Registry handle; `None` for children nested in a sequence
    pub tween: Option<TweenId>,
    pub string_id: Option<String>,
    pub int_id: Option<i32>,
    /// Position inside the current loop, in seconds
    pub elapsed: f32,
    /// Total time including completed loops, in seconds
    pub full_elapsed: f32,
    pub completed_loops: u32,
    data: Option<Rc<dyn Any>>,
}

impl TweenEvent {
    /// User data attached with `TweenParams::event_data`
    pub fn data<T: 'static>(&self) -> Option<&T> {
        self.data.as_deref().and_then(|data| data.downcast_ref::<T>())
    }
}

/// Callbacks and user data owned by one component
#[derive(Default)]
pub(crate) struct Callbacks {
    pub(crate) on_start: Option<TweenCallback>,
    pub(crate) on_update: Option<TweenCallback>,
    pub(crate) on_step_complete: Option<TweenCallback>,
    pub(crate) on_complete: Option<CompleteCallback>,
    pub(crate) data: Option<Rc<dyn Any>>,
}

impl Callbacks {
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

/// A completion waiting for end-of-pass dispatch
pub(crate) struct Completion {
    pub(crate) callback: CompleteCallback,
    pub(crate) event: TweenEvent,
}

/// Per-call scratch state threaded through component updates
#[derive(Default)]
pub(crate) struct UpdateCtx {
    /// Completions raised during this pass, in the order they happened
    pub(crate) completions: Vec<Completion>,
    /// Suppress every callback (rewinds, silent completes, from-priming)
    pub(crate) silent: bool,
}

impl UpdateCtx {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn silent() -> Self {
        Self {
            completions: Vec::new(),
            silent: true,
        }
    }

    /// Run `f` with callbacks suppressed, restoring the previous mode afterwards
    pub(crate) fn quietly<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let was_silent = std::mem::replace(&mut self.silent, true);
        let result = f(self);
        self.silent = was_silent;
        result
    }
}

pub(crate) fn event_with_data(
    tween: Option<TweenId>,
    string_id: Option<String>,
    int_id: Option<i32>,
    elapsed: f32,
    full_elapsed: f32,
    completed_loops: u32,
    data: Option<Rc<dyn Any>>,
) -> TweenEvent {
    TweenEvent {
        tween,
        string_id,
        int_id,
        elapsed,
        full_elapsed,
        completed_loops,
        data,
    }
}
