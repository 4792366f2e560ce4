//! Shared timing state for tweeners and sequences
//!
//! `TweenCore` owns everything both component kinds have in common: loop
//! bookkeeping, the delay, play direction, pause flag, ids and callbacks.
//! Its `seek` maps a total elapsed time onto a loop index and a position
//! inside that loop; the component decides what to do with that position.

use crate::events::{event_with_data, Callbacks, Completion, TweenEvent, UpdateCtx};
use crate::scheduler::TweenId;
use serde::{Deserialize, Serialize};

/// Which tick call advances a component
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdateChannel {
    #[default]
    Update,
    LateUpdate,
    FixedUpdate,
    /// Driven by wall-clock time through `TweenEngine::tick_realtime`
    TimeScaleIndependent,
}

/// What happens when a loop ends and another one begins
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoopType {
    /// Jump back to the start
    #[default]
    Restart,
    /// Play odd loops backwards
    Yoyo,
    /// Shift start and end by the change on every loop
    Incremental,
}

/// Number of times a component plays
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Loops {
    Finite(u32),
    Infinite,
}

impl Default for Loops {
    fn default() -> Self {
        Loops::Finite(1)
    }
}

impl Loops {
    pub fn is_infinite(&self) -> bool {
        matches!(self, Loops::Infinite)
    }
}

/// Play direction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    pub fn sign(self) -> f32 {
        match self {
            Direction::Forward => 1.0,
            Direction::Backward => -1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

/// Observable lifecycle state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TweenState {
    /// Waiting for the delay to elapse
    Delayed,
    Playing,
    Paused,
    /// Reached the end of its last loop and was kept alive
    Complete,
    /// Dead; never returned by a live registry
    Killed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    Delayed,
    Playing,
    Complete,
    Killed,
}

/// Result of moving the playhead
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Step {
    /// Signed change of the loop index
    pub(crate) loop_diff: i64,
    /// Loops finished by this move
    pub(crate) loops_completed: u32,
    /// The final loop's end was reached
    pub(crate) complete: bool,
}

pub struct TweenCore {
    pub(crate) id: Option<TweenId>,
    pub(crate) string_id: Option<String>,
    pub(crate) int_id: Option<i32>,
    pub(crate) duration: f32,
    pub(crate) delay: f32,
    pub(crate) loops: Loops,
    pub(crate) loop_type: LoopType,
    pub(crate) channel: UpdateChannel,
    pub(crate) time_scale: f32,
    pub(crate) auto_kill: bool,
    pub(crate) phase: Phase,
    pub(crate) paused: bool,
    pub(crate) direction: Direction,
    /// Start values have been captured
    pub(crate) started: bool,
    pub(crate) start_fired: bool,
    pub(crate) callbacks: Callbacks,
    delay_elapsed: f32,
    full_elapsed: f32,
    elapsed: f32,
    completed_loops: u32,
    loop_index: u32,
}

impl TweenCore {
    pub(crate) fn new(duration: f32) -> Self {
        Self {
            id: None,
            string_id: None,
            int_id: None,
            duration,
            delay: 0.0,
            loops: Loops::default(),
            loop_type: LoopType::default(),
            channel: UpdateChannel::default(),
            time_scale: 1.0,
            auto_kill: true,
            phase: Phase::Playing,
            paused: false,
            direction: Direction::Forward,
            started: false,
            start_fired: false,
            callbacks: Callbacks::default(),
            delay_elapsed: 0.0,
            full_elapsed: 0.0,
            elapsed: 0.0,
            completed_loops: 0,
            loop_index: 0,
        }
    }

    /// Set the delay and enter the matching initial phase
    pub(crate) fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self.phase = if delay > 0.0 {
            Phase::Delayed
        } else {
            Phase::Playing
        };
        self
    }

    pub fn state(&self) -> TweenState {
        match self.phase {
            Phase::Killed => TweenState::Killed,
            Phase::Complete => TweenState::Complete,
            _ if self.paused => TweenState::Paused,
            Phase::Delayed => TweenState::Delayed,
            Phase::Playing => TweenState::Playing,
        }
    }

    /// Delayed or playing, and not paused
    pub(crate) fn is_active(&self) -> bool {
        !self.paused && matches!(self.phase, Phase::Delayed | Phase::Playing)
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn delay(&self) -> f32 {
        self.delay
    }

    /// Duration times loops, `None` when looping forever
    pub fn full_duration(&self) -> Option<f32> {
        match self.loops {
            Loops::Finite(n) => Some(self.duration * n as f32),
            Loops::Infinite => None,
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn full_elapsed(&self) -> f32 {
        self.full_elapsed
    }

    pub fn completed_loops(&self) -> u32 {
        self.completed_loops
    }

    pub(crate) fn loop_index(&self) -> u32 {
        self.loop_index
    }

    pub fn loops(&self) -> Loops {
        self.loops
    }

    pub fn loop_type(&self) -> LoopType {
        self.loop_type
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn channel(&self) -> UpdateChannel {
        self.channel
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn auto_kill(&self) -> bool {
        self.auto_kill
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn string_id(&self) -> Option<&str> {
        self.string_id.as_deref()
    }

    pub fn int_id(&self) -> Option<i32> {
        self.int_id
    }

    /// Burn `dt` against the remaining delay
    ///
    /// Returns the time left over once the delay is spent, `None` while
    /// still waiting.
    pub(crate) fn consume_delay(&mut self, dt: f32) -> Option<f32> {
        if self.phase != Phase::Delayed {
            return Some(dt);
        }
        self.delay_elapsed += dt;
        if self.delay_elapsed < self.delay {
            return None;
        }
        let rest = self.delay_elapsed - self.delay;
        self.delay_elapsed = self.delay;
        self.phase = Phase::Playing;
        Some(rest)
    }

    /// Skip whatever is left of the delay
    pub(crate) fn skip_delay(&mut self) {
        if self.phase == Phase::Delayed {
            self.delay_elapsed = self.delay;
            self.phase = Phase::Playing;
        }
    }

    /// Move the playhead to `target` seconds of total elapsed time
    pub(crate) fn seek(&mut self, target: f32) -> Step {
        let prev_index = self.loop_index;
        let prev_completed = self.completed_loops;

        let mut full = target.max(0.0);
        let mut complete = false;
        if let Some(full_duration) = self.full_duration() {
            if full >= full_duration {
                full = full_duration;
                complete = true;
            }
        }
        self.full_elapsed = full;

        let local = if complete {
            let loops = match self.loops {
                Loops::Finite(n) => n,
                Loops::Infinite => 1,
            };
            self.completed_loops = loops;
            self.loop_index = loops.saturating_sub(1);
            self.duration
        } else if self.duration <= 0.0 {
            self.completed_loops = 0;
            self.loop_index = 0;
            0.0
        } else {
            let index = (full / self.duration).floor() as u32;
            self.completed_loops = index;
            self.loop_index = index;
            (full - index as f32 * self.duration).clamp(0.0, self.duration)
        };

        self.elapsed = if self.loop_type == LoopType::Yoyo && self.loop_index % 2 == 1 {
            self.duration - local
        } else {
            local
        };

        if self.phase == Phase::Complete && !complete {
            self.phase = Phase::Playing;
        }

        Step {
            loop_diff: self.loop_index as i64 - prev_index as i64,
            loops_completed: self.completed_loops.saturating_sub(prev_completed),
            complete,
        }
    }

    /// Return the playhead to zero without touching loop bookkeeping
    ///
    /// The next `seek(0.0)` recomputes the loop index, which is how
    /// incremental shifts get undone.
    pub(crate) fn reset_time(&mut self, skip_delay: bool) {
        self.full_elapsed = 0.0;
        self.direction = Direction::Forward;
        if skip_delay || self.delay <= 0.0 {
            self.delay_elapsed = self.delay;
            self.phase = Phase::Playing;
        } else {
            self.delay_elapsed = 0.0;
            self.phase = Phase::Delayed;
        }
    }

    /// Forget the loop index so the next seek does not shift values
    pub(crate) fn clear_loop_index(&mut self) {
        self.loop_index = 0;
        self.completed_loops = 0;
    }

    pub(crate) fn event(&self) -> TweenEvent {
        event_with_data(
            self.id,
            self.string_id.clone(),
            self.int_id,
            self.elapsed,
            self.full_elapsed,
            self.completed_loops,
            self.callbacks.data.clone(),
        )
    }

    /// Fire `on_start` the first time the component actually plays
    pub(crate) fn fire_start_once(&mut self, ctx: &UpdateCtx) {
        if self.start_fired || ctx.silent {
            return;
        }
        self.start_fired = true;
        let event = self.event();
        if let Some(on_start) = self.callbacks.on_start.as_mut() {
            on_start(&event);
        }
    }

    /// Fire per-step callbacks and settle completion after a seek
    ///
    /// Returns true when this step completed the component.
    pub(crate) fn after_step(&mut self, step: Step, ctx: &mut UpdateCtx) -> bool {
        if step.complete {
            self.phase = Phase::Complete;
        }

        if !ctx.silent {
            let event = self.event();
            if let Some(on_update) = self.callbacks.on_update.as_mut() {
                on_update(&event);
            }
            if step.loops_completed > 0 {
                if let Some(on_step) = self.callbacks.on_step_complete.as_mut() {
                    on_step(&event);
                }
            }
            if step.complete {
                if let Some(callback) = &self.callbacks.on_complete {
                    ctx.completions.push(Completion {
                        callback: callback.clone(),
                        event,
                    });
                }
            }
        }

        step.complete
    }
}

impl std::fmt::Debug for TweenCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TweenCore")
            .field("id", &self.id)
            .field("string_id", &self.string_id)
            .field("int_id", &self.int_id)
            .field("state", &self.state())
            .field("duration", &self.duration)
            .field("loops", &self.loops)
            .field("loop_type", &self.loop_type)
            .field("full_elapsed", &self.full_elapsed)
            .field("direction", &self.direction)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core(duration: f32, loops: Loops, loop_type: LoopType) -> TweenCore {
        let mut core = TweenCore::new(duration);
        core.loops = loops;
        core.loop_type = loop_type;
        core
    }

    #[test]
    fn test_seek_single_loop() {
        let mut core = core(2.0, Loops::Finite(1), LoopType::Restart);

        let step = core.seek(0.5);
        assert_eq!(core.elapsed(), 0.5);
        assert!(!step.complete);

        let step = core.seek(3.0);
        assert!(step.complete);
        assert_eq!(core.full_elapsed(), 2.0);
        assert_eq!(core.elapsed(), 2.0);
        assert_eq!(core.completed_loops(), 1);
        assert_eq!(step.loops_completed, 1);
    }

    #[test]
    fn test_seek_restart_loops() {
        let mut core = core(1.0, Loops::Finite(3), LoopType::Restart);

        let step = core.seek(1.25);
        assert_eq!(core.completed_loops(), 1);
        assert_eq!(step.loop_diff, 1);
        assert!((core.elapsed() - 0.25).abs() < 1e-5);

        let step = core.seek(3.0);
        assert!(step.complete);
        assert_eq!(core.completed_loops(), 3);
        assert_eq!(core.elapsed(), 1.0);
        assert_eq!(step.loop_diff, 1);
    }

    #[test]
    fn test_seek_yoyo_reverses_odd_loops() {
        let mut core = core(1.0, Loops::Finite(2), LoopType::Yoyo);

        core.seek(1.25);
        assert!((core.elapsed() - 0.75).abs() < 1e-5);

        core.seek(2.0);
        assert_eq!(core.elapsed(), 0.0);
        assert_eq!(core.state(), TweenState::Playing);
    }

    #[test]
    fn test_seek_backward_reports_negative_diff() {
        let mut core = core(1.0, Loops::Infinite, LoopType::Incremental);

        core.seek(2.5);
        let step = core.seek(0.5);
        assert_eq!(step.loop_diff, -2);
        assert_eq!(step.loops_completed, 0);
    }

    #[test]
    fn test_zero_duration_completes_immediately() {
        let mut core = core(0.0, Loops::Finite(1), LoopType::Restart);

        let step = core.seek(0.0);
        assert!(step.complete);
        assert_eq!(core.full_elapsed(), 0.0);
    }

    #[test]
    fn test_delay_consumption() {
        let mut core = TweenCore::new(1.0).with_delay(0.5);
        assert_eq!(core.state(), TweenState::Delayed);

        assert_eq!(core.consume_delay(0.3), None);
        let rest = core.consume_delay(0.3).unwrap();
        assert!((rest - 0.1).abs() < 1e-5);
        assert_eq!(core.state(), TweenState::Playing);
        assert_eq!(core.consume_delay(0.2), Some(0.2));
    }

    #[test]
    fn test_reset_time_restores_delay() {
        let mut core = TweenCore::new(1.0).with_delay(0.5);
        core.skip_delay();
        core.seek(0.7);
        core.direction = Direction::Backward;

        core.reset_time(false);
        assert_eq!(core.state(), TweenState::Delayed);
        assert_eq!(core.full_elapsed(), 0.0);
        assert_eq!(core.direction(), Direction::Forward);

        core.reset_time(true);
        assert_eq!(core.state(), TweenState::Playing);
    }

    #[test]
    fn test_after_step_fires_callbacks() {
        use std::cell::Cell;
        use std::rc::Rc;

        let updates = Rc::new(Cell::new(0));
        let steps = Rc::new(Cell::new(0));
        let mut core = core(1.0, Loops::Finite(2), LoopType::Restart);
        let counter = updates.clone();
        core.callbacks.on_update = Some(Box::new(move |_| counter.set(counter.get() + 1)));
        let counter = steps.clone();
        core.callbacks.on_step_complete = Some(Box::new(move |_| counter.set(counter.get() + 1)));

        let mut ctx = UpdateCtx::new();
        let step = core.seek(1.5);
        assert!(!core.after_step(step, &mut ctx));
        let step = core.seek(2.0);
        assert!(core.after_step(step, &mut ctx));

        assert_eq!(updates.get(), 2);
        assert_eq!(steps.get(), 2);
        assert_eq!(core.state(), TweenState::Complete);

        let mut silent = UpdateCtx::silent();
        let step = core.seek(0.5);
        core.after_step(step, &mut silent);
        assert_eq!(updates.get(), 2);
        assert_eq!(core.state(), TweenState::Playing);
    }
}
