//! Tween components
//!
//! `TweenComponent` is the unit the scheduler and sequences own. Both variants
//! share `TweenCore`; everything that differs (how a position is applied, how
//! startup works, how control calls propagate) is dispatched here.

use crate::events::UpdateCtx;
use crate::sequence::Sequence;
use crate::tween::{Direction, LoopType, Phase, TweenCore, TweenState};
use crate::tweener::{Startup, Tweener};
use glide_core::TargetId;

#[derive(Debug)]
pub enum TweenComponent {
    Tweener(Tweener),
    Sequence(Sequence),
}

impl From<Tweener> for TweenComponent {
    fn from(tweener: Tweener) -> Self {
        TweenComponent::Tweener(tweener)
    }
}

impl From<Sequence> for TweenComponent {
    fn from(sequence: Sequence) -> Self {
        TweenComponent::Sequence(sequence)
    }
}

impl TweenComponent {
    pub fn core(&self) -> &TweenCore {
        match self {
            TweenComponent::Tweener(t) => &t.core,
            TweenComponent::Sequence(s) => &s.core,
        }
    }

    pub(crate) fn core_mut(&mut self) -> &mut TweenCore {
        match self {
            TweenComponent::Tweener(t) => &mut t.core,
            TweenComponent::Sequence(s) => &mut s.core,
        }
    }

    pub fn state(&self) -> TweenState {
        self.core().state()
    }

    pub fn as_tweener(&self) -> Option<&Tweener> {
        match self {
            TweenComponent::Tweener(t) => Some(t),
            TweenComponent::Sequence(_) => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            TweenComponent::Tweener(_) => None,
            TweenComponent::Sequence(s) => Some(s),
        }
    }

    pub(crate) fn is_speed_based(&self) -> bool {
        matches!(self, TweenComponent::Tweener(t) if t.is_speed_based())
    }

    fn is_killed(&self) -> bool {
        self.core().phase == Phase::Killed
    }

    fn ensure_started(&mut self) -> Startup {
        if self.core().started {
            return Startup::Ready;
        }
        match self {
            TweenComponent::Tweener(t) => t.startup(),
            TweenComponent::Sequence(s) => {
                s.core.started = true;
                Startup::Ready
            }
        }
    }

    fn apply(&mut self, full_elapsed: f32, ctx: &mut UpdateCtx) -> bool {
        match self {
            TweenComponent::Tweener(t) => t.apply(full_elapsed, ctx),
            TweenComponent::Sequence(s) => s.apply(full_elapsed, ctx),
        }
    }

    pub(crate) fn set_incremental(&mut self, loop_diff: i64) {
        match self {
            TweenComponent::Tweener(t) => t.set_incremental(loop_diff),
            TweenComponent::Sequence(s) => s.set_incremental(loop_diff),
        }
    }

    pub(crate) fn set_incremental_restart(&mut self) {
        match self {
            TweenComponent::Tweener(t) => t.set_incremental_restart(),
            TweenComponent::Sequence(s) => s.set_incremental_restart(),
        }
    }

    /// Advance a top-level component by `dt` seconds of its own time
    ///
    /// Returns true when the component finished (completed or died).
    pub(crate) fn update(&mut self, dt: f32, ctx: &mut UpdateCtx) -> bool {
        match self.core().phase {
            Phase::Killed => return true,
            Phase::Complete => return false,
            _ => {}
        }
        if self.core().paused {
            return false;
        }
        let Some(dt) = self.core_mut().consume_delay(dt) else {
            return false;
        };
        match self.ensure_started() {
            Startup::Ready => {}
            Startup::Retry => return false,
            Startup::Dead => return true,
        }
        self.core_mut().fire_start_once(ctx);

        let core = self.core();
        let target = core.full_elapsed() + dt * core.direction().sign();
        let finished = self.apply(target, ctx);

        let core = self.core_mut();
        if !finished && core.direction == Direction::Backward && core.full_elapsed() <= 0.0 {
            core.paused = true;
        }
        finished
    }

    /// Seek a nested child to `local` seconds on its own timeline
    ///
    /// `force` rewrites the child even if its position did not change.
    pub(crate) fn goto(&mut self, local: f32, force: bool, ctx: &mut UpdateCtx) {
        if self.is_killed() {
            return;
        }
        let fresh = !self.core().started;
        if fresh {
            if local < 0.0 {
                return;
            }
            if self.ensure_started() != Startup::Ready {
                return;
            }
        }

        let span = self.core().full_duration().unwrap_or(0.0);
        let target = local.clamp(0.0, span);
        if !fresh && !force && target == self.core().full_elapsed() {
            return;
        }
        self.core_mut().fire_start_once(ctx);
        self.apply(target, ctx);
    }

    /// Capture start values and show position 0 without callbacks
    pub(crate) fn prime(&mut self, ctx: &mut UpdateCtx) {
        if self.ensure_started() != Startup::Ready {
            return;
        }
        let phase = self.core().phase;
        ctx.quietly(|ctx| self.apply(0.0, ctx));
        self.core_mut().phase = phase;
    }

    pub(crate) fn pause(&mut self) {
        if self.is_killed() {
            return;
        }
        self.core_mut().paused = true;
        if let TweenComponent::Sequence(s) = self {
            s.for_each_child(|child| child.pause());
        }
    }

    pub(crate) fn play(&mut self, skip_delay: bool) {
        if self.is_killed() {
            return;
        }
        let core = self.core_mut();
        core.paused = false;
        if skip_delay {
            core.skip_delay();
        }
        if let TweenComponent::Sequence(s) = self {
            s.for_each_child(|child| child.play(false));
        }
    }

    pub(crate) fn play_forward(&mut self, skip_delay: bool) {
        if self.is_killed() {
            return;
        }
        self.core_mut().direction = Direction::Forward;
        self.play(skip_delay);
    }

    pub(crate) fn play_backwards(&mut self) {
        if self.is_killed() {
            return;
        }
        let core = self.core_mut();
        core.direction = Direction::Backward;
        if core.phase == Phase::Complete {
            core.phase = Phase::Playing;
        }
        self.play(false);
    }

    pub(crate) fn reverse(&mut self) {
        if self.is_killed() {
            return;
        }
        let core = self.core_mut();
        core.direction = core.direction.flipped();
        if core.direction == Direction::Backward && core.phase == Phase::Complete {
            core.phase = Phase::Playing;
        }
    }

    pub(crate) fn rewind(&mut self, skip_delay: bool, ctx: &mut UpdateCtx) {
        if self.is_killed() {
            return;
        }
        let core = self.core_mut();
        core.reset_time(skip_delay);
        if core.started {
            let phase = core.phase;
            ctx.quietly(|ctx| self.apply(0.0, ctx));
            self.core_mut().phase = phase;
        }
    }

    pub(crate) fn restart(&mut self, skip_delay: bool, ctx: &mut UpdateCtx) {
        if self.is_killed() {
            return;
        }
        if self.core().started && self.core().loop_type == LoopType::Incremental {
            self.set_incremental_restart();
            self.core_mut().clear_loop_index();
        }
        self.rewind(skip_delay, ctx);
        self.play(false);
    }

    /// Jump to the end of the final loop
    ///
    /// Returns true when the component finished.
    pub(crate) fn complete(&mut self, ctx: &mut UpdateCtx) -> bool {
        if self.core().loops().is_infinite() {
            tracing::trace!("complete ignored on infinitely looping tween");
            return false;
        }
        match self.core().phase {
            Phase::Killed | Phase::Complete => return false,
            _ => {}
        }
        match self.ensure_started() {
            Startup::Ready => {}
            Startup::Retry => return false,
            Startup::Dead => return true,
        }
        // Speed-based tweens only know their duration once started
        let Some(end) = self.core().full_duration() else {
            return false;
        };
        self.core_mut().skip_delay();
        self.core_mut().fire_start_once(ctx);
        self.apply(end, ctx)
    }

    pub(crate) fn kill(&mut self) {
        match self {
            TweenComponent::Tweener(t) => t.kill(),
            TweenComponent::Sequence(s) => s.kill(),
        }
    }

    /// Animates `target` here or in any nested child, whatever the state
    pub(crate) fn is_linked_to(&self, target: TargetId) -> bool {
        if self.is_killed() {
            return false;
        }
        match self {
            TweenComponent::Tweener(t) => t.target() == target,
            TweenComponent::Sequence(s) => s.any_child(|child| child.is_linked_to(target)),
        }
    }

    /// Actively animating `target` (delayed or playing, not paused)
    pub(crate) fn is_tweening(&self, target: TargetId) -> bool {
        if !self.core().is_active() {
            return false;
        }
        match self {
            TweenComponent::Tweener(t) => t.target() == target,
            TweenComponent::Sequence(s) => s.any_child(|child| child.is_tweening(target)),
        }
    }
}
