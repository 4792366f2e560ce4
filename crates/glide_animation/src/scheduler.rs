//! Tween scheduler
//!
//! Owns every top-level component and advances them each frame. Components
//! are visited in reverse registration order, so removing the one currently
//! being visited never skips another.

use crate::component::TweenComponent;
use crate::events::UpdateCtx;
use crate::tween::{Phase, UpdateChannel};
use glide_core::TargetId;
use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

new_key_type! {
    pub struct TweenId;
}

/// Which registered components a control call applies to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TweenFilter {
    All,
    IntId(i32),
    StringId(String),
    Component(TweenId),
    /// Top-level tweeners bound to this target
    Target(TargetId),
}

impl TweenFilter {
    pub fn target<T: ?Sized>(target: &Rc<RefCell<T>>) -> Self {
        TweenFilter::Target(TargetId::of(target))
    }

    pub(crate) fn matches(&self, id: TweenId, component: &TweenComponent) -> bool {
        match self {
            TweenFilter::All => true,
            TweenFilter::IntId(n) => component.core().int_id() == Some(*n),
            TweenFilter::StringId(s) => component.core().string_id() == Some(s.as_str()),
            TweenFilter::Component(other) => id == *other,
            TweenFilter::Target(target) => {
                matches!(component, TweenComponent::Tweener(t) if t.target() == *target)
            }
        }
    }
}

impl From<TweenId> for TweenFilter {
    fn from(id: TweenId) -> Self {
        TweenFilter::Component(id)
    }
}

impl From<i32> for TweenFilter {
    fn from(id: i32) -> Self {
        TweenFilter::IntId(id)
    }
}

impl From<&str> for TweenFilter {
    fn from(id: &str) -> Self {
        TweenFilter::StringId(id.to_string())
    }
}

impl From<String> for TweenFilter {
    fn from(id: String) -> Self {
        TweenFilter::StringId(id)
    }
}

impl From<TargetId> for TweenFilter {
    fn from(target: TargetId) -> Self {
        TweenFilter::Target(target)
    }
}

/// Control operation applied by `filtered_iteration`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FilterOp {
    Pause,
    Play { skip_delay: bool },
    PlayForward { skip_delay: bool },
    PlayBackwards,
    Rewind { skip_delay: bool },
    Restart { skip_delay: bool },
    Reverse,
    Complete { dispatch: bool },
    Kill,
}

/// Registry of top-level components for one pump generation
pub struct Scheduler {
    tweens: SlotMap<TweenId, TweenComponent>,
    order: Vec<TweenId>,
    generation: u64,
    last_realtime: Option<Instant>,
}

impl Scheduler {
    pub(crate) fn new(generation: u64) -> Self {
        Self {
            tweens: SlotMap::with_key(),
            order: Vec::new(),
            generation,
            last_realtime: None,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn register(&mut self, component: TweenComponent) -> TweenId {
        let id = self.tweens.insert(component);
        if let Some(component) = self.tweens.get_mut(id) {
            component.core_mut().id = Some(id);
        }
        self.order.push(id);
        tracing::trace!("registered tween {:?}", id);
        id
    }

    pub fn get(&self, id: TweenId) -> Option<&TweenComponent> {
        self.tweens.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: TweenId) -> Option<&mut TweenComponent> {
        self.tweens.get_mut(id)
    }

    /// Number of registered top-level components
    pub fn active_count(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    /// Ids in registration order
    pub fn ids(&self) -> impl Iterator<Item = TweenId> + '_ {
        self.order.iter().copied()
    }

    pub(crate) fn components_mut(&mut self) -> impl Iterator<Item = &mut TweenComponent> {
        self.tweens.values_mut()
    }

    /// Advance every component on `channel` by `elapsed` seconds
    pub(crate) fn update(&mut self, channel: UpdateChannel, elapsed: f32, ctx: &mut UpdateCtx) {
        let mut i = self.order.len();
        while i > 0 {
            i -= 1;
            let id = self.order[i];
            let Some(component) = self.tweens.get_mut(id) else {
                self.order.remove(i);
                continue;
            };
            if component.core().channel() != channel {
                continue;
            }

            let dt = elapsed * component.core().time_scale();
            let finished = component.update(dt, ctx);
            if finished
                && (component.core().phase == Phase::Killed || component.core().auto_kill())
            {
                self.remove_at(i);
            }
        }
    }

    /// Apply `op` to every component matching `filter`
    ///
    /// Returns the number of matched components.
    pub(crate) fn filtered_iteration(
        &mut self,
        filter: &TweenFilter,
        op: FilterOp,
        ctx: &mut UpdateCtx,
    ) -> usize {
        if let FilterOp::Complete { dispatch } = op {
            ctx.silent = !dispatch;
        }

        let mut matched = 0;
        let mut i = self.order.len();
        while i > 0 {
            i -= 1;
            let id = self.order[i];
            let Some(component) = self.tweens.get_mut(id) else {
                self.order.remove(i);
                continue;
            };
            if !filter.matches(id, component) {
                continue;
            }
            matched += 1;

            let remove = match op {
                FilterOp::Pause => {
                    component.pause();
                    false
                }
                FilterOp::Play { skip_delay } => {
                    component.play(skip_delay);
                    false
                }
                FilterOp::PlayForward { skip_delay } => {
                    component.play_forward(skip_delay);
                    false
                }
                FilterOp::PlayBackwards => {
                    component.play_backwards();
                    false
                }
                FilterOp::Rewind { skip_delay } => {
                    component.rewind(skip_delay, ctx);
                    false
                }
                FilterOp::Restart { skip_delay } => {
                    component.restart(skip_delay, ctx);
                    false
                }
                FilterOp::Reverse => {
                    component.reverse();
                    false
                }
                FilterOp::Complete { .. } => {
                    let finished = component.complete(ctx);
                    finished
                        && (component.core().phase == Phase::Killed
                            || component.core().auto_kill())
                }
                FilterOp::Kill => {
                    component.kill();
                    true
                }
            };
            if remove {
                self.remove_at(i);
            }
        }

        ctx.silent = false;
        matched
    }

    /// Drop components that were killed outside the update pass
    pub(crate) fn purge_killed(&mut self) -> usize {
        let mut purged = 0;
        let mut i = self.order.len();
        while i > 0 {
            i -= 1;
            let killed = self
                .tweens
                .get(self.order[i])
                .map_or(true, |c| c.core().phase == Phase::Killed);
            if killed {
                self.remove_at(i);
                purged += 1;
            }
        }
        purged
    }

    fn remove_at(&mut self, index: usize) {
        let id = self.order.remove(index);
        if let Some(mut component) = self.tweens.remove(id) {
            component.kill();
            tracing::trace!("removed tween {:?}", id);
        }
    }

    pub fn is_tweening(&self, target: TargetId) -> bool {
        self.tweens.values().any(|c| c.is_tweening(target))
    }

    pub fn is_linked_to(&self, target: TargetId) -> bool {
        self.tweens.values().any(|c| c.is_linked_to(target))
    }

    /// Seconds since the previous realtime tick of this generation
    ///
    /// The first call only primes the clock and returns `None`.
    pub(crate) fn realtime_delta(&mut self) -> Option<f32> {
        let now = Instant::now();
        let previous = self.last_realtime.replace(now)?;
        Some((now - previous).as_secs_f32())
    }

    /// Kill everything without dispatching callbacks
    pub(crate) fn clear(&mut self) {
        for component in self.tweens.values_mut() {
            component.kill();
        }
        self.tweens.clear();
        self.order.clear();
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(0)
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("generation", &self.generation)
            .field("active", &self.tweens.len())
            .finish()
    }
}
