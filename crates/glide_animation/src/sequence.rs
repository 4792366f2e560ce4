//! Sequences: components laid out on a shared timeline
//!
//! A sequence owns its children outright. Each child sits at an offset and is
//! driven by seeking it to `position - offset`, so a sequence never ticks its
//! children with deltas. Seeking makes backward play and loop wrap-around fall
//! out of the same code path as forward play.

use crate::component::TweenComponent;
use crate::error::{Result, TweenError};
use crate::events::UpdateCtx;
use crate::tween::{LoopType, Phase, TweenCore};

/// A child and where it starts on the parent's timeline
#[derive(Debug)]
pub struct SequenceItem {
    offset: f32,
    component: TweenComponent,
}

impl SequenceItem {
    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn component(&self) -> &TweenComponent {
        &self.component
    }
}

/// Composite component playing children at fixed offsets
#[derive(Debug)]
pub struct Sequence {
    pub(crate) core: TweenCore,
    items: Vec<SequenceItem>,
    /// Loop-local position children were last driven to
    last_position: f32,
    /// Children were shifted and must be rewritten on the next drive
    rebased: bool,
}

impl Sequence {
    pub(crate) fn new(core: TweenCore) -> Self {
        Self {
            core,
            items: Vec::new(),
            last_position: 0.0,
            rebased: false,
        }
    }

    pub fn core(&self) -> &TweenCore {
        &self.core
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Children in insertion order
    pub fn children(&self) -> impl Iterator<Item = &SequenceItem> {
        self.items.iter()
    }

    /// Place `child` at `offset` seconds
    ///
    /// The child's own delay is added to the offset. Its time scale and
    /// auto-kill setting are ignored while nested.
    pub fn insert(&mut self, offset: f32, child: impl Into<TweenComponent>) -> Result<&mut Self> {
        let index = self.items.len();
        self.insert_at(index, offset, child.into())
    }

    /// Place `child` right after everything already in the sequence
    pub fn append(&mut self, child: impl Into<TweenComponent>) -> Result<&mut Self> {
        let offset = self.core.duration;
        self.insert(offset, child)
    }

    /// Place `child` at the start, pushing everything else back by its span
    pub fn prepend(&mut self, child: impl Into<TweenComponent>) -> Result<&mut Self> {
        let child = child.into();
        let span = child_span(&child)? + child.core().delay;
        self.shift(span);
        self.insert_at(0, 0.0, child)
    }

    /// Add an empty gap at the end
    pub fn append_interval(&mut self, seconds: f32) -> &mut Self {
        self.core.duration += seconds.max(0.0);
        self
    }

    /// Add an empty gap at the start
    pub fn prepend_interval(&mut self, seconds: f32) -> &mut Self {
        self.shift(seconds.max(0.0));
        self
    }

    fn insert_at(
        &mut self,
        index: usize,
        offset: f32,
        mut child: TweenComponent,
    ) -> Result<&mut Self> {
        let span = child_span(&child)?;
        let core = child.core_mut();
        let offset = offset.max(0.0) + core.delay;
        core.delay = 0.0;
        core.skip_delay();

        let end = offset + span;
        if end > self.core.duration {
            self.core.duration = end;
        }
        self.items.insert(
            index,
            SequenceItem {
                offset,
                component: child,
            },
        );
        Ok(self)
    }

    fn shift(&mut self, by: f32) {
        for item in self.items.iter_mut() {
            item.offset += by;
        }
        self.core.duration += by;
    }

    pub(crate) fn apply(&mut self, full_elapsed: f32, ctx: &mut UpdateCtx) -> bool {
        let step = self.core.seek(full_elapsed);

        // Finish the loop that was just left before wrapping
        if step.loop_diff > 0 {
            let previous = self.core.loop_index() as i64 - step.loop_diff;
            let boundary = if self.core.loop_type == LoopType::Yoyo && previous % 2 == 1 {
                0.0
            } else {
                self.core.duration
            };
            self.drive(boundary, ctx);
        }

        if step.loop_diff != 0 && self.core.loop_type == LoopType::Incremental {
            self.set_incremental(step.loop_diff);
        }

        let position = self.core.elapsed();
        self.drive(position, ctx);
        self.core.after_step(step, ctx)
    }

    /// Seek every child to `position` on this sequence's local timeline
    fn drive(&mut self, position: f32, ctx: &mut UpdateCtx) {
        let backward = position < self.last_position;
        let force = std::mem::take(&mut self.rebased);
        self.last_position = position;

        if backward {
            for item in self.items.iter_mut().rev() {
                item.component.goto(position - item.offset, force, ctx);
            }
        } else {
            for item in self.items.iter_mut() {
                item.component.goto(position - item.offset, force, ctx);
            }
        }
    }

    pub(crate) fn set_incremental(&mut self, loop_diff: i64) {
        self.rebased = true;
        for item in self.items.iter_mut() {
            item.component.set_incremental(loop_diff);
        }
    }

    /// Rebase every child on the last finished loop before a restart
    ///
    /// Children are shifted together, in whole loops, so they keep their
    /// relative layout. A finished sequence sits at the end of its last loop
    /// without the shift for it, which is applied here.
    pub(crate) fn set_incremental_restart(&mut self) {
        let pending = self.core.completed_loops() as i64 - self.core.loop_index() as i64;
        if pending != 0 {
            self.set_incremental(pending);
        }
    }

    pub(crate) fn for_each_child(&mut self, mut f: impl FnMut(&mut TweenComponent)) {
        for item in self.items.iter_mut() {
            f(&mut item.component);
        }
    }

    pub(crate) fn any_child(&self, f: impl Fn(&TweenComponent) -> bool) -> bool {
        self.items.iter().any(|item| f(&item.component))
    }

    pub(crate) fn kill(&mut self) {
        self.core.phase = Phase::Killed;
        self.core.callbacks.clear();
        for item in self.items.iter_mut() {
            item.component.kill();
        }
        self.items.clear();
    }
}

/// Time a child occupies on its parent's timeline
fn child_span(child: &TweenComponent) -> Result<f32> {
    if child.is_speed_based() {
        return Err(TweenError::SpeedBasedChild);
    }
    child.core().full_duration().ok_or(TweenError::InfiniteChild)
}
