//! Integration tests for single tweens
//!
//! These tests verify that:
//! - Values follow the ease curve and land exactly on their end values
//! - Control calls (pause, rewind, restart, reverse, complete) move the
//!   state machine as expected
//! - Loops, delays, from-tweens and relative values behave at boundaries
//! - Completion callbacks may reshape the engine while it is ticking

mod common;

use common::{assert_near, engine, sprite};
use glide_animation::{
    AccessError, Ease, LoopType, PluginSpec, PropertyAccess, TargetId, TweenError, TweenFilter,
    TweenParams, TweenState, UpdateChannel, ValuePlugin,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

const UPDATE: UpdateChannel = UpdateChannel::Update;

#[test]
fn test_value_follows_ease() {
    let mut engine = engine();
    let s = sprite(0.0);
    let params = TweenParams::new().prop("x", 10.0f32).ease(Ease::InQuad);
    engine.to_with(&s, 2.0, params).unwrap().unwrap();

    engine.tick(UPDATE, 0.5);
    assert_near(s.borrow().x, 10.0 * Ease::InQuad.factor(0.25));

    engine.tick(UPDATE, 1.5);
    assert_eq!(s.borrow().x, 10.0);
    assert_eq!(engine.active_count(), 0);
}

#[test]
fn test_start_is_read_when_tween_starts() {
    let mut engine = engine();
    let s = sprite(0.0);
    engine
        .to_with(&s, 1.0, TweenParams::new().prop("x", 10.0f32).delay(0.5))
        .unwrap()
        .unwrap();

    engine.tick(UPDATE, 0.25);
    assert_eq!(s.borrow().x, 0.0);
    s.borrow_mut().x = 4.0;

    // 0.25s of delay left, 0.25s of play
    engine.tick(UPDATE, 0.5);
    assert_near(s.borrow().x, 5.5);
}

#[test]
fn test_delayed_state() {
    let mut engine = engine();
    let s = sprite(0.0);
    let id = engine
        .to_with(&s, 1.0, TweenParams::new().prop("x", 1.0f32).delay(1.0))
        .unwrap()
        .unwrap();

    assert_eq!(engine.get(id).unwrap().state(), TweenState::Delayed);
    assert!(engine.is_tweening(&s));

    engine.play(id, true);
    assert_eq!(engine.get(id).unwrap().state(), TweenState::Playing);
}

#[test]
fn test_rewind_restores_start() {
    let mut engine = engine();
    let s = sprite(3.0);
    let id = engine.to(&s, 1.0, "x", 10.0f32).unwrap();

    engine.tick(UPDATE, 0.5);
    assert_near(s.borrow().x, 6.5);

    assert_eq!(engine.rewind(id, false), 1);
    assert_eq!(s.borrow().x, 3.0);
    assert_eq!(engine.get(id).unwrap().core().full_elapsed(), 0.0);

    engine.tick(UPDATE, 0.5);
    assert_near(s.borrow().x, 6.5);
}

#[test]
fn test_rewind_keeps_paused_flag() {
    let mut engine = engine();
    let s = sprite(0.0);
    let id = engine.to(&s, 1.0, "x", 10.0f32).unwrap();

    engine.tick(UPDATE, 0.5);
    engine.pause(id);
    engine.rewind(id, false);
    assert_eq!(engine.get(id).unwrap().state(), TweenState::Paused);
    assert_eq!(s.borrow().x, 0.0);
}

#[test]
fn test_restart_plays_again() {
    let mut engine = engine();
    let s = sprite(0.0);
    let id = engine.to(&s, 1.0, "x", 10.0f32).unwrap();

    engine.tick(UPDATE, 0.5);
    engine.pause(id);
    engine.restart(id, false);
    assert_eq!(engine.get(id).unwrap().state(), TweenState::Playing);
    assert_eq!(s.borrow().x, 0.0);

    engine.tick(UPDATE, 0.25);
    assert_near(s.borrow().x, 2.5);
}

#[test]
fn test_complete_sets_end() {
    let mut engine = engine();
    let s = sprite(0.0);
    let id = engine.to(&s, 5.0, "x", 10.0f32).unwrap();

    engine.tick(UPDATE, 1.0);
    assert_eq!(engine.complete(id), 1);
    assert_eq!(s.borrow().x, 10.0);
    assert_eq!(engine.active_count(), 0);
}

#[test]
fn test_complete_before_start() {
    let mut engine = engine();
    let s = sprite(1.0);
    let params = TweenParams::new().prop("x", 9.0f32).delay(2.0);
    engine.to_with(&s, 1.0, params).unwrap();

    engine.complete(TweenFilter::All);
    assert_eq!(s.borrow().x, 9.0);
}

#[test]
fn test_complete_on_infinite_loops_is_noop() {
    let mut engine = engine();
    let s = sprite(0.0);
    let params = TweenParams::new().prop("x", 10.0f32).loops_infinite();
    let id = engine.to_with(&s, 1.0, params).unwrap().unwrap();

    engine.tick(UPDATE, 0.5);
    assert_eq!(engine.complete(id), 1);
    assert_eq!(engine.get(id).unwrap().state(), TweenState::Playing);
    assert_near(s.borrow().x, 5.0);
}

#[test]
fn test_complete_unstarted_speed_based() {
    let mut engine = engine();
    let s = sprite(0.0);
    let params = TweenParams::new()
        .prop("x", 100.0f32)
        .speed_based(true)
        .auto_kill(false);
    let id = engine.to_with(&s, 2.0, params).unwrap().unwrap();

    assert_eq!(engine.complete(id), 1);
    assert_eq!(s.borrow().x, 100.0);
    let core = engine.get(id).unwrap().core();
    assert_eq!(core.state(), TweenState::Complete);
    assert_eq!(core.duration(), 50.0);
}

#[test]
fn test_kept_tween_reopens_backwards() {
    let mut engine = engine();
    let s = sprite(0.0);
    let params = TweenParams::new().prop("x", 10.0f32).auto_kill(false);
    let id = engine.to_with(&s, 2.0, params).unwrap().unwrap();

    engine.tick(UPDATE, 3.0);
    assert_eq!(engine.get(id).unwrap().state(), TweenState::Complete);
    assert_eq!(s.borrow().x, 10.0);

    engine.play_backwards(id);
    engine.tick(UPDATE, 1.0);
    assert_near(s.borrow().x, 5.0);
    assert_eq!(engine.get(id).unwrap().state(), TweenState::Playing);
}

#[test]
fn test_pause_is_idempotent() {
    let mut engine = engine();
    let s = sprite(0.0);
    let id = engine.to(&s, 2.0, "x", 10.0f32).unwrap();

    engine.tick(UPDATE, 0.5);
    assert_eq!(engine.pause(id), 1);
    assert_eq!(engine.pause(id), 1);
    assert_eq!(engine.get(id).unwrap().state(), TweenState::Paused);

    engine.tick(UPDATE, 1.0);
    assert_eq!(engine.get(id).unwrap().core().full_elapsed(), 0.5);
    assert!(!engine.is_tweening(&s));
    assert!(engine.is_linked_to(&s));

    engine.play(id, false);
    engine.tick(UPDATE, 0.5);
    assert_eq!(engine.get(id).unwrap().core().full_elapsed(), 1.0);
}

#[test]
fn test_backwards_pauses_at_start() {
    let mut engine = engine();
    let s = sprite(0.0);
    let id = engine.to(&s, 2.0, "x", 10.0f32).unwrap();

    engine.tick(UPDATE, 1.0);
    engine.play_backwards(id);
    engine.tick(UPDATE, 0.5);
    assert_near(s.borrow().x, 2.5);

    engine.tick(UPDATE, 1.0);
    assert_eq!(s.borrow().x, 0.0);
    assert_eq!(engine.get(id).unwrap().state(), TweenState::Paused);
    assert_eq!(engine.active_count(), 1);

    engine.play_forward(id, false);
    engine.tick(UPDATE, 0.5);
    assert_near(s.borrow().x, 2.5);
}

#[test]
fn test_reverse_flips_direction() {
    let mut engine = engine();
    let s = sprite(0.0);
    let id = engine.to(&s, 2.0, "x", 10.0f32).unwrap();

    engine.tick(UPDATE, 1.0);
    engine.reverse(id);
    engine.tick(UPDATE, 0.5);
    assert_near(s.borrow().x, 2.5);

    engine.reverse(id);
    engine.tick(UPDATE, 1.0);
    assert_near(s.borrow().x, 7.5);
}

#[test]
fn test_yoyo_loops() {
    let mut engine = engine();
    let s = sprite(0.0);
    let params = TweenParams::new()
        .prop("x", 10.0f32)
        .loops(3)
        .loop_type(LoopType::Yoyo);
    engine.to_with(&s, 1.0, params).unwrap();

    engine.tick(UPDATE, 1.0);
    assert_eq!(s.borrow().x, 10.0);
    engine.tick(UPDATE, 0.5);
    assert_near(s.borrow().x, 5.0);
    engine.tick(UPDATE, 0.5);
    assert_eq!(s.borrow().x, 0.0);
    engine.tick(UPDATE, 1.0);
    assert_eq!(s.borrow().x, 10.0);
    assert_eq!(engine.active_count(), 0);
}

#[test]
fn test_restart_loops_snap_to_start() {
    let mut engine = engine();
    let s = sprite(0.0);
    let params = TweenParams::new().prop("x", 10.0f32).loops(2);
    engine.to_with(&s, 1.0, params).unwrap();

    engine.tick(UPDATE, 1.0);
    assert_eq!(s.borrow().x, 0.0);
    engine.tick(UPDATE, 0.5);
    assert_near(s.borrow().x, 5.0);
}

#[test]
fn test_incremental_loops() {
    let mut engine = engine();
    let s = sprite(0.0);
    let params = TweenParams::new()
        .prop("x", 5.0f32)
        .loops(2)
        .loop_type(LoopType::Incremental);
    engine.to_with(&s, 1.0, params).unwrap();

    engine.tick(UPDATE, 0.5);
    assert_near(s.borrow().x, 2.5);
    engine.tick(UPDATE, 0.5);
    assert_eq!(s.borrow().x, 5.0);
    engine.tick(UPDATE, 0.5);
    assert_near(s.borrow().x, 7.5);
    engine.tick(UPDATE, 0.5);
    assert_eq!(s.borrow().x, 10.0);
}

#[test]
fn test_incremental_rewind_undoes_shift() {
    let mut engine = engine();
    let s = sprite(0.0);
    let params = TweenParams::new()
        .prop("x", 5.0f32)
        .loops_infinite()
        .loop_type(LoopType::Incremental);
    let id = engine.to_with(&s, 1.0, params).unwrap().unwrap();

    engine.tick(UPDATE, 2.5);
    assert_near(s.borrow().x, 12.5);

    engine.rewind(id, false);
    assert_eq!(s.borrow().x, 0.0);
    engine.tick(UPDATE, 0.5);
    assert_near(s.borrow().x, 2.5);
}

#[test]
fn test_incremental_restart_continues_from_live_value() {
    let mut engine = engine();
    let s = sprite(0.0);
    let params = TweenParams::new()
        .prop("x", 5.0f32)
        .loops_infinite()
        .loop_type(LoopType::Incremental);
    let id = engine.to_with(&s, 1.0, params).unwrap().unwrap();

    engine.tick(UPDATE, 1.5);
    assert_near(s.borrow().x, 7.5);

    engine.restart(id, false);
    assert_near(s.borrow().x, 7.5);
    engine.tick(UPDATE, 0.5);
    assert_near(s.borrow().x, 10.0);
}

#[test]
fn test_from_absolute() {
    let mut engine = engine();
    let s = sprite(2.0);
    engine.from(&s, 1.0, "x", 5.0f32).unwrap();
    assert_eq!(s.borrow().x, 5.0);

    engine.tick(UPDATE, 0.5);
    assert_near(s.borrow().x, 3.5);
    engine.tick(UPDATE, 0.5);
    assert_eq!(s.borrow().x, 2.0);
}

#[test]
fn test_from_relative() {
    let mut engine = engine();
    let s = sprite(2.0);
    engine.from_by(&s, 1.0, "x", 5.0f32).unwrap();
    assert_eq!(s.borrow().x, 7.0);

    engine.tick(UPDATE, 1.0);
    assert_eq!(s.borrow().x, 2.0);
}

#[test]
fn test_from_priming_is_silent() {
    let mut engine = engine();
    let s = sprite(2.0);
    let updates = Rc::new(Cell::new(0));
    let starts = Rc::new(Cell::new(0));
    let (u, st) = (updates.clone(), starts.clone());
    let params = TweenParams::new()
        .prop("x", 5.0f32)
        .on_update(move |_| u.set(u.get() + 1))
        .on_start(move |_| st.set(st.get() + 1));
    engine.from_with(&s, 1.0, params).unwrap().unwrap();

    assert_eq!(s.borrow().x, 5.0);
    assert_eq!((updates.get(), starts.get()), (0, 0));

    engine.tick(UPDATE, 0.5);
    assert_eq!((updates.get(), starts.get()), (1, 1));
}

#[test]
fn test_to_by_relative() {
    let mut engine = engine();
    let s = sprite(3.0);
    engine.to_by(&s, 1.0, "x", 4.0f32).unwrap();

    engine.tick(UPDATE, 1.0);
    assert_eq!(s.borrow().x, 7.0);
}

#[test]
fn test_relative_bag() {
    let mut engine = engine();
    let s = sprite(1.0);
    let params = TweenParams::new().prop("x", 2.0f32).relative(true);
    engine.to_with(&s, 1.0, params).unwrap();

    engine.tick(UPDATE, 1.0);
    assert_eq!(s.borrow().x, 3.0);
}

#[test]
fn test_pixel_perfect_truncates_toward_zero() {
    let mut engine = engine();
    let down = sprite(0.0);
    let up = sprite(0.0);
    engine
        .to_with(&down, 1.0, TweenParams::new().prop("x", -10.0f32).pixel_perfect(true))
        .unwrap();
    engine
        .to_with(&up, 1.0, TweenParams::new().prop("x", 10.0f32).pixel_perfect(true))
        .unwrap();

    engine.tick(UPDATE, 0.27);
    assert_eq!(down.borrow().x, -2.0);
    assert_eq!(up.borrow().x, 2.0);
}

#[test]
fn test_vector_property() {
    let mut engine = engine();
    let s = sprite(0.0);
    engine.to(&s, 1.0, "pos", [4.0f32, 8.0]).unwrap();

    engine.tick(UPDATE, 0.5);
    assert_eq!(s.borrow().pos, [2.0, 4.0]);
}

#[test]
fn test_speed_based_duration() {
    let mut engine = engine();
    let s = sprite(0.0);
    let params = TweenParams::new().prop("x", 30.0f32).speed_based(true);
    let id = engine.to_with(&s, 10.0, params).unwrap().unwrap();

    engine.tick(UPDATE, 1.5);
    assert_near(s.borrow().x, 15.0);
    assert_eq!(engine.get(id).unwrap().core().duration(), 3.0);
}

#[test]
fn test_time_scale_param() {
    let mut engine = engine();
    let s = sprite(0.0);
    let params = TweenParams::new().prop("x", 10.0f32).time_scale(2.0);
    engine.to_with(&s, 2.0, params).unwrap();

    engine.tick(UPDATE, 0.5);
    assert_near(s.borrow().x, 5.0);
}

#[test]
fn test_zero_duration_completes_on_first_tick() {
    let mut engine = engine();
    let s = sprite(0.0);
    engine.to(&s, 0.0, "x", 10.0f32).unwrap();
    assert_eq!(s.borrow().x, 0.0);

    engine.tick(UPDATE, 0.016);
    assert_eq!(s.borrow().x, 10.0);
    assert_eq!(engine.active_count(), 0);
}

#[test]
fn test_channels_are_independent() {
    let mut engine = engine();
    let s = sprite(0.0);
    let params = TweenParams::new()
        .prop("x", 10.0f32)
        .channel(UpdateChannel::FixedUpdate);
    engine.to_with(&s, 1.0, params).unwrap();

    engine.tick(UPDATE, 0.5);
    engine.tick(UpdateChannel::LateUpdate, 0.5);
    assert_eq!(s.borrow().x, 0.0);

    engine.tick(UpdateChannel::FixedUpdate, 0.5);
    assert_near(s.borrow().x, 5.0);
}

#[test]
fn test_unresolvable_requests() {
    let mut engine = engine();
    let s = sprite(0.0);

    // Unknown property, wrong value type, no plugin for bool
    assert!(engine.to(&s, 1.0, "scale", 1.0f32).is_none());
    assert!(engine.to(&s, 1.0, "x", 1.0f64).is_none());
    assert!(engine.to(&s, 1.0, "visible", true).is_none());

    let params = TweenParams::new().prop("x", 1.0f32).prop("x", 2.0f32);
    assert!(matches!(
        engine.to_with(&s, 1.0, params),
        Err(TweenError::InvalidParams(_))
    ));
    assert!(matches!(
        engine.to_with(&s, 1.0, TweenParams::new().prop("x", 1.0f32).loops(0)),
        Err(TweenError::InvalidParams(_))
    ));
    assert_eq!(engine.active_count(), 0);
}

#[test]
fn test_partially_resolvable_bag() {
    let mut engine = engine();
    let s = sprite(0.0);
    let params = TweenParams::new().prop("x", 4.0f32).prop("scale", 2.0f32);
    let id = engine.to_with(&s, 1.0, params).unwrap().unwrap();

    let tweener = engine.get(id).unwrap().as_tweener().unwrap();
    assert_eq!(tweener.properties().collect::<Vec<_>>(), vec!["x"]);
}

#[test]
fn test_callbacks() {
    let mut engine = engine();
    let s = sprite(0.0);
    let log = Rc::new(RefCell::new(Vec::new()));

    let (a, b, c, d) = (log.clone(), log.clone(), log.clone(), log.clone());
    let params = TweenParams::new()
        .prop("x", 1.0f32)
        .loops(2)
        .id("pulse")
        .event_data(7u32)
        .on_start(move |_| a.borrow_mut().push("start".to_string()))
        .on_update(move |_| b.borrow_mut().push("update".to_string()))
        .on_step_complete(move |e| c.borrow_mut().push(format!("step {}", e.completed_loops)))
        .on_complete(move |_, e| {
            d.borrow_mut()
                .push(format!("complete {:?} {:?}", e.string_id, e.data::<u32>()))
        });
    engine.to_with(&s, 1.0, params).unwrap();

    for _ in 0..4 {
        engine.tick(UPDATE, 0.5);
    }

    assert_eq!(
        *log.borrow(),
        vec![
            "start",
            "update",
            "update",
            "step 1",
            "update",
            "update",
            "step 2",
            "complete Some(\"pulse\") Some(7)",
        ]
    );
}

#[test]
fn test_completion_creates_tween_on_same_target() {
    let mut engine = engine();
    let s = sprite(0.0);
    let target = s.clone();
    let params = TweenParams::new()
        .prop("x", 10.0f32)
        .on_complete(move |engine, _| {
            engine.to(&target, 1.0, "x", 0.0f32);
        });
    engine.to_with(&s, 1.0, params).unwrap();

    engine.tick(UPDATE, 1.0);
    assert_eq!(s.borrow().x, 10.0);
    assert_eq!(engine.active_count(), 1);

    engine.tick(UPDATE, 0.5);
    assert_near(s.borrow().x, 5.0);
}

#[test]
fn test_completion_kills_other_tweens() {
    let mut engine = engine();
    let s = sprite(0.0);
    let params = TweenParams::new()
        .prop("x", 1.0f32)
        .on_complete(|engine, _| {
            engine.kill(TweenFilter::All);
        });
    engine.to_with(&s, 1.0, params).unwrap();
    engine.to(&s, 5.0, "y", 1.0f32).unwrap();

    engine.tick(UPDATE, 1.0);
    assert_eq!(engine.active_count(), 0);
    assert!(!engine.is_pumping());
}

#[test]
fn test_completion_restarts_itself() {
    let mut engine = engine();
    let s = sprite(0.0);
    let completions = Rc::new(Cell::new(0));
    let counter = completions.clone();
    let params = TweenParams::new()
        .prop("x", 10.0f32)
        .auto_kill(false)
        .on_complete(move |engine, event| {
            counter.set(counter.get() + 1);
            if counter.get() == 1 {
                if let Some(id) = event.tween {
                    engine.restart(id, false);
                }
            }
        });
    let id = engine.to_with(&s, 1.0, params).unwrap().unwrap();

    engine.tick(UPDATE, 1.0);
    assert_eq!(completions.get(), 1);
    assert_eq!(s.borrow().x, 0.0);
    assert_eq!(engine.get(id).unwrap().state(), TweenState::Playing);

    engine.tick(UPDATE, 1.0);
    assert_eq!(completions.get(), 2);
    assert_eq!(engine.get(id).unwrap().state(), TweenState::Complete);
}

#[test]
fn test_complete_silently_skips_callbacks() {
    let mut engine = engine();
    let s = sprite(0.0);
    let fired = Rc::new(Cell::new(false));
    let flag = fired.clone();
    let params = TweenParams::new()
        .prop("x", 10.0f32)
        .on_complete(move |_, _| flag.set(true));
    let id = engine.to_with(&s, 1.0, params).unwrap().unwrap();

    assert_eq!(engine.complete_silently(id), 1);
    assert_eq!(s.borrow().x, 10.0);
    assert!(!fired.get());
}

#[test]
fn test_dropped_target_kills_tween() {
    let mut engine = engine();
    let s = sprite(0.0);
    engine.to(&s, 1.0, "x", 10.0f32).unwrap();
    engine.tick(UPDATE, 0.1);

    drop(s);
    engine.tick(UPDATE, 0.1);
    assert_eq!(engine.active_count(), 0);
}

#[test]
fn test_busy_target_skips_frame() {
    let mut engine = engine();
    let s = sprite(0.0);
    let id = engine.to(&s, 1.0, "x", 10.0f32).unwrap();
    engine.tick(UPDATE, 0.25);

    {
        let _guard = s.borrow_mut();
        engine.tick(UPDATE, 0.25);
    }
    assert_near(s.borrow().x, 2.5);
    assert!(engine.get(id).is_some());

    engine.tick(UPDATE, 0.25);
    assert_near(s.borrow().x, 7.5);
}

/// Shows or hides a target once progress passes the midpoint
struct TogglePlugin {
    access: Rc<dyn PropertyAccess<bool>>,
    end: bool,
    start: bool,
}

impl ValuePlugin for TogglePlugin {
    fn property(&self) -> &str {
        self.access.property()
    }

    fn target(&self) -> TargetId {
        self.access.target()
    }

    fn startup(&mut self) -> Result<(), AccessError> {
        self.start = self.access.get()?;
        Ok(())
    }

    fn set_change_val(&mut self) {}

    fn do_update(&mut self, elapsed: f32, duration: f32) -> Result<(), AccessError> {
        let past_half = duration <= 0.0 || elapsed / duration >= 0.5;
        self.access.set(if past_half { self.end } else { self.start })
    }

    fn set_incremental(&mut self, _loop_diff: i64) {}

    fn set_incremental_restart(&mut self) -> Result<(), AccessError> {
        Ok(())
    }

    fn speed_based_duration(&self, _speed: f32) -> f32 {
        0.0
    }
}

#[test]
fn test_custom_plugin() {
    let mut engine = engine();
    engine.register_plugin::<bool>(|spec: PluginSpec<bool>| -> Box<dyn ValuePlugin> {
        Box::new(TogglePlugin {
            access: spec.access,
            end: spec.value,
            start: false,
        })
    });
    let s = sprite(0.0);
    engine.to(&s, 1.0, "visible", true).unwrap();

    engine.tick(UPDATE, 0.25);
    assert!(!s.borrow().visible);
    engine.tick(UPDATE, 0.5);
    assert!(s.borrow().visible);
}
