//! Shared fixtures for the integration tests
#![allow(dead_code)]

use glide_animation::{Ease, EngineConfig, TweenEngine};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct Sprite {
    pub x: f32,
    pub y: f32,
    pub alpha: f32,
    pub pos: [f32; 2],
    pub visible: bool,
}

pub type SpriteRef = Rc<RefCell<Sprite>>;

pub fn sprite(x: f32) -> SpriteRef {
    Rc::new(RefCell::new(Sprite {
        x,
        ..Default::default()
    }))
}

/// Engine with linear default easing and every `Sprite` property registered
pub fn engine() -> TweenEngine {
    engine_with(EngineConfig::default())
}

pub fn engine_with(config: EngineConfig) -> TweenEngine {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let mut engine = TweenEngine::with_config(config.ease(Ease::Linear));
    engine.register_property::<Sprite, f32>("x", |s| s.x, |s, v| s.x = v);
    engine.register_property::<Sprite, f32>("y", |s| s.y, |s, v| s.y = v);
    engine.register_property::<Sprite, f32>("alpha", |s| s.alpha, |s, v| s.alpha = v);
    engine.register_property::<Sprite, [f32; 2]>("pos", |s| s.pos, |s, v| s.pos = v);
    engine.register_property::<Sprite, bool>("visible", |s| s.visible, |s, v| s.visible = v);
    engine
}

pub fn assert_near(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-4,
        "expected {expected}, got {actual}"
    );
}
