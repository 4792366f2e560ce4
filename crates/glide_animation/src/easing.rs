//! Easing functions for tweens
//!
//! Every ease maps `(time, start, change, duration)` to a value, Penner style.
//! The engine always evaluates with `start = 0` and `change = 1`, which turns
//! the result into an interpolation factor. Elastic and back curves take the
//! extra overshoot/amplitude and period parameters.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Default overshoot for back eases (and amplitude for elastic ones)
pub const DEFAULT_OVERSHOOT_OR_AMPLITUDE: f32 = 1.70158;

/// Default elastic period; 0 lets the curve derive one from the duration
pub const DEFAULT_PERIOD: f32 = 0.0;

/// Signature of a host-supplied ease:
/// `(time, start, change, duration, overshoot_or_amplitude, period) -> value`
pub type EaseFn = fn(f32, f32, f32, f32, f32, f32) -> f32;

/// Easing function type
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub enum Ease {
    Linear,
    InSine,
    OutSine,
    InOutSine,
    InQuad,
    #[default]
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    InQuart,
    OutQuart,
    InOutQuart,
    InQuint,
    OutQuint,
    InOutQuint,
    InExpo,
    OutExpo,
    InOutExpo,
    InCirc,
    OutCirc,
    InOutCirc,
    InElastic,
    OutElastic,
    InOutElastic,
    InBack,
    OutBack,
    InOutBack,
    InBounce,
    OutBounce,
    InOutBounce,
    /// CSS-style cubic bezier with control points (x1, y1) and (x2, y2)
    CubicBezier(f32, f32, f32, f32),
    /// Host-supplied curve
    #[serde(skip)]
    Custom(EaseFn),
}

impl Ease {
    /// Evaluate the ease at `time` within `duration`
    pub fn evaluate(
        &self,
        time: f32,
        start: f32,
        change: f32,
        duration: f32,
        overshoot_or_amplitude: f32,
        period: f32,
    ) -> f32 {
        let (t, b, c, d) = (time, start, change, duration);
        match self {
            Ease::Linear => c * t / d + b,
            Ease::InSine => -c * (t / d * (PI / 2.0)).cos() + c + b,
            Ease::OutSine => c * (t / d * (PI / 2.0)).sin() + b,
            Ease::InOutSine => -c / 2.0 * ((PI * t / d).cos() - 1.0) + b,
            Ease::InQuad => {
                let t = t / d;
                c * t * t + b
            }
            Ease::OutQuad => {
                let t = t / d;
                -c * t * (t - 2.0) + b
            }
            Ease::InOutQuad => {
                let t = t / (d * 0.5);
                if t < 1.0 {
                    c * 0.5 * t * t + b
                } else {
                    let t = t - 1.0;
                    -c * 0.5 * (t * (t - 2.0) - 1.0) + b
                }
            }
            Ease::InCubic => {
                let t = t / d;
                c * t * t * t + b
            }
            Ease::OutCubic => {
                let t = t / d - 1.0;
                c * (t * t * t + 1.0) + b
            }
            Ease::InOutCubic => {
                let t = t / (d * 0.5);
                if t < 1.0 {
                    c * 0.5 * t * t * t + b
                } else {
                    let t = t - 2.0;
                    c * 0.5 * (t * t * t + 2.0) + b
                }
            }
            Ease::InQuart => {
                let t = t / d;
                c * t.powi(4) + b
            }
            Ease::OutQuart => {
                let t = t / d - 1.0;
                -c * (t.powi(4) - 1.0) + b
            }
            Ease::InOutQuart => {
                let t = t / (d * 0.5);
                if t < 1.0 {
                    c * 0.5 * t.powi(4) + b
                } else {
                    let t = t - 2.0;
                    -c * 0.5 * (t.powi(4) - 2.0) + b
                }
            }
            Ease::InQuint => {
                let t = t / d;
                c * t.powi(5) + b
            }
            Ease::OutQuint => {
                let t = t / d - 1.0;
                c * (t.powi(5) + 1.0) + b
            }
            Ease::InOutQuint => {
                let t = t / (d * 0.5);
                if t < 1.0 {
                    c * 0.5 * t.powi(5) + b
                } else {
                    let t = t - 2.0;
                    c * 0.5 * (t.powi(5) + 2.0) + b
                }
            }
            Ease::InExpo => {
                if t == 0.0 {
                    b
                } else {
                    c * 2f32.powf(10.0 * (t / d - 1.0)) + b - c * 0.001
                }
            }
            Ease::OutExpo => {
                if t == d {
                    b + c
                } else {
                    c * (-(2f32.powf(-10.0 * t / d)) + 1.0) + b
                }
            }
            Ease::InOutExpo => {
                if t == 0.0 {
                    return b;
                }
                if t == d {
                    return b + c;
                }
                let t = t / (d * 0.5);
                if t < 1.0 {
                    c * 0.5 * 2f32.powf(10.0 * (t - 1.0)) + b
                } else {
                    c * 0.5 * (-(2f32.powf(-10.0 * (t - 1.0))) + 2.0) + b
                }
            }
            Ease::InCirc => {
                let t = t / d;
                -c * ((1.0 - t * t).max(0.0).sqrt() - 1.0) + b
            }
            Ease::OutCirc => {
                let t = t / d - 1.0;
                c * (1.0 - t * t).max(0.0).sqrt() + b
            }
            Ease::InOutCirc => {
                let t = t / (d * 0.5);
                if t < 1.0 {
                    -c * 0.5 * ((1.0 - t * t).max(0.0).sqrt() - 1.0) + b
                } else {
                    let t = t - 2.0;
                    c * 0.5 * ((1.0 - t * t).max(0.0).sqrt() + 1.0) + b
                }
            }
            Ease::InElastic => elastic_in(t, b, c, d, overshoot_or_amplitude, period),
            Ease::OutElastic => elastic_out(t, b, c, d, overshoot_or_amplitude, period),
            Ease::InOutElastic => elastic_in_out(t, b, c, d, overshoot_or_amplitude, period),
            Ease::InBack => {
                let s = overshoot_or_amplitude;
                let t = t / d;
                c * t * t * ((s + 1.0) * t - s) + b
            }
            Ease::OutBack => {
                let s = overshoot_or_amplitude;
                let t = t / d - 1.0;
                c * (t * t * ((s + 1.0) * t + s) + 1.0) + b
            }
            Ease::InOutBack => {
                let s = overshoot_or_amplitude * 1.525;
                let t = t / (d * 0.5);
                if t < 1.0 {
                    c * 0.5 * (t * t * ((s + 1.0) * t - s)) + b
                } else {
                    let t = t - 2.0;
                    c * 0.5 * (t * t * ((s + 1.0) * t + s) + 2.0) + b
                }
            }
            Ease::InBounce => bounce_in(t, b, c, d),
            Ease::OutBounce => bounce_out(t, b, c, d),
            Ease::InOutBounce => {
                if t < d * 0.5 {
                    bounce_in(t * 2.0, 0.0, c, d) * 0.5 + b
                } else {
                    bounce_out(t * 2.0 - d, 0.0, c, d) * 0.5 + c * 0.5 + b
                }
            }
            Ease::CubicBezier(x1, y1, x2, y2) => {
                c * cubic_bezier_ease(t / d, *x1, *y1, *x2, *y2) + b
            }
            Ease::Custom(f) => f(t, b, c, d, overshoot_or_amplitude, period),
        }
    }

    /// Interpolation factor for normalized progress `t` in [0, 1]
    pub fn factor(&self, t: f32) -> f32 {
        self.evaluate(
            t,
            0.0,
            1.0,
            1.0,
            DEFAULT_OVERSHOOT_OR_AMPLITUDE,
            DEFAULT_PERIOD,
        )
    }
}

/// Elastic amplitude and phase shift for a given change and period
fn elastic_shape(c: f32, a: f32, p: f32) -> (f32, f32) {
    if a == 0.0 || a < c.abs() {
        (c, p / 4.0)
    } else {
        (a, p / (2.0 * PI) * (c / a).asin())
    }
}

fn elastic_in(t: f32, b: f32, c: f32, d: f32, a: f32, p: f32) -> f32 {
    if t == 0.0 {
        return b;
    }
    let t = t / d;
    if t == 1.0 {
        return b + c;
    }
    let p = if p == 0.0 { d * 0.3 } else { p };
    let (a, s) = elastic_shape(c, a, p);
    let t = t - 1.0;
    -(a * 2f32.powf(10.0 * t) * ((t * d - s) * (2.0 * PI) / p).sin()) + b
}

fn elastic_out(t: f32, b: f32, c: f32, d: f32, a: f32, p: f32) -> f32 {
    if t == 0.0 {
        return b;
    }
    let t = t / d;
    if t == 1.0 {
        return b + c;
    }
    let p = if p == 0.0 { d * 0.3 } else { p };
    let (a, s) = elastic_shape(c, a, p);
    a * 2f32.powf(-10.0 * t) * ((t * d - s) * (2.0 * PI) / p).sin() + c + b
}

fn elastic_in_out(t: f32, b: f32, c: f32, d: f32, a: f32, p: f32) -> f32 {
    if t == 0.0 {
        return b;
    }
    let t = t / (d * 0.5);
    if t == 2.0 {
        return b + c;
    }
    let p = if p == 0.0 { d * (0.3 * 1.5) } else { p };
    let (a, s) = elastic_shape(c, a, p);
    let t = t - 1.0;
    if t < 0.0 {
        -0.5 * (a * 2f32.powf(10.0 * t) * ((t * d - s) * (2.0 * PI) / p).sin()) + b
    } else {
        a * 2f32.powf(-10.0 * t) * ((t * d - s) * (2.0 * PI) / p).sin() * 0.5 + c + b
    }
}

fn bounce_out(t: f32, b: f32, c: f32, d: f32) -> f32 {
    let n1 = 7.5625;
    let d1 = 2.75;
    let t = t / d;

    if t < 1.0 / d1 {
        c * (n1 * t * t) + b
    } else if t < 2.0 / d1 {
        let t = t - 1.5 / d1;
        c * (n1 * t * t + 0.75) + b
    } else if t < 2.5 / d1 {
        let t = t - 2.25 / d1;
        c * (n1 * t * t + 0.9375) + b
    } else {
        let t = t - 2.625 / d1;
        c * (n1 * t * t + 0.984375) + b
    }
}

fn bounce_in(t: f32, b: f32, c: f32, d: f32) -> f32 {
    c - bounce_out(d - t, 0.0, c, d) + b
}

/// One axis of a CSS cubic bezier with fixed end points (0, 0) and (1, 1)
#[derive(Clone, Copy)]
struct BezierAxis {
    a: f64,
    b: f64,
    c: f64,
}

impl BezierAxis {
    fn new(p1: f32, p2: f32) -> Self {
        let (p1, p2) = (p1 as f64, p2 as f64);
        Self {
            a: 1.0 - 3.0 * p2 + 3.0 * p1,
            b: 3.0 * p2 - 6.0 * p1,
            c: 3.0 * p1,
        }
    }

    /// Coordinate at curve parameter `u`
    fn at(self, u: f64) -> f64 {
        ((self.a * u + self.b) * u + self.c) * u
    }

    fn derivative(self, u: f64) -> f64 {
        (3.0 * self.a * u + 2.0 * self.b) * u + self.c
    }

    /// Curve parameter whose coordinate is `x`
    ///
    /// Newton steps first; bisection when the slope flattens out.
    fn solve(self, x: f64) -> f64 {
        const EPSILON: f64 = 1e-7;

        let mut u = x;
        for _ in 0..8 {
            let err = self.at(u) - x;
            if err.abs() < EPSILON {
                return u;
            }
            let slope = self.derivative(u);
            if slope.abs() < EPSILON {
                break;
            }
            u -= err / slope;
        }

        let (mut lo, mut hi) = (0.0, 1.0);
        u = x;
        for _ in 0..20 {
            let value = self.at(u);
            if (value - x).abs() < EPSILON {
                break;
            }
            if value < x {
                lo = u;
            } else {
                hi = u;
            }
            u = (lo + hi) * 0.5;
        }
        u
    }
}

/// Progress on `cubic-bezier(x1, y1, x2, y2)` at time fraction `t`
///
/// Solved in f64 so high frame rates do not jitter.
fn cubic_bezier_ease(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let u = BezierAxis::new(x1, x2).solve(t as f64);
    BezierAxis::new(y1, y2).at(u) as f32
}
