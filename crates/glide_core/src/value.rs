//! Tweenable value arithmetic
//!
//! The engine never does math on concrete value kinds itself. Every type it can
//! interpolate exposes the handful of operations below, and the default value
//! plugin is written purely in terms of them.

/// Arithmetic a value type must provide to be interpolated.
pub trait TweenValue: Copy + std::fmt::Debug + 'static {
    /// Componentwise sum
    fn add(self, other: Self) -> Self;

    /// Componentwise difference
    fn sub(self, other: Self) -> Self;

    /// Multiply every component by `factor`
    fn scale(self, factor: f32) -> Self;

    /// Truncate every component toward zero (not rounding)
    fn truncate(self) -> Self;

    /// Length of the value, used for speed-based durations
    fn magnitude(self) -> f32;
}

impl TweenValue for f32 {
    #[inline]
    fn add(self, other: Self) -> Self {
        self + other
    }

    #[inline]
    fn sub(self, other: Self) -> Self {
        self - other
    }

    #[inline]
    fn scale(self, factor: f32) -> Self {
        self * factor
    }

    #[inline]
    fn truncate(self) -> Self {
        self.trunc()
    }

    #[inline]
    fn magnitude(self) -> f32 {
        self.abs()
    }
}

impl TweenValue for f64 {
    #[inline]
    fn add(self, other: Self) -> Self {
        self + other
    }

    #[inline]
    fn sub(self, other: Self) -> Self {
        self - other
    }

    #[inline]
    fn scale(self, factor: f32) -> Self {
        self * factor as f64
    }

    #[inline]
    fn truncate(self) -> Self {
        self.trunc()
    }

    #[inline]
    fn magnitude(self) -> f32 {
        self.abs() as f32
    }
}

/// Fixed-size float arrays cover 2D/3D vectors and RGBA colors.
impl<const N: usize> TweenValue for [f32; N] {
    fn add(self, other: Self) -> Self {
        let mut out = self;
        for (o, b) in out.iter_mut().zip(other) {
            *o += b;
        }
        out
    }

    fn sub(self, other: Self) -> Self {
        let mut out = self;
        for (o, b) in out.iter_mut().zip(other) {
            *o -= b;
        }
        out
    }

    fn scale(self, factor: f32) -> Self {
        self.map(|c| c * factor)
    }

    fn truncate(self) -> Self {
        self.map(f32::trunc)
    }

    fn magnitude(self) -> f32 {
        self.iter().map(|c| c * c).sum::<f32>().sqrt()
    }
}
