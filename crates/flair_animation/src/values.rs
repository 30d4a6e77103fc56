//! Animatable value types
//!
//! Linear interpolation for the value types effects animate, plus the
//! range mapping helpers used to turn scroll progress into output values.

use flair_core::{Color, Point, Vec2};

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Check if two values are approximately equal
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool;
}

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self - other).abs() < epsilon
    }
}

impl Interpolate for Point {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Point::lerp(self, *other, t)
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon && (self.y - other.y).abs() < epsilon
    }
}

impl Interpolate for Vec2 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Vec2::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon && (self.y - other.y).abs() < epsilon
    }
}

impl Interpolate for Color {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Color::lerp(self, other, t)
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.r - other.r).abs() < epsilon
            && (self.g - other.g).abs() < epsilon
            && (self.b - other.b).abs() < epsilon
            && (self.a - other.a).abs() < epsilon
    }
}

/// Map `value` from `input` range to `output` range, clamped to the output
///
/// A zero-width input range behaves as a step at `input.0`.
pub fn remap(value: f32, input: (f32, f32), output: (f32, f32)) -> f32 {
    let span = input.1 - input.0;
    let t = if span.abs() < f32::EPSILON {
        if value >= input.0 {
            1.0
        } else {
            0.0
        }
    } else {
        ((value - input.0) / span).clamp(0.0, 1.0)
    };
    if t.is_nan() {
        return output.0;
    }
    output.0 + (output.1 - output.0) * t
}

/// Piecewise-linear mapping through matching `inputs` and `outputs`
///
/// `inputs` must be ascending. Values outside the inputs clamp to the
/// first or last output. Empty slices return `T::default()`.
pub fn interpolate<T: Interpolate + Default>(value: f32, inputs: &[f32], outputs: &[T]) -> T {
    let n = inputs.len().min(outputs.len());
    if n == 0 {
        return T::default();
    }
    if n == 1 || value.is_nan() || value <= inputs[0] {
        return outputs[0].clone();
    }
    if value >= inputs[n - 1] {
        return outputs[n - 1].clone();
    }

    for i in 1..n {
        if value <= inputs[i] {
            let (lo, hi) = (inputs[i - 1], inputs[i]);
            let span = hi - lo;
            let t = if span.abs() < f32::EPSILON {
                1.0
            } else {
                (value - lo) / span
            };
            return outputs[i - 1].lerp(&outputs[i], t);
        }
    }
    outputs[n - 1].clone()
}
