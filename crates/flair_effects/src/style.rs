//! Style output of interactive effects

use serde::{Deserialize, Serialize};

/// Transform and paint values an effect asks its element to apply
///
/// Angles are in degrees, translations in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionStyle {
    pub translate_x: f32,
    pub translate_y: f32,
    pub scale: f32,
    /// Rotation around the z axis
    pub rotate: f32,
    /// 3D tilt around the horizontal axis
    pub rotate_x: f32,
    /// 3D tilt around the vertical axis
    pub rotate_y: f32,
    pub opacity: f32,
    /// Glow intensity (0.0 to 1.0)
    pub glow: f32,
    /// Drop shadow strength (0.0 to 1.0)
    pub shadow: f32,
}

impl MotionStyle {
    pub const IDENTITY: MotionStyle = MotionStyle {
        translate_x: 0.0,
        translate_y: 0.0,
        scale: 1.0,
        rotate: 0.0,
        rotate_x: 0.0,
        rotate_y: 0.0,
        opacity: 1.0,
        glow: 0.0,
        shadow: 0.0,
    };

    pub fn translate(x: f32, y: f32) -> Self {
        Self {
            translate_x: x,
            translate_y: y,
            ..Self::IDENTITY
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Combine two styles: translations and rotations add, scales and
    /// opacities multiply, glow and shadow take the stronger value
    pub fn then(&self, other: &MotionStyle) -> MotionStyle {
        MotionStyle {
            translate_x: self.translate_x + other.translate_x,
            translate_y: self.translate_y + other.translate_y,
            scale: self.scale * other.scale,
            rotate: self.rotate + other.rotate,
            rotate_x: self.rotate_x + other.rotate_x,
            rotate_y: self.rotate_y + other.rotate_y,
            opacity: self.opacity * other.opacity,
            glow: self.glow.max(other.glow),
            shadow: self.shadow.max(other.shadow),
        }
    }
}

impl Default for MotionStyle {
    fn default() -> Self {
        Self::IDENTITY
    }
}
