//! Declarative background renderers
//!
//! Each renderer turns a [`BackgroundEffectConfig`] and a surface size into a
//! fixed set of generated shapes, then gives every shape its own endless
//! loop. Generation is seeded from the config, so the same config always
//! produces the same geometry, and it only reruns when the config or the
//! size actually changes.
//!
//! Loops live in a [`MotionGate`](crate::motion_policy::MotionGate): under
//! reduced motion none are registered and every renderer reports static
//! final-state geometry, and a preference change takes effect immediately.
//! The same static geometry is the server-render fallback.

pub mod aurora;
pub mod beams;
pub mod grid_dots;
pub mod moving_border;
pub mod particles;
mod seed;

use flair_core::{Color, Size};
use serde::{Deserialize, Serialize};

pub use aurora::{Aurora, AuroraConfig, AuroraFrame};
pub use beams::{Beam, BeamFrame, Beams, DividerFrame, SectionDivider};
pub use grid_dots::{DotFrame, GridDots, GridDotsConfig};
pub use moving_border::{MovingBorder, MovingBorderConfig, MovingBorderFrame};
pub use particles::{Particle, ParticleFrame, Particles};
pub use seed::{config_seed, loop_timing, LoopTiming};

/// Immutable description of a decorative background
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundEffectConfig {
    /// Palette, cycled by shape index
    pub colors: Vec<Color>,
    /// Blur radius in pixels, passed through to the host
    pub blur: f32,
    /// Loop speed multiplier; 2.0 runs loops twice as fast
    pub speed: f32,
    /// Number of generated shapes
    pub density: u32,
}

impl Default for BackgroundEffectConfig {
    fn default() -> Self {
        Self {
            colors: vec![
                Color::from_hex(0x18CCFC),
                Color::from_hex(0x6344F5),
                Color::from_hex(0xAE48FF),
            ],
            blur: 0.0,
            speed: 1.0,
            density: 20,
        }
    }
}

impl BackgroundEffectConfig {
    pub fn with_density(mut self, density: u32) -> Self {
        self.density = density;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_colors(mut self, colors: impl IntoIterator<Item = Color>) -> Self {
        self.colors = colors.into_iter().collect();
        self
    }

    /// Copy with out-of-range values replaced by usable ones
    pub(crate) fn sanitized(&self) -> Self {
        let mut config = self.clone();
        if !(config.speed > 0.0) || !config.speed.is_finite() {
            tracing::warn!(speed = config.speed, "invalid background speed, using 1");
            config.speed = 1.0;
        }
        if !(config.blur >= 0.0) {
            config.blur = 0.0;
        }
        if config.colors.is_empty() {
            tracing::warn!("empty background palette, using white");
            config.colors.push(Color::WHITE);
        }
        config
    }

    /// Palette color for shape `index`
    pub fn color_at(&self, index: usize) -> Color {
        if self.colors.is_empty() {
            return Color::WHITE;
        }
        self.colors[index % self.colors.len()]
    }
}

/// Tracks which config and size the current generation was built from
#[derive(Debug, Default)]
pub(crate) struct GenerationKey {
    current: Option<(BackgroundEffectConfig, Size)>,
    generation: u64,
}

impl GenerationKey {
    /// Record `config` at `size`, returning true when it differs from the
    /// last recorded pair
    pub(crate) fn update(&mut self, config: &BackgroundEffectConfig, size: Size) -> bool {
        match &self.current {
            Some((c, s)) if c == config && *s == size => false,
            _ => {
                self.current = Some((config.clone(), size));
                self.generation += 1;
                true
            }
        }
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}
