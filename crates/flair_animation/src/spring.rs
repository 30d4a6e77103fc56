//! Spring smoothing
//!
//! A damped harmonic oscillator that turns a (possibly moving) target into a
//! smoothly animated value. [`SpringState`] is plain data: [`SpringState::update`]
//! and [`SpringState::set_target`] are pure functions returning a new state, and
//! the in-place [`SpringState::step`] used by the scheduler is defined in terms
//! of them.
//!
//! Integration is semi-implicit Euler:
//!
//! ```text
//! acceleration = (stiffness * (target - value) - damping * velocity) / mass
//! velocity    += acceleration * dt
//! value       += velocity * dt
//! ```
//!
//! Large frame deltas are split into substeps of at most [`MAX_SUBSTEP`] so a
//! stalled frame never destabilizes a stiff spring.

use serde::{Deserialize, Serialize};

/// Longest single integration step, in seconds
pub const MAX_SUBSTEP: f32 = 1.0 / 240.0;

/// Longest frame delta accepted by one update, in seconds
///
/// Anything longer (a backgrounded tab, a debugger pause) is treated as this.
pub const MAX_FRAME_DELTA: f32 = 0.25;

/// Configuration for a spring
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
    /// Both `|target - value|` and `|velocity|` must fall below this to settle
    pub epsilon: f32,
}

impl SpringConfig {
    /// Create a new spring configuration with the default rest epsilon
    pub fn new(stiffness: f32, damping: f32, mass: f32) -> Self {
        Self {
            stiffness,
            damping,
            mass,
            epsilon: 0.001,
        }
    }

    /// Override the rest epsilon
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// General-purpose effect spring, just past critical damping
    pub fn smooth() -> Self {
        Self::new(150.0, 25.0, 1.0)
    }

    /// Snappy spring for hover feedback (tilt, zoom, lift)
    pub fn responsive() -> Self {
        Self::new(300.0, 35.0, 1.0)
    }

    /// Light, heavily damped spring for magnetic pull
    pub fn magnetic() -> Self {
        Self::new(150.0, 15.0, 0.1)
    }

    /// Slow spring for opacity fades and scroll smoothing
    pub fn gentle() -> Self {
        Self::new(120.0, 22.0, 1.0)
    }

    /// Calculate critical damping for this spring's stiffness and mass
    pub fn critical_damping(&self) -> f32 {
        2.0 * (self.stiffness * self.mass).sqrt()
    }

    /// Damping ratio (1.0 = critically damped)
    pub fn damping_ratio(&self) -> f32 {
        let critical = self.critical_damping();
        if critical <= 0.0 {
            return f32::INFINITY;
        }
        self.damping / critical
    }

    /// Check if the spring is underdamped (will oscillate)
    pub fn is_underdamped(&self) -> bool {
        self.damping_ratio() < 1.0
    }

    /// Theoretical peak overshoot as a fraction of the step size
    ///
    /// `exp(-πζ / √(1-ζ²))` for underdamped springs, zero otherwise.
    pub fn overshoot_bound(&self) -> f32 {
        let zeta = self.damping_ratio();
        if zeta >= 1.0 {
            return 0.0;
        }
        (-std::f32::consts::PI * zeta / (1.0 - zeta * zeta).sqrt()).exp()
    }

    /// Whether the parameters can drive a simulation at all
    pub fn is_valid(&self) -> bool {
        self.stiffness.is_finite()
            && self.damping.is_finite()
            && self.mass.is_finite()
            && self.stiffness > 0.0
            && self.damping >= 0.0
            && self.mass > 0.0
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::smooth()
    }
}

/// State of one spring: value, velocity, target, and parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringState {
    config: SpringConfig,
    value: f32,
    velocity: f32,
    target: f32,
}

impl SpringState {
    /// A spring at rest at `initial`
    ///
    /// Invalid configurations fall back to [`SpringConfig::smooth`].
    pub fn new(config: SpringConfig, initial: f32) -> Self {
        let config = if config.is_valid() {
            config
        } else {
            tracing::warn!(?config, "invalid spring config, using smooth()");
            SpringConfig::smooth()
        };
        Self {
            config,
            value: initial,
            velocity: 0.0,
            target: initial,
        }
    }

    pub fn config(&self) -> SpringConfig {
        self.config
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    /// New state with a different target; value and velocity are untouched
    #[must_use]
    pub fn set_target(self, target: f32) -> Self {
        if !target.is_finite() {
            return self;
        }
        Self { target, ..self }
    }

    /// Whether the spring is within epsilon of its target and nearly still
    pub fn is_converged(&self) -> bool {
        let eps = self.config.epsilon;
        (self.target - self.value).abs() < eps && self.velocity.abs() < eps
    }

    /// New state after `dt` seconds
    ///
    /// A converged spring snaps exactly onto its target with zero velocity.
    #[must_use]
    pub fn update(self, dt: f32) -> Self {
        if self.is_converged() {
            return Self {
                value: self.target,
                velocity: 0.0,
                ..self
            };
        }
        if !(dt > 0.0) {
            return self;
        }

        let dt = dt.min(MAX_FRAME_DELTA);
        let steps = (dt / MAX_SUBSTEP).ceil().max(1.0) as u32;
        let h = dt / steps as f32;

        let SpringConfig {
            stiffness,
            damping,
            mass,
            ..
        } = self.config;
        let mut value = self.value;
        let mut velocity = self.velocity;
        for _ in 0..steps {
            let acceleration = (stiffness * (self.target - value) - damping * velocity) / mass;
            velocity += acceleration * h;
            value += velocity * h;
        }

        let next = Self {
            value,
            velocity,
            ..self
        };
        if next.is_converged() {
            Self {
                value: next.target,
                velocity: 0.0,
                ..next
            }
        } else {
            next
        }
    }

    /// In-place variant of [`update`](Self::update)
    pub fn step(&mut self, dt: f32) {
        *self = self.update(dt);
    }

    /// In-place variant of [`set_target`](Self::set_target)
    pub fn retarget(&mut self, target: f32) {
        *self = self.set_target(target);
    }

    /// Jump to `value` with no velocity, target included
    pub fn snap(&mut self, value: f32) {
        self.value = value;
        self.target = value;
        self.velocity = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    #[test]
    fn test_spring_settles_to_target() {
        let mut spring = SpringState::new(SpringConfig::smooth(), 0.0).set_target(100.0);

        for _ in 0..240 {
            spring.step(FRAME);
        }

        assert!(spring.is_converged());
        assert_eq!(spring.value(), 100.0);
        assert_eq!(spring.velocity(), 0.0);
    }

    #[test]
    fn test_set_target_keeps_motion_continuous() {
        let mut spring = SpringState::new(SpringConfig::smooth(), 0.0).set_target(100.0);
        for _ in 0..10 {
            spring.step(FRAME);
        }

        let before = spring;
        let retargeted = spring.set_target(50.0);
        assert_eq!(retargeted.value(), before.value());
        assert_eq!(retargeted.velocity(), before.velocity());
        assert_eq!(retargeted.target(), 50.0);
    }

    #[test]
    fn test_update_is_pure() {
        let spring = SpringState::new(SpringConfig::smooth(), 0.0).set_target(10.0);
        let a = spring.update(FRAME);
        let b = spring.update(FRAME);
        assert_eq!(a, b);
        assert_eq!(spring.value(), 0.0);
    }

    #[test]
    fn test_retarget_every_frame_then_converge() {
        let mut spring = SpringState::new(SpringConfig::responsive(), 0.0);
        for i in 0..120 {
            spring.retarget((i as f32 * 0.37).sin() * 40.0);
            spring.step(FRAME);
            assert!(spring.value().is_finite());
        }

        spring.retarget(12.0);
        let mut steps = 0;
        while !spring.is_converged() {
            spring.step(FRAME);
            steps += 1;
            assert!(steps < 600, "spring failed to converge");
        }
        assert_eq!(spring.value(), 12.0);
    }

    #[test]
    fn test_overshoot_stays_within_bound() {
        for config in [
            SpringConfig::smooth(),
            SpringConfig::responsive(),
            SpringConfig::magnetic(),
            SpringConfig::gentle(),
            SpringConfig::new(180.0, 12.0, 1.0),
        ] {
            let mut spring = SpringState::new(config, 0.0).set_target(100.0);
            let mut peak: f32 = 0.0;
            for _ in 0..600 {
                spring.step(FRAME);
                peak = peak.max(spring.value());
            }
            let overshoot = (peak - 100.0).max(0.0) / 100.0;
            assert!(
                overshoot <= config.overshoot_bound() + 0.03,
                "{config:?}: overshoot {overshoot} exceeds bound {}",
                config.overshoot_bound()
            );
        }
    }

    #[test]
    fn test_large_dt_is_stable() {
        let mut spring = SpringState::new(SpringConfig::responsive(), 0.0).set_target(1000.0);
        for _ in 0..100 {
            spring.step(0.5);
            assert!(spring.value() < 1100.0);
            assert!(spring.value() > -100.0);
        }
        assert!(spring.is_converged());
    }

    #[test]
    fn test_invalid_inputs_are_ignored() {
        let spring = SpringState::new(SpringConfig::new(-1.0, 10.0, 1.0), 5.0);
        assert_eq!(spring.config(), SpringConfig::smooth());

        let spring = spring.set_target(f32::NAN);
        assert_eq!(spring.target(), 5.0);

        let moved = spring.set_target(10.0);
        assert_eq!(moved.update(-1.0), moved);
        assert_eq!(moved.update(f32::NAN), moved);
    }

    #[test]
    fn test_presets_feel_critically_damped() {
        assert!(!SpringConfig::smooth().is_underdamped());
        assert!(!SpringConfig::magnetic().is_underdamped());
        assert!(SpringConfig::responsive().overshoot_bound() < 0.01);
        assert!(SpringConfig::new(180.0, 12.0, 1.0).is_underdamped());
    }
}
