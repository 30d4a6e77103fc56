//! Twinkling particle field
//!
//! Seeded points scattered over the surface. Each particle pulses its
//! opacity on its own index-phased loop, and the whole field drifts slowly
//! on one shared clock.

use std::f32::consts::TAU;

use flair_animation::{AnimatedKeyframe, Easing, KeyframeAnimation, Repeat, SchedulerHandle};
use flair_core::{Color, Point, Size, Vec2};

use crate::context::EffectContext;
use crate::motion_policy::MotionGate;
use crate::ssr::{Phase, SsrGate};

use super::seed::{loop_timing, rng_for, sample_span};
use super::{BackgroundEffectConfig, GenerationKey};

const PULSE_MS: u32 = 2_000;
const DRIFT_MS: u32 = 20_000;
/// Opacity at the bottom of a pulse
const MIN_OPACITY: f32 = 0.2;

/// One generated particle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Resting position in surface pixels
    pub position: Point,
    pub radius: f32,
    pub color: Color,
    /// Drift amplitude in pixels on each axis
    pub drift: Vec2,
    /// Drift phase in radians
    pub phase: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleFrame {
    pub center: Point,
    pub radius: f32,
    pub color: Color,
    pub opacity: f32,
}

struct FieldLoops {
    pulses: Vec<AnimatedKeyframe>,
    drift: AnimatedKeyframe,
}

pub struct Particles {
    scheduler: SchedulerHandle,
    config: BackgroundEffectConfig,
    key: GenerationKey,
    particles: Vec<Particle>,
    loops: MotionGate<FieldLoops>,
    ssr: SsrGate,
}

impl Particles {
    pub fn new(
        ctx: &EffectContext,
        config: &BackgroundEffectConfig,
        size: Size,
        disable_animation: Option<bool>,
    ) -> Self {
        let mut particles = Self {
            scheduler: ctx.scheduler().clone(),
            config: config.sanitized(),
            key: GenerationKey::default(),
            particles: Vec::new(),
            loops: MotionGate::new(ctx.motion(), disable_animation, || None),
            ssr: SsrGate::new(ctx.mount()),
        };
        particles.update(config, size);
        particles
    }

    /// Returns true when the field was regenerated
    pub fn update(&mut self, config: &BackgroundEffectConfig, size: Size) -> bool {
        let config = config.sanitized();
        if !self.key.update(&config, size) {
            return false;
        }
        self.config = config;
        self.particles = generate(&self.config, size);

        let count = self.particles.len();
        let speed = self.config.speed;
        let scheduler = self.scheduler.clone();
        self.loops.rebuild(move || {
            if count == 0 {
                return None;
            }
            let pulses = (0..count)
                .map(|i| {
                    let timing = loop_timing(i, PULSE_MS, speed);
                    let anim = KeyframeAnimation::from_values(
                        (timing.duration_ms / 2).max(1),
                        &[MIN_OPACITY, 1.0],
                        Easing::EaseInOutSine,
                    )
                    .delay(timing.delay_ms)
                    .repeat(Repeat::Infinite)
                    .alternate(true);
                    AnimatedKeyframe::started(scheduler.clone(), anim)
                })
                .collect();
            let drift = KeyframeAnimation::from_values(
                (DRIFT_MS as f32 / speed).round().max(1.0) as u32,
                &[0.0, TAU],
                Easing::Linear,
            )
            .repeat(Repeat::Infinite);
            Some(FieldLoops {
                pulses,
                drift: AnimatedKeyframe::started(scheduler.clone(), drift),
            })
        });
        tracing::debug!(
            particles = count,
            generation = self.key.generation(),
            "particle field regenerated"
        );
        true
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Every particle for this render
    ///
    /// Particles sit still and fully opaque under reduced motion and before
    /// the component is live.
    pub fn frame(&self) -> Vec<ParticleFrame> {
        let live = self.ssr.begin_render() == Phase::Live;
        let animated = if live {
            self.loops.with(|loops| {
                let clock = loops.drift.get();
                let opacities: Vec<f32> = loops.pulses.iter().map(|l| l.get()).collect();
                (clock, opacities)
            })
        } else {
            None
        };

        self.particles
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let (center, opacity) = match &animated {
                    Some((clock, opacities)) => {
                        let angle = clock + p.phase;
                        (
                            Point::new(
                                p.position.x + p.drift.x * angle.sin(),
                                p.position.y + p.drift.y * angle.cos(),
                            ),
                            opacities.get(i).copied().unwrap_or(1.0),
                        )
                    }
                    None => (p.position, 1.0),
                };
                ParticleFrame {
                    center,
                    radius: p.radius,
                    color: p.color,
                    opacity,
                }
            })
            .collect()
    }

    pub fn blur(&self) -> f32 {
        self.config.blur
    }

    pub fn generation(&self) -> u64 {
        self.key.generation()
    }

    pub fn is_animating(&self) -> bool {
        self.loops
            .with(|loops| loops.drift.is_playing())
            .unwrap_or(false)
    }
}

fn generate(config: &BackgroundEffectConfig, size: Size) -> Vec<Particle> {
    if size.is_empty() {
        return Vec::new();
    }
    if config.density == 0 {
        tracing::warn!("zero particle count, nothing to draw");
        return Vec::new();
    }
    let mut rng = rng_for(config, "particles", size);
    (0..config.density as usize)
        .map(|i| Particle {
            position: Point::new(
                sample_span(&mut rng, 0.0, size.width),
                sample_span(&mut rng, 0.0, size.height),
            ),
            radius: sample_span(&mut rng, 0.5, 2.0),
            color: config.color_at(i),
            drift: Vec2::new(
                sample_span(&mut rng, 2.0, 12.0),
                sample_span(&mut rng, 2.0, 12.0),
            ),
            phase: sample_span(&mut rng, 0.0, TAU),
        })
        .collect()
}

impl std::fmt::Debug for Particles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Particles")
            .field("particles", &self.particles.len())
            .field("generation", &self.key.generation())
            .field("looping", &self.loops.is_live())
            .finish()
    }
}
