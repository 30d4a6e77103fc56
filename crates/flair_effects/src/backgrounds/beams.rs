//! Light beams and section dividers
//!
//! Beams are seeded cubic paths sweeping from below the surface to above it.
//! Each beam draws itself in and back out (`path_length` 0 to 1 to 0) on its
//! own loop. A section divider is the one-beam case: a straight horizontal
//! stroke with an optional highlight sweeping along it.

use flair_animation::{AnimatedKeyframe, Easing, KeyframeAnimation, Repeat, SchedulerHandle};
use flair_core::{Color, Gradient, Path, Point, Size};

use crate::context::EffectContext;
use crate::motion_policy::MotionGate;
use crate::ssr::{Phase, SsrGate};

use super::seed::{loop_timing, rng_for, sample_span, LoopTiming};
use super::{BackgroundEffectConfig, GenerationKey};

/// Base duration of one draw-in and draw-out cycle
const BEAM_CYCLE_MS: u32 = 10_000;
const DIVIDER_SWEEP_MS: u32 = 3_000;

/// One generated beam
#[derive(Clone, Debug, PartialEq)]
pub struct Beam {
    pub path: Path,
    pub color: Color,
    pub stroke_width: f32,
}

/// A beam as it should be drawn this frame
#[derive(Clone, Copy, Debug)]
pub struct BeamFrame<'a> {
    pub beam: &'a Beam,
    /// Visible fraction of the path (0.0 to 1.0)
    pub path_length: f32,
}

pub struct Beams {
    scheduler: SchedulerHandle,
    config: BackgroundEffectConfig,
    size: Size,
    key: GenerationKey,
    beams: Vec<Beam>,
    loops: MotionGate<Vec<AnimatedKeyframe>>,
    ssr: SsrGate,
}

impl Beams {
    pub fn new(
        ctx: &EffectContext,
        config: &BackgroundEffectConfig,
        size: Size,
        disable_animation: Option<bool>,
    ) -> Self {
        let mut beams = Self {
            scheduler: ctx.scheduler().clone(),
            config: config.sanitized(),
            size,
            key: GenerationKey::default(),
            beams: Vec::new(),
            loops: MotionGate::new(ctx.motion(), disable_animation, || None),
            ssr: SsrGate::new(ctx.mount()),
        };
        beams.update(config, size);
        beams
    }

    /// Apply a possibly new config or size
    ///
    /// Returns true when the beams were regenerated.
    pub fn update(&mut self, config: &BackgroundEffectConfig, size: Size) -> bool {
        let config = config.sanitized();
        if !self.key.update(&config, size) {
            return false;
        }
        self.config = config;
        self.size = size;
        self.beams = generate(&self.config, size);

        let timings: Vec<LoopTiming> = (0..self.beams.len())
            .map(|i| loop_timing(i, BEAM_CYCLE_MS, self.config.speed))
            .collect();
        let scheduler = self.scheduler.clone();
        self.loops.rebuild(move || {
            Some(
                timings
                    .iter()
                    .map(|timing| {
                        let anim = KeyframeAnimation::from_values(
                            timing.duration_ms,
                            &[0.0, 1.0, 0.0],
                            Easing::EaseInOut,
                        )
                        .delay(timing.delay_ms)
                        .repeat(Repeat::Infinite);
                        AnimatedKeyframe::started(scheduler.clone(), anim)
                    })
                    .collect(),
            )
        });
        tracing::debug!(
            beams = self.beams.len(),
            generation = self.key.generation(),
            "beams regenerated"
        );
        true
    }

    pub fn beams(&self) -> &[Beam] {
        &self.beams
    }

    /// Visible fraction of beam `index`; fully drawn under reduced motion
    /// and before the component is live
    pub fn path_length(&self, index: usize) -> f32 {
        if self.ssr.phase() == Phase::Fallback {
            return 1.0;
        }
        self.live_path_length(index)
    }

    fn live_path_length(&self, index: usize) -> f32 {
        self.loops
            .with(|loops| loops.get(index).map(|l| l.get()))
            .flatten()
            .unwrap_or(1.0)
    }

    /// Every beam for this render
    pub fn frame(&self) -> Vec<BeamFrame<'_>> {
        let live = self.ssr.begin_render() == Phase::Live;
        self.beams
            .iter()
            .enumerate()
            .map(|(i, beam)| BeamFrame {
                beam,
                path_length: if live { self.live_path_length(i) } else { 1.0 },
            })
            .collect()
    }

    pub fn blur(&self) -> f32 {
        self.config.blur
    }

    /// How many times geometry has been generated
    pub fn generation(&self) -> u64 {
        self.key.generation()
    }

    pub fn is_animating(&self) -> bool {
        self.loops
            .with(|loops| loops.iter().any(|l| l.is_playing()))
            .unwrap_or(false)
    }
}

fn generate(config: &BackgroundEffectConfig, size: Size) -> Vec<Beam> {
    if size.is_empty() {
        return Vec::new();
    }
    if config.density == 0 {
        tracing::warn!("zero beam count, nothing to draw");
        return Vec::new();
    }
    let (w, h) = (size.width, size.height);
    let mut rng = rng_for(config, "beams", size);
    (0..config.density as usize)
        .map(|i| {
            let start = Point::new(sample_span(&mut rng, -0.3 * w, 0.7 * w), h + 20.0);
            let end = Point::new(start.x + sample_span(&mut rng, 0.4 * w, 0.8 * w), -20.0);
            let c1 = Point::new(
                start.x + sample_span(&mut rng, 0.0, 0.2 * w),
                h * sample_span(&mut rng, 0.5, 0.8),
            );
            let c2 = Point::new(
                end.x - sample_span(&mut rng, 0.0, 0.2 * w),
                h * sample_span(&mut rng, 0.2, 0.5),
            );
            Beam {
                path: Path::new()
                    .move_to(start.x, start.y)
                    .cubic_to(c1.x, c1.y, c2.x, c2.y, end.x, end.y),
                color: config.color_at(i),
                stroke_width: sample_span(&mut rng, 0.5, 1.5),
            }
        })
        .collect()
}

impl std::fmt::Debug for Beams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Beams")
            .field("beams", &self.beams.len())
            .field("generation", &self.key.generation())
            .field("looping", &self.loops.is_live())
            .finish()
    }
}

/// Divider geometry and highlight for one render
#[derive(Clone, Debug, PartialEq)]
pub struct DividerFrame {
    pub gradient: Gradient,
    /// Highlight position as a fraction of the width, if sweeping
    pub sweep: Option<f32>,
}

/// Horizontal gradient rule between page sections
pub struct SectionDivider {
    colors: Vec<Color>,
    width: f32,
    path: Path,
    sweep: Option<MotionGate<AnimatedKeyframe>>,
    ssr: SsrGate,
}

impl SectionDivider {
    /// `sweep` adds a highlight travelling left to right along the rule
    pub fn new(
        ctx: &EffectContext,
        config: &BackgroundEffectConfig,
        width: f32,
        sweep: bool,
        disable_animation: Option<bool>,
    ) -> Self {
        let config = config.sanitized();
        let sweep = sweep.then(|| {
            let timing = loop_timing(0, DIVIDER_SWEEP_MS, config.speed);
            let scheduler = ctx.scheduler().clone();
            MotionGate::new(ctx.motion(), disable_animation, move || {
                let anim =
                    KeyframeAnimation::from_values(timing.duration_ms, &[0.0, 1.0], Easing::EaseInOut)
                        .repeat(Repeat::Infinite);
                Some(AnimatedKeyframe::started(scheduler.clone(), anim))
            })
        });
        Self {
            colors: config.colors,
            width,
            path: divider_path(width),
            sweep,
            ssr: SsrGate::new(ctx.mount()),
        }
    }

    pub fn set_width(&mut self, width: f32) {
        if width != self.width {
            self.width = width;
            self.path = divider_path(width);
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Palette faded to transparent at both ends
    pub fn gradient(&self) -> Gradient {
        let mut palette = Vec::with_capacity(self.colors.len() + 2);
        palette.push(Color::TRANSPARENT);
        palette.extend_from_slice(&self.colors);
        palette.push(Color::TRANSPARENT);
        Gradient::linear_palette(Point::ZERO, Point::new(self.width, 0.0), &palette)
    }

    /// Highlight position as a fraction of the width, if sweeping
    pub fn sweep_position(&self) -> Option<f32> {
        if self.ssr.phase() == Phase::Fallback {
            return None;
        }
        self.live_sweep()
    }

    fn live_sweep(&self) -> Option<f32> {
        self.sweep.as_ref()?.with(|s| s.get())
    }

    pub fn frame(&self) -> DividerFrame {
        let sweep = match self.ssr.begin_render() {
            Phase::Fallback => None,
            Phase::Live => self.live_sweep(),
        };
        DividerFrame {
            gradient: self.gradient(),
            sweep,
        }
    }

    pub fn is_animating(&self) -> bool {
        self.sweep
            .as_ref()
            .and_then(|s| s.with(|k| k.is_playing()))
            .unwrap_or(false)
    }
}

fn divider_path(width: f32) -> Path {
    Path::new().move_to(0.0, 0.0).line_to(width.max(0.0), 0.0)
}

impl std::fmt::Debug for SectionDivider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionDivider")
            .field("width", &self.width)
            .field("sweep", &self.sweep_position())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EffectRuntime;
    use crate::motion_policy::{ManualMediaQuery, StaticMediaQuery};

    const SIZE: Size = Size::new(1200.0, 600.0);

    #[test]
    fn test_generation_is_deterministic() {
        let runtime = EffectRuntime::headless(SIZE);
        let config = BackgroundEffectConfig::default().with_density(6);
        let a = Beams::new(&runtime.context(), &config, SIZE, None);
        let b = Beams::new(&runtime.context(), &config, SIZE, None);
        assert_eq!(a.beams(), b.beams());
        assert_eq!(a.beams().len(), 6);
    }

    #[test]
    fn test_regenerates_only_on_change() {
        let runtime = EffectRuntime::headless(SIZE);
        let config = BackgroundEffectConfig::default();
        let mut beams = Beams::new(&runtime.context(), &config, SIZE, None);
        let first = beams.beams().to_vec();

        for _ in 0..10 {
            runtime.tick_with_dt(1.0 / 60.0);
            assert!(!beams.update(&config.clone(), SIZE));
        }
        assert_eq!(beams.generation(), 1);
        assert_eq!(beams.beams(), &first[..]);

        assert!(beams.update(&config.clone().with_density(4), SIZE));
        assert_eq!(beams.beams().len(), 4);
        assert_eq!(runtime.scheduler().keyframe_count(), 4);
    }

    #[test]
    fn test_path_length_loops_within_range() {
        let runtime = EffectRuntime::headless(SIZE);
        let config = BackgroundEffectConfig::default().with_density(3).with_speed(10.0);
        let beams = Beams::new(&runtime.context(), &config, SIZE, None);
        let mut peak: f32 = 0.0;
        for _ in 0..120 {
            assert!(runtime.tick_with_dt(1.0 / 60.0));
            for frame in beams.frame() {
                assert!((0.0..=1.0).contains(&frame.path_length));
            }
            peak = peak.max(beams.path_length(0));
        }
        assert!(peak > 0.9);
    }

    #[test]
    fn test_reduced_motion_draws_static_beams() {
        let runtime = EffectRuntime::headless(SIZE);
        let beams = Beams::new(
            &runtime.context(),
            &BackgroundEffectConfig::default(),
            SIZE,
            Some(true),
        );
        assert_eq!(runtime.scheduler().keyframe_count(), 0);
        assert!(beams.frame().iter().all(|f| f.path_length == 1.0));
        assert!(!beams.is_animating());
    }

    #[test]
    fn test_unmeasured_surface_has_no_beams() {
        let runtime = EffectRuntime::headless(SIZE);
        let beams = Beams::new(
            &runtime.context(),
            &BackgroundEffectConfig::default(),
            Size::ZERO,
            None,
        );
        assert!(beams.beams().is_empty());
        assert_eq!(runtime.scheduler().entry_count(), 0);
    }

    #[test]
    fn test_divider_sweeps_and_fades_at_edges() {
        let runtime = EffectRuntime::headless(SIZE);
        let divider = SectionDivider::new(
            &runtime.context(),
            &BackgroundEffectConfig::default(),
            800.0,
            true,
            None,
        );
        let stops = divider.gradient().stops().to_vec();
        assert_eq!(stops.first().map(|s| s.color), Some(Color::TRANSPARENT));
        assert_eq!(stops.last().map(|s| s.color), Some(Color::TRANSPARENT));

        for _ in 0..60 {
            runtime.tick_with_dt(1.0 / 60.0);
        }
        let p = divider.sweep_position().unwrap_or_default();
        assert!(p > 0.0 && p < 1.0);
    }

    #[test]
    fn test_divider_without_sweep_is_static() {
        let runtime = EffectRuntime::headless(SIZE);
        let mut divider = SectionDivider::new(
            &runtime.context(),
            &BackgroundEffectConfig::default(),
            800.0,
            false,
            None,
        );
        assert_eq!(divider.sweep_position(), None);
        divider.set_width(400.0);
        assert_eq!(divider.path().length(), 400.0);
        assert_eq!(runtime.scheduler().entry_count(), 0);
    }

    #[test]
    fn test_tiny_surface_does_not_panic() {
        let runtime = EffectRuntime::headless(SIZE);
        let tiny = Size::new(f32::MIN_POSITIVE, f32::MIN_POSITIVE);
        assert!(!tiny.is_empty());
        let beams = Beams::new(&runtime.context(), &BackgroundEffectConfig::default(), tiny, None);
        assert_eq!(beams.beams().len(), 20);
        assert!(beams.frame().iter().all(|f| f.path_length.is_finite()));
    }

    #[test]
    fn test_beams_follow_live_preference_changes() {
        let query = ManualMediaQuery::new(Some(true));
        let runtime = EffectRuntime::new(&query, SIZE);
        let config = BackgroundEffectConfig::default().with_density(3);
        let beams = Beams::new(&runtime.context(), &config, SIZE, None);
        assert_eq!(runtime.scheduler().keyframe_count(), 0);

        query.set(Some(false));
        assert_eq!(runtime.scheduler().keyframe_count(), 3);
        assert!(runtime.tick_with_dt(1.0 / 60.0));
        assert!(beams.is_animating());

        query.set(Some(true));
        assert_eq!(runtime.scheduler().keyframe_count(), 0);
        assert!(!runtime.tick_with_dt(1.0 / 60.0));
        assert!(beams.frame().iter().all(|f| f.path_length == 1.0));
    }

    #[test]
    fn test_divider_sweep_follows_live_preference_changes() {
        let query = ManualMediaQuery::new(Some(false));
        let runtime = EffectRuntime::new(&query, SIZE);
        let divider =
            SectionDivider::new(&runtime.context(), &BackgroundEffectConfig::default(), 800.0, true, None);
        assert!(divider.is_animating());

        query.set(Some(true));
        assert_eq!(divider.frame().sweep, None);
        assert!(!runtime.tick_with_dt(1.0 / 60.0));

        query.set(Some(false));
        assert!(divider.is_animating());
        assert!(runtime.tick_with_dt(1.0 / 60.0));
    }

    #[test]
    fn test_unconfirmed_mount_draws_full_beams() {
        let runtime = EffectRuntime::hydrating(&StaticMediaQuery(Some(false)), SIZE);
        let config = BackgroundEffectConfig::default().with_density(3).with_speed(10.0);
        let beams = Beams::new(&runtime.context(), &config, SIZE, None);
        for _ in 0..20 {
            runtime.tick_with_dt(1.0 / 60.0);
        }
        for _ in 0..3 {
            assert!(beams.frame().iter().all(|f| f.path_length == 1.0));
        }
        runtime.confirm_mount();
        assert!(beams.frame().iter().any(|f| f.path_length < 1.0));
    }
}
