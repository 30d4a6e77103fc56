//! Highlight travelling around a rectangle's border

use flair_animation::{AnimatedKeyframe, Easing, KeyframeAnimation, Repeat, SchedulerHandle};
use flair_core::{Color, Gradient, Path, Point, Rect, Size};
use serde::{Deserialize, Serialize};

use crate::context::EffectContext;
use crate::motion_policy::MotionGate;
use crate::ssr::{Phase, SsrGate};

use super::seed::loop_timing;
use super::{BackgroundEffectConfig, GenerationKey};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovingBorderConfig {
    /// Time for one full lap at speed 1.0
    pub duration_ms: u32,
    /// Radius of the glowing highlight in pixels
    pub highlight_radius: f32,
}

impl Default for MovingBorderConfig {
    fn default() -> Self {
        Self {
            duration_ms: 4_000,
            highlight_radius: 40.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MovingBorderFrame {
    pub center: Point,
    /// Lap position (0.0 to 1.0, clockwise from the top-left corner)
    pub progress: f32,
    pub gradient: Gradient,
}

pub struct MovingBorder {
    scheduler: SchedulerHandle,
    config: BackgroundEffectConfig,
    border: MovingBorderConfig,
    key: GenerationKey,
    outline: Path,
    lap: MotionGate<AnimatedKeyframe>,
    ssr: SsrGate,
}

impl MovingBorder {
    pub fn new(
        ctx: &EffectContext,
        config: &BackgroundEffectConfig,
        border: MovingBorderConfig,
        size: Size,
        disable_animation: Option<bool>,
    ) -> Self {
        let mut moving = Self {
            scheduler: ctx.scheduler().clone(),
            config: config.sanitized(),
            border,
            key: GenerationKey::default(),
            outline: Path::new(),
            lap: MotionGate::new(ctx.motion(), disable_animation, || None),
            ssr: SsrGate::new(ctx.mount()),
        };
        moving.update(config, size);
        moving
    }

    /// Returns true when the outline was rebuilt
    pub fn update(&mut self, config: &BackgroundEffectConfig, size: Size) -> bool {
        let config = config.sanitized();
        if !self.key.update(&config, size) {
            return false;
        }
        self.config = config;
        self.outline = if size.is_empty() {
            Path::new()
        } else {
            Path::rect(Rect::from(size))
        };
        let has_outline = !self.outline.is_empty();
        let timing = loop_timing(0, self.border.duration_ms.max(1), self.config.speed);
        let scheduler = self.scheduler.clone();
        self.lap.rebuild(move || {
            has_outline.then(|| {
                let anim =
                    KeyframeAnimation::from_values(timing.duration_ms, &[0.0, 1.0], Easing::Linear)
                        .repeat(Repeat::Infinite);
                AnimatedKeyframe::started(scheduler.clone(), anim)
            })
        });
        tracing::debug!(width = size.width, height = size.height, "moving border regenerated");
        true
    }

    /// Lap position; parked at the start under reduced motion and before
    /// the component is live
    pub fn progress(&self) -> f32 {
        if self.ssr.phase() == Phase::Fallback {
            return 0.0;
        }
        self.live_progress()
    }

    fn live_progress(&self) -> f32 {
        self.lap.with(|l| l.get()).unwrap_or(0.0)
    }

    pub fn outline(&self) -> &Path {
        &self.outline
    }

    /// `None` until the surface has a size
    pub fn frame(&self) -> Option<MovingBorderFrame> {
        let progress = match self.ssr.begin_render() {
            Phase::Fallback => 0.0,
            Phase::Live => self.live_progress(),
        };
        let center = self.outline.point_at(progress)?;
        let color: Color = self.config.color_at(0);
        Some(MovingBorderFrame {
            center,
            progress,
            gradient: Gradient::radial_fade(center, self.border.highlight_radius, color),
        })
    }

    pub fn is_animating(&self) -> bool {
        self.lap.with(|l| l.is_playing()).unwrap_or(false)
    }
}

impl std::fmt::Debug for MovingBorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MovingBorder")
            .field("progress", &self.progress())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EffectRuntime;
    use crate::motion_policy::{ManualMediaQuery, StaticMediaQuery};

    const SIZE: Size = Size::new(200.0, 100.0);

    fn border(runtime: &EffectRuntime, disable: Option<bool>) -> MovingBorder {
        MovingBorder::new(
            &runtime.context(),
            &BackgroundEffectConfig::default(),
            MovingBorderConfig {
                duration_ms: 600,
                ..Default::default()
            },
            SIZE,
            disable,
        )
    }

    #[test]
    fn test_highlight_walks_the_perimeter() {
        let runtime = EffectRuntime::headless(SIZE);
        let border = border(&runtime, None);
        assert_eq!(border.frame().map(|f| f.center), Some(Point::ZERO));

        // A third of the lap is 200px along a 600px outline: the top-right corner.
        for _ in 0..20 {
            runtime.tick_with_dt(0.01);
        }
        let center = border.frame().map(|f| f.center).unwrap_or_default();
        assert!((center.x - 200.0).abs() < 1e-2);
        assert!(center.y.abs() < 1e-2);
    }

    #[test]
    fn test_lap_repeats() {
        let runtime = EffectRuntime::headless(SIZE);
        let border = border(&runtime, None);
        for _ in 0..65 {
            runtime.tick_with_dt(0.01);
        }
        assert!(border.progress() < 0.2);
        assert!(border.is_animating());
    }

    #[test]
    fn test_reduced_motion_parks_highlight() {
        let runtime = EffectRuntime::headless(SIZE);
        let border = border(&runtime, Some(true));
        for _ in 0..20 {
            runtime.tick_with_dt(0.01);
        }
        assert_eq!(border.progress(), 0.0);
        assert_eq!(runtime.scheduler().keyframe_count(), 0);
    }

    #[test]
    fn test_resize_rebuilds_outline() {
        let runtime = EffectRuntime::headless(SIZE);
        let mut border = border(&runtime, None);
        assert!(!border.update(&BackgroundEffectConfig::default(), SIZE));
        assert!(border.update(&BackgroundEffectConfig::default(), Size::new(50.0, 50.0)));
        assert_eq!(border.outline().length(), 200.0);
        assert_eq!(runtime.scheduler().keyframe_count(), 1);
    }

    #[test]
    fn test_lap_follows_live_preference_changes() {
        let query = ManualMediaQuery::new(Some(true));
        let runtime = EffectRuntime::new(&query, SIZE);
        let border = MovingBorder::new(
            &runtime.context(),
            &BackgroundEffectConfig::default(),
            MovingBorderConfig::default(),
            SIZE,
            None,
        );
        assert!(!border.is_animating());

        query.set(Some(false));
        assert!(runtime.tick_with_dt(0.1));
        assert!(border.progress() > 0.0);

        query.set(Some(true));
        assert_eq!(runtime.scheduler().keyframe_count(), 0);
        assert!(!runtime.tick_with_dt(0.1));
        assert_eq!(border.frame().map(|f| f.progress), Some(0.0));
    }

    #[test]
    fn test_unconfirmed_mount_parks_highlight() {
        let runtime = EffectRuntime::hydrating(&StaticMediaQuery(Some(false)), SIZE);
        let border = border(&runtime, None);
        for _ in 0..20 {
            runtime.tick_with_dt(0.01);
        }
        assert_eq!(border.frame().map(|f| f.progress), Some(0.0));
        assert_eq!(border.frame().map(|f| f.progress), Some(0.0));
        runtime.confirm_mount();
        assert!(border.progress() > 0.3);
    }
}
