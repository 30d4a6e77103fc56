//! Aurora wash
//!
//! A wide, blurred palette gradient whose position pans endlessly across the
//! surface. The host is expected to repeat the gradient, so only the pan
//! offset animates.

use flair_animation::{AnimatedKeyframe, Easing, KeyframeAnimation, Repeat, SchedulerHandle};
use flair_core::{Gradient, Point, Size};
use serde::{Deserialize, Serialize};

use crate::context::EffectContext;
use crate::motion_policy::MotionGate;
use crate::ssr::{Phase, SsrGate};

use super::seed::loop_timing;
use super::{BackgroundEffectConfig, GenerationKey};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuroraConfig {
    /// Time for one full pan at speed 1.0
    pub duration_ms: u32,
    /// Pan distance in surface widths
    pub travel: f32,
}

impl Default for AuroraConfig {
    fn default() -> Self {
        Self {
            duration_ms: 60_000,
            travel: 3.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AuroraFrame {
    pub gradient: Gradient,
    /// Horizontal background position in percent, starting at 50
    pub position_percent: f32,
    pub blur: f32,
}

pub struct Aurora {
    scheduler: SchedulerHandle,
    config: BackgroundEffectConfig,
    aurora: AuroraConfig,
    key: GenerationKey,
    size: Size,
    /// Speed the running pan was built for
    pan_speed: Option<f32>,
    pan: MotionGate<AnimatedKeyframe>,
    ssr: SsrGate,
}

impl Aurora {
    pub fn new(
        ctx: &EffectContext,
        config: &BackgroundEffectConfig,
        aurora: AuroraConfig,
        size: Size,
        disable_animation: Option<bool>,
    ) -> Self {
        let mut this = Self {
            scheduler: ctx.scheduler().clone(),
            config: config.sanitized(),
            aurora,
            key: GenerationKey::default(),
            size,
            pan_speed: None,
            pan: MotionGate::new(ctx.motion(), disable_animation, || None),
            ssr: SsrGate::new(ctx.mount()),
        };
        this.update(config, size);
        this
    }

    /// Returns true when the gradient was rebuilt
    pub fn update(&mut self, config: &BackgroundEffectConfig, size: Size) -> bool {
        let config = config.sanitized();
        if !self.key.update(&config, size) {
            return false;
        }
        self.config = config;
        self.size = size;
        // Resizes keep the running pan so the wash does not jump.
        if self.pan_speed != Some(self.config.speed) {
            self.pan_speed = Some(self.config.speed);
            let timing = loop_timing(0, self.aurora.duration_ms.max(1), self.config.speed);
            let scheduler = self.scheduler.clone();
            self.pan.rebuild(move || {
                let anim =
                    KeyframeAnimation::from_values(timing.duration_ms, &[0.0, 1.0], Easing::Linear)
                        .repeat(Repeat::Infinite);
                Some(AnimatedKeyframe::started(scheduler.clone(), anim))
            });
        }
        tracing::debug!(colors = self.config.colors.len(), "aurora regenerated");
        true
    }

    /// Pan progress (0.0 to 1.0); 0 under reduced motion and before the
    /// component is live
    pub fn pan(&self) -> f32 {
        if self.ssr.phase() == Phase::Fallback {
            return 0.0;
        }
        self.live_pan()
    }

    fn live_pan(&self) -> f32 {
        self.pan.with(|p| p.get()).unwrap_or(0.0)
    }

    pub fn frame(&self) -> AuroraFrame {
        let pan = match self.ssr.begin_render() {
            Phase::Fallback => 0.0,
            Phase::Live => self.live_pan(),
        };
        let w = self.size.width.max(0.0);
        let x = -pan * self.aurora.travel * w;
        AuroraFrame {
            gradient: Gradient::linear_palette(
                Point::new(x, 0.0),
                Point::new(x + w, self.size.height.max(0.0)),
                &self.config.colors,
            ),
            position_percent: 50.0 + pan * self.aurora.travel * 100.0,
            blur: self.config.blur,
        }
    }

    pub fn is_animating(&self) -> bool {
        self.pan.with(|p| p.is_playing()).unwrap_or(false)
    }
}

impl std::fmt::Debug for Aurora {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aurora").field("pan", &self.pan()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EffectRuntime;
    use crate::motion_policy::{ManualMediaQuery, StaticMediaQuery};

    const SIZE: Size = Size::new(400.0, 300.0);

    fn config() -> BackgroundEffectConfig {
        BackgroundEffectConfig {
            blur: 10.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_pan_advances_position() {
        let runtime = EffectRuntime::headless(SIZE);
        let aurora = Aurora::new(
            &runtime.context(),
            &config(),
            AuroraConfig {
                duration_ms: 1000,
                ..Default::default()
            },
            SIZE,
            None,
        );
        assert_eq!(aurora.frame().position_percent, 50.0);
        for _ in 0..50 {
            runtime.tick_with_dt(0.01);
        }
        let frame = aurora.frame();
        assert!((frame.position_percent - 200.0).abs() < 0.5);
        assert_eq!(frame.blur, 10.0);
        assert_eq!(frame.gradient.stops().len(), 3);
    }

    #[test]
    fn test_resize_keeps_running_pan() {
        let runtime = EffectRuntime::headless(SIZE);
        let mut aurora =
            Aurora::new(&runtime.context(), &config(), AuroraConfig::default(), SIZE, None);
        for _ in 0..30 {
            runtime.tick_with_dt(0.1);
        }
        let before = aurora.pan();
        assert!(aurora.update(&config(), Size::new(800.0, 300.0)));
        assert_eq!(aurora.pan(), before);
        assert_eq!(runtime.scheduler().keyframe_count(), 1);
    }

    #[test]
    fn test_reduced_motion_is_still() {
        let runtime = EffectRuntime::headless(SIZE);
        let aurora =
            Aurora::new(&runtime.context(), &config(), AuroraConfig::default(), SIZE, Some(true));
        assert_eq!(aurora.frame().position_percent, 50.0);
        assert!(!aurora.is_animating());
        assert_eq!(runtime.scheduler().entry_count(), 0);
    }

    #[test]
    fn test_pan_resumes_when_motion_is_enabled() {
        let query = ManualMediaQuery::new(Some(true));
        let runtime = EffectRuntime::new(&query, SIZE);
        let aurora = Aurora::new(&runtime.context(), &config(), AuroraConfig::default(), SIZE, None);
        assert_eq!(runtime.scheduler().keyframe_count(), 0);

        query.set(Some(false));
        for _ in 0..50 {
            runtime.tick_with_dt(0.1);
        }
        assert!(aurora.pan() > 0.0);
        assert!(aurora.is_animating());
        assert_eq!(runtime.scheduler().keyframe_count(), 1);
    }

    #[test]
    fn test_reducing_motion_lets_the_scheduler_idle() {
        let query = ManualMediaQuery::new(Some(false));
        let runtime = EffectRuntime::new(&query, SIZE);
        let aurora = Aurora::new(&runtime.context(), &config(), AuroraConfig::default(), SIZE, None);
        assert!(runtime.tick_with_dt(0.01));

        query.set(Some(true));
        assert_eq!(runtime.run_until_idle(0.01, 500), 1);
        assert_eq!(runtime.scheduler().keyframe_count(), 0);
        assert_eq!(aurora.frame().position_percent, 50.0);
    }

    #[test]
    fn test_unconfirmed_mount_renders_centered_wash() {
        let runtime = EffectRuntime::hydrating(&StaticMediaQuery(Some(false)), SIZE);
        let aurora = Aurora::new(&runtime.context(), &config(), AuroraConfig::default(), SIZE, None);
        for _ in 0..30 {
            runtime.tick_with_dt(0.1);
        }
        assert_eq!(aurora.frame().position_percent, 50.0);
        assert_eq!(aurora.frame().position_percent, 50.0);
        runtime.confirm_mount();
        assert!(aurora.frame().position_percent > 50.0);
    }
}
