//! Scroll parallax
//!
//! Maps scroll progress through the viewport to a vertical offset in
//! `[-distance, +distance]`, optionally smoothed by a spring, and optionally
//! fades the element in over the first fifth of the window and out over the
//! last fifth.

use std::sync::Arc;

use flair_animation::{interpolate, remap, AnimatedValue, SpringConfig};
use flair_core::Subscription;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::context::EffectContext;
use crate::element::Element;
use crate::motion_policy::MotionPolicy;
use crate::scroll::{ScrollProgressMapper, ScrollWindow};
use crate::ssr::SsrValue;
use crate::style::MotionStyle;

use super::{EffectKind, EffectPrimitive};

/// Progress stops of the fade ramp
const FADE_INPUT: [f32; 4] = [0.0, 0.2, 0.8, 1.0];
const FADE_OUTPUT: [f32; 4] = [0.0, 1.0, 1.0, 0.0];

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallaxConfig {
    /// Travel in pixels at either end of the window
    pub distance: f32,
    /// Smooth the offset with `spring` instead of following scroll exactly
    pub smooth: bool,
    pub fade: bool,
    pub window: ScrollWindow,
    pub spring: SpringConfig,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            distance: 50.0,
            smooth: false,
            fade: false,
            window: ScrollWindow::through_viewport(),
            spring: SpringConfig::gentle(),
        }
    }
}

pub struct ParallaxEffect {
    mapper: ScrollProgressMapper,
    motion: MotionPolicy,
    disable_animation: Option<bool>,
    config: ParallaxConfig,
    smoothed: Option<Arc<Mutex<AnimatedValue>>>,
    ssr: SsrValue<MotionStyle>,
    _progress_sub: Option<Subscription>,
}

impl ParallaxEffect {
    pub fn new(
        ctx: &EffectContext,
        element: Arc<dyn Element>,
        config: ParallaxConfig,
        disable_animation: Option<bool>,
    ) -> Self {
        let mapper = ScrollProgressMapper::new(ctx, element, config.window);
        let distance = config.distance;
        let motion = ctx.motion().clone();

        let (smoothed, progress_sub) = if config.smooth {
            let initial = offset_for(mapper.progress(), distance);
            let value = Arc::new(Mutex::new(AnimatedValue::new(
                ctx.scheduler().clone(),
                initial,
                config.spring,
            )));
            let target = Arc::clone(&value);
            let policy = motion.clone();
            let sub = mapper.reader().subscribe(move |progress| {
                let offset = offset_for(*progress, distance);
                // Track scroll without a spring so re-enabling motion starts in place.
                if policy.is_reduced(disable_animation) {
                    target.lock().set_immediate(offset);
                } else {
                    target.lock().set_target(offset);
                }
            });
            (Some(value), Some(sub))
        } else {
            (None, None)
        };

        tracing::debug!(distance, smooth = config.smooth, "parallax effect mounted");
        Self {
            mapper,
            motion,
            disable_animation,
            config,
            smoothed,
            ssr: SsrValue::new(MotionStyle::IDENTITY, ctx.mount()),
            _progress_sub: progress_sub,
        }
    }

    fn is_reduced(&self) -> bool {
        self.motion.is_reduced(self.disable_animation)
    }

    /// Raw scroll progress (0.0 to 1.0)
    pub fn progress(&self) -> f32 {
        self.mapper.progress()
    }

    /// Vertical offset in pixels
    pub fn offset(&self) -> f32 {
        if self.is_reduced() {
            return 0.0;
        }
        match &self.smoothed {
            Some(value) => value.lock().get(),
            None => offset_for(self.mapper.progress(), self.config.distance),
        }
    }

    /// Fade-ramp opacity, or 1.0 when fading is off or motion is reduced
    pub fn opacity(&self) -> f32 {
        if !self.config.fade || self.is_reduced() {
            return 1.0;
        }
        interpolate(self.mapper.progress(), &FADE_INPUT, &FADE_OUTPUT)
    }

    pub fn mapper(&self) -> &ScrollProgressMapper {
        &self.mapper
    }
}

fn offset_for(progress: f32, distance: f32) -> f32 {
    remap(progress, (0.0, 1.0), (-distance, distance))
}

impl EffectPrimitive for ParallaxEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::Parallax
    }

    fn on_scroll(&mut self) {
        self.mapper.on_scroll();
    }

    fn on_resize(&mut self) {
        self.mapper.on_resize();
    }

    fn live_style(&self) -> MotionStyle {
        MotionStyle::translate(0.0, self.offset()).with_opacity(self.opacity())
    }

    fn ssr(&self) -> &SsrValue<MotionStyle> {
        &self.ssr
    }

    fn is_animating(&self) -> bool {
        if self.is_reduced() {
            return false;
        }
        self.mapper.is_measure_pending()
            || self
                .smoothed
                .as_ref()
                .is_some_and(|value| value.lock().is_animating())
    }
}

impl std::fmt::Debug for ParallaxEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallaxEffect")
            .field("progress", &self.progress())
            .field("offset", &self.offset())
            .finish()
    }
}
