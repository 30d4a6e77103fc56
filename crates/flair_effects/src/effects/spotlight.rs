//! Spotlight gradient
//!
//! A radial highlight that follows the pointer inside a container. The
//! position maps directly, clamped to the container; only the opacity is
//! spring-smoothed so the highlight fades in and out instead of popping.

use std::sync::Arc;

use flair_animation::{AnimatedValue, SpringConfig};
use flair_core::{Color, Gradient, Point};
use serde::{Deserialize, Serialize};

use crate::context::EffectContext;
use crate::element::{listen_all, Element, ListenerGuard, ListenerKind};
use crate::motion_policy::MotionPolicy;
use crate::pointer::{Normalization, PointerEvent, PointerSampler};
use crate::ssr::{Phase, SsrValue};
use crate::style::MotionStyle;

use super::{EffectKind, EffectPrimitive};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotlightConfig {
    /// Radius of the highlight in pixels
    pub radius: f32,
    /// Opacity multiplier while the pointer is inside
    pub max_opacity: f32,
    pub color: Color,
    pub spring: SpringConfig,
}

impl Default for SpotlightConfig {
    fn default() -> Self {
        Self {
            radius: 350.0,
            max_opacity: 1.0,
            color: Color::rgba(0.47, 0.47, 1.0, 0.15),
            spring: SpringConfig::responsive(),
        }
    }
}

/// One frame of spotlight output
#[derive(Clone, Debug, PartialEq)]
pub struct SpotlightFrame {
    /// Gradient center in container-local pixels
    pub center: Point,
    pub opacity: f32,
    pub gradient: Gradient,
}

pub struct SpotlightEffect {
    sampler: PointerSampler,
    motion: MotionPolicy,
    disable_animation: Option<bool>,
    config: SpotlightConfig,
    /// Last clamped position; kept after leave so the fade-out stays in place
    center: Option<Point>,
    opacity: AnimatedValue,
    engaged: bool,
    ssr: SsrValue<MotionStyle>,
    _listeners: Vec<ListenerGuard>,
}

impl SpotlightEffect {
    pub fn new(
        ctx: &EffectContext,
        element: Arc<dyn Element>,
        config: SpotlightConfig,
        disable_animation: Option<bool>,
    ) -> Self {
        let listeners = listen_all(
            &element,
            &[
                ListenerKind::PointerEnter,
                ListenerKind::PointerMove,
                ListenerKind::PointerLeave,
            ],
        );
        let max_opacity = config.max_opacity.clamp(0.0, 1.0);
        if max_opacity != config.max_opacity {
            tracing::warn!(max_opacity = config.max_opacity, "spotlight opacity clamped");
        }
        Self {
            sampler: PointerSampler::new(element, Normalization::Unit),
            motion: ctx.motion().clone(),
            disable_animation,
            config: SpotlightConfig {
                max_opacity,
                ..config
            },
            center: None,
            opacity: AnimatedValue::new(ctx.scheduler().clone(), 0.0, config.spring),
            engaged: false,
            ssr: SsrValue::new(MotionStyle::IDENTITY, ctx.mount()),
            _listeners: listeners,
        }
    }

    fn is_reduced(&self) -> bool {
        self.motion.is_reduced(self.disable_animation)
    }

    /// Highlight center in container-local pixels, if the pointer has entered
    pub fn center(&self) -> Option<Point> {
        self.center
    }

    /// Current opacity multiplier
    pub fn opacity(&self) -> f32 {
        if self.is_reduced() {
            0.0
        } else {
            self.opacity.get().clamp(0.0, 1.0)
        }
    }

    /// Gradient to paint this frame
    ///
    /// `None` until the pointer has entered a measurable container, and
    /// while a server render is still hydrating.
    pub fn frame(&self) -> Option<SpotlightFrame> {
        if self.ssr.begin_render() == Phase::Fallback {
            return None;
        }
        let center = self.center?;
        let opacity = self.opacity();
        let color = self.config.color;
        Some(SpotlightFrame {
            center,
            opacity,
            gradient: Gradient::radial_fade(
                center,
                self.config.radius,
                color.with_alpha(color.a * opacity),
            ),
        })
    }
}

impl EffectPrimitive for SpotlightEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::Spotlight
    }

    fn on_pointer_move(&mut self, event: PointerEvent) {
        if self.is_reduced() {
            self.opacity.set_immediate(0.0);
            self.engaged = false;
            return;
        }
        match self.sampler.local_position(event) {
            Some(position) => {
                self.center = Some(position);
                self.engaged = true;
                self.opacity.set_target(self.config.max_opacity);
            }
            None => self.on_pointer_leave(),
        }
    }

    fn on_pointer_leave(&mut self) {
        self.engaged = false;
        self.opacity.set_target(0.0);
    }

    /// Spotlight paints a gradient; the element itself is not transformed
    fn live_style(&self) -> MotionStyle {
        MotionStyle::IDENTITY
    }

    fn ssr(&self) -> &SsrValue<MotionStyle> {
        &self.ssr
    }

    fn is_animating(&self) -> bool {
        !self.is_reduced() && self.opacity.is_animating()
    }

    fn is_engaged(&self) -> bool {
        self.engaged && !self.is_reduced()
    }
}

impl std::fmt::Debug for SpotlightEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotlightEffect")
            .field("center", &self.center)
            .field("opacity", &self.opacity())
            .finish()
    }
}
