//! 3D tilt
//!
//! Maps the pointer's position in the element to two rotation angles so the
//! edge nearest the pointer dips toward it. With the pointer at the top-left
//! corner and `tilt_amount = 10`, the card reaches `rotate_x = +5` and
//! `rotate_y = -5`. Scale eases to the hover scale while engaged, and a glare
//! channel follows the pointer to fake a specular highlight. Leaving the
//! element eases every channel back to identity through the same springs.

use std::sync::Arc;

use flair_animation::{AnimatedValue, SpringConfig};
use flair_core::Point;
use serde::{Deserialize, Serialize};

use crate::context::EffectContext;
use crate::element::{listen_all, Element, ListenerGuard, ListenerKind};
use crate::motion_policy::MotionPolicy;
use crate::pointer::{Normalization, PointerEvent, PointerSample, PointerSampler};
use crate::ssr::SsrValue;
use crate::style::MotionStyle;

use super::{EffectKind, EffectPrimitive};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TiltConfig {
    /// Full rotation range in degrees across the element
    pub tilt_amount: f32,
    pub hover_scale: f32,
    /// Glare opacity at the element corners
    pub max_glare: f32,
    pub spring: SpringConfig,
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self {
            tilt_amount: 10.0,
            hover_scale: 1.05,
            max_glare: 0.35,
            spring: SpringConfig::smooth(),
        }
    }
}

/// Specular highlight state
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Glare {
    /// Highlight center as a fraction of the element (0.0 to 1.0)
    pub position: Point,
    pub opacity: f32,
}

pub struct TiltEffect {
    sampler: PointerSampler,
    motion: MotionPolicy,
    disable_animation: Option<bool>,
    config: TiltConfig,
    rotate_x: AnimatedValue,
    rotate_y: AnimatedValue,
    scale: AnimatedValue,
    glare: AnimatedValue,
    glare_position: Point,
    engaged: bool,
    ssr: SsrValue<MotionStyle>,
    _listeners: Vec<ListenerGuard>,
}

impl TiltEffect {
    pub fn new(
        ctx: &EffectContext,
        element: Arc<dyn Element>,
        config: TiltConfig,
        disable_animation: Option<bool>,
    ) -> Self {
        let mut config = config;
        if !config.tilt_amount.is_finite() || config.tilt_amount < 0.0 {
            tracing::warn!(tilt_amount = config.tilt_amount, "invalid tilt amount, using 0");
            config.tilt_amount = 0.0;
        }
        if !(config.hover_scale > 0.0) {
            tracing::warn!(hover_scale = config.hover_scale, "invalid hover scale, using 1");
            config.hover_scale = 1.0;
        }

        let listeners = listen_all(
            &element,
            &[
                ListenerKind::PointerEnter,
                ListenerKind::PointerMove,
                ListenerKind::PointerLeave,
            ],
        );
        let scheduler = ctx.scheduler();
        tracing::debug!(tilt = config.tilt_amount, "tilt effect mounted");
        Self {
            sampler: PointerSampler::new(element, Normalization::Unit),
            motion: ctx.motion().clone(),
            disable_animation,
            rotate_x: AnimatedValue::new(scheduler.clone(), 0.0, config.spring),
            rotate_y: AnimatedValue::new(scheduler.clone(), 0.0, config.spring),
            scale: AnimatedValue::new(scheduler.clone(), 1.0, config.spring),
            glare: AnimatedValue::new(scheduler.clone(), 0.0, config.spring),
            glare_position: Point::new(0.5, 0.5),
            config,
            engaged: false,
            ssr: SsrValue::new(MotionStyle::IDENTITY, ctx.mount()),
            _listeners: listeners,
        }
    }

    fn is_reduced(&self) -> bool {
        self.motion.is_reduced(self.disable_animation)
    }

    /// Rotation targets for a sample: `(rotate_x, rotate_y)` in degrees
    pub fn angles_for(sample: &PointerSample, tilt_amount: f32) -> (f32, f32) {
        let s = sample.to(Normalization::Unit);
        ((0.5 - s.y) * tilt_amount, (s.x - 0.5) * tilt_amount)
    }

    fn reset_immediate(&mut self) {
        self.rotate_x.set_immediate(0.0);
        self.rotate_y.set_immediate(0.0);
        self.scale.set_immediate(1.0);
        self.glare.set_immediate(0.0);
        self.engaged = false;
    }

    pub fn rotation(&self) -> (f32, f32) {
        if self.is_reduced() {
            return (0.0, 0.0);
        }
        (self.rotate_x.get(), self.rotate_y.get())
    }

    pub fn scale(&self) -> f32 {
        if self.is_reduced() {
            return 1.0;
        }
        self.scale.get()
    }

    pub fn glare(&self) -> Glare {
        Glare {
            position: self.glare_position,
            opacity: if self.is_reduced() {
                0.0
            } else {
                self.glare.get().max(0.0)
            },
        }
    }

    pub fn config(&self) -> &TiltConfig {
        &self.config
    }
}

impl EffectPrimitive for TiltEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::Tilt
    }

    fn on_pointer_move(&mut self, event: PointerEvent) {
        if self.is_reduced() {
            self.reset_immediate();
            return;
        }
        if self.sampler.bounds().is_none() {
            self.on_pointer_leave();
            return;
        }
        let sample = self.sampler.sample(event);
        let (rx, ry) = Self::angles_for(&sample, self.config.tilt_amount);
        self.rotate_x.set_target(rx);
        self.rotate_y.set_target(ry);
        self.scale.set_target(self.config.hover_scale);

        // Glare grows toward the corners, peaking at max_glare.
        let d = Point::new(sample.x - 0.5, sample.y - 0.5);
        let reach = (d.x * d.x + d.y * d.y).sqrt() / std::f32::consts::FRAC_1_SQRT_2;
        self.glare_position = Point::new(sample.x, sample.y);
        self.glare
            .set_target(self.config.max_glare * (0.5 + 0.5 * reach.min(1.0)));
        self.engaged = true;
    }

    fn on_pointer_leave(&mut self) {
        self.engaged = false;
        self.rotate_x.set_target(0.0);
        self.rotate_y.set_target(0.0);
        self.scale.set_target(1.0);
        self.glare.set_target(0.0);
    }

    fn live_style(&self) -> MotionStyle {
        let (rotate_x, rotate_y) = self.rotation();
        MotionStyle {
            rotate_x,
            rotate_y,
            scale: self.scale(),
            ..MotionStyle::IDENTITY
        }
    }

    fn ssr(&self) -> &SsrValue<MotionStyle> {
        &self.ssr
    }

    fn is_animating(&self) -> bool {
        !self.is_reduced()
            && (self.rotate_x.is_animating()
                || self.rotate_y.is_animating()
                || self.scale.is_animating()
                || self.glare.is_animating())
    }

    fn is_engaged(&self) -> bool {
        self.engaged && !self.is_reduced()
    }
}

impl Drop for TiltEffect {
    fn drop(&mut self) {
        tracing::debug!("tilt effect unmounted");
    }
}

impl std::fmt::Debug for TiltEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TiltEffect")
            .field("rotation", &self.rotation())
            .field("scale", &self.scale())
            .field("engaged", &self.engaged)
            .finish()
    }
}
