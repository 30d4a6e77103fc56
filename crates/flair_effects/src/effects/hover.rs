//! Hover effects and floating loops
//!
//! [`HoverEffect`] eases a single "hover amount" between 0 and 1 while the
//! pointer is over the element and maps it to one channel per kind: scale
//! for zoom, translate-y and shadow for lift, glow, or z-rotation.
//! [`FloatingEffect`] is an idle bob that loops for as long as it is mounted
//! and motion is allowed.

use std::sync::Arc;

use flair_animation::{
    AnimatedKeyframe, AnimatedValue, Easing, KeyframeAnimation, Repeat, SpringConfig,
};
use serde::{Deserialize, Serialize};

use crate::context::EffectContext;
use crate::element::{listen_all, Element, ListenerGuard, ListenerKind};
use crate::motion_policy::{MotionGate, MotionPolicy};
use crate::pointer::PointerEvent;
use crate::ssr::SsrValue;
use crate::style::MotionStyle;

use super::{EffectKind, EffectPrimitive};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoverConfig {
    pub zoom_scale: f32,
    /// Upward travel in pixels
    pub lift_distance: f32,
    /// Shadow strength at full lift
    pub lift_shadow: f32,
    pub glow_opacity: f32,
    pub rotate_degrees: f32,
    pub spring: SpringConfig,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            zoom_scale: 1.05,
            lift_distance: 8.0,
            lift_shadow: 0.6,
            glow_opacity: 0.8,
            rotate_degrees: 3.0,
            spring: SpringConfig::responsive(),
        }
    }
}

/// Hover-driven zoom, lift, glow or rotate
pub struct HoverEffect {
    kind: EffectKind,
    motion: MotionPolicy,
    disable_animation: Option<bool>,
    config: HoverConfig,
    amount: AnimatedValue,
    hovered: bool,
    element: Arc<dyn Element>,
    ssr: SsrValue<MotionStyle>,
    _listeners: Vec<ListenerGuard>,
}

impl HoverEffect {
    /// `kind` must be one of zoom, lift, glow or rotate; anything else
    /// produces an inert effect
    pub fn new(
        ctx: &EffectContext,
        element: Arc<dyn Element>,
        kind: EffectKind,
        config: HoverConfig,
        disable_animation: Option<bool>,
    ) -> Self {
        let kind = match kind {
            EffectKind::Zoom | EffectKind::Lift | EffectKind::Glow | EffectKind::Rotate => kind,
            other => {
                tracing::warn!(%other, "not a hover effect kind, using none");
                EffectKind::None
            }
        };
        let listeners = if kind == EffectKind::None {
            Vec::new()
        } else {
            listen_all(
                &element,
                &[ListenerKind::PointerEnter, ListenerKind::PointerLeave],
            )
        };
        Self {
            kind,
            motion: ctx.motion().clone(),
            disable_animation,
            amount: AnimatedValue::new(ctx.scheduler().clone(), 0.0, config.spring),
            config,
            hovered: false,
            element,
            ssr: SsrValue::new(MotionStyle::IDENTITY, ctx.mount()),
            _listeners: listeners,
        }
    }

    fn is_reduced(&self) -> bool {
        self.motion.is_reduced(self.disable_animation)
    }

    /// Eased hover amount (0.0 to 1.0)
    pub fn amount(&self) -> f32 {
        if self.is_reduced() || self.kind == EffectKind::None {
            0.0
        } else {
            self.amount.get()
        }
    }
}

impl EffectPrimitive for HoverEffect {
    fn kind(&self) -> EffectKind {
        self.kind
    }

    fn on_pointer_enter(&mut self) {
        if self.kind == EffectKind::None {
            return;
        }
        if self.is_reduced() {
            self.amount.set_immediate(0.0);
            return;
        }
        // An unmeasured element cannot be hovered yet.
        if self.element.bounds().is_none() {
            return;
        }
        self.hovered = true;
        self.amount.set_target(1.0);
    }

    fn on_pointer_move(&mut self, _event: PointerEvent) {
        if !self.hovered {
            self.on_pointer_enter();
        }
    }

    fn on_pointer_leave(&mut self) {
        self.hovered = false;
        self.amount.set_target(0.0);
    }

    fn live_style(&self) -> MotionStyle {
        let a = self.amount();
        let c = &self.config;
        match self.kind {
            EffectKind::Zoom => MotionStyle::IDENTITY.with_scale(1.0 + (c.zoom_scale - 1.0) * a),
            EffectKind::Lift => MotionStyle {
                translate_y: -c.lift_distance * a,
                shadow: c.lift_shadow * a,
                ..MotionStyle::IDENTITY
            },
            EffectKind::Glow => MotionStyle {
                glow: c.glow_opacity * a,
                ..MotionStyle::IDENTITY
            },
            EffectKind::Rotate => MotionStyle {
                rotate: c.rotate_degrees * a,
                ..MotionStyle::IDENTITY
            },
            _ => MotionStyle::IDENTITY,
        }
    }

    fn ssr(&self) -> &SsrValue<MotionStyle> {
        &self.ssr
    }

    fn is_animating(&self) -> bool {
        !self.is_reduced() && self.amount.is_animating()
    }

    fn is_engaged(&self) -> bool {
        self.hovered && !self.is_reduced()
    }
}

impl std::fmt::Debug for HoverEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HoverEffect")
            .field("kind", &self.kind)
            .field("amount", &self.amount())
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloatingConfig {
    /// Peak upward travel in pixels
    pub amplitude: f32,
    /// Time for one up-and-down cycle
    pub period_ms: u32,
    /// Phase offset between sibling elements
    pub stagger_ms: u32,
}

impl Default for FloatingConfig {
    fn default() -> Self {
        Self {
            amplitude: 10.0,
            period_ms: 3000,
            stagger_ms: 200,
        }
    }
}

/// Endless vertical bob
///
/// Under reduced motion no loop is registered and the element rests at 0.
/// The loop is released and rebuilt as the preference changes.
pub struct FloatingEffect {
    config: FloatingConfig,
    bob: MotionGate<AnimatedKeyframe>,
    ssr: SsrValue<MotionStyle>,
}

impl FloatingEffect {
    pub fn new(
        ctx: &EffectContext,
        config: FloatingConfig,
        index: usize,
        disable_animation: Option<bool>,
    ) -> Self {
        let scheduler = ctx.scheduler().clone();
        let bob = MotionGate::new(ctx.motion(), disable_animation, move || {
            if config.period_ms == 0 {
                return None;
            }
            let half = (config.period_ms / 2).max(1);
            let anim = KeyframeAnimation::from_values(
                half,
                &[0.0, -config.amplitude],
                Easing::EaseInOutSine,
            )
            .delay(config.stagger_ms.saturating_mul(index as u32))
            .repeat(Repeat::Infinite)
            .alternate(true);
            Some(AnimatedKeyframe::started(scheduler.clone(), anim))
        });
        Self {
            config,
            bob,
            ssr: SsrValue::new(MotionStyle::IDENTITY, ctx.mount()),
        }
    }

    /// Current vertical offset in pixels
    pub fn offset(&self) -> f32 {
        self.bob.with(|b| b.get()).unwrap_or(0.0)
    }

    pub fn config(&self) -> &FloatingConfig {
        &self.config
    }
}

impl EffectPrimitive for FloatingEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::Floating
    }

    fn live_style(&self) -> MotionStyle {
        MotionStyle::translate(0.0, self.offset())
    }

    fn ssr(&self) -> &SsrValue<MotionStyle> {
        &self.ssr
    }

    fn is_animating(&self) -> bool {
        self.bob.with(|b| b.is_playing()).unwrap_or(false)
    }
}

impl std::fmt::Debug for FloatingEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FloatingEffect")
            .field("offset", &self.offset())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EffectRuntime;
    use crate::element::ElementRef;
    use crate::motion_policy::{ManualMediaQuery, StaticMediaQuery};
    use flair_core::{Rect, Size};

    fn element() -> Arc<ElementRef> {
        Arc::new(ElementRef::with_bounds(Rect::new(0.0, 0.0, 100.0, 40.0)))
    }

    #[test]
    fn test_lift_eases_up_and_back() {
        let runtime = EffectRuntime::headless(Size::new(800.0, 600.0));
        let mut lift = HoverEffect::new(
            &runtime.context(),
            element(),
            EffectKind::Lift,
            HoverConfig::default(),
            None,
        );
        lift.on_pointer_enter();
        runtime.run_until_idle(1.0 / 60.0, 1000);
        let style = lift.style();
        assert_eq!(style.translate_y, -8.0);
        assert!((style.shadow - 0.6).abs() < 1e-6);

        lift.on_pointer_leave();
        runtime.run_until_idle(1.0 / 60.0, 1000);
        assert!(lift.style().is_identity());
    }

    #[test]
    fn test_zoom_and_rotate_channels() {
        let runtime = EffectRuntime::headless(Size::new(800.0, 600.0));
        let ctx = runtime.context();
        let mut zoom = HoverEffect::new(&ctx, element(), EffectKind::Zoom, HoverConfig::default(), None);
        let mut rotate =
            HoverEffect::new(&ctx, element(), EffectKind::Rotate, HoverConfig::default(), None);
        zoom.on_pointer_move(PointerEvent::at(1.0, 1.0));
        rotate.on_pointer_enter();
        runtime.run_until_idle(1.0 / 60.0, 1000);
        assert!((zoom.style().scale - 1.05).abs() < 1e-6);
        assert_eq!(rotate.style().rotate, 3.0);
    }

    #[test]
    fn test_non_hover_kind_is_inert() {
        let runtime = EffectRuntime::headless(Size::new(800.0, 600.0));
        let el = element();
        let mut effect = HoverEffect::new(
            &runtime.context(),
            el.clone(),
            EffectKind::Parallax,
            HoverConfig::default(),
            None,
        );
        effect.on_pointer_enter();
        assert_eq!(effect.kind(), EffectKind::None);
        assert!(effect.style().is_identity());
        assert_eq!(el.listener_count(), 0);
    }

    #[test]
    fn test_floating_loops_and_stays_in_range() {
        let runtime = EffectRuntime::headless(Size::new(800.0, 600.0));
        let floating = FloatingEffect::new(&runtime.context(), FloatingConfig::default(), 0, None);
        let mut lowest: f32 = 0.0;
        for _ in 0..400 {
            assert!(runtime.tick_with_dt(1.0 / 60.0));
            let y = floating.offset();
            assert!((-10.0..=0.0).contains(&y));
            lowest = lowest.min(y);
        }
        assert!(lowest < -9.0);
        assert!(floating.is_animating());
    }

    #[test]
    fn test_floating_index_shifts_phase() {
        let runtime = EffectRuntime::headless(Size::new(800.0, 600.0));
        let ctx = runtime.context();
        let a = FloatingEffect::new(&ctx, FloatingConfig::default(), 0, None);
        let b = FloatingEffect::new(&ctx, FloatingConfig::default(), 3, None);
        for _ in 0..30 {
            runtime.tick_with_dt(1.0 / 60.0);
        }
        assert!(a.offset() < 0.0);
        assert_eq!(b.offset(), 0.0);
    }

    #[test]
    fn test_floating_reduced_motion_registers_nothing() {
        let runtime = EffectRuntime::headless(Size::new(800.0, 600.0));
        let floating =
            FloatingEffect::new(&runtime.context(), FloatingConfig::default(), 0, Some(true));
        assert_eq!(runtime.scheduler().keyframe_count(), 0);
        assert_eq!(floating.offset(), 0.0);
        assert!(!runtime.tick_with_dt(1.0 / 60.0));
    }

    #[test]
    fn test_floating_follows_live_preference_changes() {
        let query = ManualMediaQuery::new(Some(false));
        let runtime = EffectRuntime::new(&query, Size::new(800.0, 600.0));
        let floating = FloatingEffect::new(&runtime.context(), FloatingConfig::default(), 0, None);
        for _ in 0..30 {
            runtime.tick_with_dt(1.0 / 60.0);
        }
        assert!(floating.offset() < 0.0);

        query.set(Some(true));
        assert_eq!(runtime.scheduler().keyframe_count(), 0);
        assert!(!runtime.tick_with_dt(1.0 / 60.0));
        assert_eq!(floating.offset(), 0.0);
        assert!(!floating.is_animating());

        query.set(Some(false));
        assert_eq!(runtime.scheduler().keyframe_count(), 1);
        for _ in 0..30 {
            assert!(runtime.tick_with_dt(1.0 / 60.0));
        }
        assert!(floating.offset() < 0.0);
        assert!(floating.is_animating());
    }

    #[test]
    fn test_hover_renders_identity_until_mount_confirmed() {
        let runtime = EffectRuntime::hydrating(&StaticMediaQuery(Some(false)), Size::new(800.0, 600.0));
        let mut zoom = HoverEffect::new(
            &runtime.context(),
            element(),
            EffectKind::Zoom,
            HoverConfig::default(),
            None,
        );
        zoom.on_pointer_enter();
        runtime.run_until_idle(1.0 / 60.0, 1000);
        assert!(zoom.style().is_identity());

        runtime.confirm_mount();
        assert!((zoom.style().scale - 1.05).abs() < 1e-6);
    }
}
