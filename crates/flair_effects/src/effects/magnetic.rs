//! Magnetic pull
//!
//! The element leans toward the pointer. The pointer's offset from the
//! element center, normalized by the half extent, is scaled by `strength`
//! and fed to one spring per axis, so the output never exceeds `strength`
//! pixels on either axis.

use std::sync::Arc;

use flair_animation::{AnimatedValue, SchedulerHandle, SpringConfig};
use flair_core::Vec2;
use serde::{Deserialize, Serialize};

use crate::context::EffectContext;
use crate::element::{listen_all, Element, ListenerGuard, ListenerKind};
use crate::motion_policy::MotionPolicy;
use crate::pointer::{Normalization, PointerEvent, PointerSampler};
use crate::ssr::SsrValue;
use crate::style::MotionStyle;

use super::{EffectKind, EffectPrimitive};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MagneticConfig {
    /// Maximum pull in pixels
    pub strength: f32,
    pub spring: SpringConfig,
}

impl Default for MagneticConfig {
    fn default() -> Self {
        Self {
            strength: 30.0,
            spring: SpringConfig::magnetic(),
        }
    }
}

struct AxisSprings {
    x: AnimatedValue,
    y: AnimatedValue,
}

pub struct MagneticEffect {
    sampler: PointerSampler,
    motion: MotionPolicy,
    scheduler: SchedulerHandle,
    disable_animation: Option<bool>,
    config: MagneticConfig,
    /// Created on the first pointer move that can actually produce motion
    springs: Option<AxisSprings>,
    engaged: bool,
    ssr: SsrValue<MotionStyle>,
    _listeners: Vec<ListenerGuard>,
}

impl MagneticEffect {
    pub fn new(
        ctx: &EffectContext,
        element: Arc<dyn Element>,
        config: MagneticConfig,
        disable_animation: Option<bool>,
    ) -> Self {
        let inert = !(config.strength > 0.0) || !config.strength.is_finite();
        if config.strength < 0.0 {
            tracing::warn!(strength = config.strength, "negative magnetic strength, effect disabled");
        }
        let listeners = if inert {
            Vec::new()
        } else {
            listen_all(
                &element,
                &[ListenerKind::PointerMove, ListenerKind::PointerLeave],
            )
        };
        tracing::debug!(strength = config.strength, "magnetic effect mounted");
        Self {
            sampler: PointerSampler::new(element, Normalization::Centered),
            motion: ctx.motion().clone(),
            scheduler: ctx.scheduler().clone(),
            disable_animation,
            config,
            springs: None,
            engaged: false,
            ssr: SsrValue::new(MotionStyle::IDENTITY, ctx.mount()),
            _listeners: listeners,
        }
    }

    fn is_inert(&self) -> bool {
        !(self.config.strength > 0.0) || !self.config.strength.is_finite()
    }

    fn is_reduced(&self) -> bool {
        self.motion.is_reduced(self.disable_animation)
    }

    fn springs(&mut self) -> &mut AxisSprings {
        let scheduler = &self.scheduler;
        let spring = self.config.spring;
        self.springs.get_or_insert_with(|| AxisSprings {
            x: AnimatedValue::new(scheduler.clone(), 0.0, spring),
            y: AnimatedValue::new(scheduler.clone(), 0.0, spring),
        })
    }

    /// Current translation in pixels
    pub fn translation(&self) -> Vec2 {
        if self.is_inert() || self.is_reduced() {
            return Vec2::ZERO;
        }
        match &self.springs {
            Some(s) => Vec2::new(s.x.get(), s.y.get()),
            None => Vec2::ZERO,
        }
    }

    /// Whether any spring is currently registered
    pub fn has_springs(&self) -> bool {
        self.springs.is_some()
    }

    pub fn config(&self) -> &MagneticConfig {
        &self.config
    }
}

impl EffectPrimitive for MagneticEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::Magnetic
    }

    fn on_pointer_move(&mut self, event: PointerEvent) {
        if self.is_inert() {
            return;
        }
        if self.is_reduced() {
            // Release the springs so nothing animates in the background.
            self.springs = None;
            self.engaged = false;
            return;
        }
        let sample = self.sampler.sample(event);
        let strength = self.config.strength;
        self.engaged = self.sampler.bounds().is_some();
        let springs = self.springs();
        springs.x.set_target(sample.x * 2.0 * strength);
        springs.y.set_target(sample.y * 2.0 * strength);
    }

    fn on_pointer_leave(&mut self) {
        self.engaged = false;
        if let Some(springs) = self.springs.as_mut() {
            springs.x.set_target(0.0);
            springs.y.set_target(0.0);
        }
    }

    fn live_style(&self) -> MotionStyle {
        let t = self.translation();
        MotionStyle::translate(t.x, t.y)
    }

    fn ssr(&self) -> &SsrValue<MotionStyle> {
        &self.ssr
    }

    fn is_animating(&self) -> bool {
        match &self.springs {
            Some(s) => !self.is_reduced() && (s.x.is_animating() || s.y.is_animating()),
            None => false,
        }
    }

    fn is_engaged(&self) -> bool {
        self.engaged && !self.is_reduced()
    }
}

impl Drop for MagneticEffect {
    fn drop(&mut self) {
        tracing::debug!("magnetic effect unmounted");
    }
}

impl std::fmt::Debug for MagneticEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MagneticEffect")
            .field("strength", &self.config.strength)
            .field("translation", &self.translation())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EffectRuntime;
    use crate::element::ElementRef;
    use flair_core::{Rect, Size};

    fn setup(strength: f32) -> (EffectRuntime, Arc<ElementRef>, MagneticEffect) {
        let runtime = EffectRuntime::headless(Size::new(1280.0, 800.0));
        let element = Arc::new(ElementRef::with_bounds(Rect::new(0.0, 0.0, 200.0, 100.0)));
        let config = MagneticConfig {
            strength,
            ..Default::default()
        };
        let effect = MagneticEffect::new(&runtime.context(), element.clone(), config, None);
        (runtime, element, effect)
    }

    #[test]
    fn test_output_is_proportional_and_bounded() {
        let (runtime, _element, mut effect) = setup(20.0);

        effect.on_pointer_move(PointerEvent::at(150.0, 50.0));
        runtime.run_until_idle(1.0 / 60.0, 2000);
        let quarter = effect.translation();

        effect.on_pointer_move(PointerEvent::at(200.0, 50.0));
        runtime.run_until_idle(1.0 / 60.0, 2000);
        let edge = effect.translation();

        assert!((quarter.x - 10.0).abs() < 0.01);
        assert!((edge.x - 20.0).abs() < 0.01);
        assert!(quarter.y.abs() < 0.01);
    }

    #[test]
    fn test_outside_pointer_is_clamped() {
        let (runtime, _element, mut effect) = setup(20.0);
        effect.on_pointer_move(PointerEvent::at(5000.0, -5000.0));
        runtime.run_until_idle(1.0 / 60.0, 2000);
        let t = effect.translation();
        assert!((t.x - 20.0).abs() < 0.01);
        assert!((t.y + 20.0).abs() < 0.01);
    }

    #[test]
    fn test_zero_strength_never_creates_springs() {
        let (runtime, element, mut effect) = setup(0.0);
        effect.on_pointer_move(PointerEvent::at(200.0, 100.0));
        assert!(!effect.has_springs());
        assert_eq!(effect.translation(), Vec2::ZERO);
        assert_eq!(runtime.scheduler().spring_count(), 0);
        assert_eq!(element.listener_count(), 0);
    }

    #[test]
    fn test_reduced_motion_is_identity() {
        let runtime = EffectRuntime::headless(Size::new(1280.0, 800.0));
        let element = Arc::new(ElementRef::with_bounds(Rect::new(0.0, 0.0, 200.0, 100.0)));
        let mut effect = MagneticEffect::new(
            &runtime.context(),
            element,
            MagneticConfig::default(),
            Some(true),
        );
        effect.on_pointer_move(PointerEvent::at(200.0, 100.0));
        runtime.run_until_idle(1.0 / 60.0, 100);
        assert!(effect.style().is_identity());
        assert!(!effect.has_springs());
    }

    #[test]
    fn test_unmeasured_element_is_neutral() {
        let (runtime, element, mut effect) = setup(20.0);
        element.set_bounds(None);
        effect.on_pointer_move(PointerEvent::at(200.0, 100.0));
        runtime.run_until_idle(1.0 / 60.0, 100);
        assert_eq!(effect.translation(), Vec2::ZERO);
    }
}
