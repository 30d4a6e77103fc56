//! Effect primitives
//!
//! Each primitive composes the pointer sampler, the scroll mapper and spring
//! smoothing into one named behavior. Primitives own their springs, loops
//! and listeners, so dropping one is the whole unmount. While a server
//! render is hydrating, [`style`](EffectPrimitive::style) stays on the
//! fallback until the mount is confirmed.
//!
//! [`InteractiveEffect`] builds the right primitive from an [`EffectConfig`]:
//!
//! ```
//! use std::sync::Arc;
//! use flair_core::{Rect, Size};
//! use flair_effects::{EffectConfig, EffectPrimitive, EffectRuntime, ElementRef, InteractiveEffect};
//!
//! let runtime = EffectRuntime::headless(Size::new(800.0, 600.0));
//! let card = Arc::new(ElementRef::with_bounds(Rect::new(0.0, 0.0, 200.0, 200.0)));
//! let effect = InteractiveEffect::new(&runtime.context(), card, &EffectConfig::new("tilt"));
//! assert!(effect.style().is_identity());
//! ```

pub mod hover;
pub mod kind;
pub mod magnetic;
pub mod parallax;
pub mod spotlight;
pub mod stagger;
pub mod tilt;
pub mod typewriter;

use std::sync::Arc;

pub use kind::{EffectConfig, EffectKind};

use crate::context::EffectContext;
use crate::element::Element;
use crate::pointer::PointerEvent;
use crate::ssr::SsrValue;
use crate::style::MotionStyle;

use hover::{FloatingEffect, HoverEffect};
use magnetic::MagneticEffect;
use parallax::ParallaxEffect;
use spotlight::SpotlightEffect;
use tilt::TiltEffect;

/// Common surface of every element-attached effect
///
/// Input handlers are cheap: they retarget springs or request a measure
/// frame. The actual motion happens when the host ticks the scheduler and
/// then reads [`style`](Self::style).
pub trait EffectPrimitive {
    fn kind(&self) -> EffectKind;

    fn on_pointer_enter(&mut self) {}

    fn on_pointer_move(&mut self, _event: PointerEvent) {}

    fn on_pointer_leave(&mut self) {}

    fn on_scroll(&mut self) {}

    fn on_resize(&mut self) {}

    /// Transform computed from the effect's springs and loops
    fn live_style(&self) -> MotionStyle;

    /// Mount gate holding the server-render transform
    fn ssr(&self) -> &SsrValue<MotionStyle>;

    /// Transform to apply to the element this frame
    ///
    /// Each call is one render: the fallback until the component is live,
    /// then [`live_style`](Self::live_style).
    fn style(&self) -> MotionStyle {
        self.ssr().render(|| self.live_style())
    }

    /// Transform for the first (pre-mount) render
    fn fallback_style(&self) -> MotionStyle {
        *self.ssr().fallback()
    }

    /// Whether any spring or loop owned by the effect is still moving
    fn is_animating(&self) -> bool {
        false
    }

    /// Whether the pointer is currently driving the effect
    fn is_engaged(&self) -> bool {
        false
    }
}

/// Placeholder for an unknown or empty kind: no listeners, no springs
#[derive(Debug)]
pub struct NoEffect {
    ssr: SsrValue<MotionStyle>,
}

impl NoEffect {
    pub fn new(ctx: &EffectContext) -> Self {
        Self {
            ssr: SsrValue::new(MotionStyle::IDENTITY, ctx.mount()),
        }
    }
}

impl EffectPrimitive for NoEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::None
    }

    fn live_style(&self) -> MotionStyle {
        MotionStyle::IDENTITY
    }

    fn ssr(&self) -> &SsrValue<MotionStyle> {
        &self.ssr
    }
}

/// Any element-attached effect, chosen at runtime by kind
#[derive(Debug)]
pub enum InteractiveEffect {
    None(NoEffect),
    Hover(HoverEffect),
    Magnetic(MagneticEffect),
    Spotlight(SpotlightEffect),
    Tilt(TiltEffect),
    Floating(FloatingEffect),
    Parallax(ParallaxEffect),
}

impl InteractiveEffect {
    /// Build the effect `config` names, filling unset fields from the
    /// context's configuration sections
    pub fn new(ctx: &EffectContext, element: Arc<dyn Element>, config: &EffectConfig) -> Self {
        let defaults = ctx.config();
        let disable = config.disable_animation;
        let strength = config.strength;

        match config.kind {
            EffectKind::None => InteractiveEffect::None(NoEffect::new(ctx)),
            kind @ (EffectKind::Zoom | EffectKind::Lift | EffectKind::Glow | EffectKind::Rotate) => {
                let mut hover = defaults.hover;
                if let Some(s) = strength {
                    match kind {
                        EffectKind::Zoom => hover.zoom_scale = s,
                        EffectKind::Lift => hover.lift_distance = s,
                        EffectKind::Glow => hover.glow_opacity = s,
                        _ => hover.rotate_degrees = s,
                    }
                }
                InteractiveEffect::Hover(HoverEffect::new(ctx, element, kind, hover, disable))
            }
            EffectKind::Magnetic => {
                let mut magnetic = defaults.magnetic;
                if let Some(s) = strength {
                    magnetic.strength = s;
                }
                InteractiveEffect::Magnetic(MagneticEffect::new(ctx, element, magnetic, disable))
            }
            EffectKind::Spotlight => {
                let mut spotlight = defaults.spotlight;
                if let Some(s) = strength {
                    spotlight.radius = s;
                }
                if let Some(&color) = config.colors.first() {
                    spotlight.color = color;
                }
                InteractiveEffect::Spotlight(SpotlightEffect::new(ctx, element, spotlight, disable))
            }
            EffectKind::Tilt => {
                let mut tilt = defaults.tilt;
                if let Some(s) = strength {
                    tilt.tilt_amount = s;
                }
                InteractiveEffect::Tilt(TiltEffect::new(ctx, element, tilt, disable))
            }
            EffectKind::Floating => {
                let mut floating = defaults.floating;
                if let Some(s) = strength {
                    floating.amplitude = s;
                }
                if let Some(ms) = config.duration_ms {
                    floating.period_ms = ms;
                }
                InteractiveEffect::Floating(FloatingEffect::new(ctx, floating, config.index, disable))
            }
            EffectKind::Parallax => {
                let mut parallax = defaults.parallax;
                if let Some(s) = strength {
                    parallax.distance = s;
                }
                InteractiveEffect::Parallax(ParallaxEffect::new(ctx, element, parallax, disable))
            }
        }
    }

    fn primitive(&self) -> &dyn EffectPrimitive {
        match self {
            InteractiveEffect::None(e) => e,
            InteractiveEffect::Hover(e) => e,
            InteractiveEffect::Magnetic(e) => e,
            InteractiveEffect::Spotlight(e) => e,
            InteractiveEffect::Tilt(e) => e,
            InteractiveEffect::Floating(e) => e,
            InteractiveEffect::Parallax(e) => e,
        }
    }

    fn primitive_mut(&mut self) -> &mut dyn EffectPrimitive {
        match self {
            InteractiveEffect::None(e) => e,
            InteractiveEffect::Hover(e) => e,
            InteractiveEffect::Magnetic(e) => e,
            InteractiveEffect::Spotlight(e) => e,
            InteractiveEffect::Tilt(e) => e,
            InteractiveEffect::Floating(e) => e,
            InteractiveEffect::Parallax(e) => e,
        }
    }
}

impl EffectPrimitive for InteractiveEffect {
    fn kind(&self) -> EffectKind {
        self.primitive().kind()
    }

    fn on_pointer_enter(&mut self) {
        self.primitive_mut().on_pointer_enter();
    }

    fn on_pointer_move(&mut self, event: PointerEvent) {
        self.primitive_mut().on_pointer_move(event);
    }

    fn on_pointer_leave(&mut self) {
        self.primitive_mut().on_pointer_leave();
    }

    fn on_scroll(&mut self) {
        self.primitive_mut().on_scroll();
    }

    fn on_resize(&mut self) {
        self.primitive_mut().on_resize();
    }

    fn live_style(&self) -> MotionStyle {
        self.primitive().live_style()
    }

    fn ssr(&self) -> &SsrValue<MotionStyle> {
        self.primitive().ssr()
    }

    fn is_animating(&self) -> bool {
        self.primitive().is_animating()
    }

    fn is_engaged(&self) -> bool {
        self.primitive().is_engaged()
    }
}
