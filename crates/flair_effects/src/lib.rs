//! Flair Effects
//!
//! Interactive motion for UI elements: pointer- and scroll-driven effects,
//! smoothed by springs and driven by one shared frame scheduler.
//!
//! - **Pointer Sampler**: element-relative, clamped pointer coordinates
//! - **Scroll Progress Mapper**: scroll position through a window as `[0, 1]`
//! - **Effect Primitives**: magnetic, spotlight, tilt, parallax, hover kinds,
//!   floating, typewriter and staggered reveals
//! - **Reduced-Motion Policy**: one process-wide preference with
//!   per-instance overrides; every effect reads it before moving
//! - **SSR-safe values**: a first render that always matches the server,
//!   and no client-only motion until the mount is confirmed
//! - **Backgrounds**: seeded beams, particles, dot grids, moving borders and
//!   aurora washes
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use flair_core::{Rect, Size};
//! use flair_effects::prelude::*;
//!
//! let runtime = EffectRuntime::headless(Size::new(1280.0, 800.0));
//! let card = Arc::new(ElementRef::with_bounds(Rect::new(0.0, 0.0, 200.0, 200.0)));
//!
//! let mut tilt = InteractiveEffect::new(&runtime.context(), card, &EffectConfig::new("tilt"));
//! tilt.on_pointer_move(PointerEvent::at(0.0, 0.0));
//! runtime.run_until_idle(1.0 / 60.0, 600);
//!
//! let style = tilt.style();
//! assert_eq!((style.rotate_x, style.rotate_y), (5.0, -5.0));
//! ```

pub mod backgrounds;
pub mod config;
pub mod context;
pub mod effects;
pub mod element;
pub mod error;
pub mod motion_policy;
pub mod pointer;
pub mod scroll;
pub mod ssr;
pub mod style;

pub use config::{BackgroundsConfig, EffectsConfig};
pub use context::{EffectContext, EffectRuntime};
pub use effects::{EffectConfig, EffectKind, EffectPrimitive, InteractiveEffect, NoEffect};
pub use element::{Element, ElementRef, ListenerGuard, ListenerId, ListenerKind, ListenerOptions};
pub use error::{EffectsError, Result};
pub use motion_policy::{
    ManualMediaQuery, MediaQuerySource, MotionGate, MotionPolicy, ReducedMotionPolicy,
    StaticMediaQuery,
};
pub use pointer::{Normalization, PointerEvent, PointerSample, PointerSampler};
pub use scroll::{ScrollOffset, ScrollProgressMapper, ScrollWindow};
pub use ssr::{MountSignal, Phase, SsrGate, SsrValue};
pub use style::MotionStyle;

/// Commonly used types
pub mod prelude {
    pub use crate::backgrounds::{
        Aurora, BackgroundEffectConfig, Beams, GridDots, MovingBorder, Particles, SectionDivider,
    };
    pub use crate::effects::hover::{FloatingEffect, HoverEffect};
    pub use crate::effects::magnetic::MagneticEffect;
    pub use crate::effects::parallax::ParallaxEffect;
    pub use crate::effects::spotlight::SpotlightEffect;
    pub use crate::effects::stagger::{StaggerConfig, StaggerReveal};
    pub use crate::effects::tilt::TiltEffect;
    pub use crate::effects::typewriter::{TypewriterConfig, TypewriterEffect};
    pub use crate::{
        EffectConfig, EffectContext, EffectKind, EffectPrimitive, EffectRuntime, EffectsConfig,
        ElementRef, InteractiveEffect, MotionStyle, MountSignal, PointerEvent,
        ReducedMotionPolicy, ScrollWindow, SsrValue,
    };
}
