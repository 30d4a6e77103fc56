//! Dot lattice with a pointer highlight
//!
//! A regular grid of dots covers the surface. Dots near the pointer brighten
//! with a quadratic falloff, and the highlight strength eases in and out
//! through a spring as the pointer enters and leaves.

use std::sync::Arc;

use flair_animation::{AnimatedValue, SpringConfig};
use flair_core::{Color, Point, Size};
use serde::{Deserialize, Serialize};

use crate::context::EffectContext;
use crate::element::{listen_all, Element, ListenerGuard, ListenerKind};
use crate::motion_policy::MotionPolicy;
use crate::pointer::{Normalization, PointerEvent, PointerSampler};
use crate::ssr::{Phase, SsrGate};

use super::{BackgroundEffectConfig, GenerationKey};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridDotsConfig {
    /// Distance between neighbouring dots in pixels
    pub spacing: f32,
    pub dot_radius: f32,
    /// Reach of the pointer highlight in pixels
    pub highlight_radius: f32,
    /// Opacity of dots outside the highlight
    pub base_opacity: f32,
    pub spring: SpringConfig,
}

impl Default for GridDotsConfig {
    fn default() -> Self {
        Self {
            spacing: 24.0,
            dot_radius: 1.5,
            highlight_radius: 120.0,
            base_opacity: 0.2,
            spring: SpringConfig::responsive(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DotFrame {
    pub center: Point,
    pub radius: f32,
    pub color: Color,
    pub opacity: f32,
}

pub struct GridDots {
    sampler: PointerSampler,
    motion: MotionPolicy,
    disable_animation: Option<bool>,
    config: BackgroundEffectConfig,
    grid: GridDotsConfig,
    key: GenerationKey,
    dots: Vec<Point>,
    pointer: Option<Point>,
    intensity: AnimatedValue,
    ssr: SsrGate,
    _listeners: Vec<ListenerGuard>,
}

impl GridDots {
    pub fn new(
        ctx: &EffectContext,
        element: Arc<dyn Element>,
        config: &BackgroundEffectConfig,
        grid: GridDotsConfig,
        disable_animation: Option<bool>,
    ) -> Self {
        let mut grid = grid;
        if !(grid.spacing > 0.0) || !grid.spacing.is_finite() {
            tracing::warn!(spacing = grid.spacing, "invalid grid spacing, using default");
            grid.spacing = GridDotsConfig::default().spacing;
        }
        if !(grid.highlight_radius > 0.0) {
            grid.highlight_radius = 0.0;
        }
        let size = element
            .bounds()
            .map(|b| Size::new(b.width(), b.height()))
            .unwrap_or(Size::ZERO);
        let listeners = listen_all(
            &element,
            &[ListenerKind::PointerMove, ListenerKind::PointerLeave],
        );
        let mut dots = Self {
            sampler: PointerSampler::new(element, Normalization::Unit),
            motion: ctx.motion().clone(),
            disable_animation,
            config: config.sanitized(),
            grid,
            key: GenerationKey::default(),
            dots: Vec::new(),
            pointer: None,
            intensity: AnimatedValue::new(ctx.scheduler().clone(), 0.0, grid.spring),
            ssr: SsrGate::new(ctx.mount()),
            _listeners: listeners,
        };
        dots.update(config, size);
        dots
    }

    fn is_reduced(&self) -> bool {
        self.motion.is_reduced(self.disable_animation)
    }

    /// Returns true when the lattice was rebuilt
    pub fn update(&mut self, config: &BackgroundEffectConfig, size: Size) -> bool {
        let config = config.sanitized();
        if !self.key.update(&config, size) {
            return false;
        }
        self.config = config;
        self.dots = lattice(size, self.grid.spacing);
        tracing::debug!(dots = self.dots.len(), "dot grid regenerated");
        true
    }

    pub fn on_pointer_move(&mut self, event: PointerEvent) {
        if self.is_reduced() {
            self.intensity.set_immediate(0.0);
            return;
        }
        match self.sampler.local_position(event) {
            Some(position) => {
                self.pointer = Some(position);
                self.intensity.set_target(1.0);
            }
            None => self.on_pointer_leave(),
        }
    }

    pub fn on_pointer_leave(&mut self) {
        self.intensity.set_target(0.0);
    }

    /// Highlight strength (0.0 to 1.0); 0 before the component is live
    pub fn intensity(&self) -> f32 {
        match self.ssr.phase() {
            Phase::Fallback => 0.0,
            Phase::Live => self.live_intensity(),
        }
    }

    fn live_intensity(&self) -> f32 {
        if self.is_reduced() {
            0.0
        } else {
            self.intensity.get().clamp(0.0, 1.0)
        }
    }

    /// Brightness boost for a dot at `point` (0.0 to 1.0)
    pub fn highlight_at(&self, point: Point) -> f32 {
        self.highlight_with(point, self.intensity())
    }

    fn highlight_with(&self, point: Point, intensity: f32) -> f32 {
        let Some(pointer) = self.pointer else {
            return 0.0;
        };
        if self.grid.highlight_radius <= 0.0 || intensity <= 0.0 {
            return 0.0;
        }
        let falloff = (1.0 - point.distance(pointer) / self.grid.highlight_radius).clamp(0.0, 1.0);
        falloff * falloff * intensity
    }

    /// Every dot for this render
    pub fn frame(&self) -> Vec<DotFrame> {
        let intensity = match self.ssr.begin_render() {
            Phase::Fallback => 0.0,
            Phase::Live => self.live_intensity(),
        };
        let base = self.grid.base_opacity.clamp(0.0, 1.0);
        let color = self.config.color_at(0);
        self.dots
            .iter()
            .map(|&center| DotFrame {
                center,
                radius: self.grid.dot_radius,
                color,
                opacity: base + (1.0 - base) * self.highlight_with(center, intensity),
            })
            .collect()
    }

    pub fn dot_count(&self) -> usize {
        self.dots.len()
    }

    pub fn is_animating(&self) -> bool {
        !self.is_reduced() && self.intensity.is_animating()
    }
}

fn lattice(size: Size, spacing: f32) -> Vec<Point> {
    if size.is_empty() {
        return Vec::new();
    }
    let cols = (size.width / spacing).floor() as usize;
    let rows = (size.height / spacing).floor() as usize;
    let half = spacing / 2.0;
    (0..rows)
        .flat_map(|r| {
            (0..cols).map(move |c| Point::new(half + c as f32 * spacing, half + r as f32 * spacing))
        })
        .collect()
}

impl std::fmt::Debug for GridDots {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridDots")
            .field("dots", &self.dots.len())
            .field("intensity", &self.intensity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EffectRuntime;
    use crate::element::ElementRef;
    use crate::motion_policy::{ManualMediaQuery, StaticMediaQuery};
    use flair_core::Rect;

    fn setup(disable: Option<bool>) -> (EffectRuntime, Arc<ElementRef>, GridDots) {
        let runtime = EffectRuntime::headless(Size::new(1000.0, 800.0));
        let el = Arc::new(ElementRef::with_bounds(Rect::new(0.0, 0.0, 240.0, 120.0)));
        let dots = GridDots::new(
            &runtime.context(),
            el.clone(),
            &BackgroundEffectConfig::default(),
            GridDotsConfig::default(),
            disable,
        );
        (runtime, el, dots)
    }

    #[test]
    fn test_lattice_covers_surface() {
        let (_runtime, _el, dots) = setup(None);
        assert_eq!(dots.dot_count(), 10 * 5);
        let frame = dots.frame();
        assert_eq!(frame[0].center, Point::new(12.0, 12.0));
        assert!(frame.iter().all(|d| d.opacity == 0.2));
    }

    #[test]
    fn test_highlight_falls_off_with_distance() {
        let (runtime, _el, mut dots) = setup(None);
        dots.on_pointer_move(PointerEvent::at(12.0, 12.0));
        runtime.run_until_idle(1.0 / 60.0, 1000);

        let frame = dots.frame();
        let near = frame[0].opacity;
        let far = frame.last().map(|d| d.opacity).unwrap_or_default();
        assert!((near - 1.0).abs() < 1e-3);
        assert_eq!(far, 0.2);
        assert!(frame[1].opacity < near && frame[1].opacity > 0.2);
    }

    #[test]
    fn test_leave_fades_highlight() {
        let (runtime, _el, mut dots) = setup(None);
        dots.on_pointer_move(PointerEvent::at(100.0, 60.0));
        runtime.run_until_idle(1.0 / 60.0, 1000);
        dots.on_pointer_leave();
        runtime.run_until_idle(1.0 / 60.0, 1000);
        assert!(dots.frame().iter().all(|d| (d.opacity - 0.2).abs() < 1e-3));
    }

    #[test]
    fn test_reduced_motion_never_highlights() {
        let (runtime, _el, mut dots) = setup(Some(true));
        dots.on_pointer_move(PointerEvent::at(12.0, 12.0));
        runtime.run_until_idle(1.0 / 60.0, 100);
        assert_eq!(dots.intensity(), 0.0);
        assert_eq!(runtime.scheduler().spring_count(), 0);
    }

    #[test]
    fn test_drop_removes_listeners() {
        let (_runtime, el, dots) = setup(None);
        assert_eq!(el.listener_count(), 2);
        drop(dots);
        assert_eq!(el.listener_count(), 0);
    }

    #[test]
    fn test_highlight_follows_live_preference_changes() {
        let query = ManualMediaQuery::new(Some(false));
        let runtime = EffectRuntime::new(&query, Size::new(1000.0, 800.0));
        let el = Arc::new(ElementRef::with_bounds(Rect::new(0.0, 0.0, 240.0, 120.0)));
        let mut dots = GridDots::new(
            &runtime.context(),
            el,
            &BackgroundEffectConfig::default(),
            GridDotsConfig::default(),
            None,
        );
        dots.on_pointer_move(PointerEvent::at(12.0, 12.0));
        runtime.tick_with_dt(1.0 / 60.0);

        query.set(Some(true));
        assert_eq!(dots.intensity(), 0.0);
        assert!(!dots.is_animating());
        assert!(dots.frame().iter().all(|d| d.opacity == 0.2));
        runtime.run_until_idle(1.0 / 60.0, 1000);
        assert!(!runtime.scheduler().has_active_animations());

        query.set(Some(false));
        dots.on_pointer_move(PointerEvent::at(12.0, 12.0));
        runtime.run_until_idle(1.0 / 60.0, 1000);
        assert!((dots.intensity() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_unconfirmed_mount_renders_plain_grid() {
        let runtime = EffectRuntime::hydrating(&StaticMediaQuery(Some(false)), Size::new(1000.0, 800.0));
        let el = Arc::new(ElementRef::with_bounds(Rect::new(0.0, 0.0, 240.0, 120.0)));
        let mut dots = GridDots::new(
            &runtime.context(),
            el,
            &BackgroundEffectConfig::default(),
            GridDotsConfig::default(),
            None,
        );
        dots.on_pointer_move(PointerEvent::at(12.0, 12.0));
        runtime.run_until_idle(1.0 / 60.0, 1000);
        assert!(dots.frame().iter().all(|d| d.opacity == 0.2));
        assert!(dots.frame().iter().all(|d| d.opacity == 0.2));

        runtime.confirm_mount();
        assert!(dots.frame()[0].opacity > 0.9);
    }
}
