//! Pointer sampling
//!
//! Converts raw pointer positions into coordinates normalized to an element's
//! bounds. Sampling is a pure function of the current bounds and the event;
//! the bounds are re-measured on every call because elements reflow.

use std::sync::Arc;

use flair_core::{Point, Rect};

use crate::element::Element;

/// A raw pointer event in viewport coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub position: Point,
    /// Host timestamp in milliseconds
    pub timestamp_ms: f64,
}

impl PointerEvent {
    pub fn new(x: f32, y: f32, timestamp_ms: f64) -> Self {
        Self {
            position: Point::new(x, y),
            timestamp_ms,
        }
    }

    /// An event without a meaningful timestamp
    pub fn at(x: f32, y: f32) -> Self {
        Self::new(x, y, 0.0)
    }
}

/// Coordinate space of a [`PointerSample`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Normalization {
    /// `[0, 1]` with the origin at the top-left corner
    #[default]
    Unit,
    /// `[-0.5, 0.5]` with the origin at the center
    Centered,
}

impl Normalization {
    /// Coordinate of the element center in this space
    fn center(self) -> f32 {
        match self {
            Normalization::Unit => 0.5,
            Normalization::Centered => 0.0,
        }
    }
}

/// Normalized pointer position relative to an element
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
    pub t: f64,
    pub normalization: Normalization,
}

impl PointerSample {
    /// The resting sample: the element center
    pub fn neutral(normalization: Normalization) -> Self {
        let c = normalization.center();
        Self {
            x: c,
            y: c,
            t: 0.0,
            normalization,
        }
    }

    pub fn is_neutral(&self) -> bool {
        let c = self.normalization.center();
        self.x == c && self.y == c
    }

    /// Convert to the other normalization
    pub fn to(&self, normalization: Normalization) -> Self {
        let shift = normalization.center() - self.normalization.center();
        Self {
            x: self.x + shift,
            y: self.y + shift,
            t: self.t,
            normalization,
        }
    }
}

/// Sample `event` against `bounds`
///
/// The position is clamped to the bounds, never extrapolated. Missing or
/// unmeasurable bounds give the neutral sample.
pub fn sample(
    bounds: Option<Rect>,
    event: PointerEvent,
    normalization: Normalization,
) -> PointerSample {
    let Some(rect) = bounds.filter(Rect::is_measurable) else {
        return PointerSample::neutral(normalization);
    };
    if !(event.position.x.is_finite() && event.position.y.is_finite()) {
        return PointerSample::neutral(normalization);
    }

    let p = rect.clamp_point(event.position);
    let shift = normalization.center() - 0.5;
    PointerSample {
        x: (p.x - rect.x()) / rect.width() + shift,
        y: (p.y - rect.y()) / rect.height() + shift,
        t: event.timestamp_ms,
        normalization,
    }
}

/// Samples pointer events against a live element
#[derive(Clone)]
pub struct PointerSampler {
    element: Arc<dyn Element>,
    normalization: Normalization,
}

impl PointerSampler {
    pub fn new(element: Arc<dyn Element>, normalization: Normalization) -> Self {
        Self {
            element,
            normalization,
        }
    }

    /// Sample against the element's current bounds
    pub fn sample(&self, event: PointerEvent) -> PointerSample {
        sample(self.element.bounds(), event, self.normalization)
    }

    /// The sample reported on pointer leave or blur
    pub fn neutral(&self) -> PointerSample {
        PointerSample::neutral(self.normalization)
    }

    /// Current bounds, if the element is measurable
    pub fn bounds(&self) -> Option<Rect> {
        self.element.bounds().filter(Rect::is_measurable)
    }

    /// Pointer position clamped into the element, in element-local pixels
    pub fn local_position(&self, event: PointerEvent) -> Option<Point> {
        let rect = self.bounds()?;
        let p = rect.clamp_point(event.position);
        Some(Point::new(p.x - rect.x(), p.y - rect.y()))
    }

    pub fn element(&self) -> &Arc<dyn Element> {
        &self.element
    }
}

impl std::fmt::Debug for PointerSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointerSampler")
            .field("bounds", &self.element.bounds())
            .field("normalization", &self.normalization)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementRef;

    const BOX: Rect = Rect::new(100.0, 50.0, 200.0, 200.0);

    #[test]
    fn test_unit_sample() {
        let s = sample(Some(BOX), PointerEvent::new(150.0, 100.0, 7.0), Normalization::Unit);
        assert_eq!((s.x, s.y), (0.25, 0.25));
        assert_eq!(s.t, 7.0);
    }

    #[test]
    fn test_centered_sample() {
        let s = sample(Some(BOX), PointerEvent::at(200.0, 150.0), Normalization::Centered);
        assert!(s.is_neutral());
        let s = sample(Some(BOX), PointerEvent::at(300.0, 50.0), Normalization::Centered);
        assert_eq!((s.x, s.y), (0.5, -0.5));
    }

    #[test]
    fn test_outside_is_clamped() {
        let s = sample(Some(BOX), PointerEvent::at(-1000.0, 9000.0), Normalization::Unit);
        assert_eq!((s.x, s.y), (0.0, 1.0));
    }

    #[test]
    fn test_unmeasurable_is_neutral() {
        let s = sample(None, PointerEvent::at(1.0, 1.0), Normalization::Unit);
        assert!(s.is_neutral());
        let empty = Rect::new(0.0, 0.0, 0.0, 10.0);
        let s = sample(Some(empty), PointerEvent::at(1.0, 1.0), Normalization::Centered);
        assert!(s.is_neutral());
        let s = sample(Some(BOX), PointerEvent::at(f32::NAN, 1.0), Normalization::Unit);
        assert!(s.is_neutral());
    }

    #[test]
    fn test_sampler_remeasures() {
        let element = Arc::new(ElementRef::with_bounds(BOX));
        let sampler = PointerSampler::new(element.clone(), Normalization::Unit);
        let event = PointerEvent::at(200.0, 150.0);
        assert_eq!(sampler.sample(event).x, 0.5);

        element.set_bounds(Some(BOX.offset(100.0, 0.0)));
        assert_eq!(sampler.sample(event).x, 0.0);
    }

    #[test]
    fn test_convert_normalization() {
        let s = PointerSample::neutral(Normalization::Unit).to(Normalization::Centered);
        assert!(s.is_neutral());
    }
}
