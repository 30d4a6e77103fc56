//! Scroll progress mapping
//!
//! Tracks how far an element has travelled through a window of the viewport
//! and exposes that as a progress value in `[0, 1]`.
//!
//! A window is two [`ScrollOffset`]s. Each offset pairs a point on the
//! element with a point on the viewport, both as fractions of their heights:
//! `start end` means "element top meets viewport bottom". Progress is 0 while
//! the start pair has not been reached and 1 once the end pair has passed.
//!
//! Measurement is throttled to one read per frame. Scroll and resize
//! notifications only request a frame callback; the element is measured when
//! that callback runs.

use std::str::FromStr;
use std::sync::Arc;

use flair_animation::{FrameCallbackGuard, SchedulerHandle};
use flair_core::{Observable, ObservableReader, Rect, Subscription};
use serde::{Deserialize, Serialize};

use crate::context::EffectContext;
use crate::element::{listen_all, Element, ListenerGuard, ListenerKind};
use crate::error::{EffectsError, Result};

/// A (element fraction, viewport fraction) pair
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScrollOffset {
    pub element: f32,
    pub viewport: f32,
}

impl ScrollOffset {
    /// Element top meets viewport bottom
    pub const START_END: ScrollOffset = ScrollOffset::new(0.0, 1.0);
    /// Element bottom meets viewport top
    pub const END_START: ScrollOffset = ScrollOffset::new(1.0, 0.0);
    /// Element top meets viewport top
    pub const START_START: ScrollOffset = ScrollOffset::new(0.0, 0.0);
    /// Element bottom meets viewport bottom
    pub const END_END: ScrollOffset = ScrollOffset::new(1.0, 1.0);

    pub const fn new(element: f32, viewport: f32) -> Self {
        Self { element, viewport }
    }

    /// Parse `"<element> <viewport>"`, each `start`, `center`, `end`, a
    /// fraction like `0.25`, or a percentage like `25%`
    pub fn parse(input: &str) -> Result<Self> {
        let mut parts = input.split_whitespace();
        let (Some(element), Some(viewport), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(EffectsError::InvalidScrollOffset(input.to_string()));
        };
        Ok(Self {
            element: parse_edge(element, input)?,
            viewport: parse_edge(viewport, input)?,
        })
    }
}

fn parse_edge(token: &str, input: &str) -> Result<f32> {
    let invalid = || EffectsError::InvalidScrollOffset(input.to_string());
    let value = match token {
        "start" => 0.0,
        "center" => 0.5,
        "end" => 1.0,
        _ => match token.strip_suffix('%') {
            Some(pct) => pct.parse::<f32>().map_err(|_| invalid())? / 100.0,
            None => token.parse::<f32>().map_err(|_| invalid())?,
        },
    };
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid())
    }
}

impl FromStr for ScrollOffset {
    type Err = EffectsError;

    fn from_str(s: &str) -> Result<Self> {
        ScrollOffset::parse(s)
    }
}

impl TryFrom<String> for ScrollOffset {
    type Error = EffectsError;

    fn try_from(s: String) -> Result<Self> {
        ScrollOffset::parse(&s)
    }
}

impl From<ScrollOffset> for String {
    fn from(offset: ScrollOffset) -> Self {
        format!("{} {}", offset.element, offset.viewport)
    }
}

/// The stretch of scrolling mapped onto `[0, 1]`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollWindow {
    pub start: ScrollOffset,
    pub end: ScrollOffset,
}

impl ScrollWindow {
    pub const fn new(start: ScrollOffset, end: ScrollOffset) -> Self {
        Self { start, end }
    }

    /// From the element entering at the bottom to leaving at the top
    pub const fn through_viewport() -> Self {
        Self::new(ScrollOffset::START_END, ScrollOffset::END_START)
    }

    /// From the element top reaching the viewport top to its bottom leaving it
    pub const fn pinned() -> Self {
        Self::new(ScrollOffset::START_START, ScrollOffset::END_START)
    }

    /// Raw progress for an element measured at `bounds` (viewport coordinates)
    ///
    /// Returns `None` when the element or viewport cannot be measured.
    pub fn progress(&self, bounds: Rect, viewport_height: f32) -> Option<f32> {
        if !bounds.origin.y.is_finite()
            || !bounds.size.height.is_finite()
            || bounds.size.height < 0.0
            || !(viewport_height > 0.0)
        {
            return None;
        }
        let h = bounds.height();
        let top = bounds.y();
        let top_at_start = self.start.viewport * viewport_height - self.start.element * h;
        let top_at_end = self.end.viewport * viewport_height - self.end.element * h;
        let span = top_at_start - top_at_end;

        if span.abs() < f32::EPSILON {
            return Some(if top <= top_at_start { 1.0 } else { 0.0 });
        }
        Some(((top_at_start - top) / span).clamp(0.0, 1.0))
    }
}

impl Default for ScrollWindow {
    fn default() -> Self {
        Self::through_viewport()
    }
}

/// Measures an element's scroll progress once per requested frame
pub struct ScrollProgressMapper {
    element: Arc<dyn Element>,
    window: ScrollWindow,
    progress: Observable<f32>,
    scheduler: SchedulerHandle,
    measure: FrameCallbackGuard,
    _viewport_sub: Subscription,
    _listeners: Vec<ListenerGuard>,
}

impl ScrollProgressMapper {
    pub fn new(ctx: &EffectContext, element: Arc<dyn Element>, window: ScrollWindow) -> Self {
        let progress = Observable::new(0.0_f32);

        let measure = {
            let element = Arc::clone(&element);
            let viewport = ctx.viewport().clone();
            let progress = progress.clone();
            FrameCallbackGuard::new(ctx.scheduler().clone(), move || {
                measure_into(&*element, &window, viewport.get().height, &progress);
            })
        };

        // Resizes re-measure on the next frame.
        let viewport_sub = {
            let scheduler = ctx.scheduler().clone();
            let id = measure.id();
            ctx.viewport().subscribe(move |_| {
                if let Some(id) = id {
                    scheduler.request_frame_callback(id);
                }
            })
        };

        let listeners = listen_all(&element, &[ListenerKind::Scroll, ListenerKind::Resize]);

        // First measurement happens synchronously so consumers start from a
        // real value when layout is already known.
        measure_into(&*element, &window, ctx.viewport().get().height, &progress);

        tracing::debug!(?window, "scroll progress mapper mounted");
        Self {
            element,
            window,
            progress,
            scheduler: ctx.scheduler().clone(),
            measure,
            _viewport_sub: viewport_sub,
            _listeners: listeners,
        }
    }

    /// Scroll notification; measures on the next frame
    pub fn on_scroll(&self) {
        self.measure.request();
    }

    /// Resize notification; measures on the next frame
    pub fn on_resize(&self) {
        self.measure.request();
    }

    /// Measure now against `viewport_height`, bypassing the frame throttle
    pub fn measure_now(&self, viewport_height: f32) -> f32 {
        measure_into(&*self.element, &self.window, viewport_height, &self.progress);
        self.progress.get()
    }

    /// Latest progress (the last measurable value, or 0 if never measured)
    pub fn progress(&self) -> f32 {
        self.progress.get()
    }

    /// Reactive view of the progress
    pub fn reader(&self) -> ObservableReader<f32> {
        self.progress.reader()
    }

    pub fn window(&self) -> ScrollWindow {
        self.window
    }

    pub fn is_measure_pending(&self) -> bool {
        self.measure.is_pending()
    }

    pub fn scheduler(&self) -> &SchedulerHandle {
        &self.scheduler
    }
}

fn measure_into(
    element: &dyn Element,
    window: &ScrollWindow,
    viewport_height: f32,
    progress: &Observable<f32>,
) {
    // Unmeasurable elements keep the last known value.
    let Some(value) = element
        .bounds()
        .and_then(|bounds| window.progress(bounds, viewport_height))
    else {
        return;
    };
    if progress.set(value) {
        tracing::trace!(progress = value, "scroll progress");
    }
}

impl std::fmt::Debug for ScrollProgressMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollProgressMapper")
            .field("window", &self.window)
            .field("progress", &self.progress.get())
            .finish()
    }
}

impl Drop for ScrollProgressMapper {
    fn drop(&mut self) {
        tracing::debug!("scroll progress mapper unmounted");
    }
}
