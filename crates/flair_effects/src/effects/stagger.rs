//! Staggered-children reveal
//!
//! Every child fades in and rises into place on one shared timeline. Each
//! child's entry is offset by a delay computed from its index.
//!
//! Reducing motion drops the timeline and shows every child in place. When
//! motion comes back after the reveal has started, the rebuilt timeline is
//! parked at its end so children never hide again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use flair_animation::{AnimatedTimeline, Easing, Timeline, TimelineEntryId};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::context::EffectContext;
use crate::motion_policy::MotionGate;
use crate::style::MotionStyle;

/// Order in which children start
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaggerOrder {
    /// First to last
    #[default]
    Forward,
    /// Last to first
    Reverse,
    /// Center outward
    FromCenter,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaggerConfig {
    /// Delay between consecutive children
    pub delay_ms: u32,
    /// Reveal time of a single child
    pub duration_ms: u32,
    /// Rise distance in pixels; children start this far below their slot
    pub distance: f32,
    pub order: StaggerOrder,
    /// Stop growing the delay after this many steps
    pub limit: Option<usize>,
    pub easing: Easing,
}

impl Default for StaggerConfig {
    fn default() -> Self {
        Self {
            delay_ms: 80,
            duration_ms: 400,
            distance: 20.0,
            order: StaggerOrder::Forward,
            limit: None,
            easing: Easing::EaseOut,
        }
    }
}

impl StaggerConfig {
    pub fn new(delay_ms: u32) -> Self {
        Self {
            delay_ms,
            ..Default::default()
        }
    }

    pub fn reverse(mut self) -> Self {
        self.order = StaggerOrder::Reverse;
        self
    }

    pub fn from_center(mut self) -> Self {
        self.order = StaggerOrder::FromCenter;
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Start delay for child `index` of `total`
    pub fn delay_for_index(&self, index: usize, total: usize) -> u32 {
        let step = match self.order {
            StaggerOrder::Forward => index,
            StaggerOrder::Reverse => total.saturating_sub(1).saturating_sub(index),
            StaggerOrder::FromCenter => index.abs_diff(total / 2),
        };
        let step = match self.limit {
            Some(limit) => step.min(limit),
            None => step,
        };
        self.delay_ms.saturating_mul(step as u32)
    }
}

struct Reveal {
    timeline: AnimatedTimeline,
    entries: SmallVec<[TimelineEntryId; 8]>,
}

/// Reveal driver for a fixed number of children
pub struct StaggerReveal {
    config: StaggerConfig,
    count: usize,
    started: Arc<AtomicBool>,
    reveal: MotionGate<Reveal>,
}

impl StaggerReveal {
    /// Build the timeline; children stay hidden until [`start`](Self::start)
    pub fn new(
        ctx: &EffectContext,
        count: usize,
        config: StaggerConfig,
        disable_animation: Option<bool>,
    ) -> Self {
        let scheduler = ctx.scheduler().clone();
        let started = Arc::new(AtomicBool::new(false));
        let was_started = Arc::clone(&started);
        let reveal = MotionGate::new(ctx.motion(), disable_animation, move || {
            if count == 0 {
                return None;
            }
            let mut timeline = Timeline::new();
            let entries = (0..count)
                .map(|i| {
                    timeline.add(
                        config.delay_for_index(i, count),
                        config.duration_ms,
                        0.0,
                        1.0,
                        config.easing,
                    )
                })
                .collect();
            tracing::debug!(
                count,
                duration_ms = timeline.duration_ms(),
                "stagger timeline built"
            );
            let mut timeline = AnimatedTimeline::new(scheduler.clone(), timeline);
            if was_started.load(Ordering::Acquire) {
                timeline.finish();
            }
            Some(Reveal { timeline, entries })
        });
        Self {
            config,
            count,
            started,
            reveal,
        }
    }

    /// Play the reveal from the beginning
    pub fn start(&mut self) {
        self.started.store(true, Ordering::Release);
        self.reveal.with_mut(|r| r.timeline.start());
    }

    /// Jump every child to its final state
    pub fn finish(&mut self) {
        self.started.store(true, Ordering::Release);
        self.reveal.with_mut(|r| r.timeline.finish());
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Eased reveal amount for one child (0.0 hidden, 1.0 in place)
    pub fn child_progress(&self, index: usize) -> f32 {
        self.reveal
            .with(|r| {
                r.entries
                    .get(index)
                    .and_then(|&entry| r.timeline.value(entry))
            })
            .flatten()
            .unwrap_or(1.0)
    }

    /// Style for one child; out-of-range indices are already in place
    pub fn child_style(&self, index: usize) -> MotionStyle {
        let p = self.child_progress(index);
        MotionStyle::translate(0.0, self.config.distance * (1.0 - p)).with_opacity(p)
    }

    pub fn is_animating(&self) -> bool {
        self.reveal.with(|r| r.timeline.is_playing()).unwrap_or(false)
    }
}

impl std::fmt::Debug for StaggerReveal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaggerReveal")
            .field("children", &self.count)
            .field("animating", &self.is_animating())
            .finish()
    }
}
