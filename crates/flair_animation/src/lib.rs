//! Flair Animation System
//!
//! Spring smoothing, keyframe loops, and timeline orchestration, all driven
//! by one shared [`AnimationScheduler`].
//!
//! # Features
//!
//! - **Springs**: semi-implicit Euler with fixed substeps, pure `update(dt)`
//! - **Keyframe Animations**: delays, repeats, alternate playback
//! - **Timelines**: start/end tweens at offsets, used for staggering
//! - **Range Mapping**: `remap` and piecewise `interpolate` for scroll-linked values
//! - **Scheduler**: registry of active animations that only asks the host for
//!   frames while something is moving

pub mod easing;
pub mod keyframe;
pub mod scheduler;
pub mod spring;
pub mod timeline;
pub mod values;

pub use easing::Easing;
pub use keyframe::{Keyframe, KeyframeAnimation, Repeat};
pub use scheduler::{
    AnimatedKeyframe, AnimatedTimeline, AnimatedValue, AnimationScheduler, FrameCallbackGuard,
    FrameCallbackId, KeyframeId, SchedulerHandle, SpringId, TimelineId, WakeCallback,
};
pub use spring::{SpringConfig, SpringState, MAX_FRAME_DELTA, MAX_SUBSTEP};
pub use timeline::{Timeline, TimelineEntryId};
pub use values::{interpolate, remap, Interpolate};
