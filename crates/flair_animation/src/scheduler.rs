//! Animation scheduler
//!
//! One scheduler drives every active animation of a host. Animations are
//! implicitly registered when created through the wrapper types:
//! - `AnimatedValue` - spring-smoothed values
//! - `AnimatedKeyframe` - looping or one-shot keyframe tracks
//! - `AnimatedTimeline` - staggered timelines
//! - `FrameCallbackGuard` - work deferred to the next frame
//!
//! The scheduler never spins on its own. When something becomes active while
//! no frame is pending, the wake callback fires once; the host then calls
//! [`AnimationScheduler::tick`] (or `tick_with_dt`) every frame until it
//! returns `false`. Dropping a wrapper unregisters its entry, so an unmounted
//! effect leaves nothing behind in the registry.

use std::sync::{Arc, Weak};
use std::time::Instant;

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::keyframe::KeyframeAnimation;
use crate::spring::{SpringConfig, SpringState};
use crate::timeline::{Timeline, TimelineEntryId};

new_key_type! {
    /// Handle to a registered spring
    pub struct SpringId;
    /// Handle to a registered keyframe animation
    pub struct KeyframeId;
    /// Handle to a registered timeline
    pub struct TimelineId;
    /// Handle to a registered frame callback
    pub struct FrameCallbackId;
}

/// Frame delta assumed for the first `tick()` after creation
const FIRST_FRAME_DELTA: f32 = 1.0 / 60.0;

/// Callback used to ask the host for a frame
///
/// Called at most once per idle-to-active transition. The callback should
/// schedule a frame on the host (e.g. request an animation frame) and must not
/// tick the scheduler synchronously.
pub type WakeCallback = Arc<dyn Fn() + Send + Sync>;

type FrameFn = Arc<dyn Fn() + Send + Sync>;

struct FrameCallback {
    callback: FrameFn,
    pending: bool,
}

/// Internal state of the animation scheduler
struct SchedulerInner {
    springs: SlotMap<SpringId, SpringState>,
    keyframes: SlotMap<KeyframeId, KeyframeAnimation>,
    timelines: SlotMap<TimelineId, Timeline>,
    frame_callbacks: SlotMap<FrameCallbackId, FrameCallback>,
    last_frame: Option<Instant>,
    frame_requested: bool,
    frame_count: u64,
    wake: Option<WakeCallback>,
}

impl SchedulerInner {
    fn has_active(&self) -> bool {
        self.springs.values().any(|s| !s.is_converged())
            || self.keyframes.values().any(|k| k.is_playing())
            || self.timelines.values().any(|t| t.is_playing())
            || self.frame_callbacks.values().any(|c| c.pending)
    }

    /// Mark a frame as requested, returning the wake callback to invoke once
    /// the lock is released
    fn request_frame(&mut self) -> Option<WakeCallback> {
        if self.frame_requested {
            return None;
        }
        self.frame_requested = true;
        tracing::trace!("animation frame requested");
        self.wake.clone()
    }
}

/// The scheduler that ticks every registered animation
///
/// Held by the host. Effects receive a [`SchedulerHandle`] and never keep the
/// scheduler alive themselves.
#[derive(Clone)]
pub struct AnimationScheduler {
    inner: Arc<Mutex<SchedulerInner>>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SchedulerInner {
                springs: SlotMap::with_key(),
                keyframes: SlotMap::with_key(),
                timelines: SlotMap::with_key(),
                frame_callbacks: SlotMap::with_key(),
                last_frame: None,
                frame_requested: false,
                frame_count: 0,
                wake: None,
            })),
        }
    }

    /// Set the callback invoked when the scheduler needs a frame
    ///
    /// If animations are already active and no frame is pending, the callback
    /// fires immediately.
    pub fn set_wake_callback<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let wake = {
            let mut inner = self.inner.lock();
            inner.wake = Some(Arc::new(callback));
            if inner.has_active() {
                inner.request_frame()
            } else {
                None
            }
        };
        if let Some(wake) = wake {
            wake();
        }
    }

    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Tick all animations using wall-clock time since the previous tick
    ///
    /// Returns true if any animations are still active (need another tick).
    pub fn tick(&self) -> bool {
        let now = Instant::now();
        let dt = {
            let mut inner = self.inner.lock();
            let dt = inner
                .last_frame
                .map(|last| (now - last).as_secs_f32())
                .unwrap_or(FIRST_FRAME_DELTA);
            inner.last_frame = Some(now);
            dt
        };
        self.tick_with_dt(dt)
    }

    /// Tick all animations by an explicit frame delta in seconds
    ///
    /// Pending frame callbacks run first, outside the registry lock, so they
    /// may read or retarget animations. Then springs, keyframes and timelines
    /// advance. Returns true if anything is still active.
    pub fn tick_with_dt(&self, dt: f32) -> bool {
        let callbacks: Vec<FrameFn> = {
            let mut inner = self.inner.lock();
            inner.frame_requested = false;
            inner.frame_count += 1;
            inner
                .frame_callbacks
                .values_mut()
                .filter(|c| c.pending)
                .map(|c| {
                    c.pending = false;
                    Arc::clone(&c.callback)
                })
                .collect()
        };

        for callback in &callbacks {
            callback();
        }

        let mut inner = self.inner.lock();
        let dt_ms = dt * 1000.0;

        for spring in inner.springs.values_mut() {
            spring.step(dt);
        }
        for keyframe in inner.keyframes.values_mut() {
            keyframe.tick(dt_ms);
        }
        for timeline in inner.timelines.values_mut() {
            timeline.tick(dt_ms);
        }

        // Entries stay registered after settling; only their wrappers remove them.
        let active = inner.has_active();
        // The host keeps ticking while this returns true, so no wake is needed.
        inner.frame_requested = active;
        if !active {
            inner.last_frame = None;
        }
        active
    }

    /// Check if any animations are still active
    pub fn has_active_animations(&self) -> bool {
        self.inner.lock().has_active()
    }

    /// Whether the scheduler is waiting for the host to deliver a frame
    pub fn is_frame_requested(&self) -> bool {
        self.inner.lock().frame_requested
    }

    /// Number of frames ticked so far
    pub fn frame_count(&self) -> u64 {
        self.inner.lock().frame_count
    }

    pub fn spring_count(&self) -> usize {
        self.inner.lock().springs.len()
    }

    pub fn keyframe_count(&self) -> usize {
        self.inner.lock().keyframes.len()
    }

    pub fn timeline_count(&self) -> usize {
        self.inner.lock().timelines.len()
    }

    pub fn callback_count(&self) -> usize {
        self.inner.lock().frame_callbacks.len()
    }

    /// Total number of registered entries of any kind
    pub fn entry_count(&self) -> usize {
        let inner = self.inner.lock();
        inner.springs.len()
            + inner.keyframes.len()
            + inner.timelines.len()
            + inner.frame_callbacks.len()
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AnimationScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("AnimationScheduler")
            .field("springs", &inner.springs.len())
            .field("keyframes", &inner.keyframes.len())
            .field("timelines", &inner.timelines.len())
            .field("frame_callbacks", &inner.frame_callbacks.len())
            .field("frame_requested", &inner.frame_requested)
            .finish()
    }
}

// ============================================================================
// Scheduler Handle
// ============================================================================

/// A weak handle to the scheduler
///
/// Every operation is a no-op (or returns `None`) once the scheduler is gone.
#[derive(Clone, Debug)]
pub struct SchedulerHandle {
    inner: Weak<Mutex<SchedulerInner>>,
}

impl SchedulerHandle {
    /// A handle that was never attached to a scheduler
    pub fn detached() -> Self {
        Self { inner: Weak::new() }
    }

    /// Run `f` against the registry and invoke the wake callback if it asked
    /// for a frame
    fn with_inner<R>(&self, f: impl FnOnce(&mut SchedulerInner) -> (R, bool)) -> Option<R> {
        let inner = self.inner.upgrade()?;
        let (result, wake) = {
            let mut guard = inner.lock();
            let (result, wants_frame) = f(&mut *guard);
            let wake = if wants_frame {
                guard.request_frame()
            } else {
                None
            };
            (result, wake)
        };
        if let Some(wake) = wake {
            tracing::debug!("waking host for animation frame");
            wake();
        }
        Some(result)
    }

    fn read<R>(&self, f: impl FnOnce(&SchedulerInner) -> R) -> Option<R> {
        let inner = self.inner.upgrade()?;
        let guard = inner.lock();
        Some(f(&*guard))
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    // ---- springs ----------------------------------------------------------

    pub fn register_spring(&self, spring: SpringState) -> Option<SpringId> {
        self.with_inner(|inner| {
            let active = !spring.is_converged();
            let id = inner.springs.insert(spring);
            tracing::trace!(?id, "spring registered");
            (id, active)
        })
    }

    pub fn set_spring_target(&self, id: SpringId, target: f32) {
        self.with_inner(|inner| match inner.springs.get_mut(id) {
            Some(spring) => {
                spring.retarget(target);
                ((), !spring.is_converged())
            }
            None => ((), false),
        });
    }

    pub fn spring_value(&self, id: SpringId) -> Option<f32> {
        self.read(|inner| inner.springs.get(id).map(|s| s.value()))
            .flatten()
    }

    pub fn spring_velocity(&self, id: SpringId) -> Option<f32> {
        self.read(|inner| inner.springs.get(id).map(|s| s.velocity()))
            .flatten()
    }

    /// A missing spring counts as settled
    pub fn is_spring_settled(&self, id: SpringId) -> bool {
        self.read(|inner| inner.springs.get(id).map(|s| s.is_converged()))
            .flatten()
            .unwrap_or(true)
    }

    pub fn snap_spring(&self, id: SpringId, value: f32) {
        self.with_inner(|inner| {
            if let Some(spring) = inner.springs.get_mut(id) {
                spring.snap(value);
            }
            ((), false)
        });
    }

    pub fn remove_spring(&self, id: SpringId) {
        self.with_inner(|inner| {
            if inner.springs.remove(id).is_some() {
                tracing::trace!(?id, "spring removed");
            }
            ((), false)
        });
    }

    // ---- keyframes --------------------------------------------------------

    pub fn register_keyframe(&self, keyframe: KeyframeAnimation) -> Option<KeyframeId> {
        self.with_inner(|inner| {
            let active = keyframe.is_playing();
            let id = inner.keyframes.insert(keyframe);
            tracing::trace!(?id, "keyframe animation registered");
            (id, active)
        })
    }

    pub fn keyframe_value(&self, id: KeyframeId) -> Option<f32> {
        self.read(|inner| inner.keyframes.get(id).map(|k| k.value()))
            .flatten()
    }

    pub fn keyframe_progress(&self, id: KeyframeId) -> Option<f32> {
        self.read(|inner| inner.keyframes.get(id).map(|k| k.progress()))
            .flatten()
    }

    pub fn is_keyframe_playing(&self, id: KeyframeId) -> bool {
        self.read(|inner| inner.keyframes.get(id).map(|k| k.is_playing()))
            .flatten()
            .unwrap_or(false)
    }

    pub fn start_keyframe(&self, id: KeyframeId) {
        self.with_inner(|inner| match inner.keyframes.get_mut(id) {
            Some(keyframe) => {
                keyframe.start();
                ((), true)
            }
            None => ((), false),
        });
    }

    pub fn stop_keyframe(&self, id: KeyframeId) {
        self.with_inner(|inner| {
            if let Some(keyframe) = inner.keyframes.get_mut(id) {
                keyframe.stop();
            }
            ((), false)
        });
    }

    pub fn remove_keyframe(&self, id: KeyframeId) {
        self.with_inner(|inner| {
            if inner.keyframes.remove(id).is_some() {
                tracing::trace!(?id, "keyframe animation removed");
            }
            ((), false)
        });
    }

    // ---- timelines --------------------------------------------------------

    pub fn register_timeline(&self, timeline: Timeline) -> Option<TimelineId> {
        self.with_inner(|inner| {
            let active = timeline.is_playing();
            let id = inner.timelines.insert(timeline);
            tracing::trace!(?id, "timeline registered");
            (id, active)
        })
    }

    pub fn is_timeline_playing(&self, id: TimelineId) -> bool {
        self.read(|inner| inner.timelines.get(id).map(|t| t.is_playing()))
            .flatten()
            .unwrap_or(false)
    }

    pub fn start_timeline(&self, id: TimelineId) {
        self.with_inner(|inner| match inner.timelines.get_mut(id) {
            Some(timeline) => {
                timeline.start();
                ((), true)
            }
            None => ((), false),
        });
    }

    pub fn stop_timeline(&self, id: TimelineId) {
        self.with_inner(|inner| {
            if let Some(timeline) = inner.timelines.get_mut(id) {
                timeline.stop();
            }
            ((), false)
        });
    }

    pub fn timeline_value(&self, id: TimelineId, entry: TimelineEntryId) -> Option<f32> {
        self.read(|inner| inner.timelines.get(id).and_then(|t| t.value(entry)))
            .flatten()
    }

    /// Access a timeline mutably (e.g. to jump to its end)
    pub fn with_timeline<F, R>(&self, id: TimelineId, f: F) -> Option<R>
    where
        F: FnOnce(&mut Timeline) -> R,
    {
        self.with_inner(|inner| match inner.timelines.get_mut(id) {
            Some(timeline) => {
                let result = f(timeline);
                let active = timeline.is_playing();
                (Some(result), active)
            }
            None => (None, false),
        })
        .flatten()
    }

    pub fn remove_timeline(&self, id: TimelineId) {
        self.with_inner(|inner| {
            if inner.timelines.remove(id).is_some() {
                tracing::trace!(?id, "timeline removed");
            }
            ((), false)
        });
    }

    // ---- frame callbacks --------------------------------------------------

    /// Register a callback that runs at the start of a frame each time it is
    /// requested
    pub fn register_frame_callback<F>(&self, callback: F) -> Option<FrameCallbackId>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.with_inner(|inner| {
            let id = inner.frame_callbacks.insert(FrameCallback {
                callback: Arc::new(callback),
                pending: false,
            });
            (id, false)
        })
    }

    /// Run the callback on the next frame
    ///
    /// Requests made before that frame coalesce into a single run.
    pub fn request_frame_callback(&self, id: FrameCallbackId) {
        self.with_inner(|inner| match inner.frame_callbacks.get_mut(id) {
            Some(cb) => {
                cb.pending = true;
                ((), true)
            }
            None => ((), false),
        });
    }

    pub fn is_frame_callback_pending(&self, id: FrameCallbackId) -> bool {
        self.read(|inner| inner.frame_callbacks.get(id).map(|c| c.pending))
            .flatten()
            .unwrap_or(false)
    }

    pub fn remove_frame_callback(&self, id: FrameCallbackId) {
        self.with_inner(|inner| {
            inner.frame_callbacks.remove(id);
            ((), false)
        });
    }
}

// ============================================================================
// Animated Value
// ============================================================================

/// A spring-smoothed value that registers with the scheduler on demand
///
/// No spring is registered until the first target change that actually moves
/// the value. The spring stays registered until the value is dropped or
/// snapped, so it can be retargeted without re-registration.
///
/// ```
/// use flair_animation::{AnimatedValue, AnimationScheduler, SpringConfig};
///
/// let scheduler = AnimationScheduler::new();
/// let mut x = AnimatedValue::new(scheduler.handle(), 0.0, SpringConfig::responsive());
/// x.set_target(10.0);
/// while scheduler.tick_with_dt(1.0 / 60.0) {}
/// assert_eq!(x.get(), 10.0);
/// ```
pub struct AnimatedValue {
    handle: SchedulerHandle,
    spring_id: Option<SpringId>,
    config: SpringConfig,
    /// Value while no spring is registered
    current: f32,
    target: f32,
}

impl AnimatedValue {
    pub fn new(handle: SchedulerHandle, initial: f32, config: SpringConfig) -> Self {
        Self {
            handle,
            spring_id: None,
            config,
            current: initial,
            target: initial,
        }
    }

    /// Set the target value; starts animating if it differs from the current value
    pub fn set_target(&mut self, target: f32) {
        if !target.is_finite() {
            return;
        }
        self.target = target;

        if let Some(id) = self.spring_id {
            self.handle.set_spring_target(id, target);
        } else if (target - self.current).abs() > self.config.epsilon {
            let spring = SpringState::new(self.config, self.current).set_target(target);
            match self.handle.register_spring(spring) {
                Some(id) => self.spring_id = Some(id),
                // No scheduler to drive the spring.
                None => self.current = target,
            }
        }
    }

    /// Current animated value
    pub fn get(&self) -> f32 {
        match self.spring_id {
            Some(id) => self.handle.spring_value(id).unwrap_or(self.target),
            None => self.current,
        }
    }

    pub fn velocity(&self) -> f32 {
        self.spring_id
            .and_then(|id| self.handle.spring_velocity(id))
            .unwrap_or(0.0)
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    /// Set the value immediately without animation
    pub fn set_immediate(&mut self, value: f32) {
        if let Some(id) = self.spring_id.take() {
            self.handle.remove_spring(id);
        }
        self.current = value;
        self.target = value;
    }

    /// Jump to the target, stopping any active animation
    pub fn snap_to_target(&mut self) {
        self.set_immediate(self.target);
    }

    /// True only while the spring is moving toward its target
    pub fn is_animating(&self) -> bool {
        self.spring_id
            .map(|id| !self.handle.is_spring_settled(id))
            .unwrap_or(false)
    }

    /// Whether a spring is currently registered for this value
    pub fn is_registered(&self) -> bool {
        self.spring_id.is_some()
    }
}

impl Drop for AnimatedValue {
    fn drop(&mut self) {
        if let Some(id) = self.spring_id.take() {
            self.handle.remove_spring(id);
        }
    }
}

impl std::fmt::Debug for AnimatedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimatedValue")
            .field("value", &self.get())
            .field("target", &self.target)
            .field("registered", &self.spring_id.is_some())
            .finish()
    }
}

// ============================================================================
// Animated Keyframe
// ============================================================================

/// A keyframe animation registered with the scheduler for its lifetime
pub struct AnimatedKeyframe {
    handle: SchedulerHandle,
    id: Option<KeyframeId>,
    /// Resting value, used when the scheduler is gone
    fallback: f32,
}

impl AnimatedKeyframe {
    /// Register `animation` without starting it
    pub fn new(handle: SchedulerHandle, animation: KeyframeAnimation) -> Self {
        let fallback = animation.final_value();
        let id = handle.register_keyframe(animation);
        Self {
            handle,
            id,
            fallback,
        }
    }

    /// Register and start `animation`
    pub fn started(handle: SchedulerHandle, animation: KeyframeAnimation) -> Self {
        let mut anim = Self::new(handle, animation);
        anim.start();
        anim
    }

    pub fn start(&mut self) {
        if let Some(id) = self.id {
            self.handle.start_keyframe(id);
        }
    }

    pub fn stop(&mut self) {
        if let Some(id) = self.id {
            self.handle.stop_keyframe(id);
        }
    }

    pub fn get(&self) -> f32 {
        self.id
            .and_then(|id| self.handle.keyframe_value(id))
            .unwrap_or(self.fallback)
    }

    pub fn progress(&self) -> f32 {
        self.id
            .and_then(|id| self.handle.keyframe_progress(id))
            .unwrap_or(1.0)
    }

    pub fn is_playing(&self) -> bool {
        self.id
            .map(|id| self.handle.is_keyframe_playing(id))
            .unwrap_or(false)
    }
}

impl Drop for AnimatedKeyframe {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.handle.remove_keyframe(id);
        }
    }
}

impl std::fmt::Debug for AnimatedKeyframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimatedKeyframe")
            .field("value", &self.get())
            .field("playing", &self.is_playing())
            .finish()
    }
}

// ============================================================================
// Animated Timeline
// ============================================================================

/// A timeline registered with the scheduler for its lifetime
pub struct AnimatedTimeline {
    handle: SchedulerHandle,
    id: Option<TimelineId>,
}

impl AnimatedTimeline {
    pub fn new(handle: SchedulerHandle, timeline: Timeline) -> Self {
        let id = handle.register_timeline(timeline);
        Self { handle, id }
    }

    pub fn start(&mut self) {
        if let Some(id) = self.id {
            self.handle.start_timeline(id);
        }
    }

    pub fn stop(&mut self) {
        if let Some(id) = self.id {
            self.handle.stop_timeline(id);
        }
    }

    /// Jump every entry to its end state
    pub fn finish(&mut self) {
        if let Some(id) = self.id {
            self.handle.with_timeline(id, Timeline::finish);
        }
    }

    pub fn value(&self, entry: TimelineEntryId) -> Option<f32> {
        self.handle.timeline_value(self.id?, entry)
    }

    pub fn is_playing(&self) -> bool {
        self.id
            .map(|id| self.handle.is_timeline_playing(id))
            .unwrap_or(false)
    }
}

impl Drop for AnimatedTimeline {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.handle.remove_timeline(id);
        }
    }
}

impl std::fmt::Debug for AnimatedTimeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimatedTimeline")
            .field("playing", &self.is_playing())
            .finish()
    }
}

// ============================================================================
// Frame Callback Guard
// ============================================================================

/// A frame callback registered for the guard's lifetime
pub struct FrameCallbackGuard {
    handle: SchedulerHandle,
    id: Option<FrameCallbackId>,
}

impl FrameCallbackGuard {
    pub fn new<F>(handle: SchedulerHandle, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = handle.register_frame_callback(callback);
        Self { handle, id }
    }

    /// Schedule the callback for the next frame
    pub fn request(&self) {
        if let Some(id) = self.id {
            self.handle.request_frame_callback(id);
        }
    }

    /// Registry id, for requesting the callback from another closure
    pub fn id(&self) -> Option<FrameCallbackId> {
        self.id
    }

    pub fn is_pending(&self) -> bool {
        self.id
            .map(|id| self.handle.is_frame_callback_pending(id))
            .unwrap_or(false)
    }

    /// Whether the callback is attached to a live scheduler
    pub fn is_attached(&self) -> bool {
        self.id.is_some() && self.handle.is_alive()
    }
}

impl Drop for FrameCallbackGuard {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.handle.remove_frame_callback(id);
        }
    }
}

impl std::fmt::Debug for FrameCallbackGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameCallbackGuard")
            .field("pending", &self.is_pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;
    use crate::keyframe::Repeat;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DT: f32 = 1.0 / 60.0;

    fn run(scheduler: &AnimationScheduler) -> usize {
        let mut frames = 0;
        while scheduler.tick_with_dt(DT) {
            frames += 1;
            assert!(frames < 10_000, "animation never settled");
        }
        frames
    }

    #[test]
    fn test_lazy_spring_registration() {
        let scheduler = AnimationScheduler::new();
        let mut value = AnimatedValue::new(scheduler.handle(), 1.0, SpringConfig::smooth());
        assert_eq!(scheduler.spring_count(), 0);

        value.set_target(1.0);
        assert_eq!(scheduler.spring_count(), 0);

        value.set_target(2.0);
        assert_eq!(scheduler.spring_count(), 1);
        assert!(scheduler.has_active_animations());

        run(&scheduler);
        assert_eq!(value.get(), 2.0);
        assert!(!value.is_animating());
        // Settled springs stay registered until the value drops.
        assert_eq!(scheduler.spring_count(), 1);

        drop(value);
        assert_eq!(scheduler.spring_count(), 0);
    }

    #[test]
    fn test_wake_fires_once_per_activation() {
        let scheduler = AnimationScheduler::new();
        let wakes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&wakes);
        scheduler.set_wake_callback(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let mut a = AnimatedValue::new(scheduler.handle(), 0.0, SpringConfig::responsive());
        let mut b = AnimatedValue::new(scheduler.handle(), 0.0, SpringConfig::responsive());
        a.set_target(1.0);
        b.set_target(1.0);
        a.set_target(2.0);
        assert_eq!(wakes.load(Ordering::SeqCst), 1);

        // Retargeting mid-animation does not wake again.
        scheduler.tick_with_dt(DT);
        b.set_target(3.0);
        assert_eq!(wakes.load(Ordering::SeqCst), 1);

        run(&scheduler);
        assert!(!scheduler.is_frame_requested());

        a.set_target(0.0);
        assert_eq!(wakes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_idle_scheduler_reports_inactive() {
        let scheduler = AnimationScheduler::new();
        let _value = AnimatedValue::new(scheduler.handle(), 0.0, SpringConfig::smooth());
        assert!(!scheduler.tick_with_dt(DT));
        assert!(!scheduler.is_frame_requested());
    }

    #[test]
    fn test_frame_callbacks_coalesce() {
        let scheduler = AnimationScheduler::new();
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let guard = FrameCallbackGuard::new(scheduler.handle(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        guard.request();
        guard.request();
        guard.request();
        assert!(guard.is_pending());
        assert!(scheduler.is_frame_requested());

        scheduler.tick_with_dt(DT);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(!guard.is_pending());

        scheduler.tick_with_dt(DT);
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        drop(guard);
        assert_eq!(scheduler.callback_count(), 0);
    }

    #[test]
    fn test_frame_callback_may_retarget_springs() {
        let scheduler = AnimationScheduler::new();
        let handle = scheduler.handle();
        let spring = handle
            .register_spring(SpringState::new(SpringConfig::smooth(), 0.0))
            .unwrap();
        let cb_handle = handle.clone();
        let guard = FrameCallbackGuard::new(handle.clone(), move || {
            cb_handle.set_spring_target(spring, 5.0);
        });

        guard.request();
        assert!(scheduler.tick_with_dt(DT));
        assert!(handle.spring_value(spring).unwrap() > 0.0);
    }

    #[test]
    fn test_keyframe_loop_stays_active() {
        let scheduler = AnimationScheduler::new();
        let anim = KeyframeAnimation::from_values(1000, &[0.0, 1.0], Easing::Linear)
            .repeat(Repeat::Infinite);
        let keyframe = AnimatedKeyframe::started(scheduler.handle(), anim);

        for _ in 0..300 {
            assert!(scheduler.tick_with_dt(DT));
        }
        assert!(keyframe.is_playing());
        assert!((0.0..=1.0).contains(&keyframe.get()));

        drop(keyframe);
        assert_eq!(scheduler.keyframe_count(), 0);
        assert!(!scheduler.tick_with_dt(DT));
    }

    #[test]
    fn test_timeline_entries_advance() {
        let scheduler = AnimationScheduler::new();
        let mut timeline = Timeline::new();
        let entry = timeline.add(0, 100, 0.0, 1.0, Easing::Linear);
        let mut animated = AnimatedTimeline::new(scheduler.handle(), timeline);
        animated.start();

        scheduler.tick_with_dt(0.05);
        assert!((animated.value(entry).unwrap() - 0.5).abs() < 1e-3);
        run(&scheduler);
        assert_eq!(animated.value(entry), Some(1.0));

        drop(animated);
        assert_eq!(scheduler.timeline_count(), 0);
    }

    #[test]
    fn test_handle_outlives_scheduler() {
        let scheduler = AnimationScheduler::new();
        let mut value = AnimatedValue::new(scheduler.handle(), 0.0, SpringConfig::smooth());
        drop(scheduler);

        value.set_target(4.0);
        assert_eq!(value.get(), 4.0);
        assert!(!value.is_animating());
    }

    #[test]
    fn test_set_immediate_unregisters() {
        let scheduler = AnimationScheduler::new();
        let mut value = AnimatedValue::new(scheduler.handle(), 0.0, SpringConfig::smooth());
        value.set_target(10.0);
        scheduler.tick_with_dt(DT);
        value.set_immediate(3.0);
        assert_eq!(value.get(), 3.0);
        assert_eq!(scheduler.spring_count(), 0);
    }
}
