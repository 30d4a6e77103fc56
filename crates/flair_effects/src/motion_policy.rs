//! Reduced-motion policy
//!
//! The platform's reduced-motion media query feeds one process-wide
//! [`ReducedMotionPolicy`]. Effects only ever see a [`MotionPolicy`], a
//! read-only view they consult on every output; they never cache it across
//! frames and can never write it. The policy value is written by exactly one
//! place: the subscription handler installed on the media query.
//!
//! Looping animations are held in a [`MotionGate`], which drops them as soon
//! as the preference turns to reduced and rebuilds them when it turns back.

use std::sync::Arc;

use flair_core::{Observable, ObservableReader, Subscription};
use parking_lot::Mutex;

/// Callback invoked with the new match state of a media query
pub type MediaQueryCallback = Box<dyn Fn(Option<bool>) + Send + Sync>;

/// Source of the platform's `prefers-reduced-motion` state
///
/// `None` means the platform cannot answer the query; it is treated as
/// "motion enabled" so the experience is never degraded by a missing
/// capability.
pub trait MediaQuerySource: Send + Sync {
    fn matches(&self) -> Option<bool>;

    /// Notify `callback` whenever the match state changes
    fn subscribe(&self, callback: MediaQueryCallback) -> Subscription;
}

/// A media query whose answer never changes
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticMediaQuery(pub Option<bool>);

impl MediaQuerySource for StaticMediaQuery {
    fn matches(&self) -> Option<bool> {
        self.0
    }

    fn subscribe(&self, _callback: MediaQueryCallback) -> Subscription {
        Subscription::detached()
    }
}

/// A media query the host (or a test) flips by hand
#[derive(Clone)]
pub struct ManualMediaQuery {
    state: Observable<Option<bool>>,
}

impl ManualMediaQuery {
    pub fn new(initial: Option<bool>) -> Self {
        Self {
            state: Observable::new(initial),
        }
    }

    pub fn set(&self, matches: Option<bool>) {
        self.state.set(matches);
    }
}

impl MediaQuerySource for ManualMediaQuery {
    fn matches(&self) -> Option<bool> {
        self.state.get()
    }

    fn subscribe(&self, callback: MediaQueryCallback) -> Subscription {
        self.state.subscribe(move |matches| callback(*matches))
    }
}

impl std::fmt::Debug for ManualMediaQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ManualMediaQuery")
            .field(&self.state.get())
            .finish()
    }
}

/// Owner of the process-wide reduced-motion preference
pub struct ReducedMotionPolicy {
    value: Observable<bool>,
    _source: Subscription,
}

impl ReducedMotionPolicy {
    /// Initialize from a media query and follow its changes
    pub fn from_source(source: &dyn MediaQuerySource) -> Self {
        let initial = source.matches().unwrap_or(false);
        let value = Observable::new(initial);
        let writer = value.clone();
        let subscription = source.subscribe(Box::new(move |matches| {
            let reduced = matches.unwrap_or(false);
            if writer.set(reduced) {
                tracing::debug!(reduced, "reduced-motion preference changed");
            }
        }));
        tracing::debug!(reduced = initial, "reduced-motion policy initialized");
        Self {
            value,
            _source: subscription,
        }
    }

    /// Policy for a non-interactive render where no media query exists
    pub fn server() -> Self {
        Self::from_source(&StaticMediaQuery(None))
    }

    pub fn policy(&self) -> MotionPolicy {
        MotionPolicy {
            reader: self.value.reader(),
        }
    }

    pub fn prefers_reduced_motion(&self) -> bool {
        self.value.get()
    }
}

impl std::fmt::Debug for ReducedMotionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReducedMotionPolicy")
            .field("reduced", &self.value.get())
            .finish()
    }
}

/// Read-only view of the reduced-motion preference
#[derive(Clone)]
pub struct MotionPolicy {
    reader: ObservableReader<bool>,
}

impl MotionPolicy {
    /// A policy pinned to one answer
    pub fn fixed(reduced: bool) -> Self {
        Self {
            reader: Observable::new(reduced).reader(),
        }
    }

    pub fn prefers_reduced_motion(&self) -> bool {
        self.reader.get()
    }

    /// Whether motion is suppressed, honoring a per-instance override
    pub fn is_reduced(&self, disable_animation: Option<bool>) -> bool {
        disable_animation.unwrap_or_else(|| self.reader.get())
    }

    /// Observe preference changes
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.reader.subscribe(move |reduced| callback(*reduced))
    }
}

impl Default for MotionPolicy {
    fn default() -> Self {
        Self::fixed(false)
    }
}

impl std::fmt::Debug for MotionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MotionPolicy")
            .field(&self.reader.get())
            .finish()
    }
}

type Build<T> = Box<dyn Fn() -> Option<T> + Send + Sync>;

struct GateState<T> {
    build: Build<T>,
    live: Option<T>,
}

impl<T> GateState<T> {
    /// Bring the live value in line with `reduced`, returning anything that
    /// should be dropped once the lock is released
    fn apply(&mut self, reduced: bool) -> Option<T> {
        if reduced {
            self.live.take()
        } else {
            if self.live.is_none() {
                self.live = (self.build)();
            }
            None
        }
    }
}

/// Animations that only exist while motion is allowed
///
/// `build` registers the animations (typically endless keyframe loops) and
/// runs whenever motion becomes allowed. When the preference turns to
/// reduced, the built value is dropped, which unregisters it from the
/// scheduler so an idle page really goes idle.
///
/// With a per-instance override the gate never follows the preference.
pub struct MotionGate<T> {
    motion: MotionPolicy,
    disable_animation: Option<bool>,
    state: Arc<Mutex<GateState<T>>>,
    _subscription: Subscription,
}

impl<T: Send + 'static> MotionGate<T> {
    pub fn new<F>(motion: &MotionPolicy, disable_animation: Option<bool>, build: F) -> Self
    where
        F: Fn() -> Option<T> + Send + Sync + 'static,
    {
        let state = Arc::new(Mutex::new(GateState {
            build: Box::new(build),
            live: None,
        }));
        state.lock().apply(motion.is_reduced(disable_animation));

        let subscription = if disable_animation.is_some() {
            Subscription::detached()
        } else {
            let weak = Arc::downgrade(&state);
            motion.subscribe(move |reduced| {
                if let Some(state) = weak.upgrade() {
                    let released = state.lock().apply(reduced);
                    if released.is_some() {
                        tracing::debug!("motion reduced, loops released");
                    }
                }
            })
        };

        Self {
            motion: motion.clone(),
            disable_animation,
            state,
            _subscription: subscription,
        }
    }

    /// Replace what the gate builds, rebuilding now if motion is allowed
    pub fn rebuild<F>(&self, build: F)
    where
        F: Fn() -> Option<T> + Send + Sync + 'static,
    {
        let reduced = self.motion.is_reduced(self.disable_animation);
        let old = {
            let mut state = self.state.lock();
            state.build = Box::new(build);
            let old = state.live.take();
            state.apply(reduced);
            old
        };
        drop(old);
    }

    /// Whether the built animations currently exist
    pub fn is_live(&self) -> bool {
        self.state.lock().live.is_some()
    }

    /// Read the built animations, if motion is allowed
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.state.lock().live.as_ref().map(f)
    }

    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.state.lock().live.as_mut().map(f)
    }
}

impl<T> std::fmt::Debug for MotionGate<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotionGate")
            .field("live", &self.state.lock().live.is_some())
            .field("disable_animation", &self.disable_animation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_unsupported_query_enables_motion() {
        let policy = ReducedMotionPolicy::from_source(&StaticMediaQuery(None));
        assert!(!policy.policy().is_reduced(None));
    }

    #[test]
    fn test_follows_media_query_changes() {
        let query = ManualMediaQuery::new(Some(false));
        let owner = ReducedMotionPolicy::from_source(&query);
        let policy = owner.policy();

        let changes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&changes);
        let _sub = policy.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        query.set(Some(true));
        assert!(policy.prefers_reduced_motion());
        query.set(Some(true));
        query.set(None);
        assert!(!policy.prefers_reduced_motion());
        assert_eq!(changes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_override_takes_precedence() {
        let policy = MotionPolicy::fixed(true);
        assert!(policy.is_reduced(None));
        assert!(!policy.is_reduced(Some(false)));
        assert!(MotionPolicy::fixed(false).is_reduced(Some(true)));
    }

    #[test]
    fn test_dropping_owner_detaches_source() {
        let query = ManualMediaQuery::new(Some(false));
        let owner = ReducedMotionPolicy::from_source(&query);
        let policy = owner.policy();
        drop(owner);
        query.set(Some(true));
        assert!(!policy.prefers_reduced_motion());
    }

    #[test]
    fn test_gate_follows_preference_both_ways() {
        let query = ManualMediaQuery::new(Some(true));
        let owner = ReducedMotionPolicy::from_source(&query);
        let builds = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&builds);
        let gate = MotionGate::new(&owner.policy(), None, move || {
            Some(counter.fetch_add(1, Ordering::SeqCst))
        });
        assert!(!gate.is_live());

        query.set(Some(false));
        assert_eq!(gate.with(|n| *n), Some(0));
        query.set(Some(true));
        assert!(!gate.is_live());
        query.set(Some(false));
        assert_eq!(gate.with(|n| *n), Some(1));
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_gate_with_override_ignores_preference() {
        let query = ManualMediaQuery::new(Some(false));
        let owner = ReducedMotionPolicy::from_source(&query);
        let gate = MotionGate::new(&owner.policy(), Some(true), || Some(()));
        assert!(!gate.is_live());
        query.set(Some(true));
        query.set(Some(false));
        assert!(!gate.is_live());
    }

    #[test]
    fn test_gate_rebuild_replaces_value() {
        let gate = MotionGate::new(&MotionPolicy::fixed(false), None, || Some(1));
        gate.rebuild(|| Some(2));
        assert_eq!(gate.with(|n| *n), Some(2));
        gate.with_mut(|n| *n = 3);
        assert_eq!(gate.with(|n| *n), Some(3));
    }
}
