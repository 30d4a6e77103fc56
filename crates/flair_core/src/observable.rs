//! Observable values with explicit subscriptions
//!
//! An [`Observable<T>`] holds one value plus a list of change subscribers.
//! The owner keeps the `Observable` (the only type with `set`) and hands out
//! read-only [`ObservableReader`] views, so readers can observe but never
//! write. Subscribing returns a [`Subscription`] that unsubscribes on drop.
//!
//! # Example
//!
//! ```rust
//! use flair_core::observable::Observable;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let flag = Observable::new(false);
//! let reader = flag.reader();
//!
//! let hits = Arc::new(AtomicUsize::new(0));
//! let hits_clone = hits.clone();
//! let sub = reader.subscribe(move |_| {
//!     hits_clone.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! flag.set(true);
//! assert!(reader.get());
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//!
//! drop(sub);
//! flag.set(false);
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//! ```

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct ObservableInner<T> {
    value: RwLock<T>,
    subscribers: RwLock<FxHashMap<u64, Callback<T>>>,
    next_id: AtomicU64,
    version: AtomicU64,
}

/// Writable observable value
///
/// Cloning an `Observable` shares the same underlying value; every clone can
/// write. Hand [`ObservableReader`]s to code that must only read.
pub struct Observable<T> {
    inner: Arc<ObservableInner<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Observable<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(ObservableInner {
                value: RwLock::new(initial),
                subscribers: RwLock::new(FxHashMap::default()),
                next_id: AtomicU64::new(1),
                version: AtomicU64::new(0),
            }),
        }
    }

    /// Current value
    pub fn get(&self) -> T {
        self.inner.value.read().clone()
    }

    /// Replace the value, notifying subscribers if it changed
    ///
    /// Returns `true` if the value changed.
    pub fn set(&self, value: T) -> bool {
        {
            let mut current = self.inner.value.write();
            if *current == value {
                return false;
            }
            *current = value.clone();
        }
        self.inner.version.fetch_add(1, Ordering::AcqRel);
        notify(&self.inner, &value);
        true
    }

    /// Read-only view of this observable
    pub fn reader(&self) -> ObservableReader<T> {
        ObservableReader {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Subscribe to changes (see [`ObservableReader::subscribe`])
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        subscribe(&self.inner, callback)
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.read().len()
    }
}

/// Read-only view of an [`Observable`]
pub struct ObservableReader<T> {
    inner: Arc<ObservableInner<T>>,
}

impl<T> Clone for ObservableReader<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> ObservableReader<T> {
    /// Current value
    pub fn get(&self) -> T {
        self.inner.value.read().clone()
    }

    /// Number of changes written so far
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::Acquire)
    }

    /// Subscribe to changes
    ///
    /// The callback runs after every change, with the new value. It is not
    /// called for the current value at subscription time.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        subscribe(&self.inner, callback)
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Observable")
            .field(&*self.inner.value.read())
            .finish()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ObservableReader<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ObservableReader")
            .field(&*self.inner.value.read())
            .finish()
    }
}

fn subscribe<T, F>(inner: &Arc<ObservableInner<T>>, callback: F) -> Subscription
where
    T: Send + Sync + 'static,
    F: Fn(&T) + Send + Sync + 'static,
{
    let id = inner.next_id.fetch_add(1, Ordering::Relaxed);
    inner.subscribers.write().insert(id, Arc::new(callback));

    let weak: Weak<ObservableInner<T>> = Arc::downgrade(inner);
    Subscription {
        unsubscribe: Some(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.subscribers.write().remove(&id);
            }
        })),
    }
}

fn notify<T>(inner: &ObservableInner<T>, value: &T) {
    // Snapshot so callbacks may subscribe or unsubscribe without deadlocking
    let callbacks: Vec<Callback<T>> = inner.subscribers.read().values().cloned().collect();
    for callback in callbacks {
        callback(value);
    }
}

/// Handle for a live subscription; unsubscribes when dropped
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// A subscription that is not attached to anything
    pub fn detached() -> Self {
        Self { unsubscribe: None }
    }

    /// Unsubscribe now (same as dropping)
    pub fn cancel(mut self) {
        if let Some(f) = self.unsubscribe.take() {
            f();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(f) = self.unsubscribe.take() {
            f();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_set_notifies_only_on_change() {
        let obs = Observable::new(1i32);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let _sub = obs.subscribe(move |v| seen_clone.lock().push(*v));

        assert!(obs.set(2));
        assert!(!obs.set(2));
        assert!(obs.set(3));

        assert_eq!(*seen.lock(), vec![2, 3]);
        assert_eq!(obs.reader().version(), 2);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let obs = Observable::new(0u8);
        let sub = obs.reader().subscribe(|_| {});
        assert_eq!(obs.subscriber_count(), 1);
        drop(sub);
        assert_eq!(obs.subscriber_count(), 0);
    }

    #[test]
    fn test_subscription_outlives_observable() {
        let sub = {
            let obs = Observable::new(0u8);
            obs.subscribe(|_| {})
        };
        // Observable is gone; dropping the handle must be a no-op
        drop(sub);
    }

    #[test]
    fn test_callback_may_unsubscribe_others() {
        let obs = Observable::new(0i32);
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        *slot.lock() = Some(obs.subscribe(|_| {}));

        let slot_clone = slot.clone();
        let _sub = obs.subscribe(move |_| {
            slot_clone.lock().take();
        });

        obs.set(1);
        assert_eq!(obs.subscriber_count(), 1);
    }
}
