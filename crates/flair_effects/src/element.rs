//! Visual element handles
//!
//! Effects never own the elements they decorate. They hold an
//! `Arc<dyn Element>`, re-measure it whenever they need geometry, and keep a
//! [`ListenerGuard`] for every listener they attach so unmounting an effect
//! always detaches it.

use std::sync::Arc;

use flair_core::Rect;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

/// Platform notification an effect can listen for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    PointerEnter,
    PointerMove,
    PointerLeave,
    Scroll,
    Resize,
}

/// Options passed when attaching a listener
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListenerOptions {
    /// A passive listener never blocks the platform's own scrolling
    pub passive: bool,
}

impl ListenerOptions {
    pub const PASSIVE: ListenerOptions = ListenerOptions { passive: true };
}

/// Identifier of an attached listener, unique per element
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// A measurable host element
///
/// `bounds` returns `None` until the element has been laid out. Implementors
/// must keep `bounds` a cheap read of the last layout, never a forced reflow.
pub trait Element: Send + Sync {
    fn bounds(&self) -> Option<Rect>;

    fn add_listener(&self, kind: ListenerKind, options: ListenerOptions) -> ListenerId;

    fn remove_listener(&self, id: ListenerId);
}

/// Keeps a listener attached until dropped
pub struct ListenerGuard {
    element: Arc<dyn Element>,
    id: ListenerId,
}

impl ListenerGuard {
    /// Attach a passive listener
    pub fn passive(element: &Arc<dyn Element>, kind: ListenerKind) -> Self {
        let id = element.add_listener(kind, ListenerOptions::PASSIVE);
        Self {
            element: Arc::clone(element),
            id,
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.element.remove_listener(self.id);
    }
}

impl std::fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ListenerGuard").field(&self.id).finish()
    }
}

/// Attach one passive listener per kind
pub(crate) fn listen_all(element: &Arc<dyn Element>, kinds: &[ListenerKind]) -> Vec<ListenerGuard> {
    kinds
        .iter()
        .map(|kind| ListenerGuard::passive(element, *kind))
        .collect()
}

#[derive(Default)]
struct ElementState {
    bounds: Option<Rect>,
    listeners: FxHashMap<u64, (ListenerKind, ListenerOptions)>,
    next_id: u64,
}

/// In-process element with settable bounds
///
/// Used by headless hosts and tests. Bounds are in viewport coordinates, the
/// same space pointer events are delivered in.
#[derive(Default)]
pub struct ElementRef {
    state: Mutex<ElementState>,
}

impl ElementRef {
    /// An element that has not been laid out yet
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bounds(bounds: Rect) -> Self {
        let element = Self::new();
        element.set_bounds(Some(bounds));
        element
    }

    pub fn set_bounds(&self, bounds: Option<Rect>) {
        self.state.lock().bounds = bounds;
    }

    /// Number of listeners currently attached
    pub fn listener_count(&self) -> usize {
        self.state.lock().listeners.len()
    }

    /// Number of attached listeners of one kind
    pub fn listeners_of(&self, kind: ListenerKind) -> usize {
        self.state
            .lock()
            .listeners
            .values()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    /// Whether every attached listener is passive
    pub fn all_passive(&self) -> bool {
        self.state.lock().listeners.values().all(|(_, o)| o.passive)
    }
}

impl Element for ElementRef {
    fn bounds(&self) -> Option<Rect> {
        self.state.lock().bounds
    }

    fn add_listener(&self, kind: ListenerKind, options: ListenerOptions) -> ListenerId {
        let mut state = self.state.lock();
        state.next_id += 1;
        let id = state.next_id;
        state.listeners.insert(id, (kind, options));
        ListenerId(id)
    }

    fn remove_listener(&self, id: ListenerId) {
        self.state.lock().listeners.remove(&id.0);
    }
}

impl std::fmt::Debug for ElementRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ElementRef")
            .field("bounds", &state.bounds)
            .field("listeners", &state.listeners.len())
            .finish()
    }
}
