//! Two-phase value resolution for server-rendered pages
//!
//! A server render and the first client render must produce identical
//! output, or the page visibly jumps during hydration. [`SsrValue`] makes that
//! ordering explicit: the first render always yields the declared fallback,
//! and the live value only takes over once the host has confirmed the
//! component is mounted on an interactive client.

use std::sync::atomic::{AtomicBool, Ordering};

use flair_core::{Observable, ObservableReader};

/// Which value an [`SsrValue`] is currently producing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Fallback,
    Live,
}

/// Mount confirmation for one component or page
///
/// A hydrating signal starts unconfirmed; the host calls
/// [`MountSignal::confirm`] after the first render has been committed on an
/// interactive client. Servers never confirm. A client-only signal has no
/// server render to match and is live from the start.
#[derive(Clone)]
pub struct MountSignal {
    mounted: Observable<bool>,
    hydrating: bool,
}

impl MountSignal {
    /// Signal for a page that was rendered on the server
    pub fn new() -> Self {
        Self {
            mounted: Observable::new(false),
            hydrating: true,
        }
    }

    /// Signal for a client-only host
    pub fn client() -> Self {
        Self {
            mounted: Observable::new(true),
            hydrating: false,
        }
    }

    pub fn confirm(&self) {
        if self.mounted.set(true) {
            tracing::debug!("component mount confirmed");
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.mounted.get()
    }

    /// Whether the first render must match a server render
    pub fn is_hydrating(&self) -> bool {
        self.hydrating
    }

    pub fn reader(&self) -> ObservableReader<bool> {
        self.mounted.reader()
    }
}

impl Default for MountSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MountSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountSignal")
            .field("confirmed", &self.mounted.get())
            .field("hydrating", &self.hydrating)
            .finish()
    }
}

/// Render-phase tracker for one component
///
/// Components that produce several values per render share one gate: the
/// call that produces the whole frame records the render with
/// [`begin_render`](Self::begin_render), and per-value getters only read
/// [`phase`](Self::phase).
#[derive(Debug)]
pub struct SsrGate {
    mounted: ObservableReader<bool>,
    hydrating: bool,
    rendered: AtomicBool,
}

impl SsrGate {
    pub fn new(mount: &MountSignal) -> Self {
        Self {
            mounted: mount.reader(),
            hydrating: mount.is_hydrating(),
            rendered: AtomicBool::new(false),
        }
    }

    /// Phase the next render will use
    pub fn phase(&self) -> Phase {
        let first_done = !self.hydrating || self.rendered.load(Ordering::Acquire);
        if first_done && self.mounted.get() {
            Phase::Live
        } else {
            Phase::Fallback
        }
    }

    /// Record one render and return the phase it uses
    pub fn begin_render(&self) -> Phase {
        let phase = self.phase();
        self.rendered.store(true, Ordering::Release);
        phase
    }

    pub fn is_live(&self) -> bool {
        self.phase() == Phase::Live
    }
}

/// A value that renders its fallback until the component is live
///
/// ```
/// use flair_effects::ssr::{MountSignal, SsrValue};
///
/// let mount = MountSignal::new();
/// let value = SsrValue::new(0.0_f32, &mount);
///
/// mount.confirm();
/// // The first render is always the fallback.
/// assert_eq!(value.render(|| 42.0), 0.0);
/// assert_eq!(value.render(|| 42.0), 42.0);
/// ```
#[derive(Debug)]
pub struct SsrValue<T> {
    fallback: T,
    gate: SsrGate,
}

impl<T: Clone> SsrValue<T> {
    /// `fallback` must be computed without any client-only input
    pub fn new(fallback: T, mount: &MountSignal) -> Self {
        Self {
            fallback,
            gate: SsrGate::new(mount),
        }
    }

    /// Produce the value for this render
    ///
    /// `live` is only evaluated in the live phase.
    pub fn render(&self, live: impl FnOnce() -> T) -> T {
        match self.gate.begin_render() {
            Phase::Fallback => self.fallback.clone(),
            Phase::Live => live(),
        }
    }

    /// Phase the next render will use
    pub fn phase(&self) -> Phase {
        self.gate.phase()
    }

    /// Record a render that paints something other than `T`
    pub fn begin_render(&self) -> Phase {
        self.gate.begin_render()
    }

    pub fn fallback(&self) -> &T {
        &self.fallback
    }
}
