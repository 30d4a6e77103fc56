//! Shared context handed to every effect
//!
//! An [`EffectContext`] bundles what effects read from their host: the frame
//! scheduler handle, the reduced-motion policy, the viewport size, the mount
//! signal for server-rendered pages, and the effect defaults. It is cheap to clone and never keeps the host alive.
//!
//! [`EffectRuntime`] is the host side of the same bundle for headless hosts
//! and tests: it owns the scheduler, the policy, and the viewport.

use std::sync::Arc;

use flair_animation::{AnimationScheduler, SchedulerHandle};
use flair_core::{Observable, ObservableReader, Size};

use crate::config::EffectsConfig;
use crate::motion_policy::{MediaQuerySource, MotionPolicy, ReducedMotionPolicy, StaticMediaQuery};
use crate::ssr::MountSignal;

/// Everything an effect needs from its host
#[derive(Clone, Debug)]
pub struct EffectContext {
    scheduler: SchedulerHandle,
    motion: MotionPolicy,
    viewport: ObservableReader<Size>,
    mount: MountSignal,
    config: Arc<EffectsConfig>,
}

impl EffectContext {
    pub fn new(
        scheduler: SchedulerHandle,
        motion: MotionPolicy,
        viewport: ObservableReader<Size>,
    ) -> Self {
        Self {
            scheduler,
            motion,
            viewport,
            mount: MountSignal::client(),
            config: Arc::new(EffectsConfig::default()),
        }
    }

    /// Context for a non-interactive render
    ///
    /// No scheduler is attached and the mount is never confirmed, so every
    /// effect renders its fallback.
    pub fn server() -> Self {
        Self::new(
            SchedulerHandle::detached(),
            MotionPolicy::fixed(false),
            Observable::new(Size::ZERO).reader(),
        )
        .with_mount(MountSignal::new())
    }

    /// Use `mount` to decide when effects built from this context go live
    pub fn with_mount(mut self, mount: MountSignal) -> Self {
        self.mount = mount;
        self
    }

    pub fn with_config(mut self, config: EffectsConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    pub fn scheduler(&self) -> &SchedulerHandle {
        &self.scheduler
    }

    pub fn motion(&self) -> &MotionPolicy {
        &self.motion
    }

    pub fn viewport(&self) -> &ObservableReader<Size> {
        &self.viewport
    }

    pub fn config(&self) -> &EffectsConfig {
        &self.config
    }

    pub fn mount(&self) -> &MountSignal {
        &self.mount
    }

    /// Whether motion is suppressed right now for an instance with `disable_animation`
    pub fn reduced_motion(&self, disable_animation: Option<bool>) -> bool {
        self.motion.is_reduced(disable_animation)
    }
}

/// Host-side owner of a scheduler, a motion policy, a viewport and the
/// page's mount signal
pub struct EffectRuntime {
    scheduler: AnimationScheduler,
    policy: ReducedMotionPolicy,
    viewport: Observable<Size>,
    mount: MountSignal,
    config: EffectsConfig,
}

impl EffectRuntime {
    /// Runtime for a client-only host; effects are live from the first render
    pub fn new(media_query: &dyn MediaQuerySource, viewport: Size) -> Self {
        Self {
            scheduler: AnimationScheduler::new(),
            policy: ReducedMotionPolicy::from_source(media_query),
            viewport: Observable::new(viewport),
            mount: MountSignal::client(),
            config: EffectsConfig::default(),
        }
    }

    /// Runtime for a page hydrating a server render
    ///
    /// Effects render their fallbacks until [`confirm_mount`](Self::confirm_mount)
    /// has been called and their first render is done.
    pub fn hydrating(media_query: &dyn MediaQuerySource, viewport: Size) -> Self {
        Self {
            mount: MountSignal::new(),
            ..Self::new(media_query, viewport)
        }
    }

    /// Runtime with motion enabled and a fixed media query
    pub fn headless(viewport: Size) -> Self {
        Self::new(&StaticMediaQuery(Some(false)), viewport)
    }

    pub fn with_config(mut self, config: EffectsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn context(&self) -> EffectContext {
        EffectContext::new(
            self.scheduler.handle(),
            self.policy.policy(),
            self.viewport.reader(),
        )
        .with_mount(self.mount.clone())
        .with_config(self.config.clone())
    }

    /// Report that the first client render has been committed
    pub fn confirm_mount(&self) {
        self.mount.confirm();
    }

    pub fn mount(&self) -> &MountSignal {
        &self.mount
    }

    pub fn scheduler(&self) -> &AnimationScheduler {
        &self.scheduler
    }

    pub fn policy(&self) -> &ReducedMotionPolicy {
        &self.policy
    }

    /// Report a viewport resize
    pub fn set_viewport(&self, size: Size) {
        if self.viewport.set(size) {
            tracing::debug!(width = size.width, height = size.height, "viewport resized");
        }
    }

    pub fn viewport(&self) -> Size {
        self.viewport.get()
    }

    /// Advance every animation by `dt` seconds
    pub fn tick_with_dt(&self, dt: f32) -> bool {
        self.scheduler.tick_with_dt(dt)
    }

    /// Tick at `dt` until nothing is active or `max_frames` have run
    ///
    /// Returns the number of frames ticked.
    pub fn run_until_idle(&self, dt: f32, max_frames: usize) -> usize {
        let mut frames = 0;
        while frames < max_frames {
            frames += 1;
            if !self.scheduler.tick_with_dt(dt) {
                break;
            }
        }
        frames
    }
}

impl std::fmt::Debug for EffectRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectRuntime")
            .field("scheduler", &self.scheduler)
            .field("policy", &self.policy)
            .field("viewport", &self.viewport.get())
            .field("mount", &self.mount)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion_policy::ManualMediaQuery;

    #[test]
    fn test_context_follows_runtime_policy() {
        let query = ManualMediaQuery::new(Some(false));
        let runtime = EffectRuntime::new(&query, Size::new(800.0, 600.0));
        let ctx = runtime.context();
        assert!(!ctx.reduced_motion(None));
        query.set(Some(true));
        assert!(ctx.reduced_motion(None));
        assert!(!ctx.reduced_motion(Some(false)));
    }

    #[test]
    fn test_server_context_is_detached() {
        let ctx = EffectContext::server();
        assert!(!ctx.scheduler().is_alive());
        assert_eq!(ctx.viewport().get(), Size::ZERO);
        assert!(ctx.mount().is_hydrating());
        assert!(!ctx.mount().is_confirmed());
    }

    #[test]
    fn test_hydrating_runtime_shares_its_mount() {
        let runtime = EffectRuntime::hydrating(&StaticMediaQuery(None), Size::new(800.0, 600.0));
        let ctx = runtime.context();
        assert!(ctx.mount().is_hydrating());
        runtime.confirm_mount();
        assert!(ctx.mount().is_confirmed());
        assert!(!EffectRuntime::headless(Size::ZERO).mount().is_hydrating());
    }

    #[test]
    fn test_viewport_updates_reach_context() {
        let runtime = EffectRuntime::headless(Size::new(800.0, 600.0));
        let ctx = runtime.context();
        runtime.set_viewport(Size::new(400.0, 300.0));
        assert_eq!(ctx.viewport().get().height, 300.0);
    }
}
