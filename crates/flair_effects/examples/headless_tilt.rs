//! Headless Tilt Demo
//!
//! Drives a tilt card and a magnetic button through a scripted pointer path
//! on a headless runtime and logs the style each effect produces per frame.
//!
//! Features demonstrated:
//! - Building effects from `EffectConfig` via `InteractiveEffect`
//! - Loading effect defaults from a TOML file
//! - Ticking the shared scheduler until it goes idle
//!
//! Run with: cargo run -p flair_effects --example headless_tilt [config.toml]
//! Set `RUST_LOG=flair_effects=debug` to see lifecycle events.

use std::sync::Arc;

use anyhow::{Context, Result};
use flair_core::{Rect, Size};
use flair_effects::prelude::*;
use tracing_subscriber::EnvFilter;

const FRAME: f32 = 1.0 / 60.0;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => EffectsConfig::load(&path).with_context(|| format!("loading {path}"))?,
        None => EffectsConfig::default(),
    };

    let runtime = EffectRuntime::headless(Size::new(1280.0, 800.0)).with_config(config);
    let ctx = runtime.context();

    let card = Arc::new(ElementRef::with_bounds(Rect::new(100.0, 100.0, 200.0, 200.0)));
    let button = Arc::new(ElementRef::with_bounds(Rect::new(400.0, 100.0, 120.0, 48.0)));
    let mut tilt = InteractiveEffect::new(&ctx, card, &EffectConfig::new("tilt"));
    let mut magnetic = InteractiveEffect::new(&ctx, button, &EffectConfig::new("magnetic"));

    // Sweep diagonally across the card, then over the button.
    for step in 0..=10 {
        let t = step as f32 / 10.0;
        tilt.on_pointer_move(PointerEvent::at(100.0 + 200.0 * t, 100.0 + 200.0 * t));
        magnetic.on_pointer_move(PointerEvent::at(400.0 + 120.0 * t, 124.0));
        for _ in 0..6 {
            runtime.tick_with_dt(FRAME);
        }
        let s = tilt.style();
        let m = magnetic.style();
        tracing::info!(
            step,
            rotate_x = s.rotate_x,
            rotate_y = s.rotate_y,
            scale = s.scale,
            pull_x = m.translate_x,
            "frame"
        );
    }

    tilt.on_pointer_leave();
    magnetic.on_pointer_leave();
    let frames = runtime.run_until_idle(FRAME, 600);
    tracing::info!(frames, identity = tilt.style().is_identity(), "settled after leave");

    Ok(())
}
