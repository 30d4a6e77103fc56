//! Typewriter reveal
//!
//! Types words character by character, optionally cycling through several
//! words: type, hold, delete, next. Time is a single keyframe clock running
//! from 0 to the total script length, so the visible text is a pure function
//! of elapsed time. A separate loop drives the blinking cursor.
//!
//! Both loops live in a [`MotionGate`]: reducing motion drops them and shows
//! the first word, and allowing motion again types the script from the top.

use flair_animation::{AnimatedKeyframe, Easing, KeyframeAnimation, Repeat};
use serde::{Deserialize, Serialize};

use crate::context::EffectContext;
use crate::motion_policy::MotionGate;
use crate::ssr::{Phase, SsrGate};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypewriterConfig {
    /// Time per typed character
    pub char_ms: u32,
    /// Time per deleted character
    pub delete_ms: u32,
    /// Pause with the full word shown before deleting
    pub hold_ms: u32,
    /// Pause before the first character
    pub delay_ms: u32,
    /// Half period of the cursor blink
    pub cursor_blink_ms: u32,
    /// Start over after the last word instead of stopping on it
    pub loop_words: bool,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            char_ms: 70,
            delete_ms: 40,
            hold_ms: 1500,
            delay_ms: 0,
            cursor_blink_ms: 530,
            loop_words: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Stage {
    Typing,
    Holding,
    Deleting,
}

#[derive(Clone, Copy, Debug)]
struct Segment {
    word: usize,
    stage: Stage,
    start_ms: f32,
    len_ms: f32,
}

/// What the typewriter shows at one instant
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypewriterState {
    pub word_index: usize,
    pub revealed: usize,
}

struct Reel {
    clock: AnimatedKeyframe,
    cursor: AnimatedKeyframe,
}

pub struct TypewriterEffect {
    words: Vec<String>,
    script: Vec<Segment>,
    config: TypewriterConfig,
    reel: MotionGate<Reel>,
    ssr: SsrGate,
}

impl TypewriterEffect {
    pub fn new<I, S>(
        ctx: &EffectContext,
        words: I,
        config: TypewriterConfig,
        disable_animation: Option<bool>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words.into_iter().map(Into::into).collect();
        let script = build_script(&words, &config);
        let total_ms = script.last().map(|s| s.start_ms + s.len_ms).unwrap_or(0.0);
        let scheduler = ctx.scheduler().clone();
        let reel = MotionGate::new(ctx.motion(), disable_animation, move || {
            if total_ms <= 0.0 {
                return None;
            }
            let clock = KeyframeAnimation::from_values(
                total_ms.ceil() as u32,
                &[0.0, total_ms],
                Easing::Linear,
            )
            .delay(config.delay_ms)
            .repeat(if config.loop_words {
                Repeat::Infinite
            } else {
                Repeat::Once
            });
            let blink = KeyframeAnimation::from_values(
                config.cursor_blink_ms.max(1),
                &[1.0, 0.0],
                Easing::Linear,
            )
            .repeat(Repeat::Infinite)
            .alternate(true);
            Some(Reel {
                clock: AnimatedKeyframe::started(scheduler.clone(), clock),
                cursor: AnimatedKeyframe::started(scheduler.clone(), blink),
            })
        });

        tracing::debug!(words = words.len(), total_ms, "typewriter mounted");
        Self {
            words,
            script,
            config,
            reel,
            ssr: SsrGate::new(ctx.mount()),
        }
    }

    /// Which word is showing and how many of its characters
    pub fn state(&self) -> TypewriterState {
        self.state_in(self.ssr.phase())
    }

    fn state_in(&self, phase: Phase) -> TypewriterState {
        let elapsed = match phase {
            Phase::Fallback => None,
            Phase::Live => self.reel.with(|reel| reel.clock.get()),
        };
        match elapsed {
            Some(t) => state_at(&self.script, &self.words, t),
            None => self.fallback_state(),
        }
    }

    /// The fully typed first word; used before mount and under reduced motion
    pub fn fallback_state(&self) -> TypewriterState {
        TypewriterState {
            word_index: 0,
            revealed: self.words.first().map(|w| w.chars().count()).unwrap_or(0),
        }
    }

    /// Visible text for this render
    pub fn text(&self) -> String {
        let state = self.state_in(self.ssr.begin_render());
        self.words
            .get(state.word_index)
            .map(|w| w.chars().take(state.revealed).collect())
            .unwrap_or_default()
    }

    /// Text rendered before the component is live
    pub fn fallback_text(&self) -> String {
        self.words.first().cloned().unwrap_or_default()
    }

    /// Cursor opacity: 1.0 or 0.0, solid when motion is reduced
    pub fn cursor_opacity(&self) -> f32 {
        if self.ssr.phase() == Phase::Fallback {
            return 1.0;
        }
        match self.reel.with(|reel| reel.cursor.get()) {
            Some(v) if v < 0.5 => 0.0,
            _ => 1.0,
        }
    }

    /// Whether a non-looping script has typed its last word
    pub fn is_complete(&self) -> bool {
        self.reel
            .with(|reel| !self.config.loop_words && !reel.clock.is_playing())
            .unwrap_or(true)
    }

    /// Whether the typing and cursor loops are registered
    pub fn is_animating(&self) -> bool {
        self.reel.is_live()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }
}

fn build_script(words: &[String], config: &TypewriterConfig) -> Vec<Segment> {
    let mut script = Vec::new();
    let mut t = 0.0;
    let last = words.len().saturating_sub(1);
    for (i, word) in words.iter().enumerate() {
        let len = word.chars().count() as f32;
        let mut push = |stage, len_ms: f32| {
            if len_ms > 0.0 {
                script.push(Segment {
                    word: i,
                    stage,
                    start_ms: t,
                    len_ms,
                });
                t += len_ms;
            }
        };
        push(Stage::Typing, len * config.char_ms as f32);
        // The last word stays on screen unless the script loops.
        if i < last || config.loop_words {
            push(Stage::Holding, config.hold_ms as f32);
            push(Stage::Deleting, len * config.delete_ms as f32);
        }
    }
    script
}

fn state_at(script: &[Segment], words: &[String], t: f32) -> TypewriterState {
    let Some(segment) = script
        .iter()
        .find(|s| t < s.start_ms + s.len_ms)
        .or(script.last())
    else {
        return TypewriterState {
            word_index: 0,
            revealed: 0,
        };
    };
    let len = words
        .get(segment.word)
        .map(|w| w.chars().count())
        .unwrap_or(0);
    let local = (t - segment.start_ms).clamp(0.0, segment.len_ms);
    let per_char = segment.len_ms / len.max(1) as f32;

    let revealed = match segment.stage {
        Stage::Typing if local >= segment.len_ms => len,
        Stage::Typing => (local / per_char).floor() as usize,
        Stage::Holding => len,
        Stage::Deleting if local >= segment.len_ms => 0,
        Stage::Deleting => len - ((local / per_char).floor() as usize).min(len),
    };
    TypewriterState {
        word_index: segment.word,
        revealed: revealed.min(len),
    }
}

impl std::fmt::Debug for TypewriterEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypewriterEffect")
            .field("text", &self.text())
            .field("cursor", &self.cursor_opacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EffectRuntime;
    use crate::motion_policy::{ManualMediaQuery, StaticMediaQuery};
    use flair_core::Size;

    fn runtime() -> EffectRuntime {
        EffectRuntime::headless(Size::new(800.0, 600.0))
    }

    fn advance(runtime: &EffectRuntime, ms: u32) {
        // 10ms steps keep frame boundaries exact.
        for _ in 0..ms / 10 {
            runtime.tick_with_dt(0.01);
        }
    }

    #[test]
    fn test_types_single_word() {
        let runtime = runtime();
        let config = TypewriterConfig {
            char_ms: 100,
            ..Default::default()
        };
        let tw = TypewriterEffect::new(&runtime.context(), ["Rust"], config, None);
        assert_eq!(tw.text(), "");

        advance(&runtime, 250);
        assert_eq!(tw.text(), "Ru");

        advance(&runtime, 500);
        assert_eq!(tw.text(), "Rust");
        assert!(tw.is_complete());
    }

    #[test]
    fn test_cycles_words() {
        let runtime = runtime();
        let config = TypewriterConfig {
            char_ms: 100,
            delete_ms: 50,
            hold_ms: 200,
            ..Default::default()
        };
        let tw = TypewriterEffect::new(&runtime.context(), ["ab", "xyz"], config, None);

        advance(&runtime, 250);
        assert_eq!(tw.text(), "ab");
        // Deleting starts at 400ms, one char every 50ms.
        advance(&runtime, 200);
        assert_eq!(tw.text(), "a");
        advance(&runtime, 100);
        assert_eq!(tw.state().word_index, 1);
        advance(&runtime, 500);
        assert_eq!(tw.text(), "xyz");
        assert!(tw.is_complete());
    }

    #[test]
    fn test_delay_before_typing() {
        let runtime = runtime();
        let config = TypewriterConfig {
            char_ms: 100,
            delay_ms: 300,
            ..Default::default()
        };
        let tw = TypewriterEffect::new(&runtime.context(), ["go"], config, None);
        advance(&runtime, 350);
        assert_eq!(tw.text(), "");
        advance(&runtime, 100);
        assert_eq!(tw.text(), "g");
    }

    #[test]
    fn test_cursor_blinks() {
        let runtime = runtime();
        let config = TypewriterConfig {
            cursor_blink_ms: 100,
            ..Default::default()
        };
        let tw = TypewriterEffect::new(&runtime.context(), ["hi"], config, None);
        assert_eq!(tw.cursor_opacity(), 1.0);
        advance(&runtime, 70);
        assert_eq!(tw.cursor_opacity(), 0.0);
        advance(&runtime, 100);
        assert_eq!(tw.cursor_opacity(), 1.0);
    }

    #[test]
    fn test_reduced_motion_shows_full_word() {
        let runtime = runtime();
        let tw = TypewriterEffect::new(
            &runtime.context(),
            ["Hello", "World"],
            TypewriterConfig::default(),
            Some(true),
        );
        assert_eq!(tw.text(), "Hello");
        assert_eq!(tw.cursor_opacity(), 1.0);
        assert_eq!(runtime.scheduler().keyframe_count(), 0);
    }

    #[test]
    fn test_multibyte_characters() {
        let runtime = runtime();
        let config = TypewriterConfig {
            char_ms: 100,
            ..Default::default()
        };
        let tw = TypewriterEffect::new(&runtime.context(), ["héllo"], config, None);
        advance(&runtime, 250);
        assert_eq!(tw.text(), "hé");
    }

    #[test]
    fn test_empty_words() {
        let runtime = runtime();
        let tw = TypewriterEffect::new(
            &runtime.context(),
            Vec::<String>::new(),
            TypewriterConfig::default(),
            None,
        );
        assert_eq!(tw.text(), "");
        assert!(tw.is_complete());
    }

    #[test]
    fn test_follows_live_preference_changes() {
        let query = ManualMediaQuery::new(Some(false));
        let runtime = EffectRuntime::new(&query, Size::new(800.0, 600.0));
        let config = TypewriterConfig {
            char_ms: 100,
            ..Default::default()
        };
        let tw = TypewriterEffect::new(&runtime.context(), ["Rust"], config, None);
        advance(&runtime, 250);
        assert_eq!(tw.text(), "Ru");

        query.set(Some(true));
        assert_eq!(runtime.scheduler().keyframe_count(), 0);
        assert!(!runtime.tick_with_dt(0.01));
        assert_eq!(tw.text(), "Rust");
        assert_eq!(tw.cursor_opacity(), 1.0);
        assert!(!tw.is_animating());

        // Typing restarts from the first character.
        query.set(Some(false));
        assert_eq!(runtime.scheduler().keyframe_count(), 2);
        assert_eq!(tw.text(), "");
        advance(&runtime, 150);
        assert_eq!(tw.text(), "R");
        assert!(tw.is_animating());
    }

    #[test]
    fn test_unconfirmed_mount_shows_first_word() {
        let runtime = EffectRuntime::hydrating(&StaticMediaQuery(Some(false)), Size::new(800.0, 600.0));
        let config = TypewriterConfig {
            char_ms: 100,
            ..Default::default()
        };
        let tw = TypewriterEffect::new(&runtime.context(), ["Rust", "Go"], config, None);
        advance(&runtime, 250);
        assert_eq!(tw.text(), "Rust");
        assert_eq!(tw.text(), tw.fallback_text());

        runtime.confirm_mount();
        assert_eq!(tw.text(), "Ru");
    }
}
