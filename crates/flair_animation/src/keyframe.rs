//! Keyframe animations
//!
//! Single-value keyframe tracks with delay, repeat, and alternate playback.
//! All timing is driven by [`KeyframeAnimation::tick`], so playback is fully
//! deterministic for a given sequence of frame deltas.

use crate::easing::Easing;

/// A single keyframe
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframe {
    /// Time position (0.0 to 1.0)
    pub time: f32,
    /// Value at this keyframe
    pub value: f32,
    /// Easing used when transitioning TO this keyframe
    pub easing: Easing,
}

impl Keyframe {
    pub fn new(time: f32, value: f32, easing: Easing) -> Self {
        Self {
            time,
            value,
            easing,
        }
    }
}

/// How many times an animation plays
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Repeat {
    #[default]
    Once,
    /// Total number of iterations (0 behaves like 1)
    Count(u32),
    Infinite,
}

impl Repeat {
    fn iterations(&self) -> Option<u32> {
        match *self {
            Repeat::Once => Some(1),
            Repeat::Count(n) => Some(n.max(1)),
            Repeat::Infinite => None,
        }
    }
}

/// A keyframe-based animation of one value
#[derive(Clone, Debug)]
pub struct KeyframeAnimation {
    duration_ms: f32,
    keyframes: Vec<Keyframe>,
    delay_ms: f32,
    repeat: Repeat,
    repeat_delay_ms: f32,
    alternate: bool,
    /// Time since start, delay included
    elapsed_ms: f32,
    started: bool,
    playing: bool,
}

impl KeyframeAnimation {
    pub fn new(duration_ms: u32, mut keyframes: Vec<Keyframe>) -> Self {
        keyframes.sort_by(|a, b| {
            a.time
                .partial_cmp(&b.time)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Self {
            duration_ms: duration_ms as f32,
            keyframes,
            delay_ms: 0.0,
            repeat: Repeat::Once,
            repeat_delay_ms: 0.0,
            alternate: false,
            elapsed_ms: 0.0,
            started: false,
            playing: false,
        }
    }

    /// Keyframes spread evenly over `values`, all with the same easing
    ///
    /// `[0, 1, 0]` produces keyframes at 0.0, 0.5 and 1.0.
    pub fn from_values(duration_ms: u32, values: &[f32], easing: Easing) -> Self {
        let last = values.len().saturating_sub(1).max(1) as f32;
        let keyframes = values
            .iter()
            .enumerate()
            .map(|(i, v)| Keyframe::new(i as f32 / last, *v, easing))
            .collect();
        Self::new(duration_ms, keyframes)
    }

    /// Delay before the first iteration
    pub fn delay(mut self, delay_ms: u32) -> Self {
        self.delay_ms = delay_ms as f32;
        self
    }

    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    /// Pause between iterations, holding the end value
    pub fn repeat_delay(mut self, delay_ms: u32) -> Self {
        self.repeat_delay_ms = delay_ms as f32;
        self
    }

    /// Play every other iteration backwards
    pub fn alternate(mut self, alternate: bool) -> Self {
        self.alternate = alternate;
        self
    }

    pub fn start(&mut self) {
        self.elapsed_ms = 0.0;
        self.started = true;
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn duration_ms(&self) -> f32 {
        self.duration_ms
    }

    /// Advance the animation by delta time (in milliseconds)
    pub fn tick(&mut self, dt_ms: f32) {
        if !self.playing || !(dt_ms > 0.0) {
            return;
        }
        self.elapsed_ms += dt_ms;

        if let Some(total) = self.total_ms() {
            if self.elapsed_ms >= total {
                self.elapsed_ms = total;
                self.playing = false;
            }
        }
    }

    /// Total running time including delays, `None` for infinite animations
    pub fn total_ms(&self) -> Option<f32> {
        let n = self.repeat.iterations()? as f32;
        Some(self.delay_ms + n * self.duration_ms + (n - 1.0) * self.repeat_delay_ms)
    }

    /// Progress of the current iteration (0.0 to 1.0), direction applied
    pub fn progress(&self) -> f32 {
        if !self.started {
            return 0.0;
        }
        let local = self.elapsed_ms - self.delay_ms;
        if local <= 0.0 {
            return 0.0;
        }
        if self.duration_ms <= 0.0 {
            return self.directed(1.0, self.last_iteration());
        }

        let cycle_len = self.duration_ms + self.repeat_delay_ms;
        let mut iteration = (local / cycle_len).floor() as u32;
        let mut within = local - iteration as f32 * cycle_len;

        if let Some(n) = self.repeat.iterations() {
            if iteration >= n {
                iteration = n - 1;
                within = self.duration_ms;
            }
        }

        let raw = (within / self.duration_ms).min(1.0);
        self.directed(raw, iteration)
    }

    /// Current interpolated value
    pub fn value(&self) -> f32 {
        self.sample(self.progress())
    }

    /// Value the animation rests on once every iteration has played
    pub fn final_value(&self) -> f32 {
        self.sample(self.directed(1.0, self.last_iteration()))
    }

    /// Sample the track at a specific progress (0.0 to 1.0)
    pub fn sample(&self, progress: f32) -> f32 {
        let Some(first) = self.keyframes.first() else {
            return 0.0;
        };
        let progress = progress.clamp(0.0, 1.0);

        let mut prev = first;
        let mut next = first;
        for kf in &self.keyframes {
            if kf.time <= progress {
                prev = kf;
            }
            if kf.time >= progress {
                next = kf;
                break;
            }
        }

        if (next.time - prev.time).abs() < f32::EPSILON {
            return prev.value;
        }

        let local = (progress - prev.time) / (next.time - prev.time);
        prev.value + (next.value - prev.value) * next.easing.apply(local)
    }

    fn last_iteration(&self) -> u32 {
        self.repeat.iterations().map(|n| n - 1).unwrap_or(0)
    }

    fn directed(&self, raw: f32, iteration: u32) -> f32 {
        if self.alternate && iteration % 2 == 1 {
            1.0 - raw
        } else {
            raw
        }
    }
}
