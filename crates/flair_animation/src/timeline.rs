//! Timeline orchestration for staggered entries

use slotmap::{new_key_type, SlotMap};

use crate::easing::Easing;
use crate::keyframe::Repeat;

new_key_type! {
    pub struct TimelineEntryId;
}

/// An entry in a timeline
#[derive(Clone, Debug)]
struct TimelineEntry {
    /// Offset in milliseconds from timeline start
    offset_ms: u32,
    duration_ms: u32,
    start_value: f32,
    end_value: f32,
    easing: Easing,
}

/// A timeline that runs several start/end tweens against one clock
#[derive(Clone, Debug)]
pub struct Timeline {
    entries: SlotMap<TimelineEntryId, TimelineEntry>,
    current_time: f32,
    duration_ms: u32,
    playing: bool,
    repeat: Repeat,
    current_loop: u32,
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
            current_time: 0.0,
            duration_ms: 0,
            playing: false,
            repeat: Repeat::Once,
            current_loop: 0,
        }
    }

    /// Add a tween starting `offset_ms` after the timeline starts
    pub fn add(
        &mut self,
        offset_ms: u32,
        duration_ms: u32,
        start_value: f32,
        end_value: f32,
        easing: Easing,
    ) -> TimelineEntryId {
        let id = self.entries.insert(TimelineEntry {
            offset_ms,
            duration_ms,
            start_value,
            end_value,
            easing,
        });
        self.duration_ms = self.duration_ms.max(offset_ms + duration_ms);
        id
    }

    pub fn start(&mut self) {
        self.current_time = 0.0;
        self.current_loop = 0;
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn set_repeat(&mut self, repeat: Repeat) {
        self.repeat = repeat;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Jump to the end of the last loop
    pub fn finish(&mut self) {
        self.current_time = self.duration_ms as f32;
        self.playing = false;
    }

    /// Advance the timeline
    pub fn tick(&mut self, dt_ms: f32) {
        if !self.playing || !(dt_ms > 0.0) {
            return;
        }

        self.current_time += dt_ms;

        if self.current_time >= self.duration_ms as f32 {
            let more = match self.repeat {
                Repeat::Once => false,
                Repeat::Count(n) => self.current_loop + 1 < n.max(1),
                Repeat::Infinite => self.duration_ms > 0,
            };
            if more {
                self.current_time -= self.duration_ms as f32;
                self.current_loop += 1;
            } else {
                self.finish();
            }
        }
    }

    /// Get the current value for an entry
    pub fn value(&self, id: TimelineEntryId) -> Option<f32> {
        let entry = self.entries.get(id)?;
        let t = self.entry_progress(entry);
        Some(entry.start_value + (entry.end_value - entry.start_value) * entry.easing.apply(t))
    }

    /// Linear progress of an entry (0.0 before its offset, 1.0 after its end)
    pub fn progress(&self, id: TimelineEntryId) -> Option<f32> {
        self.entries.get(id).map(|e| self.entry_progress(e))
    }

    fn entry_progress(&self, entry: &TimelineEntry) -> f32 {
        let local_time = self.current_time - entry.offset_ms as f32;
        if local_time <= 0.0 {
            return if entry.duration_ms == 0 && self.current_time > 0.0 {
                1.0
            } else {
                0.0
            };
        }
        if local_time >= entry.duration_ms as f32 {
            return 1.0;
        }
        local_time / entry.duration_ms as f32
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}
