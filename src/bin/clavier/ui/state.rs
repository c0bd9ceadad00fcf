//! Shared state types for UI communication
//!
//! Designed for real-time safety: the static half is built once on the UI
//! thread, the dynamic snapshot is Copy and allocation-free so the audio
//! callback can publish one per block.

use std::time::Duration;

use clavier::dsp::Waveform;
use clavier::engine::ToneEngine;
use clavier::notes::{NOTE_COUNT, NOTE_TABLE};

/// Static configuration known before the UI starts.
#[derive(Clone, Copy)]
pub struct UiStateInit {
    /// Audio sample rate in Hz.
    pub sample_rate: f32,
    /// Whether the terminal delivers key-release events.
    pub release_events: bool,
    /// Hold window used in tap mode (no release events).
    pub tap_hold: Duration,
}

/// Snapshot of engine state, published by the audio callback.
#[derive(Clone, Copy, Debug)]
pub struct UiStateUpdate {
    /// Pressed-key bitmask, bit i = `NOTE_TABLE[i]`. Cleared the moment a
    /// key is released, while its fade is still audible.
    pub pressed: u16,
    /// Envelope level per held key (0.0 when not held).
    pub levels: [f32; NOTE_COUNT],
    /// Waveform currently selected for new notes.
    pub waveform: Waveform,
    /// Voices producing sound, release fades included.
    pub sounding: u8,
}

impl UiStateUpdate {
    pub fn capture(engine: &ToneEngine) -> Self {
        let mut pressed = 0u16;
        let mut levels = [0.0f32; NOTE_COUNT];

        for (i, note) in NOTE_TABLE.iter().enumerate() {
            if engine.is_pressed(note.key) {
                pressed |= 1 << i;
            }
            levels[i] = engine.key_level(note.key);
        }

        Self {
            pressed,
            levels,
            waveform: engine.waveform(),
            sounding: engine.sounding_count().min(u8::MAX as usize) as u8,
        }
    }

    /// Is the note at table index `i` currently pressed?
    pub fn is_pressed(&self, i: usize) -> bool {
        self.pressed & (1 << i) != 0
    }
}

impl Default for UiStateUpdate {
    fn default() -> Self {
        Self {
            pressed: 0,
            levels: [0.0; NOTE_COUNT],
            waveform: Waveform::default(),
            sounding: 0,
        }
    }
}
