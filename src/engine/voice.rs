use crate::dsp::envelope::Envelope;
use crate::dsp::oscillator::{Oscillator, Waveform};

/// Lifecycle of a pooled voice.
///
/// `Held` voices are the visible entries of the voice registry: exactly one
/// per currently-pressed key. A note-off moves the voice to `Releasing`,
/// which is logically *outside* the registry — the key reads as inactive
/// immediately — while the release fade finishes in the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    /// Available for allocation.
    Free,
    /// Key is down; oscillator sounding at full envelope level.
    Held,
    /// Key released; fading out, then back to `Free`.
    Releasing,
}

/// One sounding note: a tone generator paired with its gain envelope.
pub struct Voice {
    key: char,
    state: VoiceState,
    osc: Oscillator,
    env: Envelope,
    sample_rate: f32,
    /// Frame counter value at note-on. Used to pick the oldest fading
    /// voice when the pool is exhausted.
    started_at: u64,
}

impl Voice {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            key: '\0',
            state: VoiceState::Free,
            osc: Oscillator::new(Waveform::Sine, 440.0),
            env: Envelope::new(),
            sample_rate,
            started_at: 0,
        }
    }

    /// Claim this voice for a key and trigger its attack.
    pub fn start(&mut self, key: char, waveform: Waveform, frequency: f32, started_at: u64) {
        self.key = key;
        self.state = VoiceState::Held;
        self.osc = Oscillator::new(waveform, frequency);
        self.started_at = started_at;
        self.env.note_on();
    }

    /// Begin the release fade. The key is considered released immediately;
    /// the audible decay plays out over the next `render` calls.
    pub fn release(&mut self) {
        if self.state == VoiceState::Held {
            self.state = VoiceState::Releasing;
            self.env.note_off(self.sample_rate);
        }
    }

    /// Mix this voice into the output block, freeing it once the release
    /// fade has finished.
    pub fn render(&mut self, out: &mut [f32]) {
        if self.state == VoiceState::Free {
            return;
        }

        for sample in out.iter_mut() {
            let gain = self.env.next_level(self.sample_rate);
            *sample += self.osc.next_sample(self.sample_rate) * gain;
        }

        if self.state == VoiceState::Releasing && !self.env.is_active() {
            self.free();
        }
    }

    pub fn free(&mut self) {
        self.state = VoiceState::Free;
        self.key = '\0';
    }

    pub fn is_free(&self) -> bool {
        self.state == VoiceState::Free
    }

    /// True while the key counts as pressed (registry membership).
    pub fn is_held(&self) -> bool {
        self.state == VoiceState::Held
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn key(&self) -> char {
        self.key
    }

    pub fn frequency(&self) -> f32 {
        self.osc.frequency()
    }

    /// Waveform this voice was started with. Fixed for the voice's
    /// lifetime; selector changes only affect later note-ons.
    pub fn waveform(&self) -> Waveform {
        self.osc.waveform()
    }

    /// Current envelope gain, for UI metering.
    pub fn level(&self) -> f32 {
        self.env.level()
    }

    pub fn started_at(&self) -> u64 {
        self.started_at
    }
}
