use crate::dsp::oscillator::Waveform;
use crate::engine::message::{EngineMessage, MessageReceiver};
use crate::engine::voice::{Voice, VoiceState};
use crate::notes;

/// Fixed voice pool size: every key held plus every key fading at once.
///
/// The pool can only be exceeded by re-pressing keys faster than the 100 ms
/// release fade; in that case the oldest fading voice is stolen, which is
/// inaudible (it was the quietest thing playing).
const VOICE_POOL: usize = 2 * notes::NOTE_COUNT;

/// The tone engine: owns the voice registry and renders the mix.
///
/// The registry invariant — at most one held voice per key — is enforced
/// here: a note-on for an already-held key is a no-op (no envelope
/// retrigger), as is a note-on for a key outside the note table and a
/// note-off for a key that is not sounding.
///
/// Note-off is logically synchronous: the key stops reading as pressed the
/// moment the request is handled, even though the release fade keeps the
/// voice audible for another 100 ms. The fade runs to completion without
/// touching registry state again.
pub struct ToneEngine {
    voices: Vec<Voice>,
    waveform: Waveform,
    frame_counter: u64,
}

impl ToneEngine {
    pub fn new(sample_rate: f32) -> Self {
        let voices = (0..VOICE_POOL).map(|_| Voice::new(sample_rate)).collect();

        Self {
            voices,
            waveform: Waveform::default(),
            frame_counter: 0,
        }
    }

    /// Start sounding a key. Unknown and already-held keys are no-ops.
    ///
    /// The waveform is read here, at trigger time: changing the selector
    /// affects the next note, never notes already sounding.
    pub fn note_on(&mut self, key: char) {
        let Some(frequency) = notes::frequency(key) else {
            return;
        };
        if self.find_held(key).is_some() {
            return;
        }

        let waveform = self.waveform;
        let started_at = self.frame_counter;
        if let Some(voice) = self.allocate_voice() {
            voice.start(key, waveform, frequency, started_at);
        }
    }

    /// Release a key. A key that is not held is a no-op.
    ///
    /// The registry entry is gone when this returns; the audible decay is
    /// the released voice finishing its fade on subsequent blocks.
    pub fn note_off(&mut self, key: char) {
        if let Some(voice) = self.find_held(key) {
            voice.release();
        }
    }

    /// Release every held key (panic button / shutdown path).
    pub fn all_notes_off(&mut self) {
        for voice in &mut self.voices {
            voice.release();
        }
    }

    /// Select the waveform used for subsequent note-ons.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Apply all pending control messages.
    pub fn process_messages(&mut self, rx: &mut impl MessageReceiver) {
        while let Some(msg) = rx.pop() {
            match msg {
                EngineMessage::NoteOn { key } => self.note_on(key),
                EngineMessage::NoteOff { key } => self.note_off(key),
                EngineMessage::SetWaveform(waveform) => self.set_waveform(waveform),
                EngineMessage::AllNotesOff => self.all_notes_off(),
            }
        }
    }

    /// Mix every live voice into `out` (overwrites the buffer).
    pub fn render_block(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        for voice in &mut self.voices {
            voice.render(out);
        }
        self.frame_counter += out.len() as u64;
    }

    /// True if the key is currently held (drives the visual highlight).
    ///
    /// Reads false immediately after note-off, while the fade is still
    /// audible.
    pub fn is_pressed(&self, key: char) -> bool {
        self.voices.iter().any(|v| v.is_held() && v.key() == key)
    }

    /// Envelope level of the held voice for a key, 0.0 if not held.
    pub fn key_level(&self, key: char) -> f32 {
        self.voices
            .iter()
            .find(|v| v.is_held() && v.key() == key)
            .map(|v| v.level())
            .unwrap_or(0.0)
    }

    /// Generator frequency for a held key, if any.
    pub fn key_frequency(&self, key: char) -> Option<f32> {
        self.voices
            .iter()
            .find(|v| v.is_held() && v.key() == key)
            .map(|v| v.frequency())
    }

    /// Generator waveform for a held key, if any. Stays at whatever the
    /// selector held at note-on time.
    pub fn key_waveform(&self, key: char) -> Option<Waveform> {
        self.voices
            .iter()
            .find(|v| v.is_held() && v.key() == key)
            .map(|v| v.waveform())
    }

    /// Number of registry entries (held voices only).
    pub fn held_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_held()).count()
    }

    /// Number of voices producing sound, fading ones included.
    pub fn sounding_count(&self) -> usize {
        self.voices.iter().filter(|v| !v.is_free()).count()
    }

    fn find_held(&mut self, key: char) -> Option<&mut Voice> {
        self.voices
            .iter_mut()
            .find(|v| v.is_held() && v.key() == key)
    }

    fn allocate_voice(&mut self) -> Option<&mut Voice> {
        if let Some(idx) = self.voices.iter().position(|v| v.is_free()) {
            return Some(&mut self.voices[idx]);
        }

        // Pool exhausted: steal the oldest fading voice.
        let steal_idx = self
            .voices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.state() == VoiceState::Releasing)
            .min_by_key(|(_, v)| v.started_at())
            .map(|(idx, _)| idx);

        steal_idx.map(|idx| &mut self.voices[idx])
    }
}
