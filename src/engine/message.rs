use crate::dsp::oscillator::Waveform;

#[cfg(feature = "rtrb")]
use rtrb::Consumer;

/// Control messages sent from the input thread to the tone engine.
///
/// `key` is a normalized key identifier (lowercase ASCII); unsupported keys
/// are silently ignored by the engine.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum EngineMessage {
    NoteOn { key: char },
    NoteOff { key: char },
    SetWaveform(Waveform),
    AllNotesOff,
}

/// Source of pending engine messages, drained at the top of each block.
pub trait MessageReceiver {
    fn pop(&mut self) -> Option<EngineMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<EngineMessage> {
    fn pop(&mut self) -> Option<EngineMessage> {
        Consumer::pop(self).ok()
    }
}

/// In-process receiver for tests and offline use.
impl MessageReceiver for std::collections::VecDeque<EngineMessage> {
    fn pop(&mut self) -> Option<EngineMessage> {
        self.pop_front()
    }
}
