//! Low-level DSP primitives behind the tone engine.
//!
//! These components are allocation-free and realtime-safe, so the engine can
//! embed them directly inside voice structs and run them in the audio
//! callback. They stay focused on the per-sample math; voice lifecycle and
//! registry bookkeeping live in the `engine` module.

/// Attack/hold/release gain envelope.
pub mod envelope;
/// Phase-accumulator oscillator with selectable waveform.
pub mod oscillator;

pub use envelope::{Envelope, EnvelopeStage};
pub use oscillator::{Oscillator, Waveform};
