//! Note triggering and voice lifecycle.
//!
//! This layer sits above the DSP primitives: it owns the voice registry,
//! turns note-on/note-off requests into voice state transitions, and mixes
//! every live voice into the output block. All mutation happens on the
//! audio thread; other threads talk to it through `EngineMessage`.

pub mod message;
pub mod tone;
pub mod voice;

pub use message::{EngineMessage, MessageReceiver};
pub use tone::ToneEngine;
pub use voice::{Voice, VoiceState};
