pub mod dsp;
pub mod engine; // Voice registry and note triggering
pub mod input; // Key normalization and auto-repeat suppression
pub mod notes; // Key-to-frequency table

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
