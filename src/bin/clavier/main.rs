//! clavier - virtual musical keyboard for the terminal
//!
//! Run with: cargo run
//!
//! Home row plays one octave (C4..C5): naturals on `a s d f g h j k`,
//! sharps on `w e t y u`. Keys 1-4 pick the waveform, Esc quits. On-screen
//! keys respond to the mouse as well.

mod app;
mod ui;

use app::Clavier;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    Clavier::new().run()
}
