//! Clavier - audio stream setup and application runner
//!
//! Owns the boundary between the two threads: the cpal callback runs the
//! tone engine, the UI thread runs input and drawing, and three rtrb ring
//! buffers connect them (control messages in, audio tap and state
//! snapshots out).

use std::io::stdout;
use std::time::Duration;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::{execute, terminal};
use rtrb::RingBuffer;

use clavier::engine::{EngineMessage, ToneEngine};
use clavier::MAX_BLOCK_SIZE;

use super::ui::state::{UiStateInit, UiStateUpdate};
use super::ui::UiApp;

/// Control message queue depth. Far more than a human can type per frame.
const MESSAGE_QUEUE_SIZE: usize = 256;

/// Audio tap ring size, sized for a few UI frames of backlog.
const AUDIO_TAP_SIZE: usize = 8192;

/// State snapshot queue depth (one per audio callback, UI keeps the latest).
const STATE_QUEUE_SIZE: usize = 64;

/// How long a note rings in tap mode, when the terminal cannot deliver
/// key-release events.
const TAP_HOLD: Duration = Duration::from_millis(250);

/// Main application: builds the audio stream, then hands off to the UI loop.
pub struct Clavier {
    tap_hold: Duration,
}

impl Clavier {
    pub fn new() -> Self {
        Self { tap_hold: TAP_HOLD }
    }

    /// Run the application (takes over the terminal, plays audio).
    pub fn run(self) -> EyreResult<()> {
        // Audio device setup
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        // Thread plumbing
        let (msg_tx, mut msg_rx) = RingBuffer::<EngineMessage>::new(MESSAGE_QUEUE_SIZE);
        let (mut tap_tx, tap_rx) = RingBuffer::<f32>::new(AUDIO_TAP_SIZE);
        let (mut state_tx, state_rx) = RingBuffer::<UiStateUpdate>::new(STATE_QUEUE_SIZE);

        let mut engine = ToneEngine::new(sample_rate);
        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _| {
                    engine.process_messages(&mut msg_rx);

                    let total_frames = data.len() / channels;
                    let mut frames_written = 0;

                    while frames_written < total_frames {
                        let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                        let block = &mut render_buf[..frames];
                        engine.render_block(block);

                        // Tap for the oscilloscope/spectrum panes; dropped
                        // samples are fine, the UI only shows the latest.
                        for &sample in block.iter() {
                            let _ = tap_tx.push(sample);
                        }

                        // Mono engine output duplicated to all channels.
                        let out_off = frames_written * channels;
                        for (i, &sample) in block.iter().enumerate() {
                            for ch in 0..channels {
                                data[out_off + i * channels + ch] = sample;
                            }
                        }

                        frames_written += frames;
                    }

                    let _ = state_tx.push(UiStateUpdate::capture(&engine));
                },
                |err| eprintln!("audio stream error: {err}"),
                None,
            )
            .wrap_err("failed to build output stream")?;

        stream.play().wrap_err("failed to start output stream")?;

        // Terminal setup. Key-release events need the keyboard enhancement
        // protocol; without it the app falls back to tap mode.
        let release_events = terminal::supports_keyboard_enhancement().unwrap_or(false);

        let mut term = ratatui::init();
        execute!(stdout(), EnableMouseCapture).wrap_err("failed to enable mouse capture")?;
        if release_events {
            execute!(
                stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )
            .wrap_err("failed to enable key-release reporting")?;
        }

        let init = UiStateInit {
            sample_rate,
            release_events,
            tap_hold: self.tap_hold,
        };
        let result = UiApp::new(msg_tx, tap_rx, state_rx, init).run(&mut term);

        // Teardown in reverse order; keep going even if one step fails.
        if release_events {
            let _ = execute!(stdout(), PopKeyboardEnhancementFlags);
        }
        let _ = execute!(stdout(), DisableMouseCapture);
        ratatui::restore();

        result
    }
}

impl Default for Clavier {
    fn default() -> Self {
        Self::new()
    }
}
