//! TUI module for clavier
//!
//! Runs the input/drawing loop: translates key and mouse events into
//! engine messages, and visualizes what the audio thread reports back
//! (pressed keys, waveform, scope and spectrum of the output).

pub mod state;

mod keyboard;
mod scope;
mod spectrum;
mod status;

use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};

use clavier::dsp::Waveform;
use clavier::engine::EngineMessage;
use clavier::input::{self, KeyTracker};
use clavier::notes;

use spectrum::SpectrumAnalyzer;
use state::{UiStateInit, UiStateUpdate};
use status::AudioStats;

/// Audio visualization buffer size (scope window and FFT length).
const VIS_BUFFER_SIZE: usize = 1024;

/// Input poll timeout, ~60fps redraw when idle.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// UI application state
pub struct UiApp {
    /// Control messages to the audio thread
    msg_tx: Producer<EngineMessage>,
    /// Audio tap from the audio thread
    audio_rx: Consumer<f32>,
    /// Engine state snapshots from the audio thread
    state_rx: Consumer<UiStateUpdate>,
    init: UiStateInit,
    /// Latest snapshot received
    current: UiStateUpdate,
    /// Physical-key state, filters auto-repeat
    tracker: KeyTracker,
    /// Scheduled note-offs for tap mode (key, deadline)
    pending_taps: Vec<(char, Instant)>,
    /// Key currently held by the mouse, if any
    mouse_key: Option<char>,
    /// Rolling window of tap samples for the scope and FFT
    audio_buffer: Vec<f32>,
    analyzer: SpectrumAnalyzer,
    /// Keyboard widget area from the last draw, for mouse hit-testing
    keyboard_area: Rect,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        msg_tx: Producer<EngineMessage>,
        audio_rx: Consumer<f32>,
        state_rx: Consumer<UiStateUpdate>,
        init: UiStateInit,
    ) -> Self {
        Self {
            msg_tx,
            audio_rx,
            state_rx,
            init,
            current: UiStateUpdate::default(),
            tracker: KeyTracker::new(),
            pending_taps: Vec::new(),
            mouse_key: None,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            analyzer: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, init.sample_rate),
            keyboard_area: Rect::default(),
            should_quit: false,
        }
    }

    /// Run the UI event loop until quit.
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.poll_state();
            self.expire_taps();

            terminal.draw(|frame| self.render(frame))?;

            if event::poll(FRAME_INTERVAL)? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key),
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    // Release events stop arriving when focus is lost;
                    // silence everything instead of droning on.
                    Event::FocusLost => self.release_everything(),
                    _ => {}
                }
            }
        }

        self.send(EngineMessage::AllNotesOff);
        Ok(())
    }

    fn send(&mut self, msg: EngineMessage) {
        // Queue full means the audio thread is gone; nothing useful to do.
        let _ = self.msg_tx.push(msg);
    }

    /// Pull tap samples, keeping the most recent window.
    fn poll_audio(&mut self) {
        let mut fresh = Vec::new();
        while let Ok(sample) = self.audio_rx.pop() {
            fresh.push(sample);
        }

        if !fresh.is_empty() {
            self.audio_buffer.extend(fresh);
            let len = self.audio_buffer.len();
            if len > VIS_BUFFER_SIZE {
                self.audio_buffer.drain(0..len - VIS_BUFFER_SIZE);
            }
        }
    }

    /// Keep only the latest engine snapshot.
    fn poll_state(&mut self) {
        while let Ok(update) = self.state_rx.pop() {
            self.current = update;
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.kind {
            KeyEventKind::Press => match key.code {
                KeyCode::Esc => self.should_quit = true,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.should_quit = true;
                }
                KeyCode::Char(c @ '1'..='4') => {
                    let index = c as usize - '1' as usize;
                    self.send(EngineMessage::SetWaveform(Waveform::ALL[index]));
                }
                KeyCode::Char(c) => self.press_note(c),
                _ => {}
            },
            KeyEventKind::Release => {
                if let KeyCode::Char(c) = key.code {
                    self.release_note(c);
                }
            }
            // The engine suppresses overlap anyway; repeats carry no new
            // transition, so they never reach the queue.
            KeyEventKind::Repeat => {}
        }
    }

    fn press_note(&mut self, raw: char) {
        match self.tracker.key_down(raw) {
            Some(key) => {
                if notes::index_of(key).is_none() {
                    return;
                }
                self.send(EngineMessage::NoteOn { key });
                if !self.init.release_events {
                    self.pending_taps
                        .push((key, Instant::now() + self.init.tap_hold));
                }
            }
            None => {
                // Without release events, repeats show up as plain presses;
                // use them to keep the tap-mode note alive while held.
                if !self.init.release_events {
                    let key = input::normalize(raw);
                    if let Some(slot) = self.pending_taps.iter_mut().find(|(k, _)| *k == key) {
                        slot.1 = Instant::now() + self.init.tap_hold;
                    }
                }
            }
        }
    }

    fn release_note(&mut self, raw: char) {
        if let Some(key) = self.tracker.key_up(raw) {
            self.pending_taps.retain(|(k, _)| *k != key);
            if notes::index_of(key).is_some() {
                self.send(EngineMessage::NoteOff { key });
            }
        }
    }

    /// Fire the scheduled note-offs whose hold window has elapsed.
    fn expire_taps(&mut self) {
        let now = Instant::now();
        let mut i = 0;
        while i < self.pending_taps.len() {
            if self.pending_taps[i].1 <= now {
                let (key, _) = self.pending_taps.swap_remove(i);
                self.tracker.key_up(key);
                self.send(EngineMessage::NoteOff { key });
            } else {
                i += 1;
            }
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(key) = keyboard::key_at(self.keyboard_area, mouse.column, mouse.row) {
                    self.send(EngineMessage::NoteOn { key });
                    self.mouse_key = Some(key);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                // Leaving the key stops the note, like a pointer-leave.
                if let Some(held) = self.mouse_key {
                    let over = keyboard::key_at(self.keyboard_area, mouse.column, mouse.row);
                    if over != Some(held) {
                        self.send(EngineMessage::NoteOff { key: held });
                        self.mouse_key = None;
                    }
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(key) = self.mouse_key.take() {
                    self.send(EngineMessage::NoteOff { key });
                }
            }
            _ => {}
        }
    }

    fn release_everything(&mut self) {
        self.pending_taps.clear();
        for key in self.tracker.release_all() {
            if notes::index_of(key).is_some() {
                self.send(EngineMessage::NoteOff { key });
            }
        }
        if let Some(key) = self.mouse_key.take() {
            self.send(EngineMessage::NoteOff { key });
        }
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status bar
                Constraint::Min(8),    // Keyboard
                Constraint::Length(8), // Scope
                Constraint::Length(8), // Spectrum
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        let stats = AudioStats::from_buffer(&self.audio_buffer);
        status::render_status(frame, chunks[0], &self.init, &self.current, &stats);

        self.keyboard_area = chunks[1];
        keyboard::render_keyboard(frame, chunks[1], &self.current);

        scope::render_scope(frame, chunks[2], &self.audio_buffer, self.init.sample_rate);

        self.analyzer.update(&self.audio_buffer);
        spectrum::render_spectrum(frame, chunks[3], self.analyzer.data());

        let help = Paragraph::new(" [A-K] naturals  [W E T Y U] sharps  [1-4] waveform  [Esc] quit")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[4]);
    }
}
