//! End-to-end properties of the virtual keyboard: the full path from a
//! normalized input event through the tracker, the message queue, and the
//! engine's registry to rendered audio.

use std::collections::VecDeque;

use clavier::dsp::envelope::TARGET_LEVEL;
use clavier::dsp::Waveform;
use clavier::engine::{EngineMessage, ToneEngine};
use clavier::input::KeyTracker;
use clavier::notes;

const SAMPLE_RATE: f32 = 48_000.0;

fn render_ms(engine: &mut ToneEngine, ms: f32) -> Vec<f32> {
    let mut out = vec![0.0f32; (ms / 1000.0 * SAMPLE_RATE) as usize];
    engine.render_block(&mut out);
    out
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()))
}

#[test]
fn held_key_produces_one_voice_at_table_pitch() {
    let mut engine = ToneEngine::new(SAMPLE_RATE);
    let mut tracker = KeyTracker::new();

    // Physical 'A' press with some auto-repeat chatter behind it.
    let mut queue: VecDeque<EngineMessage> = VecDeque::new();
    for _ in 0..5 {
        if let Some(key) = tracker.key_down('A') {
            queue.push_back(EngineMessage::NoteOn { key });
        }
    }
    engine.process_messages(&mut queue);

    assert_eq!(engine.held_count(), 1);
    assert_eq!(engine.key_frequency('a'), Some(261.63));
    assert!(engine.is_pressed('a'));
}

#[test]
fn attack_ramps_to_target_without_a_step() {
    let mut engine = ToneEngine::new(SAMPLE_RATE);
    engine.note_on('h'); // A4, the 440 Hz reference

    // The first millisecond is quiet: the envelope starts from zero.
    let onset = render_ms(&mut engine, 1.0);
    assert!(peak(&onset) < 0.1, "onset clicked: peak {}", peak(&onset));

    // By the end of the 10ms attack the tone sits at the target level.
    render_ms(&mut engine, 9.0);
    let held = render_ms(&mut engine, 20.0);
    assert!(peak(&held) > TARGET_LEVEL * 0.9);
    assert!(peak(&held) <= TARGET_LEVEL + 1e-4);
}

#[test]
fn release_is_logically_immediate_but_audibly_gradual() {
    let mut engine = ToneEngine::new(SAMPLE_RATE);
    engine.note_on('a');
    render_ms(&mut engine, 20.0);

    engine.note_off('a');
    assert!(!engine.is_pressed('a'), "highlight must clear synchronously");
    assert_eq!(engine.held_count(), 0);

    // 0-50 ms after release: fade still audible.
    let early = render_ms(&mut engine, 50.0);
    assert!(peak(&early) > 0.001);

    // Well past the 100 ms window: silence, voice reclaimed.
    render_ms(&mut engine, 100.0);
    let late = render_ms(&mut engine, 20.0);
    assert_eq!(peak(&late), 0.0);
    assert_eq!(engine.sounding_count(), 0);
}

#[test]
fn fade_decreases_monotonically_in_loudness() {
    let mut engine = ToneEngine::new(SAMPLE_RATE);
    engine.note_on('k');
    render_ms(&mut engine, 20.0);
    engine.note_off('k');

    // Compare peak per 10ms slice across the fade.
    let mut prev = f32::INFINITY;
    for _ in 0..10 {
        let slice = render_ms(&mut engine, 10.0);
        let p = peak(&slice);
        assert!(p <= prev + 1e-4, "fade got louder: {p} after {prev}");
        prev = p;
    }
}

#[test]
fn unsupported_key_changes_nothing() {
    let mut engine = ToneEngine::new(SAMPLE_RATE);
    engine.note_on('a');
    render_ms(&mut engine, 20.0);
    let before = engine.held_count();

    engine.note_on('z');
    engine.note_off('z');

    assert_eq!(engine.held_count(), before);
    assert!(engine.is_pressed('a'));
    assert_eq!(engine.key_frequency('z'), None);
}

#[test]
fn stray_note_off_leaves_registry_unchanged() {
    let mut engine = ToneEngine::new(SAMPLE_RATE);
    engine.note_off('a');
    assert_eq!(engine.held_count(), 0);

    engine.note_on('s');
    engine.note_off('d'); // different, never pressed
    assert!(engine.is_pressed('s'));
    assert_eq!(engine.held_count(), 1);
}

#[test]
fn chord_sums_voices_and_releases_independently() {
    let mut engine = ToneEngine::new(SAMPLE_RATE);

    // C major triad: C4 E4 G4.
    for key in ['a', 'd', 'g'] {
        engine.note_on(key);
    }
    render_ms(&mut engine, 20.0);
    let chord_peak = peak(&render_ms(&mut engine, 20.0));
    assert!(chord_peak > TARGET_LEVEL, "three voices should sum");

    engine.note_off('d');
    assert!(engine.is_pressed('a'));
    assert!(engine.is_pressed('g'));
    assert_eq!(engine.held_count(), 2);
}

#[test]
fn waveform_selection_applies_to_the_next_note_only() {
    let mut engine = ToneEngine::new(SAMPLE_RATE);
    let mut queue: VecDeque<EngineMessage> = VecDeque::new();

    queue.push_back(EngineMessage::NoteOn { key: 'a' }); // sine
    queue.push_back(EngineMessage::SetWaveform(Waveform::Square));
    queue.push_back(EngineMessage::NoteOn { key: 'h' }); // square
    engine.process_messages(&mut queue);

    render_ms(&mut engine, 20.0);

    // Each voice keeps the shape the selector held at its note-on: the
    // change applies to 'h' but never retroactively to 'a'.
    assert_eq!(engine.key_waveform('a'), Some(Waveform::Sine));
    assert_eq!(engine.key_waveform('h'), Some(Waveform::Square));
    assert_eq!(engine.waveform(), Waveform::Square);
    assert_eq!(engine.held_count(), 2);
}

#[test]
fn every_table_key_sounds_and_silences() {
    for note in notes::NOTE_TABLE {
        let mut engine = ToneEngine::new(SAMPLE_RATE);
        engine.note_on(note.key);
        render_ms(&mut engine, 15.0);
        let sounding = render_ms(&mut engine, 10.0);
        assert!(
            peak(&sounding) > 0.1,
            "{} ({}) did not sound",
            note.key,
            note.name
        );

        engine.note_off(note.key);
        render_ms(&mut engine, 150.0);
        assert_eq!(engine.sounding_count(), 0, "{} did not silence", note.key);
    }
}
