//! The note table: which physical key plays which pitch.
//!
//! One equal-tempered octave from C4 to C5 (A4 = 440 Hz), laid out on the
//! home row the way virtual-piano apps usually do it: naturals on
//! `a s d f g h j k`, accidentals on `w e t y u` above them. The table is
//! fixed at compile time; key identifiers are unique.

/// One entry in the note table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    /// Normalized key identifier (lowercase ASCII).
    pub key: char,
    /// Pitch name, e.g. "C#4".
    pub name: &'static str,
    /// Frequency in Hz. Always positive.
    pub frequency: f32,
}

impl Note {
    /// True for sharps (the black keys on a piano).
    pub fn is_accidental(&self) -> bool {
        self.name.contains('#')
    }
}

const fn note(key: char, name: &'static str, frequency: f32) -> Note {
    Note {
        key,
        name,
        frequency,
    }
}

/// All supported keys, in ascending pitch order.
pub const NOTE_TABLE: [Note; 13] = [
    note('a', "C4", 261.63),
    note('w', "C#4", 277.18),
    note('s', "D4", 293.66),
    note('e', "D#4", 311.13),
    note('d', "E4", 329.63),
    note('f', "F4", 349.23),
    note('t', "F#4", 369.99),
    note('g', "G4", 392.00),
    note('y', "G#4", 415.30),
    note('h', "A4", 440.00),
    note('u', "A#4", 466.16),
    note('j', "B4", 493.88),
    note('k', "C5", 523.25),
];

/// Number of playable keys.
pub const NOTE_COUNT: usize = NOTE_TABLE.len();

/// Look up the frequency for a key identifier.
///
/// Returns `None` for keys outside the table; callers treat that as a
/// silent no-op rather than an error.
pub fn frequency(key: char) -> Option<f32> {
    NOTE_TABLE
        .iter()
        .find(|n| n.key == key)
        .map(|n| n.frequency)
}

/// Position of a key in the table (ascending pitch order), if supported.
///
/// Used to index fixed-size per-key state like the UI highlight bitmask.
pub fn index_of(key: char) -> Option<usize> {
    NOTE_TABLE.iter().position(|n| n.key == key)
}
