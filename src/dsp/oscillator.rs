use std::f32::consts::TAU;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Tone Generation
===============

A phase accumulator holds the oscillator's position within one cycle as a
value in [0, 1). Each sample it advances by frequency / sample_rate and
wraps; the waveform function maps the phase to an output sample:

  Sine:      sin(2π · phase)        pure tone, fundamental only
  Square:    +1 for the first half-cycle, -1 for the second
  Sawtooth:  2 · phase - 1          rises -1 → +1, then snaps back
  Triangle:  1 - 4 · |phase - ½|    linear up-down ramp

Phase accumulation (rather than computing sin(2π f t) from absolute time)
keeps the output continuous if the frequency ever changes mid-note, and
avoids precision loss as t grows.

Square and saw are used unfiltered and will alias above a few kHz; for a
one-octave keyboard topping out at C5 the aliasing products sit far enough
down that band-limiting is not worth the complexity.
*/

/// Waveform shape, selectable at note-on time.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform {
    /// All shapes, in selector order.
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Sawtooth,
        Waveform::Triangle,
    ];
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
        };
        f.write_str(name)
    }
}

/// A single tone generator: one waveform at one fixed frequency.
pub struct Oscillator {
    waveform: Waveform,
    frequency: f32,
    phase: f32,
}

impl Oscillator {
    /// Create an oscillator starting at phase zero.
    pub fn new(waveform: Waveform, frequency: f32) -> Self {
        Self {
            waveform,
            frequency,
            phase: 0.0,
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Produce the next sample and advance the phase.
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        let out = match self.waveform {
            Waveform::Sine => (TAU * self.phase).sin(),
            Waveform::Square => {
                if self.phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * self.phase - 1.0,
            Waveform::Triangle => 1.0 - 4.0 * (self.phase - 0.5).abs(),
        };

        self.phase += self.frequency / sample_rate;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        out
    }

    /// Fill a buffer with oscillator output.
    pub fn render(&mut self, out: &mut [f32], sample_rate: f32) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(sample_rate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    #[test]
    fn sine_matches_closed_form() {
        let freq = 440.0;
        let mut osc = Oscillator::new(Waveform::Sine, freq);

        let mut buffer = vec![0.0f32; 128];
        osc.render(&mut buffer, SAMPLE_RATE);

        // sample n should be sin(2π f n / sr)
        for n in [0usize, 1, 12, 100] {
            let expected = (TAU * freq * n as f32 / SAMPLE_RATE).sin();
            assert!(
                (buffer[n] - expected).abs() < 1e-4,
                "sample {n}: expected {expected}, got {}",
                buffer[n]
            );
        }
    }

    #[test]
    fn square_holds_both_rails() {
        let mut osc = Oscillator::new(Waveform::Square, 100.0);
        let mut buffer = vec![0.0f32; 480]; // one full cycle at 48kHz

        osc.render(&mut buffer, SAMPLE_RATE);

        // The half-cycle boundary lands on sample 240 up to accumulated
        // float error, so that one sample may sit on either rail.
        assert!(buffer.iter().take(239).all(|&s| s == 1.0));
        assert!(buffer[240].abs() == 1.0);
        assert!(buffer.iter().skip(241).all(|&s| s == -1.0));
    }

    #[test]
    fn output_stays_in_range() {
        for waveform in Waveform::ALL {
            let mut osc = Oscillator::new(waveform, 523.25);
            let mut buffer = vec![0.0f32; 4096];
            osc.render(&mut buffer, SAMPLE_RATE);

            assert!(
                buffer.iter().all(|s| (-1.0..=1.0).contains(s)),
                "{waveform} left [-1, 1]"
            );
        }
    }

    #[test]
    fn phase_wraps_without_discontinuity_blowup() {
        let mut osc = Oscillator::new(Waveform::Sawtooth, 523.25);
        // Render long enough to wrap many times.
        let mut buffer = vec![0.0f32; 48_000];
        osc.render(&mut buffer, SAMPLE_RATE);
        assert!(buffer.iter().all(|s| s.is_finite()));
    }
}
