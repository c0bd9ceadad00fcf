use crate::MIN_TIME;

/*
Anti-Click Gain Envelope
========================

A bare oscillator switched on or off at full amplitude produces a step
discontinuity in the output signal, heard as a click. The envelope removes
both edges:

  Level
   0.3 ┐   ┌─────────────────┐
       │  ╱                   ╲
       │ ╱                     ╲ (exponential)
   0.0 └╱───────────────────────╲──→ Time
       Attack      Hold       Release
       (10 ms)  (key down)   (100 ms)

  Attack   Linear ramp 0 → 0.3 over 10 ms. Fast enough to feel instant,
           slow enough to kill the onset click.

  Hold     Flat at 0.3 while the key stays down. No decay stage: the
           keyboard sustains at full target level like an organ.

  Release  Exponential fall from the CURRENT level toward a 0.001 floor
           over 100 ms. Exponential matches perceived loudness falloff;
           a linear fade of the same length sounds like it is cut short.
           After the 100 ms window the envelope reports finished, which
           is the voice's cue to stop the generator.

Release starts from wherever the level currently is, including mid-attack.
That is the one scheduling hazard in this model: the attack ramp is still
"pending" when the key is released early, and it must not keep running
underneath the release. `note_off` snapshots the level and replaces the
stage outright, so exactly one automation is ever active.

The exponential is computed as a per-sample decay multiplier chosen so the
snapshot level hits the floor in exactly `RELEASE_TIME`:

    decay = (floor / start) ^ (1 / (RELEASE_TIME · sample_rate))
*/

/// Sustained loudness while a key is held, as a fraction of full scale.
pub const TARGET_LEVEL: f32 = 0.3;

/// Attack ramp duration in seconds.
pub const ATTACK_TIME: f32 = 0.010;

/// Release fade duration in seconds.
pub const RELEASE_TIME: f32 = 0.100;

/// Near-zero endpoint of the exponential release.
///
/// An exponential can never reach zero, so the fade aims at this floor and
/// the generator is stopped once the window elapses.
pub const RELEASE_FLOOR: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    /// Finished (or never started); level is zero.
    Idle,
    /// Ramping up after note-on.
    Attack,
    /// Holding at the target level while the key is down.
    Hold,
    /// Fading out after note-off.
    Release,
}

pub struct Envelope {
    stage: EnvelopeStage,
    level: f32,

    // Release bookkeeping, computed at note_off.
    release_decay: f32,
    release_remaining: u32,
}

impl Envelope {
    pub fn new() -> Self {
        Self {
            stage: EnvelopeStage::Idle,
            level: 0.0,
            release_decay: 1.0,
            release_remaining: 0,
        }
    }

    /// Begin the attack ramp from zero.
    pub fn note_on(&mut self) {
        self.level = 0.0;
        self.stage = EnvelopeStage::Attack;
        self.release_remaining = 0;
    }

    /// Begin the release fade from the current level.
    ///
    /// Cancels whatever stage was running (attack included) so only the
    /// release automation remains scheduled.
    pub fn note_off(&mut self, sample_rate: f32) {
        if self.stage == EnvelopeStage::Idle {
            return;
        }

        let total_samples = (RELEASE_TIME.max(MIN_TIME) * sample_rate).round().max(1.0);

        // Snapshot the current level; a start below the floor is already
        // inaudible, so fade flat from the floor instead of ramping up.
        let start = self.level.max(RELEASE_FLOOR);
        self.level = start;
        self.release_decay = (RELEASE_FLOOR / start).powf(1.0 / total_samples);
        self.release_remaining = total_samples as u32;
        self.stage = EnvelopeStage::Release;
    }

    /// Advance by one sample and return the gain to apply.
    pub fn next_level(&mut self, sample_rate: f32) -> f32 {
        match self.stage {
            EnvelopeStage::Idle => {
                self.level = 0.0;
            }

            EnvelopeStage::Attack => {
                let increment = TARGET_LEVEL / (ATTACK_TIME.max(MIN_TIME) * sample_rate);
                self.level += increment;

                if self.level >= TARGET_LEVEL {
                    self.level = TARGET_LEVEL;
                    self.stage = EnvelopeStage::Hold;
                }
            }

            EnvelopeStage::Hold => {
                self.level = TARGET_LEVEL;
            }

            EnvelopeStage::Release => {
                self.level *= self.release_decay;
                self.release_remaining = self.release_remaining.saturating_sub(1);

                if self.release_remaining == 0 {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Idle;
                }
            }
        }

        debug_assert!((0.0..=TARGET_LEVEL + 1e-6).contains(&self.level));
        self.level
    }

    /// True until the release fade has run its course.
    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Idle
    }

    /// Current gain (0.0 to `TARGET_LEVEL`).
    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn run(env: &mut Envelope, seconds: f32) {
        for _ in 0..(seconds * SAMPLE_RATE) as usize {
            env.next_level(SAMPLE_RATE);
        }
    }

    #[test]
    fn attack_reaches_target_in_ten_ms() {
        let mut env = Envelope::new();
        env.note_on();

        run(&mut env, ATTACK_TIME);

        assert!((env.level() - TARGET_LEVEL).abs() < 1e-3);
        assert_eq!(env.stage(), EnvelopeStage::Hold);
    }

    #[test]
    fn holds_target_level_while_key_down() {
        let mut env = Envelope::new();
        env.note_on();

        run(&mut env, 1.0); // far past the attack window

        assert_eq!(env.level(), TARGET_LEVEL);
        assert!(env.is_active());
    }

    #[test]
    fn release_decays_to_floor_then_idles() {
        let mut env = Envelope::new();
        env.note_on();
        run(&mut env, ATTACK_TIME);

        env.note_off(SAMPLE_RATE);

        // Just before the window closes the fade is near (but above) the
        // floor; exponential decay never overshoots it.
        run(&mut env, RELEASE_TIME * 0.99);
        assert!(env.level() > 0.0 && env.level() < 0.01);
        assert!(env.is_active());

        run(&mut env, RELEASE_TIME * 0.02);
        assert_eq!(env.level(), 0.0);
        assert!(!env.is_active());
    }

    #[test]
    fn release_mid_attack_starts_from_current_level() {
        let mut env = Envelope::new();
        env.note_on();
        run(&mut env, ATTACK_TIME / 2.0); // halfway up the ramp
        let mid = env.level();
        assert!(mid < TARGET_LEVEL);

        env.note_off(SAMPLE_RATE);
        let after = env.next_level(SAMPLE_RATE);

        // No upward jump to the full target, and the fade moves down.
        assert!(after <= mid + 1e-6, "level jumped from {mid} to {after}");
        assert_eq!(env.stage(), EnvelopeStage::Release);
    }

    #[test]
    fn note_off_while_idle_is_a_no_op() {
        let mut env = Envelope::new();
        env.note_off(SAMPLE_RATE);

        assert_eq!(env.stage(), EnvelopeStage::Idle);
        assert_eq!(env.next_level(SAMPLE_RATE), 0.0);
    }

    #[test]
    fn release_is_monotonically_decreasing() {
        let mut env = Envelope::new();
        env.note_on();
        run(&mut env, ATTACK_TIME);
        env.note_off(SAMPLE_RATE);

        let mut prev = env.level();
        for _ in 0..(RELEASE_TIME * SAMPLE_RATE) as usize {
            let level = env.next_level(SAMPLE_RATE);
            assert!(level <= prev);
            prev = level;
        }
    }
}
