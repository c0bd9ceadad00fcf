//! Input normalization and auto-repeat suppression.
//!
//! Raw key events arrive with whatever case and repeat behavior the
//! platform produces. The tracker reduces them to clean note transitions:
//! a note-on is forwarded only on a key's first released→pressed
//! transition, and further presses of the same physical key are swallowed
//! until its release is observed. The engine also suppresses overlap on
//! its side, but filtering here keeps repeat chatter off the message queue
//! entirely.

use std::collections::HashSet;

/// Normalize a raw key character to its identifier form.
pub fn normalize(raw: char) -> char {
    raw.to_ascii_lowercase()
}

/// Tracks which physical keys are currently down.
///
/// Holds arbitrary characters, not just note-table keys: an unsupported
/// key still occupies its slot so its repeats are filtered consistently.
#[derive(Debug, Default)]
pub struct KeyTracker {
    held: HashSet<char>,
}

impl KeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press. Returns the normalized identifier on the first
    /// transition, `None` for auto-repeats.
    pub fn key_down(&mut self, raw: char) -> Option<char> {
        let key = normalize(raw);
        self.held.insert(key).then_some(key)
    }

    /// Record a key release. Returns the normalized identifier if the key
    /// was actually down, `None` for stray releases.
    pub fn key_up(&mut self, raw: char) -> Option<char> {
        let key = normalize(raw);
        self.held.remove(&key).then_some(key)
    }

    /// Forget all held keys, returning them. Used when the terminal loses
    /// focus or on shutdown, where release events may never arrive.
    pub fn release_all(&mut self) -> Vec<char> {
        self.held.drain().collect()
    }

    pub fn is_held(&self, raw: char) -> bool {
        self.held.contains(&normalize(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_press_passes_repeats_do_not() {
        let mut tracker = KeyTracker::new();

        assert_eq!(tracker.key_down('a'), Some('a'));
        assert_eq!(tracker.key_down('a'), None);
        assert_eq!(tracker.key_down('a'), None);
    }

    #[test]
    fn release_rearms_the_key() {
        let mut tracker = KeyTracker::new();

        tracker.key_down('a');
        assert_eq!(tracker.key_up('a'), Some('a'));
        assert_eq!(tracker.key_down('a'), Some('a'));
    }

    #[test]
    fn stray_release_is_ignored() {
        let mut tracker = KeyTracker::new();
        assert_eq!(tracker.key_up('a'), None);
    }

    #[test]
    fn uppercase_maps_to_the_same_key() {
        let mut tracker = KeyTracker::new();

        // Shift held mid-press must not double-trigger or miss the release.
        assert_eq!(tracker.key_down('A'), Some('a'));
        assert_eq!(tracker.key_down('a'), None);
        assert_eq!(tracker.key_up('A'), Some('a'));
        assert!(!tracker.is_held('a'));
    }

    #[test]
    fn keys_are_tracked_independently() {
        let mut tracker = KeyTracker::new();

        tracker.key_down('a');
        tracker.key_down('s');
        assert_eq!(tracker.key_up('a'), Some('a'));
        assert!(tracker.is_held('s'));
    }

    #[test]
    fn release_all_drains_everything() {
        let mut tracker = KeyTracker::new();
        tracker.key_down('a');
        tracker.key_down('h');

        let mut released = tracker.release_all();
        released.sort_unstable();
        assert_eq!(released, vec!['a', 'h']);
        assert_eq!(tracker.key_down('a'), Some('a'));
    }
}
