//! Incremental text-reveal for assistant messages.
//!
//! A [`Typewriter`] is a pure state machine: `Revealing` until every
//! grapheme is shown, then `Complete`. The event loop owns the clock and
//! calls [`Typewriter::tick`] at a fixed interval; because the state lives
//! inside the loop's [`RevealSet`], nothing can tick after the loop (or the
//! message it belongs to) is gone. The animation is cosmetic only — the full
//! text is always present on the message.

use std::collections::HashMap;
use std::time::Duration;

use unicode_segmentation::UnicodeSegmentation;

/// Delay between reveal ticks; one grapheme is shown per tick.
pub const REVEAL_INTERVAL: Duration = Duration::from_millis(30);

#[derive(Debug)]
pub struct Typewriter {
    text: String,
    /// Byte offset of each grapheme boundary, so `visible` is a cheap slice.
    boundaries: Vec<usize>,
    shown: usize,
}

impl Typewriter {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let boundaries = text.grapheme_indices(true).map(|(i, _)| i).collect();
        Self {
            text,
            boundaries,
            shown: 0,
        }
    }

    /// Number of graphemes in the full text.
    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.shown >= self.boundaries.len()
    }

    /// Reveal one more grapheme. Returns `false` once complete; completed
    /// typewriters never advance again.
    pub fn tick(&mut self) -> bool {
        if self.is_complete() {
            return false;
        }
        self.shown += 1;
        true
    }

    /// The currently revealed prefix.
    pub fn visible(&self) -> &str {
        if self.is_complete() {
            &self.text
        } else {
            &self.text[..self.boundaries[self.shown]]
        }
    }

    /// Adopt a new text value. A changed value resets the cursor to zero and
    /// restarts the reveal; the same value is a no-op.
    pub fn sync(&mut self, text: &str) {
        if self.text != text {
            *self = Self::new(text);
        }
    }
}

/// Per-message reveal state, keyed by transcript index.
///
/// Each assistant message animates independently; completed entries are kept
/// so re-rendering a finished message performs no further ticks.
#[derive(Debug, Default)]
pub struct RevealSet {
    reveals: HashMap<usize, Typewriter>,
}

impl RevealSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a message for revealing, or re-sync an existing entry with
    /// its current text.
    pub fn ensure(&mut self, index: usize, text: &str) {
        match self.reveals.get_mut(&index) {
            Some(typewriter) => typewriter.sync(text),
            None => {
                self.reveals.insert(index, Typewriter::new(text));
            }
        }
    }

    /// Advance every incomplete typewriter by one grapheme. Returns whether
    /// anything changed, so the caller can skip redraws.
    pub fn tick(&mut self) -> bool {
        let mut advanced = false;
        for typewriter in self.reveals.values_mut() {
            advanced |= typewriter.tick();
        }
        advanced
    }

    /// Visible text for a message; unregistered messages show in full.
    pub fn visible<'a>(&'a self, index: usize, full_text: &'a str) -> &'a str {
        self.reveals
            .get(&index)
            .map(|t| t.visible())
            .unwrap_or(full_text)
    }

    pub fn is_revealing(&self, index: usize) -> bool {
        self.reveals.get(&index).is_some_and(|t| !t.is_complete())
    }

    pub fn clear(&mut self) {
        self.reveals.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveals_one_grapheme_per_tick() {
        let text = "Hi there!";
        let mut tw = Typewriter::new(text);
        let graphemes: Vec<&str> = text.graphemes(true).collect();

        for k in 0..graphemes.len() {
            assert_eq!(tw.visible(), graphemes[..k].concat());
            assert!(!tw.is_complete());
            assert!(tw.tick());
        }
        assert!(tw.is_complete());
        assert_eq!(tw.visible(), text);
    }

    #[test]
    fn exactly_n_ticks_reach_complete() {
        let mut tw = Typewriter::new("Hello");
        let mut ticks = 0;
        while tw.tick() {
            ticks += 1;
        }
        assert_eq!(ticks, 5);
        assert_eq!(tw.len(), 5);
    }

    #[test]
    fn completed_typewriter_never_advances() {
        let mut tw = Typewriter::new("ok");
        while tw.tick() {}
        assert!(!tw.tick());
        assert!(!tw.tick());
        assert_eq!(tw.visible(), "ok");
    }

    #[test]
    fn empty_text_is_complete_immediately() {
        let mut tw = Typewriter::new("");
        assert!(tw.is_complete());
        assert!(!tw.tick());
        assert_eq!(tw.visible(), "");
    }

    #[test]
    fn multibyte_graphemes_never_split() {
        let text = "héllo 👋🏽 café";
        let mut tw = Typewriter::new(text);
        while !tw.is_complete() {
            // Every intermediate prefix must be valid UTF-8 on a grapheme
            // boundary; slicing would panic otherwise.
            let _ = tw.visible().to_string();
            tw.tick();
        }
        assert_eq!(tw.visible(), text);
    }

    #[test]
    fn sync_with_new_text_restarts_from_zero() {
        let mut tw = Typewriter::new("first");
        tw.tick();
        tw.tick();
        tw.sync("second");
        assert_eq!(tw.visible(), "");
        assert!(!tw.is_complete());
    }

    #[test]
    fn sync_with_same_text_keeps_progress() {
        let mut tw = Typewriter::new("same");
        tw.tick();
        tw.sync("same");
        assert_eq!(tw.visible(), "s");
    }

    #[test]
    fn reveal_set_advances_messages_independently() {
        let mut set = RevealSet::new();
        set.ensure(1, "ab");
        set.ensure(3, "wxyz");

        assert!(set.tick());
        assert_eq!(set.visible(1, "ab"), "a");
        assert_eq!(set.visible(3, "wxyz"), "w");

        assert!(set.tick());
        assert!(!set.is_revealing(1));
        assert!(set.is_revealing(3));

        // Entry 1 is complete; only 3 keeps moving.
        assert!(set.tick());
        assert!(set.tick());
        assert!(!set.tick());
        assert_eq!(set.visible(3, "wxyz"), "wxyz");
    }

    #[test]
    fn unregistered_messages_show_in_full() {
        let set = RevealSet::new();
        assert_eq!(set.visible(0, "full text"), "full text");
        assert!(!set.is_revealing(0));
    }

    #[test]
    fn ensure_is_idempotent_for_completed_entries() {
        let mut set = RevealSet::new();
        set.ensure(0, "hi");
        while set.tick() {}
        set.ensure(0, "hi");
        assert!(!set.tick());
        assert_eq!(set.visible(0, "hi"), "hi");
    }
}
