//! Fixed-length digit buffer behind a multi-box code entry screen.

use serde::Serialize;

/// Ordered slots of single decimal digits with a focus cursor
///
/// The length is chosen per screen; the buffer never assumes one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OtpBuffer {
    slots: Vec<Option<char>>,
    focus: usize,
}

impl OtpBuffer {
    /// Creates an empty buffer of `length` slots
    pub fn new(length: usize) -> Self {
        Self {
            slots: vec![None; length.max(1)],
            focus: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Slot that should receive the next keystroke
    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn slots(&self) -> &[Option<char>] {
        &self.slots
    }

    /// Writes one digit at `index`
    ///
    /// Non-digits and out-of-range indices are ignored and `false` is returned.
    /// Focus advances to `index + 1` unless `index` is the last slot.
    pub fn set_digit(&mut self, index: usize, ch: char) -> bool {
        if index >= self.slots.len() || !ch.is_ascii_digit() {
            return false;
        }

        self.slots[index] = Some(ch);
        self.focus = if index + 1 < self.slots.len() { index + 1 } else { index };
        true
    }

    /// Distributes pasted digits left to right from `start`
    ///
    /// Input with any non-digit is rejected whole. Extra digits past the last
    /// slot are dropped; focus lands on `min(start + len, N - 1)`.
    pub fn paste_sequence(&mut self, start: usize, digits: &str) -> bool {
        if start >= self.slots.len() || digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }

        let count = digits.chars().count();
        for (slot, ch) in self.slots[start..].iter_mut().zip(digits.chars()) {
            *slot = Some(ch);
        }
        self.focus = (start + count).min(self.slots.len() - 1);
        true
    }

    /// Routes a raw input event for the box at `index`
    ///
    /// Empty text clears the slot, one character is a keystroke, anything
    /// longer is a paste.
    pub fn input(&mut self, index: usize, text: &str) -> bool {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (None, _) => self.clear_slot(index),
            (Some(ch), None) => self.set_digit(index, ch),
            _ => self.paste_sequence(index, text),
        }
    }

    /// Backspace pressed on the box at `index`
    ///
    /// A filled slot is cleared in place. On an empty slot focus moves one box
    /// left without deleting anything there.
    pub fn backspace(&mut self, index: usize) -> bool {
        if index >= self.slots.len() {
            return false;
        }

        if self.slots[index].is_some() {
            self.slots[index] = None;
            self.focus = index;
            true
        } else if index > 0 {
            self.focus = index - 1;
            true
        } else {
            false
        }
    }

    fn clear_slot(&mut self, index: usize) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                *slot = None;
                true
            }
            None => false,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// The entered code once every slot is filled
    pub fn code(&self) -> Option<String> {
        self.slots.iter().copied().collect::<Option<String>>()
    }

    /// Empties every slot and puts focus back on the first box
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
        self.focus = 0;
    }
}
