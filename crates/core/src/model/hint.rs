use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::letters::LetterClass;

/// Progressive hint state for the card on screen.
///
/// Level 0 shows nothing, level 1 shows the word shape as blanks, and every
/// further level corresponds to one revealed letter position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintState {
    level: u32,
    revealed: BTreeSet<usize>,
}

impl HintState {
    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[must_use]
    pub fn revealed(&self) -> &BTreeSet<usize> {
        &self.revealed
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.level > 0
    }

    /// Moves from "no hint" to "blanks only". Returns false if already active.
    pub fn start(&mut self) -> bool {
        if self.level > 0 {
            return false;
        }
        self.level = 1;
        true
    }

    /// Records a revealed position. Returns false (and leaves the level alone)
    /// if the hint has not started or the position was already revealed.
    pub fn reveal(&mut self, position: usize) -> bool {
        if self.level == 0 || !self.revealed.insert(position) {
            return false;
        }
        self.level = self.level.saturating_add(1);
        true
    }

    pub fn clear(&mut self) {
        self.level = 0;
        self.revealed.clear();
    }
}

/// Character positions of the lowercased `answer` that are letters and not
/// revealed yet.
#[must_use]
pub fn reveal_candidates(answer: &str, letters: LetterClass, hint: &HintState) -> Vec<usize> {
    answer
        .to_lowercase()
        .chars()
        .enumerate()
        .filter(|(i, c)| letters.is_letter(*c) && !hint.revealed.contains(i))
        .map(|(i, _)| i)
        .collect()
}

/// One rendered position of the hint line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HintCell {
    /// Not a letter; always shown as-is.
    Literal { ch: char },
    Revealed { ch: char },
    Blank,
}

/// Render the hint line for `answer`. Empty while no hint has been requested.
#[must_use]
pub fn hint_cells(answer: &str, letters: LetterClass, hint: &HintState) -> Vec<HintCell> {
    if !hint.is_active() {
        return Vec::new();
    }
    answer
        .chars()
        .enumerate()
        .map(|(i, ch)| {
            if !letters.is_letter(ch) {
                HintCell::Literal { ch }
            } else if hint.revealed.contains(&i) {
                HintCell::Revealed { ch }
            } else {
                HintCell::Blank
            }
        })
        .collect()
}
