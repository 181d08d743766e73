use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::CardId;

pub const DEFAULT_CATEGORY: &str = "General";
pub const DEFAULT_WORD_TYPE: &str = "Not specified";
/// Level label meaning "no level assigned".
pub const UNSET_LEVEL: &str = "XX";

const MAX_TERM_LEN: usize = 100;
const MAX_LABEL_LEN: usize = 50;

//
// ─── CARD TYPES ────────────────────────────────────────────────────────────────
//

/// Unvalidated input for a new vocabulary card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDraft {
    pub prompt: String,
    pub answer: String,
    pub pronunciation: Option<String>,
    pub category: Option<String>,
    pub word_type: Option<String>,
    pub level: Option<String>,
    pub notes: Option<String>,
    pub example: Option<String>,
}

impl CardDraft {
    #[must_use]
    pub fn new(prompt: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            answer: answer.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_pronunciation(mut self, pronunciation: impl Into<String>) -> Self {
        self.pronunciation = Some(pronunciation.into());
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn with_word_type(mut self, word_type: impl Into<String>) -> Self {
        self.word_type = Some(word_type.into());
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    /// Trim, default and check the draft.
    ///
    /// # Errors
    ///
    /// Returns `CardError` if a required term is blank or a field is too long.
    pub fn validate(self, now: DateTime<Utc>) -> Result<ValidatedCard, CardError> {
        let prompt = required("prompt", &self.prompt)?;
        let answer = required("answer", &self.answer)?;

        let category = optional(self.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_owned());
        check_len("category", &category, MAX_LABEL_LEN)?;
        let word_type = optional(self.word_type).unwrap_or_else(|| DEFAULT_WORD_TYPE.to_owned());
        check_len("word_type", &word_type, MAX_LABEL_LEN)?;

        let pronunciation = optional(self.pronunciation);
        if let Some(p) = &pronunciation {
            check_len("pronunciation", p, MAX_TERM_LEN)?;
        }

        let level = optional(self.level).filter(|l| l != UNSET_LEVEL);
        if let Some(l) = &level {
            check_len("level", l, MAX_LABEL_LEN)?;
        }

        Ok(ValidatedCard {
            prompt,
            answer,
            pronunciation,
            category,
            word_type,
            level,
            notes: optional(self.notes),
            example: optional(self.example),
            created_at: now,
        })
    }
}

fn required(field: &'static str, raw: &str) -> Result<String, CardError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CardError::Empty { field });
    }
    check_len(field, trimmed, MAX_TERM_LEN)?;
    Ok(trimmed.to_owned())
}

fn optional(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), CardError> {
    if value.chars().count() > max {
        return Err(CardError::TooLong { field, max });
    }
    Ok(())
}

/// A draft that passed validation but has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCard {
    pub prompt: String,
    pub answer: String,
    pub pronunciation: Option<String>,
    pub category: String,
    pub word_type: String,
    pub level: Option<String>,
    pub notes: Option<String>,
    pub example: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ValidatedCard {
    #[must_use]
    pub fn assign_id(self, id: CardId) -> VocabularyCard {
        VocabularyCard {
            id,
            prompt: self.prompt,
            answer: self.answer,
            pronunciation: self.pronunciation,
            category: self.category,
            word_type: self.word_type,
            level: self.level,
            notes: self.notes,
            example: self.example,
            created_at: self.created_at,
        }
    }
}

/// One vocabulary entry. `prompt` is what the learner sees, `answer` is the
/// term they have to type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyCard {
    id: CardId,
    prompt: String,
    answer: String,
    pronunciation: Option<String>,
    category: String,
    word_type: String,
    level: Option<String>,
    notes: Option<String>,
    example: Option<String>,
    created_at: DateTime<Utc>,
}

impl VocabularyCard {
    /// Rehydrate a card from persisted storage without re-validating it.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn from_persisted(
        id: CardId,
        prompt: String,
        answer: String,
        pronunciation: Option<String>,
        category: String,
        word_type: String,
        level: Option<String>,
        notes: Option<String>,
        example: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            prompt,
            answer,
            pronunciation,
            category,
            word_type,
            level,
            notes,
            example,
            created_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> CardId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    #[must_use]
    pub fn pronunciation(&self) -> Option<&str> {
        self.pronunciation.as_deref()
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn word_type(&self) -> &str {
        &self.word_type
    }

    #[must_use]
    pub fn level(&self) -> Option<&str> {
        self.level.as_deref()
    }

    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    #[must_use]
    pub fn example(&self) -> Option<&str> {
        self.example.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Case-insensitive comparison of trimmed learner input with the answer.
    #[must_use]
    pub fn is_correct_answer(&self, input: &str) -> bool {
        input.trim().to_lowercase() == self.answer.to_lowercase()
    }
}

//
// ─── CARD VALIDATION ERRORS ────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CardError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} is longer than {max} characters")]
    TooLong { field: &'static str, max: usize },
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn card_fails_if_answer_blank() {
        let err = CardDraft::new("Hello", "   ")
            .validate(fixed_now())
            .unwrap_err();
        assert_eq!(err, CardError::Empty { field: "answer" });
    }

    #[test]
    fn card_fails_if_prompt_blank() {
        let err = CardDraft::new("", "Bonjour")
            .validate(fixed_now())
            .unwrap_err();
        assert_eq!(err, CardError::Empty { field: "prompt" });
    }

    #[test]
    fn overlong_answer_is_rejected() {
        let err = CardDraft::new("x", "a".repeat(101))
            .validate(fixed_now())
            .unwrap_err();
        assert!(matches!(err, CardError::TooLong { field: "answer", .. }));
    }

    #[test]
    fn defaults_and_trimming_apply() {
        let card = CardDraft::new("  Hello ", " Bonjour ")
            .with_level("XX")
            .with_notes("   ")
            .with_pronunciation("bɔ̃ʒuʁ")
            .validate(fixed_now())
            .unwrap()
            .assign_id(CardId::new(7));

        assert_eq!(card.id(), CardId::new(7));
        assert_eq!(card.prompt(), "Hello");
        assert_eq!(card.answer(), "Bonjour");
        assert_eq!(card.category(), DEFAULT_CATEGORY);
        assert_eq!(card.word_type(), DEFAULT_WORD_TYPE);
        assert_eq!(card.level(), None);
        assert_eq!(card.notes(), None);
        assert_eq!(card.pronunciation(), Some("bɔ̃ʒuʁ"));
        assert_eq!(card.created_at(), fixed_now());
    }

    #[test]
    fn answer_check_ignores_case_and_surrounding_whitespace() {
        let card = CardDraft::new("Hello", "Bonjour")
            .validate(fixed_now())
            .unwrap()
            .assign_id(CardId::new(1));

        assert!(card.is_correct_answer("bonjour"));
        assert!(card.is_correct_answer("  BONJOUR\n"));
        assert!(!card.is_correct_answer("bonsoir"));
        assert!(!card.is_correct_answer(""));
    }
}
