use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Duration, Utc};
use vocab_core::model::{CardId, Track, VocabularyCard};

use super::PoolStats;

/// The in-memory batch for one track.
///
/// `shown` only ever holds indices into `cards`; replacing the batch clears it.
/// `total_used` counts draws across every batch since the last reset.
#[derive(Debug, Clone, Default)]
pub struct CardPool {
    cards: Vec<VocabularyCard>,
    shown: BTreeSet<usize>,
    total_used: u64,
    last_refresh: Option<DateTime<Utc>>,
    generation: u64,
}

impl CardPool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn total_used(&self) -> u64 {
        self.total_used
    }

    #[must_use]
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.last_refresh
    }

    /// Incremented every time the batch is replaced.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn shown(&self) -> &BTreeSet<usize> {
        &self.shown
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        !self.cards.is_empty() && self.shown.len() >= self.cards.len()
    }

    /// True if the batch is empty, older than `ttl`, or `force` is set.
    #[must_use]
    pub fn needs_refresh(&self, now: DateTime<Utc>, ttl: Duration, force: bool) -> bool {
        if force || self.cards.is_empty() {
            return true;
        }
        match self.last_refresh {
            Some(at) => now - at > ttl,
            None => true,
        }
    }

    #[must_use]
    pub fn card_ids(&self) -> HashSet<CardId> {
        self.cards.iter().map(VocabularyCard::id).collect()
    }

    /// Swap in a new batch. Clears `shown`, keeps `total_used`.
    pub fn replace(&mut self, cards: Vec<VocabularyCard>, now: DateTime<Utc>) {
        self.cards = cards;
        self.shown.clear();
        self.last_refresh = Some(now);
        self.generation = self.generation.wrapping_add(1);
    }

    /// Indices in the batch that have not been shown yet.
    #[must_use]
    pub fn available(&self) -> Vec<usize> {
        (0..self.cards.len())
            .filter(|i| !self.shown.contains(i))
            .collect()
    }

    /// Mark `index` shown and count the draw. `None` if the index is out of
    /// range or was already shown.
    pub fn mark_shown(&mut self, index: usize) -> Option<CardId> {
        let id = self.cards.get(index)?.id();
        if !self.shown.insert(index) {
            return None;
        }
        self.total_used = self.total_used.saturating_add(1);
        Some(id)
    }

    /// Drop the batch, the shown set, the refresh time and the usage counter.
    pub fn reset(&mut self) {
        let generation = self.generation;
        *self = Self::default();
        self.generation = generation;
    }

    #[must_use]
    pub fn stats(&self, track: Track) -> PoolStats {
        PoolStats {
            track,
            pool_size: self.cards.len(),
            shown: self.shown.len(),
            available: self.cards.len().saturating_sub(self.shown.len()),
            total_cards_used: self.total_used,
            generation: self.generation,
            last_refresh: self.last_refresh,
        }
    }
}
