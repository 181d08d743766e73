use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use vocab_core::model::{CardError, CardId, Track, ValidatedCard, VocabularyCard};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Validation(#[from] CardError),
}

/// Number of cards per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: u64,
}

/// Store totals, grouped by category (sorted by name).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSummary {
    pub total: u64,
    pub categories: Vec<CategoryCount>,
}

/// Optional equality filters for listing cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardFilter {
    pub category: Option<String>,
    pub level: Option<String>,
}

impl CardFilter {
    #[must_use]
    pub fn matches(&self, card: &VocabularyCard) -> bool {
        self.category
            .as_deref()
            .is_none_or(|c| card.category() == c)
            && self.level.as_deref().is_none_or(|l| card.level() == Some(l))
    }
}

/// 1-based page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 50,
        }
    }
}

impl PageRequest {
    /// Clamp to `page >= 1` and `1 <= per_page <= 500`.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, 500),
        }
    }

    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }
}

/// One page of cards plus pagination totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPage {
    pub cards: Vec<VocabularyCard>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub pages: u64,
}

impl CardPage {
    #[must_use]
    pub fn new(cards: Vec<VocabularyCard>, request: PageRequest, total: u64) -> Self {
        let per_page = u64::from(request.per_page);
        Self {
            cards,
            page: request.page,
            per_page: request.per_page,
            total,
            pages: total.div_ceil(per_page),
        }
    }
}

/// Card store contract, one logical store per track.
#[async_trait]
pub trait CardStore: Send + Sync {
    /// Persist a validated card and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the card cannot be stored.
    async fn insert_card(
        &self,
        track: Track,
        card: ValidatedCard,
    ) -> Result<VocabularyCard, StorageError>;

    /// Fetch a card by id. `Ok(None)` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store is unavailable.
    async fn get_card(
        &self,
        track: Track,
        id: CardId,
    ) -> Result<Option<VocabularyCard>, StorageError>;

    /// Total number of cards in the track.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store is unavailable.
    async fn count(&self, track: Track) -> Result<u64, StorageError>;

    /// Up to `limit` cards not in `excluding`, in random order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store is unavailable.
    async fn sample(
        &self,
        track: Track,
        excluding: &HashSet<CardId>,
        limit: u32,
    ) -> Result<Vec<VocabularyCard>, StorageError>;

    /// Total and per-category counts.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store is unavailable.
    async fn summary(&self, track: Track) -> Result<StoreSummary, StorageError>;

    /// Filtered listing ordered by category, then answer.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store is unavailable.
    async fn list_cards(
        &self,
        track: Track,
        filter: &CardFilter,
        page: PageRequest,
    ) -> Result<CardPage, StorageError>;
}

#[derive(Default)]
struct TrackTable {
    next_id: u64,
    rows: BTreeMap<CardId, VocabularyCard>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<Mutex<HashMap<Track, TrackTable>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_table<R>(
        &self,
        track: Track,
        f: impl FnOnce(&mut TrackTable) -> R,
    ) -> Result<R, StorageError> {
        let mut guard = self
            .tables
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(f(guard.entry(track).or_default()))
    }

    /// Remove a card, as an administrator editing the store would.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the card does not exist.
    pub fn remove_card(&self, track: Track, id: CardId) -> Result<(), StorageError> {
        self.with_table(track, |t| t.rows.remove(&id))?
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl CardStore for InMemoryRepository {
    async fn insert_card(
        &self,
        track: Track,
        card: ValidatedCard,
    ) -> Result<VocabularyCard, StorageError> {
        self.with_table(track, |t| {
            t.next_id += 1;
            let stored = card.assign_id(CardId::new(t.next_id));
            t.rows.insert(stored.id(), stored.clone());
            stored
        })
    }

    async fn get_card(
        &self,
        track: Track,
        id: CardId,
    ) -> Result<Option<VocabularyCard>, StorageError> {
        self.with_table(track, |t| t.rows.get(&id).cloned())
    }

    async fn count(&self, track: Track) -> Result<u64, StorageError> {
        self.with_table(track, |t| t.rows.len() as u64)
    }

    async fn sample(
        &self,
        track: Track,
        excluding: &HashSet<CardId>,
        limit: u32,
    ) -> Result<Vec<VocabularyCard>, StorageError> {
        let mut candidates = self.with_table(track, |t| {
            t.rows
                .values()
                .filter(|c| !excluding.contains(&c.id()))
                .cloned()
                .collect::<Vec<_>>()
        })?;
        candidates.shuffle(&mut rand::rng());
        candidates.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(candidates)
    }

    async fn summary(&self, track: Track) -> Result<StoreSummary, StorageError> {
        self.with_table(track, |t| {
            let mut by_category: BTreeMap<&str, u64> = BTreeMap::new();
            for card in t.rows.values() {
                *by_category.entry(card.category()).or_default() += 1;
            }
            StoreSummary {
                total: t.rows.len() as u64,
                categories: by_category
                    .into_iter()
                    .map(|(name, count)| CategoryCount {
                        name: name.to_owned(),
                        count,
                    })
                    .collect(),
            }
        })
    }

    async fn list_cards(
        &self,
        track: Track,
        filter: &CardFilter,
        page: PageRequest,
    ) -> Result<CardPage, StorageError> {
        let page = page.normalized();
        let mut matching = self.with_table(track, |t| {
            t.rows
                .values()
                .filter(|c| filter.matches(c))
                .cloned()
                .collect::<Vec<_>>()
        })?;
        matching.sort_by(|a, b| {
            a.category()
                .cmp(b.category())
                .then_with(|| a.answer().cmp(b.answer()))
        });
        let total = matching.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let per_page = usize::try_from(page.per_page).unwrap_or(usize::MAX);
        let cards = matching.into_iter().skip(offset).take(per_page).collect();
        Ok(CardPage::new(cards, page, total))
    }
}

/// Aggregates the card store behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub cards: Arc<dyn CardStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let cards: Arc<dyn CardStore> = Arc::new(InMemoryRepository::new());
        Self { cards }
    }
}
