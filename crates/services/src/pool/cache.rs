use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::seq::IndexedRandom;
use storage::repository::{CardStore, StorageError};
use tokio::sync::Mutex;
use vocab_core::Clock;
use vocab_core::model::{CardId, Track};

use super::{CardPool, PoolConfig, PoolStats};

/// Process-wide pool cache, one lock per track.
///
/// Refills and draws for a track run under that track's lock, so concurrent
/// sessions on the same track never race a refill or double count a draw.
pub struct PoolCache {
    store: Arc<dyn CardStore>,
    clock: Clock,
    config: PoolConfig,
    french: Mutex<CardPool>,
    english: Mutex<CardPool>,
}

impl PoolCache {
    #[must_use]
    pub fn new(store: Arc<dyn CardStore>, clock: Clock, config: PoolConfig) -> Self {
        Self {
            store,
            clock,
            config,
            french: Mutex::new(CardPool::new()),
            english: Mutex::new(CardPool::new()),
        }
    }

    fn slot(&self, track: Track) -> &Mutex<CardPool> {
        match track {
            Track::French => &self.french,
            Track::English => &self.english,
        }
    }

    /// Re-sample the track's batch if it is empty, stale, or `force` is set.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be sampled.
    pub async fn ensure_fresh(&self, track: Track, force: bool) -> Result<(), StorageError> {
        self.ensure_fresh_at(track, force, self.clock.now()).await
    }

    async fn ensure_fresh_at(
        &self,
        track: Track,
        force: bool,
        now: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut pool = self.slot(track).lock().await;
        self.refresh_locked(track, &mut pool, force, now).await
    }

    async fn refresh_locked(
        &self,
        track: Track,
        pool: &mut CardPool,
        force: bool,
        now: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        if !pool.needs_refresh(now, self.config.ttl, force) {
            return Ok(());
        }

        let limit = self.config.batch_size;
        let mut batch = self.store.sample(track, &pool.card_ids(), limit).await?;
        let short = u32::try_from(batch.len()).unwrap_or(u32::MAX) < limit;
        if short && !pool.is_empty() {
            // The store is close to exhausted relative to the current batch.
            batch = self.store.sample(track, &HashSet::new(), limit).await?;
            log::debug!(
                "track {track}: fresh sample too small, resampled {} cards from the whole store",
                batch.len()
            );
        } else {
            log::debug!("track {track}: sampled {} new cards", batch.len());
        }

        pool.replace(batch, now);
        Ok(())
    }

    /// Draw one not-yet-shown card from the track's batch.
    ///
    /// `Ok(None)` means every card in the store has been used for this run.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be counted or sampled.
    pub async fn draw_next(&self, track: Track) -> Result<Option<CardId>, StorageError> {
        self.draw_next_at(track, self.clock.now()).await
    }

    async fn draw_next_at(
        &self,
        track: Track,
        now: DateTime<Utc>,
    ) -> Result<Option<CardId>, StorageError> {
        let mut pool = self.slot(track).lock().await;

        let total = self.store.count(track).await?;
        if pool.total_used() >= total {
            log::info!(
                "track {track}: all {total} cards used ({} draws)",
                pool.total_used()
            );
            return Ok(None);
        }

        self.refresh_locked(track, &mut pool, false, now).await?;
        let mut available = pool.available();
        if available.is_empty() {
            self.refresh_locked(track, &mut pool, true, now).await?;
            available = pool.available();
        }

        let Some(index) = pick(&available) else {
            return Ok(None);
        };
        Ok(pool.mark_shown(index))
    }

    /// Clear one track's batch and usage counter.
    pub async fn reset_track(&self, track: Track) {
        self.slot(track).lock().await.reset();
        log::debug!("track {track}: pool reset");
    }

    /// Clear every track.
    pub async fn reset_all(&self) {
        for track in Track::ALL {
            self.reset_track(track).await;
        }
    }

    pub async fn stats(&self, track: Track) -> PoolStats {
        self.slot(track).lock().await.stats(track)
    }

    pub async fn all_stats(&self) -> Vec<PoolStats> {
        let mut out = Vec::with_capacity(Track::ALL.len());
        for track in Track::ALL {
            out.push(self.stats(track).await);
        }
        out
    }
}

fn pick(available: &[usize]) -> Option<usize> {
    available.choose(&mut rand::rng()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use storage::repository::InMemoryRepository;
    use vocab_core::model::CardDraft;
    use vocab_core::time::fixed_now;

    async fn store_with(track: Track, n: u64) -> Arc<InMemoryRepository> {
        let repo = Arc::new(InMemoryRepository::new());
        for i in 1..=n {
            let card = CardDraft::new(format!("P{i}"), format!("A{i}"))
                .validate(fixed_now())
                .unwrap();
            repo.insert_card(track, card).await.unwrap();
        }
        repo
    }

    fn cache(repo: Arc<InMemoryRepository>, config: PoolConfig) -> PoolCache {
        PoolCache::new(repo, Clock::fixed(fixed_now()), config)
    }

    #[tokio::test]
    async fn two_card_store_is_exhausted_after_two_draws() {
        let repo = store_with(Track::French, 2).await;
        let pools = cache(repo, PoolConfig::default());

        let a = pools.draw_next(Track::French).await.unwrap().unwrap();
        let b = pools.draw_next(Track::French).await.unwrap().unwrap();
        assert_ne!(a, b);
        assert_eq!(pools.stats(Track::French).await.total_cards_used, 2);

        assert_eq!(pools.draw_next(Track::French).await.unwrap(), None);
        assert_eq!(pools.stats(Track::French).await.total_cards_used, 2);
    }

    #[tokio::test]
    async fn empty_store_draws_nothing() {
        let repo = store_with(Track::French, 0).await;
        let pools = cache(repo, PoolConfig::default());
        assert_eq!(pools.draw_next(Track::English).await.unwrap(), None);
        assert_eq!(pools.stats(Track::English).await.pool_size, 0);
    }

    #[tokio::test]
    async fn usage_is_monotonic_bounded_and_never_repeats_within_a_batch() {
        let repo = store_with(Track::French, 23).await;
        let pools = cache(repo, PoolConfig::default().with_batch_size(5));

        let mut last_used = 0;
        let mut seen_in_generation: HashSet<CardId> = HashSet::new();
        let mut generation = 0;
        loop {
            let drawn = pools.draw_next(Track::French).await.unwrap();
            let stats = pools.stats(Track::French).await;
            assert!(stats.total_cards_used >= last_used);
            assert!(stats.total_cards_used <= 23);
            last_used = stats.total_cards_used;

            let Some(id) = drawn else { break };
            if stats.generation != generation {
                generation = stats.generation;
                seen_in_generation.clear();
            }
            assert!(seen_in_generation.insert(id), "{id:?} repeated in one batch");
            assert!(stats.pool_size <= 5);
        }
        assert_eq!(last_used, 23);
    }

    #[tokio::test]
    async fn reset_track_starts_a_new_run() {
        let repo = store_with(Track::English, 1).await;
        let pools = cache(repo, PoolConfig::default());

        assert!(pools.draw_next(Track::English).await.unwrap().is_some());
        assert_eq!(pools.draw_next(Track::English).await.unwrap(), None);

        pools.reset_track(Track::English).await;
        let stats = pools.stats(Track::English).await;
        assert_eq!(stats.total_cards_used, 0);
        assert_eq!(stats.pool_size, 0);
        assert!(pools.draw_next(Track::English).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn short_resample_falls_back_to_whole_store() {
        let repo = store_with(Track::French, 6).await;
        let pools = cache(repo, PoolConfig::default().with_batch_size(4));

        pools.ensure_fresh(Track::French, false).await.unwrap();
        assert_eq!(pools.stats(Track::French).await.pool_size, 4);

        // Only 2 cards remain outside the batch, so the forced refill draws
        // a full batch from the whole store instead.
        pools.ensure_fresh(Track::French, true).await.unwrap();
        let stats = pools.stats(Track::French).await;
        assert_eq!(stats.pool_size, 4);
        assert_eq!(stats.shown, 0);
        assert_eq!(stats.generation, 2);
    }

    #[tokio::test]
    async fn fresh_batch_is_not_resampled_before_ttl() {
        let repo = store_with(Track::French, 10).await;
        let pools = cache(repo, PoolConfig::default().with_ttl(Duration::minutes(5)));

        pools.ensure_fresh(Track::French, false).await.unwrap();
        pools.ensure_fresh(Track::French, false).await.unwrap();
        assert_eq!(pools.stats(Track::French).await.generation, 1);
    }

    #[tokio::test]
    async fn stale_batch_is_replaced_on_the_next_draw() {
        let repo = store_with(Track::French, 20).await;
        let ttl = Duration::minutes(5);
        let pools = cache(repo, PoolConfig::default().with_batch_size(10).with_ttl(ttl));
        let t0 = fixed_now();

        pools.draw_next_at(Track::French, t0).await.unwrap().unwrap();
        pools.draw_next_at(Track::French, t0).await.unwrap().unwrap();
        let before = pools.stats(Track::French).await;
        assert_eq!((before.generation, before.shown, before.total_cards_used), (1, 2, 2));

        // Within the ttl the batch is kept.
        pools.ensure_fresh_at(Track::French, false, t0 + ttl).await.unwrap();
        assert_eq!(pools.stats(Track::French).await.generation, 1);

        let later = t0 + ttl + Duration::seconds(1);
        pools.ensure_fresh_at(Track::French, false, later).await.unwrap();
        let refreshed = pools.stats(Track::French).await;
        assert_eq!(refreshed.generation, 2);
        assert_eq!(refreshed.shown, 0);
        assert_eq!(refreshed.total_cards_used, 2);
        assert_eq!(refreshed.last_refresh, Some(later));

        let much_later = later + ttl + Duration::seconds(1);
        pools.draw_next_at(Track::French, much_later).await.unwrap().unwrap();
        let drawn = pools.stats(Track::French).await;
        assert_eq!(drawn.generation, 3);
        assert_eq!(drawn.shown, 1);
        assert_eq!(drawn.total_cards_used, 3);
    }

    #[tokio::test]
    async fn concurrent_draws_on_one_track_never_double_count() {
        let repo = store_with(Track::French, 40).await;
        let pools = Arc::new(cache(repo, PoolConfig::default().with_batch_size(7)));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let pools = Arc::clone(&pools);
            handles.push(tokio::spawn(async move {
                let mut drawn = 0_u64;
                while pools.draw_next(Track::French).await.unwrap().is_some() {
                    drawn += 1;
                }
                drawn
            }));
        }

        let mut total = 0;
        for handle in handles {
            total += handle.await.unwrap();
        }
        assert_eq!(total, 40);
        assert_eq!(pools.stats(Track::French).await.total_cards_used, 40);
    }
}
