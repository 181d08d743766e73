use std::sync::Arc;

use rand::seq::IndexedRandom;
use serde::Serialize;
use storage::repository::CardStore;
use vocab_core::model::{
    SessionState, Track, TrackLetters, View, VocabularyCard, reveal_candidates,
};

use super::view::{PageView, TrackSummary};
use crate::error::StudyError;
use crate::pool::{PoolCache, PoolStats};

/// Acknowledgement returned by `flip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlipAck {
    pub success: bool,
    pub flip_used: bool,
}

/// Drives one browser session through start, track selection, study and ending.
///
/// Every operation takes the session's state by `&mut` and returns the view
/// the session ended up on. Card choice is delegated to the shared
/// [`PoolCache`].
#[derive(Clone)]
pub struct StudyService {
    cards: Arc<dyn CardStore>,
    pools: Arc<PoolCache>,
    letters: TrackLetters,
}

impl StudyService {
    #[must_use]
    pub fn new(cards: Arc<dyn CardStore>, pools: Arc<PoolCache>) -> Self {
        Self {
            cards,
            pools,
            letters: TrackLetters::default(),
        }
    }

    /// Replace the per-track letter classes used for hints.
    #[must_use]
    pub fn with_letters(mut self, letters: TrackLetters) -> Self {
        self.letters = letters;
        self
    }

    #[must_use]
    pub fn pools(&self) -> &Arc<PoolCache> {
        &self.pools
    }

    /// Leave the start screen for language selection.
    pub fn begin(&self, state: &mut SessionState) -> View {
        state.begin();
        state.view()
    }

    /// Pick a track, restart its pool and show its first card.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::Storage` if the store is unavailable.
    pub async fn select_track(
        &self,
        state: &mut SessionState,
        track: Track,
    ) -> Result<View, StudyError> {
        self.pools.reset_track(track).await;
        match self.pools.draw_next(track).await? {
            Some(card) => state.enter_study(track, card),
            None => {
                state.clear();
                state.enter_ending(track);
            }
        }
        log::debug!("session selected track {track}, now on {:?}", state.view());
        Ok(state.view())
    }

    /// Grade the learner's input against the current card. Every submission
    /// counts as an attempt, including resubmissions for the same card.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::NotStudying` outside the study view and
    /// `StudyError::Storage` if the store is unavailable.
    pub async fn submit_answer(
        &self,
        state: &mut SessionState,
        input: &str,
    ) -> Result<View, StudyError> {
        let Some(card) = self.current_card(state).await? else {
            return Ok(state.view());
        };
        let correct = card.is_correct_answer(input);
        state.record_answer(input, correct);
        Ok(state.view())
    }

    /// Show the answer without submitting. Scored on the next `advance`.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::NotStudying` outside the study view.
    pub fn flip(&self, state: &mut SessionState) -> Result<FlipAck, StudyError> {
        if state.view() != View::Study || state.current_card().is_none() {
            return Err(StudyError::NotStudying);
        }
        state.flip();
        Ok(FlipAck {
            success: true,
            flip_used: state.flip_used(),
        })
    }

    /// Move to the next card, or to the ending once the track is used up.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::NotStudying` outside the study view,
    /// `StudyError::NoTrackSelected` without a track, and
    /// `StudyError::Storage` if the store is unavailable.
    pub async fn advance(&self, state: &mut SessionState) -> Result<View, StudyError> {
        if state.view() != View::Study {
            return Err(StudyError::NotStudying);
        }
        let track = state.track().ok_or(StudyError::NoTrackSelected)?;

        state.settle_flip_penalty();
        match self.pools.draw_next(track).await? {
            Some(card) => state.show_card(card),
            None => state.enter_ending(track),
        }
        Ok(state.view())
    }

    /// Start the hint (blanks only), then reveal one random letter per call.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::NotStudying` outside the study view and
    /// `StudyError::Storage` if the store is unavailable.
    pub async fn request_hint(&self, state: &mut SessionState) -> Result<View, StudyError> {
        let Some(card) = self.current_card(state).await? else {
            return Ok(state.view());
        };
        let Some(track) = state.track() else {
            return Err(StudyError::NoTrackSelected);
        };

        let hint = state.hint_mut();
        if hint.start() {
            return Ok(View::Study);
        }
        let candidates = reveal_candidates(card.answer(), self.letters.for_track(track), hint);
        if let Some(position) = pick(&candidates) {
            hint.reveal(position);
        }
        Ok(View::Study)
    }

    /// Restart scoring on the current track, continuing its existing pool.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::NoTrackSelected` without a track and
    /// `StudyError::Storage` if the store is unavailable.
    pub async fn reset_study(&self, state: &mut SessionState) -> Result<View, StudyError> {
        let track = state.track().ok_or(StudyError::NoTrackSelected)?;
        match self.pools.draw_next(track).await? {
            Some(card) => state.enter_study(track, card),
            None => {
                state.clear();
                state.enter_ending(track);
            }
        }
        Ok(state.view())
    }

    /// Forget the session and every track's pool.
    pub async fn return_to_start(&self, state: &mut SessionState) -> View {
        state.clear();
        self.pools.reset_all().await;
        state.view()
    }

    /// Derived data for rendering the page.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::Storage` if the store is unavailable.
    pub async fn page(&self, state: &mut SessionState) -> Result<PageView, StudyError> {
        let card = match (state.track(), state.current_card()) {
            (Some(track), Some(id)) => {
                let found = self.cards.get_card(track, id).await?;
                if found.is_none() {
                    self.recover_missing_card(state);
                }
                found
            }
            _ => None,
        };

        let mut summaries = Vec::with_capacity(Track::ALL.len());
        for track in Track::ALL {
            summaries.push(TrackSummary {
                track,
                summary: self.cards.summary(track).await?,
            });
        }

        Ok(PageView::build(
            state,
            card.as_ref(),
            &self.letters,
            summaries,
        ))
    }

    pub async fn pool_stats(&self) -> Vec<PoolStats> {
        self.pools.all_stats().await
    }

    /// The card on screen. `Ok(None)` when it no longer exists, in which case
    /// the session has been sent back to the start view.
    async fn current_card(
        &self,
        state: &mut SessionState,
    ) -> Result<Option<VocabularyCard>, StudyError> {
        if state.view() != View::Study {
            return Err(StudyError::NotStudying);
        }
        let (Some(track), Some(id)) = (state.track(), state.current_card()) else {
            return Err(StudyError::NotStudying);
        };

        let card = self.cards.get_card(track, id).await?;
        if card.is_none() {
            self.recover_missing_card(state);
        }
        Ok(card)
    }

    fn recover_missing_card(&self, state: &mut SessionState) {
        log::warn!(
            "card {:?} on track {:?} no longer exists, returning session to start",
            state.current_card(),
            state.track()
        );
        state.clear();
    }
}

fn pick(candidates: &[usize]) -> Option<usize> {
    candidates.choose(&mut rand::rng()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::PoolConfig;
    use storage::repository::InMemoryRepository;
    use vocab_core::Clock;
    use vocab_core::model::{CardDraft, HintCell, LetterClass, Score, StudyPhase};
    use vocab_core::time::fixed_now;

    async fn service_with(answers: &[&str]) -> (StudyService, Arc<InMemoryRepository>) {
        let repo = Arc::new(InMemoryRepository::new());
        for (i, answer) in answers.iter().enumerate() {
            let card = CardDraft::new(format!("prompt {i}"), *answer)
                .validate(fixed_now())
                .unwrap();
            repo.insert_card(Track::French, card).await.unwrap();
        }
        let pools = Arc::new(PoolCache::new(
            repo.clone(),
            Clock::fixed(fixed_now()),
            PoolConfig::default(),
        ));
        (StudyService::new(repo.clone(), pools), repo)
    }

    async fn studying(answers: &[&str]) -> (StudyService, Arc<InMemoryRepository>, SessionState) {
        let (service, repo) = service_with(answers).await;
        let mut state = SessionState::new();
        service.begin(&mut state);
        service.select_track(&mut state, Track::French).await.unwrap();
        (service, repo, state)
    }

    #[tokio::test]
    async fn select_track_starts_with_clean_score_and_hint() {
        let (service, _repo, mut state) = studying(&["Bonjour", "Merci"]).await;
        service.submit_answer(&mut state, "nope").await.unwrap();
        service.request_hint(&mut state).await.unwrap();

        service.select_track(&mut state, Track::French).await.unwrap();
        assert_eq!(state.view(), View::Study);
        assert_eq!(state.score(), Score::default());
        assert_eq!(state.hint().level(), 0);
        assert_eq!(state.phase(), Some(StudyPhase::Unanswered));
    }

    #[tokio::test]
    async fn answers_match_case_insensitively_after_trimming() {
        let (service, _repo, mut state) = studying(&["Bonjour"]).await;
        service.submit_answer(&mut state, "  bonjour ").await.unwrap();
        assert_eq!(state.is_correct(), Some(true));
        assert_eq!(state.score(), Score { correct: 1, total: 1 });
        assert_eq!(state.view(), View::Study);
    }

    #[tokio::test]
    async fn resubmitting_the_same_card_is_graded_again() {
        let (service, _repo, mut state) = studying(&["Bonjour"]).await;
        service.submit_answer(&mut state, "wrong").await.unwrap();
        service.submit_answer(&mut state, "wrong again").await.unwrap();
        assert_eq!(state.score(), Score { correct: 0, total: 2 });
        assert_eq!(state.user_input(), Some("wrong again"));

        service.submit_answer(&mut state, "bonjour").await.unwrap();
        assert_eq!(state.score(), Score { correct: 1, total: 3 });
        assert_eq!(state.is_correct(), Some(true));
    }

    #[tokio::test]
    async fn wrong_answer_counts_an_attempt_only() {
        let (service, _repo, mut state) = studying(&["Bonjour"]).await;
        service.submit_answer(&mut state, "salut").await.unwrap();
        assert_eq!(state.phase(), Some(StudyPhase::SubmittedIncorrect));
        assert_eq!(state.score(), Score { correct: 0, total: 1 });
    }

    #[tokio::test]
    async fn two_card_store_ends_after_second_advance() {
        let (service, _repo, mut state) = studying(&["Bonjour", "Merci"]).await;
        let first = state.current_card().unwrap();
        assert_eq!(service.pools().stats(Track::French).await.total_cards_used, 1);

        service.advance(&mut state).await.unwrap();
        let second = state.current_card().unwrap();
        assert_ne!(first, second);
        assert_eq!(service.pools().stats(Track::French).await.total_cards_used, 2);

        let view = service.advance(&mut state).await.unwrap();
        assert_eq!(view, View::Ending);
        assert_eq!(state.current_card(), None);
    }

    #[tokio::test]
    async fn empty_store_goes_straight_to_ending() {
        let (service, _repo) = service_with(&[]).await;
        let mut state = SessionState::new();
        service.begin(&mut state);
        let view = service.select_track(&mut state, Track::French).await.unwrap();
        assert_eq!(view, View::Ending);
        assert_eq!(state.track(), Some(Track::French));
    }

    #[tokio::test]
    async fn flip_then_advance_charges_one_attempt() {
        let (service, _repo, mut state) = studying(&["Bonjour", "Merci"]).await;
        let ack = service.flip(&mut state).unwrap();
        assert_eq!(
            ack,
            FlipAck {
                success: true,
                flip_used: true
            }
        );
        assert_eq!(state.score(), Score::default());

        service.advance(&mut state).await.unwrap();
        assert_eq!(state.score(), Score { correct: 0, total: 1 });
        assert!(!state.flip_used());
    }

    #[tokio::test]
    async fn flip_after_submit_is_not_charged_twice() {
        let (service, _repo, mut state) = studying(&["Bonjour", "Merci"]).await;
        service.submit_answer(&mut state, "bonjour").await.unwrap();
        service.flip(&mut state).unwrap();
        service.advance(&mut state).await.unwrap();
        assert_eq!(state.score(), Score { correct: 1, total: 1 });
    }

    #[tokio::test]
    async fn hints_reveal_one_letter_at_a_time_and_stop() {
        let (service, _repo, mut state) = studying(&["l'hôtel de ville"]).await;
        let letters = "lhôteldeville".chars().count();

        service.request_hint(&mut state).await.unwrap();
        assert_eq!(state.hint().level(), 1);
        assert!(state.hint().revealed().is_empty());

        service.request_hint(&mut state).await.unwrap();
        assert_eq!(state.hint().level(), 2);
        assert_eq!(state.hint().revealed().len(), 1);

        let answer: Vec<char> = "l'hôtel de ville".chars().collect();
        for _ in 0..answer.len() + 5 {
            service.request_hint(&mut state).await.unwrap();
        }
        assert_eq!(state.hint().revealed().len(), letters);
        assert!(
            state
                .hint()
                .revealed()
                .iter()
                .all(|&i| TrackLetters::default().for_track(Track::French).is_letter(answer[i]))
        );

        let page = service.page(&mut state).await.unwrap();
        assert!(page.hint.iter().all(|cell| !matches!(cell, HintCell::Blank)));
    }

    #[tokio::test]
    async fn configured_letter_classes_drive_hints() {
        let (service, _repo, mut state) = studying(&["été"]).await;
        let service = service.with_letters(
            TrackLetters::default().with(Track::French, LetterClass::ascii()),
        );

        service.request_hint(&mut state).await.unwrap();
        for _ in 0..5 {
            service.request_hint(&mut state).await.unwrap();
        }
        let revealed: Vec<usize> = state.hint().revealed().iter().copied().collect();
        assert_eq!(revealed, vec![1]);

        let page = service.page(&mut state).await.unwrap();
        assert_eq!(
            page.hint,
            vec![
                HintCell::Literal { ch: 'é' },
                HintCell::Revealed { ch: 't' },
                HintCell::Literal { ch: 'é' },
            ]
        );
    }

    #[tokio::test]
    async fn operations_outside_study_are_rejected() {
        let (service, _repo) = service_with(&["Bonjour"]).await;
        let mut state = SessionState::new();
        assert!(matches!(
            service.submit_answer(&mut state, "x").await,
            Err(StudyError::NotStudying)
        ));
        assert!(matches!(service.flip(&mut state), Err(StudyError::NotStudying)));
        assert!(matches!(
            service.advance(&mut state).await,
            Err(StudyError::NotStudying)
        ));
        assert!(matches!(
            service.reset_study(&mut state).await,
            Err(StudyError::NoTrackSelected)
        ));
        assert_eq!(state.view(), View::Start);
    }

    #[tokio::test]
    async fn reset_study_keeps_pool_usage() {
        let (service, _repo, mut state) = studying(&["Bonjour", "Merci", "Oui"]).await;
        service.submit_answer(&mut state, "wrong").await.unwrap();

        service.reset_study(&mut state).await.unwrap();
        assert_eq!(state.view(), View::Study);
        assert_eq!(state.score(), Score::default());
        assert_eq!(service.pools().stats(Track::French).await.total_cards_used, 2);
    }

    #[tokio::test]
    async fn reset_study_on_exhausted_track_ends() {
        let (service, _repo, mut state) = studying(&["Bonjour"]).await;
        service.submit_answer(&mut state, "bonjour").await.unwrap();
        service.reset_study(&mut state).await.unwrap();
        assert_eq!(state.view(), View::Ending);
        assert_eq!(state.score(), Score::default());
    }

    #[tokio::test]
    async fn return_to_start_resets_every_pool() {
        let (service, _repo, mut state) = studying(&["Bonjour", "Merci"]).await;
        service.advance(&mut state).await.unwrap();

        let view = service.return_to_start(&mut state).await;
        assert_eq!(view, View::Start);
        assert_eq!(state, SessionState::new());
        assert_eq!(service.pools().stats(Track::French).await.total_cards_used, 0);

        service.begin(&mut state);
        service.select_track(&mut state, Track::French).await.unwrap();
        assert_eq!(service.pools().stats(Track::French).await.total_cards_used, 1);
    }

    #[tokio::test]
    async fn missing_card_sends_session_back_to_start() {
        let (service, repo, mut state) = studying(&["Bonjour"]).await;
        let id = state.current_card().unwrap();
        repo.remove_card(Track::French, id).unwrap();

        let view = service.submit_answer(&mut state, "bonjour").await.unwrap();
        assert_eq!(view, View::Start);
        assert_eq!(state.score(), Score::default());
    }

    #[tokio::test]
    async fn page_hides_answer_until_submitted() {
        let (service, _repo, mut state) = studying(&["Bonjour"]).await;
        let page = service.page(&mut state).await.unwrap();
        let card = page.card.unwrap();
        assert_eq!(card.answer, None);
        assert_eq!(page.total_cards, 1);
        assert!(page.hint.is_empty());

        service.submit_answer(&mut state, "bonjour").await.unwrap();
        let page = service.page(&mut state).await.unwrap();
        assert_eq!(page.card.unwrap().answer.as_deref(), Some("Bonjour"));
        assert_eq!(page.score_percent, 100);
    }

    #[tokio::test]
    async fn page_on_start_view_has_no_card() {
        let (service, _repo) = service_with(&["Bonjour"]).await;
        let mut state = SessionState::new();
        let page = service.page(&mut state).await.unwrap();
        assert_eq!(page.view, View::Start);
        assert!(page.card.is_none());
        assert_eq!(page.summaries.len(), Track::ALL.len());
        assert_eq!(page.total_cards, 0);
    }
}
