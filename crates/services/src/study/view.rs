use serde::Serialize;
use storage::repository::StoreSummary;
use vocab_core::model::{
    CardId, HintCell, Score, SessionState, StudyPhase, Track, TrackLetters, View, VocabularyCard,
    hint_cells,
};

/// The current card as the page shows it. `answer` stays hidden until the
/// learner has submitted or flipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub id: CardId,
    pub prompt: String,
    pub answer: Option<String>,
    pub pronunciation: Option<String>,
    pub category: String,
    pub word_type: String,
    pub level: Option<String>,
    pub notes: Option<String>,
    pub example: Option<String>,
}

impl CardView {
    fn build(card: &VocabularyCard, reveal_answer: bool) -> Self {
        Self {
            id: card.id(),
            prompt: card.prompt().to_owned(),
            answer: reveal_answer.then(|| card.answer().to_owned()),
            pronunciation: card.pronunciation().map(str::to_owned),
            category: card.category().to_owned(),
            word_type: card.word_type().to_owned(),
            level: card.level().map(str::to_owned),
            notes: card.notes().map(str::to_owned),
            example: card.example().map(str::to_owned),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackSummary {
    pub track: Track,
    pub summary: StoreSummary,
}

/// Everything the single page needs to render the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    pub view: View,
    pub phase: Option<StudyPhase>,
    pub track: Option<Track>,
    pub card: Option<CardView>,
    pub hint: Vec<HintCell>,
    pub hint_level: u32,
    pub submitted: bool,
    pub is_correct: Option<bool>,
    pub user_input: Option<String>,
    pub flip_used: bool,
    pub score: Score,
    pub score_percent: u32,
    /// Card count of the selected track's store, 0 before a track is chosen.
    pub total_cards: u64,
    pub summaries: Vec<TrackSummary>,
}

impl PageView {
    pub(crate) fn build(
        state: &SessionState,
        card: Option<&VocabularyCard>,
        letters: &TrackLetters,
        summaries: Vec<TrackSummary>,
    ) -> Self {
        let track = state.track();
        let reveal_answer = state.submitted() || state.flip_used();
        let hint = match (card, track) {
            (Some(card), Some(track)) => {
                hint_cells(card.answer(), letters.for_track(track), state.hint())
            }
            _ => Vec::new(),
        };
        let total_cards = track
            .and_then(|t| summaries.iter().find(|s| s.track == t))
            .map_or(0, |s| s.summary.total);

        Self {
            view: state.view(),
            phase: state.phase(),
            track,
            card: card.map(|c| CardView::build(c, reveal_answer)),
            hint,
            hint_level: state.hint().level(),
            submitted: state.submitted(),
            is_correct: state.is_correct(),
            user_input: state.user_input().map(str::to_owned),
            flip_used: state.flip_used(),
            score: state.score(),
            score_percent: state.score().percent(),
            total_cards,
            summaries,
        }
    }
}
