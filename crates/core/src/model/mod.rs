mod card;
mod hint;
mod ids;
mod letters;
mod session;
mod track;

pub use ids::{CardId, ParseIdError, SessionKey};
pub use track::{ParseTrackError, Track};

pub use card::{
    CardDraft, CardError, DEFAULT_CATEGORY, DEFAULT_WORD_TYPE, UNSET_LEVEL, ValidatedCard,
    VocabularyCard,
};
pub use hint::{HintCell, HintState, hint_cells, reveal_candidates};
pub use letters::{LetterClass, TrackLetters};
pub use session::{AnswerStatus, Score, SessionState, StudyPhase, View};
