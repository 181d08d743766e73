use super::track::Track;

/// Which characters of an answer count as letters for hint purposes.
///
/// Anything outside the class (spaces, apostrophes, hyphens, digits) is always
/// shown verbatim and is never offered as a reveal position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LetterClass {
    extra: &'static str,
}

const FRENCH_ACCENTED: &str = "àâäéèêëïîôöùûüÿçœæÀÂÄÉÈÊËÏÎÔÖÙÛÜŸÇŒÆ";

impl LetterClass {
    /// ASCII letters only.
    #[must_use]
    pub const fn ascii() -> Self {
        Self::with_extra("")
    }

    /// ASCII letters plus the accented letters used in French.
    #[must_use]
    pub const fn french() -> Self {
        Self::with_extra(FRENCH_ACCENTED)
    }

    /// ASCII letters plus an explicit set of extra characters.
    #[must_use]
    pub const fn with_extra(extra: &'static str) -> Self {
        Self { extra }
    }

    #[must_use]
    pub fn is_letter(&self, c: char) -> bool {
        c.is_ascii_alphabetic() || self.extra.contains(c)
    }
}

/// Letter class per track, handed to the study service as configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackLetters {
    french: LetterClass,
    english: LetterClass,
}

impl Default for TrackLetters {
    fn default() -> Self {
        Self {
            french: LetterClass::french(),
            english: LetterClass::ascii(),
        }
    }
}

impl TrackLetters {
    #[must_use]
    pub fn with(mut self, track: Track, class: LetterClass) -> Self {
        match track {
            Track::French => self.french = class,
            Track::English => self.english = class,
        }
        self
    }

    #[must_use]
    pub fn for_track(&self, track: Track) -> LetterClass {
        match track {
            Track::French => self.french,
            Track::English => self.english,
        }
    }
}
