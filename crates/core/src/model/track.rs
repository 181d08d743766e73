use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A language track, with its own card store and its own pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Track {
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "en")]
    English,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown track: {0}")]
pub struct ParseTrackError(pub String);

impl Track {
    pub const ALL: [Track; 2] = [Track::French, Track::English];

    /// Short code used in URLs and logs.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Track::French => "fr",
            Track::English => "en",
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Track {
    type Err = ParseTrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fr" | "french" => Ok(Track::French),
            "en" | "english" => Ok(Track::English),
            other => Err(ParseTrackError(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codes_and_names() {
        assert_eq!("fr".parse::<Track>().unwrap(), Track::French);
        assert_eq!("English".parse::<Track>().unwrap(), Track::English);
        assert!("de".parse::<Track>().is_err());
    }

    #[test]
    fn code_round_trips_through_from_str() {
        for track in Track::ALL {
            assert_eq!(track.code().parse::<Track>().unwrap(), track);
        }
    }
}
