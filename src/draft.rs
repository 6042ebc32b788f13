//! Draft statistics for creator mode
//!
//! Word counts and reading-time estimates shown while a chapter is written.

use serde::Serialize;

/// Average reading speed used for estimates
pub const WORDS_PER_MINUTE: u32 = 200;

/// Count maximal runs of non-whitespace characters
pub fn count_words(text: &str) -> u32 {
    let words = text.split_whitespace().count();
    u32::try_from(words).unwrap_or(u32::MAX)
}

/// Minutes needed to read `words` words, rounded up
pub fn reading_time_minutes(words: u32) -> u32 {
    words.div_ceil(WORDS_PER_MINUTE)
}

/// Summary of a piece of draft text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftStats {
    pub word_count: u32,
    pub reading_minutes: u32,
}

impl DraftStats {
    pub fn from_text(text: &str) -> Self {
        let word_count = count_words(text);
        Self {
            word_count,
            reading_minutes: reading_time_minutes(word_count),
        }
    }
}

