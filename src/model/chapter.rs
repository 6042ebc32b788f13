//! Chapters written in creator mode

use serde::{Deserialize, Serialize};

use super::{require_text, require_text_if_present, BookId, ChapterId, Validate};
use crate::draft;
use crate::error::{CatalogError, Result};

/// A chapter of a book
///
/// `chapter_number` orders chapters within a book. Nothing prevents two
/// chapters of one book from sharing a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: ChapterId,
    pub book_id: BookId,
    pub title: String,
    pub content: String,
    pub chapter_number: u32,
    pub word_count: u32,
}

/// Chapter fields a caller may supply at creation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChapter {
    pub book_id: BookId,
    pub title: String,
    pub content: String,
    pub chapter_number: u32,
    /// Counted from `content` when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u32>,
}

impl NewChapter {
    pub(crate) fn resolved_word_count(&self) -> u32 {
        self.word_count
            .unwrap_or_else(|| draft::count_words(&self.content))
    }
}

impl Validate for NewChapter {
    fn validate(&self) -> Result<()> {
        require_text("title", &self.title)?;
        require_chapter_number(self.chapter_number)
    }
}

/// Allow-listed partial update of a chapter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChapterPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_id: Option<BookId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u32>,
}

impl ChapterPatch {
    /// Shallow-merge the carried fields over `chapter`
    ///
    /// New content without an explicit word count recounts the words.
    pub(crate) fn apply(self, chapter: &mut Chapter) {
        if let Some(book_id) = self.book_id {
            chapter.book_id = book_id;
        }
        if let Some(title) = self.title {
            chapter.title = title;
        }
        if let Some(chapter_number) = self.chapter_number {
            chapter.chapter_number = chapter_number;
        }
        match (self.content, self.word_count) {
            (Some(content), None) => {
                chapter.word_count = draft::count_words(&content);
                chapter.content = content;
            }
            (Some(content), Some(word_count)) => {
                chapter.content = content;
                chapter.word_count = word_count;
            }
            (None, Some(word_count)) => chapter.word_count = word_count,
            (None, None) => {}
        }
    }
}

impl Validate for ChapterPatch {
    fn validate(&self) -> Result<()> {
        require_text_if_present("title", self.title.as_ref())?;
        match self.chapter_number {
            Some(number) => require_chapter_number(number),
            None => Ok(()),
        }
    }
}

fn require_chapter_number(number: u32) -> Result<()> {
    if number == 0 {
        return Err(CatalogError::invalid("chapterNumber", "must be at least 1"));
    }
    Ok(())
}
