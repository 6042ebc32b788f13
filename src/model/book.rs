//! Books and their derived views

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{double_option, require_text, require_text_if_present, BookId, Review, UserId, Validate};
use crate::error::Result;

/// A catalog entry
///
/// `rating`, `review_count` and `is_published` are server-owned: they are
/// fixed at creation and cannot be reached through [`BookPatch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub synopsis: String,
    pub genre: String,
    pub cover_image_url: Option<String>,
    pub trailer_video_url: Option<String>,
    pub amazon_purchase_url: Option<String>,
    pub movie_watch_url: Option<String>,
    pub rating: f64,
    pub review_count: u32,
    pub is_published: bool,
    pub author_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Case-insensitive substring match against title, author or genre
    ///
    /// `needle` must already be lowercased.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.author.to_lowercase().contains(needle)
            || self.genre.to_lowercase().contains(needle)
    }
}

/// Book fields a caller may supply at creation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub synopsis: String,
    pub genre: String,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub trailer_video_url: Option<String>,
    #[serde(default)]
    pub amazon_purchase_url: Option<String>,
    #[serde(default)]
    pub movie_watch_url: Option<String>,
    #[serde(default)]
    pub author_id: Option<UserId>,
}

impl Validate for NewBook {
    fn validate(&self) -> Result<()> {
        require_text("title", &self.title)?;
        require_text("author", &self.author)?;
        require_text("synopsis", &self.synopsis)?;
        require_text("genre", &self.genre)
    }
}

/// Allow-listed partial update of a book
///
/// Absent fields are left alone. The optional fields also accept `null`,
/// which clears them. Any other field name is rejected at deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BookPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub trailer_video_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub amazon_purchase_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub movie_watch_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub author_id: Option<Option<UserId>>,
}

impl BookPatch {
    /// Shallow-merge the carried fields over `book`
    ///
    /// Does not touch `updated_at`; the engine stamps it.
    pub(crate) fn apply(self, book: &mut Book) {
        if let Some(title) = self.title {
            book.title = title;
        }
        if let Some(author) = self.author {
            book.author = author;
        }
        if let Some(synopsis) = self.synopsis {
            book.synopsis = synopsis;
        }
        if let Some(genre) = self.genre {
            book.genre = genre;
        }
        if let Some(url) = self.cover_image_url {
            book.cover_image_url = url;
        }
        if let Some(url) = self.trailer_video_url {
            book.trailer_video_url = url;
        }
        if let Some(url) = self.amazon_purchase_url {
            book.amazon_purchase_url = url;
        }
        if let Some(url) = self.movie_watch_url {
            book.movie_watch_url = url;
        }
        if let Some(author_id) = self.author_id {
            book.author_id = author_id;
        }
    }
}

impl Validate for BookPatch {
    fn validate(&self) -> Result<()> {
        require_text_if_present("title", self.title.as_ref())?;
        require_text_if_present("author", self.author.as_ref())?;
        require_text_if_present("synopsis", self.synopsis.as_ref())?;
        require_text_if_present("genre", self.genre.as_ref())
    }
}

/// Body of the publication endpoint
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Publication {
    pub is_published: bool,
}

impl Validate for Publication {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// A book together with every review that references it
///
/// Computed on read, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookWithReviews {
    #[serde(flatten)]
    pub book: Book,
    pub reviews: Vec<Review>,
}
