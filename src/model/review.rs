//! Reader reviews

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require_text, BookId, ReviewId, UserId, Validate};
use crate::error::{CatalogError, Result};

/// Source tag applied when a review does not name one
pub const DEFAULT_REVIEW_SOURCE: &str = "BookOrigins";

/// Conventional origin labels; the tag itself is free text
pub const KNOWN_REVIEW_SOURCES: [&str; 3] = ["BookOrigins", "Goodreads", "Reddit"];

/// A review of a book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub book_id: BookId,
    pub user_id: Option<UserId>,
    pub rating: i32,
    pub comment: Option<String>,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

/// Review fields a caller may supply at creation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub book_id: BookId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub rating: i32,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Validate for NewReview {
    fn validate(&self) -> Result<()> {
        if !(1..=5).contains(&self.rating) {
            return Err(CatalogError::invalid("rating", "must be between 1 and 5"));
        }
        match &self.source {
            Some(source) => require_text("source", source),
            None => Ok(()),
        }
    }
}
