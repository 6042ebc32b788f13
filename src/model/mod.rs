//! Entity Model
//!
//! Record types owned by the engine, the insertable subsets callers may
//! supply at creation, and the allow-listed patches accepted on update.
//!
//! ## Entities
//! - `User`     - registered account (immutable after creation)
//! - `Book`     - catalog entry, visible in listings only once published
//! - `Chapter`  - creator-written text belonging to a book
//! - `Review`   - rating + comment for a book, immutable
//!
//! References between entities (`authorId`, `bookId`, `userId`) are plain
//! identifiers: nothing checks that the target exists.
//!
//! Every insertable and patch type implements [`Validate`]; the route layer
//! validates before anything reaches the engine.

mod book;
mod chapter;
mod review;
mod user;

pub use book::{Book, BookPatch, BookWithReviews, NewBook, Publication};
pub use chapter::{Chapter, ChapterPatch, NewChapter};
pub use review::{NewReview, Review, DEFAULT_REVIEW_SOURCE, KNOWN_REVIEW_SOURCES};
pub use user::{NewUser, User};

use serde::{Deserialize, Deserializer};

use crate::error::{CatalogError, Result};

// =============================================================================
// Identifiers
// =============================================================================

pub type UserId = u64;
pub type BookId = u64;
pub type ChapterId = u64;
pub type ReviewId = u64;

// =============================================================================
// Validation
// =============================================================================

/// Shape checks run on caller-supplied data before it reaches the engine
pub trait Validate {
    /// Returns `CatalogError::InvalidInput` describing the first violation
    fn validate(&self) -> Result<()>;
}

/// Required text must contain something other than whitespace
pub(crate) fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CatalogError::invalid(field, "must not be empty"));
    }
    Ok(())
}

/// Same as [`require_text`] for a field a patch may omit
pub(crate) fn require_text_if_present(field: &str, value: Option<&String>) -> Result<()> {
    match value {
        Some(value) => require_text(field, value),
        None => Ok(()),
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`) so patches can clear optional values.
pub(crate) fn double_option<'de, T, D>(
    deserializer: D,
) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
