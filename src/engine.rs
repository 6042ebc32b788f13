//! Engine Module
//!
//! The storage engine that owns every entity table.
//!
//! ## Responsibilities
//! - Sole owner of users, books, chapters and reviews
//! - Assign identifiers and server-owned fields on creation
//! - Apply allow-listed patches
//! - Answer the catalog queries (listing, genre filter, search)
//! - Load the sample catalog on startup

use chrono::Utc;

use crate::config::Config;
use crate::error::{CatalogError, Result};
use crate::model::{
    Book, BookId, BookPatch, BookWithReviews, Chapter, ChapterId, ChapterPatch, NewBook,
    NewChapter, NewReview, NewUser, Review, User, UserId, DEFAULT_REVIEW_SOURCE,
};
use crate::seed;
use crate::store::EntityTable;

/// The catalog storage engine
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader per table
///
/// - Every table carries its own RwLock; reads of one table run concurrently
/// - Create / update / publish run under one write guard each, so id
///   assignment and read-modify-write never interleave
/// - Nothing spans tables: creating a review does not touch its book
///
/// ## Visibility
///
/// Listing, genre filter and search only return published books. Point
/// lookups (`get_book`, `get_book_with_reviews`) ignore publication.
pub struct Engine {
    users: EntityTable<User>,
    books: EntityTable<Book>,
    chapters: EntityTable<Chapter>,
    reviews: EntityTable<Review>,
}

impl Engine {
    /// Create an engine with no data
    pub fn new() -> Self {
        Self {
            users: EntityTable::new(),
            books: EntityTable::new(),
            chapters: EntityTable::new(),
            reviews: EntityTable::new(),
        }
    }

    /// Create an engine for the given config
    ///
    /// Loads the sample catalog when `seed_sample_data` is set.
    pub fn open(config: &Config) -> Result<Self> {
        let engine = Self::new();
        if config.seed_sample_data {
            seed::load(&engine)?;
        }
        Ok(engine)
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Register a user
    ///
    /// Fails with `DuplicateKey` if the username or email is taken.
    pub fn create_user(&self, new_user: NewUser) -> Result<User> {
        self.users.insert_checked(
            |mut existing| {
                existing.try_for_each(|user| {
                    if user.username == new_user.username {
                        return Err(CatalogError::DuplicateKey {
                            field: "username",
                            value: new_user.username.clone(),
                        });
                    }
                    if user.email == new_user.email {
                        return Err(CatalogError::DuplicateKey {
                            field: "email",
                            value: new_user.email.clone(),
                        });
                    }
                    Ok(())
                })
            },
            |id| User {
                id,
                username: new_user.username.clone(),
                password: new_user.password.clone(),
                email: new_user.email.clone(),
                is_creator: new_user.is_creator,
                created_at: Utc::now(),
            },
        )
    }

    pub fn get_user(&self, id: UserId) -> Option<User> {
        self.users.get(id)
    }

    pub fn get_user_by_username(&self, username: &str) -> Option<User> {
        self.users.find(|user| user.username == username)
    }

    // =========================================================================
    // Books
    // =========================================================================

    /// Add a book to the catalog
    ///
    /// New books start unpublished with no rating or reviews, so they stay
    /// out of listings until published.
    pub fn create_book(&self, new_book: NewBook) -> Result<Book> {
        let now = Utc::now();
        let book = self.books.insert_with(|id| Book {
            id,
            title: new_book.title,
            author: new_book.author,
            synopsis: new_book.synopsis,
            genre: new_book.genre,
            cover_image_url: new_book.cover_image_url,
            trailer_video_url: new_book.trailer_video_url,
            amazon_purchase_url: new_book.amazon_purchase_url,
            movie_watch_url: new_book.movie_watch_url,
            rating: 0.0,
            review_count: 0,
            is_published: false,
            author_id: new_book.author_id,
            created_at: now,
            updated_at: now,
        })?;

        tracing::debug!(book_id = book.id, title = %book.title, "book created");
        Ok(book)
    }

    /// All published books, in id order
    pub fn get_all_books(&self) -> Vec<Book> {
        self.books.filter(|book| book.is_published)
    }

    /// Published books whose genre equals `genre`, ignoring case
    pub fn get_books_by_genre(&self, genre: &str) -> Vec<Book> {
        let genre = genre.to_lowercase();
        self.books
            .filter(|book| book.is_published && book.genre.to_lowercase() == genre)
    }

    /// Published books whose title, author or genre contains `query`,
    /// ignoring case
    pub fn search_books(&self, query: &str) -> Vec<Book> {
        let needle = query.to_lowercase();
        self.books
            .filter(|book| book.is_published && book.matches_lowercase(&needle))
    }

    /// Any book by id, published or not
    pub fn get_book(&self, id: BookId) -> Option<Book> {
        self.books.get(id)
    }

    /// A book plus every review referencing it
    pub fn get_book_with_reviews(&self, id: BookId) -> Option<BookWithReviews> {
        let book = self.books.get(id)?;
        let reviews = self.get_book_reviews(id);
        Some(BookWithReviews { book, reviews })
    }

    /// Apply a patch and stamp `updated_at`
    ///
    /// Returns `None` if no book has this id.
    pub fn update_book(&self, id: BookId, patch: BookPatch) -> Option<Book> {
        self.books.update(id, |book| {
            patch.apply(book);
            book.updated_at = Utc::now();
        })
    }

    /// Publish or unpublish a book and stamp `updated_at`
    pub fn set_book_published(&self, id: BookId, published: bool) -> Option<Book> {
        self.books.update(id, |book| {
            book.is_published = published;
            book.updated_at = Utc::now();
        })
    }

    /// Overwrite the review aggregates of a book; used by the sample loader
    pub(crate) fn set_book_aggregates(
        &self,
        id: BookId,
        rating: f64,
        review_count: u32,
    ) -> Option<Book> {
        self.books.update(id, |book| {
            book.rating = rating;
            book.review_count = review_count;
        })
    }

    // =========================================================================
    // Chapters
    // =========================================================================

    /// Chapters of a book in ascending chapter number
    ///
    /// Chapters sharing a number keep their insertion order.
    pub fn get_book_chapters(&self, book_id: BookId) -> Vec<Chapter> {
        let mut chapters = self.chapters.filter(|chapter| chapter.book_id == book_id);
        chapters.sort_by_key(|chapter| chapter.chapter_number);
        chapters
    }

    pub fn create_chapter(&self, new_chapter: NewChapter) -> Result<Chapter> {
        let word_count = new_chapter.resolved_word_count();
        let chapter = self.chapters.insert_with(|id| Chapter {
            id,
            book_id: new_chapter.book_id,
            title: new_chapter.title,
            content: new_chapter.content,
            chapter_number: new_chapter.chapter_number,
            word_count,
        })?;

        tracing::debug!(
            chapter_id = chapter.id,
            book_id = chapter.book_id,
            "chapter created"
        );
        Ok(chapter)
    }

    pub fn update_chapter(&self, id: ChapterId, patch: ChapterPatch) -> Option<Chapter> {
        self.chapters.update(id, |chapter| patch.apply(chapter))
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    /// Reviews of a book in the order they were written
    pub fn get_book_reviews(&self, book_id: BookId) -> Vec<Review> {
        self.reviews.filter(|review| review.book_id == book_id)
    }

    /// Store a review
    ///
    /// The book's `rating` and `review_count` are left as they are.
    pub fn create_review(&self, new_review: NewReview) -> Result<Review> {
        self.reviews.insert_with(|id| Review {
            id,
            book_id: new_review.book_id,
            user_id: new_review.user_id,
            rating: new_review.rating,
            comment: new_review.comment,
            source: new_review
                .source
                .unwrap_or_else(|| DEFAULT_REVIEW_SOURCE.to_string()),
            created_at: Utc::now(),
        })
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Number of stored users
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Number of stored books, published or not
    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    /// Number of stored chapters
    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    /// Number of stored reviews
    pub fn review_count(&self) -> usize {
        self.reviews.len()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
