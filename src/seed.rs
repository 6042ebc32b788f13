//! Sample catalog
//!
//! Four published books and five reviews, loaded into a fresh engine at
//! startup so the catalog is never empty on first launch.

use crate::engine::Engine;
use crate::error::{CatalogError, Result};
use crate::model::{NewBook, NewReview, UserId};

/// Account id the sample books and reviews are attributed to
///
/// No such user is created; the reference is weak.
const SAMPLE_USER: UserId = 1;

struct SampleBook {
    title: &'static str,
    author: &'static str,
    synopsis: &'static str,
    genre: &'static str,
    cover_image_url: &'static str,
    trailer_video_url: &'static str,
    amazon_purchase_url: &'static str,
    movie_watch_url: &'static str,
    rating: f64,
    review_count: u32,
}

struct SampleReview {
    /// Index into `SAMPLE_BOOKS`
    book: usize,
    rating: i32,
    comment: &'static str,
    source: &'static str,
}

const SAMPLE_BOOKS: [SampleBook; 4] = [
    SampleBook {
        title: "Dune",
        author: "Frank Herbert",
        synopsis: "Set in the distant future amidst a feudal interstellar society in which noble houses, in control of individual planets, owe allegiance to the Padishah Emperor, Dune tells the story of young Paul Atreides, whose family accepts the stewardship of the planet Arrakis.",
        genre: "Science Fiction",
        cover_image_url: "https://images.unsplash.com/photo-1446776653964-20c1d3a81b06?ixlib=rb-4.0.3&auto=format&fit=crop&w=400&h=600",
        trailer_video_url: "https://www.youtube.com/embed/n9xhJrPXop4",
        amazon_purchase_url: "https://amazon.com/dp/0441172717",
        movie_watch_url: "https://www.hbo.com/movies/dune",
        rating: 5.0,
        review_count: 12_483,
    },
    SampleBook {
        title: "Pride and Prejudice",
        author: "Jane Austen",
        synopsis: "Pride and Prejudice follows the turbulent relationship between Elizabeth Bennet, the daughter of a country gentleman, and Fitzwilliam Darcy, a rich aristocratic landowner.",
        genre: "Romance",
        cover_image_url: "https://images.unsplash.com/photo-1578662996442-48f60103fc96?ixlib=rb-4.0.3&auto=format&fit=crop&w=400&h=600",
        trailer_video_url: "https://www.youtube.com/embed/1dYv5u6v55Y",
        amazon_purchase_url: "https://amazon.com/dp/0141439513",
        movie_watch_url: "https://www.netflix.com/title/70023048",
        rating: 5.0,
        review_count: 18_920,
    },
    SampleBook {
        title: "1984",
        author: "George Orwell",
        synopsis: "Winston Smith works for the Ministry of Truth in London, chief city of Airstrip One. Big Brother stares out from every poster, the Thought Police uncover every act of betrayal.",
        genre: "Dystopian",
        cover_image_url: "https://images.unsplash.com/photo-1518709268805-4e9042af2176?ixlib=rb-4.0.3&auto=format&fit=crop&w=400&h=600",
        trailer_video_url: "https://www.youtube.com/embed/Z4rBDUJTnNU",
        amazon_purchase_url: "https://amazon.com/dp/0452284236",
        movie_watch_url: "https://www.amazon.com/1984-John-Hurt/dp/B00AEBB1G8",
        rating: 4.0,
        review_count: 15_312,
    },
    SampleBook {
        title: "The Hobbit",
        author: "J.R.R. Tolkien",
        synopsis: "In a hole in the ground there lived a hobbit. Written for J.R.R. Tolkien's own children, The Hobbit met with instant critical acclaim when it was first published in 1937.",
        genre: "Fantasy",
        cover_image_url: "https://images.unsplash.com/photo-1506905925346-21bda4d32df4?ixlib=rb-4.0.3&auto=format&fit=crop&w=400&h=600",
        trailer_video_url: "https://www.youtube.com/embed/SDnYMbYB-nU",
        amazon_purchase_url: "https://amazon.com/dp/054792822X",
        movie_watch_url: "https://www.hbo.com/movies/the-hobbit-trilogy",
        rating: 4.0,
        review_count: 9_745,
    },
];

const SAMPLE_REVIEWS: [SampleReview; 5] = [
    SampleReview {
        book: 0,
        rating: 5,
        comment: "An absolutely masterful piece of storytelling. The world-building is incredible!",
        source: "Goodreads",
    },
    SampleReview {
        book: 0,
        rating: 4,
        comment: "Great adaptation potential! The visual descriptions are so vivid.",
        source: "Reddit",
    },
    SampleReview {
        book: 1,
        rating: 5,
        comment: "A timeless classic that never gets old. Austen's wit is unmatched.",
        source: "BookOrigins",
    },
    SampleReview {
        book: 2,
        rating: 5,
        comment: "More relevant today than ever. Chilling and prophetic.",
        source: "Goodreads",
    },
    SampleReview {
        book: 3,
        rating: 4,
        comment: "Perfect introduction to Tolkien's world. Cozy and adventurous.",
        source: "Reddit",
    },
];

/// Load the sample books (published) and their reviews into `engine`
pub fn load(engine: &Engine) -> Result<()> {
    let mut book_ids = Vec::with_capacity(SAMPLE_BOOKS.len());

    for sample in &SAMPLE_BOOKS {
        let book = engine.create_book(NewBook {
            title: sample.title.to_string(),
            author: sample.author.to_string(),
            synopsis: sample.synopsis.to_string(),
            genre: sample.genre.to_string(),
            cover_image_url: Some(sample.cover_image_url.to_string()),
            trailer_video_url: Some(sample.trailer_video_url.to_string()),
            amazon_purchase_url: Some(sample.amazon_purchase_url.to_string()),
            movie_watch_url: Some(sample.movie_watch_url.to_string()),
            author_id: Some(SAMPLE_USER),
        })?;

        engine.set_book_aggregates(book.id, sample.rating, sample.review_count);
        engine.set_book_published(book.id, true);
        book_ids.push(book.id);
    }

    for sample in &SAMPLE_REVIEWS {
        let book_id = *book_ids.get(sample.book).ok_or_else(|| {
            CatalogError::Internal(format!("sample review points at missing book {}", sample.book))
        })?;

        engine.create_review(NewReview {
            book_id,
            user_id: Some(SAMPLE_USER),
            rating: sample.rating,
            comment: Some(sample.comment.to_string()),
            source: Some(sample.source.to_string()),
        })?;
    }

    tracing::info!(
        books = SAMPLE_BOOKS.len(),
        reviews = SAMPLE_REVIEWS.len(),
        "sample catalog loaded"
    );
    Ok(())
}
