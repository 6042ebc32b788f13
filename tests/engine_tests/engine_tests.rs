//! Tests for Engine
//!
//! These tests verify:
//! - Creation defaults and id assignment
//! - Visibility of unpublished books in listings, genre filter and search
//! - Allow-listed patches for books and chapters
//! - Chapter ordering and review lookups
//! - User uniqueness
//! - The sample catalog
//! - Concurrent access patterns

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use bookorigins::config::Config;
use bookorigins::engine::Engine;
use bookorigins::model::{BookPatch, ChapterPatch, NewBook, NewChapter, NewReview, NewUser};
use bookorigins::CatalogError;

// =============================================================================
// Helper Functions
// =============================================================================

fn new_book(title: &str, author: &str, genre: &str) -> NewBook {
    NewBook {
        title: title.to_string(),
        author: author.to_string(),
        synopsis: format!("A story called {title}."),
        genre: genre.to_string(),
        ..Default::default()
    }
}

fn new_chapter(book_id: u64, number: u32, title: &str) -> NewChapter {
    NewChapter {
        book_id,
        title: title.to_string(),
        content: format!("Text of {title}"),
        chapter_number: number,
        word_count: None,
    }
}

fn new_user(username: &str, email: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        password: "hunter2".to_string(),
        email: email.to_string(),
        is_creator: false,
    }
}

fn published(engine: &Engine, title: &str, author: &str, genre: &str) -> u64 {
    let book = engine.create_book(new_book(title, author, genre)).unwrap();
    engine.set_book_published(book.id, true).unwrap();
    book.id
}

fn seeded_engine() -> Engine {
    Engine::open(&Config::default()).unwrap()
}

fn titles(books: &[bookorigins::model::Book]) -> Vec<String> {
    books.iter().map(|b| b.title.clone()).collect()
}

// =============================================================================
// Book Creation Tests
// =============================================================================

#[test]
fn test_engine_new_is_empty() {
    let engine = Engine::new();

    assert_eq!(engine.book_count(), 0);
    assert_eq!(engine.review_count(), 0);
    assert_eq!(engine.chapter_count(), 0);
    assert_eq!(engine.user_count(), 0);
    assert!(engine.get_all_books().is_empty());
}

#[test]
fn test_create_book_forces_server_fields() {
    let engine = Engine::new();

    let book = engine
        .create_book(new_book("Neuromancer", "William Gibson", "Science Fiction"))
        .unwrap();

    assert_eq!(book.id, 1);
    assert!(!book.is_published);
    assert_eq!(book.rating, 0.0);
    assert_eq!(book.review_count, 0);
    assert_eq!(book.created_at, book.updated_at);
    assert_eq!(engine.get_book(book.id), Some(book));
}

#[test]
fn test_created_book_hidden_until_published() {
    let engine = Engine::new();

    let book = engine
        .create_book(new_book("Neuromancer", "William Gibson", "Science Fiction"))
        .unwrap();

    assert!(engine.get_all_books().is_empty());
    assert!(engine.get_books_by_genre("Science Fiction").is_empty());
    assert!(engine.search_books("gibson").is_empty());

    let published = engine.set_book_published(book.id, true).unwrap();
    assert!(published.is_published);
    assert!(published.updated_at >= book.updated_at);

    assert_eq!(titles(&engine.get_all_books()), vec!["Neuromancer"]);
    assert_eq!(engine.search_books("gibson").len(), 1);
}

#[test]
fn test_book_ids_are_sequential() {
    let engine = Engine::new();

    let ids: Vec<u64> = (0..5)
        .map(|i| engine.create_book(new_book(&format!("Book {i}"), "A", "G")).unwrap().id)
        .collect();

    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_set_published_unknown_book() {
    let engine = Engine::new();
    assert!(engine.set_book_published(42, true).is_none());
}

#[test]
fn test_unpublish_hides_book_again() {
    let engine = Engine::new();
    let id = published(&engine, "Emma", "Jane Austen", "Romance");

    engine.set_book_published(id, false).unwrap();

    assert!(engine.get_all_books().is_empty());
    assert!(engine.get_book(id).is_some());
}

// =============================================================================
// Listing / Genre / Search Tests
// =============================================================================

#[test]
fn test_get_all_books_each_published_once_in_id_order() {
    let engine = Engine::new();
    let a = published(&engine, "A", "Author A", "Fantasy");
    let _hidden = engine.create_book(new_book("Hidden", "Nobody", "Fantasy")).unwrap();
    let b = published(&engine, "B", "Author B", "Romance");
    let c = published(&engine, "C", "Author C", "Mystery");

    // Updating an early book must not move it
    engine
        .update_book(a, BookPatch { synopsis: Some("changed".into()), ..Default::default() })
        .unwrap();

    let ids: Vec<u64> = engine.get_all_books().iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![a, b, c]);
}

#[test]
fn test_genre_filter_is_case_insensitive_exact_match() {
    let engine = Engine::new();
    published(&engine, "Dune", "Frank Herbert", "Science Fiction");
    published(&engine, "Science of Cooking", "Chef", "Science");
    published(&engine, "Emma", "Jane Austen", "Romance");

    for query in ["science fiction", "SCIENCE FICTION", "Science Fiction"] {
        assert_eq!(titles(&engine.get_books_by_genre(query)), vec!["Dune"]);
    }
    assert!(engine.get_books_by_genre("Science Fic").is_empty());
}

#[test]
fn test_search_matches_title_author_or_genre() {
    let engine = Engine::new();
    published(&engine, "The Hobbit", "J.R.R. Tolkien", "Fantasy");
    published(&engine, "Gone Girl", "Gillian Flynn", "Thriller");
    published(&engine, "Mistborn", "Brandon Sanderson", "Fantasy");

    // Genre only
    assert_eq!(
        titles(&engine.search_books("fantasy")),
        vec!["The Hobbit", "Mistborn"]
    );
    // Author only
    assert_eq!(titles(&engine.search_books("FLYNN")), vec!["Gone Girl"]);
    // Title only
    assert_eq!(titles(&engine.search_books("hobb")), vec!["The Hobbit"]);
    // Nothing
    assert!(engine.search_books("zzz").is_empty());
}

#[test]
fn test_search_excludes_unpublished_matches() {
    let engine = Engine::new();
    published(&engine, "Rebecca", "Daphne du Maurier", "Mystery");
    engine
        .create_book(new_book("Rebecca (draft)", "Someone", "Mystery"))
        .unwrap();

    assert_eq!(titles(&engine.search_books("rebecca")), vec!["Rebecca"]);
}

#[test]
fn test_empty_search_returns_all_published() {
    let engine = Engine::new();
    published(&engine, "A", "X", "G");
    published(&engine, "B", "Y", "H");

    assert_eq!(engine.search_books("").len(), 2);
}

// =============================================================================
// Book Lookup / Update Tests
// =============================================================================

#[test]
fn test_get_book_ignores_publication() {
    let engine = Engine::new();
    let draft = engine.create_book(new_book("Draft", "Me", "Memoir")).unwrap();

    assert_eq!(engine.get_book(draft.id).unwrap().title, "Draft");
    assert!(engine.get_book_with_reviews(draft.id).is_some());
    assert!(engine.get_book(999).is_none());
}

#[test]
fn test_update_book_changes_only_patched_fields() {
    let engine = seeded_engine();
    let before = engine.get_book(1).unwrap();

    let after = engine
        .update_book(1, BookPatch { title: Some("New".into()), ..Default::default() })
        .unwrap();

    assert_eq!(after.title, "New");
    assert!(after.updated_at >= before.updated_at);
    assert_eq!(after.rating, before.rating);
    assert_eq!(after.review_count, before.review_count);
    assert_eq!(after.is_published, before.is_published);
    assert_eq!(after.created_at, before.created_at);
    assert_eq!(after.author, before.author);
    assert_eq!(after.synopsis, before.synopsis);
    assert_eq!(after.genre, before.genre);
    assert_eq!(after.cover_image_url, before.cover_image_url);
    assert_eq!(engine.get_book(1), Some(after));
}

#[test]
fn test_update_book_clears_optional_field() {
    let engine = seeded_engine();

    let book = engine
        .update_book(
            1,
            BookPatch {
                movie_watch_url: Some(None),
                author_id: Some(Some(7)),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(book.movie_watch_url, None);
    assert_eq!(book.author_id, Some(7));
    assert!(book.trailer_video_url.is_some());
}

#[test]
fn test_update_unknown_book_has_no_side_effects() {
    let engine = seeded_engine();
    let before = engine.get_all_books();

    let result = engine.update_book(999, BookPatch { title: Some("X".into()), ..Default::default() });

    assert!(result.is_none());
    assert_eq!(engine.get_all_books(), before);
    assert_eq!(engine.book_count(), 4);
}

// =============================================================================
// Review Tests
// =============================================================================

#[test]
fn test_book_with_no_reviews_has_empty_collection() {
    let engine = Engine::new();
    let id = published(&engine, "Lonely", "Nobody", "Poetry");

    let book = engine.get_book_with_reviews(id).unwrap();

    assert_eq!(book.book.id, id);
    assert!(book.reviews.is_empty());
}

#[test]
fn test_book_with_reviews_collects_in_insertion_order() {
    let engine = Engine::new();
    let id = published(&engine, "Reviewed", "Someone", "Drama");
    let other = published(&engine, "Other", "Someone", "Drama");

    for (book_id, rating) in [(id, 3), (other, 5), (id, 1)] {
        engine
            .create_review(NewReview { book_id, rating, ..Default::default() })
            .unwrap();
    }

    let book = engine.get_book_with_reviews(id).unwrap();
    let ratings: Vec<i32> = book.reviews.iter().map(|r| r.rating).collect();
    assert_eq!(ratings, vec![3, 1]);
    assert_eq!(engine.get_book_reviews(other).len(), 1);
}

#[test]
fn test_create_review_defaults_source_and_leaves_aggregates() {
    let engine = Engine::new();
    let id = published(&engine, "Stale", "Someone", "Drama");

    let review = engine
        .create_review(NewReview {
            book_id: id,
            user_id: Some(3),
            rating: 5,
            comment: Some("Loved it".into()),
            source: None,
        })
        .unwrap();

    assert_eq!(review.id, 1);
    assert_eq!(review.source, "BookOrigins");
    assert_eq!(review.user_id, Some(3));

    let book = engine.get_book(id).unwrap();
    assert_eq!(book.rating, 0.0);
    assert_eq!(book.review_count, 0);
}

#[test]
fn test_review_may_reference_missing_book() {
    let engine = Engine::new();

    let review = engine
        .create_review(NewReview { book_id: 404, rating: 2, ..Default::default() })
        .unwrap();

    assert_eq!(engine.get_book_reviews(404), vec![review]);
    assert!(engine.get_book_with_reviews(404).is_none());
}

// =============================================================================
// Chapter Tests
// =============================================================================

#[test]
fn test_chapters_sorted_by_number() {
    let engine = Engine::new();
    for number in [3, 1, 2] {
        engine
            .create_chapter(new_chapter(1, number, &format!("Chapter {number}")))
            .unwrap();
    }
    engine.create_chapter(new_chapter(2, 1, "Other book")).unwrap();

    let numbers: Vec<u32> = engine
        .get_book_chapters(1)
        .iter()
        .map(|c| c.chapter_number)
        .collect();
    assert_eq!(numbers, vec![1, 2, 3]);
}

#[test]
fn test_duplicate_chapter_numbers_keep_insertion_order() {
    let engine = Engine::new();
    engine.create_chapter(new_chapter(1, 2, "Second (a)")).unwrap();
    engine.create_chapter(new_chapter(1, 1, "First")).unwrap();
    engine.create_chapter(new_chapter(1, 2, "Second (b)")).unwrap();

    let titles: Vec<String> = engine
        .get_book_chapters(1)
        .into_iter()
        .map(|c| c.title)
        .collect();
    assert_eq!(titles, vec!["First", "Second (a)", "Second (b)"]);
}

#[test]
fn test_chapter_word_count_derived_when_omitted() {
    let engine = Engine::new();

    let counted = engine
        .create_chapter(NewChapter {
            book_id: 1,
            title: "Opening".into(),
            content: "It was a dark and stormy night".into(),
            chapter_number: 1,
            word_count: None,
        })
        .unwrap();
    let explicit = engine
        .create_chapter(NewChapter {
            book_id: 1,
            title: "Second".into(),
            content: "short".into(),
            chapter_number: 2,
            word_count: Some(1200),
        })
        .unwrap();

    assert_eq!(counted.word_count, 7);
    assert_eq!(explicit.word_count, 1200);
}

#[test]
fn test_update_chapter_recounts_new_content() {
    let engine = Engine::new();
    let chapter = engine.create_chapter(new_chapter(1, 1, "Draft")).unwrap();

    let updated = engine
        .update_chapter(
            chapter.id,
            ChapterPatch {
                content: Some("one two three four five".into()),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(updated.word_count, 5);
    assert_eq!(updated.title, "Draft");
    assert_eq!(updated.chapter_number, 1);

    let renumbered = engine
        .update_chapter(chapter.id, ChapterPatch { chapter_number: Some(4), ..Default::default() })
        .unwrap();
    assert_eq!(renumbered.chapter_number, 4);
    assert_eq!(renumbered.word_count, 5);
}

#[test]
fn test_update_unknown_chapter() {
    let engine = Engine::new();
    assert!(engine
        .update_chapter(1, ChapterPatch { title: Some("x".into()), ..Default::default() })
        .is_none());
    assert_eq!(engine.chapter_count(), 0);
}

// =============================================================================
// User Tests
// =============================================================================

#[test]
fn test_create_and_lookup_user() {
    let engine = Engine::new();

    let user = engine.create_user(new_user("paul", "paul@arrakis.net")).unwrap();

    assert_eq!(user.id, 1);
    assert!(!user.is_creator);
    assert_eq!(engine.get_user(1), Some(user.clone()));
    assert_eq!(engine.get_user_by_username("paul"), Some(user));
    assert!(engine.get_user_by_username("Paul").is_none());
    assert!(engine.get_user(2).is_none());
}

#[test]
fn test_duplicate_username_rejected() {
    let engine = Engine::new();
    engine.create_user(new_user("paul", "paul@arrakis.net")).unwrap();

    let err = engine
        .create_user(new_user("paul", "other@arrakis.net"))
        .unwrap_err();

    match err {
        CatalogError::DuplicateKey { field, value } => {
            assert_eq!(field, "username");
            assert_eq!(value, "paul");
        }
        other => panic!("Expected DuplicateKey, got {other:?}"),
    }
    assert_eq!(engine.user_count(), 1);
}

#[test]
fn test_duplicate_email_rejected_without_consuming_id() {
    let engine = Engine::new();
    engine.create_user(new_user("paul", "paul@arrakis.net")).unwrap();

    let err = engine
        .create_user(new_user("jessica", "paul@arrakis.net"))
        .unwrap_err();
    assert!(matches!(err, CatalogError::DuplicateKey { field: "email", .. }));

    let next = engine.create_user(new_user("jessica", "jessica@arrakis.net")).unwrap();
    assert_eq!(next.id, 2);
}

// =============================================================================
// Sample Catalog Tests
// =============================================================================

#[test]
fn test_open_seeds_sample_catalog() {
    let engine = seeded_engine();

    assert_eq!(engine.book_count(), 4);
    assert_eq!(engine.review_count(), 5);
    assert_eq!(
        titles(&engine.get_all_books()),
        vec!["Dune", "Pride and Prejudice", "1984", "The Hobbit"]
    );
    for book in engine.get_all_books() {
        assert!(book.rating >= 4.0 && book.rating <= 5.0);
        assert!((5_000..20_000).contains(&book.review_count));
    }
    assert_eq!(engine.get_book_reviews(1).len(), 2);
}

#[test]
fn test_open_without_seed_is_empty() {
    let config = Config::builder().seed_sample_data(false).build();
    let engine = Engine::open(&config).unwrap();

    assert_eq!(engine.book_count(), 0);
}

#[test]
fn test_sample_genre_and_author_queries() {
    let engine = seeded_engine();

    for genre in ["science fiction", "SCIENCE FICTION", "Science Fiction"] {
        assert_eq!(titles(&engine.get_books_by_genre(genre)), vec!["Dune"]);
    }
    assert_eq!(titles(&engine.search_books("orwell")), vec!["1984"]);
}

#[test]
fn test_engines_are_isolated() {
    let first = seeded_engine();
    let second = seeded_engine();

    first.create_book(new_book("Only here", "A", "G")).unwrap();

    assert_eq!(first.book_count(), 5);
    assert_eq!(second.book_count(), 4);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_creates_get_unique_contiguous_ids() {
    let engine = Arc::new(Engine::new());

    let mut handles = vec![];
    for t in 0..8 {
        let engine_clone = Arc::clone(&engine);
        handles.push(thread::spawn(move || {
            (0..50)
                .map(|i| {
                    engine_clone
                        .create_review(NewReview {
                            book_id: t,
                            rating: (i % 5) + 1,
                            ..Default::default()
                        })
                        .unwrap()
                        .id
                })
                .collect::<Vec<u64>>()
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(ids.insert(id), "id {id} assigned twice");
        }
    }

    assert_eq!(ids.len(), 400);
    assert_eq!(ids.iter().copied().min(), Some(1));
    assert_eq!(ids.iter().copied().max(), Some(400));
}

#[test]
fn test_concurrent_updates_do_not_lose_writes() {
    let engine = Arc::new(Engine::new());
    let chapter = engine.create_chapter(new_chapter(1, 1, "Shared")).unwrap();

    let mut handles = vec![];
    for t in 0..4u32 {
        let engine_clone = Arc::clone(&engine);
        handles.push(thread::spawn(move || {
            for i in 0..25u32 {
                engine_clone
                    .update_chapter(
                        chapter.id,
                        ChapterPatch { word_count: Some(t * 100 + i), ..Default::default() },
                    )
                    .unwrap();
                engine_clone.get_book_chapters(1);
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(engine.chapter_count(), 1);
    let chapter = &engine.get_book_chapters(1)[0];
    assert!(chapter.word_count % 100 == 24);
}

#[test]
fn test_concurrent_duplicate_registrations_admit_one() {
    let engine = Arc::new(Engine::new());

    let mut handles = vec![];
    for _ in 0..8 {
        let engine_clone = Arc::clone(&engine);
        handles.push(thread::spawn(move || {
            engine_clone
                .create_user(new_user("same", "same@example.com"))
                .is_ok()
        }));
    }

    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();
    assert_eq!(successes, 1);
    assert_eq!(engine.user_count(), 1);
}
