//! Model Tests
//!
//! Tests verify:
//! - JSON field names (camelCase) of records and insertables
//! - Patch allow-lists reject unknown and server-owned fields
//! - Explicit null clears optional fields
//! - Validation of caller-supplied data

use bookorigins::model::{
    BookPatch, ChapterPatch, NewBook, NewChapter, NewReview, NewUser, Publication, User,
    Validate, DEFAULT_REVIEW_SOURCE, KNOWN_REVIEW_SOURCES,
};
use bookorigins::{CatalogError, Config, Engine};
use serde_json::json;

fn assert_invalid<T: Validate>(value: &T, field: &str) {
    match value.validate() {
        Err(CatalogError::InvalidInput(message)) => {
            assert!(message.starts_with(field), "unexpected message: {message}");
        }
        other => panic!("Expected InvalidInput for {field}, got {other:?}"),
    }
}

// =============================================================================
// Serialization Tests
// =============================================================================

#[test]
fn test_book_serializes_camel_case() {
    let engine = Engine::open(&Config::default()).unwrap();
    let book = engine.get_book(1).unwrap();

    let value = serde_json::to_value(&book).unwrap();

    assert_eq!(value["title"], "Dune");
    assert_eq!(value["isPublished"], true);
    assert_eq!(value["reviewCount"], 12_483);
    assert_eq!(value["authorId"], 1);
    assert!(value["coverImageUrl"].is_string());
    assert!(value["createdAt"].is_string());
    assert!(value.get("is_published").is_none());
}

#[test]
fn test_book_with_reviews_flattens_book() {
    let engine = Engine::open(&Config::default()).unwrap();
    let book = engine.get_book_with_reviews(1).unwrap();

    let value = serde_json::to_value(&book).unwrap();

    assert_eq!(value["id"], 1);
    assert_eq!(value["title"], "Dune");
    assert_eq!(value["reviews"].as_array().unwrap().len(), 2);
    assert_eq!(value["reviews"][0]["source"], "Goodreads");
    assert_eq!(value["reviews"][0]["bookId"], 1);
}

#[test]
fn test_user_password_never_serialized() {
    let engine = Engine::new();
    let user = engine
        .create_user(NewUser {
            username: "reader".into(),
            password: "secret".into(),
            email: "reader@example.com".into(),
            is_creator: true,
        })
        .unwrap();

    let text = serde_json::to_string(&user).unwrap();
    assert!(!text.contains("secret"));
    assert!(text.contains("\"isCreator\":true"));

    let parsed: User = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed.password, "");
    assert_eq!(parsed.username, "reader");
}

#[test]
fn test_new_book_optional_fields_default() {
    let book: NewBook = serde_json::from_value(json!({
        "title": "T",
        "author": "A",
        "synopsis": "S",
        "genre": "G"
    }))
    .unwrap();

    assert_eq!(book.cover_image_url, None);
    assert_eq!(book.author_id, None);
}

#[test]
fn test_new_book_missing_required_field() {
    let result: Result<NewBook, _> = serde_json::from_value(json!({
        "title": "T",
        "author": "A",
        "genre": "G"
    }));

    assert!(result.is_err());
}

#[test]
fn test_new_user_is_creator_defaults_false() {
    let user: NewUser = serde_json::from_value(json!({
        "username": "u",
        "password": "p",
        "email": "u@x.io"
    }))
    .unwrap();

    assert!(!user.is_creator);
}

// =============================================================================
// Patch Allow-list Tests
// =============================================================================

#[test]
fn test_book_patch_rejects_server_owned_fields() {
    for field in ["id", "rating", "reviewCount", "isPublished", "createdAt", "updatedAt"] {
        let mut body = serde_json::Map::new();
        body.insert(field.to_string(), json!(1));
        let result: Result<BookPatch, _> = serde_json::from_value(body.into());
        assert!(result.is_err(), "{field} must not be patchable");
    }
}

#[test]
fn test_book_patch_absent_vs_null() {
    let patch: BookPatch = serde_json::from_value(json!({
        "title": "New",
        "movieWatchUrl": null
    }))
    .unwrap();

    assert_eq!(patch.title.as_deref(), Some("New"));
    assert_eq!(patch.movie_watch_url, Some(None));
    assert_eq!(patch.cover_image_url, None);
    assert_eq!(patch.author, None);
}

#[test]
fn test_book_patch_applies_null_as_clear() {
    let engine = Engine::open(&Config::default()).unwrap();
    let patch: BookPatch = serde_json::from_value(json!({ "trailerVideoUrl": null })).unwrap();

    let book = engine.update_book(2, patch).unwrap();

    assert_eq!(book.trailer_video_url, None);
    assert!(book.cover_image_url.is_some());
}

#[test]
fn test_empty_book_patch_is_valid() {
    let patch: BookPatch = serde_json::from_value(json!({})).unwrap();
    assert!(patch.validate().is_ok());
}

#[test]
fn test_chapter_patch_rejects_id() {
    let result: Result<ChapterPatch, _> = serde_json::from_value(json!({ "id": 5 }));
    assert!(result.is_err());
}

#[test]
fn test_publication_body() {
    let publication: Publication =
        serde_json::from_value(json!({ "isPublished": true })).unwrap();
    assert!(publication.is_published);

    let missing: Result<Publication, _> = serde_json::from_value(json!({}));
    assert!(missing.is_err());
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_new_book_requires_text() {
    let book = NewBook {
        title: "Dune".into(),
        author: "   ".into(),
        synopsis: "Sand".into(),
        genre: "Science Fiction".into(),
        ..Default::default()
    };
    assert_invalid(&book, "author");

    let ok = NewBook {
        author: "Frank Herbert".into(),
        ..book
    };
    assert!(ok.validate().is_ok());
}

#[test]
fn test_book_patch_rejects_blank_title() {
    let patch = BookPatch {
        title: Some(String::new()),
        ..Default::default()
    };
    assert_invalid(&patch, "title");
}

#[test]
fn test_review_rating_bounds() {
    for rating in [0, 6, -1] {
        let review = NewReview {
            book_id: 1,
            rating,
            ..Default::default()
        };
        assert_invalid(&review, "rating");
    }
    for rating in 1..=5 {
        let review = NewReview {
            book_id: 1,
            rating,
            ..Default::default()
        };
        assert!(review.validate().is_ok());
    }
}

#[test]
fn test_review_source_must_not_be_blank() {
    let review = NewReview {
        book_id: 1,
        rating: 3,
        source: Some(" ".into()),
        ..Default::default()
    };
    assert_invalid(&review, "source");
}

#[test]
fn test_review_sources() {
    assert_eq!(DEFAULT_REVIEW_SOURCE, "BookOrigins");
    assert!(KNOWN_REVIEW_SOURCES.contains(&DEFAULT_REVIEW_SOURCE));
}

#[test]
fn test_chapter_number_starts_at_one() {
    let chapter = NewChapter {
        book_id: 1,
        title: "Prologue".into(),
        content: String::new(),
        chapter_number: 0,
        word_count: None,
    };
    assert_invalid(&chapter, "chapterNumber");

    let patch = ChapterPatch {
        chapter_number: Some(0),
        ..Default::default()
    };
    assert_invalid(&patch, "chapterNumber");
}

#[test]
fn test_user_email_shape() {
    let mut user = NewUser {
        username: "u".into(),
        password: "p".into(),
        email: "no-at-sign".into(),
        is_creator: false,
    };
    assert_invalid(&user, "email");

    user.email = "@host".into();
    assert_invalid(&user, "email");

    user.email = "me@host".into();
    assert!(user.validate().is_ok());
}
