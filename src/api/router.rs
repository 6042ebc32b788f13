//! Request router
//!
//! Turns requests into engine calls and engine results into responses.
//! Errors are translated here and nowhere else.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::engine::Engine;
use crate::error::{CatalogError, Result};
use crate::model::{
    BookPatch, ChapterPatch, NewBook, NewChapter, NewReview, NewUser, Publication, Validate,
};
use crate::protocol::{Request, Response, Status};

use super::{Route, Unroutable};

/// Routes requests to a shared engine
#[derive(Clone)]
pub struct Router {
    engine: Arc<Engine>,
}

impl Router {
    /// Create a router over the given engine
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine }
    }

    /// Get the engine behind this router
    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    /// Handle one request; never fails, errors become error responses
    pub fn handle(&self, request: &Request) -> Response {
        let route = match Route::resolve(request) {
            Ok(route) => route,
            Err(Unroutable::NotFound) => return Response::not_found("Route not found"),
            Err(Unroutable::MethodNotAllowed { allow }) => {
                return Response::message(Status::MethodNotAllowed, "Method not allowed")
                    .with_header("Allow", allow)
            }
        };

        tracing::trace!(method = %request.method, path = %request.path, ?route, "dispatching");

        match self.dispatch(&route, request) {
            Ok(response) => response,
            Err(e) => error_response(&e, route.invalid_message(), route.failure_message()),
        }
    }

    /// Execute a route against the engine
    fn dispatch(&self, route: &Route, request: &Request) -> Result<Response> {
        let engine = &self.engine;

        match route {
            Route::Health => Response::ok(&serde_json::json!({ "status": "ok" })),

            Route::ListBooks { genre, search } => {
                let books = match (search, genre) {
                    (Some(query), _) => engine.search_books(query),
                    (None, Some(genre)) => engine.get_books_by_genre(genre),
                    (None, None) => engine.get_all_books(),
                };
                Response::ok(&books)
            }

            Route::GetBook { id } => {
                let book = found("Book", *id, engine.get_book_with_reviews(*id))?;
                Response::ok(&book)
            }

            Route::CreateBook => {
                let new_book: NewBook = decode_body(request)?;
                Response::created(&engine.create_book(new_book)?)
            }

            Route::UpdateBook { id } => {
                let patch: BookPatch = decode_body(request)?;
                let book = found("Book", *id, engine.update_book(*id, patch))?;
                Response::ok(&book)
            }

            Route::SetPublication { id } => {
                let publication: Publication = decode_body(request)?;
                let book = found(
                    "Book",
                    *id,
                    engine.set_book_published(*id, publication.is_published),
                )?;
                Response::ok(&book)
            }

            Route::BookChapters { id } => Response::ok(&engine.get_book_chapters(*id)),

            Route::BookReviews { id } => Response::ok(&engine.get_book_reviews(*id)),

            Route::CreateChapter => {
                let new_chapter: NewChapter = decode_body(request)?;
                Response::created(&engine.create_chapter(new_chapter)?)
            }

            Route::UpdateChapter { id } => {
                let patch: ChapterPatch = decode_body(request)?;
                let chapter = found("Chapter", *id, engine.update_chapter(*id, patch))?;
                Response::ok(&chapter)
            }

            Route::CreateReview => {
                let new_review: NewReview = decode_body(request)?;
                Response::created(&engine.create_review(new_review)?)
            }

            Route::CreateUser => {
                let new_user: NewUser = decode_body(request)?;
                Response::created(&engine.create_user(new_user)?)
            }

            Route::GetUser { id } => {
                let user = found("User", *id, engine.get_user(*id))?;
                Response::ok(&user)
            }
        }
    }
}

/// Translate an error into the response a client sees
///
/// `invalid` prefixes 400 messages; `failure` is the whole body of a 500,
/// so internal detail never leaves the process.
pub fn error_response(error: &CatalogError, invalid: &str, failure: &str) -> Response {
    match error {
        CatalogError::InvalidInput(detail) | CatalogError::Protocol(detail) => {
            Response::bad_request(&format!("{invalid}: {detail}"))
        }
        CatalogError::NotFound { entity, .. } => Response::not_found(&format!("{entity} not found")),
        CatalogError::DuplicateKey { field, .. } => {
            Response::message(Status::Conflict, &format!("A user with this {field} already exists"))
        }
        CatalogError::PayloadTooLarge { max, .. } => Response::message(
            Status::PayloadTooLarge,
            &format!("Request body exceeds {max} bytes"),
        ),
        CatalogError::Internal(_) | CatalogError::Io(_) | CatalogError::Config(_) => {
            tracing::error!(error = %error, "{failure}");
            Response::internal_error(failure)
        }
    }
}

/// Deserialize and validate a JSON body
fn decode_body<T: DeserializeOwned + Validate>(request: &Request) -> Result<T> {
    let value: T = serde_json::from_slice(&request.body)
        .map_err(|e| CatalogError::InvalidInput(e.to_string()))?;
    value.validate()?;
    Ok(value)
}

/// Turn an absent lookup into `NotFound`
fn found<T>(entity: &'static str, id: u64, value: Option<T>) -> Result<T> {
    value.ok_or(CatalogError::NotFound { entity, id })
}
