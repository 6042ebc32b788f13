//! Route definitions
//!
//! Maps a method and path onto the operation it names.

use crate::model::{BookId, ChapterId, UserId};
use crate::protocol::{Method, Request};

/// A resolved API operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Liveness check
    Health,

    /// List published books; `search` wins over `genre`
    ListBooks {
        genre: Option<String>,
        search: Option<String>,
    },

    /// Book plus its reviews
    GetBook { id: BookId },

    CreateBook,

    UpdateBook { id: BookId },

    /// Publish or unpublish a book
    SetPublication { id: BookId },

    BookChapters { id: BookId },

    BookReviews { id: BookId },

    CreateChapter,

    UpdateChapter { id: ChapterId },

    CreateReview,

    CreateUser,

    GetUser { id: UserId },
}

/// Why a request matched no route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unroutable {
    /// No such resource
    NotFound,

    /// The path exists but not for this method
    MethodNotAllowed { allow: &'static str },
}

impl Route {
    /// Resolve the route a request addresses
    ///
    /// A path id that is not a number addresses nothing.
    pub fn resolve(request: &Request) -> Result<Route, Unroutable> {
        let method = request.method;
        let segments = request.path_segments();

        match segments.as_slice() {
            ["api", "health"] => match method {
                Method::Get => Ok(Route::Health),
                _ => Err(Unroutable::MethodNotAllowed { allow: "GET" }),
            },
            ["api", "books"] => match method {
                Method::Get => Ok(Route::ListBooks {
                    genre: genre_filter(request),
                    search: non_empty_param(request, "search"),
                }),
                Method::Post => Ok(Route::CreateBook),
                _ => Err(Unroutable::MethodNotAllowed { allow: "GET, POST" }),
            },
            ["api", "books", raw] => {
                let id = parse_id(raw)?;
                match method {
                    Method::Get => Ok(Route::GetBook { id }),
                    Method::Patch => Ok(Route::UpdateBook { id }),
                    _ => Err(Unroutable::MethodNotAllowed { allow: "GET, PATCH" }),
                }
            }
            ["api", "books", raw, "chapters"] => {
                let id = parse_id(raw)?;
                match method {
                    Method::Get => Ok(Route::BookChapters { id }),
                    _ => Err(Unroutable::MethodNotAllowed { allow: "GET" }),
                }
            }
            ["api", "books", raw, "reviews"] => {
                let id = parse_id(raw)?;
                match method {
                    Method::Get => Ok(Route::BookReviews { id }),
                    _ => Err(Unroutable::MethodNotAllowed { allow: "GET" }),
                }
            }
            ["api", "books", raw, "publication"] => {
                let id = parse_id(raw)?;
                match method {
                    Method::Put => Ok(Route::SetPublication { id }),
                    _ => Err(Unroutable::MethodNotAllowed { allow: "PUT" }),
                }
            }
            ["api", "chapters"] => match method {
                Method::Post => Ok(Route::CreateChapter),
                _ => Err(Unroutable::MethodNotAllowed { allow: "POST" }),
            },
            ["api", "chapters", raw] => {
                let id = parse_id(raw)?;
                match method {
                    Method::Patch => Ok(Route::UpdateChapter { id }),
                    _ => Err(Unroutable::MethodNotAllowed { allow: "PATCH" }),
                }
            }
            ["api", "reviews"] => match method {
                Method::Post => Ok(Route::CreateReview),
                _ => Err(Unroutable::MethodNotAllowed { allow: "POST" }),
            },
            ["api", "users"] => match method {
                Method::Post => Ok(Route::CreateUser),
                _ => Err(Unroutable::MethodNotAllowed { allow: "POST" }),
            },
            ["api", "users", raw] => {
                let id = parse_id(raw)?;
                match method {
                    Method::Get => Ok(Route::GetUser { id }),
                    _ => Err(Unroutable::MethodNotAllowed { allow: "GET" }),
                }
            }
            _ => Err(Unroutable::NotFound),
        }
    }

    /// Message for a 400 answer to this route
    pub fn invalid_message(&self) -> &'static str {
        match self {
            Route::CreateBook => "Invalid book data",
            Route::UpdateBook { .. } => "Invalid book update",
            Route::SetPublication { .. } => "Invalid publication data",
            Route::CreateChapter => "Invalid chapter data",
            Route::UpdateChapter { .. } => "Invalid chapter update",
            Route::CreateReview => "Invalid review data",
            Route::CreateUser => "Invalid user data",
            _ => "Invalid request",
        }
    }

    /// Message for a 500 answer to this route
    pub fn failure_message(&self) -> &'static str {
        match self {
            Route::Health => "Health check failed",
            Route::ListBooks { .. } => "Failed to fetch books",
            Route::GetBook { .. } => "Failed to fetch book",
            Route::CreateBook => "Failed to create book",
            Route::UpdateBook { .. } | Route::SetPublication { .. } => "Failed to update book",
            Route::BookChapters { .. } => "Failed to fetch chapters",
            Route::BookReviews { .. } => "Failed to fetch reviews",
            Route::CreateChapter => "Failed to create chapter",
            Route::UpdateChapter { .. } => "Failed to update chapter",
            Route::CreateReview => "Failed to create review",
            Route::CreateUser => "Failed to create user",
            Route::GetUser { .. } => "Failed to fetch user",
        }
    }
}

fn parse_id(raw: &str) -> Result<u64, Unroutable> {
    raw.parse::<u64>().map_err(|_| Unroutable::NotFound)
}

fn non_empty_param(request: &Request, name: &str) -> Option<String> {
    request
        .query_param(name)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// `genre=all` (lowercase only) means no genre filter
fn genre_filter(request: &Request) -> Option<String> {
    non_empty_param(request, "genre").filter(|genre| genre != "all")
}
