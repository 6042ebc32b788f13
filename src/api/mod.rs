//! API Module
//!
//! The HTTP route layer over the engine.
//!
//! | Method | Path                        | Operation              |
//! |--------|-----------------------------|------------------------|
//! | GET    | /api/books?genre=&search=   | list / filter / search |
//! | GET    | /api/books/:id              | book with reviews      |
//! | POST   | /api/books                  | create book            |
//! | PATCH  | /api/books/:id              | patch book             |
//! | PUT    | /api/books/:id/publication  | publish / unpublish    |
//! | GET    | /api/books/:id/chapters     | ordered chapters       |
//! | GET    | /api/books/:id/reviews      | reviews of a book      |
//! | POST   | /api/chapters               | create chapter         |
//! | PATCH  | /api/chapters/:id           | patch chapter          |
//! | POST   | /api/reviews                | create review          |
//! | POST   | /api/users                  | register user          |
//! | GET    | /api/users/:id              | user lookup            |
//! | GET    | /api/health                 | liveness               |
//!
//! The layer holds no state and no business rules of its own.

mod route;
mod router;

pub use route::{Route, Unroutable};
pub use router::{error_response, Router};
