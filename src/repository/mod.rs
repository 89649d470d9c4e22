//! Repository layer for database operations

pub mod books;
pub mod users;

use std::sync::Arc;

use bson::oid::ObjectId;
use mongodb::Database;

use crate::error::{AppError, AppResult};

pub use books::{BookFilter, BookStore};
pub use users::UserStore;

/// Main repository struct holding the per-collection stores
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BookStore>,
    pub users: Arc<dyn UserStore>,
}

impl Repository {
    /// Create a repository backed by the given MongoDB database
    pub fn new(db: &Database) -> Self {
        Self {
            books: Arc::new(books::BooksRepository::new(db)),
            users: Arc::new(users::UsersRepository::new(db)),
        }
    }

    /// Create a repository from arbitrary store implementations
    pub fn with_stores(books: Arc<dyn BookStore>, users: Arc<dyn UserStore>) -> Self {
        Self { books, users }
    }

    /// Create the indexes the queries rely on
    pub async fn init(db: &Database) -> AppResult<()> {
        books::BooksRepository::new(db).ensure_indexes().await
    }
}

/// Parse a client-supplied identifier. A malformed id is a client error,
/// distinct from a well-formed id that matches nothing.
pub fn parse_object_id(id: &str, entity: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| AppError::BadRequest(format!("Invalid {} ID", entity)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_id() {
        let id = ObjectId::new();
        assert_eq!(parse_object_id(&id.to_hex(), "book").unwrap(), id);
    }

    #[test]
    fn test_invalid_object_id_is_bad_request() {
        for raw in ["", "123", "not-an-id", "zzzzzzzzzzzzzzzzzzzzzzzz", "65f1c0ffee65f1c0ffee65f1c0"] {
            match parse_object_id(raw, "book") {
                Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Invalid book ID"),
                other => panic!("expected BadRequest for {:?}, got {:?}", raw, other),
            }
        }
    }
}
