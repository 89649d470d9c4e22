//! Data models for the bookstore

pub mod book;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookDocument, CreateBook, UpdateBook, UpdateStock};
pub use user::{CreateUser, Role, User, UserDocument, UserResponse};
