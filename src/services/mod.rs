//! Business logic services

pub mod books;
pub mod password;
pub mod token;
pub mod users;

use chrono::Duration;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
    pub users: users::UsersService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: &AuthConfig) -> Self {
        let tokens = token::TokenService::new(
            &auth_config.jwt_secret,
            Duration::minutes(auth_config.access_token_expire_minutes),
        );

        Self {
            books: books::BooksService::new(repository.books),
            users: users::UsersService::new(repository.users, tokens),
        }
    }
}
