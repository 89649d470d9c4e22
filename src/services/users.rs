//! Authentication and user registration service

use std::sync::Arc;

use chrono::Duration;

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, User},
    repository::UserStore,
    services::{
        password::{hash_password, verify_password},
        token::TokenService,
    },
};

const INVALID_LOGIN: &str = "Incorrect username or password";

#[derive(Clone)]
pub struct UsersService {
    store: Arc<dyn UserStore>,
    tokens: TokenService,
}

impl UsersService {
    pub fn new(store: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }

    /// Register a new user.
    ///
    /// Uniqueness is a read-then-write check: two concurrent registrations
    /// with the same email can both succeed.
    pub async fn register(&self, user: CreateUser) -> AppResult<User> {
        if self.store.get_by_email(&user.email).await?.is_some() {
            return Err(AppError::BadRequest("Email already registered".to_string()));
        }
        if self.store.get_by_username(&user.username).await?.is_some() {
            return Err(AppError::BadRequest("Username already registered".to_string()));
        }

        let hashed_password = hash_password(&user.password)?;
        let created = self.store.create(user, hashed_password).await?;
        tracing::info!(username = %created.username, "Registered user");
        Ok(created)
    }

    /// Authenticate by username and password and return an access token.
    /// Unknown usernames and wrong passwords produce the same error.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
        ttl: Option<Duration>,
    ) -> AppResult<String> {
        let user = self
            .store
            .get_by_username(username)
            .await?
            .ok_or_else(|| AppError::BadRequest(INVALID_LOGIN.to_string()))?;

        if !verify_password(password, &user.hashed_password)? {
            return Err(AppError::BadRequest(INVALID_LOGIN.to_string()));
        }

        self.tokens
            .issue(&user.username, ttl)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Resolve a bearer token to the user it was issued for. Every failure,
    /// including a valid token for a user that no longer exists, maps to the
    /// same authentication error.
    pub async fn resolve_token(&self, token: &str) -> AppResult<User> {
        let claims = self.tokens.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "Rejected access token");
            AppError::invalid_credentials()
        })?;

        self.store
            .get_by_username(&claims.sub)
            .await?
            .ok_or_else(|| {
                tracing::debug!(subject = %claims.sub, "Token subject not found");
                AppError::invalid_credentials()
            })
    }
}
