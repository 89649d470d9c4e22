//! Users repository for database operations

use async_trait::async_trait;
use bson::doc;
use mongodb::{Collection, Database};

use crate::{
    error::AppResult,
    models::user::{CreateUser, User, UserDocument},
};

pub const COLLECTION: &str = "users";

/// Storage operations on the users collection
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user with an already hashed password
    async fn create(&self, user: CreateUser, hashed_password: String) -> AppResult<User>;

    async fn get_by_username(&self, username: &str) -> AppResult<Option<User>>;

    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>>;
}

#[derive(Clone)]
pub struct UsersRepository {
    collection: Collection<UserDocument>,
}

impl UsersRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(COLLECTION),
        }
    }
}

#[async_trait]
impl UserStore for UsersRepository {
    async fn create(&self, user: CreateUser, hashed_password: String) -> AppResult<User> {
        let document = UserDocument::new(user, hashed_password);
        self.collection.insert_one(&document).await?;
        tracing::debug!(id = %document.id, username = %document.username, "Inserted user");
        Ok(User::from(document))
    }

    async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = self
            .collection
            .find_one(doc! { "username": username })
            .await?;
        Ok(user.map(User::from))
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = self.collection.find_one(doc! { "email": email }).await?;
        Ok(user.map(User::from))
    }
}
