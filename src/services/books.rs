//! Book inventory service

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, BookSearchQuery, CreateBook, UpdateBook},
    repository::{parse_object_id, BookFilter, BookStore},
};

fn not_found() -> AppError {
    AppError::NotFound("Book not found".to_string())
}

#[derive(Clone)]
pub struct BooksService {
    store: Arc<dyn BookStore>,
}

impl BooksService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, book: CreateBook) -> AppResult<Book> {
        let created = self.store.create(book).await?;
        tracing::info!(id = %created.id, title = %created.title, "Created book");
        Ok(created)
    }

    /// Get book by ID
    pub async fn get(&self, id: &str) -> AppResult<Book> {
        let id = parse_object_id(id, "book")?;
        self.store.get_by_id(id).await?.ok_or_else(not_found)
    }

    /// Apply the non-null fields of `update`
    pub async fn update(&self, id: &str, update: UpdateBook) -> AppResult<Book> {
        let id = parse_object_id(id, "book")?;
        self.store.update(id, update).await?.ok_or_else(not_found)
    }

    pub async fn update_stock(&self, id: &str, stock_quantity: i64) -> AppResult<Book> {
        let id = parse_object_id(id, "book")?;
        self.store
            .update_stock(id, stock_quantity)
            .await?
            .ok_or_else(not_found)
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let oid = parse_object_id(id, "book")?;
        if !self.store.delete(oid).await? {
            return Err(not_found());
        }
        tracing::info!(id = %id, "Deleted book");
        Ok(())
    }

    pub async fn list(&self, query: BookQuery) -> AppResult<Vec<Book>> {
        self.store.list(BookFilter::from(query)).await
    }

    pub async fn search(&self, query: BookSearchQuery) -> AppResult<Vec<Book>> {
        self.store.list(BookFilter::from(query)).await
    }

    /// Books whose stock is at or below `threshold` (default 10)
    pub async fn low_stock(&self, threshold: Option<i64>) -> AppResult<Vec<Book>> {
        self.store.list(BookFilter::low_stock(threshold)).await
    }

    /// Whether the database answers a ping
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::books::MockBookStore;
    use bson::oid::ObjectId;

    #[tokio::test]
    async fn test_invalid_id_never_reaches_store() {
        let mut store = MockBookStore::new();
        store.expect_get_by_id().never();
        store.expect_delete().never();
        let service = BooksService::new(Arc::new(store));

        assert!(matches!(service.get("nope").await, Err(AppError::BadRequest(_))));
        assert!(matches!(service.delete("nope").await, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_missing_book_is_not_found() {
        let mut store = MockBookStore::new();
        store.expect_get_by_id().returning(|_| Ok(None));
        store.expect_update().returning(|_, _| Ok(None));
        store.expect_update_stock().returning(|_, _| Ok(None));
        store.expect_delete().returning(|_| Ok(false));
        let service = BooksService::new(Arc::new(store));
        let id = ObjectId::new().to_hex();

        assert!(matches!(service.get(&id).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            service.update(&id, UpdateBook::default()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(service.update_stock(&id, 3).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.delete(&id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_low_stock_uses_default_threshold() {
        let mut store = MockBookStore::new();
        store
            .expect_list()
            .withf(|filter| filter.max_stock == Some(10) && filter.price_min.is_none())
            .returning(|_| Ok(vec![]));
        let service = BooksService::new(Arc::new(store));

        assert!(service.low_stock(None).await.unwrap().is_empty());
    }
}
