//! Books repository for database operations

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use chrono::NaiveDate;
use futures_util::TryStreamExt;
use mongodb::{options::ReturnDocument, Collection, Database, IndexModel};

use crate::{
    error::AppResult,
    models::book::{
        date_to_bson, Book, BookDocument, BookQuery, BookSearchQuery, CreateBook, UpdateBook,
        DEFAULT_LOW_STOCK_THRESHOLD,
    },
};

pub const COLLECTION: &str = "books";

/// Upper bound on documents returned by any listing
pub const MAX_RESULTS: i64 = 100;

/// Criteria for listing books. Every field that is set narrows the result
/// (logical AND); unset fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookFilter {
    pub text: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub published_from: Option<NaiveDate>,
    pub published_to: Option<NaiveDate>,
    /// Only books with `stock_quantity <= max_stock`
    pub max_stock: Option<i64>,
}

impl BookFilter {
    pub fn low_stock(threshold: Option<i64>) -> Self {
        Self {
            max_stock: Some(threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD)),
            ..Default::default()
        }
    }

    /// Build the MongoDB criteria document
    pub fn to_document(&self) -> Document {
        let mut filter = Document::new();

        if let Some(ref text) = self.text {
            if !text.is_empty() {
                filter.insert("$text", doc! { "$search": text.as_str() });
            }
        }
        if let Some(ref author) = self.author {
            if !author.is_empty() {
                filter.insert("author", author.as_str());
            }
        }
        if let Some(ref genre) = self.genre {
            if !genre.is_empty() {
                filter.insert("genre", genre.as_str());
            }
        }

        let mut price = Document::new();
        if let Some(min) = self.price_min {
            price.insert("$gte", min);
        }
        if let Some(max) = self.price_max {
            price.insert("$lte", max);
        }
        if !price.is_empty() {
            filter.insert("price", price);
        }

        let mut published = Document::new();
        if let Some(from) = self.published_from {
            published.insert("$gte", date_to_bson(from));
        }
        if let Some(to) = self.published_to {
            published.insert("$lte", date_to_bson(to));
        }
        if !published.is_empty() {
            filter.insert("publication_date", published);
        }

        if let Some(max_stock) = self.max_stock {
            filter.insert("stock_quantity", doc! { "$lte": max_stock });
        }

        filter
    }
}

impl From<BookQuery> for BookFilter {
    fn from(query: BookQuery) -> Self {
        Self {
            author: query.author,
            genre: query.genre,
            ..Default::default()
        }
    }
}

impl From<BookSearchQuery> for BookFilter {
    fn from(query: BookSearchQuery) -> Self {
        Self {
            text: query.q,
            author: query.author,
            genre: query.genre,
            price_min: query.price_min,
            price_max: query.price_max,
            published_from: query.publication_date_start,
            published_to: query.publication_date_end,
            max_stock: None,
        }
    }
}

/// `$set` payload holding only the fields present in the update
pub fn update_document(update: &UpdateBook) -> Document {
    let mut set = Document::new();
    if let Some(ref title) = update.title {
        set.insert("title", title.as_str());
    }
    if let Some(ref author) = update.author {
        set.insert("author", author.as_str());
    }
    if let Some(ref genre) = update.genre {
        set.insert("genre", genre.as_str());
    }
    if let Some(price) = update.price {
        set.insert("price", price);
    }
    if let Some(stock) = update.stock_quantity {
        set.insert("stock_quantity", stock);
    }
    if let Some(date) = update.publication_date {
        set.insert("publication_date", date_to_bson(date));
    }
    if let Some(ref description) = update.description {
        set.insert("description", description.as_str());
    }
    set
}

/// Storage operations on the books collection
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn create(&self, book: CreateBook) -> AppResult<Book>;

    async fn get_by_id(&self, id: ObjectId) -> AppResult<Option<Book>>;

    /// At most [`MAX_RESULTS`] books matching the filter
    async fn list(&self, filter: BookFilter) -> AppResult<Vec<Book>>;

    /// Apply a partial update, returning the updated book or `None` if absent
    async fn update(&self, id: ObjectId, update: UpdateBook) -> AppResult<Option<Book>>;

    async fn update_stock(&self, id: ObjectId, stock_quantity: i64) -> AppResult<Option<Book>>;

    /// Returns whether a book was deleted
    async fn delete(&self, id: ObjectId) -> AppResult<bool>;

    /// Round trip to the backing database
    async fn ping(&self) -> AppResult<()>;
}

#[derive(Clone)]
pub struct BooksRepository {
    db: Database,
    collection: Collection<BookDocument>,
}

impl BooksRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            db: db.clone(),
            collection: db.collection(COLLECTION),
        }
    }

    /// Create the combined text index used by free-text search
    pub async fn ensure_indexes(&self) -> AppResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "title": "text", "description": "text" })
            .build();
        self.collection.create_index(index).await?;
        Ok(())
    }

    async fn set_fields(&self, id: ObjectId, set: Document) -> AppResult<Option<Book>> {
        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?;
        Ok(updated.map(Book::from))
    }
}

#[async_trait]
impl BookStore for BooksRepository {
    async fn create(&self, book: CreateBook) -> AppResult<Book> {
        let document = BookDocument::new(book);
        self.collection.insert_one(&document).await?;
        tracing::debug!(id = %document.id, "Inserted book");
        Ok(Book::from(document))
    }

    async fn get_by_id(&self, id: ObjectId) -> AppResult<Option<Book>> {
        let book = self.collection.find_one(doc! { "_id": id }).await?;
        Ok(book.map(Book::from))
    }

    async fn list(&self, filter: BookFilter) -> AppResult<Vec<Book>> {
        let criteria = filter.to_document();
        tracing::debug!(filter = %criteria, "Listing books");
        let books: Vec<BookDocument> = self
            .collection
            .find(criteria)
            .limit(MAX_RESULTS)
            .await?
            .try_collect()
            .await?;
        Ok(books.into_iter().map(Book::from).collect())
    }

    async fn update(&self, id: ObjectId, update: UpdateBook) -> AppResult<Option<Book>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }
        self.set_fields(id, update_document(&update)).await
    }

    async fn update_stock(&self, id: ObjectId, stock_quantity: i64) -> AppResult<Option<Book>> {
        self.set_fields(id, doc! { "stock_quantity": stock_quantity }).await
    }

    async fn delete(&self, id: ObjectId) -> AppResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn ping(&self) -> AppResult<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(BookFilter::default().to_document().is_empty());
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let filter = BookFilter {
            price_min: Some(10.0),
            price_max: Some(20.0),
            ..Default::default()
        };
        assert_eq!(
            filter.to_document(),
            doc! { "price": { "$gte": 10.0, "$lte": 20.0 } }
        );
    }

    #[test]
    fn test_range_bounds_are_independent() {
        let filter = BookFilter {
            price_max: Some(5.0),
            published_from: NaiveDate::from_ymd_opt(2000, 1, 1),
            ..Default::default()
        };
        let criteria = filter.to_document();
        assert_eq!(criteria.get_document("price").unwrap(), &doc! { "$lte": 5.0 });
        let published = criteria.get_document("publication_date").unwrap();
        assert!(published.contains_key("$gte"));
        assert!(!published.contains_key("$lte"));
    }

    #[test]
    fn test_search_combines_all_criteria() {
        let query = BookSearchQuery {
            q: Some("dune".to_string()),
            author: Some("Frank Herbert".to_string()),
            genre: Some("Science Fiction".to_string()),
            price_min: Some(1.0),
            price_max: None,
            publication_date_start: NaiveDate::from_ymd_opt(1960, 1, 1),
            publication_date_end: NaiveDate::from_ymd_opt(1970, 12, 31),
        };
        let criteria = BookFilter::from(query).to_document();

        assert_eq!(criteria.get_document("$text").unwrap(), &doc! { "$search": "dune" });
        assert_eq!(criteria.get_str("author").unwrap(), "Frank Herbert");
        assert_eq!(criteria.get_str("genre").unwrap(), "Science Fiction");
        assert_eq!(criteria.get_document("price").unwrap(), &doc! { "$gte": 1.0 });
        assert_eq!(
            criteria.get_document("publication_date").unwrap(),
            &doc! {
                "$gte": date_to_bson(NaiveDate::from_ymd_opt(1960, 1, 1).unwrap()),
                "$lte": date_to_bson(NaiveDate::from_ymd_opt(1970, 12, 31).unwrap()),
            }
        );
        assert!(!criteria.contains_key("stock_quantity"));
    }

    #[test]
    fn test_empty_strings_impose_no_constraint() {
        let query = BookQuery {
            author: Some(String::new()),
            genre: Some("Poetry".to_string()),
        };
        assert_eq!(BookFilter::from(query).to_document(), doc! { "genre": "Poetry" });
    }

    #[test]
    fn test_low_stock_defaults_to_ten() {
        assert_eq!(
            BookFilter::low_stock(None).to_document(),
            doc! { "stock_quantity": { "$lte": 10_i64 } }
        );
        assert_eq!(
            BookFilter::low_stock(Some(0)).to_document(),
            doc! { "stock_quantity": { "$lte": 0_i64 } }
        );
    }

    #[test]
    fn test_price_only_update_touches_only_price() {
        let update = UpdateBook {
            price: Some(9.99),
            ..Default::default()
        };
        assert_eq!(update_document(&update), doc! { "price": 9.99 });
    }

    #[test]
    fn test_update_document_skips_null_fields() {
        let update = UpdateBook {
            title: Some("New title".to_string()),
            stock_quantity: Some(0),
            ..Default::default()
        };
        assert_eq!(
            update_document(&update),
            doc! { "title": "New title", "stock_quantity": 0_i64 }
        );
    }
}
