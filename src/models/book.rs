//! Book model and related types

use bson::oid::ObjectId;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

/// Default stock level at or below which a book counts as low stock
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// Book as stored in the `books` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub price: f64,
    pub stock_quantity: i64,
    pub publication_date: bson::DateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl BookDocument {
    /// Build a new document with a freshly generated id
    pub fn new(book: CreateBook) -> Self {
        Self {
            id: ObjectId::new(),
            title: book.title,
            author: book.author,
            genre: book.genre,
            price: book.price,
            stock_quantity: book.stock_quantity,
            publication_date: date_to_bson(book.publication_date),
            description: book.description,
        }
    }
}

impl From<BookDocument> for Book {
    fn from(doc: BookDocument) -> Self {
        Book {
            id: doc.id.to_hex(),
            title: doc.title,
            author: doc.author,
            genre: doc.genre,
            price: doc.price,
            stock_quantity: doc.stock_quantity,
            publication_date: bson_to_date(doc.publication_date),
            description: doc.description,
        }
    }
}

/// Publication dates are stored as UTC midnight
pub fn date_to_bson(date: NaiveDate) -> bson::DateTime {
    bson::DateTime::from_chrono(date.and_time(NaiveTime::MIN).and_utc())
}

pub fn bson_to_date(value: bson::DateTime) -> NaiveDate {
    value.to_chrono().date_naive()
}

/// Public book representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    /// Database identifier (24 hex characters)
    pub id: String,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub price: f64,
    pub stock_quantity: i64,
    pub publication_date: NaiveDate,
    pub description: Option<String>,
}

/// Create book request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    pub title: String,
    pub author: String,
    pub genre: String,
    #[validate(range(exclusive_min = 0.0, message = "Price must be greater than 0"))]
    pub price: f64,
    #[validate(range(min = 0, message = "Stock quantity cannot be negative"))]
    pub stock_quantity: i64,
    pub publication_date: NaiveDate,
    pub description: Option<String>,
}

/// Partial update request; only fields that are present are applied
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "Price must be greater than 0"))]
    pub price: Option<f64>,
    #[validate(range(min = 0, message = "Stock quantity cannot be negative"))]
    pub stock_quantity: Option<i64>,
    pub publication_date: Option<NaiveDate>,
    pub description: Option<String>,
}

impl UpdateBook {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.genre.is_none()
            && self.price.is_none()
            && self.stock_quantity.is_none()
            && self.publication_date.is_none()
            && self.description.is_none()
    }
}

/// Stock update request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateStock {
    #[validate(range(min = 0, message = "Stock quantity cannot be negative"))]
    pub stock_quantity: i64,
}

/// Filters accepted by the book listing
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Exact author match
    pub author: Option<String>,
    /// Exact genre match
    pub genre: Option<String>,
}

/// Book search parameters
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
#[validate(schema(function = "finite_price_bounds"))]
pub struct BookSearchQuery {
    /// Full-text search over title and description
    pub q: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    #[validate(range(min = 0.0, message = "price_min must not be negative"))]
    pub price_min: Option<f64>,
    #[validate(range(min = 0.0, message = "price_max must not be negative"))]
    pub price_max: Option<f64>,
    pub publication_date_start: Option<NaiveDate>,
    pub publication_date_end: Option<NaiveDate>,
}

// "NaN" and "inf" parse as f64 from a query string and slip past range checks
fn finite_price_bounds(query: &BookSearchQuery) -> Result<(), ValidationError> {
    let bounds = [query.price_min, query.price_max];
    if bounds.iter().flatten().all(|price| price.is_finite()) {
        Ok(())
    } else {
        let mut error = ValidationError::new("finite");
        error.message = Some("price bounds must be finite numbers".into());
        Err(error)
    }
}

/// Low-stock report parameters
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LowStockQuery {
    /// Stock threshold (default: 10)
    #[validate(range(min = 0, message = "threshold must not be negative"))]
    pub threshold: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CreateBook {
        CreateBook {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            genre: "Science Fiction".to_string(),
            price: 12.5,
            stock_quantity: 4,
            publication_date: NaiveDate::from_ymd_opt(1965, 8, 1).unwrap(),
            description: Some("Desert planet".to_string()),
        }
    }

    #[test]
    fn test_document_round_trip_preserves_fields() {
        let input = sample();
        let doc = BookDocument::new(input.clone());
        let stored = bson::to_document(&doc).unwrap();
        let loaded: BookDocument = bson::from_document(stored).unwrap();
        let book = Book::from(loaded);

        assert_eq!(book.id, doc.id.to_hex());
        assert_eq!(book.title, input.title);
        assert_eq!(book.author, input.author);
        assert_eq!(book.genre, input.genre);
        assert_eq!(book.price, input.price);
        assert_eq!(book.stock_quantity, input.stock_quantity);
        assert_eq!(book.publication_date, input.publication_date);
        assert_eq!(book.description, input.description);
    }

    #[test]
    fn test_missing_description_is_not_stored() {
        let mut input = sample();
        input.description = None;
        let stored = bson::to_document(&BookDocument::new(input)).unwrap();
        assert!(!stored.contains_key("description"));
        assert!(stored.get_object_id("_id").is_ok());
    }

    #[test]
    fn test_create_validation() {
        assert!(sample().validate().is_ok());

        let mut free = sample();
        free.price = 0.0;
        assert!(free.validate().is_err());

        let mut negative = sample();
        negative.stock_quantity = -1;
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_update_validation_skips_absent_fields() {
        assert!(UpdateBook::default().validate().is_ok());
        assert!(UpdateBook::default().is_empty());

        let update = UpdateBook {
            price: Some(-3.0),
            ..Default::default()
        };
        assert!(update.validate().is_err());
        assert!(!update.is_empty());
    }

    #[test]
    fn test_search_price_bounds_must_be_finite() {
        let ok = BookSearchQuery {
            price_min: Some(10.0),
            price_max: Some(20.0),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());
        assert!(BookSearchQuery::default().validate().is_ok());

        for bad in [f64::NAN, f64::INFINITY] {
            let min = BookSearchQuery {
                price_min: Some(bad),
                ..Default::default()
            };
            assert!(min.validate().is_err(), "accepted price_min={}", bad);

            let max = BookSearchQuery {
                price_max: Some(bad),
                ..Default::default()
            };
            assert!(max.validate().is_err(), "accepted price_max={}", bad);
        }
    }
}
