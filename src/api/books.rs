//! Book inventory endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::book::{Book, BookQuery, BookSearchQuery, CreateBook, LowStockQuery, UpdateBook, UpdateStock},
};

use super::AuthenticatedUser;

/// Create a new book (admin only)
#[utoipa::path(
    post,
    path = "/books/",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not enough permissions")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(book): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    user.require_admin()?;
    book.validate()?;

    let created = state.services.books.create(book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 400, description = "Invalid book ID"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.get(&id).await?;
    Ok(Json(book))
}

/// Update an existing book; only provided fields are changed
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid book ID or input"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    Json(update): Json<UpdateBook>,
) -> AppResult<Json<Book>> {
    update.validate()?;

    let updated = state.services.books.update(&id, update).await?;
    Ok(Json(updated))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 400, description = "Invalid book ID"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.services.books.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List books, optionally filtered by author and genre
#[utoipa::path(
    get,
    path = "/books/",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Up to 100 books", body = Vec<Book>)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.books.list(query).await?;
    Ok(Json(books))
}

/// Search books by text, author, genre, price range and publication date
#[utoipa::path(
    get,
    path = "/books/search",
    tag = "books",
    params(BookSearchQuery),
    responses(
        (status = 200, description = "Up to 100 matching books", body = Vec<Book>),
        (status = 400, description = "Invalid search parameters")
    )
)]
pub async fn search_books(
    State(state): State<crate::AppState>,
    Query(query): Query<BookSearchQuery>,
) -> AppResult<Json<Vec<Book>>> {
    query.validate()?;

    let books = state.services.books.search(query).await?;
    Ok(Json(books))
}

/// List books whose stock is at or below a threshold
#[utoipa::path(
    get,
    path = "/books/inventory/low-stock",
    tag = "books",
    params(LowStockQuery),
    responses(
        (status = 200, description = "Books with low stock", body = Vec<Book>),
        (status = 400, description = "Invalid threshold")
    )
)]
pub async fn low_stock_books(
    State(state): State<crate::AppState>,
    Query(query): Query<LowStockQuery>,
) -> AppResult<Json<Vec<Book>>> {
    query.validate()?;

    let books = state.services.books.low_stock(query.threshold).await?;
    Ok(Json(books))
}

/// Set the stock quantity of a book
#[utoipa::path(
    patch,
    path = "/books/{id}/update-stock",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    request_body = UpdateStock,
    responses(
        (status = 200, description = "Stock updated", body = Book),
        (status = 400, description = "Invalid book ID or quantity"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_stock(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateStock>,
) -> AppResult<Json<Book>> {
    request.validate()?;

    let updated = state
        .services
        .books
        .update_stock(&id, request.stock_quantity)
        .await?;
    Ok(Json(updated))
}
