//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookstore Inventory API",
        version = "1.0.0",
        description = "API for managing bookstore inventory"
    ),
    paths(
        // Health
        health::root,
        health::health_check,
        health::readiness_check,
        // Users
        users::register,
        users::login,
        users::me,
        // Books
        books::create_book,
        books::get_book,
        books::update_book,
        books::delete_book,
        books::list_books,
        books::search_books,
        books::low_stock_books,
        books::update_stock,
    ),
    components(
        schemas(
            // Users
            users::LoginForm,
            users::TokenResponse,
            crate::models::user::CreateUser,
            crate::models::user::UserResponse,
            crate::models::user::Role,
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book::UpdateStock,
            // Health
            health::HealthResponse,
            health::WelcomeResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "Registration and authentication"),
        (name = "books", description = "Book inventory management")
    )
)]
pub struct ApiDoc;

/// Registers the bearer token scheme referenced by protected paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
