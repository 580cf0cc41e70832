use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, borrow_book, create_book, delete_book, get_book, list_books, return_book,
    update_book,
};

/// Creates the API router with all catalog endpoints
///
/// Query endpoints (Read operations):
/// - GET /books - List books (optional status filter) with statistics
/// - GET /books/:id - Get book details
///
/// Command endpoints (Write operations):
/// - POST /books - Register a new book
/// - PUT /books/:id - Update book fields
/// - POST /books/:id/borrow - Borrow a book
/// - POST /books/:id/return - Return a book
/// - DELETE /books/:id - Delete a book
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Collection: list (Read) + create (Write)
        .route("/books", get(list_books).post(create_book))
        // Single book: read, update, delete
        .route(
            "/books/:id",
            get(get_book).put(update_book).delete(delete_book),
        )
        // Lifecycle transitions (Write operations)
        .route("/books/:id/borrow", post(borrow_book))
        .route("/books/:id/return", post(return_book))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
