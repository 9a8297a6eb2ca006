pub mod auth;
pub mod books;
pub mod catalog;
pub mod health;
pub mod loan;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::infrastructure::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/login", post(auth::login))
        // Books
        .route("/books", get(books::search_books))
        .route("/availability", get(books::get_availability))
        // Catalog upload (admin)
        .route("/catalog", put(catalog::upload_catalog))
        // Loans (admin)
        .route("/loans", get(loan::list_loans).post(loan::create_loan))
        .route("/returns/candidates", get(loan::list_return_candidates))
        .route("/returns", post(loan::return_loan))
        .with_state(state)
}
