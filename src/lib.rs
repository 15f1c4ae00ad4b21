// CSV Summary - upload CSV files, summarise them and keep a short history

pub mod config;
pub mod db;
pub mod models;
pub mod types;
pub mod analysis;
pub mod history;
pub mod routes;
pub mod middleware;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
