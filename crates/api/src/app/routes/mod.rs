use axum::{routing::get, Router};

pub mod items;
pub mod system;

/// Router for everything under `/api`.
pub fn router() -> Router {
    Router::new()
        .route("/cage-check", get(system::get_cage_check).post(system::cage_check))
        .merge(items::router())
}
