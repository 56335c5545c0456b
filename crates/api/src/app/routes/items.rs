use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};

use crate::app::services::{GearService, ItemAction};
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/:id", get(get_item).delete(delete_item))
        .route("/items/:id/borrow", post(borrow_item))
        .route("/items/:id/return", post(return_item))
        .route("/items/:id/lost", post(mark_lost))
        .route("/items/:id/found", post(mark_found))
        .route("/items/:id/change-owner", post(change_owner))
        .route("/items/:id/notes", post(update_notes))
        .route("/stats", get(get_stats))
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub async fn list_items(
    Extension(services): Extension<Arc<GearService>>,
    Query(query): Query<dto::ItemQuery>,
) -> axum::response::Response {
    let filter = match query.into_filter() {
        Ok(f) => f,
        Err(msg) => return errors::bad_request(msg),
    };

    match services.list_items(&filter) {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_item(
    Extension(services): Extension<Arc<GearService>>,
    Json(body): Json<dto::CreateItemRequest>,
) -> axum::response::Response {
    let new = match body.into_new_item() {
        Ok(n) => n,
        Err(msg) => return errors::bad_request(msg),
    };

    match services.create_item(new, today()) {
        Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<GearService>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.get_item(&id) {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_item(
    Extension(services): Extension<Arc<GearService>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.delete_item(&id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_stats(
    Extension(services): Extension<Arc<GearService>>,
) -> axum::response::Response {
    match services.stats() {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn borrow_item(
    Extension(services): Extension<Arc<GearService>>,
    Path(id): Path<String>,
    body: Option<Json<dto::OwnerRequest>>,
) -> axum::response::Response {
    let owner = match dto::owner_from(body.map(|Json(b)| b)) {
        Ok(o) => o,
        Err(msg) => return errors::bad_request(msg),
    };
    apply(&services, &id, ItemAction::Borrow { owner })
}

pub async fn return_item(
    Extension(services): Extension<Arc<GearService>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    apply(&services, &id, ItemAction::Return)
}

pub async fn mark_lost(
    Extension(services): Extension<Arc<GearService>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    apply(&services, &id, ItemAction::Lose)
}

pub async fn mark_found(
    Extension(services): Extension<Arc<GearService>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    apply(&services, &id, ItemAction::Find)
}

pub async fn change_owner(
    Extension(services): Extension<Arc<GearService>>,
    Path(id): Path<String>,
    body: Option<Json<dto::OwnerRequest>>,
) -> axum::response::Response {
    let owner = match dto::owner_from(body.map(|Json(b)| b)) {
        Ok(o) => o,
        Err(msg) => return errors::bad_request(msg),
    };
    apply(&services, &id, ItemAction::ChangeOwner { owner })
}

pub async fn update_notes(
    Extension(services): Extension<Arc<GearService>>,
    Path(id): Path<String>,
    body: Option<Json<dto::NotesRequest>>,
) -> axum::response::Response {
    let notes = match dto::notes_from(body.map(|Json(b)| b)) {
        Ok(n) => n,
        Err(msg) => return errors::bad_request(msg),
    };

    match services.update_notes(&id, notes) {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

fn apply(services: &GearService, id: &str, action: ItemAction) -> axum::response::Response {
    match services.apply(id, action, today()) {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => {
            tracing::warn!(item_id = %id, error = %e, "item action rejected");
            errors::service_error_to_response(e)
        }
    }
}
