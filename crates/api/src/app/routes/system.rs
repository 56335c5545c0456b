use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::routes::items::today;
use crate::app::services::GearService;
use crate::app::{dto, errors};

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Record that the gear cage was checked today.
pub async fn cage_check(
    Extension(services): Extension<Arc<GearService>>,
) -> axum::response::Response {
    match services.mark_checked(today()) {
        Ok(date) => (StatusCode::OK, Json(dto::cage_check_to_json(Some(date)))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_cage_check(
    Extension(services): Extension<Arc<GearService>>,
) -> axum::response::Response {
    match services.last_checked() {
        Ok(date) => (StatusCode::OK, Json(dto::cage_check_to_json(date))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
