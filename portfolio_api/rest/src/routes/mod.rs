use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::models::ApiError;

pub mod contact;
pub mod health;

pub fn internal_server_error(err: impl Into<anyhow::Error>) -> Response {
    let err = err.into();
    tracing::error!("internal server error: {err:#}");
    error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

fn error(code: StatusCode, detail: &'static str) -> Response {
    (code, Json(ApiError { detail })).into_response()
}
