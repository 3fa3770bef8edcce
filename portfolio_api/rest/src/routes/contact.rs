use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing, Json, Router,
};
use portfolio_core_contact_contracts::{ContactSendMessageError, ContactService};
use portfolio_models::contact::ContactFormFields;
use tracing::debug;

use super::{error, internal_server_error};
use crate::models::contact::{ApiContactForm, ApiInvalidContactForm};

pub fn router(service: Arc<impl ContactService>) -> Router<()> {
    Router::new()
        .route("/contact", routing::post(send_message))
        .with_state(service)
}

async fn send_message(
    service: State<Arc<impl ContactService>>,
    Json(form): Json<ApiContactForm>,
) -> Response {
    let submission = match ContactFormFields::from(form).validate() {
        Ok(submission) => submission,
        Err(errors) => {
            debug!(%errors, "rejecting invalid contact form");
            let body = ApiInvalidContactForm {
                detail: "Invalid contact form",
                errors,
            };
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
        }
    };

    match service.send_message(submission).await {
        Ok(()) => Json(true).into_response(),
        Err(ContactSendMessageError::Send) => {
            error(StatusCode::BAD_GATEWAY, "Could not send message")
        }
        Err(ContactSendMessageError::Other(err)) => internal_server_error(err),
    }
}
