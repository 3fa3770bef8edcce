use std::time::Duration;

use axum::{extract::Request, response::Response, Router};
use tower_http::{classify::ServerErrorsFailureClass, trace::TraceLayer};
use tracing::{debug, field, warn, Span};

use super::request_id::RequestId;

/// Wraps every request in an `http-request` span. Must be added before the
/// request id middleware so the id is available when the span is created.
pub fn add<S: Clone + Send + Sync + 'static>(router: Router<S>) -> Router<S> {
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(request_span)
            .on_request(|_: &Request, _: &Span| debug!("request received"))
            .on_response(log_response)
            .on_body_chunk(())
            .on_eos(())
            .on_failure(log_failure),
    )
}

fn request_span(request: &Request) -> Span {
    let method = request.method();
    let path = request.uri().path();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .copied()
        .map(field::display);

    tracing::debug_span!("http-request", %method, %path, request_id)
}

fn log_response(response: &Response, latency: Duration, _span: &Span) {
    debug!(status = %response.status(), ?latency, "response sent");
}

fn log_failure(failure: ServerErrorsFailureClass, latency: Duration, _span: &Span) {
    warn!(%failure, ?latency, "request failed");
}
