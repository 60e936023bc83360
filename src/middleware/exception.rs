//! Exception middleware
//!
//! Failed handlers leave an `Arc<ErrorReport>` in the response extensions.
//! This middleware picks it up and lets the handler chain write the real
//! response. Panics are turned into reports by [`panic_response`] so they take
//! the same path.

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::exceptions::{ErrorReport, HandlerChain, RequestContext};

pub async fn handle_exceptions(
    State(chain): State<Arc<HandlerChain>>,
    req: Request,
    next: Next,
) -> Response {
    let request = RequestContext::from_request(&req);
    let mut response = next.run(req).await;

    match response.extensions_mut().remove::<Arc<ErrorReport>>() {
        Some(report) => chain.render(&report, &request).await,
        None => response,
    }
}

/// Response for `tower_http::catch_panic::CatchPanicLayer::custom`.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    error_response(ErrorReport::from_panic(payload))
}

/// Placeholder 500 carrying `report` for [`handle_exceptions`].
pub fn error_response(report: ErrorReport) -> Response {
    let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
    response.extensions_mut().insert(Arc::new(report));
    response
}
