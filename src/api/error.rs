//! Route handler error type
//!
//! Handlers return `Result<_, ApiError>`. The error is not rendered here:
//! it rides to the exception middleware inside the response extensions.

use std::error::Error as StdError;

use axum::response::{IntoResponse, Response};

use crate::exceptions::ErrorReport;
use crate::middleware::error_response;

#[derive(Debug)]
pub struct ApiError(ErrorReport);

impl ApiError {
    pub fn from_report(report: ErrorReport) -> Self {
        ApiError(report)
    }

    pub fn report(&self) -> &ErrorReport {
        &self.0
    }
}

impl<E> From<E> for ApiError
where
    E: StdError + Send + Sync + 'static,
{
    #[track_caller]
    fn from(error: E) -> Self {
        ApiError(ErrorReport::new(error))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error_response(self.0)
    }
}
