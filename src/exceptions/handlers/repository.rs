//! Repository failures
//!
//! Renders [`RepositoryError`] as `{"code", "msg"}` JSON with a matching
//! HTTP status. Validation failures add the per-field `errors` map.

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::domain::RepositoryError;
use crate::exceptions::chain::{ExceptionHandler, Handled};
use crate::exceptions::report::{ErrorReport, RequestContext};

#[derive(Debug, Clone, Copy, Default)]
pub struct RepositoryExceptionHandler;

fn status_for(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::NotFound { .. } => StatusCode::NOT_FOUND,
        RepositoryError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RepositoryError::ConstraintViolation { .. } => StatusCode::CONFLICT,
        RepositoryError::DeleteFailed => StatusCode::BAD_REQUEST,
        RepositoryError::Storage(_) | RepositoryError::Configuration(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[async_trait]
impl ExceptionHandler for RepositoryExceptionHandler {
    fn name(&self) -> &'static str {
        "repository"
    }

    fn is_applicable(&self, report: &ErrorReport) -> bool {
        report.downcast_ref::<RepositoryError>().is_some()
    }

    async fn handle(&self, report: &ErrorReport, request: &RequestContext) -> Handled {
        let Some(err) = report.downcast_ref::<RepositoryError>() else {
            return Handled::NotClaimed;
        };

        let body = match err {
            RepositoryError::Validation(errors) => json!({
                "code": err.code(),
                "msg": "The given data was invalid.",
                "errors": errors,
            }),
            RepositoryError::Storage(_) | RepositoryError::Configuration(_) => {
                tracing::error!(
                    "API: {}\n{}\nStack trace:\n{}",
                    request.api(),
                    report.summary(),
                    report.trace()
                );
                json!({ "code": err.code(), "msg": err.to_string() })
            }
            _ => json!({ "code": err.code(), "msg": err.to_string() }),
        };

        Handled::Claimed((status_for(err), Json(body)).into_response())
    }
}
