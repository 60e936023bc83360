//! Ordered exception handler chain
//!
//! Handlers are tried in the order they were added. The first handler that
//! is applicable and claims the report produces the response; later
//! handlers never run for that report.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::report::{ErrorReport, RequestContext};

/// Outcome of offering a report to one handler.
pub enum Handled {
    Claimed(Response),
    NotClaimed,
}

impl Handled {
    pub fn is_claimed(&self) -> bool {
        matches!(self, Handled::Claimed(_))
    }
}

#[async_trait]
pub trait ExceptionHandler: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_applicable(&self, report: &ErrorReport) -> bool;

    async fn handle(&self, report: &ErrorReport, request: &RequestContext) -> Handled;
}

#[derive(Clone, Default)]
pub struct HandlerChain {
    handlers: Vec<Arc<dyn ExceptionHandler>>,
}

impl HandlerChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `handler` after the ones already registered.
    pub fn with<H>(mut self, handler: H) -> Self
    where
        H: ExceptionHandler + 'static,
    {
        self.handlers.push(Arc::new(handler));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    pub async fn dispatch(&self, report: &ErrorReport, request: &RequestContext) -> Handled {
        for handler in &self.handlers {
            if !handler.is_applicable(report) {
                continue;
            }
            if let Handled::Claimed(response) = handler.handle(report, request).await {
                tracing::debug!("{} claimed {}", handler.name(), report.class());
                return Handled::Claimed(response);
            }
        }
        Handled::NotClaimed
    }

    /// Like `dispatch`, with a bare 500 when nobody claims the report.
    pub async fn render(&self, report: &ErrorReport, request: &RequestContext) -> Response {
        match self.dispatch(report, request).await {
            Handled::Claimed(response) => response,
            Handled::NotClaimed => {
                tracing::warn!("No exception handler claimed {}", report.class());
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
