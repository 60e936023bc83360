//! Catch-all handler
//!
//! Claims every report. Logs it to the durable sink and to the console, then
//! answers 500 with the one-line summary as plain text. A failing durable
//! sink is reported and otherwise ignored; the console write still happens.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::exceptions::chain::{ExceptionHandler, Handled};
use crate::exceptions::report::{ErrorReport, RequestContext};
use crate::exceptions::sinks::{ExceptionRecord, LogSink};

pub struct UncaughtExceptionHandler {
    server_name: String,
    durable: Arc<dyn LogSink>,
    console: Arc<dyn LogSink>,
}

impl UncaughtExceptionHandler {
    pub fn new(
        server_name: impl Into<String>,
        durable: Arc<dyn LogSink>,
        console: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            server_name: server_name.into(),
            durable,
            console,
        }
    }
}

#[async_trait]
impl ExceptionHandler for UncaughtExceptionHandler {
    fn name(&self) -> &'static str {
        "uncaught"
    }

    fn is_applicable(&self, _report: &ErrorReport) -> bool {
        true
    }

    async fn handle(&self, report: &ErrorReport, request: &RequestContext) -> Handled {
        let summary = report.summary();
        let record = ExceptionRecord::new(report, request, &self.server_name);

        if let Err(e) = self.durable.write(&record, &summary).await {
            tracing::warn!("Failed to persist exception log: {}", e);
        }
        if let Err(e) = self.console.write(&record, &summary).await {
            tracing::warn!("Failed to print exception log: {}", e);
        }

        Handled::Claimed((StatusCode::INTERNAL_SERVER_ERROR, summary).into_response())
    }
}
