//! Exception log sinks
//!
//! The catch-all handler writes every uncaught error to a durable sink and to
//! the console. Sinks report failures as [`SinkError`]; the handler decides
//! what to do with them.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde::Serialize;

use super::report::{ErrorReport, RequestContext};
use crate::models::exception_log;

/// Structured form of one uncaught error.
#[derive(Debug, Clone, Serialize)]
pub struct ExceptionRecord {
    pub api: String,
    pub server_name: String,
    pub file: String,
    pub line: u32,
    pub message: String,
    pub trace: String,
    pub code: i64,
    pub created_at: DateTime<Utc>,
}

impl ExceptionRecord {
    pub fn new(report: &ErrorReport, request: &RequestContext, server_name: &str) -> Self {
        Self {
            api: request.api(),
            server_name: server_name.to_string(),
            file: report.file().to_string(),
            line: report.line(),
            message: report.message().to_string(),
            trace: report.trace().to_string(),
            code: report.code(),
            created_at: Utc::now(),
        }
    }

    /// Multi-line text used by line-oriented sinks.
    pub fn render(&self, summary: &str) -> String {
        format!("API: {}\n{}\nStack trace:\n{}", self.api, summary, self.trace)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("log sink failed: {0}")]
pub struct SinkError(pub String);

#[async_trait]
pub trait LogSink: Send + Sync {
    async fn write(&self, record: &ExceptionRecord, summary: &str) -> Result<(), SinkError>;
}

/// Persists records into the `exception_logs` table.
pub struct DatabaseLogSink {
    db: Arc<DatabaseConnection>,
}

impl DatabaseLogSink {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LogSink for DatabaseLogSink {
    async fn write(&self, record: &ExceptionRecord, _summary: &str) -> Result<(), SinkError> {
        let row = exception_log::ActiveModel {
            api: Set(record.api.clone()),
            server_name: Set(record.server_name.clone()),
            file: Set(record.file.clone()),
            line: Set(i64::from(record.line)),
            message: Set(record.message.clone()),
            trace: Set(record.trace.clone()),
            code: Set(record.code),
            created_at: Set(record.created_at.to_rfc3339()),
            ..Default::default()
        };

        row.insert(self.db.as_ref())
            .await
            .map(|_| ())
            .map_err(|e| SinkError(e.to_string()))
    }
}

/// Emits records through `tracing` at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleLogSink;

#[async_trait]
impl LogSink for ConsoleLogSink {
    async fn write(&self, record: &ExceptionRecord, summary: &str) -> Result<(), SinkError> {
        tracing::error!(
            server = %record.server_name,
            code = record.code,
            "{}",
            record.render(summary)
        );
        Ok(())
    }
}
