//! Exception handling
//!
//! Route handlers fail with an [`ErrorReport`]; the exception middleware
//! offers it to a [`HandlerChain`] which turns it into the final response.

pub mod chain;
pub mod handlers;
pub mod report;
pub mod sinks;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

pub use chain::{ExceptionHandler, HandlerChain, Handled};
pub use handlers::{
    RepositoryExceptionHandler, SpreadsheetExceptionHandler, UncaughtExceptionHandler,
};
pub use report::{ErrorReport, RequestContext};
pub use sinks::{ConsoleLogSink, DatabaseLogSink, ExceptionRecord, LogSink, SinkError};

/// Repository errors, then spreadsheet errors, then the catch-all.
pub fn default_chain(db: Arc<DatabaseConnection>, server_name: &str) -> HandlerChain {
    HandlerChain::new()
        .with(RepositoryExceptionHandler)
        .with(SpreadsheetExceptionHandler)
        .with(UncaughtExceptionHandler::new(
            server_name,
            Arc::new(DatabaseLogSink::new(db)),
            Arc::new(ConsoleLogSink),
        ))
}
