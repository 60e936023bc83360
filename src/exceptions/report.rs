//! Error reports
//!
//! An [`ErrorReport`] is what travels from a failing route handler to the
//! exception handler chain: the original error plus the diagnostics the
//! handlers print (class, code, source location, trace).

use std::any::{type_name, Any};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt::Write;
use std::panic::Location;

use axum::http::{Method, Request, Uri};

use crate::domain::{RepositoryError, RpcError};

pub struct ErrorReport {
    class: Cow<'static, str>,
    message: String,
    code: i64,
    file: Cow<'static, str>,
    line: u32,
    trace: String,
    error: Box<dyn StdError + Send + Sync>,
}

impl ErrorReport {
    /// Wraps `error`, recording the caller's file and line.
    #[track_caller]
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let location = Location::caller();
        let code = code_of(&error);
        Self::build(
            Cow::Borrowed(type_name::<E>()),
            Box::new(error),
            code,
            Cow::Borrowed(location.file()),
            location.line(),
        )
    }

    /// Report for a panic caught while serving a request.
    pub fn from_panic(payload: Box<dyn Any + Send + 'static>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "panic with non-string payload".to_string()
        };

        Self::build(
            Cow::Borrowed("Panic"),
            Box::new(PanicError(message)),
            0,
            Cow::Borrowed("unknown"),
            0,
        )
    }

    fn build(
        class: Cow<'static, str>,
        error: Box<dyn StdError + Send + Sync>,
        code: i64,
        file: Cow<'static, str>,
        line: u32,
    ) -> Self {
        let trace = render_trace(error.as_ref(), &Backtrace::capture());
        Self {
            class,
            message: error.to_string(),
            code,
            file,
            line,
            trace,
            error,
        }
    }

    pub fn with_code(mut self, code: i64) -> Self {
        self.code = code;
        self
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> i64 {
        self.code
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn trace(&self) -> &str {
        &self.trace
    }

    pub fn downcast_ref<T: StdError + 'static>(&self) -> Option<&T> {
        self.error.downcast_ref::<T>()
    }

    /// `<Class>: <message>(<code>) in <file>:<line>`
    pub fn summary(&self) -> String {
        format!(
            "{}: {}({}) in {}:{}",
            self.class, self.message, self.code, self.file, self.line
        )
    }
}

impl std::fmt::Debug for ErrorReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorReport")
            .field("class", &self.class)
            .field("message", &self.message)
            .field("code", &self.code)
            .field("file", &self.file)
            .field("line", &self.line)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct PanicError(String);

fn code_of(error: &(dyn StdError + 'static)) -> i64 {
    if let Some(err) = error.downcast_ref::<RepositoryError>() {
        err.code()
    } else if let Some(err) = error.downcast_ref::<RpcError>() {
        err.code
    } else {
        0
    }
}

/// Source chain followed by the captured backtrace.
fn render_trace(error: &(dyn StdError + 'static), backtrace: &Backtrace) -> String {
    let mut trace = String::new();
    let mut source = error.source();
    let mut depth = 0;
    while let Some(cause) = source {
        let _ = writeln!(trace, "#{} caused by: {}", depth, cause);
        depth += 1;
        source = cause.source();
    }

    match backtrace.status() {
        BacktraceStatus::Captured => {
            let _ = write!(trace, "{}", backtrace);
        }
        _ => trace.push_str("backtrace not captured (set RUST_BACKTRACE=1)"),
    }
    trace
}

/// The parts of the inbound request the handlers report on.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub uri: Uri,
}

impl RequestContext {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self { method, uri }
    }

    pub fn from_request<B>(request: &Request<B>) -> Self {
        Self::new(request.method().clone(), request.uri().clone())
    }

    /// `<uri>(<method>)`
    pub fn api(&self) -> String {
        format!("{}({})", self.uri, self.method)
    }
}
