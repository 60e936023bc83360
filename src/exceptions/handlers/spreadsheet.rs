//! Spreadsheet failures
//!
//! Turns formula and legacy-format errors into a JSON message the user can
//! act on. Anything else is left for the next handler.

use async_trait::async_trait;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::domain::{SpreadsheetError, SpreadsheetErrorKind};
use crate::exceptions::chain::{ExceptionHandler, Handled};
use crate::exceptions::report::{ErrorReport, RequestContext};

/// Substring the spreadsheet engine puts in formula evaluation errors.
pub const FORMULA_ERROR_MARKER: &str = "Formula Error";

/// Substring of errors raised by the legacy `.xls` writer, as relayed by
/// upstream export services.
pub const XLS_WRITER_MARKER: &str = r"PhpOffice\PhpSpreadsheet\Writer\Xls::writeSummaryProp()";

pub const FORMULA_ERROR_MESSAGE: &str =
    "Spreadsheet formula error, check whether cells reference other sheets";

pub const FORMAT_INCOMPATIBLE_MESSAGE: &str =
    "Spreadsheet format is incompatible, please upload a file ending in .xlsx";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFailure {
    Formula,
    FormatIncompatible,
}

impl SpreadsheetFailure {
    pub fn message(&self) -> &'static str {
        match self {
            SpreadsheetFailure::Formula => FORMULA_ERROR_MESSAGE,
            SpreadsheetFailure::FormatIncompatible => FORMAT_INCOMPATIBLE_MESSAGE,
        }
    }
}

/// Typed kinds win; the message markers cover errors that only carry text.
pub fn classify(report: &ErrorReport) -> Option<SpreadsheetFailure> {
    match report.downcast_ref::<SpreadsheetError>() {
        Some(err) => match err.kind {
            SpreadsheetErrorKind::Formula => Some(SpreadsheetFailure::Formula),
            SpreadsheetErrorKind::WriterCompatibility => {
                Some(SpreadsheetFailure::FormatIncompatible)
            }
            SpreadsheetErrorKind::Other if err.message.contains(FORMULA_ERROR_MARKER) => {
                Some(SpreadsheetFailure::Formula)
            }
            SpreadsheetErrorKind::Other => None,
        },
        None if report.message().contains(XLS_WRITER_MARKER) => {
            Some(SpreadsheetFailure::FormatIncompatible)
        }
        None => None,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadsheetExceptionHandler;

#[async_trait]
impl ExceptionHandler for SpreadsheetExceptionHandler {
    fn name(&self) -> &'static str {
        "spreadsheet"
    }

    fn is_applicable(&self, report: &ErrorReport) -> bool {
        classify(report).is_some()
    }

    async fn handle(&self, report: &ErrorReport, _request: &RequestContext) -> Handled {
        match classify(report) {
            Some(failure) => Handled::Claimed(
                Json(json!({
                    "code": 400,
                    "msg": failure.message(),
                }))
                .into_response(),
            ),
            None => Handled::NotClaimed,
        }
    }
}
