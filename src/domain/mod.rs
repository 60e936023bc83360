//! Domain layer - Pure business abstractions
//!
//! Error taxonomy, the validator contract and repository result shapes.
//! Nothing here talks to axum; only the `unique` rule reads storage.

pub mod errors;
pub mod repositories;
pub mod rules;
pub mod validation;

pub use errors::{RepositoryError, RpcError, SpreadsheetError, SpreadsheetErrorKind};
pub use repositories::{Page, DEFAULT_PER_PAGE};
pub use rules::RuleValidator;
pub use validation::{
    Attributes, NoValidator, RecordId, RuleSet, ValidationContext, ValidationErrors, Validator,
};
