//! Validator contract
//!
//! A validator is handed the attributes of a mutating repository call
//! together with the rule set for that operation. Update calls also carry
//! the id of the record being changed so rules can exclude it.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

/// Attribute bag passed to `create`/`update`.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Named rule set selected by the repository operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleSet {
    Create,
    Update,
}

impl RuleSet {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleSet::Create => "create",
            RuleSet::Update => "update",
        }
    }
}

/// Identifier of the record targeted by an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordId {
    Int(i64),
    Str(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{}", id),
            RecordId::Str(id) => f.write_str(id),
        }
    }
}

impl From<i32> for RecordId {
    fn from(id: i32) -> Self {
        RecordId::Int(i64::from(id))
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Int(id)
    }
}

impl From<u32> for RecordId {
    fn from(id: u32) -> Self {
        RecordId::Int(i64::from(id))
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        RecordId::Str(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId::Str(id.to_owned())
    }
}

/// Everything a validator sees for one check.
#[derive(Debug, Clone)]
pub struct ValidationContext<'a> {
    pub attributes: &'a Attributes,
    pub rule_set: RuleSet,
    pub id: Option<RecordId>,
}

impl<'a> ValidationContext<'a> {
    pub fn create(attributes: &'a Attributes) -> Self {
        Self {
            attributes,
            rule_set: RuleSet::Create,
            id: None,
        }
    }

    pub fn update(attributes: &'a Attributes, id: RecordId) -> Self {
        Self {
            attributes,
            rule_set: RuleSet::Update,
            id: Some(id),
        }
    }
}

/// Field name -> messages, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut messages = self.0.values().flatten();
        let Some(first) = messages.next() else {
            return f.write_str("no errors");
        };
        match messages.count() {
            0 => f.write_str(first),
            rest => write!(f, "{} (and {} more)", first, rest),
        }
    }
}

/// Pre-persistence rule checker.
#[async_trait]
pub trait Validator: Send + Sync {
    async fn passes_or_fail(&self, context: &ValidationContext<'_>) -> Result<(), ValidationErrors>;
}

/// Placeholder type for repositories without a validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoValidator;

#[async_trait]
impl Validator for NoValidator {
    async fn passes_or_fail(&self, _context: &ValidationContext<'_>) -> Result<(), ValidationErrors> {
        Ok(())
    }
}
