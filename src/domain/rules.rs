//! Rule-string validator
//!
//! Rules are declared per rule set and field with a compact pipe syntax:
//! `"required|string|max:255"`. Parsing happens when the validator is built,
//! so a bad rule string fails at start-up instead of on the first request.
//!
//! `unique:<table>,<column>` is the one rule that reads storage. It needs a
//! validator built with [`RuleValidator::with_connection`] and, on update,
//! ignores the row whose `id` is the record being updated.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::sea_query::{Alias, Expr, Func, Query};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr};
use serde_json::Value;

use super::errors::RepositoryError;
use super::validation::{RecordId, RuleSet, ValidationContext, ValidationErrors, Validator};

#[derive(Debug, Clone, PartialEq)]
enum Rule {
    Required,
    Sometimes,
    String,
    Integer,
    Numeric,
    Boolean,
    Email,
    Min(f64),
    Max(f64),
    In(Vec<String>),
    Unique { table: String, column: String },
}

impl Rule {
    fn parse(token: &str, field: &str) -> Result<Rule, RepositoryError> {
        let (name, arg) = match token.split_once(':') {
            Some((name, arg)) => (name.trim(), Some(arg.trim())),
            None => (token.trim(), None),
        };

        let rule = match (name, arg) {
            ("required", None) => Rule::Required,
            ("sometimes", None) => Rule::Sometimes,
            ("string", None) => Rule::String,
            ("integer", None) => Rule::Integer,
            ("numeric", None) => Rule::Numeric,
            ("boolean", None) => Rule::Boolean,
            ("email", None) => Rule::Email,
            ("min", Some(n)) => Rule::Min(parse_bound(token, n)?),
            ("max", Some(n)) => Rule::Max(parse_bound(token, n)?),
            ("in", Some(list)) if !list.is_empty() => {
                Rule::In(list.split(',').map(|s| s.trim().to_string()).collect())
            }
            ("unique", Some(args)) => {
                let mut parts = args.split(',').map(str::trim);
                let table = parts.next().filter(|t| !t.is_empty());
                let column = parts.next().filter(|c| !c.is_empty()).unwrap_or(field);
                match (table, parts.next()) {
                    (Some(table), None) => Rule::Unique {
                        table: table.to_string(),
                        column: column.to_string(),
                    },
                    _ => {
                        return Err(RepositoryError::Configuration(format!(
                            "rule '{}' expects unique:<table>[,<column>]",
                            token
                        )))
                    }
                }
            }
            _ => {
                return Err(RepositoryError::Configuration(format!(
                    "unknown validation rule '{}'",
                    token
                )))
            }
        };
        Ok(rule)
    }
}

fn parse_bound(token: &str, raw: &str) -> Result<f64, RepositoryError> {
    raw.parse::<f64>().map_err(|_| {
        RepositoryError::Configuration(format!("rule '{}' needs a numeric argument", token))
    })
}

#[derive(Debug, Clone)]
struct FieldRules {
    field: String,
    rules: Vec<Rule>,
}

impl FieldRules {
    fn has(&self, rule: &Rule) -> bool {
        self.rules.contains(rule)
    }

    fn check(&self, value: Option<&Value>, errors: &mut ValidationErrors) {
        let field = self.field.as_str();
        let value = match value {
            None if self.has(&Rule::Sometimes) => return,
            None | Some(Value::Null) => {
                if self.has(&Rule::Required) {
                    errors.add(field, format!("The {} field is required.", field));
                }
                return;
            }
            Some(value) => value,
        };

        if self.has(&Rule::Required) && matches!(value, Value::String(s) if s.trim().is_empty()) {
            errors.add(field, format!("The {} field is required.", field));
            return;
        }

        for rule in &self.rules {
            if let Some(message) = violation(rule, field, value) {
                errors.add(field, message);
            }
        }
    }
}

fn violation(rule: &Rule, field: &str, value: &Value) -> Option<String> {
    let failed = match rule {
        Rule::Required | Rule::Sometimes | Rule::Unique { .. } => false,
        Rule::String => !value.is_string(),
        Rule::Integer => !(value.is_i64() || value.is_u64()),
        Rule::Numeric => !value.is_number(),
        Rule::Boolean => !value.is_boolean(),
        Rule::Email => !value.as_str().is_some_and(looks_like_email),
        Rule::Min(min) => measure(value).is_some_and(|size| size < *min),
        Rule::Max(max) => measure(value).is_some_and(|size| size > *max),
        Rule::In(allowed) => {
            let text = scalar_text(value);
            !allowed.iter().any(|a| text.as_deref() == Some(a.as_str()))
        }
    };

    if !failed {
        return None;
    }

    let message = match rule {
        Rule::String => format!("The {} must be a string.", field),
        Rule::Integer => format!("The {} must be an integer.", field),
        Rule::Numeric => format!("The {} must be a number.", field),
        Rule::Boolean => format!("The {} field must be true or false.", field),
        Rule::Email => format!("The {} must be a valid email address.", field),
        Rule::Min(min) => format!("The {} must be at least {}.", field, min),
        Rule::Max(max) => format!("The {} may not be greater than {}.", field, max),
        Rule::In(_) => format!("The selected {} is invalid.", field),
        Rule::Required | Rule::Sometimes | Rule::Unique { .. } => return None,
    };
    Some(message)
}

/// Size used by `min`/`max`: characters, numeric value or item count.
fn measure(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => Some(s.chars().count() as f64),
        Value::Number(n) => n.as_f64(),
        Value::Array(items) => Some(items.len() as f64),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn looks_like_email(candidate: &str) -> bool {
    match candidate.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !candidate.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// Storage value for a scalar JSON attribute.
fn db_value(value: &Value) -> Option<sea_orm::Value> {
    match value {
        Value::String(s) => Some(s.clone().into()),
        Value::Bool(b) => Some((*b).into()),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(i.into()),
            None => n.as_f64().map(Into::into),
        },
        _ => None,
    }
}

fn record_value(id: &RecordId) -> sea_orm::Value {
    match id {
        RecordId::Int(i) => (*i).into(),
        RecordId::Str(s) => s.clone().into(),
    }
}

/// Rows of `table` whose `column` equals `value`, other than `except`.
async fn count_taken(
    db: &DatabaseConnection,
    table: &str,
    column: &str,
    value: sea_orm::Value,
    except: Option<&RecordId>,
) -> Result<i64, DbErr> {
    let mut query = Query::select();
    query
        .expr_as(Func::count(Expr::col(Alias::new(column))), Alias::new("taken"))
        .from(Alias::new(table))
        .and_where(Expr::col(Alias::new(column)).eq(value));
    if let Some(id) = except {
        query.and_where(Expr::col(Alias::new("id")).ne(record_value(id)));
    }

    let statement = db.get_database_backend().build(&query);
    match db.query_one(statement).await? {
        Some(row) => row.try_get::<i64>("", "taken"),
        None => Ok(0),
    }
}

/// Validator built from per-rule-set rule strings.
#[derive(Clone, Default)]
pub struct RuleValidator {
    rules: HashMap<RuleSet, Vec<FieldRules>>,
    db: Option<Arc<DatabaseConnection>>,
}

impl RuleValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validator whose `unique` rules query `db`.
    pub fn with_connection(db: Arc<DatabaseConnection>) -> Self {
        Self {
            rules: HashMap::new(),
            db: Some(db),
        }
    }

    /// Adds the rules for `field` under `rule_set`.
    pub fn rules(mut self, rule_set: RuleSet, field: &str, rule_string: &str) -> Result<Self, RepositoryError> {
        let rules = rule_string
            .split('|')
            .filter(|token| !token.trim().is_empty())
            .map(|token| Rule::parse(token, field))
            .collect::<Result<Vec<_>, _>>()?;

        if self.db.is_none() && rules.iter().any(|r| matches!(r, Rule::Unique { .. })) {
            return Err(RepositoryError::Configuration(format!(
                "'unique' on {} in the {} rules needs a database connection",
                field,
                rule_set.as_str()
            )));
        }

        self.rules.entry(rule_set).or_default().push(FieldRules {
            field: field.to_string(),
            rules,
        });
        Ok(self)
    }
}

#[async_trait]
impl Validator for RuleValidator {
    async fn passes_or_fail(&self, context: &ValidationContext<'_>) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let Some(fields) = self.rules.get(&context.rule_set) else {
            return Ok(());
        };

        for field_rules in fields {
            field_rules.check(context.attributes.get(&field_rules.field), &mut errors);
        }

        // Storage lookups only for values that passed everything else
        for field_rules in fields {
            let field = field_rules.field.as_str();
            if errors.get(field).is_some() {
                continue;
            }
            let (Some(db), Some(value)) = (
                self.db.as_deref(),
                context.attributes.get(field).and_then(db_value),
            ) else {
                continue;
            };

            for rule in &field_rules.rules {
                let Rule::Unique { table, column } = rule else {
                    continue;
                };
                match count_taken(db, table, column, value.clone(), context.id.as_ref()).await {
                    Ok(0) => {}
                    Ok(_) => errors.add(field, format!("The {} has already been taken.", field)),
                    Err(e) => {
                        tracing::warn!("Skipped unique check on {}.{}: {}", table, column, e)
                    }
                }
            }
        }

        errors.into_result()
    }
}
