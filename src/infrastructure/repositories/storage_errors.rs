//! Translation of SeaORM/sqlx failures into repository errors.

use sea_orm::{DbErr, RuntimeErr};

use crate::domain::RepositoryError;

/// Codes drivers use for integrity violations: MySQL/ANSI `23000`,
/// PostgreSQL `23503`, SQLite `SQLITE_CONSTRAINT` and its extended
/// `SQLITE_CONSTRAINT_FOREIGNKEY`.
const INTEGRITY_CODES: [&str; 4] = ["23000", "23503", "19", "787"];

/// Extracts the driver code and message of a database-level failure.
fn database_error_parts(err: &DbErr) -> Option<(Option<String>, String)> {
    let sqlx_err = match err {
        DbErr::Exec(RuntimeErr::SqlxError(e)) | DbErr::Query(RuntimeErr::SqlxError(e)) => e,
        _ => return None,
    };
    let db_err = sqlx_err.as_database_error()?;
    Some((
        db_err.code().map(|code| code.into_owned()),
        db_err.message().to_string(),
    ))
}

pub fn is_foreign_key_violation(code: Option<&str>, message: &str) -> bool {
    code.is_some_and(|code| INTEGRITY_CODES.contains(&code))
        && message.to_lowercase().contains("foreign key")
}

/// Maps a failed delete of `entity` to `ConstraintViolation` or `Storage`.
pub fn translate_delete_error(err: DbErr, entity: &str) -> RepositoryError {
    if let Some((code, message)) = database_error_parts(&err) {
        if is_foreign_key_violation(code.as_deref(), &message) {
            tracing::debug!("Delete of {} blocked by foreign key: {}", entity, message);
            return RepositoryError::ConstraintViolation {
                entity: entity.to_string(),
            };
        }
    }
    RepositoryError::Storage(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreign_key_detection() {
        assert!(is_foreign_key_violation(Some("787"), "FOREIGN KEY constraint failed"));
        assert!(is_foreign_key_violation(
            Some("23000"),
            "Cannot delete or update a parent row: a foreign key constraint fails"
        ));
        assert!(is_foreign_key_violation(
            Some("23503"),
            "update or delete on table \"shops\" violates foreign key constraint"
        ));
    }

    #[test]
    fn test_other_integrity_failures_are_not_foreign_keys() {
        assert!(!is_foreign_key_violation(Some("2067"), "UNIQUE constraint failed: shops.domain"));
        assert!(!is_foreign_key_violation(Some("23000"), "Duplicate entry 'a' for key 'domain'"));
        assert!(!is_foreign_key_violation(None, "foreign key mismatch"));
    }

    #[test]
    fn test_non_database_errors_become_storage() {
        let err = translate_delete_error(DbErr::Custom("disk on fire".into()), "shops");
        assert!(matches!(err, RepositoryError::Storage(msg) if msg.contains("disk on fire")));
    }
}
