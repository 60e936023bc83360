use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use refineon_basic::db;
use refineon_basic::domain::{
    Attributes, RecordId, RepositoryError, RuleSet, ValidationContext, ValidationErrors, Validator,
};
use refineon_basic::infrastructure::{
    shop_repository, BaseRepository, ShopRepository, WebhookEventRepository,
};
use refineon_basic::models::shop;
use sea_orm::{
    DatabaseBackend, DatabaseConnection, DbErr, MockDatabase, MockExecResult, Transaction,
};
use serde_json::{json, Value};

async fn setup_db() -> Arc<DatabaseConnection> {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    Arc::new(db)
}

fn mock_db(database: MockDatabase) -> Arc<DatabaseConnection> {
    Arc::new(database.into_connection())
}

/// Statements the repository issued, read once it has been dropped.
fn transaction_log(db: Arc<DatabaseConnection>) -> Vec<Transaction> {
    match Arc::try_unwrap(db) {
        Ok(db) => db.into_transaction_log(),
        Err(_) => panic!("connection is still shared"),
    }
}

type PlainShops<V = refineon_basic::domain::NoValidator> =
    BaseRepository<shop::Entity, shop::ActiveModel, V>;

fn attrs(value: Value) -> Attributes {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {}", other),
    }
}

fn shop_attrs(domain: &str) -> Attributes {
    attrs(json!({
        "domain": domain,
        "name": format!("Shop {}", domain),
        "email": "owner@shop.test"
    }))
}

async fn setup_shops() -> (Arc<DatabaseConnection>, ShopRepository) {
    let db = setup_db().await;
    let repo = shop_repository(db.clone()).expect("valid shop rules");
    (db, repo)
}

fn stored_shop(id: i32) -> shop::Model {
    shop::Model {
        id,
        domain: "shop.test".to_string(),
        name: "Shop".to_string(),
        email: None,
        created_at: "2024-01-01T00:00:00+00:00".to_string(),
        updated_at: "2024-01-01T00:00:00+00:00".to_string(),
    }
}

/// Validator that remembers what it was asked and optionally rejects.
#[derive(Clone, Default)]
struct RecordingValidator {
    seen: Arc<Mutex<Vec<(RuleSet, Option<RecordId>)>>>,
    reject: bool,
}

#[async_trait]
impl Validator for RecordingValidator {
    async fn passes_or_fail(&self, context: &ValidationContext<'_>) -> Result<(), ValidationErrors> {
        self.seen
            .lock()
            .unwrap()
            .push((context.rule_set, context.id.clone()));
        if self.reject {
            let mut errors = ValidationErrors::new();
            errors.add("domain", "rejected");
            return Err(errors);
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_create_returns_server_assigned_fields() {
    let (_db, repo) = setup_shops().await;

    let created = repo.create(shop_attrs("alpha.test")).await.unwrap();

    assert!(created.id > 0);
    assert_eq!(created.domain, "alpha.test");
    assert_eq!(created.email.as_deref(), Some("owner@shop.test"));
    assert!(!created.created_at.is_empty());
    assert_eq!(created.created_at, created.updated_at);
}

#[tokio::test]
async fn test_create_ignores_caller_supplied_id() {
    let (_db, repo) = setup_shops().await;

    let mut attributes = shop_attrs("alpha.test");
    attributes.insert("id".to_string(), json!(4242));
    let created = repo.create(attributes).await.unwrap();

    assert_ne!(created.id, 4242);
    assert_eq!(repo.find(created.id).await.unwrap().domain, "alpha.test");
}

#[tokio::test]
async fn test_create_with_invalid_payload_never_writes() {
    let (_db, repo) = setup_shops().await;

    let err = repo
        .create(attrs(json!({ "name": "No Domain" })))
        .await
        .unwrap_err();

    match err {
        RepositoryError::Validation(errors) => {
            assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["domain"]);
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    assert!(repo.all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_validator_runs_before_any_statement() {
    let db = mock_db(MockDatabase::new(DatabaseBackend::Sqlite));
    let validator = RecordingValidator {
        reject: true,
        ..Default::default()
    };
    let repo: PlainShops<RecordingValidator> =
        BaseRepository::with_validator(db, validator.clone());

    let err = repo.create(shop_attrs("alpha.test")).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Validation(_)));

    let err = repo.update(shop_attrs("alpha.test"), 1).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Validation(_)));

    assert_eq!(
        *validator.seen.lock().unwrap(),
        vec![
            (RuleSet::Create, None),
            (RuleSet::Update, Some(RecordId::Int(1)))
        ]
    );
    assert!(transaction_log(repo.into_db()).is_empty());
}

#[tokio::test]
async fn test_find_missing_record() {
    let (_db, repo) = setup_shops().await;

    let err = repo.find(999).await.unwrap_err();
    assert!(matches!(&err, RepositoryError::NotFound { entity } if entity == "shops"));
    assert_eq!(err.to_string(), "shops not found");

    assert!(matches!(
        repo.show(999).await,
        Err(RepositoryError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_list_is_all() {
    let (_db, repo) = setup_shops().await;
    repo.create(shop_attrs("a.test")).await.unwrap();
    repo.create(shop_attrs("b.test")).await.unwrap();

    let all = repo.all().await.unwrap();
    let list = repo.list().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all, list);
}

#[tokio::test]
async fn test_all_columns_projects() {
    let (_db, repo) = setup_shops().await;
    repo.create(shop_attrs("a.test")).await.unwrap();

    let rows = repo
        .all_columns(&[shop::Column::Id, shop::Column::Domain])
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    let row = rows[0].as_object().unwrap();
    assert_eq!(row.len(), 2);
    assert_eq!(row["domain"], json!("a.test"));
}

#[tokio::test]
async fn test_paginate_defaults_to_ten() {
    let (_db, repo) = setup_shops().await;
    for i in 0..12 {
        repo.create(shop_attrs(&format!("shop{}.test", i)))
            .await
            .unwrap();
    }

    let first = repo.paginate(None, 1).await.unwrap();
    assert_eq!(first.per_page, 10);
    assert_eq!(first.data.len(), 10);
    assert_eq!(first.total, 12);
    assert_eq!(first.last_page, 2);

    let second = repo.paginate(None, 2).await.unwrap();
    assert_eq!(second.current_page, 2);
    assert_eq!(second.data.len(), 2);

    let small = repo.paginate(Some(5), 0).await.unwrap();
    assert_eq!(small.current_page, 1);
    assert_eq!(small.data.len(), 5);
    assert_eq!(small.last_page, 3);
}

#[tokio::test]
async fn test_update_merges_attributes() {
    let (_db, repo) = setup_shops().await;
    let created = repo.create(shop_attrs("alpha.test")).await.unwrap();

    let updated = repo
        .update(attrs(json!({ "name": "Renamed" })), created.id)
        .await
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.domain, "alpha.test");
    assert_eq!(updated.email.as_deref(), Some("owner@shop.test"));
    assert_eq!(updated.created_at, created.created_at);

    let reloaded = repo.find(created.id).await.unwrap();
    assert_eq!(reloaded, updated);
}

#[tokio::test]
async fn test_update_rejects_blank_domain() {
    let (_db, repo) = setup_shops().await;
    let created = repo.create(shop_attrs("alpha.test")).await.unwrap();

    let err = repo
        .update(attrs(json!({ "domain": "" })), created.id)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Validation(_)));
    assert_eq!(repo.find(created.id).await.unwrap().domain, "alpha.test");
}

#[tokio::test]
async fn test_update_missing_record_never_persists() {
    let db = mock_db(
        MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([Vec::<shop::Model>::new()]),
    );
    let repo = shop_repository(db).unwrap();

    let err = repo
        .update(attrs(json!({ "name": "Ghost" })), 7)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));

    // Only the lookup ran
    assert_eq!(transaction_log(repo.into_db()).len(), 1);
}

#[tokio::test]
async fn test_delete_missing_record_issues_no_delete() {
    let db = mock_db(
        MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([Vec::<shop::Model>::new()]),
    );
    let repo = shop_repository(db).unwrap();

    let err = repo.delete(7).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
    assert_eq!(transaction_log(repo.into_db()).len(), 1);
}

#[tokio::test]
async fn test_delete_with_zero_rows_is_delete_failed() {
    let db = mock_db(
        MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![stored_shop(3)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }]),
    );
    let repo = shop_repository(db).unwrap();

    let err = repo.delete(3).await.unwrap_err();
    assert!(matches!(err, RepositoryError::DeleteFailed));
    assert_eq!(err.to_string(), "delete failed, confirm the record exists");
}

#[tokio::test]
async fn test_delete_other_storage_failure() {
    let db = mock_db(
        MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![stored_shop(3)]])
            .append_exec_errors([DbErr::Custom("disk I/O error".to_string())]),
    );
    let repo = shop_repository(db).unwrap();

    match repo.delete(3).await.unwrap_err() {
        RepositoryError::Storage(message) => assert!(message.contains("disk I/O error")),
        other => panic!("expected storage error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_delete_success() {
    let (_db, repo) = setup_shops().await;
    let created = repo.create(shop_attrs("alpha.test")).await.unwrap();

    assert_eq!(repo.delete(created.id).await.unwrap(), 1);
    assert!(matches!(
        repo.find(created.id).await,
        Err(RepositoryError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_delete_referenced_shop_is_constraint_violation() {
    let (db, repo) = setup_shops().await;
    let events = WebhookEventRepository::new(db);
    let created = repo.create(shop_attrs("alpha.test")).await.unwrap();
    events
        .record(created.id, "orders/create", "{}".to_string())
        .await
        .unwrap();

    let err = repo.delete(created.id).await.unwrap_err();
    assert!(
        matches!(&err, RepositoryError::ConstraintViolation { entity } if entity == "shops"),
        "unexpected error: {:?}",
        err
    );
    assert!(repo.find(created.id).await.is_ok());
}

#[tokio::test]
async fn test_duplicate_domain_on_create_is_validation_error() {
    let (_db, repo) = setup_shops().await;
    repo.create(shop_attrs("alpha.test")).await.unwrap();

    match repo.create(shop_attrs("alpha.test")).await.unwrap_err() {
        RepositoryError::Validation(errors) => assert_eq!(
            errors.get("domain"),
            Some(&["The domain has already been taken.".to_string()][..])
        ),
        other => panic!("expected validation error, got {:?}", other),
    }
    assert_eq!(repo.all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_domain_on_update_is_validation_error() {
    let (_db, repo) = setup_shops().await;
    repo.create(shop_attrs("alpha.test")).await.unwrap();
    let beta = repo.create(shop_attrs("beta.test")).await.unwrap();

    let err = repo
        .update(attrs(json!({ "domain": "alpha.test" })), beta.id)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Validation(_)));
    assert_eq!(repo.find(beta.id).await.unwrap().domain, "beta.test");

    // Keeping its own domain is not a conflict
    let updated = repo
        .update(attrs(json!({ "domain": "beta.test", "name": "Beta" })), beta.id)
        .await
        .unwrap();
    assert_eq!(updated.name, "Beta");
}

#[tokio::test]
async fn test_update_keeps_server_timestamps() {
    let (_db, repo) = setup_shops().await;
    let created = repo.create(shop_attrs("alpha.test")).await.unwrap();

    let updated = repo
        .update(
            attrs(json!({
                "name": "Renamed",
                "created_at": "1999-01-01T00:00:00+00:00",
                "updated_at": "1999-01-01T00:00:00+00:00"
            })),
            created.id,
        )
        .await
        .unwrap();

    assert_eq!(updated.created_at, created.created_at);
    assert_ne!(updated.updated_at, "1999-01-01T00:00:00+00:00");
    assert_eq!(repo.find(created.id).await.unwrap().created_at, created.created_at);
}

#[tokio::test]
async fn test_create_ignores_caller_timestamps() {
    let (_db, repo) = setup_shops().await;

    let mut attributes = shop_attrs("alpha.test");
    attributes.insert("created_at".to_string(), json!("1999-01-01T00:00:00+00:00"));
    let created = repo.create(attributes).await.unwrap();

    assert_ne!(created.created_at, "1999-01-01T00:00:00+00:00");
}

#[tokio::test]
async fn test_find_by_returns_none_when_absent() {
    let (_db, repo) = setup_shops().await;
    let created = repo.create(shop_attrs("alpha.test")).await.unwrap();

    let found = repo
        .find_by(shop::Column::Domain, "alpha.test")
        .await
        .unwrap();
    assert_eq!(found.map(|s| s.id), Some(created.id));

    assert!(repo
        .find_by(shop::Column::Domain, "missing.test")
        .await
        .unwrap()
        .is_none());

    let projected = repo
        .find_by_columns(shop::Column::Domain, "alpha.test", &[shop::Column::Name])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(projected, json!({ "name": "Shop alpha.test" }));

    assert!(repo.find_by_domain("missing.test").await.unwrap().is_none());
}

#[tokio::test]
async fn test_repository_without_validator() {
    let db = setup_db().await;
    let repo: PlainShops = BaseRepository::new(db);
    assert!(repo.validator().is_none());

    // No rules: storage decides
    let err = repo.create(attrs(json!({ "name": "No Domain" }))).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Storage(_)));

    repo.create(shop_attrs("alpha.test")).await.unwrap();
    let err = repo.create(shop_attrs("alpha.test")).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Storage(_)));
}
