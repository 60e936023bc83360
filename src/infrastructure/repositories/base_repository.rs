//! Generic SeaORM repository
//!
//! `BaseRepository<E, A, V>` gives every entity the same CRUD surface:
//! validate with the bound validator, delegate to SeaORM, translate storage
//! failures into [`RepositoryError`]. Entity, active model and validator are
//! type parameters, so a repository cannot be bound to something that is not
//! a SeaORM entity or not a validator.

use std::marker::PhantomData;
use std::sync::Arc;

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityName,
    EntityTrait, IdenStatic, IntoActiveModel, Iterable, PaginatorTrait, PrimaryKeyToColumn,
    PrimaryKeyTrait, QueryFilter, QuerySelect,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::storage_errors::translate_delete_error;
use crate::domain::{
    Attributes, NoValidator, Page, RecordId, RepositoryError, ValidationContext, Validator,
    DEFAULT_PER_PAGE,
};

/// Primary key value type of an entity.
pub type PrimaryKeyOf<E> = <<E as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::ValueType;

/// Columns the storage layer stamps itself; callers never write them.
const SERVER_MANAGED_COLUMNS: [&str; 2] = ["created_at", "updated_at"];

pub struct BaseRepository<E, A, V = NoValidator> {
    db: Arc<DatabaseConnection>,
    validator: Option<V>,
    per_page: u64,
    entity: PhantomData<fn() -> (E, A)>,
}

impl<E, A> BaseRepository<E, A, NoValidator>
where
    E: EntityTrait,
{
    /// Repository without validation.
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            validator: None,
            per_page: DEFAULT_PER_PAGE,
            entity: PhantomData,
        }
    }
}

impl<E, A, V> BaseRepository<E, A, V>
where
    E: EntityTrait,
    V: Validator,
{
    /// Repository that runs `validator` before every create and update.
    pub fn with_validator(db: Arc<DatabaseConnection>, validator: V) -> Self {
        Self {
            db,
            validator: Some(validator),
            per_page: DEFAULT_PER_PAGE,
            entity: PhantomData,
        }
    }

    /// Page size used by `paginate` when none is given.
    pub fn per_page(mut self, per_page: u64) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    pub fn validator(&self) -> Option<&V> {
        self.validator.as_ref()
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Gives the connection back, dropping the validator with the repository.
    pub fn into_db(self) -> Arc<DatabaseConnection> {
        self.db
    }

    /// Table name, used in error messages.
    pub fn entity_name(&self) -> String {
        E::default().table_name().to_string()
    }

    async fn validate(&self, context: ValidationContext<'_>) -> Result<(), RepositoryError> {
        match &self.validator {
            Some(validator) => validator
                .passes_or_fail(&context)
                .await
                .map_err(RepositoryError::Validation),
            None => Ok(()),
        }
    }
}

impl<E, A, V> BaseRepository<E, A, V>
where
    E: EntityTrait,
    A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + 'static,
    E::Model: IntoActiveModel<A> + Serialize + Send + Sync + 'static,
    for<'de> E::Model: Deserialize<'de>,
    PrimaryKeyOf<E>: Clone + Into<RecordId>,
    V: Validator,
{
    pub async fn find(&self, id: PrimaryKeyOf<E>) -> Result<E::Model, RepositoryError> {
        E::find_by_id(id)
            .one(self.db())
            .await?
            .ok_or_else(|| RepositoryError::not_found(self.entity_name()))
    }

    pub async fn show(&self, id: PrimaryKeyOf<E>) -> Result<E::Model, RepositoryError> {
        self.find(id).await
    }

    pub async fn all(&self) -> Result<Vec<E::Model>, RepositoryError> {
        Ok(E::find().all(self.db()).await?)
    }

    pub async fn list(&self) -> Result<Vec<E::Model>, RepositoryError> {
        self.all().await
    }

    /// Every record projected onto `columns`.
    pub async fn all_columns(&self, columns: &[E::Column]) -> Result<Vec<JsonValue>, RepositoryError> {
        Ok(E::find()
            .select_only()
            .columns(columns.iter().copied())
            .into_json()
            .all(self.db())
            .await?)
    }

    /// Fetches page `page` (1-based, 0 is read as 1).
    pub async fn paginate(
        &self,
        per_page: Option<u64>,
        page: u64,
    ) -> Result<Page<E::Model>, RepositoryError> {
        let per_page = per_page.unwrap_or(self.per_page).max(1);
        let current_page = page.max(1);

        let paginator = E::find().paginate(self.db(), per_page);
        let totals = paginator.num_items_and_pages().await?;
        let data = paginator.fetch_page(current_page - 1).await?;

        Ok(Page {
            data,
            total: totals.number_of_items,
            per_page,
            current_page,
            last_page: totals.number_of_pages.max(1),
        })
    }

    pub async fn create(&self, mut attributes: Attributes) -> Result<E::Model, RepositoryError> {
        self.validate(ValidationContext::create(&attributes)).await?;

        strip_server_managed::<E>(&mut attributes);
        let model = A::from_json(JsonValue::Object(attributes))?;
        let saved = model.insert(self.db()).await?;

        tracing::debug!("Created {} record", self.entity_name());
        Ok(saved)
    }

    pub async fn update(
        &self,
        mut attributes: Attributes,
        id: PrimaryKeyOf<E>,
    ) -> Result<E::Model, RepositoryError> {
        self.validate(ValidationContext::update(&attributes, id.clone().into()))
            .await?;

        let existing = self.find(id).await?;

        // Merge onto the stored values so partial payloads keep the other fields
        let mut merged = match serde_json::to_value(&existing)? {
            JsonValue::Object(fields) => fields,
            _ => Attributes::new(),
        };
        strip_server_managed::<E>(&mut attributes);
        merged.extend(attributes);

        let mut model: A = existing.into_active_model();
        model.set_from_json(JsonValue::Object(merged))?;
        Ok(model.update(self.db()).await?)
    }

    /// Deletes the record and returns the number of rows removed.
    pub async fn delete(&self, id: PrimaryKeyOf<E>) -> Result<u64, RepositoryError> {
        let existing = self.find(id).await?;
        let model: A = existing.into_active_model();

        let result = model
            .delete(self.db())
            .await
            .map_err(|err| translate_delete_error(err, &self.entity_name()))?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::DeleteFailed);
        }
        Ok(result.rows_affected)
    }

    /// Equality lookup on any column; `None` when nothing matches.
    pub async fn find_by<T>(
        &self,
        column: E::Column,
        value: T,
    ) -> Result<Option<E::Model>, RepositoryError>
    where
        T: Into<sea_orm::Value> + Send,
    {
        Ok(E::find().filter(column.eq(value)).one(self.db()).await?)
    }

    /// Like `find_by`, projected onto `columns`.
    pub async fn find_by_columns<T>(
        &self,
        column: E::Column,
        value: T,
        columns: &[E::Column],
    ) -> Result<Option<JsonValue>, RepositoryError>
    where
        T: Into<sea_orm::Value> + Send,
    {
        Ok(E::find()
            .select_only()
            .columns(columns.iter().copied())
            .filter(column.eq(value))
            .into_json()
            .one(self.db())
            .await?)
    }
}

/// Primary keys and timestamps are assigned by storage, never by the caller.
fn strip_server_managed<E: EntityTrait>(attributes: &mut Attributes) {
    for key in E::PrimaryKey::iter() {
        attributes.remove(key.into_column().as_str());
    }
    for column in SERVER_MANAGED_COLUMNS {
        attributes.remove(column);
    }
}
