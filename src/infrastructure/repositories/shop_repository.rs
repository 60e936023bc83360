//! Shop repository: generic CRUD plus the shop validation rules

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::BaseRepository;
use crate::domain::{RepositoryError, RuleSet, RuleValidator};
use crate::models::shop::{self, ActiveModel as ShopActiveModel, Entity as ShopEntity};

pub type ShopRepository = BaseRepository<ShopEntity, ShopActiveModel, RuleValidator>;

/// Create needs a domain and a name; update only checks what is sent.
/// Domains are unique, the shop being updated excepted.
pub fn shop_validator(db: Arc<DatabaseConnection>) -> Result<RuleValidator, RepositoryError> {
    RuleValidator::with_connection(db)
        .rules(RuleSet::Create, "domain", "required|string|max:255|unique:shops,domain")?
        .rules(RuleSet::Create, "name", "required|string|max:255")?
        .rules(RuleSet::Create, "email", "email|max:255")?
        .rules(
            RuleSet::Update,
            "domain",
            "sometimes|required|string|max:255|unique:shops,domain",
        )?
        .rules(RuleSet::Update, "name", "sometimes|required|string|max:255")?
        .rules(RuleSet::Update, "email", "email|max:255")
}

pub fn shop_repository(db: Arc<DatabaseConnection>) -> Result<ShopRepository, RepositoryError> {
    let validator = shop_validator(db.clone())?;
    Ok(BaseRepository::with_validator(db, validator))
}

impl ShopRepository {
    pub async fn find_by_domain(&self, domain: &str) -> Result<Option<shop::Model>, RepositoryError> {
        self.find_by(shop::Column::Domain, domain.to_string()).await
    }
}
