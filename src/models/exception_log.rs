use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Durable copy of every error that reached the catch-all handler.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "exception_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// `<uri>(<method>)`
    pub api: String,
    pub server_name: String,
    pub file: String,
    pub line: i64,
    pub message: String,
    pub trace: String,
    pub code: i64,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
