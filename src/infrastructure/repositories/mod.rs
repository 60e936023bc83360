//! Repository implementations using SeaORM

pub mod base_repository;
pub mod shop_repository;
pub mod storage_errors;
pub mod webhook_event_repository;

pub use base_repository::{BaseRepository, PrimaryKeyOf};
pub use shop_repository::{shop_repository, shop_validator, ShopRepository};
pub use webhook_event_repository::WebhookEventRepository;
