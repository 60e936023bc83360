//! Webhook event repository

use serde_json::json;

use super::BaseRepository;
use crate::domain::{Attributes, RepositoryError};
use crate::models::webhook_event::{
    self, ActiveModel as WebhookEventActiveModel, Entity as WebhookEventEntity,
};

pub type WebhookEventRepository = BaseRepository<WebhookEventEntity, WebhookEventActiveModel>;

impl WebhookEventRepository {
    /// Stores one received webhook for `shop_id`.
    pub async fn record(
        &self,
        shop_id: i32,
        topic: &str,
        payload: String,
    ) -> Result<webhook_event::Model, RepositoryError> {
        let mut attributes = Attributes::new();
        attributes.insert("shop_id".to_string(), json!(shop_id));
        attributes.insert("topic".to_string(), json!(topic));
        attributes.insert("payload".to_string(), json!(payload));
        self.create(attributes).await
    }
}
