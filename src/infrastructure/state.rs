//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::RepositoryError;
use crate::exceptions::{default_chain, HandlerChain};
use crate::infrastructure::config::Config;
use crate::infrastructure::{shop_repository, ShopRepository, WebhookEventRepository};
use crate::middleware::WebhookGuard;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    db: Arc<DatabaseConnection>,
    /// Shop repository
    pub shop_repo: Arc<ShopRepository>,
    /// Webhook event repository
    pub webhook_event_repo: Arc<WebhookEventRepository>,
    /// Handler chain used by the exception middleware
    pub exception_chain: Arc<HandlerChain>,
    pub webhook_guard: WebhookGuard,
}

impl AppState {
    /// Build repositories, handler chain and webhook guard from `config`.
    ///
    /// Fails with `Configuration` on bad validator rules or header names.
    pub fn new(db: DatabaseConnection, config: &Config) -> Result<Self, RepositoryError> {
        let db = Arc::new(db);
        let shop_repo = Arc::new(shop_repository(db.clone())?.per_page(config.page_size));
        let webhook_event_repo =
            Arc::new(WebhookEventRepository::new(db.clone()).per_page(config.page_size));
        let exception_chain = Arc::new(default_chain(db.clone(), &config.app_name));
        let webhook_guard =
            WebhookGuard::new(&config.webhook_domain_header, &config.webhook_topic_header)?;

        Ok(Self {
            db,
            shop_repo,
            webhook_event_repo,
            exception_chain,
            webhook_guard,
        })
    }

    /// Swap the handler chain, e.g. to use different log sinks.
    pub fn with_exception_chain(mut self, chain: HandlerChain) -> Self {
        self.exception_chain = Arc::new(chain);
        self
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

// Implement FromRef to allow extracting the shared connection from AppState
impl axum::extract::FromRef<AppState> for Arc<DatabaseConnection> {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
