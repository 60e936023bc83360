pub mod exception_log;
pub mod shop;
pub mod webhook_event;

pub use shop::Model as Shop;
pub use webhook_event::Model as WebhookEvent;
