pub mod exception;
pub mod webhook;

pub use exception::{error_response, handle_exceptions, panic_response};
pub use webhook::{check_webhook, WebhookGuard};
