//! Webhook admission check
//!
//! Webhook calls must name the shop and the topic in two headers. Requests
//! carrying both with a non-empty value are passed on untouched; anything
//! else gets a bare 500.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderName, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::domain::RepositoryError;

#[derive(Debug, Clone)]
pub struct WebhookGuard {
    domain_header: HeaderName,
    topic_header: HeaderName,
}

impl Default for WebhookGuard {
    fn default() -> Self {
        Self {
            domain_header: HeaderName::from_static("x-shopify-shop-domain"),
            topic_header: HeaderName::from_static("x-shopify-topic"),
        }
    }
}

impl WebhookGuard {
    pub fn new(domain_header: &str, topic_header: &str) -> Result<Self, RepositoryError> {
        let parse = |name: &str| {
            HeaderName::try_from(name).map_err(|_| {
                RepositoryError::Configuration(format!("invalid webhook header name '{}'", name))
            })
        };
        Ok(Self {
            domain_header: parse(domain_header)?,
            topic_header: parse(topic_header)?,
        })
    }

    pub fn shop_domain<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        header_value(headers, &self.domain_header)
    }

    pub fn topic<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        header_value(headers, &self.topic_header)
    }

    pub fn admits(&self, headers: &HeaderMap) -> bool {
        self.shop_domain(headers).is_some() && self.topic(headers).is_some()
    }
}

/// First value of `name`, if it is readable and not empty.
fn header_value<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// Axum middleware gating webhook routes.
pub async fn check_webhook(State(guard): State<WebhookGuard>, req: Request, next: Next) -> Response {
    if guard.admits(req.headers()) {
        next.run(req).await
    } else {
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(*name, HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn admits_when_both_headers_present() {
        let guard = WebhookGuard::default();
        let headers = headers(&[
            ("x-shopify-shop-domain", "shop.test"),
            ("x-shopify-topic", "orders/create"),
        ]);
        assert!(guard.admits(&headers));
        assert_eq!(guard.shop_domain(&headers), Some("shop.test"));
        assert_eq!(guard.topic(&headers), Some("orders/create"));
    }

    #[test]
    fn rejects_missing_or_empty_headers() {
        let guard = WebhookGuard::default();
        assert!(!guard.admits(&headers(&[("x-shopify-shop-domain", "shop.test")])));
        assert!(!guard.admits(&headers(&[("x-shopify-topic", "orders/create")])));
        assert!(!guard.admits(&headers(&[
            ("x-shopify-shop-domain", ""),
            ("x-shopify-topic", "orders/create"),
        ])));
    }

    #[test]
    fn whitespace_values_count_as_present() {
        let guard = WebhookGuard::default();
        let headers = headers(&[
            ("x-shopify-shop-domain", "  "),
            ("x-shopify-topic", "orders/create"),
        ]);
        assert!(guard.admits(&headers));
        assert_eq!(guard.shop_domain(&headers), Some("  "));
    }

    #[test]
    fn custom_header_names() {
        let guard = WebhookGuard::new("x-shop", "x-event").unwrap();
        assert!(guard.admits(&headers(&[("x-shop", "a.test"), ("x-event", "ping")])));
        assert!(WebhookGuard::new("bad header", "x-event").is_err());
    }
}
