//! REST client for the booking backend.
//!
//! Authenticated endpoints take the session's bearer token. Non-2xx
//! responses carry a JSON `{"message": ...}` body when the backend has
//! something to say; that message is surfaced to the user, otherwise the
//! status's canonical reason is used.
//!
//! The service layer depends on the small gateway traits below rather
//! than on [`BackendClient`] directly, so tests can substitute fakes.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;

use ciclo_core::{OrderId, ProductKey};

use crate::config::BackendConfig;
use crate::models::{Order, OrderItem, PaymentMethod, UserSession};

/// Errors from backend calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, timeout...).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Server {
        /// HTTP status of the response.
        status: StatusCode,
        /// Message extracted from the response body, or the status's
        /// canonical reason.
        message: String,
    },
}

impl ApiError {
    /// Whether this is a 401, i.e. the session token was missing,
    /// expired, or rejected.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::Server {
                status: StatusCode::UNAUTHORIZED,
                ..
            }
        )
    }
}

/// Payload for `POST /orders`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderInput {
    /// Cart snapshots, stock and slug stripped.
    pub order_items: Vec<OrderItem>,
    /// Chosen payment method.
    pub payment_method: PaymentMethod,
    /// Sum of line totals, rounded once.
    pub items_price: Decimal,
    /// Amount due.
    pub total_price: Decimal,
}

/// Payload for `PUT /users/profile`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    /// New display name.
    pub name: String,
    /// New email address.
    pub email: String,
    /// New password; `None` keeps the current one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Live product data: stock checks and the category filter list.
pub trait ProductGateway {
    /// Current bookable stock for a product.
    async fn stock_level(&self, key: &ProductKey) -> Result<i64, ApiError>;

    /// Distinct category names for the search filter control.
    async fn categories(&self) -> Result<Vec<String>, ApiError>;
}

/// User registration, login, and profile updates.
pub trait AuthGateway {
    /// `POST /users/login`.
    async fn login(&self, email: &str, password: &str) -> Result<UserSession, ApiError>;

    /// `POST /users/register`.
    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserSession, ApiError>;

    /// `PUT /users/profile` (authenticated).
    async fn update_profile(
        &self,
        token: &str,
        update: &ProfileUpdate,
    ) -> Result<UserSession, ApiError>;
}

/// Order placement, confirmation fetch, and payment capture.
pub trait OrderGateway {
    /// `POST /orders`; returns the server-assigned order identifier.
    async fn place_order(&self, token: &str, input: &PlaceOrderInput)
    -> Result<OrderId, ApiError>;

    /// `GET /orders/{id}`.
    async fn fetch_order(&self, token: &str, id: &OrderId) -> Result<Order, ApiError>;

    /// `PUT /orders/{id}/pay` with the external processor's capture
    /// details; returns the updated order.
    async fn capture_payment(
        &self,
        token: &str,
        id: &OrderId,
        capture: &serde_json::Value,
    ) -> Result<Order, ApiError>;

    /// `GET /keys/paypal`; client configuration for the payment widget.
    async fn paypal_client_id(&self, token: &str) -> Result<String, ApiError>;
}

/// Stock shape of `GET /products/{id}`; the rest of the document is
/// ignored here.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StockLevel {
    count_in_stock: i64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

const CATEGORIES_CACHE_KEY: &str = "categories";

/// Client for the booking backend REST API.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    http: reqwest::Client,
    base_url: String,
    // The category list changes rarely; cache it like product data
    categories: Cache<String, Vec<String>>,
}

impl BackendClient {
    /// Create a new backend client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        let categories = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(300))
            .build();

        Self {
            inner: Arc::new(BackendClientInner {
                http: reqwest::Client::new(),
                base_url: config.base_url.as_str().trim_end_matches('/').to_owned(),
                categories,
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json::<T>().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(server_error(status, &body))
        }
    }
}

/// Build an [`ApiError::Server`] from a response body, preferring the
/// backend's own message.
fn server_error(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body).map_or_else(
        |_| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_owned()
        },
        |parsed| parsed.message,
    );
    ApiError::Server { status, message }
}

impl ProductGateway for BackendClient {
    #[instrument(skip(self))]
    async fn stock_level(&self, key: &ProductKey) -> Result<i64, ApiError> {
        let response = self
            .inner
            .http
            .get(self.url(&format!("/products/{key}")))
            .send()
            .await?;
        let stock: StockLevel = Self::parse(response).await?;
        Ok(stock.count_in_stock)
    }

    #[instrument(skip(self))]
    async fn categories(&self) -> Result<Vec<String>, ApiError> {
        if let Some(cached) = self.inner.categories.get(CATEGORIES_CACHE_KEY).await {
            return Ok(cached);
        }

        let response = self
            .inner
            .http
            .get(self.url("/products/categories"))
            .send()
            .await?;
        let categories: Vec<String> = Self::parse(response).await?;

        self.inner
            .categories
            .insert(CATEGORIES_CACHE_KEY.to_owned(), categories.clone())
            .await;
        Ok(categories)
    }
}

impl AuthGateway for BackendClient {
    #[instrument(skip(self, password))]
    async fn login(&self, email: &str, password: &str) -> Result<UserSession, ApiError> {
        let response = self
            .inner
            .http
            .post(self.url("/users/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        Self::parse(response).await
    }

    #[instrument(skip(self, password))]
    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserSession, ApiError> {
        let response = self
            .inner
            .http
            .post(self.url("/users/register"))
            .json(&serde_json::json!({ "name": name, "email": email, "password": password }))
            .send()
            .await?;
        Self::parse(response).await
    }

    #[instrument(skip(self, token, update))]
    async fn update_profile(
        &self,
        token: &str,
        update: &ProfileUpdate,
    ) -> Result<UserSession, ApiError> {
        let response = self
            .inner
            .http
            .put(self.url("/users/profile"))
            .bearer_auth(token)
            .json(update)
            .send()
            .await?;
        Self::parse(response).await
    }
}

impl OrderGateway for BackendClient {
    #[instrument(skip(self, token, input))]
    async fn place_order(
        &self,
        token: &str,
        input: &PlaceOrderInput,
    ) -> Result<OrderId, ApiError> {
        let response = self
            .inner
            .http
            .post(self.url("/orders"))
            .bearer_auth(token)
            .json(input)
            .send()
            .await?;
        Self::parse(response).await
    }

    #[instrument(skip(self, token))]
    async fn fetch_order(&self, token: &str, id: &OrderId) -> Result<Order, ApiError> {
        let response = self
            .inner
            .http
            .get(self.url(&format!("/orders/{id}")))
            .bearer_auth(token)
            .send()
            .await?;
        Self::parse(response).await
    }

    #[instrument(skip(self, token, capture))]
    async fn capture_payment(
        &self,
        token: &str,
        id: &OrderId,
        capture: &serde_json::Value,
    ) -> Result<Order, ApiError> {
        let response = self
            .inner
            .http
            .put(self.url(&format!("/orders/{id}/pay")))
            .bearer_auth(token)
            .json(capture)
            .send()
            .await?;
        Self::parse(response).await
    }

    #[instrument(skip(self, token))]
    async fn paypal_client_id(&self, token: &str) -> Result<String, ApiError> {
        let response = self
            .inner
            .http
            .get(self.url("/keys/paypal"))
            .bearer_auth(token)
            .send()
            .await?;
        Self::parse(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_prefers_backend_message() {
        let err = server_error(
            StatusCode::UNAUTHORIZED,
            r#"{"message":"Token is not valid"}"#,
        );
        assert_eq!(err.to_string(), "Token is not valid");
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_server_error_falls_back_to_canonical_reason() {
        let err = server_error(StatusCode::BAD_GATEWAY, "<html>oops</html>");
        assert_eq!(err.to_string(), "Bad Gateway");
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_place_order_input_wire_shape() {
        let input = PlaceOrderInput {
            order_items: vec![],
            payment_method: PaymentMethod::PayPal,
            items_price: rust_decimal::dec!(25),
            total_price: rust_decimal::dec!(25),
        };
        let json = serde_json::to_value(&input).expect("serialize");
        assert!(json.get("orderItems").is_some());
        assert_eq!(json.get("paymentMethod"), Some(&serde_json::json!("PayPal")));
    }

    #[test]
    fn test_profile_update_omits_unchanged_password() {
        let update = ProfileUpdate {
            name: "Maria".to_string(),
            email: "maria@example.com".to_string(),
            password: None,
        };
        let json = serde_json::to_value(&update).expect("serialize");
        assert!(json.get("password").is_none());
    }
}
