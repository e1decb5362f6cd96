//! Order confirmation screen state and the unpaid-to-paid lifecycle.
//!
//! An order is born unpaid and becomes paid only when the backend says
//! so. A successful capture on the payment widget does not flip any
//! local flag to paid; it marks the view stale, and the follow-up fetch
//! brings back the authoritative record with `isPaid` and `paidAt` set.

use serde_json::Value;
use tracing::instrument;

use ciclo_core::OrderId;

use crate::api::OrderGateway;
use crate::error::{AppError, Result};
use crate::models::Order;
use crate::storage::StorageBackend;
use crate::store::Store;

/// Where the confirmation screen is in the order lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderFlow {
    /// No order loaded yet.
    Loading,
    /// The order could not be fetched.
    Failed,
    /// Loaded and awaiting payment.
    Unpaid,
    /// The processor accepted the capture; awaiting the refreshed
    /// record from the backend.
    CaptureAccepted,
    /// The backend confirmed payment.
    Paid,
}

/// State behind the `/order/{id}` screen.
#[derive(Debug, Default)]
pub struct OrderView {
    order: Option<Order>,
    error: Option<String>,
    success_pay: bool,
    error_pay: Option<String>,
}

impl OrderView {
    /// Fresh view with nothing loaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The loaded order, if any.
    #[must_use]
    pub const fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    /// Fetch error to display, if the last load failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Capture error to display; the widget stays up for a retry.
    #[must_use]
    pub fn pay_error(&self) -> Option<&str> {
        self.error_pay.as_deref()
    }

    /// Whether the held record is stale for `requested`.
    ///
    /// True when nothing is loaded yet, when a capture succeeded since
    /// the last fetch, or when the screen navigated to a different order.
    #[must_use]
    pub fn needs_fetch(&self, requested: &OrderId) -> bool {
        match &self.order {
            None => true,
            Some(order) => self.success_pay || &order.id != requested,
        }
    }

    /// Current lifecycle position, for rendering.
    #[must_use]
    pub fn flow(&self) -> OrderFlow {
        match &self.order {
            None if self.error.is_some() => OrderFlow::Failed,
            None => OrderFlow::Loading,
            Some(order) if order.is_paid => OrderFlow::Paid,
            Some(_) if self.success_pay => OrderFlow::CaptureAccepted,
            Some(_) => OrderFlow::Unpaid,
        }
    }

    /// Load the order for `requested`, if the held record is stale.
    ///
    /// A successful fetch also resets the capture flags, so the view
    /// will not refetch again until something changes.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthenticated`] without a session, or
    /// [`AppError::Api`] when the backend rejects the fetch.
    #[instrument(skip(self, store, orders))]
    pub async fn load<S, O>(
        &mut self,
        store: &Store<S>,
        orders: &O,
        requested: &OrderId,
    ) -> Result<()>
    where
        S: StorageBackend,
        O: OrderGateway,
    {
        let token = session_token(store)?;
        if !self.needs_fetch(requested) {
            return Ok(());
        }

        match orders.fetch_order(&token, requested).await {
            Ok(order) => {
                self.order = Some(order);
                self.error = None;
                self.success_pay = false;
                self.error_pay = None;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Record the processor's capture result with the backend.
    ///
    /// On success the view is marked stale; the caller runs [`load`]
    /// again and the refreshed record carries the paid state. On failure
    /// the order stays unpaid locally and the capture can be retried.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthenticated`] without a session,
    /// [`AppError::NotFound`] when no order is loaded, or
    /// [`AppError::PaymentCapture`] when the backend rejects the
    /// capture.
    ///
    /// [`load`]: Self::load
    #[instrument(skip_all)]
    pub async fn capture<S, O>(
        &mut self,
        store: &Store<S>,
        orders: &O,
        capture: &Value,
    ) -> Result<()>
    where
        S: StorageBackend,
        O: OrderGateway,
    {
        let token = session_token(store)?;
        let id = self
            .order
            .as_ref()
            .map(|order| order.id.clone())
            .ok_or_else(|| AppError::NotFound("order to pay".to_string()))?;

        match orders.capture_payment(&token, &id, capture).await {
            Ok(_) => {
                tracing::info!(order = %id, "Payment capture accepted");
                self.success_pay = true;
                self.error_pay = None;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(order = %id, error = %e, "Payment capture rejected");
                self.error_pay = Some(e.to_string());
                Err(AppError::PaymentCapture(e.to_string()))
            }
        }
    }
}

/// Client id for mounting the payment widget.
///
/// # Errors
///
/// Returns [`AppError::Unauthenticated`] without a session, or
/// [`AppError::Api`] when the lookup fails.
pub async fn paypal_client_id<S, O>(store: &Store<S>, orders: &O) -> Result<String>
where
    S: StorageBackend,
    O: OrderGateway,
{
    let token = session_token(store)?;
    Ok(orders.paypal_client_id(&token).await?)
}

fn session_token<S: StorageBackend>(store: &Store<S>) -> Result<String> {
    store
        .state()
        .user
        .as_ref()
        .map(|user| user.token.clone())
        .ok_or_else(|| AppError::Unauthenticated {
            redirect: "/login".to_string(),
        })
}
