//! Unified error handling for the storefront client.
//!
//! Everything here is recoverable: validation and stock errors are shown
//! inline at the point of action, backend and catalog failures surface as
//! transient notifications, and the worst case is a checkout step the
//! user retries. Nothing is fatal to the process.

use thiserror::Error;

use crate::api::ApiError;
use crate::catalog::CatalogError;
use crate::forms::ValidationError;
use crate::storage::StorageError;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Requested quantity exceeds live stock; the cart is left unchanged.
    #[error("not enough tickets in stock")]
    OutOfStock,

    /// No active session; the caller should redirect to login and come
    /// back to `redirect` afterwards.
    #[error("login required")]
    Unauthenticated {
        /// Return path to resume at after login.
        redirect: String,
    },

    /// A form field failed a client-side rule; the server was never
    /// contacted.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A backend call failed (transport or non-2xx response).
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The payment was approved externally but the server-side capture
    /// was rejected; the order stays unpaid and capture may be retried.
    #[error("payment capture failed: {0}")]
    PaymentCapture(String),

    /// Durable client storage could not be written.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A catalog query failed; shown inline, never crashes the page.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A referenced resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

/// Result type alias defaulting to `AppError`.
pub type Result<T, E = AppError> = std::result::Result<T, E>;
