//! Checkout wizard sequencing and order placement.
//!
//! The wizard is a fixed sequence of steps; each step declares what must
//! already be in place before it may render. Guards are re-evaluated on
//! every entry, so a reload or a deep link into a later step falls back
//! to wherever the missing prerequisite is collected.

use tracing::instrument;

use ciclo_core::OrderId;

use crate::api::{OrderGateway, PlaceOrderInput};
use crate::error::{AppError, Result};
use crate::forms::ValidationError;
use crate::models::PaymentMethod;
use crate::storage::StorageBackend;
use crate::store::{Action, AppState, Store};

/// Steps of the checkout wizard, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CheckoutStep {
    /// Review the cart contents.
    Cart,
    /// Choose the payment method.
    Payment,
    /// Review totals and place the order.
    PlaceOrder,
}

impl CheckoutStep {
    /// Zero-based position, for the progress indicator.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Cart => 0,
            Self::Payment => 1,
            Self::PlaceOrder => 2,
        }
    }

    /// Route path of the step's screen.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Cart => "/cart",
            Self::Payment => "/payment",
            Self::PlaceOrder => "/placeorder",
        }
    }
}

/// Outcome of asking to enter a wizard step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepGate {
    /// All prerequisites hold; render the step.
    Proceed,
    /// No session; go log in, then come back to `redirect`.
    RedirectToLogin {
        /// Return path carried through the login screen.
        redirect: &'static str,
    },
    /// A prerequisite collected at an earlier step is missing.
    Redirect(CheckoutStep),
}

/// Evaluate the guards for entering `step` under `state`.
///
/// The cart step is always open. Later steps need a session, and the
/// final step additionally needs a non-empty cart and a chosen payment
/// method. When both are missing the cart redirect wins; everything
/// downstream of an empty cart is moot.
#[must_use]
pub fn enter(step: CheckoutStep, state: &AppState) -> StepGate {
    if step > CheckoutStep::Cart && state.user.is_none() {
        return StepGate::RedirectToLogin {
            redirect: step.path(),
        };
    }
    if step == CheckoutStep::PlaceOrder {
        if state.cart.is_empty() {
            return StepGate::Redirect(CheckoutStep::Cart);
        }
        if state.payment_method.is_none() {
            return StepGate::Redirect(CheckoutStep::Payment);
        }
    }
    StepGate::Proceed
}

/// Record the payment method chosen on the payment step.
///
/// # Errors
///
/// Returns [`AppError::Validation`] when no method is selected, or
/// [`AppError::Storage`] when the choice cannot be persisted.
pub fn choose_payment_method<S: StorageBackend>(
    store: &mut Store<S>,
    method: Option<PaymentMethod>,
) -> Result<()> {
    let method = method.ok_or(AppError::Validation(ValidationError::Required {
        field: "payment method",
    }))?;
    store.dispatch(Action::SavePaymentMethod(method))?;
    Ok(())
}

/// Submission status of the final step, for the view layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Placement {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// A placement request is in flight; the submit control is disabled.
    Submitting,
    /// The backend accepted the order.
    Placed(OrderId),
    /// The backend rejected the order; the cart is intact and the user
    /// may retry.
    Failed(String),
}

/// Place the order from the current cart and payment method.
///
/// On success the cart is cleared, its persisted record removed, and the
/// caller navigates to the confirmation screen for the returned id. On
/// failure the cart and payment method are left untouched so the attempt
/// can be retried.
///
/// # Errors
///
/// Returns [`AppError::Unauthenticated`] without a session,
/// [`AppError::Validation`] when no payment method is chosen or the cart
/// is empty, [`AppError::Api`] when the backend rejects the order, or
/// [`AppError::Storage`] when clearing the cart fails after acceptance.
#[instrument(skip(store, orders, placement))]
pub async fn place_order<S, O>(
    store: &mut Store<S>,
    orders: &O,
    placement: &mut Placement,
) -> Result<OrderId>
where
    S: StorageBackend,
    O: OrderGateway,
{
    let Some(user) = &store.state().user else {
        return Err(AppError::Unauthenticated {
            redirect: CheckoutStep::PlaceOrder.path().to_string(),
        });
    };
    if store.state().cart.is_empty() {
        return Err(AppError::Validation(ValidationError::Required {
            field: "cart",
        }));
    }
    let method = store
        .state()
        .payment_method
        .ok_or(AppError::Validation(ValidationError::Required {
            field: "payment method",
        }))?;

    let items_price = store.state().cart.items_price();
    let input = PlaceOrderInput {
        order_items: store.state().cart.snapshot_items(),
        payment_method: method,
        items_price,
        total_price: items_price,
    };
    let token = user.token.clone();

    *placement = Placement::Submitting;
    let id = match orders.place_order(&token, &input).await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(error = %e, "Order placement rejected");
            *placement = Placement::Failed(e.to_string());
            return Err(e.into());
        }
    };

    tracing::info!(order = %id, "Order placed");
    *placement = Placement::Placed(id.clone());
    store.dispatch(Action::CartClear)?;
    Ok(id)
}
