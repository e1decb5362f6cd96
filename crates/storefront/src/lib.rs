//! CICLO Bilheteira - storefront client core.
//!
//! This crate implements the stateful half of the ticket-booking
//! storefront: the cart/session reducer, the checkout wizard, and the
//! order lifecycle, together with the HTTP clients they depend on.
//!
//! # Architecture
//!
//! - [`store`] - application state with a single reducer entry point,
//!   persisted write-through to durable client storage
//! - [`cart`] - cart mutations gated by live stock checks
//! - [`checkout`] - the 3-step wizard (cart, payment method, review)
//! - [`order`] - order placement, confirmation fetch, payment capture
//! - [`api`] - REST client for the booking backend (bearer-token auth)
//! - [`catalog`] - query facade over the headless content store
//!
//! Page rendering, navigation chrome, and theming live in the web frontend
//! and are not part of this crate.

#![cfg_attr(not(test), forbid(unsafe_code))]
// Gateway traits are generic seams used with concrete clients or test
// fakes; they are never dyn-dispatched.
#![allow(async_fn_in_trait)]

pub mod account;
pub mod api;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod forms;
pub mod models;
pub mod order;
pub mod storage;
pub mod store;

pub use error::{AppError, Result};

#[cfg(test)]
pub(crate) mod testing {
    //! Shared test setup.

    use tracing_subscriber::EnvFilter;

    /// Route logs through the test capture writer. Safe to call from
    /// every test; only the first call installs the subscriber.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}
