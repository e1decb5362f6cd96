//! CICLO Core - Shared types library.
//!
//! This crate provides common types used across the bilheteira components:
//! - `storefront` - The client core: cart, checkout, and order lifecycle
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe keys, emails, and money helpers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
