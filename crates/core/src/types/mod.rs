//! Core types for the CICLO bilheteira.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod key;
pub mod money;

pub use email::{Email, EmailError};
pub use key::*;
pub use money::round2;
