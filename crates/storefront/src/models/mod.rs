//! Domain models for the storefront client.

pub mod cart;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{Cart, CartLineItem};
pub use order::{Order, OrderItem, PaymentMethod};
pub use product::{Product, SlugRef};
pub use user::UserSession;
