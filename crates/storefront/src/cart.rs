//! Cart operations with live stock checks.
//!
//! Every quantity change asks the backend for the current stock level
//! before committing; a sold-out request leaves the cart byte for byte
//! unchanged. The committed line carries the freshly observed stock
//! snapshot so the quantity selector stays honest.

use tracing::instrument;

use ciclo_core::ProductKey;

use crate::api::ProductGateway;
use crate::error::{AppError, Result};
use crate::forms::ValidationError;
use crate::models::{CartLineItem, Product};
use crate::storage::StorageBackend;
use crate::store::{Action, Store};

fn line_from_product(product: &Product, count_in_stock: i64, quantity: u32) -> CartLineItem {
    CartLineItem {
        key: product.id.clone(),
        name: product.name.clone(),
        count_in_stock,
        slug: product.slug.current.clone(),
        price: product.price,
        image: product.image.clone(),
        quantity,
    }
}

/// Add one ticket for `product` to the cart.
///
/// An existing line grows by one; a new line starts at one. The stock
/// level is re-read from the backend and the request is rejected when it
/// cannot cover the new quantity.
///
/// # Errors
///
/// Returns [`AppError::OutOfStock`] when stock cannot cover the
/// requested quantity, [`AppError::Api`] when the stock lookup fails, or
/// [`AppError::Storage`] when the committed cart cannot be persisted.
#[instrument(skip(store, products, product), fields(product = %product.id))]
pub async fn add_to_cart<S, P>(
    store: &mut Store<S>,
    products: &P,
    product: &Product,
) -> Result<()>
where
    S: StorageBackend,
    P: ProductGateway,
{
    let quantity = store
        .state()
        .cart
        .get(&product.id)
        .map_or(1, |line| line.quantity + 1);

    let stock = products.stock_level(&product.id).await?;
    if stock < i64::from(quantity) {
        tracing::info!(stock, quantity, "Rejecting add, not enough stock");
        return Err(AppError::OutOfStock);
    }

    store.dispatch(Action::CartUpsertItem(line_from_product(
        product, stock, quantity,
    )))?;
    Ok(())
}

/// Set the quantity of an existing cart line.
///
/// # Errors
///
/// Returns [`AppError::NotFound`] when no line exists for `key`,
/// [`AppError::Validation`] for a zero quantity (removal is explicit,
/// via [`remove_item`]), [`AppError::OutOfStock`] when stock cannot
/// cover the new quantity, [`AppError::Api`] when the stock lookup
/// fails, or [`AppError::Storage`] when persistence fails.
#[instrument(skip(store, products))]
pub async fn set_quantity<S, P>(
    store: &mut Store<S>,
    products: &P,
    key: &ProductKey,
    quantity: u32,
) -> Result<()>
where
    S: StorageBackend,
    P: ProductGateway,
{
    if quantity == 0 {
        return Err(AppError::Validation(ValidationError::Invalid {
            field: "quantity",
        }));
    }

    let mut line = store
        .state()
        .cart
        .get(key)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("cart line for {key}")))?;

    let stock = products.stock_level(key).await?;
    if stock < i64::from(quantity) {
        tracing::info!(stock, quantity, "Rejecting quantity change, not enough stock");
        return Err(AppError::OutOfStock);
    }

    line.count_in_stock = stock;
    line.quantity = quantity;
    store.dispatch(Action::CartUpsertItem(line))?;
    Ok(())
}

/// Remove a cart line; absent keys are a no-op.
///
/// # Errors
///
/// Returns [`AppError::Storage`] when the shrunk cart cannot be
/// persisted.
pub fn remove_item<S: StorageBackend>(store: &mut Store<S>, key: &ProductKey) -> Result<()> {
    store.dispatch(Action::CartRemoveItem(key.clone()))?;
    Ok(())
}
