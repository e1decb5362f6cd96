//! Application state with a single reducer entry point.
//!
//! Session, cart and checkout selections live in one [`AppState`] value.
//! All mutation goes through [`Store::dispatch`] with a closed [`Action`]
//! union: the reducer applies the transition in memory, and only after it
//! commits are the resulting persistence effects written through to
//! durable storage. A storage failure therefore never leaves a half
//! applied state transition, and is reported distinctly.

use ciclo_core::ProductKey;

use crate::auth;
use crate::models::{Cart, CartLineItem, PaymentMethod, UserSession};
use crate::storage::{StorageBackend, StorageError, keys};

/// Dark-mode flag encoding in durable storage.
const DARK_MODE_ON: &str = "ON";
const DARK_MODE_OFF: &str = "OFF";

/// The whole client-held state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    /// Display preference, independent of authentication.
    pub dark_mode: bool,
    /// Active session, if logged in.
    pub user: Option<UserSession>,
    /// The shopping cart.
    pub cart: Cart,
    /// Payment method chosen in the checkout wizard, if any.
    pub payment_method: Option<PaymentMethod>,
}

/// Every way the client state can change.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Replace the session wholesale (login, register, profile update).
    Login(UserSession),
    /// Drop the session and all dependent persisted artifacts.
    Logout,
    /// Toggle the display preference.
    SetDarkMode(bool),
    /// Insert or replace the cart line for the item's product key.
    CartUpsertItem(CartLineItem),
    /// Delete a cart line; no-op when absent.
    CartRemoveItem(ProductKey),
    /// Empty the cart (used once, right after successful placement).
    CartClear,
    /// Record the chosen payment method.
    SavePaymentMethod(PaymentMethod),
}

/// Persistence effects produced by a committed state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Effect {
    PersistUser,
    RemoveUser,
    PersistCart,
    RemoveCart,
    PersistDarkMode,
    PersistPaymentMethod,
    RemovePaymentMethod,
}

/// Apply `action` to `state` and report what must be persisted.
///
/// Pure with respect to storage; the caller writes the effects through.
fn reduce(state: &mut AppState, action: Action) -> Vec<Effect> {
    match action {
        Action::Login(user) => {
            state.user = Some(user);
            vec![Effect::PersistUser]
        }
        Action::Logout => {
            state.user = None;
            state.cart.clear();
            state.payment_method = None;
            // dark mode deliberately survives logout
            vec![
                Effect::RemoveUser,
                Effect::RemoveCart,
                Effect::RemovePaymentMethod,
            ]
        }
        Action::SetDarkMode(on) => {
            state.dark_mode = on;
            vec![Effect::PersistDarkMode]
        }
        Action::CartUpsertItem(item) => {
            state.cart.upsert(item);
            vec![Effect::PersistCart]
        }
        Action::CartRemoveItem(key) => {
            state.cart.remove(&key);
            vec![Effect::PersistCart]
        }
        Action::CartClear => {
            state.cart.clear();
            vec![Effect::RemoveCart]
        }
        Action::SavePaymentMethod(method) => {
            state.payment_method = Some(method);
            vec![Effect::PersistPaymentMethod]
        }
    }
}

/// State container with write-through persistence.
#[derive(Debug)]
pub struct Store<S> {
    state: AppState,
    storage: S,
}

impl<S: StorageBackend> Store<S> {
    /// Rehydrate state from durable storage.
    ///
    /// Absent or unreadable values fall back to defaults; a session whose
    /// token has expired is treated as absent and its record is removed.
    pub fn load(mut storage: S) -> Self {
        let dark_mode = matches!(storage.get(keys::DARK_MODE).as_deref(), Some(DARK_MODE_ON));

        let user = match storage.get(keys::USER_INFO) {
            None => None,
            Some(raw) => match serde_json::from_str::<UserSession>(&raw) {
                Ok(user) if auth::token_is_current(&user.token) => Some(user),
                Ok(user) => {
                    tracing::info!(user = %user.id, "Dropping session with expired token");
                    let _ = storage.remove(keys::USER_INFO);
                    None
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding unreadable session record");
                    let _ = storage.remove(keys::USER_INFO);
                    None
                }
            },
        };

        let cart = storage
            .get(keys::CART_ITEMS)
            .and_then(|raw| match serde_json::from_str::<Cart>(&raw) {
                Ok(cart) => Some(cart),
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding unreadable cart snapshot");
                    None
                }
            })
            .unwrap_or_default();

        let payment_method = storage
            .get(keys::PAYMENT_METHOD)
            .as_deref()
            .and_then(PaymentMethod::parse);

        Self {
            state: AppState {
                dark_mode,
                user,
                cart,
                payment_method,
            },
            storage,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// The storage backend (read-only; mutation goes through `dispatch`).
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Apply an action and write the resulting snapshot through.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when persistence fails. The in-memory
    /// transition has committed by then; callers surface the error and
    /// the next successful mutation rewrites the snapshot.
    pub fn dispatch(&mut self, action: Action) -> Result<(), StorageError> {
        let effects = reduce(&mut self.state, action);
        self.commit(&effects)
    }

    fn commit(&mut self, effects: &[Effect]) -> Result<(), StorageError> {
        for effect in effects {
            match effect {
                Effect::PersistUser => {
                    if let Some(user) = &self.state.user {
                        let encoded = serde_json::to_string(user)?;
                        self.storage.set(keys::USER_INFO, &encoded)?;
                    }
                }
                Effect::RemoveUser => self.storage.remove(keys::USER_INFO)?,
                Effect::PersistCart => {
                    let encoded = serde_json::to_string(&self.state.cart)?;
                    self.storage.set(keys::CART_ITEMS, &encoded)?;
                }
                Effect::RemoveCart => self.storage.remove(keys::CART_ITEMS)?,
                Effect::PersistDarkMode => {
                    let encoded = if self.state.dark_mode {
                        DARK_MODE_ON
                    } else {
                        DARK_MODE_OFF
                    };
                    self.storage.set(keys::DARK_MODE, encoded)?;
                }
                Effect::PersistPaymentMethod => {
                    if let Some(method) = self.state.payment_method {
                        self.storage.set(keys::PAYMENT_METHOD, method.as_str())?;
                    }
                }
                Effect::RemovePaymentMethod => self.storage.remove(keys::PAYMENT_METHOD)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;

    use ciclo_core::{Email, Slug, UserId};

    use super::*;
    use crate::storage::MemoryStorage;

    fn session(ttl_secs: i64) -> UserSession {
        UserSession {
            id: UserId::new("u1"),
            name: "Maria".to_string(),
            email: Email::parse("maria@example.com").expect("valid email"),
            token: auth::testing::signed_token(ttl_secs),
            is_admin: false,
        }
    }

    fn line(key: &str, price: rust_decimal::Decimal, quantity: u32) -> CartLineItem {
        CartLineItem {
            key: ProductKey::new(key),
            name: format!("Show {key}"),
            count_in_stock: 10,
            slug: Slug::new(format!("show-{key}")),
            price,
            image: format!("https://cdn.example/{key}.jpg"),
            quantity,
        }
    }

    #[test]
    fn test_mutations_write_through() {
        let mut store = Store::load(MemoryStorage::new());

        store
            .dispatch(Action::CartUpsertItem(line("p1", dec!(10), 2)))
            .expect("dispatch");
        store
            .dispatch(Action::SetDarkMode(true))
            .expect("dispatch");
        store
            .dispatch(Action::SavePaymentMethod(PaymentMethod::Cash))
            .expect("dispatch");

        assert!(store.storage().get(keys::CART_ITEMS).is_some());
        assert_eq!(store.storage().get(keys::DARK_MODE).as_deref(), Some("ON"));
        assert_eq!(
            store.storage().get(keys::PAYMENT_METHOD).as_deref(),
            Some("Cash")
        );
    }

    #[test]
    fn test_reload_observes_latest_state() {
        let mut store = Store::load(MemoryStorage::new());
        store.dispatch(Action::Login(session(3600))).expect("login");
        store
            .dispatch(Action::CartUpsertItem(line("p1", dec!(10), 2)))
            .expect("add");
        store
            .dispatch(Action::SavePaymentMethod(PaymentMethod::PayPal))
            .expect("save method");
        store.dispatch(Action::SetDarkMode(true)).expect("dark mode");

        let reloaded = Store::load(store.storage().clone());
        assert!(reloaded.state().dark_mode);
        assert_eq!(
            reloaded.state().user.as_ref().map(|u| u.name.as_str()),
            Some("Maria")
        );
        assert_eq!(reloaded.state().cart.item_count(), 2);
        assert_eq!(
            reloaded.state().payment_method,
            Some(PaymentMethod::PayPal)
        );
    }

    #[test]
    fn test_logout_clears_dependent_keys_but_not_dark_mode() {
        let mut store = Store::load(MemoryStorage::new());
        store.dispatch(Action::SetDarkMode(true)).expect("dark mode");
        store.dispatch(Action::Login(session(3600))).expect("login");
        store
            .dispatch(Action::CartUpsertItem(line("p1", dec!(10), 1)))
            .expect("add");
        store
            .dispatch(Action::SavePaymentMethod(PaymentMethod::Cash))
            .expect("save method");

        store.dispatch(Action::Logout).expect("logout");

        assert!(store.state().user.is_none());
        assert!(store.state().cart.is_empty());
        assert_eq!(store.state().payment_method, None);
        assert_eq!(store.storage().get(keys::USER_INFO), None);
        assert_eq!(store.storage().get(keys::CART_ITEMS), None);
        assert_eq!(store.storage().get(keys::PAYMENT_METHOD), None);
        // display preference survives
        assert_eq!(store.storage().get(keys::DARK_MODE).as_deref(), Some("ON"));
        assert!(store.state().dark_mode);
    }

    #[test]
    fn test_expired_session_dropped_on_load() {
        let mut storage = MemoryStorage::new();
        let expired = session(-60);
        storage
            .set(
                keys::USER_INFO,
                &serde_json::to_string(&expired).expect("serialize"),
            )
            .expect("set");

        let store = Store::load(storage);
        assert!(store.state().user.is_none());
        assert_eq!(store.storage().get(keys::USER_INFO), None);
    }

    #[test]
    fn test_corrupt_values_fall_back_to_defaults() {
        let mut storage = MemoryStorage::new();
        storage.set(keys::USER_INFO, "{broken").expect("set");
        storage.set(keys::CART_ITEMS, "not json").expect("set");
        storage.set(keys::PAYMENT_METHOD, "Cheque").expect("set");
        storage.set(keys::DARK_MODE, "sideways").expect("set");

        let store = Store::load(storage);
        assert!(store.state().user.is_none());
        assert!(store.state().cart.is_empty());
        assert_eq!(store.state().payment_method, None);
        assert!(!store.state().dark_mode);
    }

    #[test]
    fn test_upsert_never_duplicates_a_key() {
        let mut store = Store::load(MemoryStorage::new());
        store
            .dispatch(Action::CartUpsertItem(line("p1", dec!(10), 1)))
            .expect("add");
        store
            .dispatch(Action::CartUpsertItem(line("p1", dec!(10), 4)))
            .expect("replace");

        assert_eq!(store.state().cart.items().len(), 1);
        assert_eq!(store.state().cart.item_count(), 4);
    }

    #[test]
    fn test_clear_removes_persisted_cart_key() {
        let mut store = Store::load(MemoryStorage::new());
        store
            .dispatch(Action::CartUpsertItem(line("p1", dec!(10), 1)))
            .expect("add");
        assert!(store.storage().get(keys::CART_ITEMS).is_some());

        store.dispatch(Action::CartClear).expect("clear");
        assert!(store.state().cart.is_empty());
        assert_eq!(store.storage().get(keys::CART_ITEMS), None);
    }
}
