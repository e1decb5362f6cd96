//! Account flows: login, registration, profile updates, logout.
//!
//! Each flow validates its form locally first, calls the backend, and
//! commits the returned session through the store. The session record is
//! always replaced wholesale, never patched.

use crate::api::{AuthGateway, ProfileUpdate};
use crate::error::{AppError, Result};
use crate::forms::{LoginForm, ProfileForm, RegisterForm};
use crate::models::UserSession;
use crate::storage::StorageBackend;
use crate::store::{Action, Store};

/// Landing path after logout.
const LANDING_PATH: &str = "/";

/// Log in and persist the returned session.
///
/// # Errors
///
/// Validation failures never reach the backend; backend rejections
/// (wrong credentials, server errors) surface as [`AppError::Api`].
pub async fn login<S, A>(store: &mut Store<S>, auth: &A, form: &LoginForm) -> Result<UserSession>
where
    S: StorageBackend,
    A: AuthGateway,
{
    form.validate()?;
    let session = auth.login(&form.email, &form.password).await?;
    store.dispatch(Action::Login(session.clone()))?;
    Ok(session)
}

/// Register a new account and persist the returned session.
///
/// # Errors
///
/// Validation failures never reach the backend; backend rejections
/// surface as [`AppError::Api`].
pub async fn register<S, A>(
    store: &mut Store<S>,
    auth: &A,
    form: &RegisterForm,
) -> Result<UserSession>
where
    S: StorageBackend,
    A: AuthGateway,
{
    form.validate()?;
    let session = auth.register(&form.name, &form.email, &form.password).await?;
    store.dispatch(Action::Login(session.clone()))?;
    Ok(session)
}

/// Update name/email/password and replace the stored session with the
/// backend's response.
///
/// # Errors
///
/// Returns [`AppError::Unauthenticated`] without an active session, or
/// when the backend rejects the token.
pub async fn update_profile<S, A>(
    store: &mut Store<S>,
    auth: &A,
    form: &ProfileForm,
) -> Result<UserSession>
where
    S: StorageBackend,
    A: AuthGateway,
{
    form.validate()?;
    let token = store
        .state()
        .user
        .as_ref()
        .map(|user| user.token.clone())
        .ok_or_else(|| AppError::Unauthenticated {
            redirect: "/profile".to_string(),
        })?;

    let update = ProfileUpdate {
        name: form.name.clone(),
        email: form.email.clone(),
        password: form.new_password(),
    };
    let session = match auth.update_profile(&token, &update).await {
        Ok(session) => session,
        Err(e) if e.is_unauthorized() => {
            return Err(AppError::Unauthenticated {
                redirect: "/profile".to_string(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    store.dispatch(Action::Login(session.clone()))?;
    Ok(session)
}

/// Log out, clearing the session and all dependent persisted artifacts.
///
/// Returns the path of the anonymous landing state.
///
/// # Errors
///
/// Returns [`AppError::Storage`] when the persisted keys cannot be
/// removed.
pub fn logout<S: StorageBackend>(store: &mut Store<S>) -> Result<&'static str> {
    store.dispatch(Action::Logout)?;
    Ok(LANDING_PATH)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use ciclo_core::{Email, UserId};

    use super::*;
    use crate::api::ApiError;
    use crate::storage::{MemoryStorage, keys};

    struct FakeAuth {
        calls: Cell<u32>,
        reject_with: Option<reqwest::StatusCode>,
    }

    impl FakeAuth {
        fn accepting() -> Self {
            Self {
                calls: Cell::new(0),
                reject_with: None,
            }
        }

        fn rejecting(status: reqwest::StatusCode) -> Self {
            Self {
                calls: Cell::new(0),
                reject_with: Some(status),
            }
        }

        fn session(name: &str, email: &str) -> UserSession {
            UserSession {
                id: UserId::new("u1"),
                name: name.to_string(),
                email: Email::parse(email).expect("valid email"),
                token: crate::auth::testing::signed_token(3600),
                is_admin: false,
            }
        }

        fn respond(&self, name: &str, email: &str) -> Result<UserSession, ApiError> {
            self.calls.set(self.calls.get() + 1);
            match self.reject_with {
                Some(status) => Err(ApiError::Server {
                    status,
                    message: "rejected".to_string(),
                }),
                None => Ok(Self::session(name, email)),
            }
        }
    }

    impl AuthGateway for FakeAuth {
        async fn login(&self, email: &str, _password: &str) -> Result<UserSession, ApiError> {
            self.respond("Maria", email)
        }

        async fn register(
            &self,
            name: &str,
            email: &str,
            _password: &str,
        ) -> Result<UserSession, ApiError> {
            self.respond(name, email)
        }

        async fn update_profile(
            &self,
            _token: &str,
            update: &ProfileUpdate,
        ) -> Result<UserSession, ApiError> {
            self.respond(&update.name, &update.email)
        }
    }

    fn login_form() -> LoginForm {
        LoginForm {
            email: "maria@example.com".to_string(),
            password: "secret1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_persists_session() {
        let mut store = Store::load(MemoryStorage::new());
        let auth = FakeAuth::accepting();

        let session = login(&mut store, &auth, &login_form()).await.expect("login");
        assert_eq!(session.name, "Maria");
        assert_eq!(store.state().user.as_ref(), Some(&session));
        assert!(store.storage().get(keys::USER_INFO).is_some());
    }

    #[tokio::test]
    async fn test_invalid_form_never_contacts_backend() {
        let mut store = Store::load(MemoryStorage::new());
        let auth = FakeAuth::accepting();

        let form = LoginForm {
            email: "broken".to_string(),
            password: "secret1".to_string(),
        };
        let err = login(&mut store, &auth, &form).await.expect_err("rejected");
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(auth.calls.get(), 0);
        assert!(store.state().user.is_none());
    }

    #[tokio::test]
    async fn test_profile_update_replaces_session_wholesale() {
        let mut store = Store::load(MemoryStorage::new());
        let auth = FakeAuth::accepting();
        login(&mut store, &auth, &login_form()).await.expect("login");

        let form = ProfileForm {
            name: "Maria Silva".to_string(),
            email: "maria.silva@example.com".to_string(),
            password: String::new(),
            confirm_password: String::new(),
        };
        let session = update_profile(&mut store, &auth, &form)
            .await
            .expect("update");
        assert_eq!(session.name, "Maria Silva");
        assert_eq!(
            store.state().user.as_ref().map(|u| u.email.as_str()),
            Some("maria.silva@example.com")
        );
    }

    #[tokio::test]
    async fn test_profile_update_requires_session() {
        let mut store = Store::load(MemoryStorage::new());
        let auth = FakeAuth::accepting();

        let form = ProfileForm {
            name: "Maria".to_string(),
            email: "maria@example.com".to_string(),
            password: String::new(),
            confirm_password: String::new(),
        };
        let err = update_profile(&mut store, &auth, &form)
            .await
            .expect_err("rejected");
        assert!(matches!(err, AppError::Unauthenticated { .. }));
        assert_eq!(auth.calls.get(), 0);
    }

    #[tokio::test]
    async fn test_rejected_token_maps_to_unauthenticated() {
        let mut store = Store::load(MemoryStorage::new());
        login(&mut store, &FakeAuth::accepting(), &login_form())
            .await
            .expect("login");

        let rejecting = FakeAuth::rejecting(reqwest::StatusCode::UNAUTHORIZED);
        let form = ProfileForm {
            name: "Maria".to_string(),
            email: "maria@example.com".to_string(),
            password: String::new(),
            confirm_password: String::new(),
        };
        let err = update_profile(&mut store, &rejecting, &form)
            .await
            .expect_err("rejected");
        assert!(matches!(err, AppError::Unauthenticated { .. }));
    }

    #[tokio::test]
    async fn test_logout_returns_to_landing() {
        let mut store = Store::load(MemoryStorage::new());
        let auth = FakeAuth::accepting();
        login(&mut store, &auth, &login_form()).await.expect("login");

        let path = logout(&mut store).expect("logout");
        assert_eq!(path, "/");
        assert!(store.state().user.is_none());
        assert_eq!(store.storage().get(keys::USER_INFO), None);
    }
}
