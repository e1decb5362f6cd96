//! Client-side form validation.
//!
//! Field rules run before any request is made; a failing rule blocks
//! submission and the server is never contacted.

use thiserror::Error;

use ciclo_core::Email;

/// Minimum password length for registration and profile updates.
const MIN_PASSWORD_LENGTH: usize = 6;

/// A form field failed a client-side rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is empty.
    #[error("{field} is required")]
    Required {
        /// Field name.
        field: &'static str,
    },

    /// A field value does not match its pattern.
    #[error("{field} is invalid")]
    Invalid {
        /// Field name.
        field: &'static str,
    },

    /// A field value is shorter than allowed.
    #[error("{field} must be at least {min} characters")]
    TooShort {
        /// Field name.
        field: &'static str,
        /// Minimum length.
        min: usize,
    },

    /// The password confirmation differs from the password.
    #[error("passwords do not match")]
    PasswordMismatch,
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required { field })
    } else {
        Ok(())
    }
}

fn validate_email(value: &str) -> Result<(), ValidationError> {
    require("email", value)?;
    Email::parse(value)
        .map(|_| ())
        .map_err(|_| ValidationError::Invalid { field: "email" })
}

fn validate_new_password(password: &str, confirm: &str) -> Result<(), ValidationError> {
    require("password", password)?;
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "password",
            min: MIN_PASSWORD_LENGTH,
        });
    }
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// Login form fields.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
}

impl LoginForm {
    /// Check all field rules.
    ///
    /// # Errors
    ///
    /// Returns the first failing [`ValidationError`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_email(&self.email)?;
        require("password", &self.password)
    }
}

/// Registration form fields.
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
    /// Password confirmation.
    pub confirm_password: String,
}

impl RegisterForm {
    /// Check all field rules, including the confirmation match.
    ///
    /// # Errors
    ///
    /// Returns the first failing [`ValidationError`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        validate_email(&self.email)?;
        validate_new_password(&self.password, &self.confirm_password)
    }
}

/// Profile update form fields.
///
/// An empty password means "keep the current one"; a non-empty password
/// follows the registration rules.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// New password, empty to keep the current one.
    pub password: String,
    /// Password confirmation.
    pub confirm_password: String,
}

impl ProfileForm {
    /// Check all field rules.
    ///
    /// # Errors
    ///
    /// Returns the first failing [`ValidationError`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        validate_email(&self.email)?;
        if self.password.is_empty() && self.confirm_password.is_empty() {
            return Ok(());
        }
        validate_new_password(&self.password, &self.confirm_password)
    }

    /// The password to send, if it is being changed.
    #[must_use]
    pub fn new_password(&self) -> Option<String> {
        if self.password.is_empty() {
            None
        } else {
            Some(self.password.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_requires_valid_email() {
        let form = LoginForm {
            email: String::new(),
            password: "secret1".to_string(),
        };
        assert_eq!(
            form.validate(),
            Err(ValidationError::Required { field: "email" })
        );

        let form = LoginForm {
            email: "not-an-email".to_string(),
            password: "secret1".to_string(),
        };
        assert_eq!(
            form.validate(),
            Err(ValidationError::Invalid { field: "email" })
        );
    }

    #[test]
    fn test_login_requires_password() {
        let form = LoginForm {
            email: "user@example.com".to_string(),
            password: String::new(),
        };
        assert_eq!(
            form.validate(),
            Err(ValidationError::Required { field: "password" })
        );
    }

    #[test]
    fn test_register_rejects_short_password() {
        let form = RegisterForm {
            name: "Maria".to_string(),
            email: "maria@example.com".to_string(),
            password: "short".to_string(),
            confirm_password: "short".to_string(),
        };
        assert_eq!(
            form.validate(),
            Err(ValidationError::TooShort {
                field: "password",
                min: MIN_PASSWORD_LENGTH
            })
        );
    }

    #[test]
    fn test_register_rejects_mismatched_confirmation() {
        let form = RegisterForm {
            name: "Maria".to_string(),
            email: "maria@example.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret2".to_string(),
        };
        assert_eq!(form.validate(), Err(ValidationError::PasswordMismatch));
    }

    #[test]
    fn test_profile_allows_keeping_password() {
        let form = ProfileForm {
            name: "Maria".to_string(),
            email: "maria@example.com".to_string(),
            password: String::new(),
            confirm_password: String::new(),
        };
        assert_eq!(form.validate(), Ok(()));
        assert_eq!(form.new_password(), None);
    }

    #[test]
    fn test_profile_changing_password_follows_rules() {
        let form = ProfileForm {
            name: "Maria".to_string(),
            email: "maria@example.com".to_string(),
            password: "longenough".to_string(),
            confirm_password: "different".to_string(),
        };
        assert_eq!(form.validate(), Err(ValidationError::PasswordMismatch));
    }
}
