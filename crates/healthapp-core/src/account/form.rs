//! Sign-up form validation.
//!
//! The identity store only enforces email uniqueness. Everything else a
//! sign-up screen checks lives here so every consumer applies the same rules.

use super::model::NewAccount;
use thiserror::Error;

/// Reasons a sign-up form is rejected before it reaches the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// Raw sign-up form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

impl RegistrationForm {
    /// Checks required fields and password confirmation, then yields the
    /// store input. A blank phone is treated as absent.
    pub fn validate(self) -> Result<NewAccount, RegistrationError> {
        if self.email.trim().is_empty() {
            return Err(RegistrationError::MissingField("Email"));
        }
        if self.password.is_empty() {
            return Err(RegistrationError::MissingField("Password"));
        }
        if self.first_name.trim().is_empty() {
            return Err(RegistrationError::MissingField("First name"));
        }
        if self.password != self.confirm_password {
            return Err(RegistrationError::PasswordMismatch);
        }

        let phone = self.phone.filter(|p| !p.trim().is_empty());

        Ok(NewAccount {
            email: self.email,
            password: self.password,
            first_name: self.first_name,
            last_name: self.last_name,
            phone,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> RegistrationForm {
        RegistrationForm {
            email: "a@example.com".to_string(),
            password: "pw1".to_string(),
            confirm_password: "pw1".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            phone: None,
        }
    }

    #[test]
    fn test_valid_form() {
        let account = filled_form().validate().unwrap();
        assert_eq!(account, NewAccount::new("a@example.com", "pw1", "Jane", "Doe"));
    }

    #[test]
    fn test_password_mismatch() {
        let mut form = filled_form();
        form.confirm_password = "pw2".to_string();
        assert_eq!(form.validate(), Err(RegistrationError::PasswordMismatch));
    }

    #[test]
    fn test_missing_required_fields() {
        let mut form = filled_form();
        form.email = "   ".to_string();
        assert_eq!(form.validate(), Err(RegistrationError::MissingField("Email")));

        let mut form = filled_form();
        form.first_name.clear();
        assert_eq!(
            form.validate(),
            Err(RegistrationError::MissingField("First name"))
        );
    }

    #[test]
    fn test_last_name_is_optional_and_blank_phone_dropped() {
        let mut form = filled_form();
        form.last_name.clear();
        form.phone = Some("  ".to_string());
        let account = form.validate().unwrap();
        assert!(account.last_name.is_empty());
        assert_eq!(account.phone, None);
    }
}
