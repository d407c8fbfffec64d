//! Account domain models.
//!
//! Field names are serialized in camelCase so records written by the
//! browser build of the dashboard keep parsing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered identity, as kept in the account collection.
///
/// The password is stored and compared as plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Opaque identifier assigned at creation
    pub id: String,
    /// Unique across the collection, compared case-sensitively
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Returns the password-free view of this account.
    pub fn profile(&self) -> AccountProfile {
        AccountProfile {
            id: self.id.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone: self.phone.clone(),
            created_at: self.created_at,
        }
    }

    /// Literal credential check: no normalization, no hashing.
    pub fn matches_credentials(&self, email: &str, password: &str) -> bool {
        self.email == email && self.password == password
    }
}

/// An [`Account`] with the password removed.
///
/// This is what the session holds and what consumers get to read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountProfile {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AccountProfile {
    /// "First Last", trimmed when either part is empty.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Input to `IdentityStore::register`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

impl NewAccount {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Materializes the stored account with the given identity and timestamp.
    pub fn into_account(self, id: String, created_at: DateTime<Utc>) -> Account {
        Account {
            id,
            email: self.email,
            password: self.password,
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_account() -> Account {
        NewAccount::new("jane@example.com", "pw1", "Jane", "Doe").into_account(
            "acc-1".to_string(),
            Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap(),
        )
    }

    #[test]
    fn test_profile_drops_password() {
        let profile = sample_account().profile();
        let json = serde_json::to_value(&profile).unwrap();

        assert!(json.get("password").is_none());
        assert_eq!(json["firstName"], "Jane");
        assert_eq!(json["createdAt"], "2024-05-01T08:30:00Z");
        assert!(json.get("phone").is_none());
    }

    #[test]
    fn test_account_serializes_with_password() {
        let json = serde_json::to_value(sample_account()).unwrap();
        assert_eq!(json["password"], "pw1");
        assert_eq!(json["lastName"], "Doe");
    }

    #[test]
    fn test_reads_browser_written_record() {
        let raw = r#"{
            "id": "1718000000000",
            "email": "a@example.com",
            "password": "secret",
            "firstName": "Ana",
            "lastName": "Lee",
            "createdAt": "2024-06-10T06:13:20.000Z"
        }"#;

        let account: Account = serde_json::from_str(raw).unwrap();
        assert_eq!(account.id, "1718000000000");
        assert_eq!(account.phone, None);
        assert!(account.matches_credentials("a@example.com", "secret"));
    }

    #[test]
    fn test_credentials_are_case_sensitive() {
        let account = sample_account();
        assert!(account.matches_credentials("jane@example.com", "pw1"));
        assert!(!account.matches_credentials("Jane@example.com", "pw1"));
        assert!(!account.matches_credentials("jane@example.com", "PW1"));
    }

    #[test]
    fn test_profile_rejects_missing_fields() {
        let raw = r#"{ "id": "x", "email": "a@example.com" }"#;
        assert!(serde_json::from_str::<AccountProfile>(raw).is_err());
    }

    #[test]
    fn test_display_name() {
        let mut profile = sample_account().profile();
        assert_eq!(profile.display_name(), "Jane Doe");
        profile.last_name.clear();
        assert_eq!(profile.display_name(), "Jane");
    }
}
