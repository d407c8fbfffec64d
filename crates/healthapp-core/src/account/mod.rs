//! Account domain module.
//!
//! # Module Structure
//!
//! - `model`: stored accounts and their password-free profile view
//! - `form`: sign-up form validation run by consumers before registering
//!
//! # Usage
//!
//! ```ignore
//! use healthapp_core::account::{Account, AccountProfile, RegistrationForm};
//! ```

mod form;
mod model;

// Re-export public API
pub use form::{RegistrationError, RegistrationForm};
pub use model::{Account, AccountProfile, NewAccount};
