//! Sign-in commands.
//!
//! The identity store only answers yes or no; the user-facing wording for a
//! refusal lives here.

use anyhow::{Result, bail};
use healthapp_core::account::RegistrationForm;
use healthapp_core::{AppGate, AuthSnapshot, IdentityStore};

pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
pub const REGISTRATION_FAILED: &str = "Email already exists or registration failed";

pub async fn register(identity: &IdentityStore, form: RegistrationForm) -> Result<()> {
    let new_account = form.validate()?;

    if !identity.register(new_account).await {
        bail!(REGISTRATION_FAILED);
    }

    println!("{}", describe(&identity.snapshot()));
    Ok(())
}

pub async fn login(identity: &IdentityStore, email: &str, password: &str) -> Result<()> {
    if !identity.login(email, password).await {
        bail!(INVALID_CREDENTIALS);
    }

    println!("{}", describe(&identity.snapshot()));
    Ok(())
}

pub fn logout(identity: &IdentityStore) {
    identity.logout();
    println!("{}", describe(&identity.snapshot()));
}

pub fn status(identity: &IdentityStore) {
    println!("{}", describe(&identity.snapshot()));
}

/// One-line summary of the current auth state.
pub fn describe(snapshot: &AuthSnapshot) -> String {
    match (snapshot.gate(), snapshot.current_user()) {
        (AppGate::Loading, _) => "Loading...".to_string(),
        (AppGate::Dashboard, Some(user)) => {
            format!("Signed in as {} <{}>", user.display_name(), user.email)
        }
        _ => "Not signed in".to_string(),
    }
}
