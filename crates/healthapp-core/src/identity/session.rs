//! Session and the read-only view handed to consumers.

use crate::account::AccountProfile;

/// The signed-in account (password removed) and its token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: AccountProfile,
    pub token: String,
}

/// What a screen needs to know about authentication at a given moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub session: Option<Session>,
    /// True until the startup restore attempt has finished
    pub is_loading: bool,
}

impl AuthSnapshot {
    /// State of a freshly built store, before `restore` runs.
    pub fn loading() -> Self {
        Self {
            session: None,
            is_loading: true,
        }
    }

    pub fn current_user(&self) -> Option<&AccountProfile> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Picks the top-level screen for this state.
    pub fn gate(&self) -> AppGate {
        if self.is_loading {
            AppGate::Loading
        } else if self.is_authenticated() {
            AppGate::Dashboard
        } else {
            AppGate::SignIn
        }
    }
}

/// Top-level screen chosen from an [`AuthSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppGate {
    Loading,
    SignIn,
    Dashboard,
}
