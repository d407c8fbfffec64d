//! The identity store.
//!
//! Built once at startup and shared by `Arc`. Consumers read the
//! [`AuthSnapshot`] and call `register`, `login` and `logout`; every failure
//! is logged here and reported to them as a plain `false`.
//!
//! Register and login run on a spawned task. A caller that stops waiting does
//! not cancel them: the attempt still completes and still updates the session.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::session::{AuthSnapshot, Session};
use crate::account::{Account, AccountProfile, NewAccount};
use crate::clock::{Clock, SystemClock};
use crate::config::{AppConfig, DEFAULT_SESSION_TOKEN};
use crate::error::{HealthAppError, Result};
use crate::latency::{Latency, NoLatency};
use crate::storage::{KeyValueStore, StagedWrites, StorageKeys};

/// Why a register or login attempt did not establish a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    DuplicateAccount,
    NoMatchingCredentials,
}

enum Outcome {
    Established(Session),
    Rejected(Rejection),
}

/// Registered accounts plus the current session, mirrored to a
/// [`KeyValueStore`].
pub struct IdentityStore {
    inner: Arc<Inner>,
}

/// State shared between the store handle and in-flight attempts.
struct Inner {
    storage: Arc<dyn KeyValueStore>,
    latency: Arc<dyn Latency>,
    latency_duration: Duration,
    clock: Arc<dyn Clock>,
    keys: StorageKeys,
    token: String,
    state: watch::Sender<AuthSnapshot>,
}

impl IdentityStore {
    pub fn builder(storage: Arc<dyn KeyValueStore>) -> IdentityStoreBuilder {
        IdentityStoreBuilder::new(storage)
    }

    // ============================================================================
    // Consumer view
    // ============================================================================

    pub fn snapshot(&self) -> AuthSnapshot {
        self.inner.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<AccountProfile> {
        self.inner.state.borrow().current_user().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading
    }

    /// Receiver that is notified on every session or loading change.
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.inner.state.subscribe()
    }

    // ============================================================================
    // Operations
    // ============================================================================

    /// Restores the persisted session, if any. Run once at startup.
    ///
    /// A session is restored only when both the account record and the token
    /// are present and the record parses. An unparsable record is treated as
    /// corrupted and both entries are removed. Always clears the loading flag.
    pub fn restore(&self) {
        let session = match self.inner.load_persisted_session() {
            Ok(session) => session,
            Err(e) => {
                warn!("Failed to read persisted session, starting signed out: {}", e);
                None
            }
        };

        if let Some(ref session) = session {
            info!("Restored session for account {}", session.user.id);
        }

        self.inner.state.send_modify(|state| {
            state.session = session;
            state.is_loading = false;
        });
    }

    /// Registers a new account and signs it in.
    ///
    /// Returns `false` when the email is already taken or anything goes wrong
    /// with storage; nothing is changed in that case. Must be called from
    /// within a tokio runtime.
    pub async fn register(&self, new_account: NewAccount) -> bool {
        let inner = Arc::clone(&self.inner);
        let attempt = tokio::spawn(async move {
            inner.latency.wait(inner.latency_duration).await;
            inner.complete_register(new_account)
        });

        attempt.await.unwrap_or_else(|e| {
            warn!("Registration task failed: {}", e);
            false
        })
    }

    /// Signs in the first account whose email and password both match exactly.
    ///
    /// Returns `false` and leaves the current session untouched otherwise.
    /// Must be called from within a tokio runtime.
    pub async fn login(&self, email: &str, password: &str) -> bool {
        let inner = Arc::clone(&self.inner);
        let email = email.to_string();
        let password = password.to_string();
        let attempt = tokio::spawn(async move {
            inner.latency.wait(inner.latency_duration).await;
            inner.complete_login(&email, &password)
        });

        attempt.await.unwrap_or_else(|e| {
            warn!("Login task failed: {}", e);
            false
        })
    }

    /// Signs out. Safe to call when nobody is signed in.
    pub fn logout(&self) {
        if let Some(user) = self.current_user() {
            info!("Signed out account {}", user.id);
        }
        self.inner.set_session(None);
        self.inner.clear_persisted_session();
    }
}

impl Inner {
    fn complete_register(&self, new_account: NewAccount) -> bool {
        match self.try_register(new_account) {
            Ok(Outcome::Established(session)) => {
                info!("Registered and signed in account {}", session.user.id);
                self.set_session(Some(session));
                true
            }
            Ok(Outcome::Rejected(reason)) => {
                debug!("Registration rejected: {:?}", reason);
                false
            }
            Err(e) => {
                warn!("Registration failed: {}", e);
                false
            }
        }
    }

    fn complete_login(&self, email: &str, password: &str) -> bool {
        match self.try_login(email, password) {
            Ok(Outcome::Established(session)) => {
                info!("Signed in account {}", session.user.id);
                self.set_session(Some(session));
                true
            }
            Ok(Outcome::Rejected(reason)) => {
                debug!("Login rejected: {:?}", reason);
                false
            }
            Err(e) => {
                warn!("Login failed: {}", e);
                false
            }
        }
    }

    fn try_register(&self, new_account: NewAccount) -> Result<Outcome> {
        let mut accounts = self.load_accounts()?;

        if accounts.iter().any(|a| a.email == new_account.email) {
            return Ok(Outcome::Rejected(Rejection::DuplicateAccount));
        }

        let account = new_account.into_account(Uuid::new_v4().to_string(), self.clock.now());
        let session = self.session_for(&account);
        accounts.push(account);

        let accounts_json = serde_json::to_string(&accounts)?;
        let user_json = serde_json::to_string(&session.user)?;

        let mut staged = StagedWrites::new(self.storage.as_ref());
        let written = staged
            .set(&self.keys.accounts, &accounts_json)
            .and_then(|_| staged.set(&self.keys.session_user, &user_json))
            .and_then(|_| staged.set(&self.keys.session_token, &session.token));

        match written {
            Ok(()) => {
                staged.commit();
                Ok(Outcome::Established(session))
            }
            Err(e) => {
                staged.rollback();
                Err(e)
            }
        }
    }

    fn try_login(&self, email: &str, password: &str) -> Result<Outcome> {
        let accounts = self.load_accounts()?;

        let Some(account) = accounts
            .iter()
            .find(|a| a.matches_credentials(email, password))
        else {
            return Ok(Outcome::Rejected(Rejection::NoMatchingCredentials));
        };

        let session = self.session_for(account);
        self.persist_session(&session)?;
        Ok(Outcome::Established(session))
    }

    fn session_for(&self, account: &Account) -> Session {
        Session {
            user: account.profile(),
            token: self.token.clone(),
        }
    }

    /// Reads the account collection. A missing or empty entry is an empty
    /// collection; anything that is not an array of accounts is corrupted.
    fn load_accounts(&self) -> Result<Vec<Account>> {
        let raw = match self.storage.get(&self.keys.accounts)? {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Ok(Vec::new()),
        };

        serde_json::from_str(&raw)
            .map_err(|e| HealthAppError::corrupted(&self.keys.accounts, e.to_string()))
    }

    fn persist_session(&self, session: &Session) -> Result<()> {
        let user_json = serde_json::to_string(&session.user)?;

        let mut staged = StagedWrites::new(self.storage.as_ref());
        let written = staged
            .set(&self.keys.session_user, &user_json)
            .and_then(|_| staged.set(&self.keys.session_token, &session.token));

        match written {
            Ok(()) => {
                staged.commit();
                Ok(())
            }
            Err(e) => {
                staged.rollback();
                Err(e)
            }
        }
    }

    fn load_persisted_session(&self) -> Result<Option<Session>> {
        let user = self
            .storage
            .get(&self.keys.session_user)?
            .filter(|v| !v.is_empty());
        let token = self
            .storage
            .get(&self.keys.session_token)?
            .filter(|v| !v.is_empty());

        let (Some(raw_user), Some(token)) = (user, token) else {
            debug!("No persisted session");
            return Ok(None);
        };

        match serde_json::from_str::<AccountProfile>(&raw_user) {
            Ok(user) => Ok(Some(Session { user, token })),
            Err(e) => {
                warn!(
                    "Persisted session under '{}' is corrupted, clearing it: {}",
                    self.keys.session_user, e
                );
                self.clear_persisted_session();
                Ok(None)
            }
        }
    }

    fn clear_persisted_session(&self) {
        for key in [&self.keys.session_user, &self.keys.session_token] {
            if let Err(e) = self.storage.remove(key) {
                warn!("Failed to remove '{}': {}", key, e);
            }
        }
    }

    fn set_session(&self, session: Option<Session>) {
        self.state.send_modify(|state| state.session = session);
    }
}

/// Wires an [`IdentityStore`] to its storage, latency and clock.
///
/// Defaults to [`NoLatency`] (configured pause of one second, skipped),
/// [`SystemClock`], `healthapp_*` keys and the `fake-jwt-token` placeholder.
pub struct IdentityStoreBuilder {
    storage: Arc<dyn KeyValueStore>,
    latency: Arc<dyn Latency>,
    latency_duration: Duration,
    clock: Arc<dyn Clock>,
    keys: StorageKeys,
    token: String,
}

impl IdentityStoreBuilder {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            latency: Arc::new(NoLatency),
            latency_duration: Duration::from_secs(1),
            clock: Arc::new(SystemClock),
            keys: StorageKeys::default(),
            token: DEFAULT_SESSION_TOKEN.to_string(),
        }
    }

    /// Applies the `[auth]` and `[storage]` sections.
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        self.latency_duration = config.auth.latency();
        self.token = config.auth.token.clone();
        self.keys = config.storage.keys();
        self
    }

    pub fn with_latency(mut self, latency: Arc<dyn Latency>) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_latency_duration(mut self, duration: Duration) -> Self {
        self.latency_duration = duration;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Builds the store in its loading state. Call `restore` next.
    pub fn build(self) -> IdentityStore {
        let (state, _) = watch::channel(AuthSnapshot::loading());
        IdentityStore {
            inner: Arc::new(Inner {
                storage: self.storage,
                latency: self.latency,
                latency_duration: self.latency_duration,
                clock: self.clock,
                keys: self.keys,
                token: self.token,
                state,
            }),
        }
    }
}
