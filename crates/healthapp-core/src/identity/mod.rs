//! Identity domain module.
//!
//! Owns the account collection and the current session, and is the only
//! authentication surface the rest of the app talks to.
//!
//! # Module Structure
//!
//! - `session`: session model, consumer snapshot and screen gate
//! - `store`: `IdentityStore` with restore/register/login/logout

mod session;
mod store;

pub use session::{AppGate, AuthSnapshot, Session};
pub use store::{IdentityStore, IdentityStoreBuilder};
