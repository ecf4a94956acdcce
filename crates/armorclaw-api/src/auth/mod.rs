//! Identity: session tokens and the `Caller` / `SignedIn` extractors.

pub mod identity;
pub mod session;

pub use identity::{Caller, SignedIn};
pub use session::{verify_session_token, SessionClaims, SESSION_COOKIE};
