use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Prefix used for owner keys of anonymous callers.
pub const ANONYMOUS_OWNER_PREFIX: &str = "ip:";

/// Quota tier a caller falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityClass {
    Anonymous,
    Authenticated,
}

impl Display for IdentityClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            IdentityClass::Anonymous => write!(f, "anonymous"),
            IdentityClass::Authenticated => write!(f, "authenticated"),
        }
    }
}

/// Who is making a request.
///
/// Authenticated callers carry the stable account id from their session token;
/// anonymous callers are keyed by source IP address. No credential state lives here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    Authenticated { user_id: String },
    Anonymous { ip: String },
}

impl Identity {
    pub fn class(&self) -> IdentityClass {
        match self {
            Identity::Authenticated { .. } => IdentityClass::Authenticated,
            Identity::Anonymous { .. } => IdentityClass::Anonymous,
        }
    }

    /// Key persisted as the owner of submissions: the account id, or `ip:{address}`.
    pub fn owner_key(&self) -> String {
        match self {
            Identity::Authenticated { user_id } => user_id.clone(),
            Identity::Anonymous { ip } => format!("{}{}", ANONYMOUS_OWNER_PREFIX, ip),
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            Identity::Authenticated { user_id } => Some(user_id),
            Identity::Anonymous { .. } => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::Authenticated { .. })
    }

    /// Whether this identity owns a resource recorded under `owner`.
    pub fn owns(&self, owner: &str) -> bool {
        self.owner_key() == owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_key() {
        let user = Identity::Authenticated {
            user_id: "42".to_string(),
        };
        let anon = Identity::Anonymous {
            ip: "203.0.113.7".to_string(),
        };
        assert_eq!(user.owner_key(), "42");
        assert_eq!(anon.owner_key(), "ip:203.0.113.7");
        assert_eq!(user.class(), IdentityClass::Authenticated);
        assert_eq!(anon.class(), IdentityClass::Anonymous);
    }

    #[test]
    fn test_anonymous_never_owns_account_rows() {
        let anon = Identity::Anonymous {
            ip: "42".to_string(),
        };
        assert!(!anon.owns("42"));
        assert!(anon.owns("ip:42"));
    }
}
