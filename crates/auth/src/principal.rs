use serde::{Deserialize, Serialize};

use exhibits_core::UserId;

/// How the caller proved who they are.
///
/// `Subject` is the canonical path: an upstream verifier has already checked
/// the token's signature and time window and hands over the decoded `sub`
/// claim (the username). `LegacyToken` is the older path where the raw
/// `x-access-token` value is matched against the token stored on the user row;
/// it is kept for clients that have not migrated and should not be used for new
/// routes.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Subject(String),
    LegacyToken(String),
}

impl Credential {
    pub fn subject(username: impl Into<String>) -> Self {
        Self::Subject(username.into())
    }

    pub fn legacy_token(token: impl Into<String>) -> Self {
        Self::LegacyToken(token.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Credential::Subject(_) => "subject",
            Credential::LegacyToken(_) => "legacy_token",
        }
    }
}

// Token values must never reach logs through `{:?}`.
impl core::fmt::Debug for Credential {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Credential::Subject(name) => f.debug_tuple("Subject").field(name).finish(),
            Credential::LegacyToken(_) => f.debug_tuple("LegacyToken").field(&"<redacted>").finish(),
        }
    }
}

/// A caller whose credential resolved to an active user.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
}

impl Principal {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_legacy_tokens() {
        let cred = Credential::legacy_token("aaa.bbb.ccc");
        let out = format!("{cred:?}");
        assert!(!out.contains("aaa.bbb.ccc"));
        assert!(out.contains("redacted"));

        let cred = Credential::subject("curator");
        assert_eq!(format!("{cred:?}"), "Subject(\"curator\")");
    }
}
