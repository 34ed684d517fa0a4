use exhibits_auth::Credential;

/// The caller's credential, attached by the credential middleware.
///
/// Must be present for all protected routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialContext {
    credential: Credential,
}

impl CredentialContext {
    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }

    pub fn into_credential(self) -> Credential {
        self.credential
    }
}
