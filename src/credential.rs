use std::fmt::{Debug, Formatter};

use crate::utils::Redact;
use crate::SigningCredential;

/// The EdgeGrid credential triple issued by the Akamai Identity and Access
/// Management UI.
#[derive(Clone)]
pub struct Credential {
    /// Client token from the "Credentials" UI.
    pub client_token: String,
    /// Client secret from the "Credentials" UI. Secret material.
    pub client_secret: String,
    /// Access token from the "Authorizations" UI.
    pub access_token: String,
}

impl Credential {
    /// Create a new credential.
    pub fn new(
        client_token: impl Into<String>,
        client_secret: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            client_token: client_token.into(),
            client_secret: client_secret.into(),
            access_token: access_token.into(),
        }
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("client_token", &Redact::from(&self.client_token))
            .field("client_secret", &Redact::from(&self.client_secret))
            .field("access_token", &Redact::from(&self.access_token))
            .finish()
    }
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        !self.client_token.is_empty()
            && !self.client_secret.is_empty()
            && !self.access_token.is_empty()
    }
}
