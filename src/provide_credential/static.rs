use async_trait::async_trait;

use crate::{Context, Credential, ProvideCredential, Result};

/// StaticCredentialProvider returns a fixed credential triple.
///
/// Useful for testing, or when the caller resolves credentials itself.
#[derive(Debug)]
pub struct StaticCredentialProvider {
    credential: Credential,
}

impl StaticCredentialProvider {
    /// Create a provider around the given triple.
    pub fn new(client_token: &str, client_secret: &str, access_token: &str) -> Self {
        Self {
            credential: Credential::new(client_token, client_secret, access_token),
        }
    }
}

#[async_trait]
impl ProvideCredential for StaticCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        Ok(Some(self.credential.clone()))
    }
}
