use async_trait::async_trait;

use crate::constants::*;
use crate::{Context, Credential, ProvideCredential, Result};

/// EnvCredentialProvider loads EdgeGrid credentials from environment
/// variables.
///
/// This provider looks for:
/// - `AKAMAI_CLIENT_TOKEN`
/// - `AKAMAI_CLIENT_SECRET`
/// - `AKAMAI_ACCESS_TOKEN`
///
/// All three must be present; otherwise it yields nothing and the next
/// provider in the chain runs.
#[derive(Debug, Default)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Create a new EnvCredentialProvider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let client_token = ctx.env_var(AKAMAI_CLIENT_TOKEN);
        let client_secret = ctx.env_var(AKAMAI_CLIENT_SECRET);
        let access_token = ctx.env_var(AKAMAI_ACCESS_TOKEN);

        match (client_token, client_secret, access_token) {
            (Some(ct), Some(cs), Some(at)) => Ok(Some(Credential::new(ct, cs, at))),
            _ => Ok(None),
        }
    }
}
