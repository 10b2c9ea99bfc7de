use async_trait::async_trait;

use crate::provide_credential::{EdgeRcCredentialProvider, EnvCredentialProvider};
use crate::{Context, Credential, ProvideCredential, ProvideCredentialChain, Result};

/// DefaultCredentialProvider tries the standard EdgeGrid credential sources
/// in order.
///
/// Resolution order:
///
/// 1. Environment variables (`AKAMAI_CLIENT_TOKEN` etc.)
/// 2. The `.edgerc` file (`AKAMAI_EDGERC` / `~/.edgerc`)
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    chain: ProvideCredentialChain<Credential>,
}

impl Default for DefaultCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultCredentialProvider {
    /// Create a new DefaultCredentialProvider.
    pub fn new() -> Self {
        let chain = ProvideCredentialChain::new()
            .push(EnvCredentialProvider::new())
            .push(EdgeRcCredentialProvider::new());

        Self { chain }
    }

    /// Create with a custom credential chain.
    pub fn with_chain(chain: ProvideCredentialChain<Credential>) -> Self {
        Self { chain }
    }

    /// Add a credential provider to the front of the default chain.
    pub fn push_front(
        mut self,
        provider: impl ProvideCredential<Credential = Credential> + 'static,
    ) -> Self {
        self.chain = self.chain.push_front(provider);
        self
    }
}

#[async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        self.chain.provide_credential(ctx).await
    }
}
