use std::sync::{Arc, Mutex};

use http::uri::PathAndQuery;
use http::Uri;
use log::debug;

use crate::body::SigningBody;
use crate::credential::Credential;
use crate::{Context, Error, ProvideCredential, Result, SignRequest, SigningCredential};

/// Signer is the main struct used to sign requests.
///
/// It loads the credential once through the configured provider (EdgeGrid
/// credentials are long-lived), then computes a fresh `Authorization` header
/// per request. The signer is cheap to clone and safe to share across
/// concurrent requests; every call derives its own timestamp, nonce, and
/// signature.
#[derive(Clone, Debug)]
pub struct Signer {
    ctx: Context,
    loader: Arc<dyn ProvideCredential<Credential = Credential>>,
    builder: Arc<dyn SignRequest<Credential = Credential>>,
    credential: Arc<Mutex<Option<Credential>>>,
}

impl Signer {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        loader: impl ProvideCredential<Credential = Credential>,
        builder: impl SignRequest<Credential = Credential>,
    ) -> Self {
        Self {
            ctx,
            loader: Arc::new(loader),
            builder: Arc::new(builder),
            credential: Arc::new(Mutex::new(None)),
        }
    }

    /// Sign the request in place, attaching the `Authorization` header.
    ///
    /// The body is read for content hashing only; its observable position is
    /// restored before this returns, so the transport can still send it.
    pub async fn sign(
        &self,
        parts: &mut http::request::Parts,
        body: &mut SigningBody,
    ) -> Result<()> {
        let credential = self.credential.lock().expect("lock poisoned").clone();
        let credential = if credential.is_valid() {
            credential
        } else {
            let loaded = self.loader.provide_credential(&self.ctx).await?;
            *self.credential.lock().expect("lock poisoned") = loaded.clone();
            loaded
        };

        self.builder
            .sign_request(&self.ctx, parts, credential.as_ref(), body)
            .await
    }

    /// Re-sign a request that is about to follow a redirect.
    ///
    /// The signature binds the exact URL, so the header computed for the
    /// original target fails verification at the redirect target. The
    /// request URI is replaced with the resolved `Location` and a fresh
    /// timestamp, nonce, and signature are computed.
    pub async fn sign_redirect(
        &self,
        parts: &mut http::request::Parts,
        body: &mut SigningBody,
        location: &str,
    ) -> Result<()> {
        parts.uri = redirect_target(&parts.uri, location)?;
        debug!("signing the redirected url: {}", parts.uri);

        self.sign(parts, body).await
    }
}

/// Resolve a redirect `Location` against the original request URI.
///
/// Absolute locations are taken as-is; root-relative ones inherit the
/// original scheme and authority.
fn redirect_target(origin: &Uri, location: &str) -> Result<Uri> {
    if location.starts_with('/') {
        let mut parts = origin.clone().into_parts();
        parts.path_and_query = Some(PathAndQuery::try_from(location)?);
        return Uri::from_parts(parts).map_err(Error::from);
    }

    let target: Uri = location.parse()?;
    if target.scheme().is_none() || target.authority().is_none() {
        return Err(Error::request_invalid(format!(
            "redirect location {location:?} is neither absolute nor root-relative"
        )));
    }
    Ok(target)
}
