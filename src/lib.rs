//! Signer for the Akamai {OPEN} EdgeGrid authentication scheme.
//!
//! EdgeGrid (`EG1-HMAC-SHA256`) authenticates API requests with a per-request
//! `Authorization` header: the request is reduced to a canonical string, a
//! signing key is derived from the client secret and the request timestamp,
//! and the canonical string is HMAC-SHA256 signed with that key.
//!
//! ## Overview
//!
//! - **Context**: container for file reading and environment access, so
//!   credential loading stays testable
//! - **ProvideCredential**: loads the credential triple from static values,
//!   environment variables, or an `.edgerc` file
//! - **RequestSigner**: computes the `Authorization` header for one request
//! - **Signer**: orchestrates the two and caches the loaded credential
//!
//! ## Example
//!
//! ```no_run
//! use akamai_edgegrid::{
//!     Context, DefaultCredentialProvider, OsEnv, RequestSigner, Signer, SigningBody,
//!     TokioFileRead,
//! };
//! use anyhow::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Context with real file and env access so `.edgerc` and
//!     // AKAMAI_* variables can be picked up.
//!     let ctx = Context::new().with_file_read(TokioFileRead).with_env(OsEnv);
//!
//!     let signer = Signer::new(ctx, DefaultCredentialProvider::new(), RequestSigner::new());
//!
//!     let req = http::Request::post(
//!         "https://akab-xxxxxxxxxxxxxxxx-xxxxxxxxxxxxxxxx.luna.akamaiapis.net/papi/v1/contracts",
//!     )
//!     .body(())?;
//!     let (mut parts, _) = req.into_parts();
//!
//!     let mut body = SigningBody::from(r#"{"hello": "world"}"#);
//!     signer.sign(&mut parts, &mut body).await?;
//!
//!     // parts now carries the Authorization header; hand parts and the
//!     // body bytes to your HTTP client of choice.
//!     Ok(())
//! }
//! ```
//!
//! On a 301/302 response, call [`Signer::sign_redirect`] with the `Location`
//! header before following it. The signature binds the exact URL, so the
//! original header will not verify at the redirect target.

mod api;
pub use api::{ProvideCredential, ProvideCredentialChain, SignRequest, SigningCredential};

mod body;
pub use body::{BodyStream, MultipartStream, Part, SigningBody};

mod constants;

mod context;
pub use context::Context;

mod credential;
pub use credential::Credential;

mod edgerc;
pub use edgerc::{EdgeRc, EdgeRcSection, DEFAULT_EDGERC_PATH, DEFAULT_EDGERC_SECTION};

mod env;
pub use env::{Env, NoopEnv, OsEnv, StaticEnv};

mod error;
pub use error::{Error, ErrorKind, Result};

mod fs;
pub use fs::{FileRead, NoopFileRead, TokioFileRead};

pub mod hash;

mod provide_credential;
pub use provide_credential::{
    DefaultCredentialProvider, EdgeRcCredentialProvider, EnvCredentialProvider,
    StaticCredentialProvider,
};

mod request;
pub use request::SigningRequest;

mod sign_request;
pub use sign_request::{RequestSigner, DEFAULT_MAX_BODY};

mod signer;
pub use signer::Signer;

pub mod time;
pub mod utils;
