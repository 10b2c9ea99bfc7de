use async_trait::async_trait;
use log::debug;

use crate::constants::*;
use crate::edgerc::{EdgeRc, DEFAULT_EDGERC_PATH, DEFAULT_EDGERC_SECTION};
use crate::{Context, Credential, ProvideCredential, Result};

/// EdgeRcCredentialProvider loads EdgeGrid credentials from an `.edgerc`
/// file.
///
/// The file path is resolved from:
/// 1. `with_path()`
/// 2. the `AKAMAI_EDGERC` environment variable
/// 3. `~/.edgerc`
///
/// and the section from:
/// 1. `with_section()`
/// 2. the `AKAMAI_EDGERC_SECTION` environment variable
/// 3. `default`
///
/// A missing file or section yields nothing so the chain can continue; a
/// file that exists but cannot be parsed, or a section missing required
/// keys, is a configuration error.
#[derive(Debug, Default)]
pub struct EdgeRcCredentialProvider {
    path: Option<String>,
    section: Option<String>,
}

impl EdgeRcCredentialProvider {
    /// Create a provider with default path and section resolution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the path to the edgerc file.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the section to read.
    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }
}

#[async_trait]
impl ProvideCredential for EdgeRcCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let path = match &self.path {
            Some(path) => path.clone(),
            None => ctx
                .env_var(AKAMAI_EDGERC)
                .unwrap_or_else(|| DEFAULT_EDGERC_PATH.to_string()),
        };
        let section = match &self.section {
            Some(section) => section.clone(),
            None => ctx
                .env_var(AKAMAI_EDGERC_SECTION)
                .unwrap_or_else(|| DEFAULT_EDGERC_SECTION.to_string()),
        };

        let expanded = match ctx.expand_home_dir(&path) {
            Some(expanded) => expanded,
            None => {
                debug!("failed to expand home dir for edgerc path: {path}");
                return Ok(None);
            }
        };

        let content = match ctx.file_read_as_string(&expanded).await {
            Ok(content) => content,
            Err(err) => {
                debug!("failed to read edgerc file {expanded}: {err:?}");
                return Ok(None);
            }
        };

        let edgerc = EdgeRc::parse(&content)?;
        if !edgerc.has_section(&section) {
            debug!("section [{section}] not found in edgerc file {expanded}");
            return Ok(None);
        }

        edgerc.section(&section)?.credential().map(Some)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::env::StaticEnv;
    use crate::fs::TokioFileRead;
    use crate::ErrorKind;

    fn write_edgerc(dir: &std::path::Path) -> std::path::PathBuf {
        let path = dir.join(".edgerc");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "[default]").unwrap();
        writeln!(f, "client_token = default-token").unwrap();
        writeln!(f, "client_secret = default-secret").unwrap();
        writeln!(f, "access_token = default-access").unwrap();
        writeln!(f).unwrap();
        writeln!(f, "[testing]").unwrap();
        writeln!(f, "client_token = testing-token").unwrap();
        writeln!(f, "client_secret = testing-secret").unwrap();
        writeln!(f, "access_token = testing-access").unwrap();
        path
    }

    #[tokio::test]
    async fn test_load_default_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_edgerc(dir.path());

        let ctx = Context::new().with_file_read(TokioFileRead);
        let provider = EdgeRcCredentialProvider::new().with_path(path.to_str().unwrap());
        let cred = provider.provide_credential(&ctx).await.unwrap().unwrap();

        assert_eq!(cred.client_token, "default-token");
        assert_eq!(cred.client_secret, "default-secret");
        assert_eq!(cred.access_token, "default-access");
    }

    #[tokio::test]
    async fn test_section_from_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_edgerc(dir.path());

        let ctx = Context::new().with_file_read(TokioFileRead).with_env(StaticEnv {
            home_dir: None,
            envs: HashMap::from([(
                AKAMAI_EDGERC_SECTION.to_string(),
                "testing".to_string(),
            )]),
        });
        let provider = EdgeRcCredentialProvider::new().with_path(path.to_str().unwrap());
        let cred = provider.provide_credential(&ctx).await.unwrap().unwrap();

        assert_eq!(cred.client_token, "testing-token");
    }

    #[tokio::test]
    async fn test_home_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        write_edgerc(dir.path());

        let ctx = Context::new().with_file_read(TokioFileRead).with_env(StaticEnv {
            home_dir: Some(dir.path().to_path_buf()),
            envs: HashMap::new(),
        });
        let provider = EdgeRcCredentialProvider::new();
        let cred = provider.provide_credential(&ctx).await.unwrap();

        assert!(cred.is_some());
    }

    #[tokio::test]
    async fn test_missing_file_yields_nothing() {
        let ctx = Context::new().with_file_read(TokioFileRead);
        let provider = EdgeRcCredentialProvider::new().with_path("/non/existent/edgerc");
        let cred = provider.provide_credential(&ctx).await.unwrap();

        assert!(cred.is_none());
    }

    #[tokio::test]
    async fn test_missing_section_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_edgerc(dir.path());

        let ctx = Context::new().with_file_read(TokioFileRead);
        let provider = EdgeRcCredentialProvider::new()
            .with_path(path.to_str().unwrap())
            .with_section("nonexistent");
        let cred = provider.provide_credential(&ctx).await.unwrap();

        assert!(cred.is_none());
    }

    #[tokio::test]
    async fn test_incomplete_section_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".edgerc");
        std::fs::write(&path, "[default]\nclient_token = only-token\n").unwrap();

        let ctx = Context::new().with_file_read(TokioFileRead);
        let provider = EdgeRcCredentialProvider::new().with_path(path.to_str().unwrap());
        let err = provider.provide_credential(&ctx).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }
}
