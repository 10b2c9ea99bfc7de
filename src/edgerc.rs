use std::fmt::{Debug, Formatter};

use ini::Ini;

use crate::sign_request::{RequestSigner, DEFAULT_MAX_BODY};
use crate::{Context, Credential, Error, Result};

/// Default path of the edgerc file.
pub const DEFAULT_EDGERC_PATH: &str = "~/.edgerc";
/// Default edgerc section.
pub const DEFAULT_EDGERC_SECTION: &str = "default";

/// A parsed `.edgerc` file.
///
/// The file is INI formatted with named `[sections]`, each carrying a
/// credential triple plus optional per-API signing options:
///
/// ```ini
/// [default]
/// client_token = akab-xxxx
/// client_secret = xxxx=
/// access_token = akab-xxxx
/// host = akab-xxxx.luna.akamaiapis.net
/// max_body = 131072
/// headers_to_sign = x-mything1,x-mything2
/// ```
///
/// Keys may be spelled with dashes or underscores interchangeably
/// (`max-body` ≡ `max_body`).
pub struct EdgeRc {
    ini: Ini,
}

impl EdgeRc {
    /// Parse edgerc content.
    pub fn parse(content: &str) -> Result<Self> {
        let ini = Ini::load_from_str(content).map_err(|e| {
            Error::config_invalid("failed to parse edgerc file").with_source(anyhow::Error::new(e))
        })?;
        Ok(Self { ini })
    }

    /// Load and parse an edgerc file, expanding a leading `~`.
    pub async fn load(ctx: &Context, path: &str) -> Result<Self> {
        let expanded = ctx
            .expand_home_dir(path)
            .ok_or_else(|| Error::config_invalid(format!("cannot expand home dir in {path}")))?;
        let content = ctx.file_read_as_string(&expanded).await?;
        Self::parse(&content)
    }

    /// Look up a section by name.
    pub fn section<'a>(&'a self, name: &'a str) -> Result<EdgeRcSection<'a>> {
        self.ini
            .section(Some(name))
            .map(|props| EdgeRcSection { name, props })
            .ok_or_else(|| Error::config_invalid(format!("section [{name}] not found in edgerc")))
    }

    /// Whether the file contains the named section.
    pub fn has_section(&self, name: &str) -> bool {
        self.ini.section(Some(name)).is_some()
    }
}

impl Debug for EdgeRc {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let sections: Vec<&str> = self.ini.sections().flatten().collect();
        f.debug_struct("EdgeRc").field("sections", &sections).finish()
    }
}

/// One `[section]` of an edgerc file.
pub struct EdgeRcSection<'a> {
    name: &'a str,
    props: &'a ini::Properties,
}

impl EdgeRcSection<'_> {
    /// Get a raw value, treating dashes and underscores in key names as
    /// equivalent.
    pub fn get(&self, key: &str) -> Option<&str> {
        let want = key.replace('-', "_");
        self.props
            .iter()
            .find(|(k, _)| k.replace('-', "_") == want)
            .map(|(_, v)| v)
    }

    fn require(&self, key: &str) -> Result<&str> {
        self.get(key).filter(|v| !v.is_empty()).ok_or_else(|| {
            Error::config_invalid(format!(
                "missing required key {key} in edgerc section [{}]",
                self.name
            ))
        })
    }

    /// The client token. Required.
    pub fn client_token(&self) -> Result<&str> {
        self.require("client_token")
    }

    /// The client secret. Required.
    pub fn client_secret(&self) -> Result<&str> {
        self.require("client_secret")
    }

    /// The access token. Required.
    pub fn access_token(&self) -> Result<&str> {
        self.require("access_token")
    }

    /// The API host, if configured. The transport uses it as the base URL
    /// authority; signing itself takes the host from the request.
    pub fn host(&self) -> Option<&str> {
        self.get("host").filter(|v| !v.is_empty())
    }

    /// Maximum number of body bytes hashed for POST requests.
    pub fn max_body(&self) -> Result<usize> {
        match self.get("max_body") {
            None => Ok(DEFAULT_MAX_BODY),
            Some(v) => v.trim().parse().map_err(|_| {
                Error::config_invalid(format!(
                    "invalid max_body value {v:?} in edgerc section [{}]",
                    self.name
                ))
            }),
        }
    }

    /// Header names to include in the signature, in configured order.
    pub fn headers_to_sign(&self) -> Vec<String> {
        match self.get("headers_to_sign") {
            None => Vec::new(),
            Some(v) => v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Build the credential triple from this section.
    pub fn credential(&self) -> Result<Credential> {
        Ok(Credential::new(
            self.client_token()?,
            self.client_secret()?,
            self.access_token()?,
        ))
    }

    /// Build a [`RequestSigner`] configured with this section's signing
    /// options.
    pub fn request_signer(&self) -> Result<RequestSigner> {
        Ok(RequestSigner::new()
            .with_headers_to_sign(self.headers_to_sign())
            .with_max_body(self.max_body()?))
    }
}

impl Debug for EdgeRcSection<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgeRcSection")
            .field("name", &self.name)
            .finish()
    }
}
