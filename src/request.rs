use std::mem;

use http::header::HOST;
use http::uri::{Authority, PathAndQuery, Scheme};
use http::{HeaderMap, Method, Uri};

use crate::{Error, Result};

/// Signing view over a request.
///
/// Built from `http::request::Parts`, signed, then applied back. The URI and
/// headers are taken out of the parts to avoid copies and returned on
/// [`apply`][SigningRequest::apply].
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Authority,
    /// URL path, with any `;`-delimited params of the last segment split off.
    pub path: String,
    /// Params of the last path segment, without the leading `;`.
    pub params: Option<String>,
    /// Raw query string, without the leading `?`. EdgeGrid signs the query
    /// verbatim, so it is never parsed or re-encoded.
    pub query: Option<String>,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Build a signing view from `http::request::Parts`.
    pub fn build(parts: &mut http::request::Parts) -> Result<Self> {
        let uri = mem::take(&mut parts.uri).into_parts();
        let paq = uri
            .path_and_query
            .unwrap_or_else(|| PathAndQuery::from_static("/"));
        let (path, params) = split_path_params(paq.path());

        Ok(SigningRequest {
            method: parts.method.clone(),
            scheme: uri.scheme.unwrap_or(Scheme::HTTPS),
            authority: uri
                .authority
                .ok_or_else(|| Error::request_invalid("request without authority cannot be signed"))?,
            path,
            params,
            query: paq.query().map(|q| q.to_string()),
            // Take the headers out of the request to avoid copy.
            // We will return them when applying the view back.
            headers: mem::take(&mut parts.headers),
        })
    }

    /// Apply the signing view back to `http::request::Parts`.
    pub fn apply(mut self, parts: &mut http::request::Parts) -> Result<()> {
        mem::swap(&mut parts.headers, &mut self.headers);
        parts.method = self.method.clone();
        parts.uri = {
            let mut uri_parts = mem::take(&mut parts.uri).into_parts();
            uri_parts.scheme = Some(self.scheme.clone());
            uri_parts.authority = Some(self.authority.clone());
            uri_parts.path_and_query =
                Some(PathAndQuery::try_from(self.path_params_query().as_str())?);
            Uri::from_parts(uri_parts).map_err(Error::from)?
        };

        Ok(())
    }

    /// The network authority to sign: an explicit `Host` header wins over the
    /// authority parsed from the URL.
    pub fn authority_to_sign(&self) -> String {
        self.headers
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| self.authority.to_string())
    }

    /// Path with `;params` and `?query` appended in that order; absent pieces
    /// contribute nothing.
    pub fn path_params_query(&self) -> String {
        let mut s = self.path.clone();
        if let Some(params) = &self.params {
            s.push(';');
            s.push_str(params);
        }
        if let Some(query) = &self.query {
            s.push('?');
            s.push_str(query);
        }
        s
    }
}

/// Split `;`-delimited params off the last path segment, mirroring how
/// `urllib.parse.urlparse` produces the `params` component.
fn split_path_params(path: &str) -> (String, Option<String>) {
    let last_segment = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    match path[last_segment..].find(';') {
        Some(i) => {
            let at = last_segment + i;
            (path[..at].to_string(), Some(path[at + 1..].to_string()))
        }
        None => (path.to_string(), None),
    }
}
