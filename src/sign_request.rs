//! EdgeGrid request signer.

use http::header::{AUTHORIZATION, USER_AGENT};
use http::{HeaderMap, HeaderValue, Method};
use log::{debug, warn};

use crate::body::SigningBody;
use crate::constants::*;
use crate::credential::Credential;
use crate::request::SigningRequest;
use crate::time::{format_timestamp, DateTime};
use crate::utils::new_nonce;
use crate::{hash, time, Context, Error, Result, SignRequest};

/// Default cap on the number of POST body bytes included in the content
/// hash. Individual Akamai APIs may specify a different value.
pub const DEFAULT_MAX_BODY: usize = 131072;

/// RequestSigner implements the Akamai {OPEN} EdgeGrid authentication
/// scheme (`EG1-HMAC-SHA256`).
///
/// - [API Client Authentication](https://techdocs.akamai.com/developer/docs/authenticate-with-edgegrid)
#[derive(Debug)]
pub struct RequestSigner {
    headers_to_sign: Vec<String>,
    max_body: usize,
    time: Option<DateTime>,
    nonce: Option<String>,
}

impl Default for RequestSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestSigner {
    /// Create a signer with default options: no signed headers, `max_body`
    /// of 131072.
    pub fn new() -> Self {
        Self {
            headers_to_sign: Vec::new(),
            max_body: DEFAULT_MAX_BODY,
            time: None,
            nonce: None,
        }
    }

    /// Headers to include in the signature, in signing order. Provided by
    /// the specific Akamai API. Names are matched case-insensitively.
    pub fn with_headers_to_sign<I>(mut self, headers: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.headers_to_sign = headers
            .into_iter()
            .map(|h| h.into().to_lowercase())
            .collect();
        self
    }

    /// Maximum content body size hashed for POST requests. Provided by the
    /// specific Akamai API.
    pub fn with_max_body(mut self, max_body: usize) -> Self {
        self.max_body = max_body;
        self
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    pub(crate) fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Specify the nonce.
    ///
    /// # Note
    ///
    /// Nonces must be random per request. Only use this function for testing.
    #[cfg(test)]
    pub(crate) fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// Canonicalize the signed headers: for each configured name present in
    /// the request, emit `name:value` with whitespace runs collapsed and the
    /// value trimmed, joined by tabs. Order is the configured order, and
    /// unconfigured headers are excluded even when present.
    fn canonicalize_headers(&self, headers: &HeaderMap) -> String {
        let mut entries = Vec::with_capacity(self.headers_to_sign.len());
        for name in &self.headers_to_sign {
            if let Some(value) = headers.get(name.as_str()) {
                let value = String::from_utf8_lossy(value.as_bytes());
                entries.push(format!("{name}:{}", collapse_whitespace(&value)));
            }
        }
        entries.join("\t")
    }

    /// Compute the content hash field.
    ///
    /// Only POST bodies are hashed; this is a protocol rule, not an
    /// omission. An empty body yields an empty field, not the hash of zero
    /// bytes.
    fn content_hash(&self, method: &Method, body: &mut SigningBody) -> Result<String> {
        if *method != Method::POST {
            return Ok(String::new());
        }

        let buf = body.read_up_to(self.max_body)?;
        if buf.is_empty() {
            return Ok(String::new());
        }

        // The total length is only needed to report truncation. Not knowing
        // it must not abort signing.
        match body.content_length() {
            Ok(len) if len > self.max_body as u64 => debug!(
                "body length {len} is larger than maximum {} and will be truncated for computing the hash",
                self.max_body
            ),
            Ok(_) => {}
            Err(err) => warn!("cannot determine length of request body: {err}"),
        }

        Ok(hash::base64_sha256(&buf))
    }

    /// Build the tab-joined data to sign: method, scheme, authority,
    /// path[;params][?query], canonicalized headers, content hash, and the
    /// unsigned auth-header preamble as the final field.
    fn data_to_sign(
        &self,
        req: &SigningRequest,
        body: &mut SigningBody,
        auth_header: &str,
    ) -> Result<String> {
        let data = [
            req.method.as_str(),
            req.scheme.as_str(),
            &req.authority_to_sign(),
            &req.path_params_query(),
            &self.canonicalize_headers(&req.headers),
            &self.content_hash(&req.method, body)?,
            auth_header,
        ]
        .join("\t");

        debug!("data to sign: {}", data.replace('\t', "\\t"));
        Ok(data)
    }
}

#[async_trait::async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        ctx: &Context,
        parts: &mut http::request::Parts,
        credential: Option<&Self::Credential>,
        body: &mut SigningBody,
    ) -> Result<()> {
        let cred = credential.ok_or_else(|| Error::credential_invalid("missing credential"))?;

        let now = self.time.unwrap_or_else(time::now);
        let timestamp = format_timestamp(now);
        let nonce = self.nonce.clone().unwrap_or_else(new_nonce);

        append_cli_user_agent(ctx, &mut parts.headers)?;

        let mut req = SigningRequest::build(parts)?;

        let auth_header = format!(
            "EG1-HMAC-SHA256 client_token={};access_token={};timestamp={};nonce={};",
            cred.client_token, cred.access_token, timestamp, nonce
        );
        debug!("unsigned authorization header: {auth_header}");

        let data_to_sign = self.data_to_sign(&req, body, &auth_header)?;
        // The signing key is bound to the timestamp: a leaked derived key is
        // only good for one timestamp window.
        let signing_key =
            hash::base64_hmac_sha256(cred.client_secret.as_bytes(), timestamp.as_bytes());
        let signature =
            hash::base64_hmac_sha256(signing_key.as_bytes(), data_to_sign.as_bytes());

        req.headers.insert(AUTHORIZATION, {
            let mut value: HeaderValue = format!("{auth_header}signature={signature}").parse()?;
            value.set_sensitive(true);

            value
        });

        req.apply(parts)
    }
}

/// Collapse internal whitespace runs to a single space and trim the ends.
fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Append the Akamai CLI suffix to `User-Agent` when the well-known
/// environment values are set. Purely diagnostic; runs before the signing
/// view captures headers so signed `User-Agent` values stay consistent.
fn append_cli_user_agent(ctx: &Context, headers: &mut HeaderMap) -> Result<()> {
    // An empty value counts as unset.
    let var = |key: &str| ctx.env_var(key).filter(|v| !v.is_empty());

    let mut suffix = String::new();

    if let (Some(_), Some(version)) = (var(AKAMAI_CLI), var(AKAMAI_CLI_VERSION)) {
        suffix.push_str(&format!(" AkamaiCLI/{version}"));
    }
    if let (Some(command), Some(version)) =
        (var(AKAMAI_CLI_COMMAND), var(AKAMAI_CLI_COMMAND_VERSION))
    {
        suffix.push_str(&format!(" AkamaiCLI-{command}/{version}"));
    }

    if suffix.is_empty() {
        return Ok(());
    }

    let value = match headers.get(USER_AGENT) {
        Some(existing) => format!("{}{suffix}", existing.to_str()?),
        None => suffix.trim_start().to_string(),
    };
    headers.insert(USER_AGENT, value.parse()?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::{TimeZone, Utc};
    use http::Uri;
    use pretty_assertions::assert_eq;

    use super::*;

    // Fixed inputs shared by the known-vector tests. Expected outputs were
    // produced with the Python reference client.
    const CLIENT_TOKEN: &str = "akab-client-token-xxx-xxxxxxxxxxxxxxxx";
    const CLIENT_SECRET: &str = "SOMESECRET";
    const ACCESS_TOKEN: &str = "akab-access-token-xxx-xxxxxxxxxxxxxxxx";
    const NONCE: &str = "nonce-xx-xxxx-xxxx-xxxx-xxxxxxxxxxxx";
    const BASE: &str = "https://akaa-baseurl-xxxxxxxxxxx-xxxxxxxxxxxxx.luna.akamaiapis.net";

    fn credential() -> Credential {
        Credential::new(CLIENT_TOKEN, CLIENT_SECRET, ACCESS_TOKEN)
    }

    fn fixed_time() -> DateTime {
        Utc.with_ymd_and_hms(2014, 3, 21, 19, 34, 21).unwrap()
    }

    fn signer() -> RequestSigner {
        RequestSigner::new().with_time(fixed_time()).with_nonce(NONCE)
    }

    fn preamble() -> String {
        format!(
            "EG1-HMAC-SHA256 client_token={CLIENT_TOKEN};access_token={ACCESS_TOKEN};\
             timestamp=20140321T19:34:21+0000;nonce={NONCE};"
        )
    }

    async fn sign(
        signer: RequestSigner,
        req: http::Request<()>,
        body: &mut SigningBody,
    ) -> String {
        let (mut parts, _) = req.into_parts();
        signer
            .sign_request(&Context::new(), &mut parts, Some(&credential()), body)
            .await
            .unwrap();
        parts
            .headers
            .get(AUTHORIZATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_sign_get() {
        let req = http::Request::get(Uri::from_str(&format!("{BASE}/")).unwrap())
            .body(())
            .unwrap();
        let auth = sign(signer(), req, &mut SigningBody::Empty).await;

        assert_eq!(
            auth,
            format!("{}signature=MY1mmxCqlyWh8XrFw3kxSlb6/AxJUXsjtZm6xqzmkjE=", preamble())
        );
    }

    #[tokio::test]
    async fn test_sign_get_with_query() {
        let req =
            http::Request::get(Uri::from_str(&format!("{BASE}/testapi/v1/t3?ss=ss&bb=bb")).unwrap())
                .body(())
                .unwrap();
        let auth = sign(signer(), req, &mut SigningBody::Empty).await;

        assert_eq!(
            auth,
            format!("{}signature=GbeX/455vKfm0REkdE16Jwkmcqc36Kp2jJblIdH66/c=", preamble())
        );
    }

    #[tokio::test]
    async fn test_sign_get_with_path_params() {
        let req =
            http::Request::get(Uri::from_str(&format!("{BASE}/testapi/v1/t1;p1=v1?q=1")).unwrap())
                .body(())
                .unwrap();
        let auth = sign(signer(), req, &mut SigningBody::Empty).await;

        assert_eq!(
            auth,
            format!("{}signature=EgB2oHHKcy1SWtTfr4w4jTPQO3tk8im4U00wK/0eh8E=", preamble())
        );
    }

    #[tokio::test]
    async fn test_sign_post_body() {
        let req = http::Request::post(Uri::from_str(&format!("{BASE}/testapi/v1/t3")).unwrap())
            .body(())
            .unwrap();
        let mut body = SigningBody::from("datadatadatadatadatadatadatadata");
        let auth = sign(signer(), req, &mut body).await;

        assert_eq!(
            auth,
            format!("{}signature=7ThnM/AFQUAbNqNzb8MIbZhpEzzubibNXIlfN8WZA50=", preamble())
        );
    }

    #[tokio::test]
    async fn test_sign_post_truncates_body() {
        let req = http::Request::post(Uri::from_str(&format!("{BASE}/testapi/v1/t3")).unwrap())
            .body(())
            .unwrap();
        let mut body = SigningBody::from("d".repeat(4096));
        let auth = sign(signer().with_max_body(2048), req, &mut body).await;

        // The hash covers exactly the first 2048 bytes.
        assert_eq!(
            auth,
            format!("{}signature=Jdn07yzyUOGeH9FioqSJW60lLZ707wm8csQeXSmGPaY=", preamble())
        );
    }

    #[tokio::test]
    async fn test_sign_post_empty_body() {
        let req = http::Request::post(Uri::from_str(&format!("{BASE}/testapi/v1/t3")).unwrap())
            .body(())
            .unwrap();
        let auth = sign(signer(), req, &mut SigningBody::from("")).await;

        assert_eq!(
            auth,
            format!("{}signature=ZUQekvH6Htb3q8RwNa5UThuhXi2FdanJr7hQRr0wp+I=", preamble())
        );
    }

    #[tokio::test]
    async fn test_sign_with_signed_headers() {
        let signer = signer().with_headers_to_sign(["X-TestHeader", "x-testheader2"]);
        let mut req = http::Request::get(Uri::from_str(&format!("{BASE}/testapi/v1/t1")).unwrap())
            .body(())
            .unwrap();
        req.headers_mut()
            .insert("x-testheader", "  first  value  ".parse().unwrap());
        req.headers_mut()
            .insert("x-testheader2", "second value".parse().unwrap());
        let auth = sign(signer, req, &mut SigningBody::Empty).await;

        assert_eq!(
            auth,
            format!("{}signature=By5fZb4FB+XOCL+nn49Xe2ow53b+lwA46Xxv5DlCU1I=", preamble())
        );
    }

    #[tokio::test]
    async fn test_sign_with_host_header_override() {
        let mut req = http::Request::get(Uri::from_str(&format!("{BASE}/x")).unwrap())
            .body(())
            .unwrap();
        req.headers_mut()
            .insert(http::header::HOST, "override.example.com".parse().unwrap());
        let auth = sign(signer(), req, &mut SigningBody::Empty).await;

        assert_eq!(
            auth,
            format!("{}signature=sYzn9UIXlYQYs1FHeHq1mdnG1C/H3M6iSg1yBklWoMs=", preamble())
        );
    }

    #[tokio::test]
    async fn test_signing_is_deterministic() {
        let uri = Uri::from_str(&format!("{BASE}/testapi/v1/t3")).unwrap();

        let first = sign(
            signer(),
            http::Request::post(uri.clone()).body(()).unwrap(),
            &mut SigningBody::from("test_body"),
        )
        .await;
        let second = sign(
            signer(),
            http::Request::post(uri).body(()).unwrap(),
            &mut SigningBody::from("test_body"),
        )
        .await;

        assert_eq!(first, second);
    }

    #[test]
    fn test_data_to_sign_layout() {
        let signer = RequestSigner::new();
        let mut parts = http::Request::get(Uri::from_str(&format!("{BASE}/")).unwrap())
            .body(())
            .unwrap()
            .into_parts()
            .0;
        let req = SigningRequest::build(&mut parts).unwrap();
        let data = signer
            .data_to_sign(&req, &mut SigningBody::Empty, "PREAMBLE")
            .unwrap();

        // GET with no signed headers and no body: empty 5th and 6th fields.
        assert_eq!(
            data,
            "GET\thttps\takaa-baseurl-xxxxxxxxxxx-xxxxxxxxxxxxx.luna.akamaiapis.net\t/\t\t\tPREAMBLE"
        );
    }

    #[test]
    fn test_content_hash_only_for_post() {
        let signer = RequestSigner::new();
        let mut body = SigningBody::from("test_body");

        for method in [Method::GET, Method::PUT, Method::DELETE, Method::HEAD] {
            assert_eq!(signer.content_hash(&method, &mut body).unwrap(), "");
        }

        assert_eq!(
            signer.content_hash(&Method::POST, &mut body).unwrap(),
            "REPGqEEubBHzJMhwqDZtbt515/ntEvAMNriNR53zcdY="
        );
    }

    #[test]
    fn test_content_hash_truncation() {
        // max_body of 9 over a longer body hashes exactly the first 9 bytes,
        // which here spell "test_body".
        let signer = RequestSigner::new().with_max_body(9);
        let mut body = SigningBody::from("test_body_longer");

        assert_eq!(
            signer.content_hash(&Method::POST, &mut body).unwrap(),
            "REPGqEEubBHzJMhwqDZtbt515/ntEvAMNriNR53zcdY="
        );
    }

    #[test]
    fn test_canonicalize_headers_collapses_whitespace() {
        let signer = RequestSigner::new().with_headers_to_sign(["x-mything1"]);
        let mut headers = HeaderMap::new();
        headers.insert("X-MyThing1", "value  with   spaces".parse().unwrap());

        assert_eq!(
            signer.canonicalize_headers(&headers),
            "x-mything1:value with spaces"
        );
    }

    #[test]
    fn test_canonicalize_headers_skips_absent_and_unlisted() {
        let signer = RequestSigner::new().with_headers_to_sign(["x-a", "x-missing", "x-b"]);
        let mut headers = HeaderMap::new();
        headers.insert("x-b", "2".parse().unwrap());
        headers.insert("x-a", "1".parse().unwrap());
        headers.insert("x-unlisted", "nope".parse().unwrap());

        // Configured order, absent names silently skipped.
        assert_eq!(signer.canonicalize_headers(&headers), "x-a:1\tx-b:2");
    }

    #[test]
    fn test_append_cli_user_agent() {
        use crate::env::StaticEnv;

        let ctx = Context::new().with_env(StaticEnv {
            home_dir: None,
            envs: std::collections::HashMap::from([
                (AKAMAI_CLI.to_string(), "1".to_string()),
                (AKAMAI_CLI_VERSION.to_string(), "1.2.3".to_string()),
                (AKAMAI_CLI_COMMAND.to_string(), "property".to_string()),
                (AKAMAI_CLI_COMMAND_VERSION.to_string(), "4.5.6".to_string()),
            ]),
        });

        let mut headers = HeaderMap::new();
        append_cli_user_agent(&ctx, &mut headers).unwrap();
        assert_eq!(
            headers.get(USER_AGENT).unwrap(),
            "AkamaiCLI/1.2.3 AkamaiCLI-property/4.5.6"
        );

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, "my-client/0.1".parse().unwrap());
        append_cli_user_agent(&ctx, &mut headers).unwrap();
        assert_eq!(
            headers.get(USER_AGENT).unwrap(),
            "my-client/0.1 AkamaiCLI/1.2.3 AkamaiCLI-property/4.5.6"
        );

        // No CLI environment: header untouched.
        let mut headers = HeaderMap::new();
        append_cli_user_agent(&Context::new(), &mut headers).unwrap();
        assert!(headers.get(USER_AGENT).is_none());
    }

    #[test]
    fn test_append_cli_user_agent_ignores_empty_values() {
        use crate::env::StaticEnv;

        let ctx = Context::new().with_env(StaticEnv {
            home_dir: None,
            envs: std::collections::HashMap::from([
                (AKAMAI_CLI.to_string(), "1".to_string()),
                (AKAMAI_CLI_VERSION.to_string(), String::new()),
                (AKAMAI_CLI_COMMAND.to_string(), "property".to_string()),
                (AKAMAI_CLI_COMMAND_VERSION.to_string(), "4.5.6".to_string()),
            ]),
        });

        // Empty AKAMAI_CLI_VERSION counts as unset; only the command pair
        // contributes.
        let mut headers = HeaderMap::new();
        append_cli_user_agent(&ctx, &mut headers).unwrap();
        assert_eq!(
            headers.get(USER_AGENT).unwrap(),
            "AkamaiCLI-property/4.5.6"
        );
    }
}
