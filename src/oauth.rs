//! OAuth 1.0a request signing (RFC 5849, HMAC-SHA1).
//!
//! Every request to Twitter carries an `Authorization: OAuth ...` header
//! whose signature covers the method, the base URL, the `oauth_*` protocol
//! parameters and any query/body parameters of the request.

use std::collections::HashMap;

use anyhow::{Result, anyhow};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use rand::Rng;
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Everything except the RFC 3986 unreserved set gets escaped.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// A key/secret pair: either the app's consumer credentials or a
/// (request or access) token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub key: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }
}

/// A request about to be signed.
#[derive(Debug, Clone)]
pub struct OAuthRequest<'a> {
    method: &'a str,
    url: &'a str,
    consumer: &'a Credentials,
    token: Option<&'a Credentials>,
    oauth_extra: Vec<(&'static str, String)>,
    params: Vec<(String, String)>,
}

impl<'a> OAuthRequest<'a> {
    /// `url` must not carry a query string; pass query values via [`param`](Self::param).
    pub fn new(method: &'a str, url: &'a str, consumer: &'a Credentials) -> Self {
        Self {
            method,
            url,
            consumer,
            token: None,
            oauth_extra: Vec::new(),
            params: Vec::new(),
        }
    }

    pub fn token(mut self, token: &'a Credentials) -> Self {
        self.token = Some(token);
        self
    }

    /// Extra protocol parameter such as `oauth_callback` or `oauth_verifier`.
    pub fn oauth_param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.oauth_extra.push((key, value.into()));
        self
    }

    /// Query or form parameter that is part of the signature.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Header value with a fresh nonce and the current timestamp.
    pub fn authorization(&self) -> Result<String> {
        self.authorization_with(&nonce(), chrono::Utc::now().timestamp())
    }

    pub fn authorization_with(&self, nonce: &str, timestamp: i64) -> Result<String> {
        let mut oauth = self.protocol_params(nonce, timestamp);
        let signature = self.signature(&oauth)?;
        oauth.push(("oauth_signature".to_string(), signature));
        oauth.sort();

        let fields: Vec<String> = oauth
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .collect();
        Ok(format!("OAuth {}", fields.join(", ")))
    }

    fn protocol_params(&self, nonce: &str, timestamp: i64) -> Vec<(String, String)> {
        let mut oauth = vec![
            ("oauth_consumer_key".to_string(), self.consumer.key.clone()),
            ("oauth_nonce".to_string(), nonce.to_string()),
            ("oauth_signature_method".to_string(), "HMAC-SHA1".to_string()),
            ("oauth_timestamp".to_string(), timestamp.to_string()),
            ("oauth_version".to_string(), "1.0".to_string()),
        ];
        if let Some(token) = self.token {
            oauth.push(("oauth_token".to_string(), token.key.clone()));
        }
        for (k, v) in &self.oauth_extra {
            oauth.push((k.to_string(), v.clone()));
        }
        oauth
    }

    /// RFC 5849 section 3.4.1 signature base string.
    pub fn signature_base(&self, oauth: &[(String, String)]) -> String {
        let mut pairs: Vec<(String, String)> = oauth
            .iter()
            .chain(self.params.iter())
            .map(|(k, v)| (encode(k), encode(v)))
            .collect();
        pairs.sort();

        let normalized: Vec<String> = pairs.iter().map(|(k, v)| format!("{k}={v}")).collect();

        format!(
            "{}&{}&{}",
            self.method.to_ascii_uppercase(),
            encode(self.url),
            encode(&normalized.join("&"))
        )
    }

    fn signature(&self, oauth: &[(String, String)]) -> Result<String> {
        let token_secret = self.token.map(|t| t.secret.as_str()).unwrap_or("");
        sign(&self.signature_base(oauth), &self.consumer.secret, token_secret)
    }
}

/// HMAC-SHA1 of `base` keyed by `consumer_secret&token_secret`, base64 encoded.
pub fn sign(base: &str, consumer_secret: &str, token_secret: &str) -> Result<String> {
    let key = format!("{}&{}", encode(consumer_secret), encode(token_secret));
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| anyhow!("invalid OAuth signing key: {e}"))?;
    mac.update(base.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// RFC 3986 percent-encoding.
pub fn encode(s: &str) -> String {
    utf8_percent_encode(s, UNRESERVED).to_string()
}

/// Parse an `application/x-www-form-urlencoded` body such as the token
/// endpoints return.
pub fn parse_form(body: &str) -> HashMap<String, String> {
    body.trim()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(k), decode(v))
        })
        .collect()
}

fn decode(s: &str) -> String {
    percent_decode_str(&s.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

fn nonce() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}
