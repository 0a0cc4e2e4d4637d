use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use reqwest::header::{AUTHORIZATION, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::sync::Arc;

use crate::oauth::{self, Credentials, OAuthRequest};

/// `created_at` as Twitter's v1.1 API formats it: `Wed Oct 10 20:19:24 +0000 2018`.
const TWITTER_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

#[derive(Clone)]
pub struct TwitterClient {
    consumer: Arc<Credentials>,
    api_base: Arc<String>,
    callback_url: Arc<String>,
    http: Arc<Client>,
}

/// Token issued by `oauth/access_token` once the visitor approved the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub credentials: Credentials,
    pub user_id: Option<String>,
    pub screen_name: Option<String>,
}

/// The subset of `account/verify_credentials` the profile page needs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TwitterUser {
    pub id_str: String,
    pub screen_name: String,
    pub name: String,
    #[serde(deserialize_with = "deserialize_twitter_date")]
    pub created_at: DateTime<Utc>,
    pub statuses_count: i64,
    #[serde(default)]
    pub followers_count: i64,
    #[serde(default)]
    pub friends_count: i64,
    #[serde(default)]
    pub profile_image_url_https: Option<String>,
}

impl TwitterClient {
    /// Create a client signing requests with the app's consumer credentials.
    ///
    /// `api_base` is the scheme and host of the API, e.g. `https://api.twitter.com`.
    pub fn new(consumer: Credentials, api_base: &str, callback_url: &str) -> Result<Self> {
        if consumer.key.is_empty() || consumer.secret.is_empty() {
            bail!("Twitter consumer key and secret must not be empty");
        }

        let http = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            consumer: Arc::new(consumer),
            api_base: Arc::new(api_base.trim_end_matches('/').to_string()),
            callback_url: Arc::new(callback_url.to_string()),
            http: Arc::new(http),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    /// Send a signed request, failing on anything but a 2xx response.
    async fn send(&self, req: RequestBuilder, authorization: String, what: &str) -> Result<Response> {
        let resp = req
            .header(AUTHORIZATION, authorization)
            .header(USER_AGENT, "tweetage")
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Network error calling {what}: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Twitter {what} returned HTTP {}: {}", status.as_u16(), body.trim());
        }

        Ok(resp)
    }

    /// Send a signed request whose response is form encoded.
    async fn send_form(
        &self,
        req: RequestBuilder,
        authorization: String,
        what: &str,
    ) -> Result<HashMap<String, String>> {
        let body = self
            .send(req, authorization, what)
            .await?
            .text()
            .await
            .with_context(|| format!("Failed to read {what} response"))?;

        Ok(oauth::parse_form(&body))
    }

    /// Step 1: obtain a temporary request token bound to our callback URL.
    pub async fn request_token(&self) -> Result<Credentials> {
        let url = self.url("/oauth/request_token");
        let authorization = OAuthRequest::new("POST", &url, &self.consumer)
            .oauth_param("oauth_callback", self.callback_url.as_str())
            .authorization()?;

        let form = self
            .send_form(self.http.post(&url), authorization, "oauth/request_token")
            .await?;

        if form.get("oauth_callback_confirmed").map(String::as_str) != Some("true") {
            bail!("Twitter did not confirm the OAuth callback URL");
        }

        let token = form
            .get("oauth_token")
            .context("request_token response is missing oauth_token")?;
        let secret = form
            .get("oauth_token_secret")
            .context("request_token response is missing oauth_token_secret")?;

        Ok(Credentials::new(token.as_str(), secret.as_str()))
    }

    /// Step 2: where to send the visitor to approve `request_token`.
    pub fn authenticate_url(&self, request_token: &str) -> String {
        format!(
            "{}?oauth_token={}",
            self.url("/oauth/authenticate"),
            oauth::encode(request_token)
        )
    }

    /// Step 3: exchange the approved request token for an access token.
    pub async fn access_token(&self, request: &Credentials, verifier: &str) -> Result<AccessToken> {
        let url = self.url("/oauth/access_token");
        let authorization = OAuthRequest::new("POST", &url, &self.consumer)
            .token(request)
            .oauth_param("oauth_verifier", verifier)
            .authorization()?;

        let mut form = self
            .send_form(self.http.post(&url), authorization, "oauth/access_token")
            .await?;

        let token = form
            .remove("oauth_token")
            .context("access_token response is missing oauth_token")?;
        let secret = form
            .remove("oauth_token_secret")
            .context("access_token response is missing oauth_token_secret")?;

        Ok(AccessToken {
            credentials: Credentials::new(token, secret),
            user_id: form.remove("user_id"),
            screen_name: form.remove("screen_name"),
        })
    }

    /// Profile of the account the access token belongs to.
    pub async fn verify_credentials(&self, access: &Credentials) -> Result<TwitterUser> {
        let url = self.url("/1.1/account/verify_credentials.json");
        let authorization = OAuthRequest::new("GET", &url, &self.consumer)
            .token(access)
            .authorization()?;

        self.send(self.http.get(&url), authorization, "account/verify_credentials")
            .await?
            .json::<TwitterUser>()
            .await
            .context("Failed to deserialize verify_credentials response")
    }
}

pub fn parse_twitter_date(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_str(s, TWITTER_DATE_FORMAT)
        .map(|d| d.with_timezone(&Utc))
        .with_context(|| format!("invalid Twitter date {s:?}"))
}

fn deserialize_twitter_date<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_twitter_date(&s).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn client() -> TwitterClient {
        TwitterClient::new(
            Credentials::new("key", "secret"),
            "https://api.twitter.com/",
            "http://localhost:8000/response",
        )
        .unwrap()
    }

    #[test]
    fn parses_twitter_dates() {
        assert_eq!(
            parse_twitter_date("Wed Oct 10 20:19:24 +0000 2018").unwrap(),
            Utc.with_ymd_and_hms(2018, 10, 10, 20, 19, 24).unwrap()
        );
        assert_eq!(
            parse_twitter_date("Sat Mar 21 08:00:00 +0200 2009").unwrap(),
            Utc.with_ymd_and_hms(2009, 3, 21, 6, 0, 0).unwrap()
        );
        assert!(parse_twitter_date("2018-10-10").is_err());
    }

    #[test]
    fn deserializes_user() {
        let json = r#"{
            "id": 6253282,
            "id_str": "6253282",
            "name": "Twitter API",
            "screen_name": "TwitterAPI",
            "created_at": "Wed May 23 06:01:13 +0000 2007",
            "statuses_count": 3656,
            "followers_count": 6133636,
            "friends_count": 12,
            "profile_image_url_https": "https://pbs.twimg.com/profile_images/2284174872/7df3h38zabcvjylnyfe3_normal.png"
        }"#;

        let user: TwitterUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.screen_name, "TwitterAPI");
        assert_eq!(user.statuses_count, 3656);
        assert_eq!(
            user.created_at,
            Utc.with_ymd_and_hms(2007, 5, 23, 6, 1, 13).unwrap()
        );
    }

    #[test]
    fn authenticate_url_escapes_token() {
        assert_eq!(
            client().authenticate_url("abc=="),
            "https://api.twitter.com/oauth/authenticate?oauth_token=abc%3D%3D"
        );
    }

    #[test]
    fn rejects_empty_consumer() {
        assert!(TwitterClient::new(Credentials::new("", ""), "https://api.twitter.com", "x").is_err());
    }
}
