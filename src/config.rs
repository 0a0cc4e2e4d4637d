use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use serde::Deserialize;

use crate::oauth::Credentials;

/// Runtime configuration for the `tweetage` web app.
///
/// Every flag can also be set through the environment variable named next to
/// it; a `.env` file in the working directory is loaded first. The Twitter
/// consumer credentials come from `TWITTER_CONSUMER_KEY` and
/// `TWITTER_CONSUMER_SECRET`, falling back to the secret file.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "tweetage",
    version,
    about = "Shows how old your Twitter account is and when it hits its next milestone"
)]
pub struct CliArgs {
    /// Address the HTTP server listens on.
    ///
    /// Environment variable: `BIND_ADDR`
    #[arg(long, env = "BIND_ADDR", default_value_t = String::from("0.0.0.0:8000"))]
    pub bind_addr: String,

    /// Absolute URL Twitter redirects the visitor to after approval.
    ///
    /// Environment variable: `CALLBACK_URL`
    #[arg(long, env = "CALLBACK_URL", default_value_t = String::from("http://localhost:8000/response"))]
    pub callback_url: String,

    /// Scheme and host of the Twitter API.
    ///
    /// Environment variable: `TWITTER_API_BASE`
    #[arg(long, env = "TWITTER_API_BASE", default_value_t = String::from("https://api.twitter.com"))]
    pub api_base: String,

    /// JSON file holding `{"twitter": {"consumerKey": ..., "consumerSecret": ...}}`.
    ///
    /// Environment variable: `SECRET_PATH`
    #[arg(long, env = "SECRET_PATH", default_value = "secret.json")]
    pub secret_path: PathBuf,

    /// Environment variable: `TWITTER_CONSUMER_KEY`
    #[arg(long, env = "TWITTER_CONSUMER_KEY", hide_env_values = true)]
    pub consumer_key: Option<String>,

    /// Environment variable: `TWITTER_CONSUMER_SECRET`
    #[arg(long, env = "TWITTER_CONSUMER_SECRET", hide_env_values = true)]
    pub consumer_secret: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub callback_url: String,
    pub api_base: String,
    pub consumer: Credentials,
}

#[derive(Debug, Deserialize)]
struct SecretFile {
    twitter: TwitterSecret,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TwitterSecret {
    consumer_key: String,
    consumer_secret: String,
}

impl TryFrom<CliArgs> for Config {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let consumer = match (args.consumer_key, args.consumer_secret) {
            (Some(key), Some(secret)) => Credentials::new(key, secret),
            (key, secret) => {
                let file = read_secret_file(&args.secret_path)?;
                Credentials::new(
                    key.unwrap_or(file.twitter.consumer_key),
                    secret.unwrap_or(file.twitter.consumer_secret),
                )
            }
        };

        if consumer.key.is_empty() || consumer.secret.is_empty() {
            bail!("Twitter consumer key and secret must not be empty");
        }

        if !args.callback_url.starts_with("http://") && !args.callback_url.starts_with("https://") {
            bail!("CALLBACK_URL must be an absolute http(s) URL, got {:?}", args.callback_url);
        }

        Ok(Self {
            bind_addr: args.bind_addr,
            callback_url: args.callback_url,
            api_base: args.api_base,
            consumer,
        })
    }
}

fn read_secret_file(path: &Path) -> anyhow::Result<SecretFile> {
    let raw = std::fs::read_to_string(path).with_context(|| {
        format!(
            "TWITTER_CONSUMER_KEY/TWITTER_CONSUMER_SECRET not set and {} could not be read",
            path.display()
        )
    })?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Built by hand rather than parsed so TWITTER_* variables in the test
    // environment cannot leak in.
    fn args(key: Option<&str>, secret: Option<&str>) -> CliArgs {
        CliArgs {
            bind_addr: "0.0.0.0:8000".to_string(),
            callback_url: "http://localhost:8000/response".to_string(),
            api_base: "https://api.twitter.com".to_string(),
            secret_path: PathBuf::from("/nonexistent/secret.json"),
            consumer_key: key.map(str::to_string),
            consumer_secret: secret.map(str::to_string),
        }
    }

    #[test]
    fn flags_parse_with_defaults() {
        let parsed = CliArgs::try_parse_from([
            "tweetage",
            "--consumer-key",
            "ck",
            "--consumer-secret",
            "cs",
            "--bind-addr",
            "127.0.0.1:9000",
        ])
        .unwrap();

        assert_eq!(parsed.consumer_key.as_deref(), Some("ck"));
        assert_eq!(parsed.consumer_secret.as_deref(), Some("cs"));
        assert_eq!(parsed.bind_addr, "127.0.0.1:9000");
    }

    #[test]
    fn credentials_from_args() {
        let config = Config::try_from(args(Some("ck"), Some("cs"))).unwrap();

        assert_eq!(config.consumer, Credentials::new("ck", "cs"));
        assert_eq!(config.bind_addr, "0.0.0.0:8000");
        assert_eq!(config.api_base, "https://api.twitter.com");
        assert_eq!(config.callback_url, "http://localhost:8000/response");
    }

    #[test]
    fn credentials_from_secret_file() {
        let path = std::env::temp_dir().join(format!("tweetage-secret-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"twitter": {"consumerKey": "file-key", "consumerSecret": "file-secret"}}"#,
        )
        .unwrap();

        let mut cli = args(Some("flag-key"), None);
        cli.secret_path = path.clone();
        let config = Config::try_from(cli).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.consumer, Credentials::new("flag-key", "file-secret"));
    }

    #[test]
    fn missing_credentials_fail() {
        let err = Config::try_from(args(None, None)).unwrap_err();
        assert!(err.to_string().contains("could not be read"));
    }

    #[test]
    fn empty_credentials_fail() {
        let err = Config::try_from(args(Some(""), Some("cs"))).unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn relative_callback_is_rejected() {
        let mut cli = args(Some("ck"), Some("cs"));
        cli.callback_url = "/response".to_string();
        let err = Config::try_from(cli).unwrap_err();
        assert!(err.to_string().contains("CALLBACK_URL"));
    }
}
