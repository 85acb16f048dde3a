//! OAuth credential lifecycle for the hosting platform.
//!
//! The token cache is a JSON file. A run evaluates the cached token into one
//! of three states: usable as-is, refreshable, or gone — the last falls back
//! to the interactive consent flow. An interactive grant without a refresh
//! token is treated as misconfiguration and is fatal.

use crate::error::{RasiError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{info, warn};

/// Loopback port for the interactive consent redirect.
const REDIRECT_PORT: u16 = 8080;

/// Refresh slightly before the reported expiry to absorb clock skew.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Cached OAuth token bundle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expiry: DateTime<Utc>,
}

impl StoredToken {
    /// Whether the access token has passed its expiry (with margin).
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) >= self.expiry
    }
}

/// What to do with the cached token on this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    /// Cached token is usable as-is.
    Valid,
    /// Expired but refreshable.
    NeedsRefresh,
    /// No usable token: interactive authentication required.
    NeedsInteractive,
}

/// Evaluate the credential state machine for a cached token.
pub fn evaluate(token: Option<&StoredToken>, now: DateTime<Utc>) -> TokenState {
    match token {
        Some(t) if !t.is_expired(now) => TokenState::Valid,
        Some(t) if t.refresh_token.is_some() => TokenState::NeedsRefresh,
        _ => TokenState::NeedsInteractive,
    }
}

/// OAuth client secrets (the `installed` application section).
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
}

#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: ClientSecrets,
}

impl ClientSecrets {
    /// Load secrets from the standard client secrets JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RasiError::Auth(format!(
                "client secrets file not found: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        let parsed: ClientSecretsFile = serde_json::from_str(&content)
            .map_err(|e| RasiError::Auth(format!("invalid client secrets file: {}", e)))?;
        Ok(parsed.installed)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
}

/// Drives the credential state machine and persists the cache.
pub struct Authenticator {
    client: reqwest::Client,
    secrets: ClientSecrets,
    token_path: PathBuf,
    scopes: Vec<String>,
}

impl Authenticator {
    pub fn new(secrets: ClientSecrets, token_path: PathBuf, scopes: Vec<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            secrets,
            token_path,
            scopes,
        }
    }

    /// Produce a valid access token, walking the state machine as needed.
    pub async fn authenticate(&self) -> Result<StoredToken> {
        let cached = self.load_cached();

        match (evaluate(cached.as_ref(), Utc::now()), cached) {
            (TokenState::Valid, Some(token)) => {
                info!("Cached credentials are valid");
                Ok(token)
            }
            (TokenState::NeedsRefresh, Some(token)) => {
                info!("Refreshing expired credentials");
                match self.refresh(&token).await {
                    Ok(refreshed) => {
                        self.save(&refreshed)?;
                        info!("Saved refreshed credentials to cache");
                        Ok(refreshed)
                    }
                    Err(e) => {
                        warn!("Could not refresh credentials: {}", e);
                        self.interactive().await
                    }
                }
            }
            _ => {
                info!("No valid credentials found, starting new authentication");
                self.interactive().await
            }
        }
    }

    fn load_cached(&self) -> Option<StoredToken> {
        if !self.token_path.exists() {
            return None;
        }
        info!("Found cached credentials file");
        match std::fs::read_to_string(&self.token_path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(token) => Some(token),
                Err(e) => {
                    warn!("Cached credentials are invalid: {}", e);
                    None
                }
            },
            Err(e) => {
                warn!("Error loading cached credentials: {}", e);
                None
            }
        }
    }

    fn save(&self, token: &StoredToken) -> Result<()> {
        if let Some(parent) = self.token_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.token_path, serde_json::to_string_pretty(token)?)?;
        Ok(())
    }

    /// Exchange a refresh token for a fresh access token.
    async fn refresh(&self, token: &StoredToken) -> Result<StoredToken> {
        let refresh_token = token
            .refresh_token
            .as_deref()
            .ok_or_else(|| RasiError::Auth("no refresh token available".to_string()))?;

        let response = self
            .client
            .post(&self.secrets.token_uri)
            .form(&[
                ("client_id", self.secrets.client_id.as_str()),
                ("client_secret", self.secrets.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(RasiError::Auth(format!("token refresh rejected: {}", detail)));
        }

        let parsed: TokenResponse = response.json().await?;
        Ok(StoredToken {
            access_token: parsed.access_token,
            // Refresh responses usually omit the refresh token; keep ours.
            refresh_token: parsed
                .refresh_token
                .or_else(|| token.refresh_token.clone()),
            expiry: Utc::now() + Duration::seconds(parsed.expires_in),
        })
    }

    /// Run the interactive consent flow on the local loopback.
    async fn interactive(&self) -> Result<StoredToken> {
        let redirect_uri = format!("http://localhost:{}/", REDIRECT_PORT);

        let mut auth_url = url::Url::parse(&self.secrets.auth_uri)
            .map_err(|e| RasiError::Auth(format!("invalid auth uri: {}", e)))?;
        auth_url
            .query_pairs_mut()
            .append_pair("client_id", &self.secrets.client_id)
            .append_pair("redirect_uri", &redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.scopes.join(" "))
            .append_pair("access_type", "offline")
            // Force the consent screen so a refresh token is granted.
            .append_pair("prompt", "consent");

        println!("Please open this URL in your browser to authorize the application:");
        println!("\n  {}\n", auth_url);
        info!("Waiting for the OAuth redirect on port {}", REDIRECT_PORT);

        let code = self.wait_for_redirect_code().await?;

        let response = self
            .client
            .post(&self.secrets.token_uri)
            .form(&[
                ("client_id", self.secrets.client_id.as_str()),
                ("client_secret", self.secrets.client_secret.as_str()),
                ("code", code.as_str()),
                ("grant_type", "authorization_code"),
                ("redirect_uri", redirect_uri.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(RasiError::Auth(format!("code exchange rejected: {}", detail)));
        }

        let parsed: TokenResponse = response.json().await?;

        // Without a refresh token every future run would need a browser;
        // treat that grant as misconfiguration.
        if parsed.refresh_token.is_none() {
            return Err(RasiError::Auth(
                "no refresh token received; re-run and grant all requested permissions"
                    .to_string(),
            ));
        }

        let token = StoredToken {
            access_token: parsed.access_token,
            refresh_token: parsed.refresh_token,
            expiry: Utc::now() + Duration::seconds(parsed.expires_in),
        };
        self.save(&token)?;
        info!("Successfully obtained credentials with refresh token");
        Ok(token)
    }

    /// One-shot loopback listener: accept a single redirect and pull the
    /// `code` query parameter out of the request line.
    async fn wait_for_redirect_code(&self) -> Result<String> {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", REDIRECT_PORT))
            .await
            .map_err(|e| {
                RasiError::Auth(format!("could not bind redirect port {}: {}", REDIRECT_PORT, e))
            })?;

        let (mut stream, _) = listener
            .accept()
            .await
            .map_err(|e| RasiError::Auth(format!("redirect accept failed: {}", e)))?;

        let mut buf = vec![0u8; 4096];
        let n = stream
            .read(&mut buf)
            .await
            .map_err(|e| RasiError::Auth(format!("redirect read failed: {}", e)))?;
        let request = String::from_utf8_lossy(&buf[..n]).to_string();

        let body = "<html><body>Authorization received. You can close this window.</body></html>";
        let reply = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        let _ = stream.write_all(reply.as_bytes()).await;

        extract_redirect_code(&request)
            .ok_or_else(|| RasiError::Auth("no authorization code in redirect".to_string()))
    }
}

/// Pull the `code` query parameter out of an HTTP request line.
fn extract_redirect_code(request: &str) -> Option<String> {
    let line = request.lines().next()?;
    let path = line.split_whitespace().nth(1)?;
    let full = format!("http://localhost{}", path);
    let parsed = url::Url::parse(&full).ok()?;
    parsed
        .query_pairs()
        .find(|(k, _)| k == "code")
        .map(|(_, v)| v.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(expired: bool, refresh: bool) -> StoredToken {
        StoredToken {
            access_token: "at".to_string(),
            refresh_token: refresh.then(|| "rt".to_string()),
            expiry: if expired {
                Utc::now() - Duration::hours(1)
            } else {
                Utc::now() + Duration::hours(1)
            },
        }
    }

    #[test]
    fn test_no_token_requires_interactive() {
        assert_eq!(evaluate(None, Utc::now()), TokenState::NeedsInteractive);
    }

    #[test]
    fn test_valid_token_used_without_prompt() {
        let t = token(false, true);
        assert_eq!(evaluate(Some(&t), Utc::now()), TokenState::Valid);
    }

    #[test]
    fn test_expired_with_refresh_goes_to_refresh() {
        let t = token(true, true);
        assert_eq!(evaluate(Some(&t), Utc::now()), TokenState::NeedsRefresh);
    }

    #[test]
    fn test_expired_without_refresh_requires_interactive() {
        let t = token(true, false);
        assert_eq!(evaluate(Some(&t), Utc::now()), TokenState::NeedsInteractive);
    }

    #[test]
    fn test_expiry_margin() {
        let t = StoredToken {
            access_token: "at".to_string(),
            refresh_token: None,
            expiry: Utc::now() + Duration::seconds(30),
        };
        // Inside the 60s margin counts as expired.
        assert!(t.is_expired(Utc::now()));
    }

    #[test]
    fn test_token_json_round_trip() {
        let t = token(false, true);
        let json = serde_json::to_string(&t).unwrap();
        let back: StoredToken = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_extract_redirect_code() {
        let request = "GET /?state=xyz&code=4%2FabcDEF&scope=upload HTTP/1.1\r\nHost: localhost\r\n";
        assert_eq!(extract_redirect_code(request).unwrap(), "4/abcDEF");
    }

    #[test]
    fn test_extract_redirect_code_missing() {
        let request = "GET /?error=access_denied HTTP/1.1\r\n";
        assert!(extract_redirect_code(request).is_none());
    }
}
