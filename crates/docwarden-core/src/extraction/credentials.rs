//! Google credential discovery and OAuth access-token exchange.
//!
//! Credentials are handed to the client as a [`CredentialsConfig`] value. The
//! process environment is only ever read, never written.

use std::path::{Path, PathBuf};

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ServiceError;

/// Environment variable naming a credentials file.
pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

type Result<T> = std::result::Result<T, ServiceError>;

/// Where to look for credentials.
#[derive(Debug, Clone, Default)]
pub struct CredentialsConfig {
    /// Explicit credentials file; wins over every other source.
    pub path: Option<PathBuf>,
}

impl CredentialsConfig {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Pick the credentials file: explicit path, then `GOOGLE_APPLICATION_CREDENTIALS`,
    /// then the gcloud application-default file.
    pub fn resolve_path(&self) -> Result<PathBuf> {
        let from_env = std::env::var_os(CREDENTIALS_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let well_known = dirs::config_dir()
            .map(|d| d.join("gcloud").join("application_default_credentials.json"));
        self.resolve_from(from_env, well_known)
    }

    fn resolve_from(
        &self,
        from_env: Option<PathBuf>,
        well_known: Option<PathBuf>,
    ) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        if let Some(path) = from_env {
            return Ok(path);
        }
        match well_known {
            Some(path) if path.exists() => Ok(path),
            _ => Err(ServiceError::Credentials(format!(
                "no credentials found; pass --credentials or set {CREDENTIALS_ENV}"
            ))),
        }
    }

    /// Resolve and parse the credentials file.
    pub fn load(&self) -> Result<Credentials> {
        let path = self.resolve_path()?;
        debug!("Loading credentials from {}", path.display());
        Credentials::from_file(&path)
    }
}

/// A parsed credentials file.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Credentials {
    /// Service account key (`gcloud iam service-accounts keys create`).
    ServiceAccount(ServiceAccountKey),
    /// User credentials (`gcloud auth application-default login`).
    AuthorizedUser(AuthorizedUser),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizedUser {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl Credentials {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ServiceError::Credentials(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| ServiceError::Credentials(format!("invalid credentials file: {e}")))
    }

    /// Exchange the credentials for a short-lived OAuth access token.
    pub async fn access_token(&self, http: &reqwest::Client) -> Result<String> {
        let (token_uri, form): (&str, Vec<(&str, String)>) = match self {
            Credentials::ServiceAccount(key) => {
                let assertion = key.assertion(chrono::Utc::now().timestamp())?;
                (
                    key.token_uri.as_str(),
                    vec![
                        ("grant_type", JWT_BEARER_GRANT.to_string()),
                        ("assertion", assertion),
                    ],
                )
            }
            Credentials::AuthorizedUser(user) => (
                user.token_uri.as_str(),
                vec![
                    ("grant_type", "refresh_token".to_string()),
                    ("client_id", user.client_id.clone()),
                    ("client_secret", user.client_secret.clone()),
                    ("refresh_token", user.refresh_token.clone()),
                ],
            ),
        };

        debug!("Requesting access token from {}", token_uri);
        let response = http.post(token_uri).form(&form).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Auth(format!("{status}: {}", body.trim())));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Auth(format!("unexpected token response: {e}")))?;
        Ok(token.access_token)
    }
}

impl ServiceAccountKey {
    /// Signed JWT bearer assertion issued at `now` (unix seconds).
    fn assertion(&self, now: i64) -> Result<String> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();

        let claims = Claims {
            iss: &self.client_email,
            scope: CLOUD_PLATFORM_SCOPE,
            aud: &self.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| ServiceError::Credentials(format!("invalid private key: {e}")))?;
        jsonwebtoken::encode(&header, &claims, &key)
            .map_err(|e| ServiceError::Credentials(format!("cannot sign assertion: {e}")))
    }
}
