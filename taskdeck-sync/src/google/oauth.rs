//! Google OAuth2 client for sign-in and calendar token refresh.

use async_trait::async_trait;
use reqwest::Url;
use std::fmt;
use tracing::instrument;

use super::types::{GoogleUserInfo, TokenResponse};
use crate::error::OAuthError;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Scopes requested at sign-in; calendar access is read by sync
pub const SIGN_IN_SCOPES: &str = "openid email profile https://www.googleapis.com/auth/calendar";

/// Refreshes expired access tokens
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, OAuthError>;
}

#[derive(Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl fmt::Debug for GoogleOAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleOAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_url", &self.redirect_url)
            .finish()
    }
}

impl GoogleOAuthConfig {
    /// Config against Google's production endpoints
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>, redirect_url: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_url: redirect_url.into(),
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
        }
    }

    /// Sends token and userinfo requests to `base_url` instead
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        self.token_url = format!("{}/token", base_url);
        self.userinfo_url = format!("{}/userinfo", base_url);
        self
    }
}

#[derive(Debug, Clone)]
pub struct GoogleOAuthClient {
    client: reqwest::Client,
    config: GoogleOAuthConfig,
}

impl GoogleOAuthClient {
    pub fn new(config: GoogleOAuthConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &GoogleOAuthConfig {
        &self.config
    }

    /// Consent URL requesting offline access, so Google issues a refresh token
    pub fn authorization_url(&self, state: &str) -> Result<String, OAuthError> {
        let url = Url::parse_with_params(
            &self.config.auth_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_url.as_str()),
                ("response_type", "code"),
                ("scope", SIGN_IN_SCOPES),
                ("state", state),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )
        .map_err(|e| OAuthError::InvalidConfig(e.to_string()))?;

        Ok(url.into())
    }

    /// Exchanges an authorization code for tokens
    #[instrument(skip(self, code), level = "info")]
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, OAuthError> {
        let response = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", self.config.redirect_url.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(OAuthError::Exchange(error_text));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| OAuthError::Exchange(format!("invalid token response: {}", e)))
    }

    /// Fetches the signed-in user's profile
    #[instrument(skip(self, access_token), level = "info")]
    pub async fn user_info(&self, access_token: &str) -> Result<GoogleUserInfo, OAuthError> {
        let response = self
            .client
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(OAuthError::UserInfo(error_text));
        }

        response
            .json::<GoogleUserInfo>()
            .await
            .map_err(|e| OAuthError::UserInfo(format!("invalid userinfo response: {}", e)))
    }
}

#[async_trait]
impl TokenRefresher for GoogleOAuthClient {
    #[instrument(skip(self, refresh_token), level = "info")]
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, OAuthError> {
        let response = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(OAuthError::Refresh(error_text));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| OAuthError::Refresh(format!("invalid token response: {}", e)))
    }
}
