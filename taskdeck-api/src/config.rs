/// Configuration management for the API server
///
/// Configuration comes from environment variables (a `.env` file is loaded
/// first when present).
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `API_HOST` / `API_PORT`: Bind address (default: 0.0.0.0:8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: `*`)
/// - `PRODUCTION`: Enables HSTS and `Secure` cookies (default: false)
/// - `SESSION_SECRET`: Signs OAuth state, at least 32 characters (required)
/// - `SESSION_TTL_DAYS`: Session lifetime (default: 30)
/// - `GOOGLE_CLIENT_ID` / `GOOGLE_CLIENT_SECRET`: OAuth client (required)
/// - `GOOGLE_REDIRECT_URL`: OAuth callback URL
/// - `POST_LOGIN_REDIRECT`: Where the browser lands after sign-in (default: /dashboard)
///
/// # Example
///
/// ```no_run
/// use taskdeck_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;
use std::fmt;

const MIN_SECRET_LENGTH: usize = 32;
const DEFAULT_REDIRECT_URL: &str = "http://localhost:8080/auth/callback/google";

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub google: GoogleConfig,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// `["*"]` allows any origin
    pub cors_origins: Vec<String>,

    /// Enables HSTS and `Secure` cookies
    pub production: bool,

    /// Path the OAuth callback redirects to
    pub post_login_redirect: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Clone)]
pub struct SessionConfig {
    /// HS256 key for the OAuth state token
    ///
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    pub ttl_days: i64,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("ttl_days", &self.ttl_days)
            .finish()
    }
}

#[derive(Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

impl fmt::Debug for GoogleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_url", &self.redirect_url)
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value does not
    /// parse.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| anyhow::anyhow!("{} environment variable is required", key))
        };
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = or_default("API_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT is invalid: {}", e))?;

        let max_connections = or_default("DATABASE_MAX_CONNECTIONS", "10")
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("DATABASE_MAX_CONNECTIONS is invalid: {}", e))?;

        let ttl_days = or_default("SESSION_TTL_DAYS", "30")
            .parse::<i64>()
            .map_err(|e| anyhow::anyhow!("SESSION_TTL_DAYS is invalid: {}", e))?;
        if ttl_days <= 0 {
            anyhow::bail!("SESSION_TTL_DAYS must be positive");
        }

        let secret = required("SESSION_SECRET")?;
        if secret.len() < MIN_SECRET_LENGTH {
            anyhow::bail!("SESSION_SECRET must be at least {} characters long", MIN_SECRET_LENGTH);
        }

        let cors_origins = or_default("CORS_ORIGINS", "*")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let production = matches!(
            or_default("PRODUCTION", "false").to_ascii_lowercase().as_str(),
            "1" | "true" | "yes"
        );

        Ok(Self {
            api: ApiConfig {
                host: or_default("API_HOST", "0.0.0.0"),
                port,
                cors_origins,
                production,
                post_login_redirect: or_default("POST_LOGIN_REDIRECT", "/dashboard"),
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections,
            },
            session: SessionConfig { secret, ttl_days },
            google: GoogleConfig {
                client_id: required("GOOGLE_CLIENT_ID")?,
                client_secret: required("GOOGLE_CLIENT_SECRET")?,
                redirect_url: or_default("GOOGLE_REDIRECT_URL", DEFAULT_REDIRECT_URL),
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether any origin is allowed
    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn minimal() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("DATABASE_URL", "postgresql://localhost/taskdeck_test"),
            ("SESSION_SECRET", "test-secret-key-at-least-32-bytes-long"),
            ("GOOGLE_CLIENT_ID", "client-id"),
            ("GOOGLE_CLIENT_SECRET", "client-secret"),
        ])
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> anyhow::Result<Config> {
        Config::from_lookup(|key| vars.get(key).map(|value| value.to_string()))
    }

    #[test]
    fn test_defaults() {
        let config = load(&minimal()).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.session.ttl_days, 30);
        assert_eq!(config.google.redirect_url, DEFAULT_REDIRECT_URL);
        assert_eq!(config.api.post_login_redirect, "/dashboard");
        assert!(config.allows_any_origin());
        assert!(!config.api.production);
    }

    #[test]
    fn test_overrides() {
        let mut vars = minimal();
        vars.insert("API_HOST", "127.0.0.1");
        vars.insert("API_PORT", "3000");
        vars.insert("CORS_ORIGINS", "https://app.example.com, https://admin.example.com");
        vars.insert("PRODUCTION", "true");
        vars.insert("SESSION_TTL_DAYS", "7");

        let config = load(&vars).unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(
            config.api.cors_origins,
            vec!["https://app.example.com", "https://admin.example.com"]
        );
        assert!(!config.allows_any_origin());
        assert!(config.api.production);
        assert_eq!(config.session.ttl_days, 7);
    }

    #[test]
    fn test_missing_required_values() {
        for key in ["DATABASE_URL", "SESSION_SECRET", "GOOGLE_CLIENT_ID", "GOOGLE_CLIENT_SECRET"] {
            let mut vars = minimal();
            vars.remove(key);

            let err = load(&vars).unwrap_err();
            assert!(err.to_string().contains(key), "expected error naming {}", key);
        }
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut vars = minimal();
        vars.insert("SESSION_SECRET", "too-short");

        let err = load(&vars).unwrap_err();
        assert!(err.to_string().contains("at least 32 characters"));
    }

    #[test]
    fn test_invalid_port_rejected() {
        let mut vars = minimal();
        vars.insert("API_PORT", "eighty");
        assert!(load(&vars).is_err());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = load(&minimal()).unwrap();
        let rendered = format!("{:?}", config);

        assert!(!rendered.contains("test-secret-key"));
        assert!(!rendered.contains("client-secret"));
        assert!(rendered.contains("client-id"));
    }
}
