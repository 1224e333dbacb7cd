//! Application configuration

use std::env;

use axum_extra::extract::cookie::SameSite;
use time::Duration;

const DEFAULT_ACCESS_TOKEN_EXPIRY: &str = "1d";
const DEFAULT_REFRESH_TOKEN_EXPIRY: &str = "7d";
const MIN_SECRET_LEN: usize = 32;

/// Origins of the admin/public SPA deployments
const DEFAULT_ALLOWED_ORIGINS: &str =
    "http://localhost:5174,http://localhost:5173,https://eyantra.vercel.app";

/// Where issued tokens are delivered to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenDelivery {
    /// `Set-Cookie` headers and the JSON body
    Both,
    /// `Set-Cookie` headers only
    Cookie,
    /// JSON body only
    Body,
}

impl TokenDelivery {
    pub fn uses_cookies(self) -> bool {
        matches!(self, TokenDelivery::Both | TokenDelivery::Cookie)
    }

    pub fn uses_body(self) -> bool {
        matches!(self, TokenDelivery::Both | TokenDelivery::Body)
    }
}

impl std::str::FromStr for TokenDelivery {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "both" | "" => Ok(TokenDelivery::Both),
            "cookie" | "cookies" => Ok(TokenDelivery::Cookie),
            "body" | "json" => Ok(TokenDelivery::Body),
            _ => Err(ConfigError::Invalid(
                "TOKEN_DELIVERY",
                format!("unknown policy '{}', expected both, cookie or body", s),
            )),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub bind_address: String,
    pub allowed_origins: Vec<String>,
    pub max_request_body_bytes: usize,

    // Database (in-memory store when unset)
    pub database_url: Option<String>,
    pub database_max_connections: u32,

    // Tokens
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    pub access_token_expiry: Duration,
    pub refresh_token_expiry: Duration,

    // Session transport
    pub token_delivery: TokenDelivery,
    pub cookie_secure: bool,
    pub cookie_same_site: SameSite,

    // Registration gate
    pub enable_registration: bool,
    pub admin_email_allowlist: Vec<String>,
}

impl Config {
    /// Configuration with every optional setting at its default.
    pub fn with_secrets(
        access_token_secret: impl Into<String>,
        refresh_token_secret: impl Into<String>,
    ) -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            allowed_origins: split_list(DEFAULT_ALLOWED_ORIGINS),
            max_request_body_bytes: 16 * 1024,
            database_url: None,
            database_max_connections: 5,
            access_token_secret: access_token_secret.into(),
            refresh_token_secret: refresh_token_secret.into(),
            access_token_expiry: Duration::days(1),
            refresh_token_expiry: Duration::days(7),
            token_delivery: TokenDelivery::Both,
            cookie_secure: true,
            cookie_same_site: SameSite::None,
            enable_registration: true,
            admin_email_allowlist: Vec::new(),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let access_token_secret = required_secret("ACCESS_TOKEN_SECRET")?;
        let refresh_token_secret = required_secret("REFRESH_TOKEN_SECRET")?;
        if access_token_secret == refresh_token_secret {
            return Err(ConfigError::WeakSecret(
                "ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must differ",
            ));
        }

        let mut config = Self::with_secrets(access_token_secret, refresh_token_secret);

        if let Ok(addr) = env::var("BIND_ADDRESS") {
            config.bind_address = addr;
        }
        if let Ok(origins) = env::var("ALLOWED_ORIGINS") {
            config.allowed_origins = split_list(&origins);
        }
        config.max_request_body_bytes = env::var("MAX_REQUEST_BODY_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(config.max_request_body_bytes);

        config.database_url = env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty());
        config.database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(config.database_max_connections);

        config.access_token_expiry = parse_expiry(
            "ACCESS_TOKEN_EXPIRY",
            &env::var("ACCESS_TOKEN_EXPIRY")
                .unwrap_or_else(|_| DEFAULT_ACCESS_TOKEN_EXPIRY.to_string()),
        )?;
        config.refresh_token_expiry = parse_expiry(
            "REFRESH_TOKEN_EXPIRY",
            &env::var("REFRESH_TOKEN_EXPIRY")
                .unwrap_or_else(|_| DEFAULT_REFRESH_TOKEN_EXPIRY.to_string()),
        )?;

        if let Ok(policy) = env::var("TOKEN_DELIVERY") {
            config.token_delivery = policy.parse()?;
        }
        config.cookie_secure = env::var("COOKIE_SECURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(true);
        if let Ok(same_site) = env::var("COOKIE_SAME_SITE") {
            config.cookie_same_site = parse_same_site(&same_site)?;
        }
        if config.cookie_same_site == SameSite::None && !config.cookie_secure {
            // Browsers drop SameSite=None cookies that are not Secure
            return Err(ConfigError::Invalid(
                "COOKIE_SAME_SITE",
                "SameSite=None requires COOKIE_SECURE=true".to_string(),
            ));
        }

        config.enable_registration = env::var("ENABLE_REGISTRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(true);
        config.admin_email_allowlist = env::var("ADMIN_EMAIL_ALLOWLIST")
            .map(|v| {
                split_list(&v)
                    .iter()
                    .map(|e| eyantra_shared::normalize_email(e))
                    .collect()
            })
            .unwrap_or_default();

        Ok(config)
    }

    /// Whether `email` (already normalized) may self-register
    pub fn registration_allowed(&self, email: &str) -> bool {
        self.enable_registration
            && (self.admin_email_allowlist.is_empty()
                || self.admin_email_allowlist.iter().any(|e| e == email))
    }
}

fn required_secret(name: &'static str) -> Result<String, ConfigError> {
    let secret = env::var(name).map_err(|_| ConfigError::Missing(name))?;
    if secret.len() < MIN_SECRET_LEN {
        return Err(ConfigError::WeakSecret(match name {
            "ACCESS_TOKEN_SECRET" => "ACCESS_TOKEN_SECRET must be at least 32 characters",
            _ => "REFRESH_TOKEN_SECRET must be at least 32 characters",
        }));
    }
    Ok(secret)
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_same_site(value: &str) -> Result<SameSite, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "none" => Ok(SameSite::None),
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        other => Err(ConfigError::Invalid(
            "COOKIE_SAME_SITE",
            format!("unknown value '{}', expected none, lax or strict", other),
        )),
    }
}

/// Longest accepted token lifetime; token expiry timestamps stay well in range
pub const MAX_TOKEN_LIFETIME: Duration = Duration::days(5 * 365);

/// Parse a token lifetime such as `"15m"`, `"1d"`, `"7d"` or `"3600"` (seconds).
pub fn parse_expiry(name: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let value = value.trim();
    let invalid = || {
        ConfigError::Invalid(
            name,
            format!("'{}' is not a duration like 15m, 12h, 1d or 3600", value),
        )
    };

    let (digits, unit) = match value.find(|c: char| !c.is_ascii_digit()) {
        Some(idx) => value.split_at(idx),
        None => (value, "s"),
    };
    let amount: i64 = digits.parse().map_err(|_| invalid())?;
    if amount <= 0 {
        return Err(invalid());
    }

    let unit_seconds: i64 = match unit.trim() {
        "s" => 1,
        "m" => 60,
        "h" => 3_600,
        "d" => 86_400,
        "w" => 604_800,
        _ => return Err(invalid()),
    };
    let seconds = amount
        .checked_mul(unit_seconds)
        .filter(|s| *s <= MAX_TOKEN_LIFETIME.whole_seconds())
        .ok_or_else(|| {
            ConfigError::Invalid(
                name,
                format!("'{}' exceeds the maximum token lifetime of 5 years", value),
            )
        })?;
    Ok(Duration::seconds(seconds))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Weak secret: {0}")]
    WeakSecret(&'static str),
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ACCESS: &str = "test-access-secret-must-be-at-least-32-chars";
    const REFRESH: &str = "test-refresh-secret-must-be-at-least-32-chars";

    const MANAGED_VARS: &[&str] = &[
        "ACCESS_TOKEN_SECRET",
        "REFRESH_TOKEN_SECRET",
        "ACCESS_TOKEN_EXPIRY",
        "REFRESH_TOKEN_EXPIRY",
        "TOKEN_DELIVERY",
        "COOKIE_SECURE",
        "COOKIE_SAME_SITE",
        "ENABLE_REGISTRATION",
        "ADMIN_EMAIL_ALLOWLIST",
        "DATABASE_URL",
    ];

    fn reset_env() {
        for var in MANAGED_VARS {
            env::remove_var(var);
        }
    }

    fn setup_minimal_config() {
        reset_env();
        env::set_var("ACCESS_TOKEN_SECRET", ACCESS);
        env::set_var("REFRESH_TOKEN_SECRET", REFRESH);
    }

    #[test]
    fn test_parse_expiry_units() {
        assert_eq!(parse_expiry("X", "1d").unwrap(), Duration::days(1));
        assert_eq!(parse_expiry("X", "7d").unwrap(), Duration::days(7));
        assert_eq!(parse_expiry("X", "15m").unwrap(), Duration::minutes(15));
        assert_eq!(parse_expiry("X", "12h").unwrap(), Duration::hours(12));
        assert_eq!(parse_expiry("X", "2w").unwrap(), Duration::weeks(2));
        assert_eq!(parse_expiry("X", "3600").unwrap(), Duration::seconds(3600));
    }

    #[test]
    fn test_parse_expiry_rejects_garbage() {
        assert!(parse_expiry("X", "").is_err());
        assert!(parse_expiry("X", "d").is_err());
        assert!(parse_expiry("X", "0d").is_err());
        assert!(parse_expiry("X", "10y").is_err());
        assert!(parse_expiry("X", "-5m").is_err());
    }

    #[test]
    fn test_parse_expiry_rejects_oversized_lifetimes() {
        for value in ["99999999999999999w", "9999999999d", "9223372036854775807h", "261w"] {
            let err = parse_expiry("REFRESH_TOKEN_EXPIRY", value).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid("REFRESH_TOKEN_EXPIRY", _)),
                "{} -> {:?}",
                value,
                err
            );
        }
        assert_eq!(parse_expiry("X", "1825d").unwrap(), MAX_TOKEN_LIFETIME);
    }

    #[test]
    fn test_token_delivery_parse() {
        assert_eq!("both".parse::<TokenDelivery>().unwrap(), TokenDelivery::Both);
        assert_eq!("Cookie".parse::<TokenDelivery>().unwrap(), TokenDelivery::Cookie);
        assert_eq!("body".parse::<TokenDelivery>().unwrap(), TokenDelivery::Body);
        assert!("header".parse::<TokenDelivery>().is_err());
        assert!(TokenDelivery::Both.uses_cookies() && TokenDelivery::Both.uses_body());
        assert!(!TokenDelivery::Body.uses_cookies());
        assert!(!TokenDelivery::Cookie.uses_body());
    }

    #[test]
    #[serial]
    fn test_defaults_from_env() {
        setup_minimal_config();

        let config = Config::from_env().unwrap();
        assert_eq!(config.access_token_expiry, Duration::days(1));
        assert_eq!(config.refresh_token_expiry, Duration::days(7));
        assert_eq!(config.token_delivery, TokenDelivery::Both);
        assert!(config.cookie_secure);
        assert_eq!(config.cookie_same_site, SameSite::None);
        assert!(config.database_url.is_none());
        assert!(config.registration_allowed("anyone@example.com"));

        reset_env();
    }

    #[test]
    #[serial]
    fn test_missing_and_weak_secrets() {
        reset_env();
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Missing("ACCESS_TOKEN_SECRET"))
        ));

        env::set_var("ACCESS_TOKEN_SECRET", ACCESS);
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Missing("REFRESH_TOKEN_SECRET"))
        ));

        env::set_var("REFRESH_TOKEN_SECRET", "short");
        assert!(matches!(Config::from_env(), Err(ConfigError::WeakSecret(_))));

        env::set_var("REFRESH_TOKEN_SECRET", ACCESS);
        assert!(
            matches!(Config::from_env(), Err(ConfigError::WeakSecret(_))),
            "identical secrets must be rejected"
        );

        reset_env();
    }

    #[test]
    #[serial]
    fn test_overrides_from_env() {
        setup_minimal_config();
        env::set_var("ACCESS_TOKEN_EXPIRY", "15m");
        env::set_var("REFRESH_TOKEN_EXPIRY", "30d");
        env::set_var("TOKEN_DELIVERY", "cookie");
        env::set_var("COOKIE_SAME_SITE", "strict");
        env::set_var("ADMIN_EMAIL_ALLOWLIST", " Lead@Lab.edu , mentor@lab.edu");

        let config = Config::from_env().unwrap();
        assert_eq!(config.access_token_expiry, Duration::minutes(15));
        assert_eq!(config.refresh_token_expiry, Duration::days(30));
        assert_eq!(config.token_delivery, TokenDelivery::Cookie);
        assert_eq!(config.cookie_same_site, SameSite::Strict);
        assert!(config.registration_allowed("lead@lab.edu"));
        assert!(!config.registration_allowed("someone@else.edu"));

        env::set_var("ENABLE_REGISTRATION", "false");
        let config = Config::from_env().unwrap();
        assert!(!config.registration_allowed("lead@lab.edu"));

        reset_env();
    }

    #[test]
    #[serial]
    fn test_same_site_none_requires_secure() {
        setup_minimal_config();
        env::set_var("COOKIE_SECURE", "false");

        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid("COOKIE_SAME_SITE", _))
        ));

        env::set_var("COOKIE_SAME_SITE", "lax");
        let config = Config::from_env().unwrap();
        assert!(!config.cookie_secure);

        reset_env();
    }

    #[test]
    #[serial]
    fn test_invalid_expiry_is_reported() {
        setup_minimal_config();
        env::set_var("ACCESS_TOKEN_EXPIRY", "forever");

        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid("ACCESS_TOKEN_EXPIRY", _))
        ));

        reset_env();
    }
}
