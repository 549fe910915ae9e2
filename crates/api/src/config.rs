use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// Email that is promoted to `admin` when it signs in. Stored lower-cased.
    pub admin_email: Option<String>,
    /// Whether `POST /auth/register` is open (default: `true`).
    pub allow_registration: bool,
    /// Hours a revoked or expired session row is kept before the cleanup
    /// job deletes it (default: `24`).
    pub session_retention_hours: i64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `HOST`                    | `0.0.0.0`               |
    /// | `PORT`                    | `3000`                  |
    /// | `CORS_ORIGINS`            | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                    |
    /// | `ADMIN_EMAIL`             | unset                   |
    /// | `ALLOW_REGISTRATION`      | `true`                  |
    /// | `SESSION_RETENTION_HOURS` | `24`                    |
    ///
    /// # Panics
    ///
    /// Panics on malformed or negative numeric values and when `JWT_SECRET`
    /// is missing.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let admin_email = std::env::var("ADMIN_EMAIL")
            .ok()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty());

        let allow_registration = std::env::var("ALLOW_REGISTRATION")
            .map(|v| parse_flag(&v))
            .unwrap_or(true);

        let session_retention_hours: i64 = std::env::var("SESSION_RETENTION_HOURS")
            .unwrap_or_else(|_| "24".into())
            .parse()
            .expect("SESSION_RETENTION_HOURS must be a valid i64");
        assert!(
            session_retention_hours >= 0,
            "SESSION_RETENTION_HOURS must not be negative"
        );

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            admin_email,
            allow_registration,
            session_retention_hours,
        }
    }

    /// Whether `email` is the configured admin email (case-insensitive).
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_email
            .as_deref()
            .is_some_and(|admin| admin.eq_ignore_ascii_case(email.trim()))
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_admin(admin: Option<&str>) -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            cors_origins: vec![],
            request_timeout_secs: 30,
            jwt: JwtConfig {
                secret: "test".into(),
                access_token_expiry_mins: 15,
                refresh_token_expiry_days: 7,
            },
            admin_email: admin.map(str::to_string),
            allow_registration: true,
            session_retention_hours: 24,
        }
    }

    #[test]
    fn admin_email_matches_case_insensitively() {
        let config = config_with_admin(Some("owner@agency.test"));
        assert!(config.is_admin_email("Owner@Agency.test"));
        assert!(config.is_admin_email(" owner@agency.test "));
        assert!(!config.is_admin_email("someone@agency.test"));
    }

    #[test]
    fn no_admin_email_matches_nothing() {
        let config = config_with_admin(None);
        assert!(!config.is_admin_email("owner@agency.test"));
    }

    #[test]
    fn registration_flag_parsing() {
        assert!(parse_flag("true"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(" OFF "));
        assert!(!parse_flag("0"));
    }
}
