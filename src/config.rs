//! Runtime configuration for the outreach site.

use std::env;
use std::fmt;
use std::net::SocketAddr;

use tracing::warn;

/// Maximum size of an image attached to a QR publish request.
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// Upper bound on visitor session inactivity, one year.
pub const MAX_SESSION_INACTIVITY_HOURS: i64 = 24 * 366;

/// The single built-in staff account.
///
/// This is not a security boundary: anyone holding the durable principal
/// record is treated as logged in. It exists so the gate can be tested
/// against arbitrary credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Verbatim comparison, no normalisation of either field.
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new("anandwan", "admin123")
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Configuration for the outreach site.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub credentials: Credentials,
    pub max_image_bytes: usize,
    /// Visitor sessions expire after this many hours without a request.
    pub session_inactivity_hours: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://anandwan.db?mode=rwc".to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            credentials: Credentials::default(),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            session_inactivity_hours: 24,
        }
    }
}

impl Config {
    /// Load configuration from `ANANDWAN_*` environment variables.
    ///
    /// Unset or unparsable variables fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let database_url = env::var("ANANDWAN_DATABASE_URL").unwrap_or(defaults.database_url);

        let bind_addr = env::var("ANANDWAN_BIND_ADDR")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.bind_addr);

        let username =
            env::var("ANANDWAN_ADMIN_USERNAME").unwrap_or(defaults.credentials.username);
        let password =
            env::var("ANANDWAN_ADMIN_PASSWORD").unwrap_or(defaults.credentials.password);

        let max_image_bytes = env::var("ANANDWAN_MAX_IMAGE_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_image_bytes);

        let session_inactivity_hours = inactivity_hours(
            env::var("ANANDWAN_SESSION_INACTIVITY_HOURS").ok().as_deref(),
            defaults.session_inactivity_hours,
        );

        Self {
            database_url,
            bind_addr,
            credentials: Credentials::new(username, password),
            max_image_bytes,
            session_inactivity_hours,
        }
    }
}

impl Config {
    /// Session inactivity window, kept within `1..=MAX_SESSION_INACTIVITY_HOURS`.
    pub fn session_inactivity(&self) -> time::Duration {
        time::Duration::hours(
            self.session_inactivity_hours
                .clamp(1, MAX_SESSION_INACTIVITY_HOURS),
        )
    }
}

fn inactivity_hours(raw: Option<&str>, default: i64) -> i64 {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse::<i64>() {
        Ok(hours) if (1..=MAX_SESSION_INACTIVITY_HOURS).contains(&hours) => hours,
        _ => {
            warn!(
                value = raw,
                max = MAX_SESSION_INACTIVITY_HOURS,
                "ignoring out of range ANANDWAN_SESSION_INACTIVITY_HOURS"
            );
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_password() {
        let creds = Credentials::new("staff", "hunter2");
        let shown = format!("{:?}", creds);
        assert!(shown.contains("staff"));
        assert!(!shown.contains("hunter2"));
    }

    #[test]
    fn credentials_compare_verbatim() {
        let creds = Credentials::default();
        assert!(creds.matches("anandwan", "admin123"));
        assert!(!creds.matches("Anandwan", "admin123"));
        assert!(!creds.matches("anandwan", "admin123 "));
    }

    #[test]
    fn inactivity_hours_outside_the_window_fall_back() {
        assert_eq!(inactivity_hours(None, 24), 24);
        assert_eq!(inactivity_hours(Some("48"), 24), 48);
        assert_eq!(inactivity_hours(Some("0"), 24), 24);
        assert_eq!(inactivity_hours(Some("-3"), 24), 24);
        assert_eq!(inactivity_hours(Some("9223372036854775807"), 24), 24);
        assert_eq!(inactivity_hours(Some("soon"), 24), 24);
    }

    #[test]
    fn session_inactivity_never_overflows() {
        let config = Config {
            session_inactivity_hours: i64::MAX,
            ..Config::default()
        };
        assert_eq!(
            config.session_inactivity(),
            time::Duration::hours(MAX_SESSION_INACTIVITY_HOURS)
        );
    }
}
