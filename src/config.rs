//! Server settings read from the environment.

use std::time::Duration;

/// Settings for the web binary. Every field has a default.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServerConfig {
    /// HOST, default 0.0.0.0 so the app is reachable on a VPS.
    pub host: String,
    /// PORT, default 8080.
    pub port: u16,
    /// INACTIVITY_HOURS: idle tournaments are dropped from memory after this long.
    pub inactivity_timeout: Duration,
    /// CLEANUP_INTERVAL_MINUTES: how often idle tournaments are looked for.
    pub cleanup_interval: Duration,
    /// SESSION_SECRET: cookie signing key material (at least 64 bytes to be used).
    pub session_secret: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            inactivity_timeout: Duration::from_secs(12 * 3600),
            cleanup_interval: Duration::from_secs(30 * 60),
            session_secret: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unparsable values fall back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());
        Self {
            host: lookup("HOST")
                .filter(|h| !h.trim().is_empty())
                .unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(defaults.port),
            inactivity_timeout: parsed("INACTIVITY_HOURS")
                .and_then(|h| h.checked_mul(3600))
                .map(Duration::from_secs)
                .unwrap_or(defaults.inactivity_timeout),
            cleanup_interval: parsed("CLEANUP_INTERVAL_MINUTES")
                .filter(|m| *m > 0)
                .and_then(|m| m.checked_mul(60))
                .map(Duration::from_secs)
                .unwrap_or(defaults.cleanup_interval),
            session_secret: lookup("SESSION_SECRET").filter(|s| !s.is_empty()),
        }
    }
}
