use std::fmt::Display;
use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

/// HTTP front-end configuration.
///
/// Every field has a default that works for local development. Invalid
/// values abort start-up with a message naming the variable.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed to call the API from a browser.
    pub cors_origins: Vec<String>,
    pub request_timeout: Duration,
    /// Upper bound on each post-shutdown drain step.
    pub shutdown_timeout: Duration,
    /// How often idle observers are pinged.
    pub heartbeat_interval: Duration,
    /// SQLite connection string.
    pub database_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            cors_origins: vec!["http://localhost:5173".into()],
            request_timeout: Duration::from_secs(30),
            shutdown_timeout: Duration::from_secs(30),
            heartbeat_interval: Duration::from_secs(30),
            database_url: "sqlite:./jobs.db".into(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `HOST`                    | `0.0.0.0`               |
    /// | `PORT`                    | `3000`                  |
    /// | `CORS_ORIGINS`            | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`   | `30`                    |
    /// | `HEARTBEAT_INTERVAL_SECS` | `30`                    |
    /// | `DATABASE_URL`            | `sqlite:./jobs.db`      |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Unset keys
    /// fall back to [`ServerConfig::default`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let cors_origins = match var("CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.cors_origins,
        };

        Self {
            host: var("HOST").unwrap_or(defaults.host),
            port: parse_or("PORT", var("PORT"), defaults.port),
            cors_origins,
            request_timeout: secs_or(
                "REQUEST_TIMEOUT_SECS",
                var("REQUEST_TIMEOUT_SECS"),
                defaults.request_timeout,
            ),
            shutdown_timeout: secs_or(
                "SHUTDOWN_TIMEOUT_SECS",
                var("SHUTDOWN_TIMEOUT_SECS"),
                defaults.shutdown_timeout,
            ),
            heartbeat_interval: secs_or(
                "HEARTBEAT_INTERVAL_SECS",
                var("HEARTBEAT_INTERVAL_SECS"),
                defaults.heartbeat_interval,
            ),
            database_url: var("DATABASE_URL").unwrap_or(defaults.database_url),
        }
    }

    /// Socket address the listener binds to.
    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        let ip: IpAddr = self.host.parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} is invalid ({raw:?}): {e}")),
        None => default,
    }
}

/// Whole seconds, strictly positive. A zero period would panic the
/// heartbeat ticker and make every request time out.
fn secs_or(key: &str, raw: Option<String>, default: Duration) -> Duration {
    let secs: u64 = parse_or(key, raw, default.as_secs());
    assert!(secs > 0, "{key} must be greater than zero");
    Duration::from_secs(secs)
}
