use std::time::Duration;

/// Scheduler configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Pause between polling cycles (default: 1 second).
    pub poll_interval: Duration,
    /// Reserved for automatic retries; failed jobs are currently final.
    pub max_retries: u32,
    /// Upper bound on a single send. `None` lets the sender run to completion.
    pub delivery_timeout: Option<Duration>,
    /// How long the simulated sender takes per message (default: 2 seconds).
    pub simulated_delivery: Duration,
    /// Fail jobs left in `processing` by a previous run (default: `true`).
    pub recover_on_start: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_retries: 3,
            delivery_timeout: None,
            simulated_delivery: Duration::from_secs(2),
            recover_on_start: true,
        }
    }
}

impl SchedulerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default |
    /// |-------------------------|---------|
    /// | `POLL_INTERVAL_MS`      | `1000`  |
    /// | `MAX_RETRIES`           | `3`     |
    /// | `DELIVERY_TIMEOUT_SECS` | unset   |
    /// | `SIMULATED_DELIVERY_MS` | `2000`  |
    /// | `RECOVER_ON_START`      | `true`  |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let poll_interval = std::env::var("POLL_INTERVAL_MS")
            .ok()
            .map(|v| parse_poll_interval(&v))
            .unwrap_or(defaults.poll_interval);

        let max_retries: u32 = std::env::var("MAX_RETRIES")
            .ok()
            .map(|v| v.parse().expect("MAX_RETRIES must be a valid u32"))
            .unwrap_or(defaults.max_retries);

        let delivery_timeout = std::env::var("DELIVERY_TIMEOUT_SECS")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| {
                Duration::from_secs(
                    v.parse()
                        .expect("DELIVERY_TIMEOUT_SECS must be a valid u64"),
                )
            });

        let simulated_delivery = std::env::var("SIMULATED_DELIVERY_MS")
            .ok()
            .map(|v| {
                Duration::from_millis(
                    v.parse()
                        .expect("SIMULATED_DELIVERY_MS must be a valid u64"),
                )
            })
            .unwrap_or(defaults.simulated_delivery);

        let recover_on_start = std::env::var("RECOVER_ON_START")
            .ok()
            .map(|v| parse_bool(&v).expect("RECOVER_ON_START must be true or false"))
            .unwrap_or(defaults.recover_on_start);

        Self {
            poll_interval,
            max_retries,
            delivery_timeout,
            simulated_delivery,
            recover_on_start,
        }
    }
}

/// A zero period would panic the ticker inside the spawned loop, so it is
/// refused here at startup instead.
fn parse_poll_interval(raw: &str) -> Duration {
    let ms: u64 = raw
        .trim()
        .parse()
        .expect("POLL_INTERVAL_MS must be a valid u64");
    assert!(ms > 0, "POLL_INTERVAL_MS must be greater than zero");
    Duration::from_millis(ms)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = SchedulerConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.max_retries, 3);
        assert!(config.delivery_timeout.is_none());
        assert!(config.recover_on_start);
    }

    #[test]
    fn poll_interval_is_read_in_milliseconds() {
        assert_eq!(parse_poll_interval(" 250 "), Duration::from_millis(250));
    }

    #[test]
    #[should_panic(expected = "POLL_INTERVAL_MS must be greater than zero")]
    fn zero_poll_interval_is_rejected() {
        parse_poll_interval("0");
    }

    #[test]
    #[should_panic(expected = "POLL_INTERVAL_MS must be a valid u64")]
    fn non_numeric_poll_interval_is_rejected() {
        parse_poll_interval("fast");
    }

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" off "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
