//! Configuration loading from environment.

use std::env;
use std::time::Duration;

use currency_converter::{CurrencyCode, DEFAULT_FETCH_TIMEOUT, DEFAULT_TTL, RoundingPolicy};

/// Where the rate table and the admin-managed currencies live.
#[derive(Debug, Clone, PartialEq)]
pub enum RateBackend {
    /// Local SQL database (`DATABASE_URL`).
    Database { url: String },
    /// Hosted platform REST interface.
    Rest { url: String, api_key: String },
}

/// Application configuration.
#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub backend: RateBackend,
    pub ttl: Duration,
    pub fetch_timeout: Duration,
    pub refresh_interval: Option<Duration>,
    pub rounding: RoundingPolicy,
    pub display_currency: CurrencyCode,
    pub admin_token: Option<String>,
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = var("PORT").unwrap_or_else(|| "3000".to_string()).parse()?;

        let backend = match var("RATE_SOURCE").as_deref().unwrap_or("database") {
            "database" => RateBackend::Database {
                url: var("DATABASE_URL").ok_or_else(|| {
                    anyhow::anyhow!("DATABASE_URL environment variable is required")
                })?,
            },
            "rest" => RateBackend::Rest {
                url: var("RATES_REST_URL").ok_or_else(|| {
                    anyhow::anyhow!("RATES_REST_URL is required when RATE_SOURCE=rest")
                })?,
                api_key: var("RATES_REST_KEY").ok_or_else(|| {
                    anyhow::anyhow!("RATES_REST_KEY is required when RATE_SOURCE=rest")
                })?,
            },
            other => anyhow::bail!("Unknown RATE_SOURCE {:?}, expected database or rest", other),
        };

        let rounding = match var("RATES_MINOR_UNITS") {
            Some(digits) => {
                let digits: u8 = digits.parse()?;
                if digits > RoundingPolicy::MAX_MINOR_UNITS {
                    anyhow::bail!(
                        "RATES_MINOR_UNITS must be at most {}, got {}",
                        RoundingPolicy::MAX_MINOR_UNITS,
                        digits
                    );
                }
                RoundingPolicy::MinorUnits(digits)
            }
            None => RoundingPolicy::default(),
        };

        let display_currency = match var("DISPLAY_CURRENCY") {
            Some(code) => CurrencyCode::new(code)?,
            None => CurrencyCode::default(),
        };

        Ok(Self {
            port,
            backend,
            ttl: secs(&var, "RATES_TTL_SECS")?.unwrap_or(DEFAULT_TTL),
            fetch_timeout: secs(&var, "RATES_FETCH_TIMEOUT_SECS")?.unwrap_or(DEFAULT_FETCH_TIMEOUT),
            refresh_interval: secs(&var, "RATES_REFRESH_INTERVAL_SECS")?
                .filter(|interval| !interval.is_zero()),
            rounding,
            display_currency,
            admin_token: var("ADMIN_TOKEN").filter(|t| !t.is_empty()),
            otlp_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|e| !e.is_empty()),
        })
    }
}

fn secs(var: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<Duration>> {
    var(key)
        .map(|v| {
            v.parse()
                .map(Duration::from_secs)
                .map_err(|e| anyhow::anyhow!("{} must be whole seconds: {}", key, e))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "sqlite::memory:")]).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(
            config.backend,
            RateBackend::Database {
                url: "sqlite::memory:".into()
            }
        );
        assert_eq!(config.ttl, Duration::from_secs(300));
        assert_eq!(config.fetch_timeout, Duration::from_secs(8));
        assert_eq!(config.refresh_interval, None);
        assert_eq!(config.rounding, RoundingPolicy::WholeUnits);
        assert_eq!(config.display_currency.as_str(), "KES");
        assert!(config.admin_token.is_none());
    }

    #[test]
    fn test_database_url_required() {
        assert!(load(&[]).is_err());
    }

    #[test]
    fn test_rest_backend() {
        let config = load(&[
            ("RATE_SOURCE", "rest"),
            ("RATES_REST_URL", "https://project.example.co"),
            ("RATES_REST_KEY", "anon"),
            ("RATES_TTL_SECS", "60"),
            ("RATES_REFRESH_INTERVAL_SECS", "120"),
            ("RATES_MINOR_UNITS", "2"),
            ("DISPLAY_CURRENCY", "usd"),
        ])
        .unwrap();

        assert_eq!(
            config.backend,
            RateBackend::Rest {
                url: "https://project.example.co".into(),
                api_key: "anon".into()
            }
        );
        assert_eq!(config.ttl, Duration::from_secs(60));
        assert_eq!(config.refresh_interval, Some(Duration::from_secs(120)));
        assert_eq!(config.rounding, RoundingPolicy::MinorUnits(2));
        assert_eq!(config.display_currency.as_str(), "USD");
    }

    #[test]
    fn test_rest_backend_requires_key() {
        let result = load(&[
            ("RATE_SOURCE", "rest"),
            ("RATES_REST_URL", "https://project.example.co"),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_source_and_bad_numbers() {
        assert!(load(&[("RATE_SOURCE", "redis")]).is_err());
        assert!(
            load(&[("DATABASE_URL", "sqlite::memory:"), ("RATES_TTL_SECS", "5m")]).is_err()
        );
    }

    #[test]
    fn test_minor_units_bounded() {
        let with_digits = |digits| {
            load(&[
                ("DATABASE_URL", "sqlite::memory:"),
                ("RATES_MINOR_UNITS", digits),
            ])
        };

        assert_eq!(
            with_digits("15").unwrap().rounding,
            RoundingPolicy::MinorUnits(15)
        );
        assert!(with_digits("16").is_err());
        assert!(with_digits("20").is_err());
        assert!(with_digits("-1").is_err());
    }

    #[test]
    fn test_zero_interval_disables_refresher() {
        let config = load(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("RATES_REFRESH_INTERVAL_SECS", "0"),
        ])
        .unwrap();
        assert_eq!(config.refresh_interval, None);
    }
}
