use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, bail};
use dotenvy::dotenv;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub csv_path: PathBuf,
    pub api_prefix: String,

    // Logging
    pub log_dir: PathBuf,
    pub log_level: tracing::Level,

    // Rate limiting on write routes
    pub rate_write_per_min: u32,

    /// Start from the two-student roster when the file is empty.
    pub seed_default_roster: bool,
    pub cors_permissive: bool,
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let rate_write_per_min = parse_or(&lookup, "RATE_WRITE_PER_MIN", 120u32)?;
        if rate_write_per_min == 0 {
            bail!("RATE_WRITE_PER_MIN must be greater than zero");
        }

        Ok(Self {
            server_addr: lookup("SERVER_ADDR").unwrap_or_else(|| "127.0.0.1:3000".to_string()),
            csv_path: lookup("ATTENDANCE_CSV_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data").join("attendance.csv")),
            api_prefix: lookup("API_PREFIX").unwrap_or_else(|| "/api".to_string()),

            log_dir: lookup("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("logs")),
            log_level: parse_or(&lookup, "LOG_LEVEL", tracing::Level::DEBUG)?,

            rate_write_per_min,

            seed_default_roster: parse_or(&lookup, "SEED_DEFAULT_ROSTER", false)?,
            cors_permissive: parse_or(&lookup, "CORS_PERMISSIVE", true)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(move |key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.server_addr, "127.0.0.1:3000");
        assert_eq!(config.csv_path, PathBuf::from("data/attendance.csv"));
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.log_level, tracing::Level::DEBUG);
        assert_eq!(config.rate_write_per_min, 120);
        assert!(!config.seed_default_roster);
        assert!(config.cors_permissive);
    }

    #[test]
    fn overrides() {
        let config = config_from(&[
            ("SERVER_ADDR", "0.0.0.0:8080"),
            ("ATTENDANCE_CSV_PATH", "/srv/kiosk/attendance.csv"),
            ("LOG_LEVEL", "warn"),
            ("RATE_WRITE_PER_MIN", "10"),
            ("SEED_DEFAULT_ROSTER", "true"),
        ])
        .unwrap();
        assert_eq!(config.server_addr, "0.0.0.0:8080");
        assert_eq!(config.csv_path, PathBuf::from("/srv/kiosk/attendance.csv"));
        assert_eq!(config.log_level, tracing::Level::WARN);
        assert_eq!(config.rate_write_per_min, 10);
        assert!(config.seed_default_roster);
    }

    #[test]
    fn bad_values_name_the_variable() {
        let err = config_from(&[("RATE_WRITE_PER_MIN", "lots")]).unwrap_err();
        assert!(err.to_string().contains("RATE_WRITE_PER_MIN"));

        let err = config_from(&[("RATE_WRITE_PER_MIN", "0")]).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));

        assert!(config_from(&[("CORS_PERMISSIVE", "maybe")]).is_err());
    }
}
