//! Exporter settings
//!
//! Settings come from the `[DEFAULT]` section of `config.ini`; any key not
//! found there is read from the environment. Keys in the file are matched
//! case-insensitively.

use std::collections::HashMap;
use std::fmt;
use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use ini::Ini;
use tracing::info;

use crate::cache::DEFAULT_MIN_INTERVAL;
use crate::error::ConfigError;

/// Config file read from the working directory
pub const CONFIG_FILE: &str = "config.ini";

/// Section holding the settings
pub const SECTION: &str = "DEFAULT";

pub const ROUTER_ADDRESS: &str = "ROUTER_ADDRESS";
pub const ROUTER_USER: &str = "ROUTER_USER";
pub const ROUTER_PASS: &str = "ROUTER_PASS";
pub const PROM_PORT: &str = "PROM_PORT";
pub const PROM_ADDRESS: &str = "PROM_ADDRESS";
pub const FETCH_INTERVAL: &str = "FETCH_INTERVAL";
pub const ROUTER_TIMEOUT: &str = "ROUTER_TIMEOUT";

/// Settings that must be present in the file or the environment
pub const REQUIRED: &[&str] = &[ROUTER_ADDRESS, ROUTER_USER, ROUTER_PASS, PROM_PORT];

/// Per-request timeout. A refresh holds the cache lock, so a dead router must
/// fail well inside a 10s scrape timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Resolved exporter settings
#[derive(Clone, PartialEq)]
pub struct Settings {
    /// Router host or host:port, without scheme
    pub router_address: String,
    pub username: String,
    pub password: String,
    /// Port serving `/metrics`
    pub port: u16,
    /// Address serving `/metrics` (default `::`)
    pub listen_address: IpAddr,
    /// Minimum time between device fetches
    pub fetch_interval: Duration,
    /// Per-request timeout towards the router
    pub request_timeout: Duration,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("router_address", &self.router_address)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("port", &self.port)
            .field("listen_address", &self.listen_address)
            .field("fetch_interval", &self.fetch_interval)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Settings {
    /// Load from [`CONFIG_FILE`] with the process environment as fallback.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(CONFIG_FILE), |key| std::env::var(key).ok())
    }

    /// Load from `path`, falling back to `env` for keys the file lacks.
    ///
    /// A missing file is treated as empty.
    pub fn load_from<F>(path: &Path, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = read_section(path)?;
        Self::resolve(&file, env)
    }

    /// Resolve settings from already-read file values (lowercase keys).
    pub fn resolve<F>(file: &HashMap<String, String>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &'static str| -> Option<String> {
            if let Some(value) = file.get(&key.to_ascii_lowercase()) {
                return Some(value.clone());
            }
            let value = env(key)?;
            info!("Using {} from environment because it wasn't found in config file", key);
            Some(value)
        };
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing { key });

        let router_address = required(ROUTER_ADDRESS)?;
        let username = required(ROUTER_USER)?;
        let password = required(ROUTER_PASS)?;
        let port = parse(PROM_PORT, &required(PROM_PORT)?)?;

        let listen_address = match lookup(PROM_ADDRESS) {
            Some(value) => parse(PROM_ADDRESS, &value)?,
            None => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        };
        let fetch_interval = match lookup(FETCH_INTERVAL) {
            Some(value) => seconds(FETCH_INTERVAL, &value)?,
            None => DEFAULT_MIN_INTERVAL,
        };
        let request_timeout = match lookup(ROUTER_TIMEOUT) {
            Some(value) => seconds(ROUTER_TIMEOUT, &value)?,
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            router_address,
            username,
            password,
            port,
            listen_address,
            fetch_interval,
            request_timeout,
        })
    }

    /// Base URL of the router web API
    pub fn router_url(&self) -> String {
        format!("http://{}/", self.router_address.trim_end_matches('/'))
    }

    /// Socket address for the metrics server
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen_address, self.port)
    }
}

/// Read the `[DEFAULT]` section (and any keys before the first section).
fn read_section(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let mut values = HashMap::new();
    if !path.exists() {
        return Ok(values);
    }

    let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Unreadable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let general = ini.general_section().iter();
    let section = ini.section(Some(SECTION)).into_iter().flat_map(|p| p.iter());
    for (key, value) in general.chain(section) {
        values.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
    }

    Ok(values)
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn seconds(key: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let secs: f64 = parse(key, value)?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "expected a non-negative number of seconds".to_string(),
        });
    }
    Ok(Duration::from_secs_f64(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn file(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
            .collect()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_resolve_from_file() {
        let values = file(&[
            (ROUTER_ADDRESS, "192.168.8.1"),
            (ROUTER_USER, "admin"),
            (ROUTER_PASS, "secret"),
            (PROM_PORT, "9107"),
        ]);
        let settings = Settings::resolve(&values, no_env).unwrap();
        assert_eq!(settings.router_url(), "http://192.168.8.1/");
        assert_eq!(settings.port, 9107);
        assert_eq!(settings.fetch_interval, Duration::from_secs(4));
        assert_eq!(settings.request_timeout, DEFAULT_TIMEOUT);
        assert_eq!(settings.listen_addr().to_string(), "[::]:9107");
    }

    #[test]
    fn test_env_fallback() {
        let values = file(&[(ROUTER_ADDRESS, "192.168.8.1"), (ROUTER_USER, "admin")]);
        let env = |key: &str| match key {
            "ROUTER_PASS" => Some("from-env".to_string()),
            "PROM_PORT" => Some("9200".to_string()),
            "ROUTER_USER" => Some("ignored".to_string()),
            _ => None,
        };
        let settings = Settings::resolve(&values, env).unwrap();
        assert_eq!(settings.username, "admin");
        assert_eq!(settings.password, "from-env");
        assert_eq!(settings.port, 9200);
    }

    #[test]
    fn test_missing_required() {
        let values = file(&[(ROUTER_ADDRESS, "192.168.8.1"), (ROUTER_USER, "admin")]);
        let err = Settings::resolve(&values, no_env).unwrap_err();
        assert_eq!(err, ConfigError::Missing { key: ROUTER_PASS });
    }

    #[test]
    fn test_invalid_port() {
        let values = file(&[
            (ROUTER_ADDRESS, "r"),
            (ROUTER_USER, "u"),
            (ROUTER_PASS, "p"),
            (PROM_PORT, "http"),
        ]);
        let err = Settings::resolve(&values, no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: PROM_PORT, .. }));
    }

    #[test]
    fn test_optional_settings() {
        let values = file(&[
            (ROUTER_ADDRESS, "r"),
            (ROUTER_USER, "u"),
            (ROUTER_PASS, "p"),
            (PROM_PORT, "9107"),
            (PROM_ADDRESS, "127.0.0.1"),
            (FETCH_INTERVAL, "2.5"),
            (ROUTER_TIMEOUT, "5"),
        ]);
        let settings = Settings::resolve(&values, no_env).unwrap();
        assert_eq!(settings.listen_addr().to_string(), "127.0.0.1:9107");
        assert_eq!(settings.fetch_interval, Duration::from_millis(2500));
        assert_eq!(settings.request_timeout, Duration::from_secs(5));

        let mut bad = values.clone();
        bad.insert("fetch_interval".to_string(), "-1".to_string());
        assert!(Settings::resolve(&bad, no_env).is_err());
    }

    #[test]
    fn test_load_from_ini_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "[DEFAULT]").unwrap();
        writeln!(tmp, "router_address = 192.168.8.1").unwrap();
        writeln!(tmp, "ROUTER_USER = admin").unwrap();
        writeln!(tmp, "ROUTER_PASS = secret").unwrap();
        writeln!(tmp, "PROM_PORT = 9107").unwrap();
        tmp.flush().unwrap();

        let settings = Settings::load_from(tmp.path(), no_env).unwrap();
        assert_eq!(settings.router_address, "192.168.8.1");
        assert_eq!(settings.password, "secret");
    }

    #[test]
    fn test_missing_file_uses_env() {
        let dir = tempfile::tempdir().unwrap();
        let env = |key: &str| Some(format!("{}-value", key)).filter(|_| key != PROM_PORT);
        let err = Settings::load_from(&dir.path().join("config.ini"), env).unwrap_err();
        assert_eq!(err, ConfigError::Missing { key: PROM_PORT });
    }

    #[test]
    fn test_debug_redacts_password() {
        let values = file(&[
            (ROUTER_ADDRESS, "r"),
            (ROUTER_USER, "u"),
            (ROUTER_PASS, "hunter2"),
            (PROM_PORT, "9107"),
        ]);
        let settings = Settings::resolve(&values, no_env).unwrap();
        assert!(!format!("{:?}", settings).contains("hunter2"));
    }
}
