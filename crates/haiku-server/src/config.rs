//! Server configuration from environment variables.

use std::cell::RefCell;
use std::env;
use std::time::Duration;

use haiku_store::ReadScope;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default read and write deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind; empty means all interfaces.
    pub host: String,
    /// Server port to listen on.
    pub port: u16,
    /// Deadline for receiving a request body.
    pub read_timeout: Duration,
    /// Deadline for producing a response.
    pub write_timeout: Duration,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text.
    pub json_logs: bool,
    /// Whether single-note reads are restricted to the owner.
    pub owner_scoped_reads: bool,
    /// Variables that were unset and fell back to their default.
    pub defaulted: Vec<&'static str>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            read_timeout: DEFAULT_TIMEOUT,
            write_timeout: DEFAULT_TIMEOUT,
            log_level: "info".to_string(),
            json_logs: false,
            owner_scoped_reads: true,
            defaulted: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `API_HOST`: Interface to bind (default: all interfaces)
    /// - `API_PORT`: Server port (default: 8080)
    /// - `API_READ_TIMEOUT`: Body read deadline (default: 30s)
    /// - `API_WRITE_TIMEOUT`: Response deadline (default: 30s)
    /// - `LOG_LEVEL`: Logging level (default: "info")
    /// - `LOG_FORMAT`: "json" or "text" (default: "text")
    /// - `NOTES_OWNER_SCOPED_READS`: Restrict note reads to the owner (default: true)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaulted = RefCell::new(Vec::new());
        let get = |key: &'static str| {
            let value = lookup(key).filter(|v| !v.trim().is_empty());
            if value.is_none() {
                defaulted.borrow_mut().push(key);
            }
            value
        };
        let defaults = Self::default();

        let host = get("API_HOST").unwrap_or(defaults.host);

        let port = match get("API_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: "API_PORT".to_string(),
                reason: format!("not a port number: {}", raw),
            })?,
            None => defaults.port,
        };

        let read_timeout = match get("API_READ_TIMEOUT") {
            Some(raw) => parse_duration("API_READ_TIMEOUT", &raw)?,
            None => defaults.read_timeout,
        };

        let write_timeout = match get("API_WRITE_TIMEOUT") {
            Some(raw) => parse_duration("API_WRITE_TIMEOUT", &raw)?,
            None => defaults.write_timeout,
        };

        let log_level = get("LOG_LEVEL").unwrap_or(defaults.log_level);

        let json_logs = match get("LOG_FORMAT") {
            Some(raw) => match raw.trim().to_lowercase().as_str() {
                "json" => true,
                "text" => false,
                other => {
                    return Err(ConfigError::InvalidValue {
                        name: "LOG_FORMAT".to_string(),
                        reason: format!("expected json or text, got {}", other),
                    });
                }
            },
            None => defaults.json_logs,
        };

        let owner_scoped_reads = match get("NOTES_OWNER_SCOPED_READS") {
            Some(raw) => parse_bool("NOTES_OWNER_SCOPED_READS", &raw)?,
            None => defaults.owner_scoped_reads,
        };

        Ok(Self {
            host,
            port,
            read_timeout,
            write_timeout,
            log_level,
            json_logs,
            owner_scoped_reads,
            defaulted: defaulted.into_inner(),
        })
    }

    /// Report the variables that fell back to defaults.
    ///
    /// Loading happens before the subscriber exists, so call this once
    /// tracing is initialized.
    pub fn log_defaults(&self) {
        for &key in &self.defaulted {
            match key {
                "API_HOST" => tracing::info!("undefined api host, binding all interfaces"),
                "API_PORT" => tracing::info!("undefined api port, defaulting to {}", self.port),
                _ => tracing::debug!(variable = key, "undefined, using default"),
            }
        }
    }

    /// Address to bind the listener to.
    pub fn bind_addr(&self) -> (&str, u16) {
        let host = if self.host.is_empty() {
            "0.0.0.0"
        } else {
            self.host.as_str()
        };
        (host, self.port)
    }

    /// Visibility of single-note reads.
    pub fn read_scope(&self) -> ReadScope {
        if self.owner_scoped_reads {
            ReadScope::Owner
        } else {
            ReadScope::Any
        }
    }
}

/// Parse a duration given as seconds, or with an `ms`, `s` or `m` suffix.
fn parse_duration(name: &str, raw: &str) -> Result<Duration, ConfigError> {
    let raw = raw.trim();
    let invalid = || ConfigError::InvalidValue {
        name: name.to_string(),
        reason: format!("not a duration: {}", raw),
    };

    let (number, unit) = match raw.find(|c: char| !c.is_ascii_digit()) {
        Some(idx) => raw.split_at(idx),
        None => (raw, "s"),
    };
    let value: u64 = number.parse().map_err(|_| invalid())?;

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => Ok(Duration::from_secs(value * 60)),
        _ => Err(invalid()),
    }
}

fn parse_bool(name: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            reason: format!("not a boolean: {}", other),
        }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid environment variable value.
    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_vars(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        ServerConfig::from_lookup(|key| map.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_default_values() {
        let config = from_vars(&[]).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.read_timeout, Duration::from_secs(30));
        assert_eq!(config.write_timeout, Duration::from_secs(30));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.bind_addr(), ("0.0.0.0", 8080));
        assert_eq!(config.read_scope(), ReadScope::Owner);
    }

    #[test]
    fn test_overrides() {
        let config = from_vars(&[
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "9000"),
            ("API_READ_TIMEOUT", "5s"),
            ("API_WRITE_TIMEOUT", "1500ms"),
            ("NOTES_OWNER_SCOPED_READS", "false"),
            ("LOG_FORMAT", "JSON"),
        ])
        .unwrap();

        assert!(config.json_logs);

        assert_eq!(config.bind_addr(), ("127.0.0.1", 9000));
        assert_eq!(config.read_timeout, Duration::from_secs(5));
        assert_eq!(config.write_timeout, Duration::from_millis(1500));
        assert_eq!(config.read_scope(), ReadScope::Any);
    }

    #[test]
    fn test_unset_variables_are_recorded() {
        let config = from_vars(&[]).unwrap();
        assert!(config.defaulted.contains(&"API_HOST"));
        assert!(config.defaulted.contains(&"API_PORT"));

        let config = from_vars(&[("API_HOST", "127.0.0.1"), ("API_PORT", " ")]).unwrap();
        assert!(!config.defaulted.contains(&"API_HOST"));
        assert!(config.defaulted.contains(&"API_PORT"));
    }

    #[test]
    fn test_invalid_port() {
        let err = from_vars(&[("API_PORT", "http")]).unwrap_err();
        assert!(err.to_string().contains("API_PORT"));
    }

    #[test]
    fn test_invalid_log_format() {
        assert!(from_vars(&[("LOG_FORMAT", "xml")]).is_err());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("T", "30").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("T", "2m").unwrap(), Duration::from_secs(120));
        assert!(parse_duration("T", "10h").is_err());
        assert!(parse_duration("T", "s").is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("B", "TRUE").unwrap());
        assert!(!parse_bool("B", "0").unwrap());
        assert!(parse_bool("B", "maybe").is_err());
    }
}
