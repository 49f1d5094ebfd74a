//! Client configuration via `datacom.toml`
//!
//! A configuration names the backend and the connection details a driver
//! needs. Drivers are collaborators: they implement [`ConnectionFactory`] and
//! turn a validated [`ClientConfig`] into a [`Connection`].

use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

use datacom_core::{BackendKind, Error, Result, StoreFamily};
use datacom_engine::Connection;

/// Config file name looked up by [`ClientConfig::from_dir`].
pub const CONFIG_FILE_NAME: &str = "datacom.toml";

/// Connection settings loaded from `datacom.toml`.
///
/// # Example
///
/// ```toml
/// # Backend: sqlserver, odbc, oledb, sqlite, postgresql, mysql,
/// # redis, cassandra or etcd (aliases such as "mssql" or "pg" accepted)
/// backend = "cassandra"
/// host = "10.0.0.5"
/// port = 9042
/// keyspace = "metrics"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Target store.
    #[serde(deserialize_with = "backend_from_str")]
    pub backend: BackendKind,
    /// Server host name or address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Server port; the driver default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Database (catalog) name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// Cassandra keyspace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyspace: Option<String>,
    /// User name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Driver connection string, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,
    /// File or DSN for file-backed and ODBC/OLE DB sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
}

fn backend_from_str<'de, D>(deserializer: D) -> std::result::Result<BackendKind, D::Error>
where
    D: Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    name.parse().map_err(serde::de::Error::custom)
}

impl ClientConfig {
    /// A config for `backend` with every other field unset.
    pub fn new(backend: BackendKind) -> Self {
        Self {
            backend,
            host: None,
            port: None,
            database: None,
            keyspace: None,
            username: None,
            password: None,
            connection_string: None,
            data_source: None,
        }
    }

    /// Set the host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the database name.
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Set the keyspace.
    pub fn keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.keyspace = Some(keyspace.into());
        self
    }

    /// Set the credentials.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the driver connection string.
    pub fn connection_string(mut self, connection_string: impl Into<String>) -> Self {
        self.connection_string = Some(connection_string.into());
        self
    }

    /// Set the data source.
    pub fn data_source(mut self, data_source: impl Into<String>) -> Self {
        self.data_source = Some(data_source.into());
        self
    }

    /// Parse a config from TOML text.
    ///
    /// The parsed config is validated.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ClientConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            reason: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::Config { reason } => Error::Config {
                reason: format!("Invalid config file '{}': {}", path.display(), reason),
            },
            other => other,
        })
    }

    /// Read `datacom.toml` from `dir`.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        Self::from_file(&dir.join(CONFIG_FILE_NAME))
    }

    /// Serialize this config to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|e| Error::Config {
            reason: format!("Failed to write config file '{}': {}", path.display(), e),
        })
    }

    /// Check the fields `backend` needs.
    ///
    /// # Errors
    ///
    /// - Relational: `host`, `connection_string` or `data_source` required
    /// - Cassandra: `host` and `keyspace` required; a bare connection string
    ///   is not enough
    /// - Redis, Etcd: `host` or `connection_string` required
    pub fn validate(&self) -> Result<()> {
        let missing = |what: &str| Error::Config {
            reason: format!("{} requires {}", self.backend, what),
        };
        match self.backend.family() {
            StoreFamily::Relational => {
                if !(is_set(&self.host)
                    || is_set(&self.connection_string)
                    || is_set(&self.data_source))
                {
                    return Err(missing("host, connection_string or data_source"));
                }
            }
            StoreFamily::WideColumn => {
                if !is_set(&self.host) {
                    return Err(missing("host"));
                }
                if !is_set(&self.keyspace) {
                    return Err(missing("keyspace"));
                }
            }
            StoreFamily::KeyValueList => {
                if !(is_set(&self.host) || is_set(&self.connection_string)) {
                    return Err(missing("host or connection_string"));
                }
            }
        }
        Ok(())
    }
}

fn is_set(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}

/// Builds connections from a validated config.
///
/// Implemented by driver crates; the in-memory transports implement it in
/// tests.
pub trait ConnectionFactory {
    /// Create an unopened connection for `config`.
    fn connect(&self, config: &ClientConfig) -> Result<Box<dyn Connection>>;
}

impl<F> ConnectionFactory for F
where
    F: Fn(&ClientConfig) -> Result<Box<dyn Connection>>,
{
    fn connect(&self, config: &ClientConfig) -> Result<Box<dyn Connection>> {
        self(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_minimal_relational() {
        let config = ClientConfig::from_toml_str(
            r#"
backend = "mssql"
host = "db01"
database = "sales"
"#,
        )
        .unwrap();
        assert_eq!(config.backend, BackendKind::SqlServer);
        assert_eq!(config.host.as_deref(), Some("db01"));
        assert_eq!(config.port, None);
    }

    #[test]
    fn test_unknown_backend_is_config_error() {
        let err = ClientConfig::from_toml_str("backend = \"oracle\"\nhost = \"x\"").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_cassandra_requires_keyspace() {
        let err = ClientConfig::new(BackendKind::Cassandra)
            .host("10.0.0.5")
            .validate()
            .unwrap_err();
        match err {
            Error::Config { reason } => assert!(reason.contains("keyspace")),
            other => panic!("expected Config, got {:?}", other),
        }
    }

    #[test]
    fn test_cassandra_rejects_bare_connection_string() {
        let config = ClientConfig::new(BackendKind::Cassandra)
            .connection_string("Contact Points=10.0.0.5")
            .keyspace("metrics");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_relational_accepts_data_source() {
        let config = ClientConfig::new(BackendKind::Sqlite).data_source("/tmp/app.db");
        assert!(config.validate().is_ok());
        assert!(ClientConfig::new(BackendKind::Sqlite).validate().is_err());
    }

    #[test]
    fn test_blank_host_counts_as_missing() {
        let config = ClientConfig::new(BackendKind::Redis).host("  ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ClientConfig::new(BackendKind::Etcd)
            .host("127.0.0.1")
            .port(2379)
            .credentials("root", "secret");
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("backend = \"etcd\""));
        assert!(!text.contains("keyspace"));
        assert_eq!(ClientConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_from_dir_reads_config_file() {
        let dir = TempDir::new().unwrap();
        ClientConfig::new(BackendKind::Redis)
            .host("cache")
            .write_to_file(&dir.path().join(CONFIG_FILE_NAME))
            .unwrap();
        let config = ClientConfig::from_dir(dir.path()).unwrap();
        assert_eq!(config.backend, BackendKind::Redis);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let err = ClientConfig::from_dir(dir.path()).unwrap_err();
        match err {
            Error::Config { reason } => assert!(reason.contains(CONFIG_FILE_NAME)),
            other => panic!("expected Config, got {:?}", other),
        }
    }
}
