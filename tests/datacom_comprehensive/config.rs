//! Configuration files and connection factories.

use datacom::{
    BackendKind, ClientConfig, Connection, DataClient, Error, MemoryKv, MemorySql, Result,
    CONFIG_FILE_NAME,
};
use tempfile::TempDir;

/// Factory backed by the in-memory transports.
struct MemoryFactory;

impl datacom::ConnectionFactory for MemoryFactory {
    fn connect(&self, config: &ClientConfig) -> Result<Box<dyn Connection>> {
        let conn: Box<dyn Connection> = match config.backend {
            BackendKind::Redis => Box::new(MemoryKv::redis()),
            BackendKind::Etcd => Box::new(MemoryKv::etcd()),
            BackendKind::Cassandra => Box::new(MemorySql::cassandra(
                config.keyspace.clone().unwrap_or_default(),
            )),
            other => Box::new(MemorySql::new(other)),
        };
        Ok(conn)
    }
}

#[test]
fn client_from_config_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "backend = \"cassandra\"\nhost = \"10.0.0.5\"\nport = 9042\nkeyspace = \"metrics\"\n",
    )
    .unwrap();

    let config = ClientConfig::from_dir(dir.path()).unwrap();
    let mut client = DataClient::from_config(&config, &MemoryFactory).unwrap();
    assert_eq!(client.backend(), BackendKind::Cassandra);
    assert_eq!(client.ping().unwrap(), env!("CARGO_PKG_VERSION"));
}

#[test]
fn invalid_config_never_reaches_the_factory() {
    let config = ClientConfig::new(BackendKind::Cassandra).connection_string("Contact Points=x");
    let factory = |_: &ClientConfig| -> Result<Box<dyn Connection>> {
        panic!("factory called for an invalid config")
    };
    assert!(matches!(
        DataClient::from_config(&config, &factory),
        Err(Error::Config { .. })
    ));
}

#[test]
fn malformed_toml_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "backend = ").unwrap();
    assert!(matches!(
        ClientConfig::from_file(&path),
        Err(Error::Config { .. })
    ));
}

#[test]
fn config_written_and_read_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    let config = ClientConfig::new(BackendKind::PostgreSql)
        .host("db")
        .database("sales")
        .credentials("app", "pw");
    config.write_to_file(&path).unwrap();
    assert_eq!(ClientConfig::from_file(&path).unwrap(), config);
}
