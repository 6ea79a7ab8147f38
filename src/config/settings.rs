use serde::Deserialize;

/// Top-level configuration settings for the application.
///
/// Includes settings for the HTTP ingress, the TCP relay, the datastore and logging.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub http: HttpSettings,
    pub relay: RelaySettings,
    pub datastore: DatastoreSettings,
    pub log: LogSettings,
}

/// Configuration settings for the HTTP ingress.
///
/// Defines the bind address and the directory holding the front-end pages.
#[derive(Debug, Deserialize, Clone)]
pub struct HttpSettings {
    pub host: String,
    pub port: u16,
    pub static_dir: String,
}

/// Configuration settings for the relay hop.
///
/// `host`/`port` is where the relay listens, `forward_host`/`port` is where the
/// ingress connects to reach it.
#[derive(Debug, Deserialize, Clone)]
pub struct RelaySettings {
    pub host: String,
    pub port: u16,
    pub forward_host: String,
    pub buffer_size: usize,
    pub backlog: u32,
    pub read_timeout_ms: Option<u64>,
    pub connect_timeout_ms: u64,
}

/// Configuration settings for the document store connection.
#[derive(Debug, Deserialize, Clone)]
pub struct DatastoreSettings {
    pub uri: String,
    pub database: String,
    pub collection: String,
    pub connect_timeout_ms: u64,
    pub retry_interval_ms: u64,
    pub max_attempts: u32,
    pub connect_on_startup: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub level: String,
}

impl HttpSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl RelaySettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn forward_addr(&self) -> String {
        format!("{}:{}", self.forward_host, self.port)
    }
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize, Default)]
pub struct PartialSettings {
    pub http: Option<PartialHttpSettings>,
    pub relay: Option<PartialRelaySettings>,
    pub datastore: Option<PartialDatastoreSettings>,
    pub log: Option<PartialLogSettings>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialHttpSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub static_dir: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialRelaySettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub forward_host: Option<String>,
    pub buffer_size: Option<usize>,
    pub backlog: Option<u32>,
    pub read_timeout_ms: Option<u64>,
    pub connect_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialDatastoreSettings {
    pub uri: Option<String>,
    pub database: Option<String>,
    pub collection: Option<String>,
    pub connect_timeout_ms: Option<u64>,
    pub retry_interval_ms: Option<u64>,
    pub max_attempts: Option<u32>,
    pub connect_on_startup: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialLogSettings {
    pub level: Option<String>,
}

impl PartialSettings {
    /// Fills every missing value from `default`.
    pub fn merge(self, default: Settings) -> Settings {
        let http = self.http.unwrap_or_default();
        let relay = self.relay.unwrap_or_default();
        let datastore = self.datastore.unwrap_or_default();
        let log = self.log.unwrap_or_default();

        Settings {
            http: HttpSettings {
                host: http.host.unwrap_or(default.http.host),
                port: http.port.unwrap_or(default.http.port),
                static_dir: http.static_dir.unwrap_or(default.http.static_dir),
            },
            relay: RelaySettings {
                host: relay.host.unwrap_or(default.relay.host),
                port: relay.port.unwrap_or(default.relay.port),
                forward_host: relay.forward_host.unwrap_or(default.relay.forward_host),
                buffer_size: relay.buffer_size.unwrap_or(default.relay.buffer_size),
                backlog: relay.backlog.unwrap_or(default.relay.backlog),
                read_timeout_ms: relay.read_timeout_ms.or(default.relay.read_timeout_ms),
                connect_timeout_ms: relay
                    .connect_timeout_ms
                    .unwrap_or(default.relay.connect_timeout_ms),
            },
            datastore: DatastoreSettings {
                uri: datastore.uri.unwrap_or(default.datastore.uri),
                database: datastore.database.unwrap_or(default.datastore.database),
                collection: datastore.collection.unwrap_or(default.datastore.collection),
                connect_timeout_ms: datastore
                    .connect_timeout_ms
                    .unwrap_or(default.datastore.connect_timeout_ms),
                retry_interval_ms: datastore
                    .retry_interval_ms
                    .unwrap_or(default.datastore.retry_interval_ms),
                max_attempts: datastore
                    .max_attempts
                    .unwrap_or(default.datastore.max_attempts),
                connect_on_startup: datastore
                    .connect_on_startup
                    .unwrap_or(default.datastore.connect_on_startup),
            },
            log: LogSettings {
                level: log.level.unwrap_or(default.log.level),
            },
        }
    }
}

/// Provides default values for `Settings`.
///
/// Ports and names match the docker-compose deployment: HTTP on 3000, relay on
/// 5000, MongoDB reachable as `mongodb`.
impl Default for Settings {
    fn default() -> Self {
        Self {
            http: HttpSettings {
                host: "0.0.0.0".to_string(),
                port: 3000,
                static_dir: "front-init".to_string(),
            },
            relay: RelaySettings {
                host: "0.0.0.0".to_string(),
                port: 5000,
                forward_host: "127.0.0.1".to_string(),
                buffer_size: 1024,
                backlog: 1,
                read_timeout_ms: None,
                connect_timeout_ms: 1000,
            },
            datastore: DatastoreSettings {
                uri: "mongodb://mongodb:27017".to_string(),
                database: "msg_db".to_string(),
                collection: "messages".to_string(),
                connect_timeout_ms: 1000,
                retry_interval_ms: 1000,
                max_attempts: 10,
                connect_on_startup: true,
            },
            log: LogSettings {
                level: "info".to_string(),
            },
        }
    }
}
