//! Configuration for the news host.

use news_outbox::ForwarderConfig;
use news_rpc::{ClientConfig, ServerConfig};
use std::path::PathBuf;
use std::time::Duration;

/// Host configuration.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Port reporters connect to.
    pub listen_port: u16,

    /// Hostname of the publisher.
    pub publisher_host: String,

    /// Publisher port accepting `publish` calls.
    pub publisher_port: u16,

    /// Publisher port accepting `register` calls. When unset the host does
    /// not proxy registrations.
    pub publisher_register_port: Option<u16>,

    /// SQLite file holding the news records.
    pub db_path: PathBuf,

    /// Reporter connections served at once.
    pub max_connections: usize,

    /// Silent reporter connections are closed after this long.
    pub idle_timeout: Duration,

    pub forwarder: ForwarderConfig,

    /// Timeouts for calls to the publisher.
    pub client: ClientConfig,
}

impl HostConfig {
    /// Create a config with default values for everything but the ports.
    pub fn new(listen_port: u16, publisher_host: impl Into<String>, publisher_port: u16) -> Self {
        Self {
            listen_port,
            publisher_host: publisher_host.into(),
            publisher_port,
            ..Default::default()
        }
    }

    /// `host:port` of the publisher's publication endpoint.
    pub fn publisher_addr(&self) -> String {
        format!("{}:{}", self.publisher_host, self.publisher_port)
    }

    /// `host:port` of the publisher's registration endpoint, if configured.
    pub fn registrar_addr(&self) -> Option<String> {
        self.publisher_register_port
            .map(|port| format!("{}:{}", self.publisher_host, port))
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            max_connections: self.max_connections,
            idle_timeout: self.idle_timeout,
            ..ServerConfig::on_port(self.listen_port)
        }
    }

    /// Use one timeout for both connecting to and hearing from the publisher.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = ClientConfig {
            connect_timeout: timeout,
            response_timeout: timeout,
        };
        self
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            listen_port: 50123,
            publisher_host: "localhost".to_string(),
            publisher_port: 50500,
            publisher_register_port: None,
            db_path: PathBuf::from("news.db"),
            max_connections: ServerConfig::default().max_connections,
            idle_timeout: ServerConfig::default().idle_timeout,
            forwarder: ForwarderConfig::default(),
            client: ClientConfig::default(),
        }
    }
}
