//! Configuration for the publisher.

/// Publisher configuration.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Port accepting `register` calls from subscribers.
    pub register_port: u16,

    /// Port accepting `publish` calls from hosts.
    pub publish_port: u16,

    /// Connections served at once on each port.
    pub max_connections: usize,
}

impl PublisherConfig {
    pub fn new(register_port: u16, publish_port: u16) -> Self {
        Self {
            register_port,
            publish_port,
            ..Default::default()
        }
    }
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            register_port: 50414,
            publish_port: 50500,
            max_connections: 64,
        }
    }
}
