//! Configuration for the subscriber.

use news_rpc::ClientConfig;

/// Subscriber configuration.
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// Local UDP port receiving pushed items.
    pub port: u16,

    /// Publisher hostname.
    pub publisher_host: String,

    /// Publisher registration port.
    pub publisher_port: u16,

    /// Host part of the address sent to the publisher.
    pub advertise_host: String,

    /// Timeouts for the registration call.
    pub client: ClientConfig,
}

impl SubscriberConfig {
    pub fn new(port: u16, publisher_host: impl Into<String>, publisher_port: u16) -> Self {
        Self {
            port,
            publisher_host: publisher_host.into(),
            publisher_port,
            ..Default::default()
        }
    }

    pub fn publisher_addr(&self) -> String {
        format!("{}:{}", self.publisher_host, self.publisher_port)
    }
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            port: 50420,
            publisher_host: "localhost".to_string(),
            publisher_port: 50414,
            advertise_host: "127.0.0.1".to_string(),
            client: ClientConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SubscriberConfig::default();
        assert_eq!(config.port, 50420);
        assert_eq!(config.publisher_addr(), "localhost:50414");
        assert_eq!(config.advertise_host, "127.0.0.1");
    }

    #[test]
    fn test_new() {
        let config = SubscriberConfig::new(6000, "publisher.local", 7000);
        assert_eq!(config.port, 6000);
        assert_eq!(config.publisher_addr(), "publisher.local:7000");
    }
}
