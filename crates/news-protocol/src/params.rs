//! Typed parameters and results for each RPC method.

use crate::{NewsItem, ProtocolResult};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Parameters of `add_post`.
///
/// Reporters may send either the XML document or the two plain fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddPostParams {
    Xml { xml: String },
    Fields { source: String, headline: String },
}

impl AddPostParams {
    /// Decode into a validated news item.
    pub fn into_item(self) -> ProtocolResult<NewsItem> {
        match self {
            Self::Xml { xml } => NewsItem::from_xml(&xml),
            Self::Fields { source, headline } => NewsItem::new(source, headline),
        }
    }
}

impl From<&NewsItem> for AddPostParams {
    fn from(item: &NewsItem) -> Self {
        Self::Xml { xml: item.to_xml() }
    }
}

/// Result of `add_post`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddPostResult {
    pub accepted: bool,
    /// Store id assigned to the item.
    pub id: u64,
}

/// Parameters of `publish`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishParams {
    /// Host-side record id, for correlation in logs only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub payload: NewsItem,
}

/// Boolean outcome shared by `publish` and `publish_result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedResult {
    pub accepted: bool,
}

/// Parameters of `register`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterParams {
    /// Datagram address the subscriber listens on.
    pub address: SocketAddr,
}

/// Result of `register`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResult {
    pub registered: bool,
    pub address: SocketAddr,
}

/// Parameters of `publish_result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResultParams {
    pub id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProtocolError;

    #[test]
    fn test_add_post_accepts_xml() {
        let params: AddPostParams = serde_json::from_value(serde_json::json!({
            "xml": "<news><source>BBC</source><headline>Some News</headline></news>"
        }))
        .unwrap();
        let item = params.into_item().unwrap();
        assert_eq!(item.source, "BBC");
        assert_eq!(item.headline, "Some News");
    }

    #[test]
    fn test_add_post_accepts_fields() {
        let params: AddPostParams = serde_json::from_value(serde_json::json!({
            "source": "CNN",
            "headline": "Breaking"
        }))
        .unwrap();
        assert_eq!(params.into_item().unwrap(), NewsItem::new("CNN", "Breaking").unwrap());
    }

    #[test]
    fn test_add_post_bad_xml_is_malformed() {
        let params = AddPostParams::Xml {
            xml: "<news><source>only</source></news>".to_string(),
        };
        assert!(matches!(
            params.into_item(),
            Err(ProtocolError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_add_post_from_item_uses_xml() {
        let item = NewsItem::new("BBC", "Some News").unwrap();
        let params = AddPostParams::from(&item);
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains("\"xml\""));
        assert_eq!(params.into_item().unwrap(), item);
    }

    #[test]
    fn test_publish_params_id_is_optional() {
        let params: PublishParams = serde_json::from_value(serde_json::json!({
            "payload": { "source": "BBC", "headline": "Some News" }
        }))
        .unwrap();
        assert_eq!(params.id, None);

        let with_id = PublishParams {
            id: Some(7),
            payload: params.payload.clone(),
        };
        let json = serde_json::to_value(&with_id).unwrap();
        assert_eq!(json["id"], 7);
    }

    #[test]
    fn test_register_params_address_as_string() {
        let params: RegisterParams =
            serde_json::from_value(serde_json::json!({ "address": "127.0.0.1:50420" })).unwrap();
        assert_eq!(params.address.port(), 50420);

        let bad = serde_json::from_value::<RegisterParams>(serde_json::json!({ "address": "nope" }));
        assert!(bad.is_err());
    }
}
