//! Database model types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A submitted news item as persisted by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsRecord {
    /// Assigned once on append, never reused.
    pub id: u64,
    pub source: String,
    pub headline: String,
    pub created_at: DateTime<Utc>,
    /// Set once the publisher has accepted the item.
    pub published: bool,
}
