use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::entry_attempts;

/// One run of the scan-then-confirm protocol.
///
/// `successful` only ever moves from `false` to `true`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EntryAttempt {
    pub id: String,
    pub user_id: String,
    pub tag_id: String,
    pub check_point_id: String,
    pub timestamp: DateTime<Utc>,
    pub successful: bool,
}

impl From<entry_attempts::Model> for EntryAttempt {
    fn from(model: entry_attempts::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            tag_id: model.tag_id,
            check_point_id: model.check_point_id,
            timestamp: model.timestamp,
            successful: model.successful,
        }
    }
}
