use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::check_points;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CheckPoint {
    pub id: String,
    pub name: String,
    pub api_key: String,
    pub created_at: DateTime<Utc>,
}

impl From<check_points::Model> for CheckPoint {
    fn from(model: check_points::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            api_key: model.api_key,
            created_at: model.created_at,
        }
    }
}
