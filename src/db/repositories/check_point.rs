use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};

use crate::entities::check_points;
use crate::models::CheckPoint;

pub struct CheckPointRepository {
    conn: DatabaseConnection,
}

impl CheckPointRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, name: &str, api_key: &str) -> Result<CheckPoint, DbErr> {
        let active = check_points::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            name: Set(name.to_string()),
            api_key: Set(api_key.to_string()),
            created_at: Set(chrono::Utc::now()),
        };

        Ok(active.insert(&self.conn).await?.into())
    }

    pub async fn get_by_api_key(&self, api_key: &str) -> Result<Option<CheckPoint>, DbErr> {
        let check_point = check_points::Entity::find()
            .filter(check_points::Column::ApiKey.eq(api_key))
            .one(&self.conn)
            .await?;

        Ok(check_point.map(CheckPoint::from))
    }
}
