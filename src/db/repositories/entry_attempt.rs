use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};

use crate::entities::entry_attempts;
use crate::models::EntryAttempt;

pub struct EntryAttemptRepository {
    conn: DatabaseConnection,
}

impl EntryAttemptRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(
        &self,
        user_id: &str,
        tag_id: &str,
        check_point_id: &str,
    ) -> Result<EntryAttempt, DbErr> {
        let active = entry_attempts::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            user_id: Set(user_id.to_string()),
            tag_id: Set(tag_id.to_string()),
            check_point_id: Set(check_point_id.to_string()),
            timestamp: Set(chrono::Utc::now()),
            successful: Set(false),
        };

        Ok(active.insert(&self.conn).await?.into())
    }

    pub async fn get(&self, id: &str) -> Result<Option<EntryAttempt>, DbErr> {
        let attempt = entry_attempts::Entity::find_by_id(id.to_string())
            .one(&self.conn)
            .await?;

        Ok(attempt.map(EntryAttempt::from))
    }

    /// Sets `successful = true`. The statement never writes `false`, so
    /// repeated or racing calls converge on the same row state.
    ///
    /// Returns whether a row with this id exists.
    pub async fn mark_successful(&self, id: &str) -> Result<bool, DbErr> {
        let result = entry_attempts::Entity::update_many()
            .col_expr(entry_attempts::Column::Successful, Expr::value(true))
            .filter(entry_attempts::Column::Id.eq(id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn list(&self) -> Result<Vec<EntryAttempt>, DbErr> {
        let rows = entry_attempts::Entity::find()
            .order_by_asc(entry_attempts::Column::Timestamp)
            .order_by_asc(entry_attempts::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(EntryAttempt::from).collect())
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<EntryAttempt>, DbErr> {
        let rows = entry_attempts::Entity::find()
            .filter(entry_attempts::Column::UserId.eq(user_id))
            .order_by_asc(entry_attempts::Column::Timestamp)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(EntryAttempt::from).collect())
    }
}
