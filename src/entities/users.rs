use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    #[sea_orm(unique)]
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    #[sea_orm(unique)]
    pub tag_id: String,

    /// Base32 TOTP shared secret
    pub totp_secret: String,

    pub totp_provisioning_uri: String,

    /// `ADMIN` or `USER`
    pub role: String,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::entry_attempts::Entity")]
    EntryAttempts,
}

impl Related<super::entry_attempts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EntryAttempts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
