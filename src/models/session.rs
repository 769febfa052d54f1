use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Persisted session entity. The row id is the literal cookie value.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    /// Opaque random identifier handed to the client as the cookie value.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user who owns this session. Many sessions may reference one user.
    pub user_id: i32,

    /// When the session expires. Expired rows are deleted lazily on the
    /// next lookup that finds them.
    pub expires_at: NaiveDateTime,

    pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
