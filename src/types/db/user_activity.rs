use sea_orm::entity::prelude::*;

/// Append-only activity trail for users
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "user_activity")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(indexed)]
    pub user_id: String,
    pub actor_user_id: Option<String>,
    pub action: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub before_state: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub after_state: Option<String>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
