use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "assets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub model: Option<String>,
    #[sea_orm(unique)]
    pub serial_number: String,
    pub location: Option<String>,
    pub status: String,
    pub department: Option<String>,
    pub building: Option<String>,
    pub room: Option<String>,

    // Custodian name is denormalized so listings need no join
    pub custodian_id: Option<String>,
    pub custodian_name: Option<String>,

    /// `YYYY-MM-DD`
    pub purchase_date: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CustodianId",
        to = "super::user::Column::Id"
    )]
    Custodian,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Custodian.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
