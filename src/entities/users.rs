use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub login: String,

    /// Opaque credential, stored as received
    pub password: String,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::user_groups::Entity")]
    UserGroup,
    #[sea_orm(has_one = "super::user_states::Entity")]
    UserState,
}

impl Related<super::user_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserGroup.def()
    }
}

impl Related<super::user_states::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserState.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
