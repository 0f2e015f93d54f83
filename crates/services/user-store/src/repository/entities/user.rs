//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::User;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    pub fullname: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: Option<String>,
    pub is_active: bool,
    /// NULL when the user belongs to no group
    pub group_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::group::Entity",
        from = "Column::GroupId",
        to = "super::group::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Group,
}

impl Related<super::group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        User {
            id: model.id,
            username: model.username,
            fullname: model.fullname,
            email: model.email,
            password_hash: model.password_hash,
            avatar: model.avatar,
            is_active: model.is_active,
            group_id: model.group_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<User> for Model {
    fn from(user: User) -> Self {
        Model {
            id: user.id,
            username: user.username,
            fullname: user.fullname,
            email: user.email,
            password_hash: user.password_hash,
            avatar: user.avatar,
            is_active: user.is_active,
            group_id: user.group_id,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
