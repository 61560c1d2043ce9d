//! User entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub external_id: String,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub img: Option<String>,
    /// JSON array of saved post ids.
    pub saved_posts: Json,
    pub nectar: i32,
    pub last_nectar_award_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain User.
impl From<Model> for hive_core::domain::User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            external_id: model.external_id,
            username: model.username,
            email: model.email,
            img: model.img,
            saved_posts: serde_json::from_value(model.saved_posts).unwrap_or_default(),
            nectar: model.nectar,
            last_nectar_award_at: model.last_nectar_award_at.map(Into::into),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from Domain User to SeaORM ActiveModel.
impl From<hive_core::domain::User> for ActiveModel {
    fn from(user: hive_core::domain::User) -> Self {
        Self {
            id: Set(user.id),
            external_id: Set(user.external_id),
            username: Set(user.username),
            email: Set(user.email),
            img: Set(user.img),
            saved_posts: Set(serde_json::to_value(&user.saved_posts)
                .unwrap_or(serde_json::Value::Array(Vec::new()))),
            nectar: Set(user.nectar),
            last_nectar_award_at: Set(user.last_nectar_award_at.map(Into::into)),
            created_at: Set(user.created_at.into()),
            updated_at: Set(user.updated_at.into()),
        }
    }
}
