use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue, Set};
use serde::{Deserialize, Serialize};

/// Legacy per-field rate table, superseded in practice by
/// `tipo_canchas.precio` but kept for compatibility with existing data.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tarifas")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub id_cancha: i32,
    pub precio: Decimal,
    pub hora_inicio: Time,
    pub hora_fin: Time,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cancha::Entity",
        from = "Column::IdCancha",
        to = "super::cancha::Column::Id"
    )]
    Cancha,
}

impl Related<super::cancha::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cancha.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = chrono::Utc::now();

        if insert {
            if let ActiveValue::NotSet = active_model.created_at {
                active_model.created_at = Set(now);
            }
        }

        active_model.updated_at = Set(Some(now));

        Ok(active_model)
    }
}
