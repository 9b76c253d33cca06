use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue, Set};
use serde::{Deserialize, Serialize};

/// Operational state of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EstadoCancha {
    Disponible,
    Mantenimiento,
    Ocupada,
    NoDisponible,
}

impl EstadoCancha {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoCancha::Disponible => "disponible",
            EstadoCancha::Mantenimiento => "mantenimiento",
            EstadoCancha::Ocupada => "ocupada",
            EstadoCancha::NoDisponible => "no_disponible",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "disponible" => Some(EstadoCancha::Disponible),
            "mantenimiento" => Some(EstadoCancha::Mantenimiento),
            "ocupada" => Some(EstadoCancha::Ocupada),
            "no_disponible" => Some(EstadoCancha::NoDisponible),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "canchas")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub nombre_cancha: String,
    pub estado: String,
    pub id_tipo: i32,
    pub ubicacion: Option<String>,
    pub capacidad: Option<i32>,
    pub hora_apertura: Option<Time>,
    pub hora_cierre: Option<Time>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tipo_cancha::Entity",
        from = "Column::IdTipo",
        to = "super::tipo_cancha::Column::Id"
    )]
    TipoCancha,
    #[sea_orm(has_many = "super::reserva::Entity")]
    Reserva,
    #[sea_orm(has_many = "super::tarifa::Entity")]
    Tarifa,
}

impl Related<super::tipo_cancha::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TipoCancha.def()
    }
}

impl Related<super::reserva::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reserva.def()
    }
}

impl Related<super::tarifa::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tarifa.def()
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
