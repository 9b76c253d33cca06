use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue, Set};
use serde::{Deserialize, Serialize};

/// Status of an equipment loan. Only `activo` counts against stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EstadoPrestamo {
    Activo,
    Devuelto,
    Vencido,
    Perdido,
    Danado,
}

impl EstadoPrestamo {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoPrestamo::Activo => "activo",
            EstadoPrestamo::Devuelto => "devuelto",
            EstadoPrestamo::Vencido => "vencido",
            EstadoPrestamo::Perdido => "perdido",
            EstadoPrestamo::Danado => "dañado",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "activo" => Some(EstadoPrestamo::Activo),
            "devuelto" => Some(EstadoPrestamo::Devuelto),
            "vencido" => Some(EstadoPrestamo::Vencido),
            "perdido" => Some(EstadoPrestamo::Perdido),
            "dañado" => Some(EstadoPrestamo::Danado),
            _ => None,
        }
    }

    pub const ALL: [&'static str; 5] = ["activo", "devuelto", "vencido", "perdido", "dañado"];
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "prestamos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub id_reserva: i32,
    pub id_producto: i32,
    pub cantidad_prestada: i32,
    pub estado: String,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::reserva::Entity",
        from = "Column::IdReserva",
        to = "super::reserva::Column::Id"
    )]
    Reserva,
    #[sea_orm(
        belongs_to = "super::producto::Entity",
        from = "Column::IdProducto",
        to = "super::producto::Column::Id"
    )]
    Producto,
}

impl Related<super::reserva::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reserva.def()
    }
}

impl Related<super::producto::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Producto.def()
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
