use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue, Set};
use serde::{Deserialize, Serialize};

/// Lifecycle states of a reservation.
///
/// `pendiente → confirmada → finalizada` with manual cancellation out of the
/// two non-terminal states. `finalizada` and `cancelada` are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EstadoReserva {
    Pendiente,
    Confirmada,
    Cancelada,
    Finalizada,
}

impl EstadoReserva {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoReserva::Pendiente => "pendiente",
            EstadoReserva::Confirmada => "confirmada",
            EstadoReserva::Cancelada => "cancelada",
            EstadoReserva::Finalizada => "finalizada",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pendiente" => Some(EstadoReserva::Pendiente),
            "confirmada" => Some(EstadoReserva::Confirmada),
            "cancelada" => Some(EstadoReserva::Cancelada),
            "finalizada" => Some(EstadoReserva::Finalizada),
            _ => None,
        }
    }

    /// Active states participate in conflict detection.
    pub fn is_active(&self) -> bool {
        matches!(self, EstadoReserva::Pendiente | EstadoReserva::Confirmada)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, EstadoReserva::Cancelada | EstadoReserva::Finalizada)
    }

    pub const ACTIVE: [&'static str; 2] = ["pendiente", "confirmada"];
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reservas")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub id_cancha: i32,
    pub id_usuario: i32,
    pub fecha_reserva: Date,
    /// Half-open interval [hora_inicio, hora_fin)
    pub hora_inicio: Time,
    pub hora_fin: Time,
    pub estado: String,
    pub observaciones: Option<String>,
    pub telefono_cliente: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

impl Model {
    pub fn estado(&self) -> Option<EstadoReserva> {
        EstadoReserva::from_str(&self.estado)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cancha::Entity",
        from = "Column::IdCancha",
        to = "super::cancha::Column::Id"
    )]
    Cancha,
    #[sea_orm(
        belongs_to = "super::usuario::Entity",
        from = "Column::IdUsuario",
        to = "super::usuario::Column::Id"
    )]
    Usuario,
    #[sea_orm(has_many = "super::prestamo::Entity")]
    Prestamo,
}

impl Related<super::cancha::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cancha.def()
    }
}

impl Related<super::usuario::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Usuario.def()
    }
}

impl Related<super::prestamo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Prestamo.def()
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estado_round_trip() {
        for estado in [
            EstadoReserva::Pendiente,
            EstadoReserva::Confirmada,
            EstadoReserva::Cancelada,
            EstadoReserva::Finalizada,
        ] {
            assert_eq!(EstadoReserva::from_str(estado.as_str()), Some(estado));
        }
        assert_eq!(EstadoReserva::from_str("activa"), None);
    }

    #[test]
    fn only_pending_and_confirmed_are_active() {
        assert!(EstadoReserva::Pendiente.is_active());
        assert!(EstadoReserva::Confirmada.is_active());
        assert!(!EstadoReserva::Cancelada.is_active());
        assert!(!EstadoReserva::Finalizada.is_active());
    }
}
