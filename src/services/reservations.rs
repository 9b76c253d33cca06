//! Reservation lifecycle: creation, edits, conflict enforcement and the
//! transitions into `confirmada` that trigger equipment allocation.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{error, info, instrument};

use crate::entities::cancha::{self, Entity as CanchaEntity};
use crate::entities::reserva::{self, Entity as ReservaEntity, EstadoReserva};
use crate::entities::tipo_cancha::{self, Entity as TipoCanchaEntity};
use crate::entities::usuario::{self, Entity as UsuarioEntity};
use crate::entities::prestamo::{self, Entity as PrestamoEntity};
use crate::errors::{OccupiedSlot, ServiceError};
use crate::services::allocation::{AllocationFailure, AllocationService};
use crate::services::availability::{find_conflicts_on, AvailabilityService};
use crate::services::pricing;

/// Fields of a new reservation, already parsed and typed.
#[derive(Debug, Clone)]
pub struct NewReserva {
    pub id_cancha: i32,
    pub id_usuario: i32,
    pub fecha_reserva: NaiveDate,
    pub hora_inicio: NaiveTime,
    pub hora_fin: NaiveTime,
    pub estado: EstadoReserva,
    pub observaciones: Option<String>,
    pub telefono_cliente: Option<String>,
}

/// Partial edit of an existing reservation. Absent fields keep their value.
#[derive(Debug, Clone, Default)]
pub struct ReservaChanges {
    pub id_cancha: Option<i32>,
    pub id_usuario: Option<i32>,
    pub fecha_reserva: Option<NaiveDate>,
    pub hora_inicio: Option<NaiveTime>,
    pub hora_fin: Option<NaiveTime>,
    pub estado: Option<EstadoReserva>,
    pub observaciones: Option<Option<String>>,
    pub telefono_cliente: Option<Option<String>>,
}

/// A persisted reservation plus whatever the allocation engine did when the
/// write confirmed it. Allocation failures are warnings, never errors.
#[derive(Debug, Serialize)]
pub struct ReservaOutcome {
    #[serde(flatten)]
    pub reserva: reserva::Model,
    pub implementos_asignados: Vec<prestamo::Model>,
    pub errores_implementos: Vec<AllocationFailure>,
}

/// Reservation enriched with owner and pricing context for list/detail views.
#[derive(Debug, Serialize)]
pub struct ReservaDetail {
    #[serde(flatten)]
    pub reserva: reserva::Model,
    pub nombre_usuario: Option<String>,
    pub telefono_usuario: Option<String>,
    pub nombre_cancha: Option<String>,
    pub tipo_cancha: Option<String>,
    pub precio_total: Decimal,
    pub recargo_nocturno: bool,
}

/// Valid lifecycle moves. A no-op transition (same estado) is always allowed;
/// `finalizada` and `cancelada` are absorbing.
fn is_valid_transition(from: EstadoReserva, to: EstadoReserva) -> bool {
    use EstadoReserva::*;
    match (from, to) {
        (Pendiente, Confirmada) => true,
        (Pendiente, Cancelada) => true,
        (Confirmada, Finalizada) => true,
        (Confirmada, Cancelada) => true,
        _ if from == to => true,
        _ => false,
    }
}

#[derive(Clone)]
pub struct ReservationService {
    db: Arc<DatabaseConnection>,
    availability: AvailabilityService,
    allocation: AllocationService,
}

impl ReservationService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        availability: AvailabilityService,
        allocation: AllocationService,
    ) -> Self {
        Self {
            db,
            availability,
            allocation,
        }
    }

    /// Creates a reservation. The conflict check and the insert share one
    /// transaction, so two concurrent requests for the same slot cannot both
    /// pass the check. A creation directly as `confirmada` runs the
    /// allocation engine synchronously.
    #[instrument(skip(self, nueva), fields(id_cancha = nueva.id_cancha, fecha = %nueva.fecha_reserva))]
    pub async fn create(&self, nueva: NewReserva) -> Result<ReservaOutcome, ServiceError> {
        validate_slot(nueva.hora_inicio, nueva.hora_fin)?;

        let db = &*self.db;

        CanchaEntity::find_by_id(nueva.id_cancha)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Cancha no encontrada".to_string()))?;
        UsuarioEntity::find_by_id(nueva.id_usuario)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Usuario no encontrado".to_string()))?;

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for reservation creation");
            ServiceError::DatabaseError(e)
        })?;

        let conflicts = find_conflicts_on(
            &txn,
            nueva.id_cancha,
            nueva.fecha_reserva,
            nueva.hora_inicio,
            nueva.hora_fin,
            None,
        )
        .await?;
        if !conflicts.is_empty() {
            return Err(ServiceError::ReservationConflict(
                conflicts.iter().map(OccupiedSlot::from).collect(),
            ));
        }

        let active = reserva::ActiveModel {
            id_cancha: Set(nueva.id_cancha),
            id_usuario: Set(nueva.id_usuario),
            fecha_reserva: Set(nueva.fecha_reserva),
            hora_inicio: Set(nueva.hora_inicio),
            hora_fin: Set(nueva.hora_fin),
            estado: Set(nueva.estado.as_str().to_string()),
            observaciones: Set(nueva.observaciones.clone()),
            telefono_cliente: Set(nueva.telefono_cliente.clone()),
            ..Default::default()
        };

        let model = active.insert(&txn).await?;
        txn.commit().await?;

        info!(id_reserva = model.id, estado = %model.estado, "Reservation created");

        let (implementos_asignados, errores_implementos) =
            if nueva.estado == EstadoReserva::Confirmada {
                let outcome = self.allocation.allocate_for_reserva(&model).await?;
                (outcome.created, outcome.failures)
            } else {
                (Vec::new(), Vec::new())
            };

        Ok(ReservaOutcome {
            reserva: model,
            implementos_asignados,
            errores_implementos,
        })
    }

    /// Applies a partial edit. Conflicts are re-checked (excluding the
    /// reservation itself) whenever the resulting estado is still active,
    /// and a transition into `confirmada` runs the allocation engine.
    #[instrument(skip(self, changes), fields(id_reserva = id))]
    pub async fn update(
        &self,
        id: i32,
        changes: ReservaChanges,
    ) -> Result<ReservaOutcome, ServiceError> {
        let db = &*self.db;

        let existing = ReservaEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Reserva no encontrada".to_string()))?;

        let old_estado = existing.estado().ok_or_else(|| {
            ServiceError::InvalidStatus(format!("Estado almacenado inválido: {}", existing.estado))
        })?;
        let new_estado = changes.estado.unwrap_or(old_estado);

        if !is_valid_transition(old_estado, new_estado) {
            return Err(ServiceError::InvalidStatus(format!(
                "No se puede pasar de '{}' a '{}'",
                old_estado.as_str(),
                new_estado.as_str()
            )));
        }

        if let Some(id_cancha) = changes.id_cancha {
            CanchaEntity::find_by_id(id_cancha)
                .one(db)
                .await?
                .ok_or_else(|| ServiceError::NotFound("Cancha no encontrada".to_string()))?;
        }
        if let Some(id_usuario) = changes.id_usuario {
            UsuarioEntity::find_by_id(id_usuario)
                .one(db)
                .await?
                .ok_or_else(|| ServiceError::NotFound("Usuario no encontrado".to_string()))?;
        }

        let id_cancha = changes.id_cancha.unwrap_or(existing.id_cancha);
        let fecha = changes.fecha_reserva.unwrap_or(existing.fecha_reserva);
        let hora_inicio = changes.hora_inicio.unwrap_or(existing.hora_inicio);
        let hora_fin = changes.hora_fin.unwrap_or(existing.hora_fin);

        validate_slot(hora_inicio, hora_fin)?;

        let txn = db.begin().await?;

        if new_estado.is_active() {
            let conflicts =
                find_conflicts_on(&txn, id_cancha, fecha, hora_inicio, hora_fin, Some(id)).await?;
            if !conflicts.is_empty() {
                return Err(ServiceError::ReservationConflict(
                    conflicts.iter().map(OccupiedSlot::from).collect(),
                ));
            }
        }

        let mut active: reserva::ActiveModel = existing.into();
        active.id_cancha = Set(id_cancha);
        if let Some(id_usuario) = changes.id_usuario {
            active.id_usuario = Set(id_usuario);
        }
        active.fecha_reserva = Set(fecha);
        active.hora_inicio = Set(hora_inicio);
        active.hora_fin = Set(hora_fin);
        active.estado = Set(new_estado.as_str().to_string());
        if let Some(observaciones) = changes.observaciones {
            active.observaciones = Set(observaciones);
        }
        if let Some(telefono) = changes.telefono_cliente {
            active.telefono_cliente = Set(telefono);
        }

        let model = active.update(&txn).await?;
        txn.commit().await?;

        info!(
            id_reserva = model.id,
            from = old_estado.as_str(),
            to = new_estado.as_str(),
            "Reservation updated"
        );

        let (implementos_asignados, errores_implementos) =
            if old_estado != EstadoReserva::Confirmada && new_estado == EstadoReserva::Confirmada {
                let outcome = self.allocation.allocate_for_reserva(&model).await?;
                (outcome.created, outcome.failures)
            } else {
                (Vec::new(), Vec::new())
            };

        Ok(ReservaOutcome {
            reserva: model,
            implementos_asignados,
            errores_implementos,
        })
    }

    /// Hard-deletes a reservation. Loans are never deleted alongside it, so
    /// a reservation that still has loans cannot be removed.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let db = &*self.db;

        let loans = PrestamoEntity::find()
            .filter(prestamo::Column::IdReserva.eq(id))
            .count(db)
            .await?;
        if loans > 0 {
            return Err(ServiceError::ValidationError(
                "No se puede eliminar una reserva con préstamos asociados".to_string(),
            ));
        }

        let result = ReservaEntity::delete_by_id(id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Reserva no encontrada".to_string()));
        }

        info!(id_reserva = id, "Reservation deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<ReservaDetail, ServiceError> {
        let db = &*self.db;

        let model = ReservaEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Reserva no encontrada".to_string()))?;

        let context = EnrichmentContext::load(db).await?;
        Ok(context.enrich(model))
    }

    /// All reservations, newest date first, enriched with user and price
    /// context the way the admin list renders them.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<ReservaDetail>, ServiceError> {
        let db = &*self.db;

        let models = ReservaEntity::find()
            .order_by_desc(reserva::Column::FechaReserva)
            .order_by_asc(reserva::Column::HoraInicio)
            .all(db)
            .await?;

        let context = EnrichmentContext::load(db).await?;
        Ok(models.into_iter().map(|m| context.enrich(m)).collect())
    }

    /// Occupied slots on a field/date, for the booking form schedule view.
    pub async fn occupied_slots(
        &self,
        id_cancha: i32,
        fecha: NaiveDate,
    ) -> Result<Vec<OccupiedSlot>, ServiceError> {
        self.availability.occupied_slots(id_cancha, fecha).await
    }
}

fn validate_slot(hora_inicio: NaiveTime, hora_fin: NaiveTime) -> Result<(), ServiceError> {
    if hora_inicio >= hora_fin {
        return Err(ServiceError::ValidationError(
            "La hora de inicio debe ser anterior a la hora de fin".to_string(),
        ));
    }
    Ok(())
}

/// Lookup maps for enriching reservations without per-row queries.
struct EnrichmentContext {
    usuarios: HashMap<i32, usuario::Model>,
    canchas: HashMap<i32, cancha::Model>,
    tipos: HashMap<i32, tipo_cancha::Model>,
}

impl EnrichmentContext {
    async fn load(db: &DatabaseConnection) -> Result<Self, ServiceError> {
        let usuarios = UsuarioEntity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();
        let canchas: HashMap<i32, cancha::Model> = CanchaEntity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        let tipos = TipoCanchaEntity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        Ok(Self {
            usuarios,
            canchas,
            tipos,
        })
    }

    fn enrich(&self, model: reserva::Model) -> ReservaDetail {
        let usuario = self.usuarios.get(&model.id_usuario);
        let cancha = self.canchas.get(&model.id_cancha);
        let tipo = cancha.and_then(|c| self.tipos.get(&c.id_tipo));

        let precio_por_hora = tipo.map(|t| t.precio).unwrap_or_default();
        let quote = pricing::quote(model.hora_inicio, model.hora_fin, precio_por_hora);

        ReservaDetail {
            nombre_usuario: usuario.map(|u| u.nombre.clone()),
            telefono_usuario: usuario.and_then(|u| u.telefono.clone()),
            nombre_cancha: cancha.map(|c| c.nombre_cancha.clone()),
            tipo_cancha: tipo.map(|t| t.tipo.clone()),
            precio_total: quote.total,
            recargo_nocturno: quote.recargo_nocturno,
            reserva: model,
        }
    }
}
