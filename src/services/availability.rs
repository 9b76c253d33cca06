//! Conflict detection for reservation time slots.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use tracing::instrument;

use crate::entities::reserva::{self, Entity as ReservaEntity, EstadoReserva};
use crate::errors::{OccupiedSlot, ServiceError};

/// Half-open interval overlap: [s, e) collides with [s2, e2) iff
/// `s < e2 && s2 < e`. Back-to-back slots (e == s2) do not collide.
pub fn overlaps(s: NaiveTime, e: NaiveTime, s2: NaiveTime, e2: NaiveTime) -> bool {
    s < e2 && s2 < e
}

impl From<&reserva::Model> for OccupiedSlot {
    fn from(model: &reserva::Model) -> Self {
        Self {
            id: model.id,
            fecha_reserva: model.fecha_reserva,
            hora_inicio: model.hora_inicio,
            hora_fin: model.hora_fin,
            estado: model.estado.clone(),
        }
    }
}

/// Read-only checker for overlapping bookings on a field/date.
#[derive(Clone)]
pub struct AvailabilityService {
    db: Arc<DatabaseConnection>,
}

impl AvailabilityService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Returns the active reservations on (cancha, fecha) whose slots overlap
    /// the candidate [hora_inicio, hora_fin). Empty result means the slot is
    /// free. Runs on the shared pool; use [`find_conflicts_on`] inside a
    /// transaction.
    #[instrument(skip(self))]
    pub async fn find_conflicts(
        &self,
        id_cancha: i32,
        fecha: NaiveDate,
        hora_inicio: NaiveTime,
        hora_fin: NaiveTime,
        exclude_reserva: Option<i32>,
    ) -> Result<Vec<reserva::Model>, ServiceError> {
        find_conflicts_on(
            &*self.db,
            id_cancha,
            fecha,
            hora_inicio,
            hora_fin,
            exclude_reserva,
        )
        .await
    }

    /// All active slots on (cancha, fecha), ordered by start time. Feeds the
    /// schedule view the booking form renders.
    #[instrument(skip(self))]
    pub async fn occupied_slots(
        &self,
        id_cancha: i32,
        fecha: NaiveDate,
    ) -> Result<Vec<OccupiedSlot>, ServiceError> {
        let reservas = ReservaEntity::find()
            .filter(reserva::Column::IdCancha.eq(id_cancha))
            .filter(reserva::Column::FechaReserva.eq(fecha))
            .filter(reserva::Column::Estado.is_in(EstadoReserva::ACTIVE))
            .order_by_asc(reserva::Column::HoraInicio)
            .all(&*self.db)
            .await?;

        Ok(reservas.iter().map(OccupiedSlot::from).collect())
    }
}

/// Transaction-aware variant of the conflict scan: the reservation service
/// runs this on the same transaction that inserts the row, closing the
/// check-then-insert race between concurrent booking requests.
pub async fn find_conflicts_on<C: ConnectionTrait>(
    conn: &C,
    id_cancha: i32,
    fecha: NaiveDate,
    hora_inicio: NaiveTime,
    hora_fin: NaiveTime,
    exclude_reserva: Option<i32>,
) -> Result<Vec<reserva::Model>, ServiceError> {
    let mut query = ReservaEntity::find()
        .filter(reserva::Column::IdCancha.eq(id_cancha))
        .filter(reserva::Column::FechaReserva.eq(fecha))
        .filter(reserva::Column::Estado.is_in(EstadoReserva::ACTIVE));

    if let Some(id) = exclude_reserva {
        query = query.filter(reserva::Column::Id.ne(id));
    }

    let candidates = query.all(conn).await?;

    Ok(candidates
        .into_iter()
        .filter(|r| overlaps(hora_inicio, hora_fin, r.hora_inicio, r.hora_fin))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn overlapping_intervals_conflict() {
        assert!(overlaps(t(10, 0), t(11, 0), t(10, 30), t(11, 30)));
        assert!(overlaps(t(10, 30), t(11, 30), t(10, 0), t(11, 0)));
        // containment
        assert!(overlaps(t(10, 0), t(12, 0), t(10, 30), t(11, 0)));
        // identical
        assert!(overlaps(t(10, 0), t(11, 0), t(10, 0), t(11, 0)));
    }

    #[test]
    fn touching_intervals_do_not_conflict() {
        assert!(!overlaps(t(9, 0), t(10, 0), t(10, 0), t(11, 0)));
        assert!(!overlaps(t(10, 0), t(11, 0), t(9, 0), t(10, 0)));
    }

    #[test]
    fn disjoint_intervals_do_not_conflict() {
        assert!(!overlaps(t(8, 0), t(9, 0), t(15, 0), t(16, 0)));
    }
}
