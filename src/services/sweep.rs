//! Background reservation status sweep.
//!
//! Runs on a fixed wall-clock interval: promotes stale `pendiente`
//! reservations to `confirmada` after a grace period, and closes
//! `confirmada` reservations whose end time has passed in the facility's
//! local timezone. Each record is processed in isolation; one bad row never
//! blocks the rest of the sweep.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::entities::reserva::{self, Entity as ReservaEntity, EstadoReserva};
use crate::errors::ServiceError;
use crate::services::allocation::AllocationService;

/// Counters from one sweep pass.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SweepOutcome {
    pub pendientes_confirmadas: u64,
    pub confirmadas_finalizadas: u64,
}

/// Whether a confirmed reservation's slot is over at the given local date
/// and time. Past dates always qualify; today's qualify once `hora_fin`
/// is strictly behind the clock.
pub fn has_ended(
    fecha_reserva: NaiveDate,
    hora_fin: NaiveTime,
    today: NaiveDate,
    now_time: NaiveTime,
) -> bool {
    fecha_reserva < today || (fecha_reserva == today && hora_fin < now_time)
}

#[derive(Clone)]
pub struct StatusSweep {
    db: Arc<DatabaseConnection>,
    allocation: AllocationService,
    tz: Tz,
    grace: chrono::Duration,
    interval: Duration,
}

impl StatusSweep {
    pub fn new(
        db: Arc<DatabaseConnection>,
        allocation: AllocationService,
        tz: Tz,
        grace_secs: u64,
        interval_secs: u64,
    ) -> Self {
        Self {
            db,
            allocation,
            tz,
            grace: chrono::Duration::seconds(grace_secs as i64),
            interval: Duration::from_secs(interval_secs.max(1)),
        }
    }

    /// Main loop: one pass immediately on startup, then one per interval.
    pub async fn run(self) {
        info!(
            interval_secs = self.interval.as_secs(),
            tz = %self.tz,
            "Reservation status sweep started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        loop {
            ticker.tick().await;
            match self.run_once(Utc::now()).await {
                Ok(outcome) => {
                    info!(
                        confirmadas = outcome.pendientes_confirmadas,
                        finalizadas = outcome.confirmadas_finalizadas,
                        "Sweep pass completed"
                    );
                }
                Err(e) => {
                    error!(error = %e, "Sweep pass failed");
                }
            }
        }
    }

    /// One sweep pass evaluated against the supplied clock. Taking `now` as
    /// a parameter keeps the transition logic testable without waiting.
    #[instrument(skip(self))]
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<SweepOutcome, ServiceError> {
        let pendientes_confirmadas = self.promote_stale_pending(now).await?;
        let confirmadas_finalizadas = self.finalize_elapsed(now).await?;

        Ok(SweepOutcome {
            pendientes_confirmadas,
            confirmadas_finalizadas,
        })
    }

    /// pendiente → confirmada for reservations created before the grace
    /// cutoff. Each newly confirmed reservation re-enters the (idempotent)
    /// allocation engine, so equipment follows the confirmation no matter
    /// which trigger caused it.
    async fn promote_stale_pending(&self, now: DateTime<Utc>) -> Result<u64, ServiceError> {
        let db = &*self.db;
        let cutoff = now - self.grace;

        let stale = ReservaEntity::find()
            .filter(reserva::Column::Estado.eq(EstadoReserva::Pendiente.as_str()))
            .filter(reserva::Column::CreatedAt.lte(cutoff))
            .all(db)
            .await?;

        let mut promoted = 0u64;
        for model in stale {
            let id = model.id;
            let mut active: reserva::ActiveModel = model.into();
            active.estado = Set(EstadoReserva::Confirmada.as_str().to_string());

            let updated = match active.update(db).await {
                Ok(updated) => {
                    promoted += 1;
                    info!(id_reserva = id, "Auto-confirmed pending reservation");
                    updated
                }
                Err(e) => {
                    warn!(id_reserva = id, error = %e, "Failed to auto-confirm reservation");
                    continue;
                }
            };

            if let Err(e) = self.allocation.allocate_for_reserva(&updated).await {
                warn!(
                    id_reserva = id,
                    error = %e,
                    "Equipment allocation failed after auto-confirmation"
                );
            }
        }

        Ok(promoted)
    }

    /// confirmada → finalizada once the slot's end instant has passed in the
    /// facility timezone.
    async fn finalize_elapsed(&self, now: DateTime<Utc>) -> Result<u64, ServiceError> {
        let db = &*self.db;
        let local = now.with_timezone(&self.tz);
        let today = local.date_naive();
        let now_time = local.time();

        let confirmadas = ReservaEntity::find()
            .filter(reserva::Column::Estado.eq(EstadoReserva::Confirmada.as_str()))
            .all(db)
            .await?;

        let mut finalized = 0u64;
        for model in confirmadas {
            if !has_ended(model.fecha_reserva, model.hora_fin, today, now_time) {
                continue;
            }

            let id = model.id;
            let mut active: reserva::ActiveModel = model.into();
            active.estado = Set(EstadoReserva::Finalizada.as_str().to_string());

            match active.update(db).await {
                Ok(_) => {
                    finalized += 1;
                    info!(id_reserva = id, "Finalized elapsed reservation");
                }
                Err(e) => {
                    warn!(id_reserva = id, error = %e, "Failed to finalize reservation");
                }
            }
        }

        Ok(finalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn past_dates_have_ended() {
        assert!(has_ended(d(2024, 6, 1), t(10, 0), d(2024, 6, 2), t(0, 0)));
    }

    #[test]
    fn future_dates_have_not_ended() {
        assert!(!has_ended(d(2024, 6, 3), t(10, 0), d(2024, 6, 2), t(23, 59)));
    }

    #[test]
    fn today_ends_only_after_hora_fin() {
        let today = d(2024, 6, 2);
        // 18:00 slot at 18:05 local -> over
        assert!(has_ended(today, t(18, 0), today, t(18, 5)));
        // exactly at hora_fin -> not yet (strictly behind the clock)
        assert!(!has_ended(today, t(18, 0), today, t(18, 0)));
        assert!(!has_ended(today, t(18, 0), today, t(17, 55)));
    }
}
