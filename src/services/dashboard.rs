//! Read-side dashboard metrics. Every figure is recomputed from the store on
//! each request; nothing is cached in memory.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Serialize;
use tracing::instrument;

use crate::entities::cancha::{self, Entity as CanchaEntity, EstadoCancha};
use crate::entities::reserva::{self, Entity as ReservaEntity, EstadoReserva};
use crate::entities::tipo_cancha::{self, Entity as TipoCanchaEntity};
use crate::errors::ServiceError;
use crate::services::pricing;

/// Revenue counts reservations in these states.
const REVENUE_STATES: [&str; 2] = ["confirmada", "finalizada"];

/// Today's reservations bucketed by estado.
#[derive(Debug, Default, Serialize)]
pub struct ReservasHoy {
    pub fecha: NaiveDate,
    pub total: u64,
    pub pendientes: u64,
    pub confirmadas: u64,
    pub canceladas: u64,
    pub finalizadas: u64,
}

#[derive(Debug, Serialize)]
pub struct IngresosMensuales {
    pub mes: u32,
    pub anio: i32,
    pub ingresos: Decimal,
    pub ingresos_mes_anterior: Decimal,
    /// Percent growth against the prior month; 0 when the prior month had no
    /// revenue.
    pub crecimiento_porcentaje: Decimal,
}

#[derive(Debug, Serialize)]
pub struct OcupacionPromedio {
    pub dias: u32,
    pub canchas_activas: u64,
    pub horas_ocupadas: Decimal,
    pub porcentaje: Decimal,
}

/// First day of the month and first day of the following month, i.e. the
/// half-open range [start, end).
fn month_range(anio: i32, mes: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(anio, mes, 1)?;
    let end = if mes == 12 {
        NaiveDate::from_ymd_opt(anio + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(anio, mes + 1, 1)?
    };
    Some((start, end))
}

/// The month preceding (anio, mes).
fn prior_month(anio: i32, mes: u32) -> (i32, u32) {
    if mes == 1 {
        (anio - 1, 12)
    } else {
        (anio, mes - 1)
    }
}

#[derive(Clone)]
pub struct DashboardService {
    db: Arc<DatabaseConnection>,
    tz: Tz,
    hours_per_day: u32,
}

impl DashboardService {
    pub fn new(db: Arc<DatabaseConnection>, tz: Tz, hours_per_day: u32) -> Self {
        Self {
            db,
            tz,
            hours_per_day,
        }
    }

    /// The facility-local date for a given instant.
    pub fn local_today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.tz).date_naive()
    }

    #[instrument(skip(self))]
    pub async fn reservas_hoy(&self, now: DateTime<Utc>) -> Result<ReservasHoy, ServiceError> {
        let db = &*self.db;
        let today = self.local_today(now);

        let reservas = ReservaEntity::find()
            .filter(reserva::Column::FechaReserva.eq(today))
            .all(db)
            .await?;

        let mut stats = ReservasHoy {
            fecha: today,
            ..Default::default()
        };
        for r in &reservas {
            stats.total += 1;
            match EstadoReserva::from_str(&r.estado) {
                Some(EstadoReserva::Pendiente) => stats.pendientes += 1,
                Some(EstadoReserva::Confirmada) => stats.confirmadas += 1,
                Some(EstadoReserva::Cancelada) => stats.canceladas += 1,
                Some(EstadoReserva::Finalizada) => stats.finalizadas += 1,
                None => {}
            }
        }

        Ok(stats)
    }

    #[instrument(skip(self))]
    pub async fn ingresos_mensuales(
        &self,
        mes: u32,
        anio: i32,
    ) -> Result<IngresosMensuales, ServiceError> {
        if !(1..=12).contains(&mes) {
            return Err(ServiceError::ValidationError(
                "El mes debe estar entre 1 y 12".to_string(),
            ));
        }

        let ingresos = self.revenue_for_month(anio, mes).await?;
        let (prev_anio, prev_mes) = prior_month(anio, mes);
        let ingresos_mes_anterior = self.revenue_for_month(prev_anio, prev_mes).await?;

        let crecimiento_porcentaje = if ingresos_mes_anterior.is_zero() {
            Decimal::ZERO
        } else {
            ((ingresos - ingresos_mes_anterior) / ingresos_mes_anterior * Decimal::from(100))
                .round_dp(2)
        };

        Ok(IngresosMensuales {
            mes,
            anio,
            ingresos,
            ingresos_mes_anterior,
            crecimiento_porcentaje,
        })
    }

    async fn revenue_for_month(&self, anio: i32, mes: u32) -> Result<Decimal, ServiceError> {
        let db = &*self.db;
        let (start, end) = month_range(anio, mes).ok_or_else(|| {
            ServiceError::ValidationError(format!("Mes inválido: {}/{}", mes, anio))
        })?;

        let reservas = ReservaEntity::find()
            .filter(reserva::Column::Estado.is_in(REVENUE_STATES))
            .filter(reserva::Column::FechaReserva.gte(start))
            .filter(reserva::Column::FechaReserva.lt(end))
            .all(db)
            .await?;

        let precios = self.precio_por_cancha().await?;

        let total = reservas.iter().fold(Decimal::ZERO, |acc, r| {
            let precio = precios.get(&r.id_cancha).copied().unwrap_or_default();
            acc + pricing::quote(r.hora_inicio, r.hora_fin, precio).total
        });

        Ok(total)
    }

    /// Occupancy over the trailing `dias` days ending today (inclusive):
    /// occupied hours over the bookable capacity of the active fields.
    #[instrument(skip(self))]
    pub async fn ocupacion_promedio(
        &self,
        dias: u32,
        now: DateTime<Utc>,
    ) -> Result<OcupacionPromedio, ServiceError> {
        if dias == 0 {
            return Err(ServiceError::ValidationError(
                "La ventana de días debe ser mayor a 0".to_string(),
            ));
        }

        let db = &*self.db;
        let today = self.local_today(now);
        let start = today - chrono::Duration::days(dias as i64 - 1);

        let reservas = ReservaEntity::find()
            .filter(reserva::Column::Estado.is_in(REVENUE_STATES))
            .filter(reserva::Column::FechaReserva.gte(start))
            .filter(reserva::Column::FechaReserva.lte(today))
            .all(db)
            .await?;

        let horas_ocupadas = reservas.iter().fold(Decimal::ZERO, |acc, r| {
            acc + pricing::duration_hours(r.hora_inicio, r.hora_fin)
        });

        let canchas_activas = CanchaEntity::find()
            .filter(cancha::Column::Estado.eq(EstadoCancha::Disponible.as_str()))
            .all(db)
            .await?
            .len() as u64;

        let capacidad =
            Decimal::from(canchas_activas) * Decimal::from(self.hours_per_day) * Decimal::from(dias);
        let porcentaje = if capacidad.is_zero() {
            Decimal::ZERO
        } else {
            (horas_ocupadas / capacidad * Decimal::from(100)).round_dp(2)
        };

        Ok(OcupacionPromedio {
            dias,
            canchas_activas,
            horas_ocupadas,
            porcentaje,
        })
    }

    /// Maps cancha id → hourly price of its type.
    async fn precio_por_cancha(&self) -> Result<HashMap<i32, Decimal>, ServiceError> {
        let db = &*self.db;

        let tipos: HashMap<i32, tipo_cancha::Model> = TipoCanchaEntity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        let canchas = CanchaEntity::find().all(db).await?;

        Ok(canchas
            .into_iter()
            .map(|c| {
                let precio = tipos.get(&c.id_tipo).map(|t| t.precio).unwrap_or_default();
                (c.id, precio)
            })
            .collect())
    }

    /// The current (mes, anio) in the facility timezone, used when the
    /// caller does not pin a month.
    pub fn current_month(&self, now: DateTime<Utc>) -> (u32, i32) {
        let local = now.with_timezone(&self.tz);
        (local.month(), local.year())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_range_is_half_open() {
        let (start, end) = month_range(2024, 6).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
    }

    #[test]
    fn december_rolls_into_next_year() {
        let (start, end) = month_range(2024, 12).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }

    #[test]
    fn prior_month_rolls_back_over_january() {
        assert_eq!(prior_month(2024, 1), (2023, 12));
        assert_eq!(prior_month(2024, 6), (2024, 5));
    }
}
