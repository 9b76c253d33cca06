//! Single source of truth for reservation pricing.
//!
//! Both the booking price preview and the revenue dashboard go through
//! [`quote`]; the two must never disagree.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::Serialize;

/// Slots touching 18:00 or later pay a 20% night surcharge.
const NIGHT_SURCHARGE_PCT: u32 = 20;

fn night_start() -> NaiveTime {
    NaiveTime::from_hms_opt(18, 0, 0).expect("valid constant time")
}

/// Multiplier applied when the night surcharge is due (1.2).
pub fn night_surcharge_factor() -> Decimal {
    Decimal::ONE + Decimal::from(NIGHT_SURCHARGE_PCT) / Decimal::from(100)
}

/// Duration of the half-open slot [inicio, fin) in fractional hours.
///
/// The caller guarantees `inicio < fin`.
pub fn duration_hours(inicio: NaiveTime, fin: NaiveTime) -> Decimal {
    let minutes = (fin - inicio).num_minutes();
    Decimal::from(minutes) / Decimal::from(60)
}

/// Whether any part of [inicio, fin) falls at or after 18:00.
///
/// Since `inicio < fin`, this reduces to `fin > 18:00`: a slot ending exactly
/// at 18:00 has no minute inside the surcharge window.
pub fn night_surcharge_applies(inicio: NaiveTime, fin: NaiveTime) -> bool {
    debug_assert!(inicio < fin);
    fin > night_start()
}

/// Price breakdown for a slot at a given hourly rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub horas: Decimal,
    pub recargo_nocturno: bool,
    pub total: Decimal,
}

pub fn quote(inicio: NaiveTime, fin: NaiveTime, precio_por_hora: Decimal) -> Quote {
    let horas = duration_hours(inicio, fin);
    let recargo_nocturno = night_surcharge_applies(inicio, fin);
    let mut total = precio_por_hora * horas;
    if recargo_nocturno {
        total *= night_surcharge_factor();
    }
    Quote {
        horas,
        recargo_nocturno,
        total: total.round_dp(2),
    }
}
