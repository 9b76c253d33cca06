//! Dashboard aggregations: daily buckets, monthly revenue with growth, and
//! average occupancy. Figures are recomputed from the store on every call.

mod common;

use axum::http::{Method, StatusCode};
use chrono::{DateTime, Utc};
use common::{assert_status_json, TestApp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::str::FromStr;

fn as_decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("decimal number"),
        other => panic!("not a decimal value: {:?}", other),
    }
}

async fn seeded_app() -> (TestApp, i32, i32) {
    let app = TestApp::new().await;
    let tipo = app.seed_tipo("Fútbol 7", dec!(35000)).await;
    let cancha = app.seed_cancha("Cancha Norte", tipo).await;
    let usuario = app.seed_usuario("Ana", "ana@golapp.com").await;
    (app, cancha, usuario)
}

async fn create_reserva(
    app: &TestApp,
    cancha: i32,
    usuario: i32,
    fecha: &str,
    inicio: &str,
    fin: &str,
    estado: &str,
) {
    let response = app
        .request(
            Method::POST,
            "/api/reservas",
            Some(json!({
                "id_cancha": cancha,
                "id_usuario": usuario,
                "fecha_reserva": fecha,
                "hora_inicio": inicio,
                "hora_fin": fin,
                "estado": estado
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn monthly_revenue_applies_night_surcharge_and_growth() {
    let (app, cancha, usuario) = seeded_app().await;

    // June: one daytime hour (35,000) and one hour crossing 18:00
    // (35,000 * 1.2 = 42,000). The pending booking earns nothing.
    create_reserva(&app, cancha, usuario, "2024-06-01", "10:00", "11:00", "confirmada").await;
    create_reserva(&app, cancha, usuario, "2024-06-02", "17:30", "18:30", "finalizada").await;
    create_reserva(&app, cancha, usuario, "2024-06-03", "10:00", "11:00", "pendiente").await;

    // May: a single daytime hour.
    create_reserva(&app, cancha, usuario, "2024-05-10", "10:00", "11:00", "finalizada").await;

    let response = app
        .request(
            Method::GET,
            "/api/reservas/ingresos-mensuales?mes=6&anio=2024",
            None,
        )
        .await;
    let body = assert_status_json(response, StatusCode::OK).await;

    assert_eq!(body["mes"].as_u64().unwrap(), 6);
    assert_eq!(as_decimal(&body["ingresos"]), dec!(77000));
    assert_eq!(as_decimal(&body["ingresos_mes_anterior"]), dec!(35000));
    // (77000 - 35000) / 35000 * 100 = 120%
    assert_eq!(as_decimal(&body["crecimiento_porcentaje"]), dec!(120));
}

#[tokio::test]
async fn growth_is_zero_when_prior_month_is_empty() {
    let (app, cancha, usuario) = seeded_app().await;

    create_reserva(&app, cancha, usuario, "2024-06-01", "10:00", "11:00", "confirmada").await;

    let response = app
        .request(
            Method::GET,
            "/api/reservas/ingresos-mensuales?mes=6&anio=2024",
            None,
        )
        .await;
    let body = assert_status_json(response, StatusCode::OK).await;

    assert_eq!(as_decimal(&body["ingresos"]), dec!(35000));
    assert_eq!(as_decimal(&body["ingresos_mes_anterior"]), dec!(0));
    assert_eq!(as_decimal(&body["crecimiento_porcentaje"]), dec!(0));
}

#[tokio::test]
async fn invalid_month_is_rejected() {
    let (app, _, _) = seeded_app().await;

    let response = app
        .request(
            Method::GET,
            "/api/reservas/ingresos-mensuales?mes=13&anio=2024",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn occupancy_over_trailing_week() {
    let (app, cancha, usuario) = seeded_app().await;

    // 2024-06-07 noon UTC is 07:00 in Bogota; "today" is 2024-06-07 and the
    // 7-day window starts 2024-06-01.
    let now = "2024-06-07T12:00:00Z".parse::<DateTime<Utc>>().unwrap();

    // 3 occupied hours inside the window; states outside {confirmada,
    // finalizada} and dates outside the window do not count.
    create_reserva(&app, cancha, usuario, "2024-06-01", "10:00", "11:00", "confirmada").await;
    create_reserva(&app, cancha, usuario, "2024-06-03", "10:00", "12:00", "finalizada").await;
    create_reserva(&app, cancha, usuario, "2024-06-04", "10:00", "11:00", "cancelada").await;
    create_reserva(&app, cancha, usuario, "2024-05-20", "10:00", "11:00", "confirmada").await;

    let ocupacion = app
        .state
        .services
        .dashboard
        .ocupacion_promedio(7, now)
        .await
        .unwrap();

    assert_eq!(ocupacion.canchas_activas, 1);
    assert_eq!(ocupacion.horas_ocupadas, dec!(3));
    // 3 / (1 field * 12 hours * 7 days) * 100 = 3.57%
    assert_eq!(ocupacion.porcentaje, dec!(3.57));
}

#[tokio::test]
async fn occupancy_is_zero_without_active_fields() {
    let app = TestApp::new().await;

    let now = "2024-06-07T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
    let ocupacion = app
        .state
        .services
        .dashboard
        .ocupacion_promedio(7, now)
        .await
        .unwrap();

    assert_eq!(ocupacion.canchas_activas, 0);
    assert_eq!(ocupacion.porcentaje, dec!(0));
}

#[tokio::test]
async fn todays_reservations_are_bucketed_by_estado() {
    let (app, cancha, usuario) = seeded_app().await;

    let now = "2024-06-07T12:00:00Z".parse::<DateTime<Utc>>().unwrap();

    create_reserva(&app, cancha, usuario, "2024-06-07", "08:00", "09:00", "pendiente").await;
    create_reserva(&app, cancha, usuario, "2024-06-07", "09:00", "10:00", "confirmada").await;
    create_reserva(&app, cancha, usuario, "2024-06-07", "10:00", "11:00", "confirmada").await;
    // Different day: not today's business.
    create_reserva(&app, cancha, usuario, "2024-06-06", "10:00", "11:00", "confirmada").await;

    let hoy = app
        .state
        .services
        .dashboard
        .reservas_hoy(now)
        .await
        .unwrap();

    assert_eq!(hoy.total, 3);
    assert_eq!(hoy.pendientes, 1);
    assert_eq!(hoy.confirmadas, 2);
    assert_eq!(hoy.canceladas, 0);
    assert_eq!(hoy.finalizadas, 0);
}

#[tokio::test]
async fn reservation_detail_is_enriched_with_price_and_owner() {
    let (app, cancha, usuario) = seeded_app().await;

    let created = app
        .request(
            Method::POST,
            "/api/reservas",
            Some(json!({
                "id_cancha": cancha,
                "id_usuario": usuario,
                "fecha_reserva": "2024-06-01",
                "hora_inicio": "17:30",
                "hora_fin": "18:30"
            })),
        )
        .await;
    let created = assert_status_json(created, StatusCode::CREATED).await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/reservas/{}", created["id"]),
            None,
        )
        .await;
    let body = assert_status_json(response, StatusCode::OK).await;

    assert_eq!(body["nombre_usuario"], "Ana");
    assert_eq!(body["nombre_cancha"], "Cancha Norte");
    assert_eq!(body["tipo_cancha"], "Fútbol 7");
    assert_eq!(body["recargo_nocturno"], true);
    assert_eq!(as_decimal(&body["precio_total"]), dec!(42000));
}
