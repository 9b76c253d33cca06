//! Equipment allocation: the per-field-type rule table, stock enforcement,
//! partial success, and idempotent re-confirmation.

mod common;

use axum::http::{Method, StatusCode};
use common::{assert_status_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

async fn futbol7_app() -> (TestApp, i32, i32) {
    let app = TestApp::new().await;
    let tipo = app.seed_tipo("Fútbol 7", dec!(35000)).await;
    let cancha = app.seed_cancha("Cancha Sur", tipo).await;
    let usuario = app.seed_usuario("Luis", "luis@golapp.com").await;
    (app, cancha, usuario)
}

fn reserva_payload(cancha: i32, usuario: i32, estado: &str) -> serde_json::Value {
    json!({
        "id_cancha": cancha,
        "id_usuario": usuario,
        "fecha_reserva": "2024-06-01",
        "hora_inicio": "10:00",
        "hora_fin": "11:00",
        "estado": estado
    })
}

#[tokio::test]
async fn confirming_futbol7_allocates_ball_and_seven_vests() {
    let (app, cancha, usuario) = futbol7_app().await;
    app.seed_producto("Balón", 5).await;
    app.seed_producto("Chalecos", 20).await;

    let response = app
        .request(
            Method::POST,
            "/api/reservas",
            Some(reserva_payload(cancha, usuario, "confirmada")),
        )
        .await;
    let body = assert_status_json(response, StatusCode::CREATED).await;

    let asignados = body["implementos_asignados"].as_array().unwrap();
    assert_eq!(asignados.len(), 2);
    assert!(body["errores_implementos"].as_array().unwrap().is_empty());

    let cantidades: Vec<i64> = asignados
        .iter()
        .map(|p| p["cantidad_prestada"].as_i64().unwrap())
        .collect();
    assert!(cantidades.contains(&1), "one ball expected");
    assert!(cantidades.contains(&7), "seven vests expected");

    for prestamo in asignados {
        assert_eq!(prestamo["estado"], "activo");
        assert_eq!(prestamo["id_reserva"].as_i64().unwrap(), body["id"].as_i64().unwrap());
    }
}

#[tokio::test]
async fn pending_reservation_allocates_nothing() {
    let (app, cancha, usuario) = futbol7_app().await;
    app.seed_producto("Balón", 5).await;
    app.seed_producto("Chalecos", 20).await;

    let response = app
        .request(
            Method::POST,
            "/api/reservas",
            Some(reserva_payload(cancha, usuario, "pendiente")),
        )
        .await;
    let body = assert_status_json(response, StatusCode::CREATED).await;
    assert!(body["implementos_asignados"].as_array().unwrap().is_empty());

    let prestamos = app.request(Method::GET, "/api/prestamos", None).await;
    let prestamos = assert_status_json(prestamos, StatusCode::OK).await;
    assert!(prestamos.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn vest_shortage_is_a_warning_not_a_failure() {
    let (app, cancha, usuario) = futbol7_app().await;
    app.seed_producto("Balón", 5).await;
    let chalecos = app.seed_producto("Chalecos", 7).await;

    // A prior reservation already holds 5 of the 7 vests.
    let previa = app
        .request(
            Method::POST,
            "/api/reservas",
            Some(json!({
                "id_cancha": cancha,
                "id_usuario": usuario,
                "fecha_reserva": "2024-05-30",
                "hora_inicio": "08:00",
                "hora_fin": "09:00"
            })),
        )
        .await;
    let previa = assert_status_json(previa, StatusCode::CREATED).await;
    let manual = app
        .request(
            Method::POST,
            "/api/prestamos",
            Some(json!({
                "id_producto": chalecos,
                "cantidad_prestada": 5,
                "id_reserva": previa["id"]
            })),
        )
        .await;
    assert_eq!(manual.status(), StatusCode::CREATED);

    // Confirming a Fútbol 7 booking needs 7 vests but only 2 remain.
    let response = app
        .request(
            Method::POST,
            "/api/reservas",
            Some(reserva_payload(cancha, usuario, "confirmada")),
        )
        .await;
    let body = assert_status_json(response, StatusCode::CREATED).await;

    assert_eq!(body["estado"], "confirmada");

    let asignados = body["implementos_asignados"].as_array().unwrap();
    assert_eq!(asignados.len(), 1, "only the ball should be allocated");
    assert_eq!(asignados[0]["cantidad_prestada"].as_i64().unwrap(), 1);

    let errores = body["errores_implementos"].as_array().unwrap();
    assert_eq!(errores.len(), 1);
    assert_eq!(errores[0]["producto"], "Chalecos");
    assert!(errores[0]["motivo"]
        .as_str()
        .unwrap()
        .contains("disponible=2"));
}

#[tokio::test]
async fn repeated_confirmation_never_duplicates_loans() {
    let (app, cancha, usuario) = futbol7_app().await;
    app.seed_producto("Balón", 5).await;
    app.seed_producto("Chalecos", 20).await;

    let created = app
        .request(
            Method::POST,
            "/api/reservas",
            Some(reserva_payload(cancha, usuario, "confirmada")),
        )
        .await;
    let created = assert_status_json(created, StatusCode::CREATED).await;
    let id = created["id"].as_i64().unwrap();

    // Confirm again via update; the idempotence guard must skip allocation.
    let again = app
        .request(
            Method::PUT,
            &format!("/api/reservas/{}", id),
            Some(json!({"estado": "confirmada"})),
        )
        .await;
    let again = assert_status_json(again, StatusCode::OK).await;
    assert!(again["implementos_asignados"].as_array().unwrap().is_empty());

    let prestamos = app.request(Method::GET, "/api/prestamos", None).await;
    let prestamos = assert_status_json(prestamos, StatusCode::OK).await;
    assert_eq!(prestamos.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_field_type_allocates_nothing() {
    let app = TestApp::new().await;
    let tipo = app.seed_tipo("Entrenamiento", dec!(20000)).await;
    let cancha = app.seed_cancha("Cancha Mixta", tipo).await;
    let usuario = app.seed_usuario("Rita", "rita@golapp.com").await;
    app.seed_producto("Balón", 5).await;
    app.seed_producto("Chalecos", 20).await;

    let response = app
        .request(
            Method::POST,
            "/api/reservas",
            Some(reserva_payload(cancha, usuario, "confirmada")),
        )
        .await;
    let body = assert_status_json(response, StatusCode::CREATED).await;
    assert!(body["implementos_asignados"].as_array().unwrap().is_empty());
    assert!(body["errores_implementos"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn manual_loan_shortage_carries_stock_context() {
    let (app, cancha, usuario) = futbol7_app().await;
    let producto = app.seed_producto("Chalecos", 7).await;

    let reserva = app
        .request(
            Method::POST,
            "/api/reservas",
            Some(reserva_payload(cancha, usuario, "pendiente")),
        )
        .await;
    let reserva = assert_status_json(reserva, StatusCode::CREATED).await;

    let ok = app
        .request(
            Method::POST,
            "/api/prestamos",
            Some(json!({
                "id_producto": producto,
                "cantidad_prestada": 5,
                "id_reserva": reserva["id"]
            })),
        )
        .await;
    assert_eq!(ok.status(), StatusCode::CREATED);

    let rejected = app
        .request(
            Method::POST,
            "/api/prestamos",
            Some(json!({
                "id_producto": producto,
                "cantidad_prestada": 3,
                "id_reserva": reserva["id"]
            })),
        )
        .await;
    let body = assert_status_json(rejected, StatusCode::BAD_REQUEST).await;

    assert_eq!(body["error"], "Stock insuficiente");
    assert_eq!(body["disponible"].as_i64().unwrap(), 2);
    assert_eq!(body["solicitado"].as_i64().unwrap(), 3);
    assert_eq!(body["total"].as_i64().unwrap(), 7);
    assert_eq!(body["prestado"].as_i64().unwrap(), 5);
}

#[tokio::test]
async fn returning_a_loan_releases_stock() {
    let (app, cancha, usuario) = futbol7_app().await;
    let producto = app.seed_producto("Chalecos", 7).await;

    let reserva = app
        .request(
            Method::POST,
            "/api/reservas",
            Some(reserva_payload(cancha, usuario, "pendiente")),
        )
        .await;
    let reserva = assert_status_json(reserva, StatusCode::CREATED).await;

    let prestamo = app
        .request(
            Method::POST,
            "/api/prestamos",
            Some(json!({
                "id_producto": producto,
                "cantidad_prestada": 7,
                "id_reserva": reserva["id"]
            })),
        )
        .await;
    let prestamo = assert_status_json(prestamo, StatusCode::CREATED).await;

    let devuelto = app
        .request(
            Method::PATCH,
            &format!("/api/prestamos/{}/estado", prestamo["id"]),
            Some(json!({"estado": "devuelto"})),
        )
        .await;
    assert_eq!(devuelto.status(), StatusCode::OK);

    let stock = app
        .request(Method::GET, &format!("/api/productos/{}", producto), None)
        .await;
    let stock = assert_status_json(stock, StatusCode::OK).await;
    assert_eq!(stock["cantidad_disponible"].as_i64().unwrap(), 7);
    assert_eq!(stock["cantidad_prestada"].as_i64().unwrap(), 0);
}

#[tokio::test]
async fn invalid_loan_estado_is_rejected() {
    let (app, cancha, usuario) = futbol7_app().await;
    let producto = app.seed_producto("Chalecos", 7).await;

    let reserva = app
        .request(
            Method::POST,
            "/api/reservas",
            Some(reserva_payload(cancha, usuario, "pendiente")),
        )
        .await;
    let reserva = assert_status_json(reserva, StatusCode::CREATED).await;

    let prestamo = app
        .request(
            Method::POST,
            "/api/prestamos",
            Some(json!({
                "id_producto": producto,
                "cantidad_prestada": 1,
                "id_reserva": reserva["id"]
            })),
        )
        .await;
    let prestamo = assert_status_json(prestamo, StatusCode::CREATED).await;

    let rejected = app
        .request(
            Method::PATCH,
            &format!("/api/prestamos/{}/estado", prestamo["id"]),
            Some(json!({"estado": "extraviado"})),
        )
        .await;
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
}
