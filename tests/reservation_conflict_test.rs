//! Double-booking protection: overlapping active reservations on the same
//! field and date are rejected with the conflicting slots attached.

mod common;

use axum::http::{Method, StatusCode};
use common::{assert_status_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

async fn seeded_app() -> (TestApp, i32, i32) {
    let app = TestApp::new().await;
    let tipo = app.seed_tipo("Fútbol 7", dec!(35000)).await;
    let cancha = app.seed_cancha("Cancha Norte", tipo).await;
    let usuario = app.seed_usuario("Ana", "ana@golapp.com").await;
    (app, cancha, usuario)
}

#[tokio::test]
async fn overlapping_reservation_is_rejected_with_conflicts() {
    let (app, cancha, usuario) = seeded_app().await;

    let first = app
        .request(
            Method::POST,
            "/api/reservas",
            Some(json!({
                "id_cancha": cancha,
                "id_usuario": usuario,
                "fecha_reserva": "2024-06-01",
                "hora_inicio": "10:00",
                "hora_fin": "11:00",
                "estado": "confirmada"
            })),
        )
        .await;
    let first = assert_status_json(first, StatusCode::CREATED).await;
    let first_id = first["id"].as_i64().unwrap();

    let response = app
        .request(
            Method::POST,
            "/api/reservas",
            Some(json!({
                "id_cancha": cancha,
                "id_usuario": usuario,
                "fecha_reserva": "2024-06-01",
                "hora_inicio": "10:30",
                "hora_fin": "11:30"
            })),
        )
        .await;
    let body = assert_status_json(response, StatusCode::CONFLICT).await;

    let conflictos = body["conflictos"].as_array().unwrap();
    assert_eq!(conflictos.len(), 1);
    assert_eq!(conflictos[0]["id"].as_i64().unwrap(), first_id);
    assert_eq!(conflictos[0]["hora_inicio"], "10:00:00");
    assert_eq!(conflictos[0]["hora_fin"], "11:00:00");
}

#[tokio::test]
async fn back_to_back_slots_do_not_conflict() {
    let (app, cancha, usuario) = seeded_app().await;

    for (inicio, fin) in [("09:00", "10:00"), ("10:00", "11:00")] {
        let response = app
            .request(
                Method::POST,
                "/api/reservas",
                Some(json!({
                    "id_cancha": cancha,
                    "id_usuario": usuario,
                    "fecha_reserva": "2024-06-01",
                    "hora_inicio": inicio,
                    "hora_fin": fin
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}

#[tokio::test]
async fn cancelled_reservation_frees_the_slot() {
    let (app, cancha, usuario) = seeded_app().await;

    let created = app
        .request(
            Method::POST,
            "/api/reservas",
            Some(json!({
                "id_cancha": cancha,
                "id_usuario": usuario,
                "fecha_reserva": "2024-06-01",
                "hora_inicio": "10:00",
                "hora_fin": "11:00"
            })),
        )
        .await;
    let created = assert_status_json(created, StatusCode::CREATED).await;
    let id = created["id"].as_i64().unwrap();

    let cancelled = app
        .request(
            Method::PUT,
            &format!("/api/reservas/{}", id),
            Some(json!({"estado": "cancelada"})),
        )
        .await;
    assert_eq!(cancelled.status(), StatusCode::OK);

    let rebooked = app
        .request(
            Method::POST,
            "/api/reservas",
            Some(json!({
                "id_cancha": cancha,
                "id_usuario": usuario,
                "fecha_reserva": "2024-06-01",
                "hora_inicio": "10:00",
                "hora_fin": "11:00"
            })),
        )
        .await;
    assert_eq!(rebooked.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn editing_a_reservation_does_not_conflict_with_itself() {
    let (app, cancha, usuario) = seeded_app().await;

    let created = app
        .request(
            Method::POST,
            "/api/reservas",
            Some(json!({
                "id_cancha": cancha,
                "id_usuario": usuario,
                "fecha_reserva": "2024-06-01",
                "hora_inicio": "10:00",
                "hora_fin": "11:00"
            })),
        )
        .await;
    let created = assert_status_json(created, StatusCode::CREATED).await;
    let id = created["id"].as_i64().unwrap();

    // Shift within its own window; the only "conflict" is the row itself.
    let updated = app
        .request(
            Method::PUT,
            &format!("/api/reservas/{}", id),
            Some(json!({"hora_inicio": "10:30", "hora_fin": "11:30"})),
        )
        .await;
    assert_eq!(updated.status(), StatusCode::OK);
}

#[tokio::test]
async fn inverted_time_range_is_a_validation_error() {
    let (app, cancha, usuario) = seeded_app().await;

    let response = app
        .request(
            Method::POST,
            "/api/reservas",
            Some(json!({
                "id_cancha": cancha,
                "id_usuario": usuario,
                "fecha_reserva": "2024-06-01",
                "hora_inicio": "11:00",
                "hora_fin": "10:00"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_field_or_user_is_not_found() {
    let (app, cancha, usuario) = seeded_app().await;

    let bad_cancha = app
        .request(
            Method::POST,
            "/api/reservas",
            Some(json!({
                "id_cancha": 9999,
                "id_usuario": usuario,
                "fecha_reserva": "2024-06-01",
                "hora_inicio": "10:00",
                "hora_fin": "11:00"
            })),
        )
        .await;
    assert_eq!(bad_cancha.status(), StatusCode::NOT_FOUND);

    let bad_usuario = app
        .request(
            Method::POST,
            "/api/reservas",
            Some(json!({
                "id_cancha": cancha,
                "id_usuario": 9999,
                "fecha_reserva": "2024-06-01",
                "hora_inicio": "10:00",
                "hora_fin": "11:00"
            })),
        )
        .await;
    assert_eq!(bad_usuario.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn occupied_slots_lists_active_reservations_in_order() {
    let (app, cancha, usuario) = seeded_app().await;

    for (inicio, fin, estado) in [
        ("15:00", "16:00", "confirmada"),
        ("09:00", "10:00", "pendiente"),
    ] {
        let response = app
            .request(
                Method::POST,
                "/api/reservas",
                Some(json!({
                    "id_cancha": cancha,
                    "id_usuario": usuario,
                    "fecha_reserva": "2024-06-01",
                    "hora_inicio": inicio,
                    "hora_fin": fin,
                    "estado": estado
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .request(
            Method::GET,
            &format!(
                "/api/reservas/horarios-ocupados?id_cancha={}&fecha=2024-06-01",
                cancha
            ),
            None,
        )
        .await;
    let body = assert_status_json(response, StatusCode::OK).await;

    assert_eq!(body["cancha_id"].as_i64().unwrap(), cancha as i64);
    let slots = body["horarios_ocupados"].as_array().unwrap();
    assert_eq!(slots.len(), 2);
    // ordered by start time
    assert_eq!(slots[0]["hora_inicio"], "09:00:00");
    assert_eq!(slots[1]["hora_inicio"], "15:00:00");
}

#[tokio::test]
async fn terminal_states_cannot_be_reopened() {
    let (app, cancha, usuario) = seeded_app().await;

    let created = app
        .request(
            Method::POST,
            "/api/reservas",
            Some(json!({
                "id_cancha": cancha,
                "id_usuario": usuario,
                "fecha_reserva": "2024-06-01",
                "hora_inicio": "10:00",
                "hora_fin": "11:00"
            })),
        )
        .await;
    let created = assert_status_json(created, StatusCode::CREATED).await;
    let id = created["id"].as_i64().unwrap();

    let cancelled = app
        .request(
            Method::PUT,
            &format!("/api/reservas/{}", id),
            Some(json!({"estado": "cancelada"})),
        )
        .await;
    assert_eq!(cancelled.status(), StatusCode::OK);

    for estado in ["pendiente", "confirmada", "finalizada"] {
        let reopened = app
            .request(
                Method::PUT,
                &format!("/api/reservas/{}", id),
                Some(json!({"estado": estado})),
            )
            .await;
        assert_eq!(
            reopened.status(),
            StatusCode::BAD_REQUEST,
            "cancelada must absorb transition to {}",
            estado
        );
    }
}
