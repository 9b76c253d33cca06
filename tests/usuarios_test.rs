//! User management: hashed credentials, login verification, and the password
//! never leaking through the API.

mod common;

use axum::http::{Method, StatusCode};
use common::{assert_status_json, TestApp};
use serde_json::json;

#[tokio::test]
async fn register_then_login() {
    let app = TestApp::new().await;

    let created = app
        .request(
            Method::POST,
            "/api/usuarios",
            Some(json!({
                "nombre": "Carlos",
                "correo": "carlos@golapp.com",
                "contrasena": "secreto123",
                "rol": "administrador",
                "telefono": "3000000000"
            })),
        )
        .await;
    let created = assert_status_json(created, StatusCode::CREATED).await;
    assert_eq!(created["rol"], "administrador");
    assert!(
        created.get("contrasena").is_none(),
        "password hash must never be serialized"
    );

    let login = app
        .request(
            Method::POST,
            "/api/usuarios/login",
            Some(json!({
                "correo": "carlos@golapp.com",
                "contrasena": "secreto123"
            })),
        )
        .await;
    let login = assert_status_json(login, StatusCode::OK).await;
    assert_eq!(login["nombre"], "Carlos");
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = TestApp::new().await;
    app.seed_usuario("Eva", "eva@golapp.com").await;

    let login = app
        .request(
            Method::POST,
            "/api/usuarios/login",
            Some(json!({
                "correo": "eva@golapp.com",
                "contrasena": "incorrecta"
            })),
        )
        .await;
    assert_eq!(login.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_user_is_unauthorized_too() {
    let app = TestApp::new().await;

    let login = app
        .request(
            Method::POST,
            "/api/usuarios/login",
            Some(json!({
                "correo": "nadie@golapp.com",
                "contrasena": "loquesea"
            })),
        )
        .await;
    assert_eq!(login.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let app = TestApp::new().await;
    app.seed_usuario("Eva", "eva@golapp.com").await;

    let duplicated = app
        .request(
            Method::POST,
            "/api/usuarios",
            Some(json!({
                "nombre": "Eva II",
                "correo": "eva@golapp.com",
                "contrasena": "secreto123"
            })),
        )
        .await;
    assert_eq!(duplicated.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn listing_users_hides_password_hashes() {
    let app = TestApp::new().await;
    app.seed_usuario("Eva", "eva@golapp.com").await;

    let response = app.request(Method::GET, "/api/usuarios", None).await;
    let body = assert_status_json(response, StatusCode::OK).await;
    let usuarios = body.as_array().unwrap();
    assert_eq!(usuarios.len(), 1);
    assert!(usuarios[0].get("contrasena").is_none());
}

#[tokio::test]
async fn short_password_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/usuarios",
            Some(json!({
                "nombre": "Breve",
                "correo": "breve@golapp.com",
                "contrasena": "abc"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
