//! GolApp API Library
//!
//! Core functionality for the GolApp field reservation backend.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod migrator;
pub mod services;

use axum::{
    extract::State,
    response::Json,
    routing::{get, patch, post},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
}

// Common response wrappers
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Full API route table, nested under `/api` by the binary.
///
/// Literal reservation routes (`horarios-ocupados`, `hoy`, ...) are declared
/// before `/reservas/{id}` so the router matches them first.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Status and health endpoints
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        // Reservations API
        .route(
            "/reservas",
            get(handlers::reservas::list_reservas).post(handlers::reservas::create_reserva),
        )
        .route(
            "/reservas/horarios-ocupados",
            get(handlers::reservas::horarios_ocupados),
        )
        .route("/reservas/hoy", get(handlers::reservas::reservas_hoy))
        .route(
            "/reservas/ingresos-mensuales",
            get(handlers::reservas::ingresos_mensuales),
        )
        .route(
            "/reservas/ocupacion-promedio",
            get(handlers::reservas::ocupacion_promedio),
        )
        .route(
            "/reservas/{id}",
            get(handlers::reservas::get_reserva)
                .put(handlers::reservas::update_reserva)
                .delete(handlers::reservas::delete_reserva),
        )
        // Loans API
        .route(
            "/prestamos",
            get(handlers::prestamos::list_prestamos).post(handlers::prestamos::create_prestamo),
        )
        .route(
            "/prestamos/estadisticas",
            get(handlers::prestamos::estadisticas_prestamos),
        )
        .route(
            "/prestamos/{id}",
            get(handlers::prestamos::get_prestamo)
                .put(handlers::prestamos::update_prestamo)
                .delete(handlers::prestamos::delete_prestamo),
        )
        .route(
            "/prestamos/{id}/estado",
            patch(handlers::prestamos::update_estado_prestamo),
        )
        // Fields API
        .route(
            "/canchas",
            get(handlers::canchas::list_canchas).post(handlers::canchas::create_cancha),
        )
        .route(
            "/canchas/{id}",
            get(handlers::canchas::get_cancha)
                .put(handlers::canchas::update_cancha)
                .delete(handlers::canchas::delete_cancha),
        )
        // Field types API
        .route(
            "/tipocanchas",
            get(handlers::tipo_canchas::list_tipo_canchas)
                .post(handlers::tipo_canchas::create_tipo_cancha),
        )
        .route(
            "/tipocanchas/{id}",
            get(handlers::tipo_canchas::get_tipo_cancha)
                .put(handlers::tipo_canchas::update_tipo_cancha)
                .delete(handlers::tipo_canchas::delete_tipo_cancha),
        )
        // Equipment API
        .route(
            "/productos",
            get(handlers::productos::list_productos).post(handlers::productos::create_producto),
        )
        .route(
            "/productos/{id}",
            get(handlers::productos::get_producto)
                .put(handlers::productos::update_producto)
                .delete(handlers::productos::delete_producto),
        )
        // Users API
        .route(
            "/usuarios",
            get(handlers::usuarios::list_usuarios).post(handlers::usuarios::create_usuario),
        )
        .route("/usuarios/login", post(handlers::usuarios::login))
        .route(
            "/usuarios/{id}",
            get(handlers::usuarios::get_usuario)
                .put(handlers::usuarios::update_usuario)
                .delete(handlers::usuarios::delete_usuario),
        )
        // Rates API
        .route(
            "/tarifas",
            get(handlers::tarifas::list_tarifas).post(handlers::tarifas::create_tarifa),
        )
        .route(
            "/tarifas/{id}",
            get(handlers::tarifas::get_tarifa)
                .put(handlers::tarifas::update_tarifa)
                .delete(handlers::tarifas::delete_tarifa),
        )
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let version = env!("CARGO_PKG_VERSION");
    let status_data = json!({
        "status": "ok",
        "version": version,
        "service": "golapp-api",
        "timestamp": Utc::now().to_rfc3339(),
        "environment": std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}
