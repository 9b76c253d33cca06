use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use serde::Deserialize;

use crate::errors::ServiceError;
use crate::handlers::common::{created_response, no_content_response, success_response};
use crate::services::allocation::PrestamoChanges;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePrestamoRequest {
    pub id_producto: i32,
    pub cantidad_prestada: i32,
    pub id_reserva: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePrestamoRequest {
    pub cantidad_prestada: Option<i32>,
    pub estado: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EstadoPrestamoRequest {
    pub estado: String,
}

pub async fn create_prestamo(
    State(state): State<AppState>,
    Json(payload): Json<CreatePrestamoRequest>,
) -> Result<Response, ServiceError> {
    let prestamo = state
        .services
        .allocation
        .create_manual_loan(
            payload.id_reserva,
            payload.id_producto,
            payload.cantidad_prestada,
        )
        .await?;
    Ok(created_response(prestamo))
}

pub async fn list_prestamos(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let prestamos = state.services.allocation.list_loans().await?;
    Ok(success_response(prestamos))
}

pub async fn get_prestamo(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ServiceError> {
    let prestamo = state.services.allocation.get_loan(id).await?;
    Ok(success_response(prestamo))
}

pub async fn update_prestamo(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdatePrestamoRequest>,
) -> Result<Response, ServiceError> {
    let changes = PrestamoChanges {
        cantidad_prestada: payload.cantidad_prestada,
        estado: payload.estado,
    };
    let prestamo = state.services.allocation.update_loan(id, changes).await?;
    Ok(success_response(prestamo))
}

pub async fn update_estado_prestamo(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<EstadoPrestamoRequest>,
) -> Result<Response, ServiceError> {
    let prestamo = state
        .services
        .allocation
        .update_loan_estado(id, &payload.estado)
        .await?;
    Ok(success_response(prestamo))
}

pub async fn estadisticas_prestamos(
    State(state): State<AppState>,
) -> Result<Response, ServiceError> {
    let stats = state.services.allocation.loan_stats().await?;
    Ok(success_response(stats))
}

pub async fn delete_prestamo(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ServiceError> {
    state.services.allocation.delete_loan(id).await?;
    Ok(no_content_response())
}
