use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::errors::ServiceError;
use crate::handlers::common::{
    created_response, no_content_response, parse_hora, parse_hora_opt, success_response,
};
use crate::services::tarifas::NewTarifa;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTarifaRequest {
    pub id_cancha: i32,
    pub precio: Decimal,
    pub hora_inicio: String,
    pub hora_fin: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTarifaRequest {
    pub precio: Option<Decimal>,
    pub hora_inicio: Option<String>,
    pub hora_fin: Option<String>,
}

pub async fn create_tarifa(
    State(state): State<AppState>,
    Json(payload): Json<CreateTarifaRequest>,
) -> Result<Response, ServiceError> {
    let tarifa = state
        .services
        .tarifas
        .create(NewTarifa {
            id_cancha: payload.id_cancha,
            precio: payload.precio,
            hora_inicio: parse_hora(&payload.hora_inicio)?,
            hora_fin: parse_hora(&payload.hora_fin)?,
        })
        .await?;
    Ok(created_response(tarifa))
}

pub async fn list_tarifas(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let tarifas = state.services.tarifas.list().await?;
    Ok(success_response(tarifas))
}

pub async fn get_tarifa(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ServiceError> {
    let tarifa = state.services.tarifas.get(id).await?;
    Ok(success_response(tarifa))
}

pub async fn update_tarifa(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateTarifaRequest>,
) -> Result<Response, ServiceError> {
    let tarifa = state
        .services
        .tarifas
        .update(
            id,
            payload.precio,
            parse_hora_opt(payload.hora_inicio.as_deref())?,
            parse_hora_opt(payload.hora_fin.as_deref())?,
        )
        .await?;
    Ok(success_response(tarifa))
}

pub async fn delete_tarifa(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ServiceError> {
    state.services.tarifas.delete(id).await?;
    Ok(no_content_response())
}
