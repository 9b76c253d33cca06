use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::errors::ServiceError;
use crate::handlers::common::{
    created_response, no_content_response, success_response, validate_input,
};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTipoCanchaRequest {
    #[validate(length(min = 1))]
    pub tipo: String,
    pub precio: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTipoCanchaRequest {
    pub tipo: Option<String>,
    pub precio: Option<Decimal>,
}

pub async fn create_tipo_cancha(
    State(state): State<AppState>,
    Json(payload): Json<CreateTipoCanchaRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let tipo = state
        .services
        .tipo_canchas
        .create(payload.tipo, payload.precio)
        .await?;
    Ok(created_response(tipo))
}

pub async fn list_tipo_canchas(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let tipos = state.services.tipo_canchas.list().await?;
    Ok(success_response(tipos))
}

pub async fn get_tipo_cancha(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ServiceError> {
    let tipo = state.services.tipo_canchas.get(id).await?;
    Ok(success_response(tipo))
}

pub async fn update_tipo_cancha(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateTipoCanchaRequest>,
) -> Result<Response, ServiceError> {
    let tipo = state
        .services
        .tipo_canchas
        .update(id, payload.tipo, payload.precio)
        .await?;
    Ok(success_response(tipo))
}

pub async fn delete_tipo_cancha(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ServiceError> {
    state.services.tipo_canchas.delete(id).await?;
    Ok(no_content_response())
}
