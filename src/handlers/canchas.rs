use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::entities::cancha::EstadoCancha;
use crate::errors::ServiceError;
use crate::handlers::common::{
    created_response, no_content_response, parse_hora_opt, success_response, validate_input,
};
use crate::services::canchas::{CanchaChanges, NewCancha};
use crate::AppState;

fn parse_estado(raw: &str) -> Result<EstadoCancha, ServiceError> {
    EstadoCancha::from_str(raw).ok_or_else(|| {
        ServiceError::InvalidStatus(format!(
            "Estado inválido: {}. Estados válidos: disponible, mantenimiento, ocupada, no_disponible",
            raw
        ))
    })
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCanchaRequest {
    #[validate(length(min = 1))]
    pub nombre_cancha: String,
    pub estado: Option<String>,
    pub id_tipo: i32,
    pub ubicacion: Option<String>,
    pub capacidad: Option<i32>,
    pub hora_apertura: Option<String>,
    pub hora_cierre: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCanchaRequest {
    pub nombre_cancha: Option<String>,
    pub estado: Option<String>,
    pub id_tipo: Option<i32>,
    pub ubicacion: Option<String>,
    pub capacidad: Option<i32>,
    pub hora_apertura: Option<String>,
    pub hora_cierre: Option<String>,
}

pub async fn create_cancha(
    State(state): State<AppState>,
    Json(payload): Json<CreateCanchaRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;

    let estado = match payload.estado.as_deref() {
        Some(raw) => parse_estado(raw)?,
        None => EstadoCancha::Disponible,
    };

    let nueva = NewCancha {
        nombre_cancha: payload.nombre_cancha,
        estado,
        id_tipo: payload.id_tipo,
        ubicacion: payload.ubicacion,
        capacidad: payload.capacidad,
        hora_apertura: parse_hora_opt(payload.hora_apertura.as_deref())?,
        hora_cierre: parse_hora_opt(payload.hora_cierre.as_deref())?,
    };

    let cancha = state.services.canchas.create(nueva).await?;
    Ok(created_response(cancha))
}

pub async fn list_canchas(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let canchas = state.services.canchas.list().await?;
    Ok(success_response(canchas))
}

pub async fn get_cancha(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ServiceError> {
    let cancha = state.services.canchas.get(id).await?;
    Ok(success_response(cancha))
}

pub async fn update_cancha(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCanchaRequest>,
) -> Result<Response, ServiceError> {
    let estado = payload.estado.as_deref().map(parse_estado).transpose()?;

    let changes = CanchaChanges {
        nombre_cancha: payload.nombre_cancha,
        estado,
        id_tipo: payload.id_tipo,
        ubicacion: payload.ubicacion.map(Some),
        capacidad: payload.capacidad.map(Some),
        hora_apertura: parse_hora_opt(payload.hora_apertura.as_deref())?.map(Some),
        hora_cierre: parse_hora_opt(payload.hora_cierre.as_deref())?.map(Some),
    };

    let cancha = state.services.canchas.update(id, changes).await?;
    Ok(success_response(cancha))
}

pub async fn delete_cancha(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ServiceError> {
    state.services.canchas.delete(id).await?;
    Ok(no_content_response())
}
