use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::entities::reserva::EstadoReserva;
use crate::errors::ServiceError;
use crate::handlers::common::{
    created_response, no_content_response, parse_hora, parse_hora_opt, success_response,
    validate_input,
};
use crate::services::reservations::{NewReserva, ReservaChanges};
use crate::AppState;

fn parse_estado(raw: &str) -> Result<EstadoReserva, ServiceError> {
    EstadoReserva::from_str(raw).ok_or_else(|| {
        ServiceError::InvalidStatus(format!(
            "Estado inválido: {}. Estados válidos: pendiente, confirmada, cancelada, finalizada",
            raw
        ))
    })
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReservaRequest {
    pub id_cancha: i32,
    pub id_usuario: i32,
    pub fecha_reserva: NaiveDate,
    #[validate(length(min = 1))]
    pub hora_inicio: String,
    #[validate(length(min = 1))]
    pub hora_fin: String,
    pub estado: Option<String>,
    pub observaciones: Option<String>,
    pub telefono_cliente: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateReservaRequest {
    pub id_cancha: Option<i32>,
    pub id_usuario: Option<i32>,
    pub fecha_reserva: Option<NaiveDate>,
    pub hora_inicio: Option<String>,
    pub hora_fin: Option<String>,
    pub estado: Option<String>,
    pub observaciones: Option<String>,
    pub telefono_cliente: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HorariosOcupadosQuery {
    pub id_cancha: i32,
    pub fecha: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct IngresosQuery {
    pub mes: Option<u32>,
    pub anio: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct OcupacionQuery {
    pub dias: Option<u32>,
}

pub async fn create_reserva(
    State(state): State<AppState>,
    Json(payload): Json<CreateReservaRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;

    let estado = match payload.estado.as_deref() {
        Some(raw) => parse_estado(raw)?,
        None => EstadoReserva::Pendiente,
    };

    let nueva = NewReserva {
        id_cancha: payload.id_cancha,
        id_usuario: payload.id_usuario,
        fecha_reserva: payload.fecha_reserva,
        hora_inicio: parse_hora(&payload.hora_inicio)?,
        hora_fin: parse_hora(&payload.hora_fin)?,
        estado,
        observaciones: payload.observaciones,
        telefono_cliente: payload.telefono_cliente,
    };

    let outcome = state.services.reservations.create(nueva).await?;
    Ok(created_response(outcome))
}

pub async fn update_reserva(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateReservaRequest>,
) -> Result<Response, ServiceError> {
    let estado = payload.estado.as_deref().map(parse_estado).transpose()?;

    let changes = ReservaChanges {
        id_cancha: payload.id_cancha,
        id_usuario: payload.id_usuario,
        fecha_reserva: payload.fecha_reserva,
        hora_inicio: parse_hora_opt(payload.hora_inicio.as_deref())?,
        hora_fin: parse_hora_opt(payload.hora_fin.as_deref())?,
        estado,
        observaciones: payload.observaciones.map(Some),
        telefono_cliente: payload.telefono_cliente.map(Some),
    };

    let outcome = state.services.reservations.update(id, changes).await?;
    Ok(success_response(outcome))
}

pub async fn list_reservas(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let reservas = state.services.reservations.list().await?;
    Ok(success_response(reservas))
}

pub async fn get_reserva(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ServiceError> {
    let reserva = state.services.reservations.get(id).await?;
    Ok(success_response(reserva))
}

pub async fn delete_reserva(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ServiceError> {
    state.services.reservations.delete(id).await?;
    Ok(no_content_response())
}

pub async fn horarios_ocupados(
    State(state): State<AppState>,
    Query(query): Query<HorariosOcupadosQuery>,
) -> Result<Response, ServiceError> {
    let slots = state
        .services
        .reservations
        .occupied_slots(query.id_cancha, query.fecha)
        .await?;

    Ok(success_response(json!({
        "cancha_id": query.id_cancha,
        "fecha": query.fecha,
        "horarios_ocupados": slots,
    })))
}

pub async fn reservas_hoy(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let stats = state.services.dashboard.reservas_hoy(Utc::now()).await?;
    Ok(success_response(stats))
}

pub async fn ingresos_mensuales(
    State(state): State<AppState>,
    Query(query): Query<IngresosQuery>,
) -> Result<Response, ServiceError> {
    let (mes_actual, anio_actual) = state.services.dashboard.current_month(Utc::now());
    let mes = query.mes.unwrap_or(mes_actual);
    let anio = query.anio.unwrap_or(anio_actual);

    let ingresos = state.services.dashboard.ingresos_mensuales(mes, anio).await?;
    Ok(success_response(ingresos))
}

pub async fn ocupacion_promedio(
    State(state): State<AppState>,
    Query(query): Query<OcupacionQuery>,
) -> Result<Response, ServiceError> {
    let dias = query.dias.unwrap_or(7);
    let ocupacion = state
        .services
        .dashboard
        .ocupacion_promedio(dias, Utc::now())
        .await?;
    Ok(success_response(ocupacion))
}
