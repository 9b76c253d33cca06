use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::errors::ServiceError;
use crate::handlers::common::{
    created_response, no_content_response, success_response, validate_input,
};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductoRequest {
    #[validate(length(min = 1))]
    pub nombre_producto: String,
    pub cantidad_total: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductoRequest {
    pub nombre_producto: Option<String>,
    pub cantidad_total: Option<i32>,
}

pub async fn create_producto(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductoRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let producto = state
        .services
        .productos
        .create(payload.nombre_producto, payload.cantidad_total)
        .await?;
    Ok(created_response(producto))
}

pub async fn list_productos(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let productos = state.services.productos.list().await?;
    Ok(success_response(productos))
}

pub async fn get_producto(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ServiceError> {
    let producto = state.services.productos.get(id).await?;
    Ok(success_response(producto))
}

pub async fn update_producto(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProductoRequest>,
) -> Result<Response, ServiceError> {
    let producto = state
        .services
        .productos
        .update(id, payload.nombre_producto, payload.cantidad_total)
        .await?;
    Ok(success_response(producto))
}

pub async fn delete_producto(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ServiceError> {
    state.services.productos.delete(id).await?;
    Ok(no_content_response())
}
