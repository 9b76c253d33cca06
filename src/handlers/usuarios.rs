use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::entities::usuario::Rol;
use crate::errors::ServiceError;
use crate::handlers::common::{
    created_response, no_content_response, success_response, validate_input,
};
use crate::services::usuarios::{NewUsuario, UsuarioChanges};
use crate::AppState;

fn parse_rol(raw: &str) -> Result<Rol, ServiceError> {
    Rol::from_str(raw).ok_or_else(|| {
        ServiceError::InvalidStatus(format!(
            "Rol inválido: {}. Roles válidos: cliente, administrador",
            raw
        ))
    })
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUsuarioRequest {
    #[validate(length(min = 1))]
    pub nombre: String,
    #[validate(email)]
    pub correo: String,
    #[validate(length(min = 6))]
    pub contrasena: String,
    pub rol: Option<String>,
    pub telefono: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUsuarioRequest {
    pub nombre: Option<String>,
    pub correo: Option<String>,
    pub contrasena: Option<String>,
    pub rol: Option<String>,
    pub telefono: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub correo: String,
    #[validate(length(min = 1))]
    pub contrasena: String,
}

pub async fn create_usuario(
    State(state): State<AppState>,
    Json(payload): Json<CreateUsuarioRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;

    let rol = match payload.rol.as_deref() {
        Some(raw) => parse_rol(raw)?,
        None => Rol::Cliente,
    };

    let usuario = state
        .services
        .usuarios
        .create(NewUsuario {
            nombre: payload.nombre,
            correo: payload.correo,
            contrasena: payload.contrasena,
            rol,
            telefono: payload.telefono,
        })
        .await?;
    Ok(created_response(usuario))
}

pub async fn list_usuarios(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let usuarios = state.services.usuarios.list().await?;
    Ok(success_response(usuarios))
}

pub async fn get_usuario(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ServiceError> {
    let usuario = state.services.usuarios.get(id).await?;
    Ok(success_response(usuario))
}

pub async fn update_usuario(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateUsuarioRequest>,
) -> Result<Response, ServiceError> {
    let rol = payload.rol.as_deref().map(parse_rol).transpose()?;

    let usuario = state
        .services
        .usuarios
        .update(
            id,
            UsuarioChanges {
                nombre: payload.nombre,
                correo: payload.correo,
                contrasena: payload.contrasena,
                rol,
                telefono: payload.telefono.map(Some),
            },
        )
        .await?;
    Ok(success_response(usuario))
}

pub async fn delete_usuario(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ServiceError> {
    state.services.usuarios.delete(id).await?;
    Ok(no_content_response())
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let usuario = state
        .services
        .usuarios
        .login(&payload.correo, &payload.contrasena)
        .await?;
    Ok(success_response(usuario))
}
