use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{NaiveDate, NaiveTime};
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Standard error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Bad Request")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// Additional context (validation details, conflicting slots, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// ISO 8601 timestamp when the error occurred
    pub timestamp: String,
}

/// A reserved slot returned alongside conflict errors so the caller can show
/// the operator which bookings are in the way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupiedSlot {
    pub id: i32,
    pub fecha_reserva: NaiveDate,
    pub hora_inicio: NaiveTime,
    pub hora_fin: NaiveTime,
    pub estado: String,
}

/// Stock context attached to loan rejections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockShortage {
    pub producto: String,
    pub disponible: i32,
    pub solicitado: i32,
    pub total: i32,
    pub prestado: i32,
}

impl StockShortage {
    pub fn reason(&self) -> String {
        format!(
            "Stock insuficiente para {}: disponible={} solicitado={}",
            self.producto, self.disponible, self.solicitado
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::error::DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("La cancha ya está reservada en ese horario")]
    ReservationConflict(Vec<OccupiedSlot>),

    #[error("Stock insuficiente")]
    StockInsufficient(StockShortage),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

pub trait IntoDbErr {
    fn into_db_err(self) -> DbErr;
}

impl IntoDbErr for DbErr {
    fn into_db_err(self) -> DbErr {
        self
    }
}

impl IntoDbErr for String {
    fn into_db_err(self) -> DbErr {
        DbErr::Custom(self)
    }
}

impl IntoDbErr for &str {
    fn into_db_err(self) -> DbErr {
        DbErr::Custom(self.to_string())
    }
}

impl ServiceError {
    /// Generic constructor that normalizes any supported database error input.
    pub fn db_error<E: IntoDbErr>(error: E) -> Self {
        ServiceError::DatabaseError(error.into_db_err())
    }

    /// Single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DatabaseError(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_) | Self::InvalidStatus(_) | Self::StockInsufficient(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::ReservationConflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }

    /// Message suitable for HTTP responses. Internal errors return generic
    /// messages to avoid leaking implementation details.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::InternalError(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Conflict and stock rejections carry fixed wire shapes the admin
        // frontend renders directly.
        match self {
            Self::ReservationConflict(conflictos) => {
                let body = json!({
                    "error": "La cancha ya está reservada en ese horario",
                    "conflictos": conflictos,
                });
                return (status, Json(body)).into_response();
            }
            Self::StockInsufficient(shortage) => {
                let body = json!({
                    "error": "Stock insuficiente",
                    "producto": shortage.producto,
                    "disponible": shortage.disponible,
                    "solicitado": shortage.solicitado,
                    "total": shortage.total,
                    "prestado": shortage.prestado,
                });
                return (status, Json(body)).into_response();
            }
            _ => {}
        }

        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            details: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(err)).into_response()
    }
}
