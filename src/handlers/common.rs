use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveTime;
use serde::Serialize;
use validator::Validate;

use crate::errors::ServiceError;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Standard no content response
pub fn no_content_response() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ServiceError> {
    input
        .validate()
        .map_err(|e| ServiceError::ValidationError(format!("Validación fallida: {}", e)))
}

/// Parses a wire time value. The admin frontend sends `HH:MM` from time
/// inputs; seconds are accepted too.
pub fn parse_hora(raw: &str) -> Result<NaiveTime, ServiceError> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| ServiceError::ValidationError(format!("Hora inválida: {}", raw)))
}

/// Optional variant of [`parse_hora`].
pub fn parse_hora_opt(raw: Option<&str>) -> Result<Option<NaiveTime>, ServiceError> {
    raw.map(parse_hora).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_hh_mm_and_hh_mm_ss() {
        assert_eq!(
            parse_hora("10:30").unwrap(),
            NaiveTime::from_hms_opt(10, 30, 0).unwrap()
        );
        assert_eq!(
            parse_hora("10:30:00").unwrap(),
            NaiveTime::from_hms_opt(10, 30, 0).unwrap()
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_hora("25:00").is_err());
        assert!(parse_hora("mediodía").is_err());
        assert!(parse_hora("").is_err());
    }
}
