use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerConfig, ServerState, router, run, run_with_listener, spawn_with_listener};

mod account;
mod billing;
mod extract;
mod notifications;
mod payroll;
mod requests;
mod server;
mod views;

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidInput(_)
        | EngineError::InvalidField { .. }
        | EngineError::InvalidState(_) => StatusCode::BAD_REQUEST,
    }
}

fn body_for_engine_error(err: EngineError) -> Error {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            Error {
                error: "internal server error".to_string(),
                field: None,
            }
        }
        EngineError::InvalidField { field, message } => Error {
            error: message,
            field: Some(field),
        },
        other => Error {
            error: other.to_string(),
            field: None,
        },
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), body_for_engine_error(err)),
            ServerError::Generic(error) => (StatusCode::BAD_REQUEST, Error { error, field: None }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Generic(rejection.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(rejection: PathRejection) -> Self {
        Self::Generic(rejection.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Generic(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_forbidden_maps_to_403() {
        let res = ServerError::from(EngineError::Forbidden("forbidden".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn state_conflicts_map_to_400() {
        let res = ServerError::from(EngineError::InvalidState("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn field_errors_name_the_field() {
        let err = EngineError::InvalidField {
            field: "phone_number".to_string(),
            message: "taken".to_string(),
        };
        assert_eq!(status_for_engine_error(&err), StatusCode::BAD_REQUEST);
        let body = body_for_engine_error(err);
        assert_eq!(body.field.as_deref(), Some("phone_number"));
        assert_eq!(body.error, "taken");
    }

    #[test]
    fn database_errors_are_hidden() {
        let err = EngineError::Database(sea_orm::DbErr::Custom("disk full".to_string()));
        assert_eq!(status_for_engine_error(&err), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_for_engine_error(err).error, "internal server error");
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
