use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::estado::EstadoSolicitud;

pub type AppResult<T> = Result<T, AppError>;

pub const MENSAJE_INTERNO: &str = "Error interno del servidor";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validacion(String),

    #[error("Datos inválidos: {0}")]
    Validator(#[from] validator::ValidationErrors),

    #[error("JSON inválido: {0}")]
    Json(#[from] JsonRejection),

    #[error("Formulario inválido: {0}")]
    Multipart(#[from] MultipartError),

    #[error("{0} no existe")]
    NoEncontrado(&'static str),

    #[error("Credenciales inválidas")]
    CredencialesInvalidas,

    #[error("Token ausente")]
    TokenAusente,

    #[error("Token inválido o expirado")]
    TokenInvalido,

    #[error("{0}")]
    Prohibido(&'static str),

    #[error("{0}")]
    Conflicto(String),

    #[error("No se puede pasar de '{desde}' a '{hacia}'")]
    TransicionInvalida {
        desde: EstadoSolicitud,
        hacia: EstadoSolicitud,
    },

    #[error("Error de base de datos: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Error de E/S: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error JWT: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Error de hash: {0}")]
    Hash(String),
}

impl AppError {
    pub fn validacion(msg: impl Into<String>) -> Self {
        Self::Validacion(msg.into())
    }

    /// Valor guardado que ya no se puede interpretar (p. ej. un estado fuera del vocabulario).
    pub fn dato_corrupto(e: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Db(sqlx::Error::Decode(Box::new(e)))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validacion(_)
            | AppError::Validator(_)
            | AppError::Json(_)
            | AppError::Multipart(_) => StatusCode::BAD_REQUEST,
            AppError::NoEncontrado(_) => StatusCode::NOT_FOUND,
            AppError::CredencialesInvalidas | AppError::TokenAusente | AppError::TokenInvalido => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Prohibido(_) => StatusCode::FORBIDDEN,
            AppError::Conflicto(_) | AppError::TransicionInvalida { .. } => StatusCode::CONFLICT,
            AppError::Db(e) => match codigo_pg(e).as_deref().and_then(status_pg) {
                Some(status) => status,
                None if matches!(e, sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
                None => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Io(_) | AppError::Jwt(_) | AppError::Hash(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn mensaje_publico(&self) -> String {
        match self {
            AppError::Db(e) => match codigo_pg(e).as_deref() {
                Some(PG_UNIQUE_VIOLATION) => "El registro ya existe".to_string(),
                Some(PG_FK_VIOLATION) => "Referencia a un registro inexistente".to_string(),
                Some(PG_CHECK_VIOLATION) => "Valor fuera de rango".to_string(),
                Some(c) if c.starts_with(PG_CLASE_DATO) => {
                    "Dato demasiado largo o fuera de rango".to_string()
                }
                _ if matches!(e, sqlx::Error::RowNotFound) => "Registro no encontrado".to_string(),
                _ => MENSAJE_INTERNO.to_string(),
            },
            AppError::Io(_) | AppError::Jwt(_) | AppError::Hash(_) => MENSAJE_INTERNO.to_string(),
            AppError::Validator(e) => format!("Datos inválidos: [{}]", e).replace('\n', ", "),
            otro => otro.to_string(),
        }
    }
}

const PG_UNIQUE_VIOLATION: &str = "23505";
const PG_FK_VIOLATION: &str = "23503";
const PG_CHECK_VIOLATION: &str = "23514";
// Clase 22: valor que no cabe en la columna (22001 texto largo, 22003 numérico)
const PG_CLASE_DATO: &str = "22";

fn status_pg(codigo: &str) -> Option<StatusCode> {
    match codigo {
        PG_UNIQUE_VIOLATION => Some(StatusCode::CONFLICT),
        PG_FK_VIOLATION | PG_CHECK_VIOLATION => Some(StatusCode::BAD_REQUEST),
        c if c.starts_with(PG_CLASE_DATO) => Some(StatusCode::BAD_REQUEST),
        _ => None,
    }
}

fn codigo_pg(e: &sqlx::Error) -> Option<String> {
    match e {
        sqlx::Error::Database(db) => db.code().map(|c| c.into_owned()),
        _ => None,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{:?}", self);
        } else {
            tracing::warn!("{} -> {}", status, self);
        }
        (status, Json(json!({ "error": self.mensaje_publico() }))).into_response()
    }
}
