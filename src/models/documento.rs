use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Deserialize, Serialize, FromRow)]
pub struct Documento {
    pub id: i64,
    pub solicitud_id: i64,
    pub nombre: String,
    pub tipo: Option<String>,
    pub archivo: String,
    pub tamano: i64,
    pub mime: String,
    pub created_at: DateTime<Utc>,
    /// Ruta pública servida como archivo estático.
    pub url: String,
}

/// Columnas de `documentos` más la URL pública calculada.
pub const COLUMNAS_DOCUMENTO: &str = "id, solicitud_id, nombre, tipo, archivo, tamano, mime, created_at, \
     '/uploads/documentos/' || archivo AS url";
