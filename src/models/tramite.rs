use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::estado::TipoTramite;

// Entrada del catálogo (p. ej. "Visa Americana")
#[derive(Debug, Serialize, FromRow)]
pub struct Tramite {
    pub id: i32,
    pub nombre: String,
    #[sqlx(try_from = "String")]
    pub tipo: TipoTramite,
    pub descripcion: Option<String>,
    pub requisitos: Vec<String>,
    pub costo: Decimal,
    pub duracion_estimada_dias: Option<i32>,
    pub activo: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct TramiteDetalle {
    #[serde(flatten)]
    pub tramite: Tramite,
    pub cliente_ids: Vec<i64>,
    pub empleado_ids: Vec<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTramiteSchema {
    #[validate(length(min = 2, max = 150))]
    pub nombre: String,
    #[serde(alias = "tipoTramite")]
    #[validate(length(min = 1, message = "El tipo de trámite es obligatorio"))]
    pub tipo_tramite: String,
    pub descripcion: Option<String>,
    #[serde(default)]
    pub requisitos: Vec<String>,
    pub costo: Option<Decimal>,
    #[validate(range(min = 1))]
    pub duracion_estimada_dias: Option<i32>,
    #[serde(default)]
    pub cliente_ids: Vec<i64>,
    #[serde(default)]
    pub empleado_ids: Vec<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTramiteSchema {
    #[validate(length(min = 2, max = 150))]
    pub nombre: Option<String>,
    #[serde(alias = "tipoTramite")]
    #[validate(length(min = 1, message = "El tipo de trámite es obligatorio"))]
    pub tipo_tramite: Option<String>,
    pub descripcion: Option<String>,
    pub requisitos: Option<Vec<String>>,
    pub costo: Option<Decimal>,
    #[validate(range(min = 1))]
    pub duracion_estimada_dias: Option<i32>,
    pub activo: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VinculoSchema {
    pub id: i64,
}
