use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::utils::validacion::TipoIdentificacion;

#[derive(Debug, Serialize, FromRow)]
pub struct Cliente {
    pub id: i64,
    pub nombres: String,
    pub apellidos: String,
    #[sqlx(try_from = "String")]
    pub tipo_identificacion: TipoIdentificacion,
    pub numero_identificacion: String,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub pais_id: i32,
    pub ciudad_id: Option<i32>,
    pub activo: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateClienteSchema {
    #[validate(length(min = 2, max = 100))]
    pub nombres: String,
    #[validate(length(min = 2, max = 100))]
    pub apellidos: String,
    pub tipo_identificacion: TipoIdentificacion,
    #[validate(length(min = 1, max = 30))]
    pub numero_identificacion: String,
    pub fecha_nacimiento: Option<NaiveDate>,
    #[validate(email(message = "Email inválido"))]
    pub email: Option<String>,
    #[validate(length(max = 30))]
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub pais_id: i32,
    pub ciudad_id: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateClienteSchema {
    #[validate(length(min = 2, max = 100))]
    pub nombres: Option<String>,
    #[validate(length(min = 2, max = 100))]
    pub apellidos: Option<String>,
    pub tipo_identificacion: Option<TipoIdentificacion>,
    #[validate(length(min = 1, max = 30))]
    pub numero_identificacion: Option<String>,
    pub fecha_nacimiento: Option<NaiveDate>,
    #[validate(email(message = "Email inválido"))]
    pub email: Option<String>,
    #[validate(length(max = 30))]
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub pais_id: Option<i32>,
    pub ciudad_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ClienteFiltro {
    pub search: Option<String>,
    pub pais_id: Option<i32>,
    pub incluir_inactivos: Option<bool>,
}
