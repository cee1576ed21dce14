use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Deserialize, Serialize, FromRow)]
pub struct Rol {
    pub id: i32,
    pub nombre: String,
    pub descripcion: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RolSchema {
    #[validate(length(min = 2, max = 60))]
    pub nombre: String,
    pub descripcion: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, FromRow)]
pub struct Area {
    pub id: i32,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub responsable_id: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AreaSchema {
    #[validate(length(min = 2, max = 100))]
    pub nombre: String,
    pub descripcion: Option<String>,
    pub responsable_id: Option<i64>,
}

#[derive(Debug, Deserialize, Serialize, FromRow)]
pub struct Empleado {
    pub id: i64,
    pub nombres: String,
    pub apellidos: String,
    pub email: String,
    pub telefono: Option<String>,
    pub rol_id: i32,
    pub area_id: Option<i32>,
    pub activo: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEmpleadoSchema {
    #[validate(length(min = 2, max = 100))]
    pub nombres: String,
    #[validate(length(min = 2, max = 100))]
    pub apellidos: String,
    #[validate(email(message = "Email inválido"))]
    pub email: String,
    #[validate(length(max = 30))]
    pub telefono: Option<String>,
    pub rol_id: i32,
    pub area_id: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEmpleadoSchema {
    #[validate(length(min = 2, max = 100))]
    pub nombres: Option<String>,
    #[validate(length(min = 2, max = 100))]
    pub apellidos: Option<String>,
    #[validate(email(message = "Email inválido"))]
    pub email: Option<String>,
    #[validate(length(max = 30))]
    pub telefono: Option<String>,
    pub rol_id: Option<i32>,
    pub area_id: Option<i32>,
    pub activo: Option<bool>,
}
