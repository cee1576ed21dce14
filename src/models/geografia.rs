use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Deserialize, Serialize, FromRow)]
pub struct Pais {
    pub id: i32,
    pub nombre: String,
    pub codigo_iso: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PaisSchema {
    #[validate(length(min = 2, max = 100))]
    pub nombre: String,
    #[validate(length(equal = 2, message = "El código ISO tiene 2 letras"))]
    pub codigo_iso: String,
}

#[derive(Debug, Deserialize, Serialize, FromRow)]
pub struct Ciudad {
    pub id: i32,
    pub nombre: String,
    pub pais_id: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CiudadSchema {
    #[validate(length(min = 2, max = 100))]
    pub nombre: String,
}
