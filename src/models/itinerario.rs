use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

#[derive(Debug, Deserialize, Serialize, FromRow)]
pub struct Aerolinea {
    pub id: i32,
    pub nombre: String,
    pub codigo_iata: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AerolineaSchema {
    #[validate(length(min = 2, max = 100))]
    pub nombre: String,
    #[validate(length(equal = 2))]
    pub codigo_iata: Option<String>,
}

// Logística de viaje del reencuentro (1:1 con la solicitud)
#[derive(Debug, Deserialize, Serialize, FromRow)]
pub struct Itinerario {
    pub id: i64,
    pub solicitud_id: i64,
    pub aerolinea_id: i32,
    pub numero_vuelo: Option<String>,
    pub fecha_salida: DateTime<Utc>,
    pub fecha_regreso: Option<DateTime<Utc>>,
    pub hotel: Option<String>,
    pub observaciones: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validar_fechas"))]
pub struct ItinerarioSchema {
    pub aerolinea_id: i32,
    #[validate(length(max = 20))]
    pub numero_vuelo: Option<String>,
    pub fecha_salida: DateTime<Utc>,
    pub fecha_regreso: Option<DateTime<Utc>>,
    #[validate(length(max = 150))]
    pub hotel: Option<String>,
    pub observaciones: Option<String>,
}

fn validar_fechas(itinerario: &ItinerarioSchema) -> Result<(), ValidationError> {
    match itinerario.fecha_regreso {
        Some(regreso) if regreso < itinerario.fecha_salida => {
            Err(ValidationError::new("regreso_antes_de_salida"))
        }
        _ => Ok(()),
    }
}
