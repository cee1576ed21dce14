use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstadoPago {
    Validado,
    Pendiente,
    Rechazado,
}

impl EstadoPago {
    pub fn codigo(self) -> &'static str {
        match self {
            EstadoPago::Validado => "validado",
            EstadoPago::Pendiente => "pendiente",
            EstadoPago::Rechazado => "rechazado",
        }
    }
}

#[derive(Debug, Error)]
#[error("Estado de pago desconocido: '{0}'")]
pub struct EstadoPagoDesconocido(pub String);

impl TryFrom<String> for EstadoPago {
    type Error = EstadoPagoDesconocido;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "validado" => Ok(EstadoPago::Validado),
            "pendiente" => Ok(EstadoPago::Pendiente),
            "rechazado" => Ok(EstadoPago::Rechazado),
            _ => Err(EstadoPagoDesconocido(value)),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, FromRow)]
pub struct MetodoPago {
    pub id: i32,
    pub nombre: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MetodoPagoSchema {
    #[validate(length(min = 2, max = 60))]
    pub nombre: String,
}

#[derive(Debug, Serialize, FromRow)]
pub struct Pago {
    pub id: i64,
    pub solicitud_id: i64,
    pub monto: Decimal,
    pub metodo_pago_id: i32,
    pub fecha: NaiveDate,
    #[sqlx(try_from = "String")]
    pub estado: EstadoPago,
    pub referencia: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePagoSchema {
    pub monto: Decimal,
    pub metodo_pago_id: i32,
    pub fecha: Option<NaiveDate>,
    pub estado: Option<EstadoPago>,
    #[validate(length(max = 100))]
    pub referencia: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePagoSchema {
    pub monto: Option<Decimal>,
    pub metodo_pago_id: Option<i32>,
    pub fecha: Option<NaiveDate>,
    pub estado: Option<EstadoPago>,
    #[validate(length(max = 100))]
    pub referencia: Option<String>,
}
