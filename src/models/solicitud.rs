use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use super::{
    documento::Documento,
    estado::{EstadoSolicitud, TipoTramite},
    itinerario::Itinerario,
    pago::Pago,
};

#[derive(Debug, Serialize, FromRow)]
pub struct Solicitud {
    pub id: i64,
    pub cliente_id: i64,
    pub tramite_id: i32,
    pub empleado_id: Option<i64>,
    #[sqlx(try_from = "String")]
    pub estado_actual: EstadoSolicitud,
    pub observaciones: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Fila de listado con los nombres ya resueltos para las tablas del front
#[derive(Debug, Serialize, FromRow)]
pub struct SolicitudResumen {
    pub id: i64,
    pub cliente_id: i64,
    pub cliente_nombre: String,
    pub tramite_id: i32,
    pub tramite_nombre: String,
    #[sqlx(try_from = "String")]
    pub tipo: TipoTramite,
    #[sqlx(try_from = "String")]
    pub estado_actual: EstadoSolicitud,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct Seguimiento {
    pub id: i64,
    pub solicitud_id: i64,
    pub empleado_id: Option<i64>,
    pub descripcion: String,
    #[sqlx(try_from = "String")]
    pub estado: EstadoSolicitud,
    pub created_at: DateTime<Utc>,
}

/// Solicitud con todo su expediente; el historial va del más reciente al más antiguo.
#[derive(Debug, Serialize)]
pub struct SolicitudDetalle {
    #[serde(flatten)]
    pub solicitud: Solicitud,
    pub tipo: TipoTramite,
    pub estados_siguientes: Vec<EstadoSolicitud>,
    pub seguimientos: Vec<Seguimiento>,
    pub documentos: Vec<Documento>,
    pub pagos: Vec<Pago>,
    pub itinerario: Option<Itinerario>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSolicitudSchema {
    pub cliente_id: i64,
    pub tramite_id: i32,
    pub empleado_id: Option<i64>,
    pub observaciones: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSolicitudSchema {
    pub empleado_id: Option<i64>,
    pub observaciones: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSeguimientoSchema {
    pub estado: EstadoSolicitud,
    #[validate(
        length(min = 1, max = 2000, message = "La descripción es obligatoria"),
        custom(function = "no_en_blanco", message = "La descripción es obligatoria")
    )]
    pub descripcion: String,
    pub empleado_id: Option<i64>,
}

fn no_en_blanco(texto: &str) -> Result<(), ValidationError> {
    if texto.trim().is_empty() {
        return Err(ValidationError::new("en_blanco"));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct SolicitudFiltro {
    pub estado: Option<EstadoSolicitud>,
    pub cliente_id: Option<i64>,
    pub tramite_id: Option<i32>,
    pub solo_activas: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seguimiento(descripcion: &str) -> CreateSeguimientoSchema {
        CreateSeguimientoSchema {
            estado: EstadoSolicitud::EnRevision,
            descripcion: descripcion.into(),
            empleado_id: None,
        }
    }

    #[test]
    fn descripcion_en_blanco_no_vale() {
        assert!(seguimiento("Documentos recibidos").validate().is_ok());
        assert!(seguimiento("").validate().is_err());
        assert!(seguimiento("   \n\t").validate().is_err());
    }
}
