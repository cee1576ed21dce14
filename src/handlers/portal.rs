use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::{
    db::DbPool,
    error::{AppError, AppResult},
    handlers::solicitud::{buscar_solicitudes, detalle_solicitud},
    models::{
        solicitud::{SolicitudDetalle, SolicitudFiltro, SolicitudResumen},
        usuario::Claims,
    },
};

// Vista de solo lectura para usuarios con rol cliente

fn cliente_de(claims: &Claims) -> AppResult<i64> {
    claims
        .cliente_id
        .ok_or(AppError::Prohibido("El usuario no está vinculado a un cliente"))
}

// GET /api/portal/solicitudes
pub async fn mis_solicitudes_handler(
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<SolicitudResumen>>> {
    let filtro = SolicitudFiltro {
        estado: None,
        cliente_id: Some(cliente_de(&claims)?),
        tramite_id: None,
        solo_activas: None,
    };
    Ok(Json(buscar_solicitudes(&pool, &filtro).await?))
}

// GET /api/portal/solicitudes/:id
pub async fn mi_solicitud_handler(
    Path(id): Path<i64>,
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<SolicitudDetalle>> {
    let cliente_id = cliente_de(&claims)?;
    let detalle = detalle_solicitud(&pool, id).await?;

    if detalle.solicitud.cliente_id != cliente_id {
        return Err(AppError::Prohibido("La solicitud pertenece a otro cliente"));
    }
    Ok(Json(detalle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::usuario::RolUsuario;

    fn claims(cliente_id: Option<i64>) -> Claims {
        Claims {
            sub: "ana".into(),
            exp: 0,
            iat: 0,
            user_id: 7,
            role: RolUsuario::Cliente,
            empleado_id: None,
            cliente_id,
        }
    }

    #[test]
    fn exige_cliente_vinculado() {
        assert_eq!(cliente_de(&claims(Some(3))).unwrap(), 3);
        let err = cliente_de(&claims(None)).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::FORBIDDEN);
    }
}
