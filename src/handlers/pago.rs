use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;

use crate::{
    db::DbPool,
    error::{AppError, AppResult},
    handlers::solicitud::{obtener_solicitud, COLUMNAS_PAGO},
    models::pago::{
        CreatePagoSchema, EstadoPago, MetodoPago, MetodoPagoSchema, Pago, UpdatePagoSchema,
    },
    utils::validated_json::ValidatedJson,
};

// 99999999.99, lo máximo que cabe en NUMERIC(10, 2)
const MONTO_MAXIMO: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

fn validar_monto(monto: Option<Decimal>) -> AppResult<()> {
    match monto {
        Some(m) if m <= Decimal::ZERO => Err(AppError::validacion("El monto debe ser mayor que cero")),
        Some(m) if m > MONTO_MAXIMO => Err(AppError::validacion(format!(
            "El monto no puede superar {}",
            MONTO_MAXIMO
        ))),
        Some(m) if m.normalize().scale() > 2 => Err(AppError::validacion(
            "El monto admite como máximo dos decimales",
        )),
        _ => Ok(()),
    }
}

// GET /api/metodos-pago
pub async fn list_metodos_handler(State(pool): State<DbPool>) -> AppResult<Json<Vec<MetodoPago>>> {
    let metodos = sqlx::query_as::<_, MetodoPago>("SELECT id, nombre FROM metodos_pago ORDER BY nombre")
        .fetch_all(&pool)
        .await?;
    Ok(Json(metodos))
}

// POST /api/admin/metodos-pago
pub async fn create_metodo_handler(
    State(pool): State<DbPool>,
    ValidatedJson(body): ValidatedJson<MetodoPagoSchema>,
) -> AppResult<(StatusCode, Json<MetodoPago>)> {
    let metodo = sqlx::query_as::<_, MetodoPago>(
        "INSERT INTO metodos_pago (nombre) VALUES ($1) RETURNING id, nombre",
    )
    .bind(body.nombre.trim().to_lowercase())
    .fetch_one(&pool)
    .await?;
    Ok((StatusCode::CREATED, Json(metodo)))
}

// GET /api/solicitudes/:id/pagos
pub async fn list_pagos_handler(
    Path(solicitud_id): Path<i64>,
    State(pool): State<DbPool>,
) -> AppResult<Json<Vec<Pago>>> {
    obtener_solicitud(&pool, solicitud_id).await?;

    let pagos = sqlx::query_as::<_, Pago>(&format!(
        "SELECT {COLUMNAS_PAGO} FROM pagos WHERE solicitud_id = $1 ORDER BY fecha, id"
    ))
    .bind(solicitud_id)
    .fetch_all(&pool)
    .await?;
    Ok(Json(pagos))
}

// POST /api/solicitudes/:id/pagos
pub async fn create_pago_handler(
    Path(solicitud_id): Path<i64>,
    State(pool): State<DbPool>,
    ValidatedJson(body): ValidatedJson<CreatePagoSchema>,
) -> AppResult<(StatusCode, Json<Pago>)> {
    validar_monto(Some(body.monto))?;
    obtener_solicitud(&pool, solicitud_id).await?;

    let pago = sqlx::query_as::<_, Pago>(&format!(
        "INSERT INTO pagos (solicitud_id, monto, metodo_pago_id, fecha, estado, referencia)
         VALUES ($1, $2, $3, COALESCE($4, CURRENT_DATE), $5, $6)
         RETURNING {COLUMNAS_PAGO}"
    ))
    .bind(solicitud_id)
    .bind(body.monto)
    .bind(body.metodo_pago_id)
    .bind(body.fecha)
    .bind(body.estado.unwrap_or(EstadoPago::Pendiente).codigo())
    .bind(&body.referencia)
    .fetch_one(&pool)
    .await?;

    tracing::info!("Pago {} registrado para la solicitud {}", pago.id, solicitud_id);
    Ok((StatusCode::CREATED, Json(pago)))
}

// PUT /api/pagos/:id (validar o rechazar un pago, corregir datos)
pub async fn update_pago_handler(
    Path(id): Path<i64>,
    State(pool): State<DbPool>,
    ValidatedJson(body): ValidatedJson<UpdatePagoSchema>,
) -> AppResult<Json<Pago>> {
    validar_monto(body.monto)?;

    let pago = sqlx::query_as::<_, Pago>(&format!(
        "UPDATE pagos SET
            monto = COALESCE($1, monto),
            metodo_pago_id = COALESCE($2, metodo_pago_id),
            fecha = COALESCE($3, fecha),
            estado = COALESCE($4, estado),
            referencia = COALESCE($5, referencia)
         WHERE id = $6
         RETURNING {COLUMNAS_PAGO}"
    ))
    .bind(body.monto)
    .bind(body.metodo_pago_id)
    .bind(body.fecha)
    .bind(body.estado.map(EstadoPago::codigo))
    .bind(&body.referencia)
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NoEncontrado("Pago"))?;

    Ok(Json(pago))
}

// DELETE /api/admin/pagos/:id
pub async fn delete_pago_handler(
    Path(id): Path<i64>,
    State(pool): State<DbPool>,
) -> AppResult<StatusCode> {
    let res = sqlx::query("DELETE FROM pagos WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NoEncontrado("Pago"));
    }
    Ok(StatusCode::NO_CONTENT)
}
