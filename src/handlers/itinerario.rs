use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    db::{bloquear_fila, DbPool},
    error::{AppError, AppResult},
    handlers::solicitud::COLUMNAS_ITINERARIO,
    models::{
        estado::TipoTramite,
        itinerario::{Aerolinea, AerolineaSchema, Itinerario, ItinerarioSchema},
    },
    utils::validated_json::ValidatedJson,
};

// --- Aerolíneas ---

pub async fn list_aerolineas_handler(
    State(pool): State<DbPool>,
) -> AppResult<Json<Vec<Aerolinea>>> {
    let aerolineas = sqlx::query_as::<_, Aerolinea>(
        "SELECT id, nombre, codigo_iata FROM aerolineas ORDER BY nombre",
    )
    .fetch_all(&pool)
    .await?;
    Ok(Json(aerolineas))
}

pub async fn create_aerolinea_handler(
    State(pool): State<DbPool>,
    ValidatedJson(body): ValidatedJson<AerolineaSchema>,
) -> AppResult<(StatusCode, Json<Aerolinea>)> {
    let aerolinea = sqlx::query_as::<_, Aerolinea>(
        "INSERT INTO aerolineas (nombre, codigo_iata) VALUES ($1, $2)
         RETURNING id, nombre, codigo_iata",
    )
    .bind(body.nombre.trim())
    .bind(body.codigo_iata.as_ref().map(|c| c.to_ascii_uppercase()))
    .fetch_one(&pool)
    .await?;
    Ok((StatusCode::CREATED, Json(aerolinea)))
}

pub async fn delete_aerolinea_handler(
    Path(id): Path<i32>,
    State(pool): State<DbPool>,
) -> AppResult<StatusCode> {
    let mut tx = pool.begin().await?;
    if !bloquear_fila(&mut *tx, "aerolineas", id).await? {
        return Err(AppError::NoEncontrado("Aerolínea"));
    }

    let en_uso: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM itinerarios WHERE aerolinea_id = $1)",
    )
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    if en_uso {
        return Err(AppError::Conflicto(
            "La aerolínea está asignada a itinerarios".to_string(),
        ));
    }

    sqlx::query("DELETE FROM aerolineas WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Itinerario de la solicitud ---

// GET /api/solicitudes/:id/itinerario
pub async fn get_itinerario_handler(
    Path(solicitud_id): Path<i64>,
    State(pool): State<DbPool>,
) -> AppResult<Json<Itinerario>> {
    let itinerario = sqlx::query_as::<_, Itinerario>(&format!(
        "SELECT {COLUMNAS_ITINERARIO} FROM itinerarios WHERE solicitud_id = $1"
    ))
    .bind(solicitud_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NoEncontrado("Itinerario"))?;

    Ok(Json(itinerario))
}

// PUT /api/solicitudes/:id/itinerario (crea o reemplaza; solo trámites AMA)
pub async fn upsert_itinerario_handler(
    Path(solicitud_id): Path<i64>,
    State(pool): State<DbPool>,
    ValidatedJson(body): ValidatedJson<ItinerarioSchema>,
) -> AppResult<Json<Itinerario>> {
    let tipo: String = sqlx::query_scalar(
        "SELECT t.tipo FROM solicitudes s JOIN tramites t ON t.id = s.tramite_id WHERE s.id = $1",
    )
    .bind(solicitud_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NoEncontrado("Solicitud"))?;

    let tipo: TipoTramite = tipo.parse().map_err(AppError::dato_corrupto)?;
    if !tipo.admite_itinerario() {
        return Err(AppError::validacion(format!(
            "Los trámites de tipo '{}' no llevan itinerario de viaje",
            tipo.etiqueta()
        )));
    }

    let itinerario = sqlx::query_as::<_, Itinerario>(&format!(
        "INSERT INTO itinerarios (solicitud_id, aerolinea_id, numero_vuelo, fecha_salida,
            fecha_regreso, hotel, observaciones)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         ON CONFLICT (solicitud_id) DO UPDATE SET
            aerolinea_id = EXCLUDED.aerolinea_id,
            numero_vuelo = EXCLUDED.numero_vuelo,
            fecha_salida = EXCLUDED.fecha_salida,
            fecha_regreso = EXCLUDED.fecha_regreso,
            hotel = EXCLUDED.hotel,
            observaciones = EXCLUDED.observaciones
         RETURNING {COLUMNAS_ITINERARIO}"
    ))
    .bind(solicitud_id)
    .bind(body.aerolinea_id)
    .bind(&body.numero_vuelo)
    .bind(body.fecha_salida)
    .bind(body.fecha_regreso)
    .bind(&body.hotel)
    .bind(&body.observaciones)
    .fetch_one(&pool)
    .await?;

    Ok(Json(itinerario))
}

// DELETE /api/solicitudes/:id/itinerario
pub async fn delete_itinerario_handler(
    Path(solicitud_id): Path<i64>,
    State(pool): State<DbPool>,
) -> AppResult<StatusCode> {
    let res = sqlx::query("DELETE FROM itinerarios WHERE solicitud_id = $1")
        .bind(solicitud_id)
        .execute(&pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NoEncontrado("Itinerario"));
    }
    Ok(StatusCode::NO_CONTENT)
}
