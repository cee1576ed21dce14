use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    db::{bloquear_fila, DbPool},
    error::{AppError, AppResult},
    models::geografia::{Ciudad, CiudadSchema, Pais, PaisSchema},
    utils::validated_json::ValidatedJson,
};

// GET /api/paises
pub async fn list_paises_handler(State(pool): State<DbPool>) -> AppResult<Json<Vec<Pais>>> {
    let paises = sqlx::query_as::<_, Pais>(
        "SELECT id, nombre, codigo_iso FROM paises ORDER BY nombre ASC",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(paises))
}

// POST /api/admin/paises
pub async fn create_pais_handler(
    State(pool): State<DbPool>,
    ValidatedJson(body): ValidatedJson<PaisSchema>,
) -> AppResult<(StatusCode, Json<Pais>)> {
    let pais = sqlx::query_as::<_, Pais>(
        "INSERT INTO paises (nombre, codigo_iso) VALUES ($1, $2)
         RETURNING id, nombre, codigo_iso",
    )
    .bind(body.nombre.trim())
    .bind(body.codigo_iso.to_ascii_uppercase())
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(pais)))
}

// PUT /api/admin/paises/:id
pub async fn update_pais_handler(
    Path(id): Path<i32>,
    State(pool): State<DbPool>,
    ValidatedJson(body): ValidatedJson<PaisSchema>,
) -> AppResult<Json<Pais>> {
    let pais = sqlx::query_as::<_, Pais>(
        "UPDATE paises SET nombre = $1, codigo_iso = $2 WHERE id = $3
         RETURNING id, nombre, codigo_iso",
    )
    .bind(body.nombre.trim())
    .bind(body.codigo_iso.to_ascii_uppercase())
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NoEncontrado("País"))?;

    Ok(Json(pais))
}

// DELETE /api/admin/paises/:id (no se borra un país con ciudades o clientes)
pub async fn delete_pais_handler(
    Path(id): Path<i32>,
    State(pool): State<DbPool>,
) -> AppResult<StatusCode> {
    let mut tx = pool.begin().await?;
    if !bloquear_fila(&mut *tx, "paises", id).await? {
        return Err(AppError::NoEncontrado("País"));
    }

    let en_uso: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM ciudades WHERE pais_id = $1)
             OR EXISTS (SELECT 1 FROM clientes WHERE pais_id = $1)",
    )
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    if en_uso {
        return Err(AppError::Conflicto(
            "El país tiene ciudades o clientes asociados".to_string(),
        ));
    }

    sqlx::query("DELETE FROM paises WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/paises/:id/ciudades
pub async fn list_ciudades_handler(
    Path(pais_id): Path<i32>,
    State(pool): State<DbPool>,
) -> AppResult<Json<Vec<Ciudad>>> {
    let ciudades = sqlx::query_as::<_, Ciudad>(
        "SELECT id, nombre, pais_id FROM ciudades WHERE pais_id = $1 ORDER BY nombre ASC",
    )
    .bind(pais_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(ciudades))
}

// POST /api/admin/paises/:id/ciudades
pub async fn create_ciudad_handler(
    Path(pais_id): Path<i32>,
    State(pool): State<DbPool>,
    ValidatedJson(body): ValidatedJson<CiudadSchema>,
) -> AppResult<(StatusCode, Json<Ciudad>)> {
    let ciudad = sqlx::query_as::<_, Ciudad>(
        "INSERT INTO ciudades (nombre, pais_id) VALUES ($1, $2)
         RETURNING id, nombre, pais_id",
    )
    .bind(body.nombre.trim())
    .bind(pais_id)
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(ciudad)))
}

// DELETE /api/admin/ciudades/:id
pub async fn delete_ciudad_handler(
    Path(id): Path<i32>,
    State(pool): State<DbPool>,
) -> AppResult<StatusCode> {
    let mut tx = pool.begin().await?;
    if !bloquear_fila(&mut *tx, "ciudades", id).await? {
        return Err(AppError::NoEncontrado("Ciudad"));
    }

    let en_uso: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM clientes WHERE ciudad_id = $1)",
    )
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    if en_uso {
        return Err(AppError::Conflicto(
            "La ciudad tiene clientes asociados".to_string(),
        ));
    }

    sqlx::query("DELETE FROM ciudades WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}
