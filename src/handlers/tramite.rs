use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;

use crate::{
    db::{bloquear_fila, DbPool},
    error::{AppError, AppResult},
    models::{
        estado::{TipoTramite, VocabularioTipo},
        tramite::{
            CreateTramiteSchema, Tramite, TramiteDetalle, UpdateTramiteSchema, VinculoSchema,
        },
    },
    utils::validated_json::ValidatedJson,
};

pub(crate) const COLUMNAS_TRAMITE: &str = "id, nombre, tipo, descripcion, requisitos, costo, \
     duracion_estimada_dias, activo, created_at";

fn parse_tipo(valor: &str) -> AppResult<TipoTramite> {
    valor
        .parse::<TipoTramite>()
        .map_err(|e| AppError::validacion(e.to_string()))
}

fn validar_costo(costo: Option<Decimal>) -> AppResult<()> {
    match costo {
        Some(c) if c.is_sign_negative() => Err(AppError::validacion("El costo no puede ser negativo")),
        _ => Ok(()),
    }
}

fn limpiar_requisitos(requisitos: Vec<String>) -> Vec<String> {
    requisitos
        .into_iter()
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .collect()
}

// GET /api/tipos-tramite: vocabulario de estados por tipo para los selects del front
pub async fn list_tipos_handler() -> Json<Vec<VocabularioTipo>> {
    Json(TipoTramite::TODOS.into_iter().map(VocabularioTipo::from).collect())
}

// GET /api/tramites
pub async fn list_tramites_handler(State(pool): State<DbPool>) -> AppResult<Json<Vec<Tramite>>> {
    let tramites = sqlx::query_as::<_, Tramite>(&format!(
        "SELECT {COLUMNAS_TRAMITE} FROM tramites WHERE activo ORDER BY nombre"
    ))
    .fetch_all(&pool)
    .await?;

    Ok(Json(tramites))
}

async fn cargar_detalle(pool: &DbPool, tramite: Tramite) -> AppResult<TramiteDetalle> {
    let cliente_ids: Vec<i64> = sqlx::query_scalar(
        "SELECT cliente_id FROM tramite_clientes WHERE tramite_id = $1 ORDER BY cliente_id",
    )
    .bind(tramite.id)
    .fetch_all(pool)
    .await?;

    let empleado_ids: Vec<i64> = sqlx::query_scalar(
        "SELECT empleado_id FROM tramite_empleados WHERE tramite_id = $1 ORDER BY empleado_id",
    )
    .bind(tramite.id)
    .fetch_all(pool)
    .await?;

    Ok(TramiteDetalle {
        tramite,
        cliente_ids,
        empleado_ids,
    })
}

// GET /api/tramites/:id
pub async fn get_tramite_handler(
    Path(id): Path<i32>,
    State(pool): State<DbPool>,
) -> AppResult<Json<TramiteDetalle>> {
    let tramite = sqlx::query_as::<_, Tramite>(&format!(
        "SELECT {COLUMNAS_TRAMITE} FROM tramites WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NoEncontrado("Trámite"))?;

    Ok(Json(cargar_detalle(&pool, tramite).await?))
}

// POST /api/tramites: el trámite y sus vínculos se guardan en una sola transacción
pub async fn create_tramite_handler(
    State(pool): State<DbPool>,
    ValidatedJson(body): ValidatedJson<CreateTramiteSchema>,
) -> AppResult<(StatusCode, Json<TramiteDetalle>)> {
    let tipo = parse_tipo(&body.tipo_tramite)?;
    validar_costo(body.costo)?;

    let mut tx = pool.begin().await?;

    let tramite = sqlx::query_as::<_, Tramite>(&format!(
        "INSERT INTO tramites (nombre, tipo, descripcion, requisitos, costo, duracion_estimada_dias)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {COLUMNAS_TRAMITE}"
    ))
    .bind(body.nombre.trim())
    .bind(tipo.codigo())
    .bind(&body.descripcion)
    .bind(limpiar_requisitos(body.requisitos))
    .bind(body.costo.unwrap_or_default())
    .bind(body.duracion_estimada_dias)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO tramite_clientes (tramite_id, cliente_id)
         SELECT $1, UNNEST($2::bigint[]) ON CONFLICT DO NOTHING",
    )
    .bind(tramite.id)
    .bind(&body.cliente_ids)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO tramite_empleados (tramite_id, empleado_id)
         SELECT $1, UNNEST($2::bigint[]) ON CONFLICT DO NOTHING",
    )
    .bind(tramite.id)
    .bind(&body.empleado_ids)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!("Trámite {} ({}) creado", tramite.id, tipo);
    let detalle = cargar_detalle(&pool, tramite).await?;
    Ok((StatusCode::CREATED, Json(detalle)))
}

// PUT /api/tramites/:id
pub async fn update_tramite_handler(
    Path(id): Path<i32>,
    State(pool): State<DbPool>,
    ValidatedJson(body): ValidatedJson<UpdateTramiteSchema>,
) -> AppResult<Json<Tramite>> {
    let tipo = body.tipo_tramite.as_deref().map(parse_tipo).transpose()?;
    validar_costo(body.costo)?;

    let mut tx = pool.begin().await?;
    if !bloquear_fila(&mut *tx, "tramites", id).await? {
        return Err(AppError::NoEncontrado("Trámite"));
    }

    // Cambiar el tipo dejaría huérfanos los estados de solicitudes en curso
    if tipo.is_some() {
        let activas: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM solicitudes
             WHERE tramite_id = $1 AND estado_actual NOT IN ('finalizado', 'cancelado')",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if activas > 0 {
            return Err(AppError::Conflicto(
                "No se puede cambiar el tipo de un trámite con solicitudes activas".to_string(),
            ));
        }
    }

    let tramite = sqlx::query_as::<_, Tramite>(&format!(
        "UPDATE tramites SET
            nombre = COALESCE($1, nombre),
            tipo = COALESCE($2, tipo),
            descripcion = COALESCE($3, descripcion),
            requisitos = COALESCE($4, requisitos),
            costo = COALESCE($5, costo),
            duracion_estimada_dias = COALESCE($6, duracion_estimada_dias),
            activo = COALESCE($7, activo)
         WHERE id = $8
         RETURNING {COLUMNAS_TRAMITE}"
    ))
    .bind(&body.nombre)
    .bind(tipo.map(TipoTramite::codigo))
    .bind(&body.descripcion)
    .bind(body.requisitos.map(limpiar_requisitos))
    .bind(body.costo)
    .bind(body.duracion_estimada_dias)
    .bind(body.activo)
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok(Json(tramite))
}

// DELETE /api/admin/tramites/:id: con solicitudes se desactiva, sin ellas se borra
pub async fn delete_tramite_handler(
    Path(id): Path<i32>,
    State(pool): State<DbPool>,
) -> AppResult<StatusCode> {
    let mut tx = pool.begin().await?;
    if !bloquear_fila(&mut *tx, "tramites", id).await? {
        return Err(AppError::NoEncontrado("Trámite"));
    }

    let con_solicitudes: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM solicitudes WHERE tramite_id = $1)")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

    let sql = if con_solicitudes {
        "UPDATE tramites SET activo = FALSE WHERE id = $1"
    } else {
        "DELETE FROM tramites WHERE id = $1"
    };
    sqlx::query(sql).bind(id).execute(&mut *tx).await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/tramites/:id/clientes
pub async fn link_cliente_handler(
    Path(id): Path<i32>,
    State(pool): State<DbPool>,
    ValidatedJson(body): ValidatedJson<VinculoSchema>,
) -> AppResult<StatusCode> {
    sqlx::query(
        "INSERT INTO tramite_clientes (tramite_id, cliente_id) VALUES ($1, $2)
         ON CONFLICT DO NOTHING",
    )
    .bind(id)
    .bind(body.id)
    .execute(&pool)
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

// DELETE /api/tramites/:id/clientes/:cliente_id
pub async fn unlink_cliente_handler(
    Path((id, cliente_id)): Path<(i32, i64)>,
    State(pool): State<DbPool>,
) -> AppResult<StatusCode> {
    let res = sqlx::query("DELETE FROM tramite_clientes WHERE tramite_id = $1 AND cliente_id = $2")
        .bind(id)
        .bind(cliente_id)
        .execute(&pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NoEncontrado("Vínculo"));
    }
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/tramites/:id/empleados
pub async fn link_empleado_handler(
    Path(id): Path<i32>,
    State(pool): State<DbPool>,
    ValidatedJson(body): ValidatedJson<VinculoSchema>,
) -> AppResult<StatusCode> {
    sqlx::query(
        "INSERT INTO tramite_empleados (tramite_id, empleado_id) VALUES ($1, $2)
         ON CONFLICT DO NOTHING",
    )
    .bind(id)
    .bind(body.id)
    .execute(&pool)
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

// DELETE /api/tramites/:id/empleados/:empleado_id
pub async fn unlink_empleado_handler(
    Path((id, empleado_id)): Path<(i32, i64)>,
    State(pool): State<DbPool>,
) -> AppResult<StatusCode> {
    let res =
        sqlx::query("DELETE FROM tramite_empleados WHERE tramite_id = $1 AND empleado_id = $2")
            .bind(id)
            .bind(empleado_id)
            .execute(&pool)
            .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NoEncontrado("Vínculo"));
    }
    Ok(StatusCode::NO_CONTENT)
}
