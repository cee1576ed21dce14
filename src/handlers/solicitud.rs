use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use sqlx::{FromRow, Postgres, Transaction};

use crate::{
    config::Config,
    db::DbPool,
    error::{AppError, AppResult},
    handlers::documento::borrar_archivos,
    models::{
        documento::{Documento, COLUMNAS_DOCUMENTO},
        estado::{EstadoDescrito, EstadoSolicitud, TipoTramite},
        itinerario::Itinerario,
        pago::Pago,
        solicitud::{
            CreateSeguimientoSchema, CreateSolicitudSchema, Seguimiento, Solicitud,
            SolicitudDetalle, SolicitudFiltro, SolicitudResumen, UpdateSolicitudSchema,
        },
        usuario::Claims,
    },
    utils::{validacion::verificar_documentos, validated_json::ValidatedJson},
};

pub(crate) const COLUMNAS_SOLICITUD: &str = "id, cliente_id, tramite_id, empleado_id, \
     estado_actual, observaciones, created_at, updated_at";

const COLUMNAS_SEGUIMIENTO: &str = "id, solicitud_id, empleado_id, descripcion, estado, created_at";

pub(crate) const COLUMNAS_PAGO: &str =
    "id, solicitud_id, monto, metodo_pago_id, fecha, estado, referencia, created_at";

pub(crate) const COLUMNAS_ITINERARIO: &str = "id, solicitud_id, aerolinea_id, numero_vuelo, \
     fecha_salida, fecha_regreso, hotel, observaciones";

#[derive(FromRow)]
struct EstadoConTipo {
    #[sqlx(try_from = "String")]
    estado_actual: EstadoSolicitud,
    #[sqlx(try_from = "String")]
    tipo: TipoTramite,
}

/// Inserta una entrada del historial y actualiza el estado cacheado de la
/// solicitud dentro de la misma transacción.
async fn registrar_seguimiento(
    tx: &mut Transaction<'_, Postgres>,
    solicitud_id: i64,
    empleado_id: Option<i64>,
    descripcion: &str,
    estado: EstadoSolicitud,
) -> AppResult<Seguimiento> {
    let seguimiento = sqlx::query_as::<_, Seguimiento>(&format!(
        "INSERT INTO seguimientos (solicitud_id, empleado_id, descripcion, estado)
         VALUES ($1, $2, $3, $4)
         RETURNING {COLUMNAS_SEGUIMIENTO}"
    ))
    .bind(solicitud_id)
    .bind(empleado_id)
    .bind(descripcion)
    .bind(estado.codigo())
    .fetch_one(&mut **tx)
    .await?;

    sqlx::query("UPDATE solicitudes SET estado_actual = $1, updated_at = NOW() WHERE id = $2")
        .bind(estado.codigo())
        .bind(solicitud_id)
        .execute(&mut **tx)
        .await?;

    Ok(seguimiento)
}

pub(crate) async fn buscar_solicitudes(
    pool: &DbPool,
    filtro: &SolicitudFiltro,
) -> AppResult<Vec<SolicitudResumen>> {
    let solicitudes = sqlx::query_as::<_, SolicitudResumen>(
        "SELECT s.id, s.cliente_id, c.nombres || ' ' || c.apellidos AS cliente_nombre,
                s.tramite_id, t.nombre AS tramite_nombre, t.tipo, s.estado_actual, s.updated_at
         FROM solicitudes s
         JOIN clientes c ON c.id = s.cliente_id
         JOIN tramites t ON t.id = s.tramite_id
         WHERE ($1::text IS NULL OR s.estado_actual = $1)
           AND ($2::bigint IS NULL OR s.cliente_id = $2)
           AND ($3::int IS NULL OR s.tramite_id = $3)
           AND (NOT COALESCE($4, FALSE) OR s.estado_actual NOT IN ('finalizado', 'cancelado'))
         ORDER BY s.updated_at DESC, s.id DESC",
    )
    .bind(filtro.estado.map(EstadoSolicitud::codigo))
    .bind(filtro.cliente_id)
    .bind(filtro.tramite_id)
    .bind(filtro.solo_activas)
    .fetch_all(pool)
    .await?;

    Ok(solicitudes)
}

async fn tipo_de_solicitud(pool: &DbPool, solicitud: &Solicitud) -> AppResult<TipoTramite> {
    let tipo: String = sqlx::query_scalar("SELECT tipo FROM tramites WHERE id = $1")
        .bind(solicitud.tramite_id)
        .fetch_one(pool)
        .await?;
    tipo.parse::<TipoTramite>().map_err(AppError::dato_corrupto)
}

pub(crate) async fn obtener_solicitud(pool: &DbPool, id: i64) -> AppResult<Solicitud> {
    sqlx::query_as::<_, Solicitud>(&format!(
        "SELECT {COLUMNAS_SOLICITUD} FROM solicitudes WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NoEncontrado("Solicitud"))
}

async fn listar_seguimientos(pool: &DbPool, solicitud_id: i64) -> AppResult<Vec<Seguimiento>> {
    // El historial se muestra del más reciente al más antiguo
    let seguimientos = sqlx::query_as::<_, Seguimiento>(&format!(
        "SELECT {COLUMNAS_SEGUIMIENTO} FROM seguimientos WHERE solicitud_id = $1 ORDER BY id DESC"
    ))
    .bind(solicitud_id)
    .fetch_all(pool)
    .await?;
    Ok(seguimientos)
}

/// Solicitud con historial, documentos, pagos e itinerario.
pub(crate) async fn detalle_solicitud(pool: &DbPool, id: i64) -> AppResult<SolicitudDetalle> {
    let solicitud = obtener_solicitud(pool, id).await?;
    let tipo = tipo_de_solicitud(pool, &solicitud).await?;
    let seguimientos = listar_seguimientos(pool, id).await?;

    let documentos = sqlx::query_as::<_, Documento>(&format!(
        "SELECT {COLUMNAS_DOCUMENTO} FROM documentos WHERE solicitud_id = $1 ORDER BY id"
    ))
    .bind(id)
    .fetch_all(pool)
    .await?;

    let pagos = sqlx::query_as::<_, Pago>(&format!(
        "SELECT {COLUMNAS_PAGO} FROM pagos WHERE solicitud_id = $1 ORDER BY fecha, id"
    ))
    .bind(id)
    .fetch_all(pool)
    .await?;

    let itinerario = sqlx::query_as::<_, Itinerario>(&format!(
        "SELECT {COLUMNAS_ITINERARIO} FROM itinerarios WHERE solicitud_id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(SolicitudDetalle {
        estados_siguientes: tipo.estados_siguientes(solicitud.estado_actual),
        solicitud,
        tipo,
        seguimientos,
        documentos,
        pagos,
        itinerario,
    })
}

// GET /api/solicitudes (?estado=en_revision&cliente_id=1&tramite_id=2&solo_activas=true)
pub async fn list_solicitudes_handler(
    opts: Option<Query<SolicitudFiltro>>,
    State(pool): State<DbPool>,
) -> AppResult<Json<Vec<SolicitudResumen>>> {
    let Query(filtro) = opts.unwrap_or(Query(SolicitudFiltro {
        estado: None,
        cliente_id: None,
        tramite_id: None,
        solo_activas: None,
    }));

    Ok(Json(buscar_solicitudes(&pool, &filtro).await?))
}

// GET /api/solicitudes/:id
pub async fn get_solicitud_handler(
    Path(id): Path<i64>,
    State(pool): State<DbPool>,
) -> AppResult<Json<SolicitudDetalle>> {
    Ok(Json(detalle_solicitud(&pool, id).await?))
}

// POST /api/solicitudes: la solicitud nace con el estado inicial de su tipo y
// su primer seguimiento, todo en una transacción
pub async fn create_solicitud_handler(
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(body): ValidatedJson<CreateSolicitudSchema>,
) -> AppResult<(StatusCode, Json<SolicitudDetalle>)> {
    let mut tx = pool.begin().await?;

    let cliente_activo: Option<bool> = sqlx::query_scalar("SELECT activo FROM clientes WHERE id = $1")
        .bind(body.cliente_id)
        .fetch_optional(&mut *tx)
        .await?;
    match cliente_activo {
        None => return Err(AppError::validacion("El cliente indicado no existe")),
        Some(false) => return Err(AppError::validacion("El cliente está dado de baja")),
        Some(true) => {}
    }

    let tramite: Option<(String, bool)> =
        // FOR SHARE: el tipo no puede cambiar hasta que la solicitud exista
        sqlx::query_as("SELECT tipo, activo FROM tramites WHERE id = $1 FOR SHARE")
            .bind(body.tramite_id)
            .fetch_optional(&mut *tx)
            .await?;
    let tipo = match tramite {
        None => return Err(AppError::validacion("El trámite indicado no existe")),
        Some((_, false)) => return Err(AppError::validacion("El trámite no está activo")),
        Some((tipo, true)) => tipo
            .parse::<TipoTramite>()
            .map_err(AppError::dato_corrupto)?,
    };

    let estado_inicial = tipo.estado_inicial();
    let empleado_id = body.empleado_id.or(claims.empleado_id);

    let solicitud_id: i64 = sqlx::query_scalar(
        "INSERT INTO solicitudes (cliente_id, tramite_id, empleado_id, estado_actual, observaciones)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id",
    )
    .bind(body.cliente_id)
    .bind(body.tramite_id)
    .bind(empleado_id)
    .bind(estado_inicial.codigo())
    .bind(&body.observaciones)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| match AppError::from(e) {
        err if err.status() == StatusCode::CONFLICT => AppError::Conflicto(
            "El cliente ya tiene una solicitud activa para este trámite".to_string(),
        ),
        err => err,
    })?;

    registrar_seguimiento(
        &mut tx,
        solicitud_id,
        empleado_id,
        "Solicitud creada",
        estado_inicial,
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        "Solicitud {} creada para cliente {} ({})",
        solicitud_id,
        body.cliente_id,
        tipo
    );
    Ok((StatusCode::CREATED, Json(detalle_solicitud(&pool, solicitud_id).await?)))
}

// PUT /api/solicitudes/:id: responsable y observaciones; el estado solo cambia vía seguimientos
pub async fn update_solicitud_handler(
    Path(id): Path<i64>,
    State(pool): State<DbPool>,
    ValidatedJson(body): ValidatedJson<UpdateSolicitudSchema>,
) -> AppResult<Json<Solicitud>> {
    let solicitud = sqlx::query_as::<_, Solicitud>(&format!(
        "UPDATE solicitudes SET
            empleado_id = COALESCE($1, empleado_id),
            observaciones = COALESCE($2, observaciones),
            updated_at = NOW()
         WHERE id = $3
         RETURNING {COLUMNAS_SOLICITUD}"
    ))
    .bind(body.empleado_id)
    .bind(&body.observaciones)
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NoEncontrado("Solicitud"))?;

    Ok(Json(solicitud))
}

// DELETE /api/admin/solicitudes/:id (borra también los archivos subidos)
pub async fn delete_solicitud_handler(
    Path(id): Path<i64>,
    State(pool): State<DbPool>,
    State(config): State<Arc<Config>>,
) -> AppResult<StatusCode> {
    let mut tx = pool.begin().await?;

    let archivos: Vec<String> =
        sqlx::query_scalar("SELECT archivo FROM documentos WHERE solicitud_id = $1")
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;

    let res = sqlx::query("DELETE FROM solicitudes WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NoEncontrado("Solicitud"));
    }
    tx.commit().await?;

    borrar_archivos(&config.documentos_dir(), &archivos).await;
    tracing::info!("Solicitud {} eliminada ({} archivos)", id, archivos.len());
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/solicitudes/:id/estados-siguientes
pub async fn estados_siguientes_handler(
    Path(id): Path<i64>,
    State(pool): State<DbPool>,
) -> AppResult<Json<Vec<EstadoDescrito>>> {
    let solicitud = obtener_solicitud(&pool, id).await?;
    let tipo = tipo_de_solicitud(&pool, &solicitud).await?;

    Ok(Json(
        tipo.estados_siguientes(solicitud.estado_actual)
            .into_iter()
            .map(EstadoDescrito::from)
            .collect(),
    ))
}

// GET /api/solicitudes/:id/seguimientos
pub async fn list_seguimientos_handler(
    Path(id): Path<i64>,
    State(pool): State<DbPool>,
) -> AppResult<Json<Vec<Seguimiento>>> {
    obtener_solicitud(&pool, id).await?;
    Ok(Json(listar_seguimientos(&pool, id).await?))
}

// POST /api/solicitudes/:id/seguimientos
pub async fn create_seguimiento_handler(
    Path(id): Path<i64>,
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(body): ValidatedJson<CreateSeguimientoSchema>,
) -> AppResult<(StatusCode, Json<Seguimiento>)> {
    let mut tx = pool.begin().await?;

    // Bloqueo de fila: dos cambios de estado simultáneos se aplican en serie
    let actual = sqlx::query_as::<_, EstadoConTipo>(
        "SELECT s.estado_actual, t.tipo
         FROM solicitudes s JOIN tramites t ON t.id = s.tramite_id
         WHERE s.id = $1
         FOR UPDATE OF s",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AppError::NoEncontrado("Solicitud"))?;

    if !actual.tipo.puede_transicionar(actual.estado_actual, body.estado) {
        return Err(AppError::TransicionInvalida {
            desde: actual.estado_actual,
            hacia: body.estado,
        });
    }

    if body.estado.requiere_documentos() {
        let cantidad: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM documentos WHERE solicitud_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        verificar_documentos(body.estado, cantidad)?;
    }

    let seguimiento = registrar_seguimiento(
        &mut tx,
        id,
        body.empleado_id.or(claims.empleado_id),
        body.descripcion.trim(),
        body.estado,
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        "Solicitud {}: {} -> {}",
        id,
        actual.estado_actual,
        body.estado
    );
    Ok((StatusCode::CREATED, Json(seguimiento)))
}
