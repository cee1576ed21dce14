use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    db::DbPool,
    error::{AppError, AppResult},
    models::cliente::{Cliente, ClienteFiltro, CreateClienteSchema, UpdateClienteSchema},
    utils::{
        validacion::{validar_identificacion, TipoIdentificacion},
        validated_json::ValidatedJson,
    },
};

pub(crate) const COLUMNAS_CLIENTE: &str = "id, nombres, apellidos, tipo_identificacion, \
     numero_identificacion, fecha_nacimiento, email, telefono, direccion, pais_id, ciudad_id, \
     activo, created_at";

// Revalida identificación y ciudad contra el país antes de escribir
async fn validar_ubicacion_e_identificacion(
    pool: &DbPool,
    pais_id: i32,
    ciudad_id: Option<i32>,
    tipo: TipoIdentificacion,
    numero: &str,
) -> AppResult<()> {
    let codigo_iso: String = sqlx::query_scalar("SELECT codigo_iso FROM paises WHERE id = $1")
        .bind(pais_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::validacion("El país indicado no existe"))?;

    validar_identificacion(tipo, &codigo_iso, numero)?;

    if let Some(ciudad_id) = ciudad_id {
        let coincide: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM ciudades WHERE id = $1 AND pais_id = $2)",
        )
        .bind(ciudad_id)
        .bind(pais_id)
        .fetch_one(pool)
        .await?;

        if !coincide {
            return Err(AppError::validacion("La ciudad no pertenece al país indicado"));
        }
    }
    Ok(())
}

// GET /api/clientes (?search=texto&pais_id=1&incluir_inactivos=true)
pub async fn list_clientes_handler(
    opts: Option<Query<ClienteFiltro>>,
    State(pool): State<DbPool>,
) -> AppResult<Json<Vec<Cliente>>> {
    let Query(opts) = opts.unwrap_or(Query(ClienteFiltro {
        search: None,
        pais_id: None,
        incluir_inactivos: None,
    }));

    let clientes = sqlx::query_as::<_, Cliente>(&format!(
        "SELECT {COLUMNAS_CLIENTE} FROM clientes
         WHERE
            ($1::text IS NULL OR (nombres ILIKE '%' || $1 || '%'
                OR apellidos ILIKE '%' || $1 || '%'
                OR numero_identificacion ILIKE '%' || $1 || '%'))
            AND ($2::int IS NULL OR pais_id = $2)
            AND (activo OR COALESCE($3, FALSE))
         ORDER BY apellidos, nombres"
    ))
    .bind(opts.search.filter(|s| !s.trim().is_empty()))
    .bind(opts.pais_id)
    .bind(opts.incluir_inactivos)
    .fetch_all(&pool)
    .await?;

    Ok(Json(clientes))
}

pub async fn get_cliente_handler(
    Path(id): Path<i64>,
    State(pool): State<DbPool>,
) -> AppResult<Json<Cliente>> {
    let cliente = sqlx::query_as::<_, Cliente>(&format!(
        "SELECT {COLUMNAS_CLIENTE} FROM clientes WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NoEncontrado("Cliente"))?;

    Ok(Json(cliente))
}

// POST /api/clientes
pub async fn create_cliente_handler(
    State(pool): State<DbPool>,
    ValidatedJson(body): ValidatedJson<CreateClienteSchema>,
) -> AppResult<(StatusCode, Json<Cliente>)> {
    let numero = body.numero_identificacion.trim().to_uppercase();
    validar_ubicacion_e_identificacion(
        &pool,
        body.pais_id,
        body.ciudad_id,
        body.tipo_identificacion,
        &numero,
    )
    .await?;

    let cliente = sqlx::query_as::<_, Cliente>(&format!(
        "INSERT INTO clientes (nombres, apellidos, tipo_identificacion, numero_identificacion,
            fecha_nacimiento, email, telefono, direccion, pais_id, ciudad_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         RETURNING {COLUMNAS_CLIENTE}"
    ))
    .bind(body.nombres.trim())
    .bind(body.apellidos.trim())
    .bind(body.tipo_identificacion.codigo())
    .bind(&numero)
    .bind(body.fecha_nacimiento)
    .bind(&body.email)
    .bind(&body.telefono)
    .bind(&body.direccion)
    .bind(body.pais_id)
    .bind(body.ciudad_id)
    .fetch_one(&pool)
    .await?;

    tracing::info!("Cliente {} creado", cliente.id);
    Ok((StatusCode::CREATED, Json(cliente)))
}

// PUT /api/clientes/:id
pub async fn update_cliente_handler(
    Path(id): Path<i64>,
    State(pool): State<DbPool>,
    ValidatedJson(body): ValidatedJson<UpdateClienteSchema>,
) -> AppResult<Json<Cliente>> {
    let actual = sqlx::query_as::<_, Cliente>(&format!(
        "SELECT {COLUMNAS_CLIENTE} FROM clientes WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NoEncontrado("Cliente"))?;

    let tipo = body.tipo_identificacion.unwrap_or(actual.tipo_identificacion);
    let numero = body
        .numero_identificacion
        .as_deref()
        .map(|n| n.trim().to_uppercase())
        .unwrap_or(actual.numero_identificacion);
    let pais_id = body.pais_id.unwrap_or(actual.pais_id);
    // Si cambia el país sin ciudad nueva, la ciudad anterior ya no aplica
    let ciudad_id = match (body.ciudad_id, body.pais_id) {
        (Some(c), _) => Some(c),
        (None, Some(p)) if p != actual.pais_id => None,
        (None, _) => actual.ciudad_id,
    };

    validar_ubicacion_e_identificacion(&pool, pais_id, ciudad_id, tipo, &numero).await?;

    let cliente = sqlx::query_as::<_, Cliente>(&format!(
        "UPDATE clientes SET
            nombres = COALESCE($1, nombres),
            apellidos = COALESCE($2, apellidos),
            tipo_identificacion = $3,
            numero_identificacion = $4,
            fecha_nacimiento = COALESCE($5, fecha_nacimiento),
            email = COALESCE($6, email),
            telefono = COALESCE($7, telefono),
            direccion = COALESCE($8, direccion),
            pais_id = $9,
            ciudad_id = $10
         WHERE id = $11
         RETURNING {COLUMNAS_CLIENTE}"
    ))
    .bind(&body.nombres)
    .bind(&body.apellidos)
    .bind(tipo.codigo())
    .bind(&numero)
    .bind(body.fecha_nacimiento)
    .bind(&body.email)
    .bind(&body.telefono)
    .bind(&body.direccion)
    .bind(pais_id)
    .bind(ciudad_id)
    .bind(id)
    .fetch_one(&pool)
    .await?;

    Ok(Json(cliente))
}

// DELETE /api/admin/clientes/:id: baja lógica
pub async fn delete_cliente_handler(
    Path(id): Path<i64>,
    State(pool): State<DbPool>,
) -> AppResult<StatusCode> {
    let res = sqlx::query("UPDATE clientes SET activo = FALSE WHERE id = $1 AND activo")
        .bind(id)
        .execute(&pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NoEncontrado("Cliente"));
    }
    tracing::info!("Cliente {} dado de baja", id);
    Ok(StatusCode::NO_CONTENT)
}
