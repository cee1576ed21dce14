use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    db::{bloquear_fila, DbPool},
    error::{AppError, AppResult},
    models::personal::{
        Area, AreaSchema, CreateEmpleadoSchema, Empleado, Rol, RolSchema, UpdateEmpleadoSchema,
    },
    utils::validated_json::ValidatedJson,
};

const COLUMNAS_EMPLEADO: &str =
    "id, nombres, apellidos, email, telefono, rol_id, area_id, activo, created_at";

// --- Roles ---

pub async fn list_roles_handler(State(pool): State<DbPool>) -> AppResult<Json<Vec<Rol>>> {
    let roles = sqlx::query_as::<_, Rol>("SELECT id, nombre, descripcion FROM roles ORDER BY nombre")
        .fetch_all(&pool)
        .await?;
    Ok(Json(roles))
}

pub async fn create_rol_handler(
    State(pool): State<DbPool>,
    ValidatedJson(body): ValidatedJson<RolSchema>,
) -> AppResult<(StatusCode, Json<Rol>)> {
    let rol = sqlx::query_as::<_, Rol>(
        "INSERT INTO roles (nombre, descripcion) VALUES ($1, $2)
         RETURNING id, nombre, descripcion",
    )
    .bind(body.nombre.trim())
    .bind(&body.descripcion)
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(rol)))
}

pub async fn update_rol_handler(
    Path(id): Path<i32>,
    State(pool): State<DbPool>,
    ValidatedJson(body): ValidatedJson<RolSchema>,
) -> AppResult<Json<Rol>> {
    let rol = sqlx::query_as::<_, Rol>(
        "UPDATE roles SET nombre = $1, descripcion = $2 WHERE id = $3
         RETURNING id, nombre, descripcion",
    )
    .bind(body.nombre.trim())
    .bind(&body.descripcion)
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NoEncontrado("Rol"))?;

    Ok(Json(rol))
}

// DELETE /api/admin/roles/:id: un rol con empleados asignados no se puede borrar
pub async fn delete_rol_handler(
    Path(id): Path<i32>,
    State(pool): State<DbPool>,
) -> AppResult<StatusCode> {
    let mut tx = pool.begin().await?;
    if !bloquear_fila(&mut *tx, "roles", id).await? {
        return Err(AppError::NoEncontrado("Rol"));
    }

    let asignados: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM empleados WHERE rol_id = $1")
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

    if asignados > 0 {
        return Err(AppError::Conflicto(format!(
            "El rol tiene {asignados} empleado(s) asignado(s)"
        )));
    }

    sqlx::query("DELETE FROM roles WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    tracing::info!("Rol {} eliminado", id);
    Ok(StatusCode::NO_CONTENT)
}

// --- Áreas ---

pub async fn list_areas_handler(State(pool): State<DbPool>) -> AppResult<Json<Vec<Area>>> {
    let areas = sqlx::query_as::<_, Area>(
        "SELECT id, nombre, descripcion, responsable_id FROM areas ORDER BY nombre",
    )
    .fetch_all(&pool)
    .await?;
    Ok(Json(areas))
}

pub async fn create_area_handler(
    State(pool): State<DbPool>,
    ValidatedJson(body): ValidatedJson<AreaSchema>,
) -> AppResult<(StatusCode, Json<Area>)> {
    let area = sqlx::query_as::<_, Area>(
        "INSERT INTO areas (nombre, descripcion, responsable_id) VALUES ($1, $2, $3)
         RETURNING id, nombre, descripcion, responsable_id",
    )
    .bind(body.nombre.trim())
    .bind(&body.descripcion)
    .bind(body.responsable_id)
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(area)))
}

pub async fn update_area_handler(
    Path(id): Path<i32>,
    State(pool): State<DbPool>,
    ValidatedJson(body): ValidatedJson<AreaSchema>,
) -> AppResult<Json<Area>> {
    let area = sqlx::query_as::<_, Area>(
        "UPDATE areas SET nombre = $1, descripcion = $2, responsable_id = $3 WHERE id = $4
         RETURNING id, nombre, descripcion, responsable_id",
    )
    .bind(body.nombre.trim())
    .bind(&body.descripcion)
    .bind(body.responsable_id)
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NoEncontrado("Área"))?;

    Ok(Json(area))
}

pub async fn delete_area_handler(
    Path(id): Path<i32>,
    State(pool): State<DbPool>,
) -> AppResult<StatusCode> {
    let mut tx = pool.begin().await?;
    if !bloquear_fila(&mut *tx, "areas", id).await? {
        return Err(AppError::NoEncontrado("Área"));
    }

    let asignados: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM empleados WHERE area_id = $1")
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

    if asignados > 0 {
        return Err(AppError::Conflicto(format!(
            "El área tiene {asignados} empleado(s) asignado(s)"
        )));
    }

    sqlx::query("DELETE FROM areas WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Empleados ---

pub async fn list_empleados_handler(
    State(pool): State<DbPool>,
) -> AppResult<Json<Vec<Empleado>>> {
    let empleados = sqlx::query_as::<_, Empleado>(&format!(
        "SELECT {COLUMNAS_EMPLEADO} FROM empleados ORDER BY apellidos, nombres"
    ))
    .fetch_all(&pool)
    .await?;
    Ok(Json(empleados))
}

pub async fn get_empleado_handler(
    Path(id): Path<i64>,
    State(pool): State<DbPool>,
) -> AppResult<Json<Empleado>> {
    let empleado = sqlx::query_as::<_, Empleado>(&format!(
        "SELECT {COLUMNAS_EMPLEADO} FROM empleados WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NoEncontrado("Empleado"))?;
    Ok(Json(empleado))
}

pub async fn create_empleado_handler(
    State(pool): State<DbPool>,
    ValidatedJson(body): ValidatedJson<CreateEmpleadoSchema>,
) -> AppResult<(StatusCode, Json<Empleado>)> {
    let empleado = sqlx::query_as::<_, Empleado>(&format!(
        "INSERT INTO empleados (nombres, apellidos, email, telefono, rol_id, area_id)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {COLUMNAS_EMPLEADO}"
    ))
    .bind(body.nombres.trim())
    .bind(body.apellidos.trim())
    .bind(body.email.to_lowercase())
    .bind(&body.telefono)
    .bind(body.rol_id)
    .bind(body.area_id)
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(empleado)))
}

pub async fn update_empleado_handler(
    Path(id): Path<i64>,
    State(pool): State<DbPool>,
    ValidatedJson(body): ValidatedJson<UpdateEmpleadoSchema>,
) -> AppResult<Json<Empleado>> {
    // COALESCE: si el campo no viene, se conserva el valor actual
    let empleado = sqlx::query_as::<_, Empleado>(&format!(
        "UPDATE empleados SET
            nombres = COALESCE($1, nombres),
            apellidos = COALESCE($2, apellidos),
            email = COALESCE($3, email),
            telefono = COALESCE($4, telefono),
            rol_id = COALESCE($5, rol_id),
            area_id = COALESCE($6, area_id),
            activo = COALESCE($7, activo)
         WHERE id = $8
         RETURNING {COLUMNAS_EMPLEADO}"
    ))
    .bind(&body.nombres)
    .bind(&body.apellidos)
    .bind(body.email.as_ref().map(|e| e.to_lowercase()))
    .bind(&body.telefono)
    .bind(body.rol_id)
    .bind(body.area_id)
    .bind(body.activo)
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NoEncontrado("Empleado"))?;

    Ok(Json(empleado))
}

// DELETE /api/admin/empleados/:id: baja lógica, el historial conserva la referencia
pub async fn delete_empleado_handler(
    Path(id): Path<i64>,
    State(pool): State<DbPool>,
) -> AppResult<StatusCode> {
    let res = sqlx::query("UPDATE empleados SET activo = FALSE WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NoEncontrado("Empleado"));
    }
    Ok(StatusCode::NO_CONTENT)
}
