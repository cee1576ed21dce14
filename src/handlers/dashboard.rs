use axum::{extract::State, Json};

use crate::{
    db::DbPool,
    error::AppResult,
    models::dashboard::{ConteoPorEstado, ConteoPorPais, ConteoPorTramite, Resumen},
};

// Agregados para los gráficos del panel; se calculan en cada petición

// GET /api/dashboard/grupos-activos
pub async fn grupos_activos_handler(
    State(pool): State<DbPool>,
) -> AppResult<Json<Vec<ConteoPorEstado>>> {
    let grupos = sqlx::query_as::<_, ConteoPorEstado>(
        "SELECT estado_actual AS estado, COUNT(*) AS total
         FROM solicitudes
         WHERE estado_actual NOT IN ('finalizado', 'cancelado')
         GROUP BY estado_actual
         ORDER BY total DESC, estado_actual",
    )
    .fetch_all(&pool)
    .await?;
    Ok(Json(grupos))
}

// GET /api/dashboard/tramites-activos
pub async fn tramites_activos_handler(
    State(pool): State<DbPool>,
) -> AppResult<Json<Vec<ConteoPorTramite>>> {
    let tramites = sqlx::query_as::<_, ConteoPorTramite>(
        "SELECT t.id AS tramite_id, t.nombre, t.tipo, COUNT(s.id) AS total
         FROM tramites t
         JOIN solicitudes s ON s.tramite_id = t.id
         WHERE s.estado_actual NOT IN ('finalizado', 'cancelado')
         GROUP BY t.id, t.nombre, t.tipo
         ORDER BY total DESC, t.nombre",
    )
    .fetch_all(&pool)
    .await?;
    Ok(Json(tramites))
}

// GET /api/dashboard/clientes-por-pais
pub async fn clientes_por_pais_handler(
    State(pool): State<DbPool>,
) -> AppResult<Json<Vec<ConteoPorPais>>> {
    let paises = sqlx::query_as::<_, ConteoPorPais>(
        "SELECT p.id AS pais_id, p.nombre AS pais, COUNT(c.id) AS total
         FROM paises p
         JOIN clientes c ON c.pais_id = p.id
         WHERE c.activo
         GROUP BY p.id, p.nombre
         ORDER BY total DESC, p.nombre",
    )
    .fetch_all(&pool)
    .await?;
    Ok(Json(paises))
}

// GET /api/dashboard/resumen
pub async fn resumen_handler(State(pool): State<DbPool>) -> AppResult<Json<Resumen>> {
    let resumen = sqlx::query_as::<_, Resumen>(
        "SELECT
            (SELECT COUNT(*) FROM clientes WHERE activo) AS clientes_activos,
            (SELECT COUNT(*) FROM solicitudes
                WHERE estado_actual NOT IN ('finalizado', 'cancelado')) AS solicitudes_activas,
            (SELECT COUNT(*) FROM pagos WHERE estado = 'pendiente') AS pagos_pendientes,
            (SELECT COALESCE(SUM(monto), 0) FROM pagos WHERE estado = 'validado') AS monto_validado",
    )
    .fetch_one(&pool)
    .await?;
    Ok(Json(resumen))
}
