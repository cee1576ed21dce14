use sqlx::{postgres::PgPoolOptions, PgConnection, Pool, Postgres};

use crate::config::Config;

// Definimos un alias para "Pool<Postgres>"
pub type DbPool = Pool<Postgres>;

pub async fn init_db(config: &Config) -> Result<DbPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;

    // El esquema vive en migrations/ y se aplica al arrancar
    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Pool que no abre conexiones hasta la primera consulta.
pub fn lazy_pool(config: &Config) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect_lazy(&config.database_url)
}

/// Bloquea la fila `id` de `tabla` hasta el fin de la transacción. Mientras
/// tanto ninguna inserción puede referenciarla por clave foránea.
/// Devuelve `false` si la fila no existe.
pub async fn bloquear_fila(
    conn: &mut PgConnection,
    tabla: &'static str,
    id: i32,
) -> Result<bool, sqlx::Error> {
    let fila: Option<i32> =
        sqlx::query_scalar(&format!("SELECT id FROM {tabla} WHERE id = $1 FOR UPDATE"))
            .bind(id)
            .fetch_optional(conn)
            .await?;
    Ok(fila.is_some())
}
