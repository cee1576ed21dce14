use std::net::SocketAddr;

use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tramites_backend::{config::Config, db, routes, state::AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().inspect_err(|e| tracing::error!("❌ {}", e))?;

    let pool = db::init_db(&config)
        .await
        .inspect_err(|e| tracing::error!("❌ No se pudo preparar la base de datos: {}", e))?;
    tracing::info!("✅ Conexión a Postgres exitosa, migraciones aplicadas");

    tokio::fs::create_dir_all(config.documentos_dir()).await?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = routes::create_routes(AppState::new(pool, config)).layer(cors);

    tracing::info!("🚀 Servidor de trámites corriendo en http://{}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
