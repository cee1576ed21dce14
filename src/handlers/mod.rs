pub mod auth;
pub mod cliente;
pub mod dashboard;
pub mod documento;
pub mod geografia;
pub mod itinerario;
pub mod pago;
pub mod personal;
pub mod portal;
pub mod solicitud;
pub mod tramite;

use axum::Json;
use serde_json::{json, Value};

// GET /api/health (no toca la base de datos)
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}
