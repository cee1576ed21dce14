use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Serialize, FromRow)]
pub struct ConteoPorEstado {
    pub estado: String,
    pub total: i64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct ConteoPorTramite {
    pub tramite_id: i32,
    pub nombre: String,
    pub tipo: String,
    pub total: i64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct ConteoPorPais {
    pub pais_id: i32,
    pub pais: String,
    pub total: i64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct Resumen {
    pub clientes_activos: i64,
    pub solicitudes_activas: i64,
    pub pagos_pendientes: i64,
    pub monto_validado: Decimal,
}
