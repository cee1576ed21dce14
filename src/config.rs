use std::{env, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("La variable de entorno {0} no está definida")]
    Falta(&'static str),

    #[error("La variable de entorno {0} tiene un valor inválido: {1}")]
    Invalida(&'static str, String),
}

/// Configuración leída del entorno (y del archivo `.env`) al arrancar.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiracion_horas: i64,
    pub upload_dir: PathBuf,
    pub db_max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            port: parse_or("PORT", 5000)?,
            database_url: requerida("DATABASE_URL")?,
            jwt_secret: requerida("JWT_SECRET")?,
            jwt_expiracion_horas: parse_or("JWT_EXPIRACION_HORAS", 24)?,
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 5)?,
        })
    }

    /// Carpeta donde se guardan los archivos de documentos.
    pub fn documentos_dir(&self) -> PathBuf {
        self.upload_dir.join("documentos")
    }
}

fn requerida(nombre: &'static str) -> Result<String, ConfigError> {
    match env::var(nombre) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::Falta(nombre)),
    }
}

fn parse_or<T: std::str::FromStr>(nombre: &'static str, defecto: T) -> Result<T, ConfigError> {
    match env::var(nombre) {
        Ok(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalida(nombre, v)),
        Err(_) => Ok(defecto),
    }
}
