use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RolUsuario {
    Admin,
    Empleado,
    Cliente,
}

impl RolUsuario {
    pub fn codigo(self) -> &'static str {
        match self {
            RolUsuario::Admin => "admin",
            RolUsuario::Empleado => "empleado",
            RolUsuario::Cliente => "cliente",
        }
    }

    /// Admin y empleados operan el back-office.
    pub fn es_personal(self) -> bool {
        matches!(self, RolUsuario::Admin | RolUsuario::Empleado)
    }
}

#[derive(Debug, Error)]
#[error("Rol de usuario desconocido: '{0}'")]
pub struct RolDesconocido(pub String);

impl TryFrom<String> for RolUsuario {
    type Error = RolDesconocido;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "admin" => Ok(RolUsuario::Admin),
            "empleado" => Ok(RolUsuario::Empleado),
            "cliente" => Ok(RolUsuario::Cliente),
            _ => Err(RolDesconocido(value)),
        }
    }
}

// Fila de la tabla usuarios
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Usuario {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub rol: RolUsuario,
    pub empleado_id: Option<i64>,
    pub cliente_id: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(email(message = "Email inválido"))]
    pub email: String,
    #[validate(length(min = 1, message = "La contraseña es obligatoria"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterPayload {
    #[validate(length(min = 3, max = 60))]
    pub username: String,
    #[validate(email(message = "Email inválido"))]
    pub email: String,
    #[validate(length(min = 8, max = 100, message = "La contraseña debe tener al menos 8 caracteres"))]
    pub password: String,
    /// Ignorado para el primer usuario, que siempre es admin.
    pub rol: Option<RolUsuario>,
    pub empleado_id: Option<i64>,
    pub cliente_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub token_type: String,
    pub usuario: Usuario,
}

// Contenido del token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
    pub user_id: i64,
    pub role: RolUsuario,
    pub empleado_id: Option<i64>,
    pub cliente_id: Option<i64>,
}
