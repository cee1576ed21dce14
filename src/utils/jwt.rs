use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    config::Config,
    error::AppError,
    models::usuario::{Claims, RolUsuario, Usuario},
};

/// Firma un token para el usuario con la expiración configurada.
pub fn crear_token(usuario: &Usuario, config: &Config) -> Result<String, AppError> {
    let ahora = Utc::now();
    let expiracion = ahora + Duration::hours(config.jwt_expiracion_horas);

    let claims = Claims {
        sub: usuario.email.clone(),
        exp: expiracion.timestamp() as usize,
        iat: ahora.timestamp() as usize,
        user_id: usuario.id,
        role: usuario.rol,
        empleado_id: usuario.empleado_id,
        cliente_id: usuario.cliente_id,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )?)
}

/// Decodifica y verifica firma y expiración.
pub fn verificar_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::TokenInvalido)
}

fn autenticar(
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    config: &Config,
) -> Result<Claims, AppError> {
    let TypedHeader(auth) = auth.ok_or(AppError::TokenAusente)?;
    verificar_token(auth.token(), &config.jwt_secret)
}

// Cualquier usuario autenticado; adjunta los claims para los handlers
pub async fn auth_middleware(
    State(config): State<Arc<Config>>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = autenticar(auth, &config)?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

// Admin o empleado (back-office)
pub async fn staff_middleware(
    State(config): State<Arc<Config>>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = autenticar(auth, &config)?;
    if !claims.role.es_personal() {
        return Err(AppError::Prohibido("Solo el personal puede acceder"));
    }
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

pub async fn admin_middleware(
    State(config): State<Arc<Config>>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = autenticar(auth, &config)?;
    if claims.role != RolUsuario::Admin {
        return Err(AppError::Prohibido("Se requiere rol de administrador"));
    }
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
