use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;

use crate::{
    config::Config,
    db::DbPool,
    error::{AppError, AppResult},
    models::usuario::{AuthResponse, Claims, LoginPayload, RegisterPayload, RolUsuario, Usuario},
    utils::{
        jwt::{crear_token, verificar_token},
        security::{hash_password, verify_password},
        validated_json::ValidatedJson,
    },
};

const COLUMNAS_USUARIO: &str = "id, username, email, password_hash, rol, empleado_id, cliente_id";

// POST /api/auth/register (solo admins; el primer usuario se crea sin token y queda como admin)
pub async fn register_handler(
    State(pool): State<DbPool>,
    State(config): State<Arc<Config>>,
    maybe_auth: Option<TypedHeader<Authorization<Bearer>>>,
    ValidatedJson(payload): ValidatedJson<RegisterPayload>,
) -> AppResult<(StatusCode, Json<Usuario>)> {
    let hashed_password = hash_password(&payload.password)?;

    // Conteo y alta bajo el mismo bloqueo de tabla: solo un primer usuario
    let mut tx = pool.begin().await?;
    sqlx::query("LOCK TABLE usuarios IN SHARE ROW EXCLUSIVE MODE")
        .execute(&mut *tx)
        .await?;

    let user_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM usuarios")
        .fetch_one(&mut *tx)
        .await?;

    // Si ya hay usuarios, exigimos token admin
    if user_count > 0 {
        let TypedHeader(auth_header) = maybe_auth.ok_or(AppError::Prohibido(
            "Solo un admin puede crear usuarios",
        ))?;
        let claims = verificar_token(auth_header.token(), &config.jwt_secret)?;
        if claims.role != RolUsuario::Admin {
            return Err(AppError::Prohibido("Solo un admin puede crear usuarios"));
        }
    }

    let rol = if user_count == 0 {
        RolUsuario::Admin
    } else {
        payload.rol.unwrap_or(RolUsuario::Empleado)
    };

    if rol == RolUsuario::Cliente && payload.cliente_id.is_none() {
        return Err(AppError::validacion(
            "Un usuario cliente debe estar vinculado a un cliente",
        ));
    }

    let usuario = sqlx::query_as::<_, Usuario>(&format!(
        "INSERT INTO usuarios (username, email, password_hash, rol, empleado_id, cliente_id)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {COLUMNAS_USUARIO}"
    ))
    .bind(&payload.username)
    .bind(payload.email.to_lowercase())
    .bind(&hashed_password)
    .bind(rol.codigo())
    .bind(payload.empleado_id)
    .bind(payload.cliente_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!("Usuario {} creado con rol {}", usuario.email, rol.codigo());
    Ok((StatusCode::CREATED, Json(usuario)))
}

// POST /api/auth/login
pub async fn login_handler(
    State(pool): State<DbPool>,
    State(config): State<Arc<Config>>,
    ValidatedJson(payload): ValidatedJson<LoginPayload>,
) -> AppResult<Json<AuthResponse>> {
    let usuario = sqlx::query_as::<_, Usuario>(&format!(
        "SELECT {COLUMNAS_USUARIO} FROM usuarios WHERE email = $1"
    ))
    .bind(payload.email.to_lowercase())
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::CredencialesInvalidas)?;

    if !verify_password(&payload.password, &usuario.password_hash) {
        return Err(AppError::CredencialesInvalidas);
    }

    let token = crear_token(&usuario, &config)?;

    Ok(Json(AuthResponse {
        token,
        token_type: "Bearer".to_string(),
        usuario,
    }))
}

// GET /api/auth/me
pub async fn me_handler(Extension(claims): Extension<Claims>) -> Json<Claims> {
    Json(claims)
}
