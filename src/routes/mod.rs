use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    handlers::{
        auth, cliente, dashboard, documento, geografia, health_handler, itinerario, pago,
        personal, portal, solicitud, tramite,
    },
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware, staff_middleware},
};

// El multipart lleva algo de sobrecarga además del archivo
const LIMITE_SUBIDA: usize = documento::MAX_DOCUMENTO_BYTES + 1024 * 1024;

pub fn create_routes(state: AppState) -> Router {
    // 1. Rutas públicas
    let public_routes = Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/auth/register", post(auth::register_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .route("/api/tipos-tramite", get(tramite::list_tipos_handler))
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir));

    // 2. Cualquier usuario autenticado (incluye el portal del cliente)
    let user_routes = Router::new()
        .route("/api/auth/me", get(auth::me_handler))
        .route("/api/portal/solicitudes", get(portal::mis_solicitudes_handler))
        .route("/api/portal/solicitudes/:id", get(portal::mi_solicitud_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // 3. Personal de la agencia (admin o empleado)
    let staff_routes = Router::new()
        // Catálogos de consulta
        .route("/api/paises", get(geografia::list_paises_handler))
        .route("/api/paises/:id/ciudades", get(geografia::list_ciudades_handler))
        .route("/api/roles", get(personal::list_roles_handler))
        .route("/api/areas", get(personal::list_areas_handler))
        .route("/api/empleados", get(personal::list_empleados_handler))
        .route("/api/empleados/:id", get(personal::get_empleado_handler))
        .route("/api/metodos-pago", get(pago::list_metodos_handler))
        .route(
            "/api/aerolineas",
            get(itinerario::list_aerolineas_handler).post(itinerario::create_aerolinea_handler),
        )
        // Clientes
        .route(
            "/api/clientes",
            get(cliente::list_clientes_handler).post(cliente::create_cliente_handler),
        )
        .route(
            "/api/clientes/:id",
            get(cliente::get_cliente_handler).put(cliente::update_cliente_handler),
        )
        // Trámites
        .route(
            "/api/tramites",
            get(tramite::list_tramites_handler).post(tramite::create_tramite_handler),
        )
        .route(
            "/api/tramites/:id",
            get(tramite::get_tramite_handler).put(tramite::update_tramite_handler),
        )
        .route("/api/tramites/:id/clientes", post(tramite::link_cliente_handler))
        .route(
            "/api/tramites/:id/clientes/:cliente_id",
            delete(tramite::unlink_cliente_handler),
        )
        .route("/api/tramites/:id/empleados", post(tramite::link_empleado_handler))
        .route(
            "/api/tramites/:id/empleados/:empleado_id",
            delete(tramite::unlink_empleado_handler),
        )
        // Solicitudes y su expediente
        .route(
            "/api/solicitudes",
            get(solicitud::list_solicitudes_handler).post(solicitud::create_solicitud_handler),
        )
        .route(
            "/api/solicitudes/:id",
            get(solicitud::get_solicitud_handler).put(solicitud::update_solicitud_handler),
        )
        .route(
            "/api/solicitudes/:id/estados-siguientes",
            get(solicitud::estados_siguientes_handler),
        )
        .route(
            "/api/solicitudes/:id/seguimientos",
            get(solicitud::list_seguimientos_handler).post(solicitud::create_seguimiento_handler),
        )
        .route(
            "/api/solicitudes/:id/documentos",
            get(documento::list_documentos_handler).post(documento::upload_documento_solicitud_handler),
        )
        .route("/api/documentos", post(documento::upload_documento_handler))
        .route("/api/documentos/:id", delete(documento::delete_documento_handler))
        .route(
            "/api/solicitudes/:id/pagos",
            get(pago::list_pagos_handler).post(pago::create_pago_handler),
        )
        .route("/api/pagos/:id", put(pago::update_pago_handler))
        .route(
            "/api/solicitudes/:id/itinerario",
            get(itinerario::get_itinerario_handler)
                .put(itinerario::upsert_itinerario_handler)
                .delete(itinerario::delete_itinerario_handler),
        )
        // Panel
        .route("/api/dashboard/grupos-activos", get(dashboard::grupos_activos_handler))
        .route("/api/dashboard/tramites-activos", get(dashboard::tramites_activos_handler))
        .route("/api/dashboard/clientes-por-pais", get(dashboard::clientes_por_pais_handler))
        .route("/api/dashboard/resumen", get(dashboard::resumen_handler))
        .layer(DefaultBodyLimit::max(LIMITE_SUBIDA))
        .route_layer(middleware::from_fn_with_state(state.clone(), staff_middleware));

    // 4. Rutas de ADMIN: catálogos y borrados
    let admin_routes = Router::new()
        .route("/api/admin/paises", post(geografia::create_pais_handler))
        .route(
            "/api/admin/paises/:id",
            put(geografia::update_pais_handler).delete(geografia::delete_pais_handler),
        )
        .route("/api/admin/paises/:id/ciudades", post(geografia::create_ciudad_handler))
        .route("/api/admin/ciudades/:id", delete(geografia::delete_ciudad_handler))
        .route("/api/admin/roles", post(personal::create_rol_handler))
        .route(
            "/api/admin/roles/:id",
            put(personal::update_rol_handler).delete(personal::delete_rol_handler),
        )
        .route("/api/admin/areas", post(personal::create_area_handler))
        .route(
            "/api/admin/areas/:id",
            put(personal::update_area_handler).delete(personal::delete_area_handler),
        )
        .route("/api/admin/empleados", post(personal::create_empleado_handler))
        .route(
            "/api/admin/empleados/:id",
            put(personal::update_empleado_handler).delete(personal::delete_empleado_handler),
        )
        .route("/api/admin/clientes/:id", delete(cliente::delete_cliente_handler))
        .route("/api/admin/tramites/:id", delete(tramite::delete_tramite_handler))
        .route("/api/admin/solicitudes/:id", delete(solicitud::delete_solicitud_handler))
        .route("/api/admin/metodos-pago", post(pago::create_metodo_handler))
        .route("/api/admin/pagos/:id", delete(pago::delete_pago_handler))
        .route("/api/admin/aerolineas/:id", delete(itinerario::delete_aerolinea_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_middleware));

    // Fusionamos todo
    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(staff_routes)
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
