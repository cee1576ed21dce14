//! Recorridos completos contra Postgres. `#[sqlx::test]` crea una base
//! temporal por prueba y le aplica migrations/; requieren DATABASE_URL.
//!
//! cargo test -- --ignored

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

use tramites_backend::{
    config::Config, routes::create_routes, state::AppState, utils::jwt::verificar_token,
};

const SECRETO: &str = "secreto-de-integracion";
const BOUNDARY: &str = "----frontera-de-prueba";

struct Entorno {
    app: Router,
    token: String,
    _uploads: TempDir,
}

impl Entorno {
    /// Router sobre una base sin usuarios; el token queda vacío.
    fn vacio(pool: PgPool) -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let config = Config {
            port: 0,
            database_url: String::new(),
            jwt_secret: SECRETO.into(),
            jwt_expiracion_horas: 1,
            upload_dir: uploads.path().to_path_buf(),
            db_max_connections: 2,
        };
        Self {
            app: create_routes(AppState::new(pool, config)),
            token: String::new(),
            _uploads: uploads,
        }
    }

    async fn nuevo(pool: PgPool) -> Self {
        let mut entorno = Self::vacio(pool);

        // El primer usuario se registra sin token y queda como admin
        let (status, _) = entorno
            .json(
                Method::POST,
                "/api/auth/register",
                json!({ "username": "admin", "email": "admin@agencia.ec", "password": "clave-segura-1" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = entorno
            .json(
                Method::POST,
                "/api/auth/login",
                json!({ "email": "admin@agencia.ec", "password": "clave-segura-1" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        entorno.token = body["token"].as_str().unwrap().to_string();
        entorno
    }

    async fn enviar(&self, req: Request<Body>) -> (StatusCode, Value) {
        let res = self.app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn json(&self, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.enviar(req).await
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let req = Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .body(Body::empty())
            .unwrap();
        self.enviar(req).await
    }

    async fn delete(&self, uri: &str) -> StatusCode {
        let req = Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .body(Body::empty())
            .unwrap();
        self.enviar(req).await.0
    }

    async fn get_con(&self, token: &str, uri: &str) -> (StatusCode, Value) {
        let req = Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        self.enviar(req).await
    }

    async fn subir_pdf(&self, solicitud_id: i64, nombre: &str) -> (StatusCode, Value) {
        self.subir_pdf_con_tipo(solicitud_id, nombre, "general").await
    }

    async fn subir_pdf_con_tipo(
        &self,
        solicitud_id: i64,
        nombre: &str,
        tipo: &str,
    ) -> (StatusCode, Value) {
        let cuerpo = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"nombre\"\r\n\r\n\
             {nombre}\r\n\
             --{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"tipo\"\r\n\r\n\
             {tipo}\r\n\
             --{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"archivo\"; filename=\"{nombre}.pdf\"\r\n\
             Content-Type: application/pdf\r\n\r\n\
             %PDF-1.4 contenido de prueba\r\n\
             --{BOUNDARY}--\r\n"
        );
        let req = Request::builder()
            .method(Method::POST)
            .uri(format!("/api/solicitudes/{solicitud_id}/documentos"))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(cuerpo))
            .unwrap();
        self.enviar(req).await
    }

    async fn seguimiento(&self, solicitud_id: i64, estado: &str) -> (StatusCode, Value) {
        self.json(
            Method::POST,
            &format!("/api/solicitudes/{solicitud_id}/seguimientos"),
            json!({ "estado": estado, "descripcion": format!("Paso a {estado}") }),
        )
        .await
    }

    /// País, cliente y trámite de visa americana con el cliente vinculado.
    async fn solicitud_nueva(&self) -> i64 {
        let (status, pais) = self
            .json(
                Method::POST,
                "/api/admin/paises",
                json!({ "nombre": "Ecuador", "codigo_iso": "EC" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, cliente) = self
            .json(
                Method::POST,
                "/api/clientes",
                json!({
                    "nombres": "María",
                    "apellidos": "Quishpe",
                    "tipo_identificacion": "cedula",
                    "numero_identificacion": "1710034065",
                    "pais_id": pais["id"],
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{cliente}");

        let (status, tramite) = self
            .json(
                Method::POST,
                "/api/tramites",
                json!({
                    "nombre": "Visa de turismo EE.UU.",
                    "tipoTramite": "visa_americana",
                    "costo": "160.00",
                    "cliente_ids": [cliente["id"]],
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{tramite}");
        assert_eq!(tramite["cliente_ids"], json!([cliente["id"]]));

        let (status, solicitud) = self
            .json(
                Method::POST,
                "/api/solicitudes",
                json!({ "cliente_id": cliente["id"], "tramite_id": tramite["id"] }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{solicitud}");
        assert_eq!(solicitud["estado_actual"], "iniciado");
        solicitud["id"].as_i64().unwrap()
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requiere Postgres (DATABASE_URL)"]
async fn historial_y_estado_actual_coinciden(pool: PgPool) {
    let e = Entorno::nuevo(pool).await;
    let id = e.solicitud_nueva().await;

    assert_eq!(e.seguimiento(id, "pendiente_documentos").await.0, StatusCode::CREATED);
    for i in 0..5 {
        assert_eq!(e.subir_pdf(id, &format!("doc{i}")).await.0, StatusCode::CREATED);
    }
    assert_eq!(e.seguimiento(id, "documentos_entregados").await.0, StatusCode::CREATED);
    assert_eq!(e.seguimiento(id, "formulario_completado").await.0, StatusCode::CREATED);

    let (status, detalle) = e.get(&format!("/api/solicitudes/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detalle["estado_actual"], "formulario_completado");

    let historial: Vec<&str> = detalle["seguimientos"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["estado"].as_str().unwrap())
        .collect();
    assert_eq!(
        historial,
        [
            "formulario_completado",
            "documentos_entregados",
            "pendiente_documentos",
            "iniciado"
        ]
    );
    assert_eq!(detalle["estados_siguientes"], json!(["cita_agendada", "cancelado"]));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requiere Postgres (DATABASE_URL)"]
async fn transicion_ilegal_devuelve_409(pool: PgPool) {
    let e = Entorno::nuevo(pool).await;
    let id = e.solicitud_nueva().await;

    let (status, _) = e.seguimiento(id, "cita_agendada").await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Estados de otro tipo de trámite tampoco valen
    let (status, _) = e.seguimiento(id, "pasaporte_emitido").await;
    assert_eq!(status, StatusCode::CONFLICT);

    assert_eq!(e.seguimiento(id, "cancelado").await.0, StatusCode::CREATED);
    let (status, _) = e.seguimiento(id, "pendiente_documentos").await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requiere Postgres (DATABASE_URL)"]
async fn documentos_entregados_exige_minimo_cinco(pool: PgPool) {
    let e = Entorno::nuevo(pool).await;
    let id = e.solicitud_nueva().await;
    e.seguimiento(id, "pendiente_documentos").await;

    for i in 0..4 {
        e.subir_pdf(id, &format!("doc{i}")).await;
    }
    let (status, body) = e.seguimiento(id, "documentos_entregados").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains('5'));

    // Hasta 8 documentos; el noveno se rechaza
    for i in 4..8 {
        assert_eq!(e.subir_pdf(id, &format!("doc{i}")).await.0, StatusCode::CREATED);
    }
    assert_eq!(e.subir_pdf(id, "sobrante").await.0, StatusCode::BAD_REQUEST);
    assert_eq!(e.seguimiento(id, "documentos_entregados").await.0, StatusCode::CREATED);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requiere Postgres (DATABASE_URL)"]
async fn documento_subido_aparece_solo_en_su_solicitud(pool: PgPool) {
    let e = Entorno::nuevo(pool).await;
    let id = e.solicitud_nueva().await;

    let (status, doc) = e.subir_pdf(id, "pasaporte").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(doc["mime"], "application/pdf");
    assert!(doc["url"].as_str().unwrap().starts_with("/uploads/documentos/"));

    let (_, lista) = e.get(&format!("/api/solicitudes/{id}/documentos")).await;
    let lista = lista.as_array().unwrap();
    assert_eq!(lista.len(), 1);
    assert_eq!(lista[0]["id"], doc["id"]);
    assert_eq!(lista[0]["solicitud_id"], id);

    // El archivo se sirve como estático
    let req = Request::builder()
        .uri(doc["url"].as_str().unwrap())
        .body(Body::empty())
        .unwrap();
    assert_eq!(e.enviar(req).await.0, StatusCode::OK);

    assert_eq!(
        e.delete(&format!("/api/documentos/{}", doc["id"])).await,
        StatusCode::NO_CONTENT
    );
    let (_, lista) = e.get(&format!("/api/solicitudes/{id}/documentos")).await;
    assert!(lista.as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requiere Postgres (DATABASE_URL)"]
async fn login_devuelve_token_con_el_id_del_usuario(pool: PgPool) {
    let e = Entorno::nuevo(pool).await;

    let claims = verificar_token(&e.token, SECRETO).unwrap();
    let (_, me) = e.get("/api/auth/me").await;
    assert_eq!(me["user_id"], claims.user_id);
    assert_eq!(me["role"], "admin");

    let (status, body) = e
        .json(
            Method::POST,
            "/api/auth/login",
            json!({ "email": "admin@agencia.ec", "password": "otra-clave" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.get("token").is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requiere Postgres (DATABASE_URL)"]
async fn rol_con_empleados_no_se_borra(pool: PgPool) {
    let e = Entorno::nuevo(pool).await;

    let (status, rol) = e
        .json(Method::POST, "/api/admin/roles", json!({ "nombre": "Asesor" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = e
        .json(
            Method::POST,
            "/api/admin/empleados",
            json!({
                "nombres": "Luis",
                "apellidos": "Andrade",
                "email": "luis@agencia.ec",
                "rol_id": rol["id"],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let status = e.delete(&format!("/api/admin/roles/{}", rol["id"])).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, roles) = e.get("/api/roles").await;
    assert_eq!(roles.as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requiere Postgres (DATABASE_URL)"]
async fn una_sola_solicitud_activa_por_cliente_y_tramite(pool: PgPool) {
    let e = Entorno::nuevo(pool).await;
    let id = e.solicitud_nueva().await;

    let (_, detalle) = e.get(&format!("/api/solicitudes/{id}")).await;
    let (status, _) = e
        .json(
            Method::POST,
            "/api/solicitudes",
            json!({ "cliente_id": detalle["cliente_id"], "tramite_id": detalle["tramite_id"] }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requiere Postgres (DATABASE_URL)"]
async fn registros_simultaneos_dejan_un_solo_admin(pool: PgPool) {
    let e = Entorno::vacio(pool.clone());

    let tareas: Vec<_> = (0..8)
        .map(|i| {
            let app = e.app.clone();
            tokio::spawn(async move {
                let body = json!({
                    "username": format!("usuario{i}"),
                    "email": format!("usuario{i}@agencia.ec"),
                    "password": "clave-segura-1",
                });
                let req = Request::builder()
                    .method(Method::POST)
                    .uri("/api/auth/register")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap();
                app.oneshot(req).await.unwrap().status()
            })
        })
        .collect();

    let mut creados = 0;
    for tarea in tareas {
        match tarea.await.unwrap() {
            StatusCode::CREATED => creados += 1,
            otro => assert_eq!(otro, StatusCode::FORBIDDEN),
        }
    }
    assert_eq!(creados, 1);

    let admins: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM usuarios WHERE rol = 'admin'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(admins, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requiere Postgres (DATABASE_URL)"]
async fn datos_que_no_caben_en_la_base_devuelven_400(pool: PgPool) {
    let e = Entorno::nuevo(pool).await;
    let id = e.solicitud_nueva().await;

    let (_, metodos) = e.get("/api/metodos-pago").await;
    let metodo = &metodos.as_array().unwrap()[0]["id"];

    let (status, body) = e
        .json(
            Method::POST,
            &format!("/api/solicitudes/{id}/pagos"),
            json!({ "monto": "100000000000", "metodo_pago_id": metodo }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, _) = e.subir_pdf_con_tipo(id, "cedula", &"x".repeat(100)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, lista) = e.get(&format!("/api/solicitudes/{id}/documentos")).await;
    assert!(lista.as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requiere Postgres (DATABASE_URL)"]
async fn panel_cuenta_solo_solicitudes_activas(pool: PgPool) {
    let e = Entorno::nuevo(pool).await;
    let visa = e.solicitud_nueva().await;
    assert_eq!(e.seguimiento(visa, "pendiente_documentos").await.0, StatusCode::CREATED);

    let (_, detalle) = e.get(&format!("/api/solicitudes/{visa}")).await;
    let tramite_visa = detalle["tramite_id"].clone();
    let (_, paises) = e.get("/api/paises").await;
    let pais = paises.as_array().unwrap()[0]["id"].clone();

    let (status, cliente) = e
        .json(
            Method::POST,
            "/api/clientes",
            json!({
                "nombres": "Jorge",
                "apellidos": "Paredes",
                "tipo_identificacion": "pasaporte",
                "numero_identificacion": "B1234567",
                "pais_id": pais,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{cliente}");

    let (status, ama) = e
        .json(
            Method::POST,
            "/api/tramites",
            json!({ "nombre": "Abrazos y Más Abrazos", "tipoTramite": "ama", "costo": "0" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{ama}");

    let (_, activa) = e
        .json(
            Method::POST,
            "/api/solicitudes",
            json!({ "cliente_id": cliente["id"], "tramite_id": ama["id"] }),
        )
        .await;
    let (_, cancelada) = e
        .json(
            Method::POST,
            "/api/solicitudes",
            json!({ "cliente_id": cliente["id"], "tramite_id": tramite_visa }),
        )
        .await;
    let cancelada = cancelada["id"].as_i64().unwrap();
    assert_eq!(e.seguimiento(cancelada, "cancelado").await.0, StatusCode::CREATED);

    let (_, metodos) = e.get("/api/metodos-pago").await;
    let metodo = metodos.as_array().unwrap()[0]["id"].clone();
    for (solicitud, monto, estado) in [
        (visa, "100.00", "validado"),
        (visa, "50.00", "pendiente"),
        (activa["id"].as_i64().unwrap(), "25.50", "validado"),
    ] {
        let (status, _) = e
            .json(
                Method::POST,
                &format!("/api/solicitudes/{solicitud}/pagos"),
                json!({ "monto": monto, "metodo_pago_id": metodo, "estado": estado }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, grupos) = e.get("/api/dashboard/grupos-activos").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        grupos,
        json!([
            { "estado": "iniciado", "total": 1 },
            { "estado": "pendiente_documentos", "total": 1 },
        ])
    );

    let (_, tramites) = e.get("/api/dashboard/tramites-activos").await;
    let tramites = tramites.as_array().unwrap();
    assert_eq!(tramites.len(), 2);
    assert!(tramites.iter().all(|t| t["total"] == 1));
    assert!(tramites.iter().any(|t| t["tipo"] == "ama"));

    let (_, por_pais) = e.get("/api/dashboard/clientes-por-pais").await;
    assert_eq!(por_pais.as_array().unwrap().len(), 1);
    assert_eq!(por_pais[0]["pais"], "Ecuador");
    assert_eq!(por_pais[0]["total"], 2);

    let (_, resumen) = e.get("/api/dashboard/resumen").await;
    assert_eq!(resumen["clientes_activos"], 2);
    assert_eq!(resumen["solicitudes_activas"], 2);
    assert_eq!(resumen["pagos_pendientes"], 1);
    let monto: rust_decimal::Decimal = resumen["monto_validado"].as_str().unwrap().parse().unwrap();
    assert_eq!(monto, rust_decimal::Decimal::new(12550, 2));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requiere Postgres (DATABASE_URL)"]
async fn seguimientos_simultaneos_se_aplican_en_serie(pool: PgPool) {
    let e = Entorno::nuevo(pool).await;
    let id = e.solicitud_nueva().await;

    let tareas: Vec<_> = (0..2)
        .map(|_| {
            let app = e.app.clone();
            let token = e.token.clone();
            tokio::spawn(async move {
                let body = json!({ "estado": "pendiente_documentos", "descripcion": "Se piden documentos" });
                let req = Request::builder()
                    .method(Method::POST)
                    .uri(format!("/api/solicitudes/{id}/seguimientos"))
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap();
                app.oneshot(req).await.unwrap().status()
            })
        })
        .collect();

    let mut estados = Vec::new();
    for tarea in tareas {
        estados.push(tarea.await.unwrap());
    }
    estados.sort();
    assert_eq!(estados, [StatusCode::CREATED, StatusCode::CONFLICT]);

    let (_, detalle) = e.get(&format!("/api/solicitudes/{id}")).await;
    assert_eq!(detalle["estado_actual"], "pendiente_documentos");
    assert_eq!(detalle["seguimientos"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requiere Postgres (DATABASE_URL)"]
async fn portal_no_muestra_solicitudes_de_otro_cliente(pool: PgPool) {
    let e = Entorno::nuevo(pool).await;
    let ajena = e.solicitud_nueva().await;

    let (_, paises) = e.get("/api/paises").await;
    let (_, otro) = e
        .json(
            Method::POST,
            "/api/clientes",
            json!({
                "nombres": "Rosa",
                "apellidos": "Guamán",
                "tipo_identificacion": "pasaporte",
                "numero_identificacion": "C7654321",
                "pais_id": paises[0]["id"],
            }),
        )
        .await;

    let (status, _) = e
        .json(
            Method::POST,
            "/api/auth/register",
            json!({
                "username": "rosa",
                "email": "rosa@correo.ec",
                "password": "clave-segura-2",
                "rol": "cliente",
                "cliente_id": otro["id"],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, login) = e
        .json(
            Method::POST,
            "/api/auth/login",
            json!({ "email": "rosa@correo.ec", "password": "clave-segura-2" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token_cliente = login["token"].as_str().unwrap();

    let (status, _) = e
        .get_con(token_cliente, &format!("/api/portal/solicitudes/{ajena}"))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, propias) = e.get_con(token_cliente, "/api/portal/solicitudes").await;
    assert_eq!(status, StatusCode::OK);
    assert!(propias.as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requiere Postgres (DATABASE_URL)"]
async fn primer_seguimiento_registra_al_responsable_de_la_solicitud(pool: PgPool) {
    let e = Entorno::nuevo(pool).await;
    let previa = e.solicitud_nueva().await;
    let (_, detalle) = e.get(&format!("/api/solicitudes/{previa}")).await;

    let (_, rol) = e
        .json(Method::POST, "/api/admin/roles", json!({ "nombre": "Asesor" }))
        .await;
    let (status, empleado) = e
        .json(
            Method::POST,
            "/api/admin/empleados",
            json!({
                "nombres": "Luis",
                "apellidos": "Andrade",
                "email": "luis@agencia.ec",
                "rol_id": rol["id"],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // La previa ocupa el cupo activo de ese cliente y trámite
    assert_eq!(e.seguimiento(previa, "cancelado").await.0, StatusCode::CREATED);

    // El admin no tiene empleado propio: el responsable viene en el cuerpo
    let (status, solicitud) = e
        .json(
            Method::POST,
            "/api/solicitudes",
            json!({
                "cliente_id": detalle["cliente_id"],
                "tramite_id": detalle["tramite_id"],
                "empleado_id": empleado["id"],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{solicitud}");
    assert_eq!(solicitud["empleado_id"], empleado["id"]);
    assert_eq!(solicitud["seguimientos"][0]["empleado_id"], empleado["id"]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requiere Postgres (DATABASE_URL)"]
async fn borrar_rol_espera_al_alta_en_curso_y_devuelve_409(pool: PgPool) {
    let e = Entorno::nuevo(pool.clone()).await;
    let (_, rol) = e
        .json(Method::POST, "/api/admin/roles", json!({ "nombre": "Asesor" }))
        .await;
    let rol_id = rol["id"].as_i64().unwrap();

    // Alta de empleado aún sin confirmar que referencia al rol
    let mut tx = pool.begin().await.unwrap();
    sqlx::query("INSERT INTO empleados (nombres, apellidos, email, rol_id) VALUES ($1, $2, $3, $4)")
        .bind("Ana")
        .bind("Torres")
        .bind("ana@agencia.ec")
        .bind(rol_id as i32)
        .execute(&mut *tx)
        .await
        .unwrap();

    let app = e.app.clone();
    let token = e.token.clone();
    let borrado = tokio::spawn(async move {
        let req = Request::builder()
            .method(Method::DELETE)
            .uri(format!("/api/admin/roles/{rol_id}"))
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        app.oneshot(req).await.unwrap().status()
    });

    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    assert!(!borrado.is_finished());
    tx.commit().await.unwrap();

    assert_eq!(borrado.await.unwrap(), StatusCode::CONFLICT);
}
