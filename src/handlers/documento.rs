use std::{
    path::{Path as FsPath, PathBuf},
    sync::Arc,
};

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use mime::Mime;
use tokio::fs; // Usamos el sistema de archivos asíncrono
use uuid::Uuid;

use crate::{
    config::Config,
    db::DbPool,
    error::{AppError, AppResult},
    handlers::solicitud::obtener_solicitud,
    models::documento::{Documento, COLUMNAS_DOCUMENTO},
    utils::validacion::verificar_cupo_documentos,
};

pub const MAX_DOCUMENTO_BYTES: usize = 10 * 1024 * 1024; // 10MB
// Longitudes de documentos.nombre y documentos.tipo
const MAX_NOMBRE: usize = 200;
const MAX_TIPO: usize = 60;

struct ArchivoSubido {
    nombre_original: String,
    content_type: Option<String>,
    datos: Bytes,
}

#[derive(Default)]
struct FormularioDocumento {
    solicitud_id: Option<i64>,
    nombre: Option<String>,
    tipo: Option<String>,
    archivo: Option<ArchivoSubido>,
}

async fn leer_formulario(mut multipart: Multipart) -> AppResult<FormularioDocumento> {
    let mut form = FormularioDocumento::default();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "archivo" => {
                let nombre_original = field.file_name().unwrap_or("documento").to_string();
                let content_type = field.content_type().map(str::to_string);
                let datos = field.bytes().await?;
                form.archivo = Some(ArchivoSubido {
                    nombre_original,
                    content_type,
                    datos,
                });
            }
            "solicitud_id" => {
                let texto = field.text().await?;
                let id = texto
                    .trim()
                    .parse()
                    .map_err(|_| AppError::validacion("solicitud_id inválido"))?;
                form.solicitud_id = Some(id);
            }
            "nombre" => form.nombre = Some(field.text().await?.trim().to_string()),
            "tipo" => form.tipo = Some(field.text().await?.trim().to_string()),
            otro => tracing::debug!("Campo de formulario ignorado: {}", otro),
        }
    }

    Ok(form)
}

fn mime_por_extension(nombre: &str) -> Option<Mime> {
    let ext = FsPath::new(nombre).extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some(mime::APPLICATION_PDF),
        "jpg" | "jpeg" => Some(mime::IMAGE_JPEG),
        "png" => Some(mime::IMAGE_PNG),
        "webp" => "image/webp".parse().ok(),
        _ => None,
    }
}

/// Valida tamaño y tipo; devuelve el MIME normalizado y la extensión a usar en disco.
fn validar_archivo(
    content_type: Option<&str>,
    nombre: &str,
    tamano: usize,
) -> AppResult<(String, &'static str)> {
    if tamano == 0 {
        return Err(AppError::validacion("El archivo está vacío"));
    }
    if tamano > MAX_DOCUMENTO_BYTES {
        return Err(AppError::validacion(
            "El documento excede el tamaño máximo de 10MB",
        ));
    }

    // Algunos navegadores mandan octet-stream; en ese caso decide la extensión
    let declarado = content_type
        .and_then(|ct| ct.parse::<Mime>().ok())
        .filter(|m| *m != mime::APPLICATION_OCTET_STREAM);
    let tipo_mime = declarado
        .or_else(|| mime_por_extension(nombre))
        .ok_or_else(|| AppError::validacion("No se pudo determinar el tipo del archivo"))?;

    let extension = match (tipo_mime.type_().as_str(), tipo_mime.subtype().as_str()) {
        ("application", "pdf") => "pdf",
        ("image", "jpeg") => "jpg",
        ("image", "png") => "png",
        ("image", "webp") => "webp",
        _ => {
            return Err(AppError::validacion(
                "Solo se permiten documentos PDF o imágenes (jpg, png, webp)",
            ))
        }
    };

    Ok((tipo_mime.essence_str().to_string(), extension))
}

fn validar_metadatos(nombre: Option<&str>, tipo: Option<&str>) -> AppResult<()> {
    if nombre.is_some_and(|n| n.chars().count() > MAX_NOMBRE) {
        return Err(AppError::validacion(format!(
            "El nombre del documento admite como máximo {MAX_NOMBRE} caracteres"
        )));
    }
    if tipo.is_some_and(|t| t.chars().count() > MAX_TIPO) {
        return Err(AppError::validacion(format!(
            "El tipo del documento admite como máximo {MAX_TIPO} caracteres"
        )));
    }
    Ok(())
}

/// Borra archivos del disco; los que ya no existen se ignoran.
pub(crate) async fn borrar_archivos(dir: &FsPath, archivos: &[String]) {
    for archivo in archivos {
        if let Err(e) = fs::remove_file(dir.join(archivo)).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::error!("No se pudo borrar {}: {:?}", archivo, e);
            }
        }
    }
}

async fn guardar_documento(
    pool: &DbPool,
    dir: PathBuf,
    solicitud_id: i64,
    form: FormularioDocumento,
) -> AppResult<Documento> {
    let archivo = form
        .archivo
        .ok_or_else(|| AppError::validacion("No se envió ningún campo 'archivo'"))?;

    let (tipo_mime, extension) = validar_archivo(
        archivo.content_type.as_deref(),
        &archivo.nombre_original,
        archivo.datos.len(),
    )?;
    validar_metadatos(form.nombre.as_deref(), form.tipo.as_deref())?;

    let mut tx = pool.begin().await?;

    // Bloquea la solicitud para que dos subidas simultáneas no pasen el cupo
    let existe: Option<i64> = sqlx::query_scalar("SELECT id FROM solicitudes WHERE id = $1 FOR UPDATE")
        .bind(solicitud_id)
        .fetch_optional(&mut *tx)
        .await?;
    if existe.is_none() {
        return Err(AppError::NoEncontrado("Solicitud"));
    }

    let cantidad: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documentos WHERE solicitud_id = $1")
        .bind(solicitud_id)
        .fetch_one(&mut *tx)
        .await?;
    verificar_cupo_documentos(cantidad)?;

    // Crear la carpeta si no existe y guardar con nombre único
    fs::create_dir_all(&dir).await?;
    let nuevo_nombre = format!("{}.{}", Uuid::new_v4(), extension);
    fs::write(dir.join(&nuevo_nombre), &archivo.datos).await?;

    let nombre = form
        .nombre
        .filter(|n| !n.is_empty())
        // El nombre del archivo original se recorta en vez de rechazarse
        .unwrap_or_else(|| archivo.nombre_original.chars().take(MAX_NOMBRE).collect());

    let insertado = sqlx::query_as::<_, Documento>(&format!(
        "INSERT INTO documentos (solicitud_id, nombre, tipo, archivo, tamano, mime)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {COLUMNAS_DOCUMENTO}"
    ))
    .bind(solicitud_id)
    .bind(&nombre)
    .bind(form.tipo.filter(|t| !t.is_empty()))
    .bind(&nuevo_nombre)
    .bind(archivo.datos.len() as i64)
    .bind(&tipo_mime)
    .fetch_one(&mut *tx)
    .await;

    let documento = match insertado {
        Ok(doc) => doc,
        Err(e) => {
            borrar_archivos(&dir, &[nuevo_nombre]).await;
            return Err(e.into());
        }
    };

    if let Err(e) = tx.commit().await {
        borrar_archivos(&dir, &[nuevo_nombre]).await;
        return Err(e.into());
    }

    tracing::info!(
        "Documento {} ({} bytes) subido a la solicitud {}",
        documento.archivo,
        documento.tamano,
        solicitud_id
    );
    Ok(documento)
}

// POST /api/solicitudes/:id/documentos (multipart: archivo, nombre?, tipo?)
pub async fn upload_documento_solicitud_handler(
    Path(solicitud_id): Path<i64>,
    State(pool): State<DbPool>,
    State(config): State<Arc<Config>>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Documento>)> {
    let form = leer_formulario(multipart).await?;
    let documento = guardar_documento(&pool, config.documentos_dir(), solicitud_id, form).await?;
    Ok((StatusCode::CREATED, Json(documento)))
}

// POST /api/documentos (multipart: solicitud_id, archivo, nombre?, tipo?)
pub async fn upload_documento_handler(
    State(pool): State<DbPool>,
    State(config): State<Arc<Config>>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Documento>)> {
    let form = leer_formulario(multipart).await?;
    let solicitud_id = form
        .solicitud_id
        .ok_or_else(|| AppError::validacion("Falta el campo 'solicitud_id'"))?;
    let documento = guardar_documento(&pool, config.documentos_dir(), solicitud_id, form).await?;
    Ok((StatusCode::CREATED, Json(documento)))
}

// GET /api/solicitudes/:id/documentos
pub async fn list_documentos_handler(
    Path(solicitud_id): Path<i64>,
    State(pool): State<DbPool>,
) -> AppResult<Json<Vec<Documento>>> {
    obtener_solicitud(&pool, solicitud_id).await?;

    let documentos = sqlx::query_as::<_, Documento>(&format!(
        "SELECT {COLUMNAS_DOCUMENTO} FROM documentos WHERE solicitud_id = $1 ORDER BY id"
    ))
    .bind(solicitud_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(documentos))
}

// DELETE /api/documentos/:id (borra la fila y el archivo)
pub async fn delete_documento_handler(
    Path(id): Path<i64>,
    State(pool): State<DbPool>,
    State(config): State<Arc<Config>>,
) -> AppResult<StatusCode> {
    let archivo: String =
        sqlx::query_scalar("DELETE FROM documentos WHERE id = $1 RETURNING archivo")
            .bind(id)
            .fetch_optional(&pool)
            .await?
            .ok_or(AppError::NoEncontrado("Documento"))?;

    borrar_archivos(&config.documentos_dir(), &[archivo]).await;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acepta_pdf_e_imagenes() {
        assert_eq!(
            validar_archivo(Some("application/pdf"), "a.pdf", 10).unwrap(),
            ("application/pdf".to_string(), "pdf")
        );
        assert_eq!(validar_archivo(Some("image/jpeg"), "foto", 10).unwrap().1, "jpg");
        assert_eq!(validar_archivo(Some("image/webp"), "x", 10).unwrap().1, "webp");
    }

    #[test]
    fn octet_stream_usa_la_extension() {
        let (mime, ext) = validar_archivo(Some("application/octet-stream"), "scan.PNG", 10).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(ext, "png");
        assert!(validar_archivo(None, "scan.exe", 10).is_err());
    }

    #[test]
    fn rechaza_otros_tipos_y_tamanos() {
        assert!(validar_archivo(Some("text/html"), "a.html", 10).is_err());
        assert!(validar_archivo(Some("application/pdf"), "a.pdf", 0).is_err());
        assert!(validar_archivo(Some("application/pdf"), "a.pdf", MAX_DOCUMENTO_BYTES + 1).is_err());
        assert!(validar_archivo(Some("application/pdf"), "a.pdf", MAX_DOCUMENTO_BYTES).is_ok());
    }

    #[test]
    fn nombre_y_tipo_caben_en_sus_columnas() {
        assert!(validar_metadatos(Some("Pasaporte"), Some("identidad")).is_ok());
        assert!(validar_metadatos(None, None).is_ok());
        assert!(validar_metadatos(Some(&"n".repeat(MAX_NOMBRE)), None).is_ok());
        assert!(validar_metadatos(Some(&"n".repeat(MAX_NOMBRE + 1)), None).is_err());
        let err = validar_metadatos(None, Some(&"t".repeat(100))).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        // se cuentan caracteres, no bytes
        assert!(validar_metadatos(None, Some(&"ñ".repeat(MAX_TIPO))).is_ok());
    }

    #[tokio::test]
    async fn borrar_archivos_ignora_los_inexistentes() {
        let dir = tempfile::tempdir().unwrap();
        let existente = dir.path().join("a.pdf");
        std::fs::write(&existente, b"%PDF").unwrap();

        borrar_archivos(dir.path(), &["a.pdf".to_string(), "no-existe.pdf".to_string()]).await;
        assert!(!existente.exists());
    }
}
