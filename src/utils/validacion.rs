use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{error::AppError, models::estado::EstadoSolicitud};

pub const MIN_DOCUMENTOS: i64 = 5;
pub const MAX_DOCUMENTOS: i64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipoIdentificacion {
    Cedula,
    Pasaporte,
}

impl TipoIdentificacion {
    pub fn codigo(self) -> &'static str {
        match self {
            TipoIdentificacion::Cedula => "cedula",
            TipoIdentificacion::Pasaporte => "pasaporte",
        }
    }
}

#[derive(Debug, Error)]
#[error("Tipo de identificación desconocido: '{0}'")]
pub struct TipoIdentificacionDesconocido(pub String);

impl TryFrom<String> for TipoIdentificacion {
    type Error = TipoIdentificacionDesconocido;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "cedula" => Ok(TipoIdentificacion::Cedula),
            "pasaporte" => Ok(TipoIdentificacion::Pasaporte),
            _ => Err(TipoIdentificacionDesconocido(value)),
        }
    }
}

fn re(patron: &str) -> Regex {
    // Patrones fijos, compilados una sola vez.
    Regex::new(patron).unwrap_or_else(|e| panic!("regex inválida {patron}: {e}"))
}

static PASAPORTE: Lazy<Regex> = Lazy::new(|| re(r"^[A-Z0-9]{6,9}$"));
static GENERICO: Lazy<Regex> = Lazy::new(|| re(r"^[A-Za-z0-9-]{5,20}$"));
static CEDULA_EC: Lazy<Regex> = Lazy::new(|| re(r"^[0-9]{10}$"));
static CEDULA_CO: Lazy<Regex> = Lazy::new(|| re(r"^[0-9]{6,10}$"));
static DNI_PE: Lazy<Regex> = Lazy::new(|| re(r"^[0-9]{8}$"));
static CURP_MX: Lazy<Regex> = Lazy::new(|| re(r"^[A-Z]{4}[0-9]{6}[HM][A-Z]{5}[A-Z0-9][0-9]$"));
static DNI_ES: Lazy<Regex> = Lazy::new(|| re(r"^[0-9]{8}[A-Z]$"));
static CARNET_CU: Lazy<Regex> = Lazy::new(|| re(r"^[0-9]{11}$"));
static CEDULA_VE: Lazy<Regex> = Lazy::new(|| re(r"^[VE]-?[0-9]{6,9}$"));
static SSN_US: Lazy<Regex> = Lazy::new(|| re(r"^[0-9]{3}-[0-9]{2}-[0-9]{4}$"));

/// Valida el número de identificación de un cliente según su tipo y el país
/// (código ISO alpha-2) que lo emite.
pub fn validar_identificacion(
    tipo: TipoIdentificacion,
    codigo_pais: &str,
    numero: &str,
) -> Result<(), AppError> {
    let numero = numero.trim();
    let valido = match tipo {
        TipoIdentificacion::Pasaporte => PASAPORTE.is_match(numero),
        TipoIdentificacion::Cedula => match codigo_pais.trim().to_ascii_uppercase().as_str() {
            "EC" => CEDULA_EC.is_match(numero) && digito_verificador_ec(numero),
            "CO" => CEDULA_CO.is_match(numero),
            "PE" => DNI_PE.is_match(numero),
            "MX" => CURP_MX.is_match(numero),
            "ES" => DNI_ES.is_match(numero) && letra_dni_es(numero),
            "CU" => CARNET_CU.is_match(numero),
            "VE" => CEDULA_VE.is_match(numero),
            "US" => SSN_US.is_match(numero),
            _ => GENERICO.is_match(numero),
        },
    };

    if valido {
        Ok(())
    } else {
        Err(AppError::validacion(format!(
            "Número de {} inválido para el país {}",
            tipo.codigo(),
            codigo_pais
        )))
    }
}

// Cédula ecuatoriana: provincia 01-24 (o 30), tercer dígito < 6 y
// dígito verificador módulo 10 con coeficientes 2,1,2,...
fn digito_verificador_ec(numero: &str) -> bool {
    let digitos: Vec<u32> = numero.chars().filter_map(|c| c.to_digit(10)).collect();
    if digitos.len() != 10 {
        return false;
    }
    let provincia = digitos[0] * 10 + digitos[1];
    if !((1..=24).contains(&provincia) || provincia == 30) || digitos[2] >= 6 {
        return false;
    }
    let suma: u32 = digitos[..9]
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let p = if i % 2 == 0 { d * 2 } else { *d };
            if p > 9 {
                p - 9
            } else {
                p
            }
        })
        .sum();
    (10 - suma % 10) % 10 == digitos[9]
}

fn letra_dni_es(numero: &str) -> bool {
    const LETRAS: &[u8] = b"TRWAGMYFPDXBNJZSQVHLCKE";
    let (Some(cifras), Some(letra)) = (numero.get(..8), numero.get(8..)) else {
        return false;
    };
    match cifras.parse::<usize>() {
        Ok(n) => letra.as_bytes() == [LETRAS[n % 23]],
        Err(_) => false,
    }
}

/// Comprueba el expediente antes de entrar en estados que exigen documentos.
pub fn verificar_documentos(estado: EstadoSolicitud, cantidad: i64) -> Result<(), AppError> {
    if estado.requiere_documentos() && !(MIN_DOCUMENTOS..=MAX_DOCUMENTOS).contains(&cantidad) {
        return Err(AppError::validacion(format!(
            "Para pasar a '{}' se requieren entre {} y {} documentos (hay {})",
            estado.etiqueta(),
            MIN_DOCUMENTOS,
            MAX_DOCUMENTOS,
            cantidad
        )));
    }
    Ok(())
}

/// Rechaza una subida si la solicitud ya tiene el máximo de documentos.
pub fn verificar_cupo_documentos(cantidad_actual: i64) -> Result<(), AppError> {
    if cantidad_actual >= MAX_DOCUMENTOS {
        return Err(AppError::validacion(format!(
            "La solicitud ya tiene el máximo de {} documentos",
            MAX_DOCUMENTOS
        )));
    }
    Ok(())
}
