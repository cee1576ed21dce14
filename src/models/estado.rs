//! Vocabulario de estados por tipo de trámite y tabla de transiciones.
//!
//! Cada [`TipoTramite`] tiene una lista ordenada de estados que empieza en
//! `iniciado` y termina en `finalizado`. Una solicitud solo avanza al estado
//! inmediatamente siguiente de su lista, o pasa a `cancelado` mientras no
//! esté en un estado terminal.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VocabularioError {
    #[error("Tipo de trámite desconocido: '{0}'")]
    TipoDesconocido(String),

    #[error("Estado desconocido: '{0}'")]
    EstadoDesconocido(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipoTramite {
    VisaAmericana,
    VisaCanadiense,
    Pasaporte,
    /// Abrazos y Más Abrazos: reunificación familiar con vuelo incluido.
    Ama,
    VisaTrabajo,
    VisaEstudiante,
    Apostilla,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstadoSolicitud {
    Iniciado,
    PendienteDocumentos,
    DocumentosEntregados,
    FormularioCompletado,
    CitaAgendada,
    EntrevistaRealizada,
    SolicitudEnviada,
    BiometriaRealizada,
    EnRevision,
    Aprobado,
    OfertaVerificada,
    CartaAceptacion,
    PasaporteEmitido,
    EnApostilla,
    DocumentosApostillados,
    VueloYReencuentro,
    Finalizado,
    Cancelado,
}

use EstadoSolicitud::*;

const VISA_AMERICANA: &[EstadoSolicitud] = &[
    Iniciado,
    PendienteDocumentos,
    DocumentosEntregados,
    FormularioCompletado,
    CitaAgendada,
    EntrevistaRealizada,
    Finalizado,
];

const VISA_CANADIENSE: &[EstadoSolicitud] = &[
    Iniciado,
    PendienteDocumentos,
    DocumentosEntregados,
    SolicitudEnviada,
    BiometriaRealizada,
    EnRevision,
    Finalizado,
];

const PASAPORTE: &[EstadoSolicitud] = &[
    Iniciado,
    PendienteDocumentos,
    DocumentosEntregados,
    CitaAgendada,
    PasaporteEmitido,
    Finalizado,
];

const AMA: &[EstadoSolicitud] = &[
    Iniciado,
    PendienteDocumentos,
    DocumentosEntregados,
    EnRevision,
    Aprobado,
    VueloYReencuentro,
    Finalizado,
];

const VISA_TRABAJO: &[EstadoSolicitud] = &[
    Iniciado,
    PendienteDocumentos,
    DocumentosEntregados,
    OfertaVerificada,
    SolicitudEnviada,
    EnRevision,
    Finalizado,
];

const VISA_ESTUDIANTE: &[EstadoSolicitud] = &[
    Iniciado,
    PendienteDocumentos,
    DocumentosEntregados,
    CartaAceptacion,
    SolicitudEnviada,
    CitaAgendada,
    Finalizado,
];

const APOSTILLA: &[EstadoSolicitud] = &[
    Iniciado,
    PendienteDocumentos,
    DocumentosEntregados,
    EnApostilla,
    DocumentosApostillados,
    Finalizado,
];

impl TipoTramite {
    pub const TODOS: [TipoTramite; 7] = [
        TipoTramite::VisaAmericana,
        TipoTramite::VisaCanadiense,
        TipoTramite::Pasaporte,
        TipoTramite::Ama,
        TipoTramite::VisaTrabajo,
        TipoTramite::VisaEstudiante,
        TipoTramite::Apostilla,
    ];

    pub fn codigo(self) -> &'static str {
        match self {
            TipoTramite::VisaAmericana => "visa_americana",
            TipoTramite::VisaCanadiense => "visa_canadiense",
            TipoTramite::Pasaporte => "pasaporte",
            TipoTramite::Ama => "ama",
            TipoTramite::VisaTrabajo => "visa_trabajo",
            TipoTramite::VisaEstudiante => "visa_estudiante",
            TipoTramite::Apostilla => "apostilla",
        }
    }

    pub fn etiqueta(self) -> &'static str {
        match self {
            TipoTramite::VisaAmericana => "Visa Americana",
            TipoTramite::VisaCanadiense => "Visa Canadiense",
            TipoTramite::Pasaporte => "Pasaporte",
            TipoTramite::Ama => "Abrazos y Más Abrazos",
            TipoTramite::VisaTrabajo => "Visa de Trabajo",
            TipoTramite::VisaEstudiante => "Visa de Estudiante",
            TipoTramite::Apostilla => "Apostilla de Documentos",
        }
    }

    /// Lista ordenada de estados válidos para este tipo.
    pub fn estados(self) -> &'static [EstadoSolicitud] {
        match self {
            TipoTramite::VisaAmericana => VISA_AMERICANA,
            TipoTramite::VisaCanadiense => VISA_CANADIENSE,
            TipoTramite::Pasaporte => PASAPORTE,
            TipoTramite::Ama => AMA,
            TipoTramite::VisaTrabajo => VISA_TRABAJO,
            TipoTramite::VisaEstudiante => VISA_ESTUDIANTE,
            TipoTramite::Apostilla => APOSTILLA,
        }
    }

    pub fn estado_inicial(self) -> EstadoSolicitud {
        self.estados()[0]
    }

    pub fn admite(self, estado: EstadoSolicitud) -> bool {
        estado == Cancelado || self.estados().contains(&estado)
    }

    /// Solo el programa AMA incluye logística de vuelo.
    pub fn admite_itinerario(self) -> bool {
        self == TipoTramite::Ama
    }

    pub fn siguiente(self, actual: EstadoSolicitud) -> Option<EstadoSolicitud> {
        let estados = self.estados();
        let pos = estados.iter().position(|e| *e == actual)?;
        estados.get(pos + 1).copied()
    }

    /// Estados a los que se puede pasar desde `actual`.
    pub fn estados_siguientes(self, actual: EstadoSolicitud) -> Vec<EstadoSolicitud> {
        if actual.es_terminal() {
            return Vec::new();
        }
        let mut siguientes: Vec<_> = self.siguiente(actual).into_iter().collect();
        siguientes.push(Cancelado);
        siguientes
    }

    pub fn puede_transicionar(self, actual: EstadoSolicitud, nuevo: EstadoSolicitud) -> bool {
        self.estados_siguientes(actual).contains(&nuevo)
    }
}

impl EstadoSolicitud {
    pub fn codigo(self) -> &'static str {
        match self {
            Iniciado => "iniciado",
            PendienteDocumentos => "pendiente_documentos",
            DocumentosEntregados => "documentos_entregados",
            FormularioCompletado => "formulario_completado",
            CitaAgendada => "cita_agendada",
            EntrevistaRealizada => "entrevista_realizada",
            SolicitudEnviada => "solicitud_enviada",
            BiometriaRealizada => "biometria_realizada",
            EnRevision => "en_revision",
            Aprobado => "aprobado",
            OfertaVerificada => "oferta_verificada",
            CartaAceptacion => "carta_aceptacion",
            PasaporteEmitido => "pasaporte_emitido",
            EnApostilla => "en_apostilla",
            DocumentosApostillados => "documentos_apostillados",
            VueloYReencuentro => "vuelo_y_reencuentro",
            Finalizado => "finalizado",
            Cancelado => "cancelado",
        }
    }

    pub fn etiqueta(self) -> &'static str {
        match self {
            Iniciado => "Iniciado",
            PendienteDocumentos => "Pendiente de documentos",
            DocumentosEntregados => "Documentos entregados",
            FormularioCompletado => "Formulario completado",
            CitaAgendada => "Cita agendada",
            EntrevistaRealizada => "Entrevista realizada",
            SolicitudEnviada => "Solicitud enviada",
            BiometriaRealizada => "Biometría realizada",
            EnRevision => "En revisión",
            Aprobado => "Aprobado",
            OfertaVerificada => "Oferta laboral verificada",
            CartaAceptacion => "Carta de aceptación recibida",
            PasaporteEmitido => "Pasaporte emitido",
            EnApostilla => "En apostilla",
            DocumentosApostillados => "Documentos apostillados",
            VueloYReencuentro => "Vuelo y reencuentro",
            Finalizado => "Finalizado",
            Cancelado => "Cancelado",
        }
    }

    pub fn es_terminal(self) -> bool {
        matches!(self, Finalizado | Cancelado)
    }

    /// Estados a los que solo se entra con el expediente de documentos completo.
    pub fn requiere_documentos(self) -> bool {
        matches!(self, DocumentosEntregados | VueloYReencuentro)
    }
}

const TODOS_LOS_ESTADOS: [EstadoSolicitud; 18] = [
    Iniciado,
    PendienteDocumentos,
    DocumentosEntregados,
    FormularioCompletado,
    CitaAgendada,
    EntrevistaRealizada,
    SolicitudEnviada,
    BiometriaRealizada,
    EnRevision,
    Aprobado,
    OfertaVerificada,
    CartaAceptacion,
    PasaporteEmitido,
    EnApostilla,
    DocumentosApostillados,
    VueloYReencuentro,
    Finalizado,
    Cancelado,
];

impl FromStr for TipoTramite {
    type Err = VocabularioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        TipoTramite::TODOS
            .into_iter()
            .find(|t| t.codigo() == s || t.etiqueta().eq_ignore_ascii_case(s))
            .ok_or_else(|| VocabularioError::TipoDesconocido(s.to_string()))
    }
}

impl FromStr for EstadoSolicitud {
    type Err = VocabularioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        TODOS_LOS_ESTADOS
            .into_iter()
            .find(|e| e.codigo() == s || e.etiqueta().eq_ignore_ascii_case(s))
            .ok_or_else(|| VocabularioError::EstadoDesconocido(s.to_string()))
    }
}

// Conversión usada por `#[sqlx(try_from = "String")]` al leer filas.
impl TryFrom<String> for TipoTramite {
    type Error = VocabularioError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for EstadoSolicitud {
    type Error = VocabularioError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for TipoTramite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.codigo())
    }
}

impl fmt::Display for EstadoSolicitud {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.codigo())
    }
}

/// Descripción serializable de un tipo y su vocabulario, para los selects del front.
#[derive(Debug, Serialize)]
pub struct VocabularioTipo {
    pub tipo: TipoTramite,
    pub etiqueta: &'static str,
    pub estados: Vec<EstadoDescrito>,
}

#[derive(Debug, Serialize)]
pub struct EstadoDescrito {
    pub codigo: EstadoSolicitud,
    pub etiqueta: &'static str,
}

impl From<EstadoSolicitud> for EstadoDescrito {
    fn from(e: EstadoSolicitud) -> Self {
        Self {
            codigo: e,
            etiqueta: e.etiqueta(),
        }
    }
}

impl From<TipoTramite> for VocabularioTipo {
    fn from(t: TipoTramite) -> Self {
        Self {
            tipo: t,
            etiqueta: t.etiqueta(),
            estados: t.estados().iter().copied().map(EstadoDescrito::from).collect(),
        }
    }
}
