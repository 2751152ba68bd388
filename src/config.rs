//! Configuración del servicio.
//!
//! `AppConfig` se lee del entorno (con `.env` si existe). `ImportConfig`
//! contiene las tablas fijas de la importación (columnas esperadas, zonas
//! permitidas) y se pasa por referencia al resolvedor y al normalizador.

use crate::errors::ConfigError;
use crate::models::{CampoColumna, Zona};
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "data/casos.db";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;

/// Mapeo de encabezados del Excel a campos del caso
pub const COLUMNAS_REQUERIDAS: [(&str, CampoColumna); 8] = [
    ("Aviso", CampoColumna::Aviso),
    ("Texto Breve", CampoColumna::TextoBreve),
    ("Tipologia", CampoColumna::Tipologia),
    ("Prioridad", CampoColumna::Prioridad),
    ("zona", CampoColumna::Zona),
    ("ubicación", CampoColumna::Ubicacion),
    ("Fecha Creado", CampoColumna::FechaCreacion),
    ("Fin Avería con tiempo de respuesta", CampoColumna::FinAveriaTiempoRespuesta),
];

/// Variantes de nombre de zona aceptadas en la importación y la zona a la que pertenecen
pub const ZONAS_PERMITIDAS: [(&str, Zona); 16] = [
    ("Zona Bogotá", Zona::Bogota),
    ("Zona Bogota", Zona::Bogota),
    ("Zona Ibague centro", Zona::IbagueCentro),
    ("Zona Ibagué Centro", Zona::IbagueCentro),
    ("Zona Ibagué centro", Zona::IbagueCentro),
    ("Zona oriental", Zona::Oriental),
    ("Zona Oriental", Zona::Oriental),
    ("Zona Santander", Zona::Santanderes),
    ("Zona Santanderes", Zona::Santanderes),
    // Nombres sin el prefijo "Zona", como los escriben algunas regionales
    ("Bogotá", Zona::Bogota),
    ("Bogota", Zona::Bogota),
    ("Ibagué Centro", Zona::IbagueCentro),
    ("Ibague Centro", Zona::IbagueCentro),
    ("Oriental", Zona::Oriental),
    ("Santander", Zona::Santanderes),
    ("Santanderes", Zona::Santanderes),
];

pub const ESTADO_INICIAL: &str = "Abierto";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind: String,
    pub db_path: PathBuf,
}

impl AppConfig {
    /// Carga `.env` (si existe) y lee la configuración del entorno.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenv::dotenv();
        Self::from_vars(|k| std::env::var(k).ok())
    }

    /// Versión parametrizable para pruebas: `get` resuelve una variable por nombre.
    ///
    /// - `CASOS_BIND`: dirección completa (`host:puerto`). Si falta se usa
    ///   `127.0.0.1` con `PORT` o 3000.
    /// - `CASOS_DB_PATH`: ruta del fichero SQLite.
    /// - `CASOS_DB_URL`: `sqlite://ruta` o `file://ruta`; otros esquemas se rechazan.
    pub fn from_vars<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind = match get("CASOS_BIND").filter(|s| !s.trim().is_empty()) {
            Some(b) => b,
            None => {
                let port = match get("PORT").filter(|s| !s.trim().is_empty()) {
                    Some(p) => p.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort(p.clone()))?,
                    None => DEFAULT_PORT,
                };
                format!("{}:{}", DEFAULT_HOST, port)
            }
        };

        let db_path = if let Some(p) = get("CASOS_DB_PATH").filter(|s| !s.trim().is_empty()) {
            PathBuf::from(p)
        } else if let Some(url) = get("CASOS_DB_URL").filter(|s| !s.trim().is_empty()) {
            if let Some(rest) = url.strip_prefix("sqlite://") {
                PathBuf::from(rest)
            } else if let Some(rest) = url.strip_prefix("file://") {
                PathBuf::from(rest)
            } else {
                return Err(ConfigError::UnsupportedScheme(url));
            }
        } else {
            PathBuf::from(DEFAULT_DB_PATH)
        };

        Ok(AppConfig { bind, db_path })
    }
}

/// Tablas fijas que gobiernan la importación desde Excel.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportConfig {
    /// (texto de encabezado esperado, campo)
    pub columnas: Vec<(String, CampoColumna)>,
    /// (variante aceptada, zona a la que pertenece)
    pub zonas: Vec<(String, Zona)>,
    pub estado_inicial: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        ImportConfig {
            columnas: COLUMNAS_REQUERIDAS.iter().map(|(h, c)| (h.to_string(), *c)).collect(),
            zonas: ZONAS_PERMITIDAS.iter().map(|(v, z)| (v.to_string(), *z)).collect(),
            estado_inicial: ESTADO_INICIAL.to_string(),
        }
    }
}
