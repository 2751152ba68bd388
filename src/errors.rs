//! Errores del crate.
//!
//! - `ImportError`: fallos fatales de una importación (la abortan antes de
//!   procesar filas).
//! - `StoreError`: fallos tipados del almacén de casos. La reconciliación
//!   decide por la variante, nunca por el texto del mensaje.
//! - `ConfigError`: configuración de entorno inválida.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    /// Hoja ilegible, sin hojas o sin filas de datos.
    #[error("Error al procesar el archivo Excel: {0}")]
    Parse(String),

    /// Faltan encabezados requeridos. `missing` lleva el texto esperado de
    /// cada columna y `available` los encabezados presentes en el archivo.
    #[error(
        "No se encontraron las siguientes columnas requeridas: {}. Columnas disponibles en el archivo: {}",
        .missing.join(", "),
        listar_o_ninguna(.available)
    )]
    MissingColumns {
        missing: Vec<String>,
        available: Vec<String>,
    },
}

fn listar_o_ninguna(items: &[String]) -> String {
    if items.is_empty() {
        "ninguna".to_string()
    } else {
        items.join(", ")
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("El aviso \"{aviso}\" ya existe en la base de datos")]
    DuplicateAviso { aviso: String },

    #[error("El código de ubicación \"{codigo}\" no existe en la base de datos de tiendas")]
    UnknownLocation { codigo: String },

    #[error("No encontrado: {0}")]
    NotFound(String),

    #[error("Error de base de datos: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Error de E/S: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("CASOS_DB_URL usa un esquema no soportado: {0}")]
    UnsupportedScheme(String),

    #[error("PORT inválido: {0}")]
    InvalidPort(String),
}
