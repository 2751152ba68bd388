//! Módulo `excel`: lectura y normalización de la hoja de importación.
//!
//! Submódulos:
//! - `io`: lectura del libro desde memoria y conversión de celdas a texto
//! - `columnas`: resolución de encabezados a posiciones (`MapaColumnas`)
//! - `normalizador`: fila cruda → `BorradorCaso` o error de fila
//! - `fechas`: seriales de Excel y textos de fecha → `YYYY-MM-DD`
//! - `zonas`: canonicalización de nombres de zona

pub mod io;
pub mod columnas;
pub mod normalizador;
pub mod fechas;
pub mod zonas;

pub use columnas::{normalizar_encabezado, resolver_columnas, MapaColumnas};
pub use fechas::normalizar_fecha;
pub use io::{leer_hoja_desde_bytes, HojaCruda};
pub use normalizador::{extraer_ubicacion, normalizar_fila};
pub use zonas::canonicalizar_zona;

use tracing::{debug, warn};

use crate::config::ImportConfig;
use crate::errors::ImportError;
use crate::models::BorradorCaso;

/// Resultado de leer y normalizar una hoja, sin tocar el almacén.
#[derive(Debug, Clone)]
pub struct ExcelProcesado {
    pub casos: Vec<BorradorCaso>,
    pub errores: Vec<String>,
    /// Filas de datos (sin encabezado), incluidas las filas en blanco
    pub total_filas: usize,
}

/// Lee el Excel, resuelve columnas y normaliza cada fila de datos.
///
/// Sólo falla (`ImportError`) si el libro es ilegible o faltan columnas; los
/// problemas de cada fila se acumulan en `errores`.
pub fn procesar_excel(bytes: &[u8], config: &ImportConfig) -> Result<ExcelProcesado, ImportError> {
    let hoja = leer_hoja_desde_bytes(bytes)?;
    let encabezado = hoja
        .encabezado()
        .ok_or_else(|| ImportError::Parse("la hoja no tiene fila de encabezados".to_string()))?;
    let columnas = resolver_columnas(encabezado, config)?;
    debug!(hoja = %hoja.nombre(), ?columnas, "columnas resueltas");

    let mut casos = Vec::new();
    let mut errores = Vec::new();
    for (idx, fila) in hoja.filas_datos().iter().enumerate() {
        let numero = hoja.numero_fila(idx);
        match normalizar_fila(fila, &columnas, numero, config) {
            Ok(Some(borrador)) => casos.push(borrador),
            Ok(None) => {}
            Err(msg) => {
                warn!("{}", msg);
                errores.push(msg);
            }
        }
    }

    Ok(ExcelProcesado {
        casos,
        errores,
        total_filas: hoja.filas_datos().len(),
    })
}
