use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;

use crate::errors::ImportError;
use crate::models::FilaCruda;

/// Primera hoja de un libro, ya convertida a texto.
#[derive(Debug, Clone, PartialEq)]
pub struct HojaCruda {
    nombre: String,
    /// Fila de la hoja (0-based) donde empieza el rango usado, es decir, el encabezado
    fila_inicial: usize,
    filas: Vec<FilaCruda>,
}

impl HojaCruda {
    pub fn nombre(&self) -> &str {
        &self.nombre
    }

    pub fn encabezado(&self) -> Option<&FilaCruda> {
        self.filas.first()
    }

    pub fn filas_datos(&self) -> &[FilaCruda] {
        self.filas.get(1..).unwrap_or(&[])
    }

    /// Número de fila (1-based, como lo ve el usuario en Excel) de la fila de
    /// datos `idx` (0-based dentro de `filas_datos`).
    pub fn numero_fila(&self, idx: usize) -> usize {
        self.fila_inicial + idx + 2
    }
}

/// Convierte un `Data` de calamine a texto. Las celdas vacías o con error
/// quedan en `None`; los números enteros se escriben sin decimales para que
/// avisos largos no pasen por notación científica.
pub fn cell_to_string(c: &Data) -> Option<String> {
    match c {
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) => Some(float_to_string(*f)),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => Some(float_to_string(dt.as_f64())),
        Data::DateTimeIso(s) => Some(s.clone()),
        Data::DurationIso(s) => Some(s.clone()),
        Data::Empty | Data::Error(_) => None,
    }
}

fn float_to_string(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

/// Lee la primera hoja de un libro (xlsx, xls, xlsb u ods) desde memoria.
///
/// Falla con `ImportError::Parse` si el buffer no es un libro legible, si no
/// tiene hojas o si no trae al menos un encabezado y una fila de datos.
pub fn leer_hoja_desde_bytes(bytes: &[u8]) -> Result<HojaCruda, ImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| ImportError::Parse(format!("no se pudo abrir el libro: {}", e)))?;

    let nombre = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ImportError::Parse("el libro no contiene hojas".to_string()))?;

    let range = workbook
        .worksheet_range(&nombre)
        .map_err(|e| ImportError::Parse(format!("no se pudo leer la hoja '{}': {}", nombre, e)))?;

    let fila_inicial = range.start().map(|(r, _)| r as usize).unwrap_or(0);
    let filas: Vec<FilaCruda> = range
        .rows()
        .map(|r| r.iter().map(cell_to_string).collect())
        .collect();

    if filas.len() < 2 {
        return Err(ImportError::Parse(
            "El archivo Excel debe tener al menos una fila de encabezados y una fila de datos".to_string(),
        ));
    }

    Ok(HojaCruda { nombre, fila_inicial, filas })
}
