//! Normalización de filas: una `FilaCruda` → `BorradorCaso` o mensaje de error.
//!
//! Es una función pura: no toca el almacén ni registra estado. Los errores se
//! devuelven como texto con el prefijo `Fila N:` para que el usuario pueda
//! ubicar la fila en su hoja.

use regex::Regex;
use std::sync::OnceLock;

use crate::config::ImportConfig;
use crate::excel::columnas::MapaColumnas;
use crate::excel::fechas::normalizar_fecha;
use crate::excel::zonas::{canonicalizar_zona, variantes_aceptadas};
use crate::models::{BorradorCaso, CampoColumna, FilaCruda};

fn re_aviso() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]+$").expect("regex de aviso válida"))
}

fn re_digitos() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]+").expect("regex de dígitos válida"))
}

/// Una fila está en blanco si todas sus celdas son vacías o sólo espacios.
pub fn fila_en_blanco(fila: &FilaCruda) -> bool {
    fila.iter().all(|c| c.as_deref().map_or(true, |s| s.trim().is_empty()))
}

/// Valor recortado de una celda, `None` si está vacía.
fn celda(fila: &FilaCruda, idx: usize) -> Option<&str> {
    fila.get(idx)
        .and_then(|c| c.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// `true` si el aviso es sólo dígitos ASCII (sin separadores ni exponentes).
pub fn aviso_valido(aviso: &str) -> bool {
    re_aviso().is_match(aviso)
}

/// Extrae el código de ubicación: el último grupo de dígitos, recortado a sus
/// últimos 4 caracteres. Sin dígitos se conserva el texto tal cual.
///
/// `"VT-1008-5249"` → `"5249"`, `"125249"` → `"5249"`, `"Bodega"` → `"Bodega"`.
pub fn extraer_ubicacion(valor: &str) -> String {
    let v = valor.trim();
    match re_digitos().find_iter(v).last() {
        Some(m) => {
            let grupo = m.as_str();
            grupo[grupo.len().saturating_sub(4)..].to_string()
        }
        None => v.to_string(),
    }
}

/// Normaliza una fila de datos.
///
/// - `Ok(None)`: fila en blanco, se ignora sin contarla como error.
/// - `Ok(Some(borrador))`: fila válida.
/// - `Err(mensaje)`: fila inválida (aviso o zona).
pub fn normalizar_fila(
    fila: &FilaCruda,
    columnas: &MapaColumnas,
    numero_fila: usize,
    config: &ImportConfig,
) -> Result<Option<BorradorCaso>, String> {
    if fila_en_blanco(fila) {
        return Ok(None);
    }

    let col = |campo: CampoColumna| celda(fila, columnas.indice(campo));

    // Aviso (obligatorio)
    let aviso = match col(CampoColumna::Aviso) {
        Some(a) => a.to_string(),
        None => return Err(format!("Fila {}: El aviso es obligatorio", numero_fila)),
    };
    if !aviso_valido(&aviso) {
        return Err(format!(
            "Fila {}: El aviso debe ser un número entero válido (valor: \"{}\")",
            numero_fila, aviso
        ));
    }

    // Zona (obligatoria)
    let zona_texto = match col(CampoColumna::Zona) {
        Some(z) => z,
        None => return Err(format!("Fila {}: La zona es obligatoria (valor vacío o nulo)", numero_fila)),
    };
    let zona = match canonicalizar_zona(zona_texto, config) {
        Some(z) => z,
        None => {
            return Err(format!(
                "Fila {}: Zona \"{}\" no está en la lista de zonas permitidas. Zonas permitidas: {}",
                numero_fila,
                zona_texto,
                variantes_aceptadas(config)
            ))
        }
    };

    let ubicacion = col(CampoColumna::Ubicacion).map(extraer_ubicacion);
    let fecha_creacion = col(CampoColumna::FechaCreacion).and_then(normalizar_fecha);
    let fin_averia_tiempo_respuesta = col(CampoColumna::FinAveriaTiempoRespuesta).and_then(normalizar_fecha);

    Ok(Some(BorradorCaso {
        aviso,
        zona,
        ubicacion,
        texto_breve: col(CampoColumna::TextoBreve).map(str::to_string),
        tipologia: col(CampoColumna::Tipologia).map(str::to_string),
        prioridad: col(CampoColumna::Prioridad).map(str::to_string),
        fecha_creacion,
        fin_averia_tiempo_respuesta,
        estado: config.estado_inicial.clone(),
        fila: numero_fila,
    }))
}
