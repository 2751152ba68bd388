//! Resolución de columnas: encabezados escritos a mano → posiciones fijas.

use std::collections::HashMap;
use tracing::warn;

use crate::config::ImportConfig;
use crate::errors::ImportError;
use crate::models::{CampoColumna, FilaCruda};

impl CampoColumna {
    pub const TODOS: [CampoColumna; 8] = [
        CampoColumna::Aviso,
        CampoColumna::TextoBreve,
        CampoColumna::Tipologia,
        CampoColumna::Prioridad,
        CampoColumna::Zona,
        CampoColumna::Ubicacion,
        CampoColumna::FechaCreacion,
        CampoColumna::FinAveriaTiempoRespuesta,
    ];

    pub fn nombre(&self) -> &'static str {
        match self {
            CampoColumna::Aviso => "aviso",
            CampoColumna::TextoBreve => "texto_breve",
            CampoColumna::Tipologia => "tipologia",
            CampoColumna::Prioridad => "prioridad",
            CampoColumna::Zona => "zona",
            CampoColumna::Ubicacion => "ubicacion",
            CampoColumna::FechaCreacion => "fecha_creacion",
            CampoColumna::FinAveriaTiempoRespuesta => "fin_averia_tiempo_respuesta",
        }
    }
}

/// Posición de cada columna requerida dentro de una `FilaCruda`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapaColumnas {
    pub aviso: usize,
    pub texto_breve: usize,
    pub tipologia: usize,
    pub prioridad: usize,
    pub zona: usize,
    pub ubicacion: usize,
    pub fecha_creacion: usize,
    pub fin_averia_tiempo_respuesta: usize,
}

impl MapaColumnas {
    pub fn indice(&self, campo: CampoColumna) -> usize {
        match campo {
            CampoColumna::Aviso => self.aviso,
            CampoColumna::TextoBreve => self.texto_breve,
            CampoColumna::Tipologia => self.tipologia,
            CampoColumna::Prioridad => self.prioridad,
            CampoColumna::Zona => self.zona,
            CampoColumna::Ubicacion => self.ubicacion,
            CampoColumna::FechaCreacion => self.fecha_creacion,
            CampoColumna::FinAveriaTiempoRespuesta => self.fin_averia_tiempo_respuesta,
        }
    }
}

/// Normaliza un encabezado: saltos de línea y espacios repetidos pasan a un
/// único espacio, sin bordes, en minúsculas.
pub fn normalizar_encabezado(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Construye el `MapaColumnas` a partir de la fila de encabezado.
///
/// La comparación es exacta sobre el texto normalizado. Si un encabezado
/// aparece repetido gana la primera aparición. Si falta cualquier columna la
/// importación se aborta con `ImportError::MissingColumns`.
pub fn resolver_columnas(encabezado: &FilaCruda, config: &ImportConfig) -> Result<MapaColumnas, ImportError> {
    let normalizados: Vec<Option<String>> = encabezado
        .iter()
        .map(|h| h.as_deref().map(normalizar_encabezado))
        .collect();

    let mut encontrados: HashMap<CampoColumna, usize> = HashMap::new();
    let mut faltantes: Vec<String> = Vec::new();

    for (esperado, campo) in &config.columnas {
        let objetivo = normalizar_encabezado(esperado);
        let mut coincidencias = normalizados
            .iter()
            .enumerate()
            .filter(|(_, h)| h.as_deref() == Some(objetivo.as_str()))
            .map(|(i, _)| i);

        match coincidencias.next() {
            Some(idx) => {
                if let Some(otro) = coincidencias.next() {
                    warn!(columna = %esperado, primera = idx, repetida = otro, "encabezado repetido; se usa la primera aparición");
                }
                encontrados.entry(*campo).or_insert(idx);
            }
            None => faltantes.push(esperado.clone()),
        }
    }

    // Campos que la tabla de configuración ni siquiera menciona
    for campo in CampoColumna::TODOS {
        if !config.columnas.iter().any(|(_, c)| *c == campo) {
            faltantes.push(campo.nombre().to_string());
        }
    }

    if !faltantes.is_empty() {
        let disponibles = encabezado
            .iter()
            .enumerate()
            .filter_map(|(i, h)| {
                h.as_deref()
                    .filter(|t| !t.trim().is_empty())
                    .map(|t| format!("\"{}\" (índice {})", t, i))
            })
            .collect();
        return Err(ImportError::MissingColumns { missing: faltantes, available: disponibles });
    }

    let idx = |campo: CampoColumna| encontrados.get(&campo).copied().unwrap_or_default();
    Ok(MapaColumnas {
        aviso: idx(CampoColumna::Aviso),
        texto_breve: idx(CampoColumna::TextoBreve),
        tipologia: idx(CampoColumna::Tipologia),
        prioridad: idx(CampoColumna::Prioridad),
        zona: idx(CampoColumna::Zona),
        ubicacion: idx(CampoColumna::Ubicacion),
        fecha_creacion: idx(CampoColumna::FechaCreacion),
        fin_averia_tiempo_respuesta: idx(CampoColumna::FinAveriaTiempoRespuesta),
    })
}
