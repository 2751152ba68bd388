//! Reconciliación de un borrador contra el almacén: crear, actualizar u omitir.
//!
//! El flujo es insertar primero y, si el almacén reporta
//! `StoreError::DuplicateAviso`, comparar contra el caso existente. No hay
//! transacción alrededor: la restricción UNIQUE del almacén es la que
//! resuelve carreras entre importaciones concurrentes.

use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

use crate::errors::StoreError;
use crate::models::{BorradorCaso, CambioCampo, CampoCaso, Caso, Diferencias, NuevoCaso};
use crate::store::CaseStore;

/// Motivo por el que un aviso repetido no se tocó.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MotivoOmision {
    SinCambios,
    NoEncontradoAlReconsultar,
}

impl fmt::Display for MotivoOmision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotivoOmision::SinCambios => write!(f, "Ya existe en la base de datos (sin cambios)"),
            MotivoOmision::NoEncontradoAlReconsultar => {
                write!(f, "Ya existe en la base de datos, pero no se encontró al reconsultar")
            }
        }
    }
}

/// Resultado de reconciliar una fila.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "resultado", rename_all = "snake_case")]
pub enum ResultadoFila {
    Creado { aviso: String, caso_id: i64 },
    Actualizado { aviso: String, caso_id: i64, cambios: Diferencias },
    Omitido { aviso: String, motivo: MotivoOmision },
    Fallido { aviso: String, fila: usize, mensaje: String },
}

impl ResultadoFila {
    pub fn aviso(&self) -> &str {
        match self {
            ResultadoFila::Creado { aviso, .. }
            | ResultadoFila::Actualizado { aviso, .. }
            | ResultadoFila::Omitido { aviso, .. }
            | ResultadoFila::Fallido { aviso, .. } => aviso,
        }
    }
}

/// Resultado más el registro resultante (si lo hay) para el reporte.
#[derive(Debug, Clone)]
pub struct Reconciliado {
    pub resultado: ResultadoFila,
    pub caso: Option<Caso>,
}

fn solo_fecha(v: &str) -> &str {
    v.split('T').next().unwrap_or(v)
}

/// Compara un caso existente con un borrador.
///
/// Ambos lados se recortan (ausente = `""`) y las fechas se cortan a la parte
/// de fecha. Un campo cambia sólo si el valor nuevo no está vacío y difiere:
/// un vacío en el Excel nunca borra un dato existente.
pub fn comparar_casos(existente: &Caso, borrador: &BorradorCaso) -> Diferencias {
    let mut cambios = Diferencias::new();
    for campo in CampoCaso::COMPARABLES {
        let viejo = existente.valor(campo).map(str::trim).unwrap_or("");
        let nuevo = borrador.valor(campo).map(str::trim).unwrap_or("");
        let (v, n) = if campo.es_fecha() { (solo_fecha(viejo), solo_fecha(nuevo)) } else { (viejo, nuevo) };
        if !n.is_empty() && v != n {
            cambios.insertar(
                campo,
                CambioCampo {
                    old: existente.valor(campo).map(str::to_string),
                    new: nuevo.to_string(),
                },
            );
        }
    }
    cambios
}

fn es_codigo_tienda(codigo: &str) -> bool {
    codigo.len() == 4 && codigo.chars().all(|c| c.is_ascii_digit())
}

/// Verifica la ubicación antes de escribir, para dar un mensaje claro en vez
/// del error crudo de la llave foránea. Devuelve la denominación de la tienda.
///
/// Sólo se validan códigos de 4 dígitos; para el resto decide la restricción
/// del almacén. Un fallo de la consulta no bloquea la fila.
pub fn verificar_ubicacion<S: CaseStore>(store: &S, ubicacion: Option<&str>) -> Result<Option<String>, StoreError> {
    let codigo = match ubicacion.map(str::trim) {
        Some(c) if es_codigo_tienda(c) => c,
        _ => return Ok(None),
    };
    match store.get_location_by_code(codigo) {
        Ok(Some(tienda)) => Ok(Some(tienda.nombre)),
        Ok(None) => Err(StoreError::UnknownLocation { codigo: codigo.to_string() }),
        Err(e) => {
            warn!(codigo, error = %e, "no se pudo consultar la tienda; se continúa sin denominación");
            Ok(None)
        }
    }
}

fn fallido(borrador: &BorradorCaso, mensaje: String) -> Reconciliado {
    Reconciliado {
        resultado: ResultadoFila::Fallido {
            aviso: borrador.aviso.clone(),
            fila: borrador.fila,
            mensaje,
        },
        caso: None,
    }
}

/// Reconcilia un borrador contra el almacén.
pub fn reconciliar_caso<S: CaseStore>(borrador: &BorradorCaso, store: &mut S) -> Reconciliado {
    let denominacion = match verificar_ubicacion(&*store, borrador.ubicacion.as_deref()) {
        Ok(d) => d,
        Err(e) => return fallido(borrador, e.to_string()),
    };

    let nuevo = NuevoCaso::desde_borrador(borrador, denominacion.clone());
    match store.insert_case(&nuevo) {
        Ok(caso) => {
            debug!(aviso = %borrador.aviso, id = caso.id, "caso creado");
            Reconciliado {
                resultado: ResultadoFila::Creado { aviso: borrador.aviso.clone(), caso_id: caso.id },
                caso: Some(caso),
            }
        }
        Err(StoreError::DuplicateAviso { .. }) => actualizar_existente(borrador, denominacion, store),
        Err(e) => fallido(borrador, e.to_string()),
    }
}

fn actualizar_existente<S: CaseStore>(borrador: &BorradorCaso, denominacion: Option<String>, store: &mut S) -> Reconciliado {
    let aviso = borrador.aviso.clone();
    let existente = match store.get_case_by_aviso(&aviso) {
        Ok(Some(c)) => c,
        Ok(None) => {
            warn!(aviso = %aviso, "aviso duplicado pero no encontrado al reconsultar");
            return Reconciliado {
                resultado: ResultadoFila::Omitido { aviso, motivo: MotivoOmision::NoEncontradoAlReconsultar },
                caso: None,
            };
        }
        Err(e) => return fallido(borrador, format!("Error al actualizar - {}", e)),
    };

    let cambios = comparar_casos(&existente, borrador);
    if cambios.is_empty() {
        debug!(aviso = %aviso, "aviso existente sin cambios");
        return Reconciliado {
            resultado: ResultadoFila::Omitido { aviso, motivo: MotivoOmision::SinCambios },
            caso: Some(existente),
        };
    }

    let mut actualizacion = cambios.a_actualizacion();
    if cambios.get(CampoCaso::Ubicacion).is_some() {
        actualizacion.denominacion_ubicacion_tecnica = denominacion;
    }

    match store.update_case(&aviso, &actualizacion) {
        Ok(caso) => {
            debug!(aviso = %aviso, campos = ?cambios.campos(), "caso actualizado");
            Reconciliado {
                resultado: ResultadoFila::Actualizado { aviso, caso_id: caso.id, cambios },
                caso: Some(caso),
            }
        }
        Err(e) => fallido(borrador, format!("Error al actualizar - {}", e)),
    }
}
