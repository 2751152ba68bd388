use serde::Serialize;

use crate::importacion::reconciliar::{Reconciliado, ResultadoFila};
use crate::models::{Caso, Diferencias};

/// Caso creado o actualizado, con el registro tal como quedó guardado.
#[derive(Debug, Clone, Serialize)]
pub struct EntradaExito {
    pub aviso: String,
    pub data: Caso,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<Diferencias>,
}

/// Reporte de una importación.
///
/// `errors` lleva primero los errores de fila (en orden de fila) y después
/// los de reconciliación. Se cumple
/// `created + updated + skipped + failed == valid_cases_found`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReporteImportacion {
    pub total_rows: usize,
    pub valid_cases_found: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub success: Vec<EntradaExito>,
    pub errors: Vec<String>,
    pub outcomes: Vec<ResultadoFila>,
}

impl ReporteImportacion {
    pub fn nuevo(total_rows: usize, valid_cases_found: usize, errores_fila: Vec<String>) -> Self {
        ReporteImportacion {
            total_rows,
            valid_cases_found,
            errors: errores_fila,
            ..Default::default()
        }
    }

    pub fn registrar(&mut self, r: Reconciliado) {
        match &r.resultado {
            ResultadoFila::Creado { aviso, .. } => {
                self.created += 1;
                if let Some(caso) = r.caso {
                    self.success.push(EntradaExito { aviso: aviso.clone(), data: caso, updated: None, changes: None });
                }
            }
            ResultadoFila::Actualizado { aviso, cambios, .. } => {
                self.updated += 1;
                if let Some(caso) = r.caso {
                    self.success.push(EntradaExito {
                        aviso: aviso.clone(),
                        data: caso,
                        updated: Some(true),
                        changes: Some(cambios.clone()),
                    });
                }
            }
            ResultadoFila::Omitido { .. } => self.skipped += 1,
            ResultadoFila::Fallido { aviso, mensaje, .. } => {
                self.failed += 1;
                self.errors.push(format!("Aviso {}: {}", aviso, mensaje));
            }
        }
        self.outcomes.push(r.resultado);
    }

    /// Errores de fila (validación) más errores de reconciliación.
    pub fn total_errores(&self) -> usize {
        self.errors.len()
    }

    /// Mensaje de una línea para el cliente.
    pub fn resumen(&self) -> String {
        let mut msg = format!("Importación completada: {} casos creados", self.created);
        if self.updated > 0 {
            msg.push_str(&format!(", {} casos actualizados", self.updated));
        }
        if self.skipped > 0 {
            msg.push_str(&format!(", {} casos omitidos (sin cambios)", self.skipped));
        }
        if !self.errors.is_empty() {
            msg.push_str(&format!(", {} errores", self.errors.len()));
        }
        msg
    }
}
