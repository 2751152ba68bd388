//! Importación masiva de casos desde Excel.
//!
//! `procesar_excel` (en `excel`) lee y normaliza; aquí cada borrador válido se
//! reconcilia contra el almacén, uno a la vez y en orden de fila, y se arma el
//! `ReporteImportacion`. Sólo un libro ilegible o columnas faltantes abortan.

pub mod reconciliar;
pub mod reporte;

pub use reconciliar::{comparar_casos, reconciliar_caso, verificar_ubicacion, MotivoOmision, Reconciliado, ResultadoFila};
pub use reporte::{EntradaExito, ReporteImportacion};

use tracing::info;

use crate::config::ImportConfig;
use crate::errors::ImportError;
use crate::excel::procesar_excel;
use crate::store::CaseStore;

pub fn importar_casos_desde_excel<S: CaseStore>(
    bytes: &[u8],
    store: &mut S,
    config: &ImportConfig,
) -> Result<ReporteImportacion, ImportError> {
    info!(bytes = bytes.len(), "iniciando importación de casos");
    let procesado = procesar_excel(bytes, config)?;

    let mut reporte = ReporteImportacion::nuevo(procesado.total_filas, procesado.casos.len(), procesado.errores);
    for borrador in &procesado.casos {
        reporte.registrar(reconciliar_caso(borrador, store));
    }

    info!(
        total_rows = reporte.total_rows,
        valid = reporte.valid_cases_found,
        created = reporte.created,
        updated = reporte.updated,
        skipped = reporte.skipped,
        failed = reporte.failed,
        "importación terminada"
    );
    Ok(reporte)
}
