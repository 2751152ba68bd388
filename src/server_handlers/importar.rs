use actix_multipart::Multipart;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder};
use futures_util::stream::StreamExt;
use serde_json::json;
use tracing::warn;

use crate::importacion::{importar_casos_desde_excel, ReporteImportacion};
use crate::server_handlers::{con_store, mensaje, AppState};

/// Lee el campo `file` del multipart. Si ningún campo se llama así, se usa el
/// primero que traiga nombre de archivo.
async fn leer_archivo(mut payload: Multipart) -> Result<Option<Vec<u8>>, String> {
    let mut elegido: Option<Vec<u8>> = None;
    while let Some(field_res) = payload.next().await {
        let mut field = field_res.map_err(|e| format!("error en el formulario: {}", e))?;
        let cd = field.content_disposition();
        let es_file = cd.get_name() == Some("file");
        let tiene_nombre = cd.get_filename().is_some();

        let mut buf: Vec<u8> = Vec::new();
        while let Some(chunk) = field.next().await {
            let bytes = chunk.map_err(|e| format!("error leyendo el archivo: {}", e))?;
            buf.extend_from_slice(&bytes);
        }

        if es_file {
            return Ok(Some(buf));
        }
        if tiene_nombre && elegido.is_none() {
            elegido = Some(buf);
        }
    }
    Ok(elegido)
}

/// Status según el resultado: sólo errores → 400, mezcla → 207, limpio → 200.
pub fn status_para_reporte(reporte: &ReporteImportacion) -> StatusCode {
    match (reporte.errors.is_empty(), reporte.success.is_empty()) {
        (true, _) => StatusCode::OK,
        (false, true) => StatusCode::BAD_REQUEST,
        (false, false) => StatusCode::MULTI_STATUS,
    }
}

/// POST /cases/import
pub async fn importar_casos_handler(state: web::Data<AppState>, payload: Multipart) -> impl Responder {
    let bytes = match leer_archivo(payload).await {
        Ok(Some(b)) if !b.is_empty() => b,
        Ok(_) => return mensaje(StatusCode::BAD_REQUEST, "No se proporcionó ningún archivo"),
        Err(e) => {
            warn!("{}", e);
            return mensaje(StatusCode::BAD_REQUEST, e);
        }
    };

    let reporte = match con_store(&state, move |store, config| importar_casos_desde_excel(&bytes, store, config)).await {
        Ok(Ok(r)) => r,
        Ok(Err(e)) => return mensaje(StatusCode::BAD_REQUEST, e.to_string()),
        Err(resp) => return resp,
    };

    HttpResponse::build(status_para_reporte(&reporte)).json(json!({
        "message": reporte.resumen(),
        "summary": {
            "totalRows": reporte.total_rows,
            "validCasesFound": reporte.valid_cases_found,
            "created": reporte.created,
            "updated": reporte.updated,
            "success": reporte.success.len(),
            "skipped": reporte.skipped,
            "failed": reporte.failed,
            "errors": reporte.total_errores(),
        },
        "success": reporte.success,
        "errors": reporte.errors,
        "outcomes": reporte.outcomes,
    }))
}
