pub mod casos;
pub mod importar;
pub mod novedades;

pub use casos::*;
pub use importar::*;
pub use novedades::*;

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use serde_json::json;
use std::sync::Mutex;
use tracing::error;

use crate::config::ImportConfig;
use crate::errors::StoreError;
use crate::store::SqliteStore;

/// Estado compartido por los handlers.
pub struct AppState {
    pub store: Mutex<SqliteStore>,
    pub import: ImportConfig,
}

impl AppState {
    pub fn new(store: SqliteStore, import: ImportConfig) -> Self {
        AppState { store: Mutex::new(store), import }
    }
}

/// Ejecuta `f` con el almacén bloqueado dentro del pool bloqueante de actix.
/// SQLite y la espera del mutex nunca ocupan un hilo del executor, así que
/// una importación larga no detiene las demás peticiones.
pub async fn con_store<T, F>(state: &web::Data<AppState>, f: F) -> Result<T, HttpResponse>
where
    F: FnOnce(&mut SqliteStore, &ImportConfig) -> T + Send + 'static,
    T: Send + 'static,
{
    let st = state.clone();
    let resultado = web::block(move || {
        let mut store = st.store.lock().map_err(|_| "mutex del almacén envenenado")?;
        Ok::<_, &'static str>(f(&mut *store, &st.import))
    })
    .await;

    match resultado {
        Ok(Ok(valor)) => Ok(valor),
        Ok(Err(e)) => {
            error!("{}", e);
            Err(mensaje(StatusCode::INTERNAL_SERVER_ERROR, "Error interno del almacén de casos"))
        }
        Err(e) => {
            error!(error = %e, "falló la tarea bloqueante del almacén");
            Err(mensaje(StatusCode::INTERNAL_SERVER_ERROR, "Error interno del almacén de casos"))
        }
    }
}

/// Respuesta JSON `{ "message": .. }` con el status indicado.
pub fn mensaje(status: StatusCode, msg: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "message": msg.into() }))
}

/// Mapea errores del almacén al status HTTP correspondiente.
pub fn respuesta_store_error(e: &StoreError) -> HttpResponse {
    let status = match e {
        StoreError::DuplicateAviso { .. } => StatusCode::CONFLICT,
        StoreError::UnknownLocation { .. } => StatusCode::BAD_REQUEST,
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Sqlite(_) | StoreError::Io(_) => {
            error!(error = %e, "error del almacén");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    mensaje(status, e.to_string())
}
