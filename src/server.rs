use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use serde_json::json;
use tracing::info;

use crate::config::{AppConfig, ImportConfig};
use crate::server_handlers::{
    actualizar_caso_handler, crear_caso_handler, crear_novedad_handler, importar_casos_handler,
    listar_casos_handler, listar_novedades_handler, obtener_caso_handler, AppState,
};
use crate::store::SqliteStore;

/// Registra las rutas de la API. Se usa tanto en `run_server` como en las
/// pruebas con `actix_web::test`.
pub fn configurar_rutas(cfg: &mut web::ServiceConfig) {
    cfg.route("/cases/import", web::post().to(importar_casos_handler))
        .route("/cases", web::get().to(listar_casos_handler))
        .route("/cases", web::post().to(crear_caso_handler))
        .route("/cases/{id}", web::get().to(obtener_caso_handler))
        .route("/cases/{id}", web::patch().to(actualizar_caso_handler))
        .route("/cases/{id}/novedades", web::get().to(listar_novedades_handler))
        .route("/cases/{id}/novedades", web::post().to(crear_novedad_handler))
        .route("/help", web::get().to(help_handler));
}

pub async fn run_server(config: AppConfig) -> std::io::Result<()> {
    let store = SqliteStore::open(&config.db_path)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    let state = web::Data::new(AppState::new(store, ImportConfig::default()));

    info!(bind = %config.bind, db = %config.db_path.display(), "iniciando servidor");
    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(state.clone())
            .configure(configurar_rutas)
    })
    .bind(&config.bind)?
    .run()
    .await
}

/// GET /help
async fn help_handler() -> impl Responder {
    let config = ImportConfig::default();
    let zonas: Vec<&str> = config.zonas.iter().map(|(v, _)| v.as_str()).collect();
    let columnas: Vec<&str> = config.columnas.iter().map(|(h, _)| h.as_str()).collect();
    HttpResponse::Ok().json(json!({
        "description": "API de casos. POST /cases/import recibe un Excel (campo multipart 'file') y crea o actualiza casos por aviso.",
        "routes": [
            "POST /cases/import",
            "GET /cases",
            "POST /cases",
            "GET /cases/{id}",
            "PATCH /cases/{id}",
            "GET /cases/{id}/novedades",
            "POST /cases/{id}/novedades"
        ],
        "import_columns": columnas,
        "zonas_permitidas": zonas,
    }))
}
