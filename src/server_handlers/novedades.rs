use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use crate::server_handlers::{con_store, mensaje, respuesta_store_error, AppState};

#[derive(Debug, Deserialize)]
pub struct NovedadRequest {
    #[serde(default)]
    pub texto: String,
}

/// GET /cases/{id}/novedades, más recientes primero.
pub async fn listar_novedades_handler(state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let caso_id = path.into_inner();
    let resultado = con_store(&state, move |store, _| match store.get_case_by_id(caso_id) {
        Ok(Some(_)) => store.list_novedades(caso_id).map(Some),
        Ok(None) => Ok(None),
        Err(e) => Err(e),
    })
    .await;

    match resultado {
        Ok(Ok(Some(novedades))) => HttpResponse::Ok().json(novedades),
        Ok(Ok(None)) => mensaje(StatusCode::NOT_FOUND, "Caso no encontrado"),
        Ok(Err(e)) => respuesta_store_error(&e),
        Err(resp) => resp,
    }
}

/// POST /cases/{id}/novedades
pub async fn crear_novedad_handler(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<NovedadRequest>,
) -> impl Responder {
    let caso_id = path.into_inner();
    let texto = body.texto.trim().to_string();
    if texto.is_empty() {
        return mensaje(StatusCode::BAD_REQUEST, "El texto de la novedad es obligatorio");
    }
    match con_store(&state, move |store, _| store.create_novedad(caso_id, &texto)).await {
        Ok(Ok(novedad)) => HttpResponse::Created().json(novedad),
        Ok(Err(e)) => respuesta_store_error(&e),
        Err(resp) => resp,
    }
}
