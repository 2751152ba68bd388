use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder};
use chrono::Local;
use serde::Deserialize;
use serde_json::json;

use crate::config::ImportConfig;
use crate::errors::StoreError;
use crate::excel::canonicalizar_zona;
use crate::excel::normalizador::aviso_valido;
use crate::importacion::verificar_ubicacion;
use crate::models::{ActualizacionCaso, Caso, NuevoCaso};
use crate::server_handlers::{con_store, mensaje, respuesta_store_error, AppState};
use crate::store::{CaseStore, SqliteStore};

/// Cuerpo de POST /cases. `aviso` puede llegar como texto o como número.
#[derive(Debug, Deserialize)]
pub struct CrearCasoRequest {
    pub aviso: Option<serde_json::Value>,
    pub zona: Option<String>,
    pub ubicacion: Option<String>,
    pub texto_breve: Option<String>,
    pub tipologia: Option<String>,
    pub prioridad: Option<String>,
    pub fecha_creacion: Option<String>,
    pub fin_averia_tiempo_respuesta: Option<String>,
    pub estado: Option<String>,
}

/// Error de validación de una petición (400) o del almacén.
#[derive(Debug)]
pub enum CasoError {
    Validacion(String),
    Store(StoreError),
}

impl From<StoreError> for CasoError {
    fn from(e: StoreError) -> Self {
        CasoError::Store(e)
    }
}

impl CasoError {
    fn respuesta(&self) -> HttpResponse {
        match self {
            CasoError::Validacion(m) => mensaje(StatusCode::BAD_REQUEST, m.clone()),
            CasoError::Store(e) => respuesta_store_error(e),
        }
    }
}

fn limpio(v: &Option<String>) -> Option<String> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// Aviso como texto, sin pasar por flotantes: un número JSON entero se toma
/// tal cual; cualquier otra cosa debe ser texto de sólo dígitos.
fn aviso_desde_json(v: Option<&serde_json::Value>) -> Result<String, CasoError> {
    let aviso = match v {
        Some(serde_json::Value::String(s)) => s.trim().to_string(),
        Some(serde_json::Value::Number(n)) => match n.as_u64() {
            Some(u) => u.to_string(),
            None => n.to_string(),
        },
        _ => String::new(),
    };
    if aviso.is_empty() {
        return Err(CasoError::Validacion("El aviso es obligatorio".to_string()));
    }
    if !aviso_valido(&aviso) {
        return Err(CasoError::Validacion(
            "El aviso debe ser un número entero mayor o igual a 0".to_string(),
        ));
    }
    Ok(aviso)
}

fn zona_canonica(zona: Option<String>, config: &ImportConfig) -> Result<Option<String>, CasoError> {
    match zona {
        None => Ok(None),
        Some(z) => canonicalizar_zona(&z, config)
            .map(|c| Some(c.nombre().to_string()))
            .ok_or_else(|| CasoError::Validacion(format!("Zona \"{}\" no está en la lista de zonas permitidas", z))),
    }
}

/// Crea un caso desde el formulario: mismas reglas de aviso, zona y tienda
/// que la importación.
pub fn crear_caso<S: CaseStore>(store: &mut S, req: CrearCasoRequest, config: &ImportConfig) -> Result<Caso, CasoError> {
    let aviso = aviso_desde_json(req.aviso.as_ref())?;
    let zona = zona_canonica(limpio(&req.zona), config)?;
    let ubicacion = limpio(&req.ubicacion);
    let denominacion = verificar_ubicacion(&*store, ubicacion.as_deref())?;

    let nuevo = NuevoCaso {
        aviso,
        zona,
        ubicacion,
        denominacion_ubicacion_tecnica: denominacion,
        texto_breve: limpio(&req.texto_breve),
        tipologia: limpio(&req.tipologia),
        prioridad: limpio(&req.prioridad),
        fecha_creacion: limpio(&req.fecha_creacion),
        fin_averia_tiempo_respuesta: limpio(&req.fin_averia_tiempo_respuesta),
        estado: limpio(&req.estado).or_else(|| Some(config.estado_inicial.clone())),
    };
    Ok(store.insert_case(&nuevo)?)
}

/// Actualiza un caso por id. Los campos vacíos se ignoran y el aviso no cambia.
pub fn actualizar_caso(
    store: &mut SqliteStore,
    id: i64,
    cambios: ActualizacionCaso,
    config: &ImportConfig,
) -> Result<Caso, CasoError> {
    let existente = store
        .get_case_by_id(id)?
        .ok_or_else(|| CasoError::Store(StoreError::NotFound("Caso no encontrado".to_string())))?;

    let mut cambios = cambios.sin_vacios();
    cambios.zona = zona_canonica(cambios.zona.take(), config)?;
    cambios.denominacion_ubicacion_tecnica = verificar_ubicacion(&*store, cambios.ubicacion.as_deref())?;

    Ok(store.update_case(&existente.aviso, &cambios)?)
}

/// GET /cases
pub async fn listar_casos_handler(state: web::Data<AppState>) -> impl Responder {
    let hoy = Local::now().date_naive();
    match con_store(&state, |store, _| store.list_cases()).await {
        Ok(Ok(casos)) => {
            let out: Vec<_> = casos.into_iter().map(|c| c.con_atraso(hoy)).collect();
            HttpResponse::Ok().json(out)
        }
        Ok(Err(e)) => respuesta_store_error(&e),
        Err(resp) => resp,
    }
}

/// GET /cases/{id}
pub async fn obtener_caso_handler(state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let id = path.into_inner();
    match con_store(&state, move |store, _| store.get_case_by_id(id)).await {
        Ok(Ok(Some(caso))) => HttpResponse::Ok().json(caso.con_atraso(Local::now().date_naive())),
        Ok(Ok(None)) => mensaje(StatusCode::NOT_FOUND, "Caso no encontrado"),
        Ok(Err(e)) => respuesta_store_error(&e),
        Err(resp) => resp,
    }
}

/// POST /cases
pub async fn crear_caso_handler(state: web::Data<AppState>, body: web::Json<CrearCasoRequest>) -> impl Responder {
    let req = body.into_inner();
    match con_store(&state, move |store, config| crear_caso(store, req, config)).await {
        Ok(Ok(caso)) => HttpResponse::Created().json(json!({"message": "Caso creado correctamente", "case": caso})),
        Ok(Err(e)) => e.respuesta(),
        Err(resp) => resp,
    }
}

/// PATCH /cases/{id}
pub async fn actualizar_caso_handler(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<ActualizacionCaso>,
) -> impl Responder {
    let id = path.into_inner();
    let cambios = body.into_inner();
    match con_store(&state, move |store, config| actualizar_caso(store, id, cambios, config)).await {
        Ok(Ok(caso)) => HttpResponse::Ok().json(json!({"message": "Caso actualizado correctamente", "case": caso})),
        Ok(Err(e)) => e.respuesta(),
        Err(resp) => resp,
    }
}
