mod common;

use casos::config::ImportConfig;
use casos::errors::{ImportError, StoreError};
use casos::importacion::{importar_casos_desde_excel, MotivoOmision, ResultadoFila};
use casos::models::{ActualizacionCaso, CampoCaso, Caso, NuevoCaso, Tienda};
use casos::store::CaseStore;
use common::*;

fn importar(bytes: &[u8], store: &mut casos::store::SqliteStore) -> casos::importacion::ReporteImportacion {
    importar_casos_desde_excel(bytes, store, &ImportConfig::default()).unwrap()
}

#[test]
fn test_contadores_suman_casos_validos() {
    let mut store = store_con_tiendas();
    // Precarga un caso para que una fila se actualice y otra se omita
    importar(&libro(&[fila("100", "Zona Bogotá", "5249", "Alta"), fila("101", "Zona Oriental", "", "Media")]), &mut store);

    let bytes = libro(&[
        fila("100", "Zona Bogotá", "5249", "Baja"),   // actualizado
        fila("101", "Zona Oriental", "", "Media"),    // omitido
        fila("102", "Zona Santander", "3101", "Alta"), // creado
        fila("103", "Zona Bogotá", "9999", "Alta"),   // fallido: tienda inexistente
        fila("1,5", "Zona Bogotá", "", "Alta"),       // error de fila
        fila("104", "Zona Norte", "", "Alta"),        // error de fila: zona desconocida
    ]);
    let r = importar(&bytes, &mut store);

    assert_eq!(r.total_rows, 6);
    assert_eq!(r.valid_cases_found, 4);
    assert_eq!((r.created, r.updated, r.skipped, r.failed), (1, 1, 1, 1));
    assert_eq!(r.created + r.updated + r.skipped + r.failed, r.valid_cases_found);
    assert_eq!(r.success.len(), r.created + r.updated);
    assert_eq!(r.outcomes.len(), r.valid_cases_found);
    // 2 errores de fila + 1 de reconciliación; los omitidos no cuentan
    assert_eq!(r.errors.len(), 3);
    assert!(r.errors[0].starts_with("Fila 6:"), "{:?}", r.errors);
    assert!(r.errors[1].starts_with("Fila 7:"), "{:?}", r.errors);
    assert!(r.errors[2].starts_with("Aviso 103:"), "{:?}", r.errors);
}

#[test]
fn test_filas_en_blanco_no_son_errores_ni_casos() {
    let mut store = store_con_tiendas();
    let blanca = vec![t("  "), Celda::Vacia, t(" "), Celda::Vacia, Celda::Vacia, Celda::Vacia, Celda::Vacia, Celda::Vacia];
    let bytes = libro(&[
        fila("200", "Zona Bogotá", "", "Alta"),
        vec![Celda::Vacia; 8],
        blanca,
        fila("201", "Zona Bogotá", "", "Alta"),
    ]);
    let r = importar(&bytes, &mut store);
    assert_eq!(r.total_rows, 4);
    assert_eq!(r.valid_cases_found, 2);
    assert!(r.errors.is_empty(), "{:?}", r.errors);
    assert_eq!(r.created, 2);
}

#[test]
fn test_importar_dos_veces_es_idempotente() {
    let mut store = store_con_tiendas();
    let bytes = libro(&[
        fila("300", "Zona Bogotá", "5249", "Alta"),
        fila("301", "zona ibagué centro", "VT-1008", "Media"),
        fila("302", "ZONA SANTANDERES", "", ""),
    ]);
    let primera = importar(&bytes, &mut store);
    assert_eq!(primera.created, 3);

    let segunda = importar(&bytes, &mut store);
    assert_eq!(segunda.created, 0);
    assert_eq!(segunda.updated, 0);
    assert_eq!(segunda.skipped, 3);
    assert!(segunda.errors.is_empty());
    for o in &segunda.outcomes {
        assert!(matches!(o, ResultadoFila::Omitido { motivo: MotivoOmision::SinCambios, .. }), "{:?}", o);
    }
    assert_eq!(store.list_cases().unwrap().len(), 3);
}

#[test]
fn test_falta_prioridad_aborta_sin_persistir() {
    let mut store = store_con_tiendas();
    let encabezado: Vec<&str> = ENCABEZADOS.iter().copied().filter(|h| *h != "Prioridad").collect();
    let bytes = xlsx(&encabezado, &[vec![t("400"), t("x"), t("y"), t("Zona Bogotá")]]);

    let err = importar_casos_desde_excel(&bytes, &mut store, &ImportConfig::default()).unwrap_err();
    match err {
        ImportError::MissingColumns { missing, available } => {
            assert_eq!(missing, vec!["Prioridad".to_string()]);
            assert!(available.iter().any(|a| a.contains("\"Aviso\"")), "{:?}", available);
            assert!(available.iter().any(|a| a.contains("\"zona\"")), "{:?}", available);
            assert_eq!(available.len(), 7);
        }
        other => panic!("se esperaba MissingColumns, llegó {:?}", other),
    }
    assert!(store.list_cases().unwrap().is_empty());
}

#[test]
fn test_encabezados_con_saltos_y_mayusculas() {
    let mut store = store_con_tiendas();
    let encabezado = [
        "  AVISO ",
        "Texto\nBreve",
        "tipologia",
        "PRIORIDAD",
        "Zona",
        "Ubicación",
        "Fecha   Creado",
        "Fin Avería con\ntiempo de respuesta",
    ];
    let r = importar(&xlsx(&encabezado, &[fila("450", "Zona Bogotá", "", "Alta")]), &mut store);
    assert_eq!(r.created, 1);
}

#[test]
fn test_aviso_con_ceros_y_zona_en_minusculas() {
    let mut store = store_con_tiendas();
    let r = importar(&libro(&[fila("00123", "bogota", "", "Alta")]), &mut store);
    assert!(r.errors.is_empty(), "{:?}", r.errors);
    assert_eq!(r.created, 1);
    assert!(matches!(&r.outcomes[0], ResultadoFila::Creado { aviso, .. } if aviso == "00123"));
    let caso = store.get_case_by_aviso("00123").unwrap().unwrap();
    assert_eq!(caso.aviso, "00123");
    assert_eq!(caso.zona.as_deref(), Some("Zona Bogotá"));
    assert_eq!(caso.estado.as_deref(), Some("Abierto"));
}

#[test]
fn test_aviso_numerico_se_lee_sin_decimales() {
    let mut store = store_con_tiendas();
    let mut f = fila("", "Zona Oriental", "", "Alta");
    f[0] = n(400012345678.0);
    let r = importar(&libro(&[f]), &mut store);
    assert_eq!(r.created, 1);
    assert!(store.get_case_by_aviso("400012345678").unwrap().is_some());
}

#[test]
fn test_sin_cambios_se_omite() {
    let mut store = store_con_tiendas();
    let bytes = libro(&[fila("500", "Zona Bogotá", "5249", "Alta")]);
    importar(&bytes, &mut store);
    let r = importar(&bytes, &mut store);
    assert_eq!(r.skipped, 1);
    assert!(r.success.is_empty());
    assert_eq!(r.outcomes[0].aviso(), "500");
}

#[test]
fn test_cambio_de_prioridad_actualiza_solo_ese_campo() {
    let mut store = store_con_tiendas();
    importar(&libro(&[fila("600", "Zona Bogotá", "5249", "Alta")]), &mut store);
    let antes = store.get_case_by_aviso("600").unwrap().unwrap();

    let r = importar(&libro(&[fila("600", "Zona Bogotá", "5249", "Baja")]), &mut store);
    assert_eq!(r.updated, 1);
    match &r.outcomes[0] {
        ResultadoFila::Actualizado { cambios, caso_id, .. } => {
            assert_eq!(*caso_id, antes.id);
            assert_eq!(cambios.campos(), vec![CampoCaso::Prioridad]);
            let cambio = cambios.get(CampoCaso::Prioridad).unwrap();
            assert_eq!(cambio.old.as_deref(), Some("Alta"));
            assert_eq!(cambio.new, "Baja");
        }
        other => panic!("se esperaba Actualizado, llegó {:?}", other),
    }
    let entrada = &r.success[0];
    assert_eq!(entrada.updated, Some(true));
    assert_eq!(entrada.data.prioridad.as_deref(), Some("Baja"));

    let despues = store.get_case_by_aviso("600").unwrap().unwrap();
    assert_eq!(despues.creado_en, antes.creado_en);
    assert_eq!(despues.texto_breve, antes.texto_breve);
}

#[test]
fn test_celda_vacia_no_borra_dato_existente() {
    let mut store = store_con_tiendas();
    importar(&libro(&[fila("650", "Zona Bogotá", "5249", "Alta")]), &mut store);
    let r = importar(&libro(&[fila("650", "Zona Bogotá", "", "")]), &mut store);
    assert_eq!(r.skipped, 1);
    let caso = store.get_case_by_aviso("650").unwrap().unwrap();
    assert_eq!(caso.prioridad.as_deref(), Some("Alta"));
    assert_eq!(caso.ubicacion.as_deref(), Some("5249"));
}

#[test]
fn test_ubicacion_compuesta_y_denominacion() {
    let mut store = store_con_tiendas();
    let r = importar(&libro(&[fila("700", "Zona Bogotá", "VT-1008-5249", "Alta")]), &mut store);
    assert_eq!(r.created, 1);
    let caso = store.get_case_by_aviso("700").unwrap().unwrap();
    assert_eq!(caso.ubicacion.as_deref(), Some("5249"));
    assert_eq!(caso.denominacion_ubicacion_tecnica.as_deref(), Some("Tienda Chapinero"));

    // Cambiar de tienda actualiza también la denominación
    let r = importar(&libro(&[fila("700", "Zona Bogotá", "1008", "Alta")]), &mut store);
    assert_eq!(r.updated, 1);
    let caso = store.get_case_by_aviso("700").unwrap().unwrap();
    assert_eq!(caso.denominacion_ubicacion_tecnica.as_deref(), Some("Tienda Ibagué Centro"));
}

#[test]
fn test_tienda_inexistente_falla_la_fila() {
    let mut store = store_con_tiendas();
    let r = importar(
        &libro(&[fila("800", "Zona Bogotá", "9999", "Alta"), fila("801", "Zona Bogotá", "5249", "Alta")]),
        &mut store,
    );
    assert_eq!(r.failed, 1);
    assert_eq!(r.created, 1);
    assert!(matches!(&r.outcomes[0], ResultadoFila::Fallido { aviso, fila: 2, .. } if aviso == "800"));
    assert!(r.errors[0].contains("\"9999\" no existe"), "{:?}", r.errors);
    assert!(store.get_case_by_aviso("800").unwrap().is_none());
}

#[test]
fn test_fecha_serial_y_texto_dan_lo_mismo() {
    let mut store = store_con_tiendas();
    let mut con_serial = fila("900", "Zona Bogotá", "", "Alta");
    con_serial[6] = n(45306.0);
    con_serial[7] = t("15/01/2024 08:30");
    let r = importar(&libro(&[con_serial, fila("901", "Zona Bogotá", "", "Alta")]), &mut store);
    assert_eq!(r.created, 2);

    let a = store.get_case_by_aviso("900").unwrap().unwrap();
    let b = store.get_case_by_aviso("901").unwrap().unwrap();
    assert_eq!(a.fecha_creacion.as_deref(), Some("2024-01-15"));
    assert_eq!(a.fecha_creacion, b.fecha_creacion);
    assert_eq!(a.fin_averia_tiempo_respuesta.as_deref(), Some("2024-01-15"));
}

#[test]
fn test_archivo_ilegible_es_error_de_parseo() {
    let mut store = store_con_tiendas();
    let err = importar_casos_desde_excel(b"esto no es un excel", &mut store, &ImportConfig::default()).unwrap_err();
    assert!(matches!(err, ImportError::Parse(_)));
}

#[test]
fn test_solo_encabezado_es_error_de_parseo() {
    let mut store = store_con_tiendas();
    let err = importar_casos_desde_excel(&libro(&[]), &mut store, &ImportConfig::default()).unwrap_err();
    assert!(matches!(err, ImportError::Parse(_)));
}

#[test]
fn test_resumen_menciona_contadores() {
    let mut store = store_con_tiendas();
    let bytes = libro(&[fila("950", "Zona Bogotá", "", "Alta")]);
    importar(&bytes, &mut store);
    let r = importar(&libro(&[fila("950", "Zona Bogotá", "", "Alta"), fila("x", "Zona Bogotá", "", "")]), &mut store);
    let resumen = r.resumen();
    assert!(resumen.starts_with("Importación completada: 0 casos creados"), "{}", resumen);
    assert!(resumen.contains("1 casos omitidos"), "{}", resumen);
    assert!(resumen.contains("1 errores"), "{}", resumen);
}

/// Almacén sin datos que falla como se le indique. Sirve para las ramas de
/// la reconciliación que SQLite no produce.
#[derive(Default)]
struct StoreFalso {
    /// El insert responde `DuplicateAviso` aunque el reconsultar no lo encuentre
    insert_duplicado: bool,
    /// El insert falla con un error de E/S
    insert_falla: Option<&'static str>,
    /// La consulta por aviso falla con un error de E/S
    consulta_falla: Option<&'static str>,
    updates: usize,
}

impl CaseStore for StoreFalso {
    fn insert_case(&mut self, nuevo: &NuevoCaso) -> Result<Caso, StoreError> {
        if let Some(msg) = self.insert_falla {
            return Err(StoreError::Io(std::io::Error::other(msg)));
        }
        if self.insert_duplicado {
            return Err(StoreError::DuplicateAviso { aviso: nuevo.aviso.clone() });
        }
        Err(StoreError::NotFound("el almacén falso no crea casos".to_string()))
    }

    fn get_case_by_aviso(&self, _aviso: &str) -> Result<Option<Caso>, StoreError> {
        match self.consulta_falla {
            Some(msg) => Err(StoreError::Io(std::io::Error::other(msg))),
            None => Ok(None),
        }
    }

    fn update_case(&mut self, aviso: &str, _campos: &ActualizacionCaso) -> Result<Caso, StoreError> {
        self.updates += 1;
        Err(StoreError::NotFound(aviso.to_string()))
    }

    fn get_location_by_code(&self, _codigo: &str) -> Result<Option<Tienda>, StoreError> {
        Ok(None)
    }
}

#[test]
fn test_duplicado_que_desaparece_al_reconsultar_se_omite() {
    let mut store = StoreFalso { insert_duplicado: true, ..Default::default() };
    let r = importar_casos_desde_excel(&libro(&[fila("300", "Zona Bogotá", "", "Alta")]), &mut store, &ImportConfig::default())
        .unwrap();

    assert_eq!(
        r.outcomes[0],
        ResultadoFila::Omitido { aviso: "300".into(), motivo: MotivoOmision::NoEncontradoAlReconsultar }
    );
    assert_eq!((r.created, r.updated, r.skipped, r.failed), (0, 0, 1, 0));
    assert!(r.errors.is_empty());
    assert!(r.success.is_empty());
    assert_eq!(store.updates, 0);
}

#[test]
fn test_error_del_almacen_al_insertar_falla_la_fila() {
    let mut store = StoreFalso { insert_falla: Some("disco lleno"), ..Default::default() };
    let r = importar_casos_desde_excel(
        &libro(&[fila("301", "Zona Bogotá", "", "Alta"), fila("302", "Zona Oriental", "", "Baja")]),
        &mut store,
        &ImportConfig::default(),
    )
    .unwrap();

    assert_eq!((r.created, r.updated, r.skipped, r.failed), (0, 0, 0, 2));
    assert_eq!(r.created + r.updated + r.skipped + r.failed, r.valid_cases_found);
    assert_eq!(r.errors[0], "Aviso 301: Error de E/S: disco lleno");
    assert_eq!(r.errors[1], "Aviso 302: Error de E/S: disco lleno");
    match &r.outcomes[0] {
        ResultadoFila::Fallido { aviso, fila, mensaje } => {
            assert_eq!(aviso, "301");
            assert_eq!(*fila, 2);
            assert_eq!(mensaje, "Error de E/S: disco lleno");
        }
        otro => panic!("se esperaba Fallido, llegó {:?}", otro),
    }
}

#[test]
fn test_error_al_reconsultar_duplicado_falla_la_fila() {
    let mut store = StoreFalso { insert_duplicado: true, consulta_falla: Some("conexión perdida"), ..Default::default() };
    let r = importar_casos_desde_excel(&libro(&[fila("303", "Zona Bogotá", "", "Alta")]), &mut store, &ImportConfig::default())
        .unwrap();

    assert_eq!((r.skipped, r.failed), (0, 1));
    assert_eq!(r.errors, vec!["Aviso 303: Error al actualizar - Error de E/S: conexión perdida".to_string()]);
}
