// Estructuras de datos principales

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Fila cruda de la hoja: celdas posicionales, `None` para celdas vacías.
pub type FilaCruda = Vec<Option<String>>;

/// Las 4 zonas de servicio canónicas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zona {
    Bogota,
    IbagueCentro,
    Oriental,
    Santanderes,
}

impl Zona {
    pub const TODAS: [Zona; 4] = [Zona::Bogota, Zona::IbagueCentro, Zona::Oriental, Zona::Santanderes];

    /// Nombre visible, el mismo que usa el formulario de creación.
    pub fn nombre(&self) -> &'static str {
        match self {
            Zona::Bogota => "Zona Bogotá",
            Zona::IbagueCentro => "Zona Ibagué Centro",
            Zona::Oriental => "Zona Oriental",
            Zona::Santanderes => "Zona Santanderes",
        }
    }
}

impl fmt::Display for Zona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.nombre())
    }
}

impl Serialize for Zona {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.nombre())
    }
}

/// Columnas que la importación necesita encontrar en el encabezado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CampoColumna {
    Aviso,
    TextoBreve,
    Tipologia,
    Prioridad,
    Zona,
    Ubicacion,
    FechaCreacion,
    FinAveriaTiempoRespuesta,
}

/// Campos que se comparan contra un caso existente. `aviso` no está porque
/// nunca se modifica.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampoCaso {
    TextoBreve,
    Tipologia,
    Prioridad,
    Zona,
    Ubicacion,
    FechaCreacion,
    FinAveriaTiempoRespuesta,
    Estado,
}

impl CampoCaso {
    pub const COMPARABLES: [CampoCaso; 8] = [
        CampoCaso::TextoBreve,
        CampoCaso::Tipologia,
        CampoCaso::Prioridad,
        CampoCaso::Zona,
        CampoCaso::Ubicacion,
        CampoCaso::FechaCreacion,
        CampoCaso::FinAveriaTiempoRespuesta,
        CampoCaso::Estado,
    ];

    pub fn nombre(&self) -> &'static str {
        match self {
            CampoCaso::TextoBreve => "texto_breve",
            CampoCaso::Tipologia => "tipologia",
            CampoCaso::Prioridad => "prioridad",
            CampoCaso::Zona => "zona",
            CampoCaso::Ubicacion => "ubicacion",
            CampoCaso::FechaCreacion => "fecha_creacion",
            CampoCaso::FinAveriaTiempoRespuesta => "fin_averia_tiempo_respuesta",
            CampoCaso::Estado => "estado",
        }
    }

    pub fn es_fecha(&self) -> bool {
        matches!(self, CampoCaso::FechaCreacion | CampoCaso::FinAveriaTiempoRespuesta)
    }
}

/// Caso normalizado a partir de una fila del Excel, listo para reconciliar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BorradorCaso {
    pub aviso: String,
    pub zona: Zona,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ubicacion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub texto_breve: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipologia: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prioridad: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_creacion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fin_averia_tiempo_respuesta: Option<String>,
    pub estado: String,
    /// Fila (1-based) de la hoja de la que salió el borrador
    #[serde(skip)]
    pub fila: usize,
}

impl BorradorCaso {
    pub fn valor(&self, campo: CampoCaso) -> Option<&str> {
        match campo {
            CampoCaso::TextoBreve => self.texto_breve.as_deref(),
            CampoCaso::Tipologia => self.tipologia.as_deref(),
            CampoCaso::Prioridad => self.prioridad.as_deref(),
            CampoCaso::Zona => Some(self.zona.nombre()),
            CampoCaso::Ubicacion => self.ubicacion.as_deref(),
            CampoCaso::FechaCreacion => self.fecha_creacion.as_deref(),
            CampoCaso::FinAveriaTiempoRespuesta => self.fin_averia_tiempo_respuesta.as_deref(),
            CampoCaso::Estado => Some(self.estado.as_str()),
        }
    }
}

/// Caso persistido en el almacén.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caso {
    pub id: i64,
    pub aviso: String,
    pub fecha_creacion: Option<String>,
    pub tipologia: Option<String>,
    pub texto_breve: Option<String>,
    pub zona: Option<String>,
    pub ubicacion: Option<String>,
    pub denominacion_ubicacion_tecnica: Option<String>,
    pub fin_averia_tiempo_respuesta: Option<String>,
    pub prioridad: Option<String>,
    pub estado: Option<String>,
    pub creado_en: String,
}

impl Caso {
    pub fn valor(&self, campo: CampoCaso) -> Option<&str> {
        match campo {
            CampoCaso::TextoBreve => self.texto_breve.as_deref(),
            CampoCaso::Tipologia => self.tipologia.as_deref(),
            CampoCaso::Prioridad => self.prioridad.as_deref(),
            CampoCaso::Zona => self.zona.as_deref(),
            CampoCaso::Ubicacion => self.ubicacion.as_deref(),
            CampoCaso::FechaCreacion => self.fecha_creacion.as_deref(),
            CampoCaso::FinAveriaTiempoRespuesta => self.fin_averia_tiempo_respuesta.as_deref(),
            CampoCaso::Estado => self.estado.as_deref(),
        }
    }

    /// Días transcurridos desde `fin_averia_tiempo_respuesta` hasta `hoy`.
    /// Las fechas futuras cuentan como 0; sin fecha (o ilegible) → `None`.
    pub fn dias_atraso(&self, hoy: NaiveDate) -> Option<i64> {
        let fin = self.fin_averia_tiempo_respuesta.as_deref()?;
        let solo_fecha = fin.split('T').next().unwrap_or(fin).trim();
        let fecha_fin = NaiveDate::parse_from_str(solo_fecha, "%Y-%m-%d").ok()?;
        Some((hoy - fecha_fin).num_days().max(0))
    }

    pub fn con_atraso(self, hoy: NaiveDate) -> CasoConAtraso {
        let dias_atraso = self.dias_atraso(hoy);
        CasoConAtraso { caso: self, dias_atraso }
    }
}

/// Caso tal como se entrega al cliente, con `dias_atraso` calculado.
#[derive(Debug, Clone, Serialize)]
pub struct CasoConAtraso {
    #[serde(flatten)]
    pub caso: Caso,
    pub dias_atraso: Option<i64>,
}

/// Datos para insertar un caso nuevo.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NuevoCaso {
    pub aviso: String,
    pub zona: Option<String>,
    pub ubicacion: Option<String>,
    pub denominacion_ubicacion_tecnica: Option<String>,
    pub texto_breve: Option<String>,
    pub tipologia: Option<String>,
    pub prioridad: Option<String>,
    pub fecha_creacion: Option<String>,
    pub fin_averia_tiempo_respuesta: Option<String>,
    pub estado: Option<String>,
}

impl NuevoCaso {
    pub fn desde_borrador(borrador: &BorradorCaso, denominacion: Option<String>) -> Self {
        NuevoCaso {
            aviso: borrador.aviso.clone(),
            zona: Some(borrador.zona.nombre().to_string()),
            ubicacion: borrador.ubicacion.clone(),
            denominacion_ubicacion_tecnica: denominacion,
            texto_breve: borrador.texto_breve.clone(),
            tipologia: borrador.tipologia.clone(),
            prioridad: borrador.prioridad.clone(),
            fecha_creacion: borrador.fecha_creacion.clone(),
            fin_averia_tiempo_respuesta: borrador.fin_averia_tiempo_respuesta.clone(),
            estado: Some(borrador.estado.clone()),
        }
    }
}

/// Actualización parcial de un caso. Sólo se escriben los campos `Some`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActualizacionCaso {
    pub texto_breve: Option<String>,
    pub tipologia: Option<String>,
    pub prioridad: Option<String>,
    pub zona: Option<String>,
    pub ubicacion: Option<String>,
    pub fecha_creacion: Option<String>,
    pub fin_averia_tiempo_respuesta: Option<String>,
    pub estado: Option<String>,
    #[serde(skip_deserializing)]
    pub denominacion_ubicacion_tecnica: Option<String>,
}

impl ActualizacionCaso {
    pub fn valor(&self, campo: CampoCaso) -> Option<&str> {
        match campo {
            CampoCaso::TextoBreve => self.texto_breve.as_deref(),
            CampoCaso::Tipologia => self.tipologia.as_deref(),
            CampoCaso::Prioridad => self.prioridad.as_deref(),
            CampoCaso::Zona => self.zona.as_deref(),
            CampoCaso::Ubicacion => self.ubicacion.as_deref(),
            CampoCaso::FechaCreacion => self.fecha_creacion.as_deref(),
            CampoCaso::FinAveriaTiempoRespuesta => self.fin_averia_tiempo_respuesta.as_deref(),
            CampoCaso::Estado => self.estado.as_deref(),
        }
    }

    pub fn set(&mut self, campo: CampoCaso, valor: String) {
        let slot = match campo {
            CampoCaso::TextoBreve => &mut self.texto_breve,
            CampoCaso::Tipologia => &mut self.tipologia,
            CampoCaso::Prioridad => &mut self.prioridad,
            CampoCaso::Zona => &mut self.zona,
            CampoCaso::Ubicacion => &mut self.ubicacion,
            CampoCaso::FechaCreacion => &mut self.fecha_creacion,
            CampoCaso::FinAveriaTiempoRespuesta => &mut self.fin_averia_tiempo_respuesta,
            CampoCaso::Estado => &mut self.estado,
        };
        *slot = Some(valor);
    }

    /// Descarta valores vacíos o sólo con espacios (el resto se recorta).
    pub fn sin_vacios(mut self) -> Self {
        for campo in CampoCaso::COMPARABLES {
            let limpio = self.valor(campo).map(str::trim).filter(|v| !v.is_empty()).map(str::to_string);
            match limpio {
                Some(v) => self.set(campo, v),
                None => self.limpiar(campo),
            }
        }
        self
    }

    fn limpiar(&mut self, campo: CampoCaso) {
        match campo {
            CampoCaso::TextoBreve => self.texto_breve = None,
            CampoCaso::Tipologia => self.tipologia = None,
            CampoCaso::Prioridad => self.prioridad = None,
            CampoCaso::Zona => self.zona = None,
            CampoCaso::Ubicacion => self.ubicacion = None,
            CampoCaso::FechaCreacion => self.fecha_creacion = None,
            CampoCaso::FinAveriaTiempoRespuesta => self.fin_averia_tiempo_respuesta = None,
            CampoCaso::Estado => self.estado = None,
        }
    }
}

/// Par valor anterior / valor nuevo de un campo modificado.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CambioCampo {
    pub old: Option<String>,
    pub new: String,
}

/// Campos que difieren entre un caso existente y un borrador.
/// Se serializa como `{ "prioridad": { "old": .., "new": .. } }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Diferencias(BTreeMap<CampoCaso, CambioCampo>);

impl Diferencias {
    pub fn new() -> Self {
        Diferencias(BTreeMap::new())
    }

    pub fn insertar(&mut self, campo: CampoCaso, cambio: CambioCampo) {
        self.0.insert(campo, cambio);
    }

    pub fn get(&self, campo: CampoCaso) -> Option<&CambioCampo> {
        self.0.get(&campo)
    }

    pub fn campos(&self) -> Vec<CampoCaso> {
        self.0.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Actualización restringida a los campos modificados.
    pub fn a_actualizacion(&self) -> ActualizacionCaso {
        let mut upd = ActualizacionCaso::default();
        for (campo, cambio) in &self.0 {
            upd.set(*campo, cambio.new.clone());
        }
        upd
    }
}

/// Tienda (ubicación técnica) de la tabla de referencia.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tienda {
    pub codigo: String,
    pub nombre: String,
}

/// Novedad: actualización en texto libre asociada a un caso.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Novedad {
    pub id: i64,
    pub caso_id: i64,
    pub texto: String,
    pub creado_en: String,
}
