use chrono::{Local, Utc};
use rusqlite::{ffi, params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::errors::StoreError;
use crate::models::{ActualizacionCaso, CampoCaso, Caso, Novedad, NuevoCaso, Tienda};
use crate::store::CaseStore;

const SCHEMA: &str = "
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS tiendas (
        codigo TEXT PRIMARY KEY,
        nombre TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS casos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        aviso TEXT NOT NULL UNIQUE,
        fecha_creacion TEXT,
        tipologia TEXT,
        texto_breve TEXT,
        zona TEXT,
        ubicacion TEXT REFERENCES tiendas(codigo),
        denominacion_ubicacion_tecnica TEXT,
        fin_averia_tiempo_respuesta TEXT,
        prioridad TEXT,
        estado TEXT,
        creado_en TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS novedades (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        caso_id INTEGER NOT NULL REFERENCES casos(id) ON DELETE CASCADE,
        texto TEXT NOT NULL,
        creado_en TEXT NOT NULL
    );
";

const COLUMNAS_CASO: &str = "id, aviso, fecha_creacion, tipologia, texto_breve, zona, ubicacion, \
     denominacion_ubicacion_tecnica, fin_averia_tiempo_respuesta, prioridad, estado, creado_en";

/// Almacén de casos sobre SQLite. Una sola conexión; quien lo comparta entre
/// hilos debe envolverlo en un `Mutex`.
pub struct SqliteStore {
    conn: Connection,
}

impl fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SqliteStore(..)")
    }
}

impl SqliteStore {
    /// Abre (o crea) la base en `path`, creando el directorio padre y el esquema.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let conn = Connection::open(path)?;
        info!(db = %path.display(), "base de casos abierta");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteStore { conn })
    }

    /// Inserta o renombra una tienda de la tabla de referencia.
    pub fn upsert_location(&mut self, tienda: &Tienda) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO tiendas (codigo, nombre) VALUES (?1, ?2)
             ON CONFLICT(codigo) DO UPDATE SET nombre = excluded.nombre",
            params![tienda.codigo, tienda.nombre],
        )?;
        Ok(())
    }

    /// Todos los casos, los más recientes (por `fecha_creacion`) primero.
    pub fn list_cases(&self) -> Result<Vec<Caso>, StoreError> {
        let sql = format!("SELECT {} FROM casos ORDER BY fecha_creacion DESC, id DESC", COLUMNAS_CASO);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], caso_desde_fila)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    pub fn get_case_by_id(&self, id: i64) -> Result<Option<Caso>, StoreError> {
        let sql = format!("SELECT {} FROM casos WHERE id = ?1", COLUMNAS_CASO);
        Ok(self.conn.query_row(&sql, params![id], caso_desde_fila).optional()?)
    }

    pub fn create_novedad(&mut self, caso_id: i64, texto: &str) -> Result<Novedad, StoreError> {
        if self.get_case_by_id(caso_id)?.is_none() {
            return Err(StoreError::NotFound(format!("El caso {} no existe", caso_id)));
        }
        let creado_en = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO novedades (caso_id, texto, creado_en) VALUES (?1, ?2, ?3)",
            params![caso_id, texto, creado_en],
        )?;
        Ok(Novedad {
            id: self.conn.last_insert_rowid(),
            caso_id,
            texto: texto.to_string(),
            creado_en,
        })
    }

    /// Novedades de un caso, la más reciente primero.
    pub fn list_novedades(&self, caso_id: i64) -> Result<Vec<Novedad>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, caso_id, texto, creado_en FROM novedades WHERE caso_id = ?1 ORDER BY creado_en DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![caso_id], |row| {
            Ok(Novedad {
                id: row.get(0)?,
                caso_id: row.get(1)?,
                texto: row.get(2)?,
                creado_en: row.get(3)?,
            })
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }
}

fn caso_desde_fila(row: &Row<'_>) -> rusqlite::Result<Caso> {
    Ok(Caso {
        id: row.get(0)?,
        aviso: row.get(1)?,
        fecha_creacion: row.get(2)?,
        tipologia: row.get(3)?,
        texto_breve: row.get(4)?,
        zona: row.get(5)?,
        ubicacion: row.get(6)?,
        denominacion_ubicacion_tecnica: row.get(7)?,
        fin_averia_tiempo_respuesta: row.get(8)?,
        prioridad: row.get(9)?,
        estado: row.get(10)?,
        creado_en: row.get(11)?,
    })
}

/// Traduce violaciones de restricciones de SQLite a errores tipados usando el
/// código extendido, no el texto del mensaje.
fn clasificar_error(err: rusqlite::Error, aviso: &str, ubicacion: Option<&str>) -> StoreError {
    if let rusqlite::Error::SqliteFailure(e, _) = &err {
        if e.code == ErrorCode::ConstraintViolation {
            if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE || e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY {
                return StoreError::DuplicateAviso { aviso: aviso.to_string() };
            }
            if e.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY {
                return StoreError::UnknownLocation {
                    codigo: ubicacion.unwrap_or_default().to_string(),
                };
            }
        }
    }
    StoreError::Sqlite(err)
}

impl CaseStore for SqliteStore {
    fn insert_case(&mut self, nuevo: &NuevoCaso) -> Result<Caso, StoreError> {
        // Sin fecha de creación se usa la de hoy (las importaciones traen la suya)
        let fecha_creacion = nuevo
            .fecha_creacion
            .clone()
            .unwrap_or_else(|| Local::now().date_naive().format("%Y-%m-%d").to_string());
        let creado_en = Utc::now().to_rfc3339();

        self.conn
            .execute(
                "INSERT INTO casos (
                    aviso, fecha_creacion, tipologia, texto_breve, zona, ubicacion,
                    denominacion_ubicacion_tecnica, fin_averia_tiempo_respuesta, prioridad, estado, creado_en
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    nuevo.aviso,
                    fecha_creacion,
                    nuevo.tipologia,
                    nuevo.texto_breve,
                    nuevo.zona,
                    nuevo.ubicacion,
                    nuevo.denominacion_ubicacion_tecnica,
                    nuevo.fin_averia_tiempo_respuesta,
                    nuevo.prioridad,
                    nuevo.estado,
                    creado_en,
                ],
            )
            .map_err(|e| clasificar_error(e, &nuevo.aviso, nuevo.ubicacion.as_deref()))?;

        let id = self.conn.last_insert_rowid();
        debug!(aviso = %nuevo.aviso, id, "caso insertado");
        self.get_case_by_id(id)?
            .ok_or_else(|| StoreError::NotFound(format!("caso {} recién insertado", id)))
    }

    fn get_case_by_aviso(&self, aviso: &str) -> Result<Option<Caso>, StoreError> {
        let sql = format!("SELECT {} FROM casos WHERE aviso = ?1", COLUMNAS_CASO);
        Ok(self.conn.query_row(&sql, params![aviso.trim()], caso_desde_fila).optional()?)
    }

    fn update_case(&mut self, aviso: &str, campos: &ActualizacionCaso) -> Result<Caso, StoreError> {
        let aviso = aviso.trim();
        let mut columnas: Vec<&'static str> = Vec::new();
        let mut valores: Vec<String> = Vec::new();
        for campo in CampoCaso::COMPARABLES {
            if let Some(v) = campos.valor(campo) {
                columnas.push(campo.nombre());
                valores.push(v.to_string());
            }
        }
        if let Some(d) = &campos.denominacion_ubicacion_tecnica {
            columnas.push("denominacion_ubicacion_tecnica");
            valores.push(d.clone());
        }

        if columnas.is_empty() {
            return self
                .get_case_by_aviso(aviso)?
                .ok_or_else(|| StoreError::NotFound(format!("aviso {}", aviso)));
        }

        // Los nombres de columna salen de `CampoCaso`, nunca del cliente
        let sets: Vec<String> = columnas
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{} = ?{}", c, i + 1))
            .collect();
        let sql = format!("UPDATE casos SET {} WHERE aviso = ?{}", sets.join(", "), columnas.len() + 1);
        valores.push(aviso.to_string());

        let cambiadas = self
            .conn
            .execute(&sql, params_from_iter(valores.iter()))
            .map_err(|e| clasificar_error(e, aviso, campos.ubicacion.as_deref()))?;
        if cambiadas == 0 {
            return Err(StoreError::NotFound(format!("aviso {}", aviso)));
        }
        debug!(aviso, campos = ?columnas, "caso actualizado");

        self.get_case_by_aviso(aviso)?
            .ok_or_else(|| StoreError::NotFound(format!("aviso {}", aviso)))
    }

    fn get_location_by_code(&self, codigo: &str) -> Result<Option<Tienda>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT codigo, nombre FROM tiendas WHERE codigo = ?1",
                params![codigo.trim()],
                |row| Ok(Tienda { codigo: row.get(0)?, nombre: row.get(1)? }),
            )
            .optional()?)
    }
}
