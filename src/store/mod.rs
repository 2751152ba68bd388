//! Almacén de casos.
//!
//! `CaseStore` es la interfaz que consume la reconciliación. Los errores son
//! tipados (`StoreError::DuplicateAviso`, `StoreError::UnknownLocation`) para
//! que nadie tenga que inspeccionar mensajes de la base de datos.

pub mod sqlite;

pub use sqlite::SqliteStore;

use crate::errors::StoreError;
use crate::models::{ActualizacionCaso, Caso, NuevoCaso, Tienda};

pub trait CaseStore {
    /// Inserta un caso. Un aviso repetido devuelve `StoreError::DuplicateAviso`
    /// y una ubicación inexistente `StoreError::UnknownLocation`.
    fn insert_case(&mut self, nuevo: &NuevoCaso) -> Result<Caso, StoreError>;

    fn get_case_by_aviso(&self, aviso: &str) -> Result<Option<Caso>, StoreError>;

    /// Aplica sólo los campos `Some` de `campos`. El aviso nunca cambia.
    fn update_case(&mut self, aviso: &str, campos: &ActualizacionCaso) -> Result<Caso, StoreError>;

    fn get_location_by_code(&self, codigo: &str) -> Result<Option<Tienda>, StoreError>;
}
