// Biblioteca raíz del crate `casos`.
// Seguimiento de casos de mantenimiento con importación masiva desde Excel.
pub mod config;
pub mod errors;
pub mod excel;
pub mod importacion;
pub mod logging;
pub mod models;
pub mod server;
pub mod server_handlers;
pub mod store;

/// Ejecuta el servidor HTTP (reexport para facilitar uso desde `main`)
pub use server::run_server;
pub use importacion::importar_casos_desde_excel;
