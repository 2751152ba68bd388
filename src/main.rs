// --- Casos: API de seguimiento e importación - Archivo principal ---

use casos::config::AppConfig;
use casos::{logging, run_server};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    logging::init();
    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "configuración inválida");
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };
    println!("=== Casos (API) ===");
    println!("Iniciando servidor en http://{}", config.bind);
    run_server(config).await
}
