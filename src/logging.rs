use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "casos=info,actix_web=info";

/// Inicializa tracing hacia stderr. `RUST_LOG` sobrescribe el filtro por defecto.
/// Llamadas repetidas (p. ej. desde tests) no fallan.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
