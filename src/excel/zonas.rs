use crate::config::ImportConfig;
use crate::models::Zona;

/// Detecta la zona canónica por palabra clave, en orden de prioridad.
/// `normalizada` debe venir ya en minúsculas.
pub fn zona_por_palabra_clave(normalizada: &str) -> Option<Zona> {
    if normalizada.contains("bogota") || normalizada.contains("bogotá") {
        Some(Zona::Bogota)
    } else if normalizada.contains("ibague") || normalizada.contains("ibagué") {
        Some(Zona::IbagueCentro)
    } else if normalizada.contains("oriental") {
        Some(Zona::Oriental)
    } else if normalizada.contains("santander") {
        Some(Zona::Santanderes)
    } else {
        None
    }
}

/// Canonicaliza un nombre de zona escrito en el Excel.
///
/// Primero debe coincidir (sin distinguir mayúsculas) con alguna variante
/// aceptada; después se remapea por palabra clave. Si ninguna palabra clave
/// aplica se usa la zona propia de la variante, de modo que el resultado es
/// siempre una de las 4 zonas canónicas.
pub fn canonicalizar_zona(valor: &str, config: &ImportConfig) -> Option<Zona> {
    let normalizada = valor.trim().to_lowercase();
    let (_, propia) = config
        .zonas
        .iter()
        .find(|(variante, _)| variante.to_lowercase() == normalizada)?;
    Some(zona_por_palabra_clave(&normalizada).unwrap_or(*propia))
}

/// Lista de variantes aceptadas para mensajes de error.
pub fn variantes_aceptadas(config: &ImportConfig) -> String {
    config.zonas.iter().map(|(v, _)| v.as_str()).collect::<Vec<_>>().join(", ")
}
