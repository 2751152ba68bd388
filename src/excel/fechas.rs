use chrono::{Days, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

/// Último serial válido en Excel (9999-12-31)
const SERIAL_MAXIMO: f64 = 2_958_465.0;

/// Serial de 1950-01-01. Un número menor en una columna de fecha suele ser
/// un año o un código suelto ("2024"), no una fecha.
const SERIAL_MINIMO: f64 = 18_264.0;

const ANIO_MINIMO: i32 = 1900;

fn epoca_excel() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or_default()
}

/// Tres grupos numéricos con el mismo separador: `15/01/2024`, `2024-01-15`,
/// `1.5.24`.
fn re_fecha() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{1,4})([-/.])(\d{1,2})([-/.])(\d{1,4})$").expect("regex de fecha válida")
    })
}

/// Convierte un serial de Excel (días desde 1899-12-30) en fecha. La parte
/// fraccionaria (hora) se descarta.
pub fn serial_a_fecha(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < SERIAL_MINIMO || serial > SERIAL_MAXIMO {
        return None;
    }
    epoca_excel().checked_add_days(Days::new(serial.floor() as u64))
}

/// Año de 4 dígitos tal cual; de 2 dígitos con pivote en 70 (`24` → 2024,
/// `85` → 1985). Otros largos no se aceptan.
fn anio(texto: &str) -> Option<i32> {
    let n: i32 = texto.parse().ok()?;
    match texto.len() {
        4 => Some(n),
        2 if n < 70 => Some(2000 + n),
        2 => Some(1900 + n),
        _ => None,
    }
}

fn fecha(anio: i32, mes: &str, dia: &str) -> Option<NaiveDate> {
    if anio < ANIO_MINIMO {
        return None;
    }
    NaiveDate::from_ymd_opt(anio, mes.parse().ok()?, dia.parse().ok()?)
}

fn parsear_texto(texto: &str) -> Option<NaiveDate> {
    let caps = re_fecha().captures(texto)?;
    let (a, sep, b, sep2, c) = (&caps[1], &caps[2], &caps[3], &caps[4], &caps[5]);
    if sep != sep2 {
        return None;
    }

    // AAAA-MM-DD / AAAA/MM/DD
    if a.len() == 4 {
        return if sep == "." || c.len() > 2 { None } else { fecha(anio(a)?, b, c) };
    }
    if a.len() > 2 {
        return None;
    }

    let y = anio(c)?;
    match sep {
        // MM/DD/AAAA; DD/MM/AAAA sólo si el mes sería imposible
        "/" => fecha(y, a, b).or_else(|| fecha(y, b, a)),
        _ => fecha(y, b, a),
    }
}

/// Normaliza una fecha de celda a `YYYY-MM-DD`.
///
/// Acepta un serial numérico (desde 1950) o un texto de fecha con hora
/// opcional: `AAAA-MM-DD`, `AAAA/MM/DD`, `MM/DD/AAAA` (o `DD/MM/AAAA` cuando
/// el primer número no puede ser mes), `DD-MM-AAAA` y `DD.MM.AAAA`. El año
/// puede venir con 2 dígitos. Devuelve `None` si no se reconoce o si el año es
/// anterior a 1900; la importación deja el campo vacío en ese caso.
pub fn normalizar_fecha(valor: &str) -> Option<String> {
    let v = valor.trim();
    if v.is_empty() {
        return None;
    }

    if let Ok(serial) = v.parse::<f64>() {
        return serial_a_fecha(serial).map(|d| d.format("%Y-%m-%d").to_string());
    }

    // Quitar la hora: "2024-01-15T10:00:00", "15/01/2024 08:30"
    let solo_fecha = v.split_whitespace().next().unwrap_or(v);
    let solo_fecha = solo_fecha.split('T').next().unwrap_or(solo_fecha);

    parsear_texto(solo_fecha).map(|d| d.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_y_texto_dan_la_misma_fecha() {
        assert_eq!(normalizar_fecha("45306").as_deref(), Some("2024-01-15"));
        assert_eq!(normalizar_fecha("45306.75").as_deref(), Some("2024-01-15"));
        assert_eq!(normalizar_fecha("2024-01-15").as_deref(), Some("2024-01-15"));
    }

    #[test]
    fn formatos_con_hora_y_mes_primero() {
        assert_eq!(normalizar_fecha("2024-01-15T13:45:00").as_deref(), Some("2024-01-15"));
        // ambigua: mes primero
        assert_eq!(normalizar_fecha("03/02/2024").as_deref(), Some("2024-03-02"));
        assert_eq!(normalizar_fecha("01/25/2024").as_deref(), Some("2024-01-25"));
        // 15 no puede ser mes: se lee como DD/MM
        assert_eq!(normalizar_fecha("15/01/2024").as_deref(), Some("2024-01-15"));
        assert_eq!(normalizar_fecha("15/01/2024 08:30").as_deref(), Some("2024-01-15"));
        assert_eq!(normalizar_fecha("03-02-2024").as_deref(), Some("2024-02-03"));
        assert_eq!(normalizar_fecha("03.02.2024").as_deref(), Some("2024-02-03"));
    }

    #[test]
    fn anio_de_dos_digitos() {
        assert_eq!(normalizar_fecha("1/15/24").as_deref(), Some("2024-01-15"));
        assert_eq!(normalizar_fecha("15/01/24").as_deref(), Some("2024-01-15"));
        assert_eq!(normalizar_fecha("3/2/99").as_deref(), Some("1999-03-02"));
    }

    #[test]
    fn anios_cortos_o_antiguos_se_descartan() {
        assert_eq!(normalizar_fecha("15/01/024"), None);
        assert_eq!(normalizar_fecha("1/15/4"), None);
        assert_eq!(normalizar_fecha("0015-01-24"), None);
        assert_eq!(normalizar_fecha("01/02/1899"), None);
        assert_eq!(normalizar_fecha("15/01-2024"), None);
    }

    #[test]
    fn numeros_pequenos_no_son_seriales() {
        assert_eq!(normalizar_fecha("2024"), None);
        assert_eq!(normalizar_fecha("1"), None);
        assert_eq!(normalizar_fecha("18264").as_deref(), Some("1950-01-01"));
    }

    #[test]
    fn ilegibles_se_descartan() {
        assert_eq!(normalizar_fecha("mañana"), None);
        assert_eq!(normalizar_fecha("-3"), None);
        assert_eq!(normalizar_fecha("99999999"), None);
        assert_eq!(normalizar_fecha(""), None);
    }
}
