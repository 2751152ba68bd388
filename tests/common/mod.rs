#![allow(dead_code)]

use casos::models::Tienda;
use casos::store::SqliteStore;
use rust_xlsxwriter::Workbook;

pub const ENCABEZADOS: [&str; 8] = [
    "Aviso",
    "Texto Breve",
    "Tipologia",
    "Prioridad",
    "zona",
    "ubicación",
    "Fecha Creado",
    "Fin Avería con tiempo de respuesta",
];

#[derive(Debug, Clone)]
pub enum Celda {
    Texto(String),
    Numero(f64),
    Vacia,
}

pub fn t(s: &str) -> Celda {
    Celda::Texto(s.to_string())
}

pub fn n(v: f64) -> Celda {
    Celda::Numero(v)
}

/// Libro con una sola hoja: la primera fila es el encabezado.
pub fn xlsx(encabezado: &[&str], filas: &[Vec<Celda>]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (c, h) in encabezado.iter().enumerate() {
        worksheet.write_string(0, c as u16, *h).unwrap();
    }
    for (r, fila) in filas.iter().enumerate() {
        let row = (r + 1) as u32;
        for (c, celda) in fila.iter().enumerate() {
            match celda {
                Celda::Texto(s) => {
                    worksheet.write_string(row, c as u16, s.as_str()).unwrap();
                }
                Celda::Numero(v) => {
                    worksheet.write_number(row, c as u16, *v).unwrap();
                }
                Celda::Vacia => {}
            }
        }
    }
    workbook.save_to_buffer().unwrap()
}

/// Fila con el orden de `ENCABEZADOS`.
pub fn fila(aviso: &str, zona: &str, ubicacion: &str, prioridad: &str) -> Vec<Celda> {
    let celda = |s: &str| if s.is_empty() { Celda::Vacia } else { t(s) };
    vec![
        celda(aviso),
        t("Falla en aire acondicionado"),
        t("Correctivo"),
        celda(prioridad),
        celda(zona),
        celda(ubicacion),
        t("2024-01-15"),
        t("2024-01-20"),
    ]
}

pub fn libro(filas: &[Vec<Celda>]) -> Vec<u8> {
    xlsx(&ENCABEZADOS, filas)
}

/// Almacén en memoria con algunas tiendas cargadas.
pub fn store_con_tiendas() -> SqliteStore {
    let mut store = SqliteStore::open_in_memory().unwrap();
    for (codigo, nombre) in [("5249", "Tienda Chapinero"), ("1008", "Tienda Ibagué Centro"), ("3101", "Tienda Bucaramanga")] {
        store
            .upsert_location(&Tienda { codigo: codigo.to_string(), nombre: nombre.to_string() })
            .unwrap();
    }
    store
}
