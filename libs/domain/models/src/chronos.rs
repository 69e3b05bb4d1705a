// [libs/domain/models/src/chronos.rs]
/*!
 * =================================================================
 * APARATO: CHRONOS UTC BOUNDARY (V1.0 - SOBERANO)
 * CLASIFICACIÓN: DOMAIN UTILITY (ESTRATO L2)
 * RESPONSABILIDAD: NORMALIZACIÓN HORARIA EN LAS FRONTERAS DEL NÚCLEO
 *
 * El núcleo calcula y almacena exclusivamente en UTC. Dos funciones de
 * frontera gobiernan el tránsito: 'to_utc' en la entrada y
 * 'at_boundary' en la salida. Ningún componente interno debe formatear
 * marcas temporales por su cuenta.
 * =================================================================
 */

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};

/// Instante actual en UTC. Punto único de lectura del reloj del sistema.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Normaliza cualquier instante con zona explícita al huso UTC del núcleo.
pub fn to_utc<Tz: TimeZone>(instant: DateTime<Tz>) -> DateTime<Utc> {
    instant.with_timezone(&Utc)
}

/// Promueve un instante naive (ya expresado en UTC por el emisor) a aware UTC.
/// Las fuentes JPL documentan todas sus marcas temporales en UTC.
pub fn from_naive_utc(naive_instant: NaiveDateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from_naive_utc_and_offset(naive_instant, Utc)
}

/// Serializa un instante para la frontera de salida y para el Motor A.
///
/// Formato fijo RFC3339 con sufijo 'Z' y precisión de segundos: el formato
/// uniforme garantiza que la comparación lexicográfica en SQL coincida con
/// la comparación cronológica.
pub fn at_boundary(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Reconstruye un instante UTC desde su representación de frontera.
pub fn parse_boundary(serialized: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(serialized)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}
