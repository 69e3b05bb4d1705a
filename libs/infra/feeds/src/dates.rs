// [libs/infra/feeds/src/dates.rs]
/*!
 * =================================================================
 * APARATO: FEED TIMESTAMP GRAMMAR (V1.3 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: PARSEO ESTRICTO DE MARCAS TEMPORALES DE EFEMÉRIDES
 *
 * La fuente documenta el formato exacto 'YYYY-MMM-DD HH:MM' con
 * abreviatura inglesa de mes, siempre en UTC. Los especificadores %b/%B
 * de chrono casan nombres ingleses con independencia del locale del
 * proceso, de modo que el parseo es determinista en cualquier host.
 * Una marca imparseable produce None: jamás se fabrica un instante.
 * =================================================================
 */

use centinela_domain_models::chronos;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Formato primario documentado por la fuente de encuentros.
const PRIMARY_FORMAT: &str = "%Y-%b-%d %H:%M";

/// Variantes toleradas ante desviaciones menores de la fuente.
const FALLBACK_DATETIME_FORMATS: [&str; 6] = [
    "%Y-%b-%d %H:%M:%S",
    "%Y-%B-%d %H:%M",
    "%Y-%B-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Variantes de fecha sin hora (medianoche UTC implícita).
const FALLBACK_DATE_FORMATS: [&str; 2] = ["%Y-%b-%d", "%Y-%m-%d"];

/**
 * Parsea una marca temporal del feed al instante UTC del núcleo.
 *
 * Devuelve `None` ante cualquier cadena que no case la gramática: el
 * registro portador debe saltarse, nunca completarse con un instante
 * inventado.
 */
pub fn parse_feed_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, PRIMARY_FORMAT) {
        return Some(chronos::from_naive_utc(parsed));
    }

    for format in FALLBACK_DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(chronos::from_naive_utc(parsed));
        }
    }

    for format in FALLBACK_DATE_FORMATS {
        if let Ok(parsed_date) = NaiveDate::parse_from_str(trimmed, format) {
            let midnight = parsed_date.and_hms_opt(0, 0, 0)?;
            return Some(chronos::from_naive_utc(midnight));
        }
    }

    None
}
