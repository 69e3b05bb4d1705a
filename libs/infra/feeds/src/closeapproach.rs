// [libs/infra/feeds/src/closeapproach.rs]
/*!
 * =================================================================
 * APARATO: CLOSE APPROACH FEED CLIENT (V1.3 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: CONSULTA DE VENTANA Y PARSEO COLUMNAR DE ENCUENTROS
 *
 * Una sola consulta de ventana trae todos los encuentros del periodo;
 * la respuesta llega como cabecera 'fields[]' más matriz 'data[][]'.
 * El parseo es indexado por columna, filtra por designación cuando se
 * pide, convierte distancias a km y descarta (contándolas) las filas
 * con marca temporal imparseable.
 * =================================================================
 */

use crate::dates::parse_feed_timestamp;
use crate::errors::FeedError;
use crate::transport::execute_with_retry;
use crate::value;
use centinela_domain_models::{chronos, ApproachRecord};
use centinela_shared_resilience::{EndpointGuard, EndpointProfile, RetryPolicy};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument, warn};

/// Ventana temporal de la consulta de encuentros.
#[derive(Debug, Clone, Copy)]
pub struct ApproachWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ApproachWindow {
    /// Ventana estándar del catálogo: desde ahora hasta 'days' días.
    pub fn next_days(days: i64) -> Self {
        let start = chronos::now_utc();
        Self {
            start,
            end: start + chrono::Duration::days(days),
        }
    }
}

/// Resultado normalizado de la ventana, con contabilidad de descartes.
#[derive(Debug, Default)]
pub struct ParsedApproaches {
    /// Encuentros agrupados por designación del cuerpo.
    pub by_designation: HashMap<String, Vec<ApproachRecord>>,
    /// Filas descartadas por marca temporal o columna malformada.
    pub skipped_malformed: usize,
}

impl ParsedApproaches {
    pub fn total_records(&self) -> usize {
        self.by_designation.values().map(Vec::len).sum()
    }
}

/// Índices de columna extraídos de la cabecera 'fields[]'.
struct FieldIndices {
    designation: usize,
    calendar_date: usize,
    distance_au: usize,
    relative_velocity: usize,
    fullname: Option<usize>,
}

impl FieldIndices {
    fn from_header(fields: &[Value]) -> Option<Self> {
        let position = |name: &str| {
            fields
                .iter()
                .position(|field| field.as_str() == Some(name))
        };

        Some(Self {
            designation: position("des")?,
            calendar_date: position("cd")?,
            distance_au: position("dist")?,
            relative_velocity: position("v_rel")?,
            fullname: position("fullname"),
        })
    }
}

/// Cliente del feed de encuentros cercanos.
pub struct CloseApproachClient {
    http_engine: reqwest::Client,
    endpoint_guard: EndpointGuard,
    retry_policy: RetryPolicy,
    base_url: String,
}

impl CloseApproachClient {
    pub fn new(profile: EndpointProfile, base_url: &str) -> Self {
        Self {
            http_engine: crate::build_http_engine(),
            endpoint_guard: EndpointGuard::new(profile),
            retry_policy: RetryPolicy::default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Acceso de auditoría al guardián del endpoint.
    pub fn guard(&self) -> &EndpointGuard {
        &self.endpoint_guard
    }

    /**
     * Consulta la ventana de encuentros y normaliza la respuesta.
     *
     * # Errors:
     * - `FeedError::TransientUpstream` / `RateLimited`: enlace degradado
     *   tras agotar la política de reintentos.
     * - `FeedError::Unavailable`: rechazo del guardián de endpoint.
     */
    #[instrument(skip(self, filter_designations))]
    pub async fn fetch_approaches(
        &self,
        filter_designations: Option<&[String]>,
        window: ApproachWindow,
        max_distance_au: f64,
    ) -> Result<ParsedApproaches, FeedError> {
        let query_parameters = [
            ("date-min", window.start.format("%Y-%m-%d").to_string()),
            ("date-max", window.end.format("%Y-%m-%d").to_string()),
            ("dist-max", max_distance_au.to_string()),
            ("body", "Earth".to_string()),
            ("sort", "dist".to_string()),
            ("fullname", "true".to_string()),
        ];

        let request = self
            .http_engine
            .get(format!("{}/cad.api", self.base_url))
            .query(&query_parameters);

        let payload: Value = self
            .endpoint_guard
            .shield(async {
                let response = execute_with_retry(
                    request,
                    &self.retry_policy,
                    self.endpoint_guard.endpoint_label(),
                )
                .await?;
                response
                    .json::<Value>()
                    .await
                    .map_err(|fault| FeedError::Parse(fault.to_string()))
            })
            .await
            .map_err(FeedError::from_shield)?;

        let filter_set = filter_designations.map(|designations| {
            designations
                .iter()
                .map(String::as_str)
                .collect::<HashSet<_>>()
        });

        let parsed = parse_window_payload(&payload, filter_set.as_ref());
        info!(
            "🛰️ [CAD]: Window {} → {} yielded {} approaches ({} malformed rows skipped).",
            query_parameters[0].1,
            query_parameters[1].1,
            parsed.total_records(),
            parsed.skipped_malformed
        );

        Ok(parsed)
    }
}

/**
 * Parseo columnar de la respuesta de ventana.
 *
 * Tolera las variantes conocidas de respuesta sin datos ('count' cero,
 * 'error', 'message') devolviendo el resultado vacío. Las filas con
 * columnas o marcas temporales malformadas se saltan y contabilizan;
 * el resumen se loguea una vez por lote, no por fila.
 */
pub fn parse_window_payload(
    payload: &Value,
    filter_set: Option<&HashSet<&str>>,
) -> ParsedApproaches {
    let mut parsed = ParsedApproaches::default();

    let Some(envelope) = payload.as_object() else {
        warn!("🛰️ [CAD]: Non-object window payload. Treating as empty.");
        return parsed;
    };

    if !envelope.contains_key("fields") || !envelope.contains_key("data") {
        if value::integer(envelope.get("count").unwrap_or(&Value::Null)) == Some(0) {
            debug!("🛰️ [CAD]: Zero approaches in requested window.");
        } else if let Some(upstream_error) = envelope.get("error") {
            warn!("🛰️ [CAD]: Upstream error payload: {}", upstream_error);
        } else if let Some(upstream_message) = envelope.get("message") {
            debug!("🛰️ [CAD]: Upstream message payload: {}", upstream_message);
        } else {
            warn!("🛰️ [CAD]: Unknown window payload shape. Treating as empty.");
        }
        return parsed;
    }

    let Some(fields) = envelope.get("fields").and_then(Value::as_array) else {
        return parsed;
    };
    let Some(indices) = FieldIndices::from_header(fields) else {
        warn!("🛰️ [CAD]: Unexpected field header structure. Treating as empty.");
        return parsed;
    };
    let Some(rows) = envelope.get("data").and_then(Value::as_array) else {
        return parsed;
    };

    for row in rows {
        let Some(columns) = row.as_array() else {
            parsed.skipped_malformed += 1;
            continue;
        };

        match parse_window_row(columns, &indices, filter_set) {
            RowVerdict::Accepted(designation, record) => {
                parsed.by_designation.entry(designation).or_default().push(record);
            }
            RowVerdict::Filtered => {}
            RowVerdict::Malformed => parsed.skipped_malformed += 1,
        }
    }

    if parsed.skipped_malformed > 0 {
        warn!(
            "🛰️ [CAD]: {} malformed rows skipped in this batch.",
            parsed.skipped_malformed
        );
    }

    parsed
}

enum RowVerdict {
    Accepted(String, ApproachRecord),
    Filtered,
    Malformed,
}

fn parse_window_row(
    columns: &[Value],
    indices: &FieldIndices,
    filter_set: Option<&HashSet<&str>>,
) -> RowVerdict {
    let Some(designation) = columns
        .get(indices.designation)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
    else {
        return RowVerdict::Malformed;
    };

    if let Some(allowed) = filter_set {
        if !allowed.contains(designation) {
            return RowVerdict::Filtered;
        }
    }

    let Some(calendar_date) = columns.get(indices.calendar_date).and_then(Value::as_str) else {
        return RowVerdict::Malformed;
    };
    // Marca imparseable: la fila se descarta, jamás se fabrica un instante.
    let Some(approach_time) = parse_feed_timestamp(calendar_date) else {
        return RowVerdict::Malformed;
    };

    let Some(distance_au) = columns.get(indices.distance_au).and_then(|raw| value::scalar(raw))
    else {
        return RowVerdict::Malformed;
    };
    let Some(velocity_km_s) = columns
        .get(indices.relative_velocity)
        .and_then(|raw| value::speed_km_s(raw))
    else {
        return RowVerdict::Malformed;
    };

    let asteroid_name = indices
        .fullname
        .and_then(|index| columns.get(index))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty() && *text != designation)
        .map(str::to_string);

    let record = ApproachRecord::new(
        designation.to_string(),
        asteroid_name,
        approach_time,
        distance_au,
        None,
        velocity_km_s,
    );

    RowVerdict::Accepted(designation.to_string(), record)
}
