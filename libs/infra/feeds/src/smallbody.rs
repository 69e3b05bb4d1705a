// [libs/infra/feeds/src/smallbody.rs]
/*!
 * =================================================================
 * APARATO: SMALL BODY FEED CLIENT (V1.3 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: LISTADO PHA Y EXTRACCIÓN FÍSICA POR DESIGNACIÓN
 *
 * Flujo en dos fases: una consulta de listado entrega las
 * designaciones del grupo PHA; después, consultas de detalle por
 * designación en ráfagas acotadas con pausa entre ráfagas. Un detalle
 * fallido nunca aborta la corrida: degrada al registro de respaldo
 * (H=18.0, diámetro derivado, albedo asumido).
 * =================================================================
 */

use crate::errors::FeedError;
use crate::transport::execute_with_retry;
use crate::value;
use centinela_domain_models::space_math;
use centinela_domain_models::{AsteroidRecord, DiameterSource};
use centinela_shared_resilience::{EndpointGuard, EndpointProfile, RetryPolicy};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Pistas textuales de medición directa en la referencia del diámetro.
const MEASURED_KEYWORDS: [&str; 13] = [
    "radar",
    "iras",
    "wise",
    "neowise",
    "spitzer",
    "thermal",
    "occultation",
    "adaptive optics",
    "hst",
    "hubble",
    "keck",
    "vlt",
    "arecibo",
];

/// Pistas textuales de estimación con supuestos estándar.
const COMPUTED_KEYWORDS: [&str; 6] = [
    "assumed",
    "typical",
    "standard",
    "default",
    "estimated from",
    "derived from",
];

/// Sintonía operativa del cliente de cuerpos menores.
#[derive(Debug, Clone)]
pub struct SmallBodyConfig {
    pub base_url: String,
    /// Tope del listado PHA cuando el llamador no impone uno.
    pub default_list_limit: u32,
    /// Designaciones por ráfaga de detalle.
    pub batch_size: usize,
    /// Pausa entre ráfagas consecutivas.
    pub batch_delay: Duration,
}

impl Default for SmallBodyConfig {
    fn default() -> Self {
        Self {
            base_url: crate::DEFAULT_FEED_BASE_URL.to_string(),
            default_list_limit: 3000,
            batch_size: 50,
            batch_delay: Duration::from_secs(1),
        }
    }
}

/// Cliente del feed de cuerpos menores.
pub struct SmallBodyClient {
    http_engine: reqwest::Client,
    endpoint_guard: EndpointGuard,
    retry_policy: RetryPolicy,
    configuration: SmallBodyConfig,
}

impl SmallBodyClient {
    pub fn new(profile: EndpointProfile, configuration: SmallBodyConfig) -> Self {
        Self {
            http_engine: crate::build_http_engine(),
            endpoint_guard: EndpointGuard::new(profile),
            retry_policy: RetryPolicy::default(),
            configuration,
        }
    }

    /// Acceso de auditoría al guardián del endpoint.
    pub fn guard(&self) -> &EndpointGuard {
        &self.endpoint_guard
    }

    /**
     * Recupera los cuerpos del grupo PHA con su detalle físico.
     *
     * # Errors:
     * Sólo el listado inicial puede fallar la operación completa; los
     * detalles individuales degradan a registros de respaldo.
     */
    #[instrument(skip(self))]
    pub async fn fetch_hazardous(
        &self,
        limit: Option<u32>,
    ) -> Result<Vec<AsteroidRecord>, FeedError> {
        let designations = self.fetch_pha_designations(limit).await?;

        if designations.is_empty() {
            warn!("🪨 [SBDB]: PHA listing returned no designations.");
            return Ok(Vec::new());
        }

        info!(
            "🪨 [SBDB]: {} designations listed. Fetching physical detail in batches of {}.",
            designations.len(),
            self.configuration.batch_size
        );

        let mut catalog_records = Vec::with_capacity(designations.len());
        let mut fallback_count = 0usize;
        let total = designations.len();

        let batch_size = self.configuration.batch_size.max(1);
        for (batch_index, batch) in designations.chunks(batch_size).enumerate() {
            if batch_index > 0 {
                tokio::time::sleep(self.configuration.batch_delay).await;
            }

            let lookups = batch
                .iter()
                .map(|designation| self.fetch_detail_or_fallback(designation));
            let batch_records = futures::future::join_all(lookups).await;

            for (record, degraded) in batch_records {
                if degraded {
                    fallback_count += 1;
                }
                catalog_records.push(record);
            }

            let processed = ((batch_index + 1) * batch_size).min(total);
            info!("🪨 [SBDB]: Processed {}/{} designations.", processed, total);
        }

        log_diameter_statistics(&catalog_records, fallback_count);
        Ok(catalog_records)
    }

    /// Listado de designaciones del grupo PHA (consulta única).
    async fn fetch_pha_designations(&self, limit: Option<u32>) -> Result<Vec<String>, FeedError> {
        let list_limit = limit.unwrap_or(self.configuration.default_list_limit);
        let request = self
            .http_engine
            .get(format!("{}/sbdb_query.api", self.configuration.base_url))
            .query(&[
                ("fields", "pdes".to_string()),
                ("sb-group", "pha".to_string()),
                ("limit", list_limit.to_string()),
            ]);

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

        let designations = payload
            .get("data")
            .and_then(Value::as_array)
            .map(|rows| {
                rows.iter()
                    .filter_map(|row| match row {
                        Value::Array(columns) => {
                            columns.first().and_then(Value::as_str).map(str::to_string)
                        }
                        Value::String(designation) => Some(designation.clone()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(designations)
    }

    /// Detalle físico con degradación al registro de respaldo.
    /// El booleano señala si la degradación ocurrió.
    async fn fetch_detail_or_fallback(&self, designation: &str) -> (AsteroidRecord, bool) {
        match self.fetch_detail(designation).await {
            Ok(record) => (record, false),
            Err(fault) => {
                debug!(
                    "🪨 [SBDB]: Detail lookup degraded for [{}]: {}",
                    designation, fault
                );
                (AsteroidRecord::fallback(designation), true)
            }
        }
    }

    /// Consulta de detalle por designación, bajo guardián y reintentos.
    async fn fetch_detail(&self, designation: &str) -> Result<AsteroidRecord, FeedError> {
        let request = self
            .http_engine
            .get(format!("{}/sbdb.api", self.configuration.base_url))
            .query(&[
                ("sstr", designation.to_string()),
                ("phys-par", "1".to_string()),
                ("full-prec", "1".to_string()),
            ]);

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

        parse_detail_payload(designation, &payload)
    }
}

/**
 * Normaliza el detalle de un cuerpo menor al registro del catálogo.
 *
 * Reglas de extracción:
 * - perihelio/afelio: 'q'/'ad' explícitos; si faltan, derivados de 'a','e';
 * - MOID: 'moid.earth' preferente, después claves alternativas;
 * - albedo: primer valor válido en (0,1], o el estándar asumido;
 * - diámetro: primer valor positivo reportado, etiquetado por la
 *   referencia; sin reporte, derivado de H y albedo ('calculated').
 */
pub fn parse_detail_payload(
    designation: &str,
    payload: &Value,
) -> Result<AsteroidRecord, FeedError> {
    let envelope = payload
        .as_object()
        .ok_or_else(|| FeedError::Parse(format!("non-object detail payload for {}", designation)))?;

    if !envelope.contains_key("object") {
        return Err(FeedError::Parse(format!(
            "detail payload without 'object' section for {}",
            designation
        )));
    }

    let object = envelope.get("object").cloned().unwrap_or(Value::Null);
    let orbit = envelope.get("orbit").cloned().unwrap_or(Value::Null);
    let phys_par = envelope.get("phys_par").cloned().unwrap_or(Value::Null);

    let name = extract_proper_name(object.get("fullname").and_then(Value::as_str));
    let (perihelion_au, aphelion_au) = extract_orbital_elements(&orbit);
    let earth_moid_au = extract_earth_moid(&orbit);
    let absolute_magnitude = extract_absolute_magnitude(&phys_par, &object, designation);
    let (albedo, has_albedo_data) = extract_albedo(&phys_par, &object);
    let (estimated_diameter_km, diameter_source, accurate_diameter) =
        extract_diameter(&phys_par, &object, absolute_magnitude, albedo, has_albedo_data);

    let orbit_class = object
        .get("orbit_class")
        .and_then(|section| section.get("name"))
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string);

    let orbit_id = orbit
        .get("orbit_id")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(AsteroidRecord {
        designation: designation.to_string(),
        name,
        perihelion_au,
        aphelion_au,
        earth_moid_au,
        absolute_magnitude,
        estimated_diameter_km,
        accurate_diameter,
        albedo,
        diameter_source,
        orbit_id,
        orbit_class,
    }
    .sanitized())
}

/// Nombre propio desde el nombre completo: la parte previa al paréntesis,
/// salvo que sea puramente numérica.
fn extract_proper_name(fullname: Option<&str>) -> Option<String> {
    let fullname = fullname?.trim();
    if fullname.is_empty() {
        return None;
    }

    let (head, had_parenthesis) = match fullname.split_once('(') {
        Some((head, _)) => (head.trim(), true),
        None => (fullname, false),
    };

    if !had_parenthesis {
        return None;
    }

    let is_purely_numeric = !head.is_empty()
        && head
            .chars()
            .all(|character| character.is_ascii_digit() || character == ' ');

    if head.is_empty() || is_purely_numeric {
        None
    } else {
        Some(head.to_string())
    }
}

/// Busca un campo en una sección que puede ser dict o lista de
/// elementos {name, value, ...} (las dos formas que emite la fuente).
fn section_field<'a>(section: &'a Value, key: &str) -> Option<&'a Value> {
    match section {
        Value::Object(map) => map.get(key),
        Value::Array(elements) => elements
            .iter()
            .find(|element| element.get("name").and_then(Value::as_str) == Some(key))
            .and_then(|element| element.get("value")),
        _ => None,
    }
}

/// Valor orbital: primero en 'elements', después en la raíz de 'orbit'.
fn orbital_value(orbit: &Value, key: &str) -> Option<f64> {
    if let Some(elements) = orbit.get("elements") {
        if let Some(raw) = section_field(elements, key) {
            if let Some(parsed) = value::scalar(raw) {
                return Some(parsed);
            }
        }
    }
    orbit.get(key).and_then(|raw| value::scalar(raw))
}

/// Perihelio y afelio: explícitos o derivados de semieje y excentricidad.
fn extract_orbital_elements(orbit: &Value) -> (Option<f64>, Option<f64>) {
    let mut perihelion_au = orbital_value(orbit, "q");
    let mut aphelion_au = orbital_value(orbit, "ad");

    if perihelion_au.is_none() || aphelion_au.is_none() {
        let semi_major_au = orbital_value(orbit, "a");
        let eccentricity = orbital_value(orbit, "e");

        if let (Some(semi_major), Some(ecc)) = (semi_major_au, eccentricity) {
            if perihelion_au.is_none() {
                perihelion_au = Some(semi_major * (1.0 - ecc));
            }
            if aphelion_au.is_none() {
                aphelion_au = Some(semi_major * (1.0 + ecc));
            }
        }
    }

    (perihelion_au, aphelion_au)
}

/// MOID terrestre: 'moid.earth' preferente, después claves alternativas.
fn extract_earth_moid(orbit: &Value) -> Option<f64> {
    if let Some(moid_section) = orbit.get("moid") {
        if let Value::Object(map) = moid_section {
            return map.get("earth").and_then(|raw| value::scalar(raw));
        }
    }

    orbit
        .get("moid_earth")
        .and_then(|raw| value::scalar(raw))
        .or_else(|| orbit.get("moid").and_then(|raw| value::scalar(raw)))
}

/// Magnitud absoluta H con la cascada de fuentes documentada.
fn extract_absolute_magnitude(phys_par: &Value, object: &Value, designation: &str) -> f64 {
    let candidates = [
        section_field(phys_par, "H"),
        object.get("H"),
        section_field(phys_par, "h"),
        object.get("h"),
    ];

    for candidate in candidates.into_iter().flatten() {
        if let Some(magnitude) = value::magnitude(candidate) {
            return magnitude;
        }
    }

    debug!(
        "🪨 [SBDB]: No H magnitude for [{}]. Using fallback {}.",
        designation,
        space_math::FALLBACK_ABSOLUTE_MAGNITUDE
    );
    space_math::FALLBACK_ABSOLUTE_MAGNITUDE
}

/// Primer albedo válido en (0,1]; sin dato, el estándar asumido.
fn extract_albedo(phys_par: &Value, object: &Value) -> (f64, bool) {
    let candidates = [
        section_field(phys_par, "albedo"),
        section_field(phys_par, "p_v"),
        section_field(phys_par, "pv"),
        section_field(phys_par, "albedo_value"),
        section_field(phys_par, "albedo_vis"),
        object.get("albedo"),
        object.get("p_v"),
    ];

    for candidate in candidates.into_iter().flatten() {
        if let Some(albedo) = value::scalar(candidate) {
            if albedo > 0.0 && albedo <= 1.0 {
                return (albedo, true);
            }
        }
    }

    (space_math::ASSUMED_ALBEDO, false)
}

/// Texto de referencia y notas del diámetro, en minúsculas, cubriendo
/// las dos formas de 'phys_par'.
fn diameter_reference_note(phys_par: &Value) -> String {
    let mut reference_note = String::new();

    match phys_par {
        Value::Object(map) => {
            for key in ["diameter_ref", "diameter_note"] {
                if let Some(text) = map.get(key).and_then(Value::as_str) {
                    reference_note.push_str(text);
                    reference_note.push(' ');
                }
            }
        }
        Value::Array(elements) => {
            if let Some(diameter_element) = elements
                .iter()
                .find(|element| element.get("name").and_then(Value::as_str) == Some("diameter"))
            {
                for key in ["ref", "notes"] {
                    if let Some(text) = diameter_element.get(key).and_then(Value::as_str) {
                        reference_note.push_str(text);
                        reference_note.push(' ');
                    }
                }
            }
        }
        _ => {}
    }

    reference_note.to_lowercase()
}

/// Veredicto de procedencia para un diámetro reportado.
fn is_diameter_measured(reference_note: &str) -> bool {
    if MEASURED_KEYWORDS
        .iter()
        .any(|keyword| reference_note.contains(keyword))
    {
        return true;
    }
    if COMPUTED_KEYWORDS
        .iter()
        .any(|keyword| reference_note.contains(keyword))
    {
        return false;
    }
    // Referencia sin pistas: la fuente reporta mediciones por defecto.
    true
}

/// Diámetro, procedencia y bandera de precisión.
fn extract_diameter(
    phys_par: &Value,
    object: &Value,
    absolute_magnitude: f64,
    albedo: f64,
    has_albedo_data: bool,
) -> (f64, DiameterSource, bool) {
    let candidates = [
        section_field(phys_par, "diameter"),
        section_field(phys_par, "diameter_km"),
        section_field(phys_par, "diam"),
        section_field(phys_par, "size"),
        section_field(phys_par, "est_diameter"),
        section_field(phys_par, "diameter_value"),
        object.get("diameter"),
        object.get("diameter_km"),
    ];

    for candidate in candidates.into_iter().flatten() {
        if let Some(diameter_km) = value::length_km(candidate) {
            if diameter_km > 0.0 {
                let measured = is_diameter_measured(&diameter_reference_note(phys_par));
                let source = if measured {
                    DiameterSource::Measured
                } else {
                    DiameterSource::Computed
                };
                return (diameter_km, source, measured);
            }
        }
    }

    let derived = if has_albedo_data {
        space_math::diameter_from_albedo(albedo, absolute_magnitude)
            .unwrap_or_else(|| space_math::diameter_from_h(absolute_magnitude))
    } else {
        space_math::diameter_from_h(absolute_magnitude)
    };

    (derived, DiameterSource::Calculated, false)
}

/// Estadística de procedencia de diámetros de la corrida.
fn log_diameter_statistics(records: &[AsteroidRecord], fallback_count: usize) {
    if records.is_empty() {
        return;
    }

    let total = records.len();
    let measured = records
        .iter()
        .filter(|record| record.diameter_source == DiameterSource::Measured)
        .count();
    let computed = records
        .iter()
        .filter(|record| record.diameter_source == DiameterSource::Computed)
        .count();
    let calculated = records
        .iter()
        .filter(|record| record.diameter_source == DiameterSource::Calculated)
        .count();

    info!(
        "🪨 [SBDB]: Diameter provenance — total {}, measured {}, computed {}, calculated {}, degraded lookups {}.",
        total, measured, computed, calculated, fallback_count
    );
}
