// [libs/infra/feeds/src/impactrisk.rs]
/*!
 * =================================================================
 * APARATO: IMPACT RISK FEED CLIENT (V1.3 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: RESÚMENES DE RIESGO DE IMPACTO POR CUERPO
 *
 * Dos operaciones: el listado completo de objetos con riesgo vigente y
 * el detalle por designación. Un objeto ausente es un resultado
 * (`None`), no un error. Los campos derivados ausentes se completan
 * con la física del dominio antes de entregar el registro.
 * =================================================================
 */

use crate::errors::FeedError;
use crate::transport::execute_with_retry;
use crate::value;
use centinela_domain_models::ThreatRecord;
use centinela_shared_resilience::{EndpointGuard, EndpointProfile, RetryPolicy};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

/// Cliente del feed de riesgo de impacto.
pub struct ImpactRiskClient {
    http_engine: reqwest::Client,
    endpoint_guard: EndpointGuard,
    retry_policy: RetryPolicy,
    base_url: String,
}

impl ImpactRiskClient {
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
     * Listado completo de resúmenes de riesgo vigentes.
     *
     * Los registros individuales malformados se saltan con contabilidad;
     * el lote continúa.
     */
    #[instrument(skip(self))]
    pub async fn fetch_all(&self) -> Result<Vec<ThreatRecord>, FeedError> {
        let request = self
            .http_engine
            .get(format!("{}/sentry.api", self.base_url));

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

        let mut threat_records = Vec::new();
        let mut skipped_malformed = 0usize;

        if let Some(entries) = payload.get("data").and_then(Value::as_array) {
            for entry in entries {
                match parse_threat_entry(entry) {
                    Some(record) => threat_records.push(record),
                    None => skipped_malformed += 1,
                }
            }
        }

        if skipped_malformed > 0 {
            warn!(
                "☄️ [SENTRY]: {} malformed risk entries skipped in this batch.",
                skipped_malformed
            );
        }
        info!(
            "☄️ [SENTRY]: {} impact-risk summaries normalized.",
            threat_records.len()
        );

        Ok(threat_records)
    }

    /**
     * Detalle de riesgo para una designación concreta.
     *
     * `Ok(None)` cubre el objeto ausente del sistema de riesgo (HTTP 404
     * o payload sin resumen); no se loguea como error.
     */
    #[instrument(skip(self))]
    pub async fn fetch_one(&self, designation: &str) -> Result<Option<ThreatRecord>, FeedError> {
        let request = self
            .http_engine
            .get(format!("{}/sentry.api", self.base_url))
            .query(&[("des", designation)]);

        let maybe_payload: Option<Value> = self
            .endpoint_guard
            .shield(async {
                let response = execute_with_retry(
                    request,
                    &self.retry_policy,
                    self.endpoint_guard.endpoint_label(),
                )
                .await?;

                if response.status() == StatusCode::NOT_FOUND {
                    return Ok(None);
                }

                response
                    .json::<Value>()
                    .await
                    .map(Some)
                    .map_err(|fault| FeedError::Parse(fault.to_string()))
            })
            .await
            .map_err(FeedError::from_shield)?;

        let Some(payload) = maybe_payload else {
            debug!("☄️ [SENTRY]: Object [{}] absent from risk system.", designation);
            return Ok(None);
        };

        // El detalle anida el registro bajo 'summary'; el listado usa 'data'.
        let entry = payload
            .get("summary")
            .or_else(|| payload.get("data").and_then(|data| data.get(0)));

        Ok(entry.and_then(parse_threat_entry))
    }
}

/**
 * Normaliza una entrada cruda del feed de riesgo al registro del
 * dominio, completando los campos derivados ausentes.
 */
pub fn parse_threat_entry(entry: &Value) -> Option<ThreatRecord> {
    let envelope = entry.as_object()?;

    let designation = envelope
        .get("des")
        .or_else(|| envelope.get("designation"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())?
        .to_string();

    let fullname = envelope
        .get("fullname")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or(&designation)
        .to_string();

    let impact_years = envelope
        .get("impact_years")
        .or_else(|| envelope.get("years"))
        .and_then(Value::as_array)
        .map(|years| years.iter().filter_map(|year| value::integer(year)).collect())
        .unwrap_or_default();

    let record = ThreatRecord {
        designation,
        fullname,
        ip: envelope.get("ip").and_then(|raw| value::scalar(raw)).unwrap_or(0.0),
        ts_max: envelope
            .get("ts_max")
            .and_then(|raw| value::integer(raw))
            .unwrap_or(0)
            .clamp(0, 10),
        ps_max: envelope
            .get("ps_max")
            .and_then(|raw| value::scalar(raw))
            .unwrap_or(-10.0),
        diameter: envelope
            .get("diameter")
            .and_then(|raw| value::length_km(raw))
            .unwrap_or(0.0)
            .max(0.0),
        v_inf: envelope
            .get("v_inf")
            .and_then(|raw| value::speed_km_s(raw))
            .unwrap_or(0.0)
            .max(0.0),
        h: envelope
            .get("h")
            .and_then(|raw| value::magnitude(raw))
            .unwrap_or(0.0)
            .max(0.0),
        n_imp: envelope
            .get("n_imp")
            .and_then(|raw| value::integer(raw))
            .unwrap_or(0)
            .max(0),
        impact_years,
        last_obs: envelope
            .get("last_obs")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        threat_level: None,
        energy_megatons: None,
        impact_category: None,
    };

    Some(record.with_derivations())
}
