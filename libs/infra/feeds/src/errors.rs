// [libs/infra/feeds/src/errors.rs]
/*!
 * =================================================================
 * APARATO: FEED ERROR CATALOG (V1.3 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DE FEEDS EXTERNOS
 *
 * Política de propagación: los clientes traducen todo error de
 * transporte a estas categorías; el pipeline decide saltar o abortar
 * según la categoría, nunca según el tipo crudo del transporte.
 * =================================================================
 */

use centinela_shared_resilience::ShieldError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    /// Fallo transitorio del enlace: red, timeout o HTTP 5xx.
    /// Elegible para reintento con backoff.
    #[error("[L3_FEED_NET_FAULT]: UPSTREAM_LINK_DEGRADED -> {0}")]
    TransientUpstream(String),

    /// HTTP 429 explícito. Se honra 'Retry-After' cuando está presente
    /// y cuenta como fallo para el cortacircuitos.
    #[error("[L3_FEED_NET_FAULT]: RATE_LIMITED -> retry_after={retry_after_seconds:?}s")]
    RateLimited { retry_after_seconds: Option<u64> },

    /// Rechazo de la capa de protección (circuito abierto o bulkhead
    /// saturado). No se reintenta.
    #[error("[L3_FEED_SHIELD_FAULT]: ENDPOINT_UNAVAILABLE -> {0}")]
    Unavailable(String),

    /// Registro malformado de la fuente. El registro se salta; el lote
    /// continúa.
    #[error("[L3_FEED_PARSE_FAULT]: MALFORMED_UPSTREAM_RECORD -> {0}")]
    Parse(String),
}

impl FeedError {
    /// Verdadero cuando la política de reintentos puede volver a llamar.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FeedError::TransientUpstream(_) | FeedError::RateLimited { .. }
        )
    }

    /// Aplana el veredicto del guardián al catálogo del feed: los
    /// rechazos de protección se vuelven 'Unavailable', la expiración de
    /// plazo se vuelve fallo transitorio, el error interno pasa intacto.
    pub fn from_shield(verdict: ShieldError<FeedError>) -> Self {
        match verdict {
            ShieldError::CircuitOpen { endpoint } => {
                FeedError::Unavailable(format!("circuit open on [{}]", endpoint))
            }
            ShieldError::BulkheadFull { endpoint, .. } => {
                FeedError::Unavailable(format!("bulkhead saturated on [{}]", endpoint))
            }
            ShieldError::Timeout {
                endpoint,
                timeout_seconds,
            } => FeedError::TransientUpstream(format!(
                "deadline of {}s exceeded on [{}]",
                timeout_seconds, endpoint
            )),
            ShieldError::Inner(inner) => inner,
        }
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(transport_fault: reqwest::Error) -> Self {
        FeedError::TransientUpstream(transport_fault.to_string())
    }
}
