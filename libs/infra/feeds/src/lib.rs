// [libs/infra/feeds/src/lib.rs]
/*!
 * =================================================================
 * APARATO: EXTERNAL FEED CLIENTS (V1.3 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: NORMALIZACIÓN DE LOS TRES FEEDS ASTRONÓMICOS EXTERNOS
 *
 * Tres clientes producen registros normalizados del dominio:
 * SmallBody (listado PHA + detalle físico), CloseApproach (ventana de
 * encuentros) e ImpactRisk (resumen de riesgo). Ninguno filtra errores
 * de transporte crudos hacia el pipeline: todo fallo sale tipificado
 * por el catálogo 'FeedError'.
 * =================================================================
 */

pub mod closeapproach;
pub mod dates;
pub mod errors;
pub mod impactrisk;
pub mod smallbody;
pub mod transport;
pub mod value;

pub use closeapproach::{ApproachWindow, CloseApproachClient, ParsedApproaches};
pub use errors::FeedError;
pub use impactrisk::ImpactRiskClient;
pub use smallbody::{SmallBodyClient, SmallBodyConfig};

/// Identidad de red del recolector ante las fuentes externas.
pub const FEED_USER_AGENT: &str = "CentinelaWatchBot/1.0";

/// Raíz por defecto de los servicios de efemérides de JPL.
pub const DEFAULT_FEED_BASE_URL: &str = "https://ssd-api.jpl.nasa.gov";

/// Construye el motor HTTP compartido por los tres clientes.
pub(crate) fn build_http_engine() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(FEED_USER_AGENT)
        .build()
        .expect("CRITICAL: HTTP engine initialization failed.")
}
