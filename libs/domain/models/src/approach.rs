// [libs/domain/models/src/approach.rs]
/*!
 * =================================================================
 * APARATO: CLOSE APPROACH DOMAIN MODEL (V1.2 - SOBERANO)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATO DEL ENCUENTRO CERCANO PREDICHO
 *
 * Clave natural del encuentro: (asteroid_id, approach_time). La
 * designación se denormaliza en la fila para acelerar las consultas
 * de lectura sin join.
 * =================================================================
 */

use crate::space_math;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Origen de datos por defecto estampado en cada encuentro.
pub const DEFAULT_APPROACH_DATA_SOURCE: &str = "CloseApproach feed";

/// Fila catalogada en el Motor A.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseApproach {
    pub id: i64,
    /// Cuerpo propietario; el borrado del asteroide cascada sobre la fila.
    pub asteroid_id: i64,
    /// Instante del máximo acercamiento, en UTC.
    pub approach_time: DateTime<Utc>,
    pub distance_au: f64,
    pub distance_km: f64,
    pub velocity_km_s: f64,
    /// Designación denormalizada para el camino de consulta.
    pub asteroid_designation: String,
    pub asteroid_name: Option<String>,
    pub data_source: String,
    /// Identifica la corrida de ingesta que calculó la fila.
    pub calculation_batch_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registro normalizado producido por el cliente CloseApproach.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApproachRecord {
    pub asteroid_designation: String,
    pub asteroid_name: Option<String>,
    pub approach_time: DateTime<Utc>,
    pub distance_au: f64,
    pub distance_km: f64,
    pub velocity_km_s: f64,
    pub data_source: String,
}

impl ApproachRecord {
    /**
     * Construye un registro normalizado completando la distancia en km
     * cuando la fuente sólo reporta unidades astronómicas.
     */
    pub fn new(
        asteroid_designation: String,
        asteroid_name: Option<String>,
        approach_time: DateTime<Utc>,
        distance_au: f64,
        distance_km: Option<f64>,
        velocity_km_s: f64,
    ) -> Self {
        Self {
            asteroid_designation,
            asteroid_name,
            approach_time,
            distance_au,
            distance_km: distance_km.unwrap_or_else(|| space_math::au_to_km(distance_au)),
            velocity_km_s,
            data_source: DEFAULT_APPROACH_DATA_SOURCE.to_string(),
        }
    }
}
