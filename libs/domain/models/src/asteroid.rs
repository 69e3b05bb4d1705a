// [libs/domain/models/src/asteroid.rs]
/*!
 * =================================================================
 * APARATO: ASTEROID DOMAIN MODEL (V1.2 - SOBERANO)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATO DEL CUERPO MENOR CATALOGADO Y SU SANEAMIENTO
 *
 * # Invariantes de construcción:
 * - albedo ∈ (0, 1]; fuera de rango se sustituye por el estándar 0.15.
 * - estimated_diameter_km > 0; inválido se sustituye por 0.05 km.
 * - absolute_magnitude finita; inválida se sustituye por H=18.0.
 * =================================================================
 */

use crate::space_math;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Procedencia del diámetro catalogado.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiameterSource {
    /// Medición directa (radar, ocultación, térmico, óptica adaptativa).
    Measured,
    /// Estimación publicada por la fuente con supuestos estándar.
    Computed,
    /// Derivado localmente desde H y albedo.
    Calculated,
}

impl DiameterSource {
    /// Representación persistida, alineada con el CHECK del esquema.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiameterSource::Measured => "measured",
            DiameterSource::Computed => "computed",
            DiameterSource::Calculated => "calculated",
        }
    }

    /// Reconstrucción desde el Motor A. Valores desconocidos degradan a
    /// 'calculated', el origen más conservador.
    pub fn from_str_lossy(raw: &str) -> Self {
        match raw {
            "measured" => DiameterSource::Measured,
            "computed" => DiameterSource::Computed,
            _ => DiameterSource::Calculated,
        }
    }
}

impl fmt::Display for DiameterSource {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Fila catalogada en el Motor A.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asteroid {
    /// Identidad asignada por el almacén.
    pub id: i64,
    /// Designación primaria de la fuente (única en el catálogo).
    pub designation: String,
    /// Nombre propio, si existe (p. ej. 'Apophis').
    pub name: Option<String>,
    pub perihelion_au: Option<f64>,
    pub aphelion_au: Option<f64>,
    /// Distancia mínima de intersección orbital con la Tierra, en UA.
    pub earth_moid_au: Option<f64>,
    /// Magnitud absoluta H.
    pub absolute_magnitude: f64,
    pub estimated_diameter_km: f64,
    /// Verdadero sólo si el diámetro proviene de medición directa.
    pub accurate_diameter: bool,
    pub albedo: f64,
    pub diameter_source: DiameterSource,
    pub orbit_id: Option<String>,
    pub orbit_class: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registro normalizado producido por el cliente SmallBody, previo a identidad.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AsteroidRecord {
    pub designation: String,
    pub name: Option<String>,
    pub perihelion_au: Option<f64>,
    pub aphelion_au: Option<f64>,
    pub earth_moid_au: Option<f64>,
    pub absolute_magnitude: f64,
    pub estimated_diameter_km: f64,
    pub accurate_diameter: bool,
    pub albedo: f64,
    pub diameter_source: DiameterSource,
    pub orbit_id: Option<String>,
    pub orbit_class: Option<String>,
}

impl AsteroidRecord {
    /**
     * Registro mínimo de respaldo cuando la consulta de detalle falla.
     * H=18.0 con diámetro derivado del albedo estándar, marcado 'calculated'.
     */
    pub fn fallback(designation: &str) -> Self {
        Self {
            designation: designation.to_string(),
            name: None,
            perihelion_au: None,
            aphelion_au: None,
            earth_moid_au: None,
            absolute_magnitude: space_math::FALLBACK_ABSOLUTE_MAGNITUDE,
            estimated_diameter_km: space_math::diameter_from_h(
                space_math::FALLBACK_ABSOLUTE_MAGNITUDE,
            ),
            accurate_diameter: false,
            albedo: space_math::ASSUMED_ALBEDO,
            diameter_source: DiameterSource::Calculated,
            orbit_id: None,
            orbit_class: None,
        }
    }

    /**
     * Aplica los invariantes de construcción del catálogo.
     *
     * Los valores fuera de dominio no abortan la ingesta: degradan al
     * estándar documentado y dejan rastro en el sumidero de telemetría.
     */
    pub fn sanitized(mut self) -> Self {
        if !(self.albedo > 0.0 && self.albedo <= 1.0) {
            warn!(
                "🧪 [SANITIZE]: Albedo {} out of (0,1] for {}; defaulting to {}",
                self.albedo,
                self.designation,
                space_math::ASSUMED_ALBEDO
            );
            self.albedo = space_math::ASSUMED_ALBEDO;
        }

        if !self.absolute_magnitude.is_finite() {
            warn!(
                "🧪 [SANITIZE]: Invalid H for {}; defaulting to {}",
                self.designation,
                space_math::FALLBACK_ABSOLUTE_MAGNITUDE
            );
            self.absolute_magnitude = space_math::FALLBACK_ABSOLUTE_MAGNITUDE;
        }

        if !(self.estimated_diameter_km.is_finite() && self.estimated_diameter_km > 0.0) {
            warn!(
                "🧪 [SANITIZE]: Invalid diameter {} for {}; defaulting to 0.05 km",
                self.estimated_diameter_km, self.designation
            );
            self.estimated_diameter_km = 0.05;
        }

        self
    }

    /// Criterio PHA del proyecto aplicado a este registro.
    pub fn is_potentially_hazardous(&self) -> bool {
        space_math::is_potentially_hazardous(self.earth_moid_au)
    }
}
