// [libs/domain/models/src/threat.rs]
/*!
 * =================================================================
 * APARATO: THREAT ASSESSMENT DOMAIN MODEL (V1.2 - SOBERANO)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATO DEL RESUMEN DE RIESGO DE IMPACTO POR ASTEROIDE
 *
 * Relación uno-a-uno con el asteroide propietario. Los campos derivados
 * (nivel, energía, categoría) se completan en la frontera de ingesta
 * cuando la fuente no los reporta; nunca quedan vacíos en el Motor A.
 * =================================================================
 */

use crate::space_math;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Categoría de consecuencias de un impacto según la energía liberada.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImpactCategory {
    /// Menos de 1 Mt: daños confinados a la zona de caída.
    Local,
    /// Entre 1 y 100 Mt: afectación de escala regional.
    Regional,
    /// Más de 100 Mt: consecuencias de alcance planetario.
    Global,
}

impl ImpactCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImpactCategory::Local => "local",
            ImpactCategory::Regional => "regional",
            ImpactCategory::Global => "global",
        }
    }

    /// Reconstrucción desde el Motor A. Valores desconocidos degradan a
    /// 'local', la categoría menos alarmista.
    pub fn from_str_lossy(raw: &str) -> Self {
        match raw {
            "global" => ImpactCategory::Global,
            "regional" => ImpactCategory::Regional,
            _ => ImpactCategory::Local,
        }
    }
}

impl fmt::Display for ImpactCategory {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Nivel de amenaza derivado de las escalas de Torino y Palermo.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ThreatLevel {
    Zero,
    VeryLow,
    Low,
    Medium,
    Elevated,
    High,
    Critical,
}

impl ThreatLevel {
    /// Etiqueta localizada persistida en el catálogo.
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatLevel::Zero => "zero",
            ThreatLevel::VeryLow => "very low",
            ThreatLevel::Low => "low",
            ThreatLevel::Medium => "medium",
            ThreatLevel::Elevated => "elevated",
            ThreatLevel::High => "high",
            ThreatLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for ThreatLevel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Fila catalogada en el Motor A.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatAssessment {
    pub id: i64,
    /// Asteroide propietario (clave única: un resumen por cuerpo).
    pub asteroid_id: i64,
    pub designation: String,
    pub fullname: String,
    /// Probabilidad acumulada de impacto.
    pub ip: f64,
    /// Pico en la escala de Torino (0..10).
    pub ts_max: i64,
    /// Pico en la escala de Palermo.
    pub ps_max: f64,
    /// Diámetro reportado por la fuente de riesgo, en km.
    pub diameter: f64,
    /// Velocidad hiperbólica de exceso, en km/s.
    pub v_inf: f64,
    /// Magnitud absoluta H reportada por la fuente de riesgo.
    pub h: f64,
    /// Cantidad de escenarios de impacto vigentes.
    pub n_imp: i64,
    /// Años con escenarios de impacto (puede estar vacío).
    pub impact_years: Vec<i64>,
    /// Fecha de última observación, tal como la reporta la fuente.
    pub last_obs: String,
    pub threat_level: String,
    pub energy_megatons: f64,
    pub impact_category: ImpactCategory,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registro normalizado del feed de riesgo de impacto, previo a identidad.
/// Los campos derivados viajan opcionales y se completan localmente.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThreatRecord {
    pub designation: String,
    pub fullname: String,
    pub ip: f64,
    pub ts_max: i64,
    pub ps_max: f64,
    pub diameter: f64,
    pub v_inf: f64,
    pub h: f64,
    pub n_imp: i64,
    pub impact_years: Vec<i64>,
    pub last_obs: String,
    pub threat_level: Option<String>,
    pub energy_megatons: Option<f64>,
    pub impact_category: Option<ImpactCategory>,
}

impl ThreatRecord {
    /**
     * Completa los campos derivados ausentes con la física del dominio.
     *
     * - energía: desde diámetro y v_inf (0 ante diámetro no positivo);
     * - categoría: desde la energía resultante;
     * - nivel: desde los picos de Torino y Palermo.
     */
    pub fn with_derivations(mut self) -> Self {
        let energy = self
            .energy_megatons
            .unwrap_or_else(|| space_math::impact_energy_megatons(self.diameter, self.v_inf));
        self.energy_megatons = Some(energy);

        if self.impact_category.is_none() {
            self.impact_category = Some(space_math::impact_category(energy));
        }

        if self.threat_level.is_none() {
            self.threat_level = Some(
                space_math::threat_level(self.ts_max, self.ps_max)
                    .as_str()
                    .to_string(),
            );
        }

        self
    }
}
