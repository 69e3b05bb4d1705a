// [libs/domain/models/src/space_math.rs]
/*!
 * =================================================================
 * APARATO: SPACE MATH ENGINE (V1.2 - SOBERANO)
 * CLASIFICACIÓN: DOMAIN PHYSICS (ESTRATO L2)
 * RESPONSABILIDAD: DERIVACIONES DETERMINISTAS DE DIÁMETRO, ENERGÍA Y ESCALAS
 *
 * # Mathematical Proof (Determinism):
 * Todas las funciones de este módulo son puras: mismo argumento, mismo
 * resultado, sin reloj ni estado compartido. Las leyes de regresión del
 * Proving Grounds dependen de esta propiedad.
 * =================================================================
 */

use crate::threat::{ImpactCategory, ThreatLevel};
use std::f64::consts::PI;

/// Unidad astronómica canónica en kilómetros.
pub const ASTRONOMICAL_UNIT_KM: f64 = 149_597_870.7;

/// Umbral MOID que clasifica un objeto como potencialmente peligroso (PHA).
pub const PHA_MOID_THRESHOLD_AU: f64 = 0.05;

/// Albedo estándar asumido cuando la fuente no reporta reflectividad.
pub const ASSUMED_ALBEDO: f64 = 0.15;

/// Magnitud absoluta de respaldo cuando la fuente no reporta H.
pub const FALLBACK_ABSOLUTE_MAGNITUDE: f64 = 18.0;

/// Densidad media adoptada para asteroides rocosos, en kg/m³.
const ASTEROID_DENSITY_KG_M3: f64 = 2000.0;

/// Equivalencia de un megatón de TNT en julios.
const MEGATON_TNT_JOULES: f64 = 4.184e15;

/// Deriva el diámetro (km) desde el albedo y la magnitud absoluta H.
///
/// Fórmula estándar: D = 1329 / sqrt(albedo) · 10^(−0.2·H).
/// Devuelve `None` cuando el albedo no es positivo: la raíz no está definida
/// y el llamador debe recurrir al albedo asumido.
pub fn diameter_from_albedo(albedo: f64, h_magnitude: f64) -> Option<f64> {
    if albedo <= 0.0 {
        return None;
    }
    Some(1329.0 / albedo.sqrt() * 10f64.powf(-0.2 * h_magnitude))
}

/// Deriva el diámetro (km) con el albedo estándar asumido (0.15).
pub fn diameter_from_h(h_magnitude: f64) -> f64 {
    // ASSUMED_ALBEDO es positivo por construcción; la rama None es inalcanzable.
    diameter_from_albedo(ASSUMED_ALBEDO, h_magnitude).unwrap_or(0.0)
}

/// Energía cinética de impacto en megatones de TNT.
///
/// Volumen esférico desde el diámetro, masa con densidad 2000 kg/m³,
/// KE = ½·m·v² en julios, convertida con 1 Mt = 4.184e15 J.
/// Devuelve 0 ante un diámetro no positivo.
pub fn impact_energy_megatons(diameter_km: f64, velocity_km_s: f64) -> f64 {
    if diameter_km <= 0.0 {
        return 0.0;
    }

    let radius_m = diameter_km * 1000.0 / 2.0;
    let volume_m3 = (4.0 / 3.0) * PI * radius_m.powi(3);
    let mass_kg = volume_m3 * ASTEROID_DENSITY_KG_M3;

    let velocity_m_s = velocity_km_s * 1000.0;
    let energy_joules = 0.5 * mass_kg * velocity_m_s * velocity_m_s;

    energy_joules / MEGATON_TNT_JOULES
}

/// Clasifica la categoría de impacto según la energía liberada.
pub fn impact_category(energy_megatons: f64) -> ImpactCategory {
    if energy_megatons < 1.0 {
        ImpactCategory::Local
    } else if energy_megatons < 100.0 {
        ImpactCategory::Regional
    } else {
        ImpactCategory::Global
    }
}

/// Deriva el nivel de amenaza desde las escalas de Torino y Palermo.
///
/// Con Torino 0, la escala de Palermo discrimina entre riesgo nulo
/// (por debajo del fondo, ps < −2) y muy bajo.
pub fn threat_level(torino_max: i64, palermo_max: f64) -> ThreatLevel {
    match torino_max {
        i64::MIN..=0 => {
            if palermo_max < -2.0 {
                ThreatLevel::Zero
            } else {
                ThreatLevel::VeryLow
            }
        }
        1..=4 => ThreatLevel::Low,
        5 => ThreatLevel::Medium,
        6 => ThreatLevel::Elevated,
        7 => ThreatLevel::High,
        _ => ThreatLevel::Critical,
    }
}

/// Criterio PHA del proyecto: MOID terrestre estrictamente menor a 0.05 UA.
/// Un MOID desconocido nunca clasifica como peligroso.
pub fn is_potentially_hazardous(earth_moid_au: Option<f64>) -> bool {
    matches!(earth_moid_au, Some(moid) if moid < PHA_MOID_THRESHOLD_AU)
}

/// Conversión de distancia UA → km con la unidad astronómica canónica.
pub fn au_to_km(distance_au: f64) -> f64 {
    distance_au * ASTRONOMICAL_UNIT_KM
}
