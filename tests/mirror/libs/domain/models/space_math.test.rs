// [tests/mirror/libs/domain/models/space_math.test.rs]
/*!
 * =================================================================
 * APARATO: CERTIFICADOR DE LEYES FÍSICAS (V1.2 - PROVING GROUNDS)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L2-MIRROR
 * RESPONSABILIDAD: AUDITORÍA DE DERIVACIONES DE DIÁMETRO, ENERGÍA Y ESCALAS
 *
 * Leyes certificadas:
 * 1. diameter_from_albedo(0.15, H) ≡ diameter_from_h(H) para todo H finito.
 * 2. impact_energy_megatons degenera a 0 con diámetro o velocidad nulos
 *    (velocidad nula anula la energía cinética; diámetro nulo, la masa).
 * 3. Las escalas de Torino/Palermo mapean a los niveles documentados.
 * =================================================================
 */

use centinela_domain_models::space_math::{
    au_to_km, diameter_from_albedo, diameter_from_h, impact_category, impact_energy_megatons,
    is_potentially_hazardous, threat_level, ASTRONOMICAL_UNIT_KM,
};
use centinela_domain_models::{ImpactCategory, ThreatLevel};
use proptest::prelude::*;

#[test]
fn certify_diameter_derivation_laws() {
    // Albedo no positivo: la derivación no está definida.
    assert!(diameter_from_albedo(0.0, 18.0).is_none());
    assert!(diameter_from_albedo(-0.3, 18.0).is_none());

    // El albedo estándar reproduce exactamente la variante con H sola.
    for h_magnitude in [-2.0, 0.0, 14.5, 18.0, 22.0, 33.0] {
        assert_eq!(
            diameter_from_albedo(0.15, h_magnitude),
            Some(diameter_from_h(h_magnitude))
        );
    }

    // Punto de referencia: H=18.0 con albedo estándar ≈ 0.86 km.
    let reference_diameter = diameter_from_h(18.0);
    assert!(
        (reference_diameter - 0.8595).abs() < 0.001,
        "unexpected reference diameter: {}",
        reference_diameter
    );
}

proptest! {
    #[test]
    fn law_assumed_albedo_equivalence(h_magnitude in -10.0f64..35.0) {
        prop_assert_eq!(
            diameter_from_albedo(0.15, h_magnitude),
            Some(diameter_from_h(h_magnitude))
        );
    }
}

#[test]
fn certify_impact_energy_reference_scenario() {
    // d=0.1 km a 20 km/s: masa ≈ 1.047e9 kg, energía ≈ 50.05 Mt.
    let energy = impact_energy_megatons(0.1, 20.0);
    assert!(
        (energy - 50.05).abs() < 0.05,
        "reference energy drifted: {} Mt",
        energy
    );
    assert_eq!(impact_category(energy), ImpactCategory::Regional);

    // Degeneraciones documentadas.
    assert_eq!(impact_energy_megatons(0.1, 0.0), 0.0);
    assert_eq!(impact_energy_megatons(0.0, 25.0), 0.0);
    assert_eq!(impact_energy_megatons(-1.0, 25.0), 0.0);
}

#[test]
fn certify_impact_category_thresholds() {
    assert_eq!(impact_category(0.0), ImpactCategory::Local);
    assert_eq!(impact_category(0.999), ImpactCategory::Local);
    assert_eq!(impact_category(1.0), ImpactCategory::Regional);
    assert_eq!(impact_category(99.999), ImpactCategory::Regional);
    assert_eq!(impact_category(100.0), ImpactCategory::Global);
}

#[test]
fn certify_threat_level_scale() {
    // Torino 0: Palermo discrimina nulo vs muy bajo.
    assert_eq!(threat_level(0, -3.0), ThreatLevel::Zero);
    assert_eq!(threat_level(0, -1.0), ThreatLevel::VeryLow);

    assert_eq!(threat_level(1, 0.0), ThreatLevel::Low);
    assert_eq!(threat_level(4, 0.0), ThreatLevel::Low);
    assert_eq!(threat_level(5, 0.0), ThreatLevel::Medium);
    assert_eq!(threat_level(6, 0.0), ThreatLevel::Elevated);
    assert_eq!(threat_level(7, 0.0), ThreatLevel::High);
    assert_eq!(threat_level(8, 0.0), ThreatLevel::Critical);
    assert_eq!(threat_level(10, 0.0), ThreatLevel::Critical);

    // Etiquetas persistidas.
    assert_eq!(ThreatLevel::VeryLow.as_str(), "very low");
    assert_eq!(ThreatLevel::Critical.as_str(), "critical");
}

#[test]
fn certify_pha_criterion() {
    // pha_filter(x) = true ⇔ earth_moid_au < 0.05.
    assert!(is_potentially_hazardous(Some(0.0499)));
    assert!(is_potentially_hazardous(Some(0.0)));
    assert!(!is_potentially_hazardous(Some(0.05)));
    assert!(!is_potentially_hazardous(Some(0.8)));
    assert!(!is_potentially_hazardous(None));
}

#[test]
fn certify_astronomical_unit_conversion() {
    assert_eq!(au_to_km(1.0), ASTRONOMICAL_UNIT_KM);
    let converted = au_to_km(0.05);
    assert!((converted - 7_479_893.535).abs() < 1e-3);
}
