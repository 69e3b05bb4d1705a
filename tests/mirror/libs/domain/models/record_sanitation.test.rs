// [tests/mirror/libs/domain/models/record_sanitation.test.rs]
/*!
 * =================================================================
 * APARATO: CERTIFICADOR DE SANEAMIENTO DE REGISTROS (V1.2 - PROVING GROUNDS)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L2-MIRROR
 * RESPONSABILIDAD: AUDITORÍA DE INVARIANTES DE CONSTRUCCIÓN DEL CATÁLOGO
 *
 * Invariantes: albedo ∈ (0,1], diámetro > 0, H finita, derivados de
 * amenaza siempre completos tras 'with_derivations'.
 * =================================================================
 */

use centinela_domain_models::space_math;
use centinela_domain_models::{
    ApproachRecord, AsteroidRecord, DiameterSource, ImpactCategory, ThreatRecord,
};
use chrono::{TimeZone, Utc};

fn baseline_record() -> AsteroidRecord {
    AsteroidRecord {
        designation: "2023 TEST".to_string(),
        name: None,
        perihelion_au: Some(0.7),
        aphelion_au: Some(1.9),
        earth_moid_au: Some(0.03),
        absolute_magnitude: 20.5,
        estimated_diameter_km: 0.15,
        accurate_diameter: false,
        albedo: 0.15,
        diameter_source: DiameterSource::Calculated,
        orbit_id: None,
        orbit_class: Some("Apollo".to_string()),
    }
}

#[test]
fn certify_albedo_clamp() {
    for out_of_range in [0.0, -0.2, 1.5, f64::NAN] {
        let sanitized = AsteroidRecord {
            albedo: out_of_range,
            ..baseline_record()
        }
        .sanitized();
        assert_eq!(sanitized.albedo, space_math::ASSUMED_ALBEDO);
    }

    // El rango válido sobrevive intacto, incluida la cota superior.
    let untouched = AsteroidRecord {
        albedo: 1.0,
        ..baseline_record()
    }
    .sanitized();
    assert_eq!(untouched.albedo, 1.0);
}

#[test]
fn certify_diameter_and_magnitude_defaults() {
    let degraded = AsteroidRecord {
        estimated_diameter_km: -3.0,
        absolute_magnitude: f64::INFINITY,
        ..baseline_record()
    }
    .sanitized();

    assert_eq!(degraded.estimated_diameter_km, 0.05);
    assert_eq!(
        degraded.absolute_magnitude,
        space_math::FALLBACK_ABSOLUTE_MAGNITUDE
    );

    let intact = baseline_record().sanitized();
    assert_eq!(intact.estimated_diameter_km, 0.15);
    assert_eq!(intact.absolute_magnitude, 20.5);
}

#[test]
fn certify_fallback_record_contract() {
    let fallback = AsteroidRecord::fallback("2025 XN4");

    assert_eq!(fallback.designation, "2025 XN4");
    assert_eq!(
        fallback.absolute_magnitude,
        space_math::FALLBACK_ABSOLUTE_MAGNITUDE
    );
    assert_eq!(fallback.albedo, space_math::ASSUMED_ALBEDO);
    assert_eq!(fallback.diameter_source, DiameterSource::Calculated);
    assert!(!fallback.accurate_diameter);
    assert!(
        (fallback.estimated_diameter_km - space_math::diameter_from_h(18.0)).abs() < 1e-12
    );
    assert!(!fallback.is_potentially_hazardous());
}

#[test]
fn certify_approach_distance_completion() {
    let approach_time = Utc.with_ymd_and_hms(2029, 4, 13, 21, 46, 0).unwrap();

    // Sin km reportados: se derivan de la distancia en UA.
    let derived = ApproachRecord::new(
        "99942".to_string(),
        Some("Apophis".to_string()),
        approach_time,
        0.00025,
        None,
        7.42,
    );
    let expected_km = 0.00025 * space_math::ASTRONOMICAL_UNIT_KM;
    assert!((derived.distance_km - expected_km).abs() / expected_km < 1e-9);

    // Con km reportados: el valor de la fuente se respeta.
    let reported = ApproachRecord::new(
        "99942".to_string(),
        None,
        approach_time,
        0.00025,
        Some(38_000.0),
        7.42,
    );
    assert_eq!(reported.distance_km, 38_000.0);
    assert_eq!(reported.data_source, "CloseApproach feed");
}

#[test]
fn certify_threat_derivation_completion() {
    let bare = ThreatRecord {
        designation: "2023 DW".to_string(),
        fullname: "(2023 DW)".to_string(),
        ip: 0.0012,
        ts_max: 1,
        ps_max: -2.2,
        diameter: 0.05,
        v_inf: 15.2,
        h: 24.3,
        n_imp: 10,
        impact_years: vec![2046],
        last_obs: "2023-03-20".to_string(),
        threat_level: None,
        energy_megatons: None,
        impact_category: None,
    };

    let derived = bare.with_derivations();
    let energy = derived.energy_megatons.expect("energy must be derived");

    assert!(energy > 0.0);
    assert_eq!(
        derived.impact_category,
        Some(space_math::impact_category(energy))
    );
    assert_eq!(derived.threat_level.as_deref(), Some("low"));

    // Valores ya reportados no se recalculan.
    let preset = ThreatRecord {
        energy_megatons: Some(7.5),
        impact_category: Some(ImpactCategory::Global),
        threat_level: Some("critical".to_string()),
        ..derived
    }
    .with_derivations();

    assert_eq!(preset.energy_megatons, Some(7.5));
    assert_eq!(preset.impact_category, Some(ImpactCategory::Global));
    assert_eq!(preset.threat_level.as_deref(), Some("critical"));
}
