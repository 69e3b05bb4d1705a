// [tests/mirror/libs/infra/db/threat_integrity.test.rs]
/*!
 * =================================================================
 * APARATO: CERTIFICADOR DE INTEGRIDAD DE AMENAZAS (V1.4 - PROVING GROUNDS)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L3-MIRROR
 * RESPONSABILIDAD: AUDITORÍA UNO-A-UNO, DERIVADOS Y CASCADA DE BORRADO
 * =================================================================
 */

use centinela_domain_models::{AsteroidRecord, DiameterSource, ThreatRecord};
use centinela_infra_db::{BoundThreatRecord, CatalogClient, UnitOfWork};

fn host_asteroid(designation: &str) -> AsteroidRecord {
    AsteroidRecord {
        designation: designation.to_string(),
        name: Some("Didymos".to_string()),
        perihelion_au: Some(1.01),
        aphelion_au: Some(2.27),
        earth_moid_au: Some(0.04),
        absolute_magnitude: 18.0,
        estimated_diameter_km: 0.78,
        accurate_diameter: true,
        albedo: 0.15,
        diameter_source: DiameterSource::Measured,
        orbit_id: None,
        orbit_class: Some("Apollo".to_string()),
    }
}

fn risk_record(designation: &str, ip: f64) -> ThreatRecord {
    ThreatRecord {
        designation: designation.to_string(),
        fullname: format!("({})", designation),
        ip,
        ts_max: 8,
        ps_max: 1.2,
        diameter: 0.5,
        v_inf: 18.0,
        h: 18.9,
        n_imp: 42,
        impact_years: vec![2068, 2076],
        last_obs: "2025-11-02".to_string(),
        threat_level: None,
        energy_megatons: None,
        impact_category: None,
    }
}

#[tokio::test]
async fn certify_one_to_one_upsert_and_derivations() {
    let catalog_client =
        CatalogClient::connect("file:mem_threat_one?mode=memory&cache=shared", None)
            .await
            .expect("CRITICAL_FAULT: in-memory catalog failed to anchor");

    let uow = UnitOfWork::begin(&catalog_client).await.expect("UOW_FAULT");
    let asteroid = uow
        .asteroid_repo()
        .core()
        .create(&host_asteroid("65803"))
        .await
        .expect("CREATE_FAULT");

    // Génesis: los derivados ausentes se completan al ligar el registro.
    let bound = BoundThreatRecord::new(asteroid.id, risk_record("65803", 0.001));
    let (created, updated) = uow
        .threat_repo()
        .bulk_upsert_assessments(std::slice::from_ref(&bound))
        .await
        .expect("UPSERT_FAULT");
    assert_eq!((created, updated), (1, 0));

    let stored = uow
        .threat_repo()
        .find_by_designation("65803")
        .await
        .expect("LOOKUP_FAULT")
        .expect("assessment must exist");

    // Derivados completos e invariantes del esquema.
    assert_eq!(stored.threat_level, "critical");
    assert!(stored.energy_megatons > 100.0, "0.5 km a 18 km/s supera el umbral global");
    assert_eq!(stored.impact_category.as_str(), "global");
    assert!(stored.ts_max >= 0 && stored.ts_max <= 10);
    assert!(stored.ip >= 0.0 && stored.diameter >= 0.0 && stored.v_inf >= 0.0);
    assert_eq!(stored.impact_years, vec![2068, 2076]);

    // Re-corrida con probabilidad revisada: misma fila, actualizada.
    let revised = BoundThreatRecord::new(asteroid.id, risk_record("65803", 0.004));
    let (created_second, updated_second) = uow
        .threat_repo()
        .bulk_upsert_assessments(std::slice::from_ref(&revised))
        .await
        .expect("UPSERT_FAULT");
    assert_eq!((created_second, updated_second), (0, 1));

    assert_eq!(uow.threat_repo().core().count().await.expect("COUNT_FAULT"), 1);
    let refreshed = uow
        .threat_repo()
        .find_by_asteroid_id(asteroid.id)
        .await
        .expect("LOOKUP_FAULT")
        .expect("assessment must persist");
    assert_eq!(refreshed.ip, 0.004);

    uow.commit().await.expect("SEAL_FAULT");
}

#[tokio::test]
async fn certify_cascade_delete_from_host_asteroid() {
    let catalog_client =
        CatalogClient::connect("file:mem_threat_cascade?mode=memory&cache=shared", None)
            .await
            .expect("CRITICAL_FAULT: in-memory catalog failed to anchor");

    let uow = UnitOfWork::begin(&catalog_client).await.expect("UOW_FAULT");
    let asteroid = uow
        .asteroid_repo()
        .core()
        .create(&host_asteroid("101955"))
        .await
        .expect("CREATE_FAULT");

    let bound = BoundThreatRecord::new(asteroid.id, risk_record("101955", 0.0002));
    uow.threat_repo()
        .bulk_upsert_assessments(std::slice::from_ref(&bound))
        .await
        .expect("UPSERT_FAULT");
    assert_eq!(uow.threat_repo().core().count().await.expect("COUNT_FAULT"), 1);

    // Borrado del propietario: la evaluación cae en cascada.
    let removed = uow
        .asteroid_repo()
        .core()
        .delete(asteroid.id)
        .await
        .expect("DELETE_FAULT");
    assert!(removed);
    assert_eq!(uow.threat_repo().core().count().await.expect("COUNT_FAULT"), 0);

    uow.commit().await.expect("SEAL_FAULT");
}
