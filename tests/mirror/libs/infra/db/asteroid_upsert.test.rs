// [tests/mirror/libs/infra/db/asteroid_upsert.test.rs]
/*!
 * =================================================================
 * APARATO: CERTIFICADOR DE UPSERT DE ASTEROIDES (V1.4 - PROVING GROUNDS)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L3-MIRROR
 * RESPONSABILIDAD: AUDITORÍA DE IDEMPOTENCIA POR CLAVE NATURAL
 *
 * Ley certificada: la primera corrida crea, la re-corrida con datos
 * idénticos actualiza sin crear (created₂ = 0, updated₂ = created₁ +
 * updated₁) y los conteos de filas permanecen estables.
 * =================================================================
 */

use centinela_domain_models::{AsteroidRecord, DiameterSource};
use centinela_infra_db::{CatalogClient, UnitOfWork};

fn test_record(designation: &str, diameter_km: f64) -> AsteroidRecord {
    AsteroidRecord {
        designation: designation.to_string(),
        name: None,
        perihelion_au: Some(0.75),
        aphelion_au: Some(1.8),
        earth_moid_au: Some(0.03),
        absolute_magnitude: 20.5,
        estimated_diameter_km: diameter_km,
        accurate_diameter: false,
        albedo: 0.15,
        diameter_source: DiameterSource::Calculated,
        orbit_id: None,
        orbit_class: Some("Apollo".to_string()),
    }
}

#[tokio::test]
async fn certify_single_asteroid_upsert_cycle() {
    println!("\n🗄️  [INICIO]: Auditoría de upsert por designación...");
    let mut accumulated_anomalies = 0u32;

    // 1. SETUP: Motor A volátil con esquema anclado en RAM.
    let catalog_client =
        CatalogClient::connect("file:mem_asteroid_upsert?mode=memory&cache=shared", None)
            .await
            .expect("CRITICAL_FAULT: in-memory catalog failed to anchor");

    let record = test_record("2023 TEST", 0.15);

    // 2. FASE 1: primera corrida crea la fila.
    println!("   🧪 Fase 1: Primera corrida (génesis)...");
    let uow = UnitOfWork::begin(&catalog_client).await.expect("UOW_FAULT");
    let (created_first, updated_first) = uow
        .asteroid_repo()
        .bulk_upsert_catalog(std::slice::from_ref(&record))
        .await
        .expect("UPSERT_FAULT: genesis run rejected");
    uow.commit().await.expect("SEAL_FAULT");

    if (created_first, updated_first) != (1, 0) {
        println!("      ❌ FALLO: génesis reportó ({}, {}).", created_first, updated_first);
        accumulated_anomalies += 1;
    } else {
        println!("      ✅ Génesis: (created=1, updated=0).");
    }

    // 3. FASE 2: re-corrida idéntica actualiza sin crear.
    println!("   🧪 Fase 2: Re-corrida idéntica (idempotencia)...");
    let uow = UnitOfWork::begin(&catalog_client).await.expect("UOW_FAULT");
    let (created_second, updated_second) = uow
        .asteroid_repo()
        .bulk_upsert_catalog(std::slice::from_ref(&record))
        .await
        .expect("UPSERT_FAULT: idempotent run rejected");

    if created_second != 0 || updated_second != created_first + updated_first {
        println!(
            "      ❌ FALLO: re-corrida reportó ({}, {}).",
            created_second, updated_second
        );
        accumulated_anomalies += 1;
    } else {
        println!("      ✅ Idempotencia: (created=0, updated=1).");
    }

    // 4. FASE 3: estado final — una sola fila, con sus invariantes.
    println!("   🧪 Fase 3: Verificación de estado final...");
    let row_count = uow
        .asteroid_repo()
        .core()
        .count()
        .await
        .expect("COUNT_FAULT");
    if row_count != 1 {
        println!("      ❌ FALLO: conteo final {}.", row_count);
        accumulated_anomalies += 1;
    }

    let stored = uow
        .asteroid_repo()
        .find_by_designation("2023 TEST")
        .await
        .expect("LOOKUP_FAULT")
        .expect("stored asteroid must exist");

    let invariants_hold = stored.albedo > 0.0
        && stored.albedo <= 1.0
        && stored.estimated_diameter_km > 0.0
        && stored.diameter_source == DiameterSource::Calculated;
    if !invariants_hold {
        println!("      ❌ FALLO: invariantes de fila violados.");
        accumulated_anomalies += 1;
    }
    uow.commit().await.expect("SEAL_FAULT");

    println!("🏁 [INFORME]: Anomalías detectadas: {}.", accumulated_anomalies);
    assert_eq!(accumulated_anomalies, 0, "La idempotencia del catálogo fue comprometida.");
}

#[tokio::test]
async fn certify_batch_rerun_produces_zero_net_changes() {
    let catalog_client =
        CatalogClient::connect("file:mem_asteroid_batch?mode=memory&cache=shared", None)
            .await
            .expect("CRITICAL_FAULT: in-memory catalog failed to anchor");

    let batch = vec![
        test_record("2024 AA", 0.21),
        test_record("2024 BB", 0.34),
        test_record("2024 CC", 0.55),
    ];

    let uow = UnitOfWork::begin(&catalog_client).await.expect("UOW_FAULT");
    let (created_first, updated_first) = uow
        .asteroid_repo()
        .bulk_upsert_catalog(&batch)
        .await
        .expect("UPSERT_FAULT");
    assert_eq!((created_first, updated_first), (3, 0));
    uow.commit().await.expect("SEAL_FAULT");

    // Re-corrida: cero altas netas, conteo estable.
    let uow = UnitOfWork::begin(&catalog_client).await.expect("UOW_FAULT");
    let (created_second, updated_second) = uow
        .asteroid_repo()
        .bulk_upsert_catalog(&batch)
        .await
        .expect("UPSERT_FAULT");
    assert_eq!(created_second, 0);
    assert_eq!(updated_second, created_first + updated_first);
    assert_eq!(uow.asteroid_repo().core().count().await.expect("COUNT_FAULT"), 3);
    uow.commit().await.expect("SEAL_FAULT");
}

#[tokio::test]
async fn certify_update_overwrites_mutable_fields() {
    let catalog_client =
        CatalogClient::connect("file:mem_asteroid_overwrite?mode=memory&cache=shared", None)
            .await
            .expect("CRITICAL_FAULT: in-memory catalog failed to anchor");

    let uow = UnitOfWork::begin(&catalog_client).await.expect("UOW_FAULT");
    let original = test_record("2025 XN4", 0.15);
    uow.asteroid_repo()
        .bulk_upsert_catalog(std::slice::from_ref(&original))
        .await
        .expect("UPSERT_FAULT");

    // La segunda versión trae un diámetro medido.
    let revised = AsteroidRecord {
        estimated_diameter_km: 0.42,
        accurate_diameter: true,
        diameter_source: DiameterSource::Measured,
        ..original
    };
    uow.asteroid_repo()
        .bulk_upsert_catalog(std::slice::from_ref(&revised))
        .await
        .expect("UPSERT_FAULT");

    let stored = uow
        .asteroid_repo()
        .find_by_designation("2025 XN4")
        .await
        .expect("LOOKUP_FAULT")
        .expect("row must exist");

    assert_eq!(stored.estimated_diameter_km, 0.42);
    assert!(stored.accurate_diameter);
    assert_eq!(stored.diameter_source, DiameterSource::Measured);
    uow.commit().await.expect("SEAL_FAULT");
}
