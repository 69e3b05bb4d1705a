// [tests/mirror/libs/infra/db/filter_grammar.test.rs]
/*!
 * =================================================================
 * APARATO: CERTIFICADOR DE GRAMÁTICA DE FILTROS (V1.4 - PROVING GROUNDS)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L3-MIRROR
 * RESPONSABILIDAD: AUDITORÍA DE 'campo__op', ENVOLTURA %v% Y BÚSQUEDA
 * =================================================================
 */

use centinela_domain_models::{AsteroidRecord, DiameterSource};
use centinela_infra_db::{CatalogClient, FilterCondition, FilterOp, FilterValue, UnitOfWork};

fn seed_record(designation: &str, name: Option<&str>, diameter_km: f64) -> AsteroidRecord {
    AsteroidRecord {
        designation: designation.to_string(),
        name: name.map(str::to_string),
        perihelion_au: Some(0.9),
        aphelion_au: Some(2.0),
        earth_moid_au: Some(0.04),
        absolute_magnitude: 19.5,
        estimated_diameter_km: diameter_km,
        accurate_diameter: false,
        albedo: 0.15,
        diameter_source: DiameterSource::Calculated,
        orbit_id: None,
        orbit_class: Some("Apollo".to_string()),
    }
}

async fn seeded_catalog(tag: &str) -> CatalogClient {
    let catalog_client = CatalogClient::connect(
        &format!("file:{}?mode=memory&cache=shared", tag),
        None,
    )
    .await
    .expect("CRITICAL_FAULT: in-memory catalog failed to anchor");

    let uow = UnitOfWork::begin(&catalog_client).await.expect("UOW_FAULT");
    let seeds = vec![
        seed_record("99942", Some("Apophis"), 0.34),
        seed_record("433", Some("Eros"), 16.8),
        seed_record("2023 DW", None, 0.05),
        seed_record("2024 YR4", None, 0.055),
    ];
    uow.asteroid_repo()
        .bulk_upsert_catalog(&seeds)
        .await
        .expect("SEED_FAULT");
    uow.commit().await.expect("SEAL_FAULT");

    catalog_client
}

#[tokio::test]
async fn certify_comparison_operators() {
    let catalog_client = seeded_catalog("mem_filter_cmp").await;
    let uow = UnitOfWork::begin(&catalog_client).await.expect("UOW_FAULT");
    let repository = uow.asteroid_repo();

    // ge: cuerpos de un kilómetro o más.
    let large = repository
        .core()
        .filter(
            &[FilterCondition::parse(
                "estimated_diameter_km__ge",
                FilterValue::from(1.0),
            )
            .expect("grammar must accept ge")],
            0,
            None,
            Some("estimated_diameter_km"),
            true,
        )
        .await
        .expect("FILTER_FAULT");
    assert_eq!(large.len(), 1);
    assert_eq!(large[0].designation, "433");

    // lt + orden ascendente por diámetro.
    let small = repository
        .core()
        .filter(
            &[FilterCondition::parse(
                "estimated_diameter_km__lt",
                FilterValue::from(0.1),
            )
            .expect("grammar must accept lt")],
            0,
            None,
            Some("estimated_diameter_km"),
            false,
        )
        .await
        .expect("FILTER_FAULT");
    assert_eq!(small.len(), 2);
    assert_eq!(small[0].designation, "2023 DW");
    assert_eq!(small[1].designation, "2024 YR4");

    // in: lista de designaciones.
    let listed = repository
        .core()
        .filter(
            &[FilterCondition::parse(
                "designation__in",
                FilterValue::from(vec!["433".to_string(), "99942".to_string()]),
            )
            .expect("grammar must accept in")],
            0,
            None,
            None,
            false,
        )
        .await
        .expect("FILTER_FAULT");
    assert_eq!(listed.len(), 2);

    uow.commit().await.expect("SEAL_FAULT");
}

#[tokio::test]
async fn certify_like_wrapping_and_null_probes() {
    let catalog_client = seeded_catalog("mem_filter_like").await;
    let uow = UnitOfWork::begin(&catalog_client).await.expect("UOW_FAULT");
    let repository = uow.asteroid_repo();

    // like envuelve SIEMPRE como %v%: 'poph' casa 'Apophis'.
    let fuzzy = repository
        .core()
        .filter(
            &[FilterCondition::parse("name__like", FilterValue::from("poph"))
                .expect("grammar must accept like")],
            0,
            None,
            None,
            false,
        )
        .await
        .expect("FILTER_FAULT");
    assert_eq!(fuzzy.len(), 1);
    assert_eq!(fuzzy[0].designation, "99942");

    // ilike ignora mayúsculas.
    let case_insensitive = repository
        .core()
        .filter(
            &[FilterCondition::parse("name__ilike", FilterValue::from("EROS"))
                .expect("grammar must accept ilike")],
            0,
            None,
            None,
            false,
        )
        .await
        .expect("FILTER_FAULT");
    assert_eq!(case_insensitive.len(), 1);
    assert_eq!(case_insensitive[0].designation, "433");

    // is_null sobre el nombre propio.
    let anonymous = repository
        .core()
        .filter(
            &[FilterCondition::parse("name__is_null", FilterValue::Null)
                .expect("grammar must accept is_null")],
            0,
            None,
            None,
            false,
        )
        .await
        .expect("FILTER_FAULT");
    assert_eq!(anonymous.len(), 2);

    uow.commit().await.expect("SEAL_FAULT");
}

#[tokio::test]
async fn certify_unknown_fields_silently_ignored() {
    let catalog_client = seeded_catalog("mem_filter_unknown").await;
    let uow = UnitOfWork::begin(&catalog_client).await.expect("UOW_FAULT");

    // Campo inexistente: la condición se descarta y el filtro degenera
    // en un listado completo.
    let all_rows = uow
        .asteroid_repo()
        .core()
        .filter(
            &[FilterCondition::parse(
                "spectral_class__eq",
                FilterValue::from("S"),
            )
            .expect("grammar parses, field is later ignored")],
            0,
            None,
            None,
            false,
        )
        .await
        .expect("FILTER_FAULT");
    assert_eq!(all_rows.len(), 4);

    // Sufijo de operador desconocido: la clave no produce condición.
    assert!(FilterCondition::parse("name__fuzzy", FilterValue::from("x")).is_none());

    uow.commit().await.expect("SEAL_FAULT");
}

#[tokio::test]
async fn certify_search_and_pagination() {
    let catalog_client = seeded_catalog("mem_filter_search").await;
    let uow = UnitOfWork::begin(&catalog_client).await.expect("UOW_FAULT");
    let repository = uow.asteroid_repo();

    let by_name = repository
        .core()
        .search("eros", &["designation", "name"], 0, Some(10))
        .await
        .expect("SEARCH_FAULT");
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].designation, "433");

    // Campos fuera del contrato de búsqueda: resultado vacío.
    let no_fields = repository
        .core()
        .search("eros", &["albedo"], 0, Some(10))
        .await
        .expect("SEARCH_FAULT");
    assert!(no_fields.is_empty());

    // Paginación por identidad.
    let first_page = repository.core().get_all(0, Some(2)).await.expect("PAGE_FAULT");
    let second_page = repository.core().get_all(2, Some(2)).await.expect("PAGE_FAULT");
    assert_eq!(first_page.len(), 2);
    assert_eq!(second_page.len(), 2);
    assert_ne!(first_page[0].id, second_page[0].id);

    uow.commit().await.expect("SEAL_FAULT");
}
