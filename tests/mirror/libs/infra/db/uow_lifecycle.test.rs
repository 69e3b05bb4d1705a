// [tests/mirror/libs/infra/db/uow_lifecycle.test.rs]
/*!
 * =================================================================
 * APARATO: CERTIFICADOR DEL UNIT OF WORK (V1.4 - PROVING GROUNDS)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L3-MIRROR
 * RESPONSABILIDAD: AUDITORÍA DE ÁMBITO DE SESIÓN Y COORDINACIÓN MULTI-PASO
 *
 * Contratos certificados: un repositorio fuera del ámbito activo falla
 * con 'SessionMisuse'; el coordinador propaga el primer fallo tras
 * invocar la compensación; el workflow registra pasos saltados y
 * ejecuta la compensación del paso fallido.
 * =================================================================
 */

use centinela_domain_models::{AsteroidRecord, DiameterSource};
use centinela_infra_db::coordinator::{
    OperationFn, OperationFuture, StepFn, StepFuture, StepRollbackFn, TransactionCoordinator,
    WorkflowStep,
};
use centinela_infra_db::{CatalogClient, DbError, UnitOfWork};
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn probe_record(designation: &str) -> AsteroidRecord {
    AsteroidRecord {
        designation: designation.to_string(),
        name: None,
        perihelion_au: Some(0.7),
        aphelion_au: Some(1.7),
        earth_moid_au: Some(0.01),
        absolute_magnitude: 22.0,
        estimated_diameter_km: 0.1,
        accurate_diameter: false,
        albedo: 0.15,
        diameter_source: DiameterSource::Calculated,
        orbit_id: None,
        orbit_class: None,
    }
}

#[tokio::test]
async fn certify_session_misuse_after_seal() {
    let catalog_client =
        CatalogClient::connect("file:mem_uow_misuse?mode=memory&cache=shared", None)
            .await
            .expect("CRITICAL_FAULT: in-memory catalog failed to anchor");

    let uow = UnitOfWork::begin(&catalog_client).await.expect("UOW_FAULT");
    let repository = uow.asteroid_repo();

    // Dentro del ámbito: operativo.
    repository
        .core()
        .create(&probe_record("2026 AA"))
        .await
        .expect("CREATE_FAULT");

    // Sellado del ámbito: la sesión queda liberada.
    uow.commit().await.expect("SEAL_FAULT");

    // Uso posterior: error de programación, no silencio.
    let verdict = repository.core().count().await;
    assert!(
        matches!(verdict, Err(DbError::SessionMisuse(_))),
        "expected SessionMisuse, got {:?}",
        verdict
    );
}

// --- OPERACIONES COORDINADAS (fn-items con el contrato HRTB) ---

fn create_first_operation(uow: &UnitOfWork) -> OperationFuture<'_> {
    Box::pin(async move {
        let created = uow
            .asteroid_repo()
            .core()
            .create(&probe_record("2026 COORD"))
            .await?;
        Ok(json!({ "id": created.id }))
    })
}

fn count_operation(uow: &UnitOfWork) -> OperationFuture<'_> {
    Box::pin(async move {
        let total = uow.asteroid_repo().core().count().await?;
        Ok(json!({ "count": total }))
    })
}

fn duplicate_designation_operation(uow: &UnitOfWork) -> OperationFuture<'_> {
    Box::pin(async move {
        // Misma designación: viola el UNIQUE del esquema.
        let created = uow
            .asteroid_repo()
            .core()
            .create(&probe_record("2026 COORD"))
            .await?;
        Ok(json!({ "id": created.id }))
    })
}

#[tokio::test]
async fn certify_coordinated_operation_success_and_compensation() {
    let catalog_client =
        CatalogClient::connect("file:mem_uow_coord?mode=memory&cache=shared", None)
            .await
            .expect("CRITICAL_FAULT: in-memory catalog failed to anchor");
    let coordinator = TransactionCoordinator::new(catalog_client.clone());

    // Camino feliz: dos operaciones, dos resultados.
    let operations: Vec<OperationFn> =
        vec![Box::new(create_first_operation), Box::new(count_operation)];
    let results = coordinator
        .coordinated_operation(operations, None)
        .await
        .expect("COORDINATION_FAULT");
    assert_eq!(results.len(), 2);
    assert_eq!(results[1]["count"], json!(1));

    // Camino de fallo: la segunda operación viola la unicidad; la
    // compensación observa el resultado parcial y el error propaga.
    let compensation_invoked = Arc::new(AtomicBool::new(false));
    let compensation_flag = Arc::clone(&compensation_invoked);

    let failing_operations: Vec<OperationFn> = vec![
        Box::new(count_operation),
        Box::new(duplicate_designation_operation),
    ];
    let verdict = coordinator
        .coordinated_operation(
            failing_operations,
            Some(Box::new(move |_fault, partial_results| {
                assert_eq!(partial_results.len(), 1);
                compensation_flag.store(true, Ordering::SeqCst);
            })),
        )
        .await;

    assert!(matches!(verdict, Err(DbError::InvariantViolation(_))));
    assert!(compensation_invoked.load(Ordering::SeqCst));
}

// --- PASOS DE WORKFLOW ---

fn seed_step<'a>(uow: &'a UnitOfWork, _results: &'a Map<String, Value>) -> StepFuture<'a> {
    Box::pin(async move {
        let created = uow
            .asteroid_repo()
            .core()
            .create(&probe_record("2026 FLOW"))
            .await?;
        Ok(json!({ "id": created.id }))
    })
}

fn audit_step<'a>(uow: &'a UnitOfWork, _results: &'a Map<String, Value>) -> StepFuture<'a> {
    Box::pin(async move {
        let total = uow.asteroid_repo().core().count().await?;
        Ok(json!({ "count": total }))
    })
}

fn failing_step<'a>(uow: &'a UnitOfWork, _results: &'a Map<String, Value>) -> StepFuture<'a> {
    Box::pin(async move {
        let _ = uow
            .asteroid_repo()
            .core()
            .create(&probe_record("2026 FLOW"))
            .await?;
        Ok(json!({}))
    })
}

fn failing_step_rollback<'a>(
    _uow: &'a UnitOfWork,
    _results: &'a Map<String, Value>,
    fault: &'a DbError,
) -> StepFuture<'a> {
    Box::pin(async move { Ok(json!({ "observed": fault.to_string() })) })
}

#[tokio::test]
async fn certify_workflow_skip_and_rollback() {
    let catalog_client =
        CatalogClient::connect("file:mem_uow_workflow?mode=memory&cache=shared", None)
            .await
            .expect("CRITICAL_FAULT: in-memory catalog failed to anchor");
    let coordinator = TransactionCoordinator::new(catalog_client.clone());

    let steps = vec![
        WorkflowStep {
            name: "seed".to_string(),
            operation: Box::new(seed_step) as StepFn,
            condition: None,
            rollback_operation: None,
        },
        WorkflowStep {
            name: "never_runs".to_string(),
            operation: Box::new(audit_step) as StepFn,
            // Condición imposible: el paso queda registrado como saltado.
            condition: Some(Box::new(|_results| false)),
            rollback_operation: None,
        },
        WorkflowStep {
            name: "audit".to_string(),
            operation: Box::new(audit_step) as StepFn,
            condition: Some(Box::new(|results| results.contains_key("seed"))),
            rollback_operation: None,
        },
    ];

    let outcome = coordinator.workflow(steps).await;
    assert!(outcome.completed);
    assert_eq!(outcome.results["never_runs"]["skipped"], json!(true));
    assert_eq!(outcome.results["audit"]["data"]["count"], json!(1));

    // Workflow con paso fallido: compensación ejecutada, resto abortado.
    let failing_steps = vec![
        WorkflowStep {
            name: "collides".to_string(),
            operation: Box::new(failing_step) as StepFn,
            condition: None,
            rollback_operation: Some(Box::new(failing_step_rollback) as StepRollbackFn),
        },
        WorkflowStep {
            name: "unreached".to_string(),
            operation: Box::new(audit_step) as StepFn,
            condition: None,
            rollback_operation: None,
        },
    ];

    let failed_outcome = coordinator.workflow(failing_steps).await;
    assert!(!failed_outcome.completed);
    assert!(failed_outcome.error.is_some());
    assert_eq!(failed_outcome.results["collides"]["success"], json!(false));
    assert_eq!(failed_outcome.results["collides"]["rolled_back"], json!(true));
    assert!(!failed_outcome.results.contains_key("unreached"));
}
