// [tests/mirror/libs/shared/resilience/bulkhead_guard.test.rs]
/*!
 * =================================================================
 * APARATO: CERTIFICADOR DE BULKHEAD Y GUARDIÁN (V1.1 - PROVING GROUNDS)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L4-MIRROR
 * RESPONSABILIDAD: AUDITORÍA DE SATURACIÓN, COLA ACOTADA Y DEADLINE
 *
 * Contrato certificado: el compartimiento admite 'max_concurrent'
 * ejecuciones más 'queue_size' esperadores y rechaza el excedente sin
 * esperar; el guardián compuesto traduce expiración de plazo y
 * saturación a su catálogo y alimenta el cortacircuitos.
 * =================================================================
 */

use centinela_shared_resilience::{
    Bulkhead, BulkheadConfig, CircuitBreakerConfig, CircuitState, EndpointGuard, EndpointProfile,
    RetryPolicy, ShieldError,
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn certify_bulkhead_rejects_when_saturated() {
    let bulkhead = Arc::new(Bulkhead::new(
        "probe",
        BulkheadConfig {
            max_concurrent: 1,
            queue_size: 1,
        },
    ));

    // Ranura única ocupada.
    let held_permit = bulkhead.acquire().await.expect("first slot must be granted");

    // Primer esperador: ocupa la única plaza de cola.
    let queued_bulkhead = Arc::clone(&bulkhead);
    let queued_waiter =
        tokio::spawn(async move { queued_bulkhead.acquire().await.map(|_permit| ()) });
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Segundo esperador: semáforo y cola llenos, rechazo inmediato.
    assert!(bulkhead.acquire().await.is_err());

    // Al liberar la ranura, el esperador encolado progresa.
    drop(held_permit);
    let waiter_verdict = queued_waiter.await.expect("waiter must not panic");
    assert!(waiter_verdict.is_ok());
}

#[tokio::test]
async fn certify_guard_translates_deadline() {
    let profile = EndpointProfile {
        endpoint_label: "probe",
        circuit: CircuitBreakerConfig::default(),
        bulkhead: BulkheadConfig {
            max_concurrent: 2,
            queue_size: 2,
        },
        call_timeout: Duration::from_millis(100),
    };
    let guard = EndpointGuard::new(profile);

    let verdict: Result<u32, ShieldError<String>> = guard
        .shield(async {
            tokio::time::sleep(Duration::from_millis(400)).await;
            Ok(9)
        })
        .await;

    assert!(matches!(verdict, Err(ShieldError::Timeout { .. })));

    // El fallo alimentó el cortacircuitos pero no lo abrió (umbral 3).
    assert_eq!(guard.circuit().state().await, CircuitState::Closed);
}

#[tokio::test]
async fn certify_guard_opens_circuit_and_blocks() {
    let profile = EndpointProfile {
        endpoint_label: "probe",
        circuit: CircuitBreakerConfig {
            failure_threshold: 2,
            recovery_timeout: Duration::from_secs(60),
        },
        bulkhead: BulkheadConfig {
            max_concurrent: 1,
            queue_size: 1,
        },
        call_timeout: Duration::from_secs(5),
    };
    let guard = EndpointGuard::new(profile);

    for _ in 0..2 {
        let verdict: Result<u32, ShieldError<String>> =
            guard.shield(async { Err("upstream down".to_string()) }).await;
        assert!(matches!(verdict, Err(ShieldError::Inner(_))));
    }
    assert_eq!(guard.circuit().state().await, CircuitState::Open);

    // Circuito abierto: rechazo sin ejecutar, categorizado 'unavailable'.
    let blocked: Result<u32, ShieldError<String>> =
        guard.shield(async { Ok(1) }).await;
    match blocked {
        Err(fault @ ShieldError::CircuitOpen { .. }) => assert!(fault.is_unavailable()),
        other => panic!("expected CircuitOpen, got {:?}", other),
    }
}

#[test]
fn certify_backoff_policy_clamping() {
    let policy = RetryPolicy::default();

    // Multiplicador 1 con piso 4s y techo 10s: 4, 4, 4...
    assert_eq!(policy.backoff_delay(1), Duration::from_secs(4));
    assert_eq!(policy.backoff_delay(2), Duration::from_secs(4));
    assert_eq!(policy.backoff_delay(3), Duration::from_secs(4));
    assert_eq!(policy.backoff_delay(5), Duration::from_secs(10));

    assert!(policy.allows_another_attempt(1));
    assert!(policy.allows_another_attempt(2));
    assert!(!policy.allows_another_attempt(3));
}
