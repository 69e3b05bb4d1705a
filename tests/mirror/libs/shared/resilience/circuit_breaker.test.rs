// [tests/mirror/libs/shared/resilience/circuit_breaker.test.rs]
/*!
 * =================================================================
 * APARATO: CERTIFICADOR DEL CIRCUIT BREAKER (V1.1 - PROVING GROUNDS)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L4-MIRROR
 * RESPONSABILIDAD: AUDITORÍA DE LA MÁQUINA DE ESTADOS DE CORTE
 *
 * Contrato certificado: el circuito abre exactamente al umbral de
 * fallos consecutivos, rechaza sin ejecutar mientras la ventana de
 * recuperación no venza, sondea en HalfOpen y cierra con éxito o
 * reabre con fallo.
 * =================================================================
 */

use centinela_shared_resilience::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use std::time::Duration;

fn probe_config(recovery_millis: u64) -> CircuitBreakerConfig {
    CircuitBreakerConfig {
        failure_threshold: 3,
        recovery_timeout: Duration::from_millis(recovery_millis),
    }
}

async fn failing_call(breaker: &CircuitBreaker) -> Result<u32, Option<&'static str>> {
    breaker.call(async { Err::<u32, _>("upstream down") }).await
}

#[tokio::test]
async fn certify_opens_exactly_at_threshold() {
    let breaker = CircuitBreaker::new("probe", probe_config(60_000));

    // Dos fallos: todavía cerrado.
    for _ in 0..2 {
        let verdict = failing_call(&breaker).await;
        assert!(matches!(verdict, Err(Some(_))));
        assert_eq!(breaker.state().await, CircuitState::Closed);
    }

    // Tercer fallo consecutivo: apertura.
    let verdict = failing_call(&breaker).await;
    assert!(matches!(verdict, Err(Some(_))));
    assert_eq!(breaker.state().await, CircuitState::Open);

    // Con el circuito abierto la operación NO se ejecuta.
    let mut executed = false;
    let blocked = breaker
        .call(async {
            executed = true;
            Ok::<u32, &'static str>(1)
        })
        .await;
    assert!(matches!(blocked, Err(None)));
    assert!(!executed, "open circuit must block execution");
}

#[tokio::test]
async fn certify_success_resets_consecutive_count() {
    let breaker = CircuitBreaker::new("probe", probe_config(60_000));

    let _ = failing_call(&breaker).await;
    let _ = failing_call(&breaker).await;
    let recovered = breaker.call(async { Ok::<u32, &'static str>(7) }).await;
    assert_eq!(recovered.ok(), Some(7));

    // El contador volvió a cero: dos fallos más no abren.
    let _ = failing_call(&breaker).await;
    let _ = failing_call(&breaker).await;
    assert_eq!(breaker.state().await, CircuitState::Closed);
}

#[tokio::test]
async fn certify_half_open_probe_closes_on_success() {
    let breaker = CircuitBreaker::new("probe", probe_config(150));

    for _ in 0..3 {
        let _ = failing_call(&breaker).await;
    }
    assert_eq!(breaker.state().await, CircuitState::Open);

    // La ventana de recuperación vence: la siguiente llamada sondea.
    tokio::time::sleep(Duration::from_millis(200)).await;
    let probe = breaker.call(async { Ok::<u32, &'static str>(42) }).await;
    assert_eq!(probe.ok(), Some(42));
    assert_eq!(breaker.state().await, CircuitState::Closed);
}

#[tokio::test]
async fn certify_half_open_probe_reopens_on_failure() {
    let breaker = CircuitBreaker::new("probe", probe_config(150));

    for _ in 0..3 {
        let _ = failing_call(&breaker).await;
    }
    tokio::time::sleep(Duration::from_millis(200)).await;

    // La sonda falla: reapertura inmediata y bloqueo posterior.
    let probe = failing_call(&breaker).await;
    assert!(matches!(probe, Err(Some(_))));
    assert_eq!(breaker.state().await, CircuitState::Open);

    let blocked = breaker.call(async { Ok::<u32, &'static str>(1) }).await;
    assert!(matches!(blocked, Err(None)));
}
