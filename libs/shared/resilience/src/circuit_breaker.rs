// [libs/shared/resilience/src/circuit_breaker.rs]
/*!
 * =================================================================
 * APARATO: CIRCUIT BREAKER (V1.1 - SOBERANO)
 * CLASIFICACIÓN: SHARED UTILITY (ESTRATO L4)
 * RESPONSABILIDAD: CORTE DE LLAMADAS ANTE FALLOS CONSECUTIVOS DEL ENLACE
 *
 * Máquina de estados {Closed, Open, HalfOpen}. Closed cuenta fallos
 * consecutivos; al alcanzar el umbral abre y sella el instante del
 * último fallo. Open rechaza hasta cumplir el tiempo de recuperación
 * y transiciona a HalfOpen, donde la siguiente llamada actúa de sonda:
 * éxito cierra y resetea, fallo reabre. Toda transición ocurre bajo el
 * candado único del núcleo (single-writer).
 * =================================================================
 */

use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Estado observable del circuito.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Las llamadas fluyen; los fallos consecutivos se contabilizan.
    Closed,
    /// Las llamadas se rechazan hasta cumplir el tiempo de recuperación.
    Open,
    /// Una llamada de sonda decide el destino del circuito.
    HalfOpen,
}

/// Configuración del umbral de corte y la ventana de recuperación.
#[derive(Debug, Clone, Copy)]
pub struct CircuitBreakerConfig {
    /// Fallos consecutivos que abren el circuito.
    pub failure_threshold: u32,
    /// Tiempo en Open antes de permitir la sonda HalfOpen.
    pub recovery_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            recovery_timeout: Duration::from_secs(60),
        }
    }
}

/// Núcleo mutable del circuito, protegido por el candado único.
struct CircuitCore {
    state: CircuitState,
    consecutive_failure_count: u32,
    last_failure_instant: Option<Instant>,
}

/// Cortacircuitos por endpoint. Estado compartido entre todos los
/// llamadores del mismo enlace externo.
pub struct CircuitBreaker {
    endpoint_label: String,
    configuration: CircuitBreakerConfig,
    core: Mutex<CircuitCore>,
}

impl CircuitBreaker {
    pub fn new(endpoint_label: &str, configuration: CircuitBreakerConfig) -> Self {
        Self {
            endpoint_label: endpoint_label.to_string(),
            configuration,
            core: Mutex::new(CircuitCore {
                state: CircuitState::Closed,
                consecutive_failure_count: 0,
                last_failure_instant: None,
            }),
        }
    }

    /// Estado instantáneo del circuito (diagnóstico y auditoría).
    pub async fn state(&self) -> CircuitState {
        self.core.lock().await.state
    }

    /**
     * Verificación previa a la llamada. Transiciona Open → HalfOpen si la
     * ventana de recuperación venció; devuelve `Err(())` si la llamada
     * debe bloquearse con el circuito abierto.
     */
    pub async fn preflight(&self) -> Result<(), ()> {
        let mut core = self.core.lock().await;

        if core.state == CircuitState::Open {
            let recovery_elapsed = core
                .last_failure_instant
                .map(|instant| instant.elapsed() >= self.configuration.recovery_timeout)
                .unwrap_or(false);

            if recovery_elapsed {
                core.state = CircuitState::HalfOpen;
                info!(
                    "🔌 [CIRCUIT]: Endpoint [{}] transitioning to HALF_OPEN probe.",
                    self.endpoint_label
                );
            } else {
                return Err(());
            }
        }

        Ok(())
    }

    /// Registra un éxito: resetea contadores y cierra el circuito.
    pub async fn record_success(&self) {
        let mut core = self.core.lock().await;

        if core.state == CircuitState::HalfOpen {
            info!(
                "🔌 [CIRCUIT]: Endpoint [{}] probe succeeded. Circuit CLOSED.",
                self.endpoint_label
            );
        }

        core.consecutive_failure_count = 0;
        core.last_failure_instant = None;
        core.state = CircuitState::Closed;
    }

    /// Registra un fallo: incrementa el contador y abre el circuito al
    /// alcanzar el umbral, o reabre de inmediato si la sonda falló.
    pub async fn record_failure(&self) {
        let mut core = self.core.lock().await;

        core.consecutive_failure_count += 1;
        core.last_failure_instant = Some(Instant::now());

        if core.state == CircuitState::HalfOpen {
            core.state = CircuitState::Open;
            warn!(
                "🔌 [CIRCUIT]: Endpoint [{}] probe failed. Circuit RE-OPENED.",
                self.endpoint_label
            );
        } else if core.consecutive_failure_count >= self.configuration.failure_threshold {
            core.state = CircuitState::Open;
            warn!(
                "🔌 [CIRCUIT]: Endpoint [{}] OPENED after {} consecutive failures.",
                self.endpoint_label, core.consecutive_failure_count
            );
        }
    }

    /**
     * Ejecuta una operación bajo el circuito. `Err(None)` señala bloqueo
     * por circuito abierto; `Err(Some(e))` propaga el fallo del operador.
     *
     * El candado sólo se retiene durante las transiciones: la operación
     * vuela sin serializar a los demás llamadores.
     */
    pub async fn call<T, E, F>(&self, operation: F) -> Result<T, Option<E>>
    where
        F: Future<Output = Result<T, E>>,
    {
        if self.preflight().await.is_err() {
            return Err(None);
        }

        match operation.await {
            Ok(value) => {
                self.record_success().await;
                Ok(value)
            }
            Err(fault) => {
                self.record_failure().await;
                Err(Some(fault))
            }
        }
    }
}
