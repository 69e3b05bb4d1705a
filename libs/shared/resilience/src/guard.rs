// [libs/shared/resilience/src/guard.rs]
/*!
 * =================================================================
 * APARATO: ENDPOINT GUARD (V1.1 - SOBERANO)
 * CLASIFICACIÓN: SHARED UTILITY (ESTRATO L4)
 * RESPONSABILIDAD: COMPOSICIÓN CANÓNICA DE LAS PRIMITIVAS DE PROTECCIÓN
 *
 * Orden de composición sobre cada llamada:
 *   circuit_breaker(bulkhead(timeout(fn)))
 * El cortacircuitos observa todo veredicto: un rechazo del bulkhead y
 * una expiración de plazo cuentan como fallo del enlace, igual que un
 * error del operador.
 * =================================================================
 */

use crate::bulkhead::Bulkhead;
use crate::circuit_breaker::CircuitBreaker;
use crate::errors::ShieldError;
use crate::profiles::EndpointProfile;
use crate::timeout::with_deadline;
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Guardián de larga vida por endpoint: posee el estado compartido de
/// circuito y compartimiento, y el plazo calibrado de llamada.
pub struct EndpointGuard {
    endpoint_label: String,
    circuit: CircuitBreaker,
    bulkhead: Bulkhead,
    call_timeout: Duration,
}

impl EndpointGuard {
    pub fn new(profile: EndpointProfile) -> Self {
        Self {
            endpoint_label: profile.endpoint_label.to_string(),
            circuit: CircuitBreaker::new(profile.endpoint_label, profile.circuit),
            bulkhead: Bulkhead::new(profile.endpoint_label, profile.bulkhead),
            call_timeout: profile.call_timeout,
        }
    }

    /// Etiqueta del endpoint protegido (diagnóstico y logs).
    pub fn endpoint_label(&self) -> &str {
        &self.endpoint_label
    }

    /// Acceso de auditoría al cortacircuitos subyacente.
    pub fn circuit(&self) -> &CircuitBreaker {
        &self.circuit
    }

    /**
     * Ejecuta la operación bajo la pila completa de protección.
     *
     * # Errors:
     * - `ShieldError::CircuitOpen`: circuito abierto, llamada bloqueada.
     * - `ShieldError::BulkheadFull`: saturación de concurrencia y cola.
     * - `ShieldError::Timeout`: plazo del endpoint excedido.
     * - `ShieldError::Inner`: fallo del operador subyacente.
     */
    pub async fn shield<T, E, F>(&self, operation: F) -> Result<T, ShieldError<E>>
    where
        E: fmt::Debug + fmt::Display,
        F: Future<Output = Result<T, E>>,
    {
        if self.circuit.preflight().await.is_err() {
            return Err(ShieldError::CircuitOpen {
                endpoint: self.endpoint_label.clone(),
            });
        }

        let _execution_permit = match self.bulkhead.acquire().await {
            Ok(permit) => permit,
            Err(()) => {
                // El rechazo del compartimiento cuenta como fallo del enlace.
                self.circuit.record_failure().await;
                return Err(ShieldError::BulkheadFull {
                    endpoint: self.endpoint_label.clone(),
                    queue_size: self.bulkhead.queue_size(),
                });
            }
        };

        match with_deadline(&self.endpoint_label, self.call_timeout, operation).await {
            Ok(Ok(value)) => {
                self.circuit.record_success().await;
                Ok(value)
            }
            Ok(Err(inner_fault)) => {
                self.circuit.record_failure().await;
                Err(ShieldError::Inner(inner_fault))
            }
            Err(()) => {
                self.circuit.record_failure().await;
                Err(ShieldError::Timeout {
                    endpoint: self.endpoint_label.clone(),
                    timeout_seconds: self.call_timeout.as_secs(),
                })
            }
        }
    }
}
