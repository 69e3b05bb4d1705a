// [libs/shared/resilience/src/errors.rs]
/*!
 * =================================================================
 * APARATO: RESILIENCE ERROR CATALOG (V1.1 - SOBERANO)
 * CLASIFICACIÓN: SHARED UTILITY (ESTRATO L4)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE RECHAZOS DE PROTECCIÓN
 * =================================================================
 */

use std::fmt;
use thiserror::Error;

/// Veredicto de una llamada protegida por el guardián de endpoint.
///
/// Los tres primeros son rechazos de la capa de protección; 'Inner'
/// transporta el error del operador subyacente sin alterarlo.
#[derive(Error, Debug)]
pub enum ShieldError<E: fmt::Debug + fmt::Display> {
    /// El circuito está abierto y la llamada fue bloqueada sin ejecutarse.
    #[error("[L4_SHIELD_FAULT]: CIRCUIT_OPEN_CALL_BLOCKED -> endpoint [{endpoint}]")]
    CircuitOpen { endpoint: String },

    /// Semáforo y cola de espera saturados; la llamada fue rechazada.
    #[error("[L4_SHIELD_FAULT]: BULKHEAD_SATURATED -> endpoint [{endpoint}] (queue {queue_size})")]
    BulkheadFull { endpoint: String, queue_size: usize },

    /// La llamada superó el deadline del endpoint y fue cancelada.
    #[error("[L4_SHIELD_FAULT]: DEADLINE_EXCEEDED -> endpoint [{endpoint}] after {timeout_seconds}s")]
    Timeout {
        endpoint: String,
        timeout_seconds: u64,
    },

    /// Error del operador subyacente, propagado sin traducción.
    #[error("{0}")]
    Inner(E),
}

impl<E: fmt::Debug + fmt::Display> ShieldError<E> {
    /// Verdadero cuando el rechazo proviene de la capa de protección
    /// (circuito abierto o bulkhead saturado): no debe reintentarse.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            ShieldError::CircuitOpen { .. } | ShieldError::BulkheadFull { .. }
        )
    }
}
