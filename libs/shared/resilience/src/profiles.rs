// [libs/shared/resilience/src/profiles.rs]
/*!
 * =================================================================
 * APARATO: ENDPOINT RESILIENCE PROFILES (V1.1 - SOBERANO)
 * CLASIFICACIÓN: SHARED UTILITY (ESTRATO L4)
 * RESPONSABILIDAD: CALIBRACIÓN POR ENDPOINT DE LAS PRIMITIVAS DE PROTECCIÓN
 *
 * Perfiles sintonizados a los límites operativos de cada fuente: el
 * enlace de cuerpos menores tolera la mayor concurrencia; el de riesgo
 * de impacto, cálculos costosos, recibe la menor concurrencia y el
 * plazo más holgado.
 * =================================================================
 */

use crate::bulkhead::BulkheadConfig;
use crate::circuit_breaker::CircuitBreakerConfig;
use std::time::Duration;

/// Calibración completa de protección para un enlace externo.
#[derive(Debug, Clone, Copy)]
pub struct EndpointProfile {
    pub endpoint_label: &'static str,
    pub circuit: CircuitBreakerConfig,
    pub bulkhead: BulkheadConfig,
    pub call_timeout: Duration,
}

impl EndpointProfile {
    /// Sustituye el plazo de llamada (sintonía por configuración externa).
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Perfil del feed de cuerpos menores (listado + detalle físico).
    pub fn small_body() -> Self {
        Self {
            endpoint_label: "small_body",
            circuit: CircuitBreakerConfig::default(),
            bulkhead: BulkheadConfig {
                max_concurrent: 5,
                queue_size: 20,
            },
            call_timeout: Duration::from_secs(30),
        }
    }

    /// Perfil del feed de encuentros cercanos (consulta de ventana).
    pub fn close_approach() -> Self {
        Self {
            endpoint_label: "close_approach",
            circuit: CircuitBreakerConfig::default(),
            bulkhead: BulkheadConfig {
                max_concurrent: 3,
                queue_size: 15,
            },
            call_timeout: Duration::from_secs(60),
        }
    }

    /// Perfil del feed de riesgo de impacto (cálculos lentos río arriba).
    pub fn impact_risk() -> Self {
        Self {
            endpoint_label: "impact_risk",
            circuit: CircuitBreakerConfig::default(),
            bulkhead: BulkheadConfig {
                max_concurrent: 2,
                queue_size: 10,
            },
            call_timeout: Duration::from_secs(120),
        }
    }
}
