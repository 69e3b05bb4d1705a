// [libs/shared/resilience/src/retry.rs]
/*!
 * =================================================================
 * APARATO: RETRY BACKOFF POLICY (V1.1 - SOBERANO)
 * CLASIFICACIÓN: SHARED UTILITY (ESTRATO L4)
 * RESPONSABILIDAD: CADENCIA DE REINTENTOS CON RETROCESO EXPONENCIAL
 *
 * La política vive DENTRO de los clientes, no como envoltorio del
 * guardián: sólo los fallos transitorios (red, timeout, HTTP 429/5xx)
 * se reintentan, y un 429 con 'Retry-After' impone su propia espera.
 * =================================================================
 */

use std::time::Duration;

/// Retroceso exponencial acotado: multiplier · 2^(intento−1),
/// recortado al rango [min_backoff, max_backoff].
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Intentos totales, incluida la llamada original.
    pub max_attempts: u32,
    pub backoff_multiplier: f64,
    pub min_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_multiplier: 1.0,
            min_backoff: Duration::from_secs(4),
            max_backoff: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Verdadero mientras queden intentos disponibles tras 'attempt'
    /// (numerado desde 1).
    pub fn allows_another_attempt(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Espera previa al reintento que sigue al intento 'attempt'.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let raw_seconds = self.backoff_multiplier * 2f64.powi(exponent as i32);
        let clamped_seconds = raw_seconds
            .max(self.min_backoff.as_secs_f64())
            .min(self.max_backoff.as_secs_f64());
        Duration::from_secs_f64(clamped_seconds)
    }
}
