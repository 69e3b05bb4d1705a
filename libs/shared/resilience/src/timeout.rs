// [libs/shared/resilience/src/timeout.rs]
/*!
 * =================================================================
 * APARATO: DEADLINE WRAPPER (V1.1 - SOBERANO)
 * CLASIFICACIÓN: SHARED UTILITY (ESTRATO L4)
 * RESPONSABILIDAD: CANCELACIÓN DE LLAMADAS QUE EXCEDEN SU PLAZO
 * =================================================================
 */

use std::future::Future;
use std::time::Duration;
use tracing::warn;

/**
 * Ejecuta la operación bajo un plazo máximo. Al expirar, el futuro
 * interno se cancela por caída y se devuelve `Err(())` como veredicto
 * de timeout; el envoltorio exterior lo traduce a su catálogo.
 */
pub async fn with_deadline<T, F>(
    endpoint_label: &str,
    deadline: Duration,
    operation: F,
) -> Result<T, ()>
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(deadline, operation).await {
        Ok(outcome) => Ok(outcome),
        Err(_elapsed) => {
            warn!(
                "⏱️ [DEADLINE]: Endpoint [{}] exceeded {}s budget. Call cancelled.",
                endpoint_label,
                deadline.as_secs()
            );
            Err(())
        }
    }
}
