// [libs/shared/resilience/src/bulkhead.rs]
/*!
 * =================================================================
 * APARATO: BULKHEAD ISOLATION (V1.1 - SOBERANO)
 * CLASIFICACIÓN: SHARED UTILITY (ESTRATO L4)
 * RESPONSABILIDAD: ACOTACIÓN DE CONCURRENCIA POR ENDPOINT EXTERNO
 *
 * Semáforo de 'max_concurrent' ranuras de ejecución más una cola de
 * espera acotada de 'queue_size' plazas. Con ambas estructuras llenas
 * la adquisición se rechaza sin esperar. Un esperador cancelado libera
 * su plaza de cola (RAII sobre el ticket).
 * =================================================================
 */

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::warn;

/// Capacidades del compartimiento.
#[derive(Debug, Clone, Copy)]
pub struct BulkheadConfig {
    /// Llamadas ejecutando simultáneamente.
    pub max_concurrent: usize,
    /// Esperadores admitidos cuando las ranuras están ocupadas.
    pub queue_size: usize,
}

impl Default for BulkheadConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 10,
            queue_size: 50,
        }
    }
}

/// Ticket de plaza en la cola de espera; su caída devuelve la plaza,
/// incluso si el esperador fue cancelado a mitad de la adquisición.
struct QueueTicket<'a> {
    queued_count: &'a AtomicUsize,
}

impl Drop for QueueTicket<'_> {
    fn drop(&mut self) {
        self.queued_count.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Compartimiento de aislamiento por endpoint. Estado compartido entre
/// todos los llamadores del mismo enlace externo.
pub struct Bulkhead {
    endpoint_label: String,
    configuration: BulkheadConfig,
    execution_slots: Arc<Semaphore>,
    queued_count: AtomicUsize,
}

impl Bulkhead {
    pub fn new(endpoint_label: &str, configuration: BulkheadConfig) -> Self {
        Self {
            endpoint_label: endpoint_label.to_string(),
            configuration,
            execution_slots: Arc::new(Semaphore::new(configuration.max_concurrent)),
            queued_count: AtomicUsize::new(0),
        }
    }

    /// Capacidad de cola configurada (para el mensaje de rechazo).
    pub fn queue_size(&self) -> usize {
        self.configuration.queue_size
    }

    /**
     * Adquiere una ranura de ejecución o una plaza de espera.
     *
     * `Err(())` señala saturación total: semáforo sin ranuras y cola
     * completa. El permiso devuelto libera la ranura al caer.
     */
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, ()> {
        // Camino rápido: ranura libre sin pasar por la cola.
        if let Ok(permit) = self.execution_slots.clone().try_acquire_owned() {
            return Ok(permit);
        }

        // Ranuras ocupadas: intentamos reservar plaza de espera.
        let waiting_before = self.queued_count.fetch_add(1, Ordering::SeqCst);
        let ticket = QueueTicket {
            queued_count: &self.queued_count,
        };

        if waiting_before >= self.configuration.queue_size {
            warn!(
                "🚧 [BULKHEAD]: Endpoint [{}] saturated ({} queued). Call rejected.",
                self.endpoint_label, self.configuration.queue_size
            );
            drop(ticket);
            return Err(());
        }

        let acquired = self.execution_slots.clone().acquire_owned().await;
        drop(ticket);

        // El semáforo sólo se cierra al derribar el proceso.
        acquired.map_err(|_| ())
    }
}
