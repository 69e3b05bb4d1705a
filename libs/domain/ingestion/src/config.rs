// [libs/domain/ingestion/src/config.rs]
/*!
 * =================================================================
 * APARATO: INGESTION TUNING CONFIG (V1.2 - SOBERANO)
 * CLASIFICACIÓN: DOMAIN SERVICE (ESTRATO L2)
 * RESPONSABILIDAD: SINTONÍA OPERATIVA DE LA CORRIDA DIARIA
 *
 * Los topes por corrida y el tamaño del pool de workers son valores de
 * sintonía, no contrato: el shell de aplicación puede sustituirlos
 * desde el entorno o la línea de comandos.
 * =================================================================
 */

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct IngestionConfig {
    /// Tope del listado de cuerpos menores; None delega en el cliente.
    pub list_limit: Option<u32>,
    /// Asteroides procesados por corrida en la etapa de encuentros.
    pub max_asteroids_per_run: usize,
    /// Workers concurrentes de la etapa de encuentros.
    pub worker_count: usize,
    /// Pausa mínima entre llamadas consecutivas dentro de un worker.
    pub inter_call_delay: Duration,
    /// Ventana de predicción de encuentros, en días.
    pub approach_window_days: i64,
    /// Distancia máxima aceptada para catalogar un encuentro, en UA.
    pub max_distance_au: f64,
    /// Tamaño de ráfaga para el upsert de evaluaciones de amenaza.
    pub threat_chunk_size: usize,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            list_limit: None,
            max_asteroids_per_run: 50,
            worker_count: 3,
            inter_call_delay: Duration::from_secs(2),
            approach_window_days: 3650,
            max_distance_au: 1.0,
            threat_chunk_size: 100,
        }
    }
}
