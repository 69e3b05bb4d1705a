// [libs/domain/ingestion/src/lib.rs]
/*!
 * =================================================================
 * APARATO: DAILY INGESTION PIPELINE (V1.2 - SOBERANO)
 * CLASIFICACIÓN: DOMAIN SERVICE (ESTRATO L2)
 * RESPONSABILIDAD: CICLO DIARIO DE ACTUALIZACIÓN DEL CATÁLOGO PHA
 *
 * Etapas de la corrida: fetch del listado de cuerpos menores, filtro
 * PHA, upsert de asteroides, cálculo concurrente de encuentros, upsert
 * de encuentros con resolución referencial, cálculo y upsert de
 * amenazas, poda en transacciones independientes y reporte
 * estructurado. Re-ejecutar con los mismos datos río arriba produce
 * cero cambios netos.
 * =================================================================
 */

pub mod config;
pub mod report;
pub mod service;

pub use config::IngestionConfig;
pub use report::{
    ApproachCounters, AsteroidCounters, PerformanceCounters, PruneCounters, ReportTimestamps,
    ThreatSyncReport, UpdateReport, UpdateStatus,
};
pub use service::{distance_within_limit, DataUpdateService, IngestionError};
