// [libs/domain/ingestion/src/report.rs]
/*!
 * =================================================================
 * APARATO: INGESTION RUN REPORT (V1.2 - SOBERANO)
 * CLASIFICACIÓN: DOMAIN SERVICE (ESTRATO L2)
 * RESPONSABILIDAD: DESENLACE ESTRUCTURADO DE CADA CORRIDA
 * =================================================================
 */

use centinela_domain_models::chronos;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Veredicto terminal de la corrida.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UpdateStatus {
    Success,
    Error,
}

/// Contadores de la etapa de asteroides.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct AsteroidCounters {
    /// Cuerpos recibidos del listado de la fuente.
    pub total: usize,
    /// Cuerpos que superaron el filtro PHA.
    pub pha_count: usize,
    pub created: u64,
    pub updated: u64,
}

/// Contadores de la etapa de encuentros.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ApproachCounters {
    /// Encuentros calculados dentro de la distancia aceptada.
    pub computed: usize,
    /// Encuentros sellados en el Motor A (creados + actualizados).
    pub saved: u64,
    /// Encuentros cuyo asteroide recibió evaluación de amenaza.
    pub with_threats: u64,
    /// Filas descartadas por marca temporal o columna malformada.
    pub malformed_records: usize,
    /// Encuentros saltados por asteroide ausente del catálogo.
    pub skipped_unresolved: usize,
}

/// Contadores de la etapa de poda.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PruneCounters {
    pub deleted_past_approaches: u64,
    pub deleted_future_approaches: u64,
}

/// Frontera temporal de la corrida (ISO-8601 UTC).
#[derive(Debug, Clone, Serialize)]
pub struct ReportTimestamps {
    pub start: String,
    pub end: String,
}

/// Métricas de rendimiento de la corrida.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PerformanceCounters {
    pub asteroids_per_second: f64,
}

/// Reporte terminal de una corrida de actualización diaria.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateReport {
    pub update_id: String,
    pub status: UpdateStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_seconds: f64,
    pub asteroids: AsteroidCounters,
    pub approaches: ApproachCounters,
    pub cleanup: PruneCounters,
    pub timestamps: ReportTimestamps,
    pub performance: PerformanceCounters,
}

impl UpdateReport {
    /// Reporte de corrida sin datos río arriba (desenlace limpio).
    pub fn empty(update_id: &str, started_at: DateTime<Utc>, total_listed: usize) -> Self {
        Self {
            update_id: update_id.to_string(),
            status: UpdateStatus::Success,
            error: None,
            duration_seconds: 0.0,
            asteroids: AsteroidCounters {
                total: total_listed,
                ..AsteroidCounters::default()
            },
            approaches: ApproachCounters::default(),
            cleanup: PruneCounters::default(),
            timestamps: ReportTimestamps {
                start: chronos::at_boundary(&started_at),
                end: chronos::at_boundary(&chronos::now_utc()),
            },
            performance: PerformanceCounters::default(),
        }
    }

    /// Reporte de corrida abortada, con el único mensaje de error.
    pub fn failed(update_id: &str, started_at: DateTime<Utc>, error_message: String) -> Self {
        Self {
            update_id: update_id.to_string(),
            status: UpdateStatus::Error,
            error: Some(error_message),
            duration_seconds: (chronos::now_utc() - started_at).num_milliseconds() as f64 / 1000.0,
            asteroids: AsteroidCounters::default(),
            approaches: ApproachCounters::default(),
            cleanup: PruneCounters::default(),
            timestamps: ReportTimestamps {
                start: chronos::at_boundary(&started_at),
                end: chronos::at_boundary(&chronos::now_utc()),
            },
            performance: PerformanceCounters::default(),
        }
    }
}

/// Desenlace de la sincronización con el feed de riesgo de impacto.
#[derive(Debug, Clone, Serialize)]
pub struct ThreatSyncReport {
    pub fetched: usize,
    pub saved: u64,
    /// Resúmenes saltados por asteroide ausente del catálogo.
    pub skipped_unresolved: usize,
}
