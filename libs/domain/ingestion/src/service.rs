// [libs/domain/ingestion/src/service.rs]
/*!
 * =================================================================
 * APARATO: DATA UPDATE SERVICE (V1.2 - SOBERANO)
 * CLASIFICACIÓN: DOMAIN SERVICE (ESTRATO L2)
 * RESPONSABILIDAD: EJECUCIÓN DEL CICLO DIARIO Y SINCRONIZACIÓN DE RIESGO
 *
 * Disciplina de fallos: un fallo en las etapas 1–6 aborta la corrida y
 * produce el reporte de error; las dos sentencias de poda de la etapa
 * 7 corren en transacciones independientes y un fallo parcial no
 * deshace lo sellado antes. Dos corridas nunca deben ejecutarse en
 * paralelo (lo garantiza el llamador).
 * =================================================================
 */

use crate::config::IngestionConfig;
use crate::report::{
    ApproachCounters, AsteroidCounters, PerformanceCounters, PruneCounters, ReportTimestamps,
    ThreatSyncReport, UpdateReport, UpdateStatus,
};
use centinela_domain_models::{chronos, ApproachRecord, AsteroidRecord, ThreatRecord};
use centinela_infra_db::{
    BoundApproachRecord, BoundThreatRecord, CatalogClient, DbError, ThreatSeed, UnitOfWork,
};
use centinela_infra_feeds::{
    ApproachWindow, CloseApproachClient, FeedError, ImpactRiskClient, SmallBodyClient,
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

/// Fallos internos del pipeline (traducidos al reporte en la frontera).
#[derive(Debug, thiserror::Error)]
pub enum IngestionError {
    #[error("[L2_INGESTION_FEED_FAULT]: {0}")]
    Feed(#[from] FeedError),

    #[error("[L2_INGESTION_DB_FAULT]: {0}")]
    Database(#[from] DbError),
}

/// Regla de admisión de un encuentro al catálogo: la cota exacta se
/// acepta; más allá de ella, el registro se descarta.
pub fn distance_within_limit(distance_au: f64, max_distance_au: f64) -> bool {
    distance_au <= max_distance_au
}

/// Servicio del ciclo diario de actualización del catálogo.
pub struct DataUpdateService {
    catalog_client: CatalogClient,
    small_body_client: Arc<SmallBodyClient>,
    close_approach_client: Arc<CloseApproachClient>,
    impact_risk_client: Arc<ImpactRiskClient>,
    configuration: IngestionConfig,
}

impl DataUpdateService {
    pub fn new(
        catalog_client: CatalogClient,
        small_body_client: Arc<SmallBodyClient>,
        close_approach_client: Arc<CloseApproachClient>,
        impact_risk_client: Arc<ImpactRiskClient>,
        configuration: IngestionConfig,
    ) -> Self {
        info!(
            "🧭 [UPDATE_SERVICE]: Initialized (max_asteroids={}, workers={}).",
            configuration.max_asteroids_per_run, configuration.worker_count
        );
        Self {
            catalog_client,
            small_body_client,
            close_approach_client,
            impact_risk_client,
            configuration,
        }
    }

    /**
     * Ejecuta el ciclo completo de actualización diaria.
     *
     * Nunca propaga error: todo desenlace, limpio o abortado, sale como
     * reporte estructurado con el identificador de corrida.
     */
    #[instrument(skip(self))]
    pub async fn run_daily_update(&self) -> UpdateReport {
        let execution_timer = Instant::now();
        let started_at = chronos::now_utc();
        let update_id = format!("update_{}", started_at.format("%Y%m%d_%H%M%S"));

        info!(run_id = %update_id, "🚀 [PIPELINE]: Daily update ignition.");

        match self
            .execute_pipeline(&update_id, started_at, execution_timer)
            .await
        {
            Ok(report) => {
                info!(
                    run_id = %update_id,
                    "✅ [PIPELINE]: Run sealed in {:.2}s ({} PHA, {} approaches saved).",
                    report.duration_seconds,
                    report.asteroids.pha_count,
                    report.approaches.saved
                );
                report
            }
            Err(fault) => {
                error!(run_id = %update_id, "❌ [PIPELINE]: Run aborted: {}", fault);
                UpdateReport::failed(&update_id, started_at, fault.to_string())
            }
        }
    }

    async fn execute_pipeline(
        &self,
        update_id: &str,
        started_at: DateTime<Utc>,
        execution_timer: Instant,
    ) -> Result<UpdateReport, IngestionError> {
        // --- ETAPA 1: FETCH DEL LISTADO DE CUERPOS MENORES ---
        info!(run_id = %update_id, "📥 [STAGE 1]: Fetching small-body listing...");
        let listed_records = self
            .small_body_client
            .fetch_hazardous(self.configuration.list_limit)
            .await?;

        if listed_records.is_empty() {
            warn!(run_id = %update_id, "📥 [STAGE 1]: Empty upstream listing. Clean exit.");
            return Ok(UpdateReport::empty(update_id, started_at, 0));
        }

        // --- ETAPA 2: FILTRO PHA (MOID < 0.05 UA) ---
        info!(run_id = %update_id, "🎯 [STAGE 2]: Filtering potentially hazardous bodies...");
        let pha_records: Vec<AsteroidRecord> = listed_records
            .iter()
            .filter(|record| record.is_potentially_hazardous())
            .cloned()
            .collect();

        info!(
            run_id = %update_id,
            "🎯 [STAGE 2]: {} PHA out of {} listed bodies.",
            pha_records.len(),
            listed_records.len()
        );

        if pha_records.is_empty() {
            return Ok(UpdateReport::empty(update_id, started_at, listed_records.len()));
        }

        // --- ETAPA 3: UPSERT DE ASTEROIDES ---
        info!(run_id = %update_id, "💾 [STAGE 3]: Upserting asteroid catalog...");
        let (created_asteroids, updated_asteroids) = {
            let uow = UnitOfWork::begin(&self.catalog_client).await?;
            let counters = uow.asteroid_repo().bulk_upsert_catalog(&pha_records).await?;
            uow.commit().await?;
            counters
        };
        info!(
            run_id = %update_id,
            "💾 [STAGE 3]: Created {}, updated {}.",
            created_asteroids, updated_asteroids
        );

        // --- ETAPA 4: CÁLCULO CONCURRENTE DE ENCUENTROS ---
        info!(run_id = %update_id, "🔄 [STAGE 4]: Computing close approaches...");
        let (approach_records, malformed_records) =
            self.compute_approaches(update_id, &pha_records).await;
        info!(
            run_id = %update_id,
            "🔄 [STAGE 4]: {} approaches within {} AU ({} malformed rows dropped).",
            approach_records.len(),
            self.configuration.max_distance_au,
            malformed_records
        );

        // --- ETAPA 5: UPSERT DE ENCUENTROS ---
        info!(run_id = %update_id, "💿 [STAGE 5]: Saving close approaches...");
        let (saved_approaches, skipped_unresolved) =
            self.save_approaches(update_id, &approach_records).await?;

        // --- ETAPA 6: CÁLCULO Y UPSERT DE AMENAZAS ---
        info!(run_id = %update_id, "⚠️ [STAGE 6]: Computing threat assessments...");
        let approaches_with_threats = self.compute_and_save_threats(update_id).await?;

        // --- ETAPA 7: PODA EN TRANSACCIONES INDEPENDIENTES ---
        info!(run_id = %update_id, "🗑️ [STAGE 7]: Pruning stale approaches...");
        let cleanup = self.prune_stale_approaches(update_id).await;

        // --- ETAPA 8: REPORTE ---
        let duration_seconds = execution_timer.elapsed().as_secs_f64();
        let processed_asteroids = created_asteroids + updated_asteroids;

        Ok(UpdateReport {
            update_id: update_id.to_string(),
            status: UpdateStatus::Success,
            error: None,
            duration_seconds,
            asteroids: AsteroidCounters {
                total: listed_records.len(),
                pha_count: pha_records.len(),
                created: created_asteroids,
                updated: updated_asteroids,
            },
            approaches: ApproachCounters {
                computed: approach_records.len(),
                saved: saved_approaches,
                with_threats: approaches_with_threats,
                malformed_records,
                skipped_unresolved,
            },
            cleanup,
            timestamps: ReportTimestamps {
                start: chronos::at_boundary(&started_at),
                end: chronos::at_boundary(&chronos::now_utc()),
            },
            performance: PerformanceCounters {
                asteroids_per_second: processed_asteroids as f64 / duration_seconds.max(0.001),
            },
        })
    }

    /**
     * Etapa 4: reparte los asteroides (acotados por corrida) entre el
     * pool de workers; cada worker honra la pausa mínima entre llamadas.
     * Los fallos por asteroide degradan a resultado parcial: la etapa
     * es de sólo lectura y la corrida continúa con lo obtenido.
     */
    async fn compute_approaches(
        &self,
        update_id: &str,
        pha_records: &[AsteroidRecord],
    ) -> (Vec<ApproachRecord>, usize) {
        let capped_count = self
            .configuration
            .max_asteroids_per_run
            .min(pha_records.len());
        let designations: Vec<String> = pha_records[..capped_count]
            .iter()
            .map(|record| record.designation.clone())
            .collect();

        info!(
            run_id = %update_id,
            "🔄 [STAGE 4]: {} of {} asteroids scheduled across {} workers.",
            capped_count,
            pha_records.len(),
            self.configuration.worker_count
        );

        let worker_count = self.configuration.worker_count.max(1);
        let chunk_size = designations.len().div_ceil(worker_count).max(1);

        let mut worker_handles = Vec::new();
        for worker_chunk in designations.chunks(chunk_size) {
            let chunk: Vec<String> = worker_chunk.to_vec();
            let client = Arc::clone(&self.close_approach_client);
            let inter_call_delay = self.configuration.inter_call_delay;
            let window_days = self.configuration.approach_window_days;
            let max_distance_au = self.configuration.max_distance_au;
            let run_id = update_id.to_string();

            worker_handles.push(tokio::spawn(async move {
                let mut chunk_records: Vec<ApproachRecord> = Vec::new();
                let mut chunk_malformed = 0usize;

                for (call_index, designation) in chunk.iter().enumerate() {
                    if call_index > 0 {
                        tokio::time::sleep(inter_call_delay).await;
                    }

                    let window = ApproachWindow::next_days(window_days);
                    let single = std::slice::from_ref(designation);

                    match client.fetch_approaches(Some(single), window, max_distance_au).await {
                        Ok(parsed) => {
                            chunk_malformed += parsed.skipped_malformed;
                            for records in parsed.by_designation.into_values() {
                                for record in records {
                                    if distance_within_limit(record.distance_au, max_distance_au) {
                                        chunk_records.push(record);
                                    }
                                }
                            }
                        }
                        Err(fault) => {
                            warn!(
                                run_id = %run_id,
                                "🔄 [STAGE 4]: Lookup degraded for [{}]: {}",
                                designation, fault
                            );
                        }
                    }
                }

                (chunk_records, chunk_malformed)
            }));
        }

        let mut merged_records: Vec<ApproachRecord> = Vec::new();
        let mut total_malformed = 0usize;

        for handle in worker_handles {
            match handle.await {
                Ok((chunk_records, chunk_malformed)) => {
                    merged_records.extend(chunk_records);
                    total_malformed += chunk_malformed;
                }
                Err(join_fault) => {
                    error!(
                        run_id = %update_id,
                        "🔄 [STAGE 4]: Worker collapsed: {}",
                        join_fault
                    );
                }
            }
        }

        (merged_records, total_malformed)
    }

    /**
     * Etapa 5: resolución referencial en UNA pasada por ráfagas, sello
     * de 'calculation_batch_id' y upsert por clave natural. Los
     * encuentros de asteroides ausentes se saltan y reportan.
     */
    async fn save_approaches(
        &self,
        update_id: &str,
        approach_records: &[ApproachRecord],
    ) -> Result<(u64, usize), IngestionError> {
        if approach_records.is_empty() {
            return Ok((0, 0));
        }

        let uow = UnitOfWork::begin(&self.catalog_client).await?;

        let designations: Vec<String> = approach_records
            .iter()
            .map(|record| record.asteroid_designation.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let resolution = uow
            .asteroid_repo()
            .map_designations_to_ids(&designations)
            .await?;

        let mut bound_records: Vec<BoundApproachRecord> = Vec::new();
        let mut unresolved: HashSet<String> = HashSet::new();

        for record in approach_records {
            match resolution.get(&record.asteroid_designation) {
                Some(asteroid_id) => bound_records.push(BoundApproachRecord {
                    asteroid_id: *asteroid_id,
                    calculation_batch_id: Some(update_id.to_string()),
                    record: record.clone(),
                }),
                None => {
                    unresolved.insert(record.asteroid_designation.clone());
                }
            }
        }

        if !unresolved.is_empty() {
            warn!(
                run_id = %update_id,
                "💿 [STAGE 5]: {} designations absent from catalog, approaches skipped: {:?}",
                unresolved.len(),
                unresolved
            );
        }
        let skipped_unresolved = approach_records.len() - bound_records.len();

        let (created, updated) = uow
            .approach_repo()
            .bulk_upsert_window(&bound_records)
            .await?;
        uow.commit().await?;

        let saved = created + updated;
        info!(run_id = %update_id, "💿 [STAGE 5]: {} approaches sealed.", saved);
        Ok((saved, skipped_unresolved))
    }

    /**
     * Etapa 6: un asteroide con encuentros y sin evaluación recibe una
     * evaluación derivada de sus físicos, acumulada en ráfagas.
     */
    async fn compute_and_save_threats(&self, update_id: &str) -> Result<u64, IngestionError> {
        let uow = UnitOfWork::begin(&self.catalog_client).await?;
        let seeds = uow.approach_repo().threat_seeds().await?;

        if seeds.is_empty() {
            uow.commit().await?;
            return Ok(0);
        }

        // Una evaluación por cuerpo: la primera semilla (encuentro más
        // temprano) representa al asteroide.
        let mut seen_asteroids: HashSet<i64> = HashSet::new();
        let unique_seeds: Vec<ThreatSeed> = seeds
            .into_iter()
            .filter(|seed| seen_asteroids.insert(seed.asteroid_id))
            .collect();

        let mut sealed_total: u64 = 0;
        for chunk in unique_seeds.chunks(self.configuration.threat_chunk_size) {
            let bound_chunk: Vec<BoundThreatRecord> = chunk
                .iter()
                .map(|seed| {
                    BoundThreatRecord::new(
                        seed.asteroid_id,
                        ThreatRecord {
                            designation: seed.designation.clone(),
                            fullname: seed
                                .asteroid_name
                                .clone()
                                .unwrap_or_else(|| seed.designation.clone()),
                            ip: 0.0,
                            ts_max: 0,
                            ps_max: -10.0,
                            diameter: seed.estimated_diameter_km.max(0.0),
                            v_inf: seed.velocity_km_s.max(0.0),
                            h: seed.absolute_magnitude.max(0.0),
                            n_imp: 0,
                            impact_years: Vec::new(),
                            last_obs: String::new(),
                            threat_level: None,
                            energy_megatons: None,
                            impact_category: None,
                        },
                    )
                })
                .collect();

            let (created, updated) = uow
                .threat_repo()
                .bulk_upsert_assessments(&bound_chunk)
                .await?;
            sealed_total += created + updated;
        }

        uow.commit().await?;
        info!(
            run_id = %update_id,
            "⚠️ [STAGE 6]: {} derived assessments sealed.",
            sealed_total
        );
        Ok(sealed_total)
    }

    /**
     * Etapa 7: DOS transacciones independientes. Un fallo en una poda
     * queda en el log y no deshace la otra ni las etapas previas.
     */
    async fn prune_stale_approaches(&self, update_id: &str) -> PruneCounters {
        let mut counters = PruneCounters::default();
        let now = chronos::now_utc();

        // Poda 1: encuentros ya ocurridos (más de un día en el pasado).
        match self.prune_past(now - ChronoDuration::days(1)).await {
            Ok(deleted) => counters.deleted_past_approaches = deleted,
            Err(fault) => {
                error!(run_id = %update_id, "🗑️ [STAGE 7]: Past prune failed: {}", fault);
            }
        }

        // Poda 2: encuentros más allá del horizonte de diez años.
        match self
            .prune_beyond_horizon(now + ChronoDuration::days(3650))
            .await
        {
            Ok(deleted) => counters.deleted_future_approaches = deleted,
            Err(fault) => {
                error!(run_id = %update_id, "🗑️ [STAGE 7]: Horizon prune failed: {}", fault);
            }
        }

        counters
    }

    async fn prune_past(&self, cutoff: DateTime<Utc>) -> Result<u64, IngestionError> {
        let uow = UnitOfWork::begin(&self.catalog_client).await?;
        let deleted = uow.approach_repo().delete_past(cutoff).await?;
        uow.commit().await?;
        Ok(deleted)
    }

    async fn prune_beyond_horizon(&self, cutoff: DateTime<Utc>) -> Result<u64, IngestionError> {
        let uow = UnitOfWork::begin(&self.catalog_client).await?;
        let deleted = uow.approach_repo().delete_beyond_horizon(cutoff).await?;
        uow.commit().await?;
        Ok(deleted)
    }

    /**
     * Sincroniza el catálogo de amenazas con el feed de riesgo de
     * impacto: los resúmenes río arriba sustituyen a los derivados
     * localmente (upsert por asteroide propietario).
     */
    #[instrument(skip(self))]
    pub async fn sync_impact_risks(&self) -> Result<ThreatSyncReport, IngestionError> {
        let risk_records = self.impact_risk_client.fetch_all().await?;

        if risk_records.is_empty() {
            info!("☄️ [THREAT_SYNC]: No upstream risk summaries. Nothing to seal.");
            return Ok(ThreatSyncReport {
                fetched: 0,
                saved: 0,
                skipped_unresolved: 0,
            });
        }

        let uow = UnitOfWork::begin(&self.catalog_client).await?;

        let designations: Vec<String> = risk_records
            .iter()
            .map(|record| record.designation.clone())
            .collect();
        let resolution = uow
            .asteroid_repo()
            .map_designations_to_ids(&designations)
            .await?;

        let mut bound_records: Vec<BoundThreatRecord> = Vec::new();
        let mut skipped_unresolved = 0usize;

        for record in &risk_records {
            match resolution.get(&record.designation) {
                Some(asteroid_id) => {
                    bound_records.push(BoundThreatRecord::new(*asteroid_id, record.clone()));
                }
                None => skipped_unresolved += 1,
            }
        }

        if skipped_unresolved > 0 {
            warn!(
                "☄️ [THREAT_SYNC]: {} summaries skipped (body absent from catalog).",
                skipped_unresolved
            );
        }

        let mut saved: u64 = 0;
        for chunk in bound_records.chunks(self.configuration.threat_chunk_size) {
            let (created, updated) = uow.threat_repo().bulk_upsert_assessments(chunk).await?;
            saved += created + updated;
        }
        uow.commit().await?;

        info!(
            "☄️ [THREAT_SYNC]: {} risk summaries sealed ({} fetched).",
            saved,
            risk_records.len()
        );

        Ok(ThreatSyncReport {
            fetched: risk_records.len(),
            saved,
            skipped_unresolved,
        })
    }
}
