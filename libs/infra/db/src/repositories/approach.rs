// [libs/infra/db/src/repositories/approach.rs]
/*!
 * =================================================================
 * APARATO: CLOSE APPROACH REPOSITORY (V1.4 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: PERSISTENCIA DE ENCUENTROS Y PODA TEMPORAL
 *
 * Clave natural: [asteroid_id, approach_time]. La poda de encuentros
 * pasados y la de encuentros más allá del horizonte corren como
 * sentencias independientes: cada una sella o revierte por su cuenta.
 * =================================================================
 */

use crate::errors::DbError;
use crate::filters::{FilterCondition, FilterOp, FilterValue};
use crate::repositories::base::{ConflictAction, Repository};
use crate::entities::BoundApproachRecord;
use crate::uow::Session;
use centinela_domain_models::CloseApproach;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, instrument};

/// Semilla de evaluación de amenaza: un encuentro sin evaluación,
/// enriquecido con los físicos del asteroide propietario.
#[derive(Debug, Clone)]
pub struct ThreatSeed {
    pub asteroid_id: i64,
    pub designation: String,
    pub asteroid_name: Option<String>,
    pub estimated_diameter_km: f64,
    pub velocity_km_s: f64,
    pub absolute_magnitude: f64,
}

pub struct ApproachRepository {
    session: Arc<Session>,
    core: Repository<CloseApproach>,
}

impl ApproachRepository {
    pub(crate) fn new(session: Arc<Session>) -> Self {
        Self {
            core: Repository::new(session.clone()),
            session,
        }
    }

    /// Operaciones genéricas (CRUD, filtro, búsqueda) de la entidad.
    pub fn core(&self) -> &Repository<CloseApproach> {
        &self.core
    }

    /// Upsert masivo por clave natural (asteroid_id, approach_time).
    #[instrument(skip(self, bound_records), fields(count = bound_records.len()))]
    pub async fn bulk_upsert_window(
        &self,
        bound_records: &[BoundApproachRecord],
    ) -> Result<(u64, u64), DbError> {
        self.core
            .bulk_upsert(bound_records, ConflictAction::Update)
            .await
    }

    /// Poda de encuentros anteriores al corte. Transacción propia.
    pub async fn delete_past(&self, cutoff: DateTime<Utc>) -> Result<u64, DbError> {
        let deleted = self
            .core
            .bulk_delete(&[FilterCondition::new(
                "approach_time",
                FilterOp::Lt,
                FilterValue::from(cutoff),
            )])
            .await?;

        info!("🗑️ [PRUNE]: {} past approaches removed.", deleted);
        Ok(deleted)
    }

    /// Poda de encuentros más allá del horizonte. Transacción propia.
    pub async fn delete_beyond_horizon(&self, cutoff: DateTime<Utc>) -> Result<u64, DbError> {
        let deleted = self
            .core
            .bulk_delete(&[FilterCondition::new(
                "approach_time",
                FilterOp::Gt,
                FilterValue::from(cutoff),
            )])
            .await?;

        info!("🗑️ [PRUNE]: {} far-future approaches removed.", deleted);
        Ok(deleted)
    }

    /**
     * Encuentros sin evaluación de amenaza, enriquecidos con los
     * físicos del asteroide en UNA consulta con join.
     */
    pub async fn threat_seeds(&self) -> Result<Vec<ThreatSeed>, DbError> {
        let connection = self.session.connection()?;

        let sql = r#"
            SELECT
                ca.asteroid_id,
                ca.asteroid_designation,
                a.name,
                a.estimated_diameter_km,
                ca.velocity_km_s,
                a.absolute_magnitude
            FROM close_approaches ca
            JOIN asteroids a ON a.id = ca.asteroid_id
            WHERE NOT EXISTS (
                SELECT 1 FROM threat_assessments t WHERE t.asteroid_id = ca.asteroid_id
            )
            ORDER BY ca.asteroid_id, ca.approach_time
        "#;

        let mut rows = connection
            .query(sql, ())
            .await
            .map_err(DbError::QueryError)?;

        let mut seeds = Vec::new();
        while let Some(row) = rows.next().await.map_err(DbError::QueryError)? {
            seeds.push(ThreatSeed {
                asteroid_id: row.get::<i64>(0).map_err(DbError::QueryError)?,
                designation: row.get::<String>(1).map_err(DbError::QueryError)?,
                asteroid_name: row.get::<Option<String>>(2).map_err(DbError::QueryError)?,
                estimated_diameter_km: row.get::<f64>(3).map_err(DbError::QueryError)?,
                velocity_km_s: row.get::<f64>(4).map_err(DbError::QueryError)?,
                absolute_magnitude: row.get::<f64>(5).map_err(DbError::QueryError)?,
            });
        }

        Ok(seeds)
    }
}
