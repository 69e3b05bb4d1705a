// [libs/infra/db/src/repositories/threat.rs]
/*!
 * =================================================================
 * APARATO: THREAT ASSESSMENT REPOSITORY (V1.4 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: PERSISTENCIA UNO-A-UNO DE EVALUACIONES DE AMENAZA
 *
 * Clave natural: [asteroid_id]. Un asteroide, una evaluación; el
 * upsert colapsa semillas repetidas del mismo cuerpo sobre la fila
 * existente.
 * =================================================================
 */

use crate::entities::BoundThreatRecord;
use crate::errors::DbError;
use crate::filters::FilterValue;
use crate::repositories::base::{ConflictAction, Repository};
use crate::uow::Session;
use centinela_domain_models::ThreatAssessment;
use std::sync::Arc;
use tracing::instrument;

pub struct ThreatRepository {
    core: Repository<ThreatAssessment>,
}

impl ThreatRepository {
    pub(crate) fn new(session: Arc<Session>) -> Self {
        Self {
            core: Repository::new(session),
        }
    }

    /// Operaciones genéricas (CRUD, filtro, búsqueda) de la entidad.
    pub fn core(&self) -> &Repository<ThreatAssessment> {
        &self.core
    }

    /// Upsert masivo de evaluaciones por asteroide propietario.
    #[instrument(skip(self, bound_records), fields(count = bound_records.len()))]
    pub async fn bulk_upsert_assessments(
        &self,
        bound_records: &[BoundThreatRecord],
    ) -> Result<(u64, u64), DbError> {
        self.core
            .bulk_upsert(bound_records, ConflictAction::Update)
            .await
    }

    /// Lectura por designación del cuerpo evaluado.
    pub async fn find_by_designation(
        &self,
        designation: &str,
    ) -> Result<Option<ThreatAssessment>, DbError> {
        self.core
            .find_by_fields(&[("designation", FilterValue::from(designation))])
            .await
    }

    /// Lectura por asteroide propietario (relación uno-a-uno).
    pub async fn find_by_asteroid_id(
        &self,
        asteroid_id: i64,
    ) -> Result<Option<ThreatAssessment>, DbError> {
        self.core
            .find_by_fields(&[("asteroid_id", FilterValue::from(asteroid_id))])
            .await
    }
}
