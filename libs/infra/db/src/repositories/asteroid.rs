// [libs/infra/db/src/repositories/asteroid.rs]
/*!
 * =================================================================
 * APARATO: ASTEROID REPOSITORY (V1.4 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: PERSISTENCIA DEL CUERPO MENOR Y RESOLUCIÓN DE IDENTIDAD
 *
 * Clave natural: [designation]. El mapa designación → identidad se
 * resuelve en UNA pasada por ráfagas para el enlace referencial de
 * encuentros y amenazas.
 * =================================================================
 */

use crate::errors::DbError;
use crate::filters::FilterValue;
use crate::repositories::base::{ConflictAction, Repository};
use crate::uow::Session;
use centinela_domain_models::{Asteroid, AsteroidRecord};
use libsql::params::Params;
use libsql::Value as SqlValue;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

/// Tamaño de ráfaga para la resolución designación → identidad.
const RESOLUTION_CHUNK_SIZE: usize = 200;

pub struct AsteroidRepository {
    session: Arc<Session>,
    core: Repository<Asteroid>,
}

impl AsteroidRepository {
    pub(crate) fn new(session: Arc<Session>) -> Self {
        Self {
            core: Repository::new(session.clone()),
            session,
        }
    }

    /// Operaciones genéricas (CRUD, filtro, búsqueda) de la entidad.
    pub fn core(&self) -> &Repository<Asteroid> {
        &self.core
    }

    /**
     * Upsert masivo del catálogo por designación.
     *
     * Los registros pasan por el saneamiento de construcción antes del
     * binding: ningún valor fuera de dominio alcanza los CHECK.
     */
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub async fn bulk_upsert_catalog(
        &self,
        records: &[AsteroidRecord],
    ) -> Result<(u64, u64), DbError> {
        let sanitized: Vec<AsteroidRecord> = records
            .iter()
            .map(|record| record.clone().sanitized())
            .collect();

        self.core.bulk_upsert(&sanitized, ConflictAction::Update).await
    }

    /// Lectura por designación (clave natural).
    pub async fn find_by_designation(
        &self,
        designation: &str,
    ) -> Result<Option<Asteroid>, DbError> {
        self.core
            .find_by_fields(&[("designation", FilterValue::from(designation))])
            .await
    }

    /**
     * Resolución designación → identidad en ráfagas (una consulta por
     * ráfaga, no por registro).
     */
    pub async fn map_designations_to_ids(
        &self,
        designations: &[String],
    ) -> Result<HashMap<String, i64>, DbError> {
        let connection = self.session.connection()?;
        let mut resolution: HashMap<String, i64> = HashMap::new();

        for chunk in designations.chunks(RESOLUTION_CHUNK_SIZE) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!(
                "SELECT designation, id FROM asteroids WHERE designation IN ({})",
                placeholders
            );

            let bound_values: Vec<SqlValue> = chunk
                .iter()
                .map(|designation| SqlValue::Text(designation.clone()))
                .collect();

            let mut rows = connection
                .query(&sql, Params::Positional(bound_values))
                .await
                .map_err(DbError::QueryError)?;

            while let Some(row) = rows.next().await.map_err(DbError::QueryError)? {
                let designation = row.get::<String>(0).map_err(DbError::QueryError)?;
                let id = row.get::<i64>(1).map_err(DbError::QueryError)?;
                resolution.insert(designation, id);
            }
        }

        Ok(resolution)
    }
}
