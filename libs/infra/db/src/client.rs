// [libs/infra/db/src/client.rs]
/*!
 * =================================================================
 * APARATO: CATALOG DATABASE CLIENT (V1.4 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: GESTIÓN DE ENLACES AL MOTOR A Y BOOTSTRAP DEL ESQUEMA
 *
 * Soporta URLs locales, remotas (libsql:// o https:// con token) y de
 * memoria compartida. En modo memoria el cliente retiene una conexión
 * ancla que mantiene vivo el esquema entre conexiones del pool.
 * =================================================================
 */

use crate::errors::DbError;
use crate::schema::apply_catalog_schema;
use libsql::{Builder, Connection, Database};
use std::sync::Arc;
use tracing::{error, info, instrument};

#[derive(Clone)]
pub struct CatalogClient {
    internal_database_driver: Arc<Database>,
    /// Mantiene la base en memoria viva evitando que SQLite la purgue.
    _memory_persistence_anchor: Option<Arc<Connection>>,
}

impl CatalogClient {
    #[instrument(skip(database_access_token))]
    pub async fn connect(
        database_connection_url: &str,
        database_access_token: Option<String>,
    ) -> Result<Self, DbError> {
        if database_connection_url.is_empty() {
            return Err(DbError::ConfigurationError(
                "DATABASE_URL_UNDEFINED".to_string(),
            ));
        }

        info!(
            "🔌 [DATABASE]: Initiating catalog link synchronization to [{}]",
            database_connection_url
        );

        let is_remote = database_connection_url.starts_with("libsql://")
            || database_connection_url.starts_with("https://");

        let is_memory = database_connection_url.contains(":memory:")
            || database_connection_url.contains("mode=memory");

        let database_driver = if is_remote {
            let token = database_access_token.ok_or_else(|| {
                DbError::ConfigurationError(
                    "Remote access denied (token missing)".to_string(),
                )
            })?;
            Builder::new_remote(database_connection_url.to_string(), token)
                .build()
                .await
        } else {
            Builder::new_local(database_connection_url).build().await
        }
        .map_err(|fault| DbError::ConnectionError(format!("DRIVER_IGNITION_FAILURE: {}", fault)))?;

        let shared_driver = Arc::new(database_driver);
        let mut anchor = None;

        if is_memory {
            // En modo memoria el ancla se abre ANTES de cualquier otra
            // operación para que el esquema resida en el segmento compartido.
            let anchor_connection = shared_driver
                .connect()
                .map_err(|fault| DbError::ConnectionError(format!("ANCHOR_FAULT: {}", fault)))?;

            apply_catalog_schema(&anchor_connection).await?;
            anchor = Some(Arc::new(anchor_connection));
            info!("⚓ [DATABASE]: Memory strata solidified and anchored.");
        } else {
            let bootstrap_connection = shared_driver.connect().map_err(|fault| {
                DbError::ConnectionError(format!("BOOTSTRAP_LINK_FAULT: {}", fault))
            })?;
            apply_catalog_schema(&bootstrap_connection).await?;
        }

        Ok(Self {
            internal_database_driver: shared_driver,
            _memory_persistence_anchor: anchor,
        })
    }

    /// Conexión cruda del pool, con integridad referencial activada.
    pub async fn get_connection(&self) -> Result<Connection, DbError> {
        let connection = self.internal_database_driver.connect().map_err(|fault| {
            error!("⚠️ [POOL_FAULT]: Connection allocation failed: {}", fault);
            DbError::ConnectionError(fault.to_string())
        })?;

        // El borrado en cascada depende de este pragma por conexión.
        connection
            .execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(DbError::QueryError)?;

        Ok(connection)
    }
}
