// [libs/infra/db/src/uow.rs]
/*!
 * =================================================================
 * APARATO: UNIT OF WORK (V1.4 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: ÁMBITO TRANSACCIONAL Y PROPIEDAD DE LA SESIÓN
 *
 * El Unit of Work posee la sesión y presta vistas de repositorio
 * ligadas a ella, construidas perezosamente y cacheadas por tipo.
 * La disciplina transaccional de grano fino (flush → commit, o
 * rollback) vive en cada operación mutante del repositorio; el UoW
 * gobierna el ciclo de vida: sellado del desenlace y liberación
 * garantizada de la sesión en toda salida. Un repositorio usado tras
 * el sellado falla con 'SessionMisuse'.
 * =================================================================
 */

use crate::client::CatalogClient;
use crate::entity::CatalogEntity;
use crate::errors::DbError;
use crate::repositories::{ApproachRepository, AsteroidRepository, Repository, ThreatRepository};
use libsql::Connection;
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Sesión del Motor A: una conexión con integridad referencial activa,
/// propiedad exclusiva de un Unit of Work.
pub struct Session {
    connection: Connection,
    released: AtomicBool,
}

impl Session {
    pub(crate) fn new(connection: Connection) -> Self {
        Self {
            connection,
            released: AtomicBool::new(false),
        }
    }

    /// Conexión activa, o 'SessionMisuse' si el ámbito ya fue sellado.
    pub(crate) fn connection(&self) -> Result<&Connection, DbError> {
        if self.released.load(Ordering::SeqCst) {
            return Err(DbError::SessionMisuse(
                "repository used outside an active UnitOfWork scope".to_string(),
            ));
        }
        Ok(&self.connection)
    }

    pub(crate) fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

/// Ámbito transaccional con una vista de repositorio por entidad.
pub struct UnitOfWork {
    session: Arc<Session>,
    asteroid_repository: OnceCell<AsteroidRepository>,
    approach_repository: OnceCell<ApproachRepository>,
    threat_repository: OnceCell<ThreatRepository>,
    outcome_sealed: AtomicBool,
}

impl UnitOfWork {
    /// Abre una sesión fresca contra el cliente del catálogo.
    #[instrument(skip(client))]
    pub async fn begin(client: &CatalogClient) -> Result<Self, DbError> {
        let connection = client.get_connection().await?;
        debug!("📂 [UOW]: Scope opened with fresh session.");

        Ok(Self {
            session: Arc::new(Session::new(connection)),
            asteroid_repository: OnceCell::new(),
            approach_repository: OnceCell::new(),
            threat_repository: OnceCell::new(),
            outcome_sealed: AtomicBool::new(false),
        })
    }

    /// Vista cacheada del repositorio de asteroides.
    pub fn asteroid_repo(&self) -> &AsteroidRepository {
        self.asteroid_repository
            .get_or_init(|| AsteroidRepository::new(self.session.clone()))
    }

    /// Vista cacheada del repositorio de encuentros.
    pub fn approach_repo(&self) -> &ApproachRepository {
        self.approach_repository
            .get_or_init(|| ApproachRepository::new(self.session.clone()))
    }

    /// Vista cacheada del repositorio de amenazas.
    pub fn threat_repo(&self) -> &ThreatRepository {
        self.threat_repository
            .get_or_init(|| ThreatRepository::new(self.session.clone()))
    }

    /// Vista genérica para cualquier entidad del catálogo.
    pub fn repository<E: CatalogEntity>(&self) -> Repository<E> {
        Repository::new(self.session.clone())
    }

    /// Sesión prestada (acceso de diagnóstico y consultas crudas).
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /**
     * Sella el ámbito con desenlace limpio. Las mutaciones ya están
     * selladas por sus repositorios; el commit del UoW cierra el ciclo
     * de vida y bloquea todo uso posterior de la sesión.
     */
    pub async fn commit(&self) -> Result<(), DbError> {
        self.seal("commit");
        Ok(())
    }

    /**
     * Sella el ámbito con desenlace de error. Las operaciones mutantes
     * pendientes (transacciones de repositorio no selladas) ya
     * revirtieron en su propio ámbito.
     */
    pub async fn rollback(&self) -> Result<(), DbError> {
        self.seal("rollback");
        Ok(())
    }

    fn seal(&self, outcome: &str) {
        if self.outcome_sealed.swap(true, Ordering::SeqCst) {
            warn!("📂 [UOW]: Scope already sealed; duplicate {} ignored.", outcome);
            return;
        }
        self.session.release();
        debug!("📂 [UOW]: Scope sealed via {}.", outcome);
    }
}

impl Drop for UnitOfWork {
    /// Liberación garantizada en toda salida, incluidas las de pánico.
    fn drop(&mut self) {
        if !self.outcome_sealed.load(Ordering::SeqCst) {
            self.session.release();
            debug!("📂 [UOW]: Scope dropped without explicit seal; session released.");
        }
    }
}
