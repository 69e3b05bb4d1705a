// [libs/infra/db/src/repositories/mod.rs]
/*!
 * =================================================================
 * APARATO: REPOSITORY REGISTRY (V1.4 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: EXPOSICIÓN NOMINAL DE LOS REPOSITORIOS DEL CATÁLOGO
 * =================================================================
 */

pub mod approach;
pub mod asteroid;
pub mod base;
pub mod threat;

pub use approach::{ApproachRepository, ThreatSeed};
pub use asteroid::AsteroidRepository;
pub use base::{ConflictAction, Repository};
pub use threat::ThreatRepository;
