// [libs/domain/models/src/lib.rs]
/*!
 * =================================================================
 * APARATO: CATALOG DOMAIN MODELS (V1.2 - SOBERANO)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATOS DEL CATÁLOGO PHA Y FÍSICA DE AMENAZAS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. CANONICAL SET: Un único árbol de modelos para Asteroid,
 *    CloseApproach y ThreatAssessment; sin duplicados históricos.
 * 2. UTC DISCIPLINE: Toda marca temporal que cruza la frontera del
 *    núcleo pasa por el módulo 'chronos'.
 * 3. PURE DERIVATIONS: La física de diámetros, energías y escalas de
 *    amenaza vive en 'space_math' como funciones deterministas.
 * =================================================================
 */

pub mod approach;
pub mod asteroid;
pub mod chronos;
pub mod space_math;
pub mod threat;

pub use approach::{ApproachRecord, CloseApproach, DEFAULT_APPROACH_DATA_SOURCE};
pub use asteroid::{Asteroid, AsteroidRecord, DiameterSource};
pub use threat::{ImpactCategory, ThreatAssessment, ThreatLevel, ThreatRecord};
