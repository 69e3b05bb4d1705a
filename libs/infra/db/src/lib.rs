// [libs/infra/db/src/lib.rs]
/*!
 * =================================================================
 * APARATO: CATALOG PERSISTENCE LAYER (V1.4 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: PERSISTENCIA DEL CATÁLOGO PHA SOBRE EL MOTOR A
 *
 * Composición del estrato: cliente de conexión con bootstrap de
 * esquema, contrato genérico de entidad, repositorio base único,
 * repositorios nominales, Unit of Work con vistas cacheadas,
 * coordinador de transacciones y fachadas de consulta.
 * =================================================================
 */

pub mod client;
pub mod coordinator;
pub mod entities;
pub mod entity;
pub mod errors;
pub mod filters;
pub mod repositories;
pub mod schema;
pub mod services;
pub mod uow;

pub use client::CatalogClient;
pub use coordinator::{
    OperationFn, OperationResult, RollbackHandler, StepFn, StepRollbackFn,
    TransactionCoordinator, WorkflowOutcome, WorkflowStep,
};
pub use entities::{BoundApproachRecord, BoundThreatRecord};
pub use entity::{CatalogEntity, WriteStamp};
pub use errors::DbError;
pub use filters::{FilterCondition, FilterOp, FilterValue};
pub use repositories::{
    ApproachRepository, AsteroidRepository, ConflictAction, Repository, ThreatRepository,
    ThreatSeed,
};
pub use services::{
    ApproachDto, ApproachQueryService, AsteroidDetailDto, AsteroidDto, AsteroidQueryService,
    CatalogStatisticsDto, ThreatDto, ThreatQueryService,
};
pub use uow::{Session, UnitOfWork};
