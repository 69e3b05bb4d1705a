// [libs/infra/db/src/errors.rs]
/*!
 * =================================================================
 * APARATO: DATABASE ERROR CATALOG (V1.4 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DE PERSISTENCIA
 * =================================================================
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    /// Error de enlace físico o de apertura del motor libSQL.
    #[error("[L3_DB_NET_FAULT]: DATABASE_UPLINK_SEVERED -> {0}")]
    ConnectionError(String),

    /// Fallo de configuración del entorno (URL vacía o malformada).
    #[error("[L3_DB_CONFIG_FAULT]: STRATEGIC_ENV_VOID -> {0}")]
    ConfigurationError(String),

    /// Error de sintaxis o ejecución devuelto por el motor libSQL.
    #[error("[L3_DB_QUERY_FAULT]: SQL_QUERY_REJECTED -> {0}")]
    QueryError(#[from] libsql::Error),

    /// Fallo en la transformación de tipos entre SQLite y el dominio.
    #[error("[L3_DB_MAPPING_FAULT]: DATA_MAPPING_VIOLATION -> {0}")]
    MappingError(String),

    /// Escritura que viola un CHECK o UNIQUE del esquema. Se trata como
    /// defecto de programación: la etapa completa revierte.
    #[error("[L3_DB_INTEGRITY_FAULT]: INVARIANT_VIOLATION -> {0}")]
    InvariantViolation(String),

    /// Error al sellar una secuencia transaccional multi-fila.
    #[error("[L3_DB_FAULT]: TRANSACTION_COLLAPSE -> {0}")]
    TransactionError(String),

    /// Repositorio usado fuera del ámbito de un Unit of Work. Error de
    /// programación, fatal para el llamador.
    #[error("[L3_DB_SESSION_FAULT]: NO_SESSION_OUTSIDE_UOW -> {0}")]
    SessionMisuse(String),
}

impl DbError {
    /// Clasifica un fallo de escritura del motor: las violaciones de
    /// restricción se promocionan a 'InvariantViolation'.
    pub fn classify_write_fault(fault: libsql::Error) -> Self {
        let message = fault.to_string();
        if message.to_lowercase().contains("constraint") {
            DbError::InvariantViolation(message)
        } else {
            DbError::QueryError(fault)
        }
    }
}
