// [libs/infra/db/src/entity.rs]
/*!
 * =================================================================
 * APARATO: ENTITY METADATA CONTRACT (V1.4 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CONTRATO GENÉRICO ENTRE ENTIDADES Y EL REPOSITORIO BASE
 *
 * Una sola implementación de repositorio, parametrizada por los
 * metadatos de cada entidad: tabla, columnas insertables, clave
 * natural de conflicto, columnas de búsqueda textual y el mapeo
 * fila ↔ dominio.
 * =================================================================
 */

use crate::errors::DbError;
use centinela_domain_models::chronos;
use chrono::{DateTime, Utc};
use libsql::{Row, Value as SqlValue};

/// Sello temporal preformateado para una escritura (frontera UTC).
pub struct WriteStamp {
    pub created_at: String,
    pub updated_at: String,
}

impl WriteStamp {
    pub fn now() -> Self {
        let boundary = chronos::at_boundary(&chronos::now_utc());
        Self {
            created_at: boundary.clone(),
            updated_at: boundary,
        }
    }
}

/// Metadatos y mapeo de una entidad persistida del catálogo.
pub trait CatalogEntity: Sized + Send + Sync + 'static {
    /// Tabla del Motor A.
    const TABLE: &'static str;
    /// Columnas insertables, en orden de binding (sin 'id').
    const COLUMNS: &'static [&'static str];
    /// Clave natural de conflicto para el upsert.
    const CONFLICT_COLUMNS: &'static [&'static str];
    /// Columnas textuales elegibles para la búsqueda difusa.
    const SEARCH_COLUMNS: &'static [&'static str];

    /// Registro insertable (sin identidad) asociado a la entidad.
    type Record: Send + Sync + Clone;

    /// Mapea una fila SELECT (id + COLUMNS, en ese orden) al dominio.
    fn from_row(row: &Row) -> Result<Self, DbError>;

    /// Valores de binding alineados con COLUMNS.
    fn bind_record(record: &Self::Record, stamp: &WriteStamp) -> Vec<SqlValue>;

    /// Valores de la clave natural del registro, alineados con
    /// CONFLICT_COLUMNS.
    fn conflict_values(record: &Self::Record) -> Vec<SqlValue>;

    /// Lee la clave natural desde una fila del pre-lookup (columnas
    /// seleccionadas en el orden de CONFLICT_COLUMNS).
    fn conflict_values_from_row(row: &Row) -> Result<Vec<SqlValue>, DbError>;
}

/// Lista SELECT canónica: identidad seguida de las columnas insertables.
pub(crate) fn select_column_list<E: CatalogEntity>() -> String {
    let mut columns: Vec<&str> = vec!["id"];
    columns.extend_from_slice(E::COLUMNS);
    columns.join(", ")
}

// --- AYUDANTES DE MAPEO FILA → DOMINIO ---

pub(crate) fn row_i64(row: &Row, index: i32) -> Result<i64, DbError> {
    row.get::<i64>(index).map_err(DbError::QueryError)
}

pub(crate) fn row_f64(row: &Row, index: i32) -> Result<f64, DbError> {
    row.get::<f64>(index).map_err(DbError::QueryError)
}

pub(crate) fn row_opt_f64(row: &Row, index: i32) -> Result<Option<f64>, DbError> {
    row.get::<Option<f64>>(index).map_err(DbError::QueryError)
}

pub(crate) fn row_text(row: &Row, index: i32) -> Result<String, DbError> {
    row.get::<String>(index).map_err(DbError::QueryError)
}

pub(crate) fn row_opt_text(row: &Row, index: i32) -> Result<Option<String>, DbError> {
    row.get::<Option<String>>(index).map_err(DbError::QueryError)
}

pub(crate) fn row_bool(row: &Row, index: i32) -> Result<bool, DbError> {
    Ok(row.get::<i64>(index).map_err(DbError::QueryError)? != 0)
}

pub(crate) fn row_timestamp(row: &Row, index: i32) -> Result<DateTime<Utc>, DbError> {
    let raw = row_text(row, index)?;
    chronos::parse_boundary(&raw).ok_or_else(|| {
        DbError::MappingError(format!("unparseable stored timestamp '{}'", raw))
    })
}

/// Binding de texto opcional.
pub(crate) fn opt_text_value(value: &Option<String>) -> SqlValue {
    match value {
        Some(text) => SqlValue::Text(text.clone()),
        None => SqlValue::Null,
    }
}

/// Binding de real opcional.
pub(crate) fn opt_real_value(value: &Option<f64>) -> SqlValue {
    match value {
        Some(number) => SqlValue::Real(*number),
        None => SqlValue::Null,
    }
}
