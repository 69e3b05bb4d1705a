// [libs/infra/db/src/repositories/base.rs]
/*!
 * =================================================================
 * APARATO: GENERIC CATALOG REPOSITORY (V1.4 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CRUD, FILTRADO, BÚSQUEDA Y UPSERT MASIVO GENÉRICOS
 *
 * Una única implementación parametrizada por 'CatalogEntity'. Las
 * operaciones de lectura no sellan transacción; las mutaciones masivas
 * corren dentro de una transacción propia que se sella o revierte
 * completa. La contabilidad creado/actualizado del upsert nace de un
 * pre-lookup por clave natural en ráfagas.
 * =================================================================
 */

use crate::entity::{select_column_list, CatalogEntity, WriteStamp};
use crate::errors::DbError;
use crate::filters::{build_where_clause, FilterCondition, FilterValue};
use crate::uow::Session;
use libsql::params::Params;
use libsql::Value as SqlValue;
use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Política ante conflicto de clave natural en el upsert masivo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictAction {
    /// La fila existente se actualiza con los valores entrantes.
    Update,
    /// La fila existente se conserva; el registro entrante se descarta.
    Ignore,
}

/// Tamaño de ráfaga para pre-lookups con listas de claves.
const LOOKUP_CHUNK_SIZE: usize = 200;

/// Vista de repositorio ligada a la sesión de un Unit of Work.
pub struct Repository<E: CatalogEntity> {
    session: Arc<Session>,
    _entity: PhantomData<E>,
}

impl<E: CatalogEntity> Repository<E> {
    pub(crate) fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            _entity: PhantomData,
        }
    }

    fn allowed_columns() -> Vec<&'static str> {
        let mut columns = vec!["id"];
        columns.extend_from_slice(E::COLUMNS);
        columns
    }

    /// ➕ Crea una fila y la devuelve hidratada con su identidad.
    pub async fn create(&self, record: &E::Record) -> Result<E, DbError> {
        let connection = self.session.connection()?;
        let stamp = WriteStamp::now();
        let bound_values = E::bind_record(record, &stamp);

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            E::TABLE,
            E::COLUMNS.join(", "),
            vec!["?"; bound_values.len()].join(", "),
            select_column_list::<E>()
        );

        let mut rows = connection
            .query(&sql, Params::Positional(bound_values))
            .await
            .map_err(DbError::classify_write_fault)?;

        let row = rows
            .next()
            .await
            .map_err(DbError::QueryError)?
            .ok_or_else(|| DbError::MappingError("INSERT returned no row".to_string()))?;

        let created = E::from_row(&row)?;
        debug!("➕ [REPO:{}]: Row created.", E::TABLE);
        Ok(created)
    }

    /// 🔍 Lectura por identidad. La ausencia es un resultado, no un error.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<E>, DbError> {
        let connection = self.session.connection()?;
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?",
            select_column_list::<E>(),
            E::TABLE
        );

        let mut rows = connection
            .query(&sql, Params::Positional(vec![SqlValue::Integer(id)]))
            .await
            .map_err(DbError::QueryError)?;

        match rows.next().await.map_err(DbError::QueryError)? {
            Some(row) => Ok(Some(E::from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// 📝 Parche parcial por identidad; devuelve la fila actualizada.
    pub async fn update(
        &self,
        id: i64,
        patch: &[(&str, FilterValue)],
    ) -> Result<Option<E>, DbError> {
        let connection = self.session.connection()?;
        let allowed = Self::allowed_columns();

        let mut set_fragments: Vec<String> = Vec::new();
        let mut bound_values: Vec<SqlValue> = Vec::new();

        for (field, value) in patch {
            if !allowed.iter().any(|column| column == field) || *field == "id" {
                warn!(
                    "📝 [REPO:{}]: Unknown patch field [{}] ignored.",
                    E::TABLE,
                    field
                );
                continue;
            }
            set_fragments.push(format!("{} = ?", field));
            bound_values.push(value.to_sql_scalar());
        }

        if set_fragments.is_empty() {
            return self.get_by_id(id).await;
        }

        set_fragments.push("updated_at = ?".to_string());
        bound_values.push(SqlValue::Text(WriteStamp::now().updated_at));
        bound_values.push(SqlValue::Integer(id));

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ? RETURNING {}",
            E::TABLE,
            set_fragments.join(", "),
            select_column_list::<E>()
        );

        let mut rows = connection
            .query(&sql, Params::Positional(bound_values))
            .await
            .map_err(DbError::classify_write_fault)?;

        match rows.next().await.map_err(DbError::QueryError)? {
            Some(row) => Ok(Some(E::from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// 🗑️ Borrado por identidad. Falso si la fila no existía.
    pub async fn delete(&self, id: i64) -> Result<bool, DbError> {
        let connection = self.session.connection()?;
        let sql = format!("DELETE FROM {} WHERE id = ?", E::TABLE);

        let deleted = connection
            .execute(&sql, Params::Positional(vec![SqlValue::Integer(id)]))
            .await
            .map_err(DbError::QueryError)?;

        Ok(deleted > 0)
    }

    /// Paginación simple ordenada por identidad.
    pub async fn get_all(&self, skip: u32, limit: Option<u32>) -> Result<Vec<E>, DbError> {
        let connection = self.session.connection()?;
        let sql = format!(
            "SELECT {} FROM {} ORDER BY id LIMIT ? OFFSET ?",
            select_column_list::<E>(),
            E::TABLE
        );

        let mut rows = connection
            .query(
                &sql,
                Params::Positional(vec![
                    SqlValue::Integer(limit.map(i64::from).unwrap_or(-1)),
                    SqlValue::Integer(i64::from(skip)),
                ]),
            )
            .await
            .map_err(DbError::QueryError)?;

        let mut entities = Vec::new();
        while let Some(row) = rows.next().await.map_err(DbError::QueryError)? {
            entities.push(E::from_row(&row)?);
        }
        Ok(entities)
    }

    pub async fn count(&self) -> Result<i64, DbError> {
        let connection = self.session.connection()?;
        let sql = format!("SELECT COUNT(*) FROM {}", E::TABLE);

        let mut rows = connection
            .query(&sql, ())
            .await
            .map_err(DbError::QueryError)?;
        let row = rows
            .next()
            .await
            .map_err(DbError::QueryError)?
            .ok_or_else(|| DbError::MappingError("COUNT returned no row".to_string()))?;
        row.get::<i64>(0).map_err(DbError::QueryError)
    }

    /**
     * 🔍 Filtrado universal con la gramática 'campo__op'.
     *
     * Los campos desconocidos se ignoran en silencio; el orden sólo se
     * aplica sobre columnas reales de la entidad.
     */
    pub async fn filter(
        &self,
        conditions: &[FilterCondition],
        skip: u32,
        limit: Option<u32>,
        order_by: Option<&str>,
        order_desc: bool,
    ) -> Result<Vec<E>, DbError> {
        let connection = self.session.connection()?;
        let allowed = Self::allowed_columns();

        let mut bound_values: Vec<SqlValue> = Vec::new();
        let where_clause = build_where_clause(conditions, &allowed, &mut bound_values);

        let order_clause = match order_by.filter(|field| allowed.iter().any(|column| column == field)) {
            Some(field) => format!(
                " ORDER BY {} {}",
                field,
                if order_desc { "DESC" } else { "ASC" }
            ),
            None => " ORDER BY id ASC".to_string(),
        };

        let sql = format!(
            "SELECT {} FROM {}{}{} LIMIT ? OFFSET ?",
            select_column_list::<E>(),
            E::TABLE,
            where_clause,
            order_clause
        );

        bound_values.push(SqlValue::Integer(limit.map(i64::from).unwrap_or(-1)));
        bound_values.push(SqlValue::Integer(i64::from(skip)));

        let mut rows = connection
            .query(&sql, Params::Positional(bound_values))
            .await
            .map_err(DbError::QueryError)?;

        let mut entities = Vec::new();
        while let Some(row) = rows.next().await.map_err(DbError::QueryError)? {
            entities.push(E::from_row(&row)?);
        }
        Ok(entities)
    }

    /// 🔎 Búsqueda difusa sobre columnas textuales declaradas.
    pub async fn search(
        &self,
        search_term: &str,
        search_fields: &[&str],
        skip: u32,
        limit: Option<u32>,
    ) -> Result<Vec<E>, DbError> {
        let connection = self.session.connection()?;

        let usable_fields: Vec<&str> = search_fields
            .iter()
            .copied()
            .filter(|field| E::SEARCH_COLUMNS.iter().any(|column| column == field))
            .collect();

        if usable_fields.is_empty() {
            return Ok(Vec::new());
        }

        let pattern = format!("%{}%", search_term);
        let or_clause = usable_fields
            .iter()
            .map(|field| format!("LOWER({}) LIKE LOWER(?)", field))
            .collect::<Vec<_>>()
            .join(" OR ");

        let mut bound_values: Vec<SqlValue> = usable_fields
            .iter()
            .map(|_| SqlValue::Text(pattern.clone()))
            .collect();
        bound_values.push(SqlValue::Integer(limit.map(i64::from).unwrap_or(50)));
        bound_values.push(SqlValue::Integer(i64::from(skip)));

        let sql = format!(
            "SELECT {} FROM {} WHERE {} ORDER BY id LIMIT ? OFFSET ?",
            select_column_list::<E>(),
            E::TABLE,
            or_clause
        );

        let mut rows = connection
            .query(&sql, Params::Positional(bound_values))
            .await
            .map_err(DbError::QueryError)?;

        let mut entities = Vec::new();
        while let Some(row) = rows.next().await.map_err(DbError::QueryError)? {
            entities.push(E::from_row(&row)?);
        }
        Ok(entities)
    }

    /// Búsqueda por igualdad exacta de un conjunto de campos (primera fila).
    pub async fn find_by_fields(
        &self,
        fields: &[(&str, FilterValue)],
    ) -> Result<Option<E>, DbError> {
        let conditions: Vec<FilterCondition> = fields
            .iter()
            .map(|(field, value)| {
                FilterCondition::new(field, crate::filters::FilterOp::Eq, value.clone())
            })
            .collect();

        Ok(self.filter(&conditions, 0, Some(1), None, false).await?.pop())
    }

    /**
     * Upsert masivo por clave natural dentro de una transacción única.
     *
     * Contabilidad (creados, actualizados) derivada de un pre-lookup de
     * claves existentes: correr dos veces con los mismos datos produce
     * (0, creados₁ + actualizados₁) y deja los conteos de filas estables.
     *
     * # Errors:
     * - `DbError::InvariantViolation`: una fila viola un CHECK del
     *   esquema; la transacción completa revierte.
     */
    #[instrument(skip(self, records), fields(table = E::TABLE, count = records.len()))]
    pub async fn bulk_upsert(
        &self,
        records: &[E::Record],
        conflict_action: ConflictAction,
    ) -> Result<(u64, u64), DbError> {
        if records.is_empty() {
            return Ok((0, 0));
        }

        let connection = self.session.connection()?;
        let existing_keys = self.existing_conflict_keys(records).await?;

        let upsert_sql = build_upsert_sql::<E>(conflict_action);
        let stamp = WriteStamp::now();

        let transaction = connection
            .transaction()
            .await
            .map_err(|fault| DbError::TransactionError(fault.to_string()))?;

        let mut created: u64 = 0;
        let mut updated: u64 = 0;
        let mut seen_keys = existing_keys;

        for record in records {
            let fingerprint = conflict_fingerprint(&E::conflict_values(record));
            let already_present = seen_keys.contains(&fingerprint);

            if already_present && conflict_action == ConflictAction::Ignore {
                continue;
            }

            if let Err(fault) = transaction
                .execute(
                    &upsert_sql,
                    Params::Positional(E::bind_record(record, &stamp)),
                )
                .await
            {
                let classified = DbError::classify_write_fault(fault);
                warn!(
                    "❌ [REPO:{}]: Bulk upsert step failed, rolling back: {}",
                    E::TABLE,
                    classified
                );
                transaction
                    .rollback()
                    .await
                    .map_err(|rollback_fault| {
                        DbError::TransactionError(rollback_fault.to_string())
                    })?;
                return Err(classified);
            }

            if already_present {
                updated += 1;
            } else {
                created += 1;
                seen_keys.insert(fingerprint);
            }
        }

        transaction
            .commit()
            .await
            .map_err(|fault| DbError::TransactionError(fault.to_string()))?;

        info!(
            "💾 [REPO:{}]: Bulk upsert sealed. Created {}, updated {}.",
            E::TABLE,
            created,
            updated
        );
        Ok((created, updated))
    }

    /// 🗑️ Borrado masivo por condiciones, en su propia transacción
    /// implícita (una sentencia DELETE atómica). Devuelve filas borradas.
    pub async fn bulk_delete(&self, conditions: &[FilterCondition]) -> Result<u64, DbError> {
        let connection = self.session.connection()?;
        let allowed = Self::allowed_columns();

        let mut bound_values: Vec<SqlValue> = Vec::new();
        let where_clause = build_where_clause(conditions, &allowed, &mut bound_values);

        if where_clause.is_empty() && !conditions.is_empty() {
            // Todas las condiciones apuntaban a campos desconocidos:
            // borrar la tabla completa sería una sorpresa, no una orden.
            warn!(
                "🗑️ [REPO:{}]: Bulk delete with no surviving conditions refused.",
                E::TABLE
            );
            return Ok(0);
        }

        let sql = format!("DELETE FROM {}{}", E::TABLE, where_clause);
        let deleted = connection
            .execute(&sql, Params::Positional(bound_values))
            .await
            .map_err(DbError::QueryError)?;

        info!("🗑️ [REPO:{}]: {} rows deleted.", E::TABLE, deleted);
        Ok(deleted)
    }

    /// Pre-lookup de claves naturales existentes, en ráfagas acotadas.
    async fn existing_conflict_keys(
        &self,
        records: &[E::Record],
    ) -> Result<HashSet<String>, DbError> {
        let connection = self.session.connection()?;
        let conflict_columns = E::CONFLICT_COLUMNS.join(", ");
        let mut existing: HashSet<String> = HashSet::new();

        for chunk in records.chunks(LOOKUP_CHUNK_SIZE) {
            let mut bound_values: Vec<SqlValue> = Vec::new();

            let predicate = if E::CONFLICT_COLUMNS.len() == 1 {
                let placeholders = vec!["?"; chunk.len()].join(", ");
                for record in chunk {
                    bound_values.extend(E::conflict_values(record));
                }
                format!("{} IN ({})", E::CONFLICT_COLUMNS[0], placeholders)
            } else {
                let tuple_predicate = E::CONFLICT_COLUMNS
                    .iter()
                    .map(|column| format!("{} = ?", column))
                    .collect::<Vec<_>>()
                    .join(" AND ");
                let per_record = format!("({})", tuple_predicate);
                for record in chunk {
                    bound_values.extend(E::conflict_values(record));
                }
                vec![per_record; chunk.len()].join(" OR ")
            };

            let sql = format!(
                "SELECT {} FROM {} WHERE {}",
                conflict_columns,
                E::TABLE,
                predicate
            );

            let mut rows = connection
                .query(&sql, Params::Positional(bound_values))
                .await
                .map_err(DbError::QueryError)?;

            while let Some(row) = rows.next().await.map_err(DbError::QueryError)? {
                existing.insert(conflict_fingerprint(&E::conflict_values_from_row(&row)?));
            }
        }

        Ok(existing)
    }
}

/// SQL de upsert nativo por clave natural. 'created_at' nunca se pisa
/// en la rama de actualización.
fn build_upsert_sql<E: CatalogEntity>(conflict_action: ConflictAction) -> String {
    let columns = E::COLUMNS.join(", ");
    let placeholders = vec!["?"; E::COLUMNS.len()].join(", ");
    let conflict = E::CONFLICT_COLUMNS.join(", ");

    match conflict_action {
        ConflictAction::Ignore => format!(
            "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT({}) DO NOTHING",
            E::TABLE,
            columns,
            placeholders,
            conflict
        ),
        ConflictAction::Update => {
            let update_set = E::COLUMNS
                .iter()
                .filter(|column| {
                    !E::CONFLICT_COLUMNS.contains(*column) && **column != "created_at"
                })
                .map(|column| format!("{column} = excluded.{column}"))
                .collect::<Vec<_>>()
                .join(", ");

            format!(
                "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT({}) DO UPDATE SET {}",
                E::TABLE,
                columns,
                placeholders,
                conflict,
                update_set
            )
        }
    }
}

/// Huella textual estable de una clave natural para la contabilidad
/// del pre-lookup.
fn conflict_fingerprint(values: &[SqlValue]) -> String {
    values
        .iter()
        .map(|value| match value {
            SqlValue::Integer(number) => format!("i:{}", number),
            SqlValue::Real(number) => format!("r:{}", number),
            SqlValue::Text(text) => format!("t:{}", text),
            SqlValue::Blob(bytes) => format!("b:{}", bytes.len()),
            SqlValue::Null => "n:".to_string(),
        })
        .collect::<Vec<_>>()
        .join("|")
}
