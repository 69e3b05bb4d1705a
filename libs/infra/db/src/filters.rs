// [libs/infra/db/src/filters.rs]
/*!
 * =================================================================
 * APARATO: FILTER GRAMMAR ENGINE (V1.4 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: TRADUCCIÓN DE CONDICIONES TIPADAS A SQL PARAMETRIZADO
 *
 * Gramática de claves: 'campo' (igualdad) o 'campo__op' con
 * op ∈ {eq, ne, gt, ge, lt, le, in, not_in, like, ilike, is_null,
 * is_not_null}. Los valores de 'like'/'ilike' se envuelven SIEMPRE
 * como %valor%; la coincidencia exacta es trabajo de 'eq'. Los campos
 * desconocidos se ignoran en silencio. Las marcas temporales se
 * normalizan a UTC antes del binding.
 * =================================================================
 */

use centinela_domain_models::chronos;
use chrono::{DateTime, Utc};
use libsql::Value as SqlValue;
use tracing::debug;

/// Operadores de la gramática de filtros.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    In,
    NotIn,
    Like,
    Ilike,
    IsNull,
    IsNotNull,
}

impl FilterOp {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "eq" => Some(FilterOp::Eq),
            "ne" => Some(FilterOp::Ne),
            "gt" => Some(FilterOp::Gt),
            "ge" => Some(FilterOp::Ge),
            "lt" => Some(FilterOp::Lt),
            "le" => Some(FilterOp::Le),
            "in" => Some(FilterOp::In),
            "not_in" => Some(FilterOp::NotIn),
            "like" => Some(FilterOp::Like),
            "ilike" => Some(FilterOp::Ilike),
            "is_null" => Some(FilterOp::IsNull),
            "is_not_null" => Some(FilterOp::IsNotNull),
            _ => None,
        }
    }

    fn sql_comparator(&self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Ne => "!=",
            FilterOp::Gt => ">",
            FilterOp::Ge => ">=",
            FilterOp::Lt => "<",
            FilterOp::Le => "<=",
            // El resto construye su propia forma sintáctica.
            _ => "=",
        }
    }
}

/// Valor tipado de una condición de filtro.
#[derive(Debug, Clone)]
pub enum FilterValue {
    Integer(i64),
    Real(f64),
    Text(String),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    IntegerList(Vec<i64>),
    TextList(Vec<String>),
    Null,
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Integer(value)
    }
}
impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Real(value)
    }
}
impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}
impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}
impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}
impl From<DateTime<Utc>> for FilterValue {
    fn from(value: DateTime<Utc>) -> Self {
        FilterValue::Timestamp(value)
    }
}
impl From<Vec<i64>> for FilterValue {
    fn from(values: Vec<i64>) -> Self {
        FilterValue::IntegerList(values)
    }
}
impl From<Vec<String>> for FilterValue {
    fn from(values: Vec<String>) -> Self {
        FilterValue::TextList(values)
    }
}

impl FilterValue {
    /// Binding escalar; las marcas temporales salen por la frontera UTC.
    pub(crate) fn to_sql_scalar(&self) -> SqlValue {
        match self {
            FilterValue::Integer(value) => SqlValue::Integer(*value),
            FilterValue::Real(value) => SqlValue::Real(*value),
            FilterValue::Text(value) => SqlValue::Text(value.clone()),
            FilterValue::Bool(value) => SqlValue::Integer(i64::from(*value)),
            FilterValue::Timestamp(value) => SqlValue::Text(chronos::at_boundary(value)),
            FilterValue::Null => SqlValue::Null,
            // Las listas se expanden en el constructor de la cláusula.
            FilterValue::IntegerList(_) | FilterValue::TextList(_) => SqlValue::Null,
        }
    }

    fn to_sql_list(&self) -> Vec<SqlValue> {
        match self {
            FilterValue::IntegerList(values) => {
                values.iter().map(|value| SqlValue::Integer(*value)).collect()
            }
            FilterValue::TextList(values) => values
                .iter()
                .map(|value| SqlValue::Text(value.clone()))
                .collect(),
            other => vec![other.to_sql_scalar()],
        }
    }
}

/// Condición individual ya descompuesta en campo, operador y valor.
#[derive(Debug, Clone)]
pub struct FilterCondition {
    pub field: String,
    pub operator: FilterOp,
    pub value: FilterValue,
}

impl FilterCondition {
    /// Construcción directa con operador explícito.
    pub fn new(field: &str, operator: FilterOp, value: FilterValue) -> Self {
        Self {
            field: field.to_string(),
            operator,
            value,
        }
    }

    /**
     * Parsea una clave de la gramática 'campo' / 'campo__op'.
     *
     * Un sufijo de operador desconocido invalida la condición completa
     * (se ignora después, igual que un campo desconocido).
     */
    pub fn parse(key: &str, value: FilterValue) -> Option<Self> {
        match key.split_once("__") {
            Some((field, operator_raw)) => FilterOp::parse(operator_raw).map(|operator| Self {
                field: field.to_string(),
                operator,
                value,
            }),
            None => Some(Self {
                field: key.to_string(),
                operator: FilterOp::Eq,
                value,
            }),
        }
    }
}

/**
 * Construye la cláusula WHERE parametrizada para las condiciones dadas.
 *
 * Devuelve la cadena SQL (vacía si ninguna condición sobrevive) y anexa
 * los valores de binding en orden. Las condiciones sobre campos fuera
 * de 'allowed_columns' se descartan en silencio.
 */
pub fn build_where_clause(
    conditions: &[FilterCondition],
    allowed_columns: &[&str],
    bound_values: &mut Vec<SqlValue>,
) -> String {
    let mut fragments: Vec<String> = Vec::new();

    for condition in conditions {
        if !allowed_columns
            .iter()
            .any(|column| *column == condition.field.as_str())
        {
            debug!(
                "🔍 [FILTER]: Unknown field [{}] silently ignored.",
                condition.field
            );
            continue;
        }

        match condition.operator {
            FilterOp::IsNull => fragments.push(format!("{} IS NULL", condition.field)),
            FilterOp::IsNotNull => fragments.push(format!("{} IS NOT NULL", condition.field)),
            FilterOp::In | FilterOp::NotIn => {
                let list_values = condition.value.to_sql_list();
                if list_values.is_empty() {
                    // IN vacío nunca casa; NOT IN vacío casa siempre.
                    fragments.push(
                        if condition.operator == FilterOp::In {
                            "1 = 0".to_string()
                        } else {
                            "1 = 1".to_string()
                        },
                    );
                    continue;
                }
                let placeholders = vec!["?"; list_values.len()].join(", ");
                let keyword = if condition.operator == FilterOp::In {
                    "IN"
                } else {
                    "NOT IN"
                };
                fragments.push(format!(
                    "{} {} ({})",
                    condition.field, keyword, placeholders
                ));
                bound_values.extend(list_values);
            }
            FilterOp::Like => {
                fragments.push(format!("{} LIKE ?", condition.field));
                bound_values.push(wrap_like_pattern(&condition.value));
            }
            FilterOp::Ilike => {
                fragments.push(format!("LOWER({}) LIKE LOWER(?)", condition.field));
                bound_values.push(wrap_like_pattern(&condition.value));
            }
            _ => {
                fragments.push(format!(
                    "{} {} ?",
                    condition.field,
                    condition.operator.sql_comparator()
                ));
                bound_values.push(condition.value.to_sql_scalar());
            }
        }
    }

    if fragments.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", fragments.join(" AND "))
    }
}

/// Envoltura incondicional %valor% de la gramática like/ilike.
fn wrap_like_pattern(value: &FilterValue) -> SqlValue {
    let raw = match value {
        FilterValue::Text(text) => text.clone(),
        FilterValue::Integer(number) => number.to_string(),
        FilterValue::Real(number) => number.to_string(),
        other => match other.to_sql_scalar() {
            SqlValue::Text(text) => text,
            _ => String::new(),
        },
    };
    SqlValue::Text(format!("%{}%", raw))
}
