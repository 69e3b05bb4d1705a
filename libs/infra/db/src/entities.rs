// [libs/infra/db/src/entities.rs]
/*!
 * =================================================================
 * APARATO: ENTITY METADATA BINDINGS (V1.4 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: IMPLEMENTACIÓN DEL CONTRATO GENÉRICO POR ENTIDAD
 *
 * Claves naturales del catálogo:
 * - asteroids: [designation]
 * - close_approaches: [asteroid_id, approach_time]
 * - threat_assessments: [asteroid_id]
 * =================================================================
 */

use crate::entity::{
    opt_real_value, opt_text_value, row_bool, row_f64, row_i64, row_opt_f64, row_opt_text,
    row_text, row_timestamp, CatalogEntity, WriteStamp,
};
use crate::errors::DbError;
use centinela_domain_models::chronos;
use centinela_domain_models::{
    ApproachRecord, Asteroid, AsteroidRecord, CloseApproach, DiameterSource, ImpactCategory,
    ThreatAssessment, ThreatRecord,
};
use libsql::{Row, Value as SqlValue};

// --- ASTEROID ---

impl CatalogEntity for Asteroid {
    const TABLE: &'static str = "asteroids";
    const COLUMNS: &'static [&'static str] = &[
        "designation",
        "name",
        "perihelion_au",
        "aphelion_au",
        "earth_moid_au",
        "absolute_magnitude",
        "estimated_diameter_km",
        "accurate_diameter",
        "albedo",
        "diameter_source",
        "orbit_id",
        "orbit_class",
        "created_at",
        "updated_at",
    ];
    const CONFLICT_COLUMNS: &'static [&'static str] = &["designation"];
    const SEARCH_COLUMNS: &'static [&'static str] = &["designation", "name", "orbit_class"];

    type Record = AsteroidRecord;

    fn from_row(row: &Row) -> Result<Self, DbError> {
        Ok(Asteroid {
            id: row_i64(row, 0)?,
            designation: row_text(row, 1)?,
            name: row_opt_text(row, 2)?,
            perihelion_au: row_opt_f64(row, 3)?,
            aphelion_au: row_opt_f64(row, 4)?,
            earth_moid_au: row_opt_f64(row, 5)?,
            absolute_magnitude: row_f64(row, 6)?,
            estimated_diameter_km: row_f64(row, 7)?,
            accurate_diameter: row_bool(row, 8)?,
            albedo: row_f64(row, 9)?,
            diameter_source: DiameterSource::from_str_lossy(&row_text(row, 10)?),
            orbit_id: row_opt_text(row, 11)?,
            orbit_class: row_opt_text(row, 12)?,
            created_at: row_timestamp(row, 13)?,
            updated_at: row_timestamp(row, 14)?,
        })
    }

    fn bind_record(record: &Self::Record, stamp: &WriteStamp) -> Vec<SqlValue> {
        vec![
            SqlValue::Text(record.designation.clone()),
            opt_text_value(&record.name),
            opt_real_value(&record.perihelion_au),
            opt_real_value(&record.aphelion_au),
            opt_real_value(&record.earth_moid_au),
            SqlValue::Real(record.absolute_magnitude),
            SqlValue::Real(record.estimated_diameter_km),
            SqlValue::Integer(i64::from(record.accurate_diameter)),
            SqlValue::Real(record.albedo),
            SqlValue::Text(record.diameter_source.as_str().to_string()),
            opt_text_value(&record.orbit_id),
            opt_text_value(&record.orbit_class),
            SqlValue::Text(stamp.created_at.clone()),
            SqlValue::Text(stamp.updated_at.clone()),
        ]
    }

    fn conflict_values(record: &Self::Record) -> Vec<SqlValue> {
        vec![SqlValue::Text(record.designation.clone())]
    }

    fn conflict_values_from_row(row: &Row) -> Result<Vec<SqlValue>, DbError> {
        Ok(vec![SqlValue::Text(row_text(row, 0)?)])
    }
}

// --- CLOSE APPROACH ---

/// Registro de encuentro ya resuelto contra su asteroide propietario y
/// estampado con la corrida que lo calculó.
#[derive(Debug, Clone)]
pub struct BoundApproachRecord {
    pub asteroid_id: i64,
    pub calculation_batch_id: Option<String>,
    pub record: ApproachRecord,
}

impl CatalogEntity for CloseApproach {
    const TABLE: &'static str = "close_approaches";
    const COLUMNS: &'static [&'static str] = &[
        "asteroid_id",
        "approach_time",
        "distance_au",
        "distance_km",
        "velocity_km_s",
        "asteroid_designation",
        "asteroid_name",
        "data_source",
        "calculation_batch_id",
        "created_at",
        "updated_at",
    ];
    const CONFLICT_COLUMNS: &'static [&'static str] = &["asteroid_id", "approach_time"];
    const SEARCH_COLUMNS: &'static [&'static str] = &["asteroid_designation", "asteroid_name"];

    type Record = BoundApproachRecord;

    fn from_row(row: &Row) -> Result<Self, DbError> {
        Ok(CloseApproach {
            id: row_i64(row, 0)?,
            asteroid_id: row_i64(row, 1)?,
            approach_time: row_timestamp(row, 2)?,
            distance_au: row_f64(row, 3)?,
            distance_km: row_f64(row, 4)?,
            velocity_km_s: row_f64(row, 5)?,
            asteroid_designation: row_text(row, 6)?,
            asteroid_name: row_opt_text(row, 7)?,
            data_source: row_text(row, 8)?,
            calculation_batch_id: row_opt_text(row, 9)?,
            created_at: row_timestamp(row, 10)?,
            updated_at: row_timestamp(row, 11)?,
        })
    }

    fn bind_record(bound: &Self::Record, stamp: &WriteStamp) -> Vec<SqlValue> {
        vec![
            SqlValue::Integer(bound.asteroid_id),
            SqlValue::Text(chronos::at_boundary(&bound.record.approach_time)),
            SqlValue::Real(bound.record.distance_au),
            SqlValue::Real(bound.record.distance_km),
            SqlValue::Real(bound.record.velocity_km_s),
            SqlValue::Text(bound.record.asteroid_designation.clone()),
            opt_text_value(&bound.record.asteroid_name),
            SqlValue::Text(bound.record.data_source.clone()),
            opt_text_value(&bound.calculation_batch_id),
            SqlValue::Text(stamp.created_at.clone()),
            SqlValue::Text(stamp.updated_at.clone()),
        ]
    }

    fn conflict_values(bound: &Self::Record) -> Vec<SqlValue> {
        vec![
            SqlValue::Integer(bound.asteroid_id),
            SqlValue::Text(chronos::at_boundary(&bound.record.approach_time)),
        ]
    }

    fn conflict_values_from_row(row: &Row) -> Result<Vec<SqlValue>, DbError> {
        Ok(vec![
            SqlValue::Integer(row_i64(row, 0)?),
            SqlValue::Text(row_text(row, 1)?),
        ])
    }
}

// --- THREAT ASSESSMENT ---

/// Evaluación de amenaza resuelta contra su asteroide propietario, con
/// los campos derivados ya completados.
#[derive(Debug, Clone)]
pub struct BoundThreatRecord {
    pub asteroid_id: i64,
    pub record: ThreatRecord,
}

impl BoundThreatRecord {
    pub fn new(asteroid_id: i64, record: ThreatRecord) -> Self {
        Self {
            asteroid_id,
            record: record.with_derivations(),
        }
    }
}

impl CatalogEntity for ThreatAssessment {
    const TABLE: &'static str = "threat_assessments";
    const COLUMNS: &'static [&'static str] = &[
        "asteroid_id",
        "designation",
        "fullname",
        "ip",
        "ts_max",
        "ps_max",
        "diameter",
        "v_inf",
        "h",
        "n_imp",
        "impact_years",
        "last_obs",
        "threat_level",
        "energy_megatons",
        "impact_category",
        "created_at",
        "updated_at",
    ];
    const CONFLICT_COLUMNS: &'static [&'static str] = &["asteroid_id"];
    const SEARCH_COLUMNS: &'static [&'static str] = &["designation", "fullname"];

    type Record = BoundThreatRecord;

    fn from_row(row: &Row) -> Result<Self, DbError> {
        let impact_years_raw = row_text(row, 11)?;
        let impact_years: Vec<i64> = serde_json::from_str(&impact_years_raw).map_err(|fault| {
            DbError::MappingError(format!("impact_years column corrupted: {}", fault))
        })?;

        Ok(ThreatAssessment {
            id: row_i64(row, 0)?,
            asteroid_id: row_i64(row, 1)?,
            designation: row_text(row, 2)?,
            fullname: row_text(row, 3)?,
            ip: row_f64(row, 4)?,
            ts_max: row_i64(row, 5)?,
            ps_max: row_f64(row, 6)?,
            diameter: row_f64(row, 7)?,
            v_inf: row_f64(row, 8)?,
            h: row_f64(row, 9)?,
            n_imp: row_i64(row, 10)?,
            impact_years,
            last_obs: row_text(row, 12)?,
            threat_level: row_text(row, 13)?,
            energy_megatons: row_f64(row, 14)?,
            impact_category: ImpactCategory::from_str_lossy(&row_text(row, 15)?),
            created_at: row_timestamp(row, 16)?,
            updated_at: row_timestamp(row, 17)?,
        })
    }

    fn bind_record(bound: &Self::Record, stamp: &WriteStamp) -> Vec<SqlValue> {
        let record = &bound.record;

        // Los derivados llegan completos vía 'BoundThreatRecord::new';
        // los respaldos cubren construcciones manuales.
        let energy_megatons = record
            .energy_megatons
            .unwrap_or(0.0)
            .max(0.0);
        let impact_category = record
            .impact_category
            .unwrap_or(ImpactCategory::Local);
        let threat_level = record
            .threat_level
            .clone()
            .unwrap_or_else(|| "zero".to_string());
        let impact_years_json =
            serde_json::to_string(&record.impact_years).unwrap_or_else(|_| "[]".to_string());

        vec![
            SqlValue::Integer(bound.asteroid_id),
            SqlValue::Text(record.designation.clone()),
            SqlValue::Text(record.fullname.clone()),
            SqlValue::Real(record.ip),
            SqlValue::Integer(record.ts_max),
            SqlValue::Real(record.ps_max),
            SqlValue::Real(record.diameter),
            SqlValue::Real(record.v_inf),
            SqlValue::Real(record.h),
            SqlValue::Integer(record.n_imp),
            SqlValue::Text(impact_years_json),
            SqlValue::Text(record.last_obs.clone()),
            SqlValue::Text(threat_level),
            SqlValue::Real(energy_megatons),
            SqlValue::Text(impact_category.as_str().to_string()),
            SqlValue::Text(stamp.created_at.clone()),
            SqlValue::Text(stamp.updated_at.clone()),
        ]
    }

    fn conflict_values(bound: &Self::Record) -> Vec<SqlValue> {
        vec![SqlValue::Integer(bound.asteroid_id)]
    }

    fn conflict_values_from_row(row: &Row) -> Result<Vec<SqlValue>, DbError> {
        Ok(vec![SqlValue::Integer(row_i64(row, 0)?)])
    }
}
