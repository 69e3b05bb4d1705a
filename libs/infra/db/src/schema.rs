// [libs/infra/db/src/schema.rs]
/*!
 * =================================================================
 * APARATO: CATALOG DATABASE SCHEMA (V1.4 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: GOBERNANZA ESTRUCTURAL E IDEMPOTENCIA TOTAL
 *
 * Tres tablas con sus invariantes sellados en el esquema: unicidad de
 * designación, clave natural (asteroid_id, approach_time), relación
 * uno-a-uno de amenazas, CHECKs de dominio y borrado en cascada desde
 * el asteroide propietario.
 * =================================================================
 */

use crate::errors::DbError;
use libsql::Connection;
use tracing::{debug, info, instrument};

/// ESTRATO 1: SOLIDIFICACIÓN (Génesis de Tablas)
const CATALOG_TABLES: &[(&str, &str)] = &[
    (
        "TABLE_ASTEROIDS",
        r#"
        CREATE TABLE IF NOT EXISTS asteroids (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            designation TEXT NOT NULL UNIQUE CHECK (length(designation) <= 50),
            name TEXT CHECK (name IS NULL OR length(name) <= 100),
            perihelion_au REAL CHECK (perihelion_au IS NULL OR perihelion_au > 0),
            aphelion_au REAL,
            earth_moid_au REAL CHECK (earth_moid_au IS NULL OR earth_moid_au >= 0),
            absolute_magnitude REAL NOT NULL,
            estimated_diameter_km REAL NOT NULL CHECK (estimated_diameter_km > 0),
            accurate_diameter INTEGER NOT NULL CHECK (accurate_diameter IN (0, 1)),
            albedo REAL NOT NULL CHECK (albedo > 0 AND albedo <= 1),
            diameter_source TEXT NOT NULL
                CHECK (diameter_source IN ('measured', 'computed', 'calculated')),
            orbit_id TEXT,
            orbit_class TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            CHECK (aphelion_au IS NULL OR perihelion_au IS NULL OR aphelion_au > perihelion_au)
        );
    "#,
    ),
    (
        "TABLE_CLOSE_APPROACHES",
        r#"
        CREATE TABLE IF NOT EXISTS close_approaches (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            asteroid_id INTEGER NOT NULL
                REFERENCES asteroids(id) ON DELETE CASCADE,
            approach_time TEXT NOT NULL,
            distance_au REAL NOT NULL CHECK (distance_au >= 0),
            distance_km REAL NOT NULL CHECK (distance_km >= 0),
            velocity_km_s REAL NOT NULL CHECK (velocity_km_s >= 0),
            asteroid_designation TEXT NOT NULL CHECK (length(asteroid_designation) <= 50),
            asteroid_name TEXT CHECK (asteroid_name IS NULL OR length(asteroid_name) <= 100),
            data_source TEXT NOT NULL DEFAULT 'CloseApproach feed'
                CHECK (length(data_source) <= 50),
            calculation_batch_id TEXT CHECK (
                calculation_batch_id IS NULL OR length(calculation_batch_id) <= 50
            ),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (asteroid_id, approach_time)
        );
    "#,
    ),
    (
        "TABLE_THREAT_ASSESSMENTS",
        r#"
        CREATE TABLE IF NOT EXISTS threat_assessments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            asteroid_id INTEGER NOT NULL UNIQUE
                REFERENCES asteroids(id) ON DELETE CASCADE,
            designation TEXT NOT NULL UNIQUE,
            fullname TEXT NOT NULL,
            ip REAL NOT NULL CHECK (ip >= 0),
            ts_max INTEGER NOT NULL CHECK (ts_max >= 0 AND ts_max <= 10),
            ps_max REAL NOT NULL,
            diameter REAL NOT NULL CHECK (diameter >= 0),
            v_inf REAL NOT NULL CHECK (v_inf >= 0),
            h REAL NOT NULL CHECK (h >= 0),
            n_imp INTEGER NOT NULL CHECK (n_imp >= 0),
            impact_years TEXT NOT NULL,
            last_obs TEXT NOT NULL,
            threat_level TEXT NOT NULL,
            energy_megatons REAL NOT NULL CHECK (energy_megatons >= 0),
            impact_category TEXT NOT NULL
                CHECK (impact_category IN ('local', 'regional', 'global')),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
    "#,
    ),
];

/// ESTRATO 2: ACELERACIÓN (Índices de consulta)
const ACCELERATION_INDEXES: &[(&str, &str)] = &[
    (
        "IDX_APPROACHES_TIME",
        "CREATE INDEX IF NOT EXISTS idx_close_approaches_time ON close_approaches(approach_time);",
    ),
    (
        "IDX_APPROACHES_ASTEROID",
        "CREATE INDEX IF NOT EXISTS idx_close_approaches_asteroid ON close_approaches(asteroid_id);",
    ),
    (
        "IDX_APPROACHES_BATCH",
        "CREATE INDEX IF NOT EXISTS idx_close_approaches_batch ON close_approaches(calculation_batch_id);",
    ),
    (
        "IDX_THREATS_DESIGNATION",
        "CREATE INDEX IF NOT EXISTS idx_threat_assessments_designation ON threat_assessments(designation);",
    ),
];

/**
 * Ejecuta la secuencia maestra de sincronización del esquema.
 *
 * # Errors:
 * Retorna error si alguna tabla base falla en solidificarse.
 */
#[instrument(skip(database_connection))]
pub async fn apply_catalog_schema(database_connection: &Connection) -> Result<(), DbError> {
    info!("🏗️ [SCHEMA_ENGINE]: Initiating catalog structural synchronization...");

    for (identifier, sql) in CATALOG_TABLES {
        debug!("  ↳ Solidifying: {}", identifier);
        database_connection
            .execute(*sql, ())
            .await
            .map_err(|fault| {
                DbError::ConnectionError(format!("SCHEMA_FAULT [{}]: {}", identifier, fault))
            })?;
    }

    for (identifier, sql) in ACCELERATION_INDEXES {
        debug!("  ↳ Hardening: {}", identifier);
        database_connection
            .execute(*sql, ())
            .await
            .map_err(|fault| {
                DbError::ConnectionError(format!("INDEX_FAULT [{}]: {}", identifier, fault))
            })?;
    }

    info!("✅ [SCHEMA_ENGINE]: Catalog schema level and certified.");
    Ok(())
}
