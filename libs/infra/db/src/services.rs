// [libs/infra/db/src/services.rs]
/*!
 * =================================================================
 * APARATO: CATALOG QUERY SERVICES (V1.4 - SOBERANO)
 * CLASIFICACIÓN: READ FACADE (ESTRATO L3)
 * RESPONSABILIDAD: FACHADAS DE LECTURA SOBRE EL UOW CON DTOS SERIALIZABLES
 *
 * Cada llamada abre un UoW, ejecuta una o más consultas de repositorio
 * y convierte filas en DTOs con marcas temporales ISO-8601. Sin lógica
 * de negocio más allá de paginación y selección de campos.
 * =================================================================
 */

use crate::client::CatalogClient;
use crate::errors::DbError;
use crate::filters::{FilterCondition, FilterOp, FilterValue};
use crate::uow::UnitOfWork;
use centinela_domain_models::{chronos, Asteroid, CloseApproach, ThreatAssessment};
use serde::Serialize;
use tracing::instrument;

// --- DTOS DE FRONTERA ---

#[derive(Debug, Clone, Serialize)]
pub struct AsteroidDto {
    pub id: i64,
    pub designation: String,
    pub name: Option<String>,
    pub perihelion_au: Option<f64>,
    pub aphelion_au: Option<f64>,
    pub earth_moid_au: Option<f64>,
    pub absolute_magnitude: f64,
    pub estimated_diameter_km: f64,
    pub accurate_diameter: bool,
    pub albedo: f64,
    pub diameter_source: String,
    pub orbit_id: Option<String>,
    pub orbit_class: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Asteroid> for AsteroidDto {
    fn from(row: &Asteroid) -> Self {
        Self {
            id: row.id,
            designation: row.designation.clone(),
            name: row.name.clone(),
            perihelion_au: row.perihelion_au,
            aphelion_au: row.aphelion_au,
            earth_moid_au: row.earth_moid_au,
            absolute_magnitude: row.absolute_magnitude,
            estimated_diameter_km: row.estimated_diameter_km,
            accurate_diameter: row.accurate_diameter,
            albedo: row.albedo,
            diameter_source: row.diameter_source.as_str().to_string(),
            orbit_id: row.orbit_id.clone(),
            orbit_class: row.orbit_class.clone(),
            created_at: chronos::at_boundary(&row.created_at),
            updated_at: chronos::at_boundary(&row.updated_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApproachDto {
    pub id: i64,
    pub asteroid_id: i64,
    pub asteroid_designation: String,
    pub asteroid_name: Option<String>,
    pub approach_time: String,
    pub distance_au: f64,
    pub distance_km: f64,
    pub velocity_km_s: f64,
    pub data_source: String,
    pub calculation_batch_id: Option<String>,
}

impl From<&CloseApproach> for ApproachDto {
    fn from(row: &CloseApproach) -> Self {
        Self {
            id: row.id,
            asteroid_id: row.asteroid_id,
            asteroid_designation: row.asteroid_designation.clone(),
            asteroid_name: row.asteroid_name.clone(),
            approach_time: chronos::at_boundary(&row.approach_time),
            distance_au: row.distance_au,
            distance_km: row.distance_km,
            velocity_km_s: row.velocity_km_s,
            data_source: row.data_source.clone(),
            calculation_batch_id: row.calculation_batch_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ThreatDto {
    pub asteroid_id: i64,
    pub designation: String,
    pub fullname: String,
    pub ip: f64,
    pub ts_max: i64,
    pub ps_max: f64,
    pub diameter: f64,
    pub v_inf: f64,
    pub h: f64,
    pub n_imp: i64,
    pub impact_years: Vec<i64>,
    pub last_obs: String,
    pub threat_level: String,
    pub energy_megatons: f64,
    pub impact_category: String,
}

impl From<&ThreatAssessment> for ThreatDto {
    fn from(row: &ThreatAssessment) -> Self {
        Self {
            asteroid_id: row.asteroid_id,
            designation: row.designation.clone(),
            fullname: row.fullname.clone(),
            ip: row.ip,
            ts_max: row.ts_max,
            ps_max: row.ps_max,
            diameter: row.diameter,
            v_inf: row.v_inf,
            h: row.h,
            n_imp: row.n_imp,
            impact_years: row.impact_years.clone(),
            last_obs: row.last_obs.clone(),
            threat_level: row.threat_level.clone(),
            energy_megatons: row.energy_megatons,
            impact_category: row.impact_category.as_str().to_string(),
        }
    }
}

/// Vista completa de un cuerpo: ficha, encuentros ordenados y amenaza.
#[derive(Debug, Clone, Serialize)]
pub struct AsteroidDetailDto {
    pub asteroid: AsteroidDto,
    pub approaches: Vec<ApproachDto>,
    pub approaches_count: usize,
    pub threat: Option<ThreatDto>,
}

/// Panorama agregado del catálogo.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogStatisticsDto {
    pub asteroid_count: i64,
    pub approach_count: i64,
    pub threat_count: i64,
    pub measured_diameters: i64,
    pub computed_diameters: i64,
    pub calculated_diameters: i64,
}

// --- SERVICIOS DE CONSULTA ---

/// Fachada de lectura de asteroides.
pub struct AsteroidQueryService {
    client: CatalogClient,
}

impl AsteroidQueryService {
    pub fn new(client: CatalogClient) -> Self {
        Self { client }
    }

    /// Listado paginado por identidad.
    #[instrument(skip(self))]
    pub async fn list(&self, skip: u32, limit: u32) -> Result<Vec<AsteroidDto>, DbError> {
        let uow = UnitOfWork::begin(&self.client).await?;
        let rows = uow.asteroid_repo().core().get_all(skip, Some(limit)).await?;
        uow.commit().await?;
        Ok(rows.iter().map(AsteroidDto::from).collect())
    }

    /// Búsqueda difusa por designación, nombre o clase orbital.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        term: &str,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<AsteroidDto>, DbError> {
        let uow = UnitOfWork::begin(&self.client).await?;
        let rows = uow
            .asteroid_repo()
            .core()
            .search(term, &["designation", "name", "orbit_class"], skip, Some(limit))
            .await?;
        uow.commit().await?;
        Ok(rows.iter().map(AsteroidDto::from).collect())
    }

    /// Ficha completa: asteroide, encuentros cronológicos y amenaza.
    #[instrument(skip(self))]
    pub async fn details(&self, asteroid_id: i64) -> Result<Option<AsteroidDetailDto>, DbError> {
        let uow = UnitOfWork::begin(&self.client).await?;

        let Some(asteroid) = uow.asteroid_repo().core().get_by_id(asteroid_id).await? else {
            uow.commit().await?;
            return Ok(None);
        };

        let approaches = uow
            .approach_repo()
            .core()
            .filter(
                &[FilterCondition::new(
                    "asteroid_id",
                    FilterOp::Eq,
                    FilterValue::from(asteroid_id),
                )],
                0,
                None,
                Some("approach_time"),
                false,
            )
            .await?;

        let threat = uow.threat_repo().find_by_asteroid_id(asteroid_id).await?;
        uow.commit().await?;

        let approach_dtos: Vec<ApproachDto> = approaches.iter().map(ApproachDto::from).collect();
        Ok(Some(AsteroidDetailDto {
            asteroid: AsteroidDto::from(&asteroid),
            approaches_count: approach_dtos.len(),
            approaches: approach_dtos,
            threat: threat.as_ref().map(ThreatDto::from),
        }))
    }

    /// Panorama agregado del catálogo (conteos y procedencia de diámetros).
    #[instrument(skip(self))]
    pub async fn statistics(&self) -> Result<CatalogStatisticsDto, DbError> {
        let uow = UnitOfWork::begin(&self.client).await?;

        let asteroid_count = uow.asteroid_repo().core().count().await?;
        let approach_count = uow.approach_repo().core().count().await?;
        let threat_count = uow.threat_repo().core().count().await?;

        let connection = uow.session().connection()?;
        let mut rows = connection
            .query(
                "SELECT diameter_source, COUNT(*) FROM asteroids GROUP BY diameter_source",
                (),
            )
            .await
            .map_err(DbError::QueryError)?;

        let mut measured = 0i64;
        let mut computed = 0i64;
        let mut calculated = 0i64;

        while let Some(row) = rows.next().await.map_err(DbError::QueryError)? {
            let source = row.get::<String>(0).map_err(DbError::QueryError)?;
            let count = row.get::<i64>(1).map_err(DbError::QueryError)?;
            match source.as_str() {
                "measured" => measured = count,
                "computed" => computed = count,
                _ => calculated = count,
            }
        }

        uow.commit().await?;

        Ok(CatalogStatisticsDto {
            asteroid_count,
            approach_count,
            threat_count,
            measured_diameters: measured,
            computed_diameters: computed,
            calculated_diameters: calculated,
        })
    }
}

/// Fachada de lectura de encuentros cercanos.
pub struct ApproachQueryService {
    client: CatalogClient,
}

impl ApproachQueryService {
    pub fn new(client: CatalogClient) -> Self {
        Self { client }
    }

    /// Encuentros dentro de los próximos 'days' días, cronológicos.
    #[instrument(skip(self))]
    pub async fn upcoming(&self, days: i64, limit: u32) -> Result<Vec<ApproachDto>, DbError> {
        let now = chronos::now_utc();
        let horizon = now + chrono::Duration::days(days);

        let uow = UnitOfWork::begin(&self.client).await?;
        let rows = uow
            .approach_repo()
            .core()
            .filter(
                &[
                    FilterCondition::new("approach_time", FilterOp::Ge, FilterValue::from(now)),
                    FilterCondition::new("approach_time", FilterOp::Le, FilterValue::from(horizon)),
                ],
                0,
                Some(limit),
                Some("approach_time"),
                false,
            )
            .await?;
        uow.commit().await?;

        Ok(rows.iter().map(ApproachDto::from).collect())
    }

    /// Encuentros más cercanos del catálogo, por distancia ascendente.
    #[instrument(skip(self))]
    pub async fn closest(&self, limit: u32) -> Result<Vec<ApproachDto>, DbError> {
        let uow = UnitOfWork::begin(&self.client).await?;
        let rows = uow
            .approach_repo()
            .core()
            .filter(&[], 0, Some(limit), Some("distance_au"), false)
            .await?;
        uow.commit().await?;

        Ok(rows.iter().map(ApproachDto::from).collect())
    }
}

/// Fachada de lectura de evaluaciones de amenaza.
pub struct ThreatQueryService {
    client: CatalogClient,
}

impl ThreatQueryService {
    pub fn new(client: CatalogClient) -> Self {
        Self { client }
    }

    /// Resumen de amenaza por designación; la ausencia es un resultado.
    #[instrument(skip(self))]
    pub async fn summary(&self, designation: &str) -> Result<Option<ThreatDto>, DbError> {
        let uow = UnitOfWork::begin(&self.client).await?;
        let threat = uow.threat_repo().find_by_designation(designation).await?;
        uow.commit().await?;
        Ok(threat.as_ref().map(ThreatDto::from))
    }

    /// Listado paginado ordenado por pico de Torino descendente.
    #[instrument(skip(self))]
    pub async fn list(&self, skip: u32, limit: u32) -> Result<Vec<ThreatDto>, DbError> {
        let uow = UnitOfWork::begin(&self.client).await?;
        let rows = uow
            .threat_repo()
            .core()
            .filter(&[], skip, Some(limit), Some("ts_max"), true)
            .await?;
        uow.commit().await?;
        Ok(rows.iter().map(ThreatDto::from).collect())
    }
}
