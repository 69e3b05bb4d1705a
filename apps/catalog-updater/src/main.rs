// [apps/catalog-updater/src/main.rs]
/**
 * =================================================================
 * APARATO: CATALOG UPDATER SHELL (V1.2 - SOBERANO)
 * CLASIFICACIÓN: APPLICATION LAYER (ENTRY POINT)
 * RESPONSABILIDAD: ORQUESTACIÓN DE ARGUMENTOS Y DISPARO DEL CICLO DIARIO
 *
 * Contrato de salida del proceso: 0 con reporte de éxito, 1 con
 * reporte de error, 130 ante interrupción por señal.
 * =================================================================
 */

mod bootstrap;

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};

use centinela_domain_ingestion::UpdateStatus;

/// Configuración del ciclo diario de actualización del catálogo PHA.
#[derive(Parser, Debug)]
#[command(
    author = "Raz Podesta <metaShark Tech>",
    version = "1.2",
    about = "Centinela: actualiza el catálogo local de asteroides potencialmente peligrosos."
)]
pub struct CommandArguments {
    /// URL del Motor A (archivo local, ':memory:' o remoto libsql://).
    #[arg(long, env = "DATABASE_URL", default_value = "file:centinela_catalog.db")]
    pub database_url: String,

    /// Token de acceso para bases remotas.
    #[arg(long, env = "DATABASE_AUTH_TOKEN")]
    pub database_auth_token: Option<String>,

    /// Raíz de los servicios de efemérides externos.
    #[arg(
        long,
        env = "CENTINELA_FEED_BASE_URL",
        default_value = centinela_infra_feeds::DEFAULT_FEED_BASE_URL
    )]
    pub feed_base_url: String,

    /// Tope del listado de cuerpos menores (por defecto, el del feed).
    #[arg(short, long, env = "CENTINELA_LIST_LIMIT")]
    pub limit: Option<u32>,

    /// Asteroides procesados por corrida en la etapa de encuentros.
    #[arg(long, env = "CENTINELA_MAX_ASTEROIDS", default_value_t = 50)]
    pub max_asteroids: usize,

    /// Workers concurrentes de la etapa de encuentros.
    #[arg(long, env = "CENTINELA_WORKERS", default_value_t = 3)]
    pub workers: usize,

    /// Designaciones por ráfaga de detalle del feed de cuerpos menores.
    #[arg(long, env = "CENTINELA_BATCH_SIZE", default_value_t = 50)]
    pub batch_size: usize,

    /// Plazo (s) del feed de cuerpos menores.
    #[arg(long, env = "CENTINELA_SMALL_BODY_TIMEOUT", default_value_t = 30)]
    pub small_body_timeout: u64,

    /// Plazo (s) del feed de encuentros cercanos.
    #[arg(long, env = "CENTINELA_CLOSE_APPROACH_TIMEOUT", default_value_t = 60)]
    pub close_approach_timeout: u64,

    /// Plazo (s) del feed de riesgo de impacto.
    #[arg(long, env = "CENTINELA_IMPACT_RISK_TIMEOUT", default_value_t = 120)]
    pub impact_risk_timeout: u64,

    /// Sincroniza las evaluaciones con el feed de riesgo tras la corrida.
    #[arg(long, default_value_t = false)]
    pub sync_threats: bool,
}

/// Código de proceso convencional ante interrupción por señal.
const SIGNAL_EXIT_CODE: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    // 1. CARGA DE ENTORNO Y SISTEMA NERVIOSO (LOGGING)
    dotenvy::dotenv().ok();
    centinela_shared_heimdall::init_tracing("catalog_updater");

    // 2. PARSEO DE DIRECTIVAS DE MANDO
    let cli_arguments = CommandArguments::parse();
    info!("🛰️ [UPDATER]: Initializing execution shell V1.2...");

    // 3. CABLEADO DEL SERVICIO DE INGESTA
    let update_service = match bootstrap::build_update_service(&cli_arguments).await {
        Ok(service) => service,
        Err(boot_fault) => {
            error!("❌ [UPDATER]: Bootstrap collapsed: {:#}", boot_fault);
            return ExitCode::from(1);
        }
    };

    // 4. EJECUCIÓN DEL CICLO, EN CARRERA CONTRA LA SEÑAL DE CORTE
    info!("🚀 [UPDATER]: Starting daily update cycle.");
    let report = tokio::select! {
        report = update_service.run_daily_update() => report,
        _ = tokio::signal::ctrl_c() => {
            warn!("🛑 [UPDATER]: Interrupt signal received. Aborting run.");
            return ExitCode::from(SIGNAL_EXIT_CODE);
        }
    };

    // 5. REPORTE ESTRUCTURADO HACIA EL OPERADOR
    match serde_json::to_string_pretty(&report) {
        Ok(rendered_report) => println!("{}", rendered_report),
        Err(render_fault) => error!("❌ [UPDATER]: Report rendering failed: {}", render_fault),
    }

    // 6. SINCRONIZACIÓN OPCIONAL CON EL FEED DE RIESGO
    if cli_arguments.sync_threats && report.status == UpdateStatus::Success {
        match update_service.sync_impact_risks().await {
            Ok(sync_report) => {
                match serde_json::to_string_pretty(&sync_report) {
                    Ok(rendered) => println!("{}", rendered),
                    Err(render_fault) => {
                        error!("❌ [UPDATER]: Sync report rendering failed: {}", render_fault)
                    }
                }
            }
            Err(sync_fault) => {
                error!("❌ [UPDATER]: Threat sync failed: {}", sync_fault);
                return ExitCode::from(1);
            }
        }
    }

    match report.status {
        UpdateStatus::Success => ExitCode::SUCCESS,
        UpdateStatus::Error => ExitCode::from(1),
    }
}
