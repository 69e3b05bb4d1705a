// [apps/catalog-updater/src/bootstrap.rs]
/*!
 * =================================================================
 * APARATO: UPDATER BOOTSTRAP (V1.2 - SOBERANO)
 * CLASIFICACIÓN: APPLICATION LAYER (ESTRATO L1)
 * RESPONSABILIDAD: CABLEADO DE CLIENTES, PERFILES Y SERVICIO DE INGESTA
 *
 * Composición única en el arranque del proceso: los guardianes de
 * endpoint y los clientes de feed se construyen aquí y se inyectan en
 * el pipeline; ningún estrato inferior hace lookups ambientales.
 * =================================================================
 */

use crate::CommandArguments;
use anyhow::{Context, Result};
use centinela_domain_ingestion::{DataUpdateService, IngestionConfig};
use centinela_infra_db::CatalogClient;
use centinela_infra_feeds::{
    CloseApproachClient, ImpactRiskClient, SmallBodyClient, SmallBodyConfig,
};
use centinela_shared_resilience::EndpointProfile;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/**
 * Construye el servicio de actualización con la sintonía de la línea
 * de comandos y el entorno.
 *
 * # Errors:
 * Retorna error si el enlace con el Motor A no puede establecerse o el
 * esquema no solidifica.
 */
pub async fn build_update_service(arguments: &CommandArguments) -> Result<DataUpdateService> {
    // 1. ENLACE CON EL MOTOR A (bootstrap de esquema incluido)
    let catalog_client = CatalogClient::connect(
        &arguments.database_url,
        arguments.database_auth_token.clone(),
    )
    .await
    .context("BOOT_FAULT: catalog database link failed")?;

    // 2. PERFILES DE PROTECCIÓN POR ENDPOINT (plazos sintonizables)
    let small_body_profile = EndpointProfile::small_body()
        .with_call_timeout(Duration::from_secs(arguments.small_body_timeout));
    let close_approach_profile = EndpointProfile::close_approach()
        .with_call_timeout(Duration::from_secs(arguments.close_approach_timeout));
    let impact_risk_profile = EndpointProfile::impact_risk()
        .with_call_timeout(Duration::from_secs(arguments.impact_risk_timeout));

    // 3. CLIENTES DE FEED
    let small_body_client = Arc::new(SmallBodyClient::new(
        small_body_profile,
        SmallBodyConfig {
            base_url: arguments.feed_base_url.clone(),
            batch_size: arguments.batch_size,
            ..SmallBodyConfig::default()
        },
    ));
    let close_approach_client = Arc::new(CloseApproachClient::new(
        close_approach_profile,
        &arguments.feed_base_url,
    ));
    let impact_risk_client = Arc::new(ImpactRiskClient::new(
        impact_risk_profile,
        &arguments.feed_base_url,
    ));

    // 4. SINTONÍA DEL PIPELINE
    let ingestion_config = IngestionConfig {
        list_limit: arguments.limit,
        max_asteroids_per_run: arguments.max_asteroids,
        worker_count: arguments.workers,
        ..IngestionConfig::default()
    };

    info!(
        "🧩 [BOOTSTRAP]: Update service wired (db=[{}], feeds=[{}]).",
        arguments.database_url, arguments.feed_base_url
    );

    Ok(DataUpdateService::new(
        catalog_client,
        small_body_client,
        close_approach_client,
        impact_risk_client,
        ingestion_config,
    ))
}
