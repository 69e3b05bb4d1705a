// [tests/mirror/libs/domain/ingestion/report_shape.test.rs]
/*!
 * =================================================================
 * APARATO: CERTIFICADOR DEL REPORTE DE CORRIDA (V1.2 - PROVING GROUNDS)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L2-MIRROR
 * RESPONSABILIDAD: AUDITORÍA DE LA FORMA ESTRUCTURADA DEL DESENLACE
 *
 * El reporte es el contrato con el operador: estado terminal, conteos
 * por etapa, frontera temporal ISO-8601 y, en el error, un único
 * mensaje.
 * =================================================================
 */

use centinela_domain_models::chronos;
use centinela_domain_ingestion::{
    ApproachCounters, AsteroidCounters, PerformanceCounters, PruneCounters, ReportTimestamps,
    ThreatSyncReport, UpdateReport, UpdateStatus,
};
use serde_json::json;

#[test]
fn certify_empty_run_report_shape() {
    let started_at = chronos::now_utc();
    let report = UpdateReport::empty("update_20290413_214600", started_at, 120);

    assert_eq!(report.status, UpdateStatus::Success);
    assert_eq!(report.asteroids.total, 120);
    assert_eq!(report.asteroids.pha_count, 0);
    assert_eq!(report.approaches.saved, 0);
    assert_eq!(report.cleanup.deleted_past_approaches, 0);

    let rendered = serde_json::to_value(&report).expect("report must serialize");
    assert_eq!(rendered["update_id"], json!("update_20290413_214600"));
    assert_eq!(rendered["status"], json!("success"));
    // El error ausente no aparece en la trama.
    assert!(rendered.get("error").is_none());
    // Frontera temporal en ISO-8601 UTC con sufijo Z.
    let start_stamp = rendered["timestamps"]["start"]
        .as_str()
        .expect("start must be a string");
    assert!(start_stamp.ends_with('Z'));
    assert!(chronos::parse_boundary(start_stamp).is_some());
}

#[test]
fn certify_error_report_single_message() {
    let started_at = chronos::now_utc();
    let report = UpdateReport::failed(
        "update_20290413_214600",
        started_at,
        "[L2_INGESTION_FEED_FAULT]: upstream sealed".to_string(),
    );

    assert_eq!(report.status, UpdateStatus::Error);

    let rendered = serde_json::to_value(&report).expect("report must serialize");
    assert_eq!(rendered["status"], json!("error"));
    assert_eq!(
        rendered["error"],
        json!("[L2_INGESTION_FEED_FAULT]: upstream sealed")
    );
    assert!(rendered["duration_seconds"].as_f64().unwrap() >= 0.0);
}

#[test]
fn certify_full_report_counters_roundtrip() {
    let started_at = chronos::now_utc();
    let report = UpdateReport {
        update_id: "update_20300101_000000".to_string(),
        status: UpdateStatus::Success,
        error: None,
        duration_seconds: 42.5,
        asteroids: AsteroidCounters {
            total: 2800,
            pha_count: 2350,
            created: 12,
            updated: 2338,
        },
        approaches: ApproachCounters {
            computed: 180,
            saved: 175,
            with_threats: 40,
            malformed_records: 1,
            skipped_unresolved: 4,
        },
        cleanup: PruneCounters {
            deleted_past_approaches: 9,
            deleted_future_approaches: 2,
        },
        timestamps: ReportTimestamps {
            start: chronos::at_boundary(&started_at),
            end: chronos::at_boundary(&chronos::now_utc()),
        },
        performance: PerformanceCounters {
            asteroids_per_second: 55.3,
        },
    };

    let rendered = serde_json::to_value(&report).expect("report must serialize");
    assert_eq!(rendered["asteroids"]["pha_count"], json!(2350));
    assert_eq!(rendered["approaches"]["saved"], json!(175));
    assert_eq!(rendered["approaches"]["malformed_records"], json!(1));
    assert_eq!(rendered["cleanup"]["deleted_future_approaches"], json!(2));
    assert_eq!(rendered["performance"]["asteroids_per_second"], json!(55.3));
}

#[test]
fn certify_threat_sync_report_shape() {
    let sync_report = ThreatSyncReport {
        fetched: 430,
        saved: 18,
        skipped_unresolved: 412,
    };

    let rendered = serde_json::to_value(&sync_report).expect("sync report must serialize");
    assert_eq!(rendered["fetched"], json!(430));
    assert_eq!(rendered["saved"], json!(18));
    assert_eq!(rendered["skipped_unresolved"], json!(412));
}
