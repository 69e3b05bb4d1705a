// [tests/mirror/libs/infra/feeds/timestamp_grammar.test.rs]
/*!
 * =================================================================
 * APARATO: CERTIFICADOR DE GRAMÁTICA TEMPORAL (V1.3 - PROVING GROUNDS)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L3-MIRROR
 * RESPONSABILIDAD: AUDITORÍA DEL PARSEO ESTRICTO DE MARCAS DEL FEED
 *
 * Contrato certificado: el formato primario 'YYYY-MMM-DD HH:MM' con
 * mes inglés mapea al instante UTC exacto; las variantes toleradas
 * parsean; una cadena malformada produce None, jamás un instante
 * fabricado.
 * =================================================================
 */

use centinela_domain_models::chronos;
use centinela_infra_feeds::dates::parse_feed_timestamp;
use chrono::{TimeZone, Utc};

#[test]
fn certify_primary_format_exact_instant() {
    // Referencia documentada: el encuentro de Apophis.
    let parsed = parse_feed_timestamp("2029-Apr-13 21:46").expect("primary format must parse");
    let expected = Utc.with_ymd_and_hms(2029, 4, 13, 21, 46, 0).unwrap();

    assert_eq!(parsed, expected);
    assert_eq!(chronos::at_boundary(&parsed), "2029-04-13T21:46:00Z");
}

#[test]
fn certify_tolerated_variants() {
    let with_seconds = parse_feed_timestamp("2029-Apr-13 21:46:30").unwrap();
    assert_eq!(
        with_seconds,
        Utc.with_ymd_and_hms(2029, 4, 13, 21, 46, 30).unwrap()
    );

    let numeric_month = parse_feed_timestamp("2029-04-13 21:46").unwrap();
    assert_eq!(
        numeric_month,
        Utc.with_ymd_and_hms(2029, 4, 13, 21, 46, 0).unwrap()
    );

    let iso_like = parse_feed_timestamp("2029-04-13T21:46:30").unwrap();
    assert_eq!(
        iso_like,
        Utc.with_ymd_and_hms(2029, 4, 13, 21, 46, 30).unwrap()
    );

    // Fecha sin hora: medianoche UTC implícita.
    let date_only = parse_feed_timestamp("2029-Apr-13").unwrap();
    assert_eq!(date_only, Utc.with_ymd_and_hms(2029, 4, 13, 0, 0, 0).unwrap());

    // Espacios periféricos se toleran.
    let padded = parse_feed_timestamp("  2029-Apr-13 21:46  ").unwrap();
    assert_eq!(padded, Utc.with_ymd_and_hms(2029, 4, 13, 21, 46, 0).unwrap());
}

#[test]
fn certify_malformed_yields_none() {
    for malformed in [
        "not-a-date",
        "",
        "   ",
        "2029-Abr-13 21:46",
        "13/04/2029 21:46",
        "2029-Apr-32 21:46",
        "2029-Apr-13 25:99",
    ] {
        assert!(
            parse_feed_timestamp(malformed).is_none(),
            "'{}' must never fabricate an instant",
            malformed
        );
    }
}

#[test]
fn certify_english_months_independent_of_locale() {
    // Los doce meses ingleses parsean sin tocar el locale del proceso.
    let months = [
        ("Jan", 1),
        ("Feb", 2),
        ("Mar", 3),
        ("Apr", 4),
        ("May", 5),
        ("Jun", 6),
        ("Jul", 7),
        ("Aug", 8),
        ("Sep", 9),
        ("Oct", 10),
        ("Nov", 11),
        ("Dec", 12),
    ];

    for (abbreviation, month_number) in months {
        let raw = format!("2030-{}-05 12:00", abbreviation);
        let parsed = parse_feed_timestamp(&raw).expect("english month must parse");
        assert_eq!(
            parsed,
            Utc.with_ymd_and_hms(2030, month_number, 5, 12, 0, 0).unwrap()
        );
    }
}
