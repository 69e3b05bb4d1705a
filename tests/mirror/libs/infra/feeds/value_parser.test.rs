// [tests/mirror/libs/infra/feeds/value_parser.test.rs]
/*!
 * =================================================================
 * APARATO: CERTIFICADOR DEL PARSER TOLERANTE (V1.3 - PROVING GROUNDS)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L3-MIRROR
 * RESPONSABILIDAD: AUDITORÍA DE COERCIÓN DE MAGNITUDES HETEROGÉNEAS
 *
 * La fuente mezcla números, envoltorios, listas y cadenas con unidad;
 * el parser devuelve Option<f64> y jamás lanza: la ausencia es un
 * resultado.
 * =================================================================
 */

use centinela_domain_models::space_math::ASTRONOMICAL_UNIT_KM;
use centinela_infra_feeds::value::{integer, length_km, magnitude, scalar, speed_km_s};
use serde_json::json;

#[test]
fn certify_scalar_shapes() {
    // Número plano y cadena numérica.
    assert_eq!(scalar(&json!(0.342)), Some(0.342));
    assert_eq!(scalar(&json!("0.342")), Some(0.342));
    assert_eq!(scalar(&json!("  19.7 ")), Some(19.7));
    assert_eq!(scalar(&json!("1.23e-4")), Some(1.23e-4));
    assert_eq!(scalar(&json!("-5.5")), Some(-5.5));

    // Envoltorios con clave de valor.
    assert_eq!(scalar(&json!({ "value": 2.5 })), Some(2.5));
    assert_eq!(scalar(&json!({ "est": "3.1" })), Some(3.1));
    assert_eq!(scalar(&json!({ "val": { "value": 4.0 } })), Some(4.0));
    assert_eq!(scalar(&json!({ "mean": 6.25 })), Some(6.25));

    // Listas: primer elemento.
    assert_eq!(scalar(&json!([7.5, 9.9])), Some(7.5));

    // Ausencia como resultado.
    assert_eq!(scalar(&json!(null)), None);
    assert_eq!(scalar(&json!("sin datos")), None);
    assert_eq!(scalar(&json!({})), None);
    assert_eq!(scalar(&json!([])), None);
    assert_eq!(scalar(&json!(true)), None);
}

#[test]
fn certify_length_unit_normalization() {
    // km explícito permanece.
    assert_eq!(length_km(&json!("1.5 km")), Some(1.5));

    // metros se normalizan a km.
    assert_eq!(length_km(&json!("500 m")), Some(0.5));

    // unidades astronómicas se expanden con la constante canónica.
    let from_au = length_km(&json!("0.05 au")).expect("au value must parse");
    assert!((from_au - 0.05 * ASTRONOMICAL_UNIT_KM).abs() < 1e-6);

    // Sin unidad: se asume km.
    assert_eq!(length_km(&json!("2.75")), Some(2.75));
    assert_eq!(length_km(&json!(0.89)), Some(0.89));

    // Envoltorio numérico sin unidad.
    assert_eq!(length_km(&json!({ "value": 1.1 })), Some(1.1));
}

#[test]
fn certify_speed_magnitude_and_integer() {
    assert_eq!(speed_km_s(&json!("7.42")), Some(7.42));
    assert_eq!(magnitude(&json!({ "value": "19.09" })), Some(19.09));

    assert_eq!(integer(&json!(12)), Some(12));
    assert_eq!(integer(&json!("34")), Some(34));
    assert_eq!(integer(&json!(7.9)), Some(7));
    assert_eq!(integer(&json!("n/a")), None);
}
