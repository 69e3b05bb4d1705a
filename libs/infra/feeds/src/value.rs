// [libs/infra/feeds/src/value.rs]
/*!
 * =================================================================
 * APARATO: TOLERANT VALUE PARSER (V1.3 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: COERCIÓN TIPADA DE MAGNITUDES HETEROGÉNEAS DE LA FUENTE
 *
 * Las fuentes mezclan números, envoltorios {value|est|val|mean},
 * cadenas con unidades y listas. Un único parser por unidad devuelve
 * Option<f64>: la ausencia es un resultado, no una excepción. Todos
 * los clientes rutean por aquí.
 * =================================================================
 */

use serde_json::Value;

/// Claves de envoltorio aceptadas para valores anidados.
const WRAPPER_KEYS: [&str; 4] = ["value", "est", "val", "mean"];

/// Escanea el primer número con forma [-+]?d*.d+([eE][-+]?d+)? del texto.
fn first_number(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let mut cursor = 0;

    while cursor < bytes.len() {
        let starts_number = bytes[cursor].is_ascii_digit()
            || (matches!(bytes[cursor], b'+' | b'-' | b'.')
                && cursor + 1 < bytes.len()
                && bytes[cursor + 1].is_ascii_digit());

        if !starts_number {
            cursor += 1;
            continue;
        }

        let mut end = cursor;
        if matches!(bytes[end], b'+' | b'-') {
            end += 1;
        }
        while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'.') {
            end += 1;
        }
        // Cola exponencial opcional.
        if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
            let mut exponent_end = end + 1;
            if exponent_end < bytes.len() && matches!(bytes[exponent_end], b'+' | b'-') {
                exponent_end += 1;
            }
            if exponent_end < bytes.len() && bytes[exponent_end].is_ascii_digit() {
                while exponent_end < bytes.len() && bytes[exponent_end].is_ascii_digit() {
                    exponent_end += 1;
                }
                end = exponent_end;
            }
        }

        if let Ok(parsed) = text[cursor..end].parse::<f64>() {
            return Some(parsed);
        }
        cursor = end.max(cursor + 1);
    }

    None
}

/**
 * Parser escalar tolerante: número, cadena numérica, envoltorio con
 * clave de valor, o primer elemento de una lista.
 */
pub fn scalar(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => first_number(text),
        Value::Object(map) => WRAPPER_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(scalar)),
        Value::Array(items) => items.first().and_then(scalar),
        _ => None,
    }
}

/**
 * Parser de longitud normalizada a kilómetros.
 *
 * Cadenas con unidad explícita se convierten: 'km' permanece, 'm' se
 * divide por mil, 'au' se multiplica por la unidad astronómica. Valores
 * sin unidad se asumen ya en kilómetros.
 */
pub fn length_km(raw: &Value) -> Option<f64> {
    if let Value::String(text) = raw {
        let clean = text.trim().to_lowercase();
        let magnitude = first_number(&clean)?;

        if clean.contains("km") && !clean.replace("km", "").contains('m') {
            return Some(magnitude);
        }
        if clean.contains('m') && !clean.contains("km") {
            return Some(magnitude / 1000.0);
        }
        if clean.contains("au") {
            return Some(magnitude * centinela_domain_models::space_math::ASTRONOMICAL_UNIT_KM);
        }
        return Some(magnitude);
    }

    scalar(raw)
}

/// Parser de velocidad en km/s (escalar plano; la fuente no mezcla unidades).
pub fn speed_km_s(raw: &Value) -> Option<f64> {
    scalar(raw)
}

/// Parser de magnitud absoluta H (adimensional).
pub fn magnitude(raw: &Value) -> Option<f64> {
    scalar(raw)
}

/// Entero tolerante, truncando fracciones residuales de la fuente.
pub fn integer(raw: &Value) -> Option<i64> {
    scalar(raw).map(|parsed| parsed as i64)
}
