// [libs/infra/feeds/src/transport.rs]
/*!
 * =================================================================
 * APARATO: RETRYING TRANSPORT (V1.3 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: REINTENTO CON BACKOFF DE LLAMADAS HTTP TRANSITORIAS
 *
 * Reintenta fallos de red, timeouts, HTTP 429 y 5xx con retroceso
 * exponencial (multiplicador 1, piso 4s, techo 10s, máximo 3 intentos).
 * Un 429 con 'Retry-After' impone su propia espera. Cualquier otro
 * estado HTTP se devuelve al llamador para interpretación local.
 * =================================================================
 */

use crate::errors::FeedError;
use centinela_shared_resilience::RetryPolicy;
use reqwest::{RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// Extrae los segundos de 'Retry-After' cuando la cabecera es numérica.
fn retry_after_seconds(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|header_value| header_value.to_str().ok())
        .and_then(|raw| raw.trim().parse::<u64>().ok())
}

/**
 * Ejecuta la petición con la política de reintentos del feed.
 *
 * # Errors:
 * - `FeedError::TransientUpstream`: red/timeout/5xx agotados los intentos.
 * - `FeedError::RateLimited`: 429 persistente tras honrar 'Retry-After'.
 */
pub async fn execute_with_retry(
    request: RequestBuilder,
    policy: &RetryPolicy,
    endpoint_label: &str,
) -> Result<Response, FeedError> {
    let mut attempt: u32 = 0;
    let mut last_fault: Option<FeedError> = None;

    while attempt < policy.max_attempts {
        attempt += 1;

        let attempt_request = match request.try_clone() {
            Some(cloned) => cloned,
            // Cuerpo no clonable: sólo cabe el intento original.
            None if attempt == 1 => {
                return request
                    .send()
                    .await
                    .map_err(FeedError::from)
                    .and_then(|response| interpret_status(response, endpoint_label));
            }
            None => break,
        };

        match attempt_request.send().await {
            Ok(response) => {
                let status = response.status();

                if status == StatusCode::TOO_MANY_REQUESTS {
                    let imposed_wait = retry_after_seconds(&response);
                    last_fault = Some(FeedError::RateLimited {
                        retry_after_seconds: imposed_wait,
                    });

                    if policy.allows_another_attempt(attempt) {
                        let pause = imposed_wait
                            .map(Duration::from_secs)
                            .unwrap_or_else(|| policy.backoff_delay(attempt));
                        warn!(
                            "📡 [TRANSPORT]: Endpoint [{}] rate-limited. Honoring {}s pause.",
                            endpoint_label,
                            pause.as_secs()
                        );
                        tokio::time::sleep(pause).await;
                        continue;
                    }
                    break;
                }

                if status.is_server_error() {
                    last_fault = Some(FeedError::TransientUpstream(format!(
                        "HTTP_{} from [{}]",
                        status.as_u16(),
                        endpoint_label
                    )));

                    if policy.allows_another_attempt(attempt) {
                        tokio::time::sleep(policy.backoff_delay(attempt)).await;
                        continue;
                    }
                    break;
                }

                return Ok(response);
            }
            Err(transport_fault) => {
                last_fault = Some(FeedError::from(transport_fault));

                if policy.allows_another_attempt(attempt) {
                    let pause = policy.backoff_delay(attempt);
                    debug!(
                        "📡 [TRANSPORT]: Endpoint [{}] attempt {} failed. Backing off {}s.",
                        endpoint_label,
                        attempt,
                        pause.as_secs()
                    );
                    tokio::time::sleep(pause).await;
                    continue;
                }
                break;
            }
        }
    }

    Err(last_fault.unwrap_or_else(|| {
        FeedError::TransientUpstream(format!("exhausted retries on [{}]", endpoint_label))
    }))
}

/// Interpretación mínima de estado para el camino sin reintento.
fn interpret_status(response: Response, endpoint_label: &str) -> Result<Response, FeedError> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(FeedError::RateLimited {
            retry_after_seconds: retry_after_seconds(&response),
        });
    }
    if status.is_server_error() {
        return Err(FeedError::TransientUpstream(format!(
            "HTTP_{} from [{}]",
            status.as_u16(),
            endpoint_label
        )));
    }
    Ok(response)
}
