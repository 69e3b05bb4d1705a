// [libs/infra/db/src/coordinator.rs]
/*!
 * =================================================================
 * APARATO: TRANSACTION COORDINATOR (V1.4 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: ORQUESTACIÓN DE OPERACIONES MULTI-PASO SOBRE UN UOW
 *
 * Dos ayudantes de alto nivel:
 * - 'coordinated_operation': secuencia de operaciones sobre un mismo
 *   UoW; ante el primer fallo invoca el manejador de compensación con
 *   los resultados parciales y propaga el error.
 * - 'workflow': pasos con condición opcional (los no cumplidos quedan
 *   registrados como saltados) y compensación por paso; un paso
 *   fallido ejecuta su compensación y aborta el resto.
 * =================================================================
 */

use crate::client::CatalogClient;
use crate::errors::DbError;
use crate::uow::UnitOfWork;
use serde_json::{json, Map, Value};
use std::future::Future;
use std::pin::Pin;
use tracing::{error, info, instrument};

/// Resultado serializable de una operación coordinada.
pub type OperationResult = Value;

/// Futuro de operación ligado al préstamo del UoW.
pub type OperationFuture<'a> =
    Pin<Box<dyn Future<Output = Result<OperationResult, DbError>> + Send + 'a>>;

/// Operación coordinada: recibe el UoW prestado y produce un resultado.
pub type OperationFn =
    Box<dyn for<'a> Fn(&'a UnitOfWork) -> OperationFuture<'a> + Send + Sync>;

/// Manejador de compensación: error observado + resultados parciales.
pub type RollbackHandler = Box<dyn Fn(&DbError, &[OperationResult]) + Send + Sync>;

/// Futuro de paso de workflow, con acceso a los resultados previos.
pub type StepFuture<'a> =
    Pin<Box<dyn Future<Output = Result<OperationResult, DbError>> + Send + 'a>>;

/// Operación de paso: UoW prestado + resultados acumulados.
pub type StepFn = Box<
    dyn for<'a> Fn(&'a UnitOfWork, &'a Map<String, Value>) -> StepFuture<'a> + Send + Sync,
>;

/// Compensación de paso: UoW + resultados + error del paso.
pub type StepRollbackFn = Box<
    dyn for<'a> Fn(&'a UnitOfWork, &'a Map<String, Value>, &'a DbError) -> StepFuture<'a>
        + Send
        + Sync,
>;

/// Paso declarativo de un workflow.
pub struct WorkflowStep {
    pub name: String,
    pub operation: StepFn,
    /// Condición sobre los resultados previos; no cumplida → saltado.
    pub condition: Option<Box<dyn Fn(&Map<String, Value>) -> bool + Send + Sync>>,
    /// Compensación ejecutada si la operación del paso falla.
    pub rollback_operation: Option<StepRollbackFn>,
}

/// Desenlace estructurado de un workflow completo.
#[derive(Debug, Clone)]
pub struct WorkflowOutcome {
    pub completed: bool,
    pub results: Map<String, Value>,
    pub error: Option<String>,
}

/// Coordinador central de operaciones multi-dominio.
pub struct TransactionCoordinator {
    client: CatalogClient,
}

impl TransactionCoordinator {
    pub fn new(client: CatalogClient) -> Self {
        Self { client }
    }

    /**
     * Ejecuta operaciones en secuencia dentro de un único UoW.
     *
     * # Errors:
     * Propaga el primer fallo tras invocar el manejador de compensación
     * con los resultados acumulados hasta ese punto.
     */
    #[instrument(skip(self, operations, on_rollback), fields(count = operations.len()))]
    pub async fn coordinated_operation(
        &self,
        operations: Vec<OperationFn>,
        on_rollback: Option<RollbackHandler>,
    ) -> Result<Vec<OperationResult>, DbError> {
        let uow = UnitOfWork::begin(&self.client).await?;
        let mut accumulated_results: Vec<OperationResult> = Vec::new();

        for (index, operation) in operations.iter().enumerate() {
            match operation(&uow).await {
                Ok(result) => accumulated_results.push(result),
                Err(fault) => {
                    error!(
                        "❌ [COORDINATOR]: Operation {} failed: {}. Rolling back scope.",
                        index, fault
                    );
                    uow.rollback().await?;

                    if let Some(handler) = &on_rollback {
                        handler(&fault, &accumulated_results);
                    }
                    return Err(fault);
                }
            }
        }

        uow.commit().await?;
        info!(
            "✅ [COORDINATOR]: {} operations sealed in one scope.",
            accumulated_results.len()
        );
        Ok(accumulated_results)
    }

    /**
     * Ejecuta un workflow declarativo paso a paso.
     *
     * Cada paso queda registrado en los resultados bajo su nombre:
     * saltado, exitoso (con datos) o fallido (con error y veredicto de
     * compensación). Un paso fallido aborta el resto.
     */
    #[instrument(skip(self, steps), fields(count = steps.len()))]
    pub async fn workflow(&self, steps: Vec<WorkflowStep>) -> WorkflowOutcome {
        let uow = match UnitOfWork::begin(&self.client).await {
            Ok(uow) => uow,
            Err(fault) => {
                return WorkflowOutcome {
                    completed: false,
                    results: Map::new(),
                    error: Some(fault.to_string()),
                }
            }
        };

        let mut results: Map<String, Value> = Map::new();

        for step in &steps {
            if let Some(condition) = &step.condition {
                if !condition(&results) {
                    info!("⏭️ [WORKFLOW]: Step [{}] skipped (condition not met).", step.name);
                    results.insert(
                        step.name.clone(),
                        json!({ "skipped": true, "reason": "condition_not_met" }),
                    );
                    continue;
                }
            }

            match (step.operation)(&uow, &results).await {
                Ok(step_result) => {
                    results.insert(
                        step.name.clone(),
                        json!({ "success": true, "data": step_result }),
                    );
                }
                Err(step_fault) => {
                    error!(
                        "❌ [WORKFLOW]: Step [{}] failed: {}. Aborting remainder.",
                        step.name, step_fault
                    );

                    let rollback_verdict = match &step.rollback_operation {
                        Some(rollback) => match rollback(&uow, &results, &step_fault).await {
                            Ok(rollback_result) => json!({
                                "rolled_back": true,
                                "rollback_result": rollback_result
                            }),
                            Err(rollback_fault) => json!({
                                "rolled_back": false,
                                "rollback_error": rollback_fault.to_string()
                            }),
                        },
                        None => json!({ "rolled_back": false }),
                    };

                    let mut failure_entry = json!({
                        "success": false,
                        "error": step_fault.to_string()
                    });
                    if let (Value::Object(entry), Value::Object(verdict)) =
                        (&mut failure_entry, rollback_verdict)
                    {
                        entry.extend(verdict);
                    }
                    results.insert(step.name.clone(), failure_entry);

                    let _ = uow.rollback().await;
                    return WorkflowOutcome {
                        completed: false,
                        results,
                        error: Some(step_fault.to_string()),
                    };
                }
            }
        }

        if let Err(fault) = uow.commit().await {
            return WorkflowOutcome {
                completed: false,
                results,
                error: Some(fault.to_string()),
            };
        }

        WorkflowOutcome {
            completed: true,
            results,
            error: None,
        }
    }
}
