// ABOUTME: WorkflowEngine scheduler: level-ordered execution with bounded concurrency
// ABOUTME: Upholds at-most-one in-flight execution per (project, node) via a shared-future table

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use futures::future::{join_all, BoxFuture, FutureExt, Shared};
use tokio::sync::{RwLock, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::context::ExecutionContext;
use super::dependency::DependencyGraph;
use super::error::{ExecutionError, Result};
use super::result::ExecutionResult;
use super::status::StatusReporter;
use crate::handlers::HandlerRegistry;
use crate::model::{GraphValidator, Project, ValidationReport};

type SharedExecution = Shared<BoxFuture<'static, ExecutionResult>>;

/// The scheduler. Computes a Kahn-levels plan over the project DAG, drives
/// ready nodes concurrently under a semaphore bound, propagates outputs into
/// downstream inputs, and reports every status transition through the
/// supplied reporter.
pub struct WorkflowEngine {
    registry: Arc<HandlerRegistry>,
    max_concurrent: usize,
    semaphore: Arc<Semaphore>,
    /// Outstanding executions keyed by "project_id:node_id".
    in_flight: Arc<Mutex<HashMap<String, SharedExecution>>>,
}

impl WorkflowEngine {
    pub fn new(registry: HandlerRegistry, max_concurrent: usize) -> Self {
        Self {
            registry: Arc::new(registry),
            max_concurrent,
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Engine with the built-in handler registry and a default bound of 4.
    pub fn with_defaults() -> Self {
        Self::new(HandlerRegistry::new(), 4)
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Registry-aware validation: the structural checks of `GraphValidator`
    /// plus handler availability and per-type config validation.
    pub fn validate_workflow(&self, project: &Project) -> ValidationReport {
        let mut report = GraphValidator::validate(project);
        for node in &project.nodes {
            match self.registry.get(&node.node_type) {
                Some(handler) => {
                    if let Err(e) = handler.validate_config(&node.config) {
                        report.errors.push(format!(
                            "Invalid config on node '{}': {}",
                            node.id, e
                        ));
                    }
                }
                None => report.errors.push(format!(
                    "Node '{}' has unsupported type '{}'",
                    node.id, node.node_type
                )),
            }
        }
        report
    }

    /// Execute the whole graph. Aborts before any callback fires if
    /// validation reports errors; otherwise runs Kahn levels sequentially
    /// with intra-level concurrency. The project is frozen against
    /// structural edits for the duration of the run.
    pub async fn execute_workflow(
        &self,
        project: Arc<RwLock<Project>>,
        reporter: StatusReporter,
    ) -> Result<()> {
        self.execute_workflow_with_cancel(project, reporter, CancellationToken::new())
            .await
    }

    pub async fn execute_workflow_with_cancel(
        &self,
        project: Arc<RwLock<Project>>,
        reporter: StatusReporter,
        cancel: CancellationToken,
    ) -> Result<()> {
        let run_id = uuid::Uuid::new_v4().to_string();

        let levels = {
            let guard = project.read().await;
            let report = self.validate_workflow(&guard);
            if !report.is_valid() {
                return Err(ExecutionError::ValidationFailed {
                    errors: report.errors,
                });
            }
            for warning in &report.warnings {
                warn!("Validation warning: {}", warning);
            }
            DependencyGraph::from_project(&guard).execution_levels()?
        };

        {
            let mut guard = project.write().await;
            guard.freeze()?;
            // Each run starts from a clean slate: prior-run statuses,
            // output values, and propagated input values must not leak
            // into this run's readiness decisions.
            guard.reset_run_state();
        }

        info!(
            "Starting workflow run {}: {} levels, max parallelism {}",
            run_id,
            levels.len(),
            levels.iter().map(|l| l.len()).max().unwrap_or(0)
        );

        let context = ExecutionContext::new(run_id, cancel.clone());
        let outcome = self
            .run_levels(&levels, &project, &reporter, &context, &cancel)
            .await;

        project.write().await.unfreeze();
        outcome
    }

    async fn run_levels(
        &self,
        levels: &[Vec<String>],
        project: &Arc<RwLock<Project>>,
        reporter: &StatusReporter,
        context: &ExecutionContext,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let project_id = project.read().await.id.clone();
        let mut completed_ok: HashSet<String> = HashSet::new();

        for level in levels {
            if cancel.is_cancelled() {
                info!("Run {} cancelled; remaining levels not dispatched", context.run_id);
                break;
            }

            let runnable = {
                let guard = project.read().await;
                level
                    .iter()
                    .filter(|node_id| Self::is_ready(&guard, node_id, &completed_ok))
                    .cloned()
                    .collect::<Vec<_>>()
            };

            for node_id in level.iter().filter(|id| !runnable.iter().any(|r| r == *id)) {
                // Fail forward: nodes starved of a required input stay idle
                // and fire no callbacks.
                info!("Skipping node {} (upstream dependency failed)", node_id);
            }

            let executions = runnable.iter().map(|node_id| {
                self.run_node_deduped(
                    &project_id,
                    node_id.clone(),
                    Arc::clone(project),
                    reporter.clone(),
                    context.for_node(node_id.clone()),
                )
            });
            let results = join_all(executions).await;

            for (node_id, result) in runnable.into_iter().zip(results) {
                if result.success {
                    completed_ok.insert(node_id);
                }
            }
        }

        Ok(())
    }

    /// A node is ready when every required connected input has a source
    /// that completed successfully in this run and actually propagated a
    /// value (a condition node's unselected branch propagates nothing).
    /// An empty payload still counts as propagated; only `None` means the
    /// source withheld the output.
    fn is_ready(project: &Project, node_id: &str, completed_ok: &HashSet<String>) -> bool {
        let node = match project.node(node_id) {
            Some(node) => node,
            None => return false,
        };

        node.inputs.iter().all(|port| {
            if !port.required || !port.connected {
                return true;
            }
            let source_ok = port
                .source_node_id
                .as_deref()
                .map(|source| completed_ok.contains(source))
                .unwrap_or(false);
            source_ok && port.value.is_some()
        })
    }

    /// Execute a single node in isolation. Ancestors and descendants are
    /// not run; the node's inputs are assumed to be resolved already. The
    /// node's outputs still propagate to downstream inputs.
    pub async fn execute_node(
        &self,
        node_id: &str,
        project: Arc<RwLock<Project>>,
        reporter: StatusReporter,
    ) -> Result<ExecutionResult> {
        self.execute_node_with_cancel(node_id, project, reporter, CancellationToken::new())
            .await
    }

    pub async fn execute_node_with_cancel(
        &self,
        node_id: &str,
        project: Arc<RwLock<Project>>,
        reporter: StatusReporter,
        cancel: CancellationToken,
    ) -> Result<ExecutionResult> {
        let project_id = {
            let guard = project.read().await;
            let report = GraphValidator::validate_node(&guard, node_id);
            if !report.is_valid() {
                return Err(ExecutionError::ValidationFailed {
                    errors: report.errors,
                });
            }
            guard.id.clone()
        };

        // Freeze unless a whole-graph run already holds the freeze; in that
        // case the in-flight table is what keeps the two callers coherent.
        let froze = project.write().await.freeze().is_ok();

        let run_id = uuid::Uuid::new_v4().to_string();
        let context = ExecutionContext::new(run_id, cancel);
        let result = self
            .run_node_deduped(
                &project_id,
                node_id.to_string(),
                Arc::clone(&project),
                reporter,
                context.for_node(node_id),
            )
            .await;

        if froze {
            project.write().await.unfreeze();
        }
        Ok(result)
    }

    /// At most one concurrent execution per (project, node id): a request
    /// for a node that is already running attaches to the existing shared
    /// future and observes the identical result. The table is keyed by
    /// project id as well so an engine serving several projects never
    /// cross-attaches colliding node ids.
    async fn run_node_deduped(
        &self,
        project_id: &str,
        node_id: String,
        project: Arc<RwLock<Project>>,
        reporter: StatusReporter,
        context: ExecutionContext,
    ) -> ExecutionResult {
        let key = format!("{}:{}", project_id, node_id);
        let execution = {
            let mut in_flight = self
                .in_flight
                .lock()
                .expect("in-flight table lock poisoned");
            match in_flight.get(&key) {
                Some(existing) => existing.clone(),
                None => {
                    let execution = Self::node_lifecycle(
                        Arc::clone(&self.registry),
                        Arc::clone(&self.semaphore),
                        project,
                        reporter,
                        context,
                        node_id,
                    )
                    .boxed()
                    .shared();
                    in_flight.insert(key.clone(), execution.clone());
                    execution
                }
            }
        };

        let result = execution.await;
        self.in_flight
            .lock()
            .expect("in-flight table lock poisoned")
            .remove(&key);
        result
    }

    /// The full per-node lifecycle, executed exactly once per in-flight
    /// entry: mark running, report, invoke the handler, propagate outputs,
    /// mark terminal status, report again. A cancellation observed after
    /// the handler returns discards the result silently.
    async fn node_lifecycle(
        registry: Arc<HandlerRegistry>,
        semaphore: Arc<Semaphore>,
        project: Arc<RwLock<Project>>,
        reporter: StatusReporter,
        context: ExecutionContext,
        node_id: String,
    ) -> ExecutionResult {
        let _permit = match semaphore.acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => return ExecutionResult::failure("Scheduler shut down"),
        };

        if context.is_cancelled() {
            return ExecutionResult::failure("Run cancelled before dispatch");
        }

        let node = {
            let mut guard = project.write().await;
            let node = match guard.node_mut(&node_id) {
                Some(node) => node,
                None => {
                    return ExecutionResult::failure(format!("Node not found: {}", node_id))
                }
            };
            node.mark_running();
            node.clone()
        };
        reporter.report(&node_id, crate::model::NodeStatus::Running, None);

        info!("Executing node {} (type: {})", node_id, node.node_type);

        let mut result = match registry.get(&node.node_type) {
            Some(handler) => handler.execute(&node, &context).await,
            None => {
                ExecutionResult::failure(format!("Node type not supported: {}", node.node_type))
            }
        };
        if !result.success {
            // Failed handlers must not leak partial outputs.
            result.outputs.clear();
        }

        if context.is_cancelled() {
            // Late completion after cancellation: discard without
            // propagation or callbacks, and let a later run re-dispatch.
            let mut guard = project.write().await;
            if let Some(node) = guard.node_mut(&node_id) {
                node.reset();
            }
            return result;
        }

        {
            let mut guard = project.write().await;
            if result.success {
                Self::apply_outputs(&mut guard, &node_id, &result);
                if let Some(node) = guard.node_mut(&node_id) {
                    node.mark_success();
                }
            } else if let Some(node) = guard.node_mut(&node_id) {
                let message = result
                    .error
                    .clone()
                    .unwrap_or_else(|| "Handler reported failure".to_string());
                node.mark_error(message);
            }
        }

        let status = if result.success {
            crate::model::NodeStatus::Success
        } else {
            crate::model::NodeStatus::Error
        };
        reporter.report(&node_id, status, Some(&result));
        result
    }

    /// Write handler outputs into the node's output ports and copy each
    /// value along outgoing edges into the target input, marking it
    /// connected. Output names resolve against port id first, then name.
    fn apply_outputs(project: &mut Project, node_id: &str, result: &ExecutionResult) {
        let mut propagations: Vec<(String, String, serde_json::Value)> = Vec::new();

        // Resolve ports and collect propagation targets in a read pass,
        // then apply writes; avoids aliasing node and edge borrows.
        let port_values: Vec<(String, serde_json::Value)> = {
            let node = match project.node(node_id) {
                Some(node) => node,
                None => return,
            };
            result
                .outputs
                .iter()
                .filter_map(|(name, value)| {
                    node.outputs
                        .iter()
                        .find(|p| &p.id == name || &p.name == name)
                        .map(|p| (p.id.clone(), value.clone()))
                })
                .collect()
        };

        for (port_id, value) in &port_values {
            for edge in &project.edges {
                if edge.source_node_id == node_id && &edge.source_output_id == port_id {
                    propagations.push((
                        edge.target_node_id.clone(),
                        edge.target_input_id.clone(),
                        value.clone(),
                    ));
                }
            }
        }

        if let Some(node) = project.node_mut(node_id) {
            for (port_id, value) in port_values {
                if let Some(port) = node.output_mut(&port_id) {
                    port.value = Some(value);
                }
            }
        }

        for (target_node_id, target_input_id, value) in propagations {
            if let Some(target) = project.node_mut(&target_node_id) {
                if let Some(port) = target.input_mut(&target_input_id) {
                    port.value = Some(value);
                    port.connected = true;
                }
            }
        }
    }
}
