// ABOUTME: Command implementations for the nodeflow CLI
// ABOUTME: Handles execution of run, validate, and templates commands

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tokio::sync::RwLock;
use tracing::info;

use crate::engine::{StatusReporter, WorkflowEngine};
use crate::handlers::HandlerRegistry;
use crate::model::{NodeStatus, TemplateCatalog, ValidationReport, WorkflowSnapshot};

/// Execute a workflow snapshot
pub async fn run_workflow(
    snapshot_path: PathBuf,
    dry_run: bool,
    output: Option<PathBuf>,
    max_concurrent: usize,
) -> Result<()> {
    info!("Starting workflow execution: {}", snapshot_path.display());

    let snapshot = WorkflowSnapshot::from_file(&snapshot_path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load snapshot: {}", e))?;
    info!("Loaded workflow: {}", snapshot.project.name);

    let engine = WorkflowEngine::new(HandlerRegistry::new(), max_concurrent);

    if dry_run {
        let report = engine.validate_workflow(&snapshot.project);
        print_report(&snapshot.project.name, &report);
        return if report.is_valid() {
            info!("Dry run - workflow validation successful");
            Ok(())
        } else {
            Err(anyhow::anyhow!("Workflow validation failed"))
        };
    }

    let total_nodes = snapshot.project.nodes.len();
    let project = Arc::new(RwLock::new(snapshot.project));

    let failures = Arc::new(Mutex::new(Vec::<String>::new()));
    let failures_clone = Arc::clone(&failures);
    let reporter = StatusReporter::from_fn(move |node_id, status, result| {
        match status {
            NodeStatus::Error => {
                let message = result
                    .and_then(|r| r.error.clone())
                    .unwrap_or_else(|| "unknown error".to_string());
                println!("  Node '{}': error - {}", node_id, message);
                failures_clone.lock().unwrap().push(node_id.to_string());
            }
            _ => println!("  Node '{}': {}", node_id, status),
        };
    });

    engine
        .execute_workflow(Arc::clone(&project), reporter)
        .await
        .map_err(|e| anyhow::anyhow!("Workflow execution failed: {}", e))?;

    let guard = project.read().await;
    let skipped = guard
        .nodes
        .iter()
        .filter(|n| n.status == NodeStatus::Idle)
        .count();
    let failed = failures.lock().unwrap().len();

    if let Some(output_path) = output {
        let snapshot = WorkflowSnapshot::new(guard.clone());
        snapshot
            .to_file(&output_path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to write output snapshot: {}", e))?;
        info!("Post-run snapshot written to: {}", output_path.display());
    }

    if failed == 0 && skipped == 0 {
        println!("Workflow '{}' completed: all {} nodes succeeded", guard.name, total_nodes);
        Ok(())
    } else {
        println!(
            "Workflow '{}' completed: {} of {} nodes failed, {} skipped",
            guard.name, failed, total_nodes, skipped
        );
        Err(anyhow::anyhow!(
            "{} of {} nodes failed",
            failed,
            total_nodes
        ))
    }
}

/// Validate a workflow snapshot file
pub async fn validate_workflow(snapshot_path: PathBuf) -> Result<()> {
    info!("Validating workflow: {}", snapshot_path.display());

    let snapshot = WorkflowSnapshot::from_file(&snapshot_path)
        .await
        .map_err(|e| anyhow::anyhow!("Workflow validation failed: {}", e))?;

    let engine = WorkflowEngine::with_defaults();
    let report = engine.validate_workflow(&snapshot.project);
    print_report(&snapshot.project.name, &report);

    if report.is_valid() {
        println!("  Nodes: {}", snapshot.project.nodes.len());
        println!("  Edges: {}", snapshot.project.edges.len());
        info!("Workflow validation completed successfully");
        Ok(())
    } else {
        Err(anyhow::anyhow!("Workflow validation failed"))
    }
}

/// List the built-in node templates
pub fn list_templates() -> Result<()> {
    let catalog = TemplateCatalog::builtin();
    println!("Built-in node templates:");
    for template in catalog.iter() {
        println!("  {} - {}", template.node_type, template.label);
        println!("    {}", template.description);
        if !template.inputs.is_empty() {
            let names: Vec<&str> = template.inputs.iter().map(|p| p.name.as_str()).collect();
            println!("    inputs: {}", names.join(", "));
        }
        if !template.outputs.is_empty() {
            let names: Vec<&str> = template.outputs.iter().map(|p| p.name.as_str()).collect();
            println!("    outputs: {}", names.join(", "));
        }
    }
    Ok(())
}

fn print_report(name: &str, report: &ValidationReport) {
    if report.is_valid() {
        println!("✓ Workflow '{}' is valid", name);
    } else {
        println!("✗ Workflow '{}' has {} error(s)", name, report.errors.len());
        for error in &report.errors {
            println!("  error: {}", error);
        }
    }
    for warning in &report.warnings {
        println!("  warning: {}", warning);
    }
}
