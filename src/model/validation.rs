// ABOUTME: Graph validator covering structure, fan-in, cycles, and required inputs
// ABOUTME: Runs before any execution; never mutates the graph

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::edge::Edge;
use super::node::Node;
use super::project::Project;

/// Outcome of validating a project. Errors block execution; warnings
/// (currently only port type mismatches) are advisory.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

pub struct GraphValidator;

impl GraphValidator {
    /// Validate a whole project before a workflow run.
    pub fn validate(project: &Project) -> ValidationReport {
        let mut report = ValidationReport::default();

        Self::check_structure(project, &mut report);
        Self::check_fan_in(project, &mut report);
        Self::check_cycles(project, &mut report);
        for node in &project.nodes {
            Self::check_required_inputs(node, &mut report);
        }
        Self::check_port_types(project, &mut report);

        debug!(
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "Validated project {}",
            project.id
        );
        report
    }

    /// Validate a single node before an ad-hoc execution: the node must
    /// exist and its required inputs must be resolved.
    pub fn validate_node(project: &Project, node_id: &str) -> ValidationReport {
        let mut report = ValidationReport::default();
        match project.node(node_id) {
            Some(node) => Self::check_required_inputs(node, &mut report),
            None => report.error(format!("Node '{}' does not exist", node_id)),
        }
        report
    }

    fn check_structure(project: &Project, report: &mut ValidationReport) {
        for edge in &project.edges {
            let source = match project.node(&edge.source_node_id) {
                Some(node) => node,
                None => {
                    report.error(format!(
                        "Edge '{}' references missing source node '{}'",
                        edge.id, edge.source_node_id
                    ));
                    continue;
                }
            };
            let target = match project.node(&edge.target_node_id) {
                Some(node) => node,
                None => {
                    report.error(format!(
                        "Edge '{}' references missing target node '{}'",
                        edge.id, edge.target_node_id
                    ));
                    continue;
                }
            };

            if source.output(&edge.source_output_id).is_none() {
                report.error(format!(
                    "Edge '{}' references missing output port '{}' on node '{}'",
                    edge.id, edge.source_output_id, edge.source_node_id
                ));
            }
            if target.input(&edge.target_input_id).is_none() {
                report.error(format!(
                    "Edge '{}' references missing input port '{}' on node '{}'",
                    edge.id, edge.target_input_id, edge.target_node_id
                ));
            }
        }
    }

    fn check_fan_in(project: &Project, report: &mut ValidationReport) {
        let mut seen: HashMap<(&str, &str), &Edge> = HashMap::new();
        for edge in &project.edges {
            let key = (edge.target_node_id.as_str(), edge.target_input_id.as_str());
            if let Some(first) = seen.get(&key) {
                report.error(format!(
                    "Input '{}' on node '{}' has multiple incoming edges ('{}' and '{}')",
                    edge.target_input_id, edge.target_node_id, first.id, edge.id
                ));
            } else {
                seen.insert(key, edge);
            }
        }
    }

    /// Depth-first search with an explicit recursion stack; a back-edge to a
    /// node currently on the stack reports every node on the cycle.
    fn check_cycles(project: &Project, report: &mut ValidationReport) {
        let mut successors: HashMap<&str, Vec<&str>> = HashMap::new();
        for node in &project.nodes {
            successors.entry(node.id.as_str()).or_default();
        }
        for edge in &project.edges {
            if project.node(&edge.source_node_id).is_some()
                && project.node(&edge.target_node_id).is_some()
            {
                successors
                    .entry(edge.source_node_id.as_str())
                    .or_default()
                    .push(edge.target_node_id.as_str());
            }
        }

        fn visit<'a>(
            node: &'a str,
            successors: &HashMap<&'a str, Vec<&'a str>>,
            visited: &mut HashSet<&'a str>,
            stack: &mut Vec<&'a str>,
            on_stack: &mut HashSet<&'a str>,
            report: &mut ValidationReport,
        ) {
            visited.insert(node);
            stack.push(node);
            on_stack.insert(node);

            if let Some(next) = successors.get(node) {
                for &succ in next {
                    if on_stack.contains(succ) {
                        let start = stack.iter().position(|&n| n == succ).unwrap_or(0);
                        let cycle: Vec<&str> = stack[start..].to_vec();
                        report.error(format!(
                            "Cycle detected involving nodes: {}",
                            cycle.join(" -> ")
                        ));
                    } else if !visited.contains(succ) {
                        visit(succ, successors, visited, stack, on_stack, report);
                    }
                }
            }

            stack.pop();
            on_stack.remove(node);
        }

        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = Vec::new();
        let mut on_stack: HashSet<&str> = HashSet::new();

        for node in &project.nodes {
            if !visited.contains(node.id.as_str()) {
                visit(
                    node.id.as_str(),
                    &successors,
                    &mut visited,
                    &mut stack,
                    &mut on_stack,
                    report,
                );
            }
        }
    }

    fn check_required_inputs(node: &Node, report: &mut ValidationReport) {
        for port_id in node.unsatisfied_required_inputs() {
            report.error(format!(
                "Required input '{}' on node '{}' is neither connected nor set",
                port_id, node.id
            ));
        }
    }

    fn check_port_types(project: &Project, report: &mut ValidationReport) {
        for edge in &project.edges {
            let source_type = project
                .node(&edge.source_node_id)
                .and_then(|n| n.output(&edge.source_output_id))
                .map(|p| p.port_type);
            let target_type = project
                .node(&edge.target_node_id)
                .and_then(|n| n.input(&edge.target_input_id))
                .map(|p| p.port_type);

            if let (Some(source), Some(target)) = (source_type, target_type) {
                if !source.is_compatible_with(&target) {
                    report.warning(format!(
                        "Edge '{}' connects {} output to {} input",
                        edge.id, source, target
                    ));
                }
            }
        }
    }
}
