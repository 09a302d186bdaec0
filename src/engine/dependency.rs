// ABOUTME: Dependency graph over node ids and Kahn's-algorithm level planning
// ABOUTME: Levels are sets of mutually independent nodes eligible for concurrent execution

use std::collections::{HashMap, VecDeque};

use petgraph::graph::NodeIndex;
use petgraph::{Direction, Graph};

use super::error::{ExecutionError, Result};
use crate::model::{NodeId, Project};

pub struct DependencyGraph {
    graph: Graph<NodeId, ()>,
    node_indices: HashMap<NodeId, NodeIndex>,
}

impl DependencyGraph {
    /// Build the dependency digraph from a project's edge set. Parallel
    /// edges between the same node pair (two ports connected) collapse to a
    /// single dependency arc.
    pub fn from_project(project: &Project) -> Self {
        let mut graph = Graph::new();
        let mut node_indices = HashMap::new();

        for node in &project.nodes {
            let index = graph.add_node(node.id.clone());
            node_indices.insert(node.id.clone(), index);
        }

        for edge in &project.edges {
            if let (Some(&source), Some(&target)) = (
                node_indices.get(&edge.source_node_id),
                node_indices.get(&edge.target_node_id),
            ) {
                if graph.find_edge(source, target).is_none() {
                    graph.add_edge(source, target, ());
                }
            }
        }

        Self {
            graph,
            node_indices,
        }
    }

    /// Compute execution levels with Kahn's algorithm: nodes with in-degree
    /// zero are ready; completing a node decrements the in-degree of its
    /// successors, and every node reaching zero joins the next level.
    pub fn execution_levels(&self) -> Result<Vec<Vec<NodeId>>> {
        let mut in_degree: HashMap<NodeIndex, usize> = self
            .node_indices
            .values()
            .map(|&index| {
                (
                    index,
                    self.graph
                        .neighbors_directed(index, Direction::Incoming)
                        .count(),
                )
            })
            .collect();

        let mut ready: VecDeque<NodeIndex> = in_degree
            .iter()
            .filter(|(_, &degree)| degree == 0)
            .map(|(&index, _)| index)
            .collect();

        let mut levels = Vec::new();
        let mut processed = 0;

        while !ready.is_empty() {
            let mut level: Vec<NodeId> = Vec::with_capacity(ready.len());
            let mut next_ready = VecDeque::new();

            while let Some(index) = ready.pop_front() {
                level.push(self.graph[index].clone());
                processed += 1;

                for successor in self.graph.neighbors_directed(index, Direction::Outgoing) {
                    let degree = in_degree
                        .get_mut(&successor)
                        .expect("successor has an in-degree entry");
                    *degree -= 1;
                    if *degree == 0 {
                        next_ready.push_back(successor);
                    }
                }
            }

            level.sort();
            levels.push(level);
            ready = next_ready;
        }

        if processed < self.node_indices.len() {
            // Every unprocessed node sits on or downstream of a cycle.
            let mut stuck: Vec<NodeId> = in_degree
                .iter()
                .filter(|(_, &degree)| degree > 0)
                .map(|(&index, _)| self.graph[index].clone())
                .collect();
            stuck.sort();
            return Err(ExecutionError::CircularDependency { nodes: stuck });
        }

        Ok(levels)
    }

    /// Direct successors of a node.
    pub fn dependents(&self, node_id: &str) -> Vec<NodeId> {
        self.neighbors(node_id, Direction::Outgoing)
    }

    /// Direct predecessors of a node.
    pub fn dependencies(&self, node_id: &str) -> Vec<NodeId> {
        self.neighbors(node_id, Direction::Incoming)
    }

    fn neighbors(&self, node_id: &str, direction: Direction) -> Vec<NodeId> {
        match self.node_indices.get(node_id) {
            Some(&index) => self
                .graph
                .neighbors_directed(index, direction)
                .map(|neighbor| self.graph[neighbor].clone())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Nodes with no dependencies.
    pub fn root_nodes(&self) -> Vec<NodeId> {
        self.node_indices
            .iter()
            .filter(|(_, &index)| {
                self.graph
                    .neighbors_directed(index, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|(node_id, _)| node_id.clone())
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.node_indices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, Node, Port, PortType, Project};

    fn diamond_project() -> Project {
        // a -> b, a -> c, b -> d, c -> d
        let mut project = Project::new("p1", "diamond");
        for id in ["a", "b", "c", "d"] {
            let mut node = Node::new(id, "text_input");
            node.outputs.push(Port::output("out", "Out", PortType::Any));
            node.inputs.push(Port::input("in1", "In 1", PortType::Any, false));
            node.inputs.push(Port::input("in2", "In 2", PortType::Any, false));
            project.add_node(node).unwrap();
        }
        project.add_edge(Edge::new("e1", "a", "out", "b", "in1")).unwrap();
        project.add_edge(Edge::new("e2", "a", "out", "c", "in1")).unwrap();
        project.add_edge(Edge::new("e3", "b", "out", "d", "in1")).unwrap();
        project.add_edge(Edge::new("e4", "c", "out", "d", "in2")).unwrap();
        project
    }

    #[test]
    fn test_kahn_levels_for_diamond() {
        let graph = DependencyGraph::from_project(&diamond_project());
        let levels = graph.execution_levels().unwrap();

        assert_eq!(levels.len(), 3);
        assert_eq!(levels[0], vec!["a"]);
        assert_eq!(levels[1], vec!["b", "c"]);
        assert_eq!(levels[2], vec!["d"]);
    }

    #[test]
    fn test_dependency_queries() {
        let graph = DependencyGraph::from_project(&diamond_project());

        assert_eq!(graph.root_nodes(), vec!["a"]);
        let mut dependents = graph.dependents("a");
        dependents.sort();
        assert_eq!(dependents, vec!["b", "c"]);
        let mut dependencies = graph.dependencies("d");
        dependencies.sort();
        assert_eq!(dependencies, vec!["b", "c"]);
    }

    #[test]
    fn test_cycle_is_reported() {
        let mut project = diamond_project();
        // d -> a closes a cycle
        project.add_edge(Edge::new("e5", "d", "out", "a", "in1")).unwrap();

        let graph = DependencyGraph::from_project(&project);
        let err = graph.execution_levels().unwrap_err();
        match err {
            ExecutionError::CircularDependency { nodes } => {
                assert_eq!(nodes, vec!["a", "b", "c", "d"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parallel_edges_collapse() {
        let mut project = Project::new("p1", "parallel");
        let mut a = Node::new("a", "condition");
        a.outputs.push(Port::output("true", "True", PortType::Any));
        a.outputs.push(Port::output("false", "False", PortType::Any));
        project.add_node(a).unwrap();
        let mut b = Node::new("b", "merge");
        b.inputs.push(Port::input("input_1", "Input 1", PortType::Any, false));
        b.inputs.push(Port::input("input_2", "Input 2", PortType::Any, false));
        project.add_node(b).unwrap();
        project.add_edge(Edge::new("e1", "a", "true", "b", "input_1")).unwrap();
        project.add_edge(Edge::new("e2", "a", "false", "b", "input_2")).unwrap();

        let graph = DependencyGraph::from_project(&project);
        let levels = graph.execution_levels().unwrap();
        assert_eq!(levels, vec![vec!["a".to_string()], vec!["b".to_string()]]);
    }
}
