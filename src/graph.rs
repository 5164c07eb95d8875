//! Dependency graph over a set of prep tasks.
//!
//! The graph is the validation gate for a planning run: building it resolves
//! every dependency id, and the topological sort proves acyclicity. Edges
//! point from prerequisite to dependent.

use petgraph::algo::has_path_connecting;
use petgraph::stable_graph::StableGraph;
use petgraph::Direction;
use std::collections::HashMap;

use crate::error::ValidationError;
use crate::task::PrepTask;
use crate::Id;

/// Tolerance for the earliest-vs-latest start comparison on the critical
/// path. Engine times are f64 minutes, so slack is compared robustly.
const SLACK_EPSILON: f64 = 1e-3;

/// DAG of prep tasks with id-based lookup.
///
/// # Invariants
///
/// - Every dependency edge resolves to a task in the same set (enforced by
///   [`build`](Self::build))
/// - Node insertion order is the caller's input order; every ordering in the
///   engine ties back to it, keeping runs deterministic
#[derive(Debug, Clone)]
pub struct TaskGraph {
    graph: StableGraph<PrepTask, ()>,
    node_by_id: HashMap<Id, petgraph::graph::NodeIndex>,
    /// Node indices in input order.
    order: Vec<petgraph::graph::NodeIndex>,
}

impl TaskGraph {
    /// Builds the graph from a task list.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::DuplicateTask`] if two tasks share an id
    /// - [`ValidationError::UnknownDependency`] if a dependency id does not
    ///   resolve within the list
    ///
    /// Cycles are not detected here; they surface from
    /// [`topo_order`](Self::topo_order) with the offending task names.
    pub fn build(tasks: Vec<PrepTask>) -> Result<Self, ValidationError> {
        let mut graph = StableGraph::default();
        let mut node_by_id = HashMap::new();
        let mut order = Vec::with_capacity(tasks.len());

        for task in tasks {
            let id = task.id.clone();
            if node_by_id.contains_key(&id) {
                return Err(ValidationError::DuplicateTask(id));
            }
            let node = graph.add_node(task);
            node_by_id.insert(id, node);
            order.push(node);
        }

        for &node in &order {
            let dependencies = graph[node].dependencies.clone();
            for dependency in dependencies {
                let &dep_node = node_by_id.get(&dependency).ok_or_else(|| {
                    ValidationError::UnknownDependency {
                        task: graph[node].id.clone(),
                        dependency: dependency.clone(),
                    }
                })?;
                graph.add_edge(dep_node, node, ());
            }
        }

        Ok(Self {
            graph,
            node_by_id,
            order,
        })
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns the task with the given id, if present.
    pub fn task(&self, id: &str) -> Option<&PrepTask> {
        self.node_by_id
            .get(id)
            .and_then(|&node| self.graph.node_weight(node))
    }

    /// Returns the task at a node index, if it exists.
    pub fn task_at(&self, node: petgraph::graph::NodeIndex) -> Option<&PrepTask> {
        self.graph.node_weight(node)
    }

    /// Iterates tasks in input order.
    pub fn tasks(&self) -> impl Iterator<Item = &PrepTask> {
        self.order.iter().map(move |&node| &self.graph[node])
    }

    /// True if `to` is reachable from `from` through dependency edges, i.e.
    /// `to` transitively depends on `from`. Unknown ids are unreachable.
    pub fn reaches(&self, from: &str, to: &str) -> bool {
        match (self.node_by_id.get(from), self.node_by_id.get(to)) {
            (Some(&from), Some(&to)) => has_path_connecting(&self.graph, from, to, None),
            _ => false,
        }
    }

    /// Topological order via Kahn's algorithm with a priority-ordered ready
    /// queue.
    ///
    /// The initial queue is priority-sorted (stable within a priority by
    /// input order), and a task whose in-degree drops to zero is inserted
    /// before the first queued task of strictly lower priority, else
    /// appended. The emitted order is therefore deterministic: priority
    /// first, input order on ties.
    ///
    /// # Errors
    ///
    /// [`ValidationError::TaskCycle`] naming every unscheduled task when the
    /// graph contains a cycle.
    pub fn topo_order(&self) -> Result<Vec<petgraph::graph::NodeIndex>, ValidationError> {
        let input_pos: HashMap<_, _> = self
            .order
            .iter()
            .enumerate()
            .map(|(pos, &node)| (node, pos))
            .collect();

        let mut in_degree: HashMap<_, usize> = self
            .order
            .iter()
            .map(|&node| {
                (
                    node,
                    self.graph
                        .neighbors_directed(node, Direction::Incoming)
                        .count(),
                )
            })
            .collect();

        let mut queue: Vec<petgraph::graph::NodeIndex> = self
            .order
            .iter()
            .copied()
            .filter(|node| in_degree[node] == 0)
            .collect();
        queue.sort_by_key(|&node| self.graph[node].priority.rank());

        let mut sorted = Vec::with_capacity(self.order.len());
        while !queue.is_empty() {
            let node = queue.remove(0);
            sorted.push(node);

            let mut successors: Vec<_> = self
                .graph
                .neighbors_directed(node, Direction::Outgoing)
                .collect();
            successors.sort_by_key(|succ| input_pos[succ]);

            for successor in successors {
                let degree = in_degree.get_mut(&successor).expect("known node");
                *degree -= 1;
                if *degree == 0 {
                    let rank = self.graph[successor].priority.rank();
                    let at = queue
                        .iter()
                        .position(|&queued| self.graph[queued].priority.rank() > rank)
                        .unwrap_or(queue.len());
                    queue.insert(at, successor);
                }
            }
        }

        if sorted.len() != self.order.len() {
            let names = self
                .order
                .iter()
                .filter(|node| !sorted.contains(node))
                .map(|&node| self.graph[node].name.clone())
                .collect();
            return Err(ValidationError::TaskCycle { names });
        }

        Ok(sorted)
    }

    /// Task ids on the critical path, in forward topological order.
    ///
    /// Forward pass computes earliest start/end over the dependency DAG;
    /// backward pass computes latest start/end against the project end.
    /// Members are the tasks with (near-)zero slack. The path reflects
    /// dependencies only - equipment contention applied later by the
    /// scheduler can stretch the realised timeline beyond it.
    pub fn critical_path(&self) -> Result<Vec<Id>, ValidationError> {
        let topo = self.topo_order()?;
        if topo.is_empty() {
            return Ok(Vec::new());
        }

        let mut earliest_start: HashMap<_, f64> = HashMap::with_capacity(topo.len());
        let mut earliest_end: HashMap<_, f64> = HashMap::with_capacity(topo.len());
        for &node in &topo {
            let start = self
                .graph
                .neighbors_directed(node, Direction::Incoming)
                .map(|dep| earliest_end[&dep])
                .fold(0.0_f64, f64::max);
            earliest_start.insert(node, start);
            earliest_end.insert(node, start + self.graph[node].duration.value());
        }
        let project_end = earliest_end.values().copied().fold(0.0_f64, f64::max);

        let mut latest_start: HashMap<_, f64> = HashMap::with_capacity(topo.len());
        for &node in topo.iter().rev() {
            let end = self
                .graph
                .neighbors_directed(node, Direction::Outgoing)
                .map(|succ| latest_start[&succ])
                .fold(project_end, f64::min);
            latest_start.insert(node, end - self.graph[node].duration.value());
        }

        Ok(topo
            .iter()
            .filter(|node| (earliest_start[node] - latest_start[node]).abs() < SLACK_EPSILON)
            .map(|&node| self.graph[node].id.clone())
            .collect())
    }
}
