// src/system/graph.rs

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::errors::{Result, TaskSystemError};
use crate::system::task_system::Precedence;
use crate::system::TaskName;

/// Visitation state used by cycle detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// Precedence graph over densely indexed tasks.
///
/// Index `i` is the `i`-th task in registration order. Adjacency lists are
/// sorted and deduplicated.
#[derive(Debug, Clone)]
pub struct PrecedenceGraph {
    names: Vec<TaskName>,
    index: HashMap<TaskName, usize>,
    /// Direct prerequisites of each task.
    deps: Vec<Vec<usize>>,
    /// Direct dependents of each task.
    dependents: Vec<Vec<usize>>,
}

impl PrecedenceGraph {
    /// Index `names` and the precedence map, rejecting duplicate names,
    /// references to unknown tasks, and cycles.
    pub fn build(names: Vec<TaskName>, precedence: &Precedence) -> Result<Self> {
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(TaskSystemError::DuplicateTask(name.clone()));
            }
        }

        let mut deps: Vec<Vec<usize>> = vec![Vec::new(); names.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); names.len()];

        for (task, prerequisites) in precedence.iter() {
            let &t = index
                .get(task)
                .ok_or_else(|| TaskSystemError::UnknownTask(task.clone()))?;
            for dep in prerequisites {
                let &d = index
                    .get(dep)
                    .ok_or_else(|| TaskSystemError::UnknownTask(dep.clone()))?;
                deps[t].push(d);
                dependents[d].push(t);
            }
        }

        for list in deps.iter_mut().chain(dependents.iter_mut()) {
            list.sort_unstable();
            list.dedup();
        }

        let graph = Self {
            names,
            index,
            deps,
            dependents,
        };

        if let Some(cycle) = graph.find_cycle() {
            warn!(cycle = %cycle.join(" -> "), "precedence graph contains a cycle");
            return Err(TaskSystemError::CyclicDependency { cycle });
        }

        debug!(tasks = graph.len(), "precedence graph indexed and acyclic");
        Ok(graph)
    }

    /// Depth-first search from every task with an explicit stack.
    ///
    /// Edges are followed from a task to its prerequisites; an edge into a
    /// node that is still on the stack closes a cycle. The returned path
    /// starts and ends with the same task, each entry waiting on the next.
    fn find_cycle(&self) -> Option<Vec<TaskName>> {
        let mut marks = vec![Mark::Unvisited; self.len()];
        // (node, position of the next prerequisite to explore)
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for root in 0..self.len() {
            if marks[root] != Mark::Unvisited {
                continue;
            }
            marks[root] = Mark::OnStack;
            stack.push((root, 0));

            while let Some(frame) = stack.last_mut() {
                let node = frame.0;
                let next = self.deps[node].get(frame.1).copied();
                frame.1 += 1;

                match next {
                    None => {
                        marks[node] = Mark::Done;
                        stack.pop();
                    }
                    Some(dep) => match marks[dep] {
                        Mark::Unvisited => {
                            marks[dep] = Mark::OnStack;
                            stack.push((dep, 0));
                        }
                        Mark::OnStack => {
                            let start = stack
                                .iter()
                                .position(|&(n, _)| n == dep)
                                .unwrap_or(0);
                            let mut cycle: Vec<TaskName> = stack[start..]
                                .iter()
                                .map(|&(n, _)| self.names[n].clone())
                                .collect();
                            cycle.push(self.names[dep].clone());
                            return Some(cycle);
                        }
                        Mark::Done => {}
                    },
                }
            }
        }

        None
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Task names in registration order.
    pub fn names(&self) -> &[TaskName] {
        &self.names
    }

    pub fn name(&self, idx: usize) -> &str {
        &self.names[idx]
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Direct prerequisites of the task at `idx`.
    pub fn dependencies_of(&self, idx: usize) -> &[usize] {
        &self.deps[idx]
    }

    /// Direct dependents of the task at `idx`.
    pub fn dependents_of(&self, idx: usize) -> &[usize] {
        &self.dependents[idx]
    }

    /// Whether `prerequisite` appears directly in the precedence entry of
    /// `task`. Transitive paths do not count.
    pub fn is_direct_prerequisite(&self, prerequisite: usize, task: usize) -> bool {
        self.deps[task].binary_search(&prerequisite).is_ok()
    }

    /// Whether a direct edge exists between `a` and `b` in either direction.
    pub fn directly_ordered(&self, a: usize, b: usize) -> bool {
        self.is_direct_prerequisite(a, b) || self.is_direct_prerequisite(b, a)
    }

    /// Round-by-round readiness tracker starting with nothing executed.
    pub fn wavefront(&self) -> Wavefront<'_> {
        Wavefront::new(self)
    }

    /// Task indices grouped by round: a task with no prerequisites is in
    /// round 0, otherwise one past the latest round among its prerequisites.
    pub fn rounds(&self) -> Vec<Vec<usize>> {
        let mut wavefront = self.wavefront();
        let mut rounds = Vec::new();
        while !wavefront.is_finished() {
            let ready = wavefront.ready();
            if ready.is_empty() {
                break;
            }
            wavefront.complete(&ready);
            rounds.push(ready);
        }
        rounds
    }
}

/// Mutable copy of the precedence information used to compute ready sets.
///
/// Each task keeps a count of prerequisites that have not completed yet;
/// completing a task decrements the count of each of its dependents.
#[derive(Debug, Clone)]
pub struct Wavefront<'g> {
    graph: &'g PrecedenceGraph,
    remaining: Vec<usize>,
    executed: Vec<bool>,
    executed_count: usize,
}

impl<'g> Wavefront<'g> {
    fn new(graph: &'g PrecedenceGraph) -> Self {
        let remaining = (0..graph.len())
            .map(|idx| graph.dependencies_of(idx).len())
            .collect();
        Self {
            graph,
            remaining,
            executed: vec![false; graph.len()],
            executed_count: 0,
        }
    }

    /// Tasks not yet executed whose prerequisites have all completed, in
    /// registration order.
    pub fn ready(&self) -> Vec<usize> {
        (0..self.graph.len())
            .filter(|&idx| !self.executed[idx] && self.remaining[idx] == 0)
            .collect()
    }

    /// Mark `batch` executed and release its dependents.
    pub fn complete(&mut self, batch: &[usize]) {
        for &idx in batch {
            if self.executed[idx] {
                continue;
            }
            self.executed[idx] = true;
            self.executed_count += 1;
            for &dependent in self.graph.dependents_of(idx) {
                self.remaining[dependent] = self.remaining[dependent].saturating_sub(1);
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.executed_count == self.graph.len()
    }
}
