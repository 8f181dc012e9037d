// src/system/dot.rs

//! Graphviz export of the precedence graph.
//!
//! Turning the DOT text into an image is left to `dot -Tpng`.

use petgraph::dot::{Config, Dot};
use petgraph::graphmap::DiGraphMap;

use crate::system::TaskSystem;

/// Render the precedence graph as DOT.
///
/// Edge direction: prerequisite -> dependent. Every task is emitted as a node,
/// including tasks with no edges.
pub fn to_dot(system: &TaskSystem) -> String {
    let graph = system.graph();
    let mut dag: DiGraphMap<&str, &str> = DiGraphMap::new();

    for name in graph.names() {
        dag.add_node(name.as_str());
    }

    for idx in 0..graph.len() {
        for &dep in graph.dependencies_of(idx) {
            dag.add_edge(graph.name(dep), graph.name(idx), "");
        }
    }

    format!("{}", Dot::with_config(&dag, &[Config::EdgeNoLabel]))
}
