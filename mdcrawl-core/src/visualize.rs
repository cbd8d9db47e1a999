use crate::graph::GraphSnapshot;
use crate::node::ContentState;
use petgraph::dot::{Config, Dot};
use petgraph::graph::DiGraph;
use std::collections::HashMap;

/// Renders a snapshot as a Graphviz DOT digraph. Failed nodes are labelled as such.
pub fn to_dot(snapshot: &GraphSnapshot) -> String {
    let mut graph: DiGraph<String, &str> = DiGraph::new();
    let mut indices = HashMap::with_capacity(snapshot.nodes.len());

    for node in &snapshot.nodes {
        let label = match node.state {
            ContentState::FetchFailed => format!("{} (failed)", node.id),
            _ => node.id.clone(),
        };
        indices.insert(node.id.as_str(), graph.add_node(label));
    }

    for (from, to) in &snapshot.edges {
        if let (Some(&a), Some(&b)) = (indices.get(from.as_str()), indices.get(to.as_str())) {
            graph.add_edge(a, b, "");
        }
    }

    format!("{}", Dot::with_config(&graph, &[Config::EdgeNoLabel]))
}

pub fn to_json(snapshot: &GraphSnapshot) -> serde_json::Result<String> {
    serde_json::to_string_pretty(snapshot)
}
