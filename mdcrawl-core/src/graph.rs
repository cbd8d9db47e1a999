use crate::error::{CrawlError, Result};
use crate::export;
use crate::node::{ContentState, Node};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directed graph of crawled entities.
///
/// Nodes are kept in insertion order, which under BFS is discovery order. Edges
/// point from the discoverer to the discovered entity.
#[derive(Debug)]
pub struct Graph<N> {
    nodes: Vec<N>,
    index: HashMap<String, usize>,
    edges: HashMap<String, Vec<String>>,
}

/// Read-only view of a graph, handed to visualizers and JSON writers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<NodeSummary>,
    pub edges: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSummary {
    pub id: String,
    pub depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub state: ContentState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<N> Default for Graph<N> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            edges: HashMap::new(),
        }
    }
}

impl<N: Node> Graph<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node. Re-adding a node with the same id, depth and parent is a
    /// no-op; any other collision is a bug in identity computation.
    pub fn add_node(&mut self, node: N) -> Result<()> {
        if let Some(&position) = self.index.get(node.id()) {
            let stored = &self.nodes[position];
            if stored.depth() == node.depth() && stored.parent() == node.parent() {
                return Ok(());
            }
            return Err(CrawlError::DuplicateNode(node.id().to_string()));
        }

        self.index.insert(node.id().to_string(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Records a directed edge. Both endpoints must already be present; adding an
    /// existing edge again is a no-op.
    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<()> {
        for id in [from, to] {
            if !self.index.contains_key(id) {
                return Err(CrawlError::UnknownNode(id.to_string()));
            }
        }

        let targets = self.edges.entry(from.to_string()).or_default();
        if !targets.iter().any(|target| target == to) {
            targets.push(to.to_string());
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&N> {
        self.index.get(id).map(|&position| &self.nodes[position])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut N> {
        let position = *self.index.get(id)?;
        self.nodes.get_mut(position)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.nodes.iter()
    }

    /// Outgoing edges of `id`, in the order they were recorded.
    pub fn neighbors(&self, id: &str) -> &[String] {
        self.edges.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ids with an edge into `id`, in node insertion order.
    pub fn incoming(&self, id: &str) -> Vec<&str> {
        self.nodes
            .iter()
            .map(Node::id)
            .filter(|from| self.neighbors(from).iter().any(|to| to == id))
            .collect()
    }

    /// Every edge, grouped by source in node insertion order.
    pub fn edges(&self) -> Vec<(&str, &str)> {
        self.nodes
            .iter()
            .flat_map(|node| {
                self.neighbors(node.id())
                    .iter()
                    .map(move |to| (node.id(), to.as_str()))
            })
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    pub fn failed(&self) -> impl Iterator<Item = &N> {
        self.nodes
            .iter()
            .filter(|node| node.content_state() == ContentState::FetchFailed)
    }

    /// Walks parent ids back to the seed. Returns the ids from seed to `id`.
    pub fn path_to(&self, id: &str) -> Option<Vec<String>> {
        let mut path = Vec::new();
        let mut current = self.get(id)?;

        loop {
            path.push(current.id().to_string());
            match current.parent() {
                // bounded by node count
                Some(parent) if path.len() <= self.nodes.len() => current = self.get(parent)?,
                Some(_) => return None,
                None => break,
            }
        }

        path.reverse();
        Some(path)
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        let nodes = self
            .nodes
            .iter()
            .map(|node| NodeSummary {
                id: node.id().to_string(),
                depth: node.depth(),
                parent: node.parent().map(str::to_string),
                state: node.content_state(),
                error: node.failure().map(|e| e.to_string()),
            })
            .collect();

        let edges = self
            .edges()
            .into_iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();

        GraphSnapshot { nodes, edges }
    }

    /// Renders every node in insertion order. Nodes whose content cannot be
    /// fetched are left out.
    pub async fn render_all(&mut self) -> Vec<(String, String)> {
        let mut rendered = Vec::with_capacity(self.nodes.len());

        for node in self.nodes.iter_mut() {
            let id = node.id().to_string();
            match node.rendered().await {
                Ok(text) => rendered.push((id, text.to_string())),
                Err(e) => debug!("Skipping {} in render: {}", id, e),
            }
        }

        rendered
    }

    /// Concatenates every rendered node into one document, seed first.
    pub async fn render_combined(&mut self) -> String {
        let mut combined = String::new();

        for node in self.nodes.iter_mut() {
            let id = node.id().to_string();
            let text = match node.rendered().await {
                Ok(text) => text.trim().to_string(),
                Err(e) => {
                    debug!("Skipping {} in combined render: {}", id, e);
                    continue;
                }
            };
            let heading = node.title().unwrap_or_else(|| id.clone());

            if !combined.is_empty() {
                combined.push_str("\n\n---\n\n");
            }
            combined.push_str(&format!("# {}\n\n", heading));
            combined.push_str(&format!("Source: <{}>\n\n", id));
            combined.push_str(&text);
            combined.push('\n');
        }

        combined
    }

    /// Writes one rendered file per node into `directory`.
    pub async fn export_many(&mut self, directory: &Path) -> Result<Vec<PathBuf>> {
        let rendered = self.render_all().await;
        Ok(export::write_many(directory, &rendered)?)
    }

    /// Writes the combined document to `path`.
    pub async fn export_combined(&mut self, path: &Path) -> Result<()> {
        let combined = self.render_combined().await;
        Ok(export::write_one(path, &combined)?)
    }
}
