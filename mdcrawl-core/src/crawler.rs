use crate::error::{CrawlError, FetchError, Result};
use crate::graph::Graph;
use crate::node::{ContentState, Node};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Called with `(depth, id)` each time an entity is expanded.
pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// What a concrete crawler supplies to the traversal engine.
///
/// The engine knows nothing about scope rules or content formats: filtering
/// happens in `visit_node_neighborhood`, identity in `canonicalize`.
#[allow(async_fn_in_trait)]
pub trait CrawlerExtension {
    type Node: Node;

    /// Maps a raw seed reference to its canonical id. `None` means the reference
    /// can never name an entity.
    fn canonicalize(&self, raw_id: &str) -> Option<String> {
        Some(raw_id.to_string())
    }

    /// Resets per-session state before a seed is expanded.
    async fn start_new_crawling_session(&mut self, seed_id: &str) -> std::result::Result<(), FetchError>;

    /// Builds the entity shell for `id`. Content fetching is deferred to the node.
    async fn get_node(
        &mut self,
        id: &str,
        depth: usize,
        parent: Option<&str>,
    ) -> std::result::Result<Self::Node, FetchError>;

    /// Returns the in-scope neighbor ids of `node`, in document order, without
    /// the node's own id.
    async fn visit_node_neighborhood(
        &mut self,
        node: &mut Self::Node,
    ) -> std::result::Result<Vec<String>, FetchError>;
}

/// Transient per-seed state.
#[derive(Debug, Default)]
struct Session {
    frontier: VecDeque<(String, usize)>,
    visited: HashSet<String>,
}

impl Session {
    fn schedule(&mut self, id: String, depth: usize) {
        self.visited.insert(id.clone());
        self.frontier.push_back((id, depth));
    }
}

/// Breadth-first traversal engine over a `CrawlerExtension`.
pub struct Crawler<E> {
    extension: E,
    max_results: Option<usize>,
    progress_callback: Option<ProgressCallback>,
}

impl<E: CrawlerExtension> Crawler<E> {
    pub fn new(extension: E) -> Self {
        Self {
            extension,
            max_results: None,
            progress_callback: None,
        }
    }

    /// Caps the number of entities a crawl may materialize.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn extension(&self) -> &E {
        &self.extension
    }

    pub fn extension_mut(&mut self) -> &mut E {
        &mut self.extension
    }

    /// Crawls from a single seed. `max_depth` is an inclusive hop bound.
    pub async fn crawl(&mut self, seed_id: &str, max_depth: usize) -> Result<Graph<E::Node>> {
        let mut graph = Graph::new();
        self.crawl_into(&mut graph, seed_id, max_depth).await?;
        info!(
            "Crawl of {} complete: {} nodes, {} edges",
            seed_id,
            graph.len(),
            graph.edge_count()
        );
        Ok(graph)
    }

    /// Crawls each seed in turn into one shared graph. Entities reachable from
    /// several seeds are materialized once; edges from every discoverer are kept.
    ///
    /// Invalid seeds are logged and skipped. The last `InvalidSeed` is returned
    /// only when no seed produced anything.
    pub async fn crawl_multiple<S: AsRef<str>>(
        &mut self,
        seed_ids: &[S],
        max_depth: usize,
    ) -> Result<Graph<E::Node>> {
        let mut graph = Graph::new();
        let mut last_invalid = None;

        for (idx, seed_id) in seed_ids.iter().enumerate() {
            if self.budget_exhausted(&graph) {
                info!("Result limit reached, skipping {} remaining seed(s)", seed_ids.len() - idx);
                break;
            }

            match self.crawl_into(&mut graph, seed_id.as_ref(), max_depth).await {
                Ok(()) => {}
                Err(e @ CrawlError::InvalidSeed { .. }) => {
                    warn!("{}", e);
                    last_invalid = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        if graph.is_empty()
            && let Some(e) = last_invalid
        {
            return Err(e);
        }

        info!(
            "Crawl of {} seed(s) complete: {} nodes, {} edges",
            seed_ids.len(),
            graph.len(),
            graph.edge_count()
        );
        Ok(graph)
    }

    fn budget_exhausted(&self, graph: &Graph<E::Node>) -> bool {
        self.max_results.is_some_and(|limit| graph.len() >= limit)
    }

    /// Runs one BFS into `graph`. On `InvalidSeed` the graph is left untouched.
    ///
    /// The session depth bounds expansion; stored depths always count hops from the
    /// recorded parent, so a node first found by an earlier seed keeps its depth and
    /// its new children sit one below it.
    async fn crawl_into(
        &mut self,
        graph: &mut Graph<E::Node>,
        raw_seed: &str,
        max_depth: usize,
    ) -> Result<()> {
        let seed_id = self.extension.canonicalize(raw_seed).ok_or_else(|| {
            CrawlError::invalid_seed(raw_seed, FetchError::InvalidId(raw_seed.to_string()))
        })?;

        if !graph.contains(&seed_id) && self.budget_exhausted(graph) {
            info!("Result limit reached, not starting crawl of {}", seed_id);
            return Ok(());
        }

        info!("Starting crawl of {} (max depth {})", seed_id, max_depth);

        self.extension
            .start_new_crawling_session(&seed_id)
            .await
            .map_err(|e| CrawlError::invalid_seed(&seed_id, e))?;

        self.materialize_seed(graph, &seed_id).await?;

        let mut session = Session::default();
        session.schedule(seed_id, 0);

        'bfs: while let Some((current_id, depth)) = session.frontier.pop_front() {
            if depth >= max_depth {
                continue;
            }

            let Some(current) = graph.get_mut(&current_id) else {
                continue;
            };
            if current.content_state() == ContentState::FetchFailed {
                continue;
            }
            let child_depth = current.depth() + 1;

            if let Some(ref callback) = self.progress_callback {
                callback(depth, current_id.clone());
            }

            let neighbors = match self.extension.visit_node_neighborhood(current).await {
                Ok(neighbors) => neighbors,
                Err(e) => {
                    warn!("Failed to expand {}: {}", current_id, e);
                    current.mark_failed(e);
                    continue;
                }
            };
            debug!("{} -> {} neighbor(s)", current_id, neighbors.len());

            for neighbor_id in neighbors {
                if neighbor_id == current_id || session.visited.contains(&neighbor_id) {
                    continue;
                }

                if !graph.contains(&neighbor_id) {
                    if self.budget_exhausted(graph) {
                        info!("Result limit reached, stopping crawl of {}", current_id);
                        break 'bfs;
                    }

                    match self
                        .extension
                        .get_node(&neighbor_id, child_depth, Some(&current_id))
                        .await
                    {
                        Ok(node) => graph.add_node(node)?,
                        Err(e) => {
                            warn!("Skipping {}: {}", neighbor_id, e);
                            session.visited.insert(neighbor_id);
                            continue;
                        }
                    }
                }

                graph.add_edge(&current_id, &neighbor_id)?;
                session.schedule(neighbor_id, depth + 1);
            }
        }

        Ok(())
    }

    /// Inserts the seed, or reuses it when an earlier seed already discovered it,
    /// and checks that its content can be fetched.
    async fn materialize_seed(&mut self, graph: &mut Graph<E::Node>, seed_id: &str) -> Result<()> {
        if let Some(existing) = graph.get_mut(seed_id) {
            existing
                .content()
                .await
                .map_err(|e| CrawlError::invalid_seed(seed_id, e))?;
            return Ok(());
        }

        let mut seed = self
            .extension
            .get_node(seed_id, 0, None)
            .await
            .map_err(|e| CrawlError::invalid_seed(seed_id, e))?;
        seed.content()
            .await
            .map_err(|e| CrawlError::invalid_seed(seed_id, e))?;

        graph.add_node(seed)
    }
}
