// In-memory crawler used by the engine and graph tests

#![allow(dead_code)]

use futures::future::{BoxFuture, FutureExt};
use mdcrawl_core::{
    ContentSlot, ContentSource, ContentState, CrawlerExtension, FetchError, Node, TransportError,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Pages keyed by id; a page's content is its outgoing links, one per line.
#[derive(Default, Debug)]
pub struct StubSource {
    pages: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    fetches: Mutex<HashMap<String, usize>>,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, id: &str, links: &[&str]) -> Self {
        self.pages
            .insert(id.to_string(), links.iter().map(|l| l.to_string()).collect());
        self
    }

    pub fn failing(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    pub fn fetch_count(&self, id: &str) -> usize {
        self.fetches.lock().unwrap().get(id).copied().unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches.lock().unwrap().values().sum()
    }
}

impl ContentSource for StubSource {
    fn fetch<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<String, TransportError>> {
        *self.fetches.lock().unwrap().entry(id.to_string()).or_insert(0) += 1;

        let result = if self.failing.contains(id) {
            Err(TransportError::Status(500))
        } else {
            match self.pages.get(id) {
                Some(links) => Ok(links.join("\n")),
                None => Err(TransportError::Status(404)),
            }
        };
        futures::future::ready(result).boxed()
    }
}

#[derive(Debug)]
pub struct StubNode {
    id: String,
    depth: usize,
    parent: Option<String>,
    source: Arc<StubSource>,
    content: ContentSlot<String>,
    rendered: Option<String>,
}

impl StubNode {
    pub fn new(id: &str, depth: usize, parent: Option<&str>, source: Arc<StubSource>) -> Self {
        Self {
            id: id.to_string(),
            depth,
            parent: parent.map(str::to_string),
            source,
            content: ContentSlot::default(),
            rendered: None,
        }
    }
}

impl Node for StubNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn depth(&self) -> usize {
        self.depth
    }

    fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    fn content_state(&self) -> ContentState {
        self.content.state()
    }

    fn failure(&self) -> Option<&FetchError> {
        self.content.failure()
    }

    async fn content(&mut self) -> Result<&str, FetchError> {
        let source = &self.source;
        let id = self.id.as_str();
        self.content
            .get_or_fetch(|| async move { Ok(source.fetch(id).await?) })
            .await
            .map(String::as_str)
    }

    async fn rendered(&mut self) -> Result<&str, FetchError> {
        self.content().await?;
        let id = self.id.as_str();
        let body = self.content.value().map(String::as_str).unwrap_or_default();
        let rendered = self
            .rendered
            .get_or_insert_with(|| format!("page {} links [{}]", id, body.replace('\n', ", ")));
        Ok(rendered.as_str())
    }

    fn mark_failed(&mut self, error: FetchError) {
        self.content.fail(error);
    }
}

/// Extension over a `StubSource`; records sessions and materializations.
pub struct StubCrawler {
    pub source: Arc<StubSource>,
    pub sessions: Vec<String>,
    pub materialized: HashMap<String, usize>,
}

impl StubCrawler {
    pub fn new(source: StubSource) -> Self {
        Self {
            source: Arc::new(source),
            sessions: Vec::new(),
            materialized: HashMap::new(),
        }
    }

    pub fn materialized(&self, id: &str) -> usize {
        self.materialized.get(id).copied().unwrap_or(0)
    }
}

impl CrawlerExtension for StubCrawler {
    type Node = StubNode;

    fn canonicalize(&self, raw_id: &str) -> Option<String> {
        let trimmed = raw_id.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    async fn start_new_crawling_session(&mut self, seed_id: &str) -> Result<(), FetchError> {
        self.sessions.push(seed_id.to_string());
        Ok(())
    }

    async fn get_node(
        &mut self,
        id: &str,
        depth: usize,
        parent: Option<&str>,
    ) -> Result<StubNode, FetchError> {
        *self.materialized.entry(id.to_string()).or_insert(0) += 1;
        Ok(StubNode::new(id, depth, parent, self.source.clone()))
    }

    async fn visit_node_neighborhood(
        &mut self,
        node: &mut StubNode,
    ) -> Result<Vec<String>, FetchError> {
        let own_id = node.id().to_string();
        let content = node.content().await?;
        Ok(content
            .lines()
            .filter(|line| !line.is_empty() && *line != own_id)
            .map(str::to_string)
            .collect())
    }
}
