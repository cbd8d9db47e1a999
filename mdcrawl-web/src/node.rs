use crate::canonical::{canonicalize, host_of};
use crate::{document, markdown};
use mdcrawl_core::{ContentSlot, ContentSource, ContentState, FetchError, Node};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// A crawled web page. Its id is the canonical URL.
pub struct WebNode {
    id: String,
    url: Url,
    depth: usize,
    parent: Option<String>,
    source: Arc<dyn ContentSource>,
    html: ContentSlot<String>,
    markdown: Option<String>,
}

impl WebNode {
    /// Builds the node shell. Nothing is fetched until content is requested.
    pub fn new(
        raw_url: &str,
        depth: usize,
        parent: Option<&str>,
        source: Arc<dyn ContentSource>,
    ) -> Result<Self, FetchError> {
        let url = canonicalize(None, raw_url)
            .ok_or_else(|| FetchError::InvalidId(raw_url.to_string()))?;

        Ok(Self {
            id: url.to_string(),
            url,
            depth,
            parent: parent.map(str::to_string),
            source,
            html: ContentSlot::default(),
            markdown: None,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Lowercased host, used for session domain restriction.
    pub fn domain(&self) -> Option<String> {
        host_of(&self.url)
    }

    /// Canonical URLs of every hyperlink on the page, in document order,
    /// deduplicated and without the page itself.
    pub async fn connected_hyperlinks(&mut self) -> Result<Vec<Url>, FetchError> {
        let html = self.content().await?;
        let raw_links = document::extract_links(html)?;

        let mut seen = HashSet::new();
        let mut links = Vec::with_capacity(raw_links.len());
        for raw in raw_links {
            let Some(link) = canonicalize(Some(&self.url), &raw) else {
                continue;
            };
            if link.as_str() != self.id && seen.insert(link.to_string()) {
                links.push(link);
            }
        }

        Ok(links)
    }
}

impl fmt::Debug for WebNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebNode")
            .field("id", &self.id)
            .field("depth", &self.depth)
            .field("parent", &self.parent)
            .field("state", &self.html.state())
            .finish()
    }
}

impl Node for WebNode {
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
        self.html.state()
    }

    fn failure(&self) -> Option<&FetchError> {
        self.html.failure()
    }

    fn title(&self) -> Option<String> {
        self.html.value().and_then(|html| document::title(html))
    }

    async fn content(&mut self) -> Result<&str, FetchError> {
        let source = &self.source;
        let id = self.id.as_str();
        self.html
            .get_or_fetch(|| async move { Ok(source.fetch(id).await?) })
            .await
            .map(String::as_str)
    }

    async fn rendered(&mut self) -> Result<&str, FetchError> {
        self.content().await?;
        let html = self.html.value().map(String::as_str).unwrap_or_default();
        let url = &self.url;
        let markdown = self
            .markdown
            .get_or_insert_with(|| markdown::to_markdown(html, Some(url)));
        Ok(markdown.as_str())
    }

    fn mark_failed(&mut self, error: FetchError) {
        self.markdown = None;
        self.html.fail(error);
    }
}
