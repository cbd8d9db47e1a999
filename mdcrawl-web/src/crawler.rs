use crate::canonical::{canonical_id, canonicalize, host_of};
use crate::domain::{AllowedDomains, DomainMatch};
use crate::node::WebNode;
use crate::transport::HttpTransport;
use mdcrawl_core::{ContentSource, CrawlerExtension, FetchError, TransportError};
use std::sync::Arc;
use tracing::debug;

/// Web implementation of the crawler extension: builds `WebNode`s, extracts
/// their links and keeps the crawl inside the allowed domains.
pub struct WebCrawler {
    source: Arc<dyn ContentSource>,
    domains: AllowedDomains,
    restrict_to_domain: bool,
}

impl WebCrawler {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self {
            source,
            domains: AllowedDomains::default(),
            restrict_to_domain: true,
        }
    }

    /// Crawler over a default `HttpTransport`.
    pub fn with_http(timeout_secs: u64) -> Result<Self, TransportError> {
        Ok(Self::new(Arc::new(HttpTransport::with_timeout(timeout_secs)?)))
    }

    pub fn with_allowed_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mode = self.domains.mode();
        self.domains = AllowedDomains::new(domains).with_mode(mode);
        self
    }

    pub fn with_domain_match(mut self, mode: DomainMatch) -> Self {
        self.domains = self.domains.with_mode(mode);
        self
    }

    /// When set, each session also allows the seed's own host. Defaults to true.
    pub fn with_restrict_to_domain(mut self, restrict: bool) -> Self {
        self.restrict_to_domain = restrict;
        self
    }

    pub fn allowed_domains(&self) -> &AllowedDomains {
        &self.domains
    }

    pub fn in_allowed_domain(&self, url: &str) -> bool {
        canonicalize(None, url).is_some_and(|url| self.domains.allows(&url))
    }
}

impl CrawlerExtension for WebCrawler {
    type Node = WebNode;

    fn canonicalize(&self, raw_id: &str) -> Option<String> {
        canonical_id(None, raw_id)
    }

    async fn start_new_crawling_session(&mut self, seed_id: &str) -> Result<(), FetchError> {
        let seed = canonicalize(None, seed_id)
            .ok_or_else(|| FetchError::InvalidId(seed_id.to_string()))?;

        if self.restrict_to_domain {
            self.domains.reset_session(host_of(&seed));
        } else {
            self.domains.reset_session(None::<String>);
        }
        debug!(
            "Session for {}: base domains {:?}, session domains {:?}",
            seed_id,
            self.domains.base(),
            self.domains.session()
        );
        Ok(())
    }

    async fn get_node(
        &mut self,
        id: &str,
        depth: usize,
        parent: Option<&str>,
    ) -> Result<WebNode, FetchError> {
        WebNode::new(id, depth, parent, self.source.clone())
    }

    async fn visit_node_neighborhood(&mut self, node: &mut WebNode) -> Result<Vec<String>, FetchError> {
        let links = node.connected_hyperlinks().await?;

        Ok(links
            .into_iter()
            .filter(|link| {
                let allowed = self.domains.allows(link);
                if !allowed {
                    debug!("  -> {} outside allowed domains, skipping", link);
                }
                allowed
            })
            .map(String::from)
            .collect())
    }
}
