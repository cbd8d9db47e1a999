//! Generic breadth-first crawling over lazily materialized document graphs.
//!
//! A concrete crawler implements [`CrawlerExtension`] (how to build entities and
//! find their neighbors) and [`Node`] (how an entity fetches and renders its
//! content). [`Crawler`] drives the traversal and returns a [`Graph`].

pub mod crawler;
pub mod error;
pub mod export;
pub mod graph;
pub mod node;
pub mod source;
pub mod visualize;

pub use crawler::{Crawler, CrawlerExtension, ProgressCallback};
pub use error::{CrawlError, FetchError, ParseError, Result, TransportError};
pub use graph::{Graph, GraphSnapshot, NodeSummary};
pub use node::{ContentSlot, ContentState, Node};
pub use source::ContentSource;
