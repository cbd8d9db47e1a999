//! Web extension for `mdcrawl-core`: pages are nodes, hyperlinks are edges and
//! each page renders to Markdown.

pub mod canonical;
pub mod crawler;
pub mod document;
pub mod domain;
pub mod markdown;
pub mod node;
pub mod transport;

pub use crawler::WebCrawler;
pub use domain::{AllowedDomains, DomainMatch};
pub use node::WebNode;
pub use transport::HttpTransport;
