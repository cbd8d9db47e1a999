use thiserror::Error;

/// Failure reported by a content source while retrieving raw content.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("request timed out")]
    Timeout,

    #[error("unsupported content type: {0}")]
    UnsupportedContent(String),

    #[error("client setup failed: {0}")]
    Client(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("parse error: {0}")]
pub struct ParseError(pub String);

/// Per-entity failure. Recorded on the entity, never fatal to a crawl.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("invalid seed {id}: {source}")]
    InvalidSeed {
        id: String,
        #[source]
        source: FetchError,
    },

    #[error("duplicate node with conflicting identity: {0}")]
    DuplicateNode(String),

    #[error("edge references unknown node: {0}")]
    UnknownNode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CrawlError {
    pub fn invalid_seed(id: impl Into<String>, source: FetchError) -> Self {
        CrawlError::InvalidSeed {
            id: id.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CrawlError>;
