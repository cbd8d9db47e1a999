pub mod commands;
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    CrawlSettings, CrawlSummary, OutputTargets, execute_crawl, generate_crawl_report,
    load_urls_from_file, load_urls_from_source, parse_url_line,
};
