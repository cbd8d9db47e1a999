use anyhow::Context;
use clap::ArgMatches;
use colored::Colorize;
use mdcrawl_core::{Crawler, Graph, Node, ProgressCallback, visualize};
use mdcrawl_web::{DomainMatch, HttpTransport, WebCrawler, WebNode};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use url::Url;

// Helper functions for crawl handler

/// Load URLs from either a file or the `--url` arguments
pub fn load_urls_from_source(
    urls: &[Url],
    hosts_file: Option<&PathBuf>,
) -> Result<Vec<String>, String> {
    if let Some(hosts_file_path) = hosts_file {
        load_urls_from_file(hosts_file_path)
    } else if !urls.is_empty() {
        Ok(urls.iter().map(|url| url.as_str().to_string()).collect())
    } else {
        Err("Either --url or --hosts-file must be provided".to_string())
    }
}

/// Load and parse URLs from a file. Blank lines and `#` comments are ignored.
pub fn load_urls_from_file(path: &PathBuf) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read hosts file {}: {}", path.display(), e))?;

    let urls: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(parse_url_line)
        .collect();

    if urls.is_empty() {
        return Err(format!("No valid URLs found in {}", path.display()));
    }

    Ok(urls)
}

/// Parse a single line as a URL, trying to add http:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    if Url::parse(line).is_ok() {
        return Some(line.to_string());
    }

    let with_scheme = format!("http://{}", line);
    if Url::parse(&with_scheme).is_ok() {
        return Some(with_scheme);
    }

    eprintln!("{} Skipping invalid URL '{}'", "⚠".yellow(), line);
    None
}

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Expands a leading `~` in a user-supplied path
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Where the finished graph is written. Every target is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputTargets {
    pub output_dir: Option<PathBuf>,
    pub combined: Option<PathBuf>,
    pub json: Option<PathBuf>,
    pub dot: Option<PathBuf>,
}

impl OutputTargets {
    pub fn is_empty(&self) -> bool {
        self.output_dir.is_none() && self.combined.is_none() && self.json.is_none() && self.dot.is_none()
    }
}

/// Options for a crawl, resolved from the command line
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub seeds: Vec<String>,
    pub max_depth: usize,
    pub max_results: Option<usize>,
    pub allowed_domains: Vec<String>,
    pub domain_match: DomainMatch,
    pub restrict_to_domain: bool,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub outputs: OutputTargets,
}

impl CrawlSettings {
    pub fn from_matches(sub_matches: &ArgMatches) -> Result<Self, String> {
        let urls: Vec<Url> = sub_matches
            .get_many::<Url>("url")
            .map(|values| values.cloned().collect())
            .unwrap_or_default();
        let hosts_file = sub_matches.get_one::<PathBuf>("hosts-file");
        let seeds = load_urls_from_source(&urls, hosts_file)?;

        let path_arg = |name: &str| sub_matches.get_one::<String>(name).map(|raw| expand_path(raw));

        Ok(Self {
            seeds,
            max_depth: sub_matches.get_one::<usize>("depth").copied().unwrap_or(2),
            max_results: sub_matches.get_one::<usize>("max-results").copied(),
            allowed_domains: sub_matches
                .get_many::<String>("allow-domain")
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
            domain_match: if sub_matches.get_flag("include-subdomains") {
                DomainMatch::IncludeSubdomains
            } else {
                DomainMatch::Exact
            },
            restrict_to_domain: !sub_matches.get_flag("no-restrict"),
            timeout_secs: sub_matches.get_one::<u64>("timeout").copied().unwrap_or(10),
            user_agent: sub_matches
                .get_one::<String>("user-agent")
                .cloned()
                .unwrap_or_else(|| mdcrawl_web::transport::DEFAULT_USER_AGENT.to_string()),
            outputs: OutputTargets {
                output_dir: path_arg("output-dir"),
                combined: path_arg("combined"),
                json: path_arg("json"),
                dot: path_arg("dot"),
            },
        })
    }
}

/// A page that could not be fetched or expanded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedPage {
    pub url: String,
    pub error: String,
}

/// Outcome of a finished crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    pub seeds: usize,
    pub pages: Vec<(usize, String)>,
    pub edges: usize,
    pub failed: Vec<FailedPage>,
    pub written: Vec<PathBuf>,
}

/// Builds the engine and web extension from the crawl settings
pub fn build_crawler(settings: &CrawlSettings) -> anyhow::Result<Crawler<WebCrawler>> {
    let transport = HttpTransport::with_options(settings.timeout_secs, &settings.user_agent)
        .context("Failed to build HTTP client")?;

    let extension = WebCrawler::new(Arc::new(transport))
        .with_allowed_domains(&settings.allowed_domains)
        .with_domain_match(settings.domain_match)
        .with_restrict_to_domain(settings.restrict_to_domain);

    let mut crawler = Crawler::new(extension);
    if let Some(max_results) = settings.max_results {
        crawler = crawler.with_max_results(max_results);
    }
    Ok(crawler)
}

/// Execute a crawl with the given settings and write the requested outputs
pub async fn execute_crawl(
    settings: &CrawlSettings,
    progress_callback: Option<ProgressCallback>,
) -> anyhow::Result<CrawlSummary> {
    let mut crawler = build_crawler(settings)?;
    if let Some(callback) = progress_callback {
        crawler = crawler.with_progress_callback(callback);
    }

    let mut graph = crawler
        .crawl_multiple(&settings.seeds, settings.max_depth)
        .await
        .context("Crawl failed")?;

    let written = write_outputs(&mut graph, &settings.outputs).await?;

    Ok(CrawlSummary {
        seeds: settings.seeds.len(),
        pages: graph
            .nodes()
            .map(|node| (node.depth(), node.id().to_string()))
            .collect(),
        edges: graph.edge_count(),
        failed: graph
            .failed()
            .map(|node| FailedPage {
                url: node.id().to_string(),
                error: node.failure().map(ToString::to_string).unwrap_or_default(),
            })
            .collect(),
        written,
    })
}

/// Writes every requested output for a finished graph, returning the paths written
pub async fn write_outputs(
    graph: &mut Graph<WebNode>,
    outputs: &OutputTargets,
) -> anyhow::Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    if let Some(ref dir) = outputs.output_dir {
        let files = graph
            .export_many(dir)
            .await
            .with_context(|| format!("Failed to write pages to {}", dir.display()))?;
        info!("Wrote {} page(s) to {}", files.len(), dir.display());
        written.extend(files);
    }

    if let Some(ref path) = outputs.combined {
        graph
            .export_combined(path)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path.clone());
    }

    let snapshot = graph.snapshot();

    if let Some(ref path) = outputs.json {
        let json = visualize::to_json(&snapshot).context("Failed to serialize graph")?;
        save_output(&json, path)?;
        written.push(path.clone());
    }

    if let Some(ref path) = outputs.dot {
        save_output(&visualize::to_dot(&snapshot), path)?;
        written.push(path.clone());
    }

    Ok(written)
}

fn save_output(content: &str, path: &Path) -> anyhow::Result<()> {
    mdcrawl_core::export::write_one(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Generate a human-readable crawl report
pub fn generate_crawl_report(summary: &CrawlSummary) -> String {
    let divider = "━".repeat(52);
    let mut report = String::new();
    report.push_str(&format!("{}\n\n", divider.bright_blue()));
    report.push_str(&format!("{}\n", "Summary:".bold()));
    report.push_str(&format!("  Seeds: {}\n", summary.seeds.to_string().cyan()));
    report.push_str(&format!("  Pages crawled: {}\n", summary.pages.len().to_string().cyan()));
    report.push_str(&format!("  Links followed: {}\n", summary.edges.to_string().cyan()));
    report.push_str(&format!("  Failed pages: {}\n", summary.failed.len().to_string().cyan()));
    report.push_str(&format!("\n{}\n\n", divider.bright_blue()));

    for (depth, url) in &summary.pages {
        let failed = summary.failed.iter().any(|f| &f.url == url);
        let marker = if failed { "✗".red() } else { "✓".green() };
        report.push_str(&format!("  {} [{}] {}\n", marker, depth, url));
    }

    if !summary.failed.is_empty() {
        report.push_str(&format!("\n{}\n", "Failed:".red().bold()));
        for page in &summary.failed {
            report.push_str(&format!("  {} {}\n", page.url, page.error.bright_black()));
        }
    }

    if !summary.written.is_empty() {
        report.push_str(&format!("\n{}\n", "Written:".bold()));
        for path in &summary.written {
            report.push_str(&format!("  {}\n", path.display()));
        }
    }

    report
}
