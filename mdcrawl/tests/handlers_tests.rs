use mdcrawl::commands::command_argument_builder;
use mdcrawl::handlers::*;
use mdcrawl_web::DomainMatch;
use std::io::Write;
use std::path::PathBuf;
use tempfile::{NamedTempFile, TempDir};
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn crawl_matches(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["mdcrawl", "crawl"];
    argv.extend_from_slice(args);
    let matches = command_argument_builder().try_get_matches_from(argv).unwrap();
    matches.subcommand_matches("crawl").unwrap().clone()
}

#[test]
fn test_parse_url_line_with_scheme() {
    let result = parse_url_line("https://example.com");
    assert_eq!(result, Some("https://example.com".to_string()));
}

#[test]
fn test_parse_url_line_without_scheme() {
    let result = parse_url_line("example.com");
    assert_eq!(result, Some("http://example.com".to_string()));
}

#[test]
fn test_parse_url_line_invalid() {
    let result = parse_url_line("not a valid url!!!");
    assert_eq!(result, None);
}

#[test]
fn test_extract_url_path() {
    assert_eq!(
        extract_url_path("https://example.com/api/users"),
        "/api/users"
    );
    assert_eq!(extract_url_path("https://example.com/"), "/");
    assert_eq!(extract_url_path("https://example.com"), "/");
}

#[test]
fn test_load_urls_from_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut temp_file = NamedTempFile::new()?;
    writeln!(temp_file, "https://example.com")?;
    writeln!(temp_file, "docs.rs")?;
    writeln!(temp_file)?; // Empty line
    writeln!(temp_file, "# a comment")?;
    writeln!(temp_file, "https://blog.example.com")?;

    let path = PathBuf::from(temp_file.path());
    let urls = load_urls_from_file(&path)?;

    assert_eq!(urls.len(), 3);
    assert_eq!(urls[0], "https://example.com");
    assert_eq!(urls[1], "http://docs.rs");
    assert_eq!(urls[2], "https://blog.example.com");

    Ok(())
}

#[test]
fn test_load_urls_from_file_empty() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file).unwrap();
    writeln!(temp_file, "   ").unwrap();

    let path = PathBuf::from(temp_file.path());
    let result = load_urls_from_file(&path);

    assert!(result.is_err());
    assert!(result.unwrap_err().contains("No valid URLs"));
}

#[test]
fn test_load_urls_from_source_urls() {
    let urls = vec![
        Url::parse("https://example.com").unwrap(),
        Url::parse("https://docs.example.com/start").unwrap(),
    ];
    let result = load_urls_from_source(&urls, None).unwrap();

    assert_eq!(
        result,
        vec!["https://example.com/", "https://docs.example.com/start"]
    );
}

#[test]
fn test_load_urls_from_source_no_input() {
    let result = load_urls_from_source(&[], None);
    assert!(result.is_err());
    assert!(
        result
            .unwrap_err()
            .contains("Either --url or --hosts-file must be provided")
    );
}

#[test]
fn test_settings_defaults() {
    let settings = CrawlSettings::from_matches(&crawl_matches(&["-u", "https://example.com"])).unwrap();

    assert_eq!(settings.seeds, vec!["https://example.com/"]);
    assert_eq!(settings.max_depth, 2);
    assert_eq!(settings.max_results, None);
    assert!(settings.allowed_domains.is_empty());
    assert_eq!(settings.domain_match, DomainMatch::Exact);
    assert!(settings.restrict_to_domain);
    assert_eq!(settings.timeout_secs, 10);
    assert_eq!(settings.user_agent, mdcrawl_web::transport::DEFAULT_USER_AGENT);
    assert!(settings.outputs.is_empty());
}

#[test]
fn test_settings_from_flags() {
    let settings = CrawlSettings::from_matches(&crawl_matches(&[
        "-u",
        "https://a.example.com",
        "-u",
        "https://b.example.com",
        "--depth",
        "4",
        "--max-results",
        "50",
        "-a",
        "example.com",
        "--allow-domain",
        "example.org",
        "--include-subdomains",
        "--no-restrict",
        "--timeout",
        "3",
        "--user-agent",
        "test-agent",
        "-o",
        "/tmp/pages",
        "--json",
        "/tmp/graph.json",
    ]))
    .unwrap();

    assert_eq!(settings.seeds.len(), 2);
    assert_eq!(settings.max_depth, 4);
    assert_eq!(settings.max_results, Some(50));
    assert_eq!(settings.allowed_domains, vec!["example.com", "example.org"]);
    assert_eq!(settings.domain_match, DomainMatch::IncludeSubdomains);
    assert!(!settings.restrict_to_domain);
    assert_eq!(settings.timeout_secs, 3);
    assert_eq!(settings.user_agent, "test-agent");
    assert_eq!(settings.outputs.output_dir, Some(PathBuf::from("/tmp/pages")));
    assert_eq!(settings.outputs.json, Some(PathBuf::from("/tmp/graph.json")));
    assert_eq!(settings.outputs.combined, None);
}

#[test]
fn test_url_conflicts_with_hosts_file() {
    let result = command_argument_builder().try_get_matches_from([
        "mdcrawl",
        "crawl",
        "-u",
        "https://example.com",
        "-H",
        "hosts.txt",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_expand_path_tilde() {
    let expanded = expand_path("~/notes");
    assert!(!expanded.to_string_lossy().starts_with('~'));
    assert!(expanded.ends_with("notes"));
    assert_eq!(expand_path("/abs/path"), PathBuf::from("/abs/path"));
}

#[test]
fn test_generate_crawl_report() {
    let summary = CrawlSummary {
        seeds: 1,
        pages: vec![
            (0, "https://example.com/".to_string()),
            (1, "https://example.com/about".to_string()),
            (1, "https://example.com/gone".to_string()),
        ],
        edges: 2,
        failed: vec![FailedPage {
            url: "https://example.com/gone".to_string(),
            error: "HTTP status 404".to_string(),
        }],
        written: vec![PathBuf::from("/tmp/site.md")],
    };

    let report = generate_crawl_report(&summary);

    assert!(report.contains("Pages crawled:"));
    assert!(report.contains("Links followed:"));
    assert!(report.contains("https://example.com/about"));
    assert!(report.contains("https://example.com/gone"));
    assert!(report.contains("HTTP status 404"));
    assert!(report.contains("/tmp/site.md"));
}

#[tokio::test]
async fn test_execute_crawl_writes_outputs() {
    let mock_server = MockServer::start().await;
    let uri = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(
                    r#"<html><head><title>Home</title></head>
                       <body><h1>Welcome</h1><a href="/guide">Guide</a><a href="/missing">Missing</a></body></html>"#,
                ),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/guide"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string("<h2>Guide</h2><p>Read me.</p>"),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let out = TempDir::new().unwrap();
    let pages_dir = out.path().join("pages");
    let combined = out.path().join("site.md");
    let json = out.path().join("graph.json");
    let dot = out.path().join("graph.dot");

    let settings = CrawlSettings::from_matches(&crawl_matches(&[
        "-u",
        &uri,
        "--depth",
        "1",
        "-o",
        pages_dir.to_str().unwrap(),
        "--combined",
        combined.to_str().unwrap(),
        "--json",
        json.to_str().unwrap(),
        "--dot",
        dot.to_str().unwrap(),
    ]))
    .unwrap();

    let summary = execute_crawl(&settings, None).await.unwrap();

    assert_eq!(summary.pages.len(), 3);
    assert_eq!(summary.edges, 2);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].url, format!("{}/missing", uri));

    // Two rendered pages, the failed one is skipped
    assert_eq!(std::fs::read_dir(&pages_dir).unwrap().count(), 2);

    let document = std::fs::read_to_string(&combined).unwrap();
    assert!(document.starts_with("# Home\n"));
    assert!(document.contains("# Welcome"));
    assert!(document.contains("## Guide"));

    let snapshot = std::fs::read_to_string(&json).unwrap();
    assert!(snapshot.contains("fetch_failed"));
    assert!(std::fs::read_to_string(&dot).unwrap().starts_with("digraph"));

    assert_eq!(summary.written.len(), 5);
}

#[tokio::test]
async fn test_execute_crawl_invalid_seed() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let settings = CrawlSettings::from_matches(&crawl_matches(&["-u", &mock_server.uri()])).unwrap();
    let err = execute_crawl(&settings, None).await.unwrap_err();

    assert!(format!("{:#}", err).contains("Crawl failed"));
}
