use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use mdcrawl::commands::command_argument_builder;
use mdcrawl::handlers::{CrawlSettings, execute_crawl, extract_url_path, generate_crawl_report};
use mdcrawl_core::ProgressCallback;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Progress output stays readable unless debug logging is asked for
    let level = if chosen_command.get_flag("verbose") {
        Level::DEBUG
    } else {
        Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match chosen_command.subcommand() {
        Some(("crawl", primary_command)) => handle_crawl(primary_command, quiet).await,
        _ => unreachable!("clap should ensure we don't get here"),
    }
}

async fn handle_crawl(sub_matches: &ArgMatches, quiet: bool) {
    let settings = match CrawlSettings::from_matches(sub_matches) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    if !quiet {
        println!("\n{} Crawling {} seed(s)", "→".blue(), settings.seeds.len());
        println!("Max depth: {}", settings.max_depth);
        if let Some(max_results) = settings.max_results {
            println!("Max results: {}", max_results);
        }
        let scope = match (settings.restrict_to_domain, settings.allowed_domains.is_empty()) {
            (true, true) => "seed host only".to_string(),
            (true, false) => format!("seed host + {}", settings.allowed_domains.join(", ")),
            (false, true) => "unrestricted".to_string(),
            (false, false) => settings.allowed_domains.join(", "),
        };
        println!("Domains: {}\n", scope);
        if settings.outputs.is_empty() {
            println!(
                "{} No output requested, only the summary will be shown\n",
                "ℹ".blue()
            );
        }
    }

    let spinner = ProgressBar::new_spinner();
    if quiet {
        spinner.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));

    let progress_bar = spinner.clone();
    let progress_callback: ProgressCallback = Arc::new(move |depth: usize, url: String| {
        progress_bar.set_message(format!("[depth {}] {}", depth, extract_url_path(&url)));
    });

    let result = execute_crawl(&settings, Some(progress_callback)).await;
    spinner.finish_and_clear();

    match result {
        Ok(summary) => {
            if !quiet {
                println!("{} Crawl complete!\n", "✓".green().bold());
                print!("{}", generate_crawl_report(&summary));
            }
        }
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}
