use clap::{arg, command};
use mdcrawl_web::transport::DEFAULT_USER_AGENT;
use url::Url;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub const DEFAULT_DEPTH: &str = "2";
pub const DEFAULT_TIMEOUT: &str = "10";

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("mdcrawl")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("mdcrawl")
        .about("Crawl linked web pages breadth-first and export them as Markdown")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress progress and summary output").required(false))
        .arg(arg!(-v --"verbose" "Enable debug logging").required(false))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            command!("crawl")
                .about(
                    "Crawl from one or more seed URLs and write the discovered pages as \
                Markdown, JSON or DOT.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("Seed URL to crawl (repeatable)")
                        .value_parser(clap::value_parser!(Url))
                        .action(clap::ArgAction::Append)
                        .conflicts_with("hosts-file"),
                )
                .arg(
                    arg!(-H --"hosts-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of seed URLs")
                        .value_parser(clap::value_parser!(std::path::PathBuf))
                        .conflicts_with("url"),
                )
                .arg(
                    arg!(-d --"depth" <DEPTH>)
                        .required(false)
                        .help("Maximum number of link hops from each seed")
                        .value_parser(clap::value_parser!(usize))
                        .default_value(DEFAULT_DEPTH),
                )
                .arg(
                    arg!(-m --"max-results" <NUM>)
                        .required(false)
                        .help("Stop after this many pages have been discovered")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(-a --"allow-domain" <DOMAIN>)
                        .required(false)
                        .help("Additional domain the crawl may enter (repeatable)")
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(--"include-subdomains")
                        .required(false)
                        .help("Also allow subdomains of every allowed domain")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"no-restrict")
                        .required(false)
                        .help("Do not restrict each crawl to its seed's host")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value(DEFAULT_TIMEOUT),
                )
                .arg(
                    arg!(--"user-agent" <AGENT>)
                        .required(false)
                        .help("User-Agent header sent with every request")
                        .default_value(DEFAULT_USER_AGENT),
                )
                .arg(
                    arg!(-o --"output-dir" <DIR>)
                        .required(false)
                        .help("Write one Markdown file per page into this directory"),
                )
                .arg(
                    arg!(-c --"combined" <FILE>)
                        .required(false)
                        .help("Write all pages into a single Markdown document"),
                )
                .arg(
                    arg!(--"json" <FILE>)
                        .required(false)
                        .help("Write a JSON snapshot of the page graph"),
                )
                .arg(
                    arg!(--"dot" <FILE>)
                        .required(false)
                        .help("Write the page graph in Graphviz DOT format"),
                ),
        )
}
