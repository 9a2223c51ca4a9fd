use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;

use event_router::config::load_config;
use event_router::observability::logging::init_logging;
use event_router::routing::{from_config, RouteOutcome};
use event_router::{HttpMethod, HttpRequest};

#[derive(Parser)]
#[command(name = "route-cli")]
#[command(about = "Inspect and exercise a configured route table", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "router.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List compiled routes in match order
    Routes,
    /// Resolve a method and path without running handlers
    Match { method: HttpMethod, path: String },
    /// Run a request through the table and print the response
    Dispatch {
        method: HttpMethod,
        path: String,
        /// Request header as `name:value`
        #[arg(long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,
        /// Query parameter as `name=value`
        #[arg(long = "query", value_parser = parse_query)]
        query: Vec<(String, String)>,
        #[arg(long)]
        body: Option<String>,
    },
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    s.split_once(':')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| format!("expected name:value, got `{}`", s))
}

fn parse_query(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected name=value, got `{}`", s))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    init_logging(&config.observability)?;
    let table = from_config(&config)?;

    match cli.command {
        Commands::Routes => {
            let routes: Vec<_> = table
                .routes()
                .map(|r| json!({ "method": r.method, "pattern": r.pattern.as_str() }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&routes)?);
        }
        Commands::Match { method, path } => {
            let outcome = match table.find(method, &path) {
                RouteOutcome::Found { route, params } => json!({
                    "outcome": "found",
                    "pattern": route.pattern.as_str(),
                    "params": params,
                }),
                RouteOutcome::MethodNotAllowed { allowed } => json!({
                    "outcome": "method_not_allowed",
                    "allowed": allowed,
                }),
                RouteOutcome::NotFound => json!({ "outcome": "not_found" }),
            };
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Dispatch {
            method,
            path,
            headers,
            query,
            body,
        } => {
            let mut request = HttpRequest::new(method, path);
            for (name, value) in headers {
                request = request.with_header(name, value);
            }
            for (name, value) in query {
                request = request.with_query(name, value);
            }
            if let Some(body) = body {
                request = request.with_body(body);
            }
            let response = table.dispatch(&request);
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
