mod cache;
mod config;
mod error;
mod logging;
mod pagination;
mod server;
mod tools;
mod transit;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use serde::Serialize;

use cache::{Backend, CacheLayer};
use server::{PoaBusServer, Tools};
use transit::{TransitClient, TransitService};

#[derive(Parser, Debug)]
#[command(name = "poa-bus")]
#[command(about = "MCP server for Porto Alegre bus stops, routes and route details")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./poa-bus.yaml or $XDG_CONFIG_HOME/poa-bus/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Run the MCP server on stdin/stdout (default)
  Serve,
  /// Print one page of bus stops
  Stops {
    #[arg(long)]
    cursor: Option<String>,
  },
  /// Print one page of bus routes
  Routes {
    #[arg(long)]
    cursor: Option<String>,
  },
  /// Print the details of a single route
  Route {
    /// Route id as listed by `routes`
    id: String,
  },
  /// Manage the response cache
  Cache {
    #[command(subcommand)]
    action: CacheAction,
  },
}

#[derive(Subcommand, Debug)]
enum CacheAction {
  /// Remove every cached entry
  Flush,
  /// Remove a single key, e.g. poa:route:5566
  Evict { key: String },
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;
  let _log_guard = logging::init(&config.log)?;

  // Cache is best-effort: a failed connect leaves it degraded, not fatal
  let cache = CacheLayer::new(Backend::from_config(&config.cache))
    .with_timeout(config.cache.operation_timeout());
  cache.connect().await;

  let client = TransitClient::new(&config.upstream)?;
  let base_url = client.base_url().clone();
  let service = TransitService::new(client, base_url, cache.clone(), config.cache.clone());
  let tools: Tools = Tools::new(service, config.pagination.page_size);

  let result = run(args.command.unwrap_or(Command::Serve), tools, &cache).await;

  cache.disconnect().await;
  result
}

async fn run(command: Command, tools: Tools, cache: &CacheLayer<Backend>) -> Result<()> {
  match command {
    Command::Serve => server::serve_stdio(PoaBusServer::new(Arc::new(tools))).await,
    Command::Stops { cursor } => print_json(&tools.stops(cursor.as_deref()).await?),
    Command::Routes { cursor } => print_json(&tools.routes(cursor.as_deref()).await?),
    Command::Route { id } => print_json(&tools.route_details(&id).await?),
    Command::Cache { action } => {
      match action {
        CacheAction::Flush => cache.flush().await,
        CacheAction::Evict { key } => cache.delete(&key).await,
      }
      Ok(())
    }
  }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_command_is_serve() {
    let args = Args::try_parse_from(["poa-bus"]).unwrap();
    assert!(args.command.is_none());
  }

  #[test]
  fn test_parse_subcommands() {
    let args = Args::try_parse_from(["poa-bus", "stops", "--cursor", "eyJvZmZzZXQiOjJ9"]).unwrap();
    assert!(matches!(
      args.command,
      Some(Command::Stops { cursor: Some(ref c) }) if c == "eyJvZmZzZXQiOjJ9"
    ));

    let args = Args::try_parse_from(["poa-bus", "-c", "x.yaml", "route", "5566"]).unwrap();
    assert_eq!(args.config, Some(PathBuf::from("x.yaml")));
    assert!(matches!(args.command, Some(Command::Route { ref id }) if id == "5566"));

    let args = Args::try_parse_from(["poa-bus", "cache", "evict", "poa:stops"]).unwrap();
    assert!(matches!(
      args.command,
      Some(Command::Cache { action: CacheAction::Evict { ref key } }) if key == "poa:stops"
    ));
  }
}
