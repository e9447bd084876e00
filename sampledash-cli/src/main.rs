// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

mod config;
mod dashboard;
mod progress;
mod render;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use config::{resolve_token, DashboardConfig};
use dialoguer::{theme::ColorfulTheme, Password};
use progress::BarProgress;
use dashboard::{load_samples, select_detail, DetailMiss};
use sampledash_client::{EnrichedSet, FetchCache, HttpSampleApi, SampleClient, StatsClient};
use sampledash_core::{
    files_table, top_tags, unique_tags, Dimension, RecordFilter, RelationshipGraph, Summary,
    TOP_TAG_LIMIT,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sampledash")]
#[command(about = "Terminal dashboard for a malware sample database", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file (TOML)
    #[arg(short, long, global = true, env = "SAMPLEDASH_CONFIG")]
    config: Option<PathBuf>,

    /// Sample API base URL (overrides config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// API token (falls back to SAMPLEDASH_API_TOKEN, the config file, then a prompt)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Keep samples carrying any of these tags (repeatable)
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Substring of the SHA256 or file name
    #[arg(short, long)]
    search: Option<String>,
}

impl FilterArgs {
    fn to_filter(&self) -> RecordFilter {
        let filter = RecordFilter::new().with_tags(self.tags.iter().cloned());
        match &self.search {
            Some(query) => filter.with_query(query.clone()),
            None => filter,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Sample, tag and user counts plus the top tags
    Overview,

    /// Distinct tags, usable with --tag
    Tags,

    /// Filtered files, newest first
    Files(FilterArgs),

    /// Raw detail and relationship graph of one sample
    Show {
        /// Sample identifier
        id: String,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Relationship graph of every sample, as Graphviz DOT
    Graph,

    /// Aggregations served by sampledash-server
    Stats {
        /// Aggregation service base URL (overrides config file)
        #[arg(long)]
        stats_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = DashboardConfig::load(cli.config.clone())
        .context("Failed to load configuration")?;
    if let Some(url) = &cli.api_url {
        config.api.url = url.clone();
    }

    if let Err(e) = execute_command(&cli, config).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "sampledash=debug,sampledash_client=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

fn prompt_token() -> Result<String> {
    let token = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Enter your sample API token")
        .allow_empty_password(true)
        .interact()?;
    Ok(token)
}

async fn execute_command(cli: &Cli, config: DashboardConfig) -> Result<()> {
    if let Commands::Stats { stats_url } = &cli.command {
        let url = stats_url.clone().unwrap_or_else(|| config.stats.url.clone());
        return execute_stats_command(&url, &config).await;
    }

    let credential = resolve_token(cli.token.clone(), &config, prompt_token)?;
    let api = HttpSampleApi::new(config.api.url.clone(), config.timeout())?;
    let client = SampleClient::new(Arc::new(api), Arc::new(FetchCache::default_cache()));

    let mut progress = BarProgress::new("Fetching samples");
    let set = match load_samples(&client, &credential, &mut progress).await {
        Ok(set) => set,
        Err(message) => {
            progress.abandon();
            println!("{}", message.yellow());
            return Ok(());
        }
    };

    match &cli.command {
        Commands::Overview => {
            let summary = Summary::of(&set.records);
            let top = top_tags(&set.all_tags, TOP_TAG_LIMIT);
            print!("{}", render::overview(&summary, &top));
        }
        Commands::Tags => {
            for tag in unique_tags(&set.all_tags) {
                println!("{}", tag);
            }
        }
        Commands::Files(filter) => {
            let selected = filter.to_filter().apply(&set.records);
            print!("{}", render::files_table(&files_table(&selected)));
        }
        Commands::Show { id, filter } => {
            execute_show_command(&client, &credential, &set, id, filter).await;
        }
        Commands::Graph => {
            print!("{}", RelationshipGraph::full(&set.records).to_dot());
        }
        Commands::Stats { .. } => {}
    }

    Ok(())
}

async fn execute_show_command(
    client: &SampleClient,
    credential: &sampledash_client::Credential,
    set: &EnrichedSet,
    id: &str,
    filter: &FilterArgs,
) {
    let selected = filter.to_filter().apply(&set.records);
    let record = match select_detail(selected, id) {
        Ok(record) => record,
        Err(DetailMiss::NoMatches) => {
            println!("No files matched your filters.");
            return;
        }
        Err(DetailMiss::NotSelected) => {
            println!("{} {}", "Not in the current selection:".yellow(), id);
            return;
        }
    };

    // Served from the fetch cache filled during enrichment.
    let raw = match client.object_detail_raw(credential, id).await {
        Ok(raw) => raw.as_ref().clone(),
        Err(e) => {
            tracing::debug!("No detail for {}: {}", id, e);
            serde_json::json!({})
        }
    };

    print!("{}", render::detail(&raw, &RelationshipGraph::around(record)));
}

async fn execute_stats_command(url: &str, config: &DashboardConfig) -> Result<()> {
    let stats = StatsClient::new(url, config.timeout())?;

    for dimension in Dimension::ALL {
        let rows = match stats.fetch(dimension).await {
            Ok(rows) => rows,
            Err(e) => {
                eprintln!("{} {}", "Warning:".yellow().bold(), e);
                Vec::new()
            }
        };
        println!("{}", render::stats_section(dimension, &rows));
    }
    Ok(())
}
