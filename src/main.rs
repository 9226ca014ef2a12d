//! Weft command line
//!
//! Inspect a browsing graph snapshot from the terminal: search it, list
//! topic groups, rank related tabs, dump the render projection and print
//! insight reports.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use weft::api::{ApiClient, Summarizer, SyncTab};
use weft::history::SearchHistory;
use weft::insights::{self, timeline, InsightOutcome};
use weft::{GraphSnapshot, Result, Session, Settings};

#[derive(Parser)]
#[command(name = "weft")]
#[command(about = "Weft - browsing knowledge graph", long_about = None)]
struct Cli {
    /// Graph snapshot file (defaults to the platform data directory)
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// Output as JSON where supported
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tabs matching a query and record it in the search history
    Search {
        /// e.g. "@github #rust parser"
        query: String,
    },

    /// List topic groups, largest first
    Groups {
        #[arg(default_value = "")]
        query: String,
    },

    /// Show a tab with its group and related tabs
    Related {
        tab_id: String,

        /// Override the configured limit
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print the render projection as JSON
    Project {
        #[arg(default_value = "")]
        query: String,
    },

    /// Print an insight report
    Insights {
        /// Skip the remote summarizer
        #[arg(long)]
        offline: bool,

        /// Emit HTML instead of plain text
        #[arg(long)]
        html: bool,
    },

    /// Show snapshot counters and the activity strip
    Stats,

    /// Show or clear recent searches
    History {
        #[arg(long)]
        clear: bool,
    },

    /// Write the snapshot as a dated export file
    Export {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },

    /// Validate an export document and install it as the snapshot
    Import { file: PathBuf },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn default_snapshot_path() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("weft").join("graph.json"))
        .unwrap_or_else(|| PathBuf::from("weft_graph.json"))
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load();
    let history = match settings.history_path.clone().or_else(SearchHistory::default_path) {
        Some(path) => SearchHistory::load(path),
        None => SearchHistory::in_memory(),
    };

    let snapshot_path = cli.snapshot.clone().unwrap_or_else(default_snapshot_path);
    let mut session = Session::new(&settings, history);
    session.replace_snapshot(GraphSnapshot::load_file(&snapshot_path));

    match cli.command {
        Commands::Search { query } => {
            session.submit_query(&query);
            let tabs = session.visible_tabs();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&tabs)?);
            } else {
                for tab in &tabs {
                    println!("{:<12} {}  {}", tab.id, tab.display_title(), tab.url);
                }
                println!("{} tabs", tabs.len());
            }
        }

        Commands::Groups { query } => {
            session.set_query(&query);
            for view in session.visible_groups() {
                println!("{} ({} items)", view.group.label, view.group.size());
                for tab in &view.tabs {
                    println!("    {}", tab.display_title());
                }
            }
        }

        Commands::Related { tab_id, limit } => {
            if let Some(limit) = limit {
                session.set_related_limit(limit);
            }
            session.select(&tab_id)?;
            if let Some(details) = session.details() {
                println!("{}", details.tab.display_title());
                println!("  {}", details.tab.url);
                println!("  Group: {}", details.group_label);
                let policy = session.ranking_policy();
                println!(
                    "  Ranking: {}, {}",
                    policy.duplicate_edges.label(),
                    policy.self_loops.label()
                );
                for related in &details.related {
                    println!("  {:<40} {}", related.tab.display_title(), related.describe());
                }
            }
        }

        Commands::Project { query } => {
            session.set_query(&query);
            println!("{}", serde_json::to_string_pretty(&session.projection())?);
        }

        Commands::Insights { offline, html } => {
            let client = if offline {
                None
            } else {
                ApiClient::from_settings(&settings)?.if_healthy()
            };
            let open_tabs: Vec<SyncTab> = session
                .snapshot()
                .canonical_tabs()
                .map(|t| SyncTab::from_tab(t, false))
                .collect();
            let summarizer = client.as_ref().map(|c| c as &dyn Summarizer);

            match session.insights(summarizer, &open_tabs, Utc::now()) {
                InsightOutcome::Ready(insight) if html => println!("{}", insight.to_html()),
                InsightOutcome::Ready(insight) => {
                    println!("{}", insights::markdown::to_plain_text(&insight.blocks))
                }
                InsightOutcome::Empty => {
                    println!("{}", insights::EMPTY_STATE);
                    println!("{}", insights::EMPTY_STATE_HINT);
                }
            }
        }

        Commands::Stats => {
            let stats = session.stats();
            println!(
                "{} tabs, {} domains, {} groups, {} edges",
                stats.tabs, stats.domains, stats.groups, stats.edges
            );
            let buckets = timeline::activity(session.snapshot());
            if buckets.is_empty() {
                println!("No activity data yet");
            }
            let max = timeline::max_count(&buckets);
            for bucket in &buckets {
                let width = (timeline::bar_percent(bucket, max) / 5.0).round() as usize;
                println!("{:>16} {} {}", bucket.label, "#".repeat(width), bucket.count);
            }
        }

        Commands::History { clear } => {
            if clear {
                session.history_mut().clear();
            }
            for query in session.history().list() {
                println!("{}", query);
            }
        }

        Commands::Export { dir } => {
            let path = session.export_to_dir(&dir, Local::now().date_naive())?;
            println!("Exported to {}", path.display());
        }

        Commands::Import { file } => {
            let text = std::fs::read_to_string(&file)?;
            let summary = session.import_json(&text)?;
            install_snapshot(&session, &snapshot_path)?;
            println!("Imported {} tabs, {} groups", summary.tabs, summary.groups);
        }
    }
    Ok(())
}

fn install_snapshot(session: &Session, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, session.export_json()?)?;
    tracing::info!("Installed snapshot at {:?}", path);
    Ok(())
}
