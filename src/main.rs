use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use tracing::info;

use blogpulse::clusters::{cluster_blogs, find_similar, similarity_matrix, BlogVectors};
use blogpulse::config::Config;
use blogpulse::db::{self, queries, schema};
use blogpulse::network::{compute_centrality, record_citations, CitationGraph};
use blogpulse::output::terminal;
use blogpulse::pipeline::{import, report, ReportOptions, Snapshot};
use blogpulse::topics::emerging::detect_emerging_topics;
use blogpulse::topics::leaders::find_leading_blogs;
use blogpulse::topics::trends::{compute_trends, Period};

/// BlogPulse: what a blog corpus is writing about, who sounds alike, and
/// who cites whom.
///
/// Analyzes an already-collected corpus of blog posts: keyword trends over
/// time, emerging topics, blog similarity and clusters, and the citation
/// network between blogs.
#[derive(Parser)]
#[command(name = "blogpulse", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Import blogs and posts from a JSON seed file
    Import {
        /// Path to the seed file ({"blogs": [...], "posts": [...]})
        file: PathBuf,
    },

    /// Show the top keywords of each period
    Trends {
        /// Bucket by month or ISO week
        #[arg(long, default_value = "month")]
        period: Period,

        /// Keywords shown per period (default: 10)
        #[arg(long, default_value = "10")]
        top: usize,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Find keywords accelerating against their recent baseline
    Emerging {
        #[arg(long, default_value = "month")]
        period: Period,

        /// Baseline periods (defaults to BLOGPULSE_EMERGING_WINDOW)
        #[arg(long)]
        window: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Which blogs wrote about a keyword first
    Leaders {
        keyword: String,

        #[arg(long)]
        json: bool,
    },

    /// Blogs most similar to the given one
    Similar {
        /// Exact blog name
        blog: String,

        /// Number of neighbours (default: 5)
        #[arg(long, default_value = "5")]
        top: usize,

        #[arg(long)]
        json: bool,
    },

    /// Group blogs into clusters by vocabulary
    Clusters {
        /// Cluster count (defaults to BLOGPULSE_CLUSTERS)
        #[arg(long)]
        k: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Re-extract the citation log from post links
    Citations,

    /// Show citation network centrality
    Network {
        /// Blogs shown (default: 20)
        #[arg(long, default_value = "20")]
        top: usize,

        #[arg(long)]
        json: bool,
    },

    /// Write every analysis as one JSON report
    Report {
        #[arg(long, default_value = "month")]
        period: Period,

        /// Output file (prints to stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("blogpulse=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Init => {
            info!("Initializing BlogPulse database...");
            let conn = db::initialize(&config.db_path)?;
            let table_count = schema::table_count(&conn)?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("\nNext step: blogpulse import <seed.json>");
        }

        Commands::Import { file } => {
            let conn = db::initialize(&config.db_path)?;
            let seed = import::read_seed_file(&file)?;
            let summary = import::import_seed(&conn, &seed)?;
            terminal::display_import_summary(&summary);
        }

        Commands::Trends { period, top, json } => {
            let snapshot = load_snapshot(&config)?;
            let trends = compute_trends(&snapshot.posts, period, config.max_features);
            if json {
                print_json(&trends)?;
            } else {
                terminal::display_trends(&trends, top);
            }
        }

        Commands::Emerging {
            period,
            window,
            json,
        } => {
            let snapshot = load_snapshot(&config)?;
            let window = window.unwrap_or(config.emerging_window);
            let trends = compute_trends(&snapshot.posts, period, config.max_features);
            let emerging = detect_emerging_topics(&trends, window);
            if json {
                print_json(&emerging)?;
            } else {
                terminal::display_emerging(&emerging, window);
            }
        }

        Commands::Leaders { keyword, json } => {
            let snapshot = load_snapshot(&config)?;
            let leaders = find_leading_blogs(&snapshot.posts, &keyword);
            if json {
                print_json(&leaders)?;
            } else {
                terminal::display_leaders(&keyword, &leaders);
            }
        }

        Commands::Similar { blog, top, json } => {
            let snapshot = load_snapshot(&config)?;
            let similar = BlogVectors::build(&snapshot.posts, config.max_features)
                .map(|vectors| find_similar(&similarity_matrix(&vectors), &blog, top))
                .unwrap_or_default();
            if json {
                print_json(&similar)?;
            } else {
                terminal::display_similar(&blog, &similar);
            }
        }

        Commands::Clusters { k, json } => {
            let snapshot = load_snapshot(&config)?;
            let k = k.unwrap_or(config.clusters);
            let clusters = BlogVectors::build(&snapshot.posts, config.max_features)
                .map(|vectors| cluster_blogs(&vectors, k, config.seed))
                .unwrap_or_default();
            if json {
                print_json(&clusters)?;
            } else {
                terminal::display_clusters(&clusters);
            }
        }

        Commands::Citations => {
            let conn = db::open(&config.db_path)?;
            let snapshot = Snapshot::load(&conn)?;
            let removed = queries::clear_citations(&conn)?;
            let inserted = record_citations(&conn, &snapshot.posts, &snapshot.blogs)?;
            println!(
                "Citation log rebuilt: {} citations found ({} old rows replaced).",
                inserted.to_string().bold(),
                removed
            );
            println!("{}", "Run `blogpulse network` to see who matters.".dimmed());
        }

        Commands::Network { top, json } => {
            let conn = db::open(&config.db_path)?;
            let graph = CitationGraph::load(&conn)?;
            let centrality = compute_centrality(&graph);
            if json {
                print_json(&centrality)?;
            } else {
                terminal::display_centrality(&centrality, top);
            }
        }

        Commands::Report { period, out } => {
            let conn = db::open(&config.db_path)?;
            let analysis = report::run(&conn, &ReportOptions::from_config(&config, period))?;
            let body = serde_json::to_string_pretty(&analysis)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, body)
                        .with_context(|| format!("Failed to write report to {}", path.display()))?;
                    println!("Report written to {}", path.display());
                }
                None => println!("{body}"),
            }
        }
    }

    Ok(())
}

fn load_snapshot(config: &Config) -> Result<Snapshot> {
    let conn = db::open(&config.db_path)?;
    let snapshot = Snapshot::load(&conn)?;
    if snapshot.is_empty() {
        eprintln!(
            "{}",
            "No posts in the database yet. Run `blogpulse import <seed.json>` first.".yellow()
        );
    }
    Ok(snapshot)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
