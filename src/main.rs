use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use sieve::classify::pipeline::SpamPipeline;
use sieve::config::Config;
use sieve::output::terminal;
use sieve::posters::traits::{NoPosterLookup, PosterLookup};
use sieve::recommend::Recommender;
use sieve::text::normalize::Normalizer;
use sieve::text::stopwords::StopwordSet;

/// Sieve: spam detection and title recommendations from prebuilt models.
///
/// Both demos run entirely on local artifacts; fetch them once with
/// `sieve download`.
#[derive(Parser)]
#[command(name = "sieve", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify SMS / email text as spam or not spam
    Predict {
        /// Text to classify (reads one message per line from stdin if omitted)
        text: Option<String>,

        /// Also show the normalized text and model class
        #[arg(long)]
        explain: bool,
    },

    /// Show the normalized token stream the spam model sees
    Normalize {
        /// Text to normalize (reads lines from stdin if omitted)
        text: Option<String>,
    },

    /// Recommend titles similar to the given one
    Recommend {
        /// Title to search for; typos are fine (reads lines from stdin if omitted)
        title: Option<String>,

        /// Number of recommendations (default: 5)
        #[arg(short = 'n', long, default_value = "5")]
        count: usize,

        /// Look up poster URLs via OMDb (requires OMDB_API_KEY)
        #[arg(long)]
        posters: bool,
    },

    /// List catalog titles
    Titles {
        /// Only titles containing this text (case-insensitive)
        #[arg(long)]
        search: Option<String>,

        /// Max titles to list (default: 50)
        #[arg(long, default_value = "50")]
        limit: usize,
    },

    /// Download model artifacts listed in the artifact manifest
    Download {
        /// Manifest of {"file name": "google drive id"} (default: <artifact dir>/manifest.json)
        #[arg(long)]
        manifest: Option<PathBuf>,
    },

    /// Show which artifacts are present and whether they load
    Status,

    /// Serve the JSON API
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on (default: 8080)
        #[arg(long, default_value = "8080")]
        port: u16,

        /// Address to bind (default: 127.0.0.1)
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sieve=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Predict { text, explain } => {
            let pipeline = load_spam(&config)?;
            for line in inputs(text, "message> ") {
                let line = line?;
                let prediction = pipeline.classify_detailed(&line)?;
                terminal::display_prediction(&line, &prediction, explain);
            }
        }

        Commands::Normalize { text } => {
            let normalizer = build_normalizer(&config);
            for line in inputs(text, "text> ") {
                println!("{}", normalizer.normalize(&line?));
            }
        }

        Commands::Recommend {
            title,
            count,
            posters,
        } => {
            let recommender = load_recommender(&config)?;
            let lookup = create_poster_lookup(&config, posters)?;

            for query in inputs(title, "title> ") {
                let query = query?;
                let Some(set) = recommender.recommend(&query, count) else {
                    terminal::display_no_match(&query);
                    continue;
                };

                if posters {
                    let cards = sieve::posters::attach_posters(
                        lookup.as_ref(),
                        set.recommendations.clone(),
                    )
                    .await;
                    terminal::display_recommendations(&set, Some(&cards));
                } else {
                    terminal::display_recommendations(&set, None);
                }
            }
        }

        Commands::Titles { search, limit } => {
            let recommender = load_recommender(&config)?;
            let catalog = recommender.catalog();
            let entries = catalog.search(search.as_deref().unwrap_or(""), limit);
            terminal::display_titles(&entries, catalog.len());
        }

        Commands::Download { manifest } => {
            let manifest_path = manifest.unwrap_or_else(|| config.manifest_path.clone());
            let entries = sieve::artifacts::download::load_manifest(&manifest_path)?;

            println!("Downloading {} artifacts...", entries.len());
            println!("  Destination: {}", config.artifact_dir.display());

            let downloader = sieve::artifacts::download::DriveDownloader::new(
                sieve::artifacts::download::RetryPolicy::default(),
            )?;
            let summary = downloader
                .download_all(&config.artifact_dir, &entries)
                .await?;

            println!(
                "\nDownloaded: {}  Skipped: {}  Failed: {}",
                summary.downloaded.len(),
                summary.skipped.len(),
                summary.failed.len()
            );
            if summary.all_ok() {
                println!("{}", "All artifacts in place.".bold());
            } else {
                println!(
                    "{} {}",
                    "Failed:".red().bold(),
                    summary.failed.join(", ")
                );
            }
        }

        Commands::Status => {
            let inventory = sieve::artifacts::inventory(&config.artifact_dir);
            terminal::display_inventory(&config.artifact_dir, &inventory);

            println!();
            if sieve::artifacts::spam_files_present(&config.artifact_dir) {
                match load_spam(&config) {
                    Ok(_) => println!("  Spam detector: {}", "ready".green()),
                    Err(e) => println!("  Spam detector: {} ({e:#})", "broken".red()),
                }
            }
            if sieve::artifacts::recommender_files_present(&config.artifact_dir) {
                match load_recommender(&config) {
                    Ok(r) => println!(
                        "  Recommender: {} ({} titles)",
                        "ready".green(),
                        r.catalog().len()
                    ),
                    Err(e) => println!("  Recommender: {} ({e:#})", "broken".red()),
                }
            }
            println!(
                "  Posters: {}",
                if config.posters_enabled() {
                    "OMDb connected".green()
                } else {
                    "OMDB_API_KEY not set".dimmed()
                }
            );
        }

        #[cfg(feature = "web")]
        Commands::Serve { port, bind } => {
            // Missing artifacts disable a demo; broken ones stop startup
            let spam = if sieve::artifacts::spam_files_present(&config.artifact_dir) {
                Some(Arc::new(load_spam(&config)?))
            } else {
                tracing::warn!("Spam artifacts missing; /api/predict will return 503");
                None
            };
            let recommender = if sieve::artifacts::recommender_files_present(&config.artifact_dir)
            {
                Some(Arc::new(load_recommender(&config)?))
            } else {
                tracing::warn!("Recommender artifacts missing; /api/recommend will return 503");
                None
            };

            let state = sieve::web::AppState {
                spam,
                recommender,
                posters: create_poster_lookup(&config, true)?,
            };
            sieve::web::run_server(state, port, &bind).await?;
        }
    }

    Ok(())
}

fn build_normalizer(config: &Config) -> Normalizer {
    Normalizer::new(StopwordSet::from_source(config.stopwords))
}

/// Load the spam pipeline, refusing to run on mismatched artifacts.
fn load_spam(config: &Config) -> Result<SpamPipeline> {
    config.require_spam_artifacts()?;
    SpamPipeline::load(&config.artifact_dir, build_normalizer(config), config.labels)
}

fn load_recommender(config: &Config) -> Result<Recommender> {
    config.require_recommender_artifacts()?;
    Recommender::load(&config.artifact_dir, config.resolver)
}

/// Poster lookups need an API key; without one every title gets no poster.
fn create_poster_lookup(config: &Config, wanted: bool) -> Result<Arc<dyn PosterLookup>> {
    if wanted && config.posters_enabled() {
        info!("Poster lookups enabled (OMDb)");
        let lookup = sieve::posters::omdb::OmdbPosterLookup::new(
            &config.omdb_api_url,
            config.omdb_api_key.clone(),
        )?;
        return Ok(Arc::new(lookup));
    }
    if wanted {
        println!(
            "{}",
            "OMDB_API_KEY not set; posters will be omitted.".dimmed()
        );
    }
    Ok(Arc::new(NoPosterLookup))
}

/// The argument if given, otherwise non-empty stdin lines, read one at a time.
fn inputs(arg: Option<String>, prompt: &'static str) -> Box<dyn Iterator<Item = io::Result<String>>> {
    match arg {
        Some(text) => Box::new(std::iter::once(Ok(text))),
        None => Box::new(StdinLines {
            prompt,
            interactive: io::stdin().is_terminal(),
        }),
    }
}

/// Stdin lines, prompting when attached to a terminal. Invalid UTF-8 is
/// replaced rather than ending the batch.
struct StdinLines {
    prompt: &'static str,
    interactive: bool,
}

impl Iterator for StdinLines {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.interactive {
                print!("{}", self.prompt);
                if let Err(e) = io::stdout().flush() {
                    return Some(Err(e));
                }
            }
            match sieve::text::read_line_lossy(&mut io::stdin().lock()) {
                Ok(None) => return None,
                Ok(Some(line)) => {
                    if !line.trim().is_empty() {
                        return Some(Ok(line));
                    }
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
