//! Tunescout CLI - drives the session orchestrator end to end.
//!
//! Each subcommand exercises one surface of the library: upload and
//! classification, interactive catalog search, the backend similarity
//! feed, and coordinated preview playback.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::io::AsyncBufReadExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tunescout::catalog::{CatalogClient, CredentialCache};
use tunescout::classifier::ClassifierClient;
use tunescout::config::{self, Config, LogFormat};
use tunescout::discovery::DiscoveryFeed;
use tunescout::error::AppResult;
use tunescout::models::{SelectedFile, TrackSummary};
use tunescout::playback::{PlaybackCoordinator, RodioOutput, ToggleOutcome};
use tunescout::recommendations::RecommendationFetcher;
use tunescout::search::DebouncedSearch;
use tunescout::session::UploadSession;

/// Initialize the tracing/logging subsystem.
fn init_tracing(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.log_format {
        LogFormat::Json => {
            subscriber
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        LogFormat::Pretty => {
            subscriber
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}

#[derive(Parser)]
#[command(name = "tunescout", version, about = "Audio genre classification and track discovery")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify an audio file and fetch matching catalog tracks.
    Classify {
        /// Path to a WAV file.
        file: PathBuf,
    },
    /// Search the catalog for tracks (interactive when no query is given).
    Search {
        /// Query text; omit for an interactive prompt.
        query: Option<String>,
    },
    /// Fetch the backend's pre-ranked similarity feed.
    Discover,
    /// Search and play the first available track preview.
    Preview {
        /// Query text used to find a previewable track.
        query: String,
    },
}

/// Media types a browser would declare for common audio extensions.
const MEDIA_TYPES: &[(&str, &str)] = &[
    ("wav", "audio/wav"),
    ("mp3", "audio/mpeg"),
    ("ogg", "audio/ogg"),
    ("flac", "audio/flac"),
    ("m4a", "audio/mp4"),
    ("aac", "audio/aac"),
];

fn media_type_for(path: &Path) -> &'static str {
    path.extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| extension.to_lowercase())
        .and_then(|extension| {
            MEDIA_TYPES
                .iter()
                .find(|(known, _)| *known == extension)
                .map(|(_, media_type)| *media_type)
        })
        .unwrap_or("application/octet-stream")
}

fn print_tracks(tracks: &[TrackSummary]) {
    if tracks.is_empty() {
        println!("No results.");
        return;
    }
    for (index, track) in tracks.iter().enumerate() {
        let preview = if track.preview_url.is_some() {
            "preview"
        } else {
            "no preview"
        };
        println!(
            "{:3}. {} - {} [{}] ({}) {}",
            index + 1,
            track.artist_line(),
            track.title,
            track.album,
            preview,
            track.link
        );
    }
}

async fn classify(
    path: &Path,
    config: &Config,
    credentials: Arc<CredentialCache>,
) -> AppResult<()> {
    let payload = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string());

    let fetcher = Arc::new(RecommendationFetcher::new(
        CatalogClient::new(config)?,
        credentials,
        config,
    ));
    let session = UploadSession::new(
        ClassifierClient::new(config)?,
        Arc::clone(&fetcher),
        config,
    );

    let file = SelectedFile::new(name, media_type_for(path), payload);
    println!("Selected {} ({:.2} MB)", file.name, file.size_megabytes());

    if let Err(error) = session.select_file(file) {
        println!("{error}");
        return Ok(());
    }

    let submit = session.submit();
    tokio::pin!(submit);
    let mut ticker = tokio::time::interval(Duration::from_millis(100));
    let outcome = loop {
        tokio::select! {
            outcome = &mut submit => break outcome,
            _ = ticker.tick() => {
                print!("\rUploading... {:3}%", session.progress());
                let _ = std::io::stdout().flush();
            }
        }
    };
    println!();

    if let Err(error) = outcome {
        println!("{error}");
        return Ok(());
    }

    if let Some(result) = session.snapshot().result {
        println!("{}", result.message);
        println!("File:     {}", result.filename);
        match result.duration {
            Some(duration) => println!("Duration: {duration:.2}s"),
            None => println!("Duration: unknown"),
        }
        println!("Genre:    {}", result.predicted_genre);
    }

    let tracks = fetcher.results();
    if tracks.is_empty() {
        println!("\nNo catalog recommendations available.");
    } else {
        println!("\nRecommended tracks:");
        print_tracks(&tracks);
    }

    Ok(())
}

async fn search(
    query: Option<String>,
    config: &Config,
    credentials: Arc<CredentialCache>,
) -> AppResult<()> {
    let searcher = DebouncedSearch::new(CatalogClient::new(config)?, credentials, config);
    let mut versions = searcher.subscribe();

    match query {
        Some(query) => {
            searcher.input(&query);
            let wait = config.debounce() + config.http_timeout();
            if tokio::time::timeout(wait, versions.changed()).await.is_err() {
                println!("No results were returned in time.");
                return Ok(());
            }
            print_tracks(&searcher.results());
        }
        None => {
            println!("Type to search; an empty line clears, Ctrl-D exits.");
            let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
            loop {
                tokio::select! {
                    line = lines.next_line() => match line? {
                        Some(line) => searcher.input(&line),
                        None => break,
                    },
                    changed = versions.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        print_tracks(&searcher.results());
                    }
                }
            }
        }
    }

    Ok(())
}

async fn discover(config: &Config) -> AppResult<()> {
    let feed = DiscoveryFeed::new(ClassifierClient::new(config)?);
    feed.refresh().await;

    let state = feed.state();
    if let Some(error) = state.error {
        println!("{error}");
        return Ok(());
    }
    if let Some(feed) = state.feed {
        println!("Predicted genre: {}", feed.predicted_genre);
        for (index, entry) in feed.recommendations.iter().enumerate() {
            println!(
                "{:3}. {} - {} ({:.1}% match)",
                index + 1,
                entry.artist,
                entry.name,
                entry.similarity
            );
        }
    }

    Ok(())
}

async fn preview(
    query: &str,
    config: &Config,
    credentials: Arc<CredentialCache>,
) -> AppResult<()> {
    let catalog = CatalogClient::new(config)?;
    let Some(token) = credentials.token().await else {
        println!("Catalog unavailable: no token.");
        return Ok(());
    };

    let tracks = catalog
        .search_tracks(&token, query, config.search_limit)
        .await?;
    let Some(track) = tracks.iter().find(|track| track.preview_url.is_some()) else {
        println!("No previewable track found for \"{query}\".");
        return Ok(());
    };

    let output = Arc::new(RodioOutput::new()?);
    let coordinator = PlaybackCoordinator::new(output, config)?;

    match coordinator.toggle_play(track).await {
        ToggleOutcome::Playing => {
            println!(
                "Playing preview: {} - {} (Enter stops)",
                track.artist_line(),
                track.title
            );
            tokio::select! {
                _ = wait_for_idle(&coordinator) => println!("Preview finished."),
                _ = read_line() => {
                    coordinator.toggle_play(track).await;
                    println!("Stopped.");
                }
            }
        }
        _ => println!("Preview could not be played."),
    }

    Ok(())
}

async fn wait_for_idle(coordinator: &PlaybackCoordinator) {
    loop {
        tokio::time::sleep(Duration::from_millis(250)).await;
        if coordinator.currently_playing().is_none() {
            return;
        }
    }
}

async fn read_line() {
    let mut line = String::new();
    let mut reader = tokio::io::BufReader::new(tokio::io::stdin());
    let _ = reader.read_line(&mut line).await;
}

async fn run(command: Command, config: &'static Config) -> AppResult<()> {
    match command {
        Command::Discover => discover(config).await,
        command => {
            let credentials = CredentialCache::connect(config).await?;
            match command {
                Command::Classify { file } => classify(&file, config, credentials).await,
                Command::Search { query } => search(query, config, credentials).await,
                Command::Preview { query } => preview(&query, config, credentials).await,
                Command::Discover => unreachable!(),
            }
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize configuration
    let config = config::init();

    // Initialize logging
    init_tracing(config);

    // Validate configuration
    if let Err(error) = config.validate() {
        tracing::error!(error = %error, "Configuration validation failed");
        std::process::exit(1);
    }

    if let Err(error) = run(cli.command, config).await {
        tracing::error!(error = %error, "Command failed");
        std::process::exit(1);
    }
}
