//! # EchoMood
//!
//! Builds playlists out of a listener's own library: tracks are scored for
//! familiarity, narrowed by genre and mood, and published as a new playlist.
//!
//! ## Usage
//!
//! ```bash
//! export ECHOMOOD_ACCESS_TOKEN=...
//!
//! # How many usable tracks are in the library?
//! echomood fetch
//!
//! # Which genres can I pick from?
//! echomood genres
//!
//! # Build a playlist
//! echomood create --genre "indie pop" --energy 0.8 --valence 0.7 --familiarity 30
//! ```

use anyhow::{Context, Result};
use chrono::Local;
use clap::{CommandFactory, Parser};
use echomood::cli::{self, ConfigAction, CreateArgs};
use echomood::completion;
use echomood::config::{self, Settings};
use echomood::familiarity::FamiliarityScorer;
use echomood::fetch::TrackSource;
use echomood::pipeline::{SelectionCriteria, SelectionReport};
use echomood::publisher::{default_playlist_name, PlaylistSpec};
use echomood::session::Session;
use echomood::spotify::SpotifyClient;
use log::{info, warn};
use std::io::Write;

/// Tracks shown by `fetch` and `create --dry-run`.
const PREVIEW_LIMIT: usize = 10;

/// Connection overrides taken from the command line or the environment.
struct Overrides {
    token: Option<String>,
    api_base: Option<String>,
}

/// Main entry point for the EchoMood application.
///
/// Initializes logging, parses command-line arguments, and routes commands.
/// Logging is controlled via `RUST_LOG`, e.g. `RUST_LOG=echomood=debug`.
fn main() -> Result<()> {
    env_logger::init();

    let cli::Args { token, api_base, command } = cli::Args::parse();
    let overrides = Overrides { token, api_base };

    match command {
        cli::Command::Fetch { playlist } => {
            let mut session = open_session(&load_settings()?, &overrides)?;
            let count = load_tracks(&mut session, playlist.as_deref())?;
            println!("Loaded {count} tracks");
            for track in session.tracks().iter().take(PREVIEW_LIMIT) {
                println!("  {} - {}", track.name, track.artist_names());
            }
            if count > PREVIEW_LIMIT {
                println!("  ... and {} more", count - PREVIEW_LIMIT);
            }
        }
        cli::Command::Genres { playlist } => {
            let mut session = open_session(&load_settings()?, &overrides)?;
            if load_tracks(&mut session, playlist.as_deref())? == 0 {
                println!("No tracks found");
                return Ok(());
            }
            let choices = session.genre_choices();
            if choices.is_empty() {
                println!("No genre information available for these tracks");
            }
            for (rank, genre) in choices.iter().enumerate() {
                println!("{:>3}. {genre}", rank + 1);
            }
        }
        cli::Command::Create(args) => {
            create_playlist(&overrides, &args)?;
        }
        cli::Command::Config { action } => match action {
            ConfigAction::Show => {
                let path = config::get_settings_path()?;
                let mut settings = Settings::load_from(&path)?;
                if settings.access_token.is_some() {
                    settings.access_token = Some("<redacted>".to_string());
                }
                println!("# {}", path.display());
                println!("{}", serde_json::to_string_pretty(&settings)?);
            }
            ConfigAction::Init { force } => {
                let path = config::get_settings_path()?;
                if path.exists() && !force {
                    anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
                }
                Settings::default().save_to(&path)?;
                println!("Wrote default settings to {}", path.display());
            }
        },
        cli::Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            completion::generate_completions(completion::shell_to_completion_shell(&shell), &mut cmd);
        }
    }

    Ok(())
}

fn load_settings() -> Result<Settings> {
    Settings::load().context("Failed to load settings")
}

/// Builds a session against the Web API from settings plus overrides.
fn open_session(settings: &Settings, overrides: &Overrides) -> Result<Session<SpotifyClient>> {
    let token = overrides
        .token
        .clone()
        .or_else(|| settings.access_token.clone())
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| {
            anyhow::anyhow!("No access token. Set ECHOMOOD_ACCESS_TOKEN, pass --token, or add access_token to the settings file")
        })?;
    let api_base = overrides.api_base.as_deref().unwrap_or(&settings.api_base);

    let client = SpotifyClient::with_base(&token, api_base, settings.request_timeout())
        .context("Failed to set up the HTTP client")?;
    info!("Using catalog at {api_base}");

    let scorer = FamiliarityScorer::with_fallback(settings.familiarity_fallback);
    Ok(Session::new(client, scorer)
        .with_max_playlist_size(settings.max_playlist_size)
        .with_description(settings.playlist_description.clone()))
}

fn load_tracks(session: &mut Session<SpotifyClient>, playlist: Option<&str>) -> Result<usize> {
    let source = TrackSource::from_reference(playlist)?;
    let count = session
        .fetch(&source, |loaded, total| {
            eprint!("\rLoading tracks... {loaded}/{total}");
            let _ = std::io::stderr().flush();
        })
        .context("Failed to load tracks")?;
    eprintln!();
    Ok(count)
}

fn create_playlist(overrides: &Overrides, args: &CreateArgs) -> Result<()> {
    let settings = load_settings()?;
    let mut session = open_session(&settings, overrides)?;

    if load_tracks(&mut session, args.playlist.as_deref())? == 0 {
        println!("No tracks found. Save some music or try a different playlist.");
        return Ok(());
    }

    if !args.genres.is_empty() {
        let choices = session.genre_choices();
        for genre in &args.genres {
            if !choices.iter().any(|choice| choice.eq_ignore_ascii_case(genre.trim())) {
                warn!("Genre '{genre}' is not among the top genres of these tracks");
            }
        }
    }

    let criteria = SelectionCriteria {
        mood: args.mood_target(),
        tolerance: args.tolerance.unwrap_or(settings.default_tolerance),
        familiarity_threshold: args.familiarity,
        genres: args.genres.clone(),
    };

    let selection = session.apply(criteria).context("Invalid selection")?;
    print_report(&selection.report);
    if selection.is_empty() {
        println!("No tracks match these filters. Try a lower familiarity or a wider tolerance.");
        return Ok(());
    }

    if args.dry_run {
        for track in selection.tracks.iter().take(PREVIEW_LIMIT) {
            println!("  [{:>3}] {} - {}", track.familiarity, track.name, track.artist_names());
        }
        if selection.tracks.len() > PREVIEW_LIMIT {
            println!("  ... and {} more", selection.tracks.len() - PREVIEW_LIMIT);
        }
        return Ok(());
    }

    let spec = PlaylistSpec {
        name: args
            .name
            .clone()
            .unwrap_or_else(|| default_playlist_name(Local::now().date_naive())),
        size: args.size,
        public: args.public,
        shuffle: !args.no_shuffle,
    };

    let published = session.publish(&spec).context("Failed to publish playlist")?;
    println!(
        "Created '{}' with {} tracks: {}",
        published.name,
        published.track_ids.len(),
        published.playlist.url
    );
    Ok(())
}

fn print_report(report: &SelectionReport) {
    println!("{} tracks loaded", report.valid);
    println!("{} familiar enough", report.after_familiarity);
    if let Some(after_genre) = report.after_genre {
        if report.genre_filter_relaxed {
            println!("No track matched the chosen genres; genre filter skipped");
        } else {
            println!("{after_genre} in the chosen genres");
        }
    }
    println!("{} match the mood", report.after_mood);
    if report.degraded() {
        warn!("Some lookups failed; results may be less precise than usual");
    }
}
