//! # Command-Line Interface Module
//!
//! Clap derive definitions for the `echomood` binary.
//!
//! ## Commands
//!
//! - `fetch`: Load saved tracks (or a playlist) and summarise them
//! - `genres`: Show the genre choices for the loaded tracks
//! - `create`: Select tracks by familiarity, genre and mood, then publish a playlist
//! - `config`: Show or initialise the settings file
//! - `completion`: Generate shell completions
//!
//! ## Examples
//!
//! ```bash
//! export ECHOMOOD_ACCESS_TOKEN=...
//! echomood fetch
//! echomood create --genre "indie pop" --energy 0.8 --valence 0.7 --size 25
//! echomood create --playlist https://open.spotify.com/playlist/<id> --mood-defaults --dry-run
//! ```

use crate::catalog::Feature;
use crate::mood::MoodTarget;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
#[derive(Parser, Debug)]
#[command(name = "echomood")]
#[command(about = "EchoMood: playlists from your library that match how you feel")]
#[command(version)]
pub struct Args {
    /// Access token for the Web API (overrides the settings file)
    #[arg(long, global = true, env = "ECHOMOOD_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Web API base URL (overrides the settings file)
    #[arg(long, global = true, env = "ECHOMOOD_API_BASE")]
    pub api_base: Option<String>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load tracks and print a summary
    ///
    /// Reads every saved track, or every track of the given playlist, and
    /// reports how many usable tracks were found.
    Fetch {
        /// Playlist URL or spotify:playlist: URI instead of saved tracks
        #[arg(long)]
        playlist: Option<String>,
    },

    /// List the genre choices for the loaded tracks
    ///
    /// Genres are ranked by how many of the tracks' artists carry them.
    Genres {
        /// Playlist URL or spotify:playlist: URI instead of saved tracks
        #[arg(long)]
        playlist: Option<String>,
    },

    /// Select tracks and publish them as a new playlist
    Create(CreateArgs),

    /// Show or initialise the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    ///
    /// Usage: echomood completion bash > ~/.local/share/bash-completion/completions/echomood
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective settings and where they are stored
    Show,
    /// Write a settings file with default values
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },
}

#[derive(ClapArgs, Debug)]
pub struct CreateArgs {
    /// Playlist URL or spotify:playlist: URI instead of saved tracks
    #[arg(long)]
    pub playlist: Option<String>,

    /// Name of the new playlist [default: "EchoMood - <Month> <day>"]
    #[arg(long)]
    pub name: Option<String>,

    /// Number of tracks to add
    #[arg(long, default_value_t = crate::publisher::DEFAULT_PLAYLIST_SIZE)]
    pub size: usize,

    /// Make the playlist public
    #[arg(long)]
    pub public: bool,

    /// Keep the selection order instead of shuffling
    #[arg(long)]
    pub no_shuffle: bool,

    /// Minimum familiarity score (0 = discover new music, 100 = only favourites)
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub familiarity: u8,

    /// Allowed deviation from each mood target [default: from settings]
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Genre to include (repeatable). Tracks matching any of them are kept.
    #[arg(long = "genre", value_name = "GENRE")]
    pub genres: Vec<String>,

    #[command(flatten)]
    pub mood: MoodArgs,

    /// Start from the neutral slider positions; explicit mood flags still win
    #[arg(long)]
    pub mood_defaults: bool,

    /// Run the selection and print it without creating a playlist
    #[arg(long)]
    pub dry_run: bool,
}

/// One optional flag per audio feature, each in `[0, 1]`.
#[derive(ClapArgs, Debug, Default, Clone)]
pub struct MoodArgs {
    /// Musical positiveness (0 = sad, 1 = happy)
    #[arg(long, value_parser = parse_unit)]
    pub valence: Option<f64>,

    /// Intensity and activity
    #[arg(long, value_parser = parse_unit)]
    pub energy: Option<f64>,

    /// Suitability for dancing
    #[arg(long, value_parser = parse_unit)]
    pub danceability: Option<f64>,

    /// Confidence the track is acoustic
    #[arg(long, value_parser = parse_unit)]
    pub acousticness: Option<f64>,

    /// Likelihood the track has no vocals
    #[arg(long, value_parser = parse_unit)]
    pub instrumentalness: Option<f64>,

    /// Presence of a live audience
    #[arg(long, value_parser = parse_unit)]
    pub liveness: Option<f64>,
}

impl MoodArgs {
    /// The explicitly given targets only.
    #[must_use]
    pub fn to_target(&self) -> MoodTarget {
        let values = [
            (Feature::Valence, self.valence),
            (Feature::Energy, self.energy),
            (Feature::Danceability, self.danceability),
            (Feature::Acousticness, self.acousticness),
            (Feature::Instrumentalness, self.instrumentalness),
            (Feature::Liveness, self.liveness),
        ];
        let mut target = MoodTarget::new();
        for (feature, value) in values {
            if let Some(value) = value {
                target.set(feature, value);
            }
        }
        target
    }
}

impl CreateArgs {
    /// Mood flags layered over the slider defaults when requested.
    #[must_use]
    pub fn mood_target(&self) -> MoodTarget {
        let explicit = self.mood.to_target();
        if self.mood_defaults {
            explicit.or(&MoodTarget::slider_defaults())
        } else {
            explicit
        }
    }
}

fn parse_unit(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is outside 0.0..=1.0"))
    }
}
