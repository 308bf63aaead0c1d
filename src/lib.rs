//! Mood-driven playlist building from a listener's own library.
//!
//! Core modules:
//! - [`catalog`] - Track and feature types plus the [`catalog::Catalog`] seam
//! - [`fetch`] - Paginated loading of saved tracks or a playlist
//! - [`familiarity`] - 0-100 familiarity scores from listening history
//! - [`genre`] - Artist genre resolution and the genre vocabulary
//! - [`mood`] - Tolerance-band filtering on audio features
//! - [`pipeline`] - The selection stages chained together
//! - [`publisher`] - Playlist creation and batched track insertion
//! - [`session`] - Per-user page flow and session state
//!
//! ### Supporting Modules
//!
//! - [`spotify`] - Web API implementation of the catalog
//! - [`error`] - Typed library errors
//! - [`config`] - Settings file management
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use echomood::catalog::Feature;
//! use echomood::familiarity::FamiliarityScorer;
//! use echomood::fetch::TrackSource;
//! use echomood::mood::MoodTarget;
//! use echomood::pipeline::SelectionCriteria;
//! use echomood::publisher::PlaylistSpec;
//! use echomood::session::Session;
//! use echomood::spotify::SpotifyClient;
//!
//! let client = SpotifyClient::new("access-token")?;
//! let mut session = Session::new(client, FamiliarityScorer::default());
//!
//! session.fetch(&TrackSource::SavedTracks, |_, _| {})?;
//! println!("Genres: {:?}", session.genre_choices());
//!
//! let criteria = SelectionCriteria {
//!     mood: MoodTarget::new().with(Feature::Energy, 0.8),
//!     familiarity_threshold: 40,
//!     genres: vec!["indie pop".to_string()],
//!     ..SelectionCriteria::default()
//! };
//! let selection = session.apply(criteria)?;
//! println!("{} candidates", selection.tracks.len());
//!
//! let published = session.publish(&PlaylistSpec::new("Evening Drive"))?;
//! println!("{}", published.playlist.url);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Failure Policy
//!
//! Enrichment stages prefer recall over precision. When history, artist or
//! feature lookups fail, tracks are kept rather than dropped and the
//! [`pipeline::SelectionReport`] says which stage degraded. Fetching tracks,
//! creating the playlist and validating input fail hard.

pub mod catalog;
pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod familiarity;
pub mod fetch;
pub mod genre;
pub mod mood;
pub mod pipeline;
pub mod publisher;
pub mod session;
pub mod spotify;

pub use error::{Error, PublishError, Result, TransportError, ValidationError};
