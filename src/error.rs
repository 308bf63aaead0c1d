//! # Error Taxonomy
//!
//! Two kinds of failure reach callers of the library:
//!
//! - [`TransportError`]: the remote catalog could not be reached, rejected the
//!   credentials, or answered with something we could not decode.
//! - [`ValidationError`]: the caller handed us input that can never succeed
//!   (blank playlist name, malformed playlist reference, out-of-range criteria).
//!
//! Scoring, genre resolution and mood filtering swallow transport errors and
//! degrade instead (see the respective modules). Playlist creation and input
//! validation never degrade: those errors are returned verbatim.

use crate::catalog::PlaylistRef;
use thiserror::Error;

/// Failures talking to the remote catalog.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request never produced a usable response.
    #[error("request to the catalog failed: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP 401: the access token is missing, expired or revoked.
    #[error("the catalog rejected the access token (expired or missing scopes)")]
    Unauthorized,

    /// Any other non-success status.
    #[error("catalog returned {status} for {endpoint}: {message}")]
    Status {
        status: u16,
        endpoint: String,
        message: String,
    },

    #[error("could not decode catalog response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Caller input that is rejected before any remote call is made.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("playlist name must not be empty")]
    EmptyPlaylistName,

    #[error("playlist size must be at least 1")]
    ZeroPlaylistSize,

    #[error("there are no tracks to put in the playlist")]
    NoTracksToPublish,

    #[error("'{0}' is not a playlist URL (expected open.spotify.com/playlist/<id> or spotify:playlist:<id>)")]
    InvalidPlaylistReference(String),

    #[error("tolerance must be a number between 0 and 1, got {0}")]
    ToleranceOutOfRange(f64),

    #[error("familiarity threshold must be between 0 and 100, got {0}")]
    FamiliarityOutOfRange(u8),

    #[error("target for {feature} must be between 0 and 1, got {value}")]
    TargetOutOfRange { feature: String, value: f64 },

    #[error("unknown audio feature '{0}'")]
    UnknownFeature(String),
}

/// Top-level library error.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Playlist publishing failures. Every variant aborts the publish.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Nothing was created remotely.
    #[error("could not create playlist: {0}")]
    Create(#[source] TransportError),

    /// The playlist exists but is missing tracks. It is left as is.
    #[error("playlist {} was created but only {added} of {requested} tracks were added: {source}", .playlist.url)]
    Incomplete {
        playlist: PlaylistRef,
        added: usize,
        requested: usize,
        #[source]
        source: TransportError,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
