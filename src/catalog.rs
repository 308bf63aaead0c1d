//! # Catalog Boundary
//!
//! Domain types for tracks, artists and audio features, plus the [`Catalog`]
//! trait every pipeline stage talks to. The trait mirrors the handful of remote
//! operations EchoMood needs and nothing more; [`crate::spotify::SpotifyClient`]
//! is the production implementation.
//!
//! All calls are blocking round-trips. Retries and timeouts are the
//! implementation's business, not the caller's.

use crate::error::{TransportError, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

/// Maximum artist ids per `artists` request.
pub const ARTIST_BATCH: usize = 50;
/// Maximum track ids per `audio_features` request.
pub const FEATURE_BATCH: usize = 100;
/// Maximum track ids per playlist mutation.
pub const ADD_TRACKS_BATCH: usize = 100;
/// Size of the recent-play window used for familiarity.
pub const RECENT_PLAYS_LIMIT: usize = 50;
/// Entries fetched per top-track ranking window.
pub const TOP_TRACKS_LIMIT: usize = 50;
pub const SAVED_TRACKS_PAGE: usize = 50;
pub const PLAYLIST_TRACKS_PAGE: usize = 100;

/// The six audio features a mood target can constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Valence,
    Energy,
    Danceability,
    Acousticness,
    Instrumentalness,
    Liveness,
}

impl Feature {
    pub const ALL: [Feature; 6] = [
        Feature::Valence,
        Feature::Energy,
        Feature::Danceability,
        Feature::Acousticness,
        Feature::Instrumentalness,
        Feature::Liveness,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Feature::Valence => "valence",
            Feature::Energy => "energy",
            Feature::Danceability => "danceability",
            Feature::Acousticness => "acousticness",
            Feature::Instrumentalness => "instrumentalness",
            Feature::Liveness => "liveness",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Feature::ALL
            .into_iter()
            .find(|feature| feature.name() == wanted)
            .ok_or_else(|| ValidationError::UnknownFeature(s.to_string()))
    }
}

/// Audio-feature vector for one track. Any value may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub valence: Option<f64>,
    pub energy: Option<f64>,
    pub danceability: Option<f64>,
    pub acousticness: Option<f64>,
    pub instrumentalness: Option<f64>,
    pub liveness: Option<f64>,
}

impl AudioFeatures {
    #[must_use]
    pub fn get(&self, feature: Feature) -> Option<f64> {
        match feature {
            Feature::Valence => self.valence,
            Feature::Energy => self.energy,
            Feature::Danceability => self.danceability,
            Feature::Acousticness => self.acousticness,
            Feature::Instrumentalness => self.instrumentalness,
            Feature::Liveness => self.liveness,
        }
    }

    pub fn set(&mut self, feature: Feature, value: Option<f64>) {
        let slot = match feature {
            Feature::Valence => &mut self.valence,
            Feature::Energy => &mut self.energy,
            Feature::Danceability => &mut self.danceability,
            Feature::Acousticness => &mut self.acousticness,
            Feature::Instrumentalness => &mut self.instrumentalness,
            Feature::Liveness => &mut self.liveness,
        };
        *slot = value;
    }
}

/// An artist as referenced from a track listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: Option<String>,
    pub name: String,
}

/// Raw track body inside a listing row. Unavailable tracks come back with
/// holes, so everything is optional until [`Track::from_item`] vets it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTrack {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
}

/// One row of a saved-tracks or playlist-tracks listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub track: Option<RawTrack>,
}

impl CatalogItem {
    /// Convenience constructor for a well-formed row.
    #[must_use]
    pub fn new(id: &str, name: &str, artists: &[(&str, &str)]) -> Self {
        Self {
            track: Some(RawTrack {
                id: Some(id.to_string()),
                name: Some(name.to_string()),
                artists: artists
                    .iter()
                    .map(|(artist_id, artist_name)| ArtistRef {
                        id: Some((*artist_id).to_string()),
                        name: (*artist_name).to_string(),
                    })
                    .collect(),
            }),
        }
    }
}

/// A page of listing results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

/// A track that survived boundary validation, plus whatever the pipeline has
/// attached to it so far.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artists: Vec<ArtistRef>,
    pub features: Option<AudioFeatures>,
    /// 0..=100, attached by the familiarity stage.
    pub familiarity: u8,
    pub genres: BTreeSet<String>,
}

impl Track {
    /// Returns `None` for rows without a track, an id, or a name.
    #[must_use]
    pub fn from_item(item: CatalogItem) -> Option<Self> {
        let raw = item.track?;
        let id = raw.id.filter(|id| !id.trim().is_empty())?;
        let name = raw.name.filter(|name| !name.trim().is_empty())?;
        Some(Self {
            id,
            name,
            artists: raw.artists,
            features: None,
            familiarity: 0,
            genres: BTreeSet::new(),
        })
    }

    /// Artist ids in listing order, skipping local-file artists without one.
    pub fn artist_ids(&self) -> impl Iterator<Item = &str> {
        self.artists.iter().filter_map(|artist| artist.id.as_deref())
    }

    #[must_use]
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|artist| artist.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Ranking window for top tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    ShortTerm,
    MediumTerm,
}

impl TimeRange {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TimeRange::ShortTerm => "short_term",
            TimeRange::MediumTerm => "medium_term",
        }
    }
}

/// A playlist created on the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistRef {
    pub id: String,
    /// Shareable web URL.
    pub url: String,
}

/// Remote operations the pipeline depends on.
///
/// Implementations must respect the batch ceilings: callers never pass more
/// than [`ARTIST_BATCH`] ids to [`Catalog::artists`], nor more than
/// [`FEATURE_BATCH`] / [`ADD_TRACKS_BATCH`] to the feature and mutation calls.
pub trait Catalog {
    /// Id of the authenticated user (playlist owner).
    fn current_user_id(&self) -> Result<String, TransportError>;

    fn saved_tracks(&self, offset: usize, limit: usize) -> Result<Page<CatalogItem>, TransportError>;

    fn playlist_track_total(&self, playlist_id: &str) -> Result<usize, TransportError>;

    fn playlist_tracks(
        &self,
        playlist_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Page<CatalogItem>, TransportError>;

    /// Genre lists keyed by artist id. Unknown ids are simply absent.
    fn artists(&self, ids: &[String]) -> Result<HashMap<String, Vec<String>>, TransportError>;

    /// One entry per requested id, in request order; `None` when the service
    /// has no analysis for that track.
    fn audio_features(&self, ids: &[String]) -> Result<Vec<Option<AudioFeatures>>, TransportError>;

    /// Track ids of the most recent plays, newest first. Repeats are kept.
    fn recently_played(&self, limit: usize) -> Result<Vec<String>, TransportError>;

    fn top_tracks(&self, range: TimeRange, limit: usize) -> Result<Vec<String>, TransportError>;

    fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        public: bool,
        description: &str,
    ) -> Result<PlaylistRef, TransportError>;

    fn add_tracks(&self, playlist_id: &str, track_ids: &[String]) -> Result<(), TransportError>;
}

impl<C: Catalog + ?Sized> Catalog for &C {
    fn current_user_id(&self) -> Result<String, TransportError> {
        (**self).current_user_id()
    }

    fn saved_tracks(&self, offset: usize, limit: usize) -> Result<Page<CatalogItem>, TransportError> {
        (**self).saved_tracks(offset, limit)
    }

    fn playlist_track_total(&self, playlist_id: &str) -> Result<usize, TransportError> {
        (**self).playlist_track_total(playlist_id)
    }

    fn playlist_tracks(
        &self,
        playlist_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Page<CatalogItem>, TransportError> {
        (**self).playlist_tracks(playlist_id, offset, limit)
    }

    fn artists(&self, ids: &[String]) -> Result<HashMap<String, Vec<String>>, TransportError> {
        (**self).artists(ids)
    }

    fn audio_features(&self, ids: &[String]) -> Result<Vec<Option<AudioFeatures>>, TransportError> {
        (**self).audio_features(ids)
    }

    fn recently_played(&self, limit: usize) -> Result<Vec<String>, TransportError> {
        (**self).recently_played(limit)
    }

    fn top_tracks(&self, range: TimeRange, limit: usize) -> Result<Vec<String>, TransportError> {
        (**self).top_tracks(range, limit)
    }

    fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        public: bool,
        description: &str,
    ) -> Result<PlaylistRef, TransportError> {
        (**self).create_playlist(user_id, name, public, description)
    }

    fn add_tracks(&self, playlist_id: &str, track_ids: &[String]) -> Result<(), TransportError> {
        (**self).add_tracks(playlist_id, track_ids)
    }
}
