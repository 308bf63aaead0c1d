//! # Playlist Publishing
//!
//! Materializes a candidate list as a new remote playlist:
//!
//! 1. validate the [`PlaylistSpec`] (blank names and zero sizes never reach the service)
//! 2. create the playlist under the current user
//! 3. optionally shuffle, then truncate to the effective size
//! 4. add tracks in order, one request per [`ADD_TRACKS_BATCH`] ids
//!
//! There is no rollback. If an add request fails, the playlist stays on the
//! service with whatever was already added, and the caller gets
//! [`PublishError::Incomplete`] naming it.

use crate::catalog::{Catalog, PlaylistRef, ADD_TRACKS_BATCH};
use crate::error::{PublishError, ValidationError};
use chrono::NaiveDate;
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Largest playlist built in one go unless configured otherwise.
pub const DEFAULT_MAX_PLAYLIST_SIZE: usize = 50;
pub const DEFAULT_PLAYLIST_SIZE: usize = 20;
pub const DEFAULT_DESCRIPTION: &str = "Created with EchoMood - a playlist matching your current vibe";

/// How the new playlist should look.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSpec {
    pub name: String,
    /// Requested track count; capped by candidates and the configured maximum.
    pub size: usize,
    pub public: bool,
    pub shuffle: bool,
}

impl PlaylistSpec {
    /// Private, shuffled, [`DEFAULT_PLAYLIST_SIZE`] tracks.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: DEFAULT_PLAYLIST_SIZE,
            public: false,
            shuffle: true,
        }
    }

    /// # Errors
    ///
    /// Blank name (after trimming) or zero size.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyPlaylistName);
        }
        if self.size == 0 {
            return Err(ValidationError::ZeroPlaylistSize);
        }
        Ok(())
    }
}

/// `EchoMood - October 17` style name for `date`.
#[must_use]
pub fn default_playlist_name(date: NaiveDate) -> String {
    format!("EchoMood - {}", date.format("%B %d"))
}

/// The published playlist and exactly which tracks went into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPlaylist {
    pub playlist: PlaylistRef,
    pub name: String,
    pub track_ids: Vec<String>,
    /// Number of add requests issued.
    pub batches: usize,
}

#[derive(Debug, Clone)]
pub struct PlaylistPublisher<C> {
    catalog: C,
    max_size: usize,
    description: String,
}

impl<C: Catalog> PlaylistPublisher<C> {
    #[must_use]
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            max_size: DEFAULT_MAX_PLAYLIST_SIZE,
            description: DEFAULT_DESCRIPTION.to_string(),
        }
    }

    #[must_use]
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size.max(1);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Number of tracks `spec` will yield from `available` candidates.
    #[must_use]
    pub fn effective_size(&self, spec: &PlaylistSpec, available: usize) -> usize {
        spec.size.min(available).min(self.max_size)
    }

    /// # Errors
    ///
    /// See [`PublishError`]. Validation happens before any remote call.
    pub fn publish(&self, spec: &PlaylistSpec, track_ids: &[String]) -> Result<PublishedPlaylist, PublishError> {
        self.publish_with_rng(spec, track_ids, &mut rand::thread_rng())
    }

    /// As [`PlaylistPublisher::publish`], shuffling with `rng`.
    ///
    /// # Errors
    ///
    /// See [`PublishError`].
    pub fn publish_with_rng<R: Rng>(
        &self,
        spec: &PlaylistSpec,
        track_ids: &[String],
        rng: &mut R,
    ) -> Result<PublishedPlaylist, PublishError> {
        spec.validate()?;

        let mut ids = unique_in_order(track_ids);
        if ids.is_empty() {
            return Err(ValidationError::NoTracksToPublish.into());
        }

        let name = spec.name.trim();
        let user_id = self.catalog.current_user_id().map_err(PublishError::Create)?;
        let playlist = self
            .catalog
            .create_playlist(&user_id, name, spec.public, &self.description)
            .map_err(PublishError::Create)?;
        info!("Created playlist '{name}' ({})", playlist.id);

        if spec.shuffle {
            ids.shuffle(rng);
        }
        ids.truncate(self.effective_size(spec, ids.len()));

        let mut added = 0;
        let mut batches = 0;
        for batch in ids.chunks(ADD_TRACKS_BATCH) {
            self.catalog
                .add_tracks(&playlist.id, batch)
                .map_err(|source| PublishError::Incomplete {
                    playlist: playlist.clone(),
                    added,
                    requested: ids.len(),
                    source,
                })?;
            added += batch.len();
            batches += 1;
            debug!("Added {added}/{} tracks to {}", ids.len(), playlist.id);
        }

        info!("Playlist '{name}' ready with {added} tracks: {}", playlist.url);
        Ok(PublishedPlaylist {
            playlist,
            name: name.to_string(),
            track_ids: ids,
            batches,
        })
    }
}

fn unique_in_order(track_ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    track_ids
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}
