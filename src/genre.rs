//! # Genre Resolution
//!
//! Tracks carry no genres of their own; the catalog assigns them to artists.
//! This module fetches artist genres in batches, derives a ranked vocabulary
//! (the most common genres across a track set) and the genre set of each track.
//!
//! A failed artist batch is skipped, not retried: the affected artists simply
//! contribute no genres.

use crate::catalog::{Catalog, Track, ARTIST_BATCH};
use log::{debug, info, warn};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Default size of the genre vocabulary.
pub const VOCABULARY_SIZE: usize = 30;

/// Genre lists keyed by artist id, plus bookkeeping about what went missing.
#[derive(Debug, Clone, Default)]
pub struct ArtistGenreIndex {
    /// Artist ids in first-seen order; drives deterministic tie-breaking.
    order: Vec<String>,
    genres: HashMap<String, Vec<String>>,
    /// Batches whose lookup failed and were skipped.
    pub failed_batches: usize,
}

impl ArtistGenreIndex {
    /// Builds an index directly from known data.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let mut index = Self::default();
        for (artist_id, genres) in entries {
            index.insert(artist_id, genres);
        }
        index
    }

    fn insert(&mut self, artist_id: String, genres: Vec<String>) {
        if !self.genres.contains_key(&artist_id) {
            self.order.push(artist_id.clone());
        }
        self.genres.insert(artist_id, genres);
    }

    #[must_use]
    pub fn genres_of(&self, artist_id: &str) -> &[String] {
        self.genres.get(artist_id).map(Vec::as_slice).unwrap_or(&[])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.genres.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
    }

    /// Counts every artist's genres once and returns the `limit` most common,
    /// most frequent first. Ties keep first-seen order.
    #[must_use]
    pub fn vocabulary(&self, limit: usize) -> Vec<String> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();

        for artist_id in &self.order {
            for genre in self.genres_of(artist_id) {
                match positions.get(genre.as_str()) {
                    Some(&pos) => counts[pos].1 += 1,
                    None => {
                        positions.insert(genre.as_str(), counts.len());
                        counts.push((genre.clone(), 1));
                    }
                }
            }
        }

        // Stable sort preserves first-seen order among equal counts.
        counts.sort_by(|(_, a), (_, b)| b.cmp(a));
        counts.into_iter().take(limit).map(|(genre, _)| genre).collect()
    }
}

/// Unique artist ids referenced by `tracks`, in first-seen order.
#[must_use]
pub fn collect_artist_ids(tracks: &[Track]) -> Vec<String> {
    let mut seen = HashSet::new();
    tracks
        .iter()
        .flat_map(Track::artist_ids)
        .filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect()
}

/// Fetches genres for every artist referenced by `tracks`.
pub fn resolve_artist_genres<C: Catalog>(catalog: &C, tracks: &[Track]) -> ArtistGenreIndex {
    let artist_ids = collect_artist_ids(tracks);
    let mut index = ArtistGenreIndex::default();

    if artist_ids.is_empty() {
        debug!("No artist ids to resolve");
        return index;
    }

    for (batch_no, batch) in artist_ids.chunks(ARTIST_BATCH).enumerate() {
        match catalog.artists(batch) {
            Ok(found) => {
                debug!("Artist batch {}: {} of {} resolved", batch_no + 1, found.len(), batch.len());
                // Keep request order so vocabulary ties are reproducible.
                let mut found = found;
                for artist_id in batch {
                    if let Some(genres) = found.remove(artist_id) {
                        index.insert(artist_id.clone(), genres);
                    }
                }
            }
            Err(e) => {
                warn!("Skipping artist batch {} ({} artists): {e}", batch_no + 1, batch.len());
                index.failed_batches += 1;
            }
        }
    }

    info!(
        "Resolved genres for {} of {} artists ({} batches skipped)",
        index.len(),
        artist_ids.len(),
        index.failed_batches
    );
    index
}

/// The shell-facing entry point: ranked genre choices for a track set.
pub fn resolve_vocabulary<C: Catalog>(catalog: &C, tracks: &[Track]) -> Vec<String> {
    resolve_artist_genres(catalog, tracks).vocabulary(VOCABULARY_SIZE)
}

/// Union of the genres of a track's artists.
#[must_use]
pub fn track_genres(track: &Track, index: &ArtistGenreIndex) -> BTreeSet<String> {
    track
        .artist_ids()
        .flat_map(|artist_id| index.genres_of(artist_id).iter().cloned())
        .collect()
}

/// True when any selected genre equals (ignoring case) one of the track's.
/// Whole-token equality only: "rock" does not match "indie rock".
#[must_use]
pub fn matches_any(track_genres: &BTreeSet<String>, selected: &[String]) -> bool {
    selected.iter().any(|wanted| {
        track_genres
            .iter()
            .any(|genre| genre.to_lowercase() == wanted.to_lowercase())
    })
}
