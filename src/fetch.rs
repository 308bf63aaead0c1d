//! # Track Fetching
//!
//! Pulls a complete listing (saved tracks or one playlist) page by page and
//! vets every row into a [`Track`]. Fetch failures are not degraded: without
//! a listing there is nothing to select from, so errors go to the caller.

use crate::catalog::{Catalog, CatalogItem, Page, Track, PLAYLIST_TRACKS_PAGE, SAVED_TRACKS_PAGE};
use crate::error::{TransportError, ValidationError};
use log::{debug, info};

/// Where the tracks come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackSource {
    SavedTracks,
    Playlist(String),
}

impl TrackSource {
    /// `None` means saved tracks; anything else must be a playlist reference.
    ///
    /// # Errors
    ///
    /// See [`parse_playlist_reference`].
    pub fn from_reference(reference: Option<&str>) -> Result<Self, ValidationError> {
        match reference {
            None => Ok(Self::SavedTracks),
            Some(input) => parse_playlist_reference(input).map(Self::Playlist),
        }
    }
}

/// Extracts the playlist id from a share URL or a `spotify:playlist:` URI.
///
/// # Errors
///
/// [`ValidationError::InvalidPlaylistReference`] for anything else.
pub fn parse_playlist_reference(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    let invalid = || ValidationError::InvalidPlaylistReference(trimmed.to_string());

    let tail = if let Some(rest) = trimmed.strip_prefix("spotify:playlist:") {
        rest
    } else if trimmed.contains("spotify.com/") {
        trimmed.split_once("/playlist/").map(|(_, rest)| rest).ok_or_else(invalid)?
    } else {
        return Err(invalid());
    };

    let id = tail
        .split(['?', '#', '/'])
        .next()
        .unwrap_or_default();

    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid());
    }
    Ok(id.to_string())
}

/// Fetches every track from `source`.
///
/// `progress` receives `(rows_loaded, total)` after each page.
///
/// # Errors
///
/// The first transport error aborts the fetch.
pub fn fetch_tracks<C, F>(catalog: &C, source: &TrackSource, progress: F) -> Result<Vec<Track>, TransportError>
where
    C: Catalog,
    F: FnMut(usize, usize),
{
    match source {
        TrackSource::SavedTracks => fetch_saved_tracks(catalog, progress),
        TrackSource::Playlist(id) => fetch_playlist_tracks(catalog, id, progress),
    }
}

/// All of the user's saved tracks.
///
/// # Errors
///
/// The first transport error aborts the fetch.
pub fn fetch_saved_tracks<C, F>(catalog: &C, progress: F) -> Result<Vec<Track>, TransportError>
where
    C: Catalog,
    F: FnMut(usize, usize),
{
    let total = catalog.saved_tracks(0, 1)?.total;
    if total == 0 {
        info!("No saved tracks");
        return Ok(Vec::new());
    }

    let rows = paginate(total, SAVED_TRACKS_PAGE, progress, |offset, limit| {
        catalog.saved_tracks(offset, limit)
    })?;
    Ok(vet(rows, "saved tracks"))
}

/// All tracks of one playlist.
///
/// # Errors
///
/// The first transport error aborts the fetch.
pub fn fetch_playlist_tracks<C, F>(catalog: &C, playlist_id: &str, progress: F) -> Result<Vec<Track>, TransportError>
where
    C: Catalog,
    F: FnMut(usize, usize),
{
    let total = catalog.playlist_track_total(playlist_id)?;
    if total == 0 {
        info!("Playlist {playlist_id} is empty");
        return Ok(Vec::new());
    }

    let rows = paginate(total, PLAYLIST_TRACKS_PAGE, progress, |offset, limit| {
        catalog.playlist_tracks(playlist_id, offset, limit)
    })?;
    Ok(vet(rows, "playlist tracks"))
}

/// Reads pages until one comes back short.
fn paginate<F, P>(total: usize, page_size: usize, mut progress: P, mut fetch_page: F) -> Result<Vec<CatalogItem>, TransportError>
where
    F: FnMut(usize, usize) -> Result<Page<CatalogItem>, TransportError>,
    P: FnMut(usize, usize),
{
    let mut rows = Vec::with_capacity(total);
    let mut offset = 0;
    loop {
        let page = fetch_page(offset, page_size)?;
        let count = page.items.len();
        rows.extend(page.items);
        offset += page_size;
        debug!("Loaded {}/{} rows", rows.len(), total);
        progress(rows.len(), total);
        if count < page_size {
            break;
        }
    }
    Ok(rows)
}

fn vet(rows: Vec<CatalogItem>, what: &str) -> Vec<Track> {
    let row_count = rows.len();
    let tracks: Vec<Track> = rows.into_iter().filter_map(Track::from_item).collect();
    info!(
        "Loaded {} {what} ({} unavailable rows dropped)",
        tracks.len(),
        row_count - tracks.len()
    );
    tracks
}
