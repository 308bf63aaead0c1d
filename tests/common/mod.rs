//! In-memory catalog for integration tests.
//!
//! Records every batched call and can be told to fail specific calls, so
//! tests can check both batching and the degrade-instead-of-fail behavior.

#![allow(dead_code)]

use echomood::catalog::{AudioFeatures, Catalog, CatalogItem, Page, PlaylistRef, TimeRange};
use echomood::error::TransportError;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
pub struct FakeCatalog {
    pub user_id: String,
    pub saved: Vec<CatalogItem>,
    pub playlists: HashMap<String, Vec<CatalogItem>>,
    pub artist_genres: HashMap<String, Vec<String>>,
    pub features: HashMap<String, AudioFeatures>,
    pub recent: Vec<String>,
    pub top: Vec<String>,

    pub fail_history: bool,
    pub fail_listing: bool,
    pub fail_create: bool,
    /// Zero-based indices of `artists` calls that fail.
    pub fail_artist_calls: HashSet<usize>,
    /// Zero-based indices of `audio_features` calls that fail.
    pub fail_feature_calls: HashSet<usize>,
    /// Zero-based indices of `add_tracks` calls that fail.
    pub fail_add_calls: HashSet<usize>,

    pub listing_calls: RefCell<Vec<(usize, usize)>>,
    pub artist_calls: RefCell<Vec<Vec<String>>>,
    pub feature_calls: RefCell<Vec<Vec<String>>>,
    pub history_calls: Cell<usize>,
    pub created: RefCell<Vec<(String, String, bool, String)>>,
    pub add_calls: RefCell<Vec<(String, Vec<String>)>>,
}

fn injected(endpoint: &str) -> TransportError {
    TransportError::Status {
        status: 503,
        endpoint: endpoint.to_string(),
        message: "injected failure".to_string(),
    }
}

fn page_of(rows: &[CatalogItem], offset: usize, limit: usize) -> Page<CatalogItem> {
    let start = offset.min(rows.len());
    let end = (offset + limit).min(rows.len());
    Page {
        items: rows[start..end].to_vec(),
        total: rows.len(),
    }
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self {
            user_id: "listener".to_string(),
            ..Self::default()
        }
    }

    /// `count` saved tracks `t0..`, each by its own artist `a0..` tagged `genre`.
    pub fn with_saved_tracks(count: usize, genre: &str) -> Self {
        let mut catalog = Self::new();
        for i in 0..count {
            let artist = format!("a{i}");
            catalog
                .saved
                .push(CatalogItem::new(&format!("t{i}"), &format!("Track {i}"), &[(&artist, "Artist")]));
            catalog.artist_genres.insert(artist, vec![genre.to_string()]);
        }
        catalog
    }

    pub fn set_energy(&mut self, track_id: &str, energy: f64) {
        self.features.insert(
            track_id.to_string(),
            AudioFeatures {
                energy: Some(energy),
                ..AudioFeatures::default()
            },
        );
    }

    pub fn add_sizes(&self) -> Vec<usize> {
        self.add_calls.borrow().iter().map(|(_, ids)| ids.len()).collect()
    }

    pub fn added_ids(&self) -> Vec<String> {
        self.add_calls.borrow().iter().flat_map(|(_, ids)| ids.clone()).collect()
    }
}

impl Catalog for FakeCatalog {
    fn current_user_id(&self) -> Result<String, TransportError> {
        Ok(self.user_id.clone())
    }

    fn saved_tracks(&self, offset: usize, limit: usize) -> Result<Page<CatalogItem>, TransportError> {
        self.listing_calls.borrow_mut().push((offset, limit));
        if self.fail_listing {
            return Err(injected("/me/tracks"));
        }
        Ok(page_of(&self.saved, offset, limit))
    }

    fn playlist_track_total(&self, playlist_id: &str) -> Result<usize, TransportError> {
        if self.fail_listing {
            return Err(injected("/playlists"));
        }
        self.playlists
            .get(playlist_id)
            .map(Vec::len)
            .ok_or_else(|| TransportError::Status {
                status: 404,
                endpoint: format!("/playlists/{playlist_id}"),
                message: "Not found".to_string(),
            })
    }

    fn playlist_tracks(
        &self,
        playlist_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Page<CatalogItem>, TransportError> {
        self.listing_calls.borrow_mut().push((offset, limit));
        let rows = self.playlists.get(playlist_id).map(Vec::as_slice).unwrap_or(&[]);
        Ok(page_of(rows, offset, limit))
    }

    fn artists(&self, ids: &[String]) -> Result<HashMap<String, Vec<String>>, TransportError> {
        let call = self.artist_calls.borrow().len();
        self.artist_calls.borrow_mut().push(ids.to_vec());
        if self.fail_artist_calls.contains(&call) {
            return Err(injected("/artists"));
        }
        Ok(ids
            .iter()
            .filter_map(|id| self.artist_genres.get(id).map(|genres| (id.clone(), genres.clone())))
            .collect())
    }

    fn audio_features(&self, ids: &[String]) -> Result<Vec<Option<AudioFeatures>>, TransportError> {
        let call = self.feature_calls.borrow().len();
        self.feature_calls.borrow_mut().push(ids.to_vec());
        if self.fail_feature_calls.contains(&call) {
            return Err(injected("/audio-features"));
        }
        Ok(ids.iter().map(|id| self.features.get(id).cloned()).collect())
    }

    fn recently_played(&self, limit: usize) -> Result<Vec<String>, TransportError> {
        self.history_calls.set(self.history_calls.get() + 1);
        if self.fail_history {
            return Err(TransportError::Unauthorized);
        }
        Ok(self.recent.iter().take(limit).cloned().collect())
    }

    fn top_tracks(&self, _range: TimeRange, limit: usize) -> Result<Vec<String>, TransportError> {
        if self.fail_history {
            return Err(TransportError::Unauthorized);
        }
        Ok(self.top.iter().take(limit).cloned().collect())
    }

    fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        public: bool,
        description: &str,
    ) -> Result<PlaylistRef, TransportError> {
        if self.fail_create {
            return Err(injected("/users/playlists"));
        }
        let id = format!("pl{}", self.created.borrow().len());
        self.created
            .borrow_mut()
            .push((user_id.to_string(), name.to_string(), public, description.to_string()));
        Ok(PlaylistRef {
            url: format!("https://open.spotify.com/playlist/{id}"),
            id,
        })
    }

    fn add_tracks(&self, playlist_id: &str, track_ids: &[String]) -> Result<(), TransportError> {
        let call = self.add_calls.borrow().len();
        if self.fail_add_calls.contains(&call) {
            return Err(injected("/playlists/tracks"));
        }
        self.add_calls
            .borrow_mut()
            .push((playlist_id.to_string(), track_ids.to_vec()));
        Ok(())
    }
}
