//! # Session Controller
//!
//! One user's walk through the four pages of the discovery flow:
//!
//! ```text
//! FetchMusic --fetched--> MoodAndGenre --selected--> PlaylistDetails --published--> PlaylistCreated
//!     ^                        ^  |                        |                           |  |
//!     |                        |  +-- empty selection      +-- back -------------------+  |
//!     |                        +------------------------------------ create another ------+
//!     +------------------------------------------------------------- start over ----------+
//! ```
//!
//! All per-session data (fetched tracks, genre choices, criteria, candidates,
//! the published playlist) lives in [`Session`] itself. Nothing is global, so
//! independent sessions never share state.

use crate::catalog::{Catalog, Track};
use crate::error::{Error, PublishError};
use crate::familiarity::FamiliarityScorer;
use crate::fetch::{self, TrackSource};
use crate::genre::{self, ArtistGenreIndex};
use crate::pipeline::{Selection, SelectionCriteria, SelectionPipeline};
use crate::publisher::{PlaylistPublisher, PlaylistSpec, PublishedPlaylist};
use log::{debug, info};

/// The pages of the discovery flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    FetchMusic,
    MoodAndGenre,
    PlaylistDetails,
    PlaylistCreated,
}

/// Things that happen while on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Fetched { tracks: usize },
    FetchFailed,
    Selected { tracks: usize },
    Published,
    PublishFailed,
    Back,
    CreateAnother,
    StartOver,
}

impl Page {
    /// Next page for `outcome`. Outcomes that make no sense on the current
    /// page leave it unchanged.
    #[must_use]
    pub fn next(self, outcome: Outcome) -> Page {
        use Outcome::*;
        use Page::*;

        match (self, outcome) {
            (_, StartOver) => FetchMusic,
            (FetchMusic, Fetched { tracks }) if tracks > 0 => MoodAndGenre,
            (MoodAndGenre, Selected { tracks }) if tracks > 0 => PlaylistDetails,
            (MoodAndGenre, Back) => FetchMusic,
            (PlaylistDetails, Published) => PlaylistCreated,
            (PlaylistDetails, Back) => MoodAndGenre,
            (PlaylistCreated, CreateAnother) => MoodAndGenre,
            (page, _) => page,
        }
    }
}

/// Per-user state threaded through the flow.
#[derive(Debug)]
pub struct Session<C> {
    catalog: C,
    scorer: FamiliarityScorer,
    max_playlist_size: Option<usize>,
    description: Option<String>,
    page: Page,
    tracks: Vec<Track>,
    artist_index: Option<ArtistGenreIndex>,
    vocabulary: Option<Vec<String>>,
    criteria: Option<SelectionCriteria>,
    selection: Option<Selection>,
    published: Option<PublishedPlaylist>,
}

impl<C: Catalog> Session<C> {
    #[must_use]
    pub fn new(catalog: C, scorer: FamiliarityScorer) -> Self {
        Self {
            catalog,
            scorer,
            max_playlist_size: None,
            description: None,
            page: Page::FetchMusic,
            tracks: Vec::new(),
            artist_index: None,
            vocabulary: None,
            criteria: None,
            selection: None,
            published: None,
        }
    }

    #[must_use]
    pub fn with_max_playlist_size(mut self, max: usize) -> Self {
        self.max_playlist_size = Some(max);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn page(&self) -> Page {
        self.page
    }

    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    #[must_use]
    pub fn criteria(&self) -> Option<&SelectionCriteria> {
        self.criteria.as_ref()
    }

    #[must_use]
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    #[must_use]
    pub fn published(&self) -> Option<&PublishedPlaylist> {
        self.published.as_ref()
    }

    fn advance(&mut self, outcome: Outcome) {
        let next = self.page.next(outcome);
        if next != self.page {
            debug!("Session {:?} -> {:?} on {:?}", self.page, next, outcome);
        }
        self.page = next;
    }

    /// Replaces the session's tracks with a fresh listing. Everything derived
    /// from the previous listing is discarded first.
    ///
    /// # Errors
    ///
    /// Transport errors from the listing calls.
    pub fn fetch<F>(&mut self, source: &TrackSource, progress: F) -> Result<usize, Error>
    where
        F: FnMut(usize, usize),
    {
        self.reset_data();
        match fetch::fetch_tracks(&self.catalog, source, progress) {
            Ok(tracks) => {
                let count = tracks.len();
                self.tracks = tracks;
                self.advance(Outcome::Fetched { tracks: count });
                Ok(count)
            }
            Err(e) => {
                self.advance(Outcome::FetchFailed);
                Err(e.into())
            }
        }
    }

    /// Artist genres for the fetched tracks. Looked up once per listing and
    /// shared by the genre choices and the genre gate.
    pub fn artist_index(&mut self) -> &ArtistGenreIndex {
        self.artist_index
            .get_or_insert_with(|| genre::resolve_artist_genres(&self.catalog, &self.tracks))
    }

    /// Ranked genre choices for the fetched tracks.
    pub fn genre_choices(&mut self) -> &[String] {
        if self.vocabulary.is_none() {
            let vocabulary = self.artist_index().vocabulary(genre::VOCABULARY_SIZE);
            info!("{} genres available to choose from", vocabulary.len());
            self.vocabulary = Some(vocabulary);
        }
        self.vocabulary.as_deref().unwrap_or_default()
    }

    /// Runs the selection pipeline over the fetched tracks.
    ///
    /// # Errors
    ///
    /// Only invalid criteria.
    pub fn apply(&mut self, criteria: SelectionCriteria) -> Result<&Selection, Error> {
        criteria.validate()?;
        if !criteria.wanted_genres().is_empty() {
            self.artist_index();
        }
        let pipeline = SelectionPipeline::new(&self.catalog, self.scorer.clone());
        let selection = match &self.artist_index {
            Some(index) => pipeline.select_tracks_with_index(self.tracks.clone(), &criteria, index)?,
            None => pipeline.select_tracks(self.tracks.clone(), &criteria)?,
        };
        self.advance(Outcome::Selected {
            tracks: selection.tracks.len(),
        });
        self.criteria = Some(criteria);
        self.published = None;
        Ok(self.selection.insert(selection))
    }

    /// Publishes the current candidates.
    ///
    /// # Errors
    ///
    /// See [`PublishError`]. Publishing without candidates is a validation error.
    pub fn publish(&mut self, spec: &PlaylistSpec) -> Result<&PublishedPlaylist, PublishError> {
        let track_ids = self
            .selection
            .as_ref()
            .map(Selection::track_ids)
            .unwrap_or_default();

        let mut publisher = PlaylistPublisher::new(&self.catalog);
        if let Some(max) = self.max_playlist_size {
            publisher = publisher.with_max_size(max);
        }
        if let Some(description) = &self.description {
            publisher = publisher.with_description(description.clone());
        }

        match publisher.publish(spec, &track_ids) {
            Ok(published) => {
                self.advance(Outcome::Published);
                Ok(self.published.insert(published))
            }
            Err(e) => {
                self.advance(Outcome::PublishFailed);
                Err(e)
            }
        }
    }

    pub fn back(&mut self) {
        self.advance(Outcome::Back);
    }

    /// Back to mood selection, keeping the fetched tracks.
    pub fn create_another(&mut self) {
        self.advance(Outcome::CreateAnother);
    }

    /// Back to the first page with nothing fetched.
    pub fn start_over(&mut self) {
        self.reset_data();
        self.advance(Outcome::StartOver);
    }

    fn reset_data(&mut self) {
        self.tracks.clear();
        self.artist_index = None;
        self.vocabulary = None;
        self.criteria = None;
        self.selection = None;
        self.published = None;
    }
}
