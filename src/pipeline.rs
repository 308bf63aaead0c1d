//! # Selection Pipeline
//!
//! Turns a raw track listing into playlist candidates. Stages run strictly in
//! this order:
//!
//! 1. **Vet**: drop rows without a track id or name.
//! 2. **Score**: attach familiarity to every remaining track (one history fetch).
//! 3. **Familiarity gate**: keep tracks scoring at least the threshold.
//! 4. **Genre gate** (only when genres were chosen): keep tracks whose artists
//!    carry at least one chosen genre. If nothing survives, the gate is lifted
//!    and the stage-3 set is kept instead.
//! 5. **Mood gate**: tolerance match against the audio-feature targets.
//!
//! Order is preserved throughout. An empty result is a normal outcome that the
//! caller should answer by relaxing the criteria, not an error.
//!
//! Each stage depends only on its inputs and the catalog; the pipeline keeps no
//! state between calls.

use crate::catalog::{Catalog, CatalogItem, Track};
use crate::error::ValidationError;
use crate::familiarity::FamiliarityScorer;
use crate::genre::{self, ArtistGenreIndex};
use crate::mood::{self, MoodTarget, DEFAULT_TOLERANCE};
use log::{debug, info, warn};

/// What the user asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionCriteria {
    pub mood: MoodTarget,
    /// Maximum absolute deviation from each mood target.
    pub tolerance: f64,
    /// Inclusive lower bound on familiarity (0..=100).
    pub familiarity_threshold: u8,
    /// Empty means no genre constraint.
    pub genres: Vec<String>,
}

impl Default for SelectionCriteria {
    fn default() -> Self {
        Self {
            mood: MoodTarget::default(),
            tolerance: DEFAULT_TOLERANCE,
            familiarity_threshold: 0,
            genres: Vec::new(),
        }
    }
}

impl SelectionCriteria {
    /// # Errors
    ///
    /// - tolerance not a finite number in `[0, 1]`
    /// - familiarity threshold above 100
    /// - any mood target outside `[0, 1]`
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.tolerance.is_finite() || !(0.0..=1.0).contains(&self.tolerance) {
            return Err(ValidationError::ToleranceOutOfRange(self.tolerance));
        }
        if self.familiarity_threshold > 100 {
            return Err(ValidationError::FamiliarityOutOfRange(self.familiarity_threshold));
        }
        self.mood.validate()
    }

    /// Chosen genres with blanks removed.
    pub(crate) fn wanted_genres(&self) -> Vec<String> {
        self.genres
            .iter()
            .map(|genre| genre.trim())
            .filter(|genre| !genre.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Per-stage bookkeeping, for the shell to explain what happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionReport {
    pub raw: usize,
    pub valid: usize,
    pub after_familiarity: usize,
    /// `None` when no genres were chosen.
    pub after_genre: Option<usize>,
    /// The genre gate matched nothing and was lifted.
    pub genre_filter_relaxed: bool,
    pub after_mood: usize,
    pub familiarity_degraded: bool,
    pub skipped_artist_batches: usize,
    pub passthrough_feature_batches: usize,
}

impl SelectionReport {
    /// True when any stage fell back instead of doing its full job.
    #[must_use]
    pub fn degraded(&self) -> bool {
        self.familiarity_degraded || self.skipped_artist_batches > 0 || self.passthrough_feature_batches > 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub tracks: Vec<Track>,
    pub report: SelectionReport,
}

impl Selection {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    #[must_use]
    pub fn track_ids(&self) -> Vec<String> {
        self.tracks.iter().map(|track| track.id.clone()).collect()
    }
}

/// Runs the five selection stages against one catalog.
#[derive(Debug, Clone)]
pub struct SelectionPipeline<C> {
    catalog: C,
    scorer: FamiliarityScorer,
}

impl<C: Catalog> SelectionPipeline<C> {
    #[must_use]
    pub fn new(catalog: C, scorer: FamiliarityScorer) -> Self {
        Self { catalog, scorer }
    }

    /// Selects from raw listing rows.
    ///
    /// # Errors
    ///
    /// Only invalid criteria fail. Catalog trouble during scoring, genre
    /// resolution or mood filtering degrades the result instead (see
    /// [`SelectionReport::degraded`]).
    pub fn select(&self, raw: Vec<CatalogItem>, criteria: &SelectionCriteria) -> Result<Selection, ValidationError> {
        let raw_count = raw.len();
        let tracks: Vec<Track> = raw.into_iter().filter_map(Track::from_item).collect();
        if tracks.len() < raw_count {
            debug!("Dropped {} malformed or unavailable rows", raw_count - tracks.len());
        }
        let mut selection = self.select_tracks(tracks, criteria)?;
        selection.report.raw = raw_count;
        Ok(selection)
    }

    /// Selects from tracks that were already vetted (e.g. by [`crate::fetch`]).
    ///
    /// # Errors
    ///
    /// See [`SelectionPipeline::select`].
    pub fn select_tracks(&self, tracks: Vec<Track>, criteria: &SelectionCriteria) -> Result<Selection, ValidationError> {
        self.run(tracks, criteria, None)
    }

    /// Like [`SelectionPipeline::select_tracks`], but the genre gate reads
    /// `index` instead of looking the artists up again.
    ///
    /// # Errors
    ///
    /// See [`SelectionPipeline::select`].
    pub fn select_tracks_with_index(
        &self,
        tracks: Vec<Track>,
        criteria: &SelectionCriteria,
        index: &ArtistGenreIndex,
    ) -> Result<Selection, ValidationError> {
        self.run(tracks, criteria, Some(index))
    }

    fn run(
        &self,
        tracks: Vec<Track>,
        criteria: &SelectionCriteria,
        index: Option<&ArtistGenreIndex>,
    ) -> Result<Selection, ValidationError> {
        criteria.validate()?;

        let mut report = SelectionReport {
            raw: tracks.len(),
            valid: tracks.len(),
            ..SelectionReport::default()
        };

        let scored = self.attach_familiarity(tracks, &mut report);

        let familiar: Vec<Track> = scored
            .into_iter()
            .filter(|track| track.familiarity >= criteria.familiarity_threshold)
            .collect();
        report.after_familiarity = familiar.len();
        info!(
            "{} of {} tracks meet familiarity >= {}",
            familiar.len(),
            report.valid,
            criteria.familiarity_threshold
        );

        let wanted = criteria.wanted_genres();
        let genre_gated = if wanted.is_empty() {
            familiar
        } else {
            self.apply_genre_gate(familiar, &wanted, index, &mut report)
        };

        let mood_outcome = mood::filter_by_features(&self.catalog, genre_gated, &criteria.mood, criteria.tolerance);
        report.passthrough_feature_batches = mood_outcome.passthrough_batches;
        report.after_mood = mood_outcome.tracks.len();

        if mood_outcome.tracks.is_empty() {
            info!("No tracks left after filtering; criteria should be relaxed");
        }

        Ok(Selection {
            tracks: mood_outcome.tracks,
            report,
        })
    }

    fn attach_familiarity(&self, mut tracks: Vec<Track>, report: &mut SelectionReport) -> Vec<Track> {
        if tracks.is_empty() {
            return tracks;
        }
        let scores = self
            .scorer
            .score(&self.catalog, tracks.iter().map(|track| track.id.as_str()));
        report.familiarity_degraded = scores.degraded;
        for track in &mut tracks {
            track.familiarity = scores.get(&track.id);
        }
        tracks
    }

    fn apply_genre_gate(
        &self,
        mut tracks: Vec<Track>,
        wanted: &[String],
        known: Option<&ArtistGenreIndex>,
        report: &mut SelectionReport,
    ) -> Vec<Track> {
        if tracks.is_empty() {
            report.after_genre = Some(0);
            return tracks;
        }

        let resolved;
        let index = match known {
            Some(index) => index,
            None => {
                resolved = genre::resolve_artist_genres(&self.catalog, &tracks);
                &resolved
            }
        };
        report.skipped_artist_batches = index.failed_batches;
        for track in &mut tracks {
            track.genres = genre::track_genres(track, index);
        }

        let matched = tracks.iter().filter(|track| genre::matches_any(&track.genres, wanted)).count();
        if matched == 0 {
            warn!(
                "None of {} tracks match genres {:?}; ignoring the genre filter",
                tracks.len(),
                wanted
            );
            report.genre_filter_relaxed = true;
            report.after_genre = Some(tracks.len());
            return tracks;
        }

        let kept: Vec<Track> = tracks
            .into_iter()
            .filter(|track| genre::matches_any(&track.genres, wanted))
            .collect();
        info!("{} tracks match the chosen genres", kept.len());
        report.after_genre = Some(kept.len());
        kept
    }
}
