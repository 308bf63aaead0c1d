//! # Familiarity Scoring
//!
//! Estimates how well the listener knows each track on a 0-100 scale from two
//! signals the catalog exposes:
//!
//! ```text
//! base  = min(plays_in_recent_window * 15, 60)
//! bonus = 40 if the track is in the short- or medium-term top tracks
//! score = min(base + bonus, 100)
//! ```
//!
//! ## Failure Policy
//!
//! If either history lookup fails, scoring does not abort. Every requested
//! track gets a score from the configured [`FamiliarityFallback`], which is
//! [`FamiliarityFallback::Random`] unless the user opted into a neutral value.
//! A discovery tool with shuffled familiarity is still usable; one that refuses
//! to run because the history endpoint hiccupped is not.

use crate::catalog::{Catalog, TimeRange, RECENT_PLAYS_LIMIT, TOP_TRACKS_LIMIT};
use crate::error::TransportError;
use log::{debug, info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Scoring parameters. The defaults reproduce the documented formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FamiliarityContext {
    pub points_per_play: u32,
    pub play_cap: u32,
    pub top_track_bonus: u32,
    pub recent_window: usize,
    pub top_window: usize,
}

impl Default for FamiliarityContext {
    fn default() -> Self {
        Self {
            points_per_play: 15,
            play_cap: 60,
            top_track_bonus: 40,
            recent_window: RECENT_PLAYS_LIMIT,
            top_window: TOP_TRACKS_LIMIT,
        }
    }
}

/// What to assign when listening history is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum FamiliarityFallback {
    /// Uniformly random in 0..=100 per track.
    #[default]
    Random,
    /// Same fixed score for every track (clamped to 100).
    Neutral(u8),
}

/// Listening history pulled from the catalog in one go.
#[derive(Debug, Clone, Default)]
pub struct ListeningHistory {
    /// Most recent plays, newest first, repeats kept.
    pub recent: Vec<String>,
    /// Union of the top-track windows.
    pub top: HashSet<String>,
}

impl ListeningHistory {
    /// Fetches the recent-play window and both top-track windows.
    ///
    /// # Errors
    ///
    /// Returns the first transport error; partial history is never returned.
    pub fn fetch<C: Catalog>(catalog: &C, context: &FamiliarityContext) -> Result<Self, TransportError> {
        let recent = catalog.recently_played(context.recent_window)?;
        let mut top = HashSet::new();
        for range in [TimeRange::ShortTerm, TimeRange::MediumTerm] {
            let ids = catalog.top_tracks(range, context.top_window)?;
            debug!("Fetched {} {} top tracks", ids.len(), range.as_str());
            top.extend(ids);
        }
        Ok(Self { recent, top })
    }
}

/// Result of a scoring pass.
#[derive(Debug, Clone, Default)]
pub struct FamiliarityScores {
    pub scores: HashMap<String, u8>,
    /// True when the fallback policy produced the scores.
    pub degraded: bool,
}

impl FamiliarityScores {
    /// Score for `track_id`, or 0 for ids that were never scored.
    #[must_use]
    pub fn get(&self, track_id: &str) -> u8 {
        self.scores.get(track_id).copied().unwrap_or(0)
    }
}

/// Pure score for one track given already-fetched history.
#[must_use]
pub fn score_track(
    track_id: &str,
    recent_counts: &HashMap<&str, u32>,
    top: &HashSet<String>,
    context: &FamiliarityContext,
) -> u8 {
    let plays = recent_counts.get(track_id).copied().unwrap_or(0);
    let base = plays.saturating_mul(context.points_per_play).min(context.play_cap);
    let bonus = if top.contains(track_id) { context.top_track_bonus } else { 0 };
    // Clamp in u32 before narrowing so odd contexts cannot wrap.
    base.saturating_add(bonus).min(100) as u8
}

/// Scores every id against a history snapshot.
#[must_use]
pub fn score_with_history<'a, I>(
    track_ids: I,
    history: &ListeningHistory,
    context: &FamiliarityContext,
) -> HashMap<String, u8>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut recent_counts: HashMap<&str, u32> = HashMap::new();
    for id in history.recent.iter().take(context.recent_window) {
        *recent_counts.entry(id.as_str()).or_insert(0) += 1;
    }

    track_ids
        .into_iter()
        .map(|id| (id.to_string(), score_track(id, &recent_counts, &history.top, context)))
        .collect()
}

/// Computes familiarity for a batch of tracks with a single history fetch.
#[derive(Debug, Clone, Default)]
pub struct FamiliarityScorer {
    context: FamiliarityContext,
    fallback: FamiliarityFallback,
}

impl FamiliarityScorer {
    #[must_use]
    pub fn new(context: FamiliarityContext, fallback: FamiliarityFallback) -> Self {
        Self { context, fallback }
    }

    #[must_use]
    pub fn with_fallback(fallback: FamiliarityFallback) -> Self {
        Self::new(FamiliarityContext::default(), fallback)
    }

    #[must_use]
    pub fn fallback(&self) -> FamiliarityFallback {
        self.fallback
    }

    /// Scores `track_ids`, falling back per policy when history is unavailable.
    pub fn score<'a, C, I>(&self, catalog: &C, track_ids: I) -> FamiliarityScores
    where
        C: Catalog,
        I: IntoIterator<Item = &'a str>,
    {
        self.score_with_rng(catalog, track_ids, &mut rand::thread_rng())
    }

    /// As [`FamiliarityScorer::score`], drawing fallback scores from `rng`.
    pub fn score_with_rng<'a, C, I, R>(&self, catalog: &C, track_ids: I, rng: &mut R) -> FamiliarityScores
    where
        C: Catalog,
        I: IntoIterator<Item = &'a str>,
        R: Rng,
    {
        match ListeningHistory::fetch(catalog, &self.context) {
            Ok(history) => {
                let scores = score_with_history(track_ids, &history, &self.context);
                info!(
                    "Scored {} tracks against {} recent plays and {} top tracks",
                    scores.len(),
                    history.recent.len(),
                    history.top.len()
                );
                FamiliarityScores { scores, degraded: false }
            }
            Err(e) => {
                warn!("Listening history unavailable, using {:?} familiarity: {e}", self.fallback);
                let scores = track_ids
                    .into_iter()
                    .map(|id| (id.to_string(), fallback_score(self.fallback, rng)))
                    .collect();
                FamiliarityScores { scores, degraded: true }
            }
        }
    }
}

fn fallback_score<R: Rng>(fallback: FamiliarityFallback, rng: &mut R) -> u8 {
    match fallback {
        FamiliarityFallback::Random => rng.gen_range(0..=100),
        FamiliarityFallback::Neutral(value) => value.min(100),
    }
}
