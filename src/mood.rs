//! # Mood Filtering
//!
//! A [`MoodTarget`] names desired values for any subset of the six audio
//! features. A track matches when every constrained feature it actually has
//! lies within `tolerance` of the target. Missing values never reject a track.
//!
//! [`filter_by_features`] applies the match to a track list, fetching feature
//! vectors it does not already have in batches of [`FEATURE_BATCH`]. When a
//! batch lookup fails the whole batch passes through unfiltered: recall over
//! precision.

use crate::catalog::{AudioFeatures, Catalog, Feature, Track, FEATURE_BATCH};
use crate::error::ValidationError;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Default allowed deviation from a target value.
pub const DEFAULT_TOLERANCE: f64 = 0.3;

/// Desired feature values. Absent features are unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoodTarget(BTreeMap<Feature, f64>);

impl MoodTarget {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The neutral starting point of the mood sliders.
    #[must_use]
    pub fn slider_defaults() -> Self {
        Self::new()
            .with(Feature::Valence, 0.5)
            .with(Feature::Energy, 0.5)
            .with(Feature::Danceability, 0.5)
            .with(Feature::Acousticness, 0.3)
            .with(Feature::Instrumentalness, 0.1)
            .with(Feature::Liveness, 0.2)
    }

    #[must_use]
    pub fn with(mut self, feature: Feature, value: f64) -> Self {
        self.0.insert(feature, value);
        self
    }

    pub fn set(&mut self, feature: Feature, value: f64) {
        self.0.insert(feature, value);
    }

    #[must_use]
    pub fn get(&self, feature: Feature) -> Option<f64> {
        self.0.get(&feature).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        self.0.iter().map(|(feature, value)| (*feature, *value))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Fills every feature not already set from `other`.
    #[must_use]
    pub fn or(mut self, other: &MoodTarget) -> Self {
        for (feature, value) in other.iter() {
            self.0.entry(feature).or_insert(value);
        }
        self
    }

    /// # Errors
    ///
    /// Rejects any target outside `[0, 1]` (or NaN).
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (feature, value) in self.iter() {
            if !(0.0..=1.0).contains(&value) {
                return Err(ValidationError::TargetOutOfRange {
                    feature: feature.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Tolerance-band match of one feature vector against a target.
#[must_use]
pub fn features_match(features: &AudioFeatures, target: &MoodTarget, tolerance: f64) -> bool {
    target.iter().all(|(feature, wanted)| match features.get(feature) {
        Some(actual) => (actual - wanted).abs() <= tolerance,
        None => true,
    })
}

/// Whether `track` fits the mood. Tracks without a feature vector match.
#[must_use]
pub fn matches(track: &Track, target: &MoodTarget, tolerance: f64) -> bool {
    track
        .features
        .as_ref()
        .map_or(true, |features| features_match(features, target, tolerance))
}

/// Outcome of a batch filter pass.
#[derive(Debug, Clone, Default)]
pub struct MoodFilterOutcome {
    pub tracks: Vec<Track>,
    /// Batches that passed through unfiltered because the lookup failed.
    pub passthrough_batches: usize,
}

/// Filters `tracks` against `target`, preserving order.
///
/// Tracks that already carry features are not re-fetched. An empty target
/// short-circuits without any remote call since it accepts everything.
pub fn filter_by_features<C: Catalog>(
    catalog: &C,
    tracks: Vec<Track>,
    target: &MoodTarget,
    tolerance: f64,
) -> MoodFilterOutcome {
    if target.is_empty() {
        debug!("Empty mood target, keeping all {} tracks", tracks.len());
        return MoodFilterOutcome { tracks, passthrough_batches: 0 };
    }

    let total = tracks.len();
    let mut outcome = MoodFilterOutcome::default();
    let mut remaining = tracks.into_iter().peekable();
    let mut batch_no = 0;

    while remaining.peek().is_some() {
        batch_no += 1;
        let mut batch: Vec<Track> = remaining.by_ref().take(FEATURE_BATCH).collect();

        // A playlist may hold the same track twice; ask for it once.
        let mut seen = HashSet::new();
        let missing: Vec<String> = batch
            .iter()
            .filter(|track| track.features.is_none())
            .filter(|track| seen.insert(track.id.clone()))
            .map(|track| track.id.clone())
            .collect();

        if !missing.is_empty() {
            match catalog.audio_features(&missing) {
                Ok(vectors) => attach_features(&mut batch, &missing, vectors),
                Err(e) => {
                    warn!("Audio features unavailable for batch {batch_no}, keeping its {} tracks: {e}", batch.len());
                    outcome.passthrough_batches += 1;
                    outcome.tracks.extend(batch);
                    continue;
                }
            }
        }

        outcome
            .tracks
            .extend(batch.into_iter().filter(|track| matches(track, target, tolerance)));
    }

    info!(
        "Mood filter kept {} of {} tracks ({} batches unfiltered)",
        outcome.tracks.len(),
        total,
        outcome.passthrough_batches
    );
    outcome
}

/// Zips fetched vectors back onto the tracks they were requested for.
/// Every copy of a repeated id receives the same vector.
fn attach_features(batch: &mut [Track], requested: &[String], vectors: Vec<Option<AudioFeatures>>) {
    if vectors.len() != requested.len() {
        warn!(
            "Requested features for {} tracks but received {}",
            requested.len(),
            vectors.len()
        );
    }
    let by_id: HashMap<&str, AudioFeatures> = requested
        .iter()
        .zip(vectors)
        .filter_map(|(id, features)| features.map(|f| (id.as_str(), f)))
        .collect();

    for track in batch.iter_mut().filter(|track| track.features.is_none()) {
        track.features = by_id.get(track.id.as_str()).cloned();
    }
}
