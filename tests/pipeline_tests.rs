//! # Integration Tests for EchoMood
//!
//! Drives the public API end to end against an in-memory catalog: fetching,
//! familiarity scoring, genre and mood filtering, publishing and the session
//! page flow, including the failure paths that degrade instead of erroring.

mod common;

use common::FakeCatalog;
use echomood::catalog::{CatalogItem, Feature, Track, ARTIST_BATCH};
use echomood::error::{PublishError, TransportError, ValidationError};
use echomood::familiarity::{FamiliarityFallback, FamiliarityScorer};
use echomood::fetch::{self, TrackSource};
use echomood::genre;
use echomood::mood::{self, MoodTarget};
use echomood::pipeline::{SelectionCriteria, SelectionPipeline};
use echomood::publisher::{PlaylistPublisher, PlaylistSpec};
use echomood::session::{Page, Session};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

fn tracks_of(catalog: &FakeCatalog) -> Vec<Track> {
    catalog.saved.iter().cloned().filter_map(Track::from_item).collect()
}

fn ids(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{prefix}{i}")).collect()
}

#[test]
fn test_familiarity_from_history() {
    let mut catalog = FakeCatalog::new();
    catalog.recent = vec!["twice", "twice", "often", "often", "often", "often", "often", "both"]
        .into_iter()
        .map(String::from)
        .collect();
    catalog.top = vec!["both".to_string(), "top-only".to_string()];

    let scores = FamiliarityScorer::default().score(&catalog, ["twice", "often", "both", "top-only", "never"]);

    assert!(!scores.degraded);
    assert_eq!(scores.get("twice"), 30, "two plays at 15 points each");
    assert_eq!(scores.get("often"), 60, "play points cap at 60");
    assert_eq!(scores.get("both"), 55, "one play plus the top-track bonus");
    assert_eq!(scores.get("top-only"), 40);
    assert_eq!(scores.get("never"), 0);
}

#[test]
fn test_familiarity_never_exceeds_hundred() {
    let mut catalog = FakeCatalog::new();
    catalog.recent = vec!["hit".to_string(); 50];
    catalog.top = vec!["hit".to_string()];

    let scores = FamiliarityScorer::default().score(&catalog, ["hit"]);
    assert_eq!(scores.get("hit"), 100);
}

#[test]
fn test_history_failure_uses_random_fallback() {
    let catalog = FakeCatalog {
        fail_history: true,
        ..FakeCatalog::new()
    };
    let track_ids = ids("t", 200);
    let mut rng = StdRng::seed_from_u64(7);

    let scores = FamiliarityScorer::default().score_with_rng(&catalog, track_ids.iter().map(String::as_str), &mut rng);

    assert!(scores.degraded);
    assert_eq!(scores.scores.len(), 200);
    assert!(scores.scores.values().all(|score| *score <= 100));
    let distinct: HashSet<u8> = scores.scores.values().copied().collect();
    assert!(distinct.len() > 1, "random fallback should not be constant");
}

#[test]
fn test_history_failure_with_neutral_fallback() {
    let catalog = FakeCatalog {
        fail_history: true,
        ..FakeCatalog::new()
    };
    let scorer = FamiliarityScorer::with_fallback(FamiliarityFallback::Neutral(50));
    let scores = scorer.score(&catalog, ["a", "b"]);
    assert!(scores.degraded);
    assert_eq!(scores.get("a"), 50);
    assert_eq!(scores.get("b"), 50);
}

#[test]
fn test_selection_keeps_familiar_tracks_in_order() {
    // A: top track with 3 plays (85), B: 2 plays (30), C: top track with 4 plays (100).
    let mut catalog = FakeCatalog::new();
    catalog.saved = vec![
        CatalogItem::new("A", "Alpha", &[("x", "X")]),
        CatalogItem::new("B", "Bravo", &[("y", "Y")]),
        CatalogItem::new("C", "Charlie", &[("z", "Z")]),
    ];
    catalog.recent = ["A", "A", "A", "B", "B", "C", "C", "C", "C"].iter().map(|s| s.to_string()).collect();
    catalog.top = vec!["A".to_string(), "C".to_string()];

    let pipeline = SelectionPipeline::new(&catalog, FamiliarityScorer::default());
    let criteria = SelectionCriteria {
        familiarity_threshold: 50,
        ..SelectionCriteria::default()
    };
    let selection = pipeline.select(catalog.saved.clone(), &criteria).unwrap();

    assert_eq!(selection.track_ids(), vec!["A", "C"]);
    assert_eq!(selection.tracks[0].familiarity, 85);
    assert_eq!(selection.tracks[1].familiarity, 100);
    assert_eq!(selection.report.after_familiarity, 2);
    assert!(selection.report.after_genre.is_none());
    assert!(catalog.feature_calls.borrow().is_empty(), "empty mood target needs no features");
    assert!(catalog.artist_calls.borrow().is_empty(), "no genres chosen, no artist lookups");
}

#[test]
fn test_select_drops_malformed_rows() {
    let catalog = FakeCatalog::new();
    let raw = vec![
        CatalogItem::new("ok", "Fine", &[("a", "A")]),
        CatalogItem { track: None },
        CatalogItem::new("", "No id", &[]),
        CatalogItem::new("noname", "  ", &[]),
    ];
    let pipeline = SelectionPipeline::new(&catalog, FamiliarityScorer::default());
    let selection = pipeline.select(raw, &SelectionCriteria::default()).unwrap();

    assert_eq!(selection.track_ids(), vec!["ok"]);
    assert_eq!(selection.report.raw, 4);
    assert_eq!(selection.report.valid, 1);
}

#[test]
fn test_invalid_criteria_are_rejected_before_any_call() {
    let catalog = FakeCatalog::with_saved_tracks(3, "rock");
    let pipeline = SelectionPipeline::new(&catalog, FamiliarityScorer::default());
    let criteria = SelectionCriteria {
        tolerance: 1.5,
        ..SelectionCriteria::default()
    };

    let err = pipeline.select_tracks(tracks_of(&catalog), &criteria).unwrap_err();
    assert_eq!(err, ValidationError::ToleranceOutOfRange(1.5));
    assert_eq!(catalog.history_calls.get(), 0);
}

#[test]
fn test_genre_filter_fails_open() {
    let catalog = FakeCatalog::with_saved_tracks(10, "rock");
    let pipeline = SelectionPipeline::new(&catalog, FamiliarityScorer::default());
    let criteria = SelectionCriteria {
        genres: vec!["jazz".to_string()],
        ..SelectionCriteria::default()
    };

    let selection = pipeline.select_tracks(tracks_of(&catalog), &criteria).unwrap();

    assert_eq!(selection.tracks.len(), 10, "no match means the filter is lifted");
    assert!(selection.report.genre_filter_relaxed);
}

#[test]
fn test_genre_filter_matches_any_case_insensitively() {
    let mut catalog = FakeCatalog::with_saved_tracks(4, "rock");
    catalog.artist_genres.insert("a1".to_string(), vec!["Indie Pop".to_string()]);
    catalog.artist_genres.insert("a3".to_string(), vec!["jazz".to_string()]);
    let pipeline = SelectionPipeline::new(&catalog, FamiliarityScorer::default());
    let criteria = SelectionCriteria {
        genres: vec!["indie pop".to_string(), "JAZZ".to_string()],
        ..SelectionCriteria::default()
    };

    let selection = pipeline.select_tracks(tracks_of(&catalog), &criteria).unwrap();

    assert_eq!(selection.track_ids(), vec!["t1", "t3"]);
    assert_eq!(selection.report.after_genre, Some(2));
    assert!(!selection.report.genre_filter_relaxed);
}

#[test]
fn test_artist_lookups_are_batched() {
    let catalog = FakeCatalog::with_saved_tracks(120, "rock");
    let index = genre::resolve_artist_genres(&catalog, &tracks_of(&catalog));

    let sizes: Vec<usize> = catalog.artist_calls.borrow().iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![ARTIST_BATCH, ARTIST_BATCH, 20]);
    assert_eq!(index.len(), 120);
    assert_eq!(index.vocabulary(30), vec!["rock"]);
}

#[test]
fn test_failed_artist_batch_is_skipped() {
    let mut catalog = FakeCatalog::with_saved_tracks(120, "rock");
    catalog.fail_artist_calls.insert(0);

    let index = genre::resolve_artist_genres(&catalog, &tracks_of(&catalog));

    assert_eq!(index.failed_batches, 1);
    assert_eq!(index.len(), 70);
    assert!(index.genres_of("a0").is_empty());
    assert_eq!(index.genres_of("a100"), ["rock"]);
}

#[test]
fn test_vocabulary_ranks_by_artist_count() {
    let mut catalog = FakeCatalog::with_saved_tracks(5, "rock");
    catalog.artist_genres.insert("a0".to_string(), vec!["pop".to_string(), "rock".to_string()]);
    catalog.artist_genres.insert("a1".to_string(), vec!["pop".to_string()]);
    catalog.artist_genres.insert("a2".to_string(), vec!["ambient".to_string()]);

    let vocabulary = genre::resolve_vocabulary(&catalog, &tracks_of(&catalog));
    assert_eq!(vocabulary, vec!["rock", "pop", "ambient"]);
}

#[test]
fn test_failed_feature_batch_passes_through() {
    let mut catalog = FakeCatalog::with_saved_tracks(150, "rock");
    for id in ids("t", 150) {
        catalog.set_energy(&id, 0.0);
    }
    catalog.fail_feature_calls.insert(0);
    let target = MoodTarget::new().with(Feature::Energy, 1.0);

    let outcome = mood::filter_by_features(&catalog, tracks_of(&catalog), &target, 0.1);

    assert_eq!(outcome.passthrough_batches, 1);
    assert_eq!(outcome.tracks.len(), 100, "the failed batch is kept whole, the rest is filtered");
    assert_eq!(outcome.tracks[0].id, "t0");
    assert_eq!(outcome.tracks[99].id, "t99");
    let sizes: Vec<usize> = catalog.feature_calls.borrow().iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![100, 50]);
}

#[test]
fn test_mood_filter_tolerance_band() {
    let mut catalog = FakeCatalog::with_saved_tracks(4, "rock");
    catalog.set_energy("t0", 0.5);
    catalog.set_energy("t1", 0.7);
    catalog.set_energy("t2", 0.9);
    // t3 has no analysis at all and is kept.
    let target = MoodTarget::new().with(Feature::Energy, 0.5);

    let outcome = mood::filter_by_features(&catalog, tracks_of(&catalog), &target, 0.3);

    let kept: Vec<&str> = outcome.tracks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(kept, vec!["t0", "t1", "t3"]);
    assert_eq!(outcome.passthrough_batches, 0);
}

#[test]
fn test_repeated_track_is_filtered_on_every_copy() {
    let mut catalog = FakeCatalog::new();
    catalog.set_energy("dup", 0.0);
    let item = CatalogItem::new("dup", "Twice", &[("x", "X")]);
    let tracks: Vec<Track> = vec![item.clone(), item].into_iter().filter_map(Track::from_item).collect();
    let target = MoodTarget::new().with(Feature::Energy, 1.0);

    let outcome = mood::filter_by_features(&catalog, tracks, &target, 0.1);

    assert!(outcome.tracks.is_empty(), "energy 0.0 is outside 1.0 +/- 0.1 for both copies");
    assert_eq!(*catalog.feature_calls.borrow(), vec![vec!["dup".to_string()]]);
}

#[test]
fn test_select_with_history_down_uses_neutral_scores() {
    let catalog = FakeCatalog {
        fail_history: true,
        ..FakeCatalog::with_saved_tracks(6, "rock")
    };
    let pipeline = SelectionPipeline::new(&catalog, FamiliarityScorer::with_fallback(FamiliarityFallback::Neutral(50)));

    let at_neutral = SelectionCriteria {
        familiarity_threshold: 50,
        ..SelectionCriteria::default()
    };
    let selection = pipeline.select_tracks(tracks_of(&catalog), &at_neutral).unwrap();
    assert!(selection.report.familiarity_degraded);
    assert!(selection.report.degraded());
    assert_eq!(selection.tracks.len(), 6);
    assert!(selection.tracks.iter().all(|track| track.familiarity == 50));

    let above_neutral = SelectionCriteria {
        familiarity_threshold: 51,
        ..SelectionCriteria::default()
    };
    let selection = pipeline.select_tracks(tracks_of(&catalog), &above_neutral).unwrap();
    assert!(selection.report.familiarity_degraded);
    assert!(selection.is_empty());
    assert_eq!(selection.report.after_familiarity, 0);
}

#[test]
fn test_select_with_artist_lookup_down_relaxes_genre_filter() {
    let mut catalog = FakeCatalog::with_saved_tracks(10, "rock");
    catalog.fail_artist_calls.insert(0);
    let pipeline = SelectionPipeline::new(&catalog, FamiliarityScorer::default());
    let criteria = SelectionCriteria {
        genres: vec!["rock".to_string()],
        ..SelectionCriteria::default()
    };

    let selection = pipeline.select_tracks(tracks_of(&catalog), &criteria).unwrap();

    assert_eq!(selection.report.skipped_artist_batches, 1);
    assert!(selection.report.genre_filter_relaxed, "nothing resolved, so nothing can match");
    assert!(selection.report.degraded());
    assert_eq!(selection.tracks.len(), 10);
}

#[test]
fn test_select_with_one_artist_batch_down_filters_the_rest() {
    let mut catalog = FakeCatalog::with_saved_tracks(60, "rock");
    catalog.fail_artist_calls.insert(0);
    let pipeline = SelectionPipeline::new(&catalog, FamiliarityScorer::default());
    let criteria = SelectionCriteria {
        genres: vec!["rock".to_string()],
        ..SelectionCriteria::default()
    };

    let selection = pipeline.select_tracks(tracks_of(&catalog), &criteria).unwrap();

    assert_eq!(selection.report.skipped_artist_batches, 1);
    assert!(!selection.report.genre_filter_relaxed);
    assert_eq!(selection.report.after_genre, Some(10));
    assert_eq!(selection.tracks[0].id, "t50");
}

#[test]
fn test_select_with_feature_batch_down_reports_passthrough() {
    let mut catalog = FakeCatalog::with_saved_tracks(150, "rock");
    for id in ids("t", 150) {
        catalog.set_energy(&id, 0.0);
    }
    catalog.fail_feature_calls.insert(1);
    let pipeline = SelectionPipeline::new(&catalog, FamiliarityScorer::default());
    let criteria = SelectionCriteria {
        mood: MoodTarget::new().with(Feature::Energy, 1.0),
        tolerance: 0.1,
        ..SelectionCriteria::default()
    };

    let selection = pipeline.select_tracks(tracks_of(&catalog), &criteria).unwrap();

    assert_eq!(selection.report.passthrough_feature_batches, 1);
    assert!(selection.report.degraded());
    assert_eq!(selection.report.after_mood, 50, "only the unfiltered second batch survives");
    assert_eq!(selection.tracks[0].id, "t100");
    assert!(!selection.report.familiarity_degraded);
    assert_eq!(selection.report.skipped_artist_batches, 0);
}

#[test]
fn test_publish_shuffled_subset() {
    let catalog = FakeCatalog::new();
    let input = ids("t", 20);
    let spec = PlaylistSpec {
        size: 5,
        ..PlaylistSpec::new("Evening")
    };
    let publisher = PlaylistPublisher::new(&catalog);

    for seed in 0..10 {
        catalog.add_calls.borrow_mut().clear();
        let published = publisher
            .publish_with_rng(&spec, &input, &mut StdRng::seed_from_u64(seed))
            .unwrap();

        let added = catalog.added_ids();
        let unique: HashSet<&String> = added.iter().collect();
        assert_eq!(added.len(), 5);
        assert_eq!(unique.len(), 5);
        assert!(added.iter().all(|id| input.contains(id)));
        assert_eq!(published.track_ids, added);
        assert!(catalog.add_sizes().iter().all(|size| *size <= 100));
    }
}

#[test]
fn test_publish_adds_in_batches_of_hundred() {
    let catalog = FakeCatalog::new();
    let spec = PlaylistSpec {
        size: 250,
        shuffle: false,
        ..PlaylistSpec::new("Long")
    };
    let publisher = PlaylistPublisher::new(&catalog).with_max_size(300);

    let published = publisher.publish(&spec, &ids("t", 250)).unwrap();

    assert_eq!(catalog.add_sizes(), vec![100, 100, 50]);
    assert_eq!(published.batches, 3);
    assert_eq!(published.track_ids, ids("t", 250), "unshuffled order is kept");
    let created = catalog.created.borrow();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].0, "listener");
    assert!(!created[0].2, "playlists are private by default");
}

#[test]
fn test_publish_caps_at_max_playlist_size() {
    let catalog = FakeCatalog::new();
    let spec = PlaylistSpec {
        size: 80,
        ..PlaylistSpec::new("Capped")
    };

    let published = PlaylistPublisher::new(&catalog).publish(&spec, &ids("t", 120)).unwrap();
    assert_eq!(published.track_ids.len(), 50);
}

#[test]
fn test_publish_validation_happens_before_remote_calls() {
    let catalog = FakeCatalog::new();
    let publisher = PlaylistPublisher::new(&catalog);

    let blank = publisher.publish(&PlaylistSpec::new("  "), &ids("t", 3));
    assert!(matches!(blank, Err(PublishError::Validation(ValidationError::EmptyPlaylistName))));

    let empty = publisher.publish(&PlaylistSpec::new("Nothing"), &[]);
    assert!(matches!(empty, Err(PublishError::Validation(ValidationError::NoTracksToPublish))));

    assert!(catalog.created.borrow().is_empty());
}

#[test]
fn test_create_failure_is_hard() {
    let catalog = FakeCatalog {
        fail_create: true,
        ..FakeCatalog::new()
    };
    let result = PlaylistPublisher::new(&catalog).publish(&PlaylistSpec::new("x"), &ids("t", 3));

    assert!(matches!(result, Err(PublishError::Create(_))));
    assert!(catalog.add_calls.borrow().is_empty());
}

#[test]
fn test_add_failure_reports_partial_playlist() {
    let mut catalog = FakeCatalog::new();
    catalog.fail_add_calls.insert(1);
    let spec = PlaylistSpec {
        size: 250,
        ..PlaylistSpec::new("Partial")
    };

    let result = PlaylistPublisher::new(&catalog)
        .with_max_size(250)
        .publish(&spec, &ids("t", 250));

    match result {
        Err(PublishError::Incomplete {
            playlist,
            added,
            requested,
            ..
        }) => {
            assert_eq!(playlist.id, "pl0");
            assert_eq!(added, 100);
            assert_eq!(requested, 250);
        }
        other => panic!("expected an incomplete publish, got {other:?}"),
    }
    assert_eq!(catalog.add_sizes(), vec![100], "no further batches after a failure");
}

#[test]
fn test_fetch_saved_tracks_pages_until_short_page() {
    let mut catalog = FakeCatalog::with_saved_tracks(120, "rock");
    catalog.saved.push(CatalogItem { track: None });
    let mut progress = Vec::new();

    let tracks = fetch::fetch_saved_tracks(&catalog, |loaded, total| progress.push((loaded, total))).unwrap();

    assert_eq!(tracks.len(), 120);
    assert_eq!(
        *catalog.listing_calls.borrow(),
        vec![(0, 1), (0, 50), (50, 50), (100, 50)]
    );
    assert_eq!(progress.last(), Some(&(121, 121)));
}

#[test]
fn test_fetch_playlist_pages_of_hundred() {
    let mut catalog = FakeCatalog::new();
    let rows: Vec<CatalogItem> = (0..100).map(|i| CatalogItem::new(&format!("p{i}"), "Song", &[])).collect();
    catalog.playlists.insert("abc".to_string(), rows);

    let tracks = fetch::fetch_tracks(&catalog, &TrackSource::Playlist("abc".to_string()), |_, _| {}).unwrap();

    assert_eq!(tracks.len(), 100);
    assert_eq!(*catalog.listing_calls.borrow(), vec![(0, 100), (100, 100)]);
}

#[test]
fn test_fetch_empty_library_makes_one_size_request() {
    let catalog = FakeCatalog::new();
    let tracks = fetch::fetch_saved_tracks(&catalog, |_, _| {}).unwrap();
    assert!(tracks.is_empty());
    assert_eq!(*catalog.listing_calls.borrow(), vec![(0, 1)]);
}

#[test]
fn test_fetch_failure_propagates() {
    let catalog = FakeCatalog {
        fail_listing: true,
        ..FakeCatalog::with_saved_tracks(5, "rock")
    };
    let result = fetch::fetch_saved_tracks(&catalog, |_, _| {});
    assert!(matches!(result, Err(TransportError::Status { status: 503, .. })));
}

#[test]
fn test_session_walks_every_page() {
    let catalog = FakeCatalog::with_saved_tracks(30, "rock");
    let mut session = Session::new(&catalog, FamiliarityScorer::default()).with_description("test run");
    assert_eq!(session.page(), Page::FetchMusic);

    let count = session.fetch(&TrackSource::SavedTracks, |_, _| {}).unwrap();
    assert_eq!(count, 30);
    assert_eq!(session.page(), Page::MoodAndGenre);
    assert_eq!(session.genre_choices(), ["rock"]);

    let selection = session.apply(SelectionCriteria::default()).unwrap();
    assert_eq!(selection.tracks.len(), 30);
    assert_eq!(session.page(), Page::PlaylistDetails);

    let published = session.publish(&PlaylistSpec::new("Session")).unwrap();
    assert_eq!(published.track_ids.len(), 20);
    assert_eq!(session.page(), Page::PlaylistCreated);
    assert_eq!(catalog.created.borrow()[0].3, "test run");

    session.create_another();
    assert_eq!(session.page(), Page::MoodAndGenre);
    assert_eq!(session.tracks().len(), 30, "create another keeps the fetched tracks");

    session.start_over();
    assert_eq!(session.page(), Page::FetchMusic);
    assert!(session.tracks().is_empty());
    assert!(session.selection().is_none());
}

#[test]
fn test_session_resolves_artists_once_per_listing() {
    let catalog = FakeCatalog::with_saved_tracks(60, "rock");
    let mut session = Session::new(&catalog, FamiliarityScorer::default());
    session.fetch(&TrackSource::SavedTracks, |_, _| {}).unwrap();
    let criteria = SelectionCriteria {
        genres: vec!["rock".to_string()],
        ..SelectionCriteria::default()
    };

    assert_eq!(session.genre_choices(), ["rock"]);
    assert_eq!(session.apply(criteria.clone()).unwrap().tracks.len(), 60);
    session.create_another();
    session.apply(criteria.clone()).unwrap();
    assert_eq!(catalog.artist_calls.borrow().len(), 2, "two batches of 50, looked up once");

    session.fetch(&TrackSource::SavedTracks, |_, _| {}).unwrap();
    session.apply(criteria).unwrap();
    assert_eq!(catalog.artist_calls.borrow().len(), 4, "a new listing is looked up again");
}

#[test]
fn test_session_genre_choices_and_gate_share_lookups() {
    let mut catalog = FakeCatalog::with_saved_tracks(60, "rock");
    catalog.fail_artist_calls.insert(0);
    let mut session = Session::new(&catalog, FamiliarityScorer::default());
    session.fetch(&TrackSource::SavedTracks, |_, _| {}).unwrap();

    assert_eq!(session.genre_choices(), ["rock"]);
    let selection = session
        .apply(SelectionCriteria {
            genres: vec!["rock".to_string()],
            ..SelectionCriteria::default()
        })
        .unwrap();

    assert_eq!(selection.report.skipped_artist_batches, 1);
    assert_eq!(selection.tracks.len(), 10, "the gate sees the same skipped batch as the choices");
    assert_eq!(catalog.artist_calls.borrow().len(), 2);
}

#[test]
fn test_session_stays_on_page_when_nothing_matches() {
    let mut catalog = FakeCatalog::with_saved_tracks(5, "rock");
    for id in ids("t", 5) {
        catalog.set_energy(&id, 0.0);
    }
    let mut session = Session::new(&catalog, FamiliarityScorer::default());
    session.fetch(&TrackSource::SavedTracks, |_, _| {}).unwrap();

    let criteria = SelectionCriteria {
        mood: MoodTarget::new().with(Feature::Energy, 1.0),
        tolerance: 0.1,
        ..SelectionCriteria::default()
    };
    let selection = session.apply(criteria).unwrap();
    assert!(selection.is_empty());
    assert_eq!(session.page(), Page::MoodAndGenre);
}

#[test]
fn test_session_publish_failure_stays_on_details() {
    let catalog = FakeCatalog {
        fail_create: true,
        ..FakeCatalog::with_saved_tracks(5, "rock")
    };
    let mut session = Session::new(&catalog, FamiliarityScorer::default());
    session.fetch(&TrackSource::SavedTracks, |_, _| {}).unwrap();
    session.apply(SelectionCriteria::default()).unwrap();

    assert!(session.publish(&PlaylistSpec::new("x")).is_err());
    assert_eq!(session.page(), Page::PlaylistDetails);

    session.back();
    assert_eq!(session.page(), Page::MoodAndGenre);
}

#[test]
fn test_failed_fetch_stays_on_first_page() {
    let catalog = FakeCatalog {
        fail_listing: true,
        ..FakeCatalog::new()
    };
    let mut session = Session::new(&catalog, FamiliarityScorer::default());
    assert!(session.fetch(&TrackSource::SavedTracks, |_, _| {}).is_err());
    assert_eq!(session.page(), Page::FetchMusic);
}
