//! # Spotify Web API Client
//!
//! Blocking [`Catalog`] implementation over the Spotify Web API. Requests carry
//! a bearer token obtained elsewhere (the OAuth dance is not this crate's job).
//!
//! Status handling:
//! - 401 becomes [`TransportError::Unauthorized`]
//! - any other non-2xx becomes [`TransportError::Status`] with the service's
//!   own error message when it sent one
//!
//! No retries. A 429 is reported like any other status.

use crate::catalog::{AudioFeatures, Catalog, CatalogItem, Page, PlaylistRef, TimeRange};
use crate::error::TransportError;
use log::{debug, trace};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.spotify.com/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct Paging<T> {
    items: Vec<T>,
    #[serde(default)]
    total: usize,
}

#[derive(Deserialize)]
struct UserProfile {
    id: String,
}

#[derive(Deserialize)]
struct PlaylistSummary {
    tracks: TrackTotal,
}

#[derive(Deserialize)]
struct TrackTotal {
    total: usize,
}

#[derive(Deserialize)]
struct ArtistsResponse {
    artists: Vec<Option<ArtistObject>>,
}

#[derive(Deserialize)]
struct ArtistObject {
    id: String,
    #[serde(default)]
    genres: Vec<String>,
}

#[derive(Deserialize)]
struct AudioFeaturesResponse {
    audio_features: Vec<Option<AudioFeatures>>,
}

#[derive(Deserialize)]
struct PlayHistory {
    track: Option<TrackId>,
}

#[derive(Deserialize)]
struct TrackId {
    id: Option<String>,
}

#[derive(Serialize)]
struct NewPlaylist<'a> {
    name: &'a str,
    public: bool,
    description: &'a str,
}

#[derive(Deserialize)]
struct CreatedPlaylist {
    id: String,
    #[serde(default)]
    external_urls: HashMap<String, String>,
}

#[derive(Serialize)]
struct AddItems {
    uris: Vec<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Spotify Web API client.
pub struct SpotifyClient {
    client: Client,
    api_base: String,
    access_token: String,
}

impl std::fmt::Debug for SpotifyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyClient")
            .field("api_base", &self.api_base)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl SpotifyClient {
    /// Client against the public API with the default timeout.
    ///
    /// # Errors
    ///
    /// Fails only if the HTTP client cannot be built (TLS backend missing).
    pub fn new(access_token: &str) -> Result<Self, TransportError> {
        Self::with_base(access_token, DEFAULT_API_BASE, DEFAULT_TIMEOUT)
    }

    /// # Errors
    ///
    /// Fails only if the HTTP client cannot be built.
    pub fn with_base(access_token: &str, api_base: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            access_token: access_token.trim().to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, TransportError> {
        let request = self.client.get(self.url(path)).query(query);
        self.send(path, request)
    }

    fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, TransportError> {
        let request = self.client.post(self.url(path)).json(body);
        self.send(path, request)
    }

    fn send<T: DeserializeOwned>(&self, endpoint: &str, request: RequestBuilder) -> Result<T, TransportError> {
        trace!("Catalog request {endpoint}");
        let response = request.bearer_auth(&self.access_token).send()?;
        let status = response.status();
        let body = response.text()?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(TransportError::Unauthorized);
        }
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
                message: error_message(&body),
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

/// The service's `{"error": {"message": ..}}` text, or the raw body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "no details".to_string()
            } else {
                trimmed.chars().take(200).collect()
            }
        }
    }
}

fn track_uri(track_id: &str) -> String {
    format!("spotify:track:{track_id}")
}

fn page_query(offset: usize, limit: usize) -> Vec<(&'static str, String)> {
    vec![("limit", limit.to_string()), ("offset", offset.to_string())]
}

impl Catalog for SpotifyClient {
    fn current_user_id(&self) -> Result<String, TransportError> {
        let profile: UserProfile = self.get("/me", &[])?;
        Ok(profile.id)
    }

    fn saved_tracks(&self, offset: usize, limit: usize) -> Result<Page<CatalogItem>, TransportError> {
        let paging: Paging<CatalogItem> = self.get("/me/tracks", &page_query(offset, limit))?;
        Ok(Page { items: paging.items, total: paging.total })
    }

    fn playlist_track_total(&self, playlist_id: &str) -> Result<usize, TransportError> {
        let summary: PlaylistSummary = self.get(
            &format!("/playlists/{playlist_id}"),
            &[("fields", "tracks.total".to_string())],
        )?;
        Ok(summary.tracks.total)
    }

    fn playlist_tracks(
        &self,
        playlist_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Page<CatalogItem>, TransportError> {
        let paging: Paging<CatalogItem> =
            self.get(&format!("/playlists/{playlist_id}/tracks"), &page_query(offset, limit))?;
        Ok(Page { items: paging.items, total: paging.total })
    }

    fn artists(&self, ids: &[String]) -> Result<HashMap<String, Vec<String>>, TransportError> {
        let response: ArtistsResponse = self.get("/artists", &[("ids", ids.join(","))])?;
        Ok(response
            .artists
            .into_iter()
            .flatten()
            .map(|artist| (artist.id, artist.genres))
            .collect())
    }

    fn audio_features(&self, ids: &[String]) -> Result<Vec<Option<AudioFeatures>>, TransportError> {
        let response: AudioFeaturesResponse = self.get("/audio-features", &[("ids", ids.join(","))])?;
        debug!("Received {} feature vectors for {} ids", response.audio_features.len(), ids.len());
        Ok(response.audio_features)
    }

    fn recently_played(&self, limit: usize) -> Result<Vec<String>, TransportError> {
        let paging: Paging<PlayHistory> =
            self.get("/me/player/recently-played", &[("limit", limit.to_string())])?;
        Ok(paging
            .items
            .into_iter()
            .filter_map(|play| play.track.and_then(|track| track.id))
            .collect())
    }

    fn top_tracks(&self, range: TimeRange, limit: usize) -> Result<Vec<String>, TransportError> {
        let paging: Paging<TrackId> = self.get(
            "/me/top/tracks",
            &[("time_range", range.as_str().to_string()), ("limit", limit.to_string())],
        )?;
        Ok(paging.items.into_iter().filter_map(|track| track.id).collect())
    }

    fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        public: bool,
        description: &str,
    ) -> Result<PlaylistRef, TransportError> {
        let created: CreatedPlaylist = self.post(
            &format!("/users/{user_id}/playlists"),
            &NewPlaylist { name, public, description },
        )?;
        let url = created
            .external_urls
            .get("spotify")
            .cloned()
            .unwrap_or_else(|| format!("https://open.spotify.com/playlist/{}", created.id));
        Ok(PlaylistRef { id: created.id, url })
    }

    fn add_tracks(&self, playlist_id: &str, track_ids: &[String]) -> Result<(), TransportError> {
        let body = AddItems {
            uris: track_ids.iter().map(|id| track_uri(id)).collect(),
        };
        let _snapshot: serde_json::Value = self.post(&format!("/playlists/{playlist_id}/tracks"), &body)?;
        Ok(())
    }
}
