//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per server endpoint. When API routes or
//! request formats change, update only this file.

use super::constants::REQUEST_TIMEOUT_SECS;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

/// HTTP test client with cookie-based session management
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
    /// The user id the client authenticated as (0 when unauthenticated)
    pub user_id: usize,
}

impl TestClient {
    /// Creates a new unauthenticated client.
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true) // Automatically handle session cookies
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url,
            user_id: 0,
        }
    }

    /// Creates a client authenticated through the simulated SSO endpoint.
    ///
    /// # Panics
    ///
    /// Panics if authentication fails (indicates test infrastructure
    /// problem).
    pub async fn authenticated(base_url: String, email: &str, display_name: &str) -> Self {
        Self::authenticated_with_attrs(base_url, email, display_name, None, None, None).await
    }

    /// Like `authenticated`, with course/year/faculty attributes set.
    pub async fn authenticated_with_attrs(
        base_url: String,
        email: &str,
        display_name: &str,
        course: Option<&str>,
        year: Option<u32>,
        faculty: Option<&str>,
    ) -> Self {
        let mut client = Self::new(base_url);

        let response = client
            .sso_login(&json!({
                "email": email,
                "display_name": display_name,
                "course": course,
                "year": year,
                "faculty": faculty,
            }))
            .await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::CREATED,
            "SSO authentication failed for {}",
            email
        );
        let body: Value = response.json().await.unwrap();
        client.user_id = body["user_id"].as_u64().unwrap() as usize;

        client
    }

    // ========================================================================
    // Authentication Endpoints
    // ========================================================================

    /// POST /v1/auth/sso
    pub async fn sso_login(&self, body: &Value) -> Response {
        self.client
            .post(format!("{}/v1/auth/sso", self.base_url))
            .json(body)
            .send()
            .await
            .unwrap()
    }

    /// GET /v1/auth/logout
    pub async fn logout(&self) -> Response {
        self.client
            .get(format!("{}/v1/auth/logout", self.base_url))
            .send()
            .await
            .unwrap()
    }

    // ========================================================================
    // Profile Endpoints
    // ========================================================================

    /// GET /v1/profile
    pub async fn get_profile(&self) -> Response {
        self.client
            .get(format!("{}/v1/profile", self.base_url))
            .send()
            .await
            .unwrap()
    }

    /// PUT /v1/profile/sync with a raw listening-data payload
    pub async fn sync_profile(&self, raw: &Value) -> Response {
        self.client
            .put(format!("{}/v1/profile/sync", self.base_url))
            .json(raw)
            .send()
            .await
            .unwrap()
    }

    /// PUT /v1/profile/sync with no body (synthetic source path)
    pub async fn sync_profile_empty(&self) -> Response {
        self.client
            .put(format!("{}/v1/profile/sync", self.base_url))
            .send()
            .await
            .unwrap()
    }

    /// PUT /v1/profile/privacy
    pub async fn set_privacy(&self, show_course: bool, show_year: bool, show_faculty: bool) -> Response {
        self.client
            .put(format!("{}/v1/profile/privacy", self.base_url))
            .json(&json!({
                "show_course": show_course,
                "show_year": show_year,
                "show_faculty": show_faculty,
            }))
            .send()
            .await
            .unwrap()
    }

    // ========================================================================
    // Match Endpoints
    // ========================================================================

    /// GET /v1/match/feed
    pub async fn get_feed(&self) -> Response {
        self.client
            .get(format!("{}/v1/match/feed", self.base_url))
            .send()
            .await
            .unwrap()
    }

    /// GET /v1/match/feed with filter query parameters
    pub async fn get_feed_filtered(&self, query: &[(&str, &str)]) -> Response {
        self.client
            .get(format!("{}/v1/match/feed", self.base_url))
            .query(query)
            .send()
            .await
            .unwrap()
    }

    /// POST /v1/match/swipe
    pub async fn swipe(&self, target_user_id: usize, action: &str) -> Response {
        self.client
            .post(format!("{}/v1/match/swipe", self.base_url))
            .json(&json!({
                "target_user_id": target_user_id,
                "action": action,
            }))
            .send()
            .await
            .unwrap()
    }

    /// GET /v1/match/matches
    pub async fn get_matches(&self) -> Response {
        self.client
            .get(format!("{}/v1/match/matches", self.base_url))
            .send()
            .await
            .unwrap()
    }

    /// GET /v1/match/matches/{id}
    pub async fn get_match_detail(&self, match_id: usize) -> Response {
        self.client
            .get(format!("{}/v1/match/matches/{}", self.base_url, match_id))
            .send()
            .await
            .unwrap()
    }

    // ========================================================================
    // Playlist Endpoints
    // ========================================================================

    /// POST /v1/playlist
    pub async fn create_playlist(&self, name: &str, member_ids: &[usize]) -> Response {
        self.client
            .post(format!("{}/v1/playlist", self.base_url))
            .json(&json!({
                "name": name,
                "member_ids": member_ids,
            }))
            .send()
            .await
            .unwrap()
    }

    /// GET /v1/playlist
    pub async fn list_playlists(&self) -> Response {
        self.client
            .get(format!("{}/v1/playlist", self.base_url))
            .send()
            .await
            .unwrap()
    }

    /// GET /v1/playlist/{id}
    pub async fn get_playlist(&self, playlist_id: &str) -> Response {
        self.client
            .get(format!("{}/v1/playlist/{}", self.base_url, playlist_id))
            .send()
            .await
            .unwrap()
    }

    /// DELETE /v1/playlist/{id}
    pub async fn delete_playlist(&self, playlist_id: &str) -> Response {
        self.client
            .delete(format!("{}/v1/playlist/{}", self.base_url, playlist_id))
            .send()
            .await
            .unwrap()
    }

    /// POST /v1/playlist/{id}/tracks
    pub async fn add_track(&self, playlist_id: &str, spotify_id: &str, name: &str, artist: &str) -> Response {
        self.client
            .post(format!("{}/v1/playlist/{}/tracks", self.base_url, playlist_id))
            .json(&json!({
                "spotify_id": spotify_id,
                "track_name": name,
                "artist": artist,
                "album": "Some Album",
            }))
            .send()
            .await
            .unwrap()
    }

    /// DELETE /v1/playlist/{id}/tracks/{spotify_id}
    pub async fn remove_track(&self, playlist_id: &str, spotify_id: &str) -> Response {
        self.client
            .delete(format!(
                "{}/v1/playlist/{}/tracks/{}",
                self.base_url, playlist_id, spotify_id
            ))
            .send()
            .await
            .unwrap()
    }

    /// POST /v1/playlist/{id}/members
    pub async fn add_member(&self, playlist_id: &str, user_id: usize) -> Response {
        self.client
            .post(format!("{}/v1/playlist/{}/members", self.base_url, playlist_id))
            .json(&json!({ "user_id": user_id }))
            .send()
            .await
            .unwrap()
    }

    /// DELETE /v1/playlist/{id}/members/{user_id}
    pub async fn remove_member(&self, playlist_id: &str, user_id: usize) -> Response {
        self.client
            .delete(format!(
                "{}/v1/playlist/{}/members/{}",
                self.base_url, playlist_id, user_id
            ))
            .send()
            .await
            .unwrap()
    }

    /// GET /v1/playlist/{id}/recap
    pub async fn get_recap(&self, playlist_id: &str) -> Response {
        self.client
            .get(format!("{}/v1/playlist/{}/recap", self.base_url, playlist_id))
            .send()
            .await
            .unwrap()
    }

    /// POST /v1/playlist/auto-create/{match_id}
    pub async fn auto_create_playlist(&self, match_id: usize) -> Response {
        self.client
            .post(format!(
                "{}/v1/playlist/auto-create/{}",
                self.base_url, match_id
            ))
            .send()
            .await
            .unwrap()
    }

    // ========================================================================
    // Chat Endpoints
    // ========================================================================

    /// GET /v1/chat/{match_id}
    pub async fn get_conversation(&self, match_id: usize) -> Response {
        self.client
            .get(format!("{}/v1/chat/{}", self.base_url, match_id))
            .send()
            .await
            .unwrap()
    }

    /// POST /v1/chat/{match_id} with a plain text message
    pub async fn send_text_message(&self, match_id: usize, content: &str) -> Response {
        self.client
            .post(format!("{}/v1/chat/{}", self.base_url, match_id))
            .json(&json!({ "content": content }))
            .send()
            .await
            .unwrap()
    }

    /// POST /v1/chat/{match_id} with an arbitrary message body
    pub async fn send_message_raw(&self, match_id: usize, body: &Value) -> Response {
        self.client
            .post(format!("{}/v1/chat/{}", self.base_url, match_id))
            .json(body)
            .send()
            .await
            .unwrap()
    }

    /// PUT /v1/chat/{match_id}/read
    pub async fn mark_read(&self, match_id: usize) -> Response {
        self.client
            .put(format!("{}/v1/chat/{}/read", self.base_url, match_id))
            .send()
            .await
            .unwrap()
    }

    /// GET /v1/chat/unread/count
    pub async fn unread_count(&self) -> Response {
        self.client
            .get(format!("{}/v1/chat/unread/count", self.base_url))
            .send()
            .await
            .unwrap()
    }
}
