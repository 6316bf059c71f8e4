use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::chat::{ChatManager, SqliteMessageStore};
use crate::matching::{MatchEngine, MatchingConfig, SqliteMatchStore};
use crate::playlist::{PlaylistManager, SqlitePlaylistStore};
use crate::profile::{ProfileSource, SqliteProfileStore};
use crate::user::{AuthToken, AuthTokenValue, NewUser, SqliteUserStore, UserStore};
use chrono::Utc;
use tower_http::services::ServeDir;

use axum::{
    body::Body,
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::session::{Session, COOKIE_SESSION_TOKEN_KEY};
use super::state::*;
use super::{chat_routes, log_requests, match_routes, playlist_routes, profile_routes};
use super::{RequestsLoggingLevel, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub session_token: Option<String>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(
    session: Option<Session>,
    axum::extract::State(state): axum::extract::State<ServerState>,
) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        session_token: session.map(|s| s.token),
    };
    Json(stats)
}

#[derive(Deserialize, Debug)]
struct SsoLoginBody {
    pub email: String,
    pub display_name: Option<String>,
    pub student_id: Option<String>,
    pub course: Option<String>,
    pub year: Option<u32>,
    pub faculty: Option<String>,
}

#[derive(Serialize)]
struct LoginSuccessResponse {
    token: String,
    user_id: usize,
}

/// Simulated institutional SSO: the identity provider is trusted to have
/// verified the email, so this endpoint finds or creates the account and
/// issues a session token.
async fn sso_login(
    axum::extract::State(users): axum::extract::State<GuardedUserStore>,
    Json(body): Json<SsoLoginBody>,
) -> Response {
    debug!("sso_login() called for {}", body.email);
    if body.email.is_empty() {
        return (StatusCode::BAD_REQUEST, "email is required").into_response();
    }

    let user = match users.get_user_by_email(&body.email) {
        Ok(Some(user)) => user,
        Ok(None) => {
            let display_name = body
                .display_name
                .clone()
                .unwrap_or_else(|| body.email.split('@').next().unwrap_or("student").to_string());
            let new_user = NewUser {
                email: body.email.clone(),
                display_name,
                student_id: body.student_id.clone(),
                course: body.course.clone(),
                year: body.year,
                faculty: body.faculty.clone(),
            };
            match users.create_user(&new_user).and_then(|id| {
                users
                    .get_user(id)?
                    .ok_or_else(|| anyhow::anyhow!("User {} vanished after creation", id))
            }) {
                Ok(user) => user,
                Err(err) => {
                    tracing::error!("Failed to create user: {}", err);
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
            }
        }
        Err(err) => {
            tracing::error!("Failed to look up user: {}", err);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let token = AuthToken {
        user_id: user.id,
        value: AuthTokenValue::generate(),
        created: Utc::now().timestamp(),
        last_used: None,
    };
    if let Err(err) = users.add_auth_token(token.clone()) {
        tracing::error!("Error with auth token generation: {}", err);
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let response_body = serde_json::to_string(&LoginSuccessResponse {
        token: token.value.0.clone(),
        user_id: user.id,
    })
    .unwrap();
    let cookie_value = HeaderValue::from_str(&format!(
        "{}={}; Path=/; HttpOnly",
        COOKIE_SESSION_TOKEN_KEY, token.value.0
    ))
    .unwrap();
    Response::builder()
        .status(StatusCode::CREATED)
        .header(axum::http::header::SET_COOKIE, cookie_value)
        .body(Body::from(response_body))
        .unwrap()
}

async fn logout(
    axum::extract::State(users): axum::extract::State<GuardedUserStore>,
    session: Session,
) -> Response {
    match users.delete_auth_token(&AuthTokenValue(session.token)) {
        Ok(()) => {
            // Max-Age=0 expires the cookie immediately.
            let cookie_value = HeaderValue::from_str(&format!(
                "{}=; Path=/; HttpOnly; Max-Age=0; SameSite=Lax",
                COOKIE_SESSION_TOKEN_KEY
            ))
            .unwrap();
            Response::builder()
                .status(StatusCode::OK)
                .header(axum::http::header::SET_COOKIE, cookie_value)
                .body(Body::empty())
                .unwrap()
        }
        Err(_) => StatusCode::BAD_REQUEST.into_response(),
    }
}

/// Wires the stores and managers into the full application router.
pub fn make_app(
    config: ServerConfig,
    users: Arc<SqliteUserStore>,
    profiles: Arc<SqliteProfileStore>,
    match_store: Arc<SqliteMatchStore>,
    playlist_store: Arc<SqlitePlaylistStore>,
    message_store: Arc<SqliteMessageStore>,
    profile_source: Arc<dyn ProfileSource>,
    matching_config: MatchingConfig,
) -> Result<Router> {
    let playlists = Arc::new(PlaylistManager::new(
        playlist_store,
        users.clone(),
        profiles.clone(),
    ));
    let engine = Arc::new(MatchEngine::new(
        matching_config,
        users.clone(),
        profiles.clone(),
        match_store.clone(),
        playlists.clone(),
    ));
    let chat = Arc::new(ChatManager::new(message_store, match_store));

    let state = ServerState {
        config: config.clone(),
        start_time: Instant::now(),
        hash: env!("GIT_HASH").to_string(),
        users,
        profiles,
        profile_source,
        engine,
        playlists,
        chat,
    };

    let auth_router: Router = Router::new()
        .route("/sso", post(sso_login))
        .route("/logout", get(logout))
        .with_state(state.clone());

    let profile_router: Router = Router::new()
        .route("/", get(profile_routes::get_own_profile))
        .route("/sync", put(profile_routes::sync_profile))
        .route("/privacy", put(profile_routes::set_privacy))
        .with_state(state.clone());

    let match_router: Router = Router::new()
        .route("/feed", get(match_routes::match_feed))
        .route("/swipe", post(match_routes::swipe))
        .route("/matches", get(match_routes::list_matches))
        .route("/matches/{id}", get(match_routes::match_detail))
        .with_state(state.clone());

    let playlist_router: Router = Router::new()
        .route("/", post(playlist_routes::create_playlist))
        .route("/", get(playlist_routes::list_playlists))
        .route("/{id}", get(playlist_routes::get_playlist))
        .route("/{id}", delete(playlist_routes::delete_playlist))
        .route("/{id}/tracks", post(playlist_routes::add_track))
        .route("/{id}/tracks/{spotify_id}", delete(playlist_routes::remove_track))
        .route("/{id}/members", post(playlist_routes::add_member))
        .route("/{id}/members/{user_id}", delete(playlist_routes::remove_member))
        .route("/{id}/recap", get(playlist_routes::get_recap))
        .route("/auto-create/{match_id}", post(playlist_routes::auto_create_for_match))
        .with_state(state.clone());

    let chat_router: Router = Router::new()
        .route("/unread/count", get(chat_routes::unread_count))
        .route("/{match_id}", get(chat_routes::get_conversation))
        .route("/{match_id}", post(chat_routes::send_message))
        .route("/{match_id}/read", put(chat_routes::read_messages))
        .with_state(state.clone());

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    let app: Router = home_router
        .nest("/v1/auth", auth_router)
        .nest("/v1/profile", profile_router)
        .nest("/v1/match", match_router)
        .nest("/v1/playlist", playlist_router)
        .nest("/v1/chat", chat_router)
        .layer(middleware::from_fn_with_state(state.clone(), log_requests));

    Ok(app)
}

#[allow(clippy::too_many_arguments)]
pub async fn run_server(
    users: Arc<SqliteUserStore>,
    profiles: Arc<SqliteProfileStore>,
    match_store: Arc<SqliteMatchStore>,
    playlist_store: Arc<SqlitePlaylistStore>,
    message_store: Arc<SqliteMessageStore>,
    profile_source: Arc<dyn ProfileSource>,
    matching_config: MatchingConfig,
    requests_logging_level: RequestsLoggingLevel,
    port: u16,
    frontend_dir_path: Option<String>,
    synthetic_profiles: bool,
) -> Result<()> {
    let config = ServerConfig {
        port,
        requests_logging_level,
        frontend_dir_path,
        synthetic_profiles,
    };
    let app = make_app(
        config,
        users,
        profiles,
        match_store,
        playlist_store,
        message_store,
        profile_source,
        matching_config,
    )?;

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;

    Ok(axum::serve(listener, app).await?)
}
