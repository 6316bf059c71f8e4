//! Test server lifecycle management
//!
//! Each test gets an isolated server on a random port with its own
//! temporary database directory. Dropping the handle shuts the server
//! down and removes the databases.

use musicmate_server::matching::MatchingConfig;
use musicmate_server::profile::{ProfileSource, SyntheticProfileSource};
use musicmate_server::server::{server::make_app, RequestsLoggingLevel, ServerConfig};
use musicmate_server::{
    SqliteMatchStore, SqliteMessageStore, SqlitePlaylistStore, SqliteProfileStore, SqliteUserStore,
};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Stores for direct database access in tests
    pub user_store: Arc<SqliteUserStore>,
    pub profile_store: Arc<SqliteProfileStore>,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port and waits for it to be
    /// ready.
    pub async fn spawn() -> Self {
        Self::spawn_with_config(|_| {}).await
    }

    /// Spawns a test server after letting the caller tweak the config.
    pub async fn spawn_with_config<F: FnOnce(&mut ServerConfig)>(customize: F) -> Self {
        let temp_db_dir = TempDir::new().expect("Failed to create temp db dir");

        let users = Arc::new(
            SqliteUserStore::new(temp_db_dir.path().join("users.db"))
                .expect("Failed to open user store"),
        );
        let profiles = Arc::new(
            SqliteProfileStore::new(temp_db_dir.path().join("profiles.db"))
                .expect("Failed to open profile store"),
        );
        let match_store = Arc::new(
            SqliteMatchStore::new(temp_db_dir.path().join("matching.db"))
                .expect("Failed to open match store"),
        );
        let playlist_store = Arc::new(
            SqlitePlaylistStore::new(temp_db_dir.path().join("playlists.db"))
                .expect("Failed to open playlist store"),
        );
        let message_store = Arc::new(
            SqliteMessageStore::new(temp_db_dir.path().join("chat.db"))
                .expect("Failed to open message store"),
        );
        let profile_source: Arc<dyn ProfileSource> = Arc::new(SyntheticProfileSource);

        let mut config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            ..ServerConfig::default()
        };
        customize(&mut config);

        let app = make_app(
            config,
            users.clone(),
            profiles.clone(),
            match_store,
            playlist_store,
            message_store,
            profile_source,
            MatchingConfig::default(),
        )
        .expect("Failed to build app");

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test port");
        let port = listener.local_addr().unwrap().port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Test server crashed");
        });

        let server = TestServer {
            base_url,
            port,
            user_store: users,
            profile_store: profiles,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };
        server.wait_until_ready().await;
        server
    }

    async fn wait_until_ready(&self) {
        let client = reqwest::Client::new();
        for _ in 0..50 {
            if let Ok(response) = client.get(&self.base_url).send().await {
                if response.status().is_success() {
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("Test server did not become ready");
    }
}
