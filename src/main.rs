use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use musicmate_server::config::{AppConfig, CliConfig, FileConfig};
use musicmate_server::profile::{ProfileSource, SyntheticProfileSource};
use musicmate_server::server::{run_server, RequestsLoggingLevel};
use musicmate_server::{
    SqliteMatchStore, SqliteMessageStore, SqlitePlaylistStore, SqliteProfileStore, SqliteUserStore,
};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Directory holding the SQLite database files.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// Path to an optional TOML config file. File values override CLI.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Back profile syncs with the deterministic synthetic data source
    /// when no raw listening data is submitted (local development).
    #[clap(long, default_value_t = false)]
    pub synthetic_profiles: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = cli_args
        .config
        .as_deref()
        .map(FileConfig::load)
        .transpose()?;
    let cli_config = CliConfig {
        db_dir: cli_args.db_dir,
        port: cli_args.port,
        logging_level: cli_args.logging_level,
        frontend_dir_path: cli_args.frontend_dir_path,
        synthetic_profiles: cli_args.synthetic_profiles,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    info!("Opening SQLite databases in {:?}...", config.db_dir);
    let users = Arc::new(SqliteUserStore::new(config.users_db_path())?);
    let profiles = Arc::new(SqliteProfileStore::new(config.profiles_db_path())?);
    let match_store = Arc::new(SqliteMatchStore::new(config.matching_db_path())?);
    let playlist_store = Arc::new(SqlitePlaylistStore::new(config.playlists_db_path())?);
    let message_store = Arc::new(SqliteMessageStore::new(config.chat_db_path())?);

    let profile_source: Arc<dyn ProfileSource> = Arc::new(SyntheticProfileSource);
    if config.synthetic_profiles {
        info!("Synthetic profile source enabled");
    }

    info!("Ready to serve at port {}!", config.port);
    run_server(
        users,
        profiles,
        match_store,
        playlist_store,
        message_store,
        profile_source,
        config.matching.clone(),
        config.logging_level.clone(),
        config.port,
        config.frontend_dir_path.clone(),
        config.synthetic_profiles,
    )
    .await
}
