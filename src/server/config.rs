use super::RequestsLoggingLevel;

#[derive(Clone)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub frontend_dir_path: Option<String>,
    /// If true, profile sync without a raw payload falls back to the
    /// synthetic data source so a single developer can exercise the whole
    /// flow locally.
    pub synthetic_profiles: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3001,
            frontend_dir_path: None,
            synthetic_profiles: false,
        }
    }
}
