use std::env;
use std::path::PathBuf;

/// Runtime settings read from the environment (and `.env`, if present).
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub log_level: String,
    /// Calibration file used when no `--calibration` or `--preset` is given.
    pub calibration: Option<PathBuf>,
}

impl CliConfig {
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        let log_level = env::var("FERTIPLAN_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string());
        let calibration = env::var("FERTIPLAN_CALIBRATION")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Self {
            log_level,
            calibration,
        }
    }
}
