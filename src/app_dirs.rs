use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> Option<PathBuf> {
        crate::config::project_dirs().map(|pd| pd.config_dir().join("config.json"))
    }

    /// Log file used while the terminal UI owns the screen.
    pub fn log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("drumsheet");
            Some(state_dir.join("drumsheet.log"))
        } else {
            crate::config::project_dirs()
                .map(|pd| pd.data_local_dir().join("drumsheet.log"))
        }
    }
}
