use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub user_data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub index_dir: PathBuf,
}

impl AppPaths {
    pub fn new() -> Self {
        Self::at(discover_user_data_dir())
    }

    /// Roots every path under `user_data_dir`. Used directly by tests.
    pub fn at(user_data_dir: PathBuf) -> Self {
        let log_dir = user_data_dir.join("logs");
        let index_dir = user_data_dir.join("index");

        for dir in [&user_data_dir, &log_dir, &index_dir] {
            let _ = fs::create_dir_all(dir);
        }

        AppPaths {
            user_data_dir,
            log_dir,
            index_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

fn discover_user_data_dir() -> PathBuf {
    if let Ok(dir) = env::var("CANDELA_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if cfg!(target_os = "windows") {
        let base = env::var("LOCALAPPDATA")
            .unwrap_or_else(|_| env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string()));
        return PathBuf::from(base).join("Candela");
    }

    if cfg!(target_os = "macos") {
        return home_dir()
            .join("Library")
            .join("Application Support")
            .join("Candela");
    }

    let xdg = env::var("XDG_DATA_HOME").unwrap_or_else(|_| {
        home_dir()
            .join(".local/share")
            .to_string_lossy()
            .to_string()
    });
    PathBuf::from(xdg).join("candela")
}

fn home_dir() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}
