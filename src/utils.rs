use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::warn;

const APP_DIR: &str = "event-scale";

/// `<data dir>/event-scale/session.json`, or the working directory when the
/// platform has no data dir.
pub fn session_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("session.json")
}

pub fn ensure_parent(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(err) = fs::create_dir_all(parent) {
            warn!(path = ?parent, %err, "failed to create parent directory");
        }
    }
}
