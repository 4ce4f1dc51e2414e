//! Snapshot persistence: load with a fresh-state fallback, save.

use crate::logic::rating;
use crate::models::{EngineError, Placings, SavedState, TeamCatalog};
use chrono::Utc;
use std::path::Path;

/// Fresh state: catalog default ratings, no placings, no tournament.
pub fn fresh_state(catalog: &TeamCatalog) -> SavedState {
    SavedState {
        saved_at: Utc::now(),
        ratings: rating::default_book(catalog),
        placings: Placings::new(),
        tournament: None,
    }
}

/// Load the snapshot. Any problem (missing file, unreadable JSON) falls
/// back to fresh defaults; a corrupt snapshot must never stop the app.
pub fn load_state(path: &Path, catalog: &TeamCatalog) -> SavedState {
    match std::fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str::<SavedState>(&data) {
            Ok(state) => {
                log::info!("loaded snapshot from {}", path.display());
                state
            }
            Err(e) => {
                log::warn!(
                    "snapshot at {} is unreadable ({}); starting fresh",
                    path.display(),
                    e
                );
                fresh_state(catalog)
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!("no snapshot at {}; starting fresh", path.display());
            fresh_state(catalog)
        }
        Err(e) => {
            log::warn!(
                "cannot read snapshot at {} ({}); starting fresh",
                path.display(),
                e
            );
            fresh_state(catalog)
        }
    }
}

/// Write the snapshot with a refreshed timestamp.
pub fn save_state(path: &Path, state: &SavedState) -> Result<(), EngineError> {
    let mut snapshot = state.clone();
    snapshot.saved_at = Utc::now();
    let json = serde_json::to_string_pretty(&snapshot)
        .map_err(|e| EngineError::Storage(format!("serialize snapshot: {}", e)))?;
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .map_err(|e| EngineError::Storage(format!("create {}: {}", dir.display(), e)))?;
        }
    }
    std::fs::write(path, json)
        .map_err(|e| EngineError::Storage(format!("write {}: {}", path.display(), e)))
}
