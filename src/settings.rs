//! Persistent settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::graph::{DuplicateEdgePolicy, RankingPolicy, SelfLoopPolicy, DEFAULT_RELATED_LIMIT};

pub const DEFAULT_SUMMARIZER_URL: &str = "http://localhost:8000";

/// All persistable settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    // Remote summarizer
    #[serde(default = "default_summarizer_url")]
    pub summarizer_url: String,
    /// Longer than usual; the service generates text
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    // Related tabs
    #[serde(default = "default_related_limit")]
    pub related_limit: usize,
    #[serde(default)]
    pub duplicate_edge_policy: DuplicateEdgePolicy,
    #[serde(default)]
    pub self_loop_policy: SelfLoopPolicy,

    /// Overrides the default search history location
    #[serde(default)]
    pub history_path: Option<PathBuf>,
}

fn default_summarizer_url() -> String {
    DEFAULT_SUMMARIZER_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_related_limit() -> usize {
    DEFAULT_RELATED_LIMIT
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            summarizer_url: default_summarizer_url(),
            request_timeout_secs: default_request_timeout_secs(),
            related_limit: default_related_limit(),
            duplicate_edge_policy: DuplicateEdgePolicy::default(),
            self_loop_policy: SelfLoopPolicy::default(),
            history_path: None,
        }
    }
}

impl Settings {
    pub fn ranking_policy(&self) -> RankingPolicy {
        RankingPolicy {
            duplicate_edges: self.duplicate_edge_policy,
            self_loops: self.self_loop_policy,
        }
    }

    /// Get the path to the settings file
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("weft");
            p.push("settings.json");
            p
        })
    }

    /// Load settings from disk, returning defaults if file doesn't exist or is invalid
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            tracing::warn!("Could not determine config directory, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => {
                    tracing::info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    tracing::warn!("Failed to parse settings file: {}, using defaults", e);
                    Self::default()
                }
            },
            // File doesn't exist yet, that's fine
            Err(_) => Self::default(),
        }
    }

    /// Save settings to disk
    pub fn save(&self) {
        let Some(path) = Self::config_path() else {
            tracing::warn!("Could not determine config directory, settings not saved");
            return;
        };
        self.save_to(&path);
    }

    pub fn save_to(&self, path: &std::path::Path) {
        // Ensure config directory exists
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!("Failed to create config directory: {}", e);
                return;
            }
        }

        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(path, json) {
                    tracing::warn!("Failed to write settings file: {}", e);
                } else {
                    tracing::info!("Saved settings to {:?}", path);
                }
            }
            Err(e) => {
                tracing::warn!("Failed to serialize settings: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"related_limit": 3}"#).unwrap();
        assert_eq!(settings.related_limit, 3);
        assert_eq!(settings.summarizer_url, DEFAULT_SUMMARIZER_URL);
        assert_eq!(settings.request_timeout_secs, 30);
        assert_eq!(settings.duplicate_edge_policy, DuplicateEdgePolicy::FirstEdgeWins);
        assert_eq!(settings.ranking_policy(), RankingPolicy::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            duplicate_edge_policy: DuplicateEdgePolicy::MaxWeightWins,
            self_loop_policy: SelfLoopPolicy::Include,
            history_path: Some(dir.path().join("history.json")),
            ..Settings::default()
        };
        settings.save_to(&path);
        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn test_corrupt_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }
}
