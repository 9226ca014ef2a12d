//! Recent search queries, most recent first.

use std::path::{Path, PathBuf};

use crate::error::{Result, WeftError};

/// Entries kept after an add
pub const MAX_SEARCH_HISTORY: usize = 8;

const FILE_NAME: &str = "weft_search_history.json";

#[derive(Debug, Clone, Default)]
pub struct SearchHistory {
    entries: Vec<String>,
    /// `None` keeps the history in memory only
    path: Option<PathBuf>,
}

impl SearchHistory {
    /// Platform data directory location
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|mut p| {
            p.push("weft");
            p.push(FILE_NAME);
            p
        })
    }

    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load from `path`. Missing or unreadable data gives an empty history
    /// that still persists to `path`.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Vec<String>>(&contents) {
                Ok(entries) => normalize(entries),
                Err(e) => {
                    tracing::warn!("Corrupt search history at {:?}: {}", path, e);
                    Vec::new()
                }
            },
            // Nothing saved yet
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                tracing::warn!("Search history unreadable at {:?}: {}", path, e);
                Vec::new()
            }
        };
        Self {
            entries,
            path: Some(path),
        }
    }

    pub fn list(&self) -> &[String] {
        &self.entries
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Record a query at the front. Blank queries are ignored; an equal
    /// entry moves to the front instead of repeating.
    pub fn add(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        self.entries.retain(|q| q != query);
        self.entries.insert(0, query.to_string());
        self.entries.truncate(MAX_SEARCH_HISTORY);
        self.persist();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    fn persist(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = write_entries(path, &self.entries) {
            tracing::warn!("Search history not saved: {}", e);
        }
    }
}

/// Trimmed, non-blank, first occurrence of each query, capped.
fn normalize(raw: Vec<String>) -> Vec<String> {
    let mut entries: Vec<String> = Vec::with_capacity(MAX_SEARCH_HISTORY);
    for query in raw {
        let query = query.trim();
        if query.is_empty() || entries.iter().any(|q| q == query) {
            continue;
        }
        entries.push(query.to_string());
        if entries.len() == MAX_SEARCH_HISTORY {
            break;
        }
    }
    entries
}

fn write_entries(path: &Path, entries: &[String]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| WeftError::Persistence(format!("{}: {}", parent.display(), e)))?;
    }
    let json = serde_json::to_string(entries)?;
    std::fs::write(path, json)
        .map_err(|e| WeftError::Persistence(format!("{}: {}", path.display(), e)))
}
