use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Watchlist codes organized by named group, independent of current holdings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Watchlist {
    #[serde(flatten)]
    pub groups: HashMap<String, Vec<String>>,
}

impl Watchlist {
    /// Load a watchlist from a JSON file ({"group": ["2330", ...], ...})
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::error::Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            crate::error::AppError::Io(format!(
                "Failed to read watchlist {:?}: {}",
                path.as_ref(),
                e
            ))
        })?;
        let groups: HashMap<String, Vec<String>> = serde_json::from_str(&content)?;
        Ok(Self { groups })
    }

    /// All codes across all groups, deduplicated and sorted
    pub fn all_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.groups.values().flat_map(|v| v.clone()).collect();
        codes.sort();
        codes.dedup();
        codes
    }

    /// Codes for one group
    pub fn get_group(&self, group_name: &str) -> Option<&Vec<String>> {
        self.groups.get(group_name)
    }

    /// All group names, sorted
    pub fn group_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.keys().cloned().collect();
        names.sort();
        names
    }
}
