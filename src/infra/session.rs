use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// State that survives between runs: the fragment naming the selected show.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Session {
    pub fragment: Option<String>,
}

impl Session {
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            if let Ok(content) = fs::read_to_string(path) {
                if let Ok(session) = serde_json::from_str(&content) {
                    return session;
                }
            }
        }
        Session::default()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
