use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Show {
    pub id: String,
    pub name: String,
    pub year: Option<i64>,
    pub rating: Option<f64>,
}

impl Show {
    /// "Name (Year)", or just the name when the year is unknown.
    pub fn display_title(&self) -> String {
        match self.year {
            Some(year) => format!("{} ({})", self.name, year),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EpisodeEntry {
    pub id: Option<String>,
    pub parent_id: String,
    pub season_number: u64,
    pub episode_number: u64,
    pub name: Option<String>,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub show: Show,
    pub score: u32,
}

impl SearchResult {
    pub fn label(&self) -> String {
        self.show.display_title()
    }
}
