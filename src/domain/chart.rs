use serde::Serialize;

pub const RATING_LABEL: &str = "Show rating";
pub const RATING_COLOR: &str = "#333";
pub const RATING_DASH: [u32; 2] = [6, 6];

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "type", content = "season")]
pub enum SeriesKind {
    Season(u64),
    Rating,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_id: Option<String>,
}

impl ChartPoint {
    pub fn gap() -> Self {
        Self {
            y: None,
            name: None,
            episode_id: None,
        }
    }

    pub fn value(y: f64) -> Self {
        Self {
            y: Some(y),
            name: None,
            episode_id: None,
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub label: String,
    pub kind: SeriesKind,
    pub border_color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_dash: Option<[u32; 2]>,
    pub fill: bool,
    pub data: Vec<ChartPoint>,
}

impl ChartSeries {
    /// Tooltip line for the point at `index`, `None` for gaps.
    pub fn tooltip(&self, index: usize) -> Option<String> {
        let point = self.data.get(index)?;
        let y = point.y?;
        Some(match self.kind {
            SeriesKind::Rating => format!("{}: {}", self.label, y),
            SeriesKind::Season(_) => format!(
                "{} (Score: {})",
                point.name.as_deref().unwrap_or("Episode"),
                y
            ),
        })
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub show_id: String,
    pub title: String,
    pub labels: Vec<String>,
    #[serde(rename = "datasets")]
    pub series: Vec<ChartSeries>,
}

impl ChartData {
    #[cfg(test)]
    pub fn max_episode_count(&self) -> usize {
        self.labels.len()
    }

    pub fn season(&self, season_number: u64) -> Option<&ChartSeries> {
        self.series
            .iter()
            .find(|s| s.kind == SeriesKind::Season(season_number))
    }

    #[cfg(test)]
    pub fn rating(&self) -> Option<&ChartSeries> {
        self.series.iter().find(|s| s.kind == SeriesKind::Rating)
    }

    /// The point a click on season `season_number`, episode `episode_number`
    /// (1-based) would hit.
    pub fn point(&self, season_number: u64, episode_number: usize) -> Option<&ChartPoint> {
        let index = episode_number.checked_sub(1)?;
        self.season(season_number)?.data.get(index)
    }

    /// Tooltip text for the same point `point` resolves.
    pub fn tooltip(&self, season_number: u64, episode_number: usize) -> Option<String> {
        let index = episode_number.checked_sub(1)?;
        self.season(season_number)?.tooltip(index)
    }
}

/// Link-out URL for an episode id, `{id}` in the template is replaced.
pub fn link_for(template: &str, episode_id: &str) -> String {
    template.replace("{id}", episode_id)
}
