use std::collections::BTreeMap;
use tracing::debug;

use crate::domain::chart::{
    ChartData, ChartPoint, ChartSeries, SeriesKind, RATING_COLOR, RATING_DASH, RATING_LABEL,
};
use crate::domain::models::EpisodeEntry;
use crate::error::ProjectError;
use crate::infra::dataset::Dataset;

/// Builds the chart for one show: a series per season, hued around the color
/// wheel in season order, plus a flat rating line when the show has a rating.
pub fn project(dataset: &Dataset, show_id: &str) -> Result<ChartData, ProjectError> {
    let show = dataset.show(show_id)?;
    let episodes = dataset.episodes(show_id)?;
    if episodes.is_empty() {
        return Err(ProjectError::NotFound(show_id.to_string()));
    }

    let seasons = group_by_season(episodes);
    let max_episode_count = seasons.values().map(Vec::len).max().unwrap_or(0);
    let labels: Vec<String> = (1..=max_episode_count)
        .map(|i| format!("Episode {i}"))
        .collect();

    let hue_step = 360.0 / seasons.len() as f64;
    let mut series: Vec<ChartSeries> = seasons
        .into_iter()
        .enumerate()
        .map(|(index, (season_number, episodes))| {
            season_series(season_number, episodes, hue_step * index as f64, max_episode_count)
        })
        .collect();

    if let Some(rating) = show.as_ref().and_then(|s| s.rating) {
        series.push(ChartSeries {
            label: RATING_LABEL.to_string(),
            kind: SeriesKind::Rating,
            border_color: RATING_COLOR.to_string(),
            border_dash: Some(RATING_DASH),
            fill: false,
            data: vec![ChartPoint::value(rating); max_episode_count],
        });
    }

    let title = match &show {
        Some(show) => show.display_title(),
        None => show_id.to_string(),
    };
    debug!(show_id, series = series.len(), max_episode_count, "projected chart");

    Ok(ChartData {
        show_id: show_id.to_string(),
        title,
        labels,
        series,
    })
}

// BTreeMap iterates seasons in ascending numeric order whatever the row order.
fn group_by_season(episodes: Vec<EpisodeEntry>) -> BTreeMap<u64, Vec<EpisodeEntry>> {
    let mut seasons: BTreeMap<u64, Vec<EpisodeEntry>> = BTreeMap::new();
    for episode in episodes {
        seasons.entry(episode.season_number).or_default().push(episode);
    }
    for episodes in seasons.values_mut() {
        episodes.sort_by_key(|e| e.episode_number);
    }
    seasons
}

fn season_series(
    season_number: u64,
    episodes: Vec<EpisodeEntry>,
    hue: f64,
    width: usize,
) -> ChartSeries {
    let mut data: Vec<ChartPoint> = episodes
        .into_iter()
        .map(|ep| ChartPoint {
            y: ep.score,
            name: ep.name,
            episode_id: ep.id,
        })
        .collect();
    data.resize(width, ChartPoint::gap());

    ChartSeries {
        label: format!("Season {season_number}"),
        kind: SeriesKind::Season(season_number),
        border_color: format!("hsl({}, 70%, 70%)", format_hue(hue)),
        border_dash: None,
        fill: false,
        data,
    }
}

fn format_hue(hue: f64) -> String {
    if hue.fract() == 0.0 {
        format!("{hue:.0}")
    } else {
        format!("{hue:.2}")
    }
}
