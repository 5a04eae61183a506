use crate::domain::chart::ChartData;
use crate::domain::models::SearchResult;

/// The display surface the controller drives.
pub trait Page {
    fn set_title(&mut self, title: &str);

    fn render_chart(&mut self, chart: &ChartData);

    /// Shows the ranked suggestion list; an empty slice hides it.
    fn render_results(&mut self, results: &[SearchResult]);

    /// Location token naming the selected show, if any.
    fn fragment(&self) -> Option<String>;

    /// Updates the location token in place. Must not trigger a selection.
    fn set_fragment(&mut self, show_id: &str);
}
