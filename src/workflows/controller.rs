use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::domain::chart::{link_for, ChartData};
use crate::domain::models::SearchResult;
use crate::error::{LoadError, ProjectError};
use crate::infra::dataset::Dataset;
use crate::workflows::debounce::Debouncer;
use crate::workflows::page::Page;
use crate::workflows::projector::project;
use crate::workflows::search::{search_shows, DirectIdentifier, SearchLimits};

pub const LOAD_FAILED_TITLE: &str = "Failed to load database";
pub const NOT_FOUND_TITLE: &str = "Show not found";
pub const QUERY_FAILED_TITLE: &str = "Error loading show data";

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub ids: DirectIdentifier,
    pub limits: SearchLimits,
    pub debounce: Duration,
    pub link_template: String,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            ids: DirectIdentifier::default(),
            limits: SearchLimits::default(),
            debounce: Duration::from_millis(200),
            link_template: "https://www.imdb.com/title/{id}/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Loading,
    Ready,
    Error,
}

#[derive(Debug)]
enum State {
    Uninitialized,
    Loading,
    Ready(Dataset),
    Error(String),
}

/// What a selection attempt ended in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Shown,
    NotFound,
    Failed,
    Ignored,
}

/// Owns the dataset, the selected show and the pending search-as-you-type
/// evaluation, and keeps the page in sync with them.
pub struct ViewController<P: Page> {
    page: P,
    state: State,
    selected: Option<String>,
    chart: Option<ChartData>,
    results: Vec<SearchResult>,
    last_search_term: Option<String>,
    typing: Debouncer<String>,
    options: ControllerOptions,
}

impl<P: Page> ViewController<P> {
    pub fn new(page: P, options: ControllerOptions) -> Self {
        Self {
            page,
            state: State::Uninitialized,
            selected: None,
            chart: None,
            results: Vec::new(),
            last_search_term: None,
            typing: Debouncer::new(options.debounce),
            options,
        }
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            State::Uninitialized => Phase::Uninitialized,
            State::Loading => Phase::Loading,
            State::Ready(_) => Phase::Ready,
            State::Error(_) => Phase::Error,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            State::Error(message) => Some(message),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    #[cfg(test)]
    pub fn chart(&self) -> Option<&ChartData> {
        self.chart.as_ref()
    }

    #[cfg(test)]
    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn last_search_term(&self) -> Option<&str> {
        self.last_search_term.as_deref()
    }

    pub fn begin_loading(&mut self) {
        if !matches!(self.state, State::Uninitialized) {
            warn!(phase = ?self.phase(), "dataset load already started");
            return;
        }
        self.state = State::Loading;
    }

    /// Completes the one-shot dataset load. On success the show named by the
    /// fragment, if any, is selected.
    pub fn finish_loading(&mut self, loaded: Result<Dataset, LoadError>) {
        if !matches!(self.state, State::Loading) {
            warn!(phase = ?self.phase(), "dataset load finished outside of Loading");
            return;
        }

        match loaded {
            Ok(dataset) => {
                self.state = State::Ready(dataset);
                if let Some(show_id) = self.page.fragment().filter(|id| !id.is_empty()) {
                    info!(show_id, "restoring selection from fragment");
                    self.select(&show_id);
                }
            }
            Err(e) => {
                error!(error = %e, "dataset load failed");
                self.page.set_title(LOAD_FAILED_TITLE);
                self.state = State::Error(e.to_string());
            }
        }
    }

    /// Search form submission.
    pub fn submit(&mut self, query: &str) -> Selection {
        let query = query.trim();
        if query.is_empty() || !self.is_ready() {
            return Selection::Ignored;
        }
        self.typing.cancel();

        if self.options.ids.matches(query) {
            let outcome = self.select(query);
            self.show_results(Vec::new());
            return outcome;
        }

        let results = search_shows(self.dataset(), query, self.options.limits);
        self.last_search_term = Some(query.to_string());
        self.show_results(results);

        if let [only] = self.results.as_slice() {
            let show_id = only.show.id.clone();
            return self.select(&show_id);
        }
        Selection::Ignored
    }

    /// Search box edit; evaluated by `tick` once typing pauses.
    pub fn input(&mut self, text: &str, now: Instant) {
        if !self.is_ready() {
            return;
        }
        self.typing.schedule(text.trim().to_string(), now);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.typing.deadline()
    }

    /// Runs the pending search-as-you-type evaluation if it is due.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(query) = self.typing.fire(now) else {
            return false;
        };
        if query.is_empty() || self.options.ids.matches(&query) {
            self.show_results(Vec::new());
            return true;
        }

        let results = search_shows(self.dataset(), &query, self.options.limits);
        debug!(query, results = results.len(), "suggestions updated");
        self.last_search_term = Some(query);
        self.show_results(results);
        true
    }

    /// Picks the `index`th entry of the suggestion list.
    pub fn pick(&mut self, index: usize) -> Selection {
        let Some(show_id) = self.results.get(index).map(|r| r.show.id.clone()) else {
            warn!(index, "no suggestion at index");
            return Selection::Ignored;
        };
        let outcome = self.select(&show_id);
        self.show_results(Vec::new());
        outcome
    }

    pub fn fragment_changed(&mut self, show_id: &str) -> Selection {
        let show_id = show_id.trim();
        if show_id.is_empty() {
            return Selection::Ignored;
        }
        self.select(show_id)
    }

    /// Link-out URL of a point on the current chart.
    pub fn link(&self, season_number: u64, episode_number: usize) -> Option<String> {
        let point = self.chart.as_ref()?.point(season_number, episode_number)?;
        let episode_id = point.episode_id.as_deref()?;
        Some(link_for(&self.options.link_template, episode_id))
    }

    /// Tooltip of a point on the current chart.
    pub fn tooltip(&self, season_number: u64, episode_number: usize) -> Option<String> {
        self.chart.as_ref()?.tooltip(season_number, episode_number)
    }

    /// Direct selection by identifier. The fragment is updated first so it
    /// always names the selected show; a failed projection leaves the
    /// previous chart in place and only replaces the title.
    pub fn select(&mut self, show_id: &str) -> Selection {
        let State::Ready(dataset) = &self.state else {
            warn!(show_id, "selection before the dataset is ready");
            return Selection::Ignored;
        };

        if self.page.fragment().as_deref() != Some(show_id) {
            self.page.set_fragment(show_id);
        }
        self.selected = Some(show_id.to_string());

        match project(dataset, show_id) {
            Ok(chart) => {
                self.page.render_chart(&chart);
                self.page.set_title(&chart.title);
                self.chart = Some(chart);
                Selection::Shown
            }
            Err(ProjectError::NotFound(_)) => {
                info!(show_id, "show not found");
                self.page.set_title(NOT_FOUND_TITLE);
                Selection::NotFound
            }
            Err(e) => {
                error!(show_id, error = %e, "Error querying database");
                self.page.set_title(QUERY_FAILED_TITLE);
                Selection::Failed
            }
        }
    }

    fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    fn dataset(&self) -> Option<&Dataset> {
        match &self.state {
            State::Ready(dataset) => Some(dataset),
            _ => None,
        }
    }

    fn show_results(&mut self, results: Vec<SearchResult>) {
        self.page.render_results(&results);
        self.results = results;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::dataset::testing::{dataset, episode, show};
    use rusqlite::Connection;

    #[derive(Debug, Default)]
    struct RecordingPage {
        title: Option<String>,
        charts: Vec<ChartData>,
        results: Vec<Vec<String>>,
        fragment: Option<String>,
        fragment_writes: usize,
    }

    impl Page for RecordingPage {
        fn set_title(&mut self, title: &str) {
            self.title = Some(title.to_string());
        }

        fn render_chart(&mut self, chart: &ChartData) {
            self.charts.push(chart.clone());
        }

        fn render_results(&mut self, results: &[SearchResult]) {
            self.results
                .push(results.iter().map(|r| r.show.id.clone()).collect());
        }

        fn fragment(&self) -> Option<String> {
            self.fragment.clone()
        }

        fn set_fragment(&mut self, show_id: &str) {
            self.fragment = Some(show_id.to_string());
            self.fragment_writes += 1;
        }
    }

    fn fixture() -> Dataset {
        dataset(
            &[
                show("tt001", "Test Show", Some(2010), Some(7.5)),
                show("tt0386676", "The Office", Some(2005), Some(9.0)),
                show("tt0290978", "The Office", Some(2001), Some(8.5)),
                show("tt0903747", "Breaking Bad", Some(2008), Some(9.5)),
                show("tt404", "Unaired Pilot", None, None),
            ],
            &[
                episode("tt001", 1, 1, Some(8.0)),
                episode("tt001", 1, 2, Some(9.0)),
                episode("tt0903747", 1, 1, Some(9.0)),
                episode("tt0386676", 1, 1, Some(7.5)),
            ],
        )
    }

    fn ready(page: RecordingPage) -> ViewController<RecordingPage> {
        let mut controller = ViewController::new(page, ControllerOptions::default());
        controller.begin_loading();
        controller.finish_loading(Ok(fixture()));
        controller
    }

    #[test]
    fn test_load_lifecycle() {
        let mut controller = ViewController::new(RecordingPage::default(), ControllerOptions::default());
        assert_eq!(controller.phase(), Phase::Uninitialized);
        controller.begin_loading();
        assert_eq!(controller.phase(), Phase::Loading);
        controller.finish_loading(Ok(fixture()));
        assert_eq!(controller.phase(), Phase::Ready);
        assert!(controller.selected().is_none());
        assert!(controller.page().charts.is_empty());
    }

    #[test]
    fn test_load_failure_is_terminal() {
        let mut controller = ViewController::new(RecordingPage::default(), ControllerOptions::default());
        controller.begin_loading();
        controller.finish_loading(Err(LoadError::Empty));

        assert_eq!(controller.phase(), Phase::Error);
        assert_eq!(controller.error_message(), Some("Database file is empty"));
        assert_eq!(controller.page().title.as_deref(), Some(LOAD_FAILED_TITLE));

        assert_eq!(controller.submit("tt001"), Selection::Ignored);
        assert_eq!(controller.fragment_changed("tt001"), Selection::Ignored);
        controller.input("office", Instant::now());
        assert!(controller.next_deadline().is_none());
        controller.finish_loading(Ok(fixture()));
        assert_eq!(controller.phase(), Phase::Error);
    }

    #[test]
    fn test_initial_fragment_is_selected() {
        let page = RecordingPage {
            fragment: Some("tt001".to_string()),
            ..RecordingPage::default()
        };
        let controller = ready(page);
        assert_eq!(controller.selected(), Some("tt001"));
        assert_eq!(controller.page().title.as_deref(), Some("Test Show (2010)"));
        assert_eq!(controller.page().charts.len(), 1);
        assert_eq!(controller.page().fragment_writes, 0);
    }

    #[test]
    fn test_submit_direct_identifier_bypasses_search() {
        let mut controller = ready(RecordingPage::default());
        assert_eq!(controller.submit("  tt001 "), Selection::Shown);
        assert_eq!(controller.selected(), Some("tt001"));
        assert_eq!(controller.page().fragment.as_deref(), Some("tt001"));
        assert_eq!(controller.page().results, vec![Vec::<String>::new()]);
        assert!(controller.last_search_term().is_none());

        let chart = controller.chart().unwrap();
        assert_eq!(chart.labels, vec!["Episode 1", "Episode 2"]);
        assert_eq!(
            chart.season(1).unwrap().data.iter().map(|p| p.y).collect::<Vec<_>>(),
            vec![Some(8.0), Some(9.0)]
        );
        assert_eq!(chart.rating().unwrap().data.len(), 2);
    }

    #[test]
    fn test_submit_single_match_auto_selects() {
        let mut controller = ready(RecordingPage::default());
        assert_eq!(controller.submit("breaking bad"), Selection::Shown);
        assert_eq!(controller.selected(), Some("tt0903747"));
        assert_eq!(controller.results().len(), 1);
        assert_eq!(controller.last_search_term(), Some("breaking bad"));
        assert_eq!(controller.page().title.as_deref(), Some("Breaking Bad (2008)"));
    }

    #[test]
    fn test_submit_many_matches_lists_only() {
        let mut controller = ready(RecordingPage::default());
        assert_eq!(controller.submit("office"), Selection::Ignored);
        assert!(controller.selected().is_none());
        assert_eq!(
            controller.page().results.last().unwrap(),
            &vec!["tt0386676".to_string(), "tt0290978".to_string()]
        );

        assert_eq!(controller.pick(1), Selection::NotFound);
        assert_eq!(controller.selected(), Some("tt0290978"));
        assert!(controller.results().is_empty());
        assert!(controller.page().results.last().unwrap().is_empty());
        assert_eq!(controller.pick(0), Selection::Ignored);
    }

    #[test]
    fn test_submit_empty_is_noop() {
        let mut controller = ready(RecordingPage::default());
        assert_eq!(controller.submit("   "), Selection::Ignored);
        assert!(controller.page().results.is_empty());
    }

    #[test]
    fn test_not_found_keeps_previous_chart() {
        let mut controller = ready(RecordingPage::default());
        controller.select("tt001");
        assert_eq!(controller.fragment_changed("tt404"), Selection::NotFound);

        assert_eq!(controller.page().title.as_deref(), Some(NOT_FOUND_TITLE));
        assert_eq!(controller.page().charts.len(), 1);
        assert_eq!(controller.chart().unwrap().show_id, "tt001");
        // Fragment and selection still agree.
        assert_eq!(controller.selected(), Some("tt404"));
        assert_eq!(controller.page().fragment.as_deref(), Some("tt404"));
    }

    #[test]
    fn test_query_failure_sets_error_title() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE shows (id TEXT, name TEXT, year INTEGER, rating REAL);
             CREATE TABLE episodes (parent_id TEXT);",
        )
        .unwrap();
        let broken = Dataset::from_connection(conn).unwrap();

        let mut controller = ViewController::new(RecordingPage::default(), ControllerOptions::default());
        controller.begin_loading();
        controller.finish_loading(Ok(broken));
        assert_eq!(controller.select("tt001"), Selection::Failed);
        assert_eq!(controller.page().title.as_deref(), Some(QUERY_FAILED_TITLE));
        assert!(controller.page().charts.is_empty());
    }

    #[test]
    fn test_reselect_is_idempotent() {
        let mut controller = ready(RecordingPage::default());
        controller.select("tt001");
        controller.fragment_changed("tt001");

        let charts = &controller.page().charts;
        assert_eq!(charts.len(), 2);
        assert_eq!(charts[0], charts[1]);
        assert_eq!(controller.page().fragment_writes, 1);
        assert_eq!(
            charts[1]
                .series
                .iter()
                .filter(|s| s.label == "Show rating")
                .count(),
            1
        );
    }

    #[test]
    fn test_typing_is_debounced_last_write_wins() {
        let mut controller = ready(RecordingPage::default());
        let start = Instant::now();
        controller.input("bre", start);
        controller.input("breaking", start + Duration::from_millis(100));

        assert!(!controller.tick(start + Duration::from_millis(250)));
        assert!(controller.page().results.is_empty());

        assert!(controller.tick(start + Duration::from_millis(300)));
        assert_eq!(controller.page().results, vec![vec!["tt0903747".to_string()]]);
        assert_eq!(controller.last_search_term(), Some("breaking"));
        // Suggestions never auto-select.
        assert!(controller.selected().is_none());
        assert!(!controller.tick(start + Duration::from_secs(1)));
    }

    #[test]
    fn test_typing_identifier_or_empty_clears_list() {
        let mut controller = ready(RecordingPage::default());
        let start = Instant::now();
        controller.input("tt001", start);
        assert!(controller.tick(start + Duration::from_millis(200)));
        controller.input("", start + Duration::from_millis(300));
        assert!(controller.tick(start + Duration::from_millis(500)));

        assert_eq!(controller.page().results, vec![Vec::<String>::new(), Vec::new()]);
        assert!(controller.selected().is_none());
    }

    #[test]
    fn test_link_out() {
        let mut controller = ready(RecordingPage::default());
        assert!(controller.link(1, 1).is_none());
        controller.select("tt001");
        assert_eq!(
            controller.link(1, 2).as_deref(),
            Some("https://www.imdb.com/title/tt001s1e2/")
        );
        assert!(controller.link(1, 3).is_none());
        assert!(controller.link(2, 1).is_none());
    }

    #[test]
    fn test_point_tooltip() {
        let mut controller = ready(RecordingPage::default());
        assert!(controller.tooltip(1, 1).is_none());
        controller.select("tt001");
        assert_eq!(
            controller.tooltip(1, 2).as_deref(),
            Some("Episode 1x2 (Score: 9)")
        );
        assert!(controller.tooltip(1, 3).is_none());
    }
}
