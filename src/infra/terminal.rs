use std::io::Write;
use std::path::PathBuf;
use tracing::warn;

use crate::domain::chart::ChartData;
use crate::domain::models::SearchResult;
use crate::infra::session::Session;
use crate::workflows::page::Page;

const CELL_WIDTH: usize = 6;

/// Page rendered as text on a writer, with the fragment kept in a session
/// file so the selection survives restarts.
pub struct TerminalPage<W: Write> {
    out: W,
    session: Session,
    session_path: Option<PathBuf>,
    json: bool,
}

impl<W: Write> TerminalPage<W> {
    pub fn new(out: W, session_path: Option<PathBuf>) -> Self {
        let session = session_path
            .as_deref()
            .map(Session::load)
            .unwrap_or_default();
        Self {
            out,
            session,
            session_path,
            json: false,
        }
    }

    /// Render charts as JSON dataset descriptions instead of a table.
    pub fn set_json(&mut self, json: bool) {
        self.json = json;
    }

    pub fn json(&self) -> bool {
        self.json
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn emit(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{text}") {
            warn!(error = %e, "failed to write to terminal");
        }
    }
}

impl<W: Write> Page for TerminalPage<W> {
    fn set_title(&mut self, title: &str) {
        self.emit(&format!("== {title} =="));
    }

    fn render_chart(&mut self, chart: &ChartData) {
        let text = if self.json {
            match serde_json::to_string_pretty(chart) {
                Ok(json) => json,
                Err(e) => {
                    warn!(error = %e, "failed to serialize chart");
                    return;
                }
            }
        } else {
            render_chart_text(chart)
        };
        self.emit(&text);
    }

    fn render_results(&mut self, results: &[SearchResult]) {
        if results.is_empty() {
            return;
        }
        let text = render_results_text(results);
        self.emit(&text);
    }

    fn fragment(&self) -> Option<String> {
        self.session.fragment.clone()
    }

    fn set_fragment(&mut self, show_id: &str) {
        self.session.fragment = Some(show_id.to_string());
        if let Some(path) = &self.session_path {
            if let Err(e) = self.session.save(path) {
                warn!(error = %e, "failed to save session");
            }
        }
    }
}

/// One row per series, one column per episode label; gaps print as `-`.
pub fn render_chart_text(chart: &ChartData) -> String {
    let name_width = chart
        .series
        .iter()
        .map(|s| s.label.len())
        .max()
        .unwrap_or(0);

    let mut header = format!("{:<name_width$}", "");
    for i in 1..=chart.labels.len() {
        header.push_str(&format!("{:>CELL_WIDTH$}", format!("E{i}")));
    }

    let mut lines = vec![header];
    for series in &chart.series {
        let mut line = format!("{:<name_width$}", series.label);
        for point in &series.data {
            let cell = match point.y {
                Some(y) => format!("{y:.1}"),
                None => "-".to_string(),
            };
            line.push_str(&format!("{cell:>CELL_WIDTH$}"));
        }
        lines.push(line);
    }
    lines.join("\n")
}

pub fn render_results_text(results: &[SearchResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, r)| format!("  {}: {} (ID: {})", i + 1, r.label(), r.show.id))
        .collect::<Vec<_>>()
        .join("\n")
}
