mod cli;
mod config;
mod domain;
mod error;
mod infra;
mod workflows;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io;
use std::thread;
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::{BrowseCommand, Cli, Command, BROWSE_HELP};
use config::Settings;
use error::ProjectError;
use infra::dataset::Dataset;
use infra::terminal::{render_results_text, TerminalPage};
use workflows::controller::{ControllerOptions, ViewController};
use workflows::page::Page;
use workflows::projector::project;
use workflows::search::search_shows;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let settings = config::load_settings(cli.dataset)?;

    match cli.command {
        Command::Search { query } => search(&settings, &query.join(" ")),
        Command::Show { show_id, json } => show(&settings, &show_id, json),
        Command::Browse { json } => browse(&settings, json),
    }
}

fn load_dataset(settings: &Settings) -> Result<Dataset> {
    Dataset::load(&settings.dataset)
        .with_context(|| format!("Failed to load database from {}", settings.dataset))
}

fn search(settings: &Settings, query: &str) -> Result<()> {
    let query = query.trim();
    let ids = settings.direct_identifier()?;
    let dataset = load_dataset(settings)?;

    if ids.matches(query) {
        let Some(show) = dataset.show(query)? else {
            bail!("No show with identifier '{query}'");
        };
        println!("  1: {} (ID: {})", show.display_title(), show.id);
        return Ok(());
    }

    let results = search_shows(Some(&dataset), query, settings.limits());
    if results.is_empty() {
        bail!("No shows found matching '{query}'");
    }
    println!("{}", render_results_text(&results));
    Ok(())
}

fn show(settings: &Settings, show_id: &str, json: bool) -> Result<()> {
    let dataset = load_dataset(settings)?;
    let chart = match project(&dataset, show_id) {
        Ok(chart) => chart,
        Err(ProjectError::NotFound(id)) => bail!("Show not found: {id}"),
        Err(e) => return Err(e).context("Error loading show data"),
    };

    let mut page = TerminalPage::new(io::stdout(), None);
    page.set_json(json);
    if !json {
        page.set_title(&chart.title);
    }
    page.render_chart(&chart);
    Ok(())
}

fn browse(settings: &Settings, json: bool) -> Result<()> {
    let options = ControllerOptions {
        ids: settings.direct_identifier()?,
        limits: settings.limits(),
        debounce: settings.debounce(),
        link_template: settings.link_template.clone(),
    };
    let mut page = TerminalPage::new(io::stdout(), Some(config::get_session_path()));
    page.set_json(json);

    let mut controller = ViewController::new(page, options);
    controller.begin_loading();
    controller.finish_loading(Dataset::load(&settings.dataset));
    if let Some(message) = controller.error_message() {
        bail!("Failed to load database from {}: {message}", settings.dataset);
    }

    println!("Type :help for commands.");
    let mut rl = DefaultEditor::new()?;
    loop {
        let line = match rl.readline(">> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };
        if !line.trim().is_empty() {
            if let Err(e) = rl.add_history_entry(line.as_str()) {
                debug!(error = %e, "failed to record history entry");
            }
        }

        match BrowseCommand::parse(&line) {
            BrowseCommand::Submit(query) => {
                controller.submit(&query);
            }
            BrowseCommand::Type(text) => controller.input(&text, Instant::now()),
            BrowseCommand::Pick(n) => {
                controller.pick(n - 1);
            }
            BrowseCommand::Fragment(id) => {
                controller.fragment_changed(&id);
            }
            BrowseCommand::Link(season, episode) => match controller.link(season, episode) {
                Some(url) => println!("{url}"),
                None => println!("No link for S{season}E{episode}"),
            },
            BrowseCommand::Point(season, episode) => match controller.tooltip(season, episode) {
                Some(text) => println!("{text}"),
                None => println!("No score for S{season}E{episode}"),
            },
            BrowseCommand::ToggleJson => {
                let page = controller.page_mut();
                page.set_json(!page.json());
            }
            BrowseCommand::Help => println!("{BROWSE_HELP}"),
            BrowseCommand::Quit => break,
            BrowseCommand::Invalid(message) => eprintln!("{message}"),
        }

        // The prompt blocks, so wait out the quiet period before reading again.
        if let Some(deadline) = controller.next_deadline() {
            let now = Instant::now();
            if deadline > now {
                thread::sleep(deadline - now);
            }
            controller.tick(Instant::now());
        }
    }

    info!(
        selected = ?controller.selected(),
        last_search = ?controller.last_search_term(),
        "browse session ended"
    );
    Ok(())
}
