use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "episode-graph")]
#[command(about = "Search a TV episode dataset and chart episode scores by season")]
pub struct Cli {
    /// Dataset location (path or http(s) URL), overrides config and environment
    #[arg(long, global = true)]
    pub dataset: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Rank shows by name, or resolve a direct identifier
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Print the season chart of one show
    Show {
        show_id: String,

        /// Print the chart as a JSON dataset description
        #[arg(long)]
        json: bool,
    },
    /// Interactive search and charting session
    Browse {
        /// Print charts as JSON dataset descriptions
        #[arg(long)]
        json: bool,
    },
}

/// One line of input in a browse session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    /// Plain text: submit the search form
    Submit(String),
    /// `?text`: type into the search box
    Type(String),
    /// `:pick N`: choose the Nth suggestion (1-based)
    Pick(usize),
    /// `#ID`: navigate to a fragment
    Fragment(String),
    /// `:link S E`: follow the link of season S, episode E
    Link(u64, usize),
    /// `:point S E`: tooltip of season S, episode E
    Point(u64, usize),
    ToggleJson,
    Help,
    Quit,
    Invalid(String),
}

pub const BROWSE_HELP: &str = "\
  <text>        search for a show (or enter an identifier)
  ?<text>       type into the search box; suggestions appear once the
                debounce delay has passed, before the next prompt, so
                each ?line is searched on its own
  :pick N       select suggestion N
  #<id>         navigate to a show identifier
  :link S E     print the link for season S, episode E
  :point S E    describe season S, episode E
  :json         toggle JSON chart output
  :help         show this help
  :quit         leave";

impl BrowseCommand {
    pub fn parse(line: &str) -> Self {
        if let Some(text) = line.strip_prefix('?') {
            return Self::Type(text.to_string());
        }
        if let Some(id) = line.strip_prefix('#') {
            return Self::Fragment(id.trim().to_string());
        }
        let Some(command) = line.trim().strip_prefix(':') else {
            return Self::Submit(line.to_string());
        };

        let mut words = command.split_whitespace();
        match (words.next(), words.next(), words.next(), words.next()) {
            (Some("pick"), Some(n), None, None) => match n.parse::<usize>() {
                Ok(n) if n >= 1 => Self::Pick(n),
                _ => Self::Invalid(format!("Invalid selection: {n}")),
            },
            (Some(verb @ ("link" | "point")), Some(season), Some(episode), None) => {
                match (season.parse(), episode.parse()) {
                    (Ok(season), Ok(episode)) if verb == "link" => Self::Link(season, episode),
                    (Ok(season), Ok(episode)) => Self::Point(season, episode),
                    _ => Self::Invalid(format!("Invalid episode: {season} {episode}")),
                }
            }
            (Some("json"), None, None, None) => Self::ToggleJson,
            (Some("help"), None, None, None) => Self::Help,
            (Some("quit" | "q"), None, None, None) => Self::Quit,
            _ => Self::Invalid(format!("Unknown command: {line}")),
        }
    }
}
