//! Command-line arguments

use clap::Parser;
use std::path::PathBuf;

/// Browse a list of stories in the terminal
#[derive(Debug, Parser)]
#[command(
    name = "hacker-stories",
    version,
    about = "Browse, search and prune a list of stories in the terminal",
    after_help = "Keys: type to search, Backspace/Ctrl+U edit the search, \
                  ↑/↓/Home/End move, Del/Ctrl+D remove, F5/Ctrl+R refresh, \
                  Esc/Ctrl+C quit"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// JSON file with the stories to show
    #[arg(short, long, value_name = "FILE")]
    pub stories: Option<PathBuf>,

    /// File the search term is remembered in
    #[arg(long, value_name = "FILE")]
    pub state: Option<PathBuf>,

    /// Do not remember the search term between runs
    #[arg(long)]
    pub no_persist: bool,

    /// Simulated fetch latency in milliseconds
    #[arg(long, value_name = "MS")]
    pub delay_ms: Option<u64>,

    /// Fail a fetch that takes longer than this many milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Make every fetch fail
    #[arg(long)]
    pub fail: bool,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_arguments_is_fine() {
        let cli = Cli::parse_from(["hacker-stories"]);
        assert!(cli.config.is_none());
        assert!(!cli.no_persist);
        assert!(!cli.fail);
    }

    #[test]
    fn parses_stories_path() {
        let cli = Cli::parse_from(["hacker-stories", "-s", "hits.json", "--timeout-ms", "100"]);
        assert_eq!(cli.stories, Some(PathBuf::from("hits.json")));
        assert_eq!(cli.timeout_ms, Some(100));
    }
}
