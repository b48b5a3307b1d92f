//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

/// Solved game-tree viewer: renders a serialized solution tree as HTML boards
#[derive(Parser, Debug)]
#[command(name = "solview")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Working directory searched for .solview.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub work_dir: Option<PathBuf>,

    /// Without a subcommand, `render` runs with configured defaults
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Solution file selection shared by the tree commands.
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Solution file (default: configured input, `solution.txt`)
    #[arg(value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render boards down to a depth as an HTML page
    Render {
        #[command(flatten)]
        input: InputArgs,
        /// Deepest level rendered as a full board
        #[arg(short = 'n', long)]
        max_depth: Option<usize>,
        /// Board cell edge in pixels
        #[arg(long)]
        cell_size: Option<u32>,
        /// Write the page to a file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Show the tree down to a depth as a terminal outline
    Outline {
        #[command(flatten)]
        input: InputArgs,
        /// Deepest level shown
        #[arg(short = 'n', long)]
        max_depth: Option<usize>,
    },

    /// Print node, leaf and outcome counts
    Stats {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Re-emit the solution file in canonical order
    Fmt {
        #[command(flatten)]
        input: InputArgs,
        /// Write to a file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Show config file locations
    Path,
    /// Print a commented template config
    Template,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    // https://docs.rs/clap/latest/clap/_derive/_tutorial/index.html#testing
    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn given_render_flags_when_parsing_then_fields_set() {
        let cli = Cli::try_parse_from(["solview", "-dd", "render", "tree.txt", "-n", "2"]).unwrap();
        assert_eq!(cli.debug, 2);
        match cli.command {
            Some(Commands::Render {
                input, max_depth, ..
            }) => {
                assert_eq!(input.file, Some(PathBuf::from("tree.txt")));
                assert_eq!(max_depth, Some(2));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn given_no_subcommand_when_parsing_then_command_is_none() {
        let cli = Cli::try_parse_from(["solview"]).unwrap();
        assert!(cli.command.is_none());
    }
}
