//! Command dispatch and handlers

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands, InputArgs};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::Outcome;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Execute the parsed CLI command.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let work_dir = match &cli.work_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().map_err(|e| InfraError::io("current directory", e))?,
    };

    // Completion and config path do not depend on a valid configuration
    match &cli.command {
        Some(Commands::Completion { shell }) => return cmd_completion(*shell),
        Some(Commands::Config {
            command: ConfigCommands::Path,
        }) => return cmd_config_path(&work_dir),
        Some(Commands::Config {
            command: ConfigCommands::Template,
        }) => {
            output::info(&Settings::template());
            return Ok(());
        }
        _ => {}
    }

    let settings = Settings::load(Some(&work_dir))?;
    debug!("effective settings: {:?}", settings);
    let container = ServiceContainer::new(settings);

    match &cli.command {
        None => cmd_render(&container, &InputArgs::default(), None, None, None),
        Some(Commands::Render {
            input,
            max_depth,
            cell_size,
            output,
        }) => cmd_render(&container, input, *max_depth, *cell_size, output.as_deref()),
        Some(Commands::Outline { input, max_depth }) => cmd_outline(&container, input, *max_depth),
        Some(Commands::Stats { input }) => cmd_stats(&container, input),
        Some(Commands::Fmt { input, output }) => cmd_fmt(&container, input, output.as_deref()),
        Some(Commands::Config {
            command: ConfigCommands::Show,
        }) => cmd_config_show(&container),
        Some(Commands::Config { .. }) | Some(Commands::Completion { .. }) => Ok(()),
    }
}

/// Solution file named on the command line, else the configured one.
fn resolve_input(container: &ServiceContainer, input: &InputArgs) -> PathBuf {
    input
        .file
        .clone()
        .unwrap_or_else(|| container.settings.input.clone())
}

/// Write to `dest` if given, otherwise print to stdout.
fn emit(container: &ServiceContainer, content: &str, dest: Option<&Path>) -> CliResult<()> {
    match dest {
        Some(path) => {
            container
                .fs
                .ensure_parent(path)
                .map_err(|e| InfraError::io(format!("create parent of {}", path.display()), e))?;
            container
                .fs
                .write(path, content)
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Wrote", &path.display());
        }
        None => print!("{content}"),
    }
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_render(
    container: &ServiceContainer,
    input: &InputArgs,
    max_depth: Option<usize>,
    cell_size: Option<u32>,
    dest: Option<&Path>,
) -> CliResult<()> {
    let path = resolve_input(container, input);
    let max_depth = max_depth.unwrap_or(container.settings.max_depth);
    let cell_size = cell_size.unwrap_or(container.settings.cell_size);
    if cell_size == 0 {
        return Err(CliError::InvalidArgs(
            "cell size must be positive".to_string(),
        ));
    }

    let service = container.solution_service();
    let tree = service.load(&path)?;
    let page = service.render_page(&tree, max_depth, cell_size)?;
    emit(container, &page, dest)
}

#[instrument(level = "debug", skip(container))]
fn cmd_outline(
    container: &ServiceContainer,
    input: &InputArgs,
    max_depth: Option<usize>,
) -> CliResult<()> {
    let path = resolve_input(container, input);
    let max_depth = max_depth.unwrap_or(container.settings.max_depth);

    let service = container.solution_service();
    let tree = service.load(&path)?;
    let outline = service.outline(&tree, max_depth)?;
    print!("{outline}");
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_stats(container: &ServiceContainer, input: &InputArgs) -> CliResult<()> {
    let path = resolve_input(container, input);
    let service = container.solution_service();
    let tree = service.load(&path)?;
    let header = tree.header();
    let stats = tree.stats();

    output::header(&path.display());
    output::kv("board", &format!("{0}x{0}", header.dimension));
    output::kv("mark types", &header.mark_types);
    output::kv("nodes", &stats.nodes);
    output::kv("leaves", &stats.leaves);
    output::kv("depth", &stats.depth);
    output::kv("root", &describe_result(tree.root_node().result));
    for (code, count) in &stats.outcomes {
        output::kv(&format!("result {}", describe_result(*code)), count);
    }
    Ok(())
}

fn describe_result(code: i64) -> String {
    match Outcome::from_code(code) {
        Ok(outcome) => outcome.to_string(),
        Err(_) => {
            output::warning(&format!("unknown result code {code}"));
            format!("code {code}")
        }
    }
}

#[instrument(level = "debug", skip(container))]
fn cmd_fmt(container: &ServiceContainer, input: &InputArgs, dest: Option<&Path>) -> CliResult<()> {
    let path = resolve_input(container, input);
    let service = container.solution_service();
    let tree = service.load(&path)?;
    emit(container, &service.canonical_text(&tree), dest)
}

fn cmd_config_show(container: &ServiceContainer) -> CliResult<()> {
    let text = container.settings.to_toml()?;
    output::info(&text);
    Ok(())
}

fn cmd_config_path(work_dir: &Path) -> CliResult<()> {
    output::header("Config files (lowest to highest precedence)");
    match global_config_path() {
        Some(path) => output::kv("global", &describe_config(&path)),
        None => output::kv("global", "<no home directory>"),
    }
    output::kv("local", &describe_config(&local_config_path(work_dir)));
    Ok(())
}

fn describe_config(path: &Path) -> String {
    let state = if path.exists() { "" } else { " (not found)" };
    format!("{}{state}", path.display())
}

fn cmd_completion(shell: clap_complete::Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
