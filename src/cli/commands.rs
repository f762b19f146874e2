use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::exitcode;
use crate::infrastructure::ServiceContainer;

/// Run the parsed command and return the process exit code.
pub fn execute_command(cli: &Cli) -> CliResult<i32> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, run with --help for usage".to_string(),
        ));
    };

    if let Commands::Completion { shell } = command {
        _completion(*shell);
        return Ok(exitcode::OK);
    }

    let settings = Settings::load(cli.config.as_deref())?;
    debug!(?settings, "settings loaded");
    let container = ServiceContainer::new(settings);

    match command {
        Commands::Check { file } => _check(&container, file),
        Commands::Infer { file } => _infer(&container, file),
        Commands::Layout { file } => _layout(&container, file),
        Commands::Tree { file } => _tree(&container, file),
        Commands::Config { command } => _config(&container, cli, command),
        Commands::Completion { .. } => Ok(exitcode::OK),
    }
}

fn _completion(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

#[instrument(skip(container))]
fn _check(container: &ServiceContainer, file: &Path) -> CliResult<i32> {
    let puzzle = container.puzzle.load(file)?;
    if let Some(resolution) = &puzzle.resolution {
        output::resolution(resolution);
    }

    let report = container.puzzle.report(&puzzle);
    output::header("Torques");
    for entry in &report.entries {
        output::torque(entry);
    }
    output::verdict(report.balanced);

    Ok(if report.balanced {
        exitcode::OK
    } else {
        exitcode::UNBALANCED
    })
}

#[instrument(skip(container))]
fn _infer(container: &ServiceContainer, file: &Path) -> CliResult<i32> {
    let puzzle = container.puzzle.load(file)?;
    match &puzzle.resolution {
        Some(resolution) => output::resolution(resolution),
        None => output::info("No missing weight: every pan has a mass"),
    }
    Ok(exitcode::OK)
}

#[instrument(skip(container))]
fn _layout(container: &ServiceContainer, file: &Path) -> CliResult<i32> {
    let puzzle = container.puzzle.load(file)?;
    let width = puzzle
        .tree
        .iter()
        .map(|p| p.node.name.len())
        .max()
        .unwrap_or(0);

    output::header(&format!("Layout of {}", puzzle.source.display()));
    for placement in puzzle.tree.iter().unique_by(|p| p.id) {
        let node = placement.node;
        output::detail(&format!(
            "{:width$}  spans [{}, {}]  scale {:.2}",
            node.name,
            node.left_span,
            node.right_span,
            node.layout_scale,
            width = width
        ));
    }
    Ok(exitcode::OK)
}

#[instrument(skip(container))]
fn _tree(container: &ServiceContainer, file: &Path) -> CliResult<i32> {
    let puzzle = container.puzzle.load(file)?;
    output::info(&container.puzzle.render(&puzzle));
    Ok(exitcode::OK)
}

fn _config(container: &ServiceContainer, cli: &Cli, command: &ConfigCommands) -> CliResult<i32> {
    match command {
        ConfigCommands::Show => output::info(&container.settings.to_toml()?),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::detail(&format!("global: {}", path.display())),
                None => output::detail("global: (no config directory on this platform)"),
            }
            if let Some(path) = &cli.config {
                output::detail(&format!("local:  {}", path.display()));
            }
        }
    }
    Ok(exitcode::OK)
}
