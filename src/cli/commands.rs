//! Command dispatch

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::application::services::GeneratorService;
use crate::application::ToTermTree;
use crate::cli::args::Cli;
use crate::cli::error::CliResult;
use crate::cli::output;
use crate::config::Settings;
use crate::domain::EntryOrder;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::util::path::is_stdio;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    if cli.config_template {
        return write_stdout(&Settings::template());
    }

    let mut settings = Settings::load(cli.config.as_deref())?;
    if cli.sorted {
        settings.emit.order = EntryOrder::Sorted;
    }

    if cli.show_config {
        return write_stdout(&settings.to_toml()?);
    }

    let container = ServiceContainer::new(settings);
    let generator = container.generator();

    if cli.tree {
        _tree(&generator, &cli.sources)
    } else {
        _generate(&generator, &cli.sources, cli.output.as_deref())
    }
}

#[instrument(skip(generator))]
fn _tree(generator: &GeneratorService, sources: &[PathBuf]) -> CliResult<()> {
    let tree = generator.build_tree(sources)?;
    output::info(&tree.to_term_tree());
    Ok(())
}

#[instrument(skip(generator))]
fn _generate(
    generator: &GeneratorService,
    sources: &[PathBuf],
    dest: Option<&Path>,
) -> CliResult<()> {
    debug!("sources: {:?}, dest: {:?}", sources, dest);
    let content = generator.generate(sources)?;

    match dest {
        Some(path) if !is_stdio(path) => {
            generator.write_output(path, &content)?;
            output::action("Generated", &path.display());
            Ok(())
        }
        _ => write_stdout(&content),
    }
}

/// Write the whole text to stdout in one go.
fn write_stdout(content: &str) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(content.as_bytes())
        .and_then(|_| stdout.flush())
        .map_err(|e| InfraError::io("write to stdout", e))?;
    Ok(())
}
