use std::io::{self, Read};
use std::path::Path;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use regex::Regex;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, OutputStyle, Settings};
use crate::domain::TreeNode;
use crate::tree_traits::TreeNodeConvert;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    if !settings.color {
        output::disable_colors();
    }

    match &cli.command {
        Some(Commands::Show { file, style }) => {
            let style = style.map(OutputStyle::from).unwrap_or(settings.style);
            _show(file, style, &settings)
        }
        Some(Commands::Find {
            file,
            pattern,
            first,
        }) => _find(file, pattern, *first, &settings),
        Some(Commands::Check { file }) => _check(file, &settings),
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => _config_show(&settings),
            ConfigCommands::Path => _config_path(),
        },
        Some(Commands::Completion { shell }) => _completion(*shell),
        None => Ok(()),
    }
}

/// Reads a JSON array of strings from `file`, or stdin for `-`.
#[instrument(level = "debug")]
pub fn read_items(file: &Path) -> CliResult<Vec<String>> {
    let content = if file == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| CliError::io("read stdin", e))?;
        buf
    } else {
        std::fs::read_to_string(file)
            .map_err(|e| CliError::io(format!("read {}", file.display()), e))?
    };
    serde_json::from_str(&content).map_err(|source| CliError::Input {
        path: file.to_path_buf(),
        source,
    })
}

pub fn read_tree(file: &Path, settings: &Settings) -> CliResult<TreeNode<String>> {
    let items = read_items(file)?;
    let tree = TreeNode::<String>::decode_strings_with_limit(&items, settings.max_depth)?;
    debug!(nodes = tree.len(), "tree loaded");
    Ok(tree)
}

/// Formats a decoded tree in the given style, ready to print.
pub fn render(tree: &TreeNode<String>, style: OutputStyle) -> CliResult<String> {
    let rendered = match style {
        OutputStyle::Tree => tree.to_tree_string().to_string(),
        OutputStyle::Array => tree
            .encode_strings()
            .iter()
            .map(|item| format!("{}\n", item))
            .collect(),
        OutputStyle::Json => {
            format!("{}\n", serde_json::to_string_pretty(&tree.encode_strings())?)
        }
    };
    Ok(rendered)
}

/// Payloads matching `re` in pre-order; only the first one when `first` is set.
pub fn find_matches(tree: &TreeNode<String>, re: &Regex, first: bool) -> Vec<String> {
    if first {
        tree.find_one(|data| re.is_match(data)).into_iter().collect()
    } else {
        tree.find_all(|data| re.is_match(data))
    }
}

#[instrument(skip(settings))]
fn _show(file: &Path, style: OutputStyle, settings: &Settings) -> CliResult<()> {
    let tree = read_tree(file, settings)?;
    print!("{}", render(&tree, style)?);
    Ok(())
}

#[instrument(skip(settings))]
fn _find(file: &Path, pattern: &str, first: bool, settings: &Settings) -> CliResult<()> {
    let re = Regex::new(pattern)?;
    let tree = read_tree(file, settings)?;
    let matches = find_matches(&tree, &re, first);
    debug!(count = matches.len(), "matches");
    for m in matches {
        output::highlight(&m);
    }
    Ok(())
}

#[instrument(skip(settings))]
fn _check(file: &Path, settings: &Settings) -> CliResult<()> {
    let items = read_items(file)?;
    let tree = TreeNode::<String>::decode_strings_with_limit(&items, settings.max_depth)?;
    let encoded = tree.encode_strings();

    if encoded != items {
        output::failure(&format!("{}: re-encoding differs from input", file.display()));
        return Err(CliError::RoundTrip(file.to_path_buf()));
    }

    output::success(&format!("{}: round trip ok", file.display()));
    output::detail("nodes", &tree.len());
    output::detail("depth", &tree.depth());
    output::detail("leaves", &tree.leaves().len());
    Ok(())
}

fn _config_show(settings: &Settings) -> CliResult<()> {
    print!("{}", settings.to_toml()?);
    Ok(())
}

fn _config_path() -> CliResult<()> {
    let path = global_config_path()
        .ok_or_else(|| CliError::Usage("cannot determine config directory".into()))?;
    println!("{}", path.display());
    Ok(())
}

fn _completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
