//! `pulse config` inspects the layered configuration

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::config::{ConfigLoader, PulseConfig};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show {
        /// Read this file instead of the user/project layers
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// List the configuration layers and whether each file exists
    Path,
}

pub fn run(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show { config } => show_config(config.as_deref()),
        ConfigCommands::Path => show_paths(),
    }
}

fn load(config: Option<&Path>) -> Result<PulseConfig> {
    match config {
        Some(path) => ConfigLoader::load_from_path(path),
        None => ConfigLoader::load(),
    }
}

fn show_config(config: Option<&Path>) -> Result<()> {
    let effective = load(config)?;
    print!("{}", toml::to_string_pretty(&effective)?);
    Ok(())
}

fn show_paths() -> Result<()> {
    let user = ConfigLoader::user_config_path();
    println!("{}", describe_layer("User config", user.as_deref()));
    let project = ConfigLoader::project_config_path();
    println!("{}", describe_layer("Project config", Some(&project)));
    Ok(())
}

/// One line per layer: label, location, and whether the file is present
fn describe_layer(label: &str, path: Option<&Path>) -> String {
    match path {
        Some(path) => {
            let state = if path.exists() { "found" } else { "not found" };
            format!("{:<16}{} ({})", format!("{}:", label), path.display(), state)
        }
        None => format!("{:<16}<no home directory>", format!("{}:", label)),
    }
}
