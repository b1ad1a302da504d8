use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{ApplyArgs, apply_command, docs_command};

#[derive(Parser, Debug)]
#[command(name = "pme")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging")]
pub struct Pme {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manipulate the reactor rooted at a POM
    #[command(visible_alias = "a")]
    Apply {
        /// Root POM of the reactor
        #[arg(short = 'f', long = "file", default_value = "pom.xml")]
        file: PathBuf,

        /// User property, as key=value (a bare key means true)
        #[arg(short = 'D', value_name = "KEY=VALUE")]
        define: Vec<String>,

        /// Active profiles, comma separated
        #[arg(short = 'P', long = "profiles", value_delimiter = ',')]
        profiles: Vec<String>,

        /// Remote repository to resolve POMs and metadata from (repeatable)
        #[arg(long = "remote-repository", value_name = "URL")]
        remote_repositories: Vec<String>,

        /// Local repository directory (defaults to ~/.m2/repository)
        #[arg(long = "local-repository", value_name = "DIR")]
        local_repository: Option<PathBuf>,
    },
    /// Write the index of documented properties
    Docs {
        /// Output file
        #[arg(short, long, default_value = pme_core::config::docs::DEFAULT_INDEX)]
        output: PathBuf,
    },
}

impl Commands {
    /// Execute the command
    pub fn execute(self) -> Result<()> {
        match self {
            Commands::Apply {
                file,
                define,
                profiles,
                remote_repositories,
                local_repository,
            } => apply_command(ApplyArgs {
                file,
                define,
                profiles,
                remote_repositories,
                local_repository,
            }),
            Commands::Docs { output } => docs_command(&output),
        }
    }
}
