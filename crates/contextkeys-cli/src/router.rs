// Command routing and dispatch

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use contextkeys::KeymapSettings;

use crate::commands::{CheckCommand, LookupCommand, ResolveCommand};
use crate::output::OutputStyle;

/// ctxkeys - inspect layered keybinding configurations
#[derive(Parser, Debug)]
#[command(name = "ctxkeys")]
#[command(bin_name = "ctxkeys")]
#[command(about = "Check, resolve and query layered keybinding configurations")]
#[command(
    long_about = "ctxkeys loads a TOML keymap of named contexts, validates their context_add / context_override relations, flattens inheritance and answers key lookups.\n\nWithout a FILE argument the keymap path comes from the settings file, CONTEXTKEYS_KEYMAP_PATH, or the platform config directory."
)]
#[command(version)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimize output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Settings file (TOML); CONTEXTKEYS_* variables override it
    #[arg(long, global = true, value_name = "PATH")]
    pub settings: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Validate a keymap
    #[command(about = "Load and validate a keymap, reporting the first error")]
    Check {
        /// Keymap file
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Print flattened bindings
    #[command(about = "Print the bindings of every context after inheritance")]
    Resolve {
        /// Keymap file
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Only print this context
        #[arg(short, long, value_name = "NAME")]
        context: Option<String>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Look a key up through a context stack
    #[command(about = "Push contexts onto a stack and look a key up in the topmost one")]
    Lookup {
        /// Keymap file
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Key identifier, e.g. `d`, `ctrl-q`, `Enter`
        #[arg(short, long)]
        key: String,

        /// Context to push; repeat to nest
        #[arg(short = 'c', long = "context", value_name = "NAME")]
        contexts: Vec<String>,
    },
}

/// Routes parsed arguments to command handlers
pub struct CommandRouter;

impl CommandRouter {
    /// Parse CLI arguments, initialize logging and run the command
    pub fn route() -> anyhow::Result<String> {
        let cli = Cli::parse();
        crate::logging::init_logging(cli.verbose, cli.quiet);
        Self::execute(&cli, OutputStyle::default())
    }

    /// Execute a parsed command, returning the text to print
    pub fn execute(cli: &Cli, style: OutputStyle) -> anyhow::Result<String> {
        let settings = KeymapSettings::load(cli.settings.as_deref())?;

        match &cli.command {
            Commands::Check { file } => CheckCommand::new(file.clone())
                .with_quiet(cli.quiet)
                .execute(&settings, style),
            Commands::Resolve {
                file,
                context,
                json,
            } => ResolveCommand::new(file.clone())
                .with_context(context.clone())
                .with_json(*json)
                .execute(&settings, style),
            Commands::Lookup {
                file,
                key,
                contexts,
            } => LookupCommand::new(file.clone(), key.clone())
                .with_contexts(contexts.clone())
                .with_verbose(cli.verbose)
                .execute(&settings, style),
        }
    }
}
