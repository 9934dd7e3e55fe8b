// ctxkeys CLI library

pub mod commands;
pub mod logging;
pub mod output;
pub mod router;

pub use commands::{CheckCommand, LookupCommand, ResolveCommand};
pub use logging::{init_logging, VerbosityLevel};
pub use output::OutputStyle;
pub use router::{Cli, CommandRouter, Commands};
