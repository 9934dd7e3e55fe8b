// Logging and verbosity control

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Verbosity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VerbosityLevel {
    /// Errors only
    Quiet,
    /// Warnings and errors
    Normal,
    /// Loader and resolver diagnostics
    Verbose,
}

impl VerbosityLevel {
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            VerbosityLevel::Quiet
        } else if verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }

    /// Filter directive for this level
    pub fn directive(&self) -> &'static str {
        match self {
            VerbosityLevel::Quiet => "error",
            VerbosityLevel::Normal => "warn",
            VerbosityLevel::Verbose => "contextkeys=debug,contextkeys_cli=debug,info",
        }
    }
}

/// Initialize logging based on CLI flags
///
/// `RUST_LOG` takes precedence over the flags when set.
pub fn init_logging(verbose: bool, quiet: bool) {
    let level = VerbosityLevel::from_flags(verbose, quiet);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));

    // A subscriber may already be installed (tests, embedding binaries).
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init();
}
