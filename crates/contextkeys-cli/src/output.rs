// Output formatting and styling

use colored::Colorize;

/// Output styling configuration
#[derive(Debug, Clone, Copy)]
pub struct OutputStyle {
    pub use_colors: bool,
}

impl Default for OutputStyle {
    fn default() -> Self {
        Self {
            use_colors: atty::is(atty::Stream::Stdout),
        }
    }
}

impl OutputStyle {
    /// Plain output, for pipes and tests
    pub fn plain() -> Self {
        Self { use_colors: false }
    }

    /// Format success message
    pub fn success(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "✓".green().bold(), msg)
        } else {
            format!("✓ {}", msg)
        }
    }

    /// Format error message
    pub fn error(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "✗".red().bold(), msg)
        } else {
            format!("✗ {}", msg)
        }
    }

    /// Format a context name heading
    pub fn context(&self, name: &str) -> String {
        if self.use_colors {
            format!("[{}]", name.bold())
        } else {
            format!("[{}]", name)
        }
    }

    /// Format one `key = command` line
    pub fn binding(&self, key: &str, command: &str) -> String {
        if self.use_colors {
            format!("  {} = {}", key.cyan(), command)
        } else {
            format!("  {} = {}", key, command)
        }
    }

    /// Dimmed secondary text
    pub fn muted(&self, msg: &str) -> String {
        if self.use_colors {
            msg.dimmed().to_string()
        } else {
            msg.to_string()
        }
    }
}

/// Print error message to stderr
pub fn print_error(msg: &str) {
    let style = OutputStyle {
        use_colors: atty::is(atty::Stream::Stderr),
    };
    eprintln!("{}", style.error(msg));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_markers() {
        let style = OutputStyle::plain();
        assert_eq!(style.success("ok"), "✓ ok");
        assert_eq!(style.error("bad"), "✗ bad");
        assert_eq!(style.context("Queue"), "[Queue]");
        assert_eq!(style.binding("d", "deleteTrack"), "  d = deleteTrack");
    }
}
