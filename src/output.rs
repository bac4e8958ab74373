//! # Output Configuration
//!
//! Controls how the CLI prints change summaries and operator notices.
//!
//! The following environment variables and flags are respected:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals

use std::env;
use std::io::{self, Write};

use console::style;

use crate::filesystem::{ChangeKind, FileChange};
use crate::tasks::{BodyLine, RenderedNotice};

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// `--color=always` overrides `NO_COLOR`, `--color=never` turns colors
    /// off, anything else detects support from the environment.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // presence alone disables, even when empty
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns the emoji when colors are enabled, the plain text otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// Print one line per change, the way the Nx CLI lists generator output
///
/// A dry run is announced before the list.
pub fn print_changes<W: Write>(
    out: &mut W,
    config: &OutputConfig,
    changes: &[FileChange],
    dry_run: bool,
) -> io::Result<()> {
    if dry_run {
        writeln!(
            out,
            "{} NOTE: The \"dryRun\" flag means no changes were made.",
            emoji(config, "🔎", "[DRY RUN]")
        )?;
        writeln!(out)?;
    }
    for change in changes {
        let label = change.kind.to_string();
        let label = if config.use_color {
            match change.kind {
                ChangeKind::Create => style(label).green().to_string(),
                ChangeKind::Update => style(label).yellow().to_string(),
                ChangeKind::Delete => style(label).red().to_string(),
            }
        } else {
            label
        };
        writeln!(out, "{} {}", label, change.path.display())?;
    }
    Ok(())
}

/// Print a notice: its title, then the body indented with commands emphasized
pub fn print_notice<W: Write>(
    out: &mut W,
    config: &OutputConfig,
    notice: &RenderedNotice,
) -> io::Result<()> {
    writeln!(out)?;
    let title = if config.use_color {
        style(&notice.title).cyan().bold().to_string()
    } else {
        notice.title.clone()
    };
    writeln!(out, "{} {}", emoji(config, "💡", ">"), title)?;
    writeln!(out)?;
    for line in &notice.body {
        match line {
            BodyLine::Text(text) => writeln!(out, "  {}", text)?,
            BodyLine::Command(command) if config.use_color => {
                writeln!(out, "    {}", style(command).bold())?
            }
            BodyLine::Command(command) => writeln!(out, "    {}", command)?,
        }
    }
    Ok(())
}
