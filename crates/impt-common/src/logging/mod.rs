//! Logging initialization for the impt binary
//!
//! Filter priority:
//! 1. CLI flags (`-v/-q`)
//! 2. RUST_LOG environment variable
//! 3. Binary-specific default

use anyhow::Result;
use clap_verbosity_flag::{LogLevel, Verbosity};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging with the specified verbosity level and default filter.
///
/// # Example
///
/// ```no_run
/// use clap::Parser;
/// use clap_verbosity_flag::{Verbosity, WarnLevel};
/// use impt_common::logging;
///
/// #[derive(Parser)]
/// struct Args {
///     #[clap(flatten)]
///     verbosity: Verbosity<WarnLevel>,
/// }
///
/// let args = Args::parse();
/// logging::init_logging(&args.verbosity, "impt=warn").unwrap();
/// ```
pub fn init_logging<L: LogLevel>(verbosity: &Verbosity<L>, default_filter: &str) -> Result<()> {
    let filter = build_filter(verbosity, default_filter)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .try_init()?;

    Ok(())
}

/// Initialize logging only when explicitly requested.
///
/// Prompts and tables go to the terminal, so the CLI stays silent unless a
/// `-v` flag or RUST_LOG asks for diagnostics.
///
/// Returns `true` if a subscriber was installed.
pub fn init_cli_logging<L: LogLevel>(
    verbosity: &Verbosity<L>,
    default_filter: &str,
) -> Result<bool> {
    if verbosity.is_present() || std::env::var("RUST_LOG").is_ok() {
        init_logging(verbosity, default_filter)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

fn build_filter<L: LogLevel>(verbosity: &Verbosity<L>, default_filter: &str) -> Result<EnvFilter> {
    if verbosity.is_present() {
        let level = verbosity
            .log_level()
            .map(|l| l.to_string())
            .unwrap_or_else(|| "off".to_string());
        return Ok(EnvFilter::try_new(level)?);
    }
    Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use clap_verbosity_flag::WarnLevel;

    #[derive(Parser)]
    struct TestArgs {
        #[clap(flatten)]
        verbosity: Verbosity<WarnLevel>,
    }

    #[test]
    fn test_verbose_flag_overrides_default_filter() {
        let args = TestArgs::parse_from(["impt", "-vv"]);
        let filter = build_filter(&args.verbosity, "impt=warn").unwrap();
        assert!(filter.to_string().eq_ignore_ascii_case("debug"));
    }

    #[test]
    fn test_quiet_flag_turns_logging_off() {
        let args = TestArgs::parse_from(["impt", "-qq"]);
        let filter = build_filter(&args.verbosity, "impt=warn").unwrap();
        assert!(filter.to_string().eq_ignore_ascii_case("off"));
    }
}
