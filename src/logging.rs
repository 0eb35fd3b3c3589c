//! Structured logging setup for the command-line tool.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "info,sectionize=debug"
    } else {
        "info"
    }
}

/// Initialize a stderr `tracing` subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `verbose` raises this crate to `debug`.
pub fn init_logging(verbose: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("failed to initialise logging: {err}"))?;

    tracing::debug!("logging initialised");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_raises_crate_level() {
        assert_eq!(default_directives(false), "info");
        assert_eq!(default_directives(true), "info,sectionize=debug");
    }
}
