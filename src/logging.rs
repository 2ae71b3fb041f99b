//! Logging setup.
//!
//! Log records go to stderr, so that command output on stdout (for example
//! `scan --json`) stays machine readable. Filter precedence, highest first:
//! `RUST_LOG`, `-v` flags, the configured filter, [`DEFAULT_FILTER`].

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub const DEFAULT_FILTER: &str = "warn,docscan=info,docscan_reader=info,docscan_tasks=info";
const DEBUG_FILTER: &str = "warn,docscan=debug,docscan_reader=debug,docscan_tasks=debug,docscan_config=debug";
const TRACE_FILTER: &str = "info,docscan=trace,docscan_reader=trace,docscan_tasks=trace,docscan_config=trace";

/// Filter directives used when `RUST_LOG` is not set.
pub fn directives(verbosity: u8, configured: Option<&str>) -> &str {
    match verbosity {
        0 => configured.unwrap_or(DEFAULT_FILTER),
        1 => DEBUG_FILTER,
        _ => TRACE_FILTER,
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(verbosity: u8, configured: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directives(verbosity, configured)))
        .or_raise(|| ErrorKind::Logging)?;
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .or_raise(|| ErrorKind::Logging)?;
    Ok(())
}
