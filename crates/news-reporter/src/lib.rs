//! News reporter.
//!
//! Submits (source, headline) pairs to a news host, either once from
//! command-line arguments or from an interactive prompt loop.

pub mod cli;
pub mod error;
pub mod reporter;

#[cfg(test)]
mod tests;

pub use cli::{interactive, SessionSummary};
pub use error::{ReporterError, ReporterResult};
pub use reporter::{Reporter, DEFAULT_TIMEOUT};
