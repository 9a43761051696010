//! Abort Handlers
//!
//! A client normally returns failures to its caller. When an abort handler
//! is installed, every failure is first handed to it together with its
//! rendered message. The stock handler, installed by debug mode, ends the
//! process.

use crate::error::Error;
use tracing::error;

/// Called with each failure and its localized message before the failure
/// is returned.
pub type AbortHandler = Box<dyn Fn(&Error, &str) + Send>;

/// Logs the failure, prints it to stderr and exits with status 1.
pub fn terminate(err: &Error, message: &str) {
    error!(kind = ?err.kind(), "{}", message);
    eprintln!("{}", message);
    std::process::exit(1);
}
