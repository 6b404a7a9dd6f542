//! Download-completion waiting.
//!
//! Chrome writes a download to `<name>.crdownload` and renames it once the
//! transfer finishes. Waiting therefore means polling the directory until no
//! such temporary file is left and, optionally, the expected number of files
//! is present.
//!
//! The timeout counts polling passes, not seconds: every pass sleeps for
//! [`WaitOptions::poll_interval`] and advances the counter by one.

use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::error::Result;

/// Suffix Chrome appends to files it is still writing.
pub const IN_PROGRESS_SUFFIX: &str = ".crdownload";

/// Default number of polling passes.
pub const DEFAULT_TIMEOUT: u32 = 10;

/// Default sleep between polling passes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Options for [`wait_for_downloads`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitOptions {
    /// Maximum number of polling passes
    pub timeout: u32,

    /// Sleep before each pass
    pub poll_interval: Duration,

    /// File-name suffix marking an unfinished download
    pub suffix: String,
}

impl WaitOptions {
    /// Create wait options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of polling passes.
    pub fn with_timeout(mut self, timeout: u32) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the sleep between passes.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the in-progress suffix.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            suffix: IN_PROGRESS_SUFFIX.to_string(),
        }
    }
}

/// Poll `directory` until downloads finish or the pass budget runs out.
///
/// A pass is satisfied when no entry name ends with the in-progress suffix
/// and, if `expected` is a nonzero count, the directory holds exactly that
/// many entries. `Some(0)` behaves like `None`. Returns the number of passes made, which equals
/// `options.timeout` when the budget ran out.
pub fn wait_for_downloads<P: AsRef<Path>>(
    directory: P,
    expected: Option<usize>,
    options: &WaitOptions,
) -> Result<u32> {
    let directory = directory.as_ref();
    let mut passes = 0;
    let mut waiting = true;

    while waiting && passes < options.timeout {
        thread::sleep(options.poll_interval);

        let names = list_names(directory)?;
        let in_progress = names
            .iter()
            .filter(|name| name.ends_with(&options.suffix))
            .count();
        let count_mismatch = expected
            .filter(|&n| n > 0)
            .is_some_and(|n| names.len() != n);
        waiting = in_progress > 0 || count_mismatch;

        passes += 1;
        log::debug!(
            "wait pass {}/{}: {} entries, {} in progress",
            passes,
            options.timeout,
            names.len(),
            in_progress
        );
    }

    if waiting {
        log::debug!(
            "Gave up waiting on {} after {} passes",
            directory.display(),
            passes
        );
    }
    Ok(passes)
}

fn list_names(directory: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(directory)? {
        names.push(entry?.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}
