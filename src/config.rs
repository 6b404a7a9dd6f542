//! Configuration values for a run.
//!
//! The issue to scrape and the place downloads land are passed around
//! explicitly instead of living in process-wide globals.

use std::path::{Path, PathBuf};

/// Base URL of the Science table-of-contents pages.
pub const DEFAULT_BASE_URL: &str = "https://www.science.org/toc/science";

/// Default volume.
pub const DEFAULT_VOLUME: u32 = 377;

/// Default issue number.
pub const DEFAULT_ISSUE: u32 = 6609;

/// Default download directory, before home expansion.
pub const DEFAULT_DOWNLOAD_DIR: &str = "~/Downloads/";

/// Location of a journal issue's table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueLocation {
    /// TOC base URL (e.g., `https://www.science.org/toc/science`)
    pub base_url: String,

    /// Journal volume
    pub volume: u32,

    /// Issue within the volume
    pub issue: u32,
}

impl IssueLocation {
    /// Create a location on the default base URL.
    pub fn new(volume: u32, issue: u32) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            volume,
            issue,
        }
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the volume.
    pub fn with_volume(mut self, volume: u32) -> Self {
        self.volume = volume;
        self
    }

    /// Set the issue.
    pub fn with_issue(mut self, issue: u32) -> Self {
        self.issue = issue;
        self
    }

    /// URL of the issue's table of contents: `<base>/<volume>/<issue>`.
    pub fn toc_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.volume,
            self.issue
        )
    }
}

impl Default for IssueLocation {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME, DEFAULT_ISSUE)
    }
}

/// Expand a leading `~` to the current user's home directory.
///
/// Only `~` on its own or followed by a separator is expanded; `~user`
/// forms and paths without a tilde come back unchanged, as does everything
/// when no home directory can be determined.
pub fn expand_home<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) if rest.as_os_str().is_empty() => home,
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

/// Default download directory with `~` expanded.
pub fn default_download_dir() -> PathBuf {
    expand_home(DEFAULT_DOWNLOAD_DIR)
}
