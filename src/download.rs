//! Batch downloading through a [`DownloadPort`].
//!
//! The port is whatever turns a URL into a file in the target directory,
//! normally a Chrome session (see `browser`). Downloads are requested one
//! after another, then the directory is polled until they settle.
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "browser")]
//! # fn main() -> scidown::Result<()> {
//! use scidown::browser::{ChromeDownloader, ChromeOptions};
//! use scidown::download::BatchDownloader;
//!
//! let urls = scidown::extract_pdf_urls(
//!     "https://www.science.org/toc/science/377/6609",
//!     false,
//! )?;
//! let mut chrome = ChromeDownloader::launch(ChromeOptions::default())?;
//! let report = BatchDownloader::new().download(&mut chrome, &urls[..4])?;
//! println!("{} files present", report.files_present);
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "browser"))]
//! # fn main() {}
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{default_download_dir, expand_home};
use crate::error::{Error, Result};
use crate::wait::{wait_for_downloads, WaitOptions};

/// Something that, given a URL, eventually produces a file in a directory.
pub trait DownloadPort {
    /// Configure the port to save downloads into `directory` without prompting.
    fn prepare(&mut self, directory: &Path) -> Result<()>;

    /// Trigger the download of one URL. Blocks until the request is issued,
    /// not until the file is complete.
    fn request(&mut self, url: &str) -> Result<()>;

    /// Release the underlying session.
    fn close(&mut self) -> Result<()>;
}

/// Outcome of a batch download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    /// Directory the files were saved to
    pub directory: PathBuf,

    /// Number of URLs requested
    pub requested: usize,

    /// Polling passes spent waiting
    pub iterations: u32,

    /// Entries in the directory when waiting stopped
    pub files_present: usize,

    /// Entries still carrying the in-progress suffix
    pub in_progress: usize,
}

impl DownloadReport {
    /// Whether waiting stopped because the pass budget ran out.
    ///
    /// An empty batch has no file count to reach; only unfinished downloads
    /// can keep it waiting.
    pub fn timed_out(&self, options: &WaitOptions) -> bool {
        let count_mismatch = self.requested > 0 && self.files_present != self.requested;
        self.iterations >= options.timeout && (self.in_progress > 0 || count_mismatch)
    }
}

/// Downloads a list of URLs into one directory.
#[derive(Debug, Clone)]
pub struct BatchDownloader {
    directory: PathBuf,
    wait: WaitOptions,
}

impl BatchDownloader {
    /// Downloader targeting `~/Downloads/` with default wait options.
    pub fn new() -> Self {
        Self {
            directory: default_download_dir(),
            wait: WaitOptions::default(),
        }
    }

    /// Set the target directory. A leading `~` is expanded.
    pub fn with_directory(mut self, directory: impl AsRef<Path>) -> Self {
        self.directory = expand_home(directory);
        self
    }

    /// Set the wait options.
    pub fn with_wait_options(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    /// Target directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Wait options.
    pub fn wait_options(&self) -> &WaitOptions {
        &self.wait
    }

    /// Request every URL through `port`, then wait for the files.
    ///
    /// Fails with [`Error::DirectoryMissing`] before touching the port when
    /// the target directory does not exist. A wait that runs out of passes
    /// is not an error; the report shows how far it got.
    pub fn download<D: DownloadPort + ?Sized>(
        &self,
        port: &mut D,
        urls: &[String],
    ) -> Result<DownloadReport> {
        if !self.directory.is_dir() {
            return Err(Error::DirectoryMissing(self.directory.clone()));
        }

        port.prepare(&self.directory)?;

        log::info!(
            "Requesting {} PDFs into {}",
            urls.len(),
            self.directory.display()
        );
        for url in urls {
            log::debug!("GET {}", url);
            if let Err(e) = port.request(url) {
                log::warn!("Request for {} failed: {}", url, e);
            }
        }

        let waited = wait_for_downloads(&self.directory, Some(urls.len()), &self.wait);
        let closed = port.close();
        let iterations = waited?;
        closed?;

        let mut files_present = 0;
        let mut in_progress = 0;
        for entry in fs::read_dir(&self.directory)? {
            files_present += 1;
            if entry?
                .file_name()
                .to_string_lossy()
                .ends_with(&self.wait.suffix)
            {
                in_progress += 1;
            }
        }
        log::info!(
            "Stopped waiting after {} passes: {} entries, {} in progress",
            iterations,
            files_present,
            in_progress
        );

        Ok(DownloadReport {
            directory: self.directory.clone(),
            requested: urls.len(),
            iterations,
            files_present,
            in_progress,
        })
    }
}

impl Default for BatchDownloader {
    fn default() -> Self {
        Self::new()
    }
}

/// Download `urls` into `directory` with the default ten-pass wait.
pub fn download_pdfs<D: DownloadPort + ?Sized, P: AsRef<Path>>(
    port: &mut D,
    urls: &[String],
    directory: P,
) -> Result<DownloadReport> {
    BatchDownloader::new()
        .with_directory(directory)
        .download(port, urls)
}

/// Names of the `.pdf` files currently in `directory`.
///
/// Taking one snapshot before and one after a batch tells which files the
/// batch produced.
pub fn snapshot_pdfs<P: AsRef<Path>>(directory: P) -> Result<BTreeSet<PathBuf>> {
    let mut pdfs = BTreeSet::new();
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if is_pdf && path.is_file() {
            pdfs.insert(path);
        }
    }
    Ok(pdfs)
}
