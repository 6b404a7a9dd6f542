//! Chrome-backed [`DownloadPort`].
//!
//! Downloads go through a real browser session because the publisher only
//! serves PDFs to clients that look like one.
//!
//! Chrome starts on a throwaway profile whose `Default/Preferences` turn off
//! the download prompt and the built-in PDF viewer, so a PDF link is saved
//! instead of previewed. [`DownloadPort::prepare`] then points the session at
//! the target directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use headless_chrome::protocol::cdp::Browser as CdpBrowser;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::json;
use tempfile::TempDir;

use crate::download::DownloadPort;
use crate::error::{Error, Result};

/// Chrome reports a navigation that turned into a download as aborted.
const DOWNLOAD_ABORT: &str = "net::ERR_ABORTED";

/// Options for launching Chrome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromeOptions {
    /// Run without a visible window
    pub headless: bool,

    /// Window size in pixels
    pub window_size: Option<(u32, u32)>,

    /// How long an idle browser is kept alive
    pub idle_timeout: Duration,

    /// Directory written into the profile as the default download location
    pub download_dir: Option<PathBuf>,
}

impl ChromeOptions {
    /// Create launch options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run without a visible window.
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set the window size.
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = Some((width, height));
        self
    }

    /// Set the idle timeout.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Set the profile's default download directory.
    pub fn with_download_dir(mut self, directory: impl Into<PathBuf>) -> Self {
        self.download_dir = Some(directory.into());
        self
    }
}

impl Default for ChromeOptions {
    fn default() -> Self {
        Self {
            headless: false,
            window_size: None,
            idle_timeout: Duration::from_secs(120),
            download_dir: None,
        }
    }
}

/// Profile preferences that make Chrome save PDFs without asking.
///
/// `download_dir`, when given, becomes `download.default_directory`.
pub fn chrome_preferences(download_dir: Option<&Path>) -> serde_json::Value {
    let mut download = json!({
        "prompt_for_download": false,
        "directory_upgrade": true,
    });
    if let Some(dir) = download_dir {
        download["default_directory"] = json!(dir.to_string_lossy());
    }

    json!({
        "download": download,
        "plugins": { "always_open_pdf_externally": true },
        "safebrowsing": { "enabled": true },
    })
}

/// Create a user data directory holding `Default/Preferences`.
fn write_profile(download_dir: Option<&Path>) -> Result<TempDir> {
    let profile = tempfile::Builder::new().prefix("scidown-chrome-").tempdir()?;
    let default = profile.path().join("Default");
    fs::create_dir_all(&default)?;
    let prefs = serde_json::to_vec_pretty(&chrome_preferences(download_dir))
        .map_err(|e| Error::Browser(e.to_string()))?;
    fs::write(default.join("Preferences"), prefs)?;
    Ok(profile)
}

/// A Chrome session with one tab used for every download.
pub struct ChromeDownloader {
    // Dropping the browser terminates the Chrome process.
    browser: Option<Browser>,
    tab: Option<Arc<Tab>>,
    // Removed on drop, after the browser is gone.
    _profile: TempDir,
}

impl ChromeDownloader {
    /// Launch Chrome on a fresh profile and open a tab.
    pub fn launch(options: ChromeOptions) -> Result<Self> {
        let profile = write_profile(options.download_dir.as_deref())?;
        log::debug!("Chrome profile: {}", profile.path().display());

        let launch = LaunchOptions::default_builder()
            .headless(options.headless)
            .window_size(options.window_size)
            .idle_browser_timeout(options.idle_timeout)
            .user_data_dir(Some(profile.path().to_path_buf()))
            .build()
            .map_err(|e| Error::Browser(e.to_string()))?;

        let browser = Browser::new(launch).map_err(browser_err)?;
        let tab = browser.new_tab().map_err(browser_err)?;
        log::debug!("Chrome launched (headless: {})", options.headless);

        Ok(Self {
            browser: Some(browser),
            tab: Some(tab),
            _profile: profile,
        })
    }

    fn tab(&self) -> Result<&Arc<Tab>> {
        self.tab
            .as_ref()
            .ok_or_else(|| Error::Browser("session already closed".to_string()))
    }
}

impl DownloadPort for ChromeDownloader {
    fn prepare(&mut self, directory: &Path) -> Result<()> {
        self.tab()?
            .call_method(CdpBrowser::SetDownloadBehavior {
                behavior: CdpBrowser::SetDownloadBehaviorBehaviorOption::Allow,
                browser_context_id: None,
                download_path: Some(directory.to_string_lossy().into_owned()),
                events_enabled: None,
            })
            .map_err(browser_err)?;
        Ok(())
    }

    fn request(&mut self, url: &str) -> Result<()> {
        match self.tab()?.navigate_to(url) {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains(DOWNLOAD_ABORT) => Ok(()),
            Err(e) => Err(browser_err(e)),
        }
    }

    fn close(&mut self) -> Result<()> {
        let closed = match self.tab.take() {
            Some(tab) => tab.close(false).map(|_| ()).map_err(browser_err),
            None => Ok(()),
        };
        self.browser = None;
        closed
    }
}

fn browser_err(err: impl std::fmt::Display) -> Error {
    Error::Browser(err.to_string())
}
