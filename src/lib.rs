//! # scidown
//!
//! Download every article PDF of a journal issue and strip the trailing
//! boilerplate page from each one.
//!
//! ## Quick Start
//!
//! ```no_run
//! use scidown::{extract_pdf_urls_for_issue, remove_last_page, IssueLocation};
//!
//! fn main() -> scidown::Result<()> {
//!     let issue = IssueLocation::new(377, 6609);
//!     let urls = extract_pdf_urls_for_issue(&issue, false)?;
//!     println!("{} PDFs in {}", urls.len(), issue.toc_url());
//!
//!     let report = remove_last_page("article.pdf")?;
//!     println!("{} -> {} pages", report.pages_before, report.pages_after);
//!     Ok(())
//! }
//! ```
//!
//! ## Pieces
//!
//! - [`toc`]: TOC page fetching and article link extraction
//! - [`download`]: batch downloading through a [`DownloadPort`]
//! - [`wait`]: polling a directory until downloads settle
//! - [`trim`]: last-page removal
//! - `browser`: Chrome implementation of [`DownloadPort`] (feature `browser`)

pub mod config;
pub mod detect;
pub mod download;
pub mod error;
pub mod toc;
pub mod trim;
pub mod wait;

#[cfg(feature = "browser")]
pub mod browser;

// Re-export commonly used types
pub use config::{default_download_dir, expand_home, IssueLocation};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, PdfFormat};
pub use download::{download_pdfs, snapshot_pdfs, BatchDownloader, DownloadPort, DownloadReport};
pub use error::{Error, Result};
pub use toc::{
    download_url, extract_dois, extract_download_urls, extract_pdf_urls,
    extract_pdf_urls_for_issue, fetch_toc, Doi,
};
pub use trim::{page_count, remove_last_page, remove_last_page_all, TrimReport};
pub use wait::{wait_for_downloads, WaitOptions};

#[cfg(feature = "browser")]
pub use browser::{ChromeDownloader, ChromeOptions};
