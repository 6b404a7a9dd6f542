//! Integration tests for the waiter and the batch downloader, driven by a
//! fake download port instead of a browser.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use scidown::{
    download_pdfs, snapshot_pdfs, wait_for_downloads, BatchDownloader, DownloadPort, Error,
    WaitOptions,
};

/// What the fake leaves behind for each requested URL.
#[derive(Clone, Copy)]
enum Outcome {
    /// A finished `<n>.pdf`
    Finished,
    /// A `<n>.pdf.crdownload` that never completes
    Stalled,
    /// Nothing at all
    Nothing,
}

/// Fake port that writes files synchronously and records every call.
struct FakePort {
    outcome: Outcome,
    directory: Option<PathBuf>,
    requested: Vec<String>,
    prepared: usize,
    closed: usize,
    fail_on: Option<String>,
}

impl FakePort {
    fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            directory: None,
            requested: Vec::new(),
            prepared: 0,
            closed: 0,
            fail_on: None,
        }
    }
}

impl DownloadPort for FakePort {
    fn prepare(&mut self, directory: &Path) -> scidown::Result<()> {
        self.prepared += 1;
        self.directory = Some(directory.to_path_buf());
        Ok(())
    }

    fn request(&mut self, url: &str) -> scidown::Result<()> {
        self.requested.push(url.to_string());
        if self.fail_on.as_deref() == Some(url) {
            return Err(Error::Browser("navigation failed".to_string()));
        }

        let dir = self.directory.clone().expect("prepare is called first");
        let n = self.requested.len();
        match self.outcome {
            Outcome::Finished => fs::write(dir.join(format!("{n}.pdf")), b"%PDF-1.7\n")?,
            Outcome::Stalled => fs::write(dir.join(format!("{n}.pdf.crdownload")), b"")?,
            Outcome::Nothing => {}
        }
        Ok(())
    }

    fn close(&mut self) -> scidown::Result<()> {
        self.closed += 1;
        Ok(())
    }
}

fn urls(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| format!("https://www.science.org/doi/pdf/10.1126/science.{i}?download=true"))
        .collect()
}

fn fast(timeout: u32) -> WaitOptions {
    WaitOptions::new()
        .with_timeout(timeout)
        .with_poll_interval(Duration::ZERO)
}

// ==================== Waiter ====================

#[test]
fn test_wait_returns_after_one_pass_when_finished() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.pdf"), b"").unwrap();
    fs::write(dir.path().join("b.pdf"), b"").unwrap();

    let passes = wait_for_downloads(dir.path(), Some(2), &fast(10)).unwrap();
    assert_eq!(passes, 1);
}

#[test]
fn test_wait_runs_out_with_in_progress_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.pdf"), b"").unwrap();
    fs::write(dir.path().join("b.pdf.crdownload"), b"").unwrap();

    let passes = wait_for_downloads(dir.path(), None, &fast(10)).unwrap();
    assert!(passes >= 10);
}

#[test]
fn test_wait_runs_out_on_count_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.pdf"), b"").unwrap();

    let passes = wait_for_downloads(dir.path(), Some(3), &fast(4)).unwrap();
    assert_eq!(passes, 4);
}

#[test]
fn test_wait_timeout_counts_passes_not_seconds() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("x.crdownload"), b"").unwrap();

    let options = WaitOptions::new()
        .with_timeout(3)
        .with_poll_interval(Duration::from_millis(10));
    let start = Instant::now();
    let passes = wait_for_downloads(dir.path(), None, &options).unwrap();

    assert_eq!(passes, 3);
    assert!(start.elapsed() < Duration::from_secs(3));
}

#[test]
fn test_wait_zero_expected_means_no_count_check() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("unrelated.pdf"), b"").unwrap();

    let passes = wait_for_downloads(dir.path(), Some(0), &fast(5)).unwrap();
    assert_eq!(passes, 1);
}

// ==================== Batch downloader ====================

#[test]
fn test_missing_directory_aborts_before_navigation() {
    let missing = tempfile::tempdir().unwrap().path().join("gone");
    let mut port = FakePort::new(Outcome::Finished);

    let result = download_pdfs(&mut port, &urls(3), &missing);

    match result {
        Err(Error::DirectoryMissing(path)) => assert_eq!(path, missing),
        other => panic!("expected DirectoryMissing, got {:?}", other),
    }
    assert_eq!(port.prepared, 0);
    assert!(port.requested.is_empty());
    assert_eq!(port.closed, 0);
}

#[test]
fn test_batch_requests_in_order_and_waits() {
    let dir = tempfile::tempdir().unwrap();
    let mut port = FakePort::new(Outcome::Finished);
    let urls = urls(4);

    let report = BatchDownloader::new()
        .with_directory(dir.path())
        .with_wait_options(fast(10))
        .download(&mut port, &urls)
        .unwrap();

    assert_eq!(port.requested, urls);
    assert_eq!(port.prepared, 1);
    assert_eq!(port.closed, 1);
    assert_eq!(report.requested, 4);
    assert_eq!(report.files_present, 4);
    assert_eq!(report.iterations, 1);
    assert_eq!(report.in_progress, 0);
    assert_eq!(report.directory, dir.path());
}

#[test]
fn test_batch_timeout_is_silent_and_still_closes() {
    let dir = tempfile::tempdir().unwrap();
    let mut port = FakePort::new(Outcome::Stalled);
    let options = fast(5);

    let report = BatchDownloader::new()
        .with_directory(dir.path())
        .with_wait_options(options.clone())
        .download(&mut port, &urls(2))
        .unwrap();

    assert_eq!(report.iterations, 5);
    assert_eq!(report.in_progress, 2);
    assert_eq!(port.closed, 1);
    assert!(report.timed_out(&options));
}

#[test]
fn test_batch_with_nothing_arriving() {
    let dir = tempfile::tempdir().unwrap();
    let mut port = FakePort::new(Outcome::Nothing);
    let options = fast(3);

    let report = BatchDownloader::new()
        .with_directory(dir.path())
        .with_wait_options(options.clone())
        .download(&mut port, &urls(2))
        .unwrap();

    assert_eq!(report.files_present, 0);
    assert!(report.timed_out(&options));
}

#[test]
fn test_empty_batch_in_busy_directory_returns_after_one_pass() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("holiday.jpg"), b"").unwrap();
    fs::write(dir.path().join("old.pdf"), b"%PDF-1.7\n").unwrap();
    let mut port = FakePort::new(Outcome::Finished);
    let options = fast(5);

    let report = BatchDownloader::new()
        .with_directory(dir.path())
        .with_wait_options(options.clone())
        .download(&mut port, &[])
        .unwrap();

    assert!(port.requested.is_empty());
    assert_eq!(port.closed, 1);
    assert_eq!(report.iterations, 1);
    assert_eq!(report.files_present, 2);
    assert!(!report.timed_out(&options));
}

#[test]
fn test_failed_request_does_not_stop_batch() {
    let dir = tempfile::tempdir().unwrap();
    let urls = urls(3);
    let mut port = FakePort::new(Outcome::Finished);
    port.fail_on = Some(urls[1].clone());

    let report = BatchDownloader::new()
        .with_directory(dir.path())
        .with_wait_options(fast(2))
        .download(&mut port, &urls)
        .unwrap();

    assert_eq!(port.requested.len(), 3);
    assert_eq!(report.files_present, 2);
    assert_eq!(port.closed, 1);
}

#[test]
fn test_snapshot_diff_finds_new_pdfs() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("old.pdf"), b"%PDF-1.7\n").unwrap();
    let before = snapshot_pdfs(dir.path()).unwrap();

    let mut port = FakePort::new(Outcome::Finished);
    BatchDownloader::new()
        .with_directory(dir.path())
        .with_wait_options(fast(1))
        .download(&mut port, &urls(2))
        .unwrap();

    let after = snapshot_pdfs(dir.path()).unwrap();
    let fresh: Vec<_> = after.difference(&before).collect();
    assert_eq!(fresh.len(), 2);
    assert!(fresh.iter().all(|p| p.file_name().unwrap() != "old.pdf"));
}
