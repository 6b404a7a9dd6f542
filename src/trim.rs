//! Trailing page removal.
//!
//! Downloaded articles end with a page of publisher boilerplate. Trimming
//! rewrites the file in place without that page. There is no backup: an
//! interrupted write leaves a damaged file behind.

use std::fs;
use std::path::{Path, PathBuf};

use lopdf::Document;

use crate::detect::{detect_format_from_bytes, detect_format_from_path};
use crate::error::Result;

/// Outcome of trimming one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimReport {
    /// File that was rewritten
    pub path: PathBuf,

    /// Page count before trimming
    pub pages_before: u32,

    /// Page count after trimming
    pub pages_after: u32,
}

/// Remove the last page of the PDF at `path`, overwriting the file.
///
/// A single-page document becomes an empty (zero-page) document; a
/// zero-page document is rewritten unchanged.
pub fn remove_last_page<P: AsRef<Path>>(path: P) -> Result<TrimReport> {
    let path = path.as_ref();
    detect_format_from_path(path)?;

    let mut doc = Document::load(path)?;
    let (pages_before, pages_after) = drop_last_page(&mut doc);
    doc.save(path)?;

    log::debug!(
        "Trimmed {}: {} -> {} pages",
        path.display(),
        pages_before,
        pages_after
    );
    Ok(TrimReport {
        path: path.to_path_buf(),
        pages_before,
        pages_after,
    })
}

/// Remove the last page of an in-memory PDF.
///
/// Returns the rewritten bytes and the page counts before and after.
pub fn remove_last_page_bytes(data: &[u8]) -> Result<(Vec<u8>, u32, u32)> {
    detect_format_from_bytes(data)?;

    let mut doc = Document::load_mem(data)?;
    let (pages_before, pages_after) = drop_last_page(&mut doc);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok((buffer, pages_before, pages_after))
}

/// Trim every file in `paths`, stopping at the first failure.
pub fn remove_last_page_all<I, P>(paths: I) -> Result<Vec<TrimReport>>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    paths.into_iter().map(remove_last_page).collect()
}

/// Page count of the PDF at `path`.
pub fn page_count<P: AsRef<Path>>(path: P) -> Result<u32> {
    let data = fs::read(path)?;
    detect_format_from_bytes(&data)?;
    Ok(Document::load_mem(&data)?.get_pages().len() as u32)
}

fn drop_last_page(doc: &mut Document) -> (u32, u32) {
    let before = doc.get_pages().len() as u32;
    if before > 0 {
        doc.delete_pages(&[before]);
        doc.prune_objects();
    }
    (before, doc.get_pages().len() as u32)
}
