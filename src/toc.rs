//! Table-of-contents link extraction.
//!
//! A TOC page lists every article of an issue. Article PDFs are linked as
//! `/doi/epdf/<prefix>/<suffix>`; the last two path segments of such a link
//! are taken as the article's DOI and turned into a direct download URL.

use std::fmt;

use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};

use crate::config::IssueLocation;
use crate::error::{Error, Result};

/// Substring marking an article PDF link on a TOC page.
pub const EPDF_MARKER: &str = "/doi/epdf/";

/// Prefix of a direct PDF download URL.
pub const PDF_URL_PREFIX: &str = "https://www.science.org/doi/pdf/";

/// Query suffix asking the server to send the PDF as an attachment.
pub const DOWNLOAD_QUERY: &str = "?download=true";

const USER_AGENT: &str = concat!("scidown/", env!("CARGO_PKG_VERSION"));

/// A document identifier parsed out of a TOC link.
///
/// DOI-shaped by construction (`<segment>/<segment>`) but never validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Doi(String);

impl Doi {
    /// Wrap an identifier string.
    pub fn new(doi: impl Into<String>) -> Self {
        Self(doi.into())
    }

    /// Identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Direct download URL for this identifier.
    pub fn download_url(&self) -> String {
        download_url(&self.0)
    }

    /// Derive the identifier from a link by joining its last two path segments.
    fn from_href(href: &str) -> Self {
        let mut segments = href.rsplitn(3, '/');
        let last = segments.next().unwrap_or_default();
        let prefix = segments.next().unwrap_or_default();
        Self(format!("{}/{}", prefix, last))
    }
}

impl fmt::Display for Doi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Build the download URL for an identifier.
pub fn download_url(doi: &str) -> String {
    format!("{}{}{}", PDF_URL_PREFIX, doi, DOWNLOAD_QUERY)
}

/// Fetch a TOC page and return its body.
///
/// No retry and no request timeout. A non-success status is reported as
/// [`Error::TocNotFound`].
pub fn fetch_toc(url: &str) -> Result<String> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(None)
        .build()?;

    log::debug!("GET {}", url);
    let response = client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::TocNotFound {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    Ok(response.text()?)
}

/// Extract article identifiers from TOC markup, in document order.
///
/// Every anchor whose `href` contains [`EPDF_MARKER`] contributes one
/// identifier; duplicates are kept.
pub fn extract_dois(html: &str) -> Vec<Doi> {
    let document = Html::parse_document(html);

    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().name() == "a")
        .filter_map(|element| element.value().attr("href"))
        .filter(|href| href.contains(EPDF_MARKER))
        .map(Doi::from_href)
        .collect()
}

/// Extract direct download URLs from TOC markup, in document order.
pub fn extract_download_urls(html: &str) -> Vec<String> {
    extract_dois(html).iter().map(Doi::download_url).collect()
}

/// Fetch a TOC page and list its article PDFs.
///
/// Returns the raw identifiers when `return_dois` is set, otherwise the
/// download URLs built from them.
pub fn extract_pdf_urls(toc_url: &str, return_dois: bool) -> Result<Vec<String>> {
    let html = fetch_toc(toc_url)?;
    let dois = extract_dois(&html);
    log::info!("Found {} article PDFs at {}", dois.len(), toc_url);

    Ok(if return_dois {
        dois.into_iter().map(|doi| doi.0).collect()
    } else {
        dois.iter().map(Doi::download_url).collect()
    })
}

/// [`extract_pdf_urls`] for an issue location.
pub fn extract_pdf_urls_for_issue(
    location: &IssueLocation,
    return_dois: bool,
) -> Result<Vec<String>> {
    extract_pdf_urls(&location.toc_url(), return_dois)
}
