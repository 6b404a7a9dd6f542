//! scidown CLI - journal issue PDF downloader

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use scidown::config::{DEFAULT_BASE_URL, DEFAULT_DOWNLOAD_DIR, DEFAULT_ISSUE, DEFAULT_VOLUME};
use scidown::{
    extract_dois, extract_download_urls, fetch_toc, remove_last_page, snapshot_pdfs,
    BatchDownloader, ChromeDownloader, ChromeOptions, Doi, Error, IssueLocation, WaitOptions,
};

#[derive(Parser)]
#[command(name = "scidown")]
#[command(version)]
#[command(about = "Download a journal issue's PDFs and strip their trailing page", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the article PDFs of an issue
    Toc {
        #[command(flatten)]
        issue: IssueArgs,

        /// Print DOIs instead of download links
        #[arg(long)]
        dois: bool,

        /// Print a JSON array
        #[arg(long)]
        json: bool,

        /// Only list the first N articles
        #[arg(short, long, value_name = "N")]
        limit: Option<usize>,
    },

    /// Download the article PDFs of an issue through Chrome
    #[command(alias = "dl")]
    Download {
        #[command(flatten)]
        issue: IssueArgs,

        /// Download directory
        #[arg(short, long, value_name = "DIR", env = "SCIDOWN_DIR", default_value = DEFAULT_DOWNLOAD_DIR)]
        dir: PathBuf,

        /// Only download the first N articles
        #[arg(short, long, value_name = "N")]
        limit: Option<usize>,

        /// Polling passes to wait for downloads
        #[arg(long, default_value_t = scidown::wait::DEFAULT_TIMEOUT)]
        timeout: u32,

        /// Run Chrome without a window
        #[arg(long)]
        headless: bool,

        /// Remove the last page of every PDF the run produced
        #[arg(long)]
        trim: bool,
    },

    /// Remove the last page of PDF files, in place
    Trim {
        /// PDF files to rewrite
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct IssueArgs {
    /// Full TOC URL (overrides volume/issue/base URL)
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Journal volume
    #[arg(long, env = "SCIDOWN_VOLUME", default_value_t = DEFAULT_VOLUME)]
    volume: u32,

    /// Issue number
    #[arg(long, env = "SCIDOWN_ISSUE", default_value_t = DEFAULT_ISSUE)]
    issue: u32,

    /// TOC base URL
    #[arg(long, value_name = "URL", env = "SCIDOWN_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,
}

impl IssueArgs {
    fn toc_url(&self) -> String {
        self.url.clone().unwrap_or_else(|| {
            IssueLocation::new(self.volume, self.issue)
                .with_base_url(self.base_url.as_str())
                .toc_url()
        })
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Toc {
            issue,
            dois,
            json,
            limit,
        }) => cmd_toc(&issue, dois, json, limit),
        Some(Commands::Download {
            issue,
            dir,
            limit,
            timeout,
            headless,
            trim,
        }) => cmd_download(&issue, &dir, limit, timeout, headless, trim),
        Some(Commands::Trim { files }) => cmd_trim(&files),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: scidown <COMMAND>".yellow());
            println!("       scidown --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_toc(
    issue: &IssueArgs,
    dois: bool,
    json: bool,
    limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let toc_url = issue.toc_url();
    eprintln!("{} {}", "Issue URL:".cyan().bold(), toc_url);

    let html = fetch_toc(&toc_url)?;
    let (output, count) = if dois {
        let mut dois = extract_dois(&html);
        if let Some(n) = limit {
            dois.truncate(n);
        }
        (render_dois(&dois, json)?, dois.len())
    } else {
        let mut urls = extract_download_urls(&html);
        if let Some(n) = limit {
            urls.truncate(n);
        }
        (render_urls(&urls, json)?, urls.len())
    };

    if !output.is_empty() {
        println!("{}", output);
    }
    eprintln!("{} {} articles", "Found".green(), count);

    Ok(())
}

fn render_dois(dois: &[Doi], json: bool) -> serde_json::Result<String> {
    if json {
        return serde_json::to_string_pretty(dois);
    }
    Ok(dois
        .iter()
        .map(Doi::to_string)
        .collect::<Vec<_>>()
        .join("\n"))
}

fn render_urls(urls: &[String], json: bool) -> serde_json::Result<String> {
    if json {
        return serde_json::to_string_pretty(urls);
    }
    Ok(urls.join("\n"))
}

/// Run `f` while `spinner` ticks, clearing it on success and on error.
fn with_spinner<T, E>(spinner: &ProgressBar, f: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
    let result = f();
    spinner.finish_and_clear();
    result
}

fn cmd_download(
    issue: &IssueArgs,
    dir: &Path,
    limit: Option<usize>,
    timeout: u32,
    headless: bool,
    trim: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let downloader = BatchDownloader::new()
        .with_directory(dir)
        .with_wait_options(WaitOptions::new().with_timeout(timeout));
    let directory = downloader.directory().to_path_buf();
    log::debug!("Download directory: {}", directory.display());

    // Fail before fetching anything or starting Chrome.
    if !directory.is_dir() {
        return Err(Error::DirectoryMissing(directory).into());
    }

    let toc_url = issue.toc_url();
    println!("{} {}", "Issue URL:".cyan().bold(), toc_url);
    let mut urls = extract_download_urls(&fetch_toc(&toc_url)?);
    if let Some(n) = limit {
        urls.truncate(n);
    }
    if urls.is_empty() {
        println!("{}", "No article PDFs found.".yellow());
        return Ok(());
    }

    println!("{}", "Some links to PDFs in this issue:".dimmed());
    for url in urls.iter().take(3) {
        println!("  {} {}", "─".dimmed(), url);
    }

    let before = snapshot_pdfs(&directory)?;

    let mut chrome = ChromeDownloader::launch(
        ChromeOptions::new()
            .headless(headless)
            .with_download_dir(&directory),
    )?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_message(format!("Downloading {} PDFs...", urls.len()));
    spinner.enable_steady_tick(std::time::Duration::from_millis(120));
    let report = with_spinner(&spinner, || downloader.download(&mut chrome, &urls))?;

    let status = if report.timed_out(downloader.wait_options()) {
        "Stopped waiting".yellow().bold()
    } else {
        "Done!".green().bold()
    };
    println!(
        "{} {} requested, {} entries in {}",
        status,
        report.requested,
        report.files_present,
        report.directory.display()
    );

    if trim {
        let after = snapshot_pdfs(&directory)?;
        let fresh: Vec<PathBuf> = after.difference(&before).cloned().collect();
        cmd_trim(&fresh)?;
    }

    Ok(())
}

fn cmd_trim(files: &[PathBuf]) -> Result<(), Box<dyn std::error::Error>> {
    if files.is_empty() {
        println!("{}", "Nothing to trim.".yellow());
        return Ok(());
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut reports = Vec::with_capacity(files.len());
    for file in files {
        pb.set_message(file.display().to_string());
        reports.push(remove_last_page(file)?);
        pb.inc(1);
    }
    pb.finish_with_message("Done!");

    println!("\n{}", "Trimmed files:".green().bold());
    for (i, report) in reports.iter().enumerate() {
        let branch = if i + 1 == reports.len() { "└─" } else { "├─" };
        println!(
            "  {} {} ({} -> {} pages)",
            branch.dimmed(),
            report.path.display(),
            report.pages_before,
            report.pages_after
        );
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "scidown".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Journal issue PDF downloader");
    println!();
    println!("License: MIT");
}
