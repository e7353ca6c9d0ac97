//! Log line sources: local files and remote URLs.
//!
//! A source yields a lazily concatenated sequence of candidate log lines.
//! Sources degrade rather than fail: an unreadable file, a failed fetch, or a
//! non-200 response contributes zero lines (with a diagnostic) and the pass
//! carries on. Empty input is not an error; it produces an all-zero report.

pub mod finder;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use reqwest::StatusCode;
use tracing::warn;

/// Where raw log lines come from.
#[derive(Debug, Clone)]
pub enum LogSource {
    /// Local files, read in order
    Files(Vec<PathBuf>),
    /// One remote URL, fetched with a blocking GET
    Url(String),
}

impl LogSource {
    /// The line sequence for this source.
    pub fn lines(&self) -> Box<dyn Iterator<Item = String>> {
        match self {
            LogSource::Files(files) => Box::new(file_lines(files.clone())),
            LogSource::Url(url) => Box::new(url_lines(url).into_iter()),
        }
    }
}

fn file_lines(files: Vec<PathBuf>) -> impl Iterator<Item = String> {
    if files.is_empty() {
        warn!("no files provided for reading");
    }

    files.into_iter().flat_map(|path| read_file_lines(path))
}

fn read_file_lines(path: PathBuf) -> Box<dyn Iterator<Item = String>> {
    let file = match File::open(&path) {
        Ok(file) => file,
        Err(err) => {
            warn!(path = %path.display(), %err, "skipping unreadable log file");
            return Box::new(std::iter::empty());
        }
    };

    let reader = BufReader::new(file);
    Box::new(reader.lines().filter_map(move |line| match line {
        Ok(line) => Some(line),
        Err(err) => {
            warn!(path = %path.display(), %err, "skipping undecodable line");
            None
        }
    }))
}

fn url_lines(url: &str) -> Vec<String> {
    let response = match reqwest::blocking::get(url) {
        Ok(response) => response,
        Err(err) => {
            warn!(%url, %err, "failed to fetch log data");
            return Vec::new();
        }
    };

    if response.status() != StatusCode::OK {
        warn!(%url, status = %response.status(), "unexpected response fetching log data");
        return Vec::new();
    }

    match response.text() {
        Ok(body) => body.lines().map(str::to_string).collect(),
        Err(err) => {
            warn!(%url, %err, "failed to read log data body");
            Vec::new()
        }
    }
}
