//! Corpus loading from PDF

use std::path::Path;
use std::process::Command;
use tracing::info;

use lexq_core::{Error, Result};

/// One page of extracted corpus text
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub number: usize,
    pub text: String,
}

impl Page {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// Loads the corpus PDF into page-level text records
///
/// Extraction shells out to the `pdftotext` binary (poppler); pages in
/// its output are separated by form-feed characters. A missing file,
/// a missing binary, or an empty extraction is a fatal corpus error.
pub struct PdfLoader;

impl PdfLoader {
    pub fn load(path: &Path) -> Result<Vec<Page>> {
        if !path.exists() {
            return Err(Error::Corpus(format!(
                "corpus file not found: {}",
                path.display()
            )));
        }

        let output = Command::new("pdftotext")
            .arg("-layout")
            .arg("-enc")
            .arg("UTF-8")
            .arg(path)
            .arg("-")
            .output()
            .map_err(|e| {
                Error::Corpus(format!(
                    "failed to run pdftotext: {} (is poppler installed?)",
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Corpus(format!("pdftotext failed: {}", stderr)));
        }

        let text = String::from_utf8_lossy(&output.stdout);
        let pages: Vec<Page> = text
            .split('\u{c}')
            .enumerate()
            .filter(|(_, page_text)| !page_text.trim().is_empty())
            .map(|(i, page_text)| Page::new(i + 1, page_text))
            .collect();

        if pages.is_empty() {
            return Err(Error::Corpus(format!(
                "no text extracted from {}",
                path.display()
            )));
        }

        info!(pages = pages.len(), corpus = %path.display(), "extracted corpus text");
        Ok(pages)
    }
}
