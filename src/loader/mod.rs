
use pulldown_cmark::{Event, Parser, TagEnd};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// A page of extracted document text
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentPage {
    /// Plain text content of the page
    pub text: String,
    /// 1-based page number, when the source format has pages
    pub page: Option<u32>,
}

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to extract text from {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Load a document into plain-text pages, dispatching on file extension.
/// PDFs yield one page per PDF page; Markdown and plain text yield a single
/// page without a page number. Unknown extensions are read as plain text.
/// Pages that are empty after extraction are dropped.
#[inline]
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<DocumentPage>, LoaderError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(LoaderError::NotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let pages = match extension.as_deref() {
        Some("pdf") => load_pdf(path)?,
        Some("md" | "markdown") => load_markdown(path)?,
        _ => load_plain_text(path)?,
    };

    let pages: Vec<DocumentPage> = pages
        .into_iter()
        .filter(|page| !page.text.trim().is_empty())
        .collect();

    debug!("Loaded {} pages from {}", pages.len(), path.display());

    Ok(pages)
}

fn load_pdf(path: &Path) -> Result<Vec<DocumentPage>, LoaderError> {
    let page_texts =
        pdf_extract::extract_text_by_pages(path).map_err(|e| LoaderError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    Ok(page_texts
        .into_iter()
        .enumerate()
        .map(|(index, text)| DocumentPage {
            text,
            page: Some(index as u32 + 1),
        })
        .collect())
}

fn load_markdown(path: &Path) -> Result<Vec<DocumentPage>, LoaderError> {
    let content = fs::read_to_string(path)?;
    let mut text = String::new();

    for event in Parser::new(&content) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak => text.push('\n'),
            Event::End(
                TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item | TagEnd::CodeBlock,
            ) => text.push_str("\n\n"),
            _ => {}
        }
    }

    Ok(vec![DocumentPage { text, page: None }])
}

fn load_plain_text(path: &Path) -> Result<Vec<DocumentPage>, LoaderError> {
    let text = fs::read_to_string(path)?;

    Ok(vec![DocumentPage { text, page: None }])
}
