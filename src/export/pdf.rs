//! PDF export
//!
//! Rendering HTML to PDF is left to a collaborator (a headless browser, a
//! print service). This module prepares the request and hands back the
//! rendered file for the caller to store or download.

use log::{info, warn};

use super::html::generate_html_document;
use crate::error::Result;
use crate::state::Document;

/// What the PDF renderer receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfRequest {
    /// Suggested output file name
    pub file_name: String,
    /// Complete standalone HTML document
    pub html: String,
}

/// A rendered PDF, ready to be written under `file_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfExport {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Renders an HTML document to PDF bytes.
pub trait PdfRenderer {
    fn render(&mut self, request: &PdfRequest) -> Result<Vec<u8>>;
}

/// File name for a document's PDF: its title with path separators and
/// control characters removed.
pub fn pdf_file_name(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, '/' | '\\' | ':'))
        .collect();
    let stem = cleaned.trim();
    let stem = stem.strip_suffix(".md").unwrap_or(stem);
    if stem.is_empty() {
        "document.pdf".to_string()
    } else {
        format!("{}.pdf", stem)
    }
}

/// Export a document through `renderer`.
///
/// Returns `Ok(None)` when the renderer returned nothing.
pub fn export_pdf(doc: &Document, renderer: &mut dyn PdfRenderer) -> Result<Option<PdfExport>> {
    let request = PdfRequest {
        file_name: pdf_file_name(&doc.title),
        html: generate_html_document(&doc.content, Some(&doc.title)),
    };

    let bytes = renderer.render(&request)?;
    if bytes.is_empty() {
        warn!("PDF renderer produced no output for {}", request.file_name);
        return Ok(None);
    }
    info!("Rendered {} ({} bytes)", request.file_name, bytes.len());
    Ok(Some(PdfExport {
        file_name: request.file_name,
        bytes,
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct FakeRenderer {
        output: Option<Vec<u8>>,
        requests: Vec<PdfRequest>,
    }

    impl PdfRenderer for FakeRenderer {
        fn render(&mut self, request: &PdfRequest) -> Result<Vec<u8>> {
            self.requests.push(request.clone());
            self.output
                .clone()
                .ok_or_else(|| Error::collaborator("pdf", "renderer crashed"))
        }
    }

    fn renderer(output: Option<&[u8]>) -> FakeRenderer {
        FakeRenderer {
            output: output.map(<[u8]>::to_vec),
            requests: Vec::new(),
        }
    }

    #[test]
    fn test_pdf_file_name() {
        assert_eq!(pdf_file_name("Notes"), "Notes.pdf");
        assert_eq!(pdf_file_name("notes.md"), "notes.pdf");
        assert_eq!(pdf_file_name("a/b:c"), "abc.pdf");
        assert_eq!(pdf_file_name("  "), "document.pdf");
    }

    #[test]
    fn test_export_pdf_success() {
        let doc = Document::new("d", "Report", "# Report\n\nBody");
        let mut r = renderer(Some(&b"%PDF-1.7"[..]));

        let export = export_pdf(&doc, &mut r).unwrap().unwrap();
        assert_eq!(export.file_name, "Report.pdf");
        assert_eq!(export.bytes, b"%PDF-1.7");
        assert_eq!(r.requests.len(), 1);
        assert_eq!(r.requests[0].file_name, "Report.pdf");
        assert!(r.requests[0].html.contains("<title>Report</title>"));
    }

    #[test]
    fn test_export_pdf_empty_output() {
        let doc = Document::new("d", "Report", "text");
        assert_eq!(export_pdf(&doc, &mut renderer(Some(&b""[..]))).unwrap(), None);
    }

    #[test]
    fn test_export_pdf_failure() {
        let doc = Document::new("d", "Report", "text");
        assert!(export_pdf(&doc, &mut renderer(None)).is_err());
    }
}
