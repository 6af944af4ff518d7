//! Document Export Module for NovaScribe
//!
//! This module provides functionality for exporting Markdown documents to
//! standalone HTML and, through a renderer collaborator, to PDF.
//!
//! # Architecture
//!
//! - `html.rs` - HTML document generation with inlined styles
//! - `pdf.rs` - PDF renderer collaborator and export entry point

pub mod html;
pub mod pdf;

pub use html::{export_to_html_file, generate_html_document, generate_html_fragment};
pub use pdf::{export_pdf, PdfExport, PdfRenderer, PdfRequest};
