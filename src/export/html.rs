//! HTML Export Generation
//!
//! This module generates complete standalone HTML documents from Markdown
//! content, with the stylesheet inlined.

use std::path::Path;

use log::info;

use crate::error::Result;
use crate::markdown::render::{html_escape, render_markdown, MarkdownOptions};

/// Title used when the document has none.
const DEFAULT_TITLE: &str = "Exported Document";

// ─────────────────────────────────────────────────────────────────────────────
// HTML Generation
// ─────────────────────────────────────────────────────────────────────────────

/// Generate a complete HTML document from Markdown content.
///
/// # Arguments
///
/// * `markdown` - The Markdown source text
/// * `title` - Optional document title
///
/// # Returns
///
/// A complete HTML document as a string.
pub fn generate_html_document(markdown: &str, title: Option<&str>) -> String {
    let html_body = generate_html_fragment(markdown);
    let doc_title = title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TITLE);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="generator" content="NovaScribe">
    <title>{title}</title>
    <style>
{base_css}
    </style>
</head>
<body>
    <article class="markdown-body">
{body}
    </article>
</body>
</html>"#,
        title = html_escape(doc_title),
        base_css = BASE_CSS,
        body = html_body,
    )
}

/// Generate an HTML fragment (no doctype, head, etc.), e.g. for the clipboard.
pub fn generate_html_fragment(markdown: &str) -> String {
    render_markdown(markdown, &MarkdownOptions::export())
}

/// Write a standalone HTML document to `output_path`.
pub fn export_to_html_file(markdown: &str, title: Option<&str>, output_path: &Path) -> Result<()> {
    let html = generate_html_document(markdown, title);
    std::fs::write(output_path, html)?;
    info!("Exported HTML to {}", output_path.display());
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// CSS
// ─────────────────────────────────────────────────────────────────────────────

/// Base CSS for Markdown rendering (layout, typography, colors).
const BASE_CSS: &str = r#"
*, *::before, *::after { box-sizing: border-box; }
body { margin: 0; background: #ffffff; color: #0f172a; font: 16px/1.7 'Inter', -apple-system, 'Segoe UI', Helvetica, Arial, sans-serif; }
.markdown-body { max-width: 768px; margin: 0 auto; padding: 64px 32px; }
.markdown-body h1 { font-size: 2.5em; font-weight: 800; letter-spacing: -0.02em; margin: 0 0 24px; }
.markdown-body h2 { font-size: 1.75em; font-weight: 700; margin: 40px 0 16px; }
.markdown-body h3 { font-size: 1.3em; font-weight: 600; margin: 32px 0 12px; }
.markdown-body p, .markdown-body ul, .markdown-body ol, .markdown-body table, .markdown-body pre { margin: 0 0 16px; }
.markdown-body ul, .markdown-body ol { padding-left: 1.75em; }
.markdown-body a { color: #4f46e5; text-decoration: underline; text-underline-offset: 2px; }
.markdown-body blockquote { margin: 0 0 16px; padding: 4px 20px; color: #475569; font-style: italic; border-left: 4px solid #6366f1; }
.markdown-body code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.875em; padding: 2px 6px; border-radius: 6px; background: #f1f5f9; }
.markdown-body pre { padding: 20px; overflow-x: auto; border-radius: 12px; background: #0f172a; color: #e2e8f0; }
.markdown-body pre code { padding: 0; background: none; color: inherit; }
.markdown-body table { width: 100%; border-collapse: collapse; }
.markdown-body th, .markdown-body td { padding: 8px 12px; border: 1px solid #e2e8f0; text-align: left; }
.markdown-body th { background: #f8fafc; font-weight: 600; }
.markdown-body hr { margin: 32px 0; border: 0; border-top: 1px solid #e2e8f0; }
.markdown-body img { display: block; max-width: 100%; height: auto; margin: 24px auto; border-radius: 16px; }
.markdown-body .math-display { margin: 0 0 16px; text-align: center; font-family: 'JetBrains Mono', monospace; overflow-x: auto; }
@media print { .markdown-body { padding: 0; max-width: none; } }
"#;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generate_html_document() {
        let html = generate_html_document("# Test\n\nParagraph text.", Some("Test Doc"));

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Test Doc</title>"));
        assert!(html.contains("<article class=\"markdown-body\">"));
        assert!(html.contains("</article>"));
        assert!(html.contains("<h1"));
        assert!(html.contains("Paragraph text."));
    }

    #[test]
    fn test_title_escaped_and_defaulted() {
        let html = generate_html_document("x", Some("<b>"));
        assert!(html.contains("<title>&lt;b&gt;</title>"));

        let html = generate_html_document("x", Some("  "));
        assert!(html.contains("<title>Exported Document</title>"));
        let html = generate_html_document("x", None);
        assert!(html.contains("<title>Exported Document</title>"));
    }

    #[test]
    fn test_generate_html_fragment() {
        let html = generate_html_fragment("**Bold** and *italic*");
        assert!(!html.contains("<!DOCTYPE"));
        assert!(html.contains("<strong>"));
        assert!(html.contains("<em>"));
    }

    #[test]
    fn test_export_to_html_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.html");
        export_to_html_file("# Hi", Some("Hi"), &path).unwrap();
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("<title>Hi</title>"));
    }
}
