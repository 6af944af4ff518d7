//! Block rendering
//!
//! Every block except the active one is shown rendered. Most blocks go
//! through comrak; display math and standalone images are handled here so
//! math source is shown verbatim and workspace images can be embedded.

use comrak::{markdown_to_html, Options};
use log::trace;

use super::classify::{classify, BlockKind, BlockStyle, Classification, ImageRef};
use super::splitter::MATH_FENCE;
use crate::workspaces::assets::resolve_asset;
use crate::workspaces::fs::WorkspaceFs;

// ─────────────────────────────────────────────────────────────────────────────
// Options
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration options for Markdown rendering.
#[derive(Debug, Clone)]
pub struct MarkdownOptions {
    /// Enable GitHub Flavored Markdown tables
    pub tables: bool,
    /// Enable strikethrough syntax (~~text~~)
    pub strikethrough: bool,
    /// Enable autolink URLs and emails
    pub autolink: bool,
    /// Enable task lists (- [ ] and - [x])
    pub tasklist: bool,
    /// Enable footnotes
    pub footnotes: bool,
    /// Drop raw HTML and dangerous URL schemes
    pub safe_urls: bool,
    /// Generate GitHub-style heading IDs with this prefix
    pub header_ids: Option<String>,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            autolink: true,
            tasklist: true,
            footnotes: true,
            safe_urls: true,
            header_ids: None,
        }
    }
}

impl MarkdownOptions {
    /// Options for standalone HTML export: raw HTML passes through and
    /// headings get anchors.
    pub fn export() -> Self {
        Self {
            safe_urls: false,
            header_ids: Some(String::new()),
            ..Self::default()
        }
    }

    /// Convert to comrak Options.
    fn to_comrak_options(&self) -> Options {
        let mut options = Options::default();

        options.extension.strikethrough = self.strikethrough;
        options.extension.table = self.tables;
        options.extension.autolink = self.autolink;
        options.extension.tasklist = self.tasklist;
        options.extension.footnotes = self.footnotes;
        options.extension.header_ids = self.header_ids.clone();

        options.render.unsafe_ = !self.safe_urls;

        options
    }
}

/// Render Markdown text to an HTML fragment.
pub fn render_markdown(markdown: &str, options: &MarkdownOptions) -> String {
    markdown_to_html(markdown, &options.to_comrak_options())
}

// ─────────────────────────────────────────────────────────────────────────────
// Block Rendering
// ─────────────────────────────────────────────────────────────────────────────

/// Where images are looked up while rendering.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub workspace: Option<&'a dyn WorkspaceFs>,
    pub assets_dir: &'a str,
    pub options: &'a MarkdownOptions,
}

impl std::fmt::Debug for RenderContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("workspace", &self.workspace.map(|fs| fs.name()))
            .field("assets_dir", &self.assets_dir)
            .finish()
    }
}

/// A rendered, non-active block row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBlock {
    pub style: BlockStyle,
    pub html: String,
}

impl RenderedBlock {
    /// The row wrapped in a `div` carrying its style class.
    pub fn to_html(&self) -> String {
        format!(
            "<div class=\"block {}\">{}</div>",
            self.style.css_class(),
            self.html
        )
    }
}

/// Render one block for display.
///
/// Empty blocks render as a non-breaking space so the row keeps its height
/// and stays clickable.
pub fn render_block(text: &str, ctx: &RenderContext<'_>) -> RenderedBlock {
    let Classification { kind, style } = classify(text);

    let html = match kind {
        BlockKind::Empty => "&nbsp;".to_string(),
        BlockKind::Math => format!(
            "<div class=\"math-display\">{}</div>",
            html_escape(math_body(text))
        ),
        BlockKind::Image(image) => render_image(&image, ctx),
        _ => render_markdown(text, ctx.options),
    };
    trace!("Rendered {:?} block to {} bytes", style, html.len());

    RenderedBlock { style, html }
}

/// The math source between the `$$` fences.
fn math_body(text: &str) -> &str {
    let trimmed = text.trim();
    let inner = trimmed.strip_prefix(MATH_FENCE).unwrap_or(trimmed);
    let inner = inner.strip_suffix(MATH_FENCE).unwrap_or(inner);
    inner.trim()
}

fn render_image(image: &ImageRef, ctx: &RenderContext<'_>) -> String {
    let src = ctx
        .workspace
        .and_then(|fs| resolve_asset(fs, ctx.assets_dir, &image.target))
        .unwrap_or_else(|| image.target.clone());
    format!(
        "<img src=\"{}\" alt=\"{}\">",
        html_escape(&src),
        html_escape(&image.alt)
    )
}

/// HTML-escape a string.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
