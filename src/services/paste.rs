//! Paste handling
//!
//! Rich clipboard content is converted to Markdown by a collaborator, with
//! the plain-text payload as the fallback. Pasted images are stored in the
//! workspace assets folder, or inlined as data URIs without a workspace.

use log::{debug, warn};

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::markdown::ImageRef;
use crate::workspaces::assets::{inline_image, store_pasted_image};
use crate::workspaces::fs::WorkspaceFs;

/// Alt text given to pasted images.
pub const PASTED_IMAGE_ALT: &str = "image";

/// Converts an HTML fragment to Markdown.
pub trait HtmlToMarkdown {
    fn convert(&self, html: &str) -> Result<String>;
}

/// What the clipboard offered on paste.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardPayload {
    pub html: Option<String>,
    pub text: String,
}

impl ClipboardPayload {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            html: None,
            text: text.into(),
        }
    }

    pub fn html(html: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            html: Some(html.into()),
            text: text.into(),
        }
    }
}

/// The text to insert for a paste.
///
/// HTML is converted when a converter is available; a failed or empty
/// conversion falls back to the plain text verbatim.
pub fn paste_text(payload: &ClipboardPayload, converter: Option<&dyn HtmlToMarkdown>) -> String {
    let (Some(html), Some(converter)) = (payload.html.as_deref(), converter) else {
        return payload.text.clone();
    };
    match converter.convert(html) {
        Ok(markdown) if !markdown.trim().is_empty() => markdown,
        Ok(_) => {
            debug!("HTML conversion produced nothing, pasting plain text");
            payload.text.clone()
        }
        Err(e) => {
            warn!("HTML conversion failed, pasting plain text: {}", e);
            payload.text.clone()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Images
// ─────────────────────────────────────────────────────────────────────────────

/// A pasted image, ready to become a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PastedImage {
    pub image: ImageRef,
    /// Inlined above the size warning threshold
    pub oversized: bool,
}

/// Store or inline pasted image bytes.
///
/// With a workspace the bytes are written under the assets folder and the
/// reference points at the workspace-relative path. Without one, the image
/// is inlined as a data URI. Nothing in the document changes here, so a
/// failed write leaves the caller with nothing to roll back.
pub fn place_image(
    workspace: Option<&mut dyn WorkspaceFs>,
    settings: &Settings,
    bytes: &[u8],
    file_name: Option<&str>,
    now_millis: u128,
) -> Result<PastedImage> {
    if bytes.is_empty() {
        return Err(Error::Application("pasted image is empty".to_string()));
    }

    let (target, oversized) = match workspace {
        Some(fs) => {
            let path = store_pasted_image(fs, &settings.assets_dir, bytes, file_name, now_millis)?;
            (path, false)
        }
        None => {
            let inline = inline_image(bytes, settings.inline_image_warn_bytes);
            (inline.uri, inline.oversized)
        }
    };

    Ok(PastedImage {
        image: ImageRef {
            alt: PASTED_IMAGE_ALT.to_string(),
            target,
        },
        oversized,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Scripted Converter
// ─────────────────────────────────────────────────────────────────────────────

/// A converter with a fixed answer, for tests and hosts without one.
///
/// `None` makes every conversion fail as malformed input would.
#[derive(Debug, Clone, Default)]
pub struct ScriptedConverter {
    pub output: Option<String>,
}

impl HtmlToMarkdown for ScriptedConverter {
    fn convert(&self, _html: &str) -> Result<String> {
        self.output
            .clone()
            .ok_or_else(|| Error::collaborator("html-to-markdown", "malformed HTML"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspaces::fs::MemoryWorkspace;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];

    // ─────────────────────────────────────────────────────────────────────────
    // Text
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_plain_text_passes_through() {
        let converter = ScriptedConverter {
            output: Some("**x**".to_string()),
        };
        let payload = ClipboardPayload::text("plain");
        assert_eq!(paste_text(&payload, Some(&converter)), "plain");
    }

    #[test]
    fn test_html_converted() {
        let converter = ScriptedConverter {
            output: Some("**bold**".to_string()),
        };
        let payload = ClipboardPayload::html("<b>bold</b>", "bold");
        assert_eq!(paste_text(&payload, Some(&converter)), "**bold**");
    }

    #[test]
    fn test_failed_conversion_falls_back() {
        let converter = ScriptedConverter::default();
        let payload = ClipboardPayload::html("<b>bold", "bold");
        assert_eq!(paste_text(&payload, Some(&converter)), "bold");
    }

    #[test]
    fn test_empty_conversion_falls_back() {
        let converter = ScriptedConverter {
            output: Some("  ".to_string()),
        };
        let payload = ClipboardPayload::html("<p></p>", "text");
        assert_eq!(paste_text(&payload, Some(&converter)), "text");
    }

    #[test]
    fn test_no_converter_uses_text() {
        let payload = ClipboardPayload::html("<b>bold</b>", "bold");
        assert_eq!(paste_text(&payload, None), "bold");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Images
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_place_image_in_workspace() {
        let mut fs = MemoryWorkspace::new("notes");
        let pasted = place_image(
            Some(&mut fs),
            &Settings::default(),
            PNG_MAGIC,
            None,
            1700000000000,
        )
        .unwrap();

        assert_eq!(pasted.image.target, "assets/image-1700000000000.png");
        assert_eq!(
            pasted.image.to_markdown(),
            "![image](assets/image-1700000000000.png)"
        );
        assert!(!pasted.oversized);
        assert_eq!(fs.file("assets/image-1700000000000.png"), Some(PNG_MAGIC));
    }

    #[test]
    fn test_place_image_inline_without_workspace() {
        let pasted = place_image(None, &Settings::default(), PNG_MAGIC, None, 1).unwrap();
        assert!(pasted.image.target.starts_with("data:image/png;base64,"));
        assert!(!pasted.oversized);
    }

    #[test]
    fn test_place_image_inline_oversized() {
        let settings = Settings {
            inline_image_warn_bytes: 4,
            ..Settings::default()
        };
        let pasted = place_image(None, &settings, PNG_MAGIC, None, 1).unwrap();
        assert!(pasted.oversized);
    }

    #[test]
    fn test_place_image_write_failure() {
        let mut fs = MemoryWorkspace::new("notes");
        fs.fail_writes = true;
        let result = place_image(Some(&mut fs), &Settings::default(), PNG_MAGIC, None, 1);
        assert!(result.is_err());
    }

    #[test]
    fn test_place_empty_image_rejected() {
        assert!(place_image(None, &Settings::default(), &[], None, 1).is_err());
    }
}
