//! Image assets
//!
//! Pasted images either live inside the workspace (under the assets
//! folder, with a timestamped file name) or, without a workspace, are
//! inlined into the document as base64 data URIs.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::ImageFormat;
use log::{debug, warn};

use super::fs::{join_path, WorkspaceFs};
use crate::error::Result;

/// Fallback extension when the bytes are not a recognised image format.
const DEFAULT_EXTENSION: &str = "png";

/// Guess the image format from the leading bytes.
fn guess_format(bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes).ok()
}

/// MIME type for image bytes, `application/octet-stream` if unknown.
pub fn mime_type(bytes: &[u8]) -> &'static str {
    guess_format(bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream")
}

/// File extension for a pasted image.
///
/// Prefers the format detected from the bytes, then the extension of the
/// original file name, then `png`.
pub fn image_extension(bytes: &[u8], file_name: Option<&str>) -> String {
    if let Some(ext) = guess_format(bytes).and_then(|f| f.extensions_str().first().copied()) {
        return ext.to_string();
    }
    file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

/// Encode bytes as a `data:` URI.
pub fn data_uri(bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type(bytes), STANDARD.encode(bytes))
}

/// An image inlined into the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub uri: String,
    /// Larger than the warning threshold
    pub oversized: bool,
}

/// Inline image bytes as a data URI, flagging images above `warn_bytes`.
pub fn inline_image(bytes: &[u8], warn_bytes: usize) -> InlineImage {
    let oversized = bytes.len() > warn_bytes;
    if oversized {
        warn!(
            "Inlining a {} byte image; documents with large inline images load slowly",
            bytes.len()
        );
    }
    InlineImage {
        uri: data_uri(bytes),
        oversized,
    }
}

/// Write a pasted image into the workspace assets folder.
///
/// The file is named `image-{millis}.{ext}`; if that name is taken a
/// numeric suffix is added. Returns the workspace-relative path.
pub fn store_pasted_image(
    fs: &mut dyn WorkspaceFs,
    assets_dir: &str,
    bytes: &[u8],
    file_name: Option<&str>,
    now_millis: u128,
) -> Result<String> {
    fs.create_dir_all(assets_dir)?;

    let ext = image_extension(bytes, file_name);
    let mut path = join_path(assets_dir, &format!("image-{}.{}", now_millis, ext));
    let mut counter = 1;
    while fs.exists(&path) {
        path = join_path(
            assets_dir,
            &format!("image-{}-{}.{}", now_millis, counter, ext),
        );
        counter += 1;
    }

    fs.write(&path, bytes)?;
    debug!("Stored pasted image at {}", path);
    Ok(path)
}

/// Resolve an image target inside the assets folder to a data URI.
///
/// Returns `None` for targets outside the assets folder or when the file
/// cannot be read.
pub fn resolve_asset(fs: &dyn WorkspaceFs, assets_dir: &str, target: &str) -> Option<String> {
    let prefix = format!("{}/", assets_dir.trim_end_matches('/'));
    if !target.starts_with(&prefix) {
        return None;
    }
    match fs.read_bytes(target) {
        Ok(bytes) => Some(data_uri(&bytes)),
        Err(e) => {
            debug!("Could not resolve asset '{}': {}", target, e);
            None
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
