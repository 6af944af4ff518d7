//! Markdown block handling
//!
//! A document is edited as a sequence of blocks. This module splits the
//! document text into blocks and joins it back, classifies each block,
//! applies the block formatting actions and renders non-active blocks to
//! HTML using the comrak library.
//!
//! # Example
//! ```ignore
//! use novascribe::markdown::{classify, join_blocks, split_blocks, BlockKind};
//!
//! let blocks = split_blocks("# Title\n\nBody text");
//! assert_eq!(blocks, vec!["# Title", "Body text"]);
//! assert_eq!(classify(&blocks[0]).kind, BlockKind::Heading(1));
//! assert_eq!(join_blocks(&blocks), "# Title\n\nBody text");
//! ```

pub mod classify;
pub mod formatting;
pub mod render;
pub mod splitter;

pub use classify::{classify, BlockKind, BlockStyle, Classification, ImageRef};
pub use formatting::{apply_text_action, strip_leading_marker, BlockAction};
pub use render::{html_escape, render_block, render_markdown, MarkdownOptions, RenderContext};
pub use splitter::{is_fenced, join_blocks, split_blocks};
