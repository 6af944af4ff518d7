//! NovaScribe - headless inspector
//!
//! Loads the stored document list (or a Markdown file given on the command
//! line) and prints how the editor sees it: one line per block, then the
//! statistics and outline.

use std::path::Path;

use log::{info, warn};

use novascribe::config::{load_config, APP_NAME};
use novascribe::files::{DocumentStorage, JsonFileStorage, MemoryStorage};
use novascribe::markdown::{classify, BlockKind};
use novascribe::{EditorSession, Result};

/// Longest first line shown per block.
const PREVIEW_CHARS: usize = 60;

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting {}", APP_NAME);

    if let Err(e) = run() {
        eprintln!("{}: {}", APP_NAME, e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let settings = load_config();

    let storage: Box<dyn DocumentStorage> = match JsonFileStorage::in_data_dir() {
        Ok(storage) => {
            info!("Document storage: {}", storage.dir().display());
            Box::new(storage)
        }
        Err(e) => {
            warn!("Using in-memory document storage: {}", e);
            Box::new(MemoryStorage::new())
        }
    };

    let mut session = EditorSession::new(settings, storage);

    if let Some(arg) = std::env::args().nth(1) {
        let path = Path::new(&arg);
        let content = std::fs::read_to_string(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| arg.clone());
        session.import_document(&name, &content);
    }

    let doc = session.store().active();
    println!("{} ({})", doc.title, doc.id);
    println!();

    for view in session.block_views() {
        println!(
            "{:>3}  {:<10} {}",
            view.index,
            kind_label(&classify(&view.text).kind),
            first_line(&view.text)
        );
    }

    println!();
    println!("{}", session.stats().format_compact());
    println!("{}", session.outline().summary());
    Ok(())
}

fn kind_label(kind: &BlockKind) -> String {
    match kind {
        BlockKind::Empty => "empty".to_string(),
        BlockKind::Heading(level) => format!("h{}", level),
        BlockKind::Quote => "quote".to_string(),
        BlockKind::Code { .. } => "code".to_string(),
        BlockKind::Math => "math".to_string(),
        BlockKind::Image(_) => "image".to_string(),
        BlockKind::List { ordered: true } => "numbered".to_string(),
        BlockKind::List { ordered: false } => "list".to_string(),
        BlockKind::Rule => "rule".to_string(),
        BlockKind::Table => "table".to_string(),
        BlockKind::Paragraph => "paragraph".to_string(),
    }
}

fn first_line(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default();
    let mut preview: String = line.chars().take(PREVIEW_CHARS).collect();
    if line.chars().count() > PREVIEW_CHARS {
        preview.push('…');
    }
    preview
}
