use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::model::SourceEntry;
use crate::pipeline::SourceDocument;
use crate::util::sha256_hex;

const SOURCE_EXTENSIONS: [&str; 4] = ["txt", "md", "html", "htm"];

#[derive(Debug)]
pub(super) struct LoadedSource {
    pub entry: SourceEntry,
    pub document: SourceDocument,
}

pub(super) fn discover_sources(source_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();

    let entries = fs::read_dir(source_dir)
        .with_context(|| format!("failed to read {}", source_dir.display()))?;

    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", source_dir.display()))?;
        let path = entry.path();

        if !entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?
            .is_file()
        {
            continue;
        }

        let is_source = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                SOURCE_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
            .unwrap_or(false);

        if is_source {
            sources.push(path);
        }
    }

    sources.sort();
    Ok(sources)
}

/// Reads already-extracted text; `name` overrides the filename used for classification.
pub(super) fn load_source(path: &Path, name: Option<&str>) -> Result<LoadedSource> {
    let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let filename = match name {
        Some(name) => name.to_string(),
        None => file_name_of(path)?,
    };
    let text = String::from_utf8(data)
        .with_context(|| format!("source is not valid UTF-8: {}", path.display()))?;

    Ok(LoadedSource {
        entry: SourceEntry {
            filename: filename.clone(),
            sha256: sha256_hex(text.as_bytes()),
            byte_count: text.len(),
        },
        document: SourceDocument::from_text(filename, &text),
    })
}

pub(super) fn file_name_of(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(ToOwned::to_owned)
        .with_context(|| format!("invalid UTF-8 filename: {}", path.display()))
}
