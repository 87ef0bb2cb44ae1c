use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::export;
use crate::pipeline::DocumentExtraction;

pub(super) fn write_json_stdout<T: Serialize>(value: &T) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, value).context("failed to serialize json output")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

pub(super) fn write_lines_stdout<I, S>(lines: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut output = io::BufWriter::new(io::stdout().lock());
    for line in lines {
        writeln!(output, "{}", line.as_ref())?;
    }
    output.flush()?;
    Ok(())
}

pub(super) struct ExportOptions<'a> {
    pub output_dir: &'a Path,
    pub llm_context: bool,
    pub context_title: &'a str,
}

/// Writes `<document_id>_glossary.json`, `<document_id>_glossary.csv` and
/// optionally `<document_id>_context.md`; returns the written paths.
pub(super) fn write_document_exports(
    extraction: &DocumentExtraction,
    options: &ExportOptions<'_>,
) -> Result<Vec<PathBuf>> {
    let stem = &extraction.document_id;
    let json_path = options.output_dir.join(format!("{stem}_glossary.json"));
    let csv_path = options.output_dir.join(format!("{stem}_glossary.csv"));

    export::write_glossary_json(&json_path, &extraction.glossary)?;
    export::write_glossary_csv(&csv_path, &extraction.records)?;
    let mut written = vec![json_path, csv_path];

    if options.llm_context {
        let context_path = options.output_dir.join(format!("{stem}_context.md"));
        export::write_llm_context(&context_path, options.context_title, &extraction.records)?;
        written.push(context_path);
    }

    Ok(written)
}
