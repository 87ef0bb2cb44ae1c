use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::pipeline::{Glossary, TermRecord};
use crate::util::{ensure_parent, write_json_pretty, write_text};

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    term: &'a str,
    definition: &'a str,
    page: u32,
}

pub fn write_glossary_json(path: &Path, glossary: &Glossary) -> Result<()> {
    write_json_pretty(path, glossary)
}

/// One row per record, duplicates included, in extraction order.
pub fn write_glossary_csv(path: &Path, records: &[TermRecord]) -> Result<()> {
    ensure_parent(path)?;

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create csv file: {}", path.display()))?;
    for record in records {
        writer
            .serialize(CsvRow {
                term: &record.term,
                definition: &record.definition,
                page: record.source_page,
            })
            .with_context(|| format!("failed to write csv row: {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush csv file: {}", path.display()))?;

    Ok(())
}

pub fn render_llm_context(title: &str, records: &[TermRecord]) -> String {
    let mut lines = vec![format!("# {title}\n")];
    for record in records {
        lines.push(format!("## {}\n", record.term));
        lines.push(format!("{}\n", record.definition));
    }
    lines.join("\n")
}

pub fn write_llm_context(path: &Path, title: &str, records: &[TermRecord]) -> Result<()> {
    write_text(path, &render_llm_context(title, records))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::config::ExtractorConfig;
    use crate::pipeline::{ClassificationPipeline, SourceDocument};

    fn sample_records() -> Vec<TermRecord> {
        let pipeline =
            ClassificationPipeline::from_config(&ExtractorConfig::default()).expect("pipeline");
        let document = SourceDocument::from_text(
            "Schedule 2 Terms and Definitions v3.0.txt",
            "PAGE 4 OF 9\nBusiness term Employer\nDefinition An entity that \"pays\", with commas.\nBusiness term Fund\nDefinition A superannuation fund.\nBusiness term Employer\nDefinition Replaced definition.",
        );
        pipeline
            .process(&document)
            .expect("processed")
            .expect("recognized")
            .records
    }

    #[test]
    fn glossary_json_keeps_last_definition_and_utf8() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("glossary.json");
        let mut records = sample_records();
        records[1].definition = "Fonds de pension – retraite".to_string();

        write_glossary_json(&path, &Glossary::from_records(&records)).expect("json written");

        let raw = fs::read_to_string(&path).expect("json readable");
        assert!(raw.contains("Fonds de pension – retraite"));
        assert!(raw.contains("\n  \"Employer\": \"Replaced definition.\""));
        let parsed: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(parsed.as_object().map(|object| object.len()), Some(2));
    }

    #[test]
    fn glossary_csv_has_header_and_every_record() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("glossary.csv");

        write_glossary_csv(&path, &sample_records()).expect("csv written");

        let raw = fs::read_to_string(&path).expect("csv readable");
        let lines = raw.lines().collect::<Vec<&str>>();
        assert_eq!(lines[0], "term,definition,page");
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "Employer,\"An entity that \"\"pays\"\", with commas.\",4");
    }

    #[test]
    fn llm_context_lists_terms_under_title() {
        let rendered = render_llm_context("SuperStream Glossary", &sample_records());
        assert!(rendered.starts_with("# SuperStream Glossary\n"));
        assert!(rendered.contains("## Fund\n\nA superannuation fund.\n"));
    }
}
