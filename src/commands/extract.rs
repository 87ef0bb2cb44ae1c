use anyhow::{Result, bail};
use serde::Serialize;
use tracing::{info, warn};

use super::inventory::load_source;
use super::output::{ExportOptions, write_document_exports, write_json_stdout};
use crate::cli::ExtractArgs;
use crate::config::ExtractorConfig;
use crate::pipeline::{ClassificationPipeline, TermRecord};

#[derive(Debug, Serialize)]
struct ExtractSummary<'a> {
    filename: &'a str,
    document_id: &'a str,
    category: String,
    processor_kind: &'static str,
    version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    processor_variant: Option<String>,
    version_detected_from: &'static str,
    version_confidence: f64,
    record_count: usize,
    glossary_terms: usize,
    dropped_candidate_count: usize,
    outputs: Vec<String>,
    records: &'a [TermRecord],
}

pub fn run(args: ExtractArgs) -> Result<()> {
    let config = ExtractorConfig::load_or_default(args.config.as_deref())?;
    let pipeline = ClassificationPipeline::from_config(&config)?;
    let source = load_source(&args.input, args.name.as_deref())?;

    info!(
        input = %args.input.display(),
        filename = %source.entry.filename,
        lines = source.document.lines.len(),
        "starting extraction"
    );

    let Some(extraction) = pipeline.process(&source.document)? else {
        bail!(
            "{} does not match any known document category",
            source.entry.filename
        );
    };

    if extraction.records.is_empty() {
        warn!(
            document = %extraction.document_id,
            candidates = extraction.candidates,
            dropped = extraction.dropped,
            "extraction produced no records"
        );
    }

    let outputs = write_document_exports(
        &extraction,
        &ExportOptions {
            output_dir: &args.output_dir,
            llm_context: args.llm_context,
            context_title: &args.context_title,
        },
    )?;

    info!(
        document = %extraction.document_id,
        category = %extraction.plan.category,
        version = %extraction.version,
        processor_variant = extraction.processor_variant().as_deref().unwrap_or("-"),
        version_source = extraction.version.detected_from.as_str(),
        records = extraction.records.len(),
        glossary_terms = extraction.glossary.len(),
        dropped = extraction.dropped,
        "extraction completed"
    );

    if args.json {
        return write_json_stdout(&ExtractSummary {
            filename: &source.entry.filename,
            document_id: &extraction.document_id,
            category: extraction.plan.category.to_string(),
            processor_kind: extraction.plan.processor_kind.as_str(),
            version: extraction.version.to_string(),
            processor_variant: extraction.processor_variant(),
            version_detected_from: extraction.version.detected_from.as_str(),
            version_confidence: extraction.version.confidence,
            record_count: extraction.records.len(),
            glossary_terms: extraction.glossary.len(),
            dropped_candidate_count: extraction.dropped,
            outputs: outputs
                .iter()
                .map(|path| path.display().to_string())
                .collect(),
            records: &extraction.records,
        });
    }

    for path in &outputs {
        info!(path = %path.display(), "wrote export");
    }

    Ok(())
}
