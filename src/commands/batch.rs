use std::collections::BTreeMap;

use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

use super::inventory::{LoadedSource, discover_sources, file_name_of, load_source};
use super::output::{ExportOptions, write_document_exports};
use crate::cli::BatchArgs;
use crate::config::ExtractorConfig;
use crate::export;
use crate::model::{
    DocumentStatus, DocumentSummary, ExtractionRunManifest, RunCounts, RunPaths, SourceEntry,
};
use crate::pipeline::{
    ClassificationPipeline, DocumentExtraction, DocumentOutcome, Glossary, SourceDocument,
    TermRecord,
};
use crate::util::{ensure_directory, now_utc_string, utc_compact_string, write_json_pretty};

pub fn run(args: BatchArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    let config = ExtractorConfig::load_or_default(args.config.as_deref())?;
    let pipeline = ClassificationPipeline::from_config(&config)?;

    ensure_directory(&args.output_dir)?;
    let manifest_path = args.manifest_path.clone().unwrap_or_else(|| {
        args.output_dir
            .join(format!("extraction_run_{}.json", utc_compact_string(started_ts)))
    });
    let combined_json_path = args.output_dir.join("glossary.json");
    let combined_csv_path = args.output_dir.join("glossary.csv");

    info!(source_dir = %args.source_dir.display(), run_id = %run_id, "starting batch extraction");

    let mut warnings = Vec::<String>::new();
    let mut summaries = Vec::<DocumentSummary>::new();
    let mut entries = BTreeMap::<String, SourceEntry>::new();
    let mut documents = Vec::<SourceDocument>::new();

    for path in discover_sources(&args.source_dir)? {
        match load_source(&path, None) {
            Ok(LoadedSource { entry, document }) => {
                entries.insert(entry.filename.clone(), entry);
                documents.push(document);
            }
            Err(error) => {
                let filename = file_name_of(&path).unwrap_or_else(|_| path.display().to_string());
                warn!(filename = %filename, error = %error, "failed to load source");
                warnings.push(format!("failed to load {filename}: {error:#}"));
                summaries.push(failed_summary(filename, None, format!("{error:#}")));
            }
        }
    }

    let outcomes = pipeline.process_batch(&documents);

    let options = ExportOptions {
        output_dir: &args.output_dir,
        llm_context: args.llm_context,
        context_title: &args.context_title,
    };
    let mut combined_glossary = Glossary::default();
    let mut combined_records = Vec::<TermRecord>::new();

    for (filename, outcome) in outcomes {
        let source = entries.remove(&filename);
        match outcome {
            DocumentOutcome::Unrecognized => {
                warn!(filename = %filename, "no document category matched; skipped");
                summaries.push(DocumentSummary {
                    status: DocumentStatus::Unrecognized,
                    ..failed_summary(filename, source, String::new())
                });
            }
            DocumentOutcome::Failed(error) => {
                warn!(filename = %filename, error = %error, "document extraction failed");
                warnings.push(format!("{filename}: {error}"));
                summaries.push(failed_summary(filename, source, error.to_string()));
            }
            DocumentOutcome::Extracted(extraction) => {
                let outputs = match write_document_exports(&extraction, &options) {
                    Ok(outputs) => outputs,
                    Err(error) => {
                        warn!(filename = %filename, error = %error, "failed to write exports");
                        warnings.push(format!("{filename}: {error:#}"));
                        Vec::new()
                    }
                };

                info!(
                    filename = %filename,
                    category = %extraction.plan.category,
                    version = %extraction.version,
                    records = extraction.records.len(),
                    dropped = extraction.dropped,
                    "document extracted"
                );

                combined_glossary.merge(&extraction.glossary);
                combined_records.extend(extraction.records.iter().cloned());
                summaries.push(extracted_summary(
                    filename,
                    source,
                    &extraction,
                    outputs
                        .iter()
                        .map(|path| path.display().to_string())
                        .collect(),
                ));
            }
        }
    }

    summaries.sort_by(|a, b| a.filename.cmp(&b.filename));

    export::write_glossary_json(&combined_json_path, &combined_glossary)?;
    export::write_glossary_csv(&combined_csv_path, &combined_records)?;

    let counts = count_summaries(&summaries, combined_glossary.len());
    let status = if counts.failed_count == 0 {
        "completed"
    } else {
        "completed_with_failures"
    };

    let manifest = ExtractionRunManifest {
        manifest_version: 1,
        run_id,
        status: status.to_string(),
        started_at,
        updated_at: now_utc_string(),
        command: render_batch_command(&args),
        paths: RunPaths {
            source_directory: args.source_dir.display().to_string(),
            output_directory: args.output_dir.display().to_string(),
            combined_glossary_path: combined_json_path.display().to_string(),
            manifest_path: manifest_path.display().to_string(),
        },
        counts,
        documents: summaries,
        warnings,
    };

    write_json_pretty(&manifest_path, &manifest)?;

    info!(path = %manifest_path.display(), "wrote extraction run manifest");
    info!(
        sources = manifest.counts.source_count,
        extracted = manifest.counts.extracted_count,
        unrecognized = manifest.counts.unrecognized_count,
        failed = manifest.counts.failed_count,
        records = manifest.counts.record_count,
        glossary_terms = manifest.counts.combined_glossary_terms,
        "batch extraction completed"
    );

    Ok(())
}

fn failed_summary(
    filename: String,
    source: Option<SourceEntry>,
    failure_reason: String,
) -> DocumentSummary {
    DocumentSummary {
        filename,
        source,
        status: DocumentStatus::Failed,
        document_id: None,
        category: None,
        processor_kind: None,
        extractors: Vec::new(),
        version: None,
        processor_variant: None,
        version_detected_from: None,
        version_confidence: None,
        record_count: 0,
        glossary_terms: 0,
        dropped_candidate_count: 0,
        failure_reason: (!failure_reason.is_empty()).then_some(failure_reason),
        outputs: Vec::new(),
    }
}

fn extracted_summary(
    filename: String,
    source: Option<SourceEntry>,
    extraction: &DocumentExtraction,
    outputs: Vec<String>,
) -> DocumentSummary {
    let status = if extraction.records.is_empty() {
        DocumentStatus::EmptyExtraction
    } else {
        DocumentStatus::Extracted
    };

    DocumentSummary {
        filename,
        source,
        status,
        document_id: Some(extraction.document_id.clone()),
        category: Some(extraction.plan.category.to_string()),
        processor_kind: Some(extraction.plan.processor_kind.as_str().to_string()),
        extractors: extraction.plan.extractors.clone(),
        version: Some(extraction.version.to_string()),
        processor_variant: extraction.processor_variant(),
        version_detected_from: Some(extraction.version.detected_from.as_str().to_string()),
        version_confidence: Some(extraction.version.confidence),
        record_count: extraction.records.len(),
        glossary_terms: extraction.glossary.len(),
        dropped_candidate_count: extraction.dropped,
        failure_reason: None,
        outputs,
    }
}

fn count_summaries(summaries: &[DocumentSummary], combined_glossary_terms: usize) -> RunCounts {
    let mut counts = RunCounts {
        source_count: summaries.len(),
        combined_glossary_terms,
        ..RunCounts::default()
    };

    for summary in summaries {
        match summary.status {
            DocumentStatus::Extracted => counts.extracted_count += 1,
            DocumentStatus::EmptyExtraction => counts.empty_extraction_count += 1,
            DocumentStatus::Unrecognized => counts.unrecognized_count += 1,
            DocumentStatus::Failed => counts.failed_count += 1,
        }
        counts.record_count += summary.record_count;
        counts.dropped_candidate_count += summary.dropped_candidate_count;
    }

    counts
}

fn render_batch_command(args: &BatchArgs) -> String {
    let mut parts = vec![
        "regterms".to_string(),
        "batch".to_string(),
        "--source-dir".to_string(),
        args.source_dir.display().to_string(),
        "--output-dir".to_string(),
        args.output_dir.display().to_string(),
    ];

    if let Some(config) = &args.config {
        parts.push("--config".to_string());
        parts.push(config.display().to_string());
    }
    if let Some(manifest_path) = &args.manifest_path {
        parts.push("--manifest-path".to_string());
        parts.push(manifest_path.display().to_string());
    }
    if args.llm_context {
        parts.push("--llm-context".to_string());
        parts.push("--context-title".to_string());
        parts.push(format!("\"{}\"", args.context_title));
    }

    parts.join(" ")
}
