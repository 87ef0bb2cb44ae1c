use std::collections::BTreeMap;
use std::path::Path;

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use super::fields::FieldExtractor;
use super::patterns::{Classifier, PatternTable};
use super::tables::TableCellExtractor;
use super::types::{
    Glossary, ProcessingPlan, ProcessorKind, ScheduleCategory, TermRecord, VersionInfo,
};
use super::version::VersionResolver;
use crate::config::ExtractorConfig;
use crate::error::ExtractError;

/// A document as handed over by the text-extraction collaborator.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub name: String,
    pub lines: Vec<String>,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            name: name.into(),
            lines,
        }
    }

    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        Self::new(name, text.lines().map(str::to_string).collect())
    }

    pub fn document_id(&self) -> String {
        Path::new(&self.name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(&self.name)
            .to_string()
    }

    fn markup(&self) -> String {
        self.lines.join("\n")
    }
}

#[derive(Debug, Default)]
pub struct ProcessorOutput {
    pub records: Vec<TermRecord>,
    pub candidates: usize,
    pub dropped: usize,
}

pub trait DocumentProcessor {
    fn process(
        &self,
        document: &SourceDocument,
        version: &VersionInfo,
    ) -> Result<ProcessorOutput, ExtractError>;
}

pub struct TableProcessor<'a> {
    tables: &'a TableCellExtractor,
}

impl DocumentProcessor for TableProcessor<'_> {
    fn process(
        &self,
        document: &SourceDocument,
        version: &VersionInfo,
    ) -> Result<ProcessorOutput, ExtractError> {
        let extraction =
            self.tables
                .extract_markup(&document.document_id(), &document.markup(), version)?;
        Ok(ProcessorOutput {
            candidates: extraction.records.len() + extraction.skipped_rows,
            dropped: extraction.skipped_rows,
            records: extraction.records,
        })
    }
}

pub struct TextProcessor<'a> {
    fields: &'a FieldExtractor,
}

impl DocumentProcessor for TextProcessor<'_> {
    fn process(
        &self,
        document: &SourceDocument,
        version: &VersionInfo,
    ) -> Result<ProcessorOutput, ExtractError> {
        if document.lines.is_empty() {
            return Err(ExtractError::unsupported(&document.name, "document has no lines"));
        }

        let extraction = self
            .fields
            .extract(&document.document_id(), &document.lines, version);
        Ok(ProcessorOutput {
            records: extraction.records,
            candidates: extraction.candidates,
            dropped: extraction.dropped,
        })
    }
}

/// Table records first, then text records. Fails only when neither side
/// can read the document.
pub struct HybridProcessor<'a> {
    table: TableProcessor<'a>,
    text: TextProcessor<'a>,
}

impl DocumentProcessor for HybridProcessor<'_> {
    fn process(
        &self,
        document: &SourceDocument,
        version: &VersionInfo,
    ) -> Result<ProcessorOutput, ExtractError> {
        let table = self.table.process(document, version);
        let text = self.text.process(document, version);

        match (table, text) {
            (Ok(mut table), Ok(text)) => {
                table.records.extend(text.records);
                table.candidates += text.candidates;
                table.dropped += text.dropped;
                Ok(table)
            }
            (Ok(output), Err(error)) | (Err(error), Ok(output)) => {
                debug!(document = %document.name, error = %error, "hybrid side skipped");
                Ok(output)
            }
            (Err(_), Err(error)) => Err(error),
        }
    }
}

pub enum Processor<'a> {
    Table(TableProcessor<'a>),
    Text(TextProcessor<'a>),
    Hybrid(HybridProcessor<'a>),
}

impl DocumentProcessor for Processor<'_> {
    fn process(
        &self,
        document: &SourceDocument,
        version: &VersionInfo,
    ) -> Result<ProcessorOutput, ExtractError> {
        match self {
            Processor::Table(processor) => processor.process(document, version),
            Processor::Text(processor) => processor.process(document, version),
            Processor::Hybrid(processor) => processor.process(document, version),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentExtraction {
    pub source_name: String,
    pub document_id: String,
    pub plan: ProcessingPlan,
    pub version: VersionInfo,
    pub records: Vec<TermRecord>,
    pub glossary: Glossary,
    pub candidates: usize,
    pub dropped: usize,
}

impl DocumentExtraction {
    /// Versioned processor name for Schedule 2 terminology documents.
    pub fn processor_variant(&self) -> Option<String> {
        (self.plan.category == ScheduleCategory::Schedule2)
            .then(|| self.version.processor_variant())
    }
}

#[derive(Debug)]
pub enum DocumentOutcome {
    Unrecognized,
    Extracted(DocumentExtraction),
    Failed(ExtractError),
}

pub struct ClassificationPipeline {
    classifier: Classifier,
    resolver: VersionResolver,
    fields: FieldExtractor,
    tables: TableCellExtractor,
}

impl ClassificationPipeline {
    pub fn new(
        classifier: Classifier,
        resolver: VersionResolver,
        fields: FieldExtractor,
        tables: TableCellExtractor,
    ) -> Self {
        Self {
            classifier,
            resolver,
            fields,
            tables,
        }
    }

    pub fn from_config(config: &ExtractorConfig) -> Result<Self, ExtractError> {
        Ok(Self::new(
            Classifier::new(PatternTable::schedules()?),
            VersionResolver::new(config.version)?,
            FieldExtractor::new(&config.markers, config.limits)?,
            TableCellExtractor::new()?,
        ))
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn processor_for(&self, kind: ProcessorKind) -> Processor<'_> {
        let table = TableProcessor {
            tables: &self.tables,
        };
        let text = TextProcessor {
            fields: &self.fields,
        };

        match kind {
            ProcessorKind::Table => Processor::Table(table),
            ProcessorKind::Text => Processor::Text(text),
            ProcessorKind::Hybrid => Processor::Hybrid(HybridProcessor { table, text }),
        }
    }

    /// `Ok(None)` when the filename matches no known category.
    pub fn process(
        &self,
        document: &SourceDocument,
    ) -> Result<Option<DocumentExtraction>, ExtractError> {
        let Some(plan) = self.classifier.route(&document.name) else {
            debug!(document = %document.name, "no category matched");
            return Ok(None);
        };

        let version = self.resolver.resolve(&document.name, &document.lines);
        debug!(
            document = %document.name,
            category = %plan.category,
            processor = plan.processor_kind.as_str(),
            version = %version,
            version_source = version.detected_from.as_str(),
            "document routed"
        );

        let output = self
            .processor_for(plan.processor_kind)
            .process(document, &version)?;
        let glossary = Glossary::from_records(&output.records);

        Ok(Some(DocumentExtraction {
            source_name: document.name.clone(),
            document_id: document.document_id(),
            plan: plan.clone(),
            version,
            records: output.records,
            glossary,
            candidates: output.candidates,
            dropped: output.dropped,
        }))
    }

    /// Documents are independent; each worker produces its own outcome and
    /// the results are merged into one map afterwards.
    pub fn process_batch(&self, documents: &[SourceDocument]) -> BTreeMap<String, DocumentOutcome> {
        documents
            .par_iter()
            .map(|document| {
                let outcome = match self.process(document) {
                    Ok(Some(extraction)) => DocumentOutcome::Extracted(extraction),
                    Ok(None) => DocumentOutcome::Unrecognized,
                    Err(error) => DocumentOutcome::Failed(error),
                };
                (document.name.clone(), outcome)
            })
            .collect::<Vec<(String, DocumentOutcome)>>()
            .into_iter()
            .collect()
    }
}
