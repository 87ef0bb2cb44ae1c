use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceEntry {
    pub filename: String,
    pub sha256: String,
    pub byte_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunPaths {
    pub source_directory: String,
    pub output_directory: String,
    pub combined_glossary_path: String,
    pub manifest_path: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunCounts {
    pub source_count: usize,
    pub extracted_count: usize,
    pub empty_extraction_count: usize,
    pub unrecognized_count: usize,
    pub failed_count: usize,
    pub record_count: usize,
    pub dropped_candidate_count: usize,
    pub combined_glossary_terms: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Extracted,
    EmptyExtraction,
    Unrecognized,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub filename: String,
    pub source: Option<SourceEntry>,
    pub status: DocumentStatus,
    pub document_id: Option<String>,
    pub category: Option<String>,
    pub processor_kind: Option<String>,
    pub extractors: Vec<String>,
    pub version: Option<String>,
    pub processor_variant: Option<String>,
    pub version_detected_from: Option<String>,
    pub version_confidence: Option<f64>,
    pub record_count: usize,
    pub glossary_terms: usize,
    pub dropped_candidate_count: usize,
    pub failure_reason: Option<String>,
    pub outputs: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub command: String,
    pub paths: RunPaths,
    pub counts: RunCounts,
    pub documents: Vec<DocumentSummary>,
    pub warnings: Vec<String>,
}
