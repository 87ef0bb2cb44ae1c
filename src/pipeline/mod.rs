mod fields;
mod patterns;
mod processor;
mod tables;
mod types;
mod version;

pub use processor::{ClassificationPipeline, DocumentExtraction, DocumentOutcome, SourceDocument};
pub use types::{Glossary, ProcessingPlan, TermRecord};
