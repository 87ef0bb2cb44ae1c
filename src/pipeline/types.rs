use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScheduleCategory {
    #[serde(rename = "Schedule_2")]
    Schedule2,
    #[serde(rename = "Schedule_3")]
    Schedule3,
    #[serde(rename = "Schedule_4a")]
    Schedule4a,
    #[serde(rename = "Schedule_4b")]
    Schedule4b,
    #[serde(rename = "Schedule_5")]
    Schedule5,
    #[serde(rename = "Schedule_6")]
    Schedule6,
    #[serde(rename = "Glossary")]
    Glossary,
}

impl ScheduleCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Schedule2 => "Schedule_2",
            Self::Schedule3 => "Schedule_3",
            Self::Schedule4a => "Schedule_4a",
            Self::Schedule4b => "Schedule_4b",
            Self::Schedule5 => "Schedule_5",
            Self::Schedule6 => "Schedule_6",
            Self::Glossary => "Glossary",
        }
    }
}

impl fmt::Display for ScheduleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessorKind {
    Table,
    Text,
    Hybrid,
}

impl ProcessorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Text => "text",
            Self::Hybrid => "hybrid",
        }
    }
}

/// Static descriptor of how documents of one category are extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingPlan {
    pub category: ScheduleCategory,
    pub processor_kind: ProcessorKind,
    pub extractors: Vec<String>,
    pub description: String,
}

impl ProcessingPlan {
    pub fn new(
        category: ScheduleCategory,
        processor_kind: ProcessorKind,
        extractors: &[&str],
        description: &str,
    ) -> Self {
        Self {
            category,
            processor_kind,
            extractors: extractors.iter().map(|name| name.to_string()).collect(),
            description: description.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionSource {
    Filename,
    Content,
    Default,
}

impl VersionSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Filename => "filename",
            Self::Content => "content",
            Self::Default => "default",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub major: u32,
    pub minor: u32,
    pub detected_from: VersionSource,
    pub confidence: f64,
}

impl VersionInfo {
    pub fn fallback(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            detected_from: VersionSource::Default,
            confidence: 0.0,
        }
    }

    /// Downstream processor variant keyed on the major version, e.g. `schedule2_v3`.
    pub fn processor_variant(&self) -> String {
        format!("schedule2_v{}", self.major)
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermRecord {
    pub term: String,
    pub definition: String,
    pub source_page: u32,
    pub document_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_element_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_reference_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_no: Option<String>,
    pub document_version: VersionInfo,
}

/// Term to definition mapping. A term keeps the position of its first
/// insertion; inserting it again replaces only the definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Glossary {
    entries: Vec<(String, String)>,
    positions: HashMap<String, usize>,
}

impl Glossary {
    pub fn from_records(records: &[TermRecord]) -> Self {
        let mut glossary = Self::default();
        for record in records {
            glossary.insert(&record.term, &record.definition);
        }
        glossary
    }

    pub fn insert(&mut self, term: &str, definition: &str) {
        match self.positions.get(term) {
            Some(&position) => self.entries[position].1 = definition.to_string(),
            None => {
                self.positions.insert(term.to_string(), self.entries.len());
                self.entries.push((term.to_string(), definition.to_string()));
            }
        }
    }

    pub fn merge(&mut self, other: &Glossary) {
        for (term, definition) in other.iter() {
            self.insert(term, definition);
        }
    }

    pub fn get(&self, term: &str) -> Option<&str> {
        self.positions
            .get(term)
            .map(|position| self.entries[*position].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(term, definition)| (term.as_str(), definition.as_str()))
    }
}

/// Serializes as a JSON object in first-seen term order.
impl Serialize for Glossary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}
