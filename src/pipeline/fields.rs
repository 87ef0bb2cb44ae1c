use regex::Regex;
use tracing::debug;

use super::types::{TermRecord, VersionInfo};
use crate::config::{MarkerConfig, TermLimits};
use crate::error::{ExtractError, compile_pattern};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetadataField {
    DataElementName,
    LegalReference,
    UniqueReferenceId,
    VersionNumber,
}

impl MetadataField {
    const ALL: [MetadataField; 4] = [
        MetadataField::DataElementName,
        MetadataField::LegalReference,
        MetadataField::UniqueReferenceId,
        MetadataField::VersionNumber,
    ];

    /// The only field allowed to share a physical line with `self`, trailing it.
    fn trailing_pair(self) -> Option<MetadataField> {
        match self {
            MetadataField::DataElementName => Some(MetadataField::LegalReference),
            MetadataField::UniqueReferenceId => Some(MetadataField::VersionNumber),
            MetadataField::LegalReference | MetadataField::VersionNumber => None,
        }
    }
}

#[derive(Debug)]
struct Markers {
    record_start: String,
    definition: String,
    data_element_name: String,
    legal_reference: String,
    unique_reference_id: String,
    version_number: String,
    page: Regex,
}

impl Markers {
    fn metadata(&self, field: MetadataField) -> &str {
        match field {
            MetadataField::DataElementName => &self.data_element_name,
            MetadataField::LegalReference => &self.legal_reference,
            MetadataField::UniqueReferenceId => &self.unique_reference_id,
            MetadataField::VersionNumber => &self.version_number,
        }
    }

    fn record_start<'a>(&self, line: &'a str) -> Option<&'a str> {
        strip_marker(line, &self.record_start)
    }

    fn definition<'a>(&self, line: &'a str) -> Option<&'a str> {
        strip_marker(line, &self.definition)
    }

    fn leading_metadata<'a>(&self, line: &'a str) -> Option<(MetadataField, &'a str)> {
        MetadataField::ALL
            .iter()
            .find_map(|field| strip_marker(line, self.metadata(*field)).map(|rest| (*field, rest)))
    }

    fn ends_definition(&self, line: &str) -> bool {
        line.is_empty()
            || self.record_start(line).is_some()
            || self.leading_metadata(line).is_some()
    }

    /// `None` for ordinary lines. Any line shaped like a page marker yields
    /// `Some`, carrying the page only when the number is a usable page.
    fn page_marker(&self, line: &str) -> Option<Option<u32>> {
        let captures = self.page.captures(line)?;
        Some(
            captures
                .get(1)
                .and_then(|number| number.as_str().parse::<u32>().ok())
                .filter(|page| *page > 0),
        )
    }
}

/// `Some(rest)` when `line` opens with `marker`. A line holding only the
/// marker text (trailing whitespace trimmed away) matches with an empty rest.
fn strip_marker<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    if let Some(rest) = line.strip_prefix(marker) {
        return Some(rest.trim());
    }

    let bare = marker.trim_end();
    if !bare.is_empty() && line == bare {
        return Some("");
    }

    None
}

struct LineCursor<'a> {
    lines: &'a [String],
    index: usize,
    current_page: u32,
}

impl<'a> LineCursor<'a> {
    fn new(lines: &'a [String]) -> Self {
        Self {
            lines,
            index: 0,
            current_page: 1,
        }
    }

    fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.index).map(|line| line.trim())
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    fn turn_page(&mut self, page: Option<u32>) {
        if let Some(page) = page {
            self.current_page = page;
        }
        self.advance();
    }
}

#[derive(Debug, Default)]
struct Candidate {
    term: String,
    definition: Option<String>,
    data_element_name: Option<String>,
    legal_reference: Option<String>,
    unique_reference_id: Option<String>,
    version_no: Option<String>,
}

impl Candidate {
    fn set(&mut self, field: MetadataField, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }

        let slot = match field {
            MetadataField::DataElementName => &mut self.data_element_name,
            MetadataField::LegalReference => &mut self.legal_reference,
            MetadataField::UniqueReferenceId => &mut self.unique_reference_id,
            MetadataField::VersionNumber => &mut self.version_no,
        };
        *slot = Some(value.to_string());
    }

    fn append_definition(&mut self, line: &str) {
        let definition = self.definition.get_or_insert_with(String::new);
        if !definition.is_empty() {
            definition.push(' ');
        }
        definition.push_str(line);
    }
}

#[derive(Debug, Default)]
pub struct FieldExtraction {
    pub records: Vec<TermRecord>,
    pub candidates: usize,
    pub dropped: usize,
}

/// Line-oriented scanner turning `Business term` / `Definition` blocks into
/// [`TermRecord`]s. Scanning is forward-only over an index cursor; a record
/// runs from its start marker to the next start marker or end of input.
#[derive(Debug)]
pub struct FieldExtractor {
    markers: Markers,
    limits: TermLimits,
}

impl FieldExtractor {
    pub fn new(markers: &MarkerConfig, limits: TermLimits) -> Result<Self, ExtractError> {
        Ok(Self {
            markers: Markers {
                record_start: markers.record_start.clone(),
                definition: markers.definition.clone(),
                data_element_name: markers.data_element_name.clone(),
                legal_reference: markers.legal_reference.clone(),
                unique_reference_id: markers.unique_reference_id.clone(),
                version_number: markers.version_number.clone(),
                page: compile_pattern(&markers.page_marker)?,
            },
            limits,
        })
    }

    pub fn extract(
        &self,
        document_id: &str,
        lines: &[String],
        version: &VersionInfo,
    ) -> FieldExtraction {
        let mut cursor = LineCursor::new(lines);
        let mut extraction = FieldExtraction::default();

        while let Some(line) = cursor.peek() {
            if let Some(page) = self.markers.page_marker(line) {
                cursor.turn_page(page);
                continue;
            }

            let Some(term) = self.markers.record_start(line) else {
                cursor.advance();
                continue;
            };

            let source_page = cursor.current_page;
            cursor.advance();
            let candidate = self.scan_record(term, &mut cursor);
            extraction.candidates += 1;

            match self.finalize(candidate, source_page, document_id, version) {
                Some(record) => extraction.records.push(record),
                None => extraction.dropped += 1,
            }
        }

        extraction
    }

    fn scan_record(&self, term: &str, cursor: &mut LineCursor<'_>) -> Candidate {
        let mut candidate = Candidate {
            term: term.to_string(),
            ..Candidate::default()
        };
        let mut in_definition = false;

        while let Some(line) = cursor.peek() {
            if let Some(page) = self.markers.page_marker(line) {
                cursor.turn_page(page);
                continue;
            }

            if self.markers.record_start(line).is_some() {
                break;
            }

            if in_definition {
                if !self.markers.ends_definition(line) {
                    candidate.append_definition(line);
                    cursor.advance();
                    continue;
                }
                in_definition = false;
            }

            if let Some(rest) = self.markers.definition(line) {
                if candidate.definition.is_none() {
                    candidate.definition = Some(rest.to_string());
                    in_definition = true;
                }
            } else if let Some((field, rest)) = self.markers.leading_metadata(line) {
                self.assign_metadata(&mut candidate, field, rest);
            }

            cursor.advance();
        }

        candidate
    }

    fn assign_metadata(&self, candidate: &mut Candidate, field: MetadataField, rest: &str) {
        let embedded = MetadataField::ALL
            .iter()
            .filter(|other| **other != field)
            .filter_map(|other| {
                rest.find(self.markers.metadata(*other))
                    .map(|position| (position, *other))
            })
            .collect::<Vec<(usize, MetadataField)>>();

        match embedded.as_slice() {
            [] => candidate.set(field, rest),
            [(position, other)] if field.trailing_pair() == Some(*other) => {
                let marker_len = self.markers.metadata(*other).len();
                candidate.set(field, &rest[..*position]);
                candidate.set(*other, &rest[position + marker_len..]);
            }
            _ => {
                debug!(
                    field = ?field,
                    line = rest,
                    "metadata line mixes undocumented markers; field dropped"
                );
            }
        }
    }

    fn finalize(
        &self,
        candidate: Candidate,
        source_page: u32,
        document_id: &str,
        version: &VersionInfo,
    ) -> Option<TermRecord> {
        let term = candidate.term.trim();
        let definition = candidate.definition.as_deref().unwrap_or("").trim();

        if term.is_empty() || definition.is_empty() {
            debug!(term, source_page, "candidate without term or definition dropped");
            return None;
        }

        if term.chars().count() >= self.limits.max_term_chars
            || term.split_whitespace().count() > self.limits.max_term_words
        {
            debug!(term, source_page, "candidate term exceeds length bounds");
            return None;
        }

        Some(TermRecord {
            term: term.to_string(),
            definition: definition.to_string(),
            source_page,
            document_id: document_id.to_string(),
            data_element_name: candidate.data_element_name,
            legal_reference: candidate.legal_reference,
            unique_reference_id: candidate.unique_reference_id,
            version_no: candidate.version_no,
            document_version: *version,
        })
    }
}
