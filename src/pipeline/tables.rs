use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::types::{Glossary, TermRecord, VersionInfo};
use crate::error::ExtractError;

pub type TableRows = Vec<Vec<String>>;

#[derive(Debug, Default)]
pub struct TableExtraction {
    pub records: Vec<TermRecord>,
    pub glossary: Glossary,
    pub skipped_rows: usize,
}

/// Pulls term/definition pairs out of the first two cells of every non-header row.
#[derive(Debug)]
pub struct TableCellExtractor {
    table: Selector,
    row: Selector,
    cell: Selector,
}

impl TableCellExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            table: parse_selector("table")?,
            row: parse_selector("tr")?,
            cell: parse_selector("td, th")?,
        })
    }

    pub fn extract_markup(
        &self,
        document_id: &str,
        markup: &str,
        version: &VersionInfo,
    ) -> Result<TableExtraction, ExtractError> {
        let tables = self.parse_tables(markup);
        self.extract_tables(document_id, &tables, version)
    }

    pub fn extract_tables(
        &self,
        document_id: &str,
        tables: &[TableRows],
        version: &VersionInfo,
    ) -> Result<TableExtraction, ExtractError> {
        if tables.is_empty() {
            return Err(ExtractError::unsupported(document_id, "no tables found"));
        }

        let mut extraction = TableExtraction::default();
        for rows in tables {
            for cells in rows.iter().skip(1) {
                let Some(record) = row_to_record(cells, document_id, version) else {
                    extraction.skipped_rows += 1;
                    continue;
                };
                extraction.glossary.insert(&record.term, &record.definition);
                extraction.records.push(record);
            }
        }

        debug!(
            document_id,
            tables = tables.len(),
            records = extraction.records.len(),
            skipped_rows = extraction.skipped_rows,
            "table extraction finished"
        );

        Ok(extraction)
    }

    /// HTML tables when the markup contains a `<table>` element, otherwise
    /// pipe-delimited markdown tables.
    pub fn parse_tables(&self, markup: &str) -> Vec<TableRows> {
        if markup.to_ascii_lowercase().contains("<table") {
            self.parse_html_tables(markup)
        } else {
            parse_pipe_tables(markup)
        }
    }

    fn parse_html_tables(&self, markup: &str) -> Vec<TableRows> {
        let document = Html::parse_document(markup);

        document
            .select(&self.table)
            .map(|table| {
                table
                    .select(&self.row)
                    .filter(|row| nearest_ancestor_is(*row, "table", table))
                    .map(|row| {
                        row.select(&self.cell)
                            .filter(|cell| nearest_ancestor_is(*cell, "tr", row))
                            .map(|cell| condense_whitespace(&cell.text().collect::<Vec<&str>>().join(" ")))
                            .collect::<Vec<String>>()
                    })
                    .collect::<TableRows>()
            })
            .collect()
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|error| ExtractError::InvalidSelector {
        selector: selector.to_string(),
        reason: error.to_string(),
    })
}

/// Keeps rows and cells of nested tables out of their enclosing table.
fn nearest_ancestor_is(element: ElementRef<'_>, name: &str, owner: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .find(|node| {
            node.value()
                .as_element()
                .map(|value| value.name() == name)
                .unwrap_or(false)
        })
        .map(|node| node.id() == owner.id())
        .unwrap_or(false)
}

fn row_to_record(cells: &[String], document_id: &str, version: &VersionInfo) -> Option<TermRecord> {
    if cells.len() < 2 {
        return None;
    }

    let term = cells[0].trim();
    let definition = cells[1].trim();
    if term.is_empty() || definition.is_empty() {
        return None;
    }

    Some(TermRecord {
        term: term.to_string(),
        definition: definition.to_string(),
        source_page: 1,
        document_id: document_id.to_string(),
        data_element_name: None,
        legal_reference: None,
        unique_reference_id: None,
        version_no: None,
        document_version: *version,
    })
}

fn parse_pipe_tables(markup: &str) -> Vec<TableRows> {
    let mut tables = Vec::<TableRows>::new();
    let mut current = TableRows::new();

    for line in markup.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('|') {
            if !is_separator_row(trimmed) {
                current.push(split_pipe_row(trimmed));
            }
            continue;
        }

        if !current.is_empty() {
            tables.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        tables.push(current);
    }

    tables
}

fn split_pipe_row(line: &str) -> Vec<String> {
    let inner = line.trim_start_matches('|');
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(condense_whitespace).collect()
}

fn is_separator_row(line: &str) -> bool {
    let cells = split_pipe_row(line);
    !cells.is_empty()
        && cells.iter().all(|cell| {
            let dashes = cell.trim_matches(':');
            dashes.len() >= 3 && dashes.chars().all(|character| character == '-')
        })
}

fn condense_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<&str>>().join(" ")
}
