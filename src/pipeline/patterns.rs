use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};

use super::types::{ProcessingPlan, ProcessorKind, ScheduleCategory};
use crate::error::ExtractError;

/// Ordered filename patterns plus the plan registered for each category.
/// Patterns are evaluated in insertion order; the first match wins.
#[derive(Debug, Clone, Default)]
pub struct PatternTable {
    patterns: Vec<(Regex, ScheduleCategory)>,
    plans: BTreeMap<ScheduleCategory, ProcessingPlan>,
}

impl PatternTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pattern(
        mut self,
        pattern: &str,
        category: ScheduleCategory,
    ) -> Result<Self, ExtractError> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| ExtractError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        self.patterns.push((regex, category));
        Ok(self)
    }

    pub fn with_plan(mut self, plan: ProcessingPlan) -> Self {
        self.plans.insert(plan.category, plan);
        self
    }

    pub fn schedules() -> Result<Self, ExtractError> {
        let table = Self::new()
            .with_pattern(r"Schedule.*2.*Terms.*Definitions", ScheduleCategory::Schedule2)?
            .with_pattern(r"Schedule.*3.*Payment", ScheduleCategory::Schedule3)?
            .with_pattern(r"Schedule.*4a.*Contributions", ScheduleCategory::Schedule4a)?
            .with_pattern(r"Schedule.*4b.*Rollover", ScheduleCategory::Schedule4b)?
            .with_pattern(r"Schedule.*5.*Message", ScheduleCategory::Schedule5)?
            .with_pattern(r"Schedule.*6.*Error", ScheduleCategory::Schedule6)?
            .with_pattern(r"glossary", ScheduleCategory::Glossary)?;

        Ok(table
            .with_plan(ProcessingPlan::new(
                ScheduleCategory::Schedule2,
                ProcessorKind::Text,
                &["terminology"],
                "Terms and Definitions - business term blocks from the text layer",
            ))
            .with_plan(ProcessingPlan::new(
                ScheduleCategory::Schedule3,
                ProcessorKind::Text,
                &[],
                "Payment Methods - Text-based specifications",
            ))
            .with_plan(ProcessingPlan::new(
                ScheduleCategory::Schedule4a,
                ProcessorKind::Table,
                &["field_spec"],
                "Contributions - Complex field specifications",
            ))
            .with_plan(ProcessingPlan::new(
                ScheduleCategory::Schedule4b,
                ProcessorKind::Table,
                &["field_spec"],
                "Rollover - Complex field specifications",
            ))
            .with_plan(ProcessingPlan::new(
                ScheduleCategory::Schedule5,
                ProcessorKind::Table,
                &[],
                "Message Orchestration - Specification tables",
            ))
            .with_plan(ProcessingPlan::new(
                ScheduleCategory::Schedule6,
                ProcessorKind::Hybrid,
                &["error_code", "xml_schema"],
                "Error Code Management - Tables + XSD code blocks",
            ))
            .with_plan(ProcessingPlan::new(
                ScheduleCategory::Glossary,
                ProcessorKind::Table,
                &["glossary_table"],
                "Glossary - Two column term/definition tables",
            )))
    }

    fn plan_for(&self, category: ScheduleCategory) -> Option<&ProcessingPlan> {
        self.plans.get(&category)
    }
}

#[derive(Debug, Clone)]
pub struct Classifier {
    table: PatternTable,
}

impl Classifier {
    pub fn new(table: PatternTable) -> Self {
        Self { table }
    }

    pub fn detect_category(&self, filename: &str) -> Option<ScheduleCategory> {
        self.table
            .patterns
            .iter()
            .find(|(regex, _)| regex.is_match(filename))
            .map(|(_, category)| *category)
    }

    pub fn route(&self, filename: &str) -> Option<&ProcessingPlan> {
        let category = self.detect_category(filename)?;
        self.table.plan_for(category)
    }

    pub fn route_batch<'a, I>(&self, filenames: I) -> BTreeMap<String, Option<ProcessingPlan>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        filenames
            .into_iter()
            .map(|filename| (filename.to_string(), self.route(filename).cloned()))
            .collect()
    }
}
