use regex::Regex;
use tracing::debug;

use super::types::{VersionInfo, VersionSource};
use crate::config::VersionSettings;
use crate::error::{ExtractError, compile_pattern};

#[derive(Debug, Clone)]
pub struct VersionRule {
    pattern: Regex,
    confidence: f64,
}

impl VersionRule {
    /// `pattern` must capture the major version in group 1; group 2 (minor) is optional.
    pub fn new(pattern: &str, confidence: f64) -> Result<Self, ExtractError> {
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(ExtractError::InvalidConfidence { value: confidence });
        }

        Ok(Self {
            pattern: compile_pattern(pattern)?,
            confidence,
        })
    }

    fn apply(&self, haystack: &str) -> Option<(u32, u32)> {
        let captures = self.pattern.captures(haystack)?;
        let major = captures.get(1)?.as_str().parse::<u32>().ok()?;
        let minor = match captures.get(2) {
            Some(value) => value.as_str().parse::<u32>().ok()?,
            None => 0,
        };
        Some((major, minor))
    }
}

fn default_filename_rules() -> Result<Vec<VersionRule>, ExtractError> {
    Ok(vec![
        VersionRule::new(r"(?i)(?:^|[^a-z])v(?:er(?:sion)?)?[\s_.-]*(\d+)[._](\d+)", 0.95)?,
        VersionRule::new(
            r"(?i)[\s_-](\d+)\.(\d+)(?:\.\d+)*\.(?:pdf|html?|txt|md)$",
            0.6,
        )?,
    ])
}

fn default_content_rules() -> Result<Vec<VersionRule>, ExtractError> {
    Ok(vec![
        VersionRule::new(
            r"(?im)^\s*(?:document\s+)?version\s*(?:no\.?|number)?\s*[:\-]?\s*v?(\d+)\.(\d+)",
            0.85,
        )?,
        VersionRule::new(
            r"(?im)^.*\b(?:schedule\s+2|superstream)\b.*\bv(\d+)\.(\d+)\b",
            0.8,
        )?,
    ])
}

/// Filename first, document text second, configured default last.
#[derive(Debug, Clone)]
pub struct VersionResolver {
    filename_rules: Vec<VersionRule>,
    content_rules: Vec<VersionRule>,
    settings: VersionSettings,
}

impl VersionResolver {
    pub fn new(settings: VersionSettings) -> Result<Self, ExtractError> {
        Ok(Self::with_rules(
            default_filename_rules()?,
            default_content_rules()?,
            settings,
        ))
    }

    pub fn with_rules(
        filename_rules: Vec<VersionRule>,
        content_rules: Vec<VersionRule>,
        settings: VersionSettings,
    ) -> Self {
        Self {
            filename_rules,
            content_rules,
            settings,
        }
    }

    pub fn detect_from_filename(&self, filename: &str) -> Option<VersionInfo> {
        best_match(&self.filename_rules, filename, VersionSource::Filename)
    }

    pub fn detect_from_content(&self, lines: &[String]) -> Option<VersionInfo> {
        let scanned = lines
            .iter()
            .take(self.settings.content_scan_lines)
            .map(String::as_str)
            .collect::<Vec<&str>>()
            .join("\n");
        best_match(&self.content_rules, &scanned, VersionSource::Content)
    }

    pub fn resolve(&self, filename: &str, lines: &[String]) -> VersionInfo {
        if let Some(version) = self.detect_from_filename(filename)
            && version.confidence > self.settings.filename_threshold
        {
            debug!(filename, version = %version, "version resolved from filename");
            return version;
        }

        if let Some(version) = self.detect_from_content(lines)
            && version.confidence > self.settings.content_threshold
        {
            debug!(filename, version = %version, "version resolved from content");
            return version;
        }

        VersionInfo::fallback(self.settings.default_major, self.settings.default_minor)
    }
}

fn best_match(rules: &[VersionRule], haystack: &str, source: VersionSource) -> Option<VersionInfo> {
    let mut best: Option<VersionInfo> = None;
    for rule in rules {
        let Some((major, minor)) = rule.apply(haystack) else {
            continue;
        };
        let replace = best
            .map(|current| rule.confidence > current.confidence)
            .unwrap_or(true);
        if replace {
            best = Some(VersionInfo {
                major,
                minor,
                detected_from: source,
                confidence: rule.confidence,
            });
        }
    }
    best
}
