use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub markers: MarkerConfig,
    pub limits: TermLimits,
    pub version: VersionSettings,
}

impl ExtractorConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.markers.record_start.trim().is_empty() {
            bail!("markers.record_start must not be blank");
        }
        if self.markers.definition.trim().is_empty() {
            bail!("markers.definition must not be blank");
        }
        for (name, value) in [
            ("version.filename_threshold", self.version.filename_threshold),
            ("version.content_threshold", self.version.content_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("{name} must be within [0, 1], got {value}");
            }
        }
        Ok(())
    }
}

/// Literal line prefixes recognised by the field extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub record_start: String,
    pub definition: String,
    pub data_element_name: String,
    pub legal_reference: String,
    pub unique_reference_id: String,
    pub version_number: String,
    pub page_marker: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            record_start: "Business term ".to_string(),
            definition: "Definition ".to_string(),
            data_element_name: "Data element name:".to_string(),
            legal_reference: "Term legal reference:".to_string(),
            unique_reference_id: "Unique reference ID:".to_string(),
            version_number: "Term version no.:".to_string(),
            page_marker: r"^PAGE\s+(\d+)\b".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TermLimits {
    /// Exclusive upper bound on term length in characters.
    pub max_term_chars: usize,
    /// Inclusive upper bound on whitespace-separated words in a term.
    pub max_term_words: usize,
}

impl Default for TermLimits {
    fn default() -> Self {
        Self {
            max_term_chars: 200,
            max_term_words: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionSettings {
    pub filename_threshold: f64,
    pub content_threshold: f64,
    pub content_scan_lines: usize,
    pub default_major: u32,
    pub default_minor: u32,
}

impl Default for VersionSettings {
    fn default() -> Self {
        Self {
            filename_threshold: 0.9,
            content_threshold: 0.7,
            content_scan_lines: 400,
            default_major: 2,
            default_minor: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn partial_config_keeps_defaults_for_missing_fields() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{"markers": {{"record_start": "Term "}}, "limits": {{"max_term_words": 5}}}}"#
        )
        .expect("write config");

        let config = ExtractorConfig::load(file.path()).expect("config loads");
        assert_eq!(config.markers.record_start, "Term ");
        assert_eq!(config.markers.definition, "Definition ");
        assert_eq!(config.limits.max_term_words, 5);
        assert_eq!(config.limits.max_term_chars, 200);
        assert_eq!(config.version.default_major, 2);
    }

    #[test]
    fn threshold_outside_unit_interval_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"version": {{"content_threshold": 1.5}}}}"#).expect("write config");

        let error = ExtractorConfig::load(file.path()).expect_err("config rejected");
        assert!(error.to_string().contains("content_threshold"));
    }
}
