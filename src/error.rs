use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported format for {document}: {reason}")]
    UnsupportedFormat { document: String, reason: String },

    #[error("invalid pattern `{pattern}`")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("confidence {value} is outside [0, 1]")]
    InvalidConfidence { value: f64 },
}

impl ExtractError {
    pub fn unsupported(document: &str, reason: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            document: document.to_string(),
            reason: reason.into(),
        }
    }
}

pub fn compile_pattern(pattern: &str) -> Result<regex::Regex, ExtractError> {
    regex::Regex::new(pattern).map_err(|source| ExtractError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}
