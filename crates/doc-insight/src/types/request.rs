//! Pipeline request types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use super::kind::SourceKind;

/// Prompt style used for text inference
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InferenceMode {
    #[default]
    Basic,
    Advanced,
}

impl FromStr for InferenceMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "basic" | "1" => Ok(Self::Basic),
            "advanced" | "2" => Ok(Self::Advanced),
            other => Err(Error::InvalidRequest(format!(
                "inference_type must be 'basic' or 'advanced', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for InferenceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic => f.write_str("basic"),
            Self::Advanced => f.write_str("advanced"),
        }
    }
}

/// One invocation of the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRequest {
    /// Local path or cloud document id
    pub location: String,
    /// Explicit kind; detected from the extension when absent
    #[serde(default)]
    pub kind: Option<SourceKind>,
    /// Prompt style for text payloads
    #[serde(default)]
    pub mode: InferenceMode,
    /// Override the configured cleaning toggle
    #[serde(default)]
    pub clean: Option<bool>,
}

impl PipelineRequest {
    /// Request for a location with detected kind and default mode
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            kind: None,
            mode: InferenceMode::Basic,
            clean: None,
        }
    }

    /// Route to an explicit kind
    pub fn with_kind(mut self, kind: SourceKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Set the inference mode
    pub fn with_mode(mut self, mode: InferenceMode) -> Self {
        self.mode = mode;
        self
    }

    /// Force cleaning on or off for this request
    pub fn with_cleaning(mut self, clean: bool) -> Self {
        self.clean = Some(clean);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("basic".parse::<InferenceMode>().unwrap(), InferenceMode::Basic);
        assert_eq!("ADVANCED".parse::<InferenceMode>().unwrap(), InferenceMode::Advanced);
        assert_eq!("".parse::<InferenceMode>().unwrap(), InferenceMode::Basic);
        assert!("expert".parse::<InferenceMode>().is_err());
    }
}
