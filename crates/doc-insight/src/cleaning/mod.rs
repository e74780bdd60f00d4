//! Cleaning stage: normalizes extracted text or tables

mod table;
mod text;

pub use table::{clean_table, impute_mode};
pub use text::clean_text;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::types::{CleanedPayload, Payload, RawPayload, SourceKind};

/// Payload shape a caller expects to clean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclaredShape {
    Text,
    Structured,
}

impl DeclaredShape {
    /// Actual shape of a payload
    pub fn of(payload: &Payload) -> Self {
        match payload {
            Payload::Text(_) => Self::Text,
            Payload::Tables(_) => Self::Structured,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Structured => "structured",
        }
    }
}

impl fmt::Display for DeclaredShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeclaredShape {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "structured" => Ok(Self::Structured),
            other => Err(Error::cleaning(format!("unknown payload kind '{}'", other))),
        }
    }
}

/// Normalizes payloads without changing their shape
#[derive(Debug, Clone, Copy, Default)]
pub struct Cleaner;

impl Cleaner {
    pub fn new() -> Self {
        Self
    }

    /// Clean a payload of whatever shape it has
    pub fn clean(&self, kind: SourceKind, payload: RawPayload) -> Result<CleanedPayload> {
        match payload {
            Payload::Text(text) => Ok(Payload::Text(clean_text(&text))),
            Payload::Tables(tables) => {
                let call_records = kind == SourceKind::CallRecords;
                let cleaned = tables
                    .into_iter()
                    .map(|t| clean_table(t, call_records))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Payload::Tables(cleaned))
            }
        }
    }

    /// Clean a payload the caller declares to be of a given shape
    pub fn clean_as(
        &self,
        declared: DeclaredShape,
        kind: SourceKind,
        payload: RawPayload,
    ) -> Result<CleanedPayload> {
        let actual = DeclaredShape::of(&payload);
        if actual != declared {
            return Err(Error::cleaning(format!(
                "expected {} payload from {}, got {}",
                declared, kind, actual
            )));
        }
        self.clean(kind, payload)
    }
}
