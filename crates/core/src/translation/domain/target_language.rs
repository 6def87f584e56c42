use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported target language '{0}' (expected one of: en, es, fr, de)")]
pub struct UnknownLanguageError(pub String);

/// Languages the translator can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetLanguage {
    En,
    Es,
    Fr,
    De,
}

impl TargetLanguage {
    pub const ALL: &[TargetLanguage] = &[
        TargetLanguage::En,
        TargetLanguage::Es,
        TargetLanguage::Fr,
        TargetLanguage::De,
    ];

    /// The service language code, also used as the key of returned translations.
    pub fn code(self) -> &'static str {
        match self {
            TargetLanguage::En => "en",
            TargetLanguage::Es => "es",
            TargetLanguage::Fr => "fr",
            TargetLanguage::De => "de",
        }
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for TargetLanguage {
    type Err = UnknownLanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(TargetLanguage::En),
            "es" => Ok(TargetLanguage::Es),
            "fr" => Ok(TargetLanguage::Fr),
            "de" => Ok(TargetLanguage::De),
            _ => Err(UnknownLanguageError(s.to_string())),
        }
    }
}
