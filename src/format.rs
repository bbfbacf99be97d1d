use anyhow::{Result, bail};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Output format for command results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON - machine-parseable, the interchange format for forests
    #[default]
    Json,
    /// TOON (Token-Oriented Object Notation) - compact, LLM-friendly
    Toon,
    /// Plain text - an indented tree for humans
    Text,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "toon" => Ok(Self::Toon),
            "text" => Ok(Self::Text),
            _ => bail!("Invalid format '{s}'. Use: json, toon, or text"),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Toon => write!(f, "toon"),
            Self::Text => write!(f, "text"),
        }
    }
}

impl OutputFormat {
    /// Serialize data to the requested format
    ///
    /// # Errors
    /// Fails if the data cannot be encoded, or for [`OutputFormat::Text`],
    /// which callers render themselves.
    pub fn serialize<T: Serialize>(self, data: &T) -> Result<String> {
        match self {
            Self::Json => serde_json::to_string_pretty(data)
                .map_err(|e| anyhow::anyhow!("JSON serialization failed: {e}")),
            Self::Toon => {
                // toon-format's encode function expects a serde_json::Value
                let json_value = serde_json::to_value(data)
                    .map_err(|e| anyhow::anyhow!("Failed to convert to JSON value: {e}"))?;

                let options = toon_format::EncodeOptions::default();
                toon_format::encode(&json_value, &options)
                    .map_err(|e| anyhow::anyhow!("TOON encoding failed: {e}"))
            }
            Self::Text => bail!("Text format should not use serialize()"),
        }
    }
}
