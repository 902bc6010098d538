//! Tool output model.

use crate::core::data::{RawBlob, TextBlob};

/// One slot of a batch result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutput {
    Binary(RawBlob),
    Text(TextBlob),
}

impl ToolOutput {
    pub fn name(&self) -> Option<&str> {
        match self {
            ToolOutput::Binary(blob) => blob.name(),
            ToolOutput::Text(text) => text.name(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            ToolOutput::Binary(blob) => blob.data(),
            ToolOutput::Text(text) => text.text().as_bytes(),
        }
    }

    /// Extension used when the output carries no name of its own.
    pub fn default_extension(&self) -> &'static str {
        match self {
            ToolOutput::Binary(_) => "bin",
            ToolOutput::Text(text) => text.format(),
        }
    }
}

impl From<RawBlob> for ToolOutput {
    fn from(blob: RawBlob) -> Self {
        ToolOutput::Binary(blob)
    }
}

impl From<TextBlob> for ToolOutput {
    fn from(text: TextBlob) -> Self {
        ToolOutput::Text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_output_exposes_utf8_bytes_and_format() {
        let out: ToolOutput = TextBlob::new(None, "{}".into(), TextBlob::JSON).into();
        assert_eq!(out.bytes(), b"{}");
        assert_eq!(out.default_extension(), "json");
        assert!(out.name().is_none());
    }
}
