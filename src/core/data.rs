//! Input shapes a tool can ask for.

use serde::Serialize;

use crate::dispatch::sniff::{classify, Sniff};

/// Bytes as handed to the dispatcher. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlob {
    name: Option<String>,
    data: Vec<u8>,
}

impl RawBlob {
    pub fn new(name: Option<String>, data: Vec<u8>) -> Self {
        Self { name, data }
    }

    pub fn named(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self::new(Some(name.into()), data)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_parts(self) -> (Option<String>, Vec<u8>) {
        (self.name, self.data)
    }

    /// Lossy UTF-8 decode; invalid sequences become U+FFFD.
    pub fn to_text(&self) -> TextBlob {
        TextBlob::new(
            self.name.clone(),
            String::from_utf8_lossy(&self.data).into_owned(),
            TextBlob::PLAIN,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextBlob {
    name: Option<String>,
    text: String,
    format: &'static str,
}

impl TextBlob {
    pub const PLAIN: &'static str = "txt";
    pub const JSON: &'static str = "json";

    pub fn new(name: Option<String>, text: String, format: &'static str) -> Self {
        Self { name, text, format }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn format(&self) -> &'static str {
        self.format
    }
}

/// Bytes that passed the magic-signature check. Nothing else is known about them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericContainer {
    name: Option<String>,
    data: Vec<u8>,
}

impl GenericContainer {
    /// Wraps the blob when it sniffs as a container, otherwise hands it back.
    pub fn from_blob(blob: RawBlob) -> Result<Self, RawBlob> {
        match classify(blob.data()) {
            Sniff::Container => {
                let (name, data) = blob.into_parts();
                Ok(Self { name, data })
            }
            _ => Err(blob),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_parts(self) -> (Option<String>, Vec<u8>) {
        (self.name, self.data)
    }
}
