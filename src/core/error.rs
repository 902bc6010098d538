use thiserror::Error;

/// Signature-matching bytes that the container parser could not read.
///
/// Unlike a signature mismatch, these are never recovered from.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected end of data while reading {what} at offset {offset}")]
    Truncated { what: &'static str, offset: usize },
    #[error("unsupported GBX version {0}")]
    UnsupportedVersion(u16),
    #[error("text-format GBX is not supported")]
    TextFormat,
    #[error("compressed reference tables are not supported")]
    CompressedRefTable,
    #[error("reference table folders nest deeper than {0} levels")]
    FolderTooDeep(usize),
    #[error("invalid {what} byte {value:#04x}")]
    InvalidFlag { what: &'static str, value: u8 },
    #[error("{what} declares {declared} bytes but only {remaining} remain")]
    LengthOutOfRange {
        what: &'static str,
        declared: u64,
        remaining: usize,
    },
    #[error("header chunk sizes add up to {actual} bytes, user data declares {declared}")]
    UserDataMismatch { declared: u32, actual: u64 },
    #[error("unexpected bytes for {what} at offset {offset}")]
    UnexpectedBytes { what: &'static str, offset: usize },
    #[error("invalid UTF-8 in {0}")]
    InvalidString(&'static str),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("cancelled")]
    Cancelled,
}

/// Hard failure of a whole batch. Recoverable conditions never surface here.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to parse {}: {source}", .path.as_deref().unwrap_or("<unnamed>"))]
    Parse {
        path: Option<String>,
        #[source]
        source: ParseError,
    },
    #[error("tool {tool} failed: {source}")]
    Tool {
        tool: &'static str,
        #[source]
        source: ToolError,
    },
    #[error("batch cancelled")]
    Cancelled,
}

impl From<crate::infra::runtime::cancel::Cancelled> for DispatchError {
    fn from(_: crate::infra::runtime::cancel::Cancelled) -> Self {
        DispatchError::Cancelled
    }
}
