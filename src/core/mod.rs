//! Core types & traits: blob shapes, tool contracts and the error model.

pub mod content;
pub mod data;
pub mod error;
pub mod tool;

pub use content::ToolOutput;
pub use data::{GenericContainer, RawBlob, TextBlob};
pub use error::{DispatchError, ParseError, ToolError};
pub use tool::{Capability, DynTool, IoTool, ToolInput, ToolSpec};
