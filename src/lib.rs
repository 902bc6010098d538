//! Capability-driven dispatch of byte blobs to Gbx processing tools.
//!
//! A tool declares the input shape it wants (raw bytes, text, a container
//! with a valid signature, or a parsed container of a given class). The
//! [`dispatch::Dispatcher`] adapts whatever it is handed to that shape,
//! walking zip archives entry by entry when the blob is not a container
//! itself, and collects the tool outputs in order.

pub mod cli;
pub mod clients;
pub mod core;
pub mod dispatch;
pub mod domain;
pub mod infra;
pub mod tools;

#[cfg(test)]
mod test_support;

pub use crate::core::{DispatchError, RawBlob, ToolOutput};
pub use crate::dispatch::{BatchResult, Dispatcher};
