use async_trait::async_trait;
use serde::Serialize;

use crate::core::content::ToolOutput;
use crate::core::data::{GenericContainer, RawBlob, TextBlob};
use crate::core::error::ToolError;
use crate::domain::{Gbx, Schema, SchemaKind, Typed};
use crate::infra::runtime::cancel::CancelSignal;

/// Minimal metadata every tool must expose.
pub trait ToolSpec {
    /// Stable registry key, e.g. `gbx-to-json`.
    fn key(&self) -> &'static str;
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
}

/// Input shape a tool declares. Fixed per tool type, known before any byte is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Capability {
    RawBytes,
    Text,
    GenericContainer,
    TypedContainer { schema: Schema, header_only: bool },
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::RawBytes => f.write_str("raw-bytes"),
            Capability::Text => f.write_str("text"),
            Capability::GenericContainer => f.write_str("generic-container"),
            Capability::TypedContainer {
                schema,
                header_only: true,
            } => write!(f, "typed-container<{schema}> (header only)"),
            Capability::TypedContainer { schema, .. } => write!(f, "typed-container<{schema}>"),
        }
    }
}

/// A blob after adaptation, ready to be handed to a tool.
#[derive(Debug)]
pub enum AdaptedInput {
    Raw(RawBlob),
    Text(TextBlob),
    Generic(GenericContainer),
    Typed(Gbx),
}

impl AdaptedInput {
    pub fn name(&self) -> Option<&str> {
        match self {
            AdaptedInput::Raw(blob) => blob.name(),
            AdaptedInput::Text(text) => text.name(),
            AdaptedInput::Generic(container) => container.name(),
            AdaptedInput::Typed(gbx) => gbx.path(),
        }
    }
}

/// Types a tool can take as input. Ties the static capability to the value shape.
pub trait ToolInput: Sized + Send + 'static {
    fn capability(header_only: bool) -> Capability;

    /// Returns the input back when it is not of this shape.
    fn from_adapted(input: AdaptedInput) -> Result<Self, AdaptedInput>;
}

impl ToolInput for RawBlob {
    fn capability(_: bool) -> Capability {
        Capability::RawBytes
    }

    fn from_adapted(input: AdaptedInput) -> Result<Self, AdaptedInput> {
        match input {
            AdaptedInput::Raw(blob) => Ok(blob),
            other => Err(other),
        }
    }
}

impl ToolInput for TextBlob {
    fn capability(_: bool) -> Capability {
        Capability::Text
    }

    fn from_adapted(input: AdaptedInput) -> Result<Self, AdaptedInput> {
        match input {
            AdaptedInput::Text(text) => Ok(text),
            other => Err(other),
        }
    }
}

impl ToolInput for GenericContainer {
    fn capability(_: bool) -> Capability {
        Capability::GenericContainer
    }

    fn from_adapted(input: AdaptedInput) -> Result<Self, AdaptedInput> {
        match input {
            AdaptedInput::Generic(container) => Ok(container),
            other => Err(other),
        }
    }
}

impl ToolInput for Gbx {
    fn capability(header_only: bool) -> Capability {
        Capability::TypedContainer {
            schema: Schema::Any,
            header_only,
        }
    }

    fn from_adapted(input: AdaptedInput) -> Result<Self, AdaptedInput> {
        match input {
            AdaptedInput::Typed(gbx) => Ok(gbx),
            other => Err(other),
        }
    }
}

impl<S: SchemaKind> ToolInput for Typed<S> {
    fn capability(header_only: bool) -> Capability {
        Capability::TypedContainer {
            schema: S::SCHEMA,
            header_only,
        }
    }

    fn from_adapted(input: AdaptedInput) -> Result<Self, AdaptedInput> {
        match input {
            AdaptedInput::Typed(gbx) => Typed::try_from_gbx(gbx).map_err(AdaptedInput::Typed),
            other => Err(other),
        }
    }
}

/// A processing tool. The capability is derived from `Input` and `HEADER_ONLY`.
///
/// `process` takes `&self`: a tool keeps no state between units, every result
/// is returned by value.
#[async_trait]
pub trait IoTool: ToolSpec + Send + Sync {
    type Input: ToolInput;

    /// Only header metadata is needed; the parser may skip the body.
    const HEADER_ONLY: bool = false;

    async fn process(
        &self,
        input: Self::Input,
        cancel: &CancelSignal,
    ) -> Result<Option<ToolOutput>, ToolError>;
}

/// Object-safe view of an [`IoTool`], as stored in the registry.
#[async_trait]
pub trait DynTool: ToolSpec + Send + Sync {
    fn capability(&self) -> Capability;

    async fn invoke(
        &self,
        input: AdaptedInput,
        cancel: &CancelSignal,
    ) -> Result<Option<ToolOutput>, ToolError>;
}

#[async_trait]
impl<T> DynTool for T
where
    T: IoTool + 'static,
{
    fn capability(&self) -> Capability {
        T::Input::capability(T::HEADER_ONLY)
    }

    async fn invoke(
        &self,
        input: AdaptedInput,
        cancel: &CancelSignal,
    ) -> Result<Option<ToolOutput>, ToolError> {
        match T::Input::from_adapted(input) {
            Ok(input) => self.process(input, cancel).await,
            Err(rejected) => {
                tracing::warn!(
                    tool = self.key(),
                    unit = rejected.name().unwrap_or("<unnamed>"),
                    "input does not match tool capability, skipped"
                );
                Ok(None)
            }
        }
    }
}
