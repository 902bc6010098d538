//! Runs a tool over adapted inputs and collects the results in order.

use tracing::debug;

use crate::core::content::ToolOutput;
use crate::core::error::{DispatchError, ToolError};
use crate::core::tool::{AdaptedInput, DynTool};
use crate::infra::runtime::cancel::CancelSignal;

/// Ordered outputs of one `process` call. Units that produced nothing leave no slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    outputs: Vec<ToolOutput>,
}

impl BatchResult {
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn outputs(&self) -> &[ToolOutput] {
        &self.outputs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ToolOutput> {
        self.outputs.iter()
    }
}

impl From<Vec<ToolOutput>> for BatchResult {
    fn from(outputs: Vec<ToolOutput>) -> Self {
        Self { outputs }
    }
}

impl IntoIterator for BatchResult {
    type Item = ToolOutput;
    type IntoIter = std::vec::IntoIter<ToolOutput>;

    fn into_iter(self) -> Self::IntoIter {
        self.outputs.into_iter()
    }
}

pub async fn invoke_one(
    tool: &dyn DynTool,
    input: AdaptedInput,
    cancel: &CancelSignal,
) -> Result<Option<ToolOutput>, DispatchError> {
    cancel.check()?;
    let unit = input.name().map(str::to_owned);
    let output = tool.invoke(input, cancel).await.map_err(|e| match e {
        ToolError::Cancelled => DispatchError::Cancelled,
        source => DispatchError::Tool {
            tool: tool.key(),
            source,
        },
    })?;
    if output.is_none() {
        debug!(
            tool = tool.key(),
            unit = unit.as_deref().unwrap_or("<unnamed>"),
            "tool produced no output"
        );
    }
    Ok(output)
}

/// Invokes `tool` once per input. The first failure aborts and drops the partial result.
pub async fn invoke_all<I>(
    tool: &dyn DynTool,
    inputs: I,
    cancel: &CancelSignal,
) -> Result<BatchResult, DispatchError>
where
    I: IntoIterator<Item = AdaptedInput>,
{
    let mut outputs = Vec::new();
    for input in inputs {
        if let Some(output) = invoke_one(tool, input, cancel).await? {
            outputs.push(output);
        }
    }
    Ok(BatchResult { outputs })
}
