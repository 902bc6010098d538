//! Capability-driven dispatch: pick a pipeline from the tool's declared input,
//! adapt the blob (expanding archives when needed) and collect the outputs.

pub mod adapter;
pub mod archive;
pub mod invoker;
pub mod pipeline;
pub mod sniff;

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::clients::gbx_parser::{ContainerParser, GbxParser};
use crate::core::data::RawBlob;
use crate::core::error::DispatchError;
use crate::core::tool::DynTool;
use crate::infra::logging::log_metric;
use crate::infra::runtime::cancel::CancelSignal;
use crate::tools::registry::ToolRegistry;

use adapter::{adapt_unit, Outcome};
use archive::{walk_archive, ArchiveLimits};
use invoker::{invoke_all, invoke_one};
use pipeline::{select_pipeline, PipelineKind};

pub use invoker::BatchResult;

#[derive(Clone)]
pub struct Dispatcher {
    registry: ToolRegistry,
    parser: Arc<dyn ContainerParser>,
    limits: ArchiveLimits,
}

impl Dispatcher {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry,
            parser: Arc::new(GbxParser),
            limits: ArchiveLimits::default(),
        }
    }

    pub fn with_parser(mut self, parser: Arc<dyn ContainerParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_limits(mut self, limits: ArchiveLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Runs the tool registered under `tool_key` over `blob`.
    ///
    /// An unknown key or an input with nothing usable yields an empty result.
    /// Parser-fatal errors, tool failures and cancellation abort the batch.
    pub async fn process(
        &self,
        tool_key: &str,
        blob: RawBlob,
        cancel: &CancelSignal,
    ) -> Result<BatchResult, DispatchError> {
        let Some(tool) = self.registry.instantiate(tool_key) else {
            warn!(tool = tool_key, "tool not found");
            return Ok(BatchResult::default());
        };
        let pipeline = select_pipeline(tool.capability());
        debug!(
            tool = tool_key,
            ?pipeline,
            unit = blob.name().unwrap_or("<unnamed>"),
            bytes = blob.len(),
            "dispatching"
        );

        let start = Instant::now();
        let result = self.run(tool.as_ref(), pipeline, blob, cancel).await;
        if let Ok(batch) = &result {
            log_metric(tool_key, "outputs", batch.len() as f64);
            log_metric(
                tool_key,
                "latency_ms",
                start.elapsed().as_secs_f64() * 1000.0,
            );
        }
        result
    }

    async fn run(
        &self,
        tool: &dyn DynTool,
        pipeline: PipelineKind,
        blob: RawBlob,
        cancel: &CancelSignal,
    ) -> Result<BatchResult, DispatchError> {
        cancel.check()?;
        let parser = self.parser.as_ref();
        match adapt_unit(parser, pipeline.strategies(), blob).await? {
            Outcome::Adapted(input) => invoke_all(tool, [input], cancel).await,
            Outcome::NoMatch => Ok(BatchResult::default()),
            Outcome::Expand(archive) => {
                let strategies = pipeline.entry_strategies();
                let outputs = walk_archive(archive.data(), self.limits, cancel, |entry| async move {
                    match adapt_unit(parser, strategies, entry.into_blob()).await? {
                        Outcome::Adapted(input) => invoke_one(tool, input, cancel).await,
                        Outcome::Expand(_) | Outcome::NoMatch => Ok(None),
                    }
                })
                .await?;
                Ok(BatchResult::from(outputs))
            }
        }
    }
}
