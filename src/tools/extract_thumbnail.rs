use async_trait::async_trait;

use crate::core::content::ToolOutput;
use crate::core::data::RawBlob;
use crate::core::error::ToolError;
use crate::core::tool::{IoTool, ToolSpec};
use crate::domain::{Map, Typed};
use crate::infra::runtime::cancel::CancelSignal;
use crate::tools::gbx_stem;

/// Pulls the embedded JPEG out of a map header. Maps without one produce nothing.
#[derive(Clone, Default)]
pub struct ExtractThumbnailTool;

impl ToolSpec for ExtractThumbnailTool {
    fn key(&self) -> &'static str {
        "extract-thumbnail"
    }
    fn name(&self) -> &'static str {
        "Extract thumbnail"
    }
    fn description(&self) -> &'static str {
        "Extract the JPEG thumbnail embedded in map files"
    }
}

#[async_trait]
impl IoTool for ExtractThumbnailTool {
    type Input = Typed<Map>;
    const HEADER_ONLY: bool = true;

    async fn process(
        &self,
        input: Typed<Map>,
        _cancel: &CancelSignal,
    ) -> Result<Option<ToolOutput>, ToolError> {
        let Some(thumbnail) = input.thumbnail()? else {
            tracing::debug!(map = input.path().unwrap_or("<unnamed>"), "map has no thumbnail");
            return Ok(None);
        };
        let stem = gbx_stem(input.path()).unwrap_or("thumbnail");
        if !thumbnail.comments.is_empty() {
            tracing::debug!(map = stem, comments = %thumbnail.comments, "map comments");
        }
        Ok(Some(RawBlob::named(format!("{stem}.jpg"), thumbnail.jpeg).into()))
    }
}
