use async_trait::async_trait;

use crate::core::content::ToolOutput;
use crate::core::data::{GenericContainer, RawBlob};
use crate::core::error::ToolError;
use crate::core::tool::{IoTool, ToolSpec};
use crate::infra::runtime::cancel::CancelSignal;
use crate::tools::file_name;

/// Copies every container out as-is. Mostly useful on archives.
#[derive(Clone, Default)]
pub struct ExtractGbxTool;

impl ToolSpec for ExtractGbxTool {
    fn key(&self) -> &'static str {
        "extract-gbx"
    }
    fn name(&self) -> &'static str {
        "Extract Gbx"
    }
    fn description(&self) -> &'static str {
        "Extract Gbx files, unchanged, from a file or a zip archive"
    }
}

#[async_trait]
impl IoTool for ExtractGbxTool {
    type Input = GenericContainer;

    async fn process(
        &self,
        input: GenericContainer,
        _cancel: &CancelSignal,
    ) -> Result<Option<ToolOutput>, ToolError> {
        let name = file_name(input.name()).unwrap_or("extracted.Gbx").to_owned();
        let (_, data) = input.into_parts();
        Ok(Some(RawBlob::named(name, data).into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn keeps_bytes_and_flattens_name() {
        let container =
            GenericContainer::from_blob(RawBlob::named("maps/a.Map.Gbx", b"GBX\x06x".to_vec()))
                .unwrap();
        let out = ExtractGbxTool
            .process(container, &CancelSignal::never())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(out.name(), Some("a.Map.Gbx"));
        assert_eq!(out.bytes(), b"GBX\x06x");
    }
}
