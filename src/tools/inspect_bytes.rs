use async_trait::async_trait;
use std::fmt::Write as _;

use crate::core::content::ToolOutput;
use crate::core::data::{RawBlob, TextBlob};
use crate::core::error::ToolError;
use crate::core::tool::{IoTool, ToolSpec};
use crate::dispatch::sniff::classify;
use crate::infra::runtime::cancel::CancelSignal;
use crate::tools::file_name;

const PREVIEW_LEN: usize = 16;

/// Size, signature class and leading bytes of any input. Archives are not opened.
#[derive(Clone, Default)]
pub struct InspectBytesTool;

impl ToolSpec for InspectBytesTool {
    fn key(&self) -> &'static str {
        "inspect-bytes"
    }
    fn name(&self) -> &'static str {
        "Inspect bytes"
    }
    fn description(&self) -> &'static str {
        "Report size, signature class and leading bytes of any file"
    }
}

#[async_trait]
impl IoTool for InspectBytesTool {
    type Input = RawBlob;

    async fn process(
        &self,
        input: RawBlob,
        _cancel: &CancelSignal,
    ) -> Result<Option<ToolOutput>, ToolError> {
        let name = file_name(input.name());
        let preview = input
            .data()
            .iter()
            .take(PREVIEW_LEN)
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(" ");

        let mut report = String::new();
        let _ = writeln!(report, "name: {}", name.unwrap_or("<unnamed>"));
        let _ = writeln!(report, "size: {} bytes", input.len());
        let _ = writeln!(report, "signature: {}", classify(input.data()));
        let _ = writeln!(report, "leading bytes: {preview}");

        let out_name = format!("{}.inspect.txt", name.unwrap_or("input"));
        Ok(Some(
            TextBlob::new(Some(out_name), report, TextBlob::PLAIN).into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_signature_and_preview() {
        let out = InspectBytesTool
            .process(
                RawBlob::named("dir/a.Map.Gbx", b"GBX\x06\x00".to_vec()),
                &CancelSignal::never(),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(out.name(), Some("a.Map.Gbx.inspect.txt"));
        let text = std::str::from_utf8(out.bytes()).unwrap();
        assert!(text.contains("size: 5 bytes"));
        assert!(text.contains("signature: container"));
        assert!(text.contains("leading bytes: 47 42 58 06 00"));
    }

    #[tokio::test]
    async fn empty_input_still_reports() {
        let out = InspectBytesTool
            .process(RawBlob::new(None, vec![]), &CancelSignal::never())
            .await
            .unwrap()
            .unwrap();
        let text = std::str::from_utf8(out.bytes()).unwrap();
        assert!(text.contains("signature: not-a-container"));
        assert_eq!(out.name(), Some("input.inspect.txt"));
    }
}
