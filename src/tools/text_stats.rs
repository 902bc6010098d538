use async_trait::async_trait;
use serde::Serialize;

use crate::core::content::ToolOutput;
use crate::core::data::TextBlob;
use crate::core::error::ToolError;
use crate::core::tool::{IoTool, ToolSpec};
use crate::infra::runtime::cancel::CancelSignal;
use crate::tools::file_name;

#[derive(Clone, Default)]
pub struct TextStatsTool;

#[derive(Debug, Serialize, PartialEq, Eq)]
struct TextStats {
    lines: usize,
    words: usize,
    chars: usize,
}

impl ToolSpec for TextStatsTool {
    fn key(&self) -> &'static str {
        "text-stats"
    }
    fn name(&self) -> &'static str {
        "Text statistics"
    }
    fn description(&self) -> &'static str {
        "Count lines, words and characters of a text file"
    }
}

#[async_trait]
impl IoTool for TextStatsTool {
    type Input = TextBlob;

    async fn process(
        &self,
        input: TextBlob,
        _cancel: &CancelSignal,
    ) -> Result<Option<ToolOutput>, ToolError> {
        let text = input.text();
        if text.trim().is_empty() {
            return Ok(None);
        }
        let stats = TextStats {
            lines: text.lines().count(),
            words: text.split_whitespace().count(),
            chars: text.chars().count(),
        };
        let out_name = format!("{}.stats.json", file_name(input.name()).unwrap_or("text"));
        let json = serde_json::to_string(&stats)?;
        Ok(Some(TextBlob::new(Some(out_name), json, TextBlob::JSON).into()))
    }
}
