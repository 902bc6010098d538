use async_trait::async_trait;
use serde::Serialize;

use crate::core::content::ToolOutput;
use crate::core::data::TextBlob;
use crate::core::error::ToolError;
use crate::core::tool::{IoTool, ToolSpec};
use crate::domain::{Compression, Gbx, RefTable, Schema};
use crate::infra::runtime::cancel::CancelSignal;
use crate::tools::file_name;

/// Serializes a parsed container to JSON. With `H` set the parser skips
/// the reference table and body, so they are absent from the output.
#[derive(Clone, Default)]
pub struct GbxJsonTool<const H: bool> {
    pretty: bool,
}

pub type GbxToJsonTool = GbxJsonTool<false>;
pub type GbxHeaderToJsonTool = GbxJsonTool<true>;

impl<const H: bool> GbxJsonTool<H> {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

#[derive(Serialize)]
struct GbxJson<'a> {
    path: Option<&'a str>,
    class_id: String,
    class_name: Option<&'static str>,
    schema: Option<Schema>,
    version: u16,
    ref_table_compression: Compression,
    body_compression: Compression,
    node_count: u32,
    header_chunks: Vec<ChunkJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refs: Option<&'a RefTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<BodyJson>,
}

#[derive(Serialize)]
struct ChunkJson {
    id: String,
    size: usize,
    heavy: bool,
}

#[derive(Serialize)]
struct BodyJson {
    compression: Compression,
    uncompressed_len: Option<u32>,
    stored_len: usize,
}

impl<'a> From<&'a Gbx> for GbxJson<'a> {
    fn from(gbx: &'a Gbx) -> Self {
        let header = gbx.header();
        GbxJson {
            path: gbx.path(),
            class_id: format!("0x{}", header.class_id),
            class_name: header.class_id.name(),
            schema: gbx.schema(),
            version: header.version,
            ref_table_compression: header.ref_table_compression,
            body_compression: header.body_compression,
            node_count: header.node_count,
            header_chunks: header
                .chunks
                .iter()
                .map(|c| ChunkJson {
                    id: format!("0x{:08X}", c.id),
                    size: c.data.len(),
                    heavy: c.heavy,
                })
                .collect(),
            refs: gbx.refs(),
            body: gbx.body().map(|b| BodyJson {
                compression: b.compression,
                uncompressed_len: b.uncompressed_len,
                stored_len: b.data.len(),
            }),
        }
    }
}

impl<const H: bool> ToolSpec for GbxJsonTool<H> {
    fn key(&self) -> &'static str {
        if H {
            "gbx-header-to-json"
        } else {
            "gbx-to-json"
        }
    }
    fn name(&self) -> &'static str {
        if H {
            "Gbx header to JSON"
        } else {
            "Gbx to JSON"
        }
    }
    fn description(&self) -> &'static str {
        if H {
            "Describe the header of every Gbx file as JSON"
        } else {
            "Describe header, references and body framing of every Gbx file as JSON"
        }
    }
}

#[async_trait]
impl<const H: bool> IoTool for GbxJsonTool<H> {
    type Input = Gbx;
    const HEADER_ONLY: bool = H;

    async fn process(
        &self,
        input: Gbx,
        cancel: &CancelSignal,
    ) -> Result<Option<ToolOutput>, ToolError> {
        cancel.check().map_err(|_| ToolError::Cancelled)?;
        let view = GbxJson::from(&input);
        let json = if self.pretty {
            serde_json::to_string_pretty(&view)?
        } else {
            serde_json::to_string(&view)?
        };
        let out_name = format!("{}.json", file_name(input.path()).unwrap_or("container.Gbx"));
        Ok(Some(TextBlob::new(Some(out_name), json, TextBlob::JSON).into()))
    }
}
