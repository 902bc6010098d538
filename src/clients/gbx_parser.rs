//! Container parser boundary and the built-in binary GBX reader.
//!
//! The reader understands the envelope (header, user-data chunks, reference
//! table, body framing). Body payloads are kept as stored; decompression and
//! node-level parsing belong to downstream codecs.

use async_trait::async_trait;

use crate::core::error::ParseError;
use crate::domain::reader::ByteReader;
use crate::domain::{
    ClassId, Compression, ExternalFile, ExternalNode, Gbx, GbxBody, GbxHeader, HeaderChunk,
    RefFolder, RefTable, GBX_MAGIC,
};

const MAX_FOLDER_DEPTH: usize = 32;
const HEAVY_CHUNK_FLAG: u32 = 0x8000_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Stop after the header; body and reference table stay unset.
    HeaderOnly,
    Full,
}

impl ParseMode {
    pub fn from_header_only(header_only: bool) -> Self {
        if header_only {
            ParseMode::HeaderOnly
        } else {
            ParseMode::Full
        }
    }
}

/// Replaceable parser boundary.
///
/// `Ok(None)` means the bytes are not a container at all. `Err` is reserved
/// for bytes that carry the signature but cannot be read.
#[async_trait]
pub trait ContainerParser: Send + Sync {
    async fn parse(
        &self,
        path: Option<&str>,
        bytes: &[u8],
        mode: ParseMode,
    ) -> Result<Option<Gbx>, ParseError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GbxParser;

#[async_trait]
impl ContainerParser for GbxParser {
    async fn parse(
        &self,
        path: Option<&str>,
        bytes: &[u8],
        mode: ParseMode,
    ) -> Result<Option<Gbx>, ParseError> {
        if bytes.len() < GBX_MAGIC.len() || bytes[..GBX_MAGIC.len()] != GBX_MAGIC {
            return Ok(None);
        }
        let result = read_gbx(bytes, mode).map(|(header, refs, body)| {
            Gbx::new(path.map(str::to_owned), header, refs, body)
        });
        if let Err(e) = &result {
            tracing::error!(path = path.unwrap_or("<unnamed>"), error = %e, "failed to parse Gbx file");
        }
        result.map(Some)
    }
}

type Parsed = (GbxHeader, Option<RefTable>, Option<GbxBody>);

fn read_gbx(bytes: &[u8], mode: ParseMode) -> Result<Parsed, ParseError> {
    let mut r = ByteReader::new(bytes);
    r.bytes(GBX_MAGIC.len(), "magic")?;

    let version = r.u16("version")?;
    if !(3..=6).contains(&version) {
        return Err(ParseError::UnsupportedVersion(version));
    }
    match r.u8("format")? {
        b'B' => {}
        b'T' => return Err(ParseError::TextFormat),
        value => {
            return Err(ParseError::InvalidFlag {
                what: "format",
                value,
            })
        }
    }
    let ref_table_compression = compression(r.u8("ref table compression")?, "ref table compression")?;
    let body_compression = compression(r.u8("body compression")?, "body compression")?;
    let unknown_byte = if version >= 4 {
        Some(r.u8("unknown byte")?)
    } else {
        None
    };
    let class_id = ClassId(r.u32("class id")?).remap();
    let chunks = if version >= 6 {
        read_user_data(&mut r)?
    } else {
        Vec::new()
    };
    let node_count = r.u32("node count")?;

    let header = GbxHeader {
        version,
        ref_table_compression,
        body_compression,
        unknown_byte,
        class_id,
        chunks,
        node_count,
    };
    if mode == ParseMode::HeaderOnly {
        return Ok((header, None, None));
    }

    if ref_table_compression == Compression::Compressed {
        return Err(ParseError::CompressedRefTable);
    }
    let refs = read_ref_table(&mut r, version)?;
    let body = read_body(&mut r, body_compression)?;
    Ok((header, Some(refs), Some(body)))
}

fn compression(value: u8, what: &'static str) -> Result<Compression, ParseError> {
    match value {
        b'U' => Ok(Compression::Uncompressed),
        b'C' => Ok(Compression::Compressed),
        value => Err(ParseError::InvalidFlag { what, value }),
    }
}

fn read_user_data(r: &mut ByteReader<'_>) -> Result<Vec<HeaderChunk>, ParseError> {
    let declared = r.len_prefix(1, "user data size")?;
    if declared == 0 {
        return Ok(Vec::new());
    }

    let count = r.len_prefix(8, "header chunk count")?;
    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        let id = r.u32("header chunk id")?;
        let raw = r.u32("header chunk size")?;
        entries.push((id, raw & !HEAVY_CHUNK_FLAG, raw & HEAVY_CHUNK_FLAG != 0));
    }

    let actual = 4 + 8 * count as u64 + entries.iter().map(|(_, size, _)| u64::from(*size)).sum::<u64>();
    if actual != declared as u64 {
        return Err(ParseError::UserDataMismatch {
            declared: declared as u32,
            actual,
        });
    }

    entries
        .into_iter()
        .map(|(id, size, heavy)| -> Result<HeaderChunk, ParseError> {
            let data = r.bytes(size as usize, "header chunk data")?.to_vec();
            Ok(HeaderChunk { id, heavy, data })
        })
        .collect()
}

fn read_ref_table(r: &mut ByteReader<'_>, version: u16) -> Result<RefTable, ParseError> {
    let count = r.len_prefix(8, "external node count")?;
    if count == 0 {
        return Ok(RefTable::default());
    }

    let ancestor_level = r.u32("ancestor level")?;
    let folders = read_folders(r, 0)?;
    let mut nodes = Vec::with_capacity(count);
    for _ in 0..count {
        let flags = r.u32("external node flags")?;
        let by_name = flags & 4 == 0;
        let file = if by_name {
            ExternalFile::Name(r.string("external file name")?)
        } else {
            ExternalFile::Resource(r.u32("external resource index")?)
        };
        let node_index = r.u32("external node index")?;
        let use_file = if version >= 5 {
            Some(r.u32("external use file")? != 0)
        } else {
            None
        };
        let folder_index = if by_name {
            Some(r.u32("external folder index")?)
        } else {
            None
        };
        nodes.push(ExternalNode {
            flags,
            file,
            node_index,
            use_file,
            folder_index,
        });
    }

    Ok(RefTable {
        ancestor_level,
        folders,
        nodes,
    })
}

fn read_folders(r: &mut ByteReader<'_>, depth: usize) -> Result<Vec<RefFolder>, ParseError> {
    if depth > MAX_FOLDER_DEPTH {
        return Err(ParseError::FolderTooDeep(MAX_FOLDER_DEPTH));
    }
    let count = r.len_prefix(8, "sub folder count")?;
    let mut folders = Vec::with_capacity(count);
    for _ in 0..count {
        let name = r.string("folder name")?;
        let children = read_folders(r, depth + 1)?;
        folders.push(RefFolder { name, children });
    }
    Ok(folders)
}

fn read_body(r: &mut ByteReader<'_>, compression: Compression) -> Result<GbxBody, ParseError> {
    match compression {
        Compression::Compressed => {
            let uncompressed_len = r.u32("uncompressed body size")?;
            let len = r.len_prefix(1, "compressed body size")?;
            let data = r.bytes(len, "compressed body")?.to_vec();
            Ok(GbxBody {
                compression,
                uncompressed_len: Some(uncompressed_len),
                data,
            })
        }
        Compression::Uncompressed => Ok(GbxBody {
            compression,
            uncompressed_len: None,
            data: r.rest().to_vec(),
        }),
    }
}
