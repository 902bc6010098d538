//! Fixture builders shared by unit tests.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;

use crate::domain::ClassId;

/// Builds binary GBX bytes (version 6 by default) with an uncompressed reference table.
pub struct GbxBuilder {
    version: u16,
    class_id: ClassId,
    chunks: Vec<(u32, bool, Vec<u8>)>,
    refs: Vec<u8>,
    body: Vec<u8>,
    compressed_body: Option<u32>,
}

impl GbxBuilder {
    pub fn new(class_id: ClassId) -> Self {
        Self {
            version: 6,
            class_id,
            chunks: Vec::new(),
            refs: 0u32.to_le_bytes().to_vec(),
            body: b"body".to_vec(),
            compressed_body: None,
        }
    }

    pub fn version(mut self, version: u16) -> Self {
        self.version = version;
        self
    }

    pub fn chunk(mut self, id: u32, data: Vec<u8>) -> Self {
        self.chunks.push((id, false, data));
        self
    }

    pub fn heavy_chunk(mut self, id: u32, data: Vec<u8>) -> Self {
        self.chunks.push((id, true, data));
        self
    }

    /// Raw reference-table bytes, starting with the external node count.
    pub fn refs(mut self, raw: Vec<u8>) -> Self {
        self.refs = raw;
        self
    }

    pub fn body(mut self, body: &[u8]) -> Self {
        self.body = body.to_vec();
        self
    }

    pub fn compressed_body(mut self, uncompressed_len: u32, payload: &[u8]) -> Self {
        self.compressed_body = Some(uncompressed_len);
        self.body = payload.to_vec();
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = b"GBX".to_vec();
        out.extend_from_slice(&self.version.to_le_bytes());
        if self.version >= 3 {
            out.push(b'B');
            out.push(b'U');
            out.push(if self.compressed_body.is_some() { b'C' } else { b'U' });
        }
        if self.version >= 4 {
            out.push(b'R');
        }
        out.extend_from_slice(&self.class_id.0.to_le_bytes());
        if self.version >= 6 {
            if self.chunks.is_empty() {
                out.extend_from_slice(&0u32.to_le_bytes());
            } else {
                let payload: usize = self.chunks.iter().map(|(_, _, d)| d.len()).sum();
                let size = 4 + 8 * self.chunks.len() + payload;
                out.extend_from_slice(&(size as u32).to_le_bytes());
                out.extend_from_slice(&(self.chunks.len() as u32).to_le_bytes());
                for (id, heavy, data) in &self.chunks {
                    out.extend_from_slice(&id.to_le_bytes());
                    let flag = if *heavy { 0x8000_0000 } else { 0 };
                    out.extend_from_slice(&(data.len() as u32 | flag).to_le_bytes());
                }
                for (_, _, data) in &self.chunks {
                    out.extend_from_slice(data);
                }
            }
        }
        out.extend_from_slice(&1u32.to_le_bytes());
        out.extend_from_slice(&self.refs);
        if let Some(uncompressed_len) = self.compressed_body {
            out.extend_from_slice(&uncompressed_len.to_le_bytes());
            out.extend_from_slice(&(self.body.len() as u32).to_le_bytes());
        }
        out.extend_from_slice(&self.body);
        out
    }
}

pub fn thumbnail_chunk(jpeg: &[u8], comments: &str) -> Vec<u8> {
    let mut out = 1u32.to_le_bytes().to_vec();
    out.extend_from_slice(&(jpeg.len() as u32).to_le_bytes());
    out.extend_from_slice(b"<Thumbnail.jpg>");
    out.extend_from_slice(jpeg);
    out.extend_from_slice(b"</Thumbnail.jpg>");
    out.extend_from_slice(b"<Comments>");
    out.extend_from_slice(&(comments.len() as u32).to_le_bytes());
    out.extend_from_slice(comments.as_bytes());
    out.extend_from_slice(b"</Comments>");
    out
}

/// Zip archive with the given entries, in order. Names ending in `/` become directories.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut w = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        if name.ends_with('/') {
            w.add_directory(*name, SimpleFileOptions::default()).unwrap();
        } else {
            w.start_file(*name, SimpleFileOptions::default()).unwrap();
            w.write_all(data).unwrap();
        }
    }
    w.finish().unwrap().into_inner()
}
