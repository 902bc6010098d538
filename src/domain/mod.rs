//! GBX container model produced by the parser boundary.

use std::marker::PhantomData;

use serde::Serialize;

pub mod map;
pub(crate) mod reader;

pub use map::Thumbnail;

/// Leading bytes of every GBX file. The fourth byte (low byte of the version) is not checked.
pub const GBX_MAGIC: [u8; 3] = *b"GBX";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ClassId(pub u32);

impl ClassId {
    pub const MAP: ClassId = ClassId(0x0304_3000);
    pub const REPLAY: ClassId = ClassId(0x0309_3000);
    pub const GHOST: ClassId = ClassId(0x0309_2000);
    pub const MEDIA_CLIP: ClassId = ClassId(0x0307_9000);

    /// Maps legacy engine ids onto their current counterparts.
    pub fn remap(self) -> ClassId {
        match self.0 {
            0x2400_3000 => ClassId::MAP,
            0x2403_F000 => ClassId::REPLAY,
            _ => self,
        }
    }

    pub fn name(self) -> Option<&'static str> {
        match self {
            ClassId::MAP => Some("CGameCtnChallenge"),
            ClassId::REPLAY => Some("CGameCtnReplayRecord"),
            ClassId::GHOST => Some("CGameCtnGhost"),
            ClassId::MEDIA_CLIP => Some("CGameCtnMediaClip"),
            _ => None,
        }
    }
}

impl std::fmt::Display for ClassId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

/// The closed set of schema variants a typed tool can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Schema {
    Any,
    Map,
    Replay,
    Ghost,
    MediaClip,
}

impl Schema {
    pub fn of(class: ClassId) -> Option<Schema> {
        match class {
            ClassId::MAP => Some(Schema::Map),
            ClassId::REPLAY => Some(Schema::Replay),
            ClassId::GHOST => Some(Schema::Ghost),
            ClassId::MEDIA_CLIP => Some(Schema::MediaClip),
            _ => None,
        }
    }

    pub fn accepts(self, class: ClassId) -> bool {
        self == Schema::Any || Schema::of(class) == Some(self)
    }
}

impl std::fmt::Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Schema::Any => "any",
            Schema::Map => "map",
            Schema::Replay => "replay",
            Schema::Ghost => "ghost",
            Schema::MediaClip => "media-clip",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    Uncompressed,
    Compressed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderChunk {
    pub id: u32,
    pub heavy: bool,
    #[serde(skip)]
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GbxHeader {
    pub version: u16,
    pub ref_table_compression: Compression,
    pub body_compression: Compression,
    /// `R` or `E` on version 4 and later.
    pub unknown_byte: Option<u8>,
    pub class_id: ClassId,
    pub chunks: Vec<HeaderChunk>,
    pub node_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefFolder {
    pub name: String,
    pub children: Vec<RefFolder>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExternalFile {
    Name(String),
    Resource(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalNode {
    pub flags: u32,
    pub file: ExternalFile,
    pub node_index: u32,
    pub use_file: Option<bool>,
    pub folder_index: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefTable {
    pub ancestor_level: u32,
    pub folders: Vec<RefFolder>,
    pub nodes: Vec<ExternalNode>,
}

/// Body bytes as stored. Decompression is left to downstream codecs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GbxBody {
    pub compression: Compression,
    pub uncompressed_len: Option<u32>,
    pub data: Vec<u8>,
}

/// A parsed container. `refs` and `body` stay `None` after a header-only parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gbx {
    path: Option<String>,
    header: GbxHeader,
    refs: Option<RefTable>,
    body: Option<GbxBody>,
}

impl Gbx {
    pub fn new(
        path: Option<String>,
        header: GbxHeader,
        refs: Option<RefTable>,
        body: Option<GbxBody>,
    ) -> Self {
        Self {
            path,
            header,
            refs,
            body,
        }
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn header(&self) -> &GbxHeader {
        &self.header
    }

    pub fn refs(&self) -> Option<&RefTable> {
        self.refs.as_ref()
    }

    pub fn body(&self) -> Option<&GbxBody> {
        self.body.as_ref()
    }

    pub fn class_id(&self) -> ClassId {
        self.header.class_id
    }

    pub fn schema(&self) -> Option<Schema> {
        Schema::of(self.header.class_id)
    }

    pub fn is_header_only(&self) -> bool {
        self.body.is_none()
    }

    pub fn header_chunk(&self, id: u32) -> Option<&HeaderChunk> {
        self.header.chunks.iter().find(|c| c.id == id)
    }
}

/// Compile-time schema marker for [`Typed`].
pub trait SchemaKind: Send + 'static {
    const SCHEMA: Schema;
}

#[derive(Debug)]
pub struct Map;
#[derive(Debug)]
pub struct Replay;
#[derive(Debug)]
pub struct Ghost;
#[derive(Debug)]
pub struct MediaClip;

impl SchemaKind for Map {
    const SCHEMA: Schema = Schema::Map;
}
impl SchemaKind for Replay {
    const SCHEMA: Schema = Schema::Replay;
}
impl SchemaKind for Ghost {
    const SCHEMA: Schema = Schema::Ghost;
}
impl SchemaKind for MediaClip {
    const SCHEMA: Schema = Schema::MediaClip;
}

/// A container whose class is known to match `S`.
#[derive(Debug)]
pub struct Typed<S> {
    gbx: Gbx,
    _schema: PhantomData<fn() -> S>,
}

impl<S: SchemaKind> Typed<S> {
    pub fn try_from_gbx(gbx: Gbx) -> Result<Self, Gbx> {
        if S::SCHEMA.accepts(gbx.class_id()) {
            Ok(Self {
                gbx,
                _schema: PhantomData,
            })
        } else {
            Err(gbx)
        }
    }
}

impl<S> std::ops::Deref for Typed<S> {
    type Target = Gbx;

    fn deref(&self) -> &Gbx {
        &self.gbx
    }
}
