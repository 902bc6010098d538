use serde::Serialize;

use crate::domain::GBX_MAGIC;

/// Shortest buffer that can be classified as a container.
pub const MIN_CONTAINER_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sniff {
    NotAContainer,
    Container,
    /// Not a container by signature; only an archive open can tell more.
    AmbiguousArchive,
}

impl std::fmt::Display for Sniff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Sniff::NotAContainer => "not-a-container",
            Sniff::Container => "container",
            Sniff::AmbiguousArchive => "ambiguous-archive",
        })
    }
}

pub fn has_magic(bytes: &[u8]) -> bool {
    bytes.len() >= MIN_CONTAINER_LEN && bytes[..GBX_MAGIC.len()] == GBX_MAGIC
}

pub fn classify(bytes: &[u8]) -> Sniff {
    if bytes.len() < MIN_CONTAINER_LEN {
        Sniff::NotAContainer
    } else if has_magic(bytes) {
        Sniff::Container
    } else {
        Sniff::AmbiguousArchive
    }
}
