//! Built-in tools.

pub mod extract_gbx;
pub mod extract_thumbnail;
pub mod gbx_to_json;
pub mod inspect_bytes;
pub mod registry;
pub mod text_stats;

pub use extract_gbx::ExtractGbxTool;
pub use extract_thumbnail::ExtractThumbnailTool;
pub use gbx_to_json::{GbxHeaderToJsonTool, GbxJsonTool, GbxToJsonTool};
pub use inspect_bytes::InspectBytesTool;
pub use text_stats::TextStatsTool;

/// Last path segment, if any.
pub(crate) fn file_name(path: Option<&str>) -> Option<&str> {
    path.map(crate::dispatch::archive::file_name)
        .filter(|name| !name.is_empty())
}

/// File name with the `.Gbx` suffix (and the class part before it) removed.
///
/// `maps/A01.Map.Gbx` gives `A01`.
pub(crate) fn gbx_stem(path: Option<&str>) -> Option<&str> {
    let name = file_name(path)?;
    let without_ext = match name.len().checked_sub(4) {
        Some(cut) if name.is_char_boundary(cut) && name[cut..].eq_ignore_ascii_case(".gbx") => {
            &name[..cut]
        }
        _ => name,
    };
    let stem = match without_ext.rfind('.') {
        Some(dot) if dot > 0 && without_ext.len() < name.len() => &without_ext[..dot],
        _ => without_ext,
    };
    Some(stem).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_strips_directories() {
        assert_eq!(file_name(Some("a/b/c.Map.Gbx")), Some("c.Map.Gbx"));
        assert_eq!(file_name(Some("a\\b.txt")), Some("b.txt"));
        assert_eq!(file_name(Some("dir/")), None);
        assert_eq!(file_name(None), None);
    }

    #[test]
    fn gbx_stem_drops_class_and_extension() {
        assert_eq!(gbx_stem(Some("maps/A01.Map.Gbx")), Some("A01"));
        assert_eq!(gbx_stem(Some("old.Challenge.gbx")), Some("old"));
        assert_eq!(gbx_stem(Some("plain.Gbx")), Some("plain"));
        assert_eq!(gbx_stem(Some("notes.txt")), Some("notes.txt"));
        assert_eq!(gbx_stem(Some(".Gbx")), None);
    }
}
