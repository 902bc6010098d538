//! Map-specific views over header chunks.

use crate::core::error::ParseError;
use crate::domain::reader::ByteReader;
use crate::domain::{Map, Typed};

/// Header chunk carrying the thumbnail and the author comments.
pub const THUMBNAIL_CHUNK: u32 = 0x0304_3007;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub jpeg: Vec<u8>,
    pub comments: String,
}

impl Typed<Map> {
    /// `Ok(None)` when the map has no thumbnail chunk or an empty thumbnail.
    pub fn thumbnail(&self) -> Result<Option<Thumbnail>, ParseError> {
        match self.header_chunk(THUMBNAIL_CHUNK) {
            Some(chunk) => read_thumbnail_chunk(&chunk.data),
            None => Ok(None),
        }
    }
}

fn read_thumbnail_chunk(data: &[u8]) -> Result<Option<Thumbnail>, ParseError> {
    let mut r = ByteReader::new(data);
    let version = r.u32("thumbnail chunk version")?;
    if version == 0 {
        return Ok(None);
    }
    let size = r.len_prefix(1, "thumbnail size")?;
    r.expect(b"<Thumbnail.jpg>", "thumbnail open tag")?;
    let jpeg = r.bytes(size, "thumbnail data")?.to_vec();
    r.expect(b"</Thumbnail.jpg>", "thumbnail close tag")?;
    r.expect(b"<Comments>", "comments open tag")?;
    let comments = r.string("comments")?;
    r.expect(b"</Comments>", "comments close tag")?;

    if jpeg.is_empty() {
        return Ok(None);
    }
    Ok(Some(Thumbnail { jpeg, comments }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{thumbnail_chunk, GbxBuilder};
    use crate::clients::gbx_parser::{ContainerParser, GbxParser, ParseMode};
    use crate::domain::ClassId;

    async fn parse_map(bytes: &[u8]) -> Typed<Map> {
        let gbx = GbxParser
            .parse(Some("m.Map.Gbx"), bytes, ParseMode::HeaderOnly)
            .await
            .unwrap()
            .unwrap();
        Typed::try_from_gbx(gbx).unwrap()
    }

    #[tokio::test]
    async fn reads_thumbnail_and_comments() {
        let bytes = GbxBuilder::new(ClassId::MAP)
            .chunk(THUMBNAIL_CHUNK, thumbnail_chunk(b"\xff\xd8jpeg", "gg"))
            .build();
        let thumb = parse_map(&bytes).await.thumbnail().unwrap().unwrap();
        assert_eq!(thumb.jpeg, b"\xff\xd8jpeg");
        assert_eq!(thumb.comments, "gg");
    }

    #[tokio::test]
    async fn missing_chunk_is_not_an_error() {
        let bytes = GbxBuilder::new(ClassId::MAP).build();
        assert!(parse_map(&bytes).await.thumbnail().unwrap().is_none());
    }

    #[test]
    fn version_zero_has_no_thumbnail() {
        assert!(read_thumbnail_chunk(&0u32.to_le_bytes()).unwrap().is_none());
    }

    #[test]
    fn broken_tag_is_reported() {
        let mut data = thumbnail_chunk(b"abc", "");
        data[8] = b'X';
        assert!(matches!(
            read_thumbnail_chunk(&data),
            Err(ParseError::UnexpectedBytes { what: "thumbnail open tag", .. })
        ));
    }
}
