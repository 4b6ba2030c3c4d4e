use chrono::NaiveDateTime;
use exif::{Exif, Field, In, Reader, Tag, Value};
use std::io::Cursor;

const EXIF_DATE_PATTERN: &str = "%Y:%m:%d %H:%M:%S";

/// Fields read from the EXIF block of a JPEG. Every field is independent; a missing or
/// malformed tag only leaves its own slot empty.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedMetadata {
    pub date_time_original: Option<NaiveDateTime>,
    pub date_time: Option<NaiveDateTime>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub thumbnail_jpeg: Option<Vec<u8>>,
}

/// Returns `None` when the bytes carry no parseable EXIF container.
pub fn read_embedded_metadata(bytes: &[u8]) -> Option<EmbeddedMetadata> {
    let mut cursor = Cursor::new(bytes);
    let exif = Reader::new().read_from_container(&mut cursor).ok()?;

    Some(EmbeddedMetadata {
        date_time_original: find_date(&exif, Tag::DateTimeOriginal),
        date_time: find_date(&exif, Tag::DateTime),
        width: find_dimension(&exif, &[Tag::ImageWidth, Tag::PixelXDimension]),
        height: find_dimension(&exif, &[Tag::ImageLength, Tag::PixelYDimension]),
        thumbnail_jpeg: find_thumbnail(&exif),
    })
}

fn find_date(exif: &Exif, tag: Tag) -> Option<NaiveDateTime> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    ascii_value(field).and_then(|raw| parse_exif_date(&raw))
}

/// First tag that resolves to a positive integer wins.
fn find_dimension(exif: &Exif, tags: &[Tag]) -> Option<u32> {
    tags.iter().find_map(|tag| {
        exif.get_field(*tag, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .filter(|v| *v > 0)
    })
}

fn find_thumbnail(exif: &Exif) -> Option<Vec<u8>> {
    let offset = exif
        .get_field(Tag::JPEGInterchangeFormat, In::THUMBNAIL)?
        .value
        .get_uint(0)? as usize;
    let length = exif
        .get_field(Tag::JPEGInterchangeFormatLength, In::THUMBNAIL)?
        .value
        .get_uint(0)? as usize;
    if length == 0 {
        return None;
    }
    let end = offset.checked_add(length)?;
    exif.buf().get(offset..end).map(<[u8]>::to_vec)
}

fn ascii_value(field: &Field) -> Option<String> {
    match field.value {
        Value::Ascii(ref vec) => vec
            .first()
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .map(|s| s.trim_end_matches('\0').trim().to_string())
            .filter(|s| !s.is_empty()),
        _ => None,
    }
}

pub fn parse_exif_date(input: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(input.trim(), EXIF_DATE_PATTERN).ok()
}
