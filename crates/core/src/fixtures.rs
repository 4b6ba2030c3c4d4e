//! JPEG builders shared by the unit tests.

use exif::experimental::Writer;
use exif::{Field, In, Tag, Value};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct ExifFixture<'a> {
    pub date_time_original: Option<&'a str>,
    pub date_time: Option<&'a str>,
    pub image_width: Option<u32>,
    pub image_length: Option<u32>,
    pub pixel_x: Option<u32>,
    pub pixel_y: Option<u32>,
    pub thumbnail: Option<&'a [u8]>,
}

pub fn plain_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, 128])
    });
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageFormat::Jpeg)
        .expect("encode jpeg");
    out.into_inner()
}

pub fn exif_jpeg(width: u32, height: u32, fixture: &ExifFixture<'_>) -> Vec<u8> {
    let mut fields = Vec::new();
    if let Some(value) = fixture.date_time_original {
        fields.push(ascii_field(Tag::DateTimeOriginal, value));
    }
    if let Some(value) = fixture.date_time {
        fields.push(ascii_field(Tag::DateTime, value));
    }
    if let Some(value) = fixture.image_width {
        fields.push(long_field(Tag::ImageWidth, value));
    }
    if let Some(value) = fixture.image_length {
        fields.push(long_field(Tag::ImageLength, value));
    }
    if let Some(value) = fixture.pixel_x {
        fields.push(long_field(Tag::PixelXDimension, value));
    }
    if let Some(value) = fixture.pixel_y {
        fields.push(long_field(Tag::PixelYDimension, value));
    }

    let mut writer = Writer::new();
    for field in &fields {
        writer.push_field(field);
    }
    if let Some(jpeg) = fixture.thumbnail {
        writer.set_jpeg(jpeg, In::THUMBNAIL);
    }
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, false).expect("write exif");

    splice_app1(&plain_jpeg(width, height), &tiff.into_inner())
}

pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).expect("write fixture");
    path
}

fn ascii_field(tag: Tag, value: &str) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![value.as_bytes().to_vec()]),
    }
}

fn long_field(tag: Tag, value: u32) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Long(vec![value]),
    }
}

/// Inserts `Exif\0\0` + TIFF data as an APP1 segment right after SOI.
fn splice_app1(jpeg: &[u8], tiff: &[u8]) -> Vec<u8> {
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "encoder output must start with SOI");
    let segment_len = u16::try_from(2 + 6 + tiff.len()).expect("exif fits in one segment");

    let mut out = Vec::with_capacity(jpeg.len() + tiff.len() + 10);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(tiff);
    out.extend_from_slice(&jpeg[2..]);
    out
}
