//! PDF codec adapter.
//!
//! Produces one full-document candidate per ladder level: every page's
//! embedded raster images are re-encoded as JPEG at the level's quality,
//! and all uncompressed streams (page content included) are flate-packed
//! before saving. An image that cannot be decoded stays byte-for-byte
//! intact in the output, and a page that fails for any other reason is
//! carried through unmodified; neither ever aborts the document.

use std::fs;
use std::io::Read;
use std::path::Path;

use flate2::read::ZlibDecoder;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::engine::{CodecAdapter, StepScope};
use crate::error::CodecError;

/// Raster formats an embedded image payload may decode as and still be a
/// candidate for JPEG re-encoding.
const REENCODABLE_FORMATS: [ImageFormat; 4] = [
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Bmp,
    ImageFormat::Tiff,
];

pub struct PdfCodec;

impl CodecAdapter for PdfCodec {
    fn level_label(&self, level: u8) -> String {
        format!("Quality {level}")
    }

    fn encode(
        &self,
        input: &Path,
        output: &Path,
        quality: u8,
        progress: &mut StepScope<'_, '_>,
    ) -> Result<u64, CodecError> {
        let mut doc = Document::load(input)?;
        let pages: Vec<(u32, ObjectId)> = doc.get_pages().into_iter().collect();
        let total_pages = pages.len();

        for (index, (page_number, page_id)) in pages.into_iter().enumerate() {
            if let Err(err) = recompress_page(&mut doc, page_id, quality) {
                log::error!("Quality {quality} | Page {page_number}: left unmodified: {err}");
            }
            progress.unit(
                index + 1,
                total_pages,
                &format!("Quality {quality} | Page {}/{total_pages}", index + 1),
            );
        }

        // Flate-packs every stream that carries no filter yet; the JPEG
        // image streams written above advertise DCTDecode and are skipped.
        doc.compress();
        doc.save(output)?;
        Ok(fs::metadata(output)?.len())
    }
}

/// Re-encode every image XObject reachable from this page's resource
/// dictionary. Failure to enumerate the resources leaves the whole page
/// untouched; failure on one image leaves only that image untouched.
fn recompress_page(doc: &mut Document, page_id: ObjectId, quality: u8) -> Result<(), CodecError> {
    let images = page_image_xobjects(doc, page_id)?;
    for (name, object_id) in images {
        match recompress_image(doc, object_id, quality) {
            Ok(ImageOutcome::Replaced { from, to }) => {
                log::debug!("{name}: re-encoded {from} -> {to} bytes");
            }
            Ok(ImageOutcome::Skipped(reason)) => {
                log::debug!("{name}: kept original ({reason})");
            }
            Err(err) => {
                // Required fallback: the original object stays intact.
                log::debug!("{name}: kept original ({err})");
            }
        }
    }
    Ok(())
}

fn resolve_dict<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Dictionary> {
    match object {
        Object::Dictionary(dict) => Some(dict),
        Object::Reference(id) => doc.get_object(*id).ok()?.as_dict().ok(),
        _ => None,
    }
}

/// Collect (resource name, object id) pairs for every XObject referenced
/// by the page's own resource dictionary.
fn page_image_xobjects(
    doc: &Document,
    page_id: ObjectId,
) -> Result<Vec<(String, ObjectId)>, CodecError> {
    let page = doc.get_dictionary(page_id)?;
    let Ok(resources) = page.get(b"Resources") else {
        return Ok(Vec::new());
    };
    let Some(resources) = resolve_dict(doc, resources) else {
        return Ok(Vec::new());
    };
    let Ok(xobjects) = resources.get(b"XObject") else {
        return Ok(Vec::new());
    };
    let Some(xobjects) = resolve_dict(doc, xobjects) else {
        return Ok(Vec::new());
    };

    let mut found = Vec::new();
    for (name, value) in xobjects.iter() {
        if let Object::Reference(object_id) = value {
            found.push((String::from_utf8_lossy(name).to_string(), *object_id));
        }
    }
    Ok(found)
}

enum ImageOutcome {
    Replaced { from: usize, to: usize },
    Skipped(&'static str),
}

fn first_filter_name(dict: &Dictionary) -> Option<String> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => Some(String::from_utf8_lossy(name).to_string()),
        Ok(Object::Array(filters)) => filters.first().and_then(|f| match f {
            Object::Name(name) => Some(String::from_utf8_lossy(name).to_string()),
            _ => None,
        }),
        _ => None,
    }
}

fn inflate(data: &[u8]) -> Option<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut decoded = Vec::new();
    decoder.read_to_end(&mut decoded).ok()?;
    Some(decoded)
}

/// Attempt to replace one image XObject's payload with a JPEG re-encoding
/// at `quality`.
///
/// The replacement is all-or-nothing: payload, filter, color space, bit
/// depth, dimensions, and declared length are updated together, and keys
/// the new payload invalidates are dropped. Any error before that point
/// leaves the object exactly as loaded.
fn recompress_image(
    doc: &mut Document,
    object_id: ObjectId,
    quality: u8,
) -> Result<ImageOutcome, CodecError> {
    let payload = {
        let stream = doc.get_object(object_id)?.as_stream()?;

        let subtype = stream.dict.get(b"Subtype").ok().and_then(|s| match s {
            Object::Name(name) => Some(name.as_slice()),
            _ => None,
        });
        if subtype != Some(b"Image".as_slice()) {
            return Ok(ImageOutcome::Skipped("not an image"));
        }

        // DCTDecode payloads are raw JPEG; flate-packed payloads only
        // decode further if the packed bytes are themselves a raster file.
        match first_filter_name(&stream.dict).as_deref() {
            Some("FlateDecode") => {
                inflate(&stream.content).unwrap_or_else(|| stream.content.clone())
            }
            _ => stream.content.clone(),
        }
    };

    if payload.is_empty() {
        return Ok(ImageOutcome::Skipped("empty payload"));
    }
    let Ok(format) = image::guess_format(&payload) else {
        return Ok(ImageOutcome::Skipped("unrecognized payload"));
    };
    if !REENCODABLE_FORMATS.contains(&format) {
        return Ok(ImageOutcome::Skipped("unsupported format"));
    }

    let img = image::load_from_memory_with_format(&payload, format)?;
    // Always RGB: grayscale and paletted sources are widened so the
    // rewritten color space entry is correct for every payload.
    let img = DynamicImage::ImageRgb8(img.to_rgb8());
    let (width, height) = (img.width(), img.height());

    let mut jpeg = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut jpeg, quality);
    img.write_with_encoder(encoder)?;
    let from = payload.len();
    let to = jpeg.len();

    let stream = doc.get_object_mut(object_id)?.as_stream_mut()?;
    stream.dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
    stream
        .dict
        .set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
    stream.dict.set("BitsPerComponent", Object::Integer(8));
    stream.dict.set("Width", Object::Integer(i64::from(width)));
    stream.dict.set("Height", Object::Integer(i64::from(height)));
    // Stale decode parameters or soft masks would misdescribe the new
    // JPEG payload.
    stream.dict.remove(b"DecodeParms");
    stream.dict.remove(b"SMask");
    stream.set_content(jpeg);

    Ok(ImageOutcome::Replaced { from, to })
}
