//! Single-pass raster image re-encoding.
//!
//! Unlike the PDF and archive paths there is no ladder search here: the
//! caller picks one JPEG quality and gets one encode.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;

use crate::engine::candidate::{scratch_file, Candidate};
use crate::engine::{RunOutcome, RunResult};
use crate::error::{CodecError, EngineError};

/// JPEG has no alpha channel and no palette, so anything beyond plain
/// 8-bit grayscale or RGB is flattened to RGB8 before encoding.
fn flatten_for_jpeg(img: DynamicImage) -> DynamicImage {
    match img {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => img,
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}

/// Decode `input`, re-encode it as JPEG at `quality` into `output`, and
/// return the resulting size.
pub fn encode_jpeg(input: &Path, output: &Path, quality: u8) -> Result<u64, CodecError> {
    let img = image::open(input)?;
    let img = flatten_for_jpeg(img);

    let file = File::create(output)?;
    let mut writer = BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(&mut writer, quality);
    img.write_with_encoder(encoder)?;
    writer.flush()?;

    Ok(fs::metadata(output)?.len())
}

/// Compress a raster image by re-encoding it as JPEG at the given quality.
///
/// On any decode/encode failure the destination is never written and the
/// run reports no improvement with the original file's size; a partial or
/// corrupt output is never left at the destination.
pub fn compress_image(
    input: &Path,
    output: &Path,
    quality: u8,
) -> Result<RunResult, EngineError> {
    let original_size = fs::metadata(input)
        .map_err(|source| EngineError::ReadInput {
            path: input.to_path_buf(),
            source,
        })?
        .len();
    let quality = quality.clamp(1, 100);

    let temp = scratch_file(output)?;
    match encode_jpeg(input, temp.path(), quality) {
        Ok(size) => {
            Candidate::new(temp, size, quality).persist(output)?;
            log::info!(
                "Image re-encoded at quality {quality}: {} -> {} bytes",
                original_size,
                size
            );
            Ok(RunResult {
                outcome: RunOutcome::TargetMet,
                final_size: size,
            })
        }
        Err(err) => {
            log::error!("Image compression failed: {err}");
            Ok(RunResult {
                outcome: RunOutcome::NoImprovement,
                final_size: original_size,
            })
        }
    }
}
