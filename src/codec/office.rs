//! Archive container codec adapter for zip-packaged office documents.
//!
//! No entry content is rewritten: the container is repacked with deflate
//! at the requested level, preserving entry order, names, and metadata, so
//! the decompressed payload of every entry is identical to the input's.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::engine::{CodecAdapter, StepScope};
use crate::error::CodecError;

pub struct OfficeCodec;

impl CodecAdapter for OfficeCodec {
    fn level_label(&self, level: u8) -> String {
        format!("Zip level {level}")
    }

    fn encode(
        &self,
        input: &Path,
        output: &Path,
        level: u8,
        progress: &mut StepScope<'_, '_>,
    ) -> Result<u64, CodecError> {
        let mut archive = ZipArchive::new(BufReader::new(File::open(input)?))?;
        let mut writer = ZipWriter::new(BufWriter::new(File::create(output)?));
        let total_entries = archive.len();

        for index in 0..total_entries {
            let mut entry = archive.by_index(index)?;

            let mut options = FileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(i32::from(level)))
                .last_modified_time(entry.last_modified())
                .large_file(entry.size() >= u64::from(u32::MAX));
            if let Some(mode) = entry.unix_mode() {
                options = options.unix_permissions(mode);
            }

            if entry.is_dir() {
                writer.add_directory(entry.name(), options)?;
            } else {
                writer.start_file(entry.name(), options)?;
                io::copy(&mut entry, &mut writer)?;
            }

            progress.unit(
                index + 1,
                total_entries,
                &format!("Zip level {level} | Entry {}/{total_entries}", index + 1),
            );
        }

        let mut inner = writer.finish()?;
        inner.flush()?;
        Ok(fs::metadata(output)?.len())
    }
}
