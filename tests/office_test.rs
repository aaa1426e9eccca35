use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use shrinkdoc::engine::{CodecAdapter, NullSink, ProgressTracker, RunOutcome};
use shrinkdoc::{compress_office_to_target, OfficeCodec};

/// Minimal docx-shaped fixture: the usual entry names with caller-chosen
/// content and compression method.
fn build_docx(path: &Path, entries: &[(&str, Vec<u8>)], method: CompressionMethod) {
    let file = File::create(path).unwrap();
    let mut writer = ZipWriter::new(file);
    for (name, content) in entries {
        let options = FileOptions::default()
            .compression_method(method)
            .compression_level(match method {
                CompressionMethod::Deflated => Some(9),
                _ => None,
            });
        writer.start_file(*name, options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap();
}

fn read_entries(path: &Path) -> Vec<(String, Vec<u8>)> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entries = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).unwrap();
        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();
        entries.push((entry.name().to_string(), content));
    }
    entries
}

/// Deterministic but incompressible payload.
fn noise(len: usize) -> Vec<u8> {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 33) as u8
        })
        .collect()
}

#[test]
fn test_entry_names_and_content_survive_every_level() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.docx");
    let entries: Vec<(&str, Vec<u8>)> = vec![
        ("[Content_Types].xml", b"<Types/>".to_vec()),
        ("word/document.xml", b"<w:p>hello</w:p>".repeat(100)),
        ("word/media/blob.bin", noise(4096)),
    ];
    build_docx(&input, &entries, CompressionMethod::Stored);
    let expected = read_entries(&input);

    for level in [9u8, 5, 1] {
        let output = dir.path().join(format!("out{level}.docx"));
        let mut sink = NullSink;
        let mut tracker = ProgressTracker::new(&mut sink);
        let mut scope = tracker.step(0, 1);
        OfficeCodec
            .encode(&input, &output, level, &mut scope)
            .unwrap();
        assert_eq!(read_entries(&output), expected, "level {level}");
    }
}

#[test]
fn test_entry_metadata_survives_repacking() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.docx");
    let stamp = zip::DateTime::from_date_and_time(2023, 5, 17, 11, 30, 0).unwrap();
    {
        let file = File::create(&input).unwrap();
        let mut writer = ZipWriter::new(file);
        let dir_options = FileOptions::default()
            .last_modified_time(stamp)
            .unix_permissions(0o755);
        writer.add_directory("word/media/", dir_options).unwrap();
        let file_options = FileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .last_modified_time(stamp)
            .unix_permissions(0o600);
        writer.start_file("word/document.xml", file_options).unwrap();
        writer.write_all(b"<w:p>hello</w:p>").unwrap();
        writer.finish().unwrap();
    }

    let output = dir.path().join("out.docx");
    let mut sink = NullSink;
    let mut tracker = ProgressTracker::new(&mut sink);
    let mut scope = tracker.step(0, 1);
    OfficeCodec.encode(&input, &output, 6, &mut scope).unwrap();

    let mut archive = ZipArchive::new(File::open(&output).unwrap()).unwrap();

    let media = archive.by_name("word/media/").unwrap();
    assert!(media.is_dir());
    assert_eq!(media.unix_mode().map(|m| m & 0o777), Some(0o755));
    drop(media);

    let doc = archive.by_name("word/document.xml").unwrap();
    assert_eq!(doc.unix_mode().map(|m| m & 0o777), Some(0o600));
    let kept = doc.last_modified();
    assert_eq!(
        (kept.year(), kept.month(), kept.day()),
        (stamp.year(), stamp.month(), stamp.day())
    );
    assert_eq!(
        (kept.hour(), kept.minute(), kept.second()),
        (stamp.hour(), stamp.minute(), stamp.second())
    );
}

#[test]
fn test_stored_container_compresses_to_target() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.docx");
    let entries: Vec<(&str, Vec<u8>)> = vec![
        (
            "[Content_Types].xml",
            b"<Types xmlns=\"ct\"><Default/></Types>".repeat(50),
        ),
        ("word/document.xml", b"<w:p><w:t>lorem ipsum</w:t></w:p>".repeat(2000)),
        ("word/styles.xml", b"<w:style/>".repeat(500)),
    ];
    build_docx(&input, &entries, CompressionMethod::Stored);

    let original_size = std::fs::metadata(&input).unwrap().len();
    let output = dir.path().join("doc_compressed.docx");
    let mut sink = NullSink;
    let result =
        compress_office_to_target(&input, &output, original_size / 2, &mut sink).unwrap();

    assert_eq!(result.outcome, RunOutcome::TargetMet);
    assert!(result.final_size <= original_size / 2);
    assert_eq!(read_entries(&output), read_entries(&input));
}

#[test]
fn test_already_optimal_container_reports_no_improvement() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.xlsx");
    let entries: Vec<(&str, Vec<u8>)> = vec![
        ("[Content_Types].xml", noise(512)),
        ("xl/worksheets/sheet1.xml", noise(32 * 1024)),
    ];
    // Already written at maximum deflate; no level can do strictly better.
    build_docx(&input, &entries, CompressionMethod::Deflated);

    let original_size = std::fs::metadata(&input).unwrap().len();
    let output = dir.path().join("doc_compressed.xlsx");
    let mut sink = NullSink;
    let result = compress_office_to_target(&input, &output, 1, &mut sink).unwrap();

    assert_eq!(result.outcome, RunOutcome::NoImprovement);
    assert!(!result.success());
    assert_eq!(result.final_size, original_size);
    assert!(!output.exists());
}

#[test]
fn test_progress_walks_levels_strongest_first() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.docx");
    let entries: Vec<(&str, Vec<u8>)> = vec![("word/document.xml", noise(2048))];
    build_docx(&input, &entries, CompressionMethod::Deflated);

    let output = dir.path().join("doc_compressed.docx");
    let mut labels: Vec<String> = Vec::new();
    {
        let mut sink = |_pct: u8, label: &str| labels.push(label.to_string());
        compress_office_to_target(&input, &output, 1, &mut sink).unwrap();
    }

    let level_of = |label: &String| -> Option<u8> {
        label
            .strip_prefix("Zip level ")?
            .split(' ')
            .next()?
            .parse()
            .ok()
    };
    let mut levels: Vec<u8> = labels.iter().filter_map(level_of).collect();
    levels.dedup();
    assert_eq!(levels, vec![9, 8, 7, 6, 5, 4, 3, 2, 1]);
}
