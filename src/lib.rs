pub mod cli;
pub mod codec;
pub mod config;
pub mod engine;
pub mod error;

pub use cli::InputKind;
pub use codec::{compress_image, OfficeCodec, PdfCodec};
pub use config::defaults::{DEFLATE_LEVEL_LADDER, JPEG_QUALITY_LADDER};
pub use config::Settings;
pub use engine::{
    run_ladder, CodecAdapter, CompressionRequest, JsonLineSink, NullSink, ProgressSink,
    RunOutcome, RunResult,
};
pub use error::{CodecError, EngineError};

use std::path::Path;

/// Compress a PDF toward `target_bytes` by re-encoding embedded images at
/// a descending JPEG quality ladder.
///
/// The first quality level whose result fits the budget wins; otherwise
/// the smallest result found is kept as a best effort. The destination is
/// written at most once, atomically, and only when a verdict is reached.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use shrinkdoc::{compress_pdf_to_target, NullSink};
///
/// let result = compress_pdf_to_target(
///     Path::new("report.pdf"),
///     Path::new("report_compressed.pdf"),
///     2 * 1024 * 1024,
///     &mut NullSink,
/// ).unwrap();
///
/// if result.success() {
///     println!("final size: {} bytes", result.final_size);
/// }
/// ```
pub fn compress_pdf_to_target(
    input: &Path,
    output: &Path,
    target_bytes: u64,
    sink: &mut dyn ProgressSink,
) -> Result<RunResult, EngineError> {
    let request = CompressionRequest {
        input,
        output,
        target_bytes,
    };
    run_ladder(&request, &JPEG_QUALITY_LADDER, &PdfCodec, sink)
}

/// Compress a zip-packaged office document (`.docx`, `.xlsx`, `.pptx`)
/// toward `target_bytes` by rewriting its container at descending deflate
/// levels. Entry content is copied across unchanged.
pub fn compress_office_to_target(
    input: &Path,
    output: &Path,
    target_bytes: u64,
    sink: &mut dyn ProgressSink,
) -> Result<RunResult, EngineError> {
    let request = CompressionRequest {
        input,
        output,
        target_bytes,
    };
    run_ladder(&request, &DEFLATE_LEVEL_LADDER, &OfficeCodec, sink)
}
