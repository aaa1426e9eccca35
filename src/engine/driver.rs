//! Ladder search driver.
//!
//! Walks a fixed descending ladder of quality/compression levels, invoking
//! a codec adapter once per level, and keeps the smallest result. The first
//! candidate that fits the target budget wins outright; no further levels
//! are tried even if a more aggressive level could produce a smaller file.

use std::fs;
use std::path::Path;

use crate::engine::candidate::{scratch_file, BestCandidate, Candidate};
use crate::engine::progress::{ProgressSink, ProgressTracker, StepScope};
use crate::error::{CodecError, EngineError};

/// One compression invocation, immutable for the duration of the run.
pub struct CompressionRequest<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    /// Inclusive upper bound on the output size, in bytes. Must be > 0;
    /// percentage-to-bytes conversion is the config layer's job.
    pub target_bytes: u64,
}

/// A codec that can produce one candidate encoding at a given ladder level.
///
/// Levels are adapter-specific: JPEG quality for the PDF codec, deflate
/// level for the archive codec. An `encode` error means this level simply
/// contributes no candidate; it never aborts the run.
pub trait CodecAdapter {
    /// Label used in log lines, e.g. "Quality 85" or "Zip level 6".
    fn level_label(&self, level: u8) -> String;

    /// Encode `input` into `output` at `level`, returning the artifact size.
    fn encode(
        &self,
        input: &Path,
        output: &Path,
        level: u8,
        progress: &mut StepScope<'_, '_>,
    ) -> Result<u64, CodecError>;
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// A candidate met the target budget (or a single-shot encode succeeded).
    TargetMet,
    /// The ladder was exhausted; the smallest candidate found was kept.
    BestEffort,
    /// No level produced a candidate smaller than the input; the
    /// destination was left untouched.
    NoImprovement,
}

/// Final verdict of a compression run.
#[derive(Debug, Clone, Copy)]
pub struct RunResult {
    pub outcome: RunOutcome,
    /// Size of the persisted output, or of the original input when the
    /// outcome is [`RunOutcome::NoImprovement`].
    pub final_size: u64,
}

impl RunResult {
    /// True whenever a candidate was produced and persisted, even if it
    /// missed the target.
    pub fn success(&self) -> bool {
        self.outcome != RunOutcome::NoImprovement
    }
}

fn mb(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

/// Run the ladder search: try each level in declared order, keep the best
/// candidate, and materialize exactly one artifact at the destination (or
/// none, when nothing improved on the input).
pub fn run_ladder(
    request: &CompressionRequest<'_>,
    ladder: &[u8],
    adapter: &dyn CodecAdapter,
    sink: &mut dyn ProgressSink,
) -> Result<RunResult, EngineError> {
    if request.target_bytes == 0 {
        return Err(EngineError::InvalidTarget);
    }
    let original_size = fs::metadata(request.input)
        .map_err(|source| EngineError::ReadInput {
            path: request.input.to_path_buf(),
            source,
        })?
        .len();

    log::info!(
        "Compressing {} ({:.2} MB) toward <= {:.2} MB",
        request.input.display(),
        mb(original_size),
        mb(request.target_bytes)
    );

    let mut tracker = ProgressTracker::new(sink);
    let mut best = BestCandidate::new(original_size);

    for (index, &level) in ladder.iter().enumerate() {
        let label = adapter.level_label(level);
        let temp = scratch_file(request.output)?;

        let mut scope = tracker.step(index, ladder.len());
        let size = match adapter.encode(request.input, temp.path(), level, &mut scope) {
            Ok(size) => size,
            Err(err) => {
                log::error!("{label} failed: {err}");
                continue;
            }
        };
        log::info!("{label}: {:.2} MB", mb(size));

        if size <= request.target_bytes {
            Candidate::new(temp, size, level).persist(request.output)?;
            tracker.finish("Target Achieved!");
            log::info!("Target met at {label}");
            return Ok(RunResult {
                outcome: RunOutcome::TargetMet,
                final_size: size,
            });
        }

        best.offer(Candidate::new(temp, size, level));
    }

    match best.into_inner() {
        Some(candidate) => {
            let final_size = candidate.size();
            log::info!(
                "Best achievable: {:.2} MB at {}",
                mb(final_size),
                adapter.level_label(candidate.level())
            );
            candidate.persist(request.output)?;
            tracker.finish("Best Possible");
            Ok(RunResult {
                outcome: RunOutcome::BestEffort,
                final_size,
            })
        }
        None => {
            log::info!("No level improved on the input; destination untouched");
            tracker.finish("No Improvement");
            Ok(RunResult {
                outcome: RunOutcome::NoImprovement,
                final_size: original_size,
            })
        }
    }
}
