//! Candidate artifact lifecycle.
//!
//! Every ladder step writes into a uniquely-named temp file next to the
//! final destination, so promoting a candidate is a same-filesystem rename
//! and the destination never observes a partially-written document. Temp
//! files are owned by their [`Candidate`]; dropping one deletes it, which
//! covers every exit path (target met, best effort, total failure, and
//! early returns on whole-run errors) without per-branch delete calls.

use std::ffi::OsStr;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::EngineError;

/// Create a scratch file in the destination's directory, carrying the
/// destination's extension so codecs that sniff extensions behave the same
/// as they will on the final path.
pub fn scratch_file(dest: &Path) -> Result<NamedTempFile, EngineError> {
    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let suffix = dest
        .extension()
        .and_then(OsStr::to_str)
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();
    tempfile::Builder::new()
        .prefix(".shrinkdoc-")
        .suffix(&suffix)
        .tempfile_in(dir)
        .map_err(EngineError::TempFile)
}

/// One complete re-encoded artifact produced by a single ladder step.
pub struct Candidate {
    file: NamedTempFile,
    size: u64,
    level: u8,
}

impl Candidate {
    pub fn new(file: NamedTempFile, size: u64, level: u8) -> Self {
        Self { file, size, level }
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    /// Promote this candidate to the final destination via atomic rename.
    pub fn persist(self, dest: &Path) -> Result<(), EngineError> {
        self.file
            .persist(dest)
            .map_err(|err| EngineError::Persist {
                path: dest.to_path_buf(),
                source: err.error,
            })?;
        Ok(())
    }
}

/// Retention policy: holds at most one live "best so far" candidate.
///
/// A candidate is retained only if it is strictly smaller than the current
/// best (initially the original input size, so a candidate that fails to
/// beat the input is never kept). Equal-size candidates at a later, more
/// aggressive level do not replace an earlier retained one. Rejected and
/// replaced candidates are deleted as their temp files drop.
pub struct BestCandidate {
    current: Option<Candidate>,
    original_size: u64,
}

impl BestCandidate {
    pub fn new(original_size: u64) -> Self {
        Self {
            current: None,
            original_size,
        }
    }

    /// Smallest size any retained candidate would have to beat.
    pub fn best_size(&self) -> u64 {
        self.current
            .as_ref()
            .map_or(self.original_size, Candidate::size)
    }

    /// Offer a candidate; returns whether it was retained.
    pub fn offer(&mut self, candidate: Candidate) -> bool {
        if candidate.size() < self.best_size() {
            self.current = Some(candidate);
            true
        } else {
            false
        }
    }

    pub fn into_inner(self) -> Option<Candidate> {
        self.current
    }
}
