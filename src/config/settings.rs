use crate::cli::{Args, TargetMode};

use super::defaults::*;

/// Runtime settings for a compression run.
///
/// The engine itself only ever sees a `target_bytes` value; deriving it
/// from the user's percentage or absolute-MB preference happens here.
#[derive(Debug, Clone)]
pub struct Settings {
    pub mode: TargetMode,
    /// Reduction percentage in percent mode, clamped on use
    pub reduction_percent: u8,
    /// Absolute target in MB in size mode, floored on use
    pub target_mb: f64,
    /// JPEG quality for raster image inputs
    pub image_quality: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: TargetMode::Percent,
            reduction_percent: DEFAULT_REDUCTION_PERCENT,
            target_mb: DEFAULT_TARGET_MB,
            image_quality: DEFAULT_IMAGE_QUALITY,
        }
    }
}

impl Settings {
    pub fn from_args(args: &Args) -> Self {
        Self {
            mode: args.mode,
            reduction_percent: args.percent,
            target_mb: args.target_mb,
            image_quality: args.quality,
        }
    }

    /// Derive the target byte budget for a file of `original_size` bytes.
    ///
    /// Files under [`SMALL_FILE_THRESHOLD`] are forced into percent mode
    /// regardless of the selected mode. Never returns zero.
    pub fn target_bytes(&self, original_size: u64) -> u64 {
        let force_percent = original_size < SMALL_FILE_THRESHOLD;
        if self.mode == TargetMode::Percent || force_percent {
            let rate = self
                .reduction_percent
                .clamp(MIN_REDUCTION_PERCENT, MAX_REDUCTION_PERCENT);
            (original_size * u64::from(100 - rate) / 100).max(1)
        } else {
            let mb = self.target_mb.max(MIN_TARGET_MB);
            ((mb * 1024.0 * 1024.0) as u64).max(1)
        }
    }

    /// Human-readable description of the chosen target, for the pre-phase
    /// progress label.
    pub fn describe_target(&self, original_size: u64) -> String {
        let force_percent = original_size < SMALL_FILE_THRESHOLD;
        if self.mode == TargetMode::Percent || force_percent {
            let rate = self
                .reduction_percent
                .clamp(MIN_REDUCTION_PERCENT, MAX_REDUCTION_PERCENT);
            format!("Target: {rate}% reduction")
        } else {
            format!("Target: <= {:.2} MB", self.target_mb.max(MIN_TARGET_MB))
        }
    }
}
