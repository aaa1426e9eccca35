/// JPEG quality ladder for PDF embedded images, highest fidelity first
pub const JPEG_QUALITY_LADDER: [u8; 9] = [95, 85, 75, 65, 55, 45, 35, 25, 15];

/// Deflate level ladder for zip containers, strongest compression first
pub const DEFLATE_LEVEL_LADDER: [u8; 9] = [9, 8, 7, 6, 5, 4, 3, 2, 1];

/// Files smaller than this always use percentage targeting
pub const SMALL_FILE_THRESHOLD: u64 = 1024 * 1024;

/// Default reduction percentage in percent mode
pub const DEFAULT_REDUCTION_PERCENT: u8 = 75;

/// Lowest accepted reduction percentage
pub const MIN_REDUCTION_PERCENT: u8 = 10;

/// Highest accepted reduction percentage
pub const MAX_REDUCTION_PERCENT: u8 = 95;

/// Default absolute target in MB
pub const DEFAULT_TARGET_MB: f64 = 2.0;

/// Smallest accepted absolute target in MB
pub const MIN_TARGET_MB: f64 = 0.1;

/// Default JPEG quality for single-shot raster compression
pub const DEFAULT_IMAGE_QUALITY: u8 = 75;
