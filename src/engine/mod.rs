//! Generic target-size search engine shared by all codec adapters.

pub mod candidate;
pub mod driver;
pub mod progress;

// Re-export commonly used items for convenience
pub use driver::{run_ladder, CodecAdapter, CompressionRequest, RunOutcome, RunResult};
pub use progress::{JsonLineSink, LogSink, NullSink, ProgressSink, ProgressTracker, StepScope};
