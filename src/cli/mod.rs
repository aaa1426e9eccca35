pub mod args;

pub use args::{Args, InputKind, TargetMode};
