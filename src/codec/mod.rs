//! Codec adapters: one candidate encoding per invocation.

pub mod office;
pub mod pdf;
pub mod raster;

pub use office::OfficeCodec;
pub use pdf::PdfCodec;
pub use raster::compress_image;
