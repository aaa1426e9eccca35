use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "shrinkdoc")]
#[command(
    author,
    version,
    about = "Compress PDF, Office, and raster image files toward a target size"
)]
pub struct Args {
    /// Input file path (.pdf, .docx, .xlsx, .pptx, or a raster image)
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output file path (defaults to <input>_compressed.<ext>)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// How the target size is chosen
    #[arg(short = 'm', long, value_enum, default_value = "percent")]
    pub mode: TargetMode,

    /// Reduction percentage in percent mode (10-95)
    #[arg(short = 'p', long, default_value = "75", value_parser = clap::value_parser!(u8).range(10..=95))]
    pub percent: u8,

    /// Absolute target size in MB in size mode
    #[arg(short = 't', long, default_value = "2.0")]
    pub target_mb: f64,

    /// JPEG quality used for raster image inputs (1-100)
    #[arg(short = 'q', long, default_value = "75", value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: u8,

    /// Emit progress as JSON lines on stdout
    #[arg(long)]
    pub progress_json: bool,

    /// Append the run log to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Target-size selection mode. Files under the small-file threshold are
/// forced into percent mode regardless of this setting.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum TargetMode {
    /// Reduce by a percentage of the original size
    #[default]
    Percent,
    /// Compress toward an absolute size in MB
    Size,
}

/// What kind of document an input path holds, judged by extension.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputKind {
    Pdf,
    Office,
    Raster,
}

impl InputKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(InputKind::Pdf),
            "docx" | "xlsx" | "pptx" => Some(InputKind::Office),
            "jpg" | "jpeg" | "png" | "bmp" | "webp" | "tif" | "tiff" => Some(InputKind::Raster),
            _ => None,
        }
    }
}

impl Args {
    /// Get the output path, defaulting to the input with "_compressed"
    /// appended to the stem.
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let stem = self
                .input
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let name = match self.input.extension() {
                Some(ext) => format!("{stem}_compressed.{}", ext.to_string_lossy()),
                None => format!("{stem}_compressed"),
            };
            self.input.with_file_name(name)
        })
    }

    /// Classify the input file by extension.
    pub fn input_kind(&self) -> Option<InputKind> {
        InputKind::from_path(&self.input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path_appends_compressed() {
        let args = Args::parse_from(["shrinkdoc", "reports/annual.pdf"]);
        assert_eq!(
            args.output_path(),
            PathBuf::from("reports/annual_compressed.pdf")
        );
    }

    #[test]
    fn test_explicit_output_path_wins() {
        let args = Args::parse_from(["shrinkdoc", "a.docx", "-o", "b.docx"]);
        assert_eq!(args.output_path(), PathBuf::from("b.docx"));
    }

    #[test]
    fn test_input_kind_classification() {
        assert_eq!(InputKind::from_path(Path::new("x.PDF")), Some(InputKind::Pdf));
        assert_eq!(
            InputKind::from_path(Path::new("x.docx")),
            Some(InputKind::Office)
        );
        assert_eq!(
            InputKind::from_path(Path::new("photo.JPEG")),
            Some(InputKind::Raster)
        );
        assert_eq!(InputKind::from_path(Path::new("x.txt")), None);
        assert_eq!(InputKind::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_percent_range_is_enforced() {
        assert!(Args::try_parse_from(["shrinkdoc", "a.pdf", "-p", "5"]).is_err());
        assert!(Args::try_parse_from(["shrinkdoc", "a.pdf", "-p", "96"]).is_err());
        assert!(Args::try_parse_from(["shrinkdoc", "a.pdf", "-p", "50"]).is_ok());
    }
}
