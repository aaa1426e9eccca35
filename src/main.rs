use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io;

use shrinkdoc::cli::{Args, InputKind};
use shrinkdoc::config::Settings;
use shrinkdoc::engine::{JsonLineSink, LogSink, ProgressSink};
use shrinkdoc::{
    compress_image, compress_office_to_target, compress_pdf_to_target, RunOutcome, RunResult,
};

fn mb(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let mut builder = env_logger::Builder::new();
    builder.filter_level(match args.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    });
    if let Some(ref path) = args.log_file {
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();

    let kind = args
        .input_kind()
        .ok_or_else(|| anyhow::anyhow!("Unsupported file type: {}", args.input.display()))?;

    let original_size = fs::metadata(&args.input)
        .with_context(|| format!("Failed to read input file: {}", args.input.display()))?
        .len();
    let output_path = args.output_path();
    let settings = Settings::from_args(&args);

    let mut sink: Box<dyn ProgressSink> = if args.progress_json {
        Box::new(JsonLineSink::new(io::stdout()))
    } else {
        Box::new(LogSink)
    };

    // Pre-phase band (0-20%): target selection. The ladder driver owns
    // everything above 20%.
    sink.update(0, "Analyzing");
    let target_bytes = settings.target_bytes(original_size);
    sink.update(10, &settings.describe_target(original_size));
    log::info!(
        "{} -> {} | target <= {:.2} MB",
        args.input.display(),
        output_path.display(),
        mb(target_bytes)
    );
    sink.update(20, "Compressing");

    let result = match kind {
        InputKind::Pdf => {
            compress_pdf_to_target(&args.input, &output_path, target_bytes, sink.as_mut())
                .with_context(|| "PDF compression failed")?
        }
        InputKind::Office => {
            compress_office_to_target(&args.input, &output_path, target_bytes, sink.as_mut())
                .with_context(|| "Office document compression failed")?
        }
        InputKind::Raster => {
            let result = compress_image(&args.input, &output_path, settings.image_quality)
                .with_context(|| "Image compression failed")?;
            let label = if result.success() {
                "Target Achieved!"
            } else {
                "No Improvement"
            };
            sink.update(100, label);
            result
        }
    };

    report(&result, original_size, &args, &output_path);
    Ok(())
}

fn report(result: &RunResult, original_size: u64, args: &Args, output_path: &std::path::Path) {
    let saved_kb = (original_size.saturating_sub(result.final_size)) as f64 / 1024.0;
    match result.outcome {
        RunOutcome::TargetMet => {
            println!(
                "Compressed {:.2} MB -> {:.2} MB (saved {:.1} KB), wrote {}",
                mb(original_size),
                mb(result.final_size),
                saved_kb,
                output_path.display()
            );
        }
        RunOutcome::BestEffort => {
            println!(
                "Target missed; best achievable is {:.2} MB ({:.2} MB original, saved {:.1} KB), wrote {}",
                mb(result.final_size),
                mb(original_size),
                saved_kb,
                output_path.display()
            );
        }
        RunOutcome::NoImprovement => {
            println!(
                "No further compression possible; {} left unchanged at {:.2} MB",
                args.input.display(),
                mb(original_size)
            );
        }
    }
}
