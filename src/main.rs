//! pdf-autocrop - Automatic margin cropping for PDF documents
//!
//! CLI entry point

use anyhow::{Context, Result};
use std::path::Path;
use tracing::Level;

use pdf_autocrop::{
    exit_codes,
    // CLI
    Cli,
    // Config
    CropConfig,
    // Errors
    CropError,
    // Pipeline
    CropPipeline,
    // Progress tracking
    OutputMode, ProgressTracker,
};

fn main() {
    let cli = Cli::parse_args(std::env::args_os());
    init_logging(&cli);

    std::process::exit(match run(&cli) {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code_for(&e)
        }
    });
}

/// Log to stderr; `-v` raises and `-q` lowers the level
fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::WARN,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn exit_code_for(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<CropError>() {
        Some(e) if e.is_load_failure() => exit_codes::LOAD_FAILED,
        _ => exit_codes::GENERAL_ERROR,
    }
}

// ============ Crop Command ============

fn run(cli: &Cli) -> Result<()> {
    let (Some(input), Some(output)) = (cli.input(), cli.output_path()) else {
        eprintln!("Error: No input file given");
        std::process::exit(exit_codes::INVALID_ARGS);
    };

    // Validate input path
    if !input.is_file() {
        eprintln!("Error: Input file does not exist: {}", input.display());
        std::process::exit(exit_codes::INPUT_NOT_FOUND);
    }

    // Load config file if specified, otherwise search the default locations
    let file_config = match &cli.config {
        Some(path) => CropConfig::load_from_path(path).unwrap_or_else(|e| {
            tracing::warn!("{}; using defaults", e);
            CropConfig::default()
        }),
        None => CropConfig::load().unwrap_or_else(|e| {
            tracing::warn!("{}; using defaults", e);
            CropConfig::default()
        }),
    };

    // Command-line values take precedence over the config file
    let pipeline = CropPipeline::new(file_config.merge_with_cli(&cli.to_overrides()));
    tracing::debug!("Effective configuration: {}", pipeline.config().to_json());

    if cli.dry_run {
        print_execution_plan(input, &output, cli, pipeline.config());
        return Ok(());
    }

    let mode = if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::from_verbosity(cli.verbose)
    };
    let progress = ProgressTracker::new(mode);

    let report = pipeline
        .process(input, &output, &progress)
        .with_context(|| format!("Failed to crop {}", input.display()))?;

    if let Some(path) = &cli.report {
        report
            .write_json(path)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
    }

    if mode.should_show(OutputMode::Normal) {
        progress.finish();
        let failed = report.failed_pages();
        println!(
            "Cropped {} of {} pages -> {}",
            report.written_pages,
            report.page_count(),
            output.display()
        );
        if !failed.is_empty() {
            println!("  {} page(s) left unchanged after render failures", failed.len());
        }
    }

    Ok(())
}

// ============ Helper Functions ============

/// Print execution plan for dry-run mode
fn print_execution_plan(input: &Path, output: &Path, cli: &Cli, config: &CropConfig) {
    let on_off = |enabled: bool| if enabled { "ENABLED" } else { "DISABLED" };

    println!("=== Dry Run - Execution Plan ===");
    println!();
    println!("Input: {}", input.display());
    println!("Output: {}", output.display());
    if let Some(report) = &cli.report {
        println!("Report: {}", report.display());
    }
    println!();
    println!("Pipeline Configuration:");
    println!(
        "  1. Render pages (DPI: {}, quality: {})",
        config.resolution_dpi,
        if config.high_quality { "high" } else { "fast" }
    );
    if config.crop_header_pt > 0.0 {
        println!("  2. Header Removal: up to {} pt", config.crop_header_pt);
    } else {
        println!("  2. Header Removal: DISABLED");
    }
    if config.crop_footer_pt > 0.0 {
        println!("  3. Footer Removal: up to {} pt", config.crop_footer_pt);
    } else {
        println!("  3. Footer Removal: DISABLED");
    }
    println!("  4. Outlier Clamping: {}", on_off(config.crop_outlier));
    let m = config.margins;
    println!(
        "  5. Margins (pt): top {}, bottom {}, left {}, right {}, inner {}, outer {}",
        m.top, m.bottom, m.left, m.right, m.inner, m.outer
    );
    println!();
    println!("Processing Options:");
    println!("  Threads: {}", config.threads.unwrap_or_else(num_cpus::get));
    println!("  Verbose: {}", cli.verbose);
    println!();
    println!("Config File Locations:");
    for path in CropConfig::search_paths() {
        println!("  {}", path.display());
    }
}
