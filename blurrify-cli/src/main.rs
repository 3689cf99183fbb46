// blurrify-cli/src/main.rs
//
// Command-line interface for the Blurrify batch plate redaction tool.
//
// Responsibilities include:
// - Defining the CLI argument structures (`Cli`, `Commands`, `RunArgs`).
// - Loading the JSON settings file (with first-run interactive setup).
// - Building the core configuration and invoking the pipeline.
// - Displaying the structured per-video summary and managing exit codes.

use blurrify_core::{
    BatchReport, CheckpointLedger, CoreConfig, SeetaDetectorLoader, TempWorkspace, process_videos,
};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::process;
use std::time::{Duration, Instant};

mod logging;
mod settings;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Blurrify: batch license-plate redaction for videos",
    long_about = "Splits each input video into segments and frames, blurs detected \
                  plate regions in parallel, and reassembles the result via ffmpeg."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Processes every pending video in the input directory
    Run(RunArgs),
    /// Clears workspace artifacts left behind by an interrupted run
    Clean(CleanArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Optional: settings file (defaults to ~/.config/blurrify/settings.json)
    #[arg(short, long, value_name = "SETTINGS_FILE")]
    settings: Option<PathBuf>,

    /// Worker count of the detection pool
    #[arg(long, value_name = "COUNT")]
    workers: Option<usize>,

    /// Number of segments each video is split into
    #[arg(long, value_name = "COUNT")]
    segments: Option<usize>,

    /// Frame sampling rate used when rasterizing segments
    #[arg(long, value_name = "FPS")]
    frame_rate: Option<u32>,
}

#[derive(Parser, Debug)]
struct CleanArgs {
    /// Optional: settings file (defaults to ~/.config/blurrify/settings.json)
    #[arg(short, long, value_name = "SETTINGS_FILE")]
    settings: Option<PathBuf>,
}

// --- Command Implementations ---

fn load_config(settings_path: Option<PathBuf>) -> Result<CoreConfig, Box<dyn std::error::Error>> {
    let path = settings_path.unwrap_or_else(settings::default_path);
    let settings = settings::load_or_init(&path)?;
    Ok(CoreConfig::new(
        settings.assets_dir,
        settings.input_dir,
        settings.output_dir,
        settings.tmp_dir,
    ))
}

fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(args.settings)?;
    if let Some(workers) = args.workers {
        config.detection_workers = workers;
    }
    if let Some(segments) = args.segments {
        config.segment_count = segments;
    }
    if let Some(frame_rate) = args.frame_rate {
        config.frame_rate = frame_rate;
    }
    config.validate()?;

    println!("{}", "========================================".cyan());
    println!("Blurrify run started: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!("Input directory:  {}", config.input_dir.display());
    println!("Output directory: {}", config.output_dir.display());
    println!("{}", "========================================".cyan());

    let workspace = TempWorkspace::new(&config);
    // Silent sweep of debris from an interrupted earlier run.
    workspace.clean();
    workspace.prepare()?;

    let mut ledger = CheckpointLedger::load(&config.ledger_path())?;
    let loader = SeetaDetectorLoader::new(config.model_path());

    let started = Instant::now();
    let report = process_videos(&config, &mut ledger, &loader)?;

    println!("\n{}", "######## Deleting temporary files (please wait...) ########".cyan());
    workspace.clean();
    println!("{}", "######## DONE ########".cyan());

    print_summary(&report, started.elapsed());

    if report.failed.is_empty() {
        Ok(())
    } else {
        Err(format!("{} video(s) failed; rerun to retry them", report.failed.len()).into())
    }
}

fn clean(args: CleanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(args.settings)?;
    println!("{}", "######## Deleting temporary files (please wait...) ########".cyan());
    TempWorkspace::new(&config).clean();
    println!("{}", "######## DONE ########".cyan());
    Ok(())
}

// --- Summary Rendering ---

fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

fn print_summary(report: &BatchReport, elapsed: Duration) {
    println!("\n{}", "========================================".cyan());
    println!("{}", "Redaction Summary:".bold());
    println!("{}", "========================================".cyan());

    if report.skipped > 0 {
        println!("Skipped {} already-processed video(s).", report.skipped);
    }

    for outcome in &report.completed {
        println!("{}", outcome.filename.bold());
        println!("  Output:           {}", outcome.output_path.display());
        println!("  Elapsed:          {}", format_duration(outcome.elapsed));
        println!("  Frames processed: {}", outcome.frames_processed);
        if outcome.frame_errors.is_empty() {
            println!("  Detection errors: {}", "none".green());
        } else {
            println!(
                "  Detection errors: {}",
                outcome.frame_errors.len().to_string().yellow()
            );
            for message in &outcome.frame_errors {
                println!("    - {message}");
            }
        }
        println!("----------------------------------------");
    }

    for (filename, error) in &report.failed {
        println!("{} {}", "[FAIL]".red().bold(), filename.bold());
        println!("  {error}");
        println!("----------------------------------------");
    }

    if report.completed.is_empty() && report.failed.is_empty() && report.skipped == 0 {
        println!("{}", "No processable .mp4 files found in the input directory.".yellow());
    }

    println!("Total run time: {}", format_duration(elapsed));
}

// --- Entry Point ---

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => run(args),
        Commands::Clean(args) => clean(args),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
    Ok(())
}
