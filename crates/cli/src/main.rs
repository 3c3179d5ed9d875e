//! CLI tool for rendering report payloads into PowerPoint decks.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use deck_core::{normalize_request_str, LocalFiles, PageCapacity, UnknownSlidePolicy};
use deck_pptx::{DeckReader, DeckSummary, GeneratorOptions, ReportGenerator};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Render media-monitoring report payloads into .pptx decks.
#[derive(Parser, Debug)]
#[command(name = "report-deck")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render JSON payload file(s) into .pptx decks
    Render(RenderArgs),
    /// Print the slides of generated .pptx deck(s)
    Inspect(InspectArgs),
}

#[derive(clap::Args, Debug)]
struct RenderArgs {
    /// Input payload file(s) (.json)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Output directory (default: same as input file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print a summary of each rendered deck
    #[arg(short, long)]
    print_summary: bool,

    /// Fail on slide types the renderer does not know instead of skipping them
    #[arg(long)]
    strict: bool,

    /// Table rows per page (default: as many single-line rows as fit)
    #[arg(long)]
    max_rows_per_page: Option<usize>,

    /// Fill table pages by measured row height
    #[arg(long)]
    measure_rows: bool,

    /// Seconds to wait for a remote logo
    #[arg(long, default_value = "10")]
    logo_timeout: u64,
}

#[derive(clap::Args, Debug)]
struct InspectArgs {
    /// Deck file(s) (.pptx)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    match &args.command {
        Command::Render(render) => run_render(render, args.verbose).await,
        Command::Inspect(inspect) => run_inspect(inspect),
    }
}

async fn run_render(args: &RenderArgs, verbose: bool) -> Result<()> {
    let options = GeneratorOptions {
        logo_timeout: Duration::from_secs(args.logo_timeout),
        page_capacity: if args.measure_rows {
            PageCapacity::Measured
        } else {
            PageCapacity::Nominal
        },
        max_rows_per_page: args.max_rows_per_page.filter(|&n| n > 0),
        unknown_slides: if args.strict {
            UnknownSlidePolicy::Reject
        } else {
            UnknownSlidePolicy::Skip
        },
        local_logos: LocalFiles::Any,
    };
    let generator = ReportGenerator::new(&options).map_err(|e| anyhow::anyhow!("{}", e))?;

    let mut failed = 0;
    for input_path in &args.input {
        if verbose {
            eprintln!("Processing: {}", input_path.display());
        }

        match process_file(input_path, &generator).await {
            Ok(deck) => {
                let output_path = get_output_path(input_path, args.output.as_ref())?;
                write_output(&output_path, &deck)?;
                log::info!("Saved {}", output_path.display());
                if verbose {
                    eprintln!("Written to: {}", output_path.display());
                }
                if args.print_summary {
                    let summary = DeckReader::new()
                        .read_bytes(&deck)
                        .map_err(|e| anyhow::anyhow!("{}", e))?;
                    print!("{}", format_summary(&output_path, &summary));
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("Error processing {}: {:#}", input_path.display(), e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} file(s) failed", failed, args.input.len());
    }
    Ok(())
}

/// Render a single payload file.
async fn process_file(input_path: &Path, generator: &ReportGenerator) -> Result<Vec<u8>> {
    let body = std::fs::read_to_string(input_path)
        .with_context(|| format!("Failed to read {}", input_path.display()))?;

    let payload = normalize_request_str(&body).map_err(|e| anyhow::anyhow!("{}", e))?;
    log::debug!(
        "Payload has {} slide(s) and {} row(s)",
        payload.slides.len(),
        payload.row_count()
    );

    generator
        .generate(&payload)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))
}

fn run_inspect(args: &InspectArgs) -> Result<()> {
    let reader = DeckReader::new();
    for input_path in &args.input {
        let file = File::open(input_path)
            .with_context(|| format!("Failed to open {}", input_path.display()))?;
        let summary = reader
            .read(BufReader::new(file))
            .map_err(|e| anyhow::anyhow!("{}: {}", input_path.display(), e))?;

        if args.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            print!("{}", format_summary(input_path, &summary));
        }
    }
    Ok(())
}

/// Human-readable deck summary: one block per slide.
fn format_summary(path: &Path, summary: &DeckSummary) -> String {
    let mut out = format!("{}: {} slide(s)", path.display(), summary.slide_count());
    if let Some(title) = &summary.title {
        out.push_str(&format!(" - {}", title));
    }
    out.push('\n');

    for slide in &summary.slides {
        out.push_str(&format!(
            "  Slide {} [{}]{}\n",
            slide.number,
            slide.layout.as_deref().unwrap_or("-"),
            if slide.layout_has_picture { " (logo)" } else { "" }
        ));
        for text in &slide.texts {
            out.push_str(&format!("    {}\n", text.replace('\n', " / ")));
        }
        if let Some(table) = slide.table() {
            let body_rows = table.len().saturating_sub(2);
            let heading = table.first().and_then(|r| r.first()).map(String::as_str).unwrap_or("");
            out.push_str(&format!("    Table '{}': {} row(s)\n", heading, body_rows));
        }
    }
    out
}

/// Determine the output path for a rendered deck.
fn get_output_path(input_path: &Path, output_dir: Option<&PathBuf>) -> Result<PathBuf> {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("report");

    let output_filename = format!("{}.pptx", stem);

    let output_path = match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
            dir.join(output_filename)
        }
        None => {
            if let Some(parent) = input_path.parent() {
                parent.join(output_filename)
            } else {
                PathBuf::from(output_filename)
            }
        }
    };

    Ok(output_path)
}

/// Write output to a file.
fn write_output(path: &Path, content: &[u8]) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content)
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}
