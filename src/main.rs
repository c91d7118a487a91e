use clap::Parser;
use screen2prompt::config::Configuration;
use screen2prompt::error::AppError;
use screen2prompt::pipeline::{DetectionMode, PromptPipeline, RunStatus};
use screen2prompt::ScreenCapture;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn, Level};

#[derive(Parser)]
#[command(name = "screen2prompt")]
#[command(about = "Turn a UI screenshot into a build prompt for code-generation models")]
struct Args {
    /// Screenshot to analyze (PNG, JPEG, GIF or WebP)
    image: PathBuf,

    /// TOML configuration file
    #[arg(long, short = 'c', env = "SCREEN2PROMPT_CONFIG")]
    config: Option<PathBuf>,

    /// Maximum number of components to detect
    #[arg(long)]
    cap: Option<usize>,

    /// Prompt verbosity: concise or extensive
    #[arg(long)]
    verbosity: Option<String>,

    /// Detection mode: llm or whole-image
    #[arg(long)]
    mode: Option<String>,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,

    /// Debug-level logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode, AppError> {
    let args = Args::parse();
    init_logging(args.verbose);

    let configuration = Configuration::load(args.config.as_deref())?;
    let mut pipeline = PromptPipeline::builder(configuration).build()?;

    if let Some(mode) = args.mode.as_deref() {
        pipeline.set_detection_mode(mode.parse::<DetectionMode>()?);
    }
    if let Some(level) = args.verbosity.as_deref() {
        pipeline.set_prompt_verbosity(level)?;
    }
    let cap = args.cap.unwrap_or(pipeline.detection_cap());

    let image = ScreenCapture::open(&args.image).await?;
    info!(
        "Loaded {} ({:?}) at {}",
        args.image.display(),
        image.dimensions(),
        image.captured_at().format("%H:%M:%S")
    );

    let result = pipeline.run_pipeline(&image, cap).await;
    if !result.is_completed() {
        warn!("Run finished with status {:?}", result.status);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.final_prompt);
    }

    match result.status {
        RunStatus::Failed { .. } => Ok(ExitCode::FAILURE),
        _ => Ok(ExitCode::SUCCESS),
    }
}
