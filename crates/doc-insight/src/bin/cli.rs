//! doc-insight command line
//!
//! With a FILE argument runs the pipeline once; without one starts the
//! interactive prompt loop.

use anyhow::Context;
use clap::Parser;
use console::style;
use std::path::PathBuf;
use std::sync::Arc;

use doc_insight::{
    build_backend, logging, AppConfig, InferenceMode, InteractiveSession, Pipeline,
    PipelineRequest, SourceKind,
};

#[derive(Parser)]
#[command(name = "doc-insight")]
#[command(about = "Extract content from documents and generate insights")]
#[command(version)]
struct Cli {
    /// File path (or document id with --kind gdoc); omit for interactive mode
    file: Option<String>,

    /// Configuration file (JSON, or TOML by extension)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Source type tag such as excel, pdf, pptx, image, cdr or gdoc
    #[arg(short, long)]
    kind: Option<String>,

    /// Inference mode: basic or advanced
    #[arg(short, long, default_value = "basic")]
    mode: String,

    /// Skip the cleaning stage
    #[arg(long)]
    no_clean: bool,

    /// Print the extracted payload as JSON instead of generating insights
    #[arg(long)]
    extract_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let _log_guard = logging::init(&config)?;

    let backend = build_backend(&config)?;
    let pipeline = Arc::new(Pipeline::from_config(&config, backend)?);

    match cli.file.clone() {
        Some(file) => {
            if let Err(e) = run_once(&pipeline, &cli, file).await {
                eprintln!("{} {:#}", style("Error:").red().bold(), e);
                std::process::exit(1);
            }
        }
        None => {
            println!("{}", style("Document Insight").cyan().bold());
            println!(
                "{}",
                style("Spreadsheets, databases, presentations, PDFs, images, call records, cloud documents").dim()
            );
            println!();

            let stdin = std::io::stdin();
            let mut session = InteractiveSession::new(pipeline, stdin.lock(), std::io::stdout());
            session.run().await?;
        }
    }

    Ok(())
}

async fn run_once(pipeline: &Pipeline, cli: &Cli, file: String) -> anyhow::Result<()> {
    let kind = SourceKind::resolve(&file, cli.kind.as_deref())?;
    let mode: InferenceMode = cli.mode.parse()?;

    let mut request = PipelineRequest::new(file).with_kind(kind).with_mode(mode);
    if cli.no_clean {
        request = request.with_cleaning(false);
    }

    if cli.extract_only {
        let payload = pipeline.prepare(&request).await?;
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    let insight = pipeline.run(&request).await?;
    println!("{}", insight.render());
    Ok(())
}
