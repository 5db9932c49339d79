//! Greenprompt CLI
//!
//! Compresses prompts before they are sent to an LLM and reports the token,
//! energy, CO2, and cost savings.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use gp_compressor::{CompressionPipeline, CompressionResult, FillerRuleEngine};
use gp_core::{load_filler_rules, CompressorConfig, SavingsEstimator};
use gp_embed::HashEmbedder;
use std::io::Read;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "greenprompt")]
#[command(about = "Prompt compression with token/energy/CO2 savings", long_about = None)]
struct Cli {
    /// Verbose mode
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a prompt (or a batch file) and report savings
    Compress(CompressArgs),

    /// Run the HTTP API server
    Serve {
        /// Listen address
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: SocketAddr,
    },
}

#[derive(Args)]
struct CompressArgs {
    /// Prompt text; read from stdin when omitted
    prompt: Option<String>,

    /// Filler rules file (JSON list of pattern/replacement pairs);
    /// built-in rules are used when omitted
    #[arg(long)]
    fillers: Option<PathBuf>,

    /// Equivalence gate threshold
    #[arg(long, default_value_t = 0.80)]
    threshold: f32,

    /// Keep at most this many sentences (adaptive when omitted)
    #[arg(long)]
    max_sentences: Option<usize>,

    /// Stop extraction once this token ratio of the cleaned text is kept
    #[arg(long)]
    min_keep_ratio: Option<f32>,

    /// Grid zone for carbon intensity (e.g. US-CAL-CISO, FR, DE)
    #[arg(long, default_value = "US-CAL-CISO")]
    zone: String,

    /// File with one prompt per line, compressed concurrently
    #[arg(long)]
    batch: Option<PathBuf>,

    /// Worker count for batch mode
    #[arg(long, default_value_t = 4)]
    concurrency: usize,

    /// Output as JSON (machine-readable)
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Compress(args) => compress_command(args).await,
        Commands::Serve { addr } => gp_server::serve(addr).await,
    }
}

async fn compress_command(args: CompressArgs) -> Result<()> {
    let config = CompressorConfig {
        similarity_threshold: args.threshold,
        max_sentences: args.max_sentences,
        min_keep_ratio: args.min_keep_ratio,
        ..Default::default()
    };
    let rules = match &args.fillers {
        Some(path) => load_filler_rules(path)?,
        None => FillerRuleEngine::default_rules(),
    };
    let pipeline = Arc::new(CompressionPipeline::new(
        &config,
        &rules,
        Arc::new(HashEmbedder::default()),
    )?);
    let estimator = SavingsEstimator::for_zone(&args.zone);

    if let Some(path) = &args.batch {
        return compress_batch(pipeline, estimator, path, args.concurrency, args.json).await;
    }

    let prompt = match args.prompt {
        Some(p) => p,
        None => read_stdin()?,
    };
    if prompt.trim().is_empty() {
        anyhow::bail!("no prompt provided");
    }

    let result = pipeline.compress(&prompt).await;
    if args.json {
        print_json(&result, &estimator)?;
    } else {
        print_report(&result, &estimator);
    }
    Ok(())
}

/// Worker-pool batch mode: each prompt is an independent run sharing the
/// read-only pipeline; output lines match input order.
async fn compress_batch(
    pipeline: Arc<CompressionPipeline>,
    estimator: SavingsEstimator,
    path: &PathBuf,
    concurrency: usize,
    json: bool,
) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read batch file {}", path.display()))?;
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));

    let handles: Vec<_> = content
        .lines()
        .map(|line| {
            let line = line.to_string();
            let pipeline = pipeline.clone();
            let semaphore = semaphore.clone();
            tokio::spawn(async move {
                let _permit = semaphore.acquire().await?;
                Ok::<_, tokio::sync::AcquireError>(pipeline.compress(&line).await)
            })
        })
        .collect();

    let mut total_saved = 0usize;
    for handle in handles {
        let result = handle.await??;
        total_saved += result.tokens_saved();
        if json {
            print_json(&result, &estimator)?;
        } else {
            println!(
                "{} -> {} tokens ({}) | {}",
                result.original_tokens,
                result.compressed_tokens,
                if result.accepted { "accepted" } else { "fallback" },
                result.compressed_text
            );
        }
    }

    if !json {
        let savings = estimator.estimate(total_saved);
        println!();
        println!("Total tokens saved: {}", savings.tokens_saved);
        println!("Energy saved:       {:.6} Wh", savings.energy_wh);
        println!("CO2 saved:          {:.6} g", savings.co2_grams);
        println!("Cost saved:         ${:.6}", savings.cost_saved_usd);
    }
    Ok(())
}

fn print_json(result: &CompressionResult, estimator: &SavingsEstimator) -> Result<()> {
    let savings = estimator.estimate(result.tokens_saved());
    let mut value = serde_json::to_value(result)?;
    value["savings"] = serde_json::to_value(savings)?;
    println!("{}", serde_json::to_string(&value)?);
    Ok(())
}

fn print_report(result: &CompressionResult, estimator: &SavingsEstimator) {
    let savings = estimator.estimate(result.tokens_saved());

    println!("Original tokens:   {}", result.original_tokens);
    println!(
        "Cleaned tokens:    {}",
        gp_core::estimate_tokens(&result.cleaned_text)
    );
    println!("Compressed tokens: {}", result.compressed_tokens);
    println!("Tokens saved:      {}", result.tokens_saved());
    println!("Reduction:         {:.1}%", result.reduction_pct());
    println!();
    println!(
        "Semantic similarity: {:.3} ({})",
        result.similarity,
        if result.accepted { "accepted" } else { "rejected, returning cleaned text" }
    );
    println!();
    println!("Energy saved: {:.6} Wh", savings.energy_wh);
    println!(
        "CO2 saved:    {:.6} g (grid: {:.0} gCO2eq/kWh)",
        savings.co2_grams, estimator.grid_gco2_per_kwh
    );
    println!("Cost saved:   ${:.6}", savings.cost_saved_usd);
    println!();
    println!("Compressed prompt:");
    println!("{}", result.compressed_text);

    if !result.accepted {
        println!();
        println!("Note: the extracted version failed the similarity gate;");
        println!("the filler-cleaned text above is the safe fallback.");
    }
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read prompt from stdin")?;
    Ok(buf)
}
