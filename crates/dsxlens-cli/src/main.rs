use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dsxlens_archive::{write_archive, BatchOutcome, BatchProcessor};
use dsxlens_core::{Config, JobInfo, ValidationReport};
use dsxlens_engine::{DsxExtractor, TokenEstimate, Validator};
use dsxlens_parser::FlowGraph;

/// DsxLens - structured extraction of DSX job exports
#[derive(Parser)]
#[command(name = "dsxlens")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: dsxlens.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a job and print it as JSON
    Parse {
        /// DSX export to read
        file: PathBuf,

        /// Write the JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Include a token estimate in the metadata
        #[arg(short, long)]
        estimate: bool,
    },

    /// Check the extracted job for structural problems
    Validate {
        /// DSX export to read
        file: PathBuf,
    },

    /// Estimate the token size of the extracted job
    Estimate {
        /// DSX export to read
        file: PathBuf,
    },

    /// Show the stages upstream and downstream of a stage
    Lineage {
        /// DSX export to read
        file: PathBuf,

        /// Stage name
        stage: String,
    },

    /// Extract every job in a directory or zip archive
    Batch {
        /// Directory, zip archive, or single DSX file
        path: PathBuf,

        /// Zip file receiving one JSON entry per job
        #[arg(short, long, default_value = "jobs.zip")]
        output: PathBuf,

        /// Include token estimates in the metadata
        #[arg(short, long)]
        estimate: bool,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else if Path::new("dsxlens.toml").exists() {
        Config::from_file(Path::new("dsxlens.toml")).context("Failed to load dsxlens.toml")?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Parse { file, output, estimate } => {
            parse_command(&config, &file, output.as_deref(), estimate, cli.verbose)
        }
        Commands::Validate { file } => validate_command(&config, &file),
        Commands::Estimate { file } => estimate_command(&config, &file),
        Commands::Lineage { file, stage } => lineage_command(&config, &file, &stage),
        Commands::Batch { path, output, estimate } => {
            batch_command(&config, &path, &output, estimate, cli.verbose)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Read a DSX file and extract its job
fn load_job(config: &Config, file: &Path, estimate: bool) -> Result<JobInfo> {
    let bytes = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let document = String::from_utf8_lossy(&bytes);

    Ok(DsxExtractor::new(config.clone()).extract(&document, estimate))
}

fn render_json(config: &Config, job: &JobInfo) -> Result<String> {
    let json = if config.output.pretty {
        serde_json::to_string_pretty(job)?
    } else {
        serde_json::to_string(job)?
    };
    Ok(json)
}

/// Parse command - print the extracted job
fn parse_command(
    config: &Config,
    file: &Path,
    output: Option<&Path>,
    estimate: bool,
    verbose: bool,
) -> Result<()> {
    let job = load_job(config, file, estimate)?;
    let json = render_json(config, &job)?;

    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            if verbose {
                eprintln!("{} {}", "Job saved to:".green(), path.display());
            }
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Validate command - exits non-zero when issues are found
fn validate_command(config: &Config, file: &Path) -> Result<()> {
    let job = load_job(config, file, false)?;
    let report = Validator::validate(&job);

    print_validation_report(&job, &report);

    if !report.valid {
        std::process::exit(1);
    }
    Ok(())
}

/// Estimate command - per-section token breakdown
fn estimate_command(config: &Config, file: &Path) -> Result<()> {
    let job = load_job(config, file, false)?;
    let estimate = TokenEstimate::for_job(&job, config.estimate.chars_per_token);

    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Token Estimate".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("{} {}", "Job:".bold(), display_name(&job).green());
    println!("{} {}", "Total tokens:".bold(), estimate.total.to_string().yellow());
    println!("  {:<20} {:>8}", "basic", estimate.basic);

    for section in &estimate.sections {
        println!("  {:<20} {:>8}   ({} chars)", section.section, section.tokens, section.chars);
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());
    Ok(())
}

/// Lineage command - walk the flow graph around one stage
fn lineage_command(config: &Config, file: &Path, stage: &str) -> Result<()> {
    let job = load_job(config, file, false)?;
    let graph = FlowGraph::from_flow(&job.flow);

    if !graph.contains(stage) && !job.stage_names().contains(&stage) {
        return Err(anyhow::anyhow!(
            "Stage '{}' not found in job '{}'",
            stage,
            display_name(&job)
        ));
    }

    let upstream = graph.upstream(stage);
    let downstream = graph.downstream(stage);

    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Stage Lineage".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("{} {}", "Stage:".bold(), stage.green());
    println!();

    print_stage_list("Upstream stages:", &upstream);
    print_stage_list("Downstream stages:", &downstream);

    if upstream.is_empty() && downstream.is_empty() {
        println!("{}", "⚠ Stage is not connected to any flow".yellow().bold());
        println!();
    }

    println!("{}", "=".repeat(60).bright_blue());
    Ok(())
}

fn print_stage_list(title: &str, stages: &[String]) {
    println!("{} {}", title.bold(), stages.len());
    for (i, name) in stages.iter().enumerate() {
        println!("  {}. {}", i + 1, name.yellow());
    }
    println!();
}

/// Batch command - extract a tree or archive into a zip of JSON files
fn batch_command(config: &Config, path: &Path, output: &Path, estimate: bool, verbose: bool) -> Result<()> {
    if verbose {
        eprintln!("{} {}", "Processing:".cyan(), path.display());
    }

    let outcome = BatchProcessor::new(config.clone())
        .with_estimate(estimate)
        .process_path(path);

    write_archive(&outcome.results, output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    print_batch_summary(&outcome, output);

    if !outcome.is_clean() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_batch_summary(outcome: &BatchOutcome, output: &Path) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Batch Extraction Report".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    let invalid = outcome.results.iter().filter(|r| !r.validation.valid).count();

    println!("{}", "Summary:".bold());
    println!("  Jobs extracted: {}", outcome.results.len().to_string().green());
    if invalid > 0 {
        println!("  With issues:    {}", invalid.to_string().yellow());
    } else {
        println!("  With issues:    {}", invalid.to_string().green());
    }
    if outcome.failures.is_empty() {
        println!("  Failures:       {}", "0".green());
    } else {
        println!("  Failures:       {}", outcome.failures.len().to_string().red().bold());
    }
    println!();

    for processed in outcome.results.iter().filter(|r| !r.validation.valid) {
        println!("  {} {}", processed.source_name.yellow(), display_name(&processed.job));
        for issue in &processed.validation.issues {
            println!("    [{}] {}", issue.code.as_str().yellow(), issue.message);
        }
    }

    for failure in &outcome.failures {
        println!("  [{}] {}", "FAILED".red().bold(), failure);
    }

    println!();
    println!("{} {}", "Archive saved to:".green(), output.display());
    println!("{}", "=".repeat(60).bright_blue());
}

/// Print validation report to stdout
fn print_validation_report(job: &JobInfo, report: &ValidationReport) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Job Validation Report".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("{} {}", "Job:".bold(), display_name(job).green());
    println!("{} {}", "Type:".bold(), job.job_type.label());
    println!(
        "{} {} sources, {} targets, {} links",
        "Stages:".bold(),
        job.sources.len(),
        job.targets.len(),
        job.flow.len()
    );
    println!();

    if report.valid {
        println!("{}", "✓ No issues found!".green().bold());
    } else {
        println!("{}", "Issues:".bold());
        for issue in &report.issues {
            println!("  [{}] {}", issue.code.as_str().red().bold(), issue.message);
        }
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());
}

fn display_name(job: &JobInfo) -> &str {
    if job.name.is_empty() {
        "(unnamed)"
    } else {
        &job.name
    }
}
