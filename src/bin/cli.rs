// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polycloud CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use polycloud::cli::Reporter;
use polycloud::document::FILE_FORMAT_TAG;
use polycloud::{BatchReport, Coordinator, Document, LoaderConfig, Parameters};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "polycloud")]
#[command(about = "Sample fixed-size point clouds from mesh surfaces", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./polycloud.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample mesh files, urls or data uris
    Sample {
        /// Paths, http(s) urls or data: uris
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Points per surface
        #[arg(short, long)]
        samples: Option<usize>,

        /// One point cloud per geometry instead of one per input
        #[arg(long)]
        as_chunks: bool,

        /// Fixed sampling seed
        #[arg(long)]
        seed: Option<u64>,

        /// Format of inputs without a usable extension (glb, gltf, stl, 3mf, zip)
        #[arg(short, long)]
        format: Option<String>,

        /// Keep data uris in the output documents
        #[arg(long)]
        keep_content: bool,

        /// Write the sampled documents as JSON
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Process a JSON array of documents
    Process {
        /// Input documents (JSON array)
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Documents per batch; batches run in parallel
        #[arg(short, long, default_value = "32")]
        batch_size: usize,

        /// Per-call parameters as a JSON object
        #[arg(short, long)]
        params: Option<String>,

        /// Write the batch report as JSON
        #[arg(short, long, value_name = "FILE")]
        report: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => LoaderConfig::from_file(path)?,
        None => LoaderConfig::load()?,
    };

    match cli.command {
        Commands::Sample {
            inputs,
            samples,
            as_chunks,
            seed,
            format,
            keep_content,
            output,
        } => {
            let mut params = Parameters::new().as_chunks(as_chunks);
            params.samples = samples;
            params.seed = seed;
            if keep_content {
                params = params.drop_content(false);
            }
            sample_command(config, &inputs, format.as_deref(), &params, output.as_deref())?;
        }
        Commands::Process {
            input,
            output,
            batch_size,
            params,
            report,
        } => {
            let params = match params {
                Some(json) => Parameters::from_json(&json)?,
                None => Parameters::new(),
            };
            process_command(
                config,
                &input,
                output.as_deref(),
                batch_size,
                &params,
                report.as_deref(),
                cli.verbose,
            )?;
        }
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "polycloud=debug" } else { "polycloud=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn sample_command(
    config: LoaderConfig,
    inputs: &[String],
    format: Option<&str>,
    params: &Parameters,
    output: Option<&Path>,
) -> Result<()> {
    let documents: Vec<Document> = inputs
        .iter()
        .map(|input| {
            let document = Document::from_uri(input.as_str());
            match format {
                Some(format) => document.with_tag(FILE_FORMAT_TAG, format),
                None => document,
            }
        })
        .collect();

    let coordinator = Coordinator::new(config);
    let (sampled, report) = coordinator.process_with_report(documents, params)?;

    for document in &sampled {
        Reporter::report_document(document);
    }
    Reporter::report_batch(&report);

    if let Some(path) = output {
        write_documents(&sampled, Some(path))?;
        Reporter::success(&format!("Wrote {} documents to {}", sampled.len(), path.display()));
    }

    exit_on_total_failure(&report);
    Ok(())
}

fn process_command(
    config: LoaderConfig,
    input: &Path,
    output: Option<&Path>,
    batch_size: usize,
    params: &Parameters,
    report_path: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read documents: {}", input.display()))?;
    let documents: Vec<Document> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse documents: {}", input.display()))?;

    let batches: Vec<Vec<Document>> = documents
        .chunks(batch_size.max(1))
        .map(|chunk| chunk.to_vec())
        .collect();

    let progress = if verbose {
        let pb = ProgressBar::new(documents.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let coordinator = Coordinator::new(config);
    let results: Vec<_> = batches
        .into_par_iter()
        .map(|batch| {
            let len = batch.len() as u64;
            let result = coordinator.process_with_report(batch, params);
            if let Some(ref pb) = progress {
                pb.inc(len);
            }
            result
        })
        .collect();

    if let Some(pb) = progress {
        pb.finish_with_message("Sampling complete");
    }

    let mut sampled = Vec::new();
    let mut report: Option<BatchReport> = None;
    for result in results {
        let (documents, batch_report) = result?;
        sampled.extend(documents);
        match report.as_mut() {
            Some(report) => report.absorb(batch_report),
            None => report = Some(batch_report),
        }
    }

    write_documents(&sampled, output)?;

    if let Some(report) = report {
        // Documents go to stdout when no output file is given.
        if output.is_some() {
            Reporter::report_batch(&report);
        }
        if let Some(path) = report_path {
            std::fs::write(path, serde_json::to_string_pretty(&report)?)
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
        }
        exit_on_total_failure(&report);
    } else {
        Reporter::report_warning("No documents to process");
    }

    Ok(())
}

fn write_documents(documents: &[Document], output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(documents)?;
    match output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("Failed to write documents: {}", path.display()))?,
        None => println!("{}", json),
    }
    Ok(())
}

fn exit_on_total_failure(report: &BatchReport) {
    if report.total > 0 && report.accepted == 0 {
        Reporter::report_error("No document could be sampled");
        std::process::exit(1);
    }
}
