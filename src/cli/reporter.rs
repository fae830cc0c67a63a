// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use crate::document::{Document, GEOMETRY_TAG};
use crate::geometry::PointCloud;
use crate::pipeline::{BatchReport, Outcome};
use colored::*;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Report a processed batch: one line per failed record, then totals
    pub fn report_batch(report: &BatchReport) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!(
            "{} {} points per surface, {} mode",
            "Batch:".bold(),
            report.samples.to_string().cyan(),
            if report.as_chunks { "chunk" } else { "combine" }.cyan()
        );
        println!("{}", "━".repeat(80).bright_black());

        for record in report.failures() {
            let target = record.uri.as_deref().unwrap_or(record.id.as_str());
            match &record.outcome {
                Outcome::Skipped { reason } => {
                    println!("  {} {} {}", "⏭".yellow(), target, reason.bright_black());
                }
                Outcome::Rejected {
                    stage,
                    kind,
                    reason,
                } => {
                    println!(
                        "  {} {} {}",
                        "❌".red(),
                        target,
                        format!("[{} after {}]", kind, stage).bright_black()
                    );
                    println!("     {}", reason.red());
                }
                Outcome::Accepted => {}
            }
        }

        println!("\n{}", "Summary:".bold());
        println!(
            "  {} {}",
            "Accepted:".bright_black(),
            report.accepted.to_string().green()
        );
        if report.skipped > 0 {
            println!(
                "  {} {}",
                "Skipped:".bright_black(),
                report.skipped.to_string().yellow()
            );
        }
        if report.rejected > 0 {
            println!(
                "  {} {}",
                "Rejected:".bright_black(),
                report.rejected.to_string().red()
            );
        }

        let rate = report.acceptance_rate();
        let rate_str = format!("{:.1}%", rate);
        let rate_str = if rate >= 100.0 {
            rate_str.green()
        } else if rate > 0.0 {
            rate_str.yellow()
        } else {
            rate_str.red()
        };
        println!(
            "  {} {} of {} in {}",
            "Acceptance:".bright_black(),
            rate_str,
            report.total,
            Self::format_duration(report.duration).yellow()
        );
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Report the point clouds of one sampled document
    pub fn report_document(document: &Document) {
        let label = document.uri().unwrap_or(document.id.as_str());
        println!("{} {}", "Sampled:".bold(), label.cyan());

        if let Some(tensor) = &document.tensor {
            Self::print_cloud("tensor", tensor);
        }
        for chunk in &document.chunks {
            if let Some(tensor) = &chunk.tensor {
                let name = chunk
                    .tags
                    .get(GEOMETRY_TAG)
                    .map(String::as_str)
                    .unwrap_or("chunk");
                Self::print_cloud(name, tensor);
            }
        }
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("\n{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    fn print_cloud(name: &str, cloud: &PointCloud) {
        let (rows, cols) = cloud.shape();
        let bbox = cloud.bounding_box();
        println!(
            "  {} ({}, {})  {} [{:.3}, {:.3}, {:.3}] .. [{:.3}, {:.3}, {:.3}]",
            format!("{}:", name).bright_black(),
            rows.to_string().cyan(),
            cols,
            "bounds".bright_black(),
            bbox.min.x,
            bbox.min.y,
            bbox.min.z,
            bbox.max.x,
            bbox.max.y,
            bbox.max.z
        );
    }

    /// Format duration for display
    pub fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }

    /// Print success message
    pub fn success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }
}
