//! Diagnose command handler
//!
//! Runs the same connectivity probes as `GET /diagnostics`.

use crate::config::Config;
use crate::diagnostics::{
    default_probes, run_probes, DiagnosticsReport, EnvironmentSummary, OverallStatus,
};
use crate::error::Result;
use crate::llm::build_generator;
use clap::Args;

/// Diagnose command arguments
#[derive(Args)]
pub struct DiagnoseArgs {
    /// Print the raw JSON report
    #[arg(long)]
    pub json: bool,
}

/// Run the diagnose command
pub async fn run(args: DiagnoseArgs) -> Result<()> {
    let config = Config::load_resolved()?;
    let generator = build_generator(&config)?;
    let probes = default_probes(&config, generator)?;

    let report = run_probes(&probes, EnvironmentSummary::from_config(&config)).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall_status == OverallStatus::IssuesDetected {
        std::process::exit(1);
    }
    Ok(())
}

fn print_report(report: &DiagnosticsReport) {
    println!("training-mapper v{}", report.environment.version);
    println!(
        "Model: {} | API key: {}",
        report.environment.model,
        if report.environment.has_gemini_key {
            "configured"
        } else {
            "missing"
        }
    );
    println!();

    for (name, result) in &report.tests {
        println!("  {:20} {:?}", name, result.status);
        if let Some(message) = &result.message {
            println!("    {}", message);
        }
        if let Some(error) = &result.error {
            println!("    error: {}", error);
        }
        if let Some(solution) = &result.solution {
            println!("    fix: {}", solution);
        }
    }

    println!();
    println!(
        "Overall: {:?} ({} of {} failed)",
        report.overall_status, report.failed_test_count, report.total_test_count
    );
}
