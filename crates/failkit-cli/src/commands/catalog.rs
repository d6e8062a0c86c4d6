//! Catalogue commands
//!
//! Usage: failkit catalog check <PATH>
//!        failkit catalog export <PATH> [--output <FILE>]

use clap::{Args, Subcommand};
use failkit_core::catalog::CatalogReport;
use failkit_core::{Allocator, Catalog, Registry};
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommand,
}

#[derive(Debug, Subcommand)]
pub enum CatalogCommand {
    /// Validate a catalogue against the allocation rules
    Check(CheckArgs),
    /// Validate a catalogue and write its identifiers as JSON
    Export(ExportArgs),
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Path to the catalogue TOML file
    pub path: PathBuf,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Path to the catalogue TOML file
    pub path: PathBuf,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute catalog command
pub fn execute(args: CatalogArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        CatalogCommand::Check(check_args) => execute_check(check_args),
        CatalogCommand::Export(export_args) => execute_export(export_args),
    }
}

/// Allocate the catalogue into a scratch allocator and registry
fn apply(path: &Path) -> Result<(Allocator, CatalogReport), Box<dyn std::error::Error>> {
    let catalog = Catalog::load(path)?;
    let allocator = Allocator::new();
    let registry = Registry::new(format!("failkit-cli:{}", path.display()))?;

    tracing::debug!(
        component = module_path!(),
        path = %path.display(),
        entries = catalog.ids.len(),
        "applying catalogue"
    );
    let report = catalog.apply(&allocator, &registry);
    Ok((allocator, report))
}

fn print_problems(report: &CatalogReport) {
    for violation in &report.violations {
        eprintln!("✗ {}: {}", violation.name, violation.error);
    }
    for failure in &report.registration_failures {
        eprintln!("✗ {}", failure);
    }
    if let Some(audit) = &report.audit {
        eprintln!("✗ {}", audit);
    }
}

fn problem_count(report: &CatalogReport) -> usize {
    report.violations.len()
        + report.registration_failures.len()
        + usize::from(report.audit.is_some())
}

/// Execute catalog check
fn execute_check(args: CheckArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (_allocator, report) = apply(&args.path)?;

    for id in &report.allocated {
        println!("✓ {} {}", id, id.name());
    }
    print_problems(&report);

    if !report.is_clean() {
        return Err(format!(
            "{} problem(s) in {}",
            problem_count(&report),
            args.path.display()
        )
        .into());
    }

    println!("{} identifier(s) OK", report.allocated.len());
    Ok(())
}

/// Execute catalog export
fn execute_export(args: ExportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (allocator, report) = apply(&args.path)?;

    if !report.is_clean() {
        print_problems(&report);
        return Err(format!(
            "refusing to export {}: {} problem(s)",
            args.path.display(),
            problem_count(&report)
        )
        .into());
    }

    let json = allocator.export_json()?;
    match args.output {
        Some(output) => {
            std::fs::write(&output, json)?;
            println!(
                "✓ Exported {} identifier(s) to {}",
                report.allocated.len(),
                output.display()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}
