//! Intent tree validation command

use anyhow::{Context, Result};
use forma_constraint::{Fixer, ValidationReport, Validator};
use forma_core::Severity;
use forma_pipeline::FormaConfig;

use super::load_inventory;

pub struct ValidateArgs {
    pub tree: String,
    pub inventory: Option<String>,
    pub dry_run: bool,
    pub format: String,
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let config = FormaConfig::load()?;
    let inventory = load_inventory(args.inventory.as_deref())?;
    let index = inventory.index();
    let json = std::fs::read_to_string(&args.tree)
        .with_context(|| format!("Failed to read {}", args.tree))?;

    let validator = Validator::new(&index, config.validation);
    let (tree, report) = validator.validate_json(&json);

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report_text(&report);
    }

    if args.dry_run {
        if let Some(tree) = tree.as_ref().filter(|_| report.is_valid()) {
            let fixes = Fixer::new(&inventory.guidelines, config.fixer).dry_run(tree);
            if fixes.is_empty() {
                println!("\nNo fixes would be applied.");
            } else {
                println!("\nFixes that would be applied:");
                for record in &fixes.records {
                    println!(
                        "  [{:?}] {}: {} -> {}",
                        record.fix_type, record.node_id, record.before, record.after
                    );
                }
            }
        }
    }

    if !report.is_valid() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_report_text(report: &ValidationReport) {
    println!("{}", report.summary());
    if report.errors.is_empty() && report.warnings.is_empty() {
        return;
    }
    println!();

    for diagnostic in report.errors.iter().chain(&report.warnings) {
        let severity_str = match diagnostic.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN ",
            Severity::Info => "INFO ",
        };
        println!(
            "  [{}] {}: {}",
            severity_str,
            diagnostic.node_id.as_deref().unwrap_or("-"),
            diagnostic.message
        );
        if let Some(detail) = &diagnostic.detail {
            println!("          {}", detail);
        }
        println!("          {}", diagnostic.remediation);
    }
}
