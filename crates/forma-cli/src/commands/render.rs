//! Full pipeline command

use anyhow::{Context, Result};
use forma_pipeline::{FormaConfig, Pipeline, PipelineOutcome, PipelineSession};

use super::load_inventory;

pub struct RenderArgs {
    pub tree: String,
    pub inventory: Option<String>,
    pub intent: String,
    pub self_assessment: Option<f64>,
    pub approve: bool,
    pub output: Option<String>,
}

pub async fn run(args: RenderArgs) -> Result<()> {
    let config = FormaConfig::load()?;
    let inventory = load_inventory(args.inventory.as_deref())?;
    let json = std::fs::read_to_string(&args.tree)
        .with_context(|| format!("Failed to read {}", args.tree))?;

    let pipeline = Pipeline::new(config, inventory);
    let mut session = PipelineSession::default();

    let cancel = session.cancel_token();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let result = pipeline
        .run_json(&args.intent, &json, args.self_assessment, &mut session)
        .await;
    ctrl_c.abort();

    let mut outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{}", e.guidance());
            eprintln!("  {}", e.remediation());
            return Err(e.into());
        }
    };
    if args.approve {
        outcome = outcome.approve();
    }

    print_outcome(&outcome);

    let report = serde_json::to_string_pretty(&outcome)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, report).with_context(|| format!("Failed to write {}", path))?;
            eprintln!("Report written to {}", path);
        }
        None => println!("{}", report),
    }

    if matches!(outcome, PipelineOutcome::Rejected { .. }) {
        std::process::exit(1);
    }
    Ok(())
}

fn print_outcome(outcome: &PipelineOutcome) {
    match outcome {
        PipelineOutcome::Rejected {
            validation,
            guidance,
            ..
        } => {
            eprintln!("Rejected: {}", guidance);
            for error in &validation.errors {
                eprintln!("  {}", error);
            }
        }
        PipelineOutcome::NeedsClarification { score, questions, .. } => {
            eprintln!(
                "Confidence {:.2} is too low to build this design.",
                score.final_score
            );
            for question in questions {
                eprintln!("  ? {}", question);
            }
        }
        PipelineOutcome::AwaitingApproval { run } | PipelineOutcome::Applied { run } => {
            eprintln!(
                "{} (confidence {:.2}, resolution {})",
                outcome.status(),
                run.score.final_score,
                run.resolution.summary.quality_rating
            );
            eprintln!(
                "  {} node(s) built, {} render error(s), {} audit warning(s), {} fix(es)",
                run.render.root.node_count(),
                run.render.errors.len(),
                run.audit.warnings.len(),
                run.fixes.records.len()
            );
            for recommendation in &run.resolution.summary.recommendations {
                eprintln!("  - {}", recommendation);
            }
        }
    }
}
