//! Pipeline orchestration
//!
//! Validator -> Confidence Scorer -> Resolver -> Auditor -> Fixer -> Translator.
//! Stages run in order on one tree; the inventory is read-only throughout.

use crate::config::FormaConfig;
use crate::score::{ConfidenceScore, ConfidenceScorer, Route};
use crate::session::PipelineSession;
use forma_constraint::{AuditReport, Auditor, FixReport, Fixer, ValidationReport, Validator};
use forma_core::{FormaError, Result};
use forma_gen::{GenerationBackend, GenerationQueue, GenerationRequest};
use forma_intent::{IntentNode, Inventory};
use forma_render::{RenderOutput, Translator};
use forma_resolve::{ResolutionReport, Resolver};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Everything produced by a run that reached the translator
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    /// The tree after resolution and fixes
    pub tree: IntentNode,
    pub validation: ValidationReport,
    pub score: ConfidenceScore,
    pub resolution: ResolutionReport,
    pub audit: AuditReport,
    pub fixes: FixReport,
    pub render: RenderOutput,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineOutcome {
    /// The tree could not be read or has blocking errors
    Rejected {
        validation: ValidationReport,
        score: Option<ConfidenceScore>,
        guidance: String,
    },
    /// Confidence too low to build anything; ask the user instead
    NeedsClarification {
        validation: ValidationReport,
        score: ConfidenceScore,
        questions: Vec<String>,
    },
    /// Built, but should be previewed before it is applied
    AwaitingApproval { run: Box<PipelineRun> },
    Applied { run: Box<PipelineRun> },
}

impl PipelineOutcome {
    pub fn run(&self) -> Option<&PipelineRun> {
        match self {
            PipelineOutcome::AwaitingApproval { run } | PipelineOutcome::Applied { run } => {
                Some(run)
            }
            PipelineOutcome::Rejected { .. } | PipelineOutcome::NeedsClarification { .. } => None,
        }
    }

    /// Accept a previewed run
    pub fn approve(self) -> Self {
        match self {
            PipelineOutcome::AwaitingApproval { run } => PipelineOutcome::Applied { run },
            other => other,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            PipelineOutcome::Rejected { .. } => "rejected",
            PipelineOutcome::NeedsClarification { .. } => "needs_clarification",
            PipelineOutcome::AwaitingApproval { .. } => "awaiting_approval",
            PipelineOutcome::Applied { .. } => "applied",
        }
    }
}

pub struct Pipeline {
    config: FormaConfig,
    inventory: Inventory,
    queue: Option<GenerationQueue>,
}

impl Pipeline {
    pub fn new(config: FormaConfig, inventory: Inventory) -> Self {
        Self {
            config,
            inventory,
            queue: None,
        }
    }

    /// Attach a generator; its calls go through a `GenerationQueue`
    pub fn with_backend(mut self, backend: Arc<dyn GenerationBackend>) -> Self {
        self.queue = Some(GenerationQueue::new(backend, self.config.generation.clone()));
        self
    }

    pub fn config(&self) -> &FormaConfig {
        &self.config
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Ask the generator for a tree, then run it
    pub async fn generate_and_run(
        &self,
        intent: &str,
        session: &mut PipelineSession,
    ) -> Result<PipelineOutcome> {
        let queue = self
            .queue
            .as_ref()
            .ok_or_else(|| FormaError::Config("no generation backend configured".to_string()))?;

        let mut request = GenerationRequest::new(intent);
        request.component_names = self
            .inventory
            .components
            .iter()
            .map(|c| c.name.clone())
            .collect();

        let design = queue.submit(&request).await?;
        info!(backend = %queue.backend_name(), "Received generated design");
        self.run_json(intent, &design.tree_json, design.self_assessment, session)
            .await
    }

    /// Run raw JSON; unreadable input is rejected, not an error
    pub async fn run_json(
        &self,
        intent: &str,
        tree_json: &str,
        self_assessment: Option<f64>,
        session: &mut PipelineSession,
    ) -> Result<PipelineOutcome> {
        let index = self.inventory.index();
        let validator = Validator::new(&index, self.config.validation);
        let (tree, validation) = validator.validate_json(tree_json);
        let Some(tree) = tree else {
            return Ok(reject(validation, None));
        };
        self.run_validated(intent, tree, validation, self_assessment, session)
            .await
    }

    pub async fn run(
        &self,
        intent: &str,
        mut tree: IntentNode,
        self_assessment: Option<f64>,
        session: &mut PipelineSession,
    ) -> Result<PipelineOutcome> {
        let index = self.inventory.index();
        let validation = Validator::new(&index, self.config.validation).validate(&mut tree);
        self.run_validated(intent, tree, validation, self_assessment, session)
            .await
    }

    async fn run_validated(
        &self,
        intent: &str,
        mut tree: IntentNode,
        validation: ValidationReport,
        self_assessment: Option<f64>,
        session: &mut PipelineSession,
    ) -> Result<PipelineOutcome> {
        let index = self.inventory.index();
        let scorer = ConfidenceScorer::new(self.config.scoring);
        let score = scorer.score(intent, &tree, &validation, self_assessment);

        if !validation.is_valid() {
            return Ok(reject(validation, Some(score)));
        }
        if score.route == Route::RequestClarification {
            info!(score = score.final_score, "Confidence too low; asking for clarification");
            let questions = clarifying_questions(&score);
            return Ok(PipelineOutcome::NeedsClarification {
                validation,
                score,
                questions,
            });
        }

        let resolution = Resolver::new(self.config.resolver, self.config.tokens)
            .resolve_tree(&mut tree, &index)?;
        let audit = Auditor::new(&index).audit(&tree);
        let fixes = Fixer::new(&self.inventory.guidelines, self.config.fixer).fix(&mut tree);
        info!(fixes = fixes.records.len(), "Fixes applied");

        let translator = Translator::new(&index, self.config.render.clone());
        let cancel = session.cancel_token();
        let render = translator.translate(&tree, &mut session.render, &cancel).await?;

        let route = score.route;
        let run = Box::new(PipelineRun {
            tree,
            validation,
            score,
            resolution,
            audit,
            fixes,
            render,
        });
        Ok(match route {
            Route::AutoApply => PipelineOutcome::Applied { run },
            Route::PreviewForApproval | Route::RequestClarification => {
                PipelineOutcome::AwaitingApproval { run }
            }
        })
    }
}

fn reject(validation: ValidationReport, score: Option<ConfidenceScore>) -> PipelineOutcome {
    let guidance = FormaError::ValidationFailed {
        errors: validation.error_count(),
    }
    .guidance();
    info!(errors = validation.error_count(), "Design rejected");
    PipelineOutcome::Rejected {
        validation,
        score,
        guidance,
    }
}

fn clarifying_questions(score: &ConfidenceScore) -> Vec<String> {
    let factors = &score.factors;
    let mut questions = Vec::new();
    if factors.ambiguity < 0.7 {
        questions.push(
            "Could you describe the screen in more detail, such as its sections and main action?"
                .to_string(),
        );
    }
    if factors.complexity_match < 0.5 {
        questions.push(
            "The layout does not match the size of the request. Should it be simpler or more detailed?"
                .to_string(),
        );
    }
    if factors.unknown_elements < 1.0 {
        questions.push(
            "Some requested elements were not recognised. Which components should they use?"
                .to_string(),
        );
    }
    if questions.is_empty() {
        questions.push("Could you confirm what this screen should contain?".to_string());
    }
    questions
}
