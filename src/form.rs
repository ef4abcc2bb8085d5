use crate::controller::{AuditController, AuditPhase, Submission};
use crate::error::{AuditError, Result};
use crate::output;
use crate::service::AnalysisService;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

pub const PLACEHOLDER: &str = "https://example.com/article";

/// URL input and the submit control.
#[derive(Debug, Clone, Default)]
pub struct AuditForm {
    input: String,
}

/// Totals for an interactive run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormSummary {
    pub submitted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub refused: usize,
}

impl AuditForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input = value.into();
    }

    pub fn submit_enabled(phase: &AuditPhase) -> bool {
        !phase.is_loading()
    }

    pub fn submit_label(phase: &AuditPhase) -> &'static str {
        if Self::submit_enabled(phase) {
            "Audit Page"
        } else {
            "Analyzing..."
        }
    }

    /// Hands the current input to the controller, exactly as typed.
    pub fn begin<S: AnalysisService>(
        &self,
        controller: &mut AuditController<S>,
    ) -> Result<Submission> {
        if !controller.can_submit() {
            return Err(AuditError::Busy);
        }
        controller.begin(&self.input)
    }
}

fn prompt(phase: &AuditPhase) -> std::io::Result<()> {
    print!("URL ({}) [{}]> ", PLACEHOLDER, AuditForm::submit_label(phase));
    std::io::stdout().flush()
}

fn refuse(summary: &mut FormSummary, err: &AuditError) {
    summary.refused += 1;
    println!("Error: {}", err.user_message());
}

/// Reads one URL per line and audits each in turn until EOF or `quit`.
///
/// Input keeps being read while a request is in flight; lines that arrive
/// then are refused as `Busy` and dropped.
pub async fn run_interactive<S, R>(
    controller: &mut AuditController<S>,
    input: R,
    as_json: bool,
) -> Result<FormSummary>
where
    S: AnalysisService,
    R: AsyncBufRead + Unpin,
{
    let mut form = AuditForm::new();
    let mut summary = FormSummary::default();
    let mut lines = input.lines();
    let mut input_closed = false;

    info!(action = "start", component = "audit_form", "Interactive session started");
    prompt(controller.phase())?;

    while !input_closed {
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if matches!(line.trim(), "quit" | "exit") {
            break;
        }

        form.set_input(line);
        let submission = match form.begin(controller) {
            Ok(submission) => submission,
            Err(err) => {
                refuse(&mut summary, &err);
                prompt(controller.phase())?;
                continue;
            }
        };
        summary.submitted += 1;
        output::print_session(controller.session(), as_json);

        let outcome = {
            let request = controller.service().analyze(submission.url());
            tokio::pin!(request);
            loop {
                tokio::select! {
                    biased;
                    outcome = &mut request => break outcome,
                    line = lines.next_line(), if !input_closed => match line? {
                        Some(ignored) => {
                            debug!(
                                action = "refuse",
                                component = "audit_form",
                                line = %ignored,
                                "Input received while loading"
                            );
                            refuse(&mut summary, &AuditError::Busy);
                        }
                        None => input_closed = true,
                    },
                }
            }
        };

        match controller.resolve(submission, outcome) {
            AuditPhase::Success(_) => summary.succeeded += 1,
            AuditPhase::Failed(_) => summary.failed += 1,
            AuditPhase::Idle | AuditPhase::Loading => {}
        }
        output::print_session(controller.session(), as_json);
        prompt(controller.phase())?;
    }

    println!();
    info!(
        action = "complete",
        component = "audit_form",
        submitted = summary.submitted,
        succeeded = summary.succeeded,
        failed = summary.failed,
        refused = summary.refused,
        "Interactive session ended"
    );
    Ok(summary)
}
