use crate::error::{AuditError, Result};
use crate::report::AuditReport;
use crate::service::AnalysisService;
use chrono::{DateTime, Utc};
use std::time::Instant;
use tracing::{info, warn};

/// `Idle -> Loading -> Success | Failed`, back to `Loading` on each new
/// submission.
#[derive(Debug, Clone, PartialEq)]
pub enum AuditPhase {
    Idle,
    Loading,
    Success(Box<AuditReport>),
    Failed(String),
}

impl AuditPhase {
    pub fn name(&self) -> &'static str {
        match self {
            AuditPhase::Idle => "idle",
            AuditPhase::Loading => "loading",
            AuditPhase::Success(_) => "success",
            AuditPhase::Failed(_) => "failed",
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, AuditPhase::Loading)
    }

    pub fn report(&self) -> Option<&AuditReport> {
        match self {
            AuditPhase::Success(report) => Some(report),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AuditPhase::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Mutable state of one audit session. Only the controller writes to it.
#[derive(Debug, Clone)]
pub struct AuditSession {
    url: Option<String>,
    phase: AuditPhase,
    submitted_at: Option<DateTime<Utc>>,
    submissions: u64,
}

impl AuditSession {
    fn new() -> Self {
        Self {
            url: None,
            phase: AuditPhase::Idle,
            submitted_at: None,
            submissions: 0,
        }
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn phase(&self) -> &AuditPhase {
        &self.phase
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    pub fn submissions(&self) -> u64 {
        self.submissions
    }
}

/// Handle for the single in-flight request. Consumed by
/// [`AuditController::resolve`], so each request resolves at most once.
#[derive(Debug)]
#[must_use = "an accepted submission must be resolved"]
pub struct Submission {
    id: u64,
    url: String,
    started: Instant,
}

impl Submission {
    pub fn url(&self) -> &str {
        &self.url
    }
}

pub struct AuditController<S> {
    service: S,
    session: AuditSession,
}

impl<S: AnalysisService> AuditController<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            session: AuditSession::new(),
        }
    }

    pub fn session(&self) -> &AuditSession {
        &self.session
    }

    pub fn phase(&self) -> &AuditPhase {
        &self.session.phase
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        !self.session.phase.is_loading()
    }

    /// Accepts a submission and enters `Loading`, dropping any prior report
    /// or error. Rejected submissions leave the session untouched.
    pub fn begin(&mut self, url: &str) -> Result<Submission> {
        if self.session.phase.is_loading() {
            warn!(
                action = "reject",
                component = "audit_controller",
                reason = "busy",
                "Submission refused while a request is in flight"
            );
            return Err(AuditError::Busy);
        }

        if url.trim().is_empty() {
            warn!(
                action = "reject",
                component = "audit_controller",
                reason = "empty_url",
                "Submission refused"
            );
            return Err(AuditError::InvalidInput("URL is required".to_string()));
        }

        self.session.submissions += 1;
        self.session.url = Some(url.to_string());
        self.session.submitted_at = Some(Utc::now());
        self.transition(AuditPhase::Loading);

        Ok(Submission {
            id: self.session.submissions,
            url: url.to_string(),
            started: Instant::now(),
        })
    }

    /// Applies the outcome of the request behind `submission`.
    pub fn resolve(
        &mut self,
        submission: Submission,
        outcome: Result<AuditReport>,
    ) -> &AuditPhase {
        if !self.session.phase.is_loading() || submission.id != self.session.submissions {
            warn!(
                action = "ignore",
                component = "audit_controller",
                submission = submission.id,
                phase = self.session.phase.name(),
                "Dropping outcome for a request that is not in flight"
            );
            return &self.session.phase;
        }

        let duration_ms = submission.started.elapsed().as_millis();
        let next = match outcome {
            Ok(report) => {
                for warning in report.contract_warnings() {
                    warn!(
                        action = "validate",
                        component = "report_contract",
                        submission = submission.id,
                        warning = %warning,
                        "Report payload inconsistency"
                    );
                }
                info!(
                    action = "complete",
                    component = "audit_controller",
                    submission = submission.id,
                    score = report.score(),
                    duration_ms,
                    "Audit succeeded"
                );
                AuditPhase::Success(Box::new(report))
            }
            Err(err) => {
                warn!(
                    action = "fail",
                    component = "audit_controller",
                    submission = submission.id,
                    error = %err,
                    transport = err.is_transport(),
                    duration_ms,
                    "Audit failed"
                );
                AuditPhase::Failed(err.user_message())
            }
        };
        self.transition(next);
        &self.session.phase
    }

    /// Runs one submission to completion: enters `Loading`, issues exactly one
    /// request, and lands in `Success` or `Failed`.
    ///
    /// Errors are returned only for refused submissions; service failures
    /// are reported through the `Failed` phase.
    pub async fn submit(&mut self, url: &str) -> Result<&AuditPhase> {
        let submission = self.begin(url)?;
        let outcome = self.service.analyze(submission.url()).await;
        Ok(self.resolve(submission, outcome))
    }

    fn transition(&mut self, next: AuditPhase) {
        info!(
            action = "transition",
            component = "audit_controller",
            from = self.session.phase.name(),
            to = next.name(),
            url = ?self.session.url,
            "Session phase changed"
        );
        self.session.phase = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Metric;
    use std::cell::Cell;

    struct CountingService {
        calls: Cell<usize>,
    }

    impl AnalysisService for CountingService {
        async fn analyze(&self, _url: &str) -> Result<AuditReport> {
            self.calls.set(self.calls.get() + 1);
            Ok(AuditReport {
                aeo_score: Some(Metric::from(70)),
                ..Default::default()
            })
        }
    }

    fn controller() -> AuditController<CountingService> {
        AuditController::new(CountingService { calls: Cell::new(0) })
    }

    #[test]
    fn starts_idle() {
        let controller = controller();
        assert_eq!(controller.phase(), &AuditPhase::Idle);
        assert!(controller.can_submit());
        assert_eq!(controller.session().url(), None);
    }

    #[test]
    fn empty_url_is_refused_without_state_change() {
        let mut controller = controller();
        let err = controller.begin("   ").unwrap_err();
        assert!(matches!(err, AuditError::InvalidInput(_)));
        assert_eq!(controller.phase(), &AuditPhase::Idle);
        assert_eq!(controller.session().submissions(), 0);
    }

    #[test]
    fn begin_enters_loading_and_disables_submit() {
        let mut controller = controller();
        let submission = controller.begin("https://example.com/a").unwrap();
        assert_eq!(submission.url(), "https://example.com/a");
        assert!(controller.phase().is_loading());
        assert!(!controller.can_submit());
        assert!(controller.session().submitted_at().is_some());
        assert_eq!(controller.begin("https://example.com/b").unwrap_err(), AuditError::Busy);
        assert_eq!(controller.session().url(), Some("https://example.com/a"));
    }

    #[test]
    fn url_is_forwarded_as_typed() {
        let mut controller = controller();
        let submission = controller.begin("  https://example.com/a ").unwrap();
        assert_eq!(submission.url(), "  https://example.com/a ");
        assert_eq!(controller.session().url(), Some("  https://example.com/a "));
    }

    #[test]
    fn failure_carries_user_message() {
        let mut controller = controller();
        let submission = controller.begin("https://example.com/a").unwrap();
        let phase = controller.resolve(
            submission,
            Err(AuditError::Service("Invalid URL".to_string())),
        );
        assert_eq!(phase, &AuditPhase::Failed("Invalid URL".to_string()));
        assert!(controller.can_submit());
    }

    #[test]
    fn new_submission_clears_previous_error() {
        let mut controller = controller();
        let first = controller.begin("a").unwrap();
        controller.resolve(first, Err(AuditError::Transport("down".to_string())));
        assert!(controller.phase().error().is_some());

        let _second = controller.begin("b").unwrap();
        assert_eq!(controller.phase(), &AuditPhase::Loading);
        assert_eq!(controller.phase().error(), None);
        assert_eq!(controller.phase().report(), None);
    }

    #[tokio::test]
    async fn submit_issues_exactly_one_request() {
        let mut controller = controller();
        let phase = controller.submit("https://example.com/a").await.unwrap();
        assert_eq!(phase.report().map(|r| r.score()), Some(70));
        assert_eq!(controller.service().calls.get(), 1);
    }

    #[tokio::test]
    async fn refused_submit_issues_no_request() {
        let mut controller = controller();
        assert!(controller.submit("").await.is_err());
        assert_eq!(controller.service().calls.get(), 0);
        assert_eq!(controller.phase(), &AuditPhase::Idle);
    }
}
