use aeo_audit::report::Checklist;
use aeo_audit::{
    render, AnalysisService, AuditController, AuditError, AuditPhase, AuditReport, ScoreBand,
};
use std::cell::RefCell;
use std::collections::VecDeque;

/// Replays canned outcomes in order and records every URL it was asked for.
struct ScriptedService {
    outcomes: RefCell<VecDeque<Result<AuditReport, AuditError>>>,
    requests: RefCell<Vec<String>>,
}

impl ScriptedService {
    fn new(outcomes: Vec<Result<AuditReport, AuditError>>) -> Self {
        Self {
            outcomes: RefCell::new(outcomes.into()),
            requests: RefCell::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl AnalysisService for ScriptedService {
    async fn analyze(&self, url: &str) -> aeo_audit::Result<AuditReport> {
        self.requests.borrow_mut().push(url.to_string());
        self.outcomes
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(AuditError::Transport("no scripted outcome".to_string())))
    }
}

fn scenario_report() -> AuditReport {
    serde_json::from_str(
        r#"{"aeo_score": 85, "word_count": 1200, "recommendations": [],
            "aeo_checks": {"Has FAQ schema": true}}"#,
    )
    .unwrap()
}

#[tokio::test]
async fn successful_audit_renders_excellent_band() {
    let service = ScriptedService::new(vec![Ok(scenario_report())]);
    let mut controller = AuditController::new(service);

    let phase = controller.submit("https://example.com/a").await.unwrap();
    let report = phase.report().expect("report after success");
    let view = render(report);

    assert_eq!(view.score.band, ScoreBand::Excellent);
    assert!(view.recommendations.is_none());
    let checklist = view.checklist.expect("checklist present");
    assert_eq!(checklist.rows.len(), 1);
    assert!(checklist.rows[0].passed);
    assert_eq!(controller.service().requests(), vec!["https://example.com/a"]);
}

#[tokio::test]
async fn service_error_is_surfaced_verbatim() {
    let service = ScriptedService::new(vec![Err(AuditError::Service("Invalid URL".to_string()))]);
    let mut controller = AuditController::new(service);

    let phase = controller.submit("not a url").await.unwrap();
    assert_eq!(phase, &AuditPhase::Failed("Invalid URL".to_string()));
    assert!(phase.report().is_none());
}

#[tokio::test]
async fn transport_error_uses_generic_message() {
    let service = ScriptedService::new(vec![Err(AuditError::Transport(
        "connection refused".to_string(),
    ))]);
    let mut controller = AuditController::new(service);

    let phase = controller.submit("https://example.com/a").await.unwrap();
    assert_eq!(
        phase.error(),
        Some("Request failed: connection refused")
    );
}

#[tokio::test]
async fn failed_resubmission_leaves_no_stale_report() {
    let service = ScriptedService::new(vec![
        Ok(scenario_report()),
        Err(AuditError::Service("Invalid URL".to_string())),
    ]);
    let mut controller = AuditController::new(service);

    controller.submit("https://example.com/a").await.unwrap();
    assert!(controller.phase().report().is_some());

    let submission = controller.begin("https://example.com/b").unwrap();
    assert_eq!(controller.phase(), &AuditPhase::Loading);
    assert!(controller.phase().report().is_none());

    let outcome = controller.service().analyze(submission.url()).await;
    let phase = controller.resolve(submission, outcome);
    assert_eq!(phase, &AuditPhase::Failed("Invalid URL".to_string()));
    assert!(phase.report().is_none());
}

#[tokio::test]
async fn no_second_request_while_loading() {
    let service = ScriptedService::new(vec![Ok(scenario_report())]);
    let mut controller = AuditController::new(service);

    let submission = controller.begin("https://example.com/a").unwrap();
    assert!(!controller.can_submit());
    assert_eq!(
        controller.submit("https://example.com/b").await.unwrap_err(),
        AuditError::Busy
    );
    assert!(controller.service().requests().is_empty());

    let outcome = controller.service().analyze(submission.url()).await;
    controller.resolve(submission, outcome);

    assert_eq!(controller.service().requests(), vec!["https://example.com/a"]);
    assert_eq!(controller.session().url(), Some("https://example.com/a"));
    assert!(controller.can_submit());
}

#[tokio::test]
async fn sessions_count_each_accepted_submission() {
    let service = ScriptedService::new(vec![Ok(scenario_report()), Ok(scenario_report())]);
    let mut controller = AuditController::new(service);

    assert!(controller.submit("").await.is_err());
    controller.submit("https://example.com/a").await.unwrap();
    controller.submit("https://example.com/b").await.unwrap();

    assert_eq!(controller.session().submissions(), 2);
    assert_eq!(controller.session().url(), Some("https://example.com/b"));
}

#[tokio::test]
async fn partial_payload_still_succeeds() {
    let partial: AuditReport = serde_json::from_str(r#"{"aeo_score": 42}"#).unwrap();
    let service = ScriptedService::new(vec![Ok(partial)]);
    let mut controller = AuditController::new(service);

    let phase = controller.submit("https://example.com/a").await.unwrap();
    let view = render(phase.report().unwrap());
    assert_eq!(view.score.band, ScoreBand::Poor);
    assert!(view.entities.is_none());
    assert!(view.checklist.is_none());
    assert_eq!(view.eeat.len(), 6);
    assert_eq!(view.schema.len(), 3);
}

#[test]
fn checklist_absent_and_empty_render_differently() {
    let empty = AuditReport {
        aeo_checks: Some(Checklist::default()),
        ..Default::default()
    };
    assert!(render(&empty).checklist.unwrap().rows.is_empty());
    assert!(render(&AuditReport::default()).checklist.is_none());
}
