use crate::controller::{AuditPhase, AuditSession};
use crate::render::{render, ReportView};
use crate::service::HealthStatus;
use serde_json::json;
use std::fmt::{self, Write};

pub fn write_report(out: &mut impl Write, view: &ReportView) -> fmt::Result {
    match &view.url {
        Some(url) => writeln!(out, "\n--- AEO Audit: {} ---", url)?,
        None => writeln!(out, "\n--- AEO Audit ---")?,
    }

    writeln!(
        out,
        "AEO Score: {}/100 [{}] {}",
        view.score.score, view.score.color, view.score.label
    )?;

    writeln!(out)?;
    for card in &view.summary {
        writeln!(out, "{}: {}", card.title, card.value)?;
    }

    if let Some(recommendations) = &view.recommendations {
        writeln!(out, "\nRecommendations:")?;
        for (i, item) in recommendations.items.iter().enumerate() {
            writeln!(out, "{}. {}", i + 1, item)?;
        }
    }

    writeln!(out, "\nSchema Markup:")?;
    for row in &view.schema {
        match &row.detail {
            Some(detail) => writeln!(out, "- {}: {} ({})", row.name, row.status, detail)?,
            None => writeln!(out, "- {}: {}", row.name, row.status)?,
        }
    }

    writeln!(out, "\nQuestion-Based Headings:")?;
    writeln!(
        out,
        "{} out of {} headings are questions",
        view.questions.question_headings, view.questions.total_headings
    )?;
    if let Some(examples) = &view.questions.examples {
        writeln!(out, "Examples:")?;
        for example in examples {
            writeln!(out, "  | {}", example)?;
        }
    }

    writeln!(out, "\nContent Structure:")?;
    for cell in &view.structure {
        writeln!(out, "- {}: {}", cell.label, cell.value)?;
    }

    writeln!(out, "\nE-E-A-T Signals:")?;
    for row in &view.eeat {
        writeln!(out, "- {}: {}", row.label, row.status)?;
    }

    if let Some(entities) = &view.entities {
        writeln!(out, "\nEntities ({} found):", entities.found)?;
        let tags: Vec<String> = entities.tags.iter().map(|t| format!("[{}]", t)).collect();
        writeln!(out, "{}", tags.join(" "))?;
    }

    if let Some(checklist) = &view.checklist {
        writeln!(out, "\nAEO Checklist:")?;
        for row in &checklist.rows {
            writeln!(out, "- {}: {}", row.name, row.status)?;
        }
    }

    Ok(())
}

/// Text form of a phase; idle sessions print nothing.
pub struct PhaseText<'a>(pub &'a AuditPhase);

impl fmt::Display for PhaseText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            AuditPhase::Idle => Ok(()),
            AuditPhase::Loading => writeln!(f, "Analyzing..."),
            AuditPhase::Success(report) => write_report(f, &render(report)),
            AuditPhase::Failed(message) => writeln!(f, "Error: {}", message),
        }
    }
}

pub fn session_json(session: &AuditSession) -> serde_json::Value {
    let phase = session.phase();
    let mut value = json!({
        "status": phase.name(),
        "url": session.url(),
        "submitted_at": session.submitted_at(),
    });
    match phase {
        AuditPhase::Success(report) => value["report"] = json!(render(report)),
        AuditPhase::Failed(message) => value["error"] = json!(message),
        AuditPhase::Idle | AuditPhase::Loading => {}
    }
    value
}

pub fn print_session(session: &AuditSession, as_json: bool) {
    if as_json {
        println!("{}", session_json(session));
    } else {
        print!("{}", PhaseText(session.phase()));
    }
}

pub fn print_health(health: &HealthStatus, as_json: bool) {
    if as_json {
        println!("{}", json!(health));
        return;
    }
    println!(
        "Service status: {} ({})",
        health.status.as_deref().unwrap_or("unknown"),
        health.tool.as_deref().unwrap_or("unnamed tool")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::AuditController;
    use crate::error::Result;
    use crate::report::{AuditReport, Checklist, Metric};
    use crate::service::AnalysisService;

    fn sample() -> AuditReport {
        AuditReport {
            url: Some("https://example.com/a".to_string()),
            aeo_score: Some(Metric::from(85)),
            word_count: Some(Metric::from(1200)),
            recommendations: Some(Vec::new()),
            aeo_checks: Some(Checklist::new(vec![("Has FAQ schema".to_string(), true)])),
            ..Default::default()
        }
    }

    struct FixedService(Result<AuditReport>);

    impl AnalysisService for FixedService {
        async fn analyze(&self, _url: &str) -> Result<AuditReport> {
            self.0.clone()
        }
    }

    #[test]
    fn text_report_shows_band_and_checklist() {
        let phase = AuditPhase::Success(Box::new(sample()));
        let text = PhaseText(&phase).to_string();
        assert!(text.contains("AEO Score: 85/100 [green] Excellent!"));
        assert!(text.contains("Word Count: 1,200"));
        assert!(!text.contains("Recommendations:"));
        assert!(text.contains("- Has FAQ schema: ✓ Pass"));
        assert!(!text.contains("Entities ("));
    }

    #[test]
    fn failure_prints_single_error_line() {
        let phase = AuditPhase::Failed("Invalid URL".to_string());
        assert_eq!(PhaseText(&phase).to_string(), "Error: Invalid URL\n");
        assert_eq!(PhaseText(&AuditPhase::Loading).to_string(), "Analyzing...\n");
        assert!(PhaseText(&AuditPhase::Idle).to_string().is_empty());
    }

    #[tokio::test]
    async fn json_failure_has_no_report() {
        let failure = Err(crate::AuditError::Service("Invalid URL".to_string()));
        let mut controller = AuditController::new(FixedService(failure));
        controller.submit("https://example.com/a").await.unwrap();

        let value = session_json(controller.session());
        assert_eq!(value["status"], "failed");
        assert_eq!(value["error"], "Invalid URL");
        assert_eq!(value["url"], "https://example.com/a");
        assert!(value["submitted_at"].is_string());
        assert!(value.get("report").is_none());
    }

    #[tokio::test]
    async fn json_success_carries_view() {
        let mut controller = AuditController::new(FixedService(Ok(sample())));
        controller.submit("https://example.com/a").await.unwrap();

        let value = session_json(controller.session());
        assert_eq!(value["report"]["score"]["band"], "excellent");
        assert!(value["report"]["recommendations"].is_null());
        assert_eq!(value["report"]["checklist"]["rows"][0]["passed"], true);
    }
}
