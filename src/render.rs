use crate::report::{AuditReport, Metric};
use crate::utils::format_number;
use serde::Serialize;

pub const EXCELLENT_THRESHOLD: i64 = 80;
pub const GOOD_THRESHOLD: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Excellent,
    Good,
    Poor,
}

impl ScoreBand {
    /// Lower bounds are inclusive: 80 is excellent, 60 is good.
    pub fn from_score(score: i64) -> Self {
        if score >= EXCELLENT_THRESHOLD {
            ScoreBand::Excellent
        } else if score >= GOOD_THRESHOLD {
            ScoreBand::Good
        } else {
            ScoreBand::Poor
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            ScoreBand::Excellent => "green",
            ScoreBand::Good => "yellow",
            ScoreBand::Poor => "red",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent!",
            ScoreBand::Good => "Good, but could improve",
            ScoreBand::Poor => "Needs improvement",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Pass,
    Fail,
}

impl Tone {
    pub fn from_flag(flag: bool) -> Self {
        if flag {
            Tone::Pass
        } else {
            Tone::Fail
        }
    }

    pub fn mark(self) -> &'static str {
        match self {
            Tone::Pass => "✓",
            Tone::Fail => "✗",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreView {
    pub score: i64,
    pub band: ScoreBand,
    pub label: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryCard {
    pub title: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationsSection {
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaRow {
    pub name: &'static str,
    pub present: bool,
    pub status: &'static str,
    pub tone: Tone,
    /// Count line, only for a present FAQ or HowTo schema
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionSection {
    pub question_headings: Metric,
    pub total_headings: Metric,
    pub examples: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureCell {
    pub label: &'static str,
    pub value: String,
    /// Set for the boolean cells only
    pub tone: Option<Tone>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalRow {
    pub label: &'static str,
    pub present: bool,
    pub status: &'static str,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitiesSection {
    /// Reported total; the tag list may be a truncated sample
    pub found: Metric,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckRow {
    pub name: String,
    pub passed: bool,
    pub status: &'static str,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChecklistSection {
    pub rows: Vec<CheckRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportView {
    pub url: Option<String>,
    pub score: ScoreView,
    pub summary: Vec<SummaryCard>,
    pub recommendations: Option<RecommendationsSection>,
    pub schema: Vec<SchemaRow>,
    pub questions: QuestionSection,
    pub structure: Vec<StructureCell>,
    pub eeat: Vec<SignalRow>,
    pub entities: Option<EntitiesSection>,
    pub checklist: Option<ChecklistSection>,
}

/// Pure derivation of everything the presentation layer shows.
pub fn render(report: &AuditReport) -> ReportView {
    ReportView {
        url: report.url.clone(),
        score: score_view(report),
        summary: summary_cards(report),
        recommendations: recommendations_section(report),
        schema: schema_rows(report),
        questions: question_section(report),
        structure: structure_cells(report),
        eeat: eeat_rows(report),
        entities: entities_section(report),
        checklist: checklist_section(report),
    }
}

pub fn score_view(report: &AuditReport) -> ScoreView {
    let score = report.score();
    let band = ScoreBand::from_score(score);
    ScoreView {
        score,
        band,
        label: band.label(),
        color: band.color(),
    }
}

fn format_metric(value: Metric) -> String {
    match value.as_whole() {
        Some(whole) => format_number(whole),
        None => value.to_string(),
    }
}

fn metric(value: Option<Metric>) -> String {
    value.map(format_metric).unwrap_or_else(|| "n/a".to_string())
}

fn summary_cards(report: &AuditReport) -> Vec<SummaryCard> {
    let mut cards = vec![
        SummaryCard {
            title: "Word Count",
            value: metric(report.word_count),
        },
        SummaryCard {
            title: "Snippet Score",
            value: metric(report.snippet_score),
        },
        SummaryCard {
            title: "Reading Ease",
            value: metric(report.flesch_reading_ease),
        },
        SummaryCard {
            title: "Entities",
            value: metric(report.entities_found),
        },
    ];

    if let Some(words) = report.first_para_words {
        cards.push(SummaryCard {
            title: "First Paragraph Words",
            value: format_metric(words),
        });
    }
    if let Some(count) = report.short_paragraphs {
        cards.push(SummaryCard {
            title: "Short Paragraphs",
            value: format_metric(count),
        });
    }

    cards
}

pub fn recommendations_section(report: &AuditReport) -> Option<RecommendationsSection> {
    let items = report.recommendations();
    if items.is_empty() {
        return None;
    }
    Some(RecommendationsSection {
        items: items.to_vec(),
    })
}

fn schema_row(name: &'static str, present: bool, detail: Option<String>) -> SchemaRow {
    SchemaRow {
        name,
        present,
        status: if present { "✓ Present" } else { "✗ Missing" },
        tone: Tone::from_flag(present),
        detail,
    }
}

pub fn schema_rows(report: &AuditReport) -> Vec<SchemaRow> {
    vec![
        schema_row(
            "FAQ Schema",
            report.faq_present(),
            report.faq_count().map(|count| format!("{} FAQs", count)),
        ),
        schema_row(
            "HowTo Schema",
            report.howto_present(),
            report.howto_count().map(|count| format!("{} steps", count)),
        ),
        schema_row("Article Schema", report.article_present(), None),
    ]
}

pub fn question_section(report: &AuditReport) -> QuestionSection {
    let examples = report.question_heading_examples();
    QuestionSection {
        question_headings: report.question_headings.unwrap_or_default(),
        total_headings: report.total_headings.unwrap_or_default(),
        examples: (!examples.is_empty()).then(|| examples.to_vec()),
    }
}

fn flag_cell(label: &'static str, flag: Option<bool>) -> StructureCell {
    let tone = Tone::from_flag(flag.unwrap_or(false));
    StructureCell {
        label,
        value: tone.mark().to_string(),
        tone: Some(tone),
    }
}

pub fn structure_cells(report: &AuditReport) -> Vec<StructureCell> {
    vec![
        StructureCell {
            label: "Lists",
            value: metric(report.lists),
            tone: None,
        },
        StructureCell {
            label: "Tables",
            value: metric(report.tables),
            tone: None,
        },
        flag_cell("Has TL;DR", report.has_tldr),
        flag_cell("Has TOC", report.has_toc),
    ]
}

enum SignalKind {
    OnPage,
    Link,
}

fn signal_row(label: &'static str, flag: Option<bool>, kind: SignalKind) -> SignalRow {
    let present = flag.unwrap_or(false);
    let status = match (kind, present) {
        (SignalKind::OnPage, true) => "✓ Present",
        (SignalKind::OnPage, false) => "✗ Missing",
        (SignalKind::Link, true) => "✓ Linked",
        (SignalKind::Link, false) => "✗ Not Found",
    };
    SignalRow {
        label,
        present,
        status,
        tone: Tone::from_flag(present),
    }
}

/// The six E-E-A-T rows, always all shown, in a fixed order.
pub fn eeat_rows(report: &AuditReport) -> Vec<SignalRow> {
    vec![
        signal_row("Author Meta", report.has_author_meta, SignalKind::OnPage),
        signal_row("Publication Date", report.has_date, SignalKind::OnPage),
        signal_row("Author Bio", report.has_author_bio, SignalKind::OnPage),
        signal_row("Sources/References", report.has_sources, SignalKind::OnPage),
        signal_row("About Page", report.has_about_link, SignalKind::Link),
        signal_row("Contact Page", report.has_contact_link, SignalKind::Link),
    ]
}

pub fn entities_section(report: &AuditReport) -> Option<EntitiesSection> {
    let tags = report.entity_examples();
    if tags.is_empty() {
        return None;
    }
    Some(EntitiesSection {
        found: report.entities_found.unwrap_or_default(),
        tags: tags.to_vec(),
    })
}

/// Present whenever the report carries a checklist, even an empty one.
pub fn checklist_section(report: &AuditReport) -> Option<ChecklistSection> {
    let checklist = report.aeo_checks.as_ref()?;
    let rows = checklist
        .entries()
        .iter()
        .map(|(name, passed)| CheckRow {
            name: name.clone(),
            passed: *passed,
            status: if *passed { "✓ Pass" } else { "✗ Fail" },
            tone: Tone::from_flag(*passed),
        })
        .collect();
    Some(ChecklistSection { rows })
}
