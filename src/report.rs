use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub const MIN_SCORE: i64 = 0;
pub const MAX_SCORE: i64 = 100;

/// Any JSON number the service reports. Whole values print without a
/// decimal part.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Deserialize)]
#[serde(transparent)]
pub struct Metric(f64);

impl Metric {
    pub fn value(self) -> f64 {
        self.0
    }

    /// The value as an integer when it has no fractional part.
    pub fn as_whole(self) -> Option<i64> {
        let value = self.0;
        if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
            Some(value as i64)
        } else {
            None
        }
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }
}

impl From<i64> for Metric {
    fn from(value: i64) -> Self {
        Metric(value as f64)
    }
}

impl From<f64> for Metric {
    fn from(value: f64) -> Self {
        Metric(value)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_whole() {
            Some(whole) => write!(f, "{}", whole),
            None => write!(f, "{}", self.0),
        }
    }
}

impl Serialize for Metric {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.as_whole() {
            Some(whole) => serializer.serialize_i64(whole),
            None => serializer.serialize_f64(self.0),
        }
    }
}

/// Report payload returned by the analysis service. Every field is
/// optional: a missing collection is "not present", a missing flag is false.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AuditReport {
    pub url: Option<String>,
    pub aeo_score: Option<Metric>,

    pub word_count: Option<Metric>,
    pub snippet_score: Option<Metric>,
    pub flesch_reading_ease: Option<Metric>,
    pub entities_found: Option<Metric>,
    pub first_para_words: Option<Metric>,
    pub short_paragraphs: Option<Metric>,

    pub recommendations: Option<Vec<String>>,

    pub faq_schema_present: Option<bool>,
    pub faq_count: Option<Metric>,
    pub howto_schema_present: Option<bool>,
    pub howto_count: Option<Metric>,
    pub article_schema_present: Option<bool>,

    pub question_headings: Option<Metric>,
    pub total_headings: Option<Metric>,
    pub question_heading_examples: Option<Vec<String>>,

    pub lists: Option<Metric>,
    pub tables: Option<Metric>,
    pub has_tldr: Option<bool>,
    pub has_toc: Option<bool>,

    pub has_author_meta: Option<bool>,
    pub has_date: Option<bool>,
    pub has_author_bio: Option<bool>,
    pub has_sources: Option<bool>,
    pub has_about_link: Option<bool>,
    pub has_contact_link: Option<bool>,

    pub entity_examples: Option<Vec<String>>,

    pub aeo_checks: Option<Checklist>,
}

/// Named pass/fail checks, kept in the order the service sent them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Checklist(Vec<(String, bool)>);

impl Checklist {
    pub fn new(entries: Vec<(String, bool)>) -> Self {
        Checklist(entries)
    }

    pub fn entries(&self) -> &[(String, bool)] {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Checklist {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ChecklistVisitor;

        impl<'de> Visitor<'de> for ChecklistVisitor {
            type Value = Checklist;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of check names to booleans")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Checklist, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, passed)) = map.next_entry::<String, Option<bool>>()? {
                    // A repeated key keeps its first position and takes the last value
                    match entries.iter_mut().find(|(existing, _)| *existing == name) {
                        Some(entry) => entry.1 = passed.unwrap_or(false),
                        None => entries.push((name, passed.unwrap_or(false))),
                    }
                }
                Ok(Checklist(entries))
            }
        }

        deserializer.deserialize_map(ChecklistVisitor)
    }
}

impl Serialize for Checklist {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.0.iter().map(|(name, passed)| (name, passed)))
    }
}

/// Non-fatal inconsistencies in a report payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ContractWarning {
    ScoreOutOfRange(Metric),
    MissingScore,
    QuestionHeadingsExceedTotal { question: Metric, total: Metric },
    CountWithoutSchema { schema: &'static str, count: Metric },
}

impl fmt::Display for ContractWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractWarning::ScoreOutOfRange(score) => {
                write!(f, "aeo_score {} outside {}..={}", score, MIN_SCORE, MAX_SCORE)
            }
            ContractWarning::MissingScore => write!(f, "aeo_score missing"),
            ContractWarning::QuestionHeadingsExceedTotal { question, total } => write!(
                f,
                "question_headings ({}) exceeds total_headings ({})",
                question, total
            ),
            ContractWarning::CountWithoutSchema { schema, count } => {
                write!(f, "{} count {} reported without the schema present", schema, count)
            }
        }
    }
}

impl AuditReport {
    /// Score used for banding and display: rounded, clamped to 0..=100,
    /// missing reads as 0.
    pub fn score(&self) -> i64 {
        let raw = self.aeo_score.map(|m| m.value().round()).unwrap_or(0.0);
        (raw as i64).clamp(MIN_SCORE, MAX_SCORE)
    }

    pub fn recommendations(&self) -> &[String] {
        self.recommendations.as_deref().unwrap_or_default()
    }

    pub fn question_heading_examples(&self) -> &[String] {
        self.question_heading_examples.as_deref().unwrap_or_default()
    }

    pub fn entity_examples(&self) -> &[String] {
        self.entity_examples.as_deref().unwrap_or_default()
    }

    pub fn faq_present(&self) -> bool {
        self.faq_schema_present.unwrap_or(false)
    }

    pub fn howto_present(&self) -> bool {
        self.howto_schema_present.unwrap_or(false)
    }

    pub fn article_present(&self) -> bool {
        self.article_schema_present.unwrap_or(false)
    }

    /// FAQ count, only when the FAQ schema is present.
    pub fn faq_count(&self) -> Option<Metric> {
        self.faq_present().then(|| self.faq_count.unwrap_or_default())
    }

    /// HowTo step count, only when the HowTo schema is present.
    pub fn howto_count(&self) -> Option<Metric> {
        self.howto_present().then(|| self.howto_count.unwrap_or_default())
    }

    pub fn contract_warnings(&self) -> Vec<ContractWarning> {
        let mut warnings = Vec::new();

        match self.aeo_score {
            None => warnings.push(ContractWarning::MissingScore),
            Some(score)
                if score.value() < MIN_SCORE as f64 || score.value() > MAX_SCORE as f64 =>
            {
                warnings.push(ContractWarning::ScoreOutOfRange(score))
            }
            Some(_) => {}
        }

        if let (Some(question), Some(total)) = (self.question_headings, self.total_headings) {
            if question > total {
                warnings.push(ContractWarning::QuestionHeadingsExceedTotal { question, total });
            }
        }

        if !self.faq_present() {
            if let Some(count) = self.faq_count.filter(|c| !c.is_zero()) {
                warnings.push(ContractWarning::CountWithoutSchema { schema: "FAQ", count });
            }
        }
        if !self.howto_present() {
            if let Some(count) = self.howto_count.filter(|c| !c.is_zero()) {
                warnings.push(ContractWarning::CountWithoutSchema { schema: "HowTo", count });
            }
        }

        warnings
    }
}
