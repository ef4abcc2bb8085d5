pub mod args;
pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod output;
pub mod render;
pub mod report;
pub mod service;
pub mod utils;

pub use args::Args;
pub use controller::{AuditController, AuditPhase, AuditSession};
pub use error::{AuditError, Result};
pub use render::{render, ReportView, ScoreBand};
pub use report::AuditReport;
pub use service::{AnalysisService, HttpAnalysisService};
