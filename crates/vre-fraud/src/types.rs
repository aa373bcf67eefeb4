use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vre_config::VreConfig;
use vre_reconcile::ReconWindow;
use vre_schemas::{Cohort, Customer, LogDomain, LogStreams, Status};
use vre_targets::TargetBook;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Yellow,
    Red,
}

impl Severity {
    pub fn as_status(&self) -> Status {
        match self {
            Severity::Yellow => Status::Yellow,
            Severity::Red => Status::Red,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DetectionType {
    ExactMatch,
    StaticThreshold,
    CrossTable,
    Heuristic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FraudCategory {
    Sales,
    Cash,
    Procurement,
    Production,
    Flock,
    Feed,
    Inventory,
    Compliance,
}

/// Human workflow state. Only people move a flag out of `Open`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FlagStatus {
    Open,
    Investigating,
    Resolved,
    FalsePositive,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub by: String,
    pub on: NaiveDate,
    pub notes: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraudFlag {
    pub flag_id: Uuid,
    pub rule_id: String,
    pub label: String,
    pub category: FraudCategory,
    pub detection: DetectionType,
    pub severity: Severity,
    pub description: String,
    pub evidence: String,
    pub sources: Vec<LogDomain>,
    pub date_detected: NaiveDate,
    /// What the flag is about (invoice, receipt, cohort, item, day).
    pub subject: String,
    pub status: FlagStatus,
    pub resolution: Option<Resolution>,
}

/// One hit produced by a detector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Finding {
    pub subject: String,
    pub date: NaiveDate,
    pub evidence: String,
}

impl Finding {
    pub fn new(subject: impl Into<String>, date: NaiveDate, evidence: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            date,
            evidence: evidence.into(),
        }
    }
}

/// Read-only view handed to every detector.
#[derive(Clone, Copy, Debug)]
pub struct RuleContext<'a> {
    pub cfg: &'a VreConfig,
    pub window: ReconWindow,
    pub streams: &'a LogStreams,
    pub cohorts: &'a [Cohort],
    pub targets: &'a TargetBook,
    pub opening_eggs: i64,
    pub customers: &'a [Customer],
}

pub type Detector = fn(&RuleContext<'_>) -> Vec<Finding>;

/// One catalog row.
#[derive(Clone, Copy)]
pub struct FraudRule {
    pub id: &'static str,
    pub label: &'static str,
    pub category: FraudCategory,
    pub severity: Severity,
    pub detection: DetectionType,
    pub sources: &'static [LogDomain],
    pub description: &'static str,
    pub detect: Detector,
}

impl std::fmt::Debug for FraudRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FraudRule")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("severity", &self.severity)
            .field("detection", &self.detection)
            .finish()
    }
}

/// Serializable catalog row (without the detector), for listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleInfo {
    pub id: String,
    pub label: String,
    pub category: FraudCategory,
    pub severity: Severity,
    pub detection: DetectionType,
    pub sources: Vec<LogDomain>,
    pub description: String,
}

impl From<&FraudRule> for RuleInfo {
    fn from(r: &FraudRule) -> Self {
        Self {
            id: r.id.to_string(),
            label: r.label.to_string(),
            category: r.category,
            severity: r.severity,
            detection: r.detection,
            sources: r.sources.to_vec(),
            description: r.description.to_string(),
        }
    }
}
