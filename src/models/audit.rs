use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::Link;

pub const AUDIT_TYPE_ONESHOT: &str = "ONESHOT";
pub const AUDIT_TYPE_CONTINUOUS: &str = "CONTINUOUS";

/// Optimization run against a goal
///
/// Also used as the request body for creation; server-assigned fields are
/// left out of the payload when unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Audit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub audit_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Goal name or UUID
    #[serde(default, alias = "goal_uuid")]
    pub goal: String,
    #[serde(default, alias = "strategy_uuid", skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_template: Option<String>,
    /// Seconds or a cron expression, continuous audits only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scope: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub parameters: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub auto_trigger: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_run_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

impl Audit {
    /// One-shot audit for the given goal
    pub fn oneshot(goal: impl Into<String>) -> Self {
        Self {
            audit_type: AUDIT_TYPE_ONESHOT.to_string(),
            goal: goal.into(),
            ..Self::default()
        }
    }

    /// Continuous audit re-run on the given interval
    pub fn continuous(goal: impl Into<String>, interval: impl Into<serde_json::Value>) -> Self {
        Self {
            audit_type: AUDIT_TYPE_CONTINUOUS.to_string(),
            goal: goal.into(),
            interval: Some(interval.into()),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }

    pub fn with_auto_trigger(mut self, auto_trigger: bool) -> Self {
        self.auto_trigger = auto_trigger;
        self
    }
}

/// Reusable audit definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, alias = "goal_uuid")]
    pub goal: String,
    #[serde(default, alias = "strategy_uuid", skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scope: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

impl AuditTemplate {
    pub fn new(name: impl Into<String>, goal: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            goal: goal.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditList {
    #[serde(default)]
    pub audits: Vec<Audit>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditTemplateList {
    #[serde(default)]
    pub audit_templates: Vec<AuditTemplate>,
}
