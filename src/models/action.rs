use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::Link;

/// Set of actions proposed by an audit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionPlan {
    #[serde(default)]
    pub uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, alias = "strategy_name", skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_efficacy: Option<serde_json::Value>,
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

/// Single step of an action plan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Action {
    #[serde(default)]
    pub uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_plan_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, alias = "input_parameters", skip_serializing_if = "serde_json::Map::is_empty")]
    pub parameters: serde_json::Map<String, serde_json::Value>,
    /// UUIDs of the actions this one waits for
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionPlanList {
    #[serde(default)]
    pub action_plans: Vec<ActionPlan>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionList {
    #[serde(default)]
    pub actions: Vec<Action>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_action_plan() {
        let plan: ActionPlan = serde_json::from_value(json!({
            "uuid": "p1",
            "audit_uuid": "a1",
            "state": "RECOMMENDED",
            "strategy_name": "dummy",
            "global_efficacy": [{"name": "released_nodes", "value": 2, "unit": null}],
            "links": []
        }))
        .unwrap();
        assert_eq!(plan.strategy.as_deref(), Some("dummy"));
        assert_eq!(plan.state.as_deref(), Some("RECOMMENDED"));
        assert!(plan.global_efficacy.unwrap().is_array());
    }

    #[test]
    fn test_deserialize_action() {
        let list: ActionList = serde_json::from_value(json!({
            "actions": [{
                "uuid": "x1",
                "action_plan_uuid": "p1",
                "action_type": "migrate",
                "state": "PENDING",
                "input_parameters": {"migration_type": "live"},
                "parents": ["x0"]
            }]
        }))
        .unwrap();

        let action = &list.actions[0];
        assert_eq!(action.parameters["migration_type"], "live");
        assert_eq!(action.parents, vec!["x0".to_string()]);
    }
}
